//! Listing response envelope

use serde::{Deserialize, Serialize};

/// `{ "count": n, "value": [...] }` wrapper used by list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: usize,
    pub value: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.value
    }
}
