//! Waypoint View
//!
//! Everything between raw metadata and a rendered table:
//! - [`hub`]: loads pipelines, environments and their metadata for a project
//! - [`matrix`]: joins pipelines with aggregated metadata into rows
//! - [`filter`]: session-owned filter criteria with change subscriptions
//! - [`table`]: sorted and filtered row sets, reacting to filter changes
//! - [`status`]: display data for pipeline statuses
//!
//! Nothing here renders; the CLI (or any other front end) reads the current
//! [`table::TableView`] and draws it.

pub mod error;
pub mod filter;
pub mod hub;
pub mod matrix;
pub mod status;
pub mod table;

pub use error::{Result, ViewError};
pub use filter::{Filter, FilterCriteria, FilterSubscription};
pub use hub::{VersionsData, VersionsHub};
pub use matrix::build_version_matrix;
pub use table::{SortColumn, SortOrder, TableModel, TableView, VersionsTable};
