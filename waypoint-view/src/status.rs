//! Status display data

use waypoint_core::domain::status::PipelineStatus;

/// How a status is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusIndicator {
    pub label: &'static str,
    pub symbol: &'static str,
}

pub fn indicator(status: PipelineStatus) -> StatusIndicator {
    match status {
        PipelineStatus::Succeeded => StatusIndicator {
            label: "Success",
            symbol: "✓",
        },
        PipelineStatus::Failed => StatusIndicator {
            label: "Failed",
            symbol: "✗",
        },
        PipelineStatus::Running => StatusIndicator {
            label: "Running",
            symbol: "▸",
        },
        PipelineStatus::Warning => StatusIndicator {
            label: "Warning",
            symbol: "!",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(indicator(PipelineStatus::Succeeded).label, "Success");
        assert_eq!(indicator(PipelineStatus::Warning).label, "Warning");
        assert_eq!(indicator(PipelineStatus::Running).symbol, "▸");
    }
}
