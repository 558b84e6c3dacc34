//! Error types for grid construction

use thiserror::Error;

/// A grid template that cannot be turned into a [Grid](crate::Grid).
///
/// All failures of this crate happen while building the grid; a search over a valid grid never
/// fails, an unreachable goal is reported as [SearchState::Exhausted](crate::SearchState::Exhausted).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("grid template is empty")]
    EmptyTemplate,

    #[error("grid template is not rectangular: row {row} has {found} cells, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell marker `{marker}` at ({x}, {y})")]
    InvalidMarker { marker: String, x: usize, y: usize },

    #[error("grid template has no start marker")]
    MissingStart,

    #[error("grid template has {0} start markers, expected exactly one")]
    MultipleStarts(usize),

    #[error("grid template has no end marker")]
    MissingEnd,

    #[error("grid template has {0} end markers, expected exactly one")]
    MultipleEnds(usize),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_cell() {
        let err = ConfigurationError::InvalidMarker {
            marker: "7".to_owned(),
            x: 3,
            y: 1,
        };
        assert_eq!(err.to_string(), "unknown cell marker `7` at (3, 1)");
        let err = ConfigurationError::NotRectangular {
            row: 2,
            expected: 4,
            found: 3,
        };
        assert!(err.to_string().contains("row 2 has 3 cells"));
    }
}
