use thiserror::Error;

/// Errors raised while loading inputs, building the model or solving it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed cost table: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to fetch cost table: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cost table has no sites")]
    EmptyCostTable,

    #[error("invalid {column} cost {value} in row {row}")]
    InvalidCost {
        row: usize,
        column: &'static str,
        value: f64,
    },

    #[error("invalid storage capacity: min {min} is greater than max {max}")]
    InvalidCapacity { min: u32, max: u32 },

    #[error("invalid rule {rule}: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("rule {rule} references site index {index}, but only {sites} sites are loaded")]
    RuleOutOfRange {
        rule: String,
        index: usize,
        sites: usize,
    },

    #[error("solver failed: {0}")]
    Resolution(#[from] good_lp::ResolutionError),

    #[error("{0}")]
    Usage(String),
}
