// src/error.rs
use thiserror::Error;

/// Fatal conditions of a batch run that callers may want to tell apart.
/// I/O and orchestration failures travel as `anyhow::Error` with context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LvrError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("parse error: cannot read {input:?} as {expected}")]
    Parse { input: String, expected: &'static str },

    #[error("missing column `{column}` in {source_name}")]
    MissingColumn { column: String, source_name: String },
}

impl LvrError {
    pub fn parse(input: impl Into<String>, expected: &'static str) -> Self {
        LvrError::Parse {
            input: input.into(),
            expected,
        }
    }
}
