use thiserror::Error;

#[derive(Debug, Error)]
pub enum AprsWaveError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value {value} does not fit in {digits} base-91 digits")]
    Base91Overflow { value: u64, digits: usize },

    #[error("Invalid position field: {0}")]
    InvalidPosition(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AprsWaveError {
    /// True for the errors raised while rendering the information field
    pub fn is_encoding_error(&self) -> bool {
        matches!(
            self,
            AprsWaveError::Base91Overflow { .. } | AprsWaveError::InvalidPosition(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AprsWaveError>;
