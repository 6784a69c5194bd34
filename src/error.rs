use symbios::system::SystemError;
use thiserror::Error;

/// Errors surfaced by the road generator.
///
/// Only malformed construction inputs are errors. Unviable roads, degenerate headings and
/// rejected proposals are ordinary generation outcomes.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("symbol encoding failed: {0}")]
    Encoding(String),

    #[error("grammar derivation failed: {0}")]
    Derivation(#[from] SystemError),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
