use thiserror::Error;

/// Errors raised by the storage core and the SQL-subset interpreter.
///
/// Network I/O failures are not a variant here; they belong to the
/// transport layer, which already has `std::io::Error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("duplicate")]
    DuplicateKey(String),

    #[error("table {0} already exists")]
    TableExists(String),

    #[error("table {0} does not exist")]
    TableMissing(String),

    #[error("null access: {0}")]
    NullAccess(String),
}

pub type Result<T> = std::result::Result<T, Error>;
