use thiserror::Error;

/// Failure to parse a raw on-chain byte field. The event that carried the
/// field is skipped; nothing is persisted.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("input too short: need at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("unsupported header version {0}")]
    Version(u8),
    #[error("value out of range: {0}")]
    OutOfRange(String),
    #[error("malformed abi payload: {0}")]
    Abi(String),
}

/// Missing entry in the static chain tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown chain id {0}")]
    UnknownChainId(u64),
    #[error("unknown endpoint id {0}")]
    UnknownEid(u32),
    #[error("unknown cctp domain {0}")]
    UnknownDomain(u32),
    #[error("chain {0} has no {1} identifier configured")]
    MissingIdentifier(u64, &'static str),
}

/// Failure of the backing entity store. Propagated to the subscriber so the
/// event can be redelivered; handlers are idempotent across redelivery.
#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(#[from] pub anyhow::Error);

/// Unified handler error. Everything except `Store` is skippable: the event
/// is dropped, a structured record goes to the log, and a metric is
/// incremented.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unexpected state: {0}")]
    State(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Label used by the skip metrics and log records.
    pub fn reason(&self) -> &'static str {
        match self {
            EngineError::Decode(_) => "decode",
            EngineError::Config(_) => "config",
            EngineError::State(_) => "state",
            EngineError::Store(_) => "store",
        }
    }
}
