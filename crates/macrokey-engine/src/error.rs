//! Error types and result alias for the engine crate.
use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the macrokey engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A symbolic key token did not resolve to a virtual-key code.
    #[error("unresolved key token: {0:?}")]
    UnresolvedToken(String),

    /// A binding id is already registered.
    #[error("binding id {0} is already registered")]
    BindingConflict(u32),

    /// I/O failure while reading or writing the macro store.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The macro store file did not parse.
    #[error("macro store parse error: {0}")]
    Store(#[from] serde_json::Error),
}
