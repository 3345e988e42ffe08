//! ZON (Zig Object Notation) codec for request and response bodies.
//!
//! The zhost server speaks ZON rather than JSON. Documents are parsed into a
//! `serde_json::Value` tree and handed to serde from there, so any type that
//! derives `Serialize`/`Deserialize` can cross the wire.

mod escape;
mod parser;
mod printer;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("empty document")]
    Empty,

    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("unexpected trailing input at byte {offset}")]
    TrailingInput { offset: usize },

    #[error("document does not match the expected shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("value cannot be encoded: {0}")]
    Unencodable(#[source] serde_json::Error),
}

/// Encode any serializable value as ZON text.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    let tree = serde_json::to_value(value).map_err(CodecError::Unencodable)?;
    Ok(printer::print(&tree))
}

/// Decode ZON text into `T`.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    let tree = parser::parse(text)?;
    serde_json::from_value(tree).map_err(CodecError::Shape)
}
