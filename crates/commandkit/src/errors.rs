//! # Error Types
//!
//! ## Overview
//!
//! This module contains the error type produced when an argument kind rejects the
//! input it was asked to parse.

/// Rejection of a candidate string by an [Argument](crate::arguments::Argument).
///
/// These are only ever produced by argument implementations. The matcher captures
/// them as diagnostic data for the slot being scanned; they never abort matching of
/// the remaining candidate syntaxes.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[error("{message}: {input:?}")]
pub struct SyntaxError {
    /// The candidate string that the argument could not understand.
    pub input: String,

    /// Short machine-readable tag for the rejection, such as `"invalid-integer"`.
    pub kind: String,

    /// Human-readable explanation of the rejection.
    pub message: String,
}

impl SyntaxError {
    /// Create a new error for the given candidate string.
    pub fn new<I, K, M>(input: I, kind: K, message: M) -> Self
    where
        I: Into<String>,
        K: Into<String>,
        M: Into<String>,
    {
        SyntaxError {
            input: input.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}
