//! # commandkit
//!
//! ## Overview
//!
//! This crate resolves tokenized command lines against declared
//! [syntaxes](syntax::Syntax): ordered sequences of typed argument slots. A
//! command line either binds every slot to a parsed value, or produces a
//! precise record of where and why matching stopped, which callers can use
//! to drive autocompletion and error messages.
//!
//! The [matcher] module contains the matching algorithm and the outcome
//! accumulators that a dispatcher shares across the candidate syntaxes of a
//! single command. The [arguments] module defines the capability contract
//! that argument kinds implement, along with a handful of basic kinds.
//! Tokenization and quote handling of the raw input, command registration,
//! and what to do with a successful match are all left to the caller.

// Require docs for public APIs.
#![deny(missing_docs)]

#[macro_use]
mod util;

pub mod arguments;
pub mod errors;
pub mod matcher;
pub mod syntax;
