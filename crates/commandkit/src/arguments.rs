//! # Command Arguments
//!
//! ## Overview
//!
//! This module contains the capability contract that every argument kind
//! implements, and a handful of basic kinds covering the common shapes a
//! command takes: bare words, bounded integers, booleans, quoted text, and
//! a catch-all remainder. Applications with richer grammars implement
//! [Argument] for their own kinds and hand them to the matcher the same way.
use std::any::Any;
use std::fmt::Debug;

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    combinator::{eof, value},
    error::{ErrorKind, ParseError},
    IResult,
};

use crate::errors::SyntaxError;

/// A parsed argument value.
///
/// Values are type-erased so that one [Syntax](crate::syntax::Syntax) can mix
/// argument kinds freely; consumers downcast via
/// [Bindings](crate::matcher::Bindings) to the concrete type the kind
/// documents.
pub type ArgumentValue = Box<dyn Any + Send + Sync>;

/// A trait for implementing command argument kinds.
///
/// Each implementation turns a candidate string into a typed value, or rejects
/// it with a [SyntaxError]. The two flags tell the matcher how candidates may
/// be built from the token stream; everything else about scanning order and
/// backtracking belongs to the matcher.
pub trait Argument: Debug + Send + Sync {
    /// Name under which this argument's value is bound.
    fn name(&self) -> &str;

    /// Parse a candidate string into a typed value.
    ///
    /// Rejections are routine during scanning, not exceptional: the matcher
    /// probes argument kinds with candidate strings that frequently will not
    /// parse.
    fn parse(&self, input: &str) -> Result<ArgumentValue, SyntaxError>;

    /// Whether a successful value may span multiple space-joined tokens.
    ///
    /// When true, the matcher grows the candidate string token by token until
    /// the kind accepts it or the tokens run out.
    fn allows_space(&self) -> bool {
        false
    }

    /// Whether this argument consumes every remaining token as one candidate
    /// string, parsed exactly once and never retried token by token.
    fn use_remaining(&self) -> bool {
        false
    }
}

/// A single-token word, optionally restricted to a fixed set.
///
/// Produces a [String].
#[derive(Clone, Debug)]
pub struct WordArgument {
    name: String,
    allowed: Vec<String>,
}

impl WordArgument {
    /// Accept any single word.
    pub fn new<N: Into<String>>(name: N) -> Self {
        WordArgument { name: name.into(), allowed: Vec::new() }
    }

    /// Accept only the given words.
    pub fn restricted<N, W, S>(name: N, words: W) -> Self
    where
        N: Into<String>,
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        WordArgument {
            name: name.into(),
            allowed: words.into_iter().map(Into::into).collect(),
        }
    }
}

impl Argument for WordArgument {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, input: &str) -> Result<ArgumentValue, SyntaxError> {
        if !self.allowed.is_empty() && !self.allowed.iter().any(|w| w == input) {
            return Err(SyntaxError::new(
                input,
                "unexpected-word",
                format!("expected one of {:?}", self.allowed),
            ));
        }

        Ok(Box::new(input.to_string()))
    }
}

/// A 64-bit integer with optional inclusive bounds.
///
/// Produces an [i64].
#[derive(Clone, Debug)]
pub struct IntegerArgument {
    name: String,
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerArgument {
    /// Accept any [i64].
    pub fn new<N: Into<String>>(name: N) -> Self {
        IntegerArgument { name: name.into(), min: None, max: None }
    }

    /// Reject values below `min`.
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Reject values above `max`.
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

impl Argument for IntegerArgument {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, input: &str) -> Result<ArgumentValue, SyntaxError> {
        let n = input.parse::<i64>().map_err(|_| {
            SyntaxError::new(input, "invalid-integer", "not a valid integer")
        })?;

        if let Some(min) = self.min {
            if n < min {
                let msg = format!("value is below the minimum of {min}");
                return Err(SyntaxError::new(input, "integer-too-low", msg));
            }
        }

        if let Some(max) = self.max {
            if n > max {
                let msg = format!("value is above the maximum of {max}");
                return Err(SyntaxError::new(input, "integer-too-high", msg));
            }
        }

        Ok(Box::new(n))
    }
}

/// A `true`/`false` flag.
///
/// Produces a [bool].
#[derive(Clone, Debug)]
pub struct BooleanArgument {
    name: String,
}

impl BooleanArgument {
    /// Accept `true` or `false`.
    pub fn new<N: Into<String>>(name: N) -> Self {
        BooleanArgument { name: name.into() }
    }
}

impl Argument for BooleanArgument {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, input: &str) -> Result<ArgumentValue, SyntaxError> {
        match input {
            "true" => Ok(Box::new(true)),
            "false" => Ok(Box::new(false)),
            _ => Err(SyntaxError::new(
                input,
                "invalid-boolean",
                "expected \"true\" or \"false\"",
            )),
        }
    }
}

/// Free-form text: either a bare single word, or a double-quoted string that
/// may span several tokens.
///
/// Inside quotes, `\"` and `\\` are unescaped. Produces a [String] holding the
/// unescaped content.
#[derive(Clone, Debug)]
pub struct QuotedTextArgument {
    name: String,
}

impl QuotedTextArgument {
    /// Accept a bare word or a quoted string.
    pub fn new<N: Into<String>>(name: N) -> Self {
        QuotedTextArgument { name: name.into() }
    }
}

impl Argument for QuotedTextArgument {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, input: &str) -> Result<ArgumentValue, SyntaxError> {
        if input.starts_with('"') {
            match parse_quoted_text(input) {
                Ok((_, text)) => Ok(Box::new(text)),
                Err(_) => Err(SyntaxError::new(
                    input,
                    "unbalanced-quote",
                    "expected a balanced double-quoted string",
                )),
            }
        } else if input.contains(' ') || input.contains('"') {
            Err(SyntaxError::new(
                input,
                "unquoted-text",
                "text spanning words must be double-quoted",
            ))
        } else {
            Ok(Box::new(input.to_string()))
        }
    }

    fn allows_space(&self) -> bool {
        true
    }
}

/// The rest of the command line, taken as-is.
///
/// Produces a [String] holding the remaining tokens joined by single spaces.
#[derive(Clone, Debug)]
pub struct RemainderArgument {
    name: String,
}

impl RemainderArgument {
    /// Accept whatever remains of the command line.
    pub fn new<N: Into<String>>(name: N) -> Self {
        RemainderArgument { name: name.into() }
    }
}

impl Argument for RemainderArgument {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, input: &str) -> Result<ArgumentValue, SyntaxError> {
        Ok(Box::new(input.to_string()))
    }

    fn use_remaining(&self) -> bool {
        true
    }
}

fn parse_quote(input: &str) -> IResult<&str, String> {
    if input.is_empty() {
        let err = ParseError::from_error_kind(input, ErrorKind::Eof);
        let err = nom::Err::Error(err);
        return Err(err);
    }

    let (input, _) = tag("\"")(input)?;
    let (input, text) = escaped_transform(
        is_not("\\\""),
        '\\',
        alt((value("\\", tag("\\")), value("\"", tag("\"")))),
    )(input)?;
    let (input, _) = tag("\"")(input)?;

    Ok((input, text))
}

fn parse_quoted_text(input: &str) -> IResult<&str, String> {
    let (input, text) = parse_quote(input)?;
    let (input, _) = eof(input)?;

    Ok((input, text))
}
