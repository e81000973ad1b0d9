//! # Command Syntaxes
//!
//! ## Overview
//!
//! This module contains the [Syntax] type: one declared shape of a command,
//! as an ordered sequence of argument slots. A command typically registers
//! several syntaxes, and the matcher tries each one independently against the
//! same input.
use std::sync::Arc;

use derive_more::{Display, From};

use crate::arguments::Argument;

/// Opaque identity tagging the match outcomes produced for a [Syntax].
///
/// Identities are assigned by whoever owns the syntax, such as a command
/// registry; the matcher never inspects them beyond copying them into the
/// records it produces.
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, PartialEq)]
pub struct SyntaxId(u64);

/// An ordered sequence of argument slots.
///
/// Syntaxes are immutable once built, and cheap to clone. The same argument
/// kind, or even the same [Arc], may fill more than one slot; slots are told
/// apart by their index.
#[derive(Clone, Debug)]
pub struct Syntax {
    id: SyntaxId,
    arguments: Arc<[Arc<dyn Argument>]>,
}

impl Syntax {
    /// Create a new syntax from its slots, in declared order.
    pub fn new<I>(id: SyntaxId, arguments: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Argument>>,
    {
        Syntax {
            id,
            arguments: arguments.into_iter().collect(),
        }
    }

    /// The identity this syntax tags its outcomes with.
    pub fn id(&self) -> SyntaxId {
        self.id
    }

    /// The argument slots, in declared order.
    pub fn arguments(&self) -> &[Arc<dyn Argument>] {
        &self.arguments
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.arguments.len()
    }
}

impl PartialEq for Syntax {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Syntax {}
