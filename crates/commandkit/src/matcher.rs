//! # Syntax Matching
//!
//! ## Overview
//!
//! This module contains [match_syntax], which resolves a tokenized command
//! line against a single [Syntax], and the accumulator types that collect its
//! outcomes. A dispatcher holding several candidate syntaxes for one command
//! calls the matcher once per candidate with a shared pair of accumulators,
//! then inspects them: any [MatchSuccess] can be executed, and when none
//! exists, the deepest [MatchFailure] is the best base for a suggestion.
//!
//! Accumulators are built fresh for every command resolution and written to
//! strictly sequentially; they are not meant to be shared across concurrent
//! resolutions.
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::{
    arguments::{Argument, ArgumentValue},
    errors::SyntaxError,
    syntax::Syntax,
};

struct Binding {
    slot: usize,
    name: String,
    value: ArgumentValue,
}

/// The values bound by one fully matched [Syntax].
///
/// Entries are keyed by slot index, in slot order; the same argument kind may
/// fill several slots, so the index is the slot's identity. Lookups downcast
/// to the value type documented by the argument kind that filled the slot.
#[derive(Default)]
pub struct Bindings {
    entries: Vec<Binding>,
}

impl Bindings {
    fn push(&mut self, slot: usize, argument: &dyn Argument, value: ArgumentValue) {
        self.entries.push(Binding {
            slot,
            name: argument.name().to_string(),
            value,
        });
    }

    /// Fetch the value bound to the first slot with the given argument name.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|b| b.name == name)
            .and_then(|b| b.value.downcast_ref())
    }

    /// Fetch the value bound to the slot at the given index.
    pub fn get_slot<T: Any>(&self, slot: usize) -> Option<&T> {
        self.entries
            .iter()
            .find(|b| b.slot == slot)
            .and_then(|b| b.value.downcast_ref())
    }

    /// Number of bound slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slots are bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(slot index, argument name)` pairs in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.entries.iter().map(|b| (b.slot, b.name.as_str()))
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_map();

        for b in &self.entries {
            d.entry(&b.slot, &b.name);
        }

        d.finish()
    }
}

/// A fully matched syntax together with its bound values.
#[derive(Debug)]
pub struct MatchSuccess {
    /// The syntax that matched.
    pub syntax: Syntax,

    /// The value bound to each slot.
    pub bindings: Bindings,
}

/// Where and why a syntax stopped matching.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchFailure {
    /// The syntax that failed.
    pub syntax: Syntax,

    /// Index of the first unsatisfied slot.
    pub slot: usize,

    /// The rejection captured while scanning the unsatisfied slot.
    ///
    /// `None` when the slot failed without ever rejecting a candidate: a
    /// remainder slot reached with no tokens left, or a trailing slot that
    /// parsed its token but cannot absorb the leftover ones.
    pub error: Option<SyntaxError>,
}

/// Best-effort failure diagnostics, keyed by failing slot index.
///
/// One instance accumulates across every candidate syntax tried for a single
/// command resolution. The failing slot index counts how many slots were
/// satisfied first, so [MatchFailures::deepest] yields the attempt that came
/// closest to matching, which is the record to build suggestions from.
#[derive(Debug, Default)]
pub struct MatchFailures {
    records: BTreeMap<usize, MatchFailure>,
}

impl MatchFailures {
    /// Create an empty set of records.
    pub fn new() -> Self {
        MatchFailures::default()
    }

    /// Record a failure under its failing slot index.
    ///
    /// A later record at the same index replaces the earlier one: of the
    /// syntaxes failing at a given depth, the last one tried wins.
    pub fn record(&mut self, failure: MatchFailure) {
        self.records.insert(failure.slot, failure);
    }

    /// The recorded failure with the highest slot index.
    pub fn deepest(&self) -> Option<&MatchFailure> {
        self.records.values().next_back()
    }

    /// Number of slot indexes with a recorded failure.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no failure has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = &MatchFailure> + '_ {
        self.records.values()
    }
}

/// Match a single [Syntax] against a tokenized command line.
///
/// `tokens` holds the whitespace-delimited pieces of the raw input, in order;
/// splitting is the caller's responsibility, and each token must be non-empty.
/// A full match appends to `successes`; otherwise the first unsatisfied slot
/// records into `failures`, and any values bound before it are discarded with
/// the attempt. The function itself never fails: argument rejections are
/// captured as data, and matching one candidate never affects its siblings.
///
/// Slots are filled in declared order. An ordinary slot grows its candidate
/// string token by token: a slot that cannot span spaces settles the first
/// parse attempt, while one that can keeps extending after a rejection. A
/// trailing slot additionally refuses to leave tokens unconsumed, either by
/// greedily swallowing them (when it can span spaces) or by abandoning the
/// match. A remainder slot takes every remaining token, joined by single
/// spaces, in one parse attempt.
pub fn match_syntax(
    syntax: &Syntax,
    tokens: &[String],
    successes: Option<&mut Vec<MatchSuccess>>,
    failures: Option<&mut MatchFailures>,
) {
    let mut bindings = Bindings::default();
    let mut pos = 0;

    for (index, argument) in syntax.arguments().iter().enumerate() {
        let last = index + 1 == syntax.len();

        // the rejection captured while scanning this slot, if any
        let mut error = None;
        let mut satisfied = false;

        if argument.use_remaining() {
            if pos < tokens.len() {
                let candidate = tokens[pos..].join(" ");

                match argument.parse(&candidate) {
                    Ok(value) => {
                        bindings.push(index, argument.as_ref(), value);
                        satisfied = true;
                    },
                    Err(e) => {
                        error = Some(e);
                    },
                }
            }
        } else {
            let mut candidate = String::new();

            for (i, token) in tokens.iter().enumerate().skip(pos) {
                candidate.push_str(token);

                match argument.parse(&candidate) {
                    Ok(value) => {
                        if last && i + 1 < tokens.len() {
                            // Tokens are left over after the final slot: a
                            // slot that cannot span spaces has no way to
                            // absorb them, and one that can must keep growing
                            // instead of settling for this candidate.
                            if !argument.allows_space() {
                                break;
                            }

                            candidate.push(' ');
                            continue;
                        }

                        bindings.push(index, argument.as_ref(), value);
                        pos = i + 1;
                        satisfied = true;
                        break;
                    },
                    Err(e) => {
                        error = Some(e);

                        if !argument.allows_space() {
                            break;
                        }

                        candidate.push(' ');
                    },
                }
            }
        }

        if !satisfied {
            if let Some(failures) = failures {
                failures.record(MatchFailure { syntax: syntax.clone(), slot: index, error });
            }

            return;
        }
    }

    if let Some(successes) = successes {
        successes.push(MatchSuccess { syntax: syntax.clone(), bindings });
    }
}

/// The collected outcomes of resolving one command line against an ordered
/// set of candidate syntaxes.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Every syntax that fully matched, in trial order.
    ///
    /// Choosing among several successes (e.g. first registered wins) is the
    /// caller's policy.
    pub successes: Vec<MatchSuccess>,

    /// Diagnostics from the syntaxes that did not match.
    pub failures: MatchFailures,
}

impl Resolution {
    /// The deepest failure among the attempted syntaxes.
    ///
    /// Present whenever at least one candidate was tried and failed.
    pub fn deepest_failure(&self) -> Option<&MatchFailure> {
        self.failures.deepest()
    }
}

/// Match every candidate syntax against the same tokenized command line.
///
/// Candidates are tried strictly sequentially, in the order given, writing
/// into one fresh pair of accumulators. Every resolution gets its own
/// [Resolution]; reusing one across resolutions mixes their diagnostics.
pub fn resolve(syntaxes: &[Syntax], tokens: &[String]) -> Resolution {
    let mut resolution = Resolution::default();

    for syntax in syntaxes {
        match_syntax(
            syntax,
            tokens,
            Some(&mut resolution.successes),
            Some(&mut resolution.failures),
        );
    }

    resolution
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::arguments::{
        IntegerArgument,
        QuotedTextArgument,
        RemainderArgument,
        WordArgument,
    };
    use crate::syntax::SyntaxId;

    macro_rules! syntax {
        ( $id: expr $( , $arg: expr )* ) => {
            Syntax::new(SyntaxId::from($id), [ $( Arc::new($arg) as Arc<dyn Argument>, )* ])
        };
    }

    /// Accepts exactly one phrase, which may span tokens.
    #[derive(Debug)]
    struct ExactPhrase {
        name: &'static str,
        phrase: &'static str,
    }

    impl Argument for ExactPhrase {
        fn name(&self) -> &str {
            self.name
        }

        fn parse(&self, input: &str) -> Result<ArgumentValue, SyntaxError> {
            if input == self.phrase {
                Ok(Box::new(input.to_string()))
            } else {
                Err(SyntaxError::new(input, "wrong-phrase", "not the expected phrase"))
            }
        }

        fn allows_space(&self) -> bool {
            true
        }
    }

    /// Accepts anything, spanning tokens.
    #[derive(Debug)]
    struct AnyText {
        name: &'static str,
    }

    impl Argument for AnyText {
        fn name(&self) -> &str {
            self.name
        }

        fn parse(&self, input: &str) -> Result<ArgumentValue, SyntaxError> {
            Ok(Box::new(input.to_string()))
        }

        fn allows_space(&self) -> bool {
            true
        }
    }

    /// Rejects everything, counting how often it was asked.
    #[derive(Debug)]
    struct RejectAll {
        name: &'static str,
        calls: AtomicUsize,
    }

    impl RejectAll {
        fn new(name: &'static str) -> Self {
            RejectAll { name, calls: AtomicUsize::new(0) }
        }
    }

    impl Argument for RejectAll {
        fn name(&self) -> &str {
            self.name
        }

        fn parse(&self, input: &str) -> Result<ArgumentValue, SyntaxError> {
            self.calls.fetch_add(1, Ordering::Relaxed);

            Err(SyntaxError::new(input, "rejected", "rejects everything"))
        }
    }

    fn run(syntax: &Syntax, tokens: &[String]) -> (Vec<MatchSuccess>, MatchFailures) {
        let mut successes = Vec::new();
        let mut failures = MatchFailures::new();
        match_syntax(syntax, tokens, Some(&mut successes), Some(&mut failures));

        (successes, failures)
    }

    #[test]
    fn test_exact_match() {
        let syntax = syntax!(1, WordArgument::new("action"), IntegerArgument::new("amount"));
        let (successes, failures) = run(&syntax, &strs!["give", "5"]);

        assert_eq!(successes.len(), 1);
        assert!(failures.is_empty());

        let bindings = &successes[0].bindings;
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings.get::<String>("action"), Some(&"give".to_string()));
        assert_eq!(bindings.get::<i64>("amount"), Some(&5));
    }

    #[test]
    fn test_phrase_does_not_swallow_following_slot() {
        let phrase = ExactPhrase { name: "phrase", phrase: "hello world" };
        let syntax = syntax!(1, phrase, WordArgument::new("tail"));
        let (successes, failures) = run(&syntax, &strs!["hello", "world", "done"]);

        assert_eq!(successes.len(), 1);
        assert!(failures.is_empty());

        let bindings = &successes[0].bindings;
        assert_eq!(bindings.get::<String>("phrase"), Some(&"hello world".to_string()));
        assert_eq!(bindings.get::<String>("tail"), Some(&"done".to_string()));
    }

    #[test]
    fn test_greedy_trailing_slot() {
        let syntax = syntax!(1, WordArgument::new("action"), AnyText { name: "message" });
        let (successes, failures) = run(&syntax, &strs!["msg", "a", "b", "c"]);

        assert_eq!(successes.len(), 1);
        assert!(failures.is_empty());

        let bindings = &successes[0].bindings;
        assert_eq!(bindings.get::<String>("message"), Some(&"a b c".to_string()));
    }

    #[test]
    fn test_quoted_text_spans_tokens() {
        let syntax = syntax!(1, QuotedTextArgument::new("text"), WordArgument::new("tail"));
        let (successes, failures) = run(&syntax, &strs!["\"hello", "world\"", "done"]);

        assert_eq!(successes.len(), 1);
        assert!(failures.is_empty());

        let bindings = &successes[0].bindings;
        assert_eq!(bindings.get::<String>("text"), Some(&"hello world".to_string()));
        assert_eq!(bindings.get::<String>("tail"), Some(&"done".to_string()));
    }

    #[test]
    fn test_remainder_consumes_rest() {
        let syntax = syntax!(1, WordArgument::new("action"), RemainderArgument::new("message"));
        let (successes, failures) = run(&syntax, &strs!["say", "a", "b", "c"]);

        assert_eq!(successes.len(), 1);
        assert!(failures.is_empty());

        let bindings = &successes[0].bindings;
        assert_eq!(bindings.get::<String>("message"), Some(&"a b c".to_string()));
    }

    #[test]
    fn test_remainder_without_tokens_fails_without_error() {
        let syntax = syntax!(1, WordArgument::new("action"), RemainderArgument::new("message"));
        let (successes, failures) = run(&syntax, &strs!["say"]);

        assert!(successes.is_empty());

        let failure = failures.deepest().unwrap();
        assert_eq!(failure.slot, 1);
        assert_eq!(failure.error, None);
    }

    #[test]
    fn test_single_token_slot_fails_once() {
        let reject = Arc::new(RejectAll::new("amount"));
        let syntax = Syntax::new(
            SyntaxId::from(1),
            [reject.clone() as Arc<dyn Argument>, Arc::new(WordArgument::new("w")) as _],
        );
        let (successes, failures) = run(&syntax, &strs!["abc", "5", "6"]);

        assert!(successes.is_empty());
        assert_eq!(reject.calls.load(Ordering::Relaxed), 1);

        let failure = failures.deepest().unwrap();
        assert_eq!(failure.slot, 0);
        assert_eq!(failure.error.as_ref().unwrap().input, "abc");
    }

    #[test]
    fn test_failure_halts_later_slots() {
        let tail = Arc::new(RejectAll::new("tail"));
        let syntax = Syntax::new(
            SyntaxId::from(1),
            [Arc::new(IntegerArgument::new("amount")) as _, tail.clone() as _],
        );
        let (successes, failures) = run(&syntax, &strs!["abc", "x"]);

        assert!(successes.is_empty());
        assert_eq!(tail.calls.load(Ordering::Relaxed), 0);

        let failure = failures.deepest().unwrap();
        assert_eq!(failure.slot, 0);
        assert_eq!(failure.error.as_ref().unwrap().kind, "invalid-integer");
    }

    #[test]
    fn test_trailing_slot_rejects_leftover_tokens() {
        let syntax = syntax!(1, WordArgument::new("action"), IntegerArgument::new("amount"));
        let (successes, failures) = run(&syntax, &strs!["give", "5", "extra"]);

        assert!(successes.is_empty());

        // The integer itself parsed; the leftover token is what sank the
        // attempt, so there is no rejection to report.
        let failure = failures.deepest().unwrap();
        assert_eq!(failure.slot, 1);
        assert_eq!(failure.error, None);
    }

    #[test]
    fn test_too_few_tokens() {
        let syntax = syntax!(1, WordArgument::new("action"), IntegerArgument::new("amount"));
        let (successes, failures) = run(&syntax, &strs!["give"]);

        assert!(successes.is_empty());

        let failure = failures.deepest().unwrap();
        assert_eq!(failure.slot, 1);
        assert_eq!(failure.error, None);
    }

    #[test]
    fn test_empty_syntax_matches_vacuously() {
        let syntax = syntax!(1);
        let (successes, failures) = run(&syntax, &strs!["anything"]);

        assert_eq!(successes.len(), 1);
        assert!(successes[0].bindings.is_empty());
        assert!(failures.is_empty());
    }

    #[test]
    fn test_repeated_argument_kinds() {
        let syntax = syntax!(1, IntegerArgument::new("x"), IntegerArgument::new("x"));
        let (successes, _) = run(&syntax, &strs!["1", "2"]);

        let bindings = &successes[0].bindings;
        assert_eq!(bindings.get::<i64>("x"), Some(&1));
        assert_eq!(bindings.get_slot::<i64>(0), Some(&1));
        assert_eq!(bindings.get_slot::<i64>(1), Some(&2));

        let slots: Vec<_> = bindings.slots().collect();
        assert_eq!(slots, vec![(0, "x"), (1, "x")]);
    }

    #[test]
    fn test_deepest_failure_selection() {
        let shallow = syntax!(1, IntegerArgument::new("a"), WordArgument::new("b"));
        let deep = syntax!(
            2,
            WordArgument::new("a"),
            WordArgument::new("b"),
            IntegerArgument::new("c")
        );

        let tokens = strs!["give", "stone", "lots"];
        let resolution = resolve(&[shallow, deep], &tokens);

        assert!(resolution.successes.is_empty());
        assert_eq!(resolution.failures.len(), 2);

        let failure = resolution.deepest_failure().unwrap();
        assert_eq!(failure.syntax.id(), SyntaxId::from(2));
        assert_eq!(failure.slot, 2);
        assert_eq!(failure.error.as_ref().unwrap().kind, "invalid-integer");
    }

    #[test]
    fn test_failure_overwrite_at_same_depth() {
        let first = syntax!(1, IntegerArgument::new("a"));
        let second = syntax!(2, RejectAll::new("flag"));

        let resolution = resolve(&[first, second], &strs!["abc"]);

        // Both candidates failed at slot 0; only the one tried last remains.
        assert_eq!(resolution.failures.len(), 1);

        let failure = resolution.deepest_failure().unwrap();
        assert_eq!(failure.syntax.id(), SyntaxId::from(2));
        assert_eq!(failure.error.as_ref().unwrap().kind, "rejected");
    }

    #[test]
    fn test_multiple_successes_kept_in_trial_order() {
        let one = syntax!(1, AnyText { name: "text" });
        let two = syntax!(2, WordArgument::new("word"));

        let resolution = resolve(&[one, two], &strs!["hi"]);

        assert_eq!(resolution.successes.len(), 2);
        assert_eq!(resolution.successes[0].syntax.id(), SyntaxId::from(1));
        assert_eq!(resolution.successes[1].syntax.id(), SyntaxId::from(2));
        assert!(resolution.failures.is_empty());
    }

    #[test]
    fn test_probe_without_sinks() {
        let syntax = syntax!(1, WordArgument::new("action"));

        // No sinks to write to; the call is still well-defined.
        match_syntax(&syntax, &strs!["give"], None, None);
        match_syntax(&syntax, &strs![], None, None);
    }

    #[test]
    fn test_deterministic_outcomes() {
        let syntax = syntax!(1, WordArgument::new("a"), IntegerArgument::new("b"));
        let tokens = strs!["give", "nan"];

        let (_, first) = run(&syntax, &tokens);
        let (_, second) = run(&syntax, &tokens);

        assert_eq!(first.deepest(), second.deepest());
        assert_eq!(first.len(), second.len());

        let ok = strs!["give", "3"];
        let (first, _) = run(&syntax, &ok);
        let (second, _) = run(&syntax, &ok);

        assert_eq!(first[0].bindings.get::<i64>("b"), second[0].bindings.get::<i64>("b"));
        assert_eq!(first[0].syntax, second[0].syntax);
    }
}
