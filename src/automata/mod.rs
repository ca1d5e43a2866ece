//! A reusable, table-driven finite-automaton construction kit.
//!
//! [`nfa`] builds a non-deterministic automaton with named states,
//! per-transition character labels, per-state enter actions, and a flag
//! bitmask. [`dfa`] collapses an [`Nfa`](nfa::Nfa) into an equivalent
//! [`Dfa`](dfa::Dfa) via powerset construction and drives it against an
//! input stream one symbol at a time. Neither module knows anything about
//! scripts or tokens — the [`scanner`](crate::scanner) module is the sole
//! consumer in this crate, but the kit itself is generic over the caller's
//! per-scan context type `C`, which enter actions receive alongside the
//! triggering symbol.

pub mod dfa;
pub mod nfa;
pub mod symbol;

pub use dfa::{Dfa, DfaCursor, powerset};
pub use nfa::{Nfa, NfaBuilder, StateId};
pub use symbol::Symbol;
