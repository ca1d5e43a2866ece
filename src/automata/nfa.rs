//! Component A: the mutable non-deterministic finite automaton and its
//! fluent builder.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::automata::symbol::Symbol;
use crate::errors::AutomatonError;

/// Stable handle to an NFA state, valid for the automaton's lifetime.
pub type StateId = usize;

/// A function of `(symbol, context) -> ()` executed when the automaton
/// transitions into the state it is attached to. Enter actions are
/// reference-counted rather than owned outright so that powerset
/// construction can compose several of them (one per collapsed NFA state)
/// into a single action on the resulting DFA state without cloning
/// whatever state the closures capture.
pub type EnterAction<C> = Rc<dyn Fn(Symbol, &mut C)>;

#[derive(Clone)]
struct NfaState<C> {
    name: Option<String>,
    accepting: bool,
    flags: u32,
    enter_action: Option<EnterAction<C>>,
    /// Transitions out of this state: a symbol maps to a *set* of target
    /// states, since the automaton is non-deterministic.
    transitions: Vec<(Symbol, StateId)>,
}

impl<C> NfaState<C> {
    fn new() -> Self {
        Self {
            name: None,
            accepting: false,
            flags: 0,
            enter_action: None,
            transitions: Vec::new(),
        }
    }
}

/// A non-deterministic finite automaton with named states, per-state enter
/// actions and flags, built by [`NfaBuilder`].
pub struct Nfa<C> {
    states: Vec<NfaState<C>>,
    start: StateId,
    alphabet: BTreeSet<char>,
}

impl<C> Nfa<C> {
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    /// The alphabet derived from actually-used transition labels. The
    /// end-of-source sentinel is implicit and not enumerated here; callers
    /// that need to probe it use [`Symbol::Eos`] directly.
    pub fn alphabet(&self) -> impl Iterator<Item = char> + '_ {
        self.alphabet.iter().copied()
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.states[state].accepting
    }

    pub fn flags(&self, state: StateId) -> u32 {
        self.states[state].flags
    }

    pub fn enter_action(&self, state: StateId) -> Option<&EnterAction<C>> {
        self.states[state].enter_action.as_ref()
    }

    pub fn name(&self, state: StateId) -> Option<&str> {
        self.states[state].name.as_deref()
    }

    /// Target states reachable from `state` on `symbol`.
    pub fn transitions_on(&self, state: StateId, symbol: Symbol) -> impl Iterator<Item = StateId> + '_ {
        self.states[state]
            .transitions
            .iter()
            .filter(move |(s, _)| *s == symbol)
            .map(|(_, target)| *target)
    }

    pub fn all_transitions(&self, state: StateId) -> impl Iterator<Item = (Symbol, StateId)> + '_ {
        self.states[state].transitions.iter().copied()
    }
}

/// Fluent builder for [`Nfa`]. A "current state" cursor, opened with
/// [`begin_state`](Self::begin_state) and implicitly closed by the next
/// `begin_state` call (or explicitly via [`end_state`](Self::end_state)),
/// lets construction code read as a sequence of `begin_state(h) ... ` blocks
/// without threading the handle through every call.
pub struct NfaBuilder<C> {
    states: Vec<NfaState<C>>,
    alphabet: BTreeSet<char>,
    start: Option<StateId>,
    current: Option<StateId>,
}

impl<C> Default for NfaBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> NfaBuilder<C> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            alphabet: BTreeSet::new(),
            start: None,
            current: None,
        }
    }

    /// Creates a new, empty state and returns its handle.
    pub fn create_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(NfaState::new());
        id
    }

    /// Opens `state` as the current state for subsequent fluent calls.
    pub fn begin_state(&mut self, state: StateId) -> Result<&mut Self, AutomatonError> {
        self.check_state(state)?;
        self.current = Some(state);
        Ok(self)
    }

    /// Closes the current state cursor.
    pub fn end_state(&mut self) -> &mut Self {
        self.current = None;
        self
    }

    pub fn set_start(&mut self, state: StateId) -> Result<&mut Self, AutomatonError> {
        self.check_state(state)?;
        self.start = Some(state);
        Ok(self)
    }

    pub fn set_accepting(&mut self, accepting: bool) -> Result<&mut Self, AutomatonError> {
        let state = self.current_state()?;
        self.states[state].accepting = accepting;
        Ok(self)
    }

    pub fn set_flag_bits(&mut self, bits: u32) -> Result<&mut Self, AutomatonError> {
        let state = self.current_state()?;
        self.states[state].flags |= bits;
        Ok(self)
    }

    /// Clears the given bits from the current state's flag mask.
    ///
    /// The original C++ source's `ClearFlag` ORs with the *complement* of
    /// the mask instead of AND-ing (see `spec.md` §9's flagged likely bug);
    /// we implement the evidently-intended AND-based clear here rather than
    /// reproduce the bug.
    pub fn clear_flag_bits(&mut self, bits: u32) -> Result<&mut Self, AutomatonError> {
        let state = self.current_state()?;
        self.states[state].flags &= !bits;
        Ok(self)
    }

    pub fn set_enter_action(&mut self, action: EnterAction<C>) -> Result<&mut Self, AutomatonError> {
        let state = self.current_state()?;
        self.states[state].enter_action = Some(action);
        Ok(self)
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<&mut Self, AutomatonError> {
        let state = self.current_state()?;
        self.states[state].name = Some(name.into());
        Ok(self)
    }

    /// Adds a transition from the current state to `target` on `symbol`.
    /// Also records `symbol` in the automaton-level alphabet.
    pub fn add_transition(&mut self, symbol: Symbol, target: StateId) -> Result<&mut Self, AutomatonError> {
        let state = self.current_state()?;
        self.check_state(target)?;
        if let Symbol::Char(c) = symbol {
            self.alphabet.insert(c);
        }
        self.states[state].transitions.push((symbol, target));
        Ok(self)
    }

    /// Adds a transition from an explicit source state, bypassing the
    /// current-state cursor. Useful when wiring together sub-fragments
    /// built independently (e.g. a keyword-literal chain overlaid on the
    /// identifier automaton).
    pub fn add_transition_from(
        &mut self,
        from: StateId,
        symbol: Symbol,
        target: StateId,
    ) -> Result<&mut Self, AutomatonError> {
        self.check_state(from)?;
        self.check_state(target)?;
        if let Symbol::Char(c) = symbol {
            self.alphabet.insert(c);
        }
        self.states[from].transitions.push((symbol, target));
        Ok(self)
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.alphabet.clear();
        self.start = None;
        self.current = None;
    }

    /// Finalizes construction into an immutable [`Nfa`].
    pub fn build(self) -> Result<Nfa<C>, AutomatonError> {
        let start = self.start.ok_or(AutomatonError::NoStartState)?;
        Ok(Nfa {
            states: self.states,
            start,
            alphabet: self.alphabet,
        })
    }

    fn current_state(&self) -> Result<StateId, AutomatonError> {
        self.current.ok_or(AutomatonError::NoCurrentState)
    }

    fn check_state(&self, state: StateId) -> Result<(), AutomatonError> {
        if state < self.states.len() {
            Ok(())
        } else {
            Err(AutomatonError::UnknownState(state))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluent_construction_produces_reachable_states() {
        let mut b: NfaBuilder<()> = NfaBuilder::new();
        let s0 = b.create_state();
        let s1 = b.create_state();
        b.set_start(s0).unwrap();
        b.begin_state(s0).unwrap().add_transition(Symbol::Char('a'), s1).unwrap();
        b.begin_state(s1).unwrap().set_accepting(true).unwrap();
        let nfa = b.build().unwrap();

        assert_eq!(nfa.start(), s0);
        assert!(nfa.is_accepting(s1));
        assert!(!nfa.is_accepting(s0));
        assert_eq!(nfa.alphabet().collect::<Vec<_>>(), vec!['a']);
        assert_eq!(
            nfa.transitions_on(s0, Symbol::Char('a')).collect::<Vec<_>>(),
            vec![s1]
        );
    }

    #[test]
    fn begin_state_on_unknown_handle_errors() {
        let mut b: NfaBuilder<()> = NfaBuilder::new();
        assert_eq!(b.begin_state(4).unwrap_err(), AutomatonError::UnknownState(4));
    }

    #[test]
    fn operating_without_current_state_errors() {
        let mut b: NfaBuilder<()> = NfaBuilder::new();
        b.create_state();
        assert_eq!(
            b.set_accepting(true).unwrap_err(),
            AutomatonError::NoCurrentState
        );
    }

    #[test]
    fn build_without_start_errors() {
        let mut b: NfaBuilder<()> = NfaBuilder::new();
        b.create_state();
        assert_eq!(b.build().unwrap_err(), AutomatonError::NoStartState);
    }
}
