//! Components B and C: powerset (subset) construction and the DFA runtime.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::automata::nfa::{EnterAction, Nfa, StateId};
use crate::automata::symbol::Symbol;
use crate::errors::AutomatonError;

struct DfaState<C> {
    accepting: bool,
    flags: u32,
    enter_action: Option<EnterAction<C>>,
    transitions: HashMap<Symbol, StateId>,
}

/// A deterministic finite automaton produced by [`powerset`]. Every state
/// has at most one target per symbol; a missing entry means "dead end" —
/// there is no need to materialize an explicit sink state, since the
/// scanner reacts to "no further transition" the same way regardless of
/// whether the absence is a genuine sink or just an unconfigured symbol.
pub struct Dfa<C> {
    states: Vec<DfaState<C>>,
    start: StateId,
}

impl<C> Dfa<C> {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.states[state].accepting
    }

    pub fn flags(&self, state: StateId) -> u32 {
        self.states[state].flags
    }

    /// A state is a dead end when it accepts nothing and has nowhere left
    /// to go: the scanner uses this to report "no valid token starts here"
    /// distinctly from ordinary maximal-munch termination.
    pub fn is_dead_end(&self, state: StateId) -> bool {
        !self.states[state].accepting && self.states[state].transitions.is_empty()
    }

    /// Looks up the next state for `(state, symbol)`, or `None` if there is
    /// no such transition (an implicit dead end).
    pub fn step_lookup(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.states[state].transitions.get(&symbol).copied()
    }
}

/// A cursor driving a [`Dfa`] against a stream of symbols one at a time,
/// invoking enter actions on every transition (component C, "DFA runtime").
pub struct DfaCursor<'a, C> {
    dfa: &'a Dfa<C>,
    state: StateId,
}

impl<'a, C> DfaCursor<'a, C> {
    pub fn new(dfa: &'a Dfa<C>) -> Self {
        Self {
            dfa,
            state: dfa.start,
        }
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = self.dfa.start;
    }

    pub fn is_accepting(&self) -> bool {
        self.dfa.is_accepting(self.state)
    }

    pub fn is_dead_end(&self) -> bool {
        self.dfa.is_dead_end(self.state)
    }

    /// Attempts to consume `symbol`. On success, moves the cursor to the
    /// target state, runs its enter action against `ctx`, and returns
    /// whether the new state accepts. On failure (no transition), the
    /// cursor does not move and `None` is returned.
    pub fn process(&mut self, symbol: Symbol, ctx: &mut C) -> Option<bool> {
        let next = self.dfa.step_lookup(self.state, symbol)?;
        self.state = next;
        if let Some(action) = self.dfa.states[next].enter_action.clone() {
            action(symbol, ctx);
        }
        Some(self.dfa.states[next].accepting)
    }
}

fn set_key(set: &BTreeSet<StateId>) -> Vec<StateId> {
    set.iter().copied().collect()
}

/// Converts an NFA into an equivalent DFA via subset construction (see
/// §4.B). The DFA's start state is the singleton subset `{nfa.start()}`;
/// states are discovered breadth-first by following every alphabet symbol
/// (plus [`Symbol::Eos`]) out of each discovered subset until a pass adds
/// neither a state nor a transition.
///
/// Accepting, flags, and enter actions for a collapsed subset are combined
/// per §4.B: accepting is true iff any member is accepting, flags are
/// OR-ed, and enter actions are composed left-to-right in NFA state
/// insertion order (zero actions -> `None`, one -> that action unchanged,
/// more -> a closure invoking each in turn). Composing in insertion order
/// means a state added *later* during NFA construction (e.g. a keyword
/// literal overlaid on top of the generic identifier path) has its action
/// run *after* the earlier one, so a plain last-write-wins token-kind
/// assignment inside the action naturally gives the later addition
/// priority — see `scanner::builder` for where this is exploited.
pub fn powerset<C: 'static>(nfa: &Nfa<C>) -> Result<Dfa<C>, AutomatonError> {
    let alphabet: Vec<Symbol> = nfa
        .alphabet()
        .map(Symbol::Char)
        .chain(std::iter::once(Symbol::Eos))
        .collect();

    let mut subset_ids: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
    let mut queue: VecDeque<BTreeSet<StateId>> = VecDeque::new();

    let start_subset: BTreeSet<StateId> = std::iter::once(nfa.start()).collect();
    subset_ids.insert(set_key(&start_subset), 0);
    queue.push_back(start_subset);

    let mut pending_transitions: Vec<(StateId, Symbol, Vec<StateId>)> = Vec::new();

    while let Some(subset) = queue.pop_front() {
        let from_id = subset_ids[&set_key(&subset)];
        for &symbol in &alphabet {
            let target_subset = move_subset(nfa, &subset, symbol);
            if target_subset.is_empty() {
                continue;
            }
            let key = set_key(&target_subset);
            if !subset_ids.contains_key(&key) {
                let id = subset_ids.len();
                subset_ids.insert(key.clone(), id);
                queue.push_back(target_subset.clone());
            }
            pending_transitions.push((from_id, symbol, key));
        }
    }

    let mut subsets_by_id: Vec<Vec<StateId>> = vec![Vec::new(); subset_ids.len()];
    for (key, &id) in &subset_ids {
        subsets_by_id[id] = key.clone();
    }

    let mut states: Vec<DfaState<C>> = Vec::with_capacity(subsets_by_id.len());
    for subset in &subsets_by_id {
        let accepting = subset.iter().any(|&s| nfa.is_accepting(s));
        let flags = subset.iter().fold(0u32, |acc, &s| acc | nfa.flags(s));
        let actions: Vec<EnterAction<C>> = subset
            .iter()
            .filter_map(|&s| nfa.enter_action(s).cloned())
            .collect();
        let combined: Option<EnterAction<C>> = match actions.len() {
            0 => None,
            1 => Some(actions.into_iter().next().unwrap()),
            _ => {
                let actions: Rc<[EnterAction<C>]> = actions.into();
                Some(Rc::new(move |symbol, ctx: &mut C| {
                    for action in actions.iter() {
                        action(symbol, ctx);
                    }
                }) as EnterAction<C>)
            }
        };
        states.push(DfaState {
            accepting,
            flags,
            enter_action: combined,
            transitions: HashMap::new(),
        });
    }

    for (from, symbol, target_key) in pending_transitions {
        let to = subset_ids[&target_key];
        if let Some(&existing) = states[from].transitions.get(&symbol) {
            if existing != to {
                return Err(AutomatonError::Ambiguous {
                    state: from,
                    symbol: symbol.to_string(),
                    existing,
                    new: to,
                });
            }
        } else {
            states[from].transitions.insert(symbol, to);
        }
    }

    Ok(Dfa { states, start: 0 })
}

fn move_subset<C>(nfa: &Nfa<C>, subset: &BTreeSet<StateId>, symbol: Symbol) -> BTreeSet<StateId> {
    let mut result = HashSet::new();
    for &state in subset {
        for target in nfa.transitions_on(state, symbol) {
            result.insert(target);
        }
    }
    result.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::nfa::NfaBuilder;

    fn literal_nfa(word: &str) -> Nfa<()> {
        let mut b: NfaBuilder<()> = NfaBuilder::new();
        let mut prev = b.create_state();
        b.set_start(prev).unwrap();
        for ch in word.chars() {
            let next = b.create_state();
            b.begin_state(prev).unwrap().add_transition(Symbol::Char(ch), next).unwrap();
            prev = next;
        }
        b.begin_state(prev).unwrap().set_accepting(true).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn powerset_accepts_same_language_as_nfa() {
        let nfa = literal_nfa("ab");
        let dfa = powerset(&nfa).unwrap();
        let mut cursor = DfaCursor::new(&dfa);
        let mut ctx = ();
        assert_eq!(cursor.process(Symbol::Char('a'), &mut ctx), Some(false));
        assert_eq!(cursor.process(Symbol::Char('b'), &mut ctx), Some(true));
    }

    #[test]
    fn powerset_rejects_divergent_input() {
        let nfa = literal_nfa("ab");
        let dfa = powerset(&nfa).unwrap();
        let mut cursor = DfaCursor::new(&dfa);
        let mut ctx = ();
        assert_eq!(cursor.process(Symbol::Char('x'), &mut ctx), None);
    }

    #[test]
    fn branching_nfa_merges_accepting_subsets() {
        // start --a--> s1 (accept); start --a--> s2 (accept)
        let mut b: NfaBuilder<()> = NfaBuilder::new();
        let start = b.create_state();
        let s1 = b.create_state();
        let s2 = b.create_state();
        b.set_start(start).unwrap();
        b.begin_state(start).unwrap().add_transition(Symbol::Char('a'), s1).unwrap();
        b.begin_state(start).unwrap().add_transition(Symbol::Char('a'), s2).unwrap();
        b.begin_state(s1).unwrap().set_accepting(true).unwrap();
        b.begin_state(s2).unwrap().set_accepting(true).unwrap();
        let nfa = b.build().unwrap();

        let dfa = powerset(&nfa).unwrap();
        let mut cursor = DfaCursor::new(&dfa);
        let mut ctx = ();
        assert_eq!(cursor.process(Symbol::Char('a'), &mut ctx), Some(true));
    }

    #[test]
    fn dead_end_state_has_no_transitions_and_does_not_accept() {
        let nfa = literal_nfa("a");
        let dfa = powerset(&nfa).unwrap();
        // Drive off the end of the only path ("a" consumed, then another 'a').
        let mut cursor = DfaCursor::new(&dfa);
        let mut ctx = ();
        cursor.process(Symbol::Char('a'), &mut ctx);
        assert!(cursor.is_accepting());
        assert_eq!(cursor.process(Symbol::Char('a'), &mut ctx), None);
    }
}
