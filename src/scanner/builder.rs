//! Component D: the scanner builder. Turns a declarative [`ScannerSpec`]
//! into three compiled automata — the main tokenizer, a block-comment
//! eater, and a line-comment eater — via the reusable `automata` kit.
//!
//! The automaton kit only knows about concrete `(state, char)` transitions,
//! so an alphabet described by an arbitrary [`CharSet`] predicate (e.g.
//! "any alphabetic character") has to be enumerated against some finite
//! candidate pool before it can be wired into the NFA. We enumerate against
//! ASCII letters/digits/underscore for identifiers and keywords, and against
//! printable ASCII plus common whitespace for string bodies and comment
//! bodies. Source text outside those pools will not scan as part of an
//! identifier or string — a deliberate, documented restriction rather than
//! an oversight (see `DESIGN.md`).

use std::collections::HashMap;
use std::rc::Rc;

use crate::automata::{Dfa, NfaBuilder, StateId, Symbol, powerset};
use crate::errors::{AutomatonError, ScannerBuildError};
use crate::scanner::charset::CharSet;
use crate::scanner::command::{Command, ScanContext};
use crate::scanner::tokens::TokenKind;

const IDENT_CANDIDATES: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";
const WHITESPACE_CANDIDATES: &str = " \t\r\n";
const DIGIT_CANDIDATES: &str = "0123456789";
const HEX_DIGIT_CANDIDATES: &str = "0123456789abcdefABCDEF";
/// Printable ASCII plus the usual whitespace, used to enumerate string- and
/// comment-body alphabets.
const BODY_CANDIDATES_LOW: u32 = 0x20;
const BODY_CANDIDATES_HIGH: u32 = 0x7e;

fn body_candidates() -> impl Iterator<Item = char> {
    (BODY_CANDIDATES_LOW..=BODY_CANDIDATES_HIGH)
        .filter_map(char::from_u32)
        .chain(['\t', '\n'])
}

/// Declarative description of a scanner, assembled by the language
/// front-end before being handed to [`ScannerBuilder::build`].
pub struct ScannerSpec {
    pub ident_start: CharSet,
    pub ident_continue: CharSet,
    pub ident_kind: TokenKind,
    pub whitespace: CharSet,
    pub int_kind: TokenKind,
    pub real_kind: TokenKind,
    pub illegal_kind: TokenKind,
    pub eos_kind: TokenKind,
    pub hex_prefix: bool,
    pub string_delim: char,
    pub string_body: CharSet,
    pub escape_char: char,
    pub escape_table: Vec<(char, char)>,
    pub string_kind: TokenKind,
    pub keywords: Vec<(String, TokenKind)>,
    pub operators: Vec<(String, TokenKind)>,
    pub block_comment: Option<(String, String)>,
    pub line_comment: Option<String>,
    pub messages: Vec<String>,
}

impl ScannerSpec {
    /// Starts a spec with the four required token kinds and the sensible
    /// ASCII-oriented defaults for everything else.
    pub fn new(
        ident_kind: TokenKind,
        int_kind: TokenKind,
        real_kind: TokenKind,
        illegal_kind: TokenKind,
        eos_kind: TokenKind,
    ) -> Self {
        Self {
            ident_start: CharSet::ident_start(),
            ident_continue: CharSet::ident_continue(),
            ident_kind,
            whitespace: CharSet::whitespace(),
            int_kind,
            real_kind,
            illegal_kind,
            eos_kind,
            hex_prefix: false,
            string_delim: '"',
            string_body: CharSet::not_in(vec!['"', '\\']),
            escape_char: '\\',
            escape_table: Vec::new(),
            string_kind: int_kind, // overwritten by with_string before use
            keywords: Vec::new(),
            operators: Vec::new(),
            block_comment: None,
            line_comment: None,
            messages: Vec::new(),
        }
    }

    pub fn with_hex_prefix(mut self, enabled: bool) -> Self {
        self.hex_prefix = enabled;
        self
    }

    pub fn with_string(
        mut self,
        delim: char,
        escape_char: char,
        escape_table: Vec<(char, char)>,
        kind: TokenKind,
    ) -> Self {
        self.string_delim = delim;
        self.escape_char = escape_char;
        self.string_body = CharSet::not_in(vec![delim, escape_char]);
        self.escape_table = escape_table;
        self.string_kind = kind;
        self
    }

    pub fn with_keyword(mut self, literal: impl Into<String>, kind: TokenKind) -> Self {
        self.keywords.push((literal.into(), kind));
        self
    }

    pub fn with_operator(mut self, literal: impl Into<String>, kind: TokenKind) -> Self {
        self.operators.push((literal.into(), kind));
        self
    }

    pub fn with_block_comment(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.block_comment = Some((open.into(), close.into()));
        self
    }

    pub fn with_line_comment(mut self, prefix: impl Into<String>) -> Self {
        self.line_comment = Some(prefix.into());
        self
    }

    fn validate(&self) -> Result<(), ScannerBuildError> {
        if self.string_body.contains(self.string_delim) {
            return Err(ScannerBuildError::DelimiterInBody);
        }
        let mut seen = std::collections::HashSet::new();
        for (literal, _) in &self.keywords {
            if literal.is_empty() {
                return Err(ScannerBuildError::EmptyKeyword);
            }
            if !seen.insert(literal.clone()) {
                return Err(ScannerBuildError::DuplicateKeyword(literal.clone()));
            }
        }
        Ok(())
    }
}

/// The three automata a [`ScannerSpec`] compiles down to, plus the bits of
/// the spec the scanner still needs at run time (which kinds to discard,
/// the illegal/eos kinds for diagnostics).
pub struct CompiledScanner {
    pub main: Dfa<ScanContext>,
    pub block_comment: Option<Dfa<ScanContext>>,
    pub line_comment: Option<Dfa<ScanContext>>,
    pub illegal_kind: TokenKind,
    pub eos_kind: TokenKind,
}

pub struct ScannerBuilder;

impl ScannerBuilder {
    pub fn build(spec: ScannerSpec) -> Result<CompiledScanner, ScannerBuildError> {
        spec.validate()?;

        let mut b: NfaBuilder<ScanContext> = NfaBuilder::new();
        let start = b.create_state();
        b.set_start(start)?;

        build_whitespace(&mut b, start, &spec)?;
        let ident_state = build_identifier(&mut b, start, &spec)?;
        build_keyword_overlay(&mut b, start, ident_state, &spec)?;
        build_number(&mut b, start, &spec)?;
        build_string(&mut b, start, &spec)?;
        build_literal_trie(&mut b, start, &spec.operators)?;
        if let Some((open, _)) = &spec.block_comment {
            build_comment_start(&mut b, start, open, TokenKind::BlockCommentStart)?;
        }
        if let Some(prefix) = &spec.line_comment {
            build_comment_start(&mut b, start, prefix, TokenKind::LineCommentStart)?;
        }

        let main_nfa = b.build().map_err(ScannerBuildError::Automaton)?;
        let main = powerset(&main_nfa).map_err(ScannerBuildError::Automaton)?;

        let block_comment = spec
            .block_comment
            .as_ref()
            .map(|(_, close)| build_eater_dfa(close))
            .transpose()
            .map_err(ScannerBuildError::Automaton)?;

        let line_comment = if spec.line_comment.is_some() {
            Some(build_line_eater_dfa().map_err(ScannerBuildError::Automaton)?)
        } else {
            None
        };

        Ok(CompiledScanner {
            main,
            block_comment,
            line_comment,
            illegal_kind: spec.illegal_kind,
            eos_kind: spec.eos_kind,
        })
    }
}

fn set_kind_action(kind: TokenKind) -> Rc<dyn Fn(Symbol, &mut ScanContext)> {
    Rc::new(move |_sym, ctx: &mut ScanContext| ctx.push(Command::SetKind(kind)))
}

fn build_whitespace(
    b: &mut NfaBuilder<ScanContext>,
    start: StateId,
    spec: &ScannerSpec,
) -> Result<(), ScannerBuildError> {
    let ws = b.create_state();
    b.begin_state(ws)?
        .set_accepting(true)?
        .set_name("whitespace")?
        .set_enter_action(set_kind_action(TokenKind::Ignore))?;
    for ch in WHITESPACE_CANDIDATES.chars().filter(|&c| spec.whitespace.contains(c)) {
        b.begin_state(start)?.add_transition(Symbol::Char(ch), ws)?;
        b.begin_state(ws)?.add_transition(Symbol::Char(ch), ws)?;
    }
    Ok(())
}

fn build_identifier(
    b: &mut NfaBuilder<ScanContext>,
    start: StateId,
    spec: &ScannerSpec,
) -> Result<StateId, ScannerBuildError> {
    let ident = b.create_state();
    let kind = spec.ident_kind;
    b.begin_state(ident)?
        .set_accepting(true)?
        .set_name("identifier")?
        .set_enter_action(Rc::new(move |sym, ctx: &mut ScanContext| {
            ctx.push(Command::SetKind(kind));
            if let Symbol::Char(c) = sym {
                ctx.push(Command::AppendStringChar(c));
            }
        }))?;
    for ch in IDENT_CANDIDATES.chars().filter(|&c| spec.ident_start.contains(c)) {
        b.begin_state(start)?.add_transition(Symbol::Char(ch), ident)?;
    }
    for ch in IDENT_CANDIDATES.chars().filter(|&c| spec.ident_continue.contains(c)) {
        b.begin_state(ident)?.add_transition(Symbol::Char(ch), ident)?;
    }
    Ok(ident)
}

/// Overlays every ident-shaped keyword on top of the generic identifier
/// path, sharing a trie rooted at `ident_state` for the remaining
/// characters past the first. Because the generic identifier state stays
/// alive in parallel (its own self-loop matches the same characters), the
/// combined subset after a full keyword match contains both the generic
/// and the keyword-specific accepting state; composing their actions in
/// creation order means the keyword's `SetKind` — added after the
/// identifier's — runs last and wins, reproducing keyword-over-identifier
/// priority without a priority field. If the input keeps extending past
/// the keyword with more identifier characters, the keyword branch simply
/// has nowhere to go and drops out of the subset, leaving the identifier
/// kind to win on its own.
fn build_keyword_overlay(
    b: &mut NfaBuilder<ScanContext>,
    start: StateId,
    ident_state: StateId,
    spec: &ScannerSpec,
) -> Result<(), ScannerBuildError> {
    let mut existing: HashMap<(StateId, char), StateId> = HashMap::new();
    for (literal, kind) in &spec.keywords {
        let chars: Vec<char> = literal.chars().collect();
        if !chars
            .first()
            .is_some_and(|&c| spec.ident_start.contains(c))
            || !chars.iter().all(|&c| spec.ident_continue.contains(c))
        {
            continue; // not ident-shaped; handled by the literal trie below instead
        }
        let mut current = ident_state;
        for (i, &ch) in chars.iter().skip(1).enumerate() {
            let next = if let Some(&s) = existing.get(&(current, ch)) {
                s
            } else {
                let s = b.create_state();
                b.begin_state(current)?.add_transition(Symbol::Char(ch), s)?;
                existing.insert((current, ch), s);
                s
            };
            if i == chars.len() - 2 {
                let kind = *kind;
                b.begin_state(next)?
                    .set_accepting(true)?
                    .set_name(format!("keyword:{literal}"))?
                    .set_enter_action(set_kind_action(kind))?;
            }
            current = next;
        }
    }
    // non-ident-shaped keywords (none in Velox, but handled for completeness)
    let non_ident: Vec<(String, TokenKind)> = spec
        .keywords
        .iter()
        .filter(|(literal, _)| {
            let chars: Vec<char> = literal.chars().collect();
            !chars
                .first()
                .is_some_and(|&c| spec.ident_start.contains(c))
                || !chars.iter().all(|&c| spec.ident_continue.contains(c))
        })
        .cloned()
        .collect();
    if !non_ident.is_empty() {
        build_literal_trie(b, start, &non_ident)?;
    }
    Ok(())
}

fn build_literal_trie(
    b: &mut NfaBuilder<ScanContext>,
    start: StateId,
    literals: &[(String, TokenKind)],
) -> Result<(), ScannerBuildError> {
    let mut existing: HashMap<(StateId, char), StateId> = HashMap::new();
    for (literal, kind) in literals {
        let chars: Vec<char> = literal.chars().collect();
        let mut current = start;
        for (i, &ch) in chars.iter().enumerate() {
            let next = if let Some(&s) = existing.get(&(current, ch)) {
                s
            } else {
                let s = b.create_state();
                b.begin_state(current)?.add_transition(Symbol::Char(ch), s)?;
                existing.insert((current, ch), s);
                s
            };
            if i == chars.len() - 1 {
                let kind = *kind;
                b.begin_state(next)?
                    .set_accepting(true)?
                    .set_name(format!("literal:{literal}"))?
                    .set_enter_action(set_kind_action(kind))?;
            }
            current = next;
        }
    }
    Ok(())
}

fn add_int_digit_action(base: u32) -> Rc<dyn Fn(Symbol, &mut ScanContext)> {
    Rc::new(move |sym, ctx: &mut ScanContext| {
        if let Symbol::Char(c) = sym {
            if let Some(digit) = c.to_digit(base) {
                ctx.push(Command::AddIntDigit { digit, base });
            }
        }
    })
}

fn add_frac_digit_action(base: u32) -> Rc<dyn Fn(Symbol, &mut ScanContext)> {
    Rc::new(move |sym, ctx: &mut ScanContext| {
        if let Symbol::Char(c) = sym {
            if let Some(digit) = c.to_digit(base) {
                ctx.push(Command::AddFracDigit { digit, base });
            }
        }
    })
}

fn build_number(
    b: &mut NfaBuilder<ScanContext>,
    start: StateId,
    spec: &ScannerSpec,
) -> Result<(), ScannerBuildError> {
    let zero = b.create_state();
    let int_state = b.create_state();
    let dot = b.create_state();
    let real_state = b.create_state();

    b.begin_state(zero)?.set_accepting(true)?.set_name("int-zero")?;
    b.begin_state(start)?.add_transition(Symbol::Char('0'), zero)?;

    b.begin_state(int_state)?
        .set_accepting(true)?
        .set_name("int")?
        .set_enter_action({
            let kind = spec.int_kind;
            let digit_action = add_int_digit_action(10);
            Rc::new(move |sym, ctx: &mut ScanContext| {
                ctx.push(Command::SetKind(kind));
                digit_action(sym, ctx);
            })
        })?;
    for ch in DIGIT_CANDIDATES.chars().skip(1) {
        b.begin_state(start)?.add_transition(Symbol::Char(ch), int_state)?;
    }
    for ch in DIGIT_CANDIDATES.chars() {
        b.begin_state(zero)?.add_transition(Symbol::Char(ch), int_state)?;
        b.begin_state(int_state)?.add_transition(Symbol::Char(ch), int_state)?;
    }
    let zero_kind = spec.int_kind;
    let zero_action = add_int_digit_action(10);
    b.begin_state(zero)?.set_enter_action(Rc::new(move |sym, ctx: &mut ScanContext| {
        ctx.push(Command::SetKind(zero_kind));
        zero_action(sym, ctx);
    }))?;

    b.begin_state(dot)?.set_name("real-dot")?;
    b.begin_state(real_state)?
        .set_accepting(true)?
        .set_name("real")?
        .set_enter_action({
            let kind = spec.real_kind;
            let frac_action = add_frac_digit_action(10);
            Rc::new(move |sym, ctx: &mut ScanContext| {
                ctx.push(Command::SetKind(kind));
                frac_action(sym, ctx);
            })
        })?;
    b.begin_state(zero)?.add_transition(Symbol::Char('.'), dot)?;
    b.begin_state(int_state)?.add_transition(Symbol::Char('.'), dot)?;
    for ch in DIGIT_CANDIDATES.chars() {
        b.begin_state(dot)?.add_transition(Symbol::Char(ch), real_state)?;
        b.begin_state(real_state)?.add_transition(Symbol::Char(ch), real_state)?;
    }

    if spec.hex_prefix {
        let hex_prefix = b.create_state();
        let hex_state = b.create_state();
        b.begin_state(hex_prefix)?
            .set_name("hex-prefix")?
            .set_enter_action(Rc::new(|_sym, ctx: &mut ScanContext| {
                ctx.push(Command::ResetInt);
            }))?;
        b.begin_state(zero)?.add_transition(Symbol::Char('x'), hex_prefix)?;
        b.begin_state(zero)?.add_transition(Symbol::Char('X'), hex_prefix)?;

        let hex_kind = spec.int_kind;
        let hex_action = add_int_digit_action(16);
        b.begin_state(hex_state)?
            .set_accepting(true)?
            .set_name("hex")?
            .set_enter_action(Rc::new(move |sym, ctx: &mut ScanContext| {
                ctx.push(Command::SetKind(hex_kind));
                hex_action(sym, ctx);
            }))?;
        for ch in HEX_DIGIT_CANDIDATES.chars() {
            b.begin_state(hex_prefix)?.add_transition(Symbol::Char(ch), hex_state)?;
            b.begin_state(hex_state)?.add_transition(Symbol::Char(ch), hex_state)?;
        }
    }

    Ok(())
}

fn build_string(
    b: &mut NfaBuilder<ScanContext>,
    start: StateId,
    spec: &ScannerSpec,
) -> Result<(), ScannerBuildError> {
    let open = b.create_state();
    let body = b.create_state();
    let escape = b.create_state();
    let closed = b.create_state();

    b.begin_state(open)?
        .set_name("string-open")?
        .set_enter_action(Rc::new(|_sym, ctx: &mut ScanContext| {
            ctx.mode = crate::scanner::command::ScanMode::InString;
        }))?;
    b.begin_state(start)?.add_transition(Symbol::Char(spec.string_delim), open)?;

    let body_enter = Rc::new(|sym: Symbol, ctx: &mut ScanContext| {
        ctx.mode = crate::scanner::command::ScanMode::InString;
        if let Symbol::Char(c) = sym {
            ctx.push(Command::AppendStringChar(c));
        }
    });
    b.begin_state(body)?.set_name("string-body")?.set_enter_action(body_enter.clone())?;
    for ch in body_candidates().filter(|&c| spec.string_body.contains(c)) {
        b.begin_state(open)?.add_transition(Symbol::Char(ch), body)?;
        b.begin_state(body)?.add_transition(Symbol::Char(ch), body)?;
    }

    b.begin_state(escape)?
        .set_name("string-escape")?
        .set_enter_action(Rc::new(|_sym, ctx: &mut ScanContext| {
            ctx.mode = crate::scanner::command::ScanMode::InEscape;
        }))?;
    b.begin_state(open)?.add_transition(Symbol::Char(spec.escape_char), escape)?;
    b.begin_state(body)?.add_transition(Symbol::Char(spec.escape_char), escape)?;
    for &(seq, actual) in &spec.escape_table {
        // Each recognized escape sequence lands on its own state so its
        // mapped character (not the raw sequence char) is what gets
        // appended, then folds back into `body` for the rest of the string.
        let landing = b.create_state();
        let action = Rc::new(move |_sym: Symbol, ctx: &mut ScanContext| {
            ctx.mode = crate::scanner::command::ScanMode::InString;
            ctx.push(Command::AppendStringChar(actual));
        });
        b.begin_state(landing)?
            .set_name("string-escape-landing")?
            .set_enter_action(action)?;
        for ch in body_candidates().filter(|&c| spec.string_body.contains(c)) {
            b.begin_state(landing)?.add_transition(Symbol::Char(ch), body)?;
        }
        b.begin_state(landing)?.add_transition(Symbol::Char(spec.string_delim), closed)?;
        b.begin_state(landing)?.add_transition(Symbol::Char(spec.escape_char), escape)?;
        b.add_transition_from(escape, Symbol::Char(seq), landing)?;
    }

    let kind = spec.string_kind;
    b.begin_state(closed)?
        .set_accepting(true)?
        .set_name("string-closed")?
        .set_enter_action(set_kind_action(kind))?;
    b.begin_state(open)?.add_transition(Symbol::Char(spec.string_delim), closed)?;
    b.begin_state(body)?.add_transition(Symbol::Char(spec.string_delim), closed)?;

    Ok(())
}

fn build_comment_start(
    b: &mut NfaBuilder<ScanContext>,
    start: StateId,
    marker: &str,
    kind: TokenKind,
) -> Result<(), ScannerBuildError> {
    build_literal_trie(b, start, &[(marker.to_string(), kind)])
}

/// Builds a small substring-matching automaton (a KMP-style failure
/// function) that consumes characters until `close` has been fully matched,
/// including the closer itself. Only accepting in the fully-matched state:
/// running out of input beforehand leaves the cursor stuck at a
/// non-accepting state, which the scanner reports as an unterminated
/// comment.
fn build_eater_dfa(close: &str) -> Result<Dfa<ScanContext>, AutomatonError> {
    let marker: Vec<char> = close.chars().collect();
    let n = marker.len();
    let mut b: NfaBuilder<ScanContext> = NfaBuilder::new();
    let states: Vec<StateId> = (0..=n).map(|_| b.create_state()).collect();
    b.set_start(states[0])?;
    for k in 0..n {
        for ch in body_candidates() {
            let next_k = kmp_next(&marker, k, ch);
            b.begin_state(states[k])?.add_transition(Symbol::Char(ch), states[next_k])?;
        }
    }
    b.begin_state(states[n])?.set_accepting(true)?;
    let nfa = b.build()?;
    powerset(&nfa)
}

/// A one-state automaton that consumes anything but a newline. Maximal
/// munch naturally stops at the newline (no transition defined for it) or
/// at end of source, both of which are valid places to end a line comment.
fn build_line_eater_dfa() -> Result<Dfa<ScanContext>, AutomatonError> {
    let mut b: NfaBuilder<ScanContext> = NfaBuilder::new();
    let s0 = b.create_state();
    b.set_start(s0)?;
    b.begin_state(s0)?.set_accepting(true)?;
    for ch in body_candidates().filter(|&c| c != '\n') {
        b.begin_state(s0)?.add_transition(Symbol::Char(ch), s0)?;
    }
    let nfa = b.build()?;
    powerset(&nfa)
}

fn kmp_next(marker: &[char], k: usize, c: char) -> usize {
    let mut k = k;
    loop {
        if k < marker.len() && marker[k] == c {
            return k + 1;
        }
        if k == 0 {
            return 0;
        }
        k = proper_border(&marker[..k]);
    }
}

/// The length of the longest proper prefix of `s` that is also a suffix of
/// `s` (the classic KMP failure value at `s.len()`).
fn proper_border(s: &[char]) -> usize {
    let n = s.len();
    let mut fail = vec![0usize; n + 1];
    for i in 1..n {
        let mut j = fail[i];
        while j > 0 && s[i] != s[j] {
            j = fail[j];
        }
        fail[i + 1] = if s[i] == s[j] { j + 1 } else { 0 };
    }
    fail[n]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::{DfaCursor, Symbol};

    fn velox_like_spec() -> ScannerSpec {
        ScannerSpec::new(
            TokenKind::Ident,
            TokenKind::IntLit,
            TokenKind::RealLit,
            TokenKind::Ignore,
            TokenKind::Eos,
        )
        .with_hex_prefix(true)
        .with_string(
            '"',
            '\\',
            vec![('n', '\n'), ('t', '\t'), ('"', '"'), ('\\', '\\')],
            TokenKind::StringLit,
        )
        .with_keyword("if", TokenKind::If)
        .with_keyword("function", TokenKind::Function)
        .with_operator("+", TokenKind::Plus)
        .with_operator("++", TokenKind::PlusPlus)
        .with_operator("+=", TokenKind::AssignAdd)
        .with_block_comment("/*", "*/")
        .with_line_comment("//")
    }

    fn feed(dfa: &Dfa<ScanContext>, input: &str) -> (Option<bool>, ScanContext) {
        let mut cursor = DfaCursor::new(dfa);
        let mut ctx = ScanContext::new();
        let mut last = Some(false);
        for ch in input.chars() {
            last = cursor.process(Symbol::Char(ch), &mut ctx);
            if last.is_none() {
                break;
            }
        }
        (last, ctx)
    }

    #[test]
    fn keyword_wins_over_identifier_on_exact_match() {
        let compiled = ScannerBuilder::build(velox_like_spec()).unwrap();
        let (accept, ctx) = feed(&compiled.main, "if");
        assert_eq!(accept, Some(true));
        assert!(matches!(ctx.pending.last(), Some(Command::SetKind(TokenKind::If))));
    }

    #[test]
    fn identifier_wins_when_keyword_prefix_continues() {
        let compiled = ScannerBuilder::build(velox_like_spec()).unwrap();
        let (accept, ctx) = feed(&compiled.main, "ifx");
        assert_eq!(accept, Some(true));
        assert!(matches!(ctx.pending.last(), Some(Command::SetKind(TokenKind::Ident))));
    }

    #[test]
    fn operator_trie_shares_prefixes() {
        let compiled = ScannerBuilder::build(velox_like_spec()).unwrap();
        let (accept, ctx) = feed(&compiled.main, "++");
        assert_eq!(accept, Some(true));
        assert!(matches!(ctx.pending.last(), Some(Command::SetKind(TokenKind::PlusPlus))));
    }

    #[test]
    fn hex_literal_resets_leading_zero_digit() {
        let compiled = ScannerBuilder::build(velox_like_spec()).unwrap();
        let (accept, ctx) = feed(&compiled.main, "0x1F");
        assert_eq!(accept, Some(true));
        assert!(ctx.pending.iter().any(|c| matches!(c, Command::ResetInt)));
    }

    #[test]
    fn string_literal_appends_body_and_escape_chars() {
        let compiled = ScannerBuilder::build(velox_like_spec()).unwrap();
        let (accept, _ctx) = feed(&compiled.main, "\"ab\\nc\"");
        assert_eq!(accept, Some(true));
    }

    #[test]
    fn block_comment_eater_matches_close_marker() {
        let compiled = ScannerBuilder::build(velox_like_spec()).unwrap();
        let eater = compiled.block_comment.unwrap();
        let (accept, _ctx) = feed(&eater, " hello ** / still here */");
        assert_eq!(accept, Some(true));
    }

    #[test]
    fn line_comment_eater_stops_before_newline() {
        let compiled = ScannerBuilder::build(velox_like_spec()).unwrap();
        let eater = compiled.line_comment.unwrap();
        let mut cursor = DfaCursor::new(&eater);
        let mut ctx = ScanContext::new();
        assert_eq!(cursor.process(Symbol::Char('h'), &mut ctx), Some(true));
        assert_eq!(cursor.process(Symbol::Char('i'), &mut ctx), Some(true));
        assert_eq!(cursor.process(Symbol::Char('\n'), &mut ctx), None);
    }

    #[test]
    fn duplicate_keyword_rejected() {
        let spec = velox_like_spec().with_keyword("if", TokenKind::If);
        let err = ScannerBuilder::build(spec).unwrap_err();
        assert_eq!(err, ScannerBuildError::DuplicateKeyword("if".to_string()));
    }

    #[test]
    fn delimiter_in_body_rejected() {
        let spec = ScannerSpec::new(
            TokenKind::Ident,
            TokenKind::IntLit,
            TokenKind::RealLit,
            TokenKind::Ignore,
            TokenKind::Eos,
        )
        .with_string('"', '\\', vec![], TokenKind::StringLit);
        let mut broken = spec;
        broken.string_body = CharSet::new(|_| true); // includes the delimiter
        let err = ScannerBuilder::build(broken).unwrap_err();
        assert_eq!(err, ScannerBuildError::DelimiterInBody);
    }
}
