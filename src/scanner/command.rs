//! Commands queued by enter actions during a single token scan, and their
//! checkpoint-based reduction.
//!
//! §3 of the design describes a priority-tagged command list reduced "for
//! every command kind, only the highest-priority instance survives" once
//! the DFA rejects. §9's design notes license an equivalent simplification:
//! replay only the enter actions belonging to the maximal-munch prefix that
//! was actually accepted, discarding whatever a rejected extension queued.
//! We take that simplification — [`ScanContext`] accumulates [`Command`]s as
//! the DFA advances, and the scanner checkpoints the command list every
//! time the DFA reaches an accepting state, restoring the last checkpoint
//! when the run finally dies. No priority field is needed: commands are
//! replayed in the order the (accepted) states were entered, so a later
//! command naturally overrides an earlier one of the same effect (see
//! `scanner::builder` for how this reproduces the identifier-vs-keyword
//! priority rule).

use crate::scanner::tokens::TokenKind;

#[derive(Debug, Clone)]
pub enum Command {
    /// Marks the start of the token at the current absolute offset
    /// (`MARK_TOKEN_START_FLAG`).
    MarkTokenStart(usize),
    /// Sets the token's kind, overriding any previous `SetKind` command.
    SetKind(TokenKind),
    /// Appends a character to the token's string value
    /// (`ADD_STRING_VALUE_CHAR_FLAG`), used for string-literal bodies.
    AppendStringChar(char),
    /// Accumulates one more digit into the integer value, `value = value *
    /// base + digit`.
    AddIntDigit { digit: u32, base: u32 },
    /// Accumulates one more digit into the fractional part of a real
    /// value: `value += digit / base^n` for the n-th fractional digit.
    AddFracDigit { digit: u32, base: u32 },
    /// Resets the accumulated integer value to zero — used when a `0x`
    /// prefix is recognized, so the leading `0`'s digit command does not
    /// pollute the hexadecimal value that follows.
    ResetInt,
    /// Registers a scanner error by index into the builder's message
    /// table.
    Error(usize),
}

/// What kind of token the scanner is in the middle of recognizing, tracked
/// outside the checkpointed command list so a failed run can still explain
/// itself: if the DFA dies before ever reaching an accepting state, there is
/// no checkpoint to fall back on, but `mode` still reflects the deepest
/// state the attempt reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Normal,
    InString,
    InEscape,
}

/// Per-scan mutable state threaded through the DFA as its `context`
/// parameter. Enter actions push [`Command`]s here; nothing else is
/// observable from inside an enter action, apart from `mode` and
/// `current_pos`, which are plain fields rather than checkpointed commands
/// since they exist only to make scanner error messages specific.
#[derive(Debug, Default)]
pub struct ScanContext {
    pub pending: Vec<Command>,
    pub mode: ScanMode,
    pub current_pos: usize,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }
}

/// Accumulates a token's kind and payload by replaying a checkpointed
/// command list.
#[derive(Debug, Default)]
pub struct TokenBuilder {
    pub kind: Option<TokenKind>,
    pub token_start: usize,
    pub string_value: String,
    pub int_value: i64,
    pub real_value: f64,
    pub frac_digits: i32,
    pub error: Option<usize>,
}

impl TokenBuilder {
    pub fn new(default_start: usize) -> Self {
        Self {
            token_start: default_start,
            ..Default::default()
        }
    }

    /// Executes the (already-reduced) command list in order.
    pub fn apply(&mut self, commands: &[Command]) {
        for command in commands {
            match *command {
                Command::MarkTokenStart(offset) => self.token_start = offset,
                Command::SetKind(kind) => self.kind = Some(kind),
                Command::AppendStringChar(ch) => self.string_value.push(ch),
                Command::AddIntDigit { digit, base } => {
                    self.int_value = self.int_value * i64::from(base) + i64::from(digit);
                }
                Command::AddFracDigit { digit, base } => {
                    self.frac_digits += 1;
                    self.real_value +=
                        f64::from(digit) / (base as f64).powi(self.frac_digits);
                }
                Command::ResetInt => {
                    self.int_value = 0;
                }
                Command::Error(index) => self.error = Some(index),
            }
        }
    }
}
