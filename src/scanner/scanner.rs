//! Component E: the scanner engine. Drives the compiled automata against
//! the source text with maximal-munch checkpointing, skips whitespace and
//! comments, and tracks absolute offsets plus 1-based line/column.

use crate::automata::{DfaCursor, Symbol};
use crate::errors::ScanError;
use crate::scanner::builder::CompiledScanner;
use crate::scanner::command::{ScanContext, ScanMode};
use crate::scanner::tokens::{Payload, Position, Token, TokenKind};

pub struct Scanner {
    compiled: CompiledScanner,
    chars: Vec<char>,
    pos: usize,
    /// Offsets (in `chars`) of every newline consumed so far, used to turn
    /// an absolute offset into a (line, column) pair without rescanning.
    newline_offsets: Vec<usize>,
}

impl Scanner {
    pub fn new(compiled: CompiledScanner, source: &str) -> Self {
        Self {
            compiled,
            chars: source.chars().collect(),
            pos: 0,
            newline_offsets: Vec::new(),
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn eos_kind(&self) -> TokenKind {
        self.compiled.eos_kind
    }

    /// Converts an absolute offset into a 1-based (line, column) pair by
    /// counting how many recorded newlines precede it.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let line = self.newline_offsets.partition_point(|&n| n < offset) + 1;
        let column = match self.newline_offsets.iter().rev().find(|&&n| n < offset) {
            Some(&n) => offset - n,
            None => offset + 1,
        };
        (line, column)
    }

    fn symbol_at(&self, lookahead: usize) -> Symbol {
        match self.chars.get(self.pos + lookahead) {
            Some(&c) => Symbol::Char(c),
            None => Symbol::Eos,
        }
    }

    /// Advances the absolute position by `count` characters, recording the
    /// offset of every newline passed over.
    fn commit(&mut self, count: usize) {
        for i in 0..count {
            if self.chars[self.pos + i] == '\n' {
                self.newline_offsets.push(self.pos + i);
            }
        }
        self.pos += count;
    }

    /// Produces the next token, silently skipping whitespace and comments.
    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        loop {
            if self.is_at_end() {
                let (line, column) = self.line_column(self.pos);
                return Ok(Token::new(
                    self.compiled.eos_kind,
                    Position { line, column, offset: self.pos },
                ));
            }
            let start_offset = self.pos;
            let (line, column) = self.line_column(start_offset);
            let builder = self.scan_raw(start_offset, line)?;
            let kind = builder
                .kind
                .ok_or_else(|| ScanError::new(line, "scanner reached an accepting state with no token kind"))?;
            match kind {
                TokenKind::Ignore => continue,
                TokenKind::BlockCommentStart => {
                    self.consume_block_comment(line)?;
                    continue;
                }
                TokenKind::LineCommentStart => {
                    self.consume_line_comment();
                    continue;
                }
                _ => {
                    let mut token = Token::new(
                        kind,
                        Position { line, column, offset: start_offset },
                    );
                    token.payload = Payload {
                        string: if builder.string_value.is_empty() {
                            None
                        } else {
                            Some(builder.string_value)
                        },
                        int: Some(builder.int_value).filter(|_| is_int_like(kind)),
                        real: Some(builder.real_value).filter(|_| is_real_like(kind)),
                    };
                    return Ok(token);
                }
            }
        }
    }

    fn scan_raw(
        &mut self,
        start_offset: usize,
        line: usize,
    ) -> Result<crate::scanner::command::TokenBuilder, ScanError> {
        use crate::scanner::command::{Command, TokenBuilder};

        let mut cursor = DfaCursor::new(&self.compiled.main);
        let mut ctx = ScanContext::new();
        let mut best: Option<(usize, Vec<Command>)> = None;
        let mut consumed = 0usize;

        loop {
            let symbol = self.symbol_at(consumed);
            ctx.current_pos = start_offset + consumed;
            match cursor.process(symbol, &mut ctx) {
                Some(accepting) => {
                    if matches!(symbol, Symbol::Char(_)) {
                        consumed += 1;
                    }
                    if accepting {
                        best = Some((consumed, ctx.pending.clone()));
                    }
                    if matches!(symbol, Symbol::Eos) {
                        break;
                    }
                }
                None => break,
            }
        }

        match best {
            Some((len, commands)) => {
                self.commit(len);
                let mut builder = TokenBuilder::new(start_offset);
                builder.apply(&commands);
                Ok(builder)
            }
            None => {
                let message = match ctx.mode {
                    ScanMode::InString => "unterminated string literal".to_string(),
                    ScanMode::InEscape => "illegal escape sequence in string literal".to_string(),
                    ScanMode::Normal => match self.symbol_at(0) {
                        Symbol::Char(c) => format!("unexpected character {c:?}"),
                        Symbol::Eos => "unexpected end of source".to_string(),
                    },
                };
                Err(ScanError::new(line, message))
            }
        }
    }

    fn consume_block_comment(&mut self, start_line: usize) -> Result<(), ScanError> {
        let dfa = self
            .compiled
            .block_comment
            .as_ref()
            .expect("block comment eater required once BlockCommentStart is configured");
        let mut cursor = DfaCursor::new(dfa);
        let mut ctx = ScanContext::new();
        loop {
            let symbol = self.symbol_at(0);
            match cursor.process(symbol, &mut ctx) {
                Some(_) => self.commit(1),
                None => break,
            }
        }
        if cursor.is_accepting() {
            Ok(())
        } else {
            Err(ScanError::new(start_line, "unterminated block comment"))
        }
    }

    fn consume_line_comment(&mut self) {
        let dfa = match &self.compiled.line_comment {
            Some(dfa) => dfa,
            None => return,
        };
        let mut cursor = DfaCursor::new(dfa);
        let mut ctx = ScanContext::new();
        loop {
            let symbol = self.symbol_at(0);
            match cursor.process(symbol, &mut ctx) {
                Some(_) => self.commit(1),
                None => break,
            }
        }
    }
}

fn is_int_like(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::IntLit)
}

fn is_real_like(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::RealLit)
}
