//! Component F: the parser-facing token source.
//!
//! The original token-stream design gives a one-token lookahead cache with
//! an explicit before-first/not-peeked/peeked state machine, since peeking
//! ahead meant invoking the scanner again. Here the whole source is
//! tokenized up front via [`MementoSource`] (see `scanner::memento`), so
//! peeking is already an O(1) array lookup — the cache and its state
//! machine would add nothing. `Source` is accordingly a thin, stateless
//! wrapper that adds parser-friendly queries (`expect`, `block_start_following`)
//! over the memento stream.

use crate::errors::ParseError;
use crate::scanner::{CompiledScanner, Memento, MementoSource, Scanner, Token, TokenKind};

pub struct Source {
    tokens: MementoSource,
}

impl Source {
    pub fn new(tokens: MementoSource) -> Self {
        Self { tokens }
    }

    pub fn from_text(compiled: CompiledScanner, text: &str) -> Result<Self, crate::errors::ScanError> {
        let scanner = Scanner::new(compiled, text);
        Ok(Self::new(MementoSource::tokenize(scanner)?))
    }

    pub fn current(&self) -> &Token {
        self.tokens.current()
    }

    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    pub fn current_line(&self) -> usize {
        self.current().pos.line
    }

    pub fn peek_kind(&self) -> TokenKind {
        self.tokens
            .peek()
            .map(|t| t.kind)
            .unwrap_or(self.current().kind)
    }

    /// `true` when the token right after the current one opens a block —
    /// used by statement parsing to disambiguate constructs that may or may
    /// not carry a brace-delimited body (`IsBlockStartFollowing` in the
    /// original source).
    pub fn block_start_following(&self) -> bool {
        self.peek_kind() == TokenKind::LBrace
    }

    pub fn advance(&mut self) -> Token {
        self.tokens.advance().clone()
    }

    pub fn save(&self) -> Memento {
        self.tokens.save()
    }

    pub fn restore(&mut self, memento: Memento) {
        self.tokens.restore(memento);
    }

    /// Consumes the current token if it has kind `kind`, else raises a
    /// `ParseError`.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.current_kind() == kind {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                self.current_line(),
                format!("expected {kind:?}, found {:?}", self.current_kind()),
            ))
        }
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token if it matches `kind`, returning whether
    /// it did.
    pub fn accept(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ScannerBuilder, ScannerSpec};

    fn source(text: &str) -> Source {
        let spec = ScannerSpec::new(
            TokenKind::Ident,
            TokenKind::IntLit,
            TokenKind::RealLit,
            TokenKind::Ignore,
            TokenKind::Eos,
        )
        .with_string('"', '\\', vec![], TokenKind::StringLit)
        .with_operator("{", TokenKind::LBrace)
        .with_operator("(", TokenKind::LParen)
        .with_operator(")", TokenKind::RParen);
        let compiled = ScannerBuilder::build(spec).unwrap();
        Source::from_text(compiled, text).unwrap()
    }

    #[test]
    fn block_start_following_checks_the_next_token() {
        let src = source("f(x) {");
        assert!(!src.block_start_following());
    }

    #[test]
    fn expect_consumes_matching_token() {
        let mut src = source("(x)");
        src.expect(TokenKind::LParen).unwrap();
        assert_eq!(src.current_kind(), TokenKind::Ident);
    }

    #[test]
    fn expect_rejects_mismatched_token() {
        let mut src = source("(x)");
        let err = src.expect(TokenKind::RParen).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn save_restore_rewinds() {
        let mut src = source("a b");
        let checkpoint = src.save();
        src.advance();
        assert_eq!(src.current_kind(), TokenKind::Ident);
        src.restore(checkpoint);
        assert_eq!(src.current().string_value(), Some("a"));
    }
}
