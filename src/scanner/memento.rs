//! Token-stream memento: pre-tokenizes a whole source up front so the
//! parser can save and restore a read position in O(1) without rescanning.
//! Mirrors the `MementoSource` design in the original token-stream
//! implementation, which trades re-scanning for an up-front tokenize pass.
//!
//! `encode`/`decode` restore `Util/Memento.h`'s byte-serialized snapshot:
//! the original writes a token stream out through `Memento::operator<<`
//! (little-endian primitives, length-prefixed strings) so it can later be
//! rebuilt through `operator>>` without re-invoking the scanner at all.
//! We flatten the same data (kind, position, payload) into a `Vec<u8>` the
//! same way.

use crate::errors::ScanError;
use crate::scanner::scanner::Scanner;
use crate::scanner::tokens::{Payload, Position, Token, TokenKind};

/// An opaque saved read position. Cheap to create and cheap to restore —
/// it is nothing more than an index into the pre-tokenized stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memento(usize);

/// A fully tokenized source, addressed by position with save/restore.
pub struct MementoSource {
    tokens: Vec<Token>,
    pos: usize,
}

impl MementoSource {
    /// Runs `scanner` to completion (it is consumed) and keeps every token,
    /// including the trailing end-of-source token.
    pub fn tokenize(mut scanner: Scanner) -> Result<Self, ScanError> {
        let eos_kind = scanner.eos_kind();
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token()?;
            let is_eos = token.kind == eos_kind;
            tokens.push(token);
            if is_eos {
                break;
            }
        }
        Ok(Self { tokens, pos: 0 })
    }

    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    /// Moves to the next token and returns it, clamped at the final
    /// end-of-source token.
    pub fn advance(&mut self) -> &Token {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[self.pos]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos + 1 >= self.tokens.len()
    }

    pub fn save(&self) -> Memento {
        Memento(self.pos)
    }

    pub fn restore(&mut self, memento: Memento) {
        self.pos = memento.0;
    }

    /// Serializes the whole token stream to bytes, so it can be rebuilt
    /// later with [`decode`](Self::decode) without rescanning the source.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_usize(&mut buf, self.tokens.len());
        for token in &self.tokens {
            encode_token(&mut buf, token);
        }
        buf
    }

    /// Rebuilds a token stream previously produced by [`encode`](Self::encode).
    /// The read position starts at the beginning, same as [`tokenize`](Self::tokenize).
    pub fn decode(bytes: &[u8]) -> Result<Self, ScanError> {
        let mut cursor = 0usize;
        let count = read_usize(bytes, &mut cursor)?;
        let mut tokens = Vec::with_capacity(count);
        for _ in 0..count {
            tokens.push(decode_token(bytes, &mut cursor)?);
        }
        Ok(Self { tokens, pos: 0 })
    }
}

fn corrupt(what: &str) -> ScanError {
    ScanError::new(0, format!("corrupt memento data: {what}"))
}

fn write_usize(buf: &mut Vec<u8>, value: usize) {
    buf.extend_from_slice(&(value as u64).to_le_bytes());
}

fn read_usize(bytes: &[u8], cursor: &mut usize) -> Result<usize, ScanError> {
    let slice = bytes
        .get(*cursor..*cursor + 8)
        .ok_or_else(|| corrupt("buffer underflow reading a length"))?;
    *cursor += 8;
    Ok(u64::from_le_bytes(slice.try_into().unwrap()) as usize)
}

fn write_i64(buf: &mut Vec<u8>, value: i64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn read_i64(bytes: &[u8], cursor: &mut usize) -> Result<i64, ScanError> {
    let slice = bytes
        .get(*cursor..*cursor + 8)
        .ok_or_else(|| corrupt("buffer underflow reading an int"))?;
    *cursor += 8;
    Ok(i64::from_le_bytes(slice.try_into().unwrap()))
}

fn write_f64(buf: &mut Vec<u8>, value: f64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn read_f64(bytes: &[u8], cursor: &mut usize) -> Result<f64, ScanError> {
    let slice = bytes
        .get(*cursor..*cursor + 8)
        .ok_or_else(|| corrupt("buffer underflow reading a real"))?;
    *cursor += 8;
    Ok(f64::from_le_bytes(slice.try_into().unwrap()))
}

fn write_string(buf: &mut Vec<u8>, value: &str) {
    write_usize(buf, value.len());
    buf.extend_from_slice(value.as_bytes());
}

fn read_string(bytes: &[u8], cursor: &mut usize) -> Result<String, ScanError> {
    let len = read_usize(bytes, cursor)?;
    let slice = bytes
        .get(*cursor..*cursor + len)
        .ok_or_else(|| corrupt("buffer underflow reading a string"))?;
    *cursor += len;
    String::from_utf8(slice.to_vec()).map_err(|_| corrupt("string is not valid UTF-8"))
}

fn write_option_string(buf: &mut Vec<u8>, value: &Option<String>) {
    match value {
        Some(s) => {
            buf.push(1);
            write_string(buf, s);
        }
        None => buf.push(0),
    }
}

fn read_option_string(bytes: &[u8], cursor: &mut usize) -> Result<Option<String>, ScanError> {
    match read_tag(bytes, cursor)? {
        0 => Ok(None),
        _ => Ok(Some(read_string(bytes, cursor)?)),
    }
}

fn write_option_i64(buf: &mut Vec<u8>, value: Option<i64>) {
    match value {
        Some(n) => {
            buf.push(1);
            write_i64(buf, n);
        }
        None => buf.push(0),
    }
}

fn read_option_i64(bytes: &[u8], cursor: &mut usize) -> Result<Option<i64>, ScanError> {
    match read_tag(bytes, cursor)? {
        0 => Ok(None),
        _ => Ok(Some(read_i64(bytes, cursor)?)),
    }
}

fn write_option_f64(buf: &mut Vec<u8>, value: Option<f64>) {
    match value {
        Some(r) => {
            buf.push(1);
            write_f64(buf, r);
        }
        None => buf.push(0),
    }
}

fn read_option_f64(bytes: &[u8], cursor: &mut usize) -> Result<Option<f64>, ScanError> {
    match read_tag(bytes, cursor)? {
        0 => Ok(None),
        _ => Ok(Some(read_f64(bytes, cursor)?)),
    }
}

fn read_tag(bytes: &[u8], cursor: &mut usize) -> Result<u8, ScanError> {
    let tag = *bytes.get(*cursor).ok_or_else(|| corrupt("buffer underflow reading a tag"))?;
    *cursor += 1;
    Ok(tag)
}

/// Every `TokenKind` variant mapped to a stable byte, in declaration order.
/// Written explicitly (rather than cast from the discriminant) so the
/// match is exhaustive and the compiler catches a variant added to
/// `TokenKind` without a matching encode/decode arm.
fn token_kind_to_byte(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Ident => 0,
        TokenKind::IntLit => 1,
        TokenKind::RealLit => 2,
        TokenKind::StringLit => 3,
        TokenKind::ColorLit => 4,
        TokenKind::True => 5,
        TokenKind::False => 6,
        TokenKind::Undefined => 7,
        TokenKind::If => 8,
        TokenKind::Else => 9,
        TokenKind::While => 10,
        TokenKind::Do => 11,
        TokenKind::For => 12,
        TokenKind::Function => 13,
        TokenKind::Return => 14,
        TokenKind::Print => 15,
        TokenKind::Import => 16,
        TokenKind::Class => 17,
        TokenKind::New => 18,
        TokenKind::Global => 19,
        TokenKind::Break => 20,
        TokenKind::Continue => 21,
        TokenKind::Plus => 22,
        TokenKind::Minus => 23,
        TokenKind::Star => 24,
        TokenKind::Slash => 25,
        TokenKind::Percent => 26,
        TokenKind::Not => 27,
        TokenKind::PlusPlus => 28,
        TokenKind::MinusMinus => 29,
        TokenKind::Assign => 30,
        TokenKind::AssignAdd => 31,
        TokenKind::AssignSub => 32,
        TokenKind::AssignMul => 33,
        TokenKind::AssignDiv => 34,
        TokenKind::AssignMod => 35,
        TokenKind::Eq => 36,
        TokenKind::Ne => 37,
        TokenKind::Lt => 38,
        TokenKind::Le => 39,
        TokenKind::Gt => 40,
        TokenKind::Ge => 41,
        TokenKind::AndAnd => 42,
        TokenKind::OrOr => 43,
        TokenKind::Dot => 44,
        TokenKind::Comma => 45,
        TokenKind::Semicolon => 46,
        TokenKind::LParen => 47,
        TokenKind::RParen => 48,
        TokenKind::LBrace => 49,
        TokenKind::RBrace => 50,
        TokenKind::LBracket => 51,
        TokenKind::RBracket => 52,
        TokenKind::Eos => 53,
        TokenKind::Ignore => 54,
        TokenKind::BlockCommentStart => 55,
        TokenKind::LineCommentStart => 56,
    }
}

fn token_kind_from_byte(byte: u8) -> Result<TokenKind, ScanError> {
    Ok(match byte {
        0 => TokenKind::Ident,
        1 => TokenKind::IntLit,
        2 => TokenKind::RealLit,
        3 => TokenKind::StringLit,
        4 => TokenKind::ColorLit,
        5 => TokenKind::True,
        6 => TokenKind::False,
        7 => TokenKind::Undefined,
        8 => TokenKind::If,
        9 => TokenKind::Else,
        10 => TokenKind::While,
        11 => TokenKind::Do,
        12 => TokenKind::For,
        13 => TokenKind::Function,
        14 => TokenKind::Return,
        15 => TokenKind::Print,
        16 => TokenKind::Import,
        17 => TokenKind::Class,
        18 => TokenKind::New,
        19 => TokenKind::Global,
        20 => TokenKind::Break,
        21 => TokenKind::Continue,
        22 => TokenKind::Plus,
        23 => TokenKind::Minus,
        24 => TokenKind::Star,
        25 => TokenKind::Slash,
        26 => TokenKind::Percent,
        27 => TokenKind::Not,
        28 => TokenKind::PlusPlus,
        29 => TokenKind::MinusMinus,
        30 => TokenKind::Assign,
        31 => TokenKind::AssignAdd,
        32 => TokenKind::AssignSub,
        33 => TokenKind::AssignMul,
        34 => TokenKind::AssignDiv,
        35 => TokenKind::AssignMod,
        36 => TokenKind::Eq,
        37 => TokenKind::Ne,
        38 => TokenKind::Lt,
        39 => TokenKind::Le,
        40 => TokenKind::Gt,
        41 => TokenKind::Ge,
        42 => TokenKind::AndAnd,
        43 => TokenKind::OrOr,
        44 => TokenKind::Dot,
        45 => TokenKind::Comma,
        46 => TokenKind::Semicolon,
        47 => TokenKind::LParen,
        48 => TokenKind::RParen,
        49 => TokenKind::LBrace,
        50 => TokenKind::RBrace,
        51 => TokenKind::LBracket,
        52 => TokenKind::RBracket,
        53 => TokenKind::Eos,
        54 => TokenKind::Ignore,
        55 => TokenKind::BlockCommentStart,
        56 => TokenKind::LineCommentStart,
        other => return Err(corrupt(&format!("unknown token kind byte {other}"))),
    })
}

fn encode_token(buf: &mut Vec<u8>, token: &Token) {
    buf.push(token_kind_to_byte(token.kind));
    write_usize(buf, token.pos.line);
    write_usize(buf, token.pos.column);
    write_usize(buf, token.pos.offset);
    write_option_string(buf, &token.payload.string);
    write_option_i64(buf, token.payload.int);
    write_option_f64(buf, token.payload.real);
}

fn decode_token(bytes: &[u8], cursor: &mut usize) -> Result<Token, ScanError> {
    let kind = token_kind_from_byte(read_tag(bytes, cursor)?)?;
    let line = read_usize(bytes, cursor)?;
    let column = read_usize(bytes, cursor)?;
    let offset = read_usize(bytes, cursor)?;
    let string = read_option_string(bytes, cursor)?;
    let int = read_option_i64(bytes, cursor)?;
    let real = read_option_f64(bytes, cursor)?;
    Ok(Token {
        kind,
        pos: Position { line, column, offset },
        payload: Payload { string, int, real },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::builder::{ScannerBuilder, ScannerSpec};
    use crate::scanner::tokens::TokenKind;

    fn source(text: &str) -> MementoSource {
        let spec = ScannerSpec::new(
            TokenKind::Ident,
            TokenKind::IntLit,
            TokenKind::RealLit,
            TokenKind::Ignore,
            TokenKind::Eos,
        )
        .with_string('"', '\\', vec![], TokenKind::StringLit)
        .with_operator("+", TokenKind::Plus);
        let compiled = ScannerBuilder::build(spec).unwrap();
        MementoSource::tokenize(Scanner::new(compiled, text)).unwrap()
    }

    #[test]
    fn save_and_restore_rewinds_position() {
        let mut src = source("a b c");
        assert_eq!(src.current().kind, TokenKind::Ident);
        let checkpoint = src.save();
        src.advance();
        src.advance();
        assert_eq!(src.current().string_value(), Some("c"));
        src.restore(checkpoint);
        assert_eq!(src.current().string_value(), Some("a"));
    }

    #[test]
    fn encode_then_decode_reconstructs_the_same_tokens() {
        let original = source(r#"a + 12 "hi""#);
        let bytes = original.encode();
        let decoded = MementoSource::decode(&bytes).unwrap();
        assert_eq!(decoded.tokens, original.tokens);
        assert_eq!(decoded.pos, 0);
    }

    #[test]
    fn decode_rejects_truncated_data() {
        let original = source("a + 12");
        let mut bytes = original.encode();
        bytes.truncate(bytes.len() - 1);
        assert!(MementoSource::decode(&bytes).is_err());
    }

    #[test]
    fn advance_past_eos_stays_put() {
        let mut src = source("a");
        src.advance();
        assert_eq!(src.current().kind, TokenKind::Eos);
        src.advance();
        assert_eq!(src.current().kind, TokenKind::Eos);
    }
}
