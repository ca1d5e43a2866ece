//! Scanner integration tests against the concrete Velox token grammar.

use velox::language::velox_scanner;
use velox::scanner::{MementoSource, Scanner, TokenKind};

fn tokenize(source: &str) -> Result<MementoSource, velox::errors::ScanError> {
    let compiled = velox_scanner();
    MementoSource::tokenize(Scanner::new(compiled, source))
}

fn kinds(source: &str) -> Vec<TokenKind> {
    let mut stream = tokenize(source).unwrap();
    let mut out = vec![stream.current().kind];
    while !stream.is_at_end() {
        out.push(stream.advance().kind);
    }
    out
}

#[test]
fn tokenizes_identifiers_numbers_strings_and_operators() {
    let kinds = kinds("abc 12 3.5 \"hi\\n\" +=");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident,
            TokenKind::IntLit,
            TokenKind::RealLit,
            TokenKind::StringLit,
            TokenKind::PlusEq,
            TokenKind::Eos,
        ]
    );
}

#[test]
fn keywords_take_priority_over_identifiers() {
    assert_eq!(
        kinds("if else while function"),
        vec![
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Function,
            TokenKind::Eos,
        ]
    );
}

#[test]
fn maximal_munch_prefers_the_longest_operator() {
    assert_eq!(
        kinds("+ ++ += +"),
        vec![
            TokenKind::Plus,
            TokenKind::PlusPlus,
            TokenKind::PlusEq,
            TokenKind::Plus,
            TokenKind::Eos,
        ]
    );
}

#[test]
fn line_and_block_comments_are_ignored() {
    let mut stream = tokenize("x // trailing comment\n/* block\ncomment */ y").unwrap();
    let mut idents = Vec::new();
    loop {
        let token = stream.current();
        if token.kind == TokenKind::Ident {
            idents.push(token.string_value().unwrap().to_string());
        }
        if stream.is_at_end() {
            break;
        }
        stream.advance();
    }
    assert_eq!(idents, vec!["x", "y"]);
}

#[test]
fn string_escapes_are_decoded() {
    let stream = tokenize(r#""a\tb\"c""#).unwrap();
    assert_eq!(stream.current().kind, TokenKind::StringLit);
    assert_eq!(stream.current().string_value().unwrap(), "a\tb\"c");
}

#[test]
fn unterminated_string_is_a_scan_error() {
    let err = tokenize("\"unterminated").unwrap_err();
    assert_eq!(err.line, 1);
}
