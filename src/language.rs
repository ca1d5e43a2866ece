//! The concrete Velox language front-end: one [`ScannerSpec`] wiring every
//! keyword, operator, string/number format and comment style in `TokenKind`
//! to the generic scanner-builder kit. This is the single source of truth
//! for "what does Velox source look like" — the parser's grammar assumes
//! exactly this token set.

use crate::scanner::{ScannerBuilder, ScannerSpec, TokenKind};

/// Builds the `ScannerSpec` for the full Velox language. Shared by the CLI
/// driver, the default file importer, and anything else that needs to turn
/// Velox source text into tokens.
pub fn velox_scanner_spec() -> ScannerSpec {
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
        vec![
            ('n', '\n'),
            ('t', '\t'),
            ('r', '\r'),
            ('"', '"'),
            ('\\', '\\'),
            ('0', '\0'),
        ],
        TokenKind::StringLit,
    )
    .with_keyword("if", TokenKind::If)
    .with_keyword("else", TokenKind::Else)
    .with_keyword("while", TokenKind::While)
    .with_keyword("do", TokenKind::Do)
    .with_keyword("for", TokenKind::For)
    .with_keyword("function", TokenKind::Function)
    .with_keyword("return", TokenKind::Return)
    .with_keyword("print", TokenKind::Print)
    .with_keyword("import", TokenKind::Import)
    .with_keyword("class", TokenKind::Class)
    .with_keyword("new", TokenKind::New)
    .with_keyword("global", TokenKind::Global)
    .with_keyword("break", TokenKind::Break)
    .with_keyword("continue", TokenKind::Continue)
    .with_keyword("true", TokenKind::True)
    .with_keyword("false", TokenKind::False)
    .with_keyword("undefined", TokenKind::Undefined)
    .with_operator("+", TokenKind::Plus)
    .with_operator("++", TokenKind::PlusPlus)
    .with_operator("+=", TokenKind::AssignAdd)
    .with_operator("-", TokenKind::Minus)
    .with_operator("--", TokenKind::MinusMinus)
    .with_operator("-=", TokenKind::AssignSub)
    .with_operator("*", TokenKind::Star)
    .with_operator("*=", TokenKind::AssignMul)
    .with_operator("/", TokenKind::Slash)
    .with_operator("/=", TokenKind::AssignDiv)
    .with_operator("%", TokenKind::Percent)
    .with_operator("%=", TokenKind::AssignMod)
    .with_operator("!", TokenKind::Not)
    .with_operator("!=", TokenKind::Ne)
    .with_operator("=", TokenKind::Assign)
    .with_operator("==", TokenKind::Eq)
    .with_operator("<", TokenKind::Lt)
    .with_operator("<=", TokenKind::Le)
    .with_operator(">", TokenKind::Gt)
    .with_operator(">=", TokenKind::Ge)
    .with_operator("&&", TokenKind::AndAnd)
    .with_operator("||", TokenKind::OrOr)
    .with_operator(".", TokenKind::Dot)
    .with_operator(",", TokenKind::Comma)
    .with_operator(";", TokenKind::Semicolon)
    .with_operator("(", TokenKind::LParen)
    .with_operator(")", TokenKind::RParen)
    .with_operator("{", TokenKind::LBrace)
    .with_operator("}", TokenKind::RBrace)
    .with_operator("[", TokenKind::LBracket)
    .with_operator("]", TokenKind::RBracket)
    .with_block_comment("/*", "*/")
    .with_line_comment("//")
}

/// Compiles [`velox_scanner_spec`] into the three scanner DFAs, panicking
/// only if the language front-end itself is misconfigured (never on script
/// input — malformed scripts fail later, at scan time).
pub fn velox_scanner() -> crate::scanner::CompiledScanner {
    ScannerBuilder::build(velox_scanner_spec()).expect("built-in Velox language spec is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velox_scanner_spec_compiles() {
        let _ = velox_scanner();
    }
}
