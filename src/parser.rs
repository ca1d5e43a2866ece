//! Component G: the recursive-descent parser. Consumes a [`Source`] and
//! produces a [`Node`] tree rooted at [`NodeKind::Program`].
//!
//! Precedence, low to high: assignment, `||`, `&&`, equality, relational,
//! additive, multiplicative, unary, postfix (call/index/member/`++`/`--`
//! chains), primary.

use crate::ast::{Node, NodeKind};
use crate::errors::ParseError;
use crate::scanner::TokenKind;
use crate::source::Source;

pub struct Parser {
    source: Source,
}

type PResult = Result<Node, ParseError>;

impl Parser {
    pub fn new(source: Source) -> Self {
        Self { source }
    }

    pub fn parse(mut self) -> PResult {
        let line = self.source.current_line();
        let mut program = Node::new(NodeKind::Program, line);
        while !self.source.check(TokenKind::Eos) {
            program = program.with_child(self.declaration()?);
        }
        Ok(program)
    }

    fn declaration(&mut self) -> PResult {
        match self.source.current_kind() {
            TokenKind::Function => self.function_decl(),
            TokenKind::Class => self.class_decl(),
            TokenKind::Global => self.global_decl(),
            _ => self.statement(),
        }
    }

    fn function_decl(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::Function)?;
        let name = self.source.expect(TokenKind::Ident)?;
        let params = self.param_list()?;
        let body = self.block()?;
        Ok(Node::new(NodeKind::FunctionDecl, line)
            .with_string(name.string_value().unwrap_or_default())
            .with_child(params)
            .with_child(body))
    }

    fn function_expr(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::Function)?;
        let params = self.param_list()?;
        let body = self.block()?;
        Ok(Node::new(NodeKind::FunctionExpr, line)
            .with_child(params)
            .with_child(body))
    }

    fn param_list(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::LParen)?;
        let mut params = Node::new(NodeKind::Arguments, line);
        if !self.source.check(TokenKind::RParen) {
            loop {
                let tok = self.source.expect(TokenKind::Ident)?;
                params = params.with_child(
                    Node::new(NodeKind::Param, tok.pos.line)
                        .with_string(tok.string_value().unwrap_or_default()),
                );
                if !self.source.accept(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.source.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn class_decl(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::Class)?;
        let name = self.source.expect(TokenKind::Ident)?;
        self.source.expect(TokenKind::LBrace)?;
        let mut class = Node::new(NodeKind::ClassDecl, line)
            .with_string(name.string_value().unwrap_or_default());
        while !self.source.check(TokenKind::RBrace) {
            class = class.with_child(self.class_member()?);
        }
        self.source.expect(TokenKind::RBrace)?;
        Ok(class)
    }

    fn class_member(&mut self) -> PResult {
        if self.source.check(TokenKind::Function) {
            let line = self.source.current_line();
            self.source.expect(TokenKind::Function)?;
            let name = self.source.expect(TokenKind::Ident)?;
            let params = self.param_list()?;
            let body = self.block()?;
            Ok(Node::new(NodeKind::Method, line)
                .with_string(name.string_value().unwrap_or_default())
                .with_child(params)
                .with_child(body))
        } else {
            let tok = self.source.expect(TokenKind::Ident)?;
            self.source.expect(TokenKind::Semicolon)?;
            Ok(Node::new(NodeKind::Field, tok.pos.line)
                .with_string(tok.string_value().unwrap_or_default()))
        }
    }

    fn global_decl(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::Global)?;
        let mut decl = Node::new(NodeKind::VarDecl, line);
        loop {
            let name_tok = self.source.expect(TokenKind::Ident)?;
            let mut entry = Node::new(NodeKind::Ident, name_tok.pos.line)
                .with_string(name_tok.string_value().unwrap_or_default());
            if self.source.accept(TokenKind::Assign) {
                entry = entry.with_child(self.expression()?);
            }
            decl = decl.with_child(entry);
            if !self.source.accept(TokenKind::Comma) {
                break;
            }
        }
        self.source.expect(TokenKind::Semicolon)?;
        Ok(decl)
    }

    fn statement(&mut self) -> PResult {
        match self.source.current_kind() {
            TokenKind::LBrace => self.block(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::Do => self.do_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Break => self.simple_keyword_stmt(NodeKind::Break, TokenKind::Break),
            TokenKind::Continue => self.simple_keyword_stmt(NodeKind::Continue, TokenKind::Continue),
            TokenKind::Print => self.print_stmt(),
            TokenKind::Import => self.import_stmt(),
            _ => self.expr_stmt(),
        }
    }

    fn block(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::LBrace)?;
        let mut block = Node::new(NodeKind::Block, line);
        while !self.source.check(TokenKind::RBrace) {
            block = block.with_child(self.declaration()?);
        }
        self.source.expect(TokenKind::RBrace)?;
        Ok(block)
    }

    fn if_stmt(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::If)?;
        self.source.expect(TokenKind::LParen)?;
        let cond = self.expression()?;
        self.source.expect(TokenKind::RParen)?;
        let then_branch = self.statement()?;
        let mut node = Node::new(NodeKind::If, line).with_child(cond).with_child(then_branch);
        if self.source.accept(TokenKind::Else) {
            node = node.with_child(self.statement()?);
        }
        Ok(node)
    }

    fn while_stmt(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::While)?;
        self.source.expect(TokenKind::LParen)?;
        let cond = self.expression()?;
        self.source.expect(TokenKind::RParen)?;
        let body = self.statement()?;
        Ok(Node::new(NodeKind::While, line).with_child(cond).with_child(body))
    }

    fn do_stmt(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::Do)?;
        let body = self.statement()?;
        self.source.expect(TokenKind::While)?;
        self.source.expect(TokenKind::LParen)?;
        let cond = self.expression()?;
        self.source.expect(TokenKind::RParen)?;
        self.source.expect(TokenKind::Semicolon)?;
        Ok(Node::new(NodeKind::Do, line).with_child(body).with_child(cond))
    }

    fn for_stmt(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::For)?;
        self.source.expect(TokenKind::LParen)?;

        let init = if self.source.accept(TokenKind::Semicolon) {
            Node::new(NodeKind::Block, line)
        } else {
            self.expr_stmt()?
        };

        let cond = if self.source.check(TokenKind::Semicolon) {
            Node::new(NodeKind::BoolLit, line).with_int(1)
        } else {
            self.expression()?
        };
        self.source.expect(TokenKind::Semicolon)?;

        let step = if self.source.check(TokenKind::RParen) {
            Node::new(NodeKind::Block, line)
        } else {
            self.expression()?
        };
        self.source.expect(TokenKind::RParen)?;

        let body = self.statement()?;
        Ok(Node::new(NodeKind::For, line)
            .with_child(init)
            .with_child(cond)
            .with_child(step)
            .with_child(body))
    }

    fn return_stmt(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::Return)?;
        let mut node = Node::new(NodeKind::Return, line);
        if !self.source.check(TokenKind::Semicolon) {
            node = node.with_child(self.expression()?);
        }
        self.source.expect(TokenKind::Semicolon)?;
        Ok(node)
    }

    fn simple_keyword_stmt(&mut self, kind: NodeKind, token: TokenKind) -> PResult {
        let line = self.source.current_line();
        self.source.expect(token)?;
        self.source.expect(TokenKind::Semicolon)?;
        Ok(Node::new(kind, line))
    }

    fn print_stmt(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::Print)?;
        let expr = self.expression()?;
        self.source.expect(TokenKind::Semicolon)?;
        Ok(Node::new(NodeKind::Print, line).with_child(expr))
    }

    fn import_stmt(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::Import)?;
        let tok = self.source.expect(TokenKind::StringLit)?;
        self.source.expect(TokenKind::Semicolon)?;
        Ok(Node::new(NodeKind::Import, line).with_string(tok.string_value().unwrap_or_default()))
    }

    fn expr_stmt(&mut self) -> PResult {
        let expr = self.expression()?;
        self.source.expect(TokenKind::Semicolon)?;
        Ok(Node::new(NodeKind::ExprStmt, expr.line).with_child(expr))
    }

    fn expression(&mut self) -> PResult {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult {
        let target = self.logic_or()?;
        let kind = match self.source.current_kind() {
            TokenKind::Assign => Some(NodeKind::Assign),
            TokenKind::AssignAdd => Some(NodeKind::AssignAdd),
            TokenKind::AssignSub => Some(NodeKind::AssignSub),
            TokenKind::AssignMul => Some(NodeKind::AssignMul),
            TokenKind::AssignDiv => Some(NodeKind::AssignDiv),
            TokenKind::AssignMod => Some(NodeKind::AssignMod),
            _ => None,
        };
        match kind {
            Some(node_kind) => {
                if !matches!(target.kind, NodeKind::Ident | NodeKind::Member | NodeKind::Index) {
                    return Err(ParseError::new(
                        target.line,
                        format!("invalid assignment target: {:?}", target.kind),
                    ));
                }
                let line = self.source.current_line();
                self.source.advance();
                let value = self.assignment()?;
                Ok(Node::new(node_kind, line).with_child(target).with_child(value))
            }
            None => Ok(target),
        }
    }

    fn logic_or(&mut self) -> PResult {
        let mut node = self.logic_and()?;
        while self.source.check(TokenKind::OrOr) {
            let line = self.source.current_line();
            self.source.advance();
            let rhs = self.logic_and()?;
            node = Node::new(NodeKind::Or, line).with_child(node).with_child(rhs);
        }
        Ok(node)
    }

    fn logic_and(&mut self) -> PResult {
        let mut node = self.equality()?;
        while self.source.check(TokenKind::AndAnd) {
            let line = self.source.current_line();
            self.source.advance();
            let rhs = self.equality()?;
            node = Node::new(NodeKind::And, line).with_child(node).with_child(rhs);
        }
        Ok(node)
    }

    fn equality(&mut self) -> PResult {
        let mut node = self.relational()?;
        loop {
            let kind = match self.source.current_kind() {
                TokenKind::Eq => NodeKind::Eq,
                TokenKind::Ne => NodeKind::Ne,
                _ => break,
            };
            let line = self.source.current_line();
            self.source.advance();
            let rhs = self.relational()?;
            node = Node::new(kind, line).with_child(node).with_child(rhs);
        }
        Ok(node)
    }

    fn relational(&mut self) -> PResult {
        let mut node = self.additive()?;
        loop {
            let kind = match self.source.current_kind() {
                TokenKind::Lt => NodeKind::Lt,
                TokenKind::Le => NodeKind::Le,
                TokenKind::Gt => NodeKind::Gt,
                TokenKind::Ge => NodeKind::Ge,
                _ => break,
            };
            let line = self.source.current_line();
            self.source.advance();
            let rhs = self.additive()?;
            node = Node::new(kind, line).with_child(node).with_child(rhs);
        }
        Ok(node)
    }

    fn additive(&mut self) -> PResult {
        let mut node = self.multiplicative()?;
        loop {
            let kind = match self.source.current_kind() {
                TokenKind::Plus => NodeKind::Add,
                TokenKind::Minus => NodeKind::Sub,
                _ => break,
            };
            let line = self.source.current_line();
            self.source.advance();
            let rhs = self.multiplicative()?;
            node = Node::new(kind, line).with_child(node).with_child(rhs);
        }
        Ok(node)
    }

    fn multiplicative(&mut self) -> PResult {
        let mut node = self.unary()?;
        loop {
            let kind = match self.source.current_kind() {
                TokenKind::Star => NodeKind::Mul,
                TokenKind::Slash => NodeKind::Div,
                TokenKind::Percent => NodeKind::Mod,
                _ => break,
            };
            let line = self.source.current_line();
            self.source.advance();
            let rhs = self.unary()?;
            node = Node::new(kind, line).with_child(node).with_child(rhs);
        }
        Ok(node)
    }

    fn unary(&mut self) -> PResult {
        let kind = match self.source.current_kind() {
            TokenKind::Not => Some(NodeKind::Not),
            TokenKind::Minus => Some(NodeKind::Neg),
            TokenKind::PlusPlus => Some(NodeKind::PreInc),
            TokenKind::MinusMinus => Some(NodeKind::PreDec),
            _ => None,
        };
        match kind {
            Some(node_kind) => {
                let line = self.source.current_line();
                self.source.advance();
                let operand = self.unary()?;
                Ok(Node::new(node_kind, line).with_child(operand))
            }
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> PResult {
        let mut node = self.primary()?;
        loop {
            node = match self.source.current_kind() {
                TokenKind::Dot => {
                    let line = self.source.current_line();
                    self.source.advance();
                    let name = self.source.expect(TokenKind::Ident)?;
                    Node::new(NodeKind::Member, line)
                        .with_string(name.string_value().unwrap_or_default())
                        .with_child(node)
                }
                TokenKind::LBracket => {
                    let line = self.source.current_line();
                    self.source.advance();
                    let index = self.expression()?;
                    self.source.expect(TokenKind::RBracket)?;
                    Node::new(NodeKind::Index, line).with_child(node).with_child(index)
                }
                TokenKind::LParen => {
                    let line = self.source.current_line();
                    let args = self.arguments()?;
                    Node::new(NodeKind::Call, line).with_child(node).with_child(args)
                }
                TokenKind::PlusPlus => {
                    let line = self.source.current_line();
                    self.source.advance();
                    Node::new(NodeKind::PostInc, line).with_child(node)
                }
                TokenKind::MinusMinus => {
                    let line = self.source.current_line();
                    self.source.advance();
                    Node::new(NodeKind::PostDec, line).with_child(node)
                }
                _ => break,
            };
        }
        Ok(node)
    }

    fn arguments(&mut self) -> PResult {
        let line = self.source.current_line();
        self.source.expect(TokenKind::LParen)?;
        let mut args = Node::new(NodeKind::Arguments, line);
        if !self.source.check(TokenKind::RParen) {
            loop {
                args = args.with_child(self.expression()?);
                if !self.source.accept(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.source.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn primary(&mut self) -> PResult {
        let line = self.source.current_line();
        match self.source.current_kind() {
            TokenKind::IntLit => {
                let tok = self.source.advance();
                Ok(Node::new(NodeKind::IntLit, line).with_int(tok.int_value().unwrap_or_default()))
            }
            TokenKind::RealLit => {
                let tok = self.source.advance();
                Ok(Node::new(NodeKind::RealLit, line).with_real(tok.real_value().unwrap_or_default()))
            }
            TokenKind::StringLit => {
                let tok = self.source.advance();
                Ok(Node::new(NodeKind::StringLit, line)
                    .with_string(tok.string_value().unwrap_or_default()))
            }
            TokenKind::True => {
                self.source.advance();
                Ok(Node::new(NodeKind::BoolLit, line).with_int(1))
            }
            TokenKind::False => {
                self.source.advance();
                Ok(Node::new(NodeKind::BoolLit, line).with_int(0))
            }
            TokenKind::Undefined => {
                self.source.advance();
                Ok(Node::new(NodeKind::Undefined, line))
            }
            TokenKind::Ident => {
                let tok = self.source.advance();
                Ok(Node::new(NodeKind::Ident, line)
                    .with_string(tok.string_value().unwrap_or_default()))
            }
            TokenKind::LParen => {
                self.source.advance();
                let inner = self.expression()?;
                self.source.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.source.advance();
                let mut array = Node::new(NodeKind::ArrayLit, line);
                if !self.source.check(TokenKind::RBracket) {
                    loop {
                        array = array.with_child(self.expression()?);
                        if !self.source.accept(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.source.expect(TokenKind::RBracket)?;
                Ok(array)
            }
            TokenKind::New => {
                self.source.advance();
                let name = self.source.expect(TokenKind::Ident)?;
                let args = self.arguments()?;
                Ok(Node::new(NodeKind::New, line)
                    .with_string(name.string_value().unwrap_or_default())
                    .with_child(args))
            }
            TokenKind::Function => self.function_expr(),
            _ => {
                let found = self.source.current_kind();
                Err(ParseError::new(line, format!("unexpected token {found:?}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ScannerBuilder, ScannerSpec};

    fn parse(text: &str) -> Node {
        let spec = ScannerSpec::new(
            TokenKind::Ident,
            TokenKind::IntLit,
            TokenKind::RealLit,
            TokenKind::Ignore,
            TokenKind::Eos,
        )
        .with_hex_prefix(true)
        .with_string('"', '\\', vec![('n', '\n'), ('"', '"'), ('\\', '\\')], TokenKind::StringLit)
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
        .with_line_comment("//");
        let compiled = ScannerBuilder::build(spec).unwrap();
        let source = Source::from_text(compiled, text).unwrap();
        Parser::new(source).parse().unwrap()
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let program = parse("1 + 2 * 3;");
        let expr = &program.child(0).child(0);
        assert_eq!(expr.kind, NodeKind::Add);
        assert_eq!(expr.child(1).kind, NodeKind::Mul);
    }

    #[test]
    fn parses_function_decl_with_params_and_return() {
        let program = parse("function add(a, b) { return a + b; }");
        let func = program.child(0);
        assert_eq!(func.kind, NodeKind::FunctionDecl);
        assert_eq!(func.string(), "add");
        assert_eq!(func.child(0).children.len(), 2);
    }

    #[test]
    fn parses_call_chains_and_member_access() {
        let program = parse("a.b(1, 2)[0];");
        let expr = program.child(0).child(0);
        assert_eq!(expr.kind, NodeKind::Index);
        assert_eq!(expr.child(0).kind, NodeKind::Call);
    }

    #[test]
    fn parses_compound_assignment() {
        let program = parse("x += 1;");
        let expr = program.child(0).child(0);
        assert_eq!(expr.kind, NodeKind::AssignAdd);
    }

    #[test]
    fn parses_class_with_fields_and_methods() {
        let program = parse("class Point { x; y; function length() { return x; } }");
        let class = program.child(0);
        assert_eq!(class.kind, NodeKind::ClassDecl);
        assert_eq!(class.children.len(), 3);
        assert_eq!(class.child(2).kind, NodeKind::Method);
    }

    #[test]
    fn parses_array_literal_and_new_expression() {
        let program = parse("x = [1, 2, new Point(1, 2)];");
        let array = program.child(0).child(0).child(1);
        assert_eq!(array.kind, NodeKind::ArrayLit);
        assert_eq!(array.child(2).kind, NodeKind::New);
    }

    #[test]
    fn parses_for_loop_with_empty_clauses() {
        let program = parse("for (;;) { break; }");
        let for_node = program.child(0);
        assert_eq!(for_node.kind, NodeKind::For);
        assert_eq!(for_node.child(1).kind, NodeKind::BoolLit);
    }

    #[test]
    fn rejects_unexpected_token() {
        let spec = ScannerSpec::new(
            TokenKind::Ident,
            TokenKind::IntLit,
            TokenKind::RealLit,
            TokenKind::Ignore,
            TokenKind::Eos,
        )
        .with_string('"', '\\', vec![], TokenKind::StringLit)
        .with_operator(";", TokenKind::Semicolon)
        .with_operator(")", TokenKind::RParen);
        let compiled = ScannerBuilder::build(spec).unwrap();
        let source = Source::from_text(compiled, ")").unwrap();
        assert!(Parser::new(source).parse().is_err());
    }
}
