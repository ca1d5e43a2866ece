//! Parser integration tests: build an AST from Velox source via the real
//! scanner and inspect its shape.

use velox::ast::NodeKind;
use velox::language::velox_scanner;
use velox::parser::Parser;
use velox::source::Source;

fn parse(text: &str) -> velox::ast::Node {
    let source = Source::from_text(velox_scanner(), text).unwrap();
    Parser::new(source).parse().unwrap()
}

#[test]
fn parses_a_function_declaration_with_parameters_and_a_return() {
    let program = parse("function add(a, b) { return a + b; }");
    assert_eq!(program.kind, NodeKind::Program);
    let func = program.child(0);
    assert_eq!(func.kind, NodeKind::FunctionDecl);
    assert_eq!(func.string(), "add");
}

#[test]
fn parses_a_class_with_a_constructor_method() {
    let program = parse(
        r#"
        class Point {
            function Point(x, y) {
                this.x = x;
                this.y = y;
            }
        }
        "#,
    );
    let class = program.child(0);
    assert_eq!(class.kind, NodeKind::ClassDecl);
    assert_eq!(class.string(), "Point");
}

#[test]
fn assignment_is_right_associative_and_lower_precedence_than_logical_or() {
    let program = parse("x = a || b;");
    let expr_stmt = program.child(0);
    let assign = expr_stmt.child(0);
    assert_eq!(assign.kind, NodeKind::Assign);
    let rhs = assign.child(1);
    assert_eq!(rhs.kind, NodeKind::Or);
}

#[test]
fn for_loop_produces_init_condition_step_and_body_children() {
    let program = parse("for (i = 0; i < 10; i += 1) { print(i); }");
    let for_node = program.child(0);
    assert_eq!(for_node.kind, NodeKind::For);
    assert_eq!(for_node.children.len(), 4);
}

#[test]
fn missing_semicolon_is_a_parse_error_with_a_line_number() {
    let source = Source::from_text(velox_scanner(), "x = 1\ny = 2;").unwrap();
    let err = Parser::new(source).parse().unwrap_err();
    assert_eq!(err.line, 2);
}

#[test]
fn assigning_to_a_call_expression_is_a_parse_error() {
    let source = Source::from_text(velox_scanner(), "if (false) { f() = 3; }").unwrap();
    let err = Parser::new(source).parse().unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn array_literal_and_indexing_parse_as_expected() {
    let program = parse("items = [1, 2, 3];\nfirst = items[0];");
    let second = program.child(1);
    let assign = second.child(0);
    let index = assign.child(1);
    assert_eq!(index.kind, NodeKind::Index);
}
