//! Closure- and scope-specific end-to-end tests: captured bindings,
//! independent counter instances, and recursive self-reference by name.

use std::cell::RefCell;
use std::rc::Rc;

use velox::{Interpreter, VeloxConfig};

fn run_capturing(source: &str) -> Vec<String> {
    let printed = Rc::new(RefCell::new(Vec::new()));
    let sink = printed.clone();
    let config = VeloxConfig {
        print_sink: Box::new(move |line: &str| sink.borrow_mut().push(line.to_string())),
        ..VeloxConfig::default()
    };
    let mut interpreter = Interpreter::new(config);
    interpreter.run_source(source).unwrap();
    Rc::try_unwrap(printed).unwrap().into_inner()
}

#[test]
fn each_call_to_a_function_factory_gets_an_independent_counter() {
    let out = run_capturing(
        r#"
        function make_counter() {
            count = 0;
            return function() {
                count += 1;
                return count;
            };
        }
        a = make_counter();
        b = make_counter();
        print(a());
        print(a());
        print(b());
        "#,
    );
    assert_eq!(out, vec!["1", "2", "1"]);
}

#[test]
fn nested_closures_see_each_enclosing_scope() {
    let out = run_capturing(
        r#"
        function outer() {
            x = 1;
            function middle() {
                y = 2;
                function inner() {
                    return x + y;
                }
                return inner();
            }
            return middle();
        }
        print(outer());
        "#,
    );
    assert_eq!(out, vec!["3"]);
}

#[test]
fn a_function_expression_assigned_to_a_variable_can_recurse_by_its_own_name() {
    let out = run_capturing(
        r#"
        countdown = function(n) {
            if (n <= 0) {
                print(0);
                return;
            }
            print(n);
            countdown(n - 1);
        };
        countdown(2);
        "#,
    );
    assert_eq!(out, vec!["2", "1", "0"]);
}

#[test]
fn closures_capture_by_reference_not_by_snapshot() {
    let out = run_capturing(
        r#"
        x = 1;
        snapshot = function() {
            return x;
        };
        x = 2;
        print(snapshot());
        "#,
    );
    assert_eq!(out, vec!["2"]);
}
