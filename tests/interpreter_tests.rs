//! Interpreter unit-ish integration tests covering individual language
//! features in isolation: scoping, arrays, hooks, errors, and imports.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use velox::{Interpreter, VeloxConfig};

fn run_capturing(source: &str) -> Result<Vec<String>, String> {
    let printed = Rc::new(RefCell::new(Vec::new()));
    let sink = printed.clone();
    let config = VeloxConfig {
        print_sink: Box::new(move |line: &str| sink.borrow_mut().push(line.to_string())),
        ..VeloxConfig::default()
    };
    let mut interpreter = Interpreter::new(config);
    interpreter
        .run_source(source)
        .map_err(|err| err.to_string())?;
    Ok(Rc::try_unwrap(printed).unwrap().into_inner())
}

#[test]
fn bare_assignment_creates_an_implicit_local_binding() {
    let out = run_capturing("x = 5;\nprint(x);").unwrap();
    assert_eq!(out, vec!["5"]);
}

#[test]
fn block_scoped_assignment_mutates_the_outer_binding_not_a_shadow() {
    let out = run_capturing(
        r#"
        x = 1;
        {
            x = 2;
        }
        print(x);
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["2"]);
}

#[test]
fn reading_an_unbound_identifier_auto_vivifies_undefined() {
    let out = run_capturing("print(never_assigned);").unwrap();
    assert_eq!(out, vec!["UNDEFINED"]);
}

#[test]
fn while_and_do_while_loops() {
    let out = run_capturing(
        r#"
        n = 0;
        while (n < 3) {
            print(n);
            n += 1;
        }
        m = 0;
        do {
            print(m);
            m += 1;
        } while (m < 1);
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["0", "1", "2", "0"]);
}

#[test]
fn break_and_continue_affect_only_the_innermost_loop() {
    let out = run_capturing(
        r#"
        for (i = 0; i < 5; i += 1) {
            if (i == 3) {
                break;
            }
            if (i == 1) {
                continue;
            }
            print(i);
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["0", "2"]);
}

#[test]
fn if_condition_must_be_a_strict_bool() {
    let err = run_capturing("if (1) { print(1); }").unwrap_err();
    assert!(err.contains("bool"), "{err}");
}

#[test]
fn calling_a_non_function_value_is_a_runtime_error() {
    let err = run_capturing("x = 5;\nx();").unwrap_err();
    assert!(err.to_lowercase().contains("callable") || err.to_lowercase().contains("call"), "{err}");
}

#[test]
fn array_append_via_plus_equals_mutates_in_place_and_is_visible_through_aliases() {
    let out = run_capturing(
        r#"
        a = [1, 2];
        b = a;
        a += 3;
        print(b[2]);
        print(b.length);
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["3", "3"]);
}

#[test]
fn array_index_out_of_bounds_is_a_runtime_error() {
    let err = run_capturing("items = [1, 2];\nprint(items[5]);").unwrap_err();
    assert!(err.contains("bounds"), "{err}");
}

#[test]
fn standard_hooks_are_installed_by_default() {
    let out = run_capturing("print(sqrt(16));").unwrap();
    assert_eq!(out, vec!["4"]);
}

#[test]
fn standard_hooks_can_be_disabled() {
    let config = VeloxConfig {
        install_builtins: false,
        ..VeloxConfig::default()
    };
    let mut interpreter = Interpreter::new(config);
    let err = interpreter.run_source("print(sqrt(16));").unwrap_err();
    assert!(err.to_string().contains("not callable"), "{err}");
}

#[test]
fn import_resolves_relative_to_the_importing_file() {
    let dir = std::env::temp_dir().join(format!(
        "velox_import_test_{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).unwrap();
    let lib_path = dir.join("lib.vx");
    let main_path = dir.join("main.vx");
    fs::write(&lib_path, "function helper() { return 99; }").unwrap();
    fs::write(&main_path, "import \"lib.vx\";\nprint(helper());").unwrap();

    let printed = Rc::new(RefCell::new(Vec::new()));
    let sink = printed.clone();
    let config = VeloxConfig {
        print_sink: Box::new(move |line: &str| sink.borrow_mut().push(line.to_string())),
        import_search_paths: vec![dir.clone()],
        ..VeloxConfig::default()
    };
    let mut interpreter = Interpreter::new(config);
    interpreter.run_file(&main_path).unwrap();
    assert_eq!(
        Rc::try_unwrap(printed).unwrap().into_inner(),
        vec!["99"]
    );

    let _ = fs::remove_dir_all(&dir);
}
