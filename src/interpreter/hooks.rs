//! The standard hook library, top-level constants, and built-in script
//! function library, restored from `StandardVeloxHooks.cpp`: a handful of
//! native math functions plus `real`/`int` conversions, installed into the
//! root scope unless a host opts out via
//! [`VeloxConfig::install_builtins`](crate::interpreter::VeloxConfig).

use std::rc::Rc;

use crate::ast::NodeKind;
use crate::errors::RuntimeError;
use crate::language::velox_scanner;
use crate::parser::Parser;
use crate::scope::Scope;
use crate::source::Source;
use crate::value::{FunctionData, HookData, Value};

fn hook(name: &str, arity: usize, func: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static) -> Value {
    Value::Hook(Rc::new(HookData {
        name: name.to_string(),
        arity: Some(arity),
        func: Box::new(func),
    }))
}

fn arg_real(args: &[Value], index: usize, hook_name: &str) -> Result<f64, RuntimeError> {
    args.get(index)
        .and_then(Value::as_real)
        .ok_or_else(|| RuntimeError::new(format!("'{hook_name}' expects a numeric argument")))
}

fn unary_real(name: &'static str, f: impl Fn(f64) -> f64 + 'static) -> Value {
    hook(name, 1, move |args| Ok(Value::Real(f(arg_real(args, 0, name)?))))
}

/// Installs `sqrt, sin, cos, tan, atan, atan2, floor, ceil, pow, log,
/// toDegrees, toRadians, real, int` plus the `PI`, `E`, `MAX_INT`,
/// `MIN_INT`, `NULL` constants into `scope`, then [`install_script_library`]
/// on top.
pub fn install_standard_library(scope: &Scope) {
    scope.declare_local("sqrt", unary_real("sqrt", f64::sqrt));
    scope.declare_local("sin", unary_real("sin", f64::sin));
    scope.declare_local("cos", unary_real("cos", f64::cos));
    scope.declare_local("tan", unary_real("tan", f64::tan));
    scope.declare_local("atan", unary_real("atan", f64::atan));
    scope.declare_local("floor", unary_real("floor", f64::floor));
    scope.declare_local("ceil", unary_real("ceil", f64::ceil));
    scope.declare_local("log", unary_real("log", f64::ln));
    scope.declare_local("toDegrees", unary_real("toDegrees", f64::to_degrees));
    scope.declare_local("toRadians", unary_real("toRadians", f64::to_radians));

    scope.declare_local(
        "atan2",
        hook("atan2", 2, |args| {
            Ok(Value::Real(arg_real(args, 0, "atan2")?.atan2(arg_real(args, 1, "atan2")?)))
        }),
    );
    scope.declare_local(
        "pow",
        hook("pow", 2, |args| {
            Ok(Value::Real(arg_real(args, 0, "pow")?.powf(arg_real(args, 1, "pow")?)))
        }),
    );
    scope.declare_local(
        "real",
        hook("real", 1, |args| Ok(Value::Real(arg_real(args, 0, "real")?))),
    );
    scope.declare_local(
        "int",
        hook("int", 1, |args| Ok(Value::Int(arg_real(args, 0, "int")? as i64))),
    );

    scope.declare_local("PI", Value::Real(std::f64::consts::PI));
    scope.declare_local("E", Value::Real(std::f64::consts::E));
    scope.declare_local("MAX_INT", Value::Int(i64::MAX));
    scope.declare_local("MIN_INT", Value::Int(i64::MIN));
    scope.declare_local("NULL", Value::Undefined);

    install_script_library(scope);
}

/// `max`, `min`, `abs` are not native hooks: the original registers them as
/// a small library of built-in *script* functions supplied as AST
/// fragments rather than host callbacks. We parse the same handful of
/// Velox source once at start-up and bind the resulting `FunctionDecl`
/// nodes into `scope` exactly as the interpreter's own hoisting pass would.
fn install_script_library(scope: &Scope) {
    const SOURCE: &str = r#"
        function max(a, b) {
            if (a > b) {
                return a;
            }
            return b;
        }
        function min(a, b) {
            if (a < b) {
                return a;
            }
            return b;
        }
        function abs(n) {
            if (n < 0) {
                return -n;
            }
            return n;
        }
    "#;

    let source = Source::from_text(velox_scanner(), SOURCE)
        .expect("built-in script function library is valid Velox source");
    let program = Parser::new(source)
        .parse()
        .expect("built-in script function library is valid Velox source");

    for decl in &program.children {
        if decl.kind != NodeKind::FunctionDecl {
            continue;
        }
        let params = decl.child(0).children.iter().map(|p| p.string().to_string()).collect();
        let body = Rc::new(decl.child(1).clone());
        let function = Rc::new(FunctionData {
            name: Some(decl.string().to_string()),
            params,
            body,
            closure: scope.clone(),
        });
        scope.declare_local(decl.string().to_string(), Value::Function(function));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_hook_computes_root() {
        let scope = Scope::new_global();
        install_standard_library(&scope);
        let Some(Value::Hook(h)) = scope.find("sqrt") else {
            panic!("sqrt not installed");
        };
        let result = (h.func)(&[Value::Real(9.0)]).unwrap();
        assert_eq!(result.as_real(), Some(3.0));
    }

    #[test]
    fn constants_are_installed() {
        let scope = Scope::new_global();
        install_standard_library(&scope);
        assert_eq!(scope.find("PI").unwrap().as_real(), Some(std::f64::consts::PI));
        assert_eq!(scope.find("MAX_INT").unwrap().as_int(), Some(i64::MAX));
    }

    #[test]
    fn trig_conversion_hooks_use_the_spec_visible_names() {
        let scope = Scope::new_global();
        install_standard_library(&scope);
        assert!(scope.find("toDegrees").is_some());
        assert!(scope.find("toRadians").is_some());
        assert!(scope.find("to_degrees").is_none());
    }

    #[test]
    fn max_min_abs_are_installed_as_script_functions() {
        let scope = Scope::new_global();
        install_standard_library(&scope);
        for name in ["max", "min", "abs"] {
            match scope.find(name) {
                Some(Value::Function(_)) => {}
                other => panic!("expected '{name}' to be a script function, found {other:?}"),
            }
        }
    }
}
