//! S-expression reduction and function application.
//!
//! Evaluation is a small set of rules over [`Value`]:
//! numbers, strings, booleans, errors, functions and Q-expressions are
//! self-evaluating; symbols resolve through the environment chain; and
//! S-expressions reduce by evaluating their children left to right, then
//! applying the first child to the rest.
//!
//! Error values short-circuit an S-expression after the child pass: the
//! first error among the evaluated children becomes the result of the whole
//! expression. The `Err` side of [`EvalResult`] is reserved for the `exit`
//! control signal and propagates with `?`.
//!
//! Recursion depth is bounded by the host stack; deeply nested input is the
//! caller's responsibility.

use crate::{EvalResult, LispError};
use crate::ast::{Lambda, VARIADIC_MARKER, Value};
use crate::env::Environment;

/// Evaluate a value in the given environment.
pub fn eval(env: &Environment, value: Value) -> EvalResult {
    match value {
        // Unbound symbols produce an error value, not a host error
        Value::Symbol(name) => match env.lookup(&name) {
            Ok(value) => Ok(value),
            Err(err) => Ok(Value::Error(err)),
        },
        Value::Sexpr(items) => eval_sexpr(env, items),
        // Everything else is self-evaluating, including Q-expressions
        other => Ok(other),
    }
}

fn eval_sexpr(env: &Environment, items: Vec<Value>) -> EvalResult {
    let mut children = Vec::with_capacity(items.len());
    for item in items {
        children.push(eval(env, item)?);
    }

    // First error among the children wins, in argument order
    if let Some(pos) = children.iter().position(Value::is_error) {
        return Ok(children.swap_remove(pos));
    }

    if children.is_empty() {
        return Ok(Value::Sexpr(children));
    }
    if children.len() == 1 {
        return Ok(children.remove(0));
    }

    let func = children.remove(0);
    apply(env, func, children)
}

/// Apply an already-evaluated function value to already-evaluated arguments.
pub fn apply(env: &Environment, func: Value, args: Vec<Value>) -> EvalResult {
    match func {
        Value::Builtin(builtin) => (builtin.func)(env, args),
        Value::Lambda(lambda) => apply_lambda(*lambda, args),
        other => Ok(Value::Error(LispError::NotAFunction(other.type_of()))),
    }
}

/// Bind arguments to formals in a fresh child of the captured environment,
/// then either evaluate the body (saturated call) or return a new function
/// carrying the remaining formals (partial application).
fn apply_lambda(lambda: Lambda, args: Vec<Value>) -> EvalResult {
    let Lambda {
        mut formals,
        body,
        env,
    } = lambda;

    let expected = formals.len();
    let given = args.len();

    // The call scope chains to the *captured* environment: bodies see the
    // scope the function was defined in, not the caller's scope.
    let scope = env.child();

    let mut args = args.into_iter();
    loop {
        let Some(arg) = args.next() else { break };

        if formals.is_empty() {
            return Ok(Value::Error(LispError::TooManyArguments {
                got: given,
                expected,
            }));
        }

        let name = match formals.remove(0) {
            Value::Symbol(name) => name,
            other => {
                return Ok(Value::Error(LispError::NonSymbolBinding {
                    op: "\\".into(),
                    got: other.type_of(),
                }));
            }
        };

        if name == VARIADIC_MARKER {
            // The marker must pair with exactly one trailing symbol, which
            // collects this argument and all remaining ones
            let rest_name = match (formals.len(), formals.pop()) {
                (1, Some(Value::Symbol(rest_name))) => rest_name,
                _ => return Ok(Value::Error(LispError::MalformedVariadic)),
            };
            let rest: Vec<Value> = std::iter::once(arg).chain(args).collect();
            scope.define_local(rest_name, Value::Qexpr(rest));
            return eval(&scope, Value::Sexpr(body));
        }

        scope.define_local(name, arg);
    }

    // No surplus arguments reached the variadic pair: the rest name still
    // gets bound, to the empty Q-expression
    if let [Value::Symbol(marker), ..] = formals.as_slice()
        && marker == VARIADIC_MARKER
    {
        if formals.len() != 2 {
            return Ok(Value::Error(LispError::MalformedVariadic));
        }
        let rest_name = match formals.pop() {
            Some(Value::Symbol(rest_name)) => rest_name,
            _ => return Ok(Value::Error(LispError::MalformedVariadic)),
        };
        formals.pop();
        scope.define_local(rest_name, Value::Qexpr(Vec::new()));
    }

    if formals.is_empty() {
        // Saturated: the body Q-expression evaluates as an S-expression
        eval(&scope, Value::Sexpr(body))
    } else {
        // Partial application: a new function wanting the rest
        Ok(Value::Lambda(Box::new(Lambda {
            formals,
            body,
            env: scope,
        })))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::Exit;
    use crate::ast::{sym, val};
    use crate::builtins::create_global_env;
    use crate::reader::parse_expr;

    /// Test result variants for comprehensive testing
    #[derive(Debug)]
    enum TestResult {
        EvalsTo(Value),              // Evaluation should produce this value
        ErrorValue(&'static str),    // Should produce an error value whose rendering contains this
        Exits(i32),                  // Should raise the exit signal with this code
    }
    use TestResult::*;

    /// Test environment containing test cases that share state
    struct TestEnvironment(Vec<(&'static str, TestResult)>);

    /// Micro-helper for success cases
    fn success<T: Into<Value>>(value: T) -> TestResult {
        EvalsTo(val(value))
    }

    /// Micro-helper for Q-expression results
    fn qx(items: Vec<Value>) -> TestResult {
        EvalsTo(Value::Qexpr(items))
    }

    /// Macro for setup expressions that return unit (like def)
    macro_rules! test_setup {
        ($expr:expr) => {
            ($expr, EvalsTo(Value::unit()))
        };
    }

    /// Run tests in isolated environments with shared state
    fn run_tests_in_environment(test_environments: Vec<TestEnvironment>) {
        for (env_idx, TestEnvironment(test_cases)) in test_environments.iter().enumerate() {
            let env = create_global_env();

            for (test_idx, (input, expected)) in test_cases.iter().enumerate() {
                let test_id = format!("Environment #{} test #{}", env_idx + 1, test_idx + 1);
                execute_test_case(input, expected, &env, &test_id);
            }
        }
    }

    /// Execute a single test case with detailed error reporting
    fn execute_test_case(input: &str, expected: &TestResult, env: &Environment, test_id: &str) {
        let expr = match parse_expr(input) {
            Ok(expr) => expr,
            Err(parse_err) => {
                panic!("{test_id}: unexpected parse error for '{input}': {parse_err:?}");
            }
        };

        match (eval(env, expr), expected) {
            (Ok(actual), EvalsTo(expected_val)) => {
                assert_eq!(
                    actual, *expected_val,
                    "{test_id}: expected {expected_val:?}, got {actual:?}"
                );
            }
            (Ok(Value::Error(err)), ErrorValue(expected_text)) => {
                let message = format!("{err}");
                assert!(
                    message.contains(expected_text),
                    "{test_id}: error should contain '{expected_text}', got: {message}"
                );
            }
            (Ok(actual), ErrorValue(expected_text)) => {
                panic!(
                    "{test_id}: expected error value containing '{expected_text}', got {actual:?}"
                );
            }
            (Err(Exit { code }), Exits(expected_code)) => {
                assert_eq!(
                    code, *expected_code,
                    "{test_id}: expected exit code {expected_code}, got {code}"
                );
            }
            (Err(Exit { code }), _) => {
                panic!("{test_id}: unexpected exit signal with code {code}");
            }
            (Ok(actual), Exits(expected_code)) => {
                panic!("{test_id}: expected exit with code {expected_code}, got {actual:?}");
            }
        }
    }

    /// Simplified test runner: each case gets a fresh global environment
    fn run_comprehensive_tests(test_cases: Vec<(&str, TestResult)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let env = create_global_env();
            let test_id = format!("#{}", i + 1);
            execute_test_case(input, expected, &env, &test_id);
        }
    }

    #[test]
    #[expect(clippy::too_many_lines)] // Comprehensive test coverage is intentionally thorough
    fn test_comprehensive_operations_data_driven() {
        let test_cases = vec![
            // === SELF-EVALUATING FORMS ===
            ("42", success(42)),
            ("-271", success(-271)),
            ("3.5", success(3.5)),
            ("-0.25", success(-0.25)),
            ("9223372036854775807", success(i64::MAX)),
            ("True", success(true)),
            ("False", success(false)),
            ("\"hello\"", success("hello")),
            ("\"\"", success("")),
            ("\"with\\\"quotes\"", success("with\"quotes")),
            // Q-expressions are inert data
            ("{1 2 3}", qx(vec![val(1), val(2), val(3)])),
            ("{+ 1 2}", qx(vec![sym("+"), val(1), val(2)])),
            ("{}", qx(vec![])),
            ("{head {tail}}", qx(vec![sym("head"), Value::Qexpr(vec![sym("tail")])])),
            // === S-EXPRESSION REDUCTION ===
            // Empty S-expression is the unit value
            ("()", EvalsTo(Value::unit())),
            // Singleton unwrapping
            ("(5)", success(5)),
            ("((+ 1 2))", success(3)),
            ("(((42)))", success(42)),
            // Head must be callable
            ("(1 2 3)", ErrorValue("First element is not a function")),
            ("(\"no\" 1)", ErrorValue("First element is not a function")),
            ("({a} 1)", ErrorValue("First element is not a function")),
            // === SYMBOL RESOLUTION ===
            ("missing", ErrorValue("Unbound symbol 'missing'")),
            ("(+ 1 missing)", ErrorValue("Unbound symbol 'missing'")),
            // === ARITHMETIC ===
            ("(+ 1 2 3)", success(6)),
            ("(- 10 3 2)", success(5)),
            ("(- 5)", success(-5)),
            ("(- 5.5)", success(-5.5)),
            ("(* 2 3 4)", success(24)),
            ("(/ 10 3)", success(3)),
            ("(/ 7 2 2)", success(1)),
            ("(% 10 3)", success(1)),
            ("(^ 2 10)", success(1024)),
            ("(min 3 1 2)", success(1)),
            ("(max 1 5 3)", success(5)),
            // Integer/decimal promotion
            ("(+ 1 2.5)", success(3.5)),
            ("(+ 2.5 1)", success(3.5)),
            ("(* 2 0.5)", success(1.0)),
            ("(/ 10 4.0)", success(2.5)),
            ("(min 2 1.5)", success(1.5)),
            ("(max 2 2.5)", success(2.5)),
            // Nested arithmetic
            ("(+ (* 2 3) (- 8 2))", success(12)),
            // Arithmetic failures
            ("(/ 1 0)", ErrorValue("Division by zero")),
            ("(/ 1.0 0)", ErrorValue("Division by zero")),
            ("(% 5 0)", ErrorValue("Modulus by zero")),
            ("(% 5.0 0.0)", ErrorValue("Modulus by zero")),
            ("(+ 9223372036854775807 1)", ErrorValue("overflow")),
            ("(- -9223372036854775808)", ErrorValue("overflow")),
            ("(* 4611686018427387904 2)", ErrorValue("overflow")),
            ("(+ 1 {})", ErrorValue("non-number")),
            ("(+ True 1)", ErrorValue("non-number")),
            ("(+)", ErrorValue("incorrect number")),
            // === COMPARISON ===
            ("(> 5 3)", success(true)),
            ("(< 5 3)", success(false)),
            ("(>= 3 3)", success(true)),
            ("(<= 4 3)", success(false)),
            ("(< 1 2.5)", success(true)),
            ("(> 2.5 2)", success(true)),
            ("(> {a} 1)", ErrorValue("non-number")),
            ("(> 1 2 3)", ErrorValue("incorrect number")),
            // === EQUALITY ===
            ("(== 1 1)", success(true)),
            ("(== 1 2)", success(false)),
            // No numeric coercion across kinds
            ("(== 1 1.0)", success(false)),
            ("(== \"a\" \"a\")", success(true)),
            ("(== {1 2} {1 2})", success(true)),
            ("(== {a} {b})", success(false)),
            ("(!= 1 2)", success(true)),
            ("(!= {1} {1})", success(false)),
            ("(== 1 1 1)", ErrorValue("incorrect number")),
            // === BOOLEAN LOGIC ===
            ("(&& True True)", success(true)),
            ("(&& True False)", success(false)),
            ("(|| False True)", success(true)),
            ("(|| False False)", success(false)),
            ("(! True)", success(false)),
            ("(! False)", success(true)),
            ("(&& 1 True)", ErrorValue("incorrect type")),
            ("(! 0)", ErrorValue("incorrect type")),
            // === CONDITIONALS ===
            ("(if True {1} {2})", success(1)),
            ("(if False {1} {2})", success(2)),
            ("(if (> 2 1) {+ 1 1} {0})", success(2)),
            ("(if False {1} {head {a b}})", qx(vec![sym("a")])),
            ("(if 1 {a} {b})", ErrorValue("incorrect type")),
            ("(if True {1})", ErrorValue("incorrect number")),
            // === LIST OPERATIONS ===
            ("(list 1 2 3)", qx(vec![val(1), val(2), val(3)])),
            ("(list)", qx(vec![])),
            ("(head {1 2 3})", qx(vec![val(1)])),
            ("(tail {1 2 3})", qx(vec![val(2), val(3)])),
            ("(tail {1})", qx(vec![])),
            ("(last {1 2 3})", qx(vec![val(3)])),
            ("(init {1 2 3})", qx(vec![val(1), val(2)])),
            ("(head {})", ErrorValue("passed {} for argument 0")),
            ("(tail {})", ErrorValue("passed {} for argument 0")),
            ("(head 1)", ErrorValue("incorrect type")),
            ("(head {1} {2})", ErrorValue("incorrect number")),
            ("(cons 0 {1 2})", qx(vec![val(0), val(1), val(2)])),
            (
                "(cons {a} {b})",
                qx(vec![Value::Qexpr(vec![sym("a")]), sym("b")]),
            ),
            ("(cons 1 2)", ErrorValue("incorrect type")),
            ("(join {1} {2 3} {})", qx(vec![val(1), val(2), val(3)])),
            ("(join {a} 1)", ErrorValue("incorrect type")),
            ("(len {})", success(0)),
            ("(len {a b c})", success(3)),
            ("(reverse {1 2 3})", qx(vec![val(3), val(2), val(1)])),
            ("(sort {3 1 2})", qx(vec![val(1), val(2), val(3)])),
            ("(sort {2.5 1 3})", qx(vec![val(1), val(2.5), val(3)])),
            (
                "(sort {\"b\" \"a\" \"c\"})",
                qx(vec![val("a"), val("b"), val("c")]),
            ),
            ("(sort {1 \"a\"})", ErrorValue("incorrect type")),
            ("(sort {{1} {2}})", ErrorValue("incorrect type")),
            ("(nth 1 {a b c})", qx(vec![sym("b")])),
            ("(nth 5 {a})", qx(vec![])),
            ("(take 2 {1 2 3})", qx(vec![val(1), val(2)])),
            ("(take 9 {1})", qx(vec![val(1)])),
            ("(take 0 {1 2})", qx(vec![])),
            ("(drop 1 {1 2 3})", qx(vec![val(2), val(3)])),
            ("(drop 9 {1})", qx(vec![])),
            ("(sum {1 2 3})", success(6)),
            ("(sum {1 2.5})", success(3.5)),
            ("(product {2 3 4})", success(24)),
            ("(sum {})", ErrorValue("passed {} for argument 0")),
            // === EVAL ===
            ("(eval {+ 1 2})", success(3)),
            ("(eval (list + 1 2))", success(3)),
            ("(eval {head {a b}})", qx(vec![sym("a")])),
            ("(eval 1)", ErrorValue("incorrect type")),
            // === ERROR SHORT-CIRCUIT ===
            ("(head (/ 1 0))", ErrorValue("Division by zero")),
            ("(list 1 (/ 1 0) 2)", ErrorValue("Division by zero")),
            // Leftmost error wins
            ("(+ (/ 1 0) (% 1 0))", ErrorValue("Division by zero")),
            // Error values pass through singleton unwrapping
            ("((/ 1 0))", ErrorValue("Division by zero")),
            // === USER ERRORS ===
            ("(error \"boom\")", ErrorValue("boom")),
            ("(error 1)", ErrorValue("incorrect type")),
            // === LAMBDA CONSTRUCTION ===
            ("(\\ {1} {1})", ErrorValue("cannot define non-symbol")),
            ("(\\ {x})", ErrorValue("incorrect number")),
            // Arguments evaluate first, so a bare symbol resolves (and fails) early
            ("(\\ x {x})", ErrorValue("Unbound symbol 'x'")),
            ("(\\ {& x y} {x})", ErrorValue("'&' not followed by single symbol")),
            ("(\\ {x &} {x})", ErrorValue("'&' not followed by single symbol")),
            // Immediate application
            ("((\\ {x} {* x x}) 4)", success(16)),
            ("((\\ {x y} {- x y}) 10 4)", success(6)),
            ("((\\ {x y} {+ x y}) 1 2 3)", ErrorValue("too many arguments")),
            // === BINDING ERRORS ===
            ("(def {1} 2)", ErrorValue("cannot define non-symbol")),
            ("(def x 1)", ErrorValue("Unbound symbol 'x'")),
            ("(def {a b} 1)", ErrorValue("incorrect number")),
            // === EXIT SIGNAL ===
            ("(exit)", Exits(0)),
            ("(exit 3)", Exits(3)),
            ("(exit \"no\")", ErrorValue("incorrect type")),
        ];

        run_comprehensive_tests(test_cases);
    }

    #[test]
    fn test_definitions_and_closures() {
        let test_environments = vec![
            // def binds globally and evaluates to unit
            TestEnvironment(vec![
                test_setup!("(def {x} 100)"),
                ("x", success(100)),
                test_setup!("(def {a b} 1 2)"),
                ("(+ a b)", success(3)),
                // Rebinding replaces the old value
                test_setup!("(def {x} 7)"),
                ("x", success(7)),
            ]),
            // Local `=` inside a function body does not leak out
            TestEnvironment(vec![
                test_setup!("(def {setlocal} (\\ {v} {= {y} v}))"),
                ("(setlocal 5)", EvalsTo(Value::unit())),
                ("y", ErrorValue("Unbound symbol 'y'")),
            ]),
            // def from inside a function body lands in the global root
            TestEnvironment(vec![
                test_setup!("(def {setglobal} (\\ {v} {def {z} v}))"),
                ("(setglobal 7)", EvalsTo(Value::unit())),
                ("z", success(7)),
            ]),
            // Currying and partial application
            TestEnvironment(vec![
                test_setup!("(def {add} (\\ {x y} {+ x y}))"),
                ("(add 1 2)", success(3)),
                test_setup!("(def {inc} (add 1))"),
                ("(inc 41)", success(42)),
                ("(inc 1)", success(2)),
                ("(add 1 2 3)", ErrorValue("too many arguments")),
            ]),
            // Variadic formals collect surplus arguments
            TestEnvironment(vec![
                test_setup!("(def {pack} (\\ {& xs} {xs}))"),
                ("(pack 1 2 3)", qx(vec![val(1), val(2), val(3)])),
                test_setup!("(def {headrest} (\\ {x & xs} {xs}))"),
                ("(headrest 1 2 3)", qx(vec![val(2), val(3)])),
                // No surplus arguments: the rest name binds to {}
                ("(headrest 1)", qx(vec![])),
            ]),
            // Recursion through the shared global root
            TestEnvironment(vec![
                test_setup!(
                    "(def {countdown} (\\ {n} {if (> n 0) {countdown (- n 1)} {n}}))"
                ),
                ("(countdown 5)", success(0)),
                test_setup!(
                    "(def {fact} (\\ {n} {if (> n 1) {* n (fact (- n 1))} {1}}))"
                ),
                ("(fact 5)", success(120)),
            ]),
            // Lexical scoping: closures read their defining scope, not the caller's
            TestEnvironment(vec![
                test_setup!("(def {make-adder} (\\ {n} {\\ {x} {+ x n}}))"),
                test_setup!("(def {add5} (make-adder 5))"),
                ("(add5 2)", success(7)),
                // A later global n must not shadow the captured one
                test_setup!("(def {n} 100)"),
                ("(add5 2)", success(7)),
            ]),
            // Functions are ordinary values
            TestEnvironment(vec![
                test_setup!("(def {apply-twice} (\\ {f x} {f (f x)}))"),
                test_setup!("(def {double} (\\ {x} {* x 2}))"),
                ("(apply-twice double 3)", success(12)),
            ]),
        ];

        run_tests_in_environment(test_environments);
    }

    #[test]
    fn test_env_builtin_lists_bound_names() {
        let env = create_global_env();
        let expr = parse_expr("(env)").unwrap();
        let result = eval(&env, expr).unwrap();

        let Value::Qexpr(names) = result else {
            panic!("expected Q-expression from env, got {result:?}");
        };
        assert!(names.contains(&val("head")));
        assert!(names.contains(&val("+")));
        assert!(names.contains(&val("True")));

        // Sorted output
        let rendered: Vec<String> = names.iter().map(|n| format!("{n}")).collect();
        let mut sorted = rendered.clone();
        sorted.sort();
        assert_eq!(rendered, sorted);
    }

    #[test]
    fn test_builtins_do_not_curry() {
        let env = create_global_env();
        // An underfed builtin reports its arity instead of returning a
        // partially applied function
        let expr = parse_expr("(cons 1)").unwrap();
        let result = eval(&env, expr).unwrap();
        assert!(matches!(result, Value::Error(_)), "got {result:?}");

        // A singleton S-expression unwraps to the function value itself
        let expr = parse_expr("(head)").unwrap();
        let result = eval(&env, expr).unwrap();
        assert_eq!(format!("{result}"), "<builtin 'head'>");
    }

    #[test]
    fn test_exit_aborts_evaluation() {
        let env = create_global_env();
        // exit propagates through enclosing expressions instead of being
        // absorbed like an error value
        let expr = parse_expr("(+ 1 (exit 2) 3)").unwrap();
        assert_eq!(eval(&env, expr), Err(Exit { code: 2 }));
    }
}
