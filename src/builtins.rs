//! Native function catalogue.
//!
//! Every builtin shares the same calling convention: arguments arrive
//! already evaluated, and argument validation failures come back as error
//! *values*, never as host errors. The `lassert!` macro family implements
//! that protocol: each assertion checks one property of the argument list
//! and returns `Ok(Value::Error(..))` when it fails, consuming the
//! arguments.
//!
//! Arithmetic dispatches on the [`ArithOp`] enum rather than operator
//! names, folding left to right over an internal integer/decimal pair with
//! promotion: an all-integer operation stays exact (overflow is reported,
//! not wrapped), and a single decimal operand promotes the whole fold.
//!
//! [`create_global_env`] builds the root environment with the full
//! catalogue plus the `True`/`False` constants.

use std::cmp::Ordering;
use std::fs;

use crate::ast::{Builtin, Lambda, Type, VARIADIC_MARKER, Value};
use crate::env::Environment;
use crate::eval::eval;
use crate::reader::parse_program;
use crate::{EvalResult, Exit, LispError};

/// Return an error value unless the condition holds
macro_rules! lassert {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Ok(Value::Error($err));
        }
    };
}

/// Exact argument-count check
macro_rules! lassert_num {
    ($op:expr, $args:expr, $expected:expr) => {
        lassert!(
            $args.len() == $expected,
            LispError::ArityMismatch {
                op: $op.into(),
                got: $args.len(),
                expected: $expected,
            }
        )
    };
}

/// Per-position type check
macro_rules! lassert_type {
    ($op:expr, $args:expr, $index:expr, $expected:expr) => {
        lassert!(
            $args[$index].type_of() == $expected,
            LispError::TypeMismatch {
                op: $op.into(),
                index: $index,
                got: $args[$index].type_of(),
                expected: $expected,
            }
        )
    };
}

fn type_mismatch(op: &str, index: usize, got: &Value, expected: Type) -> EvalResult {
    Ok(Value::Error(LispError::TypeMismatch {
        op: op.into(),
        index,
        got: got.type_of(),
        expected,
    }))
}

//
// Arithmetic
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Min,
    Max,
}

/// Internal numeric pair for the arithmetic fold
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Dec(f64),
}

impl Num {
    fn from_value(value: &Value) -> Option<Num> {
        match value {
            Value::Integer(n) => Some(Num::Int(*n)),
            Value::Decimal(d) => Some(Num::Dec(*d)),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Num::Int(n) => Value::Integer(n),
            Num::Dec(d) => Value::Decimal(d),
        }
    }

    fn as_dec(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Dec(d) => d,
        }
    }
}

impl ArithOp {
    fn apply(self, x: Num, y: Num) -> Result<Num, LispError> {
        match (x, y) {
            (Num::Int(a), Num::Int(b)) => self.apply_int(a, b),
            // Mixed operands promote to decimal
            (a, b) => self.apply_dec(a.as_dec(), b.as_dec()),
        }
    }

    fn apply_int(self, a: i64, b: i64) -> Result<Num, LispError> {
        let overflow = |what: &str| LispError::Message(format!("Integer overflow in {what}"));
        let result = match self {
            ArithOp::Add => a.checked_add(b).ok_or_else(|| overflow("addition"))?,
            ArithOp::Sub => a.checked_sub(b).ok_or_else(|| overflow("subtraction"))?,
            ArithOp::Mul => a.checked_mul(b).ok_or_else(|| overflow("multiplication"))?,
            ArithOp::Div => {
                if b == 0 {
                    return Err(LispError::DivisionByZero);
                }
                a.checked_div(b).ok_or_else(|| overflow("division"))?
            }
            ArithOp::Mod => {
                if b == 0 {
                    return Err(LispError::ModulusByZero);
                }
                a.checked_rem(b).ok_or_else(|| overflow("modulus"))?
            }
            ArithOp::Pow => {
                // Negative exponents leave the integers
                if b < 0 {
                    return Ok(Num::Dec((a as f64).powf(b as f64)));
                }
                let exp = u32::try_from(b).map_err(|_| overflow("exponentiation"))?;
                a.checked_pow(exp).ok_or_else(|| overflow("exponentiation"))?
            }
            ArithOp::Min => a.min(b),
            ArithOp::Max => a.max(b),
        };
        Ok(Num::Int(result))
    }

    fn apply_dec(self, a: f64, b: f64) -> Result<Num, LispError> {
        let result = match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => {
                if b == 0.0 {
                    return Err(LispError::DivisionByZero);
                }
                a / b
            }
            ArithOp::Mod => {
                if b == 0.0 {
                    return Err(LispError::ModulusByZero);
                }
                a % b
            }
            ArithOp::Pow => a.powf(b),
            ArithOp::Min => a.min(b),
            ArithOp::Max => a.max(b),
        };
        Ok(Num::Dec(result))
    }
}

/// Left fold of an arithmetic operation over the argument list, with a
/// special case for unary minus
fn arith(op: ArithOp, name: &str, args: Vec<Value>) -> EvalResult {
    lassert!(
        !args.is_empty(),
        LispError::ArityMismatch {
            op: name.into(),
            got: 0,
            expected: 1,
        }
    );

    let mut nums = Vec::with_capacity(args.len());
    for (index, arg) in args.iter().enumerate() {
        match Num::from_value(arg) {
            Some(num) => nums.push(num),
            None => {
                return Ok(Value::Error(LispError::NonNumericArgument {
                    op: name.into(),
                    index,
                    got: arg.type_of(),
                }));
            }
        }
    }

    if op == ArithOp::Sub && nums.len() == 1 {
        return match op.apply(Num::Int(0), nums[0]) {
            Ok(negated) => Ok(negated.into_value()),
            Err(err) => Ok(Value::Error(err)),
        };
    }

    let mut acc = nums[0];
    for &num in &nums[1..] {
        acc = match op.apply(acc, num) {
            Ok(next) => next,
            Err(err) => return Ok(Value::Error(err)),
        };
    }
    Ok(acc.into_value())
}

fn builtin_add(_env: &Environment, args: Vec<Value>) -> EvalResult {
    arith(ArithOp::Add, "+", args)
}

fn builtin_sub(_env: &Environment, args: Vec<Value>) -> EvalResult {
    arith(ArithOp::Sub, "-", args)
}

fn builtin_mul(_env: &Environment, args: Vec<Value>) -> EvalResult {
    arith(ArithOp::Mul, "*", args)
}

fn builtin_div(_env: &Environment, args: Vec<Value>) -> EvalResult {
    arith(ArithOp::Div, "/", args)
}

fn builtin_mod(_env: &Environment, args: Vec<Value>) -> EvalResult {
    arith(ArithOp::Mod, "%", args)
}

fn builtin_pow(_env: &Environment, args: Vec<Value>) -> EvalResult {
    arith(ArithOp::Pow, "^", args)
}

fn builtin_min(_env: &Environment, args: Vec<Value>) -> EvalResult {
    arith(ArithOp::Min, "min", args)
}

fn builtin_max(_env: &Environment, args: Vec<Value>) -> EvalResult {
    arith(ArithOp::Max, "max", args)
}

//
// Comparison and logic
//

#[derive(Clone, Copy)]
enum OrdOp {
    Gt,
    Lt,
    Ge,
    Le,
}

fn ord(op: OrdOp, name: &str, args: Vec<Value>) -> EvalResult {
    lassert_num!(name, args, 2);

    let (x, y) = match (Num::from_value(&args[0]), Num::from_value(&args[1])) {
        (Some(x), Some(y)) => (x, y),
        (None, _) => {
            return Ok(Value::Error(LispError::NonNumericArgument {
                op: name.into(),
                index: 0,
                got: args[0].type_of(),
            }));
        }
        (_, None) => {
            return Ok(Value::Error(LispError::NonNumericArgument {
                op: name.into(),
                index: 1,
                got: args[1].type_of(),
            }));
        }
    };

    let ordering = match (x, y) {
        (Num::Int(a), Num::Int(b)) => a.cmp(&b),
        (a, b) => match a.as_dec().partial_cmp(&b.as_dec()) {
            Some(ordering) => ordering,
            // NaN satisfies no ordering
            None => return Ok(Value::Bool(false)),
        },
    };

    let result = match op {
        OrdOp::Gt => ordering == Ordering::Greater,
        OrdOp::Lt => ordering == Ordering::Less,
        OrdOp::Ge => ordering != Ordering::Less,
        OrdOp::Le => ordering != Ordering::Greater,
    };
    Ok(Value::Bool(result))
}

fn builtin_gt(_env: &Environment, args: Vec<Value>) -> EvalResult {
    ord(OrdOp::Gt, ">", args)
}

fn builtin_lt(_env: &Environment, args: Vec<Value>) -> EvalResult {
    ord(OrdOp::Lt, "<", args)
}

fn builtin_ge(_env: &Environment, args: Vec<Value>) -> EvalResult {
    ord(OrdOp::Ge, ">=", args)
}

fn builtin_le(_env: &Environment, args: Vec<Value>) -> EvalResult {
    ord(OrdOp::Le, "<=", args)
}

fn builtin_eq(_env: &Environment, args: Vec<Value>) -> EvalResult {
    lassert_num!("==", args, 2);
    Ok(Value::Bool(args[0] == args[1]))
}

fn builtin_ne(_env: &Environment, args: Vec<Value>) -> EvalResult {
    lassert_num!("!=", args, 2);
    Ok(Value::Bool(args[0] != args[1]))
}

fn builtin_and(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("&&", args, 2);
    match (args.remove(0), args.remove(0)) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a && b)),
        (Value::Bool(_), other) => type_mismatch("&&", 1, &other, Type::Boolean),
        (other, _) => type_mismatch("&&", 0, &other, Type::Boolean),
    }
}

fn builtin_or(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("||", args, 2);
    match (args.remove(0), args.remove(0)) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
        (Value::Bool(_), other) => type_mismatch("||", 1, &other, Type::Boolean),
        (other, _) => type_mismatch("||", 0, &other, Type::Boolean),
    }
}

fn builtin_not(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("!", args, 1);
    match args.remove(0) {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => type_mismatch("!", 0, &other, Type::Boolean),
    }
}

//
// Q-expression operations
//

fn builtin_list(_env: &Environment, args: Vec<Value>) -> EvalResult {
    Ok(Value::Qexpr(args))
}

fn builtin_head(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("head", args, 1);
    match args.remove(0) {
        Value::Qexpr(mut items) => {
            lassert!(
                !items.is_empty(),
                LispError::EmptyArgument {
                    op: "head".into(),
                    index: 0,
                }
            );
            items.truncate(1);
            Ok(Value::Qexpr(items))
        }
        other => type_mismatch("head", 0, &other, Type::Qexpr),
    }
}

fn builtin_tail(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("tail", args, 1);
    match args.remove(0) {
        Value::Qexpr(mut items) => {
            lassert!(
                !items.is_empty(),
                LispError::EmptyArgument {
                    op: "tail".into(),
                    index: 0,
                }
            );
            items.remove(0);
            Ok(Value::Qexpr(items))
        }
        other => type_mismatch("tail", 0, &other, Type::Qexpr),
    }
}

fn builtin_last(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("last", args, 1);
    match args.remove(0) {
        Value::Qexpr(mut items) => {
            lassert!(
                !items.is_empty(),
                LispError::EmptyArgument {
                    op: "last".into(),
                    index: 0,
                }
            );
            let last = items.split_off(items.len() - 1);
            Ok(Value::Qexpr(last))
        }
        other => type_mismatch("last", 0, &other, Type::Qexpr),
    }
}

fn builtin_init(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("init", args, 1);
    match args.remove(0) {
        Value::Qexpr(mut items) => {
            lassert!(
                !items.is_empty(),
                LispError::EmptyArgument {
                    op: "init".into(),
                    index: 0,
                }
            );
            items.pop();
            Ok(Value::Qexpr(items))
        }
        other => type_mismatch("init", 0, &other, Type::Qexpr),
    }
}

fn builtin_cons(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("cons", args, 2);
    match (args.remove(0), args.remove(0)) {
        (head, Value::Qexpr(mut items)) => {
            items.insert(0, head);
            Ok(Value::Qexpr(items))
        }
        (_, other) => type_mismatch("cons", 1, &other, Type::Qexpr),
    }
}

fn builtin_join(_env: &Environment, args: Vec<Value>) -> EvalResult {
    for (index, _) in args.iter().enumerate() {
        lassert_type!("join", args, index, Type::Qexpr);
    }

    let mut joined = Vec::new();
    for arg in args {
        if let Value::Qexpr(items) = arg {
            joined.extend(items);
        }
    }
    Ok(Value::Qexpr(joined))
}

fn builtin_len(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("len", args, 1);
    match args.remove(0) {
        Value::Qexpr(items) => Ok(Value::Integer(items.len() as i64)),
        other => type_mismatch("len", 0, &other, Type::Qexpr),
    }
}

fn builtin_reverse(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("reverse", args, 1);
    match args.remove(0) {
        Value::Qexpr(mut items) => {
            items.reverse();
            Ok(Value::Qexpr(items))
        }
        other => type_mismatch("reverse", 0, &other, Type::Qexpr),
    }
}

/// Scalar classes that may be ordered among themselves
#[derive(Clone, Copy, PartialEq, Eq)]
enum SortClass {
    Number,
    Str,
    Boolean,
}

fn sort_class_of(value: &Value) -> Option<SortClass> {
    match value {
        Value::Integer(_) | Value::Decimal(_) => Some(SortClass::Number),
        Value::String(_) => Some(SortClass::Str),
        Value::Bool(_) => Some(SortClass::Boolean),
        _ => None,
    }
}

fn compare_scalars(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        // Integer pairs compare exactly; f64 conversion loses precision
        // above 2^53
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        _ => match (Num::from_value(a), Num::from_value(b)) {
            (Some(x), Some(y)) => x
                .as_dec()
                .partial_cmp(&y.as_dec())
                .unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

fn builtin_sort(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("sort", args, 1);
    let mut items = match args.remove(0) {
        Value::Qexpr(items) => items,
        other => return type_mismatch("sort", 0, &other, Type::Qexpr),
    };

    // Homogeneous orderable scalars only: integers and decimals sort
    // together with promotion, strings and booleans among themselves
    let Some(first) = items.first() else {
        return Ok(Value::Qexpr(items));
    };
    let first_type = first.type_of();
    let Some(class) = sort_class_of(first) else {
        return type_mismatch("sort", 0, first, Type::Integer);
    };
    for item in &items {
        if sort_class_of(item) != Some(class) {
            return type_mismatch("sort", 0, item, first_type);
        }
    }

    items.sort_by(compare_scalars);
    Ok(Value::Qexpr(items))
}

fn builtin_nth(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("nth", args, 2);
    match (args.remove(0), args.remove(0)) {
        (Value::Integer(n), Value::Qexpr(mut items)) => {
            // Out-of-range indices yield the empty list
            if n >= 0 && (n as usize) < items.len() {
                Ok(Value::Qexpr(vec![items.swap_remove(n as usize)]))
            } else {
                Ok(Value::Qexpr(Vec::new()))
            }
        }
        (Value::Integer(_), other) => type_mismatch("nth", 1, &other, Type::Qexpr),
        (other, _) => type_mismatch("nth", 0, &other, Type::Integer),
    }
}

fn builtin_take(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("take", args, 2);
    match (args.remove(0), args.remove(0)) {
        (Value::Integer(n), Value::Qexpr(mut items)) => {
            let keep = n.clamp(0, items.len() as i64) as usize;
            items.truncate(keep);
            Ok(Value::Qexpr(items))
        }
        (Value::Integer(_), other) => type_mismatch("take", 1, &other, Type::Qexpr),
        (other, _) => type_mismatch("take", 0, &other, Type::Integer),
    }
}

fn builtin_drop(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("drop", args, 2);
    match (args.remove(0), args.remove(0)) {
        (Value::Integer(n), Value::Qexpr(mut items)) => {
            let cut = n.clamp(0, items.len() as i64) as usize;
            items.drain(..cut);
            Ok(Value::Qexpr(items))
        }
        (Value::Integer(_), other) => type_mismatch("drop", 1, &other, Type::Qexpr),
        (other, _) => type_mismatch("drop", 0, &other, Type::Integer),
    }
}

fn builtin_sum(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("sum", args, 1);
    match args.remove(0) {
        Value::Qexpr(items) => {
            lassert!(
                !items.is_empty(),
                LispError::EmptyArgument {
                    op: "sum".into(),
                    index: 0,
                }
            );
            arith(ArithOp::Add, "sum", items)
        }
        other => type_mismatch("sum", 0, &other, Type::Qexpr),
    }
}

fn builtin_product(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("product", args, 1);
    match args.remove(0) {
        Value::Qexpr(items) => {
            lassert!(
                !items.is_empty(),
                LispError::EmptyArgument {
                    op: "product".into(),
                    index: 0,
                }
            );
            arith(ArithOp::Mul, "product", items)
        }
        other => type_mismatch("product", 0, &other, Type::Qexpr),
    }
}

fn builtin_eval(env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("eval", args, 1);
    match args.remove(0) {
        Value::Qexpr(items) => eval(env, Value::Sexpr(items)),
        other => type_mismatch("eval", 0, &other, Type::Qexpr),
    }
}

//
// Control and binding
//

fn builtin_if(env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("if", args, 3);
    match (args.remove(0), args.remove(0), args.remove(0)) {
        (Value::Bool(cond), Value::Qexpr(then_items), Value::Qexpr(else_items)) => {
            // The chosen branch evaluates as an S-expression
            let branch = if cond { then_items } else { else_items };
            eval(env, Value::Sexpr(branch))
        }
        (Value::Bool(_), Value::Qexpr(_), other) => type_mismatch("if", 2, &other, Type::Qexpr),
        (Value::Bool(_), other, _) => type_mismatch("if", 1, &other, Type::Qexpr),
        (other, _, _) => type_mismatch("if", 0, &other, Type::Boolean),
    }
}

fn builtin_lambda(env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("\\", args, 2);
    let (formals, body) = match (args.remove(0), args.remove(0)) {
        (Value::Qexpr(formals), Value::Qexpr(body)) => (formals, body),
        (Value::Qexpr(_), other) => return type_mismatch("\\", 1, &other, Type::Qexpr),
        (other, _) => return type_mismatch("\\", 0, &other, Type::Qexpr),
    };

    for (index, formal) in formals.iter().enumerate() {
        match formal {
            Value::Symbol(name) => {
                // A variadic marker must sit second to last, paired with
                // the symbol that collects the surplus
                if name == VARIADIC_MARKER && index + 2 != formals.len() {
                    return Ok(Value::Error(LispError::MalformedVariadic));
                }
            }
            other => {
                return Ok(Value::Error(LispError::NonSymbolBinding {
                    op: "\\".into(),
                    got: other.type_of(),
                }));
            }
        }
    }

    Ok(Value::Lambda(Box::new(Lambda {
        formals,
        body,
        env: env.clone(),
    })))
}

#[derive(Clone, Copy)]
enum BindScope {
    Global,
    Local,
}

fn define_bindings(
    env: &Environment,
    scope: BindScope,
    name: &str,
    mut args: Vec<Value>,
) -> EvalResult {
    lassert!(
        !args.is_empty(),
        LispError::ArityMismatch {
            op: name.into(),
            got: 0,
            expected: 2,
        }
    );

    let targets = match args.remove(0) {
        Value::Qexpr(targets) => targets,
        other => return type_mismatch(name, 0, &other, Type::Qexpr),
    };

    for target in &targets {
        lassert!(
            matches!(target, Value::Symbol(_)),
            LispError::NonSymbolBinding {
                op: name.into(),
                got: target.type_of(),
            }
        );
    }

    // One value per binding target
    lassert!(
        targets.len() == args.len(),
        LispError::ArityMismatch {
            op: name.into(),
            got: args.len(),
            expected: targets.len(),
        }
    );

    for (target, value) in targets.into_iter().zip(args) {
        if let Value::Symbol(sym_name) = target {
            match scope {
                BindScope::Global => env.define_global(sym_name, value),
                BindScope::Local => env.define_local(sym_name, value),
            }
        }
    }
    Ok(Value::unit())
}

fn builtin_def(env: &Environment, args: Vec<Value>) -> EvalResult {
    define_bindings(env, BindScope::Global, "def", args)
}

fn builtin_put(env: &Environment, args: Vec<Value>) -> EvalResult {
    define_bindings(env, BindScope::Local, "=", args)
}

//
// Host interaction
//

fn builtin_env(env: &Environment, args: Vec<Value>) -> EvalResult {
    lassert_num!("env", args, 0);
    let names = env.bound_names().into_iter().map(Value::String).collect();
    Ok(Value::Qexpr(names))
}

fn builtin_print(_env: &Environment, args: Vec<Value>) -> EvalResult {
    let rendered: Vec<String> = args.iter().map(|arg| format!("{arg}")).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::unit())
}

fn builtin_error(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("error", args, 1);
    match args.remove(0) {
        Value::String(message) => Ok(Value::Error(LispError::Message(message))),
        other => type_mismatch("error", 0, &other, Type::Str),
    }
}

fn builtin_load(env: &Environment, mut args: Vec<Value>) -> EvalResult {
    lassert_num!("load", args, 1);
    let mut path = match args.remove(0) {
        Value::String(path) => path,
        other => return type_mismatch("load", 0, &other, Type::Str),
    };

    if !path.ends_with(".lspy") {
        path.push_str(".lspy");
    }

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            return Ok(Value::Error(LispError::Message(format!(
                "Could not load library '{path}': {err}"
            ))));
        }
    };
    let forms = match parse_program(&source) {
        Ok(forms) => forms,
        Err(err) => {
            return Ok(Value::Error(LispError::Message(format!(
                "Could not load library '{path}': {err}"
            ))));
        }
    };

    // Errors in a loaded file are reported form by form, not fatal;
    // the exit signal still aborts the load
    for form in forms {
        let result = eval(env, form)?;
        if result.is_error() {
            println!("{result}");
        }
    }
    Ok(Value::unit())
}

fn builtin_exit(_env: &Environment, mut args: Vec<Value>) -> EvalResult {
    if args.is_empty() {
        return Err(Exit { code: 0 });
    }
    lassert_num!("exit", args, 1);
    match args.remove(0) {
        Value::Integer(code) => match i32::try_from(code) {
            Ok(code) => Err(Exit { code }),
            Err(_) => Ok(Value::Error(LispError::Message(format!(
                "Function 'exit' passed out-of-range exit code {code}."
            )))),
        },
        other => type_mismatch("exit", 0, &other, Type::Integer),
    }
}

//
// Registration
//

static BUILTINS: &[Builtin] = &[
    // String functions
    Builtin { name: "load", func: builtin_load },
    Builtin { name: "error", func: builtin_error },
    Builtin { name: "print", func: builtin_print },
    // Assignments
    Builtin { name: "\\", func: builtin_lambda },
    Builtin { name: "def", func: builtin_def },
    Builtin { name: "=", func: builtin_put },
    Builtin { name: "env", func: builtin_env },
    // List operations
    Builtin { name: "list", func: builtin_list },
    Builtin { name: "head", func: builtin_head },
    Builtin { name: "tail", func: builtin_tail },
    Builtin { name: "cons", func: builtin_cons },
    Builtin { name: "last", func: builtin_last },
    Builtin { name: "take", func: builtin_take },
    Builtin { name: "drop", func: builtin_drop },
    Builtin { name: "reverse", func: builtin_reverse },
    Builtin { name: "sort", func: builtin_sort },
    Builtin { name: "eval", func: builtin_eval },
    Builtin { name: "join", func: builtin_join },
    Builtin { name: "len", func: builtin_len },
    Builtin { name: "init", func: builtin_init },
    Builtin { name: "sum", func: builtin_sum },
    Builtin { name: "product", func: builtin_product },
    Builtin { name: "nth", func: builtin_nth },
    // Arithmetic
    Builtin { name: "+", func: builtin_add },
    Builtin { name: "-", func: builtin_sub },
    Builtin { name: "*", func: builtin_mul },
    Builtin { name: "/", func: builtin_div },
    Builtin { name: "%", func: builtin_mod },
    Builtin { name: "^", func: builtin_pow },
    Builtin { name: "min", func: builtin_min },
    Builtin { name: "max", func: builtin_max },
    // Conditionals
    Builtin { name: "if", func: builtin_if },
    Builtin { name: "==", func: builtin_eq },
    Builtin { name: "!=", func: builtin_ne },
    Builtin { name: ">", func: builtin_gt },
    Builtin { name: "<", func: builtin_lt },
    Builtin { name: ">=", func: builtin_ge },
    Builtin { name: "<=", func: builtin_le },
    Builtin { name: "&&", func: builtin_and },
    Builtin { name: "||", func: builtin_or },
    Builtin { name: "!", func: builtin_not },
    // Other functions
    Builtin { name: "exit", func: builtin_exit },
];

/// Create the global environment with the full builtin catalogue and the
/// boolean constants.
pub fn create_global_env() -> Environment {
    let env = Environment::new();

    env.register_constant("True", Value::Bool(true));
    env.register_constant("False", Value::Bool(false));

    for builtin in BUILTINS {
        env.register_builtin(*builtin);
    }

    env
}
