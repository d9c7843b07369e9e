//! Core value representation for the interpreter. The [`Value`] enum covers
//! every datum the language can produce: numbers, booleans, strings, symbols,
//! the two list kinds (S- and Q-expressions), native functions, user-defined
//! functions and first-class error values. `Display` renders values in the
//! canonical surface syntax, so for data values `render -> parse -> render`
//! is a fixed point. Equality is structural, with two deliberate wrinkles:
//! integers never equal decimals, and user functions compare by formals and
//! body while ignoring their captured environment.

use crate::{EvalResult, LispError};
use crate::env::Environment;

/// The formals marker that collects surplus arguments into a Q-expression
pub const VARIADIC_MARKER: &str = "&";

/// Signature shared by all native functions. Arguments arrive already
/// evaluated; the environment is the caller's scope, used by `eval`, `if`,
/// `def` and friends.
pub type NativeFn = fn(&Environment, Vec<Value>) -> EvalResult;

/// Type tag for a [`Value`], used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Integer,
    Decimal,
    Boolean,
    Str,
    Symbol,
    Error,
    Sexpr,
    Qexpr,
    Function,
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Type::Integer => "Integer number",
            Type::Decimal => "Decimal number",
            Type::Boolean => "Boolean",
            Type::Str => "String",
            Type::Symbol => "Symbol",
            Type::Error => "Error",
            Type::Sexpr => "S-Expression",
            Type::Qexpr => "Q-Expression",
            Type::Function => "Function",
        };
        write!(f, "{name}")
    }
}

/// A native function bound into the global environment.
///
/// Equality compares the name only: two builtins with the same name are the
/// same operation regardless of function pointer identity.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: NativeFn,
}

/// A user-defined function: formals, body and the environment it closed
/// over. The body is stored as the elements of the Q-expression it was
/// written as, and is evaluated as an S-expression on application.
#[derive(Clone)]
pub struct Lambda {
    pub formals: Vec<Value>,
    pub body: Vec<Value>,
    pub env: Environment,
}

/// Core value type of the interpreter
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    String(String),
    Symbol(String),
    /// First-class error value; propagates through evaluation as data
    Error(LispError),
    /// S-expression: evaluates by reducing its children
    Sexpr(Vec<Value>),
    /// Q-expression: quoted list, inert until passed to `eval`
    Qexpr(Vec<Value>),
    Builtin(Builtin),
    Lambda(Box<Lambda>),
}

impl Value {
    /// Empty S-expression, the unit value returned by side-effecting builtins
    pub fn unit() -> Value {
        Value::Sexpr(Vec::new())
    }

    pub fn type_of(&self) -> Type {
        match self {
            Value::Integer(_) => Type::Integer,
            Value::Decimal(_) => Type::Decimal,
            Value::Bool(_) => Type::Boolean,
            Value::String(_) => Type::Str,
            Value::Symbol(_) => Type::Symbol,
            Value::Error(_) => Type::Error,
            Value::Sexpr(_) => Type::Sexpr,
            Value::Qexpr(_) => Type::Qexpr,
            Value::Builtin(_) | Value::Lambda(_) => Type::Function,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Decimal(d) => write!(f, "Decimal({d})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::String(s) => write!(f, "String(\"{s}\")"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Error(e) => write!(f, "Error({e:?})"),
            Value::Sexpr(items) => write_items(f, "Sexpr(", items),
            Value::Qexpr(items) => write_items(f, "Qexpr(", items),
            Value::Builtin(b) => write!(f, "Builtin({})", b.name),
            Value::Lambda(l) => {
                write!(f, "Lambda(formals={:?}, body={:?})", l.formals, l.body)
            }
        }
    }
}

fn write_items(
    f: &mut std::fmt::Formatter<'_>,
    open: &str,
    items: &[Value],
) -> std::fmt::Result {
    write!(f, "{open}")?;
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{v:?}")?;
    }
    write!(f, ")")
}

// From trait implementations for Value - enables .into() conversion
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Decimal(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Helper for creating symbols - convenient in mixed lists
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper for creating Values from Rust literals
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Decimal(d) => {
                // A trailing ".0" keeps whole decimals distinguishable from integers
                if d.fract() == 0.0 && d.is_finite() {
                    write!(f, "{d:.1}")
                } else {
                    write!(f, "{d}")
                }
            }
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::String(s) => {
                write!(f, "\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"")
            }
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Error(e) => write!(f, "Error: {e}"),
            Value::Sexpr(items) => write_seq(f, '(', items, ')'),
            Value::Qexpr(items) => write_seq(f, '{', items, '}'),
            Value::Builtin(b) => write!(f, "<builtin '{}'>", b.name),
            Value::Lambda(l) => {
                write!(f, "(\\ ")?;
                write_seq(f, '{', &l.formals, '}')?;
                write!(f, " ")?;
                write_seq(f, '{', &l.body, '}')?;
                write!(f, ")")
            }
        }
    }
}

fn write_seq(
    f: &mut std::fmt::Formatter<'_>,
    open: char,
    items: &[Value],
    close: char,
) -> std::fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // No numeric coercion: 1 and 1.0 are distinct values
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Sexpr(a), Value::Sexpr(b)) => a == b,
            (Value::Qexpr(a), Value::Qexpr(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            // Captured environments are ignored: equality is structural
            (Value::Lambda(a), Value::Lambda(b)) => {
                a.formals == b.formals && a.body == b.body
            }
            _ => false, // Different variants are never equal
        }
    }
}
