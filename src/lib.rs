//! Lispet - a small Lisp interpreter with errors as values
//!
//! This crate implements a compact Lisp dialect built around two kinds of
//! lists: S-expressions `( )`, which evaluate, and Q-expressions `{ }`,
//! which are inert data until passed to `eval`. Code is data, so the same
//! `Value` type flows through the reader, the evaluator and the printer.
//!
//! ```lisp
//! (+ 1 2 3)                 ; arithmetic with integer/decimal promotion
//! (head {a b c})            ; list surgery on Q-expressions
//! (def {double} (\ {x} {* x 2}))
//! (double 21)               ; user functions close over their scope
//! ((\ {x y} {+ x y}) 1)     ; partial application returns a new function
//! ```
//!
//! ## Errors as values
//!
//! Runtime failures do not unwind the interpreter. A failed operation
//! returns `Value::Error` carrying a [`LispError`], and that error value
//! propagates through enclosing S-expressions like any other datum. The
//! only thing that travels on the `Err` side of [`EvalResult`] is the
//! [`Exit`] signal raised by the `exit` builtin, so a host can always tell
//! "the program asked to stop" apart from "the program misbehaved".
//!
//! ## Modules
//!
//! - `reader`: parsing source text into `Value` trees
//! - `ast`: the `Value` tagged union and its canonical rendering
//! - `env`: chained mutable environments with a shared global root
//! - `eval`: S-expression reduction and function application
//! - `builtins`: the native function catalogue

use std::fmt;

use crate::ast::Type;

/// Categorizes the different kinds of reader errors.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorKind {
    /// Invalid or unexpected syntax (bad tokens, malformed expressions)
    InvalidSyntax,
    /// Input ended before the expression was complete (EOF, unterminated string, unclosed parens)
    Incomplete,
    /// Extra input found after a complete, valid expression
    TrailingContent,
}

/// A structured error describing a reader failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Snippet of the input near where the error occurred, if identifiable
    pub context: Option<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Create a ParseError with a context snippet extracted from the input
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
    ) -> Self {
        const MAX_CONTEXT: usize = 40;

        let snippet: String = input.chars().skip(error_offset).take(MAX_CONTEXT).collect();
        let snippet = snippet.replace('\n', "\\n");

        ParseError {
            kind,
            message: message.into(),
            context: if snippet.is_empty() {
                None
            } else {
                Some(snippet)
            },
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(context) = &self.context {
            write!(f, " near '{context}'")?;
        }
        Ok(())
    }
}

/// Runtime error taxonomy.
///
/// These are carried *inside* `Value::Error` rather than on the `Err` side
/// of results: a builtin that rejects its arguments returns an error value,
/// and the evaluator propagates it outward through enclosing expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum LispError {
    /// A symbol had no binding anywhere in the environment chain
    UnboundSymbol(String),
    /// A builtin received an argument of the wrong type at a given position
    TypeMismatch {
        op: String,
        index: usize,
        got: Type,
        expected: Type,
    },
    /// An arithmetic operation received a non-numeric operand
    NonNumericArgument { op: String, index: usize, got: Type },
    /// A builtin received the wrong number of arguments
    ArityMismatch {
        op: String,
        got: usize,
        expected: usize,
    },
    /// A builtin that requires a non-empty list received `{}`
    EmptyArgument { op: String, index: usize },
    /// The head of an evaluated S-expression was not callable
    NotAFunction(Type),
    /// A user function received more arguments than it has formals
    TooManyArguments { got: usize, expected: usize },
    DivisionByZero,
    ModulusByZero,
    /// `&` in a formals list was not followed by exactly one symbol
    MalformedVariadic,
    /// `def`, `=` or `\` was asked to bind a non-symbol
    NonSymbolBinding { op: String, got: Type },
    /// Free-form message (integer overflow, `error` builtin, `load` failures)
    Message(String),
}

impl fmt::Display for LispError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LispError::UnboundSymbol(name) => write!(f, "Unbound symbol '{name}'"),
            LispError::TypeMismatch {
                op,
                index,
                got,
                expected,
            } => write!(
                f,
                "Function '{op}' passed incorrect type for argument {index}. \
                 Got {got}, expected {expected}."
            ),
            LispError::NonNumericArgument { op, index, got } => write!(
                f,
                "Function '{op}' cannot operate on non-number for argument {index}. \
                 Got {got}, expected Integer number or Decimal number."
            ),
            LispError::ArityMismatch { op, got, expected } => write!(
                f,
                "Function '{op}' passed incorrect number of arguments. \
                 Got {got}, expected {expected}."
            ),
            LispError::EmptyArgument { op, index } => {
                write!(f, "Function '{op}' passed {{}} for argument {index}.")
            }
            LispError::NotAFunction(got) => {
                write!(f, "First element is not a function. Got {got}.")
            }
            LispError::TooManyArguments { got, expected } => write!(
                f,
                "Function passed too many arguments. Got {got}, expected {expected}."
            ),
            LispError::DivisionByZero => write!(f, "Division by zero!"),
            LispError::ModulusByZero => write!(f, "Modulus by zero!"),
            LispError::MalformedVariadic => write!(
                f,
                "Function format invalid. Symbol '&' not followed by single symbol."
            ),
            LispError::NonSymbolBinding { op, got } => write!(
                f,
                "Function '{op}' cannot define non-symbol. Got {got}, expected Symbol."
            ),
            LispError::Message(msg) => write!(f, "{msg}"),
        }
    }
}

/// Control signal raised by the `exit` builtin.
///
/// Not an error: evaluation results are `Ok` for every ordinary outcome
/// (including error *values*), and `Err(Exit)` only when the program asked
/// the host to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub code: i32,
}

/// Result of evaluating an expression.
pub type EvalResult = Result<ast::Value, Exit>;

pub mod ast;
pub mod builtins;
pub mod env;
pub mod eval;
pub mod reader;
