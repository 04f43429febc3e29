//! SubLisp - substitution-based Lisp core interpreter
//!
//! This crate implements a minimal Lisp-family expression language in which
//! procedure application is purely syntactic: applying a user-defined
//! procedure replaces every free occurrence of a formal parameter in the
//! procedure body with a representation of the corresponding argument value,
//! then re-evaluates the rewritten body. There are no environment frames, no
//! assignment and no named definitions.
//!
//! ```scheme
//! ((lambda (x) (cons x (quote (b c)))) (quote a))   ; => (a b c)
//! ((lambda (x) (lambda (x) x)) 1)                   ; => (lambda (x) x)
//! ```
//!
//! The core consumes exactly two capabilities from a [`host::Host`]: resolving
//! free symbols to values and invoking opaque native procedures. A ready-made
//! table-backed host with the usual list and arithmetic primitives lives in
//! [`builtins`].
//!
//! ## Modules
//!
//! - `ast`: expression tree and syntactic classification
//! - `scheme`: S-expression parsing from text
//! - `evaluator`: evaluation and procedure application
//! - `substitute`: the parameter substitution engine
//! - `host`: the injected host capability interface
//! - `builtins`: native procedures for the bundled table host

use std::fmt;

/// Maximum parsing depth to prevent stack overflow from deeply nested input
pub const MAX_PARSE_DEPTH: usize = 32;

/// Maximum evaluation depth. Substitution-based application re-enters the
/// evaluator once per reduction step, so recursive programs written via
/// self-application deepen the chain on every iteration; exceeding this
/// limit reports `RecursionLimitExceeded` instead of exhausting the stack.
pub const MAX_EVAL_DEPTH: usize = 128;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorKind {
    /// Invalid or unexpected syntax (bad tokens, malformed expressions)
    InvalidSyntax,
    /// Input ended before the expression was complete
    Incomplete,
    /// Expression nesting exceeded the maximum parse depth
    TooDeeplyNested,
    /// Extra input found after a complete, valid expression
    TrailingContent,
}

/// A structured error describing a parsing failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred
    pub context: Option<String>,
}

impl ParseError {
    /// Create a simple ParseError with a kind and message but no context
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Create a ParseError with context extracted from input at a given offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
    ) -> Self {
        const MAX_CONTEXT: usize = 60;

        let context_start = error_offset.saturating_sub(20);
        let snippet: String = input.chars().skip(context_start).take(MAX_CONTEXT).collect();

        let mut context = String::new();
        if context_start > 0 {
            context.push_str("[...]");
        }
        context.push_str(&snippet);
        if context_start + snippet.len() < input.len() {
            context.push_str("[...]");
        }
        let context = context.replace('\n', "\\n").replace('\r', "");

        ParseError {
            kind,
            message: message.into(),
            context: Some(context),
        }
    }
}

/// Error types for the interpreter.
///
/// All kinds are fatal to the current top-level evaluation; nothing is caught
/// or retried inside the core. Host failures are forwarded unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    ParseError(ParseError),
    /// An expression reached the evaluator or substitution engine that
    /// matches none of the recognized shapes
    MalformedExpression(String),
    /// The operator of a call resolved to something that is neither a
    /// native procedure nor a lambda form
    NotAProcedure(String),
    /// The host could not resolve a free symbol
    HostLookupFailure(String),
    /// A native procedure reported a failure
    HostInvocationFailure(String),
    /// Evaluation depth exceeded `MAX_EVAL_DEPTH`
    RecursionLimitExceeded,
    /// A native procedure was called with the wrong number of arguments
    ArityError { expected: usize, got: usize },
}

impl Error {
    /// Create an ArityError
    pub fn arity_error(expected: usize, got: usize) -> Self {
        Error::ArityError { expected, got }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(e) => {
                write!(f, "ParseError: {}", e.message)?;
                if let Some(context) = &e.context {
                    write!(f, "\nContext: {context}")?;
                }
                Ok(())
            }
            Error::MalformedExpression(detail) => write!(f, "Malformed expression: {detail}"),
            Error::NotAProcedure(expr) => write!(f, "Not a procedure: {expr}"),
            Error::HostLookupFailure(name) => write!(f, "Unresolved global symbol: {name}"),
            Error::HostInvocationFailure(msg) => write!(f, "Native procedure failed: {msg}"),
            Error::RecursionLimitExceeded => {
                write!(f, "Evaluation depth limit exceeded (max: {MAX_EVAL_DEPTH})")
            }
            Error::ArityError { expected, got } => write!(
                f,
                "ArityError: procedure expected {expected} arguments but got {got}"
            ),
        }
    }
}

pub mod ast;
pub mod builtins;
pub mod evaluator;
pub mod host;
pub mod scheme;
pub mod substitute;
