//! Native procedure registry for the bundled table host.
//!
//! Natives are opaque procedure constants: the evaluator never looks inside
//! them, it only hands them (with already-evaluated arguments) back to the
//! host for invocation. Each registry entry pairs an implementation with an
//! [`Arity`] that is validated before the implementation runs.
//!
//! Failures reported here surface as `HostInvocationFailure` (or
//! `ArityError` for argument-count mismatches) and propagate unchanged
//! through the core.
//!
//! To add a new native:
//!
//! 1. Implement it with the signature `fn(&[Expr]) -> Result<Expr, Error>`
//! 2. Add it to `NATIVE_OPS` with its name and arity
//! 3. Add test coverage for its edge cases

use crate::Error;
use crate::ast::{Expr, NativeFn, NumberType};
use crate::host::TableHost;
use std::sync::Arc;

/// Expected argument count of a native procedure
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    /// Exactly n arguments
    Exactly(usize),
    /// At least n arguments
    AtLeast(usize),
}

impl Arity {
    /// Check if the given number of arguments is valid
    pub fn validate(self, got: usize) -> Result<(), Error> {
        let (expected, ok) = match self {
            Arity::Exactly(n) => (n, got == n),
            Arity::AtLeast(n) => (n, got >= n),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::arity_error(expected, got))
        }
    }
}

/// One registry entry: a named native with its arity
struct NativeOp {
    id: &'static str,
    arity: Arity,
    func: fn(&[Expr]) -> Result<Expr, Error>,
}

static NATIVE_OPS: &[NativeOp] = &[
    // List primitives
    NativeOp {
        id: "car",
        arity: Arity::Exactly(1),
        func: native_car,
    },
    NativeOp {
        id: "cdr",
        arity: Arity::Exactly(1),
        func: native_cdr,
    },
    NativeOp {
        id: "cons",
        arity: Arity::Exactly(2),
        func: native_cons,
    },
    NativeOp {
        id: "list",
        arity: Arity::AtLeast(0),
        func: native_list,
    },
    NativeOp {
        id: "null?",
        arity: Arity::Exactly(1),
        func: native_is_null,
    },
    NativeOp {
        id: "first",
        arity: Arity::Exactly(1),
        func: native_first,
    },
    // Arithmetic
    NativeOp {
        id: "+",
        arity: Arity::AtLeast(0),
        func: native_add,
    },
    NativeOp {
        id: "-",
        arity: Arity::AtLeast(1),
        func: native_sub,
    },
    NativeOp {
        id: "*",
        arity: Arity::AtLeast(1),
        func: native_mul,
    },
    // Comparison and logic
    NativeOp {
        id: "=",
        arity: Arity::AtLeast(2),
        func: native_num_eq,
    },
    NativeOp {
        id: "<",
        arity: Arity::AtLeast(2),
        func: native_lt,
    },
    NativeOp {
        id: ">",
        arity: Arity::AtLeast(2),
        func: native_gt,
    },
    NativeOp {
        id: "equal?",
        arity: Arity::Exactly(2),
        func: native_equal,
    },
    NativeOp {
        id: "not",
        arity: Arity::Exactly(1),
        func: native_not,
    },
];

impl TableHost {
    /// Create a host whose symbol table carries all standard natives
    pub fn with_builtins() -> Self {
        let mut host = TableHost::new();
        for op in NATIVE_OPS {
            host.register_native(op.id, op.arity, op.func);
        }
        host
    }

    /// Register a native procedure under a global name.
    ///
    /// The function is wrapped with arity validation and stored as an
    /// opaque procedure constant, so evaluated code can both call it by
    /// name and pass it around as a value.
    pub fn register_native(
        &mut self,
        name: &str,
        arity: Arity,
        func: fn(&[Expr]) -> Result<Expr, Error>,
    ) {
        let wrapped: Arc<NativeFn> = Arc::new(move |args: &[Expr]| {
            arity.validate(args.len())?;
            func(args)
        });
        self.define(
            name,
            Expr::Native {
                id: name.to_owned(),
                func: wrapped,
            },
        );
    }
}

//
// Native implementations
//

fn expect_number(value: &Expr, op: &str) -> Result<NumberType, Error> {
    match value {
        Expr::Number(n) => Ok(*n),
        other => Err(Error::HostInvocationFailure(format!(
            "{op} requires numbers, got {other}"
        ))),
    }
}

fn expect_list<'a>(value: &'a Expr, op: &str) -> Result<&'a [Expr], Error> {
    match value {
        Expr::List(items) => Ok(items),
        other => Err(Error::HostInvocationFailure(format!(
            "{op} requires a list, got {other}"
        ))),
    }
}

fn native_car(args: &[Expr]) -> Result<Expr, Error> {
    let items = expect_list(&args[0], "car")?;
    items
        .first()
        .cloned()
        .ok_or_else(|| Error::HostInvocationFailure("car of empty list".into()))
}

fn native_cdr(args: &[Expr]) -> Result<Expr, Error> {
    let items = expect_list(&args[0], "cdr")?;
    match items {
        [] => Err(Error::HostInvocationFailure("cdr of empty list".into())),
        [_, rest @ ..] => Ok(Expr::List(rest.to_vec())),
    }
}

fn native_cons(args: &[Expr]) -> Result<Expr, Error> {
    let tail = expect_list(&args[1], "cons")?;
    let mut items = Vec::with_capacity(tail.len() + 1);
    items.push(args[0].clone());
    items.extend_from_slice(tail);
    Ok(Expr::List(items))
}

fn native_list(args: &[Expr]) -> Result<Expr, Error> {
    Ok(Expr::List(args.to_vec()))
}

fn native_is_null(args: &[Expr]) -> Result<Expr, Error> {
    Ok(Expr::Bool(args[0].is_nil()))
}

/// First letter of a symbol or string, or first element of a list.
/// `(first 'spain)` is the symbol `s`.
fn native_first(args: &[Expr]) -> Result<Expr, Error> {
    match &args[0] {
        Expr::Symbol(name) => match name.chars().next() {
            Some(ch) => Ok(Expr::Symbol(ch.to_string())),
            None => Err(Error::HostInvocationFailure("first of empty symbol".into())),
        },
        Expr::String(text) => match text.chars().next() {
            Some(ch) => Ok(Expr::String(ch.to_string())),
            None => Err(Error::HostInvocationFailure("first of empty string".into())),
        },
        Expr::List(_) => native_car(args),
        other => Err(Error::HostInvocationFailure(format!(
            "first requires a symbol, string or list, got {other}"
        ))),
    }
}

fn native_add(args: &[Expr]) -> Result<Expr, Error> {
    let mut sum: NumberType = 0;
    for arg in args {
        sum = sum
            .checked_add(expect_number(arg, "+")?)
            .ok_or_else(|| Error::HostInvocationFailure("integer overflow in addition".into()))?;
    }
    Ok(Expr::Number(sum))
}

fn native_sub(args: &[Expr]) -> Result<Expr, Error> {
    let first = expect_number(&args[0], "-")?;

    // Unary minus is negation
    if args.len() == 1 {
        return first
            .checked_neg()
            .map(Expr::Number)
            .ok_or_else(|| Error::HostInvocationFailure("integer overflow in negation".into()));
    }

    let mut result = first;
    for arg in &args[1..] {
        result = result.checked_sub(expect_number(arg, "-")?).ok_or_else(|| {
            Error::HostInvocationFailure("integer overflow in subtraction".into())
        })?;
    }
    Ok(Expr::Number(result))
}

fn native_mul(args: &[Expr]) -> Result<Expr, Error> {
    let mut product = expect_number(&args[0], "*")?;
    for arg in &args[1..] {
        product = product.checked_mul(expect_number(arg, "*")?).ok_or_else(|| {
            Error::HostInvocationFailure("integer overflow in multiplication".into())
        })?;
    }
    Ok(Expr::Number(product))
}

// Chained numeric comparisons: all adjacent pairs must satisfy the operator
macro_rules! numeric_comparison {
    ($name:ident, $op:tt, $op_str:expr) => {
        fn $name(args: &[Expr]) -> Result<Expr, Error> {
            let mut prev = expect_number(&args[0], $op_str)?;
            for arg in &args[1..] {
                let current = expect_number(arg, $op_str)?;
                if !(prev $op current) {
                    return Ok(Expr::Bool(false));
                }
                prev = current;
            }
            Ok(Expr::Bool(true))
        }
    };
}

numeric_comparison!(native_num_eq, ==, "=");
numeric_comparison!(native_lt, <, "<");
numeric_comparison!(native_gt, >, ">");

fn native_equal(args: &[Expr]) -> Result<Expr, Error> {
    Ok(Expr::Bool(args[0] == args[1]))
}

/// Negation follows the evaluator's truthiness: only `#f` is false
fn native_not(args: &[Expr]) -> Result<Expr, Error> {
    Ok(Expr::Bool(matches!(args[0], Expr::Bool(false))))
}
