//! This module defines the core expression tree and the syntactic classifier.
//! The main enum, [`Expr`], covers every shape the evaluator and substitution
//! engine can encounter: atom constants, symbols, opaque native procedures and
//! lists. Special forms (`quote`, `if`, `lambda`) are ordinary lists
//! distinguished by their head tag; the classifier predicates on [`Expr`]
//! categorize them without evaluating anything. Ergonomic helper functions
//! such as [`val`], [`sym`], and [`nil`] are provided for convenient tree
//! construction in tests, and `Display` renders expressions in parseable
//! S-expression form.

use crate::Error;
use std::sync::Arc;

/// Type alias for number values in the interpreter
pub(crate) type NumberType = i64;

/// Allowed non-alphanumeric characters in symbol names
pub(crate) const SYMBOL_SPECIAL_CHARS: &str = "+-*/<>=!?_$";

/// Tag symbols of the recognized special forms
pub(crate) const QUOTE_TAG: &str = "quote";
pub(crate) const IF_TAG: &str = "if";
pub(crate) const LAMBDA_TAG: &str = "lambda";

/// Check if a string is a valid symbol name
/// Valid: non-empty, no leading digit, no "-digit" prefix, alphanumeric + SYMBOL_SPECIAL_CHARS
pub(crate) fn is_valid_symbol(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        None => false, // name is empty
        Some(first_char) => {
            if first_char.is_ascii_digit() {
                return false;
            }

            if first_char == '-'
                && let Some(second_char) = chars.next()
                && second_char.is_ascii_digit()
            {
                return false;
            }

            name.chars()
                .all(|c| c.is_alphanumeric() || SYMBOL_SPECIAL_CHARS.contains(c))
        }
    }
}

/// Canonical signature for native procedures supplied by a host
pub type NativeFn = dyn Fn(&[Expr]) -> Result<Expr, Error> + Send + Sync;

/// Core expression type.
///
/// An `Expr` is both code and data: evaluation consumes one, and procedure
/// application rewrites one. Every value the evaluator can produce is also a
/// legal expression, which is what makes substitution-based application
/// possible (argument values are spliced back into syntax trees, quoted
/// where necessary).
#[derive(Clone)]
pub enum Expr {
    /// Numbers (integers only); self-evaluating
    Number(NumberType),
    /// Boolean constants; self-evaluating
    Bool(bool),
    /// String literals; self-evaluating
    String(String),
    /// Bare identifiers; resolved by substitution or by the host
    Symbol(String),
    /// Opaque native procedure supplied by the host; self-evaluating.
    /// Uses the id string for equality and display instead of the
    /// function pointer.
    Native { id: String, func: Arc<NativeFn> },
    /// Lists, covering quote/if/lambda forms and procedure calls
    List(Vec<Expr>),
}

// Generates the tag predicates so adding a special form is a one-line addition
macro_rules! tag_predicate {
    ($(#[$doc:meta])* $name:ident, $tag:expr) => {
        $(#[$doc])*
        pub fn $name(&self) -> bool {
            self.is_tagged($tag)
        }
    };
}

impl Expr {
    /// True for atom constants and native procedure constants
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Expr::Number(_) | Expr::Bool(_) | Expr::String(_) | Expr::Native { .. }
        )
    }

    /// True for bare identifiers
    pub fn is_symbol(&self) -> bool {
        matches!(self, Expr::Symbol(_))
    }

    /// True for any list, special form or not
    pub fn is_list(&self) -> bool {
        matches!(self, Expr::List(_))
    }

    /// Shared constructor for the tag predicates: a non-empty list whose
    /// first element is the given tag symbol
    fn is_tagged(&self, tag: &str) -> bool {
        matches!(self, Expr::List(items)
            if matches!(items.first(), Some(Expr::Symbol(head)) if head == tag))
    }

    tag_predicate!(
        /// True for `(quote datum)` forms
        is_quote_form,
        QUOTE_TAG
    );
    tag_predicate!(
        /// True for `(if condition consequent alternative)` forms
        is_if_form,
        IF_TAG
    );
    tag_predicate!(
        /// True for `(lambda (params...) body)` forms
        is_lambda_form,
        LAMBDA_TAG
    );

    /// Check if a value represents nil (the empty list)
    pub(crate) fn is_nil(&self) -> bool {
        matches!(self, Expr::List(items) if items.is_empty())
    }
}

/// Wrap an expression in a quote form so re-evaluation reproduces it literally
pub(crate) fn quoted(expr: Expr) -> Expr {
    Expr::List(vec![Expr::Symbol(QUOTE_TAG.to_owned()), expr])
}

/// Build a native procedure constant
pub fn native(id: impl Into<String>, func: Arc<NativeFn>) -> Expr {
    Expr::Native {
        id: id.into(),
        func,
    }
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "Number({n})"),
            Expr::Bool(b) => write!(f, "Bool({b})"),
            Expr::String(s) => write!(f, "String(\"{s}\")"),
            Expr::Symbol(s) => write!(f, "Symbol({s})"),
            Expr::Native { id, .. } => write!(f, "Native({id})"),
            Expr::List(items) => {
                write!(f, "List(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Expr::String(s) => {
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
            Expr::Symbol(s) => write!(f, "{s}"),
            Expr::Native { id, .. } => write!(f, "#<native:{id}>"),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Number(a), Expr::Number(b)) => a == b,
            (Expr::Bool(a), Expr::Bool(b)) => a == b,
            (Expr::String(a), Expr::String(b)) => a == b,
            (Expr::Symbol(a), Expr::Symbol(b)) => a == b,
            // Compare natives by id string, not function pointer
            (Expr::Native { id: a, .. }, Expr::Native { id: b, .. }) => a == b,
            (Expr::List(a), Expr::List(b)) => a == b,
            _ => false, // Different variants are never equal
        }
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::String(s.to_owned())
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::String(s)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Expr {
            fn from(n: $int_type) -> Self {
                Expr::Number(n as i64)
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(NumberType); // Special case - no casting
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Expr>> From<Vec<T>> for Expr {
    fn from(v: Vec<T>) -> Self {
        Expr::List(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Expr>, const N: usize> From<[T; N]> for Expr {
    fn from(arr: [T; N]) -> Self {
        Expr::List(arr.into_iter().map(|x| x.into()).collect())
    }
}

/// Helper function for creating symbols - works great in mixed lists!
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sym<S: AsRef<str>>(name: S) -> Expr {
    Expr::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating Exprs - accepts any type convertible to Expr
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn val<T: Into<Expr>>(value: T) -> Expr {
    value.into()
}

/// Helper function for creating empty lists (nil)
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn nil() -> Expr {
    Expr::List(vec![])
}
