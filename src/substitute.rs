//! Parameter substitution over expression trees.
//!
//! Application of a lambda form is implemented here as syntactic rewriting:
//! every free occurrence of a formal parameter in the procedure body is
//! replaced with a representation of the corresponding already-evaluated
//! argument value. Nested lambda forms introduce shadowing: their parameter
//! names are added to a bound-set while descending into their bodies, and
//! symbols in the bound-set are never replaced. Quote forms are opaque to
//! substitution; their contents pass through untouched.

use crate::Error;
use crate::ast::{Expr, quoted};
use std::collections::HashSet;

/// Replace free occurrences of `params` in `expr` with representations of
/// the paired `args`.
///
/// `bound` is the set of symbols shadowed by enclosing lambda forms already
/// descended through; callers start a substitution pass with an empty set.
/// `params` and `args` are paired positionally; a symbol not found in
/// `params` is left unchanged and treated as a free reference for the
/// evaluator to resolve later.
pub fn substitute(
    expr: &Expr,
    params: &[String],
    args: &[Expr],
    bound: &HashSet<String>,
) -> Result<Expr, Error> {
    match expr {
        Expr::Number(_) | Expr::Bool(_) | Expr::String(_) | Expr::Native { .. } => {
            Ok(expr.clone())
        }
        Expr::Symbol(name) => {
            if bound.contains(name) {
                // Shadowed by an inner lambda; inner binding wins
                Ok(expr.clone())
            } else {
                Ok(lookup(name, params, args))
            }
        }
        Expr::List(_) if expr.is_quote_form() => Ok(expr.clone()),
        Expr::List(items) if expr.is_lambda_form() => match items.as_slice() {
            [tag, param_list @ Expr::List(inner_params), body] => {
                let mut inner_bound = bound.clone();
                for param in inner_params {
                    if let Expr::Symbol(name) = param {
                        inner_bound.insert(name.clone());
                    }
                }
                let new_body = substitute(body, params, args, &inner_bound)?;
                Ok(Expr::List(vec![tag.clone(), param_list.clone(), new_body]))
            }
            _ => Err(Error::MalformedExpression(format!(
                "lambda form requires a parameter list and a body: {expr}"
            ))),
        },
        // Call forms and if forms share no special tag here; rewrite
        // element-wise, head included
        Expr::List(items) => {
            let rewritten: Result<Vec<Expr>, Error> = items
                .iter()
                .map(|item| substitute(item, params, args, bound))
                .collect();
            Ok(Expr::List(rewritten?))
        }
    }
}

/// Paired positional search of `params`/`args`.
///
/// If `params` is exhausted without a match the symbol is returned
/// unchanged: it is a free (global) reference that the evaluator resolves
/// through the host at the point of use. A params/args length mismatch
/// therefore degrades to free-reference treatment rather than failing.
fn lookup(name: &str, params: &[String], args: &[Expr]) -> Expr {
    for (param, arg) in params.iter().zip(args) {
        if param == name {
            return quote_if_needed(arg);
        }
    }
    Expr::Symbol(name.to_owned())
}

/// Convert an evaluated argument value into something legally substitutable
/// into a syntax tree.
///
/// Atom constants, native procedures and lambda forms are self-evaluating
/// expressions already and are inserted directly. Anything else (a symbol, a
/// data list returned by a native) would be mis-parsed as code on
/// re-evaluation, so it is wrapped in a quote form to reappear literally.
fn quote_if_needed(value: &Expr) -> Expr {
    match value {
        Expr::Number(_) | Expr::Bool(_) | Expr::String(_) | Expr::Native { .. } => value.clone(),
        Expr::List(_) if value.is_lambda_form() => value.clone(),
        _ => quoted(value.clone()),
    }
}
