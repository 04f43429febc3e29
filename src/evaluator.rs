use crate::ast::Expr;
use crate::host::Host;
use crate::substitute::substitute;
use crate::{Error, MAX_EVAL_DEPTH};
use std::collections::HashSet;

/// Evaluate one expression to a value (public API).
///
/// This is the sole entry point of the core: the surrounding driver parses
/// raw input into an [`Expr`], calls this once per expression, and renders
/// the result. Free symbols and native invocations are delegated to `host`.
pub fn evaluate(expr: &Expr, host: &dyn Host) -> Result<Expr, Error> {
    eval_with_depth_tracking(expr, host, 0)
}

/// Evaluate with depth tracking to prevent stack overflow
fn eval_with_depth_tracking(expr: &Expr, host: &dyn Host, depth: usize) -> Result<Expr, Error> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(Error::RecursionLimitExceeded);
    }
    match expr {
        // Self-evaluating: atom constants and native procedure constants
        Expr::Number(_) | Expr::Bool(_) | Expr::String(_) | Expr::Native { .. } => {
            Ok(expr.clone())
        }

        // Free symbol: the host resolves it (substitution has already
        // consumed any symbol that was a formal parameter)
        Expr::Symbol(name) => host.resolve_global(name),

        Expr::List(items) => eval_list(expr, items, host, depth),
    }
}

/// Evaluate a list expression: special forms first, then procedure calls
fn eval_list(expr: &Expr, items: &[Expr], host: &dyn Host, depth: usize) -> Result<Expr, Error> {
    if expr.is_quote_form() {
        return match items {
            [_, datum] => Ok(datum.clone()),
            _ => Err(Error::MalformedExpression(format!(
                "quote form requires exactly one datum: {expr}"
            ))),
        };
    }

    if expr.is_if_form() {
        return match items {
            [_, condition, consequent, alternative] => {
                let test = eval_with_depth_tracking(condition, host, depth + 1)?;
                // Anything other than the false constant selects the
                // consequent; exactly one branch is ever evaluated
                if is_truthy(&test) {
                    eval_with_depth_tracking(consequent, host, depth + 1)
                } else {
                    eval_with_depth_tracking(alternative, host, depth + 1)
                }
            }
            _ => Err(Error::MalformedExpression(format!(
                "if form requires a condition and two branches: {expr}"
            ))),
        };
    }

    // A lambda form denotes a procedure value without further reduction
    if expr.is_lambda_form() {
        return Ok(expr.clone());
    }

    match items {
        [] => Err(Error::MalformedExpression(
            "cannot evaluate an empty list".to_owned(),
        )),

        // Procedure call: operator first, then operands left-to-right
        [operator, operands @ ..] => {
            let proc = eval_with_depth_tracking(operator, host, depth + 1)?;
            let args: Vec<Expr> = operands
                .iter()
                .map(|operand| eval_with_depth_tracking(operand, host, depth + 1))
                .collect::<Result<_, _>>()?;
            apply(&proc, &args, host, depth)
        }
    }
}

/// Truthiness: any value other than the boolean false constant is true
fn is_truthy(value: &Expr) -> bool {
    !matches!(value, Expr::Bool(false))
}

/// Apply a resolved procedure value to already-evaluated arguments.
///
/// Native procedures are delegated to the host. Lambda forms are applied by
/// substituting the arguments into the body and re-evaluating the result;
/// this is the sole recursive re-entry into the evaluator.
fn apply(proc: &Expr, args: &[Expr], host: &dyn Host, depth: usize) -> Result<Expr, Error> {
    match proc {
        Expr::Native { .. } => host.invoke_native(proc, args),
        Expr::List(items) if proc.is_lambda_form() => {
            let (params, body) = lambda_parts(proc, items)?;
            let rewritten = substitute(body, &params, args, &HashSet::new())?;
            eval_with_depth_tracking(&rewritten, host, depth + 1)
        }
        other => Err(Error::NotAProcedure(other.to_string())),
    }
}

/// Destructure `(lambda (params...) body)` into parameter names and body
fn lambda_parts<'a>(proc: &Expr, items: &'a [Expr]) -> Result<(Vec<String>, &'a Expr), Error> {
    if let [_, Expr::List(param_items), body] = items {
        let mut params = Vec::with_capacity(param_items.len());
        for param in param_items {
            match param {
                Expr::Symbol(name) => params.push(name.clone()),
                _ => {
                    return Err(Error::MalformedExpression(format!(
                        "lambda parameters must be symbols: {proc}"
                    )));
                }
            }
        }
        Ok((params, body))
    } else {
        Err(Error::MalformedExpression(format!(
            "lambda form requires a parameter list and a body: {proc}"
        )))
    }
}
