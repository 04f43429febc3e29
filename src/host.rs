//! Host capability interface.
//!
//! The core consumes exactly two capabilities from its surroundings:
//! resolving free symbols to values and invoking opaque native procedures.
//! Both are modeled as one injected trait so the core can be exercised with
//! a mock host exposing a fixed symbol table. [`TableHost`] is the bundled
//! implementation backed by a name table; `builtins` populates one with the
//! standard primitives.

use crate::Error;
use crate::ast::Expr;
use std::collections::HashMap;

/// The two capabilities the evaluator consumes from its environment.
///
/// Failures from either capability are forwarded unchanged by the core; it
/// never interprets or recovers from them.
pub trait Host {
    /// Resolve a free symbol (typically the name of a built-in operation)
    /// to a value.
    fn resolve_global(&self, name: &str) -> Result<Expr, Error>;

    /// Call a native procedure with already-evaluated arguments.
    fn invoke_native(&self, proc: &Expr, args: &[Expr]) -> Result<Expr, Error>;
}

/// Host implementation backed by a fixed symbol table.
///
/// Global lookups read the table; native invocation calls the function
/// carried inside the opaque procedure value itself.
#[derive(Default, Clone)]
pub struct TableHost {
    bindings: HashMap<String, Expr>,
}

impl TableHost {
    /// Create an empty host with no globals at all
    pub fn new() -> Self {
        TableHost {
            bindings: HashMap::new(),
        }
    }

    /// Bind a global name to a value
    pub fn define(&mut self, name: impl Into<String>, value: Expr) {
        self.bindings.insert(name.into(), value);
    }

    /// All global names bound in this host, sorted
    pub fn global_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Host for TableHost {
    fn resolve_global(&self, name: &str) -> Result<Expr, Error> {
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| Error::HostLookupFailure(name.to_owned()))
    }

    fn invoke_native(&self, proc: &Expr, args: &[Expr]) -> Result<Expr, Error> {
        match proc {
            Expr::Native { func, .. } => func(args),
            other => Err(Error::NotAProcedure(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{native, sym, val};
    use std::sync::Arc;

    #[test]
    fn test_resolve_global_hits_and_misses() {
        let mut host = TableHost::new();
        host.define("answer", val(42));

        assert_eq!(host.resolve_global("answer").unwrap(), val(42));
        assert_eq!(
            host.resolve_global("missing").unwrap_err(),
            Error::HostLookupFailure("missing".to_owned())
        );
    }

    #[test]
    fn test_invoke_native_calls_carried_function() {
        let host = TableHost::new();
        let double = native(
            "double",
            Arc::new(|args: &[Expr]| match args {
                [Expr::Number(n)] => Ok(Expr::Number(n * 2)),
                _ => Err(Error::HostInvocationFailure("double requires a number".into())),
            }),
        );

        assert_eq!(host.invoke_native(&double, &[val(21)]).unwrap(), val(42));
        assert!(matches!(
            host.invoke_native(&double, &[sym("x")]).unwrap_err(),
            Error::HostInvocationFailure(_)
        ));
        assert!(matches!(
            host.invoke_native(&val(1), &[]).unwrap_err(),
            Error::NotAProcedure(_)
        ));
    }

    #[test]
    fn test_global_names_sorted() {
        let mut host = TableHost::new();
        host.define("zeta", val(1));
        host.define("alpha", val(2));
        assert_eq!(host.global_names(), vec!["alpha", "zeta"]);
    }
}
