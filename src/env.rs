//! Attribute/variable scope stack.
//!
//! Grounded on `checker::scope_guards`'s RAII-closure pattern (`with_infer_env_scope`,
//! `with_infer_bindings`): a scope is entered, a closure runs, and the scope is
//! restored on every exit path including an early return from inside the
//! closure — the same discipline spec §5 demands ("every scope-entry pairs
//! with an exit on every exit path").

use rustc_hash::FxHashMap;

use crate::diagnostic::Diagnostics;
use crate::symbol::{Symbol, WellKnown};

/// A stack of scopes mapping identifier to declared type, innermost last.
pub struct Env {
    scopes: Vec<FxHashMap<Symbol, Symbol>>,
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl Env {
    pub fn new() -> Self {
        Env { scopes: Vec::new() }
    }

    pub fn enter(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn exit(&mut self) {
        if self.scopes.pop().is_none() {
            unreachable!("exit called with no open scope");
        }
    }

    /// Run `f` inside a fresh scope, guaranteeing the scope is exited when
    /// `f` returns, panics, or returns early.
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.enter();
        let result = f(self);
        self.exit();
        result
    }

    /// Bind `name` in the innermost scope. Returns `false` (and does not
    /// overwrite) when `name` is already bound in *any* currently-visible
    /// scope — the caller uses this to detect duplicate attributes.
    pub fn bind_if_fresh(&mut self, name: Symbol, ty: Symbol) -> bool {
        if self.lookup(name).is_some() {
            return false;
        }
        self.bind(name, ty);
        true
    }

    /// Bind `name` in the innermost scope unconditionally, shadowing any
    /// outer binding. Used for formals and `let`/`case` bindings, which are
    /// new scopes rather than redeclarations of an existing one.
    pub fn bind(&mut self, name: Symbol, ty: Symbol) {
        let Some(scope) = self.scopes.last_mut() else {
            unreachable!("bind called with no open scope");
        };
        scope.insert(name, ty);
    }

    /// Innermost-match lookup across every open scope.
    pub fn lookup(&self, name: Symbol) -> Option<Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name).copied())
    }

    /// Bind `self` to `SELF_TYPE` in the innermost scope, as every method
    /// and attribute body begins.
    pub fn bind_self(&mut self, wk: &WellKnown) {
        self.bind(wk.self_, wk.self_type);
    }

    /// Reject `name == self`, reporting `message` when it is.
    pub fn reject_self(
        wk: &WellKnown,
        name: Symbol,
        filename: &str,
        line: u32,
        message: &str,
        diags: &mut Diagnostics,
    ) -> bool {
        if name == wk.self_ {
            diags.report_at(filename, line, message);
            true
        } else {
            false
        }
    }
}
