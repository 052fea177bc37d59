//! Expression type checker.
//!
//! One function per expression variant, grounded on `checker::expressions`'s
//! per-variant match arms, generalized from Ori's structural/nominal type
//! system down to Cool's nominal single-inheritance one. Every rule writes
//! its result into the node's `ty` slot before returning it; on a local
//! error the node is poisoned to `Object` so that enclosing expressions keep
//! making progress instead of unwinding (spec §7).

use crate::ast::{CaseBranch, Expr, ExprKind};
use crate::diagnostic::Diagnostics;
use crate::env::Env;
use crate::inherit;
use crate::methods::MethodTables;
use crate::registry::ClassRegistry;
use crate::stack::ensure_sufficient_stack;
use crate::symbol::{Interner, Symbol, WellKnown};

/// Shared context threaded through every expression-checking call: the
/// read-only class registry and method tables, the mutated attribute/variable
/// scope stack, and the diagnostic sink.
pub struct Checker<'a> {
    pub registry: &'a ClassRegistry,
    pub wk: &'a WellKnown,
    pub interner: &'a Interner,
    pub tables: &'a MethodTables,
    pub env: &'a mut Env,
    pub diags: &'a mut Diagnostics,
    /// The class whose body is currently being checked; used to resolve
    /// `SELF_TYPE` in subtype checks.
    pub ctx: Symbol,
    pub filename: String,
}

impl Checker<'_> {
    fn report(&mut self, line: u32, message: impl Into<String>) {
        self.diags.report_at(self.filename.clone(), line, message);
    }

    fn is_subtype(&self, child: Symbol, parent: Symbol) -> bool {
        inherit::is_subtype(self.registry, self.wk, child, parent, self.ctx)
    }

    fn lca(&self, a: Symbol, b: Symbol) -> Symbol {
        inherit::lca(self.registry, self.wk, a, b)
    }

    /// Run `f` inside a fresh scope, mirroring [`Env::with_scope`]'s
    /// enter-run-exit discipline but threading the whole checker through so
    /// `f` can still dispatch back into `self.check`.
    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.env.enter();
        let result = f(self);
        self.env.exit();
        result
    }

    /// Check `e`, writing and returning its type. Recursion is wrapped with
    /// a stack-growth guard since Cool expressions can nest arbitrarily deep.
    pub fn check(&mut self, e: &mut Expr) -> Symbol {
        ensure_sufficient_stack(|| self.check_inner(e))
    }

    fn check_inner(&mut self, e: &mut Expr) -> Symbol {
        let line = e.line;
        let ty = match &mut e.kind {
            ExprKind::Identifier(name) => self.check_identifier(line, *name),
            ExprKind::Assign { name, value } => self.check_assign(line, *name, value),
            ExprKind::New { type_name } => self.check_new(line, *type_name),
            ExprKind::If {
                predicate,
                then_branch,
                else_branch,
            } => self.check_if(line, predicate, then_branch, else_branch),
            ExprKind::While { predicate, body } => self.check_while(line, predicate, body),
            ExprKind::Block { body } => self.check_block(body),
            ExprKind::Let {
                name,
                declared_type,
                init,
                body,
            } => self.check_let(line, *name, *declared_type, init, body),
            ExprKind::Case { scrutinee, branches } => self.check_case(line, scrutinee, branches),
            ExprKind::IsVoid(inner) => {
                self.check(inner);
                self.wk.bool_
            }
            ExprKind::Not(inner) => self.check_bool_unary(line, inner),
            ExprKind::Neg(inner) => self.check_int_unary(line, inner),
            ExprKind::Add(l, r) | ExprKind::Sub(l, r) | ExprKind::Mul(l, r) | ExprKind::Div(l, r) => {
                self.check_arith(line, l, r)
            }
            ExprKind::Lt(l, r) | ExprKind::Le(l, r) => self.check_relational(line, l, r),
            ExprKind::Eq(l, r) => self.check_equality(line, l, r),
            ExprKind::DynamicDispatch { receiver, method, args } => {
                self.check_dynamic_dispatch(line, receiver, *method, args)
            }
            ExprKind::StaticDispatch {
                receiver,
                target_type,
                method,
                args,
            } => self.check_static_dispatch(line, receiver, *target_type, *method, args),
            ExprKind::IntConst(_) => self.wk.int,
            ExprKind::StringConst(_) => self.wk.string,
            ExprKind::BoolConst(_) => self.wk.bool_,
            ExprKind::NoExpr => self.wk.no_type,
        };
        e.ty = Some(ty);
        ty
    }

    fn check_identifier(&mut self, line: u32, name: Symbol) -> Symbol {
        if name == self.wk.self_ {
            return self.wk.self_type;
        }
        if let Some(ty) = self.env.lookup(name) {
            ty
        } else {
            self.report(line, "undeclared identifier");
            self.wk.object
        }
    }

    fn check_assign(&mut self, line: u32, name: Symbol, value: &mut Expr) -> Symbol {
        if Env::reject_self(self.wk, name, &self.filename, line, "assign to self", self.diags) {
            self.check(value);
            return self.wk.object;
        }

        let declared = self.env.lookup(name);
        let value_ty = self.check(value);

        let Some(declared) = declared else {
            self.report(line, "assignment target not in scope");
            return self.wk.object;
        };

        if !self.is_subtype(value_ty, declared) {
            self.report(line, "assignment does not conform to declared type");
            return self.wk.object;
        }

        value_ty
    }

    fn check_new(&mut self, line: u32, type_name: Symbol) -> Symbol {
        if type_name == self.wk.self_type {
            return self.wk.self_type;
        }
        if self.registry.contains(type_name) {
            type_name
        } else {
            self.report(line, "unknown type in new");
            self.wk.object
        }
    }

    fn check_if(&mut self, line: u32, predicate: &mut Expr, then_branch: &mut Expr, else_branch: &mut Expr) -> Symbol {
        let predicate_ty = self.check(predicate);
        let then_ty = self.check(then_branch);
        let else_ty = self.check(else_branch);

        if predicate_ty != self.wk.bool_ {
            self.report(line, "if predicate must be Bool");
            return self.wk.object;
        }
        self.lca(then_ty, else_ty)
    }

    fn check_while(&mut self, line: u32, predicate: &mut Expr, body: &mut Expr) -> Symbol {
        let predicate_ty = self.check(predicate);
        self.check(body);
        if predicate_ty != self.wk.bool_ {
            self.report(line, "while predicate must be Bool");
        }
        self.wk.object
    }

    fn check_block(&mut self, body: &mut [Expr]) -> Symbol {
        let mut last = self.wk.object;
        for sub in body.iter_mut() {
            last = self.check(sub);
        }
        last
    }

    fn check_let(
        &mut self,
        line: u32,
        name: Symbol,
        declared_type: Symbol,
        init: &mut Expr,
        body: &mut Expr,
    ) -> Symbol {
        let init_ty = self.check(init);

        if init_ty != self.wk.no_type {
            let conforms = if declared_type == self.wk.self_type {
                self.is_subtype(init_ty, self.ctx)
            } else {
                self.is_subtype(init_ty, declared_type)
            };
            if !conforms {
                self.report(line, "let initializer does not conform to declared type");
            }
        }

        Env::reject_self(self.wk, name, &self.filename, line, "bind self in let", self.diags);

        self.with_scope(|checker| {
            checker.env.bind(name, declared_type);
            checker.check(body)
        })
    }

    fn check_case(&mut self, line: u32, scrutinee: &mut Expr, branches: &mut [CaseBranch]) -> Symbol {
        self.check(scrutinee);

        let mut seen_types: Vec<Symbol> = Vec::new();
        let mut result: Option<Symbol> = None;

        for branch in branches.iter_mut() {
            Env::reject_self(self.wk, branch.name, &self.filename, branch.line, "bind self in case", self.diags);
            if seen_types.contains(&branch.declared_type) {
                self.report(branch.line, "duplicate case-branch type");
            } else {
                seen_types.push(branch.declared_type);
            }

            let branch_ty = self.with_scope(|checker| {
                checker.env.bind(branch.name, branch.declared_type);
                checker.check(&mut branch.body)
            });

            result = Some(match result {
                Some(acc) => self.lca(acc, branch_ty),
                None => branch_ty,
            });
        }

        if branches.is_empty() {
            self.report(line, "case with no branches");
        }

        result.unwrap_or(self.wk.object)
    }

    fn check_bool_unary(&mut self, line: u32, inner: &mut Expr) -> Symbol {
        let inner_ty = self.check(inner);
        if inner_ty != self.wk.bool_ {
            self.report(line, "not requires a Bool operand");
            return self.wk.object;
        }
        self.wk.bool_
    }

    fn check_int_unary(&mut self, line: u32, inner: &mut Expr) -> Symbol {
        let inner_ty = self.check(inner);
        if inner_ty != self.wk.int {
            self.report(line, "negation requires an Int operand");
            return self.wk.object;
        }
        self.wk.int
    }

    fn check_arith(&mut self, line: u32, l: &mut Expr, r: &mut Expr) -> Symbol {
        let l_ty = self.check(l);
        let r_ty = self.check(r);
        if l_ty != self.wk.int || r_ty != self.wk.int {
            self.report(line, "arithmetic requires Int operands");
            return self.wk.object;
        }
        self.wk.int
    }

    fn check_relational(&mut self, line: u32, l: &mut Expr, r: &mut Expr) -> Symbol {
        let l_ty = self.check(l);
        let r_ty = self.check(r);
        if l_ty != self.wk.int || r_ty != self.wk.int {
            self.report(line, "comparison requires Int operands");
            return self.wk.object;
        }
        self.wk.bool_
    }

    /// Equality permits any two non-primitive operands, but if either side
    /// is `Int`, `Bool`, or `String`, both sides must have that same type.
    fn check_equality(&mut self, line: u32, l: &mut Expr, r: &mut Expr) -> Symbol {
        let l_ty = self.check(l);
        let r_ty = self.check(r);
        if (self.wk.is_primitive(l_ty) || self.wk.is_primitive(r_ty)) && l_ty != r_ty {
            self.report(line, "illegal comparison with a basic type");
        }
        self.wk.bool_
    }

    fn check_dynamic_dispatch(
        &mut self,
        line: u32,
        receiver: &mut Expr,
        method: Symbol,
        args: &mut [Expr],
    ) -> Symbol {
        let receiver_ty = self.check(receiver);
        let arg_types: Vec<Symbol> = args.iter_mut().map(|a| self.check(a)).collect();

        let lookup_ty = if receiver_ty == self.wk.self_type {
            self.ctx
        } else {
            receiver_ty
        };

        let Some(m) = self.tables.resolve(self.registry, self.wk, lookup_ty, method).cloned() else {
            self.report(line, "dispatch to undefined method");
            return self.wk.object;
        };

        if !self.check_call_arity_and_args(line, &m, &arg_types) {
            return self.wk.object;
        }

        if m.return_type == self.wk.self_type {
            receiver_ty
        } else {
            m.return_type
        }
    }

    fn check_static_dispatch(
        &mut self,
        line: u32,
        receiver: &mut Expr,
        target_type: Symbol,
        method: Symbol,
        args: &mut [Expr],
    ) -> Symbol {
        let receiver_ty = self.check(receiver);
        let arg_types: Vec<Symbol> = args.iter_mut().map(|a| self.check(a)).collect();

        if target_type == self.wk.self_type {
            self.report(line, "static dispatch on SELF_TYPE");
            return self.wk.object;
        }

        if !self.is_subtype(receiver_ty, target_type) {
            self.report(line, "static dispatch type mismatch");
            return self.wk.object;
        }

        let Some(m) = self
            .tables
            .resolve(self.registry, self.wk, target_type, method)
            .cloned()
        else {
            self.report(line, "dispatch to undefined method");
            return self.wk.object;
        };

        if !self.check_call_arity_and_args(line, &m, &arg_types) {
            return self.wk.object;
        }

        if m.return_type == self.wk.self_type {
            receiver_ty
        } else {
            m.return_type
        }
    }

    fn check_call_arity_and_args(&mut self, line: u32, m: &crate::ast::Method, arg_types: &[Symbol]) -> bool {
        if m.formals.len() != arg_types.len() {
            self.report(line, "method called with wrong number of arguments");
            return false;
        }
        let mut ok = true;
        for (formal, arg_ty) in m.formals.iter().zip(arg_types.iter()) {
            if !self.is_subtype(*arg_ty, formal.declared_type) {
                self.report(line, "argument does not conform to formal type");
                ok = false;
            }
        }
        ok
    }
}
