//! Inheritance validation and inheritance queries.
//!
//! Grounded on `semant.cc`'s `check_inheritance` (parent-chain walk
//! detecting an undeclared parent, a primitive ancestor, or a cycle) and on
//! its `get_inheritance`/`is_inherit_relations`/`lca` trio, reworked into
//! free functions over a [`ClassRegistry`] the way the teacher's
//! `registry::queries` module turns a type table into pure lookups instead
//! of methods with hidden mutable state.

use rustc_hash::FxHashSet;

use crate::diagnostic::Diagnostics;
use crate::registry::ClassRegistry;
use crate::symbol::{Interner, Symbol, WellKnown};

/// Walk every user class's parent chain up to `Object`, rejecting an
/// undeclared parent, a primitive ancestor, or a cycle. Each failure stops
/// that chain's walk; it does not prevent other classes from being checked.
pub fn validate(
    registry: &ClassRegistry,
    wk: &WellKnown,
    interner: &Interner,
    diags: &mut Diagnostics,
) {
    for &name in registry.user_class_names() {
        let Some(class) = registry.get(name) else {
            unreachable!("registered user class name missing from registry");
        };

        let filename = interner.resolve(class.filename).to_string();
        tracing::debug!(class = interner.resolve(class.name), "validating inheritance chain");

        let mut seen: FxHashSet<Symbol> = FxHashSet::default();
        seen.insert(class.name);
        let mut current = class.parent;

        loop {
            if current == wk.object {
                break;
            }

            if registry.get(current).is_none() {
                diags.report_at(
                    filename.clone(),
                    class.line,
                    format!("inherits undeclared class {}", interner.resolve(current)),
                );
                break;
            }

            if wk.is_primitive(current) {
                diags.report_at(filename.clone(), class.line, "inherits from a basic class");
                break;
            }

            if !seen.insert(current) {
                diags.report_at(filename.clone(), class.line, "cycle in class hierarchy");
                break;
            }

            current = registry.get(current).map_or(wk.no_class, |c| c.parent);
        }
    }
}

/// Every ancestor of `class` from `Object` down to `class` inclusive
/// (root-first). `ancestors(Object) == [Object]`: the `[Object]`-not-empty
/// convention chosen in place of the original's empty list.
pub fn ancestors(registry: &ClassRegistry, wk: &WellKnown, class: Symbol) -> Vec<Symbol> {
    let mut chain = vec![class];
    let mut current = class;
    while current != wk.object {
        current = match registry.get(current) {
            Some(c) => c.parent,
            None => break,
        };
        chain.push(current);
    }
    chain.reverse();
    chain
}

/// `child <= parent` under self-context `ctx`.
pub fn is_subtype(
    registry: &ClassRegistry,
    wk: &WellKnown,
    child: Symbol,
    parent: Symbol,
    ctx: Symbol,
) -> bool {
    if child == parent {
        return true;
    }
    if parent == wk.self_type {
        return child == wk.self_type;
    }
    if child == wk.self_type {
        return is_subtype(registry, wk, ctx, parent, ctx);
    }
    ancestors(registry, wk, child).contains(&parent)
}

/// Least common ancestor of `a` and `b` over the tree rooted at `Object`.
/// Callers resolve `SELF_TYPE` against the current class before calling.
pub fn lca(registry: &ClassRegistry, wk: &WellKnown, a: Symbol, b: Symbol) -> Symbol {
    let chain_a = ancestors(registry, wk, a);
    let chain_b = ancestors(registry, wk, b);

    let mut result = wk.object;
    for (x, y) in chain_a.iter().zip(chain_b.iter()) {
        if x == y {
            result = *x;
        } else {
            break;
        }
    }
    result
}
