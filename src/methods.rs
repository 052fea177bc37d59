//! Method collection and override compatibility checking.
//!
//! Grounded on `semant.cc`'s `insert_methods`/`check_method_inheritance`,
//! restructured as two explicit passes the way the teacher's
//! `checker::signatures` separates "collect a table" from "check it against
//! context" instead of interleaving both in one recursive walk.

use rustc_hash::FxHashMap;

use crate::ast::{Feature, Method};
use crate::diagnostic::Diagnostics;
use crate::inherit;
use crate::registry::ClassRegistry;
use crate::symbol::{Interner, Symbol, WellKnown};

/// Per-class method tables, indexed by class name then method name.
pub struct MethodTables {
    tables: FxHashMap<Symbol, FxHashMap<Symbol, Method>>,
}

impl MethodTables {
    /// Collect every class's methods into its own scope. A method name
    /// repeated within one class emits "duplicate method"; attributes are
    /// ignored.
    pub fn collect(
        registry: &ClassRegistry,
        interner: &Interner,
        diags: &mut Diagnostics,
    ) -> Self {
        let mut tables: FxHashMap<Symbol, FxHashMap<Symbol, Method>> = FxHashMap::default();

        for class in registry.iter_in_order() {
            let filename = interner.resolve(class.filename).to_string();
            let mut table: FxHashMap<Symbol, Method> = FxHashMap::default();

            for feature in &class.features {
                if let Feature::Method(m) = feature {
                    if table.contains_key(&m.name) {
                        diags.report_at(filename.clone(), m.line, "duplicate method");
                        continue;
                    }
                    table.insert(m.name, m.clone());
                }
            }

            tracing::debug!(
                class = interner.resolve(class.name),
                methods = table.len(),
                "collected method table"
            );
            tables.insert(class.name, table);
        }

        MethodTables { tables }
    }

    /// Look up method `name` declared directly in `class` (no inheritance walk).
    pub fn lookup_local(&self, class: Symbol, name: Symbol) -> Option<&Method> {
        self.tables.get(&class)?.get(&name)
    }

    /// Look up method `name` starting at `class` and walking ancestors from
    /// the leaf up: the nearest-declaring ancestor wins, matching dynamic
    /// dispatch's override rule.
    pub fn resolve(
        &self,
        registry: &ClassRegistry,
        wk: &WellKnown,
        class: Symbol,
        name: Symbol,
    ) -> Option<&Method> {
        for ancestor in inherit::ancestors(registry, wk, class).into_iter().rev() {
            if let Some(m) = self.lookup_local(ancestor, name) {
                return Some(m);
            }
        }
        None
    }
}

/// For every class `C` and every method `m` it declares, walk `ancestors(C)`
/// excluding `C` itself (nearest ancestor first) and compare against the
/// first ancestor that also declares `m`: arity must match, and each
/// formal's declared type must be identity-equal to the ancestor's.
pub fn check_overrides(
    registry: &ClassRegistry,
    wk: &WellKnown,
    interner: &Interner,
    tables: &MethodTables,
    diags: &mut Diagnostics,
) {
    for class in registry.iter_in_order() {
        let filename = interner.resolve(class.filename).to_string();
        let Some(own) = tables.tables.get(&class.name) else {
            continue;
        };

        let mut ancestors_excl_self = inherit::ancestors(registry, wk, class.name);
        ancestors_excl_self.pop();

        for method in own.values() {
            let Some(parent_method) = ancestors_excl_self
                .iter()
                .rev()
                .find_map(|a| tables.lookup_local(*a, method.name))
            else {
                continue;
            };

            if method.formals.len() != parent_method.formals.len() {
                diags.report_at(filename.clone(), method.line, "inheritance (number)");
                continue;
            }

            for (child_formal, parent_formal) in method.formals.iter().zip(parent_method.formals.iter())
            {
                if child_formal.declared_type != parent_formal.declared_type {
                    diags.report_at(filename.clone(), method.line, "inheritance (sequence)");
                }
            }
        }
    }
}
