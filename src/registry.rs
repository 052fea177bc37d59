//! Class registry: installs the five built-in classes, indexes user classes
//! by name, and rejects duplicates and reserved-name collisions.
//!
//! Grounded on the teacher's `registry::TypeRegistry` (a name-indexed table
//! of user-defined type entries) and on `checker::type_registration`'s
//! "register every declaration from the module, in order" loop, specialized
//! to Cool's five-built-in-class, single-inheritance world — and, for the
//! built-in class bodies themselves, on `ClassTable::install_basic_classes`
//! in the original `semant.cc`.

use rustc_hash::FxHashMap;

use crate::ast::{build, Class};
use crate::diagnostic::Diagnostics;
use crate::symbol::{Symbol, WellKnown};

/// Name-indexed table of every class known to the analyzer: the five
/// built-ins plus every successfully registered user class.
pub struct ClassRegistry {
    classes: FxHashMap<Symbol, Class>,
    /// The five built-ins, in installation order.
    builtin_order: Vec<Symbol>,
    /// Successfully registered user class names, in source order — every
    /// later phase drives its diagnostics off this list rather than off
    /// `classes`'s hash-bucket order, so diagnostics come out in source
    /// order as spec'd.
    user_order: Vec<Symbol>,
}

impl ClassRegistry {
    /// Build a registry containing only the five built-in classes.
    pub fn with_builtins(wk: &WellKnown) -> Self {
        let mut registry = ClassRegistry {
            classes: FxHashMap::default(),
            builtin_order: Vec::new(),
            user_order: Vec::new(),
        };
        registry.install_builtins(wk);
        registry
    }

    fn install_builtins(&mut self, wk: &WellKnown) {
        let filename = wk.basic_class_filename;

        let object_class = build::class(
            wk.object,
            wk.no_class,
            vec![
                build::method(wk.abort, vec![], wk.object, Expr_no_expr()),
                build::method(wk.type_name, vec![], wk.string, Expr_no_expr()),
                build::method(wk.copy, vec![], wk.self_type, Expr_no_expr()),
            ],
            filename,
        );

        let io_class = build::class(
            wk.io,
            wk.object,
            vec![
                build::method(
                    wk.out_string,
                    vec![build::formal(wk.arg, wk.string)],
                    wk.self_type,
                    Expr_no_expr(),
                ),
                build::method(
                    wk.out_int,
                    vec![build::formal(wk.arg, wk.int)],
                    wk.self_type,
                    Expr_no_expr(),
                ),
                build::method(wk.in_string, vec![], wk.string, Expr_no_expr()),
                build::method(wk.in_int, vec![], wk.int, Expr_no_expr()),
            ],
            filename,
        );

        let int_class = build::class(
            wk.int,
            wk.object,
            vec![build::attr(wk.val_slot, wk.prim_slot, Expr_no_expr())],
            filename,
        );

        let bool_class = build::class(
            wk.bool_,
            wk.object,
            vec![build::attr(wk.val_slot, wk.prim_slot, Expr_no_expr())],
            filename,
        );

        let string_class = build::class(
            wk.string,
            wk.object,
            vec![
                build::attr(wk.val_slot, wk.int, Expr_no_expr()),
                build::attr(wk.str_field, wk.prim_slot, Expr_no_expr()),
                build::method(wk.length, vec![], wk.int, Expr_no_expr()),
                build::method(
                    wk.concat,
                    vec![build::formal(wk.arg, wk.string)],
                    wk.string,
                    Expr_no_expr(),
                ),
                build::method(
                    wk.substr,
                    vec![
                        build::formal(wk.arg, wk.int),
                        build::formal(wk.arg2, wk.int),
                    ],
                    wk.string,
                    Expr_no_expr(),
                ),
            ],
            filename,
        );

        for class in [object_class, io_class, int_class, bool_class, string_class] {
            self.builtin_order.push(class.name);
            self.classes.insert(class.name, class);
        }
    }

    /// Register every user class in source order.
    ///
    /// A class named `SELF_TYPE`, or whose name collides with a built-in,
    /// reports "conflict with basic class"; a name collision with another
    /// user class reports "class redefinition". After the loop, a missing
    /// `Main` class reports with no source locus.
    pub fn register_user_classes(
        &mut self,
        classes: Vec<Class>,
        wk: &WellKnown,
        interner: &crate::symbol::Interner,
        diags: &mut Diagnostics,
    ) {
        for class in classes {
            if class.name == wk.self_type {
                diags.report_at(
                    interner.resolve(class.filename),
                    class.line,
                    "conflict with basic class",
                );
                continue;
            }

            if let Some(existing) = self.classes.get(&class.name) {
                let is_basic = wk.is_basic(class.name) && existing.filename == wk.basic_class_filename;
                let message = if is_basic {
                    "conflict with basic class"
                } else {
                    "class redefinition"
                };
                diags.report_at(interner.resolve(class.filename), class.line, message);
                continue;
            }

            self.user_order.push(class.name);
            self.classes.insert(class.name, class);
        }

        if !self.classes.contains_key(&wk.main_class) {
            diags.report("Class Main is not defined.");
        }
    }

    pub fn get(&self, name: Symbol) -> Option<&Class> {
        self.classes.get(&name)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.classes.contains_key(&name)
    }

    /// Every successfully registered user class name, in source order.
    pub fn user_class_names(&self) -> &[Symbol] {
        &self.user_order
    }

    /// Every class — the five built-ins in installation order, then every
    /// user class in source-registration order. Phases drive their
    /// diagnostics off this so output order is deterministic and matches
    /// source order rather than hash-bucket order.
    pub fn iter_in_order(&self) -> impl Iterator<Item = &Class> {
        self.builtin_order
            .iter()
            .chain(self.user_order.iter())
            .map(move |name| match self.classes.get(name) {
                Some(class) => class,
                None => unreachable!("registered name missing from class table"),
            })
    }
}

#[allow(non_snake_case)]
fn Expr_no_expr() -> crate::ast::Expr {
    crate::ast::Expr::no_expr(0)
}
