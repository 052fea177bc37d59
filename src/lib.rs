//! Semantic analysis for the Cool language.
//!
//! Validates a parsed program's class hierarchy, collects each class's
//! feature environment, and type-checks every expression, writing the
//! inferred type into each expression's type slot. Lexing, parsing, and
//! code generation are out of scope — this crate consumes a [`ast::Class`]
//! list and an already-populated [`symbol::Interner`].
//!
//! # Module organization
//!
//! - `symbol`: identifier interning
//! - `ast`: the parsed-program representation
//! - `diagnostic`: the error-reporting sink
//! - `registry`: built-in installation and class registration
//! - `inherit`: inheritance validation and `ancestors`/`is_subtype`/`lca`
//! - `methods`: method collection and override compatibility
//! - `env`: the attribute/variable scope stack
//! - `infer`: the expression type checker
//! - `stack`: recursion-safe stack growth for the checker

pub mod ast;
pub mod diagnostic;
pub mod env;
pub mod infer;
pub mod inherit;
pub mod methods;
pub mod registry;
mod stack;
pub mod symbol;

use ast::Feature;
use diagnostic::Diagnostics;
use env::Env;
use infer::Checker;
use methods::MethodTables;
use registry::ClassRegistry;
use symbol::{Interner, Symbol, WellKnown};

/// Runs the five analysis phases over `classes` in order, aborting after any
/// phase that produced a diagnostic, exactly as the driver's exit policy
/// requires: register, validate inheritance, collect methods, check
/// overrides, then type-check every feature body. Returns the accumulated
/// diagnostics.
pub fn analyze(classes: Vec<ast::Class>, wk: &WellKnown, interner: &Interner) -> Diagnostics {
    let mut diags = Diagnostics::new();

    tracing::debug!(classes = classes.len(), "starting semantic analysis");

    let mut registry = ClassRegistry::with_builtins(wk);
    registry.register_user_classes(classes, wk, interner, &mut diags);
    if diags.has_errors() {
        return diags;
    }

    tracing::debug!("checking inheritance graph");
    inherit::validate(&registry, wk, interner, &mut diags);
    if diags.has_errors() {
        return diags;
    }

    tracing::debug!("collecting method tables");
    let tables = MethodTables::collect(&registry, interner, &mut diags);
    if diags.has_errors() {
        return diags;
    }

    tracing::debug!("checking method overrides");
    methods::check_overrides(&registry, wk, interner, &tables, &mut diags);
    if diags.has_errors() {
        return diags;
    }

    tracing::debug!("type-checking class bodies");
    for &class_name in registry.user_class_names() {
        check_class(&registry, wk, interner, &tables, class_name, &mut diags);
    }

    diags
}

/// Binds `C`'s full attribute environment (one scope per ancestor,
/// root-first, per spec), then type-checks every feature declared directly
/// in `C`. Every scope entered here is exited before returning, on every
/// path, including the early `continue`s inside the feature loop.
fn check_class(
    registry: &ClassRegistry,
    wk: &WellKnown,
    interner: &Interner,
    tables: &MethodTables,
    class_name: Symbol,
    diags: &mut Diagnostics,
) {
    let Some(class) = registry.get(class_name) else {
        unreachable!("check_class called with an unregistered class");
    };
    let class_filename = interner.resolve(class.filename).to_string();

    let mut env = Env::new();
    let ancestry = inherit::ancestors(registry, wk, class_name);
    for ancestor in &ancestry {
        env.enter();
        let Some(ancestor_class) = registry.get(*ancestor) else {
            continue;
        };
        let ancestor_filename = interner.resolve(ancestor_class.filename).to_string();
        for feature in &ancestor_class.features {
            if let Feature::Attribute(attr) = feature {
                if Env::reject_self(wk, attr.name, &ancestor_filename, attr.line, "attribute named self", diags) {
                    continue;
                }
                if !env.bind_if_fresh(attr.name, attr.declared_type) {
                    diags.report_at(ancestor_filename.clone(), attr.line, "duplicate attribute");
                }
            }
        }
    }

    let mut features = class.features.clone();

    for feature in &mut features {
        match feature {
            Feature::Method(m) => {
                env.with_scope(|env| {
                    env.bind_self(wk);

                    let mut seen_formals: Vec<Symbol> = Vec::new();
                    for formal in &m.formals {
                        if Env::reject_self(wk, formal.name, &class_filename, m.line, "formal named self", diags) {
                            continue;
                        }
                        if seen_formals.contains(&formal.name) {
                            diags.report_at(class_filename.clone(), m.line, "duplicate formal name");
                            continue;
                        }
                        if !registry.contains(formal.declared_type) {
                            diags.report_at(class_filename.clone(), m.line, "unknown formal type");
                        }
                        seen_formals.push(formal.name);
                        env.bind(formal.name, formal.declared_type);
                    }

                    let body_ty = {
                        let mut checker = Checker {
                            registry,
                            wk,
                            interner,
                            tables,
                            env,
                            diags,
                            ctx: class_name,
                            filename: class_filename.clone(),
                        };
                        checker.check(&mut m.body)
                    };

                    check_return_conformance(registry, wk, diags, &class_filename, m.line, m.return_type, body_ty, class_name);
                });
            }
            Feature::Attribute(a) => {
                if a.declared_type == wk.self_type {
                    diags.report_at(class_filename.clone(), a.line, "SELF_TYPE in attribute declaration");
                }

                env.with_scope(|env| {
                    env.bind_self(wk);
                    let init_ty = {
                        let mut checker = Checker {
                            registry,
                            wk,
                            interner,
                            tables,
                            env,
                            diags,
                            ctx: class_name,
                            filename: class_filename.clone(),
                        };
                        checker.check(&mut a.init)
                    };
                    if init_ty != wk.no_type
                        && !inherit::is_subtype(registry, wk, init_ty, a.declared_type, class_name)
                    {
                        diags.report_at(class_filename.clone(), a.line, "initializer not conforming to declared type");
                    }
                });
            }
        }
    }

    for _ in &ancestry {
        env.exit();
    }
}

#[allow(clippy::too_many_arguments)]
fn check_return_conformance(
    registry: &ClassRegistry,
    wk: &WellKnown,
    diags: &mut Diagnostics,
    filename: &str,
    line: u32,
    return_type: Symbol,
    body_ty: Symbol,
    ctx: Symbol,
) {
    if return_type != wk.self_type && !registry.contains(return_type) {
        diags.report_at(filename.to_string(), line, "unknown return type");
        return;
    }
    let return_ty_for_check = if return_type == wk.self_type { ctx } else { return_type };
    let conforms = if return_type == wk.self_type {
        body_ty == wk.self_type
    } else {
        inherit::is_subtype(registry, wk, body_ty, return_ty_for_check, ctx)
    };
    if !conforms {
        diags.report_at(filename.to_string(), line, "method body does not conform to return type");
    }
}
