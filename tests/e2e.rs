// Test code uses unwrap/expect for clarity - panics give readable failure messages.
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end analyzer scenarios, hand-building ASTs the way a parser would
//! hand them to `analyze` — there is no lexer/parser in this crate, so every
//! test constructs its `Vec<Class>` directly with `cool_semant::ast::build`.

use cool_semant::ast::build;
use cool_semant::symbol::{Interner, WellKnown};

fn setup() -> (Interner, WellKnown) {
    let mut interner = Interner::new();
    let wk = WellKnown::install(&mut interner);
    (interner, wk)
}

#[test]
fn minimal_valid_program() {
    let (mut interner, wk) = setup();
    let file = interner.intern("main.cl");

    let main_class = build::class(
        wk.main_class,
        wk.object,
        vec![build::method(wk.main_method, vec![], wk.object, build::int(0))],
        file,
    );

    let diags = cool_semant::analyze(vec![main_class], &wk, &interner);
    assert_eq!(diags.error_count(), 0, "{:?}", diags.errors());
}

#[test]
fn missing_main_emits_exactly_one_diagnostic_with_no_locus() {
    let (mut interner, wk) = setup();
    let file = interner.intern("foo.cl");
    let foo = interner.intern("Foo");
    let foo_class = build::class(foo, wk.object, vec![], file);

    let diags = cool_semant::analyze(vec![foo_class], &wk, &interner);
    assert_eq!(diags.error_count(), 1);
    assert!(diags.errors()[0].locus.is_none());
    assert_eq!(diags.errors()[0].message, "Class Main is not defined.");
}

#[test]
fn inheritance_cycle_is_reported() {
    let (mut interner, wk) = setup();
    let file = interner.intern("cycle.cl");
    let a = interner.intern("A");
    let b = interner.intern("B");

    let a_class = build::class(a, b, vec![], file);
    let b_class = build::class(b, a, vec![], file);
    let main_class = build::class(
        wk.main_class,
        wk.object,
        vec![build::method(wk.main_method, vec![], wk.object, build::int(0))],
        file,
    );

    let diags = cool_semant::analyze(vec![a_class, b_class, main_class], &wk, &interner);
    assert!(diags.has_errors());
    assert!(diags
        .errors()
        .iter()
        .any(|d| d.message.contains("cycle in class hierarchy")));
}

#[test]
fn override_arity_mismatch_is_reported() {
    let (mut interner, wk) = setup();
    let file = interner.intern("override.cl");
    let p = interner.intern("P");
    let c = interner.intern("C");
    let m = interner.intern("m");
    let x = interner.intern("x");
    let y = interner.intern("y");

    let p_class = build::class(
        p,
        wk.object,
        vec![build::method(m, vec![build::formal(x, wk.int)], wk.int, build::int(0))],
        file,
    );
    let c_class = build::class(
        c,
        p,
        vec![build::method(
            m,
            vec![build::formal(x, wk.int), build::formal(y, wk.int)],
            wk.int,
            build::int(0),
        )],
        file,
    );
    let main_class = build::class(
        wk.main_class,
        wk.object,
        vec![build::method(wk.main_method, vec![], wk.object, build::int(0))],
        file,
    );

    let diags = cool_semant::analyze(vec![p_class, c_class, main_class], &wk, &interner);
    let hits: Vec<_> = diags
        .errors()
        .iter()
        .filter(|d| d.message.contains("inheritance (number)"))
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].locus.as_ref().unwrap().0, "override.cl");
}

#[test]
fn self_type_return_succeeds() {
    let (mut interner, wk) = setup();
    let file = interner.intern("selftype.cl");
    let c = interner.intern("C");
    let me = interner.intern("me");

    let c_class = build::class(
        c,
        wk.object,
        vec![build::method(me, vec![], wk.self_type, build::self_expr(wk.self_))],
        file,
    );
    let main_class = build::class(
        wk.main_class,
        wk.object,
        vec![build::method(wk.main_method, vec![], wk.object, build::int(0))],
        file,
    );

    let diags = cool_semant::analyze(vec![c_class, main_class], &wk, &interner);
    assert_eq!(diags.error_count(), 0, "{:?}", diags.errors());
}

#[test]
fn case_branches_type_to_their_least_common_ancestor() {
    let (mut interner, wk) = setup();
    let file = interner.intern("case.cl");
    let base = interner.intern("Base");
    let a = interner.intern("A");
    let b = interner.intern("B");
    let main = interner.intern("Main");
    let x = interner.intern("x");
    let y = interner.intern("y");
    let m = interner.intern("pick");

    let base_class = build::class(base, wk.object, vec![], file);
    let a_class = build::class(a, base, vec![], file);
    let b_class = build::class(b, base, vec![], file);

    let case_expr = cool_semant::ast::Expr::new(
        0,
        cool_semant::ast::ExprKind::Case {
            scrutinee: Box::new(build::int(0)),
            branches: vec![
                build::branch(x, a, build::new_(a)),
                build::branch(y, b, build::new_(b)),
            ],
        },
    );

    let main_class = build::class(
        main,
        wk.object,
        vec![build::method(m, vec![], base, case_expr)],
        file,
    );

    let diags = cool_semant::analyze(vec![base_class, a_class, b_class, main_class], &wk, &interner);
    assert_eq!(diags.error_count(), 0, "{:?}", diags.errors());
}

#[test]
fn undeclared_identifier_is_reported() {
    let (mut interner, wk) = setup();
    let file = interner.intern("undeclared.cl");
    let m = interner.intern("m");

    let main_class = build::class(
        wk.main_class,
        wk.object,
        vec![build::method(m, vec![], wk.object, build::id(interner.intern("nope")))],
        file,
    );

    let diags = cool_semant::analyze(vec![main_class], &wk, &interner);
    assert!(diags.errors().iter().any(|d| d.message.contains("undeclared identifier")));
}

#[test]
fn static_dispatch_on_self_type_is_rejected() {
    let (mut interner, wk) = setup();
    let file = interner.intern("static.cl");
    let c = interner.intern("C");
    let m = interner.intern("m");

    let dispatch = cool_semant::ast::Expr::new(
        0,
        cool_semant::ast::ExprKind::StaticDispatch {
            receiver: Box::new(build::self_expr(wk.self_)),
            target_type: wk.self_type,
            method: m,
            args: vec![],
        },
    );

    let c_class = build::class(
        c,
        wk.object,
        vec![build::method(m, vec![], wk.object, build::int(0))],
        file,
    );
    let main_class = build::class(
        wk.main_class,
        wk.object,
        vec![build::method(wk.main_method, vec![], wk.object, dispatch)],
        file,
    );

    let diags = cool_semant::analyze(vec![c_class, main_class], &wk, &interner);
    assert!(diags
        .errors()
        .iter()
        .any(|d| d.message.contains("static dispatch on SELF_TYPE")));
}

#[test]
fn diagnostics_from_two_classes_come_out_in_source_order() {
    let (mut interner, wk) = setup();
    let file = interner.intern("order.cl");
    let ghost = interner.intern("Ghost");
    let zeta = interner.intern("Zeta");
    let alpha = interner.intern("Alpha");

    // `Zeta` and `Alpha` are registered in this order and both inherit
    // undeclared classes; their diagnostics must come out Zeta-then-Alpha,
    // matching source order, not interned-symbol or FxHashMap bucket order
    // (picking names where the hasher buckets them the other way around is
    // exactly the regression this guards against).
    let mut zeta_class = build::class(zeta, ghost, vec![], file);
    zeta_class.line = 10;
    let mut alpha_class = build::class(alpha, ghost, vec![], file);
    alpha_class.line = 20;
    let main_class = build::class(
        wk.main_class,
        wk.object,
        vec![build::method(wk.main_method, vec![], wk.object, build::int(0))],
        file,
    );

    let diags = cool_semant::analyze(vec![zeta_class, alpha_class, main_class], &wk, &interner);
    let hits: Vec<_> = diags
        .errors()
        .iter()
        .filter(|d| d.message.contains("inherits undeclared class"))
        .collect();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].locus.as_ref().unwrap().1, 10);
    assert_eq!(hits[1].locus.as_ref().unwrap().1, 20);
}

#[test]
fn inheriting_from_a_primitive_is_rejected_wherever_it_appears_in_the_chain() {
    let (mut interner, wk) = setup();
    let file = interner.intern("prim.cl");
    let mid = interner.intern("Mid");
    let leaf = interner.intern("Leaf");

    let mid_class = build::class(mid, wk.int, vec![], file);
    let leaf_class = build::class(leaf, mid, vec![], file);
    let main_class = build::class(
        wk.main_class,
        wk.object,
        vec![build::method(wk.main_method, vec![], wk.object, build::int(0))],
        file,
    );

    let diags = cool_semant::analyze(vec![mid_class, leaf_class, main_class], &wk, &interner);
    assert!(diags
        .errors()
        .iter()
        .any(|d| d.message.contains("inherits from a basic class")));
}
