//! Interned identifiers.
//!
//! Cool identifiers (class names, feature names, formal names, variable
//! names) are compared constantly during analysis — every lookup in the
//! class registry, method table, and attribute environment hashes or
//! equates a name. Interning them once up front turns every later
//! comparison into a pointer-equal `u32` comparison instead of a string
//! compare.
//!
//! Analysis is single-threaded and sequential (no concurrent compilation,
//! no incremental re-analysis — see spec §5), so unlike a production
//! compiler's sharded, lock-free interner this one is a plain
//! `FxHashMap`-backed table owned by the analyzer for the duration of a run.

use rustc_hash::FxHashMap;

/// An interned identifier.
///
/// Two symbols are equal if and only if they were interned from the same
/// text. Comparison is a single `u32` compare regardless of string length.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Symbol(u32);

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Interns identifier text into [`Symbol`] handles.
pub struct Interner {
    map: FxHashMap<Box<str>, Symbol>,
    strings: Vec<Box<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            map: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    /// Intern `text`, returning a stable handle comparable by identity.
    ///
    /// Interning the same text twice returns the same [`Symbol`].
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.map.get(text) {
            return sym;
        }
        let Ok(index) = u32::try_from(self.strings.len()) else {
            unreachable!("interner overflowed u32 symbol space");
        };
        let sym = Symbol(index);
        let boxed: Box<str> = text.into();
        self.strings.push(boxed.clone());
        self.map.insert(boxed, sym);
        sym
    }

    /// Resolve a symbol back to its text.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

/// Identifiers Cool's static semantics treat specially.
///
/// Interned once up front so every phase of the analyzer shares the same
/// handles for the built-in class names, the pseudo-types, and the
/// predefined feature names, instead of re-interning string literals.
#[derive(Clone, Copy)]
pub struct WellKnown {
    pub object: Symbol,
    pub io: Symbol,
    pub int: Symbol,
    pub string: Symbol,
    pub bool_: Symbol,

    pub self_type: Symbol,
    pub no_class: Symbol,
    pub no_type: Symbol,
    pub self_: Symbol,
    pub main_class: Symbol,
    pub main_method: Symbol,

    pub abort: Symbol,
    pub type_name: Symbol,
    pub copy: Symbol,
    pub out_string: Symbol,
    pub out_int: Symbol,
    pub in_string: Symbol,
    pub in_int: Symbol,
    pub length: Symbol,
    pub concat: Symbol,
    pub substr: Symbol,

    pub arg: Symbol,
    pub arg2: Symbol,
    pub val_slot: Symbol,
    pub str_field: Symbol,
    pub prim_slot: Symbol,

    /// Synthetic filename used for diagnostics that would otherwise locate
    /// to a built-in class's (nonexistent) source file.
    pub basic_class_filename: Symbol,
}

impl WellKnown {
    pub fn install(interner: &mut Interner) -> Self {
        WellKnown {
            object: interner.intern("Object"),
            io: interner.intern("IO"),
            int: interner.intern("Int"),
            string: interner.intern("String"),
            bool_: interner.intern("Bool"),

            self_type: interner.intern("SELF_TYPE"),
            no_class: interner.intern("_no_class"),
            no_type: interner.intern("_no_type"),
            self_: interner.intern("self"),
            main_class: interner.intern("Main"),
            main_method: interner.intern("main"),

            abort: interner.intern("abort"),
            type_name: interner.intern("type_name"),
            copy: interner.intern("copy"),
            out_string: interner.intern("out_string"),
            out_int: interner.intern("out_int"),
            in_string: interner.intern("in_string"),
            in_int: interner.intern("in_int"),
            length: interner.intern("length"),
            concat: interner.intern("concat"),
            substr: interner.intern("substr"),

            arg: interner.intern("arg"),
            arg2: interner.intern("arg2"),
            val_slot: interner.intern("_val"),
            str_field: interner.intern("_str_field"),
            prim_slot: interner.intern("_prim_slot"),

            basic_class_filename: interner.intern("<basic class>"),
        }
    }

    /// Is `sym` one of the three primitive classes (`Int`, `Bool`, `String`)?
    pub fn is_primitive(&self, sym: Symbol) -> bool {
        sym == self.int || sym == self.bool_ || sym == self.string
    }

    /// Is `sym` one of the five built-in classes?
    pub fn is_basic(&self, sym: Symbol) -> bool {
        sym == self.object || sym == self.io || self.is_primitive(sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_returns_same_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern("Foo");
        let b = interner.intern("Foo");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_different_text_returns_different_symbols() {
        let mut interner = Interner::new();
        let a = interner.intern("Foo");
        let b = interner.intern("Bar");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips_text() {
        let mut interner = Interner::new();
        let sym = interner.intern("Widget");
        assert_eq!(interner.resolve(sym), "Widget");
    }

    #[test]
    fn well_known_primitive_classification() {
        let mut interner = Interner::new();
        let wk = WellKnown::install(&mut interner);
        assert!(wk.is_primitive(wk.int));
        assert!(wk.is_primitive(wk.bool_));
        assert!(wk.is_primitive(wk.string));
        assert!(!wk.is_primitive(wk.object));
        assert!(wk.is_basic(wk.io));
        assert!(!wk.is_basic(wk.self_type));
    }
}
