use crate::Interner;

#[test]
fn intern_deduplicates() {
    let mut interner = Interner::new();

    let a = interner.intern("List");
    let b = interner.intern("List");
    let c = interner.intern("Map");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.len(), 2);
}

#[test]
fn resolve_roundtrip() {
    let mut interner = Interner::new();

    let sym = interner.intern("Future");
    assert_eq!(interner.resolve(sym), "Future");
}

#[test]
fn get_does_not_intern() {
    let mut interner = Interner::new();
    assert_eq!(interner.get("int"), None);
    assert!(interner.is_empty());

    let sym = interner.intern("int");
    assert_eq!(interner.get("int"), Some(sym));
    assert_eq!(interner.len(), 1);
}

#[test]
fn symbol_ordering_is_insertion_order() {
    let mut interner = Interner::new();

    let z = interner.intern("z");
    let a = interner.intern("a");

    // z was inserted first, so z < a by insertion order
    assert!(z < a);
    assert_eq!(z.as_u32(), 0);
}

#[test]
fn iter_yields_all_names() {
    let mut interner = Interner::new();
    let a = interner.intern("alpha");
    let b = interner.intern("beta");

    let items: Vec<_> = interner.iter().collect();
    assert_eq!(items, vec![(a, "alpha"), (b, "beta")]);
}
