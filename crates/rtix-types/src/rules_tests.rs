use indoc::indoc;

use crate::{InterfaceRule, RuleEntry, RulesError, TypeRules, Universe, Variance};

#[test]
fn merge_reads_redirects_supertypes_and_variables() {
    let mut rules = TypeRules::default();
    let count = rules
        .merge_json(indoc! {r#"
            {
              "JSArray": "List",
              "List": { "Iterable": ["1"], "Object": [], "List.E": "1" }
            }
        "#})
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        rules.get("JSArray"),
        Some(&RuleEntry::Redirect("List".to_string()))
    );
    assert_eq!(
        rules.resolve("JSArray"),
        Some(
            &InterfaceRule::default()
                .supertype("Iterable", &["1"])
                .supertype("Object", &[])
                .type_variable("List.E", "1")
        )
    );
    assert_eq!(rules.type_variable("JSArray", "List.E"), Some("1"));
    assert_eq!(rules.type_variable("JSArray", "List.X"), None);
}

#[test]
fn implements_follows_redirects() {
    let mut rules = TypeRules::default();
    rules
        .merge_json(r#"{ "A": "B", "B": { "C": [] } }"#)
        .unwrap();

    assert!(rules.implements("A", "C"));
    assert!(rules.implements("A", "B"));
    assert!(rules.implements("A", "A"));
    assert!(!rules.implements("A", "D"));
    assert!(!rules.implements("Z", "C"));
}

#[test]
fn redirect_cycles_terminate() {
    let mut rules = TypeRules::default();
    rules.merge_json(r#"{ "A": "B", "B": "A" }"#).unwrap();

    assert_eq!(rules.resolve("A"), None);
    assert!(!rules.implements("A", "C"));
}

#[test]
fn later_tables_replace_entries() {
    let mut u = Universe::new();
    u.add_rules_json(r#"{ "A": { "B": [] } }"#).unwrap();
    u.add_rules_json(r#"{ "A": { "C": [] } }"#).unwrap();

    assert!(u.rules().implements("A", "C"));
    assert!(!u.rules().implements("A", "B"));
}

#[test]
fn builtin_rules() {
    let u = Universe::new();
    assert!(u.rules().implements("int", "num"));
    assert!(u.rules().implements("List", "Iterable"));
    assert_eq!(u.rules().type_variable("Future", "Future.T"), Some("1"));
}

#[test]
fn invalid_json() {
    let mut u = Universe::new();
    let err = u.add_rules_json("{ nope").unwrap_err();
    assert!(matches!(err, RulesError::Json(_)));

    let err = u.add_rules_json(r#"{ "A": 3 }"#).unwrap_err();
    assert!(matches!(err, RulesError::Json(_)));
}

#[test]
fn variances_from_json() {
    let mut u = Universe::new();
    u.add_variances_json(r#"{ "Pair": [1, 2], "Cell": [3] }"#)
        .unwrap();

    assert_eq!(
        u.variances("Pair"),
        Some(&[Variance::Covariant, Variance::Contravariant][..])
    );
    assert_eq!(u.variances("Cell"), Some(&[Variance::Invariant][..]));
    assert_eq!(u.variances("List"), None);
}

#[test]
fn unknown_variance_code() {
    let mut u = Universe::new();
    let err = u.add_variances_json(r#"{ "Pair": [1, 7] }"#).unwrap_err();

    insta::assert_snapshot!(err.to_string(), @r#"unknown variance code 7 for "Pair""#);
}

#[test]
fn erased_types() {
    let mut u = Universe::new();
    let count = u.add_erased_types_json(r#"{ "Map": 2 }"#).unwrap();
    assert_eq!(count, 1);

    let map = u.find_erased_type("Map").unwrap();
    assert_eq!(u.recipe(map), "Map<#,#>");

    let set = u.find_erased_type("Set").unwrap();
    assert_eq!(u.recipe(set), "Set");

    u.add_erased_type("Box", 1);
    let boxed = u.find_erased_type("Box").unwrap();
    assert_eq!(u.recipe(boxed), "Box<#>");
}

#[test]
fn new_rules_replace_evaluated_type_variables() {
    let mut u = Universe::new();
    u.add_rules_json(r#"{"Pair": {"Pair.A": "1"}}"#).unwrap();
    let pair = u.parse("Pair<int,String>").unwrap();
    let first = u.eval_in_env(pair, "Pair.A").unwrap();
    assert_eq!(u.display(first), "int");

    u.add_rules_json(r#"{"Pair": {"Pair.A": "2"}}"#).unwrap();
    let second = u.eval_in_env(pair, "Pair.A").unwrap();
    assert_eq!(u.display(second), "String");
}
