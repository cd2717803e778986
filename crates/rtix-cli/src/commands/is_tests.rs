use super::CliError;
use super::is::{IsArgs, render};
use super::universe_loader::UniverseOptions;

fn args(recipe: &str, value: &str) -> IsArgs {
    IsArgs {
        recipe: recipe.to_string(),
        value: value.to_string(),
        universe: UniverseOptions::default(),
        json: false,
        color: false,
    }
}

#[test]
fn primitives() {
    insta::assert_snapshot!(render(&args("int", "3")).unwrap(), @"3 is int  true");
    insta::assert_snapshot!(render(&args("int", "2.0")).unwrap(), @"2.0 is int  true");
    insta::assert_snapshot!(render(&args("String?", "null")).unwrap(), @"null is String?  true");
}

#[test]
fn failure_shows_cast_error() {
    let out = render(&args("String", "3")).unwrap();
    insta::assert_snapshot!(out, @r"
    3 is String  false
    3: type 'int' is not a subtype of type 'String'
    ");
}

#[test]
fn arrays_are_dynamic_lists() {
    insta::assert_snapshot!(render(&args("List<@>", "[1, 2]")).unwrap(), @"[1, 2] is List<dynamic>  true");
    insta::assert_snapshot!(render(&args("List<int>", "[1, 2]")).unwrap(), @r"
    [1, 2] is List<int>  false
    [1, 2]: type 'List<dynamic>' is not a subtype of type 'List<int>'
    ");
}

#[test]
fn objects_are_records() {
    let out = render(&args("+a,b(int,String)", r#"{"a": 1, "b": "x"}"#)).unwrap();
    insta::assert_snapshot!(out, @r#"(a: 1, b: "x") is ({int a, String b})  true"#);
}

#[test]
fn json_report() {
    let mut args = args("num", r#""one""#);
    args.json = true;

    let out = render(&args).unwrap();
    insta::assert_snapshot!(out, @r#"
    {
      "value": "\"one\"",
      "runtime_type": "String",
      "expected": "num",
      "is": false,
      "error": "\"one\": type 'String' is not a subtype of type 'num'"
    }
    "#);
}

#[test]
fn json_report_omits_error_on_success() {
    let mut args = args("bool", "true");
    args.json = true;

    let out = render(&args).unwrap();
    assert!(!out.contains("error"));
    assert!(out.contains(r#""is": true"#));
}

#[test]
fn invalid_value() {
    let err = render(&args("int", "[1,")).unwrap_err();
    assert!(matches!(err, CliError::Value(_)));
}
