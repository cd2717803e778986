use crate::{Universe, Value};

fn show(recipe: &str) -> String {
    let mut u = Universe::new();
    let ty = u.parse(recipe).unwrap();
    u.display(ty)
}

#[test]
fn atoms() {
    insta::assert_snapshot!(show("@"), @"dynamic");
    insta::assert_snapshot!(show("~"), @"void");
    insta::assert_snapshot!(show("0&"), @"Never");
    insta::assert_snapshot!(show("1&"), @"any");
    insta::assert_snapshot!(show("#"), @"erased");
}

#[test]
fn wrappers() {
    insta::assert_snapshot!(show("int*"), @"int");
    insta::assert_snapshot!(show("int?"), @"int?");
    insta::assert_snapshot!(show("int/"), @"FutureOr<int>");
    insta::assert_snapshot!(show("List<int?>"), @"List<int?>");
    insta::assert_snapshot!(show("Map<String,List<int>>"), @"Map<String, List<int>>");
}

#[test]
fn functions() {
    insta::assert_snapshot!(show("~(int,[String])"), @"(int, [String]) => void");
    insta::assert_snapshot!(show("~([String])"), @"([String]) => void");
    insta::assert_snapshot!(show("~(int,{flag!bool})"), @"(int, {required bool flag}) => void");
    insta::assert_snapshot!(show("int({a:num,b!String})"), @"({num a, required String b}) => int");
    insta::assert_snapshot!(show("@(int)?"), @"((int) => dynamic)?");
}

#[test]
fn generic_functions() {
    insta::assert_snapshot!(show("0^(0^)<num>"), @"<T1 extends num>(T1) => T1");
    insta::assert_snapshot!(show("1^(0^,1^)<num,@>"), @"<T1 extends num, T2>(T1, T2) => T2");
    insta::assert_snapshot!(show("1^(0^)<@>()<@>"), @"<T1>() => <T2>(T2) => T1");
}

#[test]
fn records() {
    insta::assert_snapshot!(show("+(int,String)"), @"(int, String)");
    insta::assert_snapshot!(show("+a,b(int,String)"), @"({int a, String b})");
    insta::assert_snapshot!(show("+b(int,String)"), @"(int, {String b})");
}

#[test]
fn bindings_are_opaque() {
    insta::assert_snapshot!(show("List<int>;<bool>"), @"?");
}

#[test]
fn unbound_parameter() {
    insta::assert_snapshot!(show("2^"), @"2^");
}

#[test]
fn instantiated_nested_generic() {
    let mut u = Universe::new();
    let generic = u.parse("1^(0^)<@>()<@>").unwrap();
    let int = u.core().int;
    let ty = u.instantiate(generic, &[int]).unwrap();

    insta::assert_snapshot!(u.display(ty), @"() => <T1>(T1) => int");
}

#[test]
fn display_names_replace_minified_names() {
    let mut u = Universe::new();
    u.add_display_names([("Ab", "Widget")]);
    let ty = u.parse("List<Ab>").unwrap();

    insta::assert_snapshot!(u.display(ty), @"List<Widget>");
}

#[test]
fn describe_values() {
    let mut u = Universe::new();
    u.add_rules_json(r#"{ "Dog": { "Animal": [] } }"#).unwrap();
    let dog = u.parse("Dog").unwrap();
    let signature = u.parse("int(num)").unwrap();
    let int = u.core().int;

    insta::assert_snapshot!(u.describe_value(&Value::Null), @"null");
    insta::assert_snapshot!(u.describe_value(&Value::Double(2.0)), @"2.0");
    insta::assert_snapshot!(u.describe_value(&Value::from("hi")), @r#""hi""#);
    insta::assert_snapshot!(
        u.describe_value(&Value::list(int, vec![Value::Int(1), Value::Int(2)])),
        @"[1, 2]"
    );
    insta::assert_snapshot!(u.describe_value(&Value::object(dog)), @"Instance of 'Dog'");
    insta::assert_snapshot!(u.describe_value(&Value::closure(signature, "half")), @"Closure 'half'");
    insta::assert_snapshot!(
        u.describe_value(&Value::record("b", vec![Value::Int(1), Value::from("x")])),
        @r#"(1, b: "x")"#
    );
}
