use super::*;
use crate::signature::{AliasTypeSignature, ClassSignature, FileSignature, MethodSignature};

fn known_class(name: &str) -> Type {
    Type::class(ClassSignature::new(name, FileSignature::new("app", "a.ets"), None))
}

fn alias(name: &str, original: Type) -> Rc<AliasType> {
    Rc::new(AliasType::new(
        name,
        original,
        AliasTypeSignature {
            name: name.to_string(),
            declaring_method: MethodSignature::unknown("%dflt"),
        },
    ))
}

#[test]
fn test_primitives_are_clear() {
    for ty in [Type::Boolean, Type::Number, Type::String, Type::Any, Type::Void, Type::Never] {
        assert!(!ty.is_unclear(), "{ty} should be clear");
    }
}

#[test]
fn test_unknown_null_undefined_are_unclear() {
    assert!(Type::Unknown.is_unclear());
    assert!(Type::Null.is_unclear());
    assert!(Type::Undefined.is_unclear());
    assert!(Type::unclear("Foo").is_unclear());
}

#[test]
fn test_class_in_placeholder_file_is_unclear() {
    assert!(Type::class(ClassSignature::unknown("Foo")).is_unclear());
    assert!(!known_class("Foo").is_unclear());
}

#[test]
fn test_union_unclear_only_through_non_nullish_members() {
    let nullable = Type::union([Type::Null, Type::Undefined, known_class("Bar")]);
    assert!(!nullable.is_unclear());

    let pending = Type::union([Type::Number, Type::unclear("Foo")]);
    assert!(pending.is_unclear());
}

#[test]
fn test_array_and_alias_follow_wrapped_type() {
    assert!(Type::array(Type::unclear("Foo"), 1).is_unclear());
    assert!(!Type::array(Type::Number, 2).is_unclear());

    let a = alias("A", Type::unclear("Foo"));
    assert!(Type::Alias(Rc::clone(&a)).is_unclear());
    a.set_original_type(Type::String);
    assert!(!Type::Alias(a).is_unclear());
}

#[test]
fn test_self_referential_alias_terminates() {
    let a = alias("A", Type::Unknown);
    a.set_original_type(Type::Alias(Rc::clone(&a)));
    assert!(!Type::Alias(Rc::clone(&a)).is_unclear());
    // Break the cycle so the Rc can be freed.
    a.set_original_type(Type::Unknown);
}

#[test]
fn test_union_flattens_and_dedups() {
    let inner = Type::union([Type::Number, Type::String]);
    let outer = Type::union([inner, Type::String, Type::Boolean]);
    assert_eq!(outer.flat_types(), vec![Type::Number, Type::String, Type::Boolean]);
}

#[test]
fn test_union_of_one_member_collapses() {
    assert_eq!(Type::union([Type::String, Type::String]), Type::String);
    assert_eq!(Type::union(Vec::new()), Type::Unknown);
}

#[test]
fn test_unwrap_alias_chain() {
    let inner = alias("Inner", Type::Number);
    let outer = alias("Outer", Type::Alias(inner));
    assert_eq!(Type::Alias(outer).unwrap_alias(), Type::Number);
}

#[test]
fn test_promise_argument() {
    let promise = Type::class_with_generics(
        ClassSignature::new("Promise", FileSignature::new("ES2015", "builtin"), None),
        vec![Type::String],
    );
    assert_eq!(promise.promise_argument(), Some(&Type::String));
    assert_eq!(known_class("Foo").promise_argument(), None);
}

#[test]
fn test_display_forms() {
    assert_eq!(Type::union([Type::Number, Type::String]).to_string(), "number|string");
    assert_eq!(Type::array(Type::Number, 2).to_string(), "number[][]");
    assert_eq!(
        Type::array(Type::union([Type::Number, Type::Null]), 1).to_string(),
        "(number|null)[]"
    );
    assert_eq!(known_class("Foo").to_string(), "@app/a.ets: Foo");
}

#[test]
fn test_display_nests_generic_arguments() {
    let boxed = ClassSignature::new("Box", FileSignature::new("app", "a.ets"), None);
    let ty = Type::class_with_generics(boxed, vec![Type::union([Type::String, Type::array(Type::Number, 1)])]);
    assert_eq!(ty.to_string(), "@app/a.ets: Box<string|number[]>");
}
