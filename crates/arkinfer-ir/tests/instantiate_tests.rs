use super::*;
use crate::signature::{AliasTypeSignature, ClassSignature, FileSignature, MethodSubSignature};

fn list_sig() -> ClassSignature {
    ClassSignature::new("List", FileSignature::new("app", "list.ets"), None)
}

#[test]
fn test_class_generic_round_trip() {
    let ty = Type::class_with_generics(list_sig(), vec![Type::generic("T", 0)]);
    let real = [Type::Number];
    let once = replace_type_with_real(&ty, Some(&real));
    assert_eq!(once, Type::class_with_generics(list_sig(), vec![Type::Number]));

    let twice = replace_type_with_real(&once, Some(&real));
    assert_eq!(twice, once);
}

#[test]
fn test_class_without_own_arguments_adopts_real() {
    let ty = Type::class(list_sig());
    let replaced = replace_type_with_real(&ty, Some(&[Type::String]));
    assert_eq!(replaced, Type::class_with_generics(list_sig(), vec![Type::String]));
}

#[test]
fn test_generic_falls_back_to_default_then_constraint() {
    let with_default = Type::Generic(GenericType::new("T", 3).with_default(Type::String));
    assert_eq!(replace_type_with_real(&with_default, Some(&[Type::Number])), Type::String);

    let with_constraint = Type::Generic(GenericType::new("T", 1).with_constraint(Type::Boolean));
    assert_eq!(replace_type_with_real(&with_constraint, None), Type::Boolean);

    let bare = Type::generic("T", 5);
    assert_eq!(replace_type_with_real(&bare, Some(&[Type::Number])), bare);
}

#[test]
fn test_any_takes_first_argument() {
    assert_eq!(replace_type_with_real(&Type::Any, Some(&[Type::Number])), Type::Number);
    assert_eq!(replace_type_with_real(&Type::Any, None), Type::Any);
}

#[test]
fn test_union_and_array_substitute_members() {
    let ty = Type::union([Type::generic("T", 0), Type::Null]);
    assert_eq!(
        replace_type_with_real(&ty, Some(&[Type::String])),
        Type::union([Type::String, Type::Null])
    );

    let arr = Type::array(Type::generic("T", 0), 1);
    assert_eq!(
        replace_type_with_real(&arr, Some(&[Type::Number])),
        Type::array(Type::Number, 1)
    );
}

#[test]
fn test_alias_original_is_updated_in_place() {
    let alias = Rc::new(AliasType::new(
        "Box",
        Type::generic("T", 0),
        AliasTypeSignature {
            name: "Box".to_string(),
            declaring_method: MethodSignature::unknown("%dflt"),
        },
    ));
    let outer = Rc::new(AliasType::new(
        "Outer",
        Type::Alias(Rc::clone(&alias)),
        alias.signature.clone(),
    ));
    let _ = replace_type_with_real(&Type::Alias(outer), Some(&[Type::Number]));
    assert_eq!(*alias.original_type(), Type::Number);
}

#[test]
fn test_replace_class_generics_by_name() {
    let generics = [GenericType::new("K", 0), GenericType::new("V", 1)];
    let sig = MethodSignature::new(
        ClassSignature::new("Map", FileSignature::new("sdk", "map.d.ts"), None),
        MethodSubSignature::new(
            "get",
            vec![MethodParameter::new("key", Type::generic("K", 0))],
            Type::union([Type::generic("V", 1), Type::Undefined]),
        ),
    );
    let replaced = replace_signature_generics(&sig, &generics, &[Type::String, Type::Number]);
    assert_eq!(replaced.sub.parameters[0].ty, Type::String);
    assert_eq!(replaced.sub.return_type, Type::union([Type::Number, Type::Undefined]));
}

#[test]
fn test_replace_class_generics_detaches_alias() {
    let alias = Rc::new(AliasType::new(
        "Item",
        Type::generic("T", 0),
        AliasTypeSignature {
            name: "Item".to_string(),
            declaring_method: MethodSignature::unknown("%dflt"),
        },
    ));
    let replaced = replace_class_generics(&Type::Alias(Rc::clone(&alias)), &[GenericType::new("T", 0)], &[Type::String]);
    assert_eq!(*alias.original_type(), Type::generic("T", 0));
    assert_eq!(replaced.unwrap_alias(), Type::String);
}
