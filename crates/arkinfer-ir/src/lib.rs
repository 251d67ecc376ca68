//! IR data model for the arkinfer type inference engine.
//!
//! - `signature`: qualified identities of files, namespaces, classes, fields,
//!   methods and locals
//! - `types`: the closed type lattice and the "unclear" predicate
//! - `instantiate`: generic substitution
//! - `model`: the whole-program [`Scene`](model::Scene), its entities, the
//!   statement IR and import/export resolution

pub mod signature;
pub use signature::{
    AliasTypeSignature, BaseSignature, ClassSignature, FieldSignature, FileSignature,
    LocalSignature, MethodParameter, MethodSignature, MethodSubSignature, NamespaceSignature,
};

pub mod types;
pub use types::{
    AliasType, AnnotationNamespaceType, ArrayType, ClassType, FunctionType, GenericType, Type,
    UnclearReferenceType, UnionType,
};

pub mod instantiate;
pub use instantiate::{replace_class_generics, replace_signature_generics, replace_type_with_real};

pub mod model;
