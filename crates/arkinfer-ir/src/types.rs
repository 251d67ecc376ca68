//! The type lattice.
//!
//! [`Type`] is a closed sum over every type shape the IR can carry. Whether a
//! type still needs inference is a *property* ([`Type::is_unclear`]), not a
//! variant: a class type bound to the placeholder file, a union with an
//! unclear member, or an array/alias wrapping an unclear type are all unclear.
//!
//! Aliases are shared: every use of `type A = ...` holds the same
//! `Rc<AliasType>`, and resolving the alias's original type once through its
//! `RefCell` is visible at every use site.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use arkinfer_common::limits;
use arkinfer_common::names::builtin;

use crate::signature::{AliasTypeSignature, ClassSignature, MethodSignature, NamespaceSignature};

// =============================================================================
// Type
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Unknown,
    UnclearReference(UnclearReferenceType),
    Boolean,
    Number,
    String,
    Null,
    Undefined,
    Any,
    Void,
    Never,
    Array(ArrayType),
    Class(ClassType),
    Function(FunctionType),
    Union(UnionType),
    Alias(Rc<AliasType>),
    Generic(GenericType),
    Annotation(AnnotationNamespaceType),
}

/// A type referenced by a name the IR builder could not bind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnclearReferenceType {
    /// Possibly dotted, possibly with an inline generic suffix (`ns.Foo<T>`).
    pub name: String,
    pub generic_types: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayType {
    pub base: Box<Type>,
    pub dimension: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub signature: ClassSignature,
    pub real_generic_types: Option<Vec<Type>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub signature: Box<MethodSignature>,
    pub real_generic_types: Option<Vec<Type>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnionType {
    pub types: Vec<Type>,
    /// The member selected by the most recent assignment, if any.
    pub current: Option<Box<Type>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericType {
    pub name: String,
    /// Position in the declaring class's or method's generic list.
    pub index: usize,
    pub default: Option<Box<Type>>,
    pub constraint: Option<Box<Type>>,
}

impl GenericType {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            default: None,
            constraint: None,
        }
    }

    pub fn with_default(mut self, ty: Type) -> Self {
        self.default = Some(Box::new(ty));
        self
    }

    pub fn with_constraint(mut self, ty: Type) -> Self {
        self.constraint = Some(Box::new(ty));
        self
    }
}

/// A namespace (or whole module) used in type position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnnotationNamespaceType {
    pub origin_name: String,
    pub namespace: NamespaceSignature,
}

impl AnnotationNamespaceType {
    /// Returns `true` while the namespace has not been bound to a declaration.
    pub fn is_unbound(&self) -> bool {
        self.namespace.file.is_unknown()
    }
}

// =============================================================================
// AliasType
// =============================================================================

/// `type Name<T> = Original`.
///
/// Equality and hashing use the alias identity (name, signature, real
/// generic arguments), never the original type, so self-referential aliases
/// compare in constant time.
#[derive(Debug)]
pub struct AliasType {
    pub name: String,
    pub signature: AliasTypeSignature,
    pub generic_types: Vec<GenericType>,
    pub real_generic_types: Option<Vec<Type>>,
    original: RefCell<Type>,
}

impl AliasType {
    pub fn new(name: impl Into<String>, original: Type, signature: AliasTypeSignature) -> Self {
        Self {
            name: name.into(),
            signature,
            generic_types: Vec::new(),
            real_generic_types: None,
            original: RefCell::new(original),
        }
    }

    pub fn with_generics(mut self, generics: Vec<GenericType>) -> Self {
        self.generic_types = generics;
        self
    }

    pub fn original_type(&self) -> Ref<'_, Type> {
        self.original.borrow()
    }

    pub fn set_original_type(&self, ty: Type) {
        *self.original.borrow_mut() = ty;
    }
}

impl PartialEq for AliasType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.signature == other.signature
            && self.real_generic_types == other.real_generic_types
    }
}

impl Eq for AliasType {}

impl Hash for AliasType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.signature.hash(state);
    }
}

// =============================================================================
// Constructors
// =============================================================================

impl Type {
    pub fn unclear(name: impl Into<String>) -> Self {
        Self::UnclearReference(UnclearReferenceType {
            name: name.into(),
            generic_types: Vec::new(),
        })
    }

    pub fn class(signature: ClassSignature) -> Self {
        Self::Class(ClassType {
            signature,
            real_generic_types: None,
        })
    }

    pub fn class_with_generics(signature: ClassSignature, real: Vec<Type>) -> Self {
        Self::Class(ClassType {
            signature,
            real_generic_types: if real.is_empty() { None } else { Some(real) },
        })
    }

    pub fn function(signature: MethodSignature) -> Self {
        Self::Function(FunctionType {
            signature: Box::new(signature),
            real_generic_types: None,
        })
    }

    pub fn array(base: Type, dimension: u32) -> Self {
        Self::Array(ArrayType {
            base: Box::new(base),
            dimension: dimension.max(1),
        })
    }

    pub fn generic(name: impl Into<String>, index: usize) -> Self {
        Self::Generic(GenericType::new(name, index))
    }

    pub fn namespace(signature: NamespaceSignature) -> Self {
        Self::Annotation(AnnotationNamespaceType {
            origin_name: signature.qualified_name(),
            namespace: signature,
        })
    }

    /// Builds a union from `members`, flattening nested unions and dropping
    /// duplicates. A single remaining member is returned as is.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        let mut types: Vec<Type> = Vec::new();
        for member in members {
            for flat in member.flat_types() {
                if !types.contains(&flat) {
                    types.push(flat);
                }
            }
        }
        match types.len() {
            0 => Self::Unknown,
            1 => types.remove(0),
            _ => Self::Union(UnionType {
                types,
                current: None,
            }),
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

impl Type {
    /// Returns `true` when the type still needs inference.
    ///
    /// Unknown, unclear references, `null` and `undefined` are unclear; so is
    /// a class type bound to the placeholder file, an array or alias whose
    /// wrapped type is unclear, and a union with an unclear member other
    /// than `null`/`undefined`.
    pub fn is_unclear(&self) -> bool {
        self.is_unclear_at(0)
    }

    fn is_unclear_at(&self, depth: u32) -> bool {
        // Alias cycles bottom out as settled.
        if depth > limits::MAX_ALIAS_CHAIN_DEPTH {
            return false;
        }
        match self {
            Self::Unknown | Self::UnclearReference(_) | Self::Null | Self::Undefined => true,
            Self::Class(class) => class.signature.file.is_unknown(),
            Self::Union(union) => union
                .types
                .iter()
                .any(|t| !t.is_nullish() && t.is_unclear_at(depth + 1)),
            Self::Array(array) => array.base.is_unclear_at(depth + 1),
            Self::Alias(alias) => alias.original_type().is_unclear_at(depth + 1),
            Self::Boolean
            | Self::Number
            | Self::String
            | Self::Any
            | Self::Void
            | Self::Never
            | Self::Function(_)
            | Self::Generic(_)
            | Self::Annotation(_) => false,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Union members with nested unions flattened; any other type yields
    /// itself.
    pub fn flat_types(&self) -> Vec<Type> {
        match self {
            Self::Union(union) => union.types.iter().flat_map(Type::flat_types).collect(),
            other => vec![other.clone()],
        }
    }

    /// Follows alias originals until a non-alias type is reached.
    pub fn unwrap_alias(&self) -> Type {
        let mut current = self.clone();
        for _ in 0..limits::MAX_ALIAS_CHAIN_DEPTH {
            let Self::Alias(alias) = &current else {
                return current;
            };
            let next = alias.original_type().clone();
            current = next;
        }
        current
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn class_signature(&self) -> Option<&ClassSignature> {
        self.as_class().map(|c| &c.signature)
    }

    pub fn is_same_variant(&self, other: &Type) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// `Promise<T>` from the built-in dummy project or the SDK.
    pub fn promise_argument(&self) -> Option<&Type> {
        let class = self.as_class()?;
        if class.signature.name != builtin::PROMISE {
            return None;
        }
        class.real_generic_types.as_ref()?.first()
    }
}

// =============================================================================
// Display
// =============================================================================

fn write_generics(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    f.write_str("<")?;
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    f.write_str(">")
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::UnclearReference(r) => {
                f.write_str(&r.name)?;
                if !r.generic_types.is_empty() {
                    write_generics(f, &r.generic_types)?;
                }
                Ok(())
            }
            Self::Boolean => f.write_str("boolean"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Null => f.write_str("null"),
            Self::Undefined => f.write_str("undefined"),
            Self::Any => f.write_str("any"),
            Self::Void => f.write_str("void"),
            Self::Never => f.write_str("never"),
            Self::Array(array) => {
                if matches!(*array.base, Self::Union(_)) {
                    write!(f, "({})", array.base)?;
                } else {
                    write!(f, "{}", array.base)?;
                }
                for _ in 0..array.dimension {
                    f.write_str("[]")?;
                }
                Ok(())
            }
            Self::Class(class) => {
                write!(f, "{}", class.signature)?;
                if let Some(real) = &class.real_generic_types {
                    write_generics(f, real)?;
                }
                Ok(())
            }
            Self::Function(func) => {
                write!(f, "{}", func.signature)?;
                if let Some(real) = &func.real_generic_types {
                    write_generics(f, real)?;
                }
                Ok(())
            }
            Self::Union(union) => {
                for (i, ty) in union.types.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{ty}")?;
                }
                Ok(())
            }
            Self::Alias(alias) => {
                f.write_str(&alias.name)?;
                if let Some(real) = &alias.real_generic_types {
                    write_generics(f, real)?;
                }
                Ok(())
            }
            Self::Generic(generic) => f.write_str(&generic.name),
            Self::Annotation(annotation) => f.write_str(&annotation.origin_name),
        }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
