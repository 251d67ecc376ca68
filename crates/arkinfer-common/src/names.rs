//! Reserved names assigned by the IR builder to synthetic entities.
//!
//! The IR lowering pass names compiler-generated classes, methods and locals
//! with a `%` prefix so they can never collide with user identifiers. The
//! inference engine recognizes these names to tell, for example, an object
//! literal's anonymous class apart from a declared one.

// =============================================================================
// Unknown / default entities
// =============================================================================

/// Project name of the synthetic "unknown" file signature.
pub const UNKNOWN_PROJECT_NAME: &str = "%unk";

/// File name of the synthetic "unknown" file signature.
///
/// A class signature living in this file is a placeholder produced by the
/// IR builder when a type name could not be bound yet.
pub const UNKNOWN_FILE_NAME: &str = "%unk";

/// Class name used by placeholder method/field signatures whose owner is
/// not known yet.
pub const UNKNOWN_CLASS_NAME: &str = "%unk";

/// Name of the synthetic class that holds the top-level code of a file or
/// namespace.
pub const DEFAULT_ARK_CLASS_NAME: &str = "%dflt";

/// Name of the synthetic method that holds the top-level statements of a
/// file or namespace.
pub const DEFAULT_ARK_METHOD_NAME: &str = "%dflt";

/// Synthetic method running instance field initializers.
pub const INSTANCE_INIT_METHOD_NAME: &str = "%instInit";

/// Synthetic method running static field initializers.
pub const STATIC_INIT_METHOD_NAME: &str = "%statInit";

// =============================================================================
// Prefixes
// =============================================================================

/// Prefix of classes synthesized for object literals.
pub const ANONYMOUS_CLASS_PREFIX: &str = "%AC";

/// Prefix of methods synthesized for arrow functions and function expressions.
pub const ANONYMOUS_METHOD_PREFIX: &str = "%AM";

/// Prefix of the leading parameters that carry a closure's lexical
/// environment.
pub const LEXICAL_ENV_NAME_PREFIX: &str = "%closures";

/// Prefix of temporaries introduced by three-address lowering.
pub const TEMP_LOCAL_PREFIX: &str = "%";

/// Separator between a synthetic name and the name of its enclosing entity
/// (`%AM0$outer`).
pub const NAME_DELIMITER: &str = "$";

// =============================================================================
// Keywords and well-known member names
// =============================================================================

pub const THIS_NAME: &str = "this";
pub const SUPER_NAME: &str = "super";
pub const CONSTRUCTOR_NAME: &str = "constructor";

/// Method name under which an interface's call signature is recorded.
pub const CALL_SIGNATURE_NAME: &str = "create";

/// Method name of a dynamic `import(...)` call.
pub const IMPORT_CALL_NAME: &str = "import";

pub const ARRAY_LENGTH_NAME: &str = "length";
pub const DEFAULT_EXPORT_NAME: &str = "default";

/// Clause name of a namespace import (`import * as ns from "m"`).
pub const NAMESPACE_IMPORT_NAME: &str = "*";

/// Suffix of the builder-function interface in SDK component declarations.
pub const INTERFACE_SUFFIX: &str = "Interface";

/// Suffix of the fluent attribute class in SDK component declarations.
pub const ATTRIBUTE_SUFFIX: &str = "Attribute";

// =============================================================================
// Built-in library shapes
// =============================================================================

/// Names of the built-in library classes the engine models without a real
/// generics engine.
pub mod builtin {
    /// Project name of the dummy project holding built-in declarations.
    pub const DUMMY_PROJECT_NAME: &str = "ES2015";
    pub const DUMMY_FILE_NAME: &str = "BuiltinClass";
    pub const ITERATOR: &str = "Iterator";
    pub const ITERATOR_RESULT: &str = "IteratorResult";
    pub const ITERATOR_NEXT: &str = "next";
    pub const ITERATOR_RESULT_VALUE: &str = "value";
    pub const ARRAY: &str = "Array";
    pub const PROMISE: &str = "Promise";
}

/// Returns `true` for compiler-generated temporaries (`%0`, `%1`, ...).
pub fn is_temp_local_name(name: &str) -> bool {
    name.starts_with(TEMP_LOCAL_PREFIX)
}

/// Returns `true` for classes synthesized from object literals.
pub fn is_anonymous_class_name(name: &str) -> bool {
    name.starts_with(ANONYMOUS_CLASS_PREFIX)
}

/// Returns `true` for methods synthesized from arrow functions.
pub fn is_anonymous_method_name(name: &str) -> bool {
    name.starts_with(ANONYMOUS_METHOD_PREFIX)
}

#[cfg(test)]
#[path = "../tests/names_tests.rs"]
mod tests;
