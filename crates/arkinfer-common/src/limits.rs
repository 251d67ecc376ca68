//! Centralized limits and thresholds for the inference engine.
//!
//! The engine operates on partially-typed IR where cycles are legal input
//! (`class A extends B`, `class B extends A`; a type alias referring to
//! itself through a union; two modules re-exporting each other). Every
//! recursive walk over such structures is bounded by one of these limits.
//! Hitting a limit is never fatal: the walk reports a diagnostic and the
//! node stays unresolved.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting of generic arguments inside a single unclear reference
/// name.
///
/// # ArkTS example
///
/// ```typescript
/// let m: Map<string, Map<string, Array<Promise<Foo>>>>;
/// ```
pub const MAX_NAME_RESOLUTION_DEPTH: u32 = 32;

/// Maximum length of an alias chain that is followed before giving up.
///
/// # ArkTS example
///
/// ```typescript
/// type A = B;
/// type B = C;
/// type C = A | number; // cyclic through a union
/// ```
pub const MAX_ALIAS_CHAIN_DEPTH: u32 = 32;

/// Maximum number of `export { X } from "..."` hops followed while
/// resolving an import.
pub const MAX_REEXPORT_CHAIN_DEPTH: u32 = 16;

/// Maximum depth of the super class / implemented interface walk during
/// member lookup.
pub const MAX_HERITAGE_DEPTH: u32 = 32;

/// Maximum depth for generic type instantiation.
///
/// Generic substitution walks nested class, function, union and array
/// types; a self-referential alias can make this walk unbounded.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum nesting of anonymous object literals merged against declared
/// classes.
///
/// # ArkTS example
///
/// ```typescript
/// Column({ space: 5, border: { width: 1, radius: { topLeft: 2 } } })
/// ```
pub const MAX_ANONYMOUS_MERGE_DEPTH: u32 = 64;

// =============================================================================
// Pass Limits
// =============================================================================

/// Upper bound on whole-scene inference passes regardless of configuration.
///
/// Inference only ever moves types from unclear to resolved, so a scene
/// converges after at most as many passes as it has dependency levels.
pub const MAX_SCENE_PASSES: u32 = 16;
