//! Type inference over the arkinfer IR.
//!
//! This crate is organized around [`InferenceState`], whose methods are split
//! across several modules:
//! - `type_inference` - unclear-type inference and name resolution
//! - `method_inference` - propagation through method bodies, fields and
//!   return types
//! - `invoke` - call target resolution
//! - `args` - argument/parameter cross inference
//! - `field_ref` - field reference resolution
//! - `anonymous` - structural typing of object literals against SDK classes
//!
//! `sdk` merges split global declarations before inference starts and
//! `driver` runs whole-scene passes until nothing changes.

pub mod options;
pub mod state;

mod anonymous;
mod args;
mod field_ref;
mod invoke;
mod method_inference;
mod type_inference;

pub mod driver;
pub mod sdk;

pub use driver::{SceneInferenceReport, infer_scene};
pub use options::InferenceOptions;
pub use sdk::merge_sdk_globals;
pub use state::{InferenceState, Scope};
