//! Inference state shared by every inference operation.
//!
//! `InferenceState` holds a shared borrow of the [`Scene`]; inferred data is
//! written through the interior-mutability cells of the scene's entities.
//! The state itself only carries options, collected diagnostics and the
//! "something changed" flag the driver uses to detect convergence.

use rustc_hash::FxHashSet;
use tracing::warn;

use arkinfer_common::diagnostics::{DiagnosticMessage, diagnostic_messages};
use arkinfer_common::Diagnostic;
use arkinfer_ir::model::{ClassId, LocalId, MethodId, Scene};
use arkinfer_ir::Type;

use crate::options::InferenceOptions;

/// The class (and method, if any) a name is resolved from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Scope {
    pub class: ClassId,
    pub method: Option<MethodId>,
}

impl Scope {
    pub fn class(class: ClassId) -> Self {
        Self { class, method: None }
    }

    pub fn method(scene: &Scene, method: MethodId) -> Option<Self> {
        let class = scene.method(method)?.declaring_class;
        Some(Self {
            class,
            method: Some(method),
        })
    }
}

pub struct InferenceState<'a> {
    pub scene: &'a Scene,
    pub options: InferenceOptions,
    diagnostics: Vec<Diagnostic>,
    /// (code, file, message) of every reported diagnostic; later passes
    /// revisit the same statements.
    reported: FxHashSet<(u32, String, String)>,
    changed: bool,
    /// Classes whose super class or interfaces are being resolved. Heritage
    /// names can be qualified through a class of the same cycle
    /// (`class A extends B.Inner`, `class B extends A.Inner`).
    pub(crate) resolving_heritage: FxHashSet<ClassId>,
    /// Position of the statement being processed.
    pub(crate) current_position: Option<(u32, u32)>,
}

impl<'a> InferenceState<'a> {
    pub fn new(scene: &'a Scene, options: InferenceOptions) -> Self {
        Self {
            scene,
            options,
            diagnostics: Vec::new(),
            reported: FxHashSet::default(),
            changed: false,
            resolving_heritage: FxHashSet::default(),
            current_position: None,
        }
    }

    pub fn with_defaults(scene: &'a Scene) -> Self {
        Self::new(scene, InferenceOptions::default())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Returns whether anything was inferred since the last call, and resets
    /// the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }

    // =========================================================================
    // Monotonic writers
    // =========================================================================

    /// Sets the type of a local unless that would make it less resolved.
    /// Returns whether the local improved.
    pub(crate) fn update_local_type(&mut self, id: LocalId, ty: Type) -> bool {
        let Some(local) = self.scene.local(id) else {
            return false;
        };
        let current = local.ty().clone();
        if current == ty || (ty.is_unclear() && !current.is_unclear()) {
            return false;
        }
        // Narrowing follows the last assignment seen; it is not an
        // improvement and must not keep the driver running.
        if let (Type::Union(old), Type::Union(new)) = (&current, &ty)
            && old.types == new.types
        {
            local.set_type(ty);
            return false;
        }
        local.set_type(ty);
        self.mark_changed();
        true
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn report(&mut self, scope: Scope, message: &DiagnosticMessage, args: &[&str]) {
        let file = self
            .scene
            .file_of_class(scope.class)
            .map(|f| f.name().to_string())
            .unwrap_or_default();
        let mut diagnostic = Diagnostic::from_message(file.clone(), message, args);
        if let Some((line, column)) = self.current_position {
            diagnostic = diagnostic.with_position(line, column);
        }
        let key = (diagnostic.code, file, diagnostic.message_text.clone());
        if !self.reported.insert(key) {
            return;
        }
        warn!(
            code = diagnostic.code,
            file = %diagnostic.file,
            message = %diagnostic.message_text,
            "inference diagnostic"
        );
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn report_recursion_limit(&mut self, scope: Scope, subject: &str) {
        self.report(scope, &diagnostic_messages::RECURSION_LIMIT_REACHED, &[subject]);
    }
}
