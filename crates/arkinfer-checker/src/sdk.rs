//! Global declaration merge for SDK projects.
//!
//! Files of an SDK project that are global declaration sources contribute
//! their top-level classes, functions, variables, aliases and namespaces to
//! the scene's global table. Same-named declarations are merged rather than
//! replaced: a class and an interface of the same name share one method
//! table, and overloads of a function declared across files are collected
//! on one method.
//!
//! The merge mutates the scene and must finish before any file is inferred.

use tracing::{Level, debug, info, span};

use arkinfer_common::{Diagnostic, names};
use arkinfer_ir::model::{ClassCategory, ClassId, ExportTarget, FileId, MethodId, Scene};
use arkinfer_ir::Type;

use crate::options::InferenceOptions;
use crate::state::InferenceState;

/// Builds the global table from every global SDK declaration file.
///
/// Returns the diagnostics raised while inferring the top-level statements
/// of those files.
pub fn merge_sdk_globals(scene: &mut Scene, options: &InferenceOptions) -> Vec<Diagnostic> {
    let _span = span!(Level::INFO, "merge_sdk_globals").entered();

    let files = global_files(scene, options);
    if files.is_empty() {
        return Vec::new();
    }

    for &file in &files {
        let classes: Vec<ClassId> = scene
            .file(file)
            .map(|f| f.class_ids().collect())
            .unwrap_or_default();
        for class in classes {
            load_class(scene, class);
        }
    }

    // Top-level variables need their types before they are bound.
    let diagnostics = {
        let mut state = InferenceState::new(&*scene, options.clone());
        for &file in &files {
            let default_method = scene
                .file(file)
                .and_then(|f| scene.class(f.default_class))
                .and_then(|c| c.default_method());
            if let Some(method) = default_method {
                state.infer_type_in_method(method);
            }
        }
        state.take_diagnostics()
    };

    for &file in &files {
        bind_top_level(scene, file);
    }

    info!(
        files = files.len(),
        globals = scene.sdk_globals().count(),
        "sdk globals merged"
    );
    diagnostics
}

/// SDK files that declare globals, in project and load order.
fn global_files(scene: &Scene, options: &InferenceOptions) -> Vec<FileId> {
    scene
        .project_sdk_map()
        .values()
        .flatten()
        .copied()
        .filter(|&id| {
            scene
                .file(id)
                .is_some_and(|f| options.is_global_sdk_file(f.name()))
        })
        .collect()
}

// =============================================================================
// Classes
// =============================================================================

fn load_class(scene: &mut Scene, class: ClassId) {
    let Some(ark_class) = scene.class(class) else {
        return;
    };
    if ark_class.is_default() {
        return;
    }
    let name = ark_class.name().to_string();

    let existing = match scene.get_sdk_global(&name) {
        Some(ExportTarget::Class(existing)) if *existing != class => Some(*existing),
        Some(ExportTarget::Class(_)) => return,
        _ => None,
    };
    let Some(existing) = existing else {
        scene.set_sdk_global(name, ExportTarget::Class(class));
        return;
    };

    let existing_is_class = scene
        .class(existing)
        .is_some_and(|c| c.category == ClassCategory::Class);
    if existing_is_class {
        merge_class_methods(scene, class, existing);
    } else {
        merge_class_methods(scene, existing, class);
        scene.set_sdk_global(name.clone(), ExportTarget::Class(class));
    }
    debug!(class = %name, "global class declarations merged");
}

/// Moves the methods of `from` into `into`. A method `into` already has
/// under the same name gains the overloads of the other declaration.
fn merge_class_methods(scene: &mut Scene, from: ClassId, into: ClassId) {
    let (Some(from_class), Some(into_class)) = (scene.class(from), scene.class(into)) else {
        return;
    };

    let mut attach = Vec::new();
    for method in from_class.method_ids() {
        let Some(ark_method) = scene.method(method) else {
            continue;
        };
        let same_name = if ark_method.is_static() {
            into_class.static_method(&ark_method.name)
        } else {
            into_class.method(&ark_method.name)
        };
        match same_name {
            Some(target) if target != method => merge_overloads(scene, method, target),
            Some(_) => {}
            None => attach.push(method),
        }
    }

    for method in attach {
        scene.attach_method(into, method);
    }
}

/// Appends the signatures of `from` that `into` does not declare yet.
fn merge_overloads(scene: &Scene, from: MethodId, into: MethodId) {
    let (Some(from), Some(into)) = (scene.method(from), scene.method(into)) else {
        return;
    };
    let known = into.signatures();
    let added: Vec<_> = from
        .signatures()
        .into_iter()
        .filter(|sig| !known.iter().any(|k| k.sub == sig.sub))
        .collect();
    if !added.is_empty() {
        into.extend_declare_signatures(added);
    }
}

// =============================================================================
// Top-level bindings
// =============================================================================

fn bind_top_level(scene: &mut Scene, file: FileId) {
    let Some(ark_file) = scene.file(file) else {
        return;
    };
    let default_class = ark_file.default_class;
    let namespaces: Vec<_> = ark_file
        .namespace_ids()
        .filter_map(|ns| Some((scene.namespace(ns)?.name().to_string(), ns)))
        .collect();

    bind_functions(scene, default_class);
    bind_locals(scene, default_class);

    for (name, ns) in namespaces {
        if scene.get_sdk_global(&name).is_none() {
            scene.set_sdk_global(name, ExportTarget::Namespace(ns));
        }
    }
}

fn bind_functions(scene: &mut Scene, default_class: ClassId) {
    let Some(class) = scene.class(default_class) else {
        return;
    };
    let functions: Vec<(String, MethodId)> = class
        .method_ids()
        .filter_map(|m| scene.method(m))
        .filter(|m| !m.is_default())
        .map(|m| (m.name.clone(), m.id))
        .collect();

    for (name, method) in functions {
        match scene.get_sdk_global(&name) {
            Some(ExportTarget::Method(existing)) if *existing != method => {
                merge_overloads(scene, method, *existing);
            }
            Some(_) => {}
            None => scene.set_sdk_global(name, ExportTarget::Method(method)),
        }
    }
}

fn bind_locals(scene: &mut Scene, default_class: ClassId) {
    let Some(body) = scene
        .class(default_class)
        .and_then(|c| c.default_method())
        .and_then(|m| scene.method(m))
        .and_then(|m| m.body())
    else {
        return;
    };

    let locals: Vec<_> = body
        .local_ids()
        .filter_map(|id| scene.local(id))
        .filter(|l| !l.is_this() && !l.is_temp() && !l.is_parameter())
        .map(|l| (l.name.clone(), l.id, l.ty().clone()))
        .collect();
    let aliases: Vec<_> = body
        .alias_types()
        .map(|alias| (alias.name.clone(), alias.clone()))
        .collect();

    for (name, local, ty) in locals {
        if let Some(attribute) = attribute_class_for(scene, &ty) {
            if let Some(interface) = ty.class_signature().and_then(|sig| scene.class_id(sig)) {
                merge_class_methods(scene, interface, attribute);
            }
            debug!(component = %name, "component interface merged into attribute class");
            scene.set_sdk_global(name, ExportTarget::Class(attribute));
            continue;
        }
        if scene.get_sdk_global(&name).is_none() {
            scene.set_sdk_global(name, ExportTarget::Local(local));
        }
    }

    for (name, alias) in aliases {
        if scene.get_sdk_global(&name).is_none() {
            scene.set_sdk_global(name, ExportTarget::Alias(alias));
        }
    }
}

/// For a variable typed `XInterface`, the global class `XAttribute`.
fn attribute_class_for(scene: &Scene, ty: &Type) -> Option<ClassId> {
    let signature = ty.class_signature()?;
    let component = signature.name.strip_suffix(names::INTERFACE_SUFFIX)?;
    match scene.get_sdk_global(&format!("{component}{}", names::ATTRIBUTE_SUFFIX))? {
        ExportTarget::Class(class) => Some(*class),
        _ => None,
    }
}
