//! Whole-scene inference driver.

use serde::Serialize;
use tracing::{Level, debug, info, span};

use arkinfer_common::{Diagnostic, limits};
use arkinfer_ir::model::{FileId, Scene};

use crate::options::InferenceOptions;
use crate::sdk::merge_sdk_globals;
use crate::state::InferenceState;

/// Outcome of [`infer_scene`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneInferenceReport {
    /// Passes run over the scene.
    pub passes: u32,
    /// Whether the last pass inferred nothing new.
    pub converged: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl SceneInferenceReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Merges SDK globals, then infers every file until a pass changes nothing
/// or `options.max_passes` is reached. SDK files are inferred before user
/// files within each pass.
pub fn infer_scene(scene: &mut Scene, options: &InferenceOptions) -> SceneInferenceReport {
    let _span = span!(Level::INFO, "infer_scene").entered();

    let mut diagnostics = merge_sdk_globals(scene, options);

    let scene: &Scene = scene;
    let (sdk_files, user_files): (Vec<FileId>, Vec<FileId>) = scene
        .file_ids()
        .partition(|&id| scene.file(id).is_some_and(|f| f.is_sdk));
    let max_passes = options.max_passes.clamp(1, limits::MAX_SCENE_PASSES);

    let mut state = InferenceState::new(scene, options.clone());
    let mut passes = 0;
    let mut converged = false;
    while passes < max_passes {
        passes += 1;
        let _pass = span!(Level::DEBUG, "pass", index = passes).entered();
        for &file in sdk_files.iter().chain(&user_files) {
            state.infer_file(file);
        }
        if !state.take_changed() {
            converged = true;
            break;
        }
        debug!(pass = passes, "pass inferred new types");
    }
    diagnostics.extend(state.take_diagnostics());

    info!(
        passes,
        converged,
        files = sdk_files.len() + user_files.len(),
        diagnostics = diagnostics.len(),
        "scene inference finished"
    );
    SceneInferenceReport {
        passes,
        converged,
        diagnostics,
    }
}
