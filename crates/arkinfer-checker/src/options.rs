//! Inference options.

use serde::{Deserialize, Serialize};

/// Options for a whole-scene inference run.
///
/// Every field has a default, so `{}` is a valid JSON configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceOptions {
    /// Upper bound on whole-scene passes.
    pub max_passes: u32,
    /// Synthesize missing return types from the `return` statements of a body.
    pub infer_return_types_from_body: bool,
    /// Fall back to the source text of a statement to decide whether it
    /// assigns a local declared in an enclosing method.
    pub declaration_text_heuristic: bool,
    /// SDK folders whose files declare globals. Empty means every SDK file.
    pub sdk_global_folders: Vec<String>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            max_passes: 2,
            infer_return_types_from_body: true,
            declaration_text_heuristic: true,
            sdk_global_folders: Vec::new(),
        }
    }
}

impl InferenceOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether an SDK file at `path` contributes to the global table.
    pub fn is_global_sdk_file(&self, path: &str) -> bool {
        if self.sdk_global_folders.is_empty() {
            return true;
        }
        let path = format!("/{}", path.trim_start_matches('/'));
        self.sdk_global_folders
            .iter()
            .any(|folder| path.contains(&format!("/{}/", folder.trim_matches('/'))))
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
