// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Ordered method pipelines

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::entry::FileEntry;
use crate::metadata::MetadataProvider;
use crate::methods::{Method, MethodSpec};

/// Ordered list of methods folded over a name
///
/// Counters live inside the methods, so a pipeline must be [`reset`](Self::reset)
/// before each fresh batch.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    methods: Vec<Method>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a method to the end of the pipeline
    pub fn push(&mut self, method: Method) {
        self.methods.push(method);
    }

    /// Remove the method at `index`
    pub fn remove(&mut self, index: usize) -> Option<Method> {
        (index < self.methods.len()).then(|| self.methods.remove(index))
    }

    pub fn clear(&mut self) {
        self.methods.clear();
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Display names of every method, in order
    pub fn describe(&self) -> Vec<String> {
        self.methods.iter().map(Method::display_name).collect()
    }

    /// Restore every counter to its seed
    pub fn reset(&mut self) {
        for method in &mut self.methods {
            method.reset();
        }
    }

    /// Fold all methods over `(name, extension)`.
    ///
    /// A method that fails is skipped; the next one receives the unchanged
    /// input.
    pub fn apply(&mut self, name: &str, extension: &str, path: &Path) -> (String, String) {
        let mut current = (name.to_string(), extension.to_string());
        for method in &mut self.methods {
            match method.apply(&current.0, &current.1, path) {
                Ok(next) => current = next,
                Err(e) => warn!("Skipping {} for {:?}: {}", method.kind(), path, e),
            }
        }
        current
    }
}

/// Construct a pipeline from method configurations
pub fn build_pipeline(specs: &[MethodSpec], provider: Option<Arc<dyn MetadataProvider>>) -> Pipeline {
    Pipeline {
        methods: specs
            .iter()
            .map(|spec| Method::from_spec(spec, provider.clone()))
            .collect(),
    }
}

/// Apply `pipeline` to every entry in list order, recording each proposal and
/// its validation status.
///
/// Counters are not reset here.
pub fn apply_pipeline(pipeline: &mut Pipeline, entries: &mut [FileEntry]) {
    for entry in entries.iter_mut() {
        let (name, extension) =
            pipeline.apply(entry.base_name(), entry.extension(), entry.current_path());
        debug!(
            "Proposed {:?} -> {}{}",
            entry.current_path(),
            name,
            extension
        );
        entry.set_proposal(name, extension);
    }
}
