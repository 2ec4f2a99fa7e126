use log::{debug, trace, warn};
use path_clean::clean;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::cache::SourceFileCache;
use crate::error::{AnalyzeError, Result};
use crate::module_resolver::ModuleResolver;
use crate::source_file::{SourceFile, SourceFileRecord};

/// Traversal bookkeeping for one build. A path is absent until first
/// reached, `InProgress` while its subtree is being walked, and `Done`
/// afterwards - re-entering either marked state stops descent, which
/// is what terminates cycles and deduplicates fan-in.
#[derive(Clone, Copy, Debug, PartialEq)]
enum VisitState {
    InProgress,
    Done,
}

#[derive(Debug, Clone)]
pub struct GraphOutcome {
    /// OR over the directive flag of every file in the subtree.
    pub uses_client_side_rendering: bool,
}

/// Drives one cache-aware depth-first traversal from a root path.
/// Ephemeral: construct, `build()`, discard. All per-file state lives
/// in the shared cache so sibling graphs in the same run get
/// at-most-once analysis for shared dependencies.
pub struct DependencyGraph {
    root: PathBuf,
}

impl DependencyGraph {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build(
        &self,
        cache: &SourceFileCache,
        resolver: &dyn ModuleResolver,
    ) -> Result<GraphOutcome> {
        debug!("Building dependency graph from {}", self.root.display());
        let mut status: HashMap<PathBuf, VisitState> = HashMap::new();
        let uses_client_side_rendering = visit(&self.root, cache, resolver, &mut status)?;
        debug!(
            "Graph for {} visited {} files (client rendering: {})",
            self.root.display(),
            status.len(),
            uses_client_side_rendering
        );
        Ok(GraphOutcome { uses_client_side_rendering })
    }
}

fn visit(
    path: &Path,
    cache: &SourceFileCache,
    resolver: &dyn ModuleResolver,
    status: &mut HashMap<PathBuf, VisitState>,
) -> Result<bool> {
    let path = clean(path);

    match status.get(&path) {
        Some(VisitState::InProgress) => {
            trace!("Cycle re-entry at {}, stopping descent", path.display());
            return Ok(false);
        }
        Some(VisitState::Done) => {
            trace!("Already visited {}", path.display());
            return Ok(false);
        }
        None => {}
    }
    status.insert(path.clone(), VisitState::InProgress);

    let record = match ensure_analyzed(&path, cache, resolver) {
        Ok(record) => record,
        Err(AnalyzeError::FileNotFound { path: missing }) => {
            // Imports into unbuilt output directories land here; the
            // rest of the crawl is still useful
            warn!("File not found: {} (the project may need a build), skipping", missing.display());
            status.insert(path, VisitState::Done);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    // Every file contributes its own flag exactly once - at the point
    // it is visited - so the fold is exact even across cache hits
    let mut uses_client = record.uses_client_directive;
    for dep in &record.dependencies {
        uses_client |= visit(&dep.file_path, cache, resolver, status)?;
    }

    status.insert(path, VisitState::Done);
    Ok(uses_client)
}

/// Fetch a path's record, analyzing and caching it if absent. The
/// entry is stored before the caller recurses into its dependency
/// list.
fn ensure_analyzed(
    path: &Path,
    cache: &SourceFileCache,
    resolver: &dyn ModuleResolver,
) -> Result<SourceFileRecord> {
    if let Some(record) = cache.get(path) {
        trace!("Cache hit for {}", path.display());
        return Ok(record);
    }

    let mut file = SourceFile::new(path);
    let record = file.analyze(resolver)?.clone();
    Ok(cache.set(record.file_path.clone(), record))
}
