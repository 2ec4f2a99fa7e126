use log::trace;
use path_clean::clean;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use oxibound_core::{JS_TS_EXTENSIONS, find_owning_package};

use crate::error::{AnalyzeError, Result};
use crate::module_resolver::ModuleResolver;

/// One resolved dependency edge. `package` is set when the target
/// lives inside a vendored package tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub file_path: PathBuf,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

/// The analysis result for one file - what the cache stores and
/// persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFileRecord {
    pub file_path: PathBuf,
    pub file_name: String,
    pub dependencies: Vec<Dependency>,
    pub uses_client_directive: bool,
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

impl SourceFileRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

/// A project file whose dependency edges and directive flag are
/// computed lazily and memoized jointly: the module resolver runs at
/// most once per `SourceFile`, no matter which accessor triggers it.
pub struct SourceFile {
    file_path: PathBuf,
    analysis: Option<SourceFileRecord>,
}

impl SourceFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { file_path: clean(path.as_ref()), analysis: None }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// The file's stem: `app/blog/page.tsx` -> `page`.
    pub fn file_name(&self) -> String {
        stem_of(&self.file_path)
    }

    /// Read the file's text. Paths that point into an unbuilt output
    /// directory are a normal occurrence, so a missing (or otherwise
    /// unreadable) file surfaces as `FileNotFound` for the caller to
    /// skip.
    pub fn read(&self) -> Result<String> {
        read_source(&self.file_path)
    }

    /// Compute the file's record: read, resolve imports, filter, and
    /// annotate. Idempotent - repeated calls return the memoized
    /// record without re-invoking the resolver.
    pub fn analyze(&mut self, resolver: &dyn ModuleResolver) -> Result<&SourceFileRecord> {
        match self.analysis {
            Some(ref record) => {
                trace!("Analysis memoized for {}", self.file_path.display());
                Ok(record)
            }
            None => {
                let record = compute_record(&self.file_path, resolver)?;
                Ok(self.analysis.insert(record))
            }
        }
    }

    /// The file's direct-dependency edge list, in source order.
    pub fn dependencies(&mut self, resolver: &dyn ModuleResolver) -> Result<&[Dependency]> {
        Ok(&self.analyze(resolver)?.dependencies)
    }

    /// Whether the file opens its directive prologue with
    /// `"use client"`.
    pub fn uses_client_directive(&mut self, resolver: &dyn ModuleResolver) -> Result<bool> {
        Ok(self.analyze(resolver)?.uses_client_directive)
    }
}

fn compute_record(path: &Path, resolver: &dyn ModuleResolver) -> Result<SourceFileRecord> {
    let text = read_source(path)?;
    let content_hash = hash_content(&text);

    let resolved = resolver.resolve_module(path, &text)?;

    // Filtering order matters: declaration files are dropped before
    // any other consideration and never produce a dependency entry
    let dependencies = resolved
        .import_paths
        .into_iter()
        .flatten()
        .filter(|p| !is_declaration_file(p))
        .filter(|p| has_source_extension(p))
        .map(|p| {
            let package = if is_vendored(&p) { owning_package_name(&p) } else { None };
            Dependency {
                file_name: file_name_of(&p),
                file_path: p,
                package,
            }
        })
        .collect();

    let package_name = if is_vendored(path) { owning_package_name(path) } else { None };

    Ok(SourceFileRecord {
        file_path: path.to_path_buf(),
        file_name: stem_of(path),
        dependencies,
        uses_client_directive: resolved.has_client_directive,
        content_hash,
        package_name,
    })
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e: io::Error| {
        trace!("Read failed for {}: {}", path.display(), e);
        AnalyzeError::FileNotFound { path: path.to_path_buf() }
    })
}

fn hash_content(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `foo.d.ts` and friends carry no runtime code
fn is_declaration_file(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    stem.ends_with(".d") && matches!(ext, "ts" | "mts" | "cts")
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|ext| JS_TS_EXTENSIONS.contains(&ext))
}

fn is_vendored(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "node_modules")
}

fn owning_package_name(path: &Path) -> Option<String> {
    let dir = path.parent()?;
    find_owning_package(dir).map(|info| info.name)
}

fn stem_of(path: &Path) -> String {
    path.file_stem().unwrap_or_default().to_string_lossy().to_string()
}

fn file_name_of(path: &Path) -> String {
    path.file_name().unwrap_or_default().to_string_lossy().to_string()
}
