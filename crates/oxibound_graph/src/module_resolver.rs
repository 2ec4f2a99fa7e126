use dashmap::DashMap;
use log::debug;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use oxibound_core::{parse_source, read_tsconfig_paths, resolve};

use crate::error::{AnalyzeError, Result};

/// What module resolution extracts from one file: its import targets,
/// in source order, and whether it opens with the client directive.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    /// One entry per import specifier; `None` marks a specifier that
    /// resolved to nothing and is left for the caller to filter.
    pub import_paths: Vec<Option<PathBuf>>,
    pub has_client_directive: bool,
}

/// The seam between the graph crawl and the machinery that parses
/// source text and resolves import specifiers. Tests substitute a
/// table-driven implementation.
pub trait ModuleResolver {
    fn resolve_module(&self, file: &Path, source: &str) -> Result<ResolvedModule>;
}

/// Production resolver: oxc-based parsing plus filesystem resolution
/// with tsconfig path aliases. Resolution results are memoized for the
/// resolver's lifetime.
pub struct OxcResolver {
    project_root: PathBuf,
    tsconfig_paths: HashMap<String, Vec<String>>,
    resolve_cache: DashMap<(PathBuf, String), Option<PathBuf>>,
}

impl OxcResolver {
    pub fn new(project_root: impl Into<PathBuf>, tsconfig_path: &Path) -> Self {
        let project_root = project_root.into();
        let tsconfig_paths = read_tsconfig_paths(tsconfig_path);
        debug!(
            "Module resolver for {} with {} path aliases",
            project_root.display(),
            tsconfig_paths.len()
        );
        Self { project_root, tsconfig_paths, resolve_cache: DashMap::new() }
    }
}

impl ModuleResolver for OxcResolver {
    fn resolve_module(&self, file: &Path, source: &str) -> Result<ResolvedModule> {
        let summary = parse_source(file, source).map_err(|e| AnalyzeError::Parse {
            path: file.to_path_buf(),
            message: e.to_string(),
        })?;

        let import_paths = summary
            .specifiers
            .iter()
            .map(|spec| {
                resolve(
                    &self.project_root,
                    &self.tsconfig_paths,
                    file,
                    &spec.request,
                    &self.resolve_cache,
                )
            })
            .collect();

        Ok(ResolvedModule { import_paths, has_client_directive: summary.has_client_directive })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_resolves_imports_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let page = create_test_file(root, "app/page.tsx", "import './b';\nimport './a';");
        let _b = create_test_file(root, "app/b.ts", "");
        let _a = create_test_file(root, "app/a.ts", "");

        let resolver = OxcResolver::new(root, &root.join("tsconfig.json"));
        let source = fs::read_to_string(&page).unwrap();
        let resolved = resolver.resolve_module(&page, &source).unwrap();

        assert_eq!(resolved.import_paths.len(), 2);
        assert!(resolved.import_paths[0].as_deref().unwrap().ends_with("b.ts"));
        assert!(resolved.import_paths[1].as_deref().unwrap().ends_with("a.ts"));
        assert!(!resolved.has_client_directive);
    }

    #[test]
    fn test_unresolved_import_is_sentinel() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let page = create_test_file(root, "app/page.tsx", "import 'some-missing-package';");

        let resolver = OxcResolver::new(root, &root.join("tsconfig.json"));
        let resolved =
            resolver.resolve_module(&page, "import 'some-missing-package';").unwrap();

        assert_eq!(resolved.import_paths, vec![None]);
    }

    #[test]
    fn test_directive_flag_passes_through() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let page = create_test_file(root, "app/page.tsx", "'use client';\nexport default 1;");

        let resolver = OxcResolver::new(root, &root.join("tsconfig.json"));
        let resolved =
            resolver.resolve_module(&page, "'use client';\nexport default 1;").unwrap();

        assert!(resolved.has_client_directive);
    }
}
