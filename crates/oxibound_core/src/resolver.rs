use dashmap::DashMap;
use log::{debug, trace};
use path_clean::clean;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::constants::{INDEX_FILES, RESOLVE_EXTENSIONS};

/// Resolve a module request from `from_file` to an absolute path.
///
/// `None` means the request resolved to nothing - an ambient or
/// type-only target, or a package this project doesn't vendor. The
/// caller decides what to do with unresolved entries.
pub fn resolve(
    root: &Path,
    tsconfig_paths: &HashMap<String, Vec<String>>,
    from_file: &Path,
    request: &str,
    cache: &DashMap<(PathBuf, String), Option<PathBuf>>,
) -> Option<PathBuf> {
    let key = (from_file.to_path_buf(), request.to_string());
    if let Some(v) = cache.get(&key) {
        trace!("Cache hit for resolve: '{}' from {}", request, from_file.display());
        return v.clone();
    }
    trace!("Resolving: '{}' from {}", request, from_file.display());

    let is_relative =
        request.starts_with("./") || request.starts_with("../") || request.starts_with('/');

    let resolved = if is_relative {
        resolve_relative(root, from_file, request)
    } else {
        resolve_bare(root, tsconfig_paths, from_file, request)
    };

    cache.insert(key, resolved.clone());
    if resolved.is_some() {
        debug!("Resolved '{}' from {}", request, from_file.display());
    } else {
        trace!("Could not resolve '{}' from {}", request, from_file.display());
    }
    resolved
}

fn resolve_relative(root: &Path, from_file: &Path, request: &str) -> Option<PathBuf> {
    let base = from_file.parent().unwrap_or(root);
    let joined = clean(base.join(request).to_string_lossy().to_string());
    resolve_file(Path::new(&joined))
}

fn resolve_bare(
    root: &Path,
    tsconfig_paths: &HashMap<String, Vec<String>>,
    from_file: &Path,
    request: &str,
) -> Option<PathBuf> {
    // tsconfig path aliases win over node_modules
    for (alias, targets) in tsconfig_paths {
        if !request.starts_with(alias.as_str()) {
            continue;
        }
        trace!("Matched alias '{}' for request '{}'", alias, request);
        let remainder = request.trim_start_matches(alias.as_str()).trim_start_matches('/');
        for target in targets {
            let candidate = if remainder.is_empty() {
                PathBuf::from(target)
            } else {
                PathBuf::from(target).join(remainder)
            };
            if let Some(resolved) = resolve_file(&candidate) {
                return Some(resolved);
            }
        }
    }

    // Walk up from the importing file looking for node_modules,
    // stopping at the workspace root
    let mut dir = from_file.parent().unwrap_or(root);
    loop {
        if let Some(resolved) = resolve_node_module(dir, request) {
            return Some(resolved);
        }
        if dir == root {
            break;
        }
        dir = dir.parent()?;
    }

    None
}

fn resolve_file(p: &Path) -> Option<PathBuf> {
    // Try exact path first
    if p.is_file() {
        return Some(p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));
    }

    // Try adding extensions
    for ext in RESOLVE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{}", p.display(), ext));
        if candidate.exists() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }

    // Try index files
    for index_file in INDEX_FILES {
        let candidate = p.join(index_file);
        if candidate.exists() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }

    None
}

fn resolve_node_module(dir: &Path, pkg: &str) -> Option<PathBuf> {
    // Scoped packages like @acme/ui join cleanly because the request
    // contains the slash
    let nm = dir.join("node_modules").join(pkg);
    if !nm.exists() {
        return None;
    }
    trace!("Checking node_modules at: {:?}", nm);

    for entry in manifest_entry_points(&nm) {
        let candidate = nm.join(entry.trim_start_matches("./"));
        if let Some(resolved) = resolve_file(&candidate) {
            return Some(resolved);
        }
    }

    // Fallback to common index files
    for index_file in INDEX_FILES {
        let p = nm.join(index_file);
        if p.exists() {
            return Some(p.canonicalize().unwrap_or(p));
        }
    }

    None
}

/// Candidate entry points from a package manifest, in preference
/// order: `exports` (string, `"."`, or its import/require/default
/// conditions), then `module`, then `main`.
fn manifest_entry_points(pkg_dir: &Path) -> Vec<String> {
    let mut entries = Vec::new();

    let manifest = pkg_dir.join("package.json");
    let Ok(txt) = fs::read_to_string(&manifest) else {
        return entries;
    };
    let Ok(v) = serde_json::from_str::<serde_json::Value>(&txt) else {
        return entries;
    };

    if let Some(exports) = v.get("exports") {
        if let Some(s) = exports.as_str() {
            entries.push(s.to_string());
        }
        if let Some(dot) = exports.get(".") {
            if let Some(s) = dot.as_str() {
                entries.push(s.to_string());
            }
            // Conditional exports: { ".": { "import": "./dist/index.js" } }
            for key in ["import", "require", "default"] {
                if let Some(s) = dot.get(key).and_then(|x| x.as_str()) {
                    entries.push(s.to_string());
                }
            }
        }
    }

    for field in ["module", "main"] {
        if let Some(s) = v.get(field).and_then(|x| x.as_str()) {
            entries.push(s.to_string());
        }
    }

    entries
}
