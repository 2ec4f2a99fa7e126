use anyhow::{Result, anyhow};
use log::{debug, trace};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

pub fn find_git_root() -> Result<PathBuf> {
    debug!("Searching for git root");
    let mut current_dir = env::current_dir()?;
    trace!("Starting search from: {:?}", current_dir);

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                return Err(anyhow!("Could not find .git directory in any parent folder"));
            }
        }
    }
}

/// Read `compilerOptions.paths` from one tsconfig file, resolving each
/// target against `baseUrl`. Alias keys and targets have their `/*`
/// suffix stripped; the resolver re-appends the remainder of a
/// request. A missing or malformed tsconfig yields no aliases.
pub fn read_tsconfig_paths(tsconfig_path: &Path) -> HashMap<String, Vec<String>> {
    debug!("Reading tsconfig paths from {}", tsconfig_path.display());
    let mut paths = HashMap::new();

    let Ok(content) = fs::read_to_string(tsconfig_path) else {
        debug!("No tsconfig at {}", tsconfig_path.display());
        return paths;
    };

    // tsconfig allows // comments; strip them before JSON parsing
    let content_no_comments: String = content
        .lines()
        .map(|line| if let Some(idx) = line.find("//") { &line[..idx] } else { line })
        .collect::<Vec<_>>()
        .join("\n");

    let Ok(json) = serde_json::from_str::<serde_json::Value>(&content_no_comments) else {
        debug!("Could not parse tsconfig at {}", tsconfig_path.display());
        return paths;
    };

    let Some(compiler_options) = json.get("compilerOptions") else {
        return paths;
    };
    let Some(paths_obj) = compiler_options.get("paths").and_then(|p| p.as_object()) else {
        return paths;
    };

    let base_url = compiler_options.get("baseUrl").and_then(|b| b.as_str()).unwrap_or(".");
    let tsconfig_dir = tsconfig_path.parent().unwrap_or(Path::new("."));
    let base_path = tsconfig_dir.join(base_url);

    for (alias, targets) in paths_obj {
        let Some(target_arr) = targets.as_array() else {
            continue;
        };
        let resolved_targets: Vec<String> = target_arr
            .iter()
            .filter_map(|t| t.as_str())
            .map(|t| base_path.join(t.trim_end_matches("/*")).to_string_lossy().to_string())
            .collect();

        if !resolved_targets.is_empty() {
            let alias_key = alias.trim_end_matches("/*").to_string();
            trace!("Found tsconfig path alias: '{}' -> {:?}", alias_key, resolved_targets);
            paths.insert(alias_key, resolved_targets);
        }
    }

    debug!("Loaded {} tsconfig path aliases", paths.len());
    paths
}
