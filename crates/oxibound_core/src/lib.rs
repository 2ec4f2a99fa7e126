//! Core utilities for analyzing Next.js app-router projects.
//!
//! This crate provides the building blocks the graph crawler is
//! assembled from:
//! - Parsing import specifiers and directive prologues from JS/TS files
//! - Resolving module requests (relative, node_modules, tsconfig paths)
//! - Collecting app-router page files from a project tree
//! - Configuration utilities (git root finding, tsconfig reading)
//! - Locating the package that owns a vendored file

mod collector;
mod config;
mod constants;
mod package;
mod parser;
mod resolver;
mod types;

// Re-export public API
pub use collector::collect_pages;
pub use config::{find_git_root, read_tsconfig_paths};
pub use constants::{INDEX_FILES, JS_TS_EXTENSIONS, PAGE_EXTENSIONS, RESOLVE_EXTENSIONS};
pub use package::{PackageInfo, find_owning_package};
pub use parser::parse_source;
pub use resolver::resolve;
pub use types::{ModuleSummary, SpecKind, Specifier};
