//! Memoized dependency-graph analysis for Next.js app-router projects.
//!
//! Starting from each page file, the crawler resolves the page's
//! module dependencies into a graph, analyzing every file at most once
//! per run via a shared cache, and reports whether any file in a
//! page's dependency closure declares the `"use client"` boundary
//! directive. The cache can be persisted between runs so unchanged
//! projects skip re-analysis entirely.
//!
//! # Examples
//!
//! ```no_run
//! use oxibound_graph::{OxcResolver, Project, SourceFileCache};
//!
//! # fn main() -> anyhow::Result<()> {
//! let project = Project::new("/path/to/project", None);
//! let cache = SourceFileCache::new("/path/to/project/.oxibound");
//! cache.restore_from_file()?;
//!
//! let resolver = OxcResolver::new(project.root(), project.tsconfig_path());
//! let result = project.analyze(&cache, &resolver)?;
//!
//! for report in &result.reports {
//!     println!("{:?} client: {}", report.route, report.uses_client_side_rendering);
//! }
//! cache.write_to_file()?;
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod error;
mod graph;
mod module_resolver;
mod project;
mod reporter;
mod source_file;

// Re-export public API
pub use cache::SourceFileCache;
pub use config::Config;
pub use error::{AnalyzeError, Result};
pub use graph::{DependencyGraph, GraphOutcome};
pub use module_resolver::{ModuleResolver, OxcResolver, ResolvedModule};
pub use project::{AnalyzeResult, PageReport, Project, infer_route};
pub use reporter::{print_no_pages_message, print_route_report};
pub use source_file::{Dependency, SourceFile, SourceFileRecord};
