//! Constants for file extensions and resolution strategies.
//!
//! Centralizes extension handling so parsing, resolution, and page
//! collection agree on what counts as an analyzable source file.

/// File extensions for JavaScript/TypeScript files that can be analyzed
pub const JS_TS_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "mts", // TypeScript module
    "cts", // TypeScript CommonJS
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
    "mjs", // JavaScript module
    "cjs", // JavaScript CommonJS
];

/// Extensions a page component may carry. Plain `.ts` files cannot
/// contain JSX, so they are never pages.
pub const PAGE_EXTENSIONS: &[&str] = &["js", "jsx", "tsx"];

/// Extensions to try when resolving module imports (in priority order)
pub const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Index file names to try when resolving directory imports
pub const INDEX_FILES: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.mts",
    "index.cts",
    "index.js",
    "index.jsx",
    "index.mjs",
    "index.cjs",
];
