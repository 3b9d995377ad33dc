//! `partials_core` is the engine behind the `partials` command. It scans static
//! documents for comment markers, resolves each marked block to named partial
//! files and replaces the block with their content before publishing.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source document
//!   → Marker pattern (start/end matchers compiled from the parse tag)
//!   → Scanner (walks lines, collects marker-delimited blocks with their spans)
//!   → Handler registry (validates each block into content sources)
//!   → Handler (renders the replacement text from the sources)
//!   → Rewriter (splices replacements into the document by position)
//!   → Batch driver (maps sources to destinations and writes the output)
//! ```
//!
//! ## Marker Syntax
//!
//! ```html
//! <!-- build:partial header -->
//! <p>replaced by the contents of partials/_header.html</p>
//! <!-- /build -->
//!
//! <!-- build:partial optional banner -->
//! <!-- /build -->
//! ```
//!
//! The `build` keyword is configurable through `parse_tag`. An `optional`
//! block without a partial file is deleted instead of failing the run.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `partials.toml`.
//! - [`files`]: Pattern expansion, reads and writes behind the [`FileSystem`]
//!   trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use partials_core::DiskFileSystem;
//! use partials_core::Engine;
//! use partials_core::PartialsConfig;
//! use partials_core::RunMode;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let config = PartialsConfig::load(root).unwrap().unwrap_or_default();
//! let engine = Engine::new(config, DiskFileSystem::new(root)).unwrap();
//! let result = engine.run(RunMode::Write).unwrap();
//! println!("{} block(s) replaced", result.replaced_count());
//! ```

pub use batch::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use files::*;
pub use handlers::*;
pub use patterns::*;
pub use position::*;
pub use scanner::*;

mod batch;
pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod files;
mod handlers;
mod patterns;
mod position;
mod scanner;

#[cfg(test)]
mod __fixtures;
