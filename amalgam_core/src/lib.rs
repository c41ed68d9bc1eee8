//! `amalgam_core` is the engine behind [amalgam](https://github.com/amalgam-rs/amalgam). It turns
//! a root source file that pulls in other files with `#include "path"` lines
//! into one self-contained file, substituting `${NAME}` variables along the
//! way. The typical use is shipping a C library as a single header.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Root file
//!   → Read (one file at a time, no caching)
//!   → Variable pass (logos tokenizer replaces known `${NAME}` references)
//!   → Directive pass (line scanner finds `#include "path"` lines)
//!   → Recursion (each target resolved relative to the including file)
//!   → Writer (temporary file + rename over the destination)
//! ```
//!
//! ## Modules
//!
//! - [`variables`]: [`VariableMap`] and the `${NAME}` substitution pass.
//! - [`directive`]: Line scanner for `#include "path"` directives.
//! - [`config`]: Configuration loading from `amalgam.toml`.
//! - [`metadata`]: `NAME`, `VERSION` and `DESCRIPTION` from `package.json` or
//!   `Cargo.toml`.
//! - [`project`]: Merges config, metadata and command line values into a
//!   [`ProjectContext`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use amalgam_core::Inliner;
//! use amalgam_core::VariableMap;
//! use amalgam_core::write_output;
//! use std::path::Path;
//!
//! let mut variables = VariableMap::new();
//! variables.insert("VERSION", "1.2.3");
//!
//! let text = Inliner::new(&variables).resolve(Path::new("src/unit.h")).unwrap();
//! write_output(Path::new("include/unit.h"), &text).unwrap();
//! ```

pub use config::*;
pub use error::*;
pub use inliner::*;
pub use project::*;
pub use variables::VariableMap;
pub use writer::*;

pub mod config;
pub mod directive;
#[allow(unused_assignments)]
mod error;
mod inliner;
pub mod metadata;
pub mod project;
pub mod variables;
mod writer;
