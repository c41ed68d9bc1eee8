use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::AmalgamError;
use crate::AmalgamResult;
use crate::directive::scan_directives;
use crate::variables::VariableMap;
use crate::variables::find_unresolved_variables;
use crate::variables::substitute;

/// A file read while resolving an amalgamation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
	/// Normalized absolute path of the file.
	pub path: PathBuf,
	/// Inclusion depth. The root file has depth `0`.
	pub depth: usize,
	/// The file whose directive pulled this file in. `None` for the root.
	pub included_from: Option<PathBuf>,
}

/// A `${NAME}` reference that had no value in the variable map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedVariable {
	/// File containing the reference.
	pub file: PathBuf,
	/// Name of the variable.
	pub name: String,
}

/// The result of resolving a root file.
#[derive(Debug, Clone, Default)]
pub struct Amalgamation {
	/// The fully resolved text.
	pub text: String,
	/// Every file read, in read order. A file included more than once appears
	/// once per inclusion.
	pub sources: Vec<SourceFile>,
	/// References left verbatim because their names were unknown.
	pub unresolved: Vec<UnresolvedVariable>,
}

impl Amalgamation {
	/// Returns true if any `${NAME}` reference was left unresolved.
	pub fn has_unresolved(&self) -> bool {
		!self.unresolved.is_empty()
	}
}

/// State threaded through a single resolution.
#[derive(Default)]
struct Walk {
	/// Files currently being resolved, outermost first.
	chain: Vec<PathBuf>,
	sources: Vec<SourceFile>,
	unresolved: Vec<UnresolvedVariable>,
}

/// Recursively inlines `#include "path"` directives and substitutes
/// `${NAME}` references.
///
/// Each file is read, substituted with the variable map, then scanned for
/// directives. Every directive target is resolved relative to the directory of
/// the file containing it and inlined with the same algorithm. Nothing is
/// cached: a file included twice is read twice.
#[derive(Debug, Clone, Copy)]
pub struct Inliner<'a> {
	variables: &'a VariableMap,
}

impl<'a> Inliner<'a> {
	pub fn new(variables: &'a VariableMap) -> Self {
		Self { variables }
	}

	/// Resolve `path` into a single flat text.
	pub fn resolve(&self, path: &Path) -> AmalgamResult<String> {
		Ok(self.amalgamate(path)?.text)
	}

	/// Resolve `path`, also recording which files were read and which
	/// variables were left unresolved.
	#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
	pub fn amalgamate(&self, path: &Path) -> AmalgamResult<Amalgamation> {
		let root = absolute_path(path)?;
		let mut walk = Walk::default();
		let text = self.inline_file(&root, None, &mut walk)?;

		tracing::debug!(files = walk.sources.len(), bytes = text.len(), "resolved amalgamation");

		Ok(Amalgamation {
			text,
			sources: walk.sources,
			unresolved: walk.unresolved,
		})
	}

	fn inline_file(
		&self,
		path: &Path,
		included_from: Option<&Path>,
		walk: &mut Walk,
	) -> AmalgamResult<String> {
		if walk.chain.iter().any(|ancestor| ancestor == path) {
			return Err(AmalgamError::Cycle {
				path: path.to_path_buf(),
				chain: format_chain(&walk.chain, path),
			});
		}

		let bytes = std::fs::read(path).map_err(|source| AmalgamError::Read {
			path: path.to_path_buf(),
			included_from: included_from.map(Path::to_path_buf),
			source,
		})?;
		// Invalid UTF-8 is replaced with U+FFFD rather than failing the run.
		let source = String::from_utf8_lossy(&bytes);

		let depth = walk.chain.len();
		tracing::debug!(path = %path.display(), depth, "inlining file");

		walk.sources.push(SourceFile {
			path: path.to_path_buf(),
			depth,
			included_from: included_from.map(Path::to_path_buf),
		});
		walk.unresolved.extend(
			find_unresolved_variables(&source, self.variables)
				.into_iter()
				.map(|name| UnresolvedVariable {
					file: path.to_path_buf(),
					name,
				}),
		);

		let text = substitute(&source, self.variables);
		let directives = scan_directives(&text);

		if directives.is_empty() {
			return Ok(text);
		}

		let directory = path.parent().unwrap_or_else(|| Path::new(""));
		let mut output = String::with_capacity(text.len());
		let mut cursor = 0;

		walk.chain.push(path.to_path_buf());

		for directive in directives {
			let target = normalize_path(&directory.join(directive.target));
			tracing::trace!(
				line = directive.line,
				target = %target.display(),
				"expanding include"
			);

			output.push_str(&text[cursor..directive.span.start]);
			output.push_str(&self.inline_file(&target, Some(path), walk)?);
			cursor = directive.span.end;
		}

		output.push_str(&text[cursor..]);
		walk.chain.pop();

		Ok(output)
	}
}

/// Resolve `path` with an empty variable map.
pub fn resolve(path: &Path) -> AmalgamResult<String> {
	Inliner::new(&VariableMap::new()).resolve(path)
}

/// Resolve `path` with the given variables.
pub fn resolve_with_variables(path: &Path, variables: &VariableMap) -> AmalgamResult<String> {
	Inliner::new(variables).resolve(path)
}

/// Make `path` absolute against the current directory and fold `.` and `..`
/// components lexically. Symlinks are not followed.
pub fn absolute_path(path: &Path) -> AmalgamResult<PathBuf> {
	Ok(normalize_path(&std::path::absolute(path)?))
}

/// Fold `.` and `..` components without touching the file system. A `..` at
/// the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				match normalized.components().next_back() {
					Some(Component::Normal(_)) => {
						normalized.pop();
					}
					Some(Component::RootDir | Component::Prefix(_)) => {}
					_ => normalized.push(".."),
				}
			}
			other => normalized.push(other.as_os_str()),
		}
	}

	normalized
}

fn format_chain(chain: &[PathBuf], repeated: &Path) -> String {
	chain
		.iter()
		.map(|path| path.display().to_string())
		.chain(std::iter::once(repeated.display().to_string()))
		.collect::<Vec<_>>()
		.join(" -> ")
}
