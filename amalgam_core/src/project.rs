use std::path::Path;
use std::path::PathBuf;

use crate::AmalgamError;
use crate::AmalgamResult;
use crate::config::AmalgamConfig;
use crate::inliner::Amalgamation;
use crate::inliner::Inliner;
use crate::variables::VariableMap;
use crate::writer::write_output;

/// Values supplied on the command line. Each one overrides the matching
/// config entry.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
	pub input: Option<PathBuf>,
	pub output: Option<PathBuf>,
	/// `KEY=VALUE` pairs, applied after metadata and config variables.
	pub variables: Vec<(String, String)>,
}

/// Everything needed to run an amalgamation for a project.
#[derive(Debug)]
pub struct ProjectContext {
	/// Project root used for config discovery.
	pub root: PathBuf,
	/// Config file in use, if one was found.
	pub config_path: Option<PathBuf>,
	/// Root input file.
	pub input: PathBuf,
	/// Destination file, if configured.
	pub output: Option<PathBuf>,
	/// Variables available to every file of the run.
	pub variables: VariableMap,
}

impl ProjectContext {
	/// Destination file or [`AmalgamError::MissingOutput`].
	pub fn output(&self) -> AmalgamResult<&Path> {
		self.output.as_deref().ok_or(AmalgamError::MissingOutput)
	}

	/// Resolve the input file without writing anything.
	pub fn amalgamate(&self) -> AmalgamResult<Amalgamation> {
		Inliner::new(&self.variables).amalgamate(&self.input)
	}

	/// Resolve the input file and write it to the output. Nothing is written
	/// if resolution fails.
	pub fn build(&self) -> AmalgamResult<Amalgamation> {
		let output = self.output()?;
		let amalgamation = self.amalgamate()?;
		write_output(output, &amalgamation.text)?;

		Ok(amalgamation)
	}
}

/// Load the config found at `root` (if any) and merge it with `options`.
///
/// Config paths are relative to `root`. Paths in `options` are used as given.
pub fn load_project(root: &Path, options: &RunOptions) -> AmalgamResult<ProjectContext> {
	let config = AmalgamConfig::load(root)?.unwrap_or_default();
	let config_path = AmalgamConfig::resolve_path(root);

	let input = options
		.input
		.clone()
		.or_else(|| config.input.as_ref().map(|input| root.join(input)))
		.ok_or(AmalgamError::MissingInput)?;
	let output = options
		.output
		.clone()
		.or_else(|| config.output.as_ref().map(|output| root.join(output)));

	let mut variables = config.load_variables(root)?;
	variables.extend(options.variables.iter().cloned());

	Ok(ProjectContext {
		root: root.to_path_buf(),
		config_path,
		input,
		output,
		variables,
	})
}

/// Resolve `input` with `variables` and write the result to `output`.
pub fn amalgamate_file(
	input: &Path,
	output: &Path,
	variables: &VariableMap,
) -> AmalgamResult<Amalgamation> {
	let amalgamation = Inliner::new(variables).amalgamate(input)?;
	write_output(output, &amalgamation.text)?;

	Ok(amalgamation)
}
