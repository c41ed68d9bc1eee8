use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::AmalgamError;
use crate::AmalgamResult;
use crate::metadata::load_metadata_variables;
use crate::variables::VariableMap;
use crate::variables::is_variable_name;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["amalgam.toml", ".amalgam.toml", ".config/amalgam.toml"];

/// Configuration loaded from an `amalgam.toml` file.
///
/// ```toml
/// input = "src/unit.h"
/// output = "include/unit.h"
/// metadata = "package.json"
///
/// [variables]
/// LICENSE = "MIT"
/// ```
///
/// All paths are relative to the project root.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmalgamConfig {
	/// Root file of the amalgamation.
	#[serde(default)]
	pub input: Option<PathBuf>,
	/// Destination of the generated file.
	#[serde(default)]
	pub output: Option<PathBuf>,
	/// Project metadata file (`package.json` or `Cargo.toml`) providing the
	/// `NAME`, `VERSION` and `DESCRIPTION` variables.
	#[serde(default)]
	pub metadata: Option<PathBuf>,
	/// Literal variables. These take precedence over metadata values.
	#[serde(default)]
	pub variables: VariableMap,
}

impl AmalgamConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> AmalgamResult<Option<AmalgamConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Parse config file content.
	pub fn parse(content: &str) -> AmalgamResult<AmalgamConfig> {
		let config: AmalgamConfig =
			toml::from_str(content).map_err(|e| AmalgamError::ConfigParse(e.to_string()))?;

		if let Some(name) = config
			.variables
			.keys()
			.find(|name| !is_variable_name(name))
		{
			return Err(AmalgamError::ConfigParse(format!(
				"invalid variable name `{name}` in [variables]"
			)));
		}

		Ok(config)
	}

	/// Build the variable map for a run: metadata values first, then the
	/// literal `[variables]` table on top.
	pub fn load_variables(&self, root: &Path) -> AmalgamResult<VariableMap> {
		let mut variables = match &self.metadata {
			Some(metadata) => load_metadata_variables(root, metadata)?,
			None => VariableMap::new(),
		};

		variables.extend(
			self.variables
				.iter()
				.map(|(name, value)| (name.clone(), value.clone())),
		);

		Ok(variables)
	}
}
