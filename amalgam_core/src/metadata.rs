//! Variables derived from project metadata files.
//!
//! A `package.json` contributes its top-level `name`, `version` and
//! `description`. A `Cargo.toml` contributes the same fields from `[package]`,
//! falling back to `[workspace.package]` for fields inherited from the
//! workspace.

use std::path::Path;

use crate::AmalgamError;
use crate::AmalgamResult;
use crate::variables::VariableMap;

/// Metadata fields and the variable each one populates.
pub const METADATA_FIELDS: [(&str, &str); 3] = [
	("name", "NAME"),
	("version", "VERSION"),
	("description", "DESCRIPTION"),
];

/// Tables searched for metadata fields, as JSON pointer prefixes.
const JSON_TABLES: &[&str] = &[""];
const TOML_TABLES: &[&str] = &["/package", "/workspace/package"];

/// Read `path` (relative to `root`) and extract the metadata variables.
/// Fields that are missing or not strings are skipped.
pub fn load_metadata_variables(root: &Path, path: &Path) -> AmalgamResult<VariableMap> {
	let abs_path = root.join(path);
	let path_display = path.display().to_string();
	let content = std::fs::read_to_string(&abs_path).map_err(|e| {
		AmalgamError::Metadata {
			path: path_display.clone(),
			reason: e.to_string(),
		}
	})?;
	let format = abs_path
		.extension()
		.and_then(|e| e.to_str())
		.unwrap_or("")
		.to_ascii_lowercase();

	let variables = parse_metadata(&content, &format, &path_display)?;
	tracing::debug!(path = %path_display, count = variables.len(), "loaded metadata variables");

	Ok(variables)
}

/// Parse metadata content in the given format (`json` or `toml`).
pub fn parse_metadata(content: &str, format: &str, path_display: &str) -> AmalgamResult<VariableMap> {
	let (value, tables) = match format {
		"json" => {
			let value: serde_json::Value = serde_json::from_str(content).map_err(|e| {
				AmalgamError::Metadata {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})?;
			(value, JSON_TABLES)
		}
		"toml" => {
			let value: serde_json::Value = toml::from_str(content).map_err(|e| {
				AmalgamError::Metadata {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})?;
			(value, TOML_TABLES)
		}
		other => return Err(AmalgamError::UnsupportedMetadataFormat(other.to_string())),
	};

	let mut variables = VariableMap::new();

	for (field, variable) in METADATA_FIELDS {
		let found = tables.iter().find_map(|table| {
			value
				.pointer(&format!("{table}/{field}"))
				.and_then(serde_json::Value::as_str)
		});

		if let Some(found) = found {
			variables.insert(variable, found);
		}
	}

	Ok(variables)
}
