use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum AmalgamError {
	#[error(transparent)]
	#[diagnostic(code(amalgam::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read `{}`{}", .path.display(), included_from_suffix(.included_from.as_ref()))]
	#[diagnostic(
		code(amalgam::read),
		help("check that the file exists and that the include path is relative to the including file")
	)]
	Read {
		path: PathBuf,
		included_from: Option<PathBuf>,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write `{}`", .path.display())]
	#[diagnostic(
		code(amalgam::write),
		help("check that the parent directory exists and is writable")
	)]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("include cycle detected at `{}`: {chain}", .path.display())]
	#[diagnostic(
		code(amalgam::include_cycle),
		help("remove one of the `#include` directives in the chain")
	)]
	Cycle { path: PathBuf, chain: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(amalgam::config_parse),
		help("check that amalgam.toml is valid TOML with `input`, `output` and an optional [variables] table")
	)]
	ConfigParse(String),

	#[error("failed to load metadata file `{path}`: {reason}")]
	#[diagnostic(code(amalgam::metadata))]
	Metadata { path: String, reason: String },

	#[error("unsupported metadata file format: `{0}`")]
	#[diagnostic(
		code(amalgam::unsupported_format),
		help("supported formats: json (package.json), toml (Cargo.toml)")
	)]
	UnsupportedMetadataFormat(String),

	#[error("no input file configured")]
	#[diagnostic(
		code(amalgam::missing_input),
		help("pass `--input <FILE>` or set `input` in amalgam.toml")
	)]
	MissingInput,

	#[error("no output file configured")]
	#[diagnostic(
		code(amalgam::missing_output),
		help("pass `--output <FILE>` or set `output` in amalgam.toml")
	)]
	MissingOutput,

	#[error("invalid variable: `{0}`")]
	#[diagnostic(
		code(amalgam::invalid_variable),
		help("variables are written as `KEY=VALUE` where KEY only contains letters, digits and `_`")
	)]
	InvalidVariable(String),
}

fn included_from_suffix(included_from: Option<&PathBuf>) -> String {
	included_from
		.map(|parent| format!(" (included from `{}`)", parent.display()))
		.unwrap_or_default()
}

pub type AmalgamResult<T> = Result<T, AmalgamError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
