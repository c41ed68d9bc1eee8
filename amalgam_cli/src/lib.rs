use std::path::Path;
use std::path::PathBuf;

use amalgam_core::is_output_artifact;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Inline #include directives into one self-contained file.",
	long_about = "amalgam reads a root source file, recursively replaces every `#include \
	              \"path\"` line with the resolved contents of that file, substitutes \
	              `${NAME}` variables and writes the result as a single file.\n\nInclude \
	              paths are relative to the file containing the directive. Variables come \
	              from the project metadata file, the [variables] table in amalgam.toml and \
	              `--var KEY=VALUE` flags.\n\nQuick start:\n  amalgam init   Create an \
	              amalgam.toml\n  amalgam build  Write the amalgamated file\n  amalgam check  \
	              Verify the output is up to date\n  amalgam list   Show the files that \
	              would be inlined"
)]
pub struct AmalgamCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

/// Input selection and variables shared by every command that resolves files.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
	/// Root input file. Overrides `input` in amalgam.toml.
	#[arg(long, short)]
	pub input: Option<PathBuf>,

	/// Set a variable, e.g. `--var VERSION=1.2.3`. May be repeated. Takes
	/// precedence over metadata and [variables] values.
	#[arg(long = "var", value_name = "KEY=VALUE")]
	pub vars: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create an `amalgam.toml` in the project root.
	///
	/// The generated config points at `src/main.h` and `include/main.h`.
	/// If a config file already exists, this command is a no-op.
	Init,
	/// Resolve the input file and write the amalgamated output.
	///
	/// Nothing is written if any file fails to resolve. The output is
	/// written to a temporary file first and moved into place.
	Build {
		#[command(flatten)]
		source: SourceArgs,

		/// Output file. Overrides `output` in amalgam.toml.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Print the amalgamated text to stdout instead of writing it.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch the project for changes and rebuild automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Check that the output file matches a fresh amalgamation.
	///
	/// Exits with a non-zero status code when the output is missing or out
	/// of date. Useful in CI to make sure the generated file was committed.
	Check {
		#[command(flatten)]
		source: SourceArgs,

		/// Output file. Overrides `output` in amalgam.toml.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Show a line diff between the current and expected output.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// List the files that would be inlined, in inclusion order.
	///
	/// A file included more than once is listed once per inclusion.
	List {
		#[command(flatten)]
		source: SourceArgs,

		/// Output format for the file list.
		#[arg(long, value_enum, default_value_t = ListOutputFormat::Text)]
		format: ListOutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListOutputFormat {
	/// One file per line, indented by inclusion depth.
	Text,
	/// JSON array of `{ path, depth, included_from }` objects.
	Json,
}

/// Returns true when a file-system event in watch mode should trigger a
/// rebuild. Events that only touch the output file or the temporary files
/// written next to it are ignored.
pub fn should_rebuild(event: &notify::Event, destination: &Path) -> bool {
	matches!(
		event.kind,
		notify::EventKind::Modify(_) | notify::EventKind::Create(_) | notify::EventKind::Remove(_)
	) && event
		.paths
		.iter()
		.any(|path| !is_output_artifact(path, destination))
}
