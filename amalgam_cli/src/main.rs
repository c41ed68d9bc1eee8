use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use amalgam_cli::AmalgamCli;
use amalgam_cli::Commands;
use amalgam_cli::ListOutputFormat;
use amalgam_cli::SourceArgs;
use amalgam_cli::should_rebuild;
use amalgam_core::AmalgamConfig;
use amalgam_core::Amalgamation;
use amalgam_core::RunOptions;
use amalgam_core::VariableMap;
use amalgam_core::absolute_path;
use amalgam_core::is_up_to_date;
use amalgam_core::project::ProjectContext;
use amalgam_core::project::load_project;
use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
	let args = AmalgamCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Build {
			source,
			output,
			dry_run,
			watch,
		}) => run_build(&args, source, output.as_deref(), *dry_run, *watch),
		Some(Commands::Check {
			source,
			output,
			diff,
		}) => run_check(&args, source, output.as_deref(), *diff),
		Some(Commands::List { source, format }) => run_list(&args, source, *format),
		None => {
			eprintln!("No subcommand specified. Run `amalgam --help` for usage.");
			process::exit(2);
		}
	};

	if let Err(e) = result {
		report_error(e);
		process::exit(2);
	}
}

/// Logs go to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn report_error(e: Box<dyn std::error::Error>) {
	// Try to render through miette for rich diagnostics with help text and
	// error codes.
	match e.downcast::<amalgam_core::AmalgamError>() {
		Ok(amalgam_err) => {
			let report: miette::Report = (*amalgam_err).into();
			eprintln!("{report:?}");
		}
		Err(e) => {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn resolve_root(args: &AmalgamCli) -> PathBuf {
	let root = args
		.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

	absolute_path(&root).unwrap_or(root)
}

fn load_context(
	args: &AmalgamCli,
	source: &SourceArgs,
	output: Option<&Path>,
) -> CliResult<ProjectContext> {
	let root = resolve_root(args);
	let variables = source
		.vars
		.iter()
		.map(|assignment| VariableMap::parse_assignment(assignment))
		.collect::<Result<Vec<_>, _>>()?;

	let options = RunOptions {
		input: source.input.clone(),
		output: output.map(Path::to_path_buf),
		variables,
	};
	let ctx = load_project(&root, &options)?;

	tracing::debug!(
		root = %ctx.root.display(),
		config = ?ctx.config_path,
		input = %ctx.input.display(),
		variables = ?ctx.variables.sorted_names(),
		"loaded project"
	);

	Ok(ctx)
}

fn run_init(args: &AmalgamCli) -> CliResult<()> {
	let root = resolve_root(args);

	if let Some(existing) = AmalgamConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("amalgam.toml");
	let sample_config = "# amalgam configuration\n\n# Root file containing `#include \"path\"` \
	                     lines.\ninput = \"src/main.h\"\n\n# Where the single amalgamated file \
	                     is written.\noutput = \"include/main.h\"\n\n# Provides ${NAME}, \
	                     ${VERSION} and ${DESCRIPTION}.\n# metadata = \"package.json\"\n\n# \
	                     Extra variables, available as ${KEY}.\n# [variables]\n# LICENSE = \
	                     \"MIT\"\n";

	std::fs::write(&config_path, sample_config)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Point `input` at your root source file");
	println!("  2. Add include lines to it:");
	println!("     #include \"detail/part.h\"");
	println!("  3. Run `amalgam build` to write the output");

	Ok(())
}

fn run_build(
	args: &AmalgamCli,
	source: &SourceArgs,
	output: Option<&Path>,
	dry_run: bool,
	watch: bool,
) -> CliResult<()> {
	// Run the initial build.
	let ctx = load_context(args, source, output)?;
	build_once(&ctx, dry_run)?;

	if !watch || dry_run {
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = ctx.root.clone();
	let destination = absolute_path(ctx.output()?)?;
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if should_rebuild(&event, &destination) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, rebuilding...");
		let rebuilt = load_context(args, source, output).and_then(|ctx| build_once(&ctx, false));
		if let Err(e) = rebuilt {
			report_error(e);
		}
	}
}

fn build_once(ctx: &ProjectContext, dry_run: bool) -> CliResult<()> {
	if dry_run {
		let amalgamation = ctx.amalgamate()?;
		print_unresolved_warnings(&amalgamation, &ctx.root);
		print!("{}", amalgamation.text);
		return Ok(());
	}

	let amalgamation = ctx.build()?;
	print_unresolved_warnings(&amalgamation, &ctx.root);

	println!(
		"Wrote {} ({} file(s) inlined).",
		make_relative(ctx.output()?, &ctx.root),
		amalgamation.sources.len()
	);

	Ok(())
}

fn run_check(
	args: &AmalgamCli,
	source: &SourceArgs,
	output: Option<&Path>,
	show_diff: bool,
) -> CliResult<()> {
	let ctx = load_context(args, source, output)?;
	let destination = ctx.output()?;
	let amalgamation = ctx.amalgamate()?;
	let rel = make_relative(destination, &ctx.root);

	print_unresolved_warnings(&amalgamation, &ctx.root);

	if is_up_to_date(destination, &amalgamation.text) {
		println!("Check passed: {rel} is up to date.");
		return Ok(());
	}

	match std::fs::read_to_string(destination) {
		Ok(current) => {
			eprintln!("Check failed: {rel} is out of date.");
			if show_diff {
				eprintln!();
				print_diff(&current, &amalgamation.text);
			}
		}
		Err(_) => {
			eprintln!("Check failed: {rel} does not exist.");
		}
	}

	eprintln!();
	eprintln!("Run `amalgam build` to fix.");
	process::exit(1);
}

fn run_list(args: &AmalgamCli, source: &SourceArgs, format: ListOutputFormat) -> CliResult<()> {
	let ctx = load_context(args, source, None)?;
	let amalgamation = ctx.amalgamate()?;

	match format {
		ListOutputFormat::Json => {
			let entries: Vec<serde_json::Value> = amalgamation
				.sources
				.iter()
				.map(|source| {
					serde_json::json!({
						"path": make_relative(&source.path, &ctx.root),
						"depth": source.depth,
						"included_from": source
							.included_from
							.as_ref()
							.map(|parent| make_relative(parent, &ctx.root)),
					})
				})
				.collect();
			println!("{}", serde_json::Value::Array(entries));
		}
		ListOutputFormat::Text => {
			for source in &amalgamation.sources {
				println!(
					"{}{}",
					"  ".repeat(source.depth),
					make_relative(&source.path, &ctx.root)
				);
			}
		}
	}

	Ok(())
}

fn print_unresolved_warnings(amalgamation: &Amalgamation, root: &Path) {
	let mut unresolved: Vec<_> = amalgamation.unresolved.iter().collect();
	unresolved.sort_by(|a, b| {
		make_relative(&a.file, root)
			.cmp(&make_relative(&b.file, root))
			.then_with(|| a.name.cmp(&b.name))
	});
	unresolved.dedup();

	for entry in unresolved {
		let rel = make_relative(&entry.file, root);
		eprintln!(
			"{} variable `{}` in {rel} is not defined and was left as is",
			colored!("warning:", yellow),
			entry.name,
		);
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
