use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use partials_cli::Commands;
use partials_cli::OutputFormat;
use partials_cli::PartialsCli;
use partials_core::BlockStatus;
use partials_core::CONFIG_FILE_CANDIDATES;
use partials_core::DiskFileSystem;
use partials_core::Engine;
use partials_core::FileSystem;
use partials_core::PartialsConfig;
use partials_core::PartialsError;
use partials_core::RunMode;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `PARTIALS_LOG=debug`.
const LOG_ENV: &str = "PARTIALS_LOG";

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
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = PartialsCli::parse();

	// Respect NO_COLOR env var, --no-color flag and terminal support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

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

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Build { dry_run }) => run_build(&args, *dry_run),
		None => run_build(&args, false),
		Some(Commands::Check { diff }) => {
			match run_check(&args, *diff) {
				Ok(true) => process::exit(1),
				Ok(false) => Ok(()),
				Err(e) => Err(e),
			}
		}
		Some(Commands::List { format }) => run_list(&args, *format),
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<PartialsError>() {
			Ok(partials_err) => {
				let report: miette::Report = (*partials_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `PARTIALS_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

fn resolve_root(args: &PartialsCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the config at the project root, apply the command line overrides
/// and create an engine reading from disk.
fn load_engine(args: &PartialsCli) -> Result<Engine<DiskFileSystem>, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config_path = PartialsConfig::resolve_path(&root);
	let mut config = PartialsConfig::load(&root)?.unwrap_or_default();
	args.apply_overrides(&mut config);

	match &config_path {
		Some(path) => tracing::debug!(path = %path.display(), "using config file"),
		None => tracing::debug!(root = %root.display(), "no config file found, using defaults"),
	}

	Ok(Engine::new(config, DiskFileSystem::new(root))?)
}

fn run_init(args: &PartialsCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	if let Some(existing) = PartialsConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
	} else {
		let sample_config = "# partials configuration\n\n# Directory holding partial files. A \
		                     block named `header` resolves to\n# partials/_header.html.\npartial_path \
		                     = \"partials\"\n\n# Keyword used in block markers: <!-- build:partial \
		                     header -->.\n# parse_tag = \"build\"\n\n# Log optional blocks that \
		                     are deleted because no partial exists.\n# log_optionals = true\n\n# \
		                     Explicit sources for named blocks, overriding partial_path.\n# \
		                     [sections]\n# scripts = [\"js/_analytics.html\", \
		                     \"js/_chat.html\"]\n\n[[files]]\nsrc = [\"src/*.html\"]\ndest = \
		                     \"dist\"\n";

		std::fs::write(root.join(CONFIG_FILE_CANDIDATES[0]), sample_config)?;
		println!("Created {}", CONFIG_FILE_CANDIDATES[0]);
	}

	let partial_path = root.join("partials/_header.html");
	if partial_path.exists() {
		println!("Partial file already exists: {}", partial_path.display());
		return Ok(());
	}

	std::fs::create_dir_all(root.join("partials"))?;
	std::fs::write(&partial_path, "<header>Hello from partials!</header>\n")?;
	println!("Created partial file: {}", partial_path.display());

	println!();
	println!("Next steps:");
	println!("  1. Add blocks to the documents in src/:");
	println!("     <!-- build:partial header -->");
	println!("     <!-- /build -->");
	println!("  2. Run `partials build` to write them to dist/");

	Ok(())
}

fn run_build(args: &PartialsCli, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
	let engine = load_engine(args)?;
	let root = engine.files().root();
	let mode = if dry_run {
		RunMode::DryRun
	} else {
		RunMode::Write
	};
	let result = engine.run(mode)?;

	if result.documents.is_empty() {
		println!("No source documents matched.");
		return Ok(());
	}

	if dry_run {
		println!(
			"Dry run: would write {} file(s):",
			result.documents.len()
		);
		for doc in &result.documents {
			println!(
				"  {} -> {}",
				make_relative(&doc.source, root),
				make_relative(&doc.destination, root)
			);
		}
		return Ok(());
	}

	for doc in &result.documents {
		println!(
			"File {} created.",
			colored!(make_relative(&doc.destination, root), green)
		);

		if args.verbose {
			for deleted in &doc.deleted {
				println!(
					"  deleted optional block {}:{} on line {}",
					deleted.r#type, deleted.name, deleted.line
				);
			}
		}
	}

	println!(
		"Replaced {} block(s) in {} file(s).",
		result.replaced_count(),
		result.documents.len()
	);

	Ok(())
}

/// Returns `Ok(true)` when at least one destination is stale.
fn run_check(args: &PartialsCli, show_diff: bool) -> Result<bool, Box<dyn std::error::Error>> {
	let engine = load_engine(args)?;
	let root = engine.files().root();
	let result = engine.check()?;

	if result.is_ok() {
		println!(
			"Check passed: all {} destination(s) are up to date.",
			result.checked
		);
		return Ok(false);
	}

	eprintln!("Check failed.");
	eprintln!();
	eprintln!("Stale destinations:");
	for entry in &result.stale {
		let destination = make_relative(&entry.destination, root);
		let source = make_relative(&entry.source, root);
		let state = if entry.current_content.is_some() {
			colored!("stale", yellow)
		} else {
			colored!("missing", red)
		};
		eprintln!("  {destination} from {source} [{state}]");

		if show_diff {
			let current = entry.current_content.as_deref().unwrap_or_default();
			print_diff(current, &entry.expected_content);
		}
	}

	eprintln!();
	eprintln!(
		"{} of {} destination(s) are out of date. Run `partials build` to update them.",
		result.stale.len(),
		result.checked
	);

	Ok(true)
}

fn run_list(args: &PartialsCli, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let engine = load_engine(args)?;
	let root = engine.files().root();
	let jobs = engine.plan()?;

	let mut documents = Vec::with_capacity(jobs.len());
	for job in jobs {
		let content = engine.files().read(&job.source)?;
		let reports = engine.inspect(&content)?;
		documents.push((job, reports));
	}

	if let OutputFormat::Json = format {
		let entries: Vec<serde_json::Value> = documents
			.iter()
			.map(|(job, reports)| {
				serde_json::json!({
					"source": make_relative(&job.source, root),
					"destination": make_relative(&job.destination, root),
					"blocks": reports,
				})
			})
			.collect();
		println!("{}", serde_json::Value::Array(entries));
		return Ok(());
	}

	let mut block_count = 0;
	for (job, reports) in &documents {
		println!(
			"{} -> {}",
			colored!(make_relative(&job.source, root), bold),
			make_relative(&job.destination, root)
		);

		for report in reports {
			let (status, sources) = status_parts(&report.status);
			let status = match report.status {
				BlockStatus::Resolved(_) => colored!(status, green),
				BlockStatus::Deleted => colored!(status, yellow),
				_ => colored!(status, red),
			};
			let sources = if sources.is_empty() {
				String::new()
			} else {
				format!(" {}", sources.join(", "))
			};
			println!(
				"  {}:{} line {} [{status}]{sources}",
				report.block.r#type, report.block.name, report.block.position.start.line
			);
		}

		block_count += reports.len();
	}

	println!(
		"\n{block_count} block(s) in {} document(s)",
		documents.len()
	);

	Ok(())
}

/// A short status label and the resolved source paths.
fn status_parts(status: &BlockStatus) -> (&'static str, Vec<String>) {
	match status {
		BlockStatus::Resolved(files) => {
			let sources = files.iter().map(|path| path.display().to_string()).collect();
			("resolved", sources)
		}
		BlockStatus::Deleted => ("deleted", Vec::new()),
		BlockStatus::Unconfigured => ("unconfigured", Vec::new()),
		BlockStatus::Unregistered => ("unregistered", Vec::new()),
		_ => ("unknown", Vec::new()),
	}
}

/// Print a unified diff between two strings, colorized.
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
	if !expected.ends_with('\n') {
		eprintln!();
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
