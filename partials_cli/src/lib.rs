use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use partials_core::PartialsConfig;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Stitch named html partials into static documents before publishing.",
	long_about = "partials replaces marker-delimited blocks in html documents with the contents \
	              of partial files.\n\nA block opened by `<!-- build:partial header -->` and \
	              closed by `<!-- /build -->` is replaced by `<partial_path>/_header.html`. Blocks \
	              marked `optional` are deleted when no partial exists.\n\nQuick start:\n  \
	              partials init    Create a sample partials.toml\n  partials build   Write every \
	              configured document\n  partials check   Verify the outputs are up to date\n  \
	              partials list    Show every block and how it resolves"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct PartialsCli {
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

	/// Override the marker keyword, e.g. `include` for
	/// `<!-- include:partial header -->`.
	#[arg(long, global = true)]
	pub parse_tag: Option<String>,

	/// Overwrite each source document instead of writing to its destination.
	#[arg(long, global = true, default_value_t = false)]
	pub replace: bool,

	/// Fail on blocks without a closing marker instead of skipping them.
	#[arg(long, global = true, default_value_t = false)]
	pub strict: bool,

	/// Log optional blocks that are deleted because they are not configured.
	#[arg(long, global = true, default_value_t = false)]
	pub log_optionals: bool,
}

impl PartialsCli {
	/// Apply the command line overrides on top of the loaded config.
	pub fn apply_overrides(&self, config: &mut PartialsConfig) {
		if let Some(parse_tag) = &self.parse_tag {
			config.parse_tag.clone_from(parse_tag);
		}

		config.replace |= self.replace;
		config.strict |= self.strict;
		config.log_optionals |= self.log_optionals;
	}
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize partials in a project by creating a sample config.
	///
	/// Creates a `partials.toml` file and a sample `partials/_header.html`
	/// partial in the project root. Existing files are left untouched.
	Init,
	/// Replace every block in the configured documents and write the output.
	///
	/// Each `[[files]]` entry maps source documents to a destination
	/// directory or file. Documents are processed in order and the first
	/// error stops the run. Outputs already written are kept.
	///
	/// This is the default command when none is given.
	Build {
		/// Render every document without writing anything. Prints the
		/// destinations that would be written.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// Check that every destination matches its freshly rendered output.
	///
	/// Exits with a non-zero status code if any destination is missing or
	/// stale. Ideal for CI pipelines.
	Check {
		/// Show a unified diff for each stale destination.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// List every block in the configured documents and how it resolves.
	List {
		/// Output format. Use `text` for human-readable output or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
