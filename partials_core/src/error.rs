use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum PartialsError {
	#[error(transparent)]
	#[diagnostic(code(partials::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(partials::config_parse),
		help("check that partials.toml is valid TOML with `partial_path` and [[files]] entries")
	)]
	ConfigParse(String),

	#[error("invalid parse tag: `{0}`")]
	#[diagnostic(
		code(partials::invalid_parse_tag),
		help("the parse tag must be a non-empty word without whitespace, e.g. `build`")
	)]
	InvalidParseTag(String),

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(partials::invalid_glob))]
	InvalidGlob { pattern: String, reason: String },

	#[error("block with type `{kind}` and name `{name}` is not configured")]
	#[diagnostic(
		code(partials::unconfigured_block),
		help(
			"create the partial file for `{name}`, add a [sections] entry for it, or mark the \
			 block `optional`"
		)
	)]
	UnconfiguredBlock { kind: String, name: String },

	#[error("no handler registered for block type `{0}`")]
	#[diagnostic(
		code(partials::unregistered_block_type),
		help("the only built-in block type is `partial`")
	)]
	UnregisteredBlockType(String),

	#[error("partial file not found: `{path}`")]
	#[diagnostic(code(partials::missing_partial))]
	MissingPartial { path: String },

	#[error("block `{name}` opened on line {line} while another block is still open")]
	#[diagnostic(
		code(partials::nested_block),
		help("blocks cannot be nested; close the previous block before opening a new one")
	)]
	NestedBlock { name: String, line: usize },

	#[error("missing closing marker for block `{name}` opened on line {line}")]
	#[diagnostic(
		code(partials::unclosed_block),
		help("add a closing marker such as `<!-- /build -->` after the block")
	)]
	UnclosedBlock { name: String, line: usize },

	#[error("no [[files]] entries configured")]
	#[diagnostic(
		code(partials::missing_files),
		help("add a `[[files]]` table with `src` and `dest` to partials.toml")
	)]
	MissingFiles,

	#[error("failed to read source document `{path}`: {reason}")]
	#[diagnostic(code(partials::source_read))]
	SourceRead { path: String, reason: String },

	#[error("failed to write destination `{path}`: {reason}")]
	#[diagnostic(code(partials::destination_write))]
	DestinationWrite { path: String, reason: String },
}

pub type PartialsResult<T> = Result<T, PartialsError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
