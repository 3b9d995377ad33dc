use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ExpandOptions;
use crate::FilesSpec;
use crate::MarkerPattern;
use crate::PartialsError;
use crate::PartialsResult;
use crate::ScanMode;
use crate::patterns::DEFAULT_PARSE_TAG;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"partials.toml",
	".partials.toml",
	".config/partials.toml",
];

/// Extension of partial files when none is configured.
pub const DEFAULT_EXTENSION: &str = "html";

/// One glob pattern or a list of them.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum Patterns {
	One(String),
	Many(Vec<String>),
}

impl Patterns {
	pub fn to_vec(&self) -> Vec<String> {
		match self {
			Self::One(pattern) => vec![pattern.clone()],
			Self::Many(patterns) => patterns.clone(),
		}
	}
}

impl Default for Patterns {
	fn default() -> Self {
		Self::Many(Vec::new())
	}
}

/// Source of a named section, overriding the derived partial path.
///
/// ```toml
/// [sections]
/// header = "shared/_header.html"
/// scripts = ["js/_analytics.html", "js/_chat.html"]
/// nav = { cwd = "site/partials", files = ["nav/*.html", "!nav/_draft.html"] }
/// ```
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum SectionSource {
	Patterns(Patterns),
	Expanded {
		#[serde(default)]
		cwd: Option<PathBuf>,
		files: Patterns,
	},
}

impl SectionSource {
	/// Split the section into expansion options and the patterns to expand.
	pub fn to_files_spec(&self) -> FilesSpec {
		match self {
			Self::Patterns(patterns) => {
				FilesSpec {
					options: ExpandOptions::default(),
					patterns: patterns.to_vec(),
				}
			}
			Self::Expanded { cwd, files } => {
				FilesSpec {
					options: ExpandOptions { cwd: cwd.clone() },
					patterns: files.to_vec(),
				}
			}
		}
	}
}

/// A set of source documents and where their output goes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileMapping {
	/// Glob patterns for the source documents, relative to the project root.
	pub src: Patterns,
	/// A destination file, or a directory receiving one file per source.
	#[serde(default)]
	pub dest: Option<PathBuf>,
}

/// Configuration loaded from a `partials.toml` file.
///
/// ```toml
/// parse_tag = "build"
/// partial_path = "src/partials"
/// log_optionals = true
///
/// [data]
/// title = "My site"
///
/// [[files]]
/// src = ["src/*.html"]
/// dest = "dist/"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PartialsConfig {
	/// Keyword embedded in the block markers, e.g. `build` in
	/// `<!-- build:partial header -->`.
	#[serde(alias = "parseTag")]
	pub parse_tag: String,
	/// Base directory for partial lookup. A block named `header` resolves to
	/// `<partial_path>/_header.<extension>`.
	#[serde(alias = "partialPath")]
	pub partial_path: Option<PathBuf>,
	/// Extension of partial files, without the leading dot.
	pub extension: String,
	/// Log optional blocks that are deleted because they are not configured.
	#[serde(alias = "logOptionals")]
	pub log_optionals: bool,
	/// Write output back to each source path instead of the destination.
	pub replace: bool,
	/// Prefix carried into every resolved block for custom handlers.
	pub prefix: String,
	/// Report blocks without a closing marker instead of skipping them.
	pub strict: bool,
	/// Values merged into every resolved block for custom handlers.
	pub data: HashMap<String, serde_json::Value>,
	/// Explicit sources for named blocks.
	pub sections: HashMap<String, SectionSource>,
	/// Source and destination mappings processed by the batch driver.
	pub files: Vec<FileMapping>,
}

impl Default for PartialsConfig {
	fn default() -> Self {
		Self {
			parse_tag: DEFAULT_PARSE_TAG.to_string(),
			partial_path: None,
			extension: DEFAULT_EXTENSION.to_string(),
			log_optionals: false,
			replace: false,
			prefix: String::new(),
			strict: false,
			data: HashMap::new(),
			sections: HashMap::new(),
			files: Vec::new(),
		}
	}
}

impl PartialsConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> PartialsResult<Option<PartialsConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::from_toml(&content).map(Some)
	}

	/// Parse a config from TOML text.
	pub fn from_toml(content: &str) -> PartialsResult<PartialsConfig> {
		toml::from_str(content).map_err(|e| PartialsError::ConfigParse(e.to_string()))
	}

	/// Compile the block markers for the configured parse tag.
	pub fn marker_pattern(&self) -> PartialsResult<MarkerPattern> {
		MarkerPattern::compile(&self.parse_tag)
	}

	pub fn scan_mode(&self) -> ScanMode {
		ScanMode::from_strict(self.strict)
	}

	/// The files spec for a named block: the `[sections]` entry when one
	/// exists, otherwise `<partial_path>/_<name>.<extension>`. Returns `None`
	/// when neither is configured.
	pub fn partial_spec(&self, name: &str) -> Option<FilesSpec> {
		if let Some(section) = self.sections.get(name) {
			return Some(section.to_files_spec());
		}

		let partial_path = self.partial_path.as_ref()?;
		let file = partial_path.join(format!("_{name}.{}", self.extension));
		Some(FilesSpec::single(file.to_string_lossy().replace('\\', "/")))
	}
}
