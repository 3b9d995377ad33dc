use regex::Regex;

use crate::PartialsError;
use crate::PartialsResult;

/// The marker keyword used when none is configured.
pub const DEFAULT_PARSE_TAG: &str = "build";

/// Flag that may precede the block name to mark the block optional.
pub const OPTIONAL_FLAG: &str = "optional";

/// Start and end marker matchers compiled for a single keyword.
///
/// The start matcher recognizes lines such as `<!-- build:partial header -->`
/// and the end matcher recognizes `<!-- /build -->`. Both embed the same
/// keyword; a new keyword means compiling a new `MarkerPattern`.
#[derive(Debug, Clone)]
pub struct MarkerPattern {
	keyword: String,
	start: Regex,
	end: Regex,
}

/// Captures extracted from a start marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartMarker {
	pub r#type: String,
	pub name: String,
	pub optional: bool,
}

impl MarkerPattern {
	/// Compile the marker matchers for `keyword`.
	///
	/// The keyword is escaped before it is embedded, so compiling the same
	/// keyword twice always yields equivalent matchers.
	pub fn compile(keyword: &str) -> PartialsResult<Self> {
		if keyword.is_empty() || keyword.chars().any(char::is_whitespace) {
			return Err(PartialsError::InvalidParseTag(keyword.to_string()));
		}

		let escaped = regex::escape(keyword);
		let invalid = |_| PartialsError::InvalidParseTag(keyword.to_string());
		let start = Regex::new(&format!(
			r"<!--\s*{escaped}:(\w+)\s*(?:({OPTIONAL_FLAG})\s+)?(\S*)\s*-->"
		))
		.map_err(invalid)?;
		let end = Regex::new(&format!(r"<!--\s*/{escaped}\s*-->")).map_err(invalid)?;

		Ok(Self {
			keyword: keyword.to_string(),
			start,
			end,
		})
	}

	pub fn keyword(&self) -> &str {
		&self.keyword
	}

	/// Match a start marker anywhere in `line`.
	///
	/// The `optional` flag only counts when a name follows it, so
	/// `<!-- build:partial optional -->` is a required block named `optional`.
	pub fn match_start(&self, line: &str) -> Option<StartMarker> {
		let captures = self.start.captures(line)?;
		let name = captures.get(3).map_or("", |m| m.as_str());
		let optional = captures.get(2).is_some();

		let (name, optional) = if optional && name.is_empty() {
			(OPTIONAL_FLAG, false)
		} else {
			(name, optional)
		};

		Some(StartMarker {
			r#type: captures[1].to_string(),
			name: name.to_string(),
			optional,
		})
	}

	/// Returns true if `line` contains an end marker.
	pub fn is_end(&self, line: &str) -> bool {
		self.end.is_match(line)
	}
}
