use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use crate::FileSystem;
use crate::FilesSpec;
use crate::PARTIAL_BLOCK_TYPE;
use crate::PartialsConfig;
use crate::PartialsError;
use crate::PartialsResult;
use crate::files::build_matcher;
use crate::files::is_glob;

/// A [`FileSystem`] holding every file in memory, keyed by relative path.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
	files: RefCell<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
	pub fn with_files(entries: &[(&str, &str)]) -> Self {
		let files = entries
			.iter()
			.map(|(path, content)| (PathBuf::from(path), (*content).to_string()))
			.collect();
		Self {
			files: RefCell::new(files),
		}
	}

	pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
		self.files.borrow().get(path.as_ref()).cloned()
	}
}

impl FileSystem for MemoryFileSystem {
	fn expand(&self, spec: &FilesSpec) -> PartialsResult<Vec<PathBuf>> {
		let base = spec.options.cwd.clone().unwrap_or_default();
		let files = self.files.borrow();
		let mut matched: Vec<PathBuf> = Vec::new();

		for pattern in &spec.patterns {
			if let Some(negated) = pattern.strip_prefix('!') {
				let matcher = build_matcher(&base.join(negated).to_string_lossy())?;
				matched.retain(|path| !matcher.is_match(path));
				continue;
			}

			let full = base.join(pattern);
			if is_glob(pattern) {
				let matcher = build_matcher(&full.to_string_lossy())?;
				matched.extend(files.keys().filter(|path| matcher.is_match(path)).cloned());
			} else if files.contains_key(&full) {
				matched.push(full);
			}
		}

		Ok(matched)
	}

	fn read(&self, path: &Path) -> PartialsResult<String> {
		self.get(path).ok_or_else(|| {
			PartialsError::MissingPartial {
				path: path.display().to_string(),
			}
		})
	}

	fn write(&self, path: &Path, content: &str) -> PartialsResult<()> {
		self.files
			.borrow_mut()
			.insert(path.to_path_buf(), content.to_string());
		Ok(())
	}
}

/// Registration check for scans where only `partial` has a handler.
pub fn is_partial(block_type: &str) -> bool {
	block_type == PARTIAL_BLOCK_TYPE
}

/// Config resolving partials from the `partials` directory.
pub fn partials_config() -> PartialsConfig {
	PartialsConfig {
		partial_path: Some(PathBuf::from("partials")),
		..PartialsConfig::default()
	}
}

pub const HEADER_DOCUMENT: &str = "A\n<!-- build:partial header -->\nold\n<!-- /build -->\nB";

pub const TWO_BLOCK_DOCUMENT: &str = r#"<html>
<head>
  <!-- build:partial head -->
  <title>placeholder</title>
  <!-- /build -->
</head>
<body>
  <!-- build:partial optional banner -->
  <div class="banner"></div>
  <!-- /build -->
  <main>content</main>
</body>
</html>"#;

/// Write `content` to `root/path`, creating parent directories.
pub fn write_file(root: &Path, path: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(path);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}
