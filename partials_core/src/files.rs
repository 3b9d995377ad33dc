use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobMatcher;

use crate::PartialsError;
use crate::PartialsResult;

/// Options applied while expanding a [`FilesSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandOptions {
	/// Directory the patterns are relative to. Relative values are resolved
	/// against the file system root.
	pub cwd: Option<PathBuf>,
}

/// A list of file patterns together with the options used to expand them.
///
/// Patterns are plain paths or globs. A pattern starting with `!` removes
/// previously matched paths that match the rest of the pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesSpec {
	pub options: ExpandOptions,
	pub patterns: Vec<String>,
}

impl FilesSpec {
	/// A spec with a single pattern and default options.
	pub fn single(pattern: impl Into<String>) -> Self {
		Self {
			options: ExpandOptions::default(),
			patterns: vec![pattern.into()],
		}
	}
}

/// File access needed by the engine: pattern expansion, reads and writes.
pub trait FileSystem {
	/// Expand `spec` into an ordered list of existing files.
	fn expand(&self, spec: &FilesSpec) -> PartialsResult<Vec<PathBuf>>;

	/// Read `path` as text. A missing file is
	/// [`PartialsError::MissingPartial`].
	fn read(&self, path: &Path) -> PartialsResult<String>;

	/// Write `content` to `path`, creating parent directories as needed.
	fn write(&self, path: &Path, content: &str) -> PartialsResult<()>;
}

/// A [`FileSystem`] backed by the real disk, resolving relative paths
/// against `root`.
#[derive(Debug, Clone)]
pub struct DiskFileSystem {
	root: PathBuf,
}

impl DiskFileSystem {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn base_dir(&self, options: &ExpandOptions) -> PathBuf {
		match &options.cwd {
			Some(cwd) => self.root.join(cwd),
			None => self.root.clone(),
		}
	}
}

impl FileSystem for DiskFileSystem {
	fn expand(&self, spec: &FilesSpec) -> PartialsResult<Vec<PathBuf>> {
		let base = self.base_dir(&spec.options);
		let mut matched: Vec<PathBuf> = Vec::new();

		for pattern in &spec.patterns {
			let pattern = pattern.trim_start_matches("./");
			if let Some(negated) = pattern.strip_prefix('!') {
				let negated = negated.trim_start_matches("./");
				let matcher = build_matcher(negated)?;
				let absolute = Path::new(negated).is_absolute();
				matched.retain(|path| !glob_matches(&matcher, &base, path, absolute));
				continue;
			}

			if !is_glob(pattern) {
				let path = base.join(pattern);
				if path.is_file() {
					matched.push(path);
				}
				continue;
			}

			let matcher = build_matcher(pattern)?;
			let prefix = literal_prefix(pattern);
			let walk_root = base.join(&prefix);
			let mut found = Vec::new();
			let mut visited = HashSet::new();
			let walker = Walker {
				base: &base,
				matcher: &matcher,
				absolute: Path::new(pattern).is_absolute(),
			};
			walker.collect(&walk_root, walk_depth(pattern, &prefix), &mut found, &mut visited)?;
			found.sort();
			matched.extend(found);
		}

		let mut seen = HashSet::new();
		matched.retain(|path| seen.insert(path.clone()));

		Ok(matched
			.into_iter()
			.map(|path| {
				match path.strip_prefix(&self.root) {
					Ok(rel) => rel.to_path_buf(),
					Err(_) => path,
				}
			})
			.collect())
	}

	fn read(&self, path: &Path) -> PartialsResult<String> {
		let path = self.root.join(path);
		std::fs::read_to_string(&path).map_err(|e| {
			if e.kind() == ErrorKind::NotFound {
				PartialsError::MissingPartial {
					path: path.display().to_string(),
				}
			} else {
				PartialsError::Io(e)
			}
		})
	}

	fn write(&self, path: &Path, content: &str) -> PartialsResult<()> {
		let path = self.root.join(path);
		let to_error = |e: std::io::Error| {
			PartialsError::DestinationWrite {
				path: path.display().to_string(),
				reason: e.to_string(),
			}
		};

		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent).map_err(to_error)?;
		}
		std::fs::write(&path, content).map_err(to_error)
	}
}

/// Returns true if `pattern` contains glob metacharacters.
pub fn is_glob(pattern: &str) -> bool {
	pattern.contains(['*', '?', '[', '{'])
}

/// Compile a glob where `*` and `?` never cross a path separator.
pub(crate) fn build_matcher(pattern: &str) -> PartialsResult<GlobMatcher> {
	let glob = GlobBuilder::new(pattern)
		.literal_separator(true)
		.build()
		.map_err(|e| {
			PartialsError::InvalidGlob {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			}
		})?;
	Ok(glob.compile_matcher())
}

/// The leading directories of `pattern` that contain no glob
/// metacharacters. Walking starts there instead of at the base directory.
fn literal_prefix(pattern: &str) -> PathBuf {
	let mut prefix = PathBuf::new();
	let components: Vec<Component<'_>> = Path::new(pattern).components().collect();

	// The final component is the file name and is never a directory to walk.
	for component in components.iter().take(components.len().saturating_sub(1)) {
		let Component::Normal(part) = component else {
			prefix.push(component);
			continue;
		};
		if part.to_str().is_none_or(is_glob) {
			break;
		}
		prefix.push(part);
	}

	prefix
}

/// How many directory levels below `prefix` a walk for `pattern` can match:
/// `None` (unbounded) when the pattern contains `**`, otherwise the number of
/// components after the literal prefix. `src/*.html` only needs the entries of
/// `src`, so its subdirectories are never read.
pub(crate) fn walk_depth(pattern: &str, prefix: &Path) -> Option<usize> {
	if pattern.contains("**") {
		return None;
	}

	let total = Path::new(pattern).components().count();
	Some(total.saturating_sub(prefix.components().count()))
}

/// Match `path` against a glob written either relative to `base` or as an
/// absolute path.
fn glob_matches(matcher: &GlobMatcher, base: &Path, path: &Path, absolute: bool) -> bool {
	if absolute {
		matcher.is_match(path)
	} else {
		path.strip_prefix(base)
			.is_ok_and(|rel| matcher.is_match(rel))
	}
}

struct Walker<'a> {
	base: &'a Path,
	matcher: &'a GlobMatcher,
	absolute: bool,
}

impl Walker<'_> {
	/// Collect matching files below `dir`, descending at most `depth` levels
	/// (`None` for no limit).
	fn collect(
		&self,
		dir: &Path,
		depth: Option<usize>,
		found: &mut Vec<PathBuf>,
		visited: &mut HashSet<PathBuf>,
	) -> PartialsResult<()> {
		if depth == Some(0) || !dir.is_dir() {
			return Ok(());
		}

		// Symlinked directories are followed once.
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !visited.insert(canonical) {
			return Ok(());
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();

			if path.is_dir() {
				self.collect(&path, depth.map(|depth| depth - 1), found, visited)?;
			} else if glob_matches(self.matcher, self.base, &path, self.absolute) {
				found.push(path);
			}
		}

		Ok(())
	}
}
