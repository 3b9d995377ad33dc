use std::path::Path;
use std::path::PathBuf;

use crate::DeletedBlock;
use crate::Engine;
use crate::FileSystem;
use crate::FilesSpec;
use crate::PartialsError;
use crate::PartialsResult;
use crate::normalize_line_endings;

/// A source document paired with the path its output is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentJob {
	pub source: PathBuf,
	pub destination: PathBuf,
	/// The `dest` of the file mapping this job came from.
	pub dest: Option<PathBuf>,
}

/// The rendered output of one source document.
#[derive(Debug, Clone)]
pub struct DocumentOutput {
	pub source: PathBuf,
	pub destination: PathBuf,
	pub content: String,
	/// Number of blocks replaced with partial content.
	pub replaced: usize,
	/// Optional blocks that were deleted.
	pub deleted: Vec<DeletedBlock>,
}

/// Result of running the whole batch.
#[derive(Debug, Default)]
pub struct BatchResult {
	/// Documents in the order they were processed.
	pub documents: Vec<DocumentOutput>,
}

impl BatchResult {
	/// Total number of blocks replaced across all documents.
	pub fn replaced_count(&self) -> usize {
		self.documents.iter().map(|doc| doc.replaced).sum()
	}
}

/// A destination whose content differs from the freshly rendered output.
#[derive(Debug)]
pub struct StaleDocument {
	pub source: PathBuf,
	pub destination: PathBuf,
	/// The current destination content, or `None` when it does not exist.
	pub current_content: Option<String>,
	pub expected_content: String,
}

/// Result of checking every destination in the batch.
#[derive(Debug, Default)]
pub struct CheckResult {
	/// Number of documents compared.
	pub checked: usize,
	pub stale: Vec<StaleDocument>,
}

impl CheckResult {
	/// Returns true if every destination is up to date.
	pub fn is_ok(&self) -> bool {
		self.stale.is_empty()
	}
}

/// Whether the batch writes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
	Write,
	DryRun,
}

/// Returns true if `dest` names a file rather than a directory: its final
/// extension has at least two word characters, e.g. `dist/index.html`.
pub fn is_file_destination(dest: &Path) -> bool {
	let dest = dest.to_string_lossy();
	dest.rsplit_once('.').is_some_and(|(_, extension)| {
		extension.chars().count() >= 2
			&& extension
				.chars()
				.all(|c| c.is_alphanumeric() || c == '_')
	})
}

/// Compute where the output of `source` is written.
///
/// With `replace` the source is overwritten. A file-like `dest` is used as
/// is; any other `dest` is a directory receiving the source's file name.
pub fn destination_for(source: &Path, dest: Option<&Path>, replace: bool) -> PathBuf {
	if replace {
		return source.to_path_buf();
	}

	let dest = dest.unwrap_or_else(|| Path::new(""));
	if is_file_destination(dest) {
		return dest.to_path_buf();
	}

	match source.file_name() {
		Some(name) => dest.join(name),
		None => dest.to_path_buf(),
	}
}

impl<F: FileSystem> Engine<F> {
	/// Expand the configured file mappings into source and destination
	/// pairs, in mapping order.
	pub fn plan(&self) -> PartialsResult<Vec<DocumentJob>> {
		let config = self.config();
		if config.files.is_empty() {
			return Err(PartialsError::MissingFiles);
		}

		let mut jobs = Vec::new();
		for mapping in &config.files {
			let spec = FilesSpec {
				patterns: mapping.src.to_vec(),
				..FilesSpec::default()
			};
			let sources = self.files().expand(&spec)?;

			if sources.is_empty() {
				tracing::warn!(patterns = ?spec.patterns, "no source documents matched");
			}

			for source in sources {
				let destination = destination_for(&source, mapping.dest.as_deref(), config.replace);
				jobs.push(DocumentJob {
					source,
					destination,
					dest: mapping.dest.clone(),
				});
			}
		}

		Ok(jobs)
	}

	/// Read and rewrite the source document of `job`.
	pub fn render_document(&self, job: &DocumentJob) -> PartialsResult<DocumentOutput> {
		let content = self.files().read(&job.source).map_err(|e| {
			PartialsError::SourceRead {
				path: job.source.display().to_string(),
				reason: e.to_string(),
			}
		})?;
		let result = self.rewrite(&content, job.dest.as_deref())?;

		Ok(DocumentOutput {
			source: job.source.clone(),
			destination: job.destination.clone(),
			content: result.content,
			replaced: result.replaced,
			deleted: result.deleted,
		})
	}

	/// Rewrite every planned document and, in [`RunMode::Write`], write each
	/// output before moving on to the next document. The first error aborts
	/// the batch; outputs written before it stay on disk.
	pub fn run(&self, mode: RunMode) -> PartialsResult<BatchResult> {
		let mut result = BatchResult::default();

		for job in self.plan()? {
			let output = self.render_document(&job)?;

			if mode == RunMode::Write {
				self.files().write(&output.destination, &output.content)?;
				tracing::info!(
					destination = %output.destination.display(),
					"file {} created",
					output.destination.display()
				);
			}

			result.documents.push(output);
		}

		Ok(result)
	}

	/// Compare every planned destination against its rendered output without
	/// writing anything. A missing destination is stale; any other read
	/// failure is returned.
	pub fn check(&self) -> PartialsResult<CheckResult> {
		let mut result = CheckResult::default();

		for job in self.plan()? {
			let output = self.render_document(&job)?;
			let current = match self.files().read(&output.destination) {
				Ok(content) => Some(normalize_line_endings(&content)),
				Err(PartialsError::MissingPartial { .. }) => None,
				Err(e) => return Err(e),
			};
			result.checked += 1;

			if current.as_deref() != Some(output.content.as_str()) {
				result.stale.push(StaleDocument {
					source: output.source,
					destination: output.destination,
					current_content: current,
					expected_content: output.content,
				});
			}
		}

		Ok(result)
	}
}
