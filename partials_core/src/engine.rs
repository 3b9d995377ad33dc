use std::ops::Range;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::Block;
use crate::BlockHandler;
use crate::FileSystem;
use crate::HandlerRegistry;
use crate::MarkerPattern;
use crate::PartialsConfig;
use crate::PartialsError;
use crate::PartialsResult;
use crate::ResolvedBlock;
use crate::normalize_line_endings;
use crate::scan;

/// An optional block that was removed because nothing is configured for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedBlock {
	pub r#type: String,
	pub name: String,
	/// 1-indexed line of the block's start marker.
	pub line: usize,
}

/// Result of rewriting a single document.
#[derive(Debug, Clone)]
pub struct RewriteResult {
	/// The normalized document with every block substituted.
	pub content: String,
	/// Number of blocks replaced with resolved content.
	pub replaced: usize,
	/// Optional blocks that were deleted.
	pub deleted: Vec<DeletedBlock>,
}

/// How a block would be handled by [`Engine::rewrite`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "sources", rename_all = "lowercase")]
#[non_exhaustive]
pub enum BlockStatus {
	/// The block resolves to these sources.
	Resolved(Vec<PathBuf>),
	/// Nothing is configured but the block is optional, so it is deleted.
	Deleted,
	/// Nothing is configured and the block is required.
	Unconfigured,
	/// No handler is registered for the block type.
	Unregistered,
}

/// A scanned block and how it resolves. Serializes as the block's fields
/// followed by `status` and, for resolved blocks, `sources`.
#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
	#[serde(flatten)]
	pub block: Block,
	#[serde(flatten)]
	pub status: BlockStatus,
}

/// Scans documents for blocks and substitutes them using the registered
/// handlers.
///
/// The marker pattern is compiled once from the configured parse tag when
/// the engine is created and shared by every document it processes.
#[derive(Debug)]
pub struct Engine<F> {
	config: PartialsConfig,
	pattern: MarkerPattern,
	registry: HandlerRegistry,
	files: F,
}

impl<F: FileSystem> Engine<F> {
	/// Create an engine with the default handlers.
	pub fn new(config: PartialsConfig, files: F) -> PartialsResult<Self> {
		let pattern = config.marker_pattern()?;
		Ok(Self {
			config,
			pattern,
			registry: HandlerRegistry::default(),
			files,
		})
	}

	/// Replace the handler registry.
	#[must_use]
	pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
		self.registry = registry;
		self
	}

	pub fn config(&self) -> &PartialsConfig {
		&self.config
	}

	pub fn pattern(&self) -> &MarkerPattern {
		&self.pattern
	}

	pub fn files(&self) -> &F {
		&self.files
	}

	/// Normalize `content` and scan it into blocks.
	pub fn scan(&self, content: &str) -> PartialsResult<Vec<Block>> {
		scan(
			&normalize_line_endings(content),
			&self.pattern,
			self.config.scan_mode(),
			|block_type| self.registry.contains(block_type),
		)
	}

	/// Run the validator registered for the block's type. Returns `None` when
	/// the block is not configured or resolves to no sources.
	pub fn resolve(&self, block: &Block) -> PartialsResult<Option<Vec<PathBuf>>> {
		let handler = self.registry.get(&block.r#type)?;
		self.resolve_with(handler, block)
	}

	/// Report how each block in `content` resolves without rendering it.
	pub fn inspect(&self, content: &str) -> PartialsResult<Vec<BlockReport>> {
		let blocks = self.scan(content)?;
		let mut reports = Vec::with_capacity(blocks.len());

		for block in blocks {
			let status = match self.registry.get(&block.r#type) {
				Err(_) => BlockStatus::Unregistered,
				Ok(handler) => {
					match self.resolve_with(handler, &block)? {
						Some(files) => BlockStatus::Resolved(files),
						None if block.optional => BlockStatus::Deleted,
						None => BlockStatus::Unconfigured,
					}
				}
			};
			reports.push(BlockReport { block, status });
		}

		Ok(reports)
	}

	/// Substitute every block in `content`.
	///
	/// Blocks are validated and processed in document order. A required block
	/// without sources aborts with [`PartialsError::UnconfiguredBlock`] and an
	/// optional one is deleted. Each block's span is replaced by position, so
	/// text outside the blocks is left untouched.
	pub fn rewrite(&self, content: &str, dest: Option<&Path>) -> PartialsResult<RewriteResult> {
		let content = normalize_line_endings(content);
		let blocks = scan(
			&content,
			&self.pattern,
			self.config.scan_mode(),
			|block_type| self.registry.contains(block_type),
		)?;
		let mut replacements: Vec<(Range<usize>, String)> = Vec::with_capacity(blocks.len());
		let mut deleted = Vec::new();
		let mut replaced = 0;

		for block in &blocks {
			let handler = self.registry.get(&block.r#type)?;

			let replacement = match self.resolve_with(handler, block)? {
				Some(files) => {
					let resolved = ResolvedBlock {
						block,
						files,
						data: &self.config.data,
						dest,
						prefix: &self.config.prefix,
					};
					replaced += 1;
					handler.process(&resolved, &self.files)?
				}
				None if block.optional => {
					if self.config.log_optionals {
						tracing::warn!(
							"block with type `{}` and name `{}` is not configured but is optional, \
							 deleting block",
							block.r#type,
							block.name
						);
					}
					deleted.push(DeletedBlock {
						r#type: block.r#type.clone(),
						name: block.name.clone(),
						line: block.position.start.line,
					});
					String::new()
				}
				None => {
					return Err(PartialsError::UnconfiguredBlock {
						kind: block.r#type.clone(),
						name: block.name.clone(),
					});
				}
			};

			replacements.push((block.position.range(), replacement));
		}

		// Splice from the last block to the first so earlier offsets stay valid.
		let mut result = content;
		for (range, replacement) in replacements.iter().rev() {
			result.replace_range(range.clone(), replacement);
		}

		Ok(RewriteResult {
			content: result,
			replaced,
			deleted,
		})
	}

	fn resolve_with(
		&self,
		handler: &dyn BlockHandler,
		block: &Block,
	) -> PartialsResult<Option<Vec<PathBuf>>> {
		let files = handler.validate(block, &self.config, &self.files)?;
		let files = files.filter(|files| !files.is_empty());

		tracing::debug!(
			block_type = %block.r#type,
			name = %block.name,
			sources = files.as_ref().map_or(0, Vec::len),
			"validated block"
		);

		Ok(files)
	}
}
