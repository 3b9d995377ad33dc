use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use crate::Block;
use crate::FileSystem;
use crate::LINE_SEPARATOR;
use crate::PartialsConfig;
use crate::PartialsError;
use crate::PartialsResult;

/// Type name of the built-in partial block.
pub const PARTIAL_BLOCK_TYPE: &str = "partial";

/// A block together with its resolved sources and the context available to
/// the handler that renders it.
#[derive(Debug, Clone)]
pub struct ResolvedBlock<'a> {
	pub block: &'a Block,
	/// Resolved content sources in order. Never empty.
	pub files: Vec<PathBuf>,
	pub data: &'a HashMap<String, serde_json::Value>,
	pub dest: Option<&'a Path>,
	pub prefix: &'a str,
}

/// Validation and rendering for one block type.
pub trait BlockHandler {
	/// Resolve the content sources for `block`. Returns `None` or an empty
	/// list when the block is not configured.
	fn validate(
		&self,
		block: &Block,
		config: &PartialsConfig,
		files: &dyn FileSystem,
	) -> PartialsResult<Option<Vec<PathBuf>>>;

	/// Produce the replacement text for a resolved block.
	fn process(&self, resolved: &ResolvedBlock<'_>, files: &dyn FileSystem)
	-> PartialsResult<String>;
}

/// Handler for `partial` blocks: each block name maps to partial files that
/// are read and joined in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialHandler;

impl BlockHandler for PartialHandler {
	fn validate(
		&self,
		block: &Block,
		config: &PartialsConfig,
		files: &dyn FileSystem,
	) -> PartialsResult<Option<Vec<PathBuf>>> {
		let Some(spec) = config.partial_spec(&block.name) else {
			return Ok(None);
		};

		files.expand(&spec).map(Some)
	}

	fn process(
		&self,
		resolved: &ResolvedBlock<'_>,
		files: &dyn FileSystem,
	) -> PartialsResult<String> {
		let contents = resolved
			.files
			.iter()
			.map(|path| files.read(path))
			.collect::<PartialsResult<Vec<_>>>()?;

		Ok(contents.join(LINE_SEPARATOR))
	}
}

/// Maps block type names to their handlers.
pub struct HandlerRegistry {
	handlers: BTreeMap<String, Box<dyn BlockHandler>>,
}

impl HandlerRegistry {
	/// A registry without any handlers.
	pub fn empty() -> Self {
		Self {
			handlers: BTreeMap::new(),
		}
	}

	/// Register `handler` for blocks of type `block_type`, replacing any
	/// previous handler for that type.
	pub fn register(
		&mut self,
		block_type: impl Into<String>,
		handler: impl BlockHandler + 'static,
	) -> &mut Self {
		self.handlers.insert(block_type.into(), Box::new(handler));
		self
	}

	/// Look up the handler for `block_type`.
	pub fn get(&self, block_type: &str) -> PartialsResult<&dyn BlockHandler> {
		self.handlers
			.get(block_type)
			.map(|handler| &**handler)
			.ok_or_else(|| PartialsError::UnregisteredBlockType(block_type.to_string()))
	}

	/// Returns true if a handler is registered for `block_type`.
	pub fn contains(&self, block_type: &str) -> bool {
		self.handlers.contains_key(block_type)
	}

	/// Registered block type names in sorted order.
	pub fn block_types(&self) -> impl Iterator<Item = &str> {
		self.handlers.keys().map(String::as_str)
	}
}

impl Default for HandlerRegistry {
	fn default() -> Self {
		let mut registry = Self::empty();
		registry.register(PARTIAL_BLOCK_TYPE, PartialHandler);
		registry
	}
}

impl std::fmt::Debug for HandlerRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HandlerRegistry")
			.field("block_types", &self.block_types().collect::<Vec<_>>())
			.finish()
	}
}
