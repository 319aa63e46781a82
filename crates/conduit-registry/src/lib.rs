pub mod compiler;
pub mod java;
pub mod palette;
pub mod remap;
pub mod resource;
pub mod state;

// Re-export commonly used items
pub use compiler::BlockMappings;
pub use java::JavaBlockRegistry;
pub use remap::{BedrockVersion, SUPPORTED_VERSIONS};
pub use resource::ResourceProvider;

use arc_swap::ArcSwap;
use conduit_common::Result;
use conduit_logger::log::log;
use conduit_logger::severity::LogSeverity::Info;
use state::StateInterner;
use std::collections::HashMap;
use std::sync::Arc;

/// Every registry the translation layer consults: the version-independent
/// Java side plus one mapping table per supported Bedrock protocol. Compiled
/// once, immutable afterwards; sessions read it without locking.
#[derive(Debug, PartialEq)]
pub struct BlockRegistries {
    pub java: JavaBlockRegistry,
    mappings: HashMap<i32, BlockMappings>,
}

impl BlockRegistries {
    /// Compiles all registries from the provider's documents. Fails fast on
    /// the first malformed document, unresolved state, duplicate palette
    /// entry or missing distinguished block; on failure nothing is published.
    pub fn compile(provider: &dyn ResourceProvider) -> Result<Self> {
        let java = java::load_java_blocks(provider)?;
        log(format!("Loaded {} Java block states", java.len()), Info);

        // One interner across versions: the same state sets recur in every
        // palette, so cross-version sharing bounds steady-state memory
        let mut interner = StateInterner::default();
        let mut mappings = HashMap::with_capacity(SUPPORTED_VERSIONS.len());
        for version in SUPPORTED_VERSIONS {
            let palette = palette::load_bedrock_palette(provider, version, &mut interner)?;
            let table = compiler::compile_block_mappings(&java, palette, version, &mut interner)?;
            log(
                format!(
                    "Compiled block mappings for Bedrock {} ({} palette entries)",
                    version.palette_tag,
                    table.bedrock_runtime.len()
                ),
                Info,
            );
            mappings.insert(version.protocol, table);
        }

        Ok(BlockRegistries { java, mappings })
    }

    pub fn mappings(&self, protocol: i32) -> Option<&BlockMappings> {
        self.mappings.get(&protocol)
    }

    pub fn supported_protocols(&self) -> impl Iterator<Item = i32> + '_ {
        self.mappings.keys().copied()
    }
}

/// The published registry set. Readers load a consistent snapshot without
/// locking; a reload swaps the whole set at once, so no reader ever observes
/// a mix of old and new tables.
pub struct SharedRegistries {
    snap: ArcSwap<BlockRegistries>,
}

impl SharedRegistries {
    pub fn new(registries: BlockRegistries) -> Self {
        SharedRegistries {
            snap: ArcSwap::from_pointee(registries),
        }
    }

    pub fn compile(provider: &dyn ResourceProvider) -> Result<Self> {
        Ok(Self::new(BlockRegistries::compile(provider)?))
    }

    pub fn load(&self) -> Arc<BlockRegistries> {
        self.snap.load_full()
    }

    /// Recompiles from the provider and atomically replaces the published
    /// set. On failure the previous set stays published untouched.
    pub fn reload(&self, provider: &dyn ResourceProvider) -> Result<()> {
        let rebuilt = BlockRegistries::compile(provider)?;
        self.snap.store(Arc::new(rebuilt));
        Ok(())
    }
}
