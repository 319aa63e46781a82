use crate::remap::BedrockVersion;
use crate::resource::{block_palette_resource, ResourceProvider};
use crate::state::{BlockStateKey, StateInterner, StateMap, StateValue};
use conduit_common::{ConduitError, Result};
use conduit_nbt::{NbtFile, Tag};
use std::collections::HashMap;
use std::sync::Arc;

/// One entry of a Bedrock block palette. The runtime id is the entry's
/// position in the palette; Bedrock stopped sending palettes over the wire,
/// so order in the shipped blob is the protocol contract.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct BedrockBlockDefinition {
    pub runtime_id: u32,
    pub key: BlockStateKey,
}

/// A fully indexed Bedrock palette for one version.
#[derive(Debug)]
pub struct BedrockPalette {
    pub definitions: Vec<Arc<BedrockBlockDefinition>>,
    pub index: HashMap<BlockStateKey, Arc<BedrockBlockDefinition>>,
    pub state_version: i32,
}

fn malformed(resource: &str, message: impl ToString) -> ConduitError {
    ConduitError::MalformedResource {
        resource: resource.to_owned(),
        message: message.to_string(),
    }
}

/// Parses one version's gzip-compressed palette blob and indexes it by
/// canonical state key. Fields that are not part of block identity
/// (`name_hash`, `network_id`) are ignored. A key collision means the
/// palette itself is corrupt and aborts the load.
pub fn load_bedrock_palette(
    provider: &dyn ResourceProvider,
    version: &BedrockVersion,
    interner: &mut StateInterner,
) -> Result<BedrockPalette> {
    let resource = block_palette_resource(version.palette_tag);
    let mut reader = provider.open(&resource)?;
    let file = NbtFile::read_gzip(&mut reader)
        .map_err(|e| malformed(&resource, format!("unreadable palette: {}", e)))?;

    let root = file
        .root
        .as_compound()
        .ok_or_else(|| malformed(&resource, "root tag is not a compound"))?;
    let blocks = root
        .get("blocks")
        .and_then(Tag::as_list)
        .ok_or_else(|| malformed(&resource, "missing blocks list"))?;

    let mut definitions = Vec::with_capacity(blocks.len());
    let mut index: HashMap<BlockStateKey, Arc<BedrockBlockDefinition>> =
        HashMap::with_capacity(blocks.len());
    let mut state_version = -1;

    for (runtime_id, entry) in blocks.iter().enumerate() {
        let compound = entry
            .as_compound()
            .ok_or_else(|| malformed(&resource, "palette entry is not a compound"))?;
        let name = compound
            .get("name")
            .and_then(Tag::as_str)
            .ok_or_else(|| malformed(&resource, "palette entry without a name"))?;
        let entry_version = compound
            .get("version")
            .and_then(Tag::as_i32)
            .ok_or_else(|| malformed(&resource, format!("{} has no state version", name)))?;
        if state_version == -1 {
            state_version = entry_version;
        }

        let raw_states = compound
            .get("states")
            .and_then(Tag::as_compound)
            .ok_or_else(|| malformed(&resource, format!("{} has no states compound", name)))?;
        let mut states = StateMap::new();
        for (property, value) in raw_states {
            let value = StateValue::from_nbt(value).ok_or_else(|| {
                malformed(
                    &resource,
                    format!("unsupported state value for {} on {}", property, name),
                )
            })?;
            states.insert(property.clone(), value);
        }

        let key = BlockStateKey {
            name: name.to_owned(),
            version: entry_version,
            states: interner.intern(states),
        };
        if index.contains_key(&key) {
            return Err(ConduitError::DuplicateBlockState(key.to_string()));
        }

        let definition = Arc::new(BedrockBlockDefinition {
            runtime_id: runtime_id as u32,
            key: key.clone(),
        });
        index.insert(key, Arc::clone(&definition));
        definitions.push(definition);
    }

    Ok(BedrockPalette {
        definitions,
        index,
        state_version,
    })
}
