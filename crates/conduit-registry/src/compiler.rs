use crate::java::{JavaBlockAttributes, JavaBlockRegistry};
use crate::palette::{BedrockBlockDefinition, BedrockPalette};
use crate::remap::{apply_rewrites, BedrockVersion};
use crate::state::{BlockStateKey, StateInterner};
use conduit_common::{ConduitError, Result};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Per-version Bedrock definitions other subsystems hardcode behavior around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BedrockSpecial {
    Air,
    Water,
    CommandBlock,
    MovingPiston,
}

static SPECIAL_ROLES: Lazy<HashMap<&'static str, BedrockSpecial>> = Lazy::new(|| {
    HashMap::from([
        ("minecraft:air", BedrockSpecial::Air),
        ("minecraft:water[level=0]", BedrockSpecial::Water),
        (
            "minecraft:command_block[conditional=false,facing=north]",
            BedrockSpecial::CommandBlock,
        ),
        (
            "minecraft:moving_piston[facing=north,type=normal]",
            BedrockSpecial::MovingPiston,
        ),
    ])
});

// Item frames exist as blocks only on Bedrock, so they are collected from the
// palette itself rather than from resolved Java states
const ITEM_FRAME_NAMES: &[&str] = &["minecraft:frame", "minecraft:glow_frame"];

/// The immutable mapping table for one Bedrock version. Built once, then read
/// concurrently without locking for the lifetime of the process.
#[derive(Debug, PartialEq)]
pub struct BlockMappings {
    pub protocol: i32,
    pub state_version: i32,
    /// Java runtime id to Bedrock definition, dense.
    pub java_to_bedrock: Vec<Arc<BedrockBlockDefinition>>,
    /// Every Bedrock definition in palette order.
    pub bedrock_runtime: Vec<Arc<BedrockBlockDefinition>>,
    pub air: Arc<BedrockBlockDefinition>,
    pub water: Arc<BedrockBlockDefinition>,
    pub command_block: Arc<BedrockBlockDefinition>,
    pub moving_piston: Arc<BedrockBlockDefinition>,
    pub jigsaws: HashSet<Arc<BedrockBlockDefinition>>,
    pub item_frames: HashMap<BlockStateKey, Arc<BedrockBlockDefinition>>,
    /// Pottable blocks keyed by clean Java identifier.
    pub flower_pots: HashMap<Arc<str>, Arc<BedrockBlockDefinition>>,
}

impl BlockMappings {
    pub fn bedrock_for_java(&self, java_runtime_id: u32) -> Option<&Arc<BedrockBlockDefinition>> {
        self.java_to_bedrock.get(java_runtime_id as usize)
    }

    pub fn definition(&self, bedrock_runtime_id: u32) -> Option<&Arc<BedrockBlockDefinition>> {
        self.bedrock_runtime.get(bedrock_runtime_id as usize)
    }

    pub fn is_item_frame(&self, key: &BlockStateKey) -> bool {
        self.item_frames.contains_key(key)
    }
}

/// Builds the canonical lookup key for one Java block state under one
/// Bedrock version: start from the recorded state overrides, let the
/// version's rewrite rules rename the identifier and consume states, then
/// stamp the palette's state-schema version.
fn build_state_key(
    attributes: &JavaBlockAttributes,
    version: &BedrockVersion,
    state_version: i32,
    interner: &mut StateInterner,
) -> BlockStateKey {
    let mut states = attributes.bedrock_states.clone();
    let name = apply_rewrites(version.rewrites, &attributes.bedrock_identifier, &mut states)
        .unwrap_or_else(|| attributes.bedrock_identifier.to_string());
    BlockStateKey {
        name,
        version: state_version,
        states: interner.intern(states),
    }
}

/// Resolves every Java block state against one version's palette and
/// assembles that version's mapping table. Any unresolved state, and any of
/// the four distinguished definitions going unfound, aborts the compilation;
/// no partial table is ever produced.
pub fn compile_block_mappings(
    java: &JavaBlockRegistry,
    palette: BedrockPalette,
    version: &BedrockVersion,
    interner: &mut StateInterner,
) -> Result<BlockMappings> {
    let mut java_to_bedrock = Vec::with_capacity(java.len());
    let mut air = None;
    let mut water = None;
    let mut command_block = None;
    let mut moving_piston = None;
    let mut jigsaws = HashSet::new();
    let mut flower_pots = HashMap::new();

    for attributes in java.attributes() {
        let key = build_state_key(attributes, version, palette.state_version, interner);
        let definition = palette.index.get(&key).ok_or_else(|| {
            ConduitError::UnresolvedMapping {
                java_identifier: attributes.java_identifier.to_string(),
                key: key.to_string(),
            }
        })?;

        match SPECIAL_ROLES.get(attributes.java_identifier.as_ref()) {
            Some(BedrockSpecial::Air) => air = Some(Arc::clone(definition)),
            Some(BedrockSpecial::Water) => water = Some(Arc::clone(definition)),
            Some(BedrockSpecial::CommandBlock) => command_block = Some(Arc::clone(definition)),
            Some(BedrockSpecial::MovingPiston) => moving_piston = Some(Arc::clone(definition)),
            None => {}
        }

        if attributes.java_identifier.contains("jigsaw") {
            jigsaws.insert(Arc::clone(definition));
        }
        if attributes.pottable {
            flower_pots.insert(
                Arc::clone(&attributes.clean_identifier),
                Arc::clone(definition),
            );
        }

        java_to_bedrock.push(Arc::clone(definition));
    }

    let missing = |what: &str| {
        ConduitError::MissingBlock(format!("{} in Bedrock {} palette", what, version.palette_tag))
    };
    let air = air.ok_or_else(|| missing("air"))?;
    let water = water.ok_or_else(|| missing("water"))?;
    let command_block = command_block.ok_or_else(|| missing("command block"))?;
    let moving_piston = moving_piston.ok_or_else(|| missing("moving piston"))?;

    // Item frames may have no Java counterpart, so scan the whole palette
    let mut item_frames = HashMap::new();
    for definition in &palette.definitions {
        if ITEM_FRAME_NAMES.contains(&definition.key.name.as_str()) {
            item_frames.insert(definition.key.clone(), Arc::clone(definition));
        }
    }

    Ok(BlockMappings {
        protocol: version.protocol,
        state_version: palette.state_version,
        java_to_bedrock,
        bedrock_runtime: palette.definitions,
        air,
        water,
        command_block,
        moving_piston,
        jigsaws,
        item_frames,
        flower_pots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::load_java_blocks;
    use crate::palette::load_bedrock_palette;
    use crate::resource::{
        block_palette_resource, MemoryResourceProvider, BLOCKS_RESOURCE, INTERACTIONS_RESOURCE,
    };
    use crate::state::StateValue;
    use assert_matches::assert_matches;
    use conduit_nbt::{NbtFile, Tag};
    use serde_json::json;

    const TEST_VERSION: BedrockVersion = BedrockVersion {
        palette_tag: "test",
        protocol: 999,
        rewrites: &[],
    };

    fn blocks_document() -> serde_json::Value {
        json!({
            "minecraft:air": { "bedrock_identifier": "minecraft:air" },
            "minecraft:water[level=0]": { "bedrock_identifier": "minecraft:water" },
            "minecraft:command_block[conditional=false,facing=north]": {
                "bedrock_identifier": "minecraft:command_block",
                "bedrock_states": { "conditional_bit": false, "facing_direction": 2 }
            },
            "minecraft:moving_piston[facing=north,type=normal]": {
                "bedrock_identifier": "minecraft:moving_block"
            },
            "minecraft:cobweb": { "bedrock_identifier": "minecraft:web" },
            "minecraft:furnace[facing=north,lit=false]": { "bedrock_identifier": "minecraft:furnace" },
            "minecraft:furnace[facing=north,lit=true]": { "bedrock_identifier": "minecraft:lit_furnace" },
            "minecraft:spawner": { "bedrock_identifier": "minecraft:mob_spawner" },
            "minecraft:honey_block": { "bedrock_identifier": "minecraft:honey_block" },
            "minecraft:slime_block": { "bedrock_identifier": "minecraft:slime" },
            "minecraft:jigsaw[orientation=north_up]": { "bedrock_identifier": "minecraft:jigsaw" },
            "minecraft:fern": { "bedrock_identifier": "minecraft:fern", "pottable": true }
        })
    }

    fn palette_entry(name: &str, states: &[(&str, Tag)]) -> Tag {
        let mut state_map = std::collections::HashMap::new();
        for (property, value) in states {
            state_map.insert((*property).to_owned(), value.clone());
        }
        let mut entry = std::collections::HashMap::new();
        entry.insert("name".to_owned(), Tag::String(name.to_owned()));
        entry.insert("version".to_owned(), Tag::Int(100));
        entry.insert("states".to_owned(), Tag::Compound(state_map));
        Tag::Compound(entry)
    }

    fn palette_entries() -> Vec<Tag> {
        vec![
            palette_entry("minecraft:air", &[]),
            palette_entry("minecraft:water", &[]),
            palette_entry(
                "minecraft:command_block",
                &[("conditional_bit", Tag::Byte(0)), ("facing_direction", Tag::Int(2))],
            ),
            palette_entry("minecraft:moving_block", &[]),
            palette_entry("minecraft:web", &[]),
            palette_entry("minecraft:furnace", &[]),
            palette_entry("minecraft:lit_furnace", &[]),
            palette_entry("minecraft:mob_spawner", &[]),
            palette_entry("minecraft:honey_block", &[]),
            palette_entry("minecraft:slime", &[]),
            palette_entry("minecraft:jigsaw", &[]),
            palette_entry("minecraft:fern", &[]),
            // Bedrock-only blocks, present in the palette but never resolved
            palette_entry("minecraft:frame", &[("facing_direction", Tag::Int(2))]),
            palette_entry("minecraft:glow_frame", &[("facing_direction", Tag::Int(2))]),
        ]
    }

    fn provider_with(blocks: serde_json::Value, entries: Vec<Tag>) -> MemoryResourceProvider {
        let mut provider = MemoryResourceProvider::new();
        provider.insert(BLOCKS_RESOURCE, serde_json::to_vec(&blocks).unwrap());
        provider.insert(
            INTERACTIONS_RESOURCE,
            serde_json::to_vec(&json!({ "always_consumes": [], "requires_may_build": [] }))
                .unwrap(),
        );
        let mut root = std::collections::HashMap::new();
        root.insert("blocks".to_owned(), Tag::List(entries));
        let file = NbtFile::new(String::new(), Tag::Compound(root));
        let mut bytes = Vec::new();
        file.write_gzip(&mut bytes).unwrap();
        provider.insert(block_palette_resource("test"), bytes);
        provider
    }

    fn compile(provider: &MemoryResourceProvider) -> Result<BlockMappings> {
        let java = load_java_blocks(provider)?;
        let mut interner = StateInterner::default();
        let palette = load_bedrock_palette(provider, &TEST_VERSION, &mut interner)?;
        compile_block_mappings(&java, palette, &TEST_VERSION, &mut interner)
    }

    #[test]
    fn test_every_java_state_resolves() {
        let provider = provider_with(blocks_document(), palette_entries());
        let mappings = compile(&provider).unwrap();

        assert_eq!(mappings.java_to_bedrock.len(), 12);
        assert_eq!(mappings.bedrock_runtime.len(), 14);
        assert_eq!(mappings.state_version, 100);

        // Overrides flow into the built key
        let command_block = mappings.bedrock_for_java(2).unwrap();
        assert_eq!(command_block.key.name, "minecraft:command_block");
        assert_eq!(
            command_block.key.states.get("facing_direction"),
            Some(&StateValue::Int(2))
        );
    }

    #[test]
    fn test_distinguished_definitions_are_captured() {
        let provider = provider_with(blocks_document(), palette_entries());
        let mappings = compile(&provider).unwrap();

        assert_eq!(mappings.air.key.name, "minecraft:air");
        assert_eq!(mappings.water.key.name, "minecraft:water");
        assert_eq!(mappings.command_block.key.name, "minecraft:command_block");
        assert_eq!(mappings.moving_piston.key.name, "minecraft:moving_block");
    }

    #[test]
    fn test_jigsaw_and_flower_pot_capture() {
        let provider = provider_with(blocks_document(), palette_entries());
        let mappings = compile(&provider).unwrap();

        assert_eq!(mappings.jigsaws.len(), 1);
        assert!(mappings
            .jigsaws
            .iter()
            .all(|d| d.key.name == "minecraft:jigsaw"));

        let fern = mappings.flower_pots.get("minecraft:fern").unwrap();
        assert_eq!(fern.key.name, "minecraft:fern");
        assert!(!mappings.flower_pots.contains_key("minecraft:air"));
    }

    #[test]
    fn test_item_frames_found_without_java_counterpart() {
        let provider = provider_with(blocks_document(), palette_entries());
        let mappings = compile(&provider).unwrap();

        assert_eq!(mappings.item_frames.len(), 2);
        let frame = mappings
            .item_frames
            .values()
            .find(|d| d.key.name == "minecraft:frame")
            .unwrap();
        assert!(mappings.is_item_frame(&frame.key));
    }

    #[test]
    fn test_unresolved_state_is_fatal_and_names_the_key() {
        let mut blocks = blocks_document();
        blocks.as_object_mut().unwrap().insert(
            "minecraft:sponge".to_owned(),
            json!({ "bedrock_identifier": "minecraft:sponge" }),
        );
        let provider = provider_with(blocks, palette_entries());

        let err = compile(&provider).unwrap_err();
        assert_matches!(
            err,
            ConduitError::UnresolvedMapping { java_identifier, key }
                if java_identifier == "minecraft:sponge" && key.contains("minecraft:sponge")
        );
    }

    #[test]
    fn test_missing_distinguished_definition_is_fatal() {
        let mut blocks = blocks_document();
        blocks
            .as_object_mut()
            .unwrap()
            .remove("minecraft:moving_piston[facing=north,type=normal]");
        let provider = provider_with(blocks, palette_entries());

        let err = compile(&provider).unwrap_err();
        assert_matches!(err, ConduitError::MissingBlock(what) if what.contains("moving piston"));
    }
}
