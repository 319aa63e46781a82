use crate::resource::{ResourceProvider, BLOCKS_RESOURCE, INTERACTIONS_RESOURCE};
use crate::state::{StateMap, StateValue};
use conduit_common::{clean_identifier, ConduitError, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// How a block reacts to being pushed by a piston.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PistonBehavior {
    Normal,
    Block,
    Destroy,
    PushOnly,
}

impl PistonBehavior {
    pub fn from_name(name: &str) -> PistonBehavior {
        match name {
            "block" => PistonBehavior::Block,
            "destroy" => PistonBehavior::Destroy,
            "push_only" => PistonBehavior::PushOnly,
            _ => PistonBehavior::Normal,
        }
    }
}

// Unbreakable blocks that must never move, whatever the source data says
const PISTON_IMMOVABLE: &[&str] = &["minecraft:obsidian", "minecraft:crying_obsidian"];
const PISTON_IMMOVABLE_PREFIXES: &[&str] =
    &["minecraft:respawn_anchor", "minecraft:reinforced_deepslate"];

// Block families that are always waterlogged even without a waterlogged state
const ALWAYS_WATERLOGGED: &[&str] = &["minecraft:bubble_column", "minecraft:kelp", "seagrass"];

/// Dense set of Java block-state runtime ids.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BlockIdSet {
    words: Vec<u64>,
}

impl BlockIdSet {
    pub fn insert(&mut self, id: u32) {
        let word = (id / 64) as usize;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (id % 64);
    }

    pub fn contains(&self, id: u32) -> bool {
        match self.words.get((id / 64) as usize) {
            Some(word) => word & (1u64 << (id % 64)) != 0,
            None => false,
        }
    }
}

/// Attributes of one Java block state, indexed by runtime id.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaBlockAttributes {
    pub java_identifier: Arc<str>,
    pub clean_identifier: Arc<str>,
    pub group_id: u32,
    pub hardness: Option<f32>,
    pub can_break_with_hand: bool,
    pub collision_index: Option<i32>,
    pub pick_item: Option<Arc<str>>,
    pub piston_behavior: PistonBehavior,
    pub has_block_entity: bool,
    pub pottable: bool,
    pub bedrock_identifier: Arc<str>,
    pub bedrock_states: StateMap,
}

/// Runtime ids of the blocks other subsystems hardcode behavior around.
/// Cobweb is a group id; the rest are block-state runtime ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistinguishedJavaBlocks {
    pub cobweb_group: u32,
    pub furnace: u32,
    pub furnace_lit: u32,
    pub spawner: u32,
    pub water: u32,
    pub honey_block: u32,
    pub slime_block: u32,
}

/// Semantic roles of the distinguished Java identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JavaSpecial {
    Cobweb,
    Furnace,
    FurnaceLit,
    Spawner,
    Water,
    HoneyBlock,
    SlimeBlock,
}

fn classify_java_special(java_identifier: &str) -> Option<JavaSpecial> {
    if java_identifier.contains("cobweb") {
        Some(JavaSpecial::Cobweb)
    } else if java_identifier.starts_with("minecraft:furnace[facing=north") {
        if java_identifier.contains("lit=true") {
            Some(JavaSpecial::FurnaceLit)
        } else {
            Some(JavaSpecial::Furnace)
        }
    } else if java_identifier.starts_with("minecraft:spawner") {
        Some(JavaSpecial::Spawner)
    } else if java_identifier == "minecraft:water[level=0]" {
        Some(JavaSpecial::Water)
    } else if java_identifier == "minecraft:honey_block" {
        Some(JavaSpecial::HoneyBlock)
    } else if java_identifier == "minecraft:slime_block" {
        Some(JavaSpecial::SlimeBlock)
    } else {
        None
    }
}

/// The version-independent Java side of the registry: one attribute record
/// per block state in document order, the identifier index, the grouping
/// table and the origin-scope bit-sets.
#[derive(Debug, PartialEq)]
pub struct JavaBlockRegistry {
    attributes: Vec<JavaBlockAttributes>,
    id_index: HashMap<Arc<str>, u32>,
    group_names: Vec<Arc<str>>,
    pub waterlogged: BlockIdSet,
    pub interactive: BlockIdSet,
    pub interactive_may_build: BlockIdSet,
    pub special: DistinguishedJavaBlocks,
}

impl JavaBlockRegistry {
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attributes(&self) -> &[JavaBlockAttributes] {
        &self.attributes
    }

    pub fn get(&self, runtime_id: u32) -> Option<&JavaBlockAttributes> {
        self.attributes.get(runtime_id as usize)
    }

    pub fn id_of(&self, java_identifier: &str) -> Option<u32> {
        self.id_index.get(java_identifier).copied()
    }

    /// Clean identifier shared by all states of one block group.
    pub fn group_name(&self, group_id: u32) -> Option<&Arc<str>> {
        self.group_names.get(group_id as usize)
    }

    pub fn group_count(&self) -> usize {
        self.group_names.len()
    }
}

#[derive(Deserialize)]
struct RawBlockEntry {
    block_hardness: Option<f32>,
    can_break_with_hand: Option<bool>,
    collision_index: Option<i32>,
    pick_item: Option<String>,
    piston_behavior: Option<String>,
    has_block_entity: Option<bool>,
    pottable: Option<serde_json::Value>,
    bedrock_identifier: String,
    bedrock_states: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct RawInteractions {
    always_consumes: Vec<String>,
    requires_may_build: Vec<String>,
}

fn malformed(resource: &str, message: impl ToString) -> ConduitError {
    ConduitError::MalformedResource {
        resource: resource.to_owned(),
        message: message.to_string(),
    }
}

fn piston_behavior_for(java_identifier: &str, raw: &RawBlockEntry) -> PistonBehavior {
    if PISTON_IMMOVABLE.contains(&java_identifier)
        || PISTON_IMMOVABLE_PREFIXES
            .iter()
            .any(|prefix| java_identifier.starts_with(prefix))
    {
        return PistonBehavior::Block;
    }
    match &raw.piston_behavior {
        Some(name) => PistonBehavior::from_name(name),
        None => PistonBehavior::Normal,
    }
}

// Pick items and Bedrock identifiers repeat across thousands of states;
// share one allocation per distinct string.
fn intern_str(pool: &mut HashSet<Arc<str>>, s: &str) -> Arc<str> {
    if let Some(existing) = pool.get(s) {
        return Arc::clone(existing);
    }
    let shared: Arc<str> = Arc::from(s);
    pool.insert(Arc::clone(&shared));
    shared
}

fn is_waterlogged(java_identifier: &str) -> bool {
    java_identifier.contains("waterlogged=true")
        || ALWAYS_WATERLOGGED
            .iter()
            .any(|family| java_identifier.contains(family))
}

fn bedrock_state_overrides(
    java_identifier: &str,
    raw_states: Option<serde_json::Map<String, serde_json::Value>>,
) -> Result<StateMap> {
    let mut states = StateMap::new();
    if let Some(raw_states) = raw_states {
        for (property, value) in raw_states {
            let value = StateValue::from_json(&value).ok_or_else(|| {
                malformed(
                    BLOCKS_RESOURCE,
                    format!(
                        "unsupported state value for {} on {}",
                        property, java_identifier
                    ),
                )
            })?;
            states.insert(property, value);
        }
    }
    Ok(states)
}

/// Compiles the Java block metadata and interaction documents into the
/// version-independent registry. Runtime ids follow document order; group
/// ids bump whenever the clean identifier changes from the previous entry.
pub fn load_java_blocks(provider: &dyn ResourceProvider) -> Result<JavaBlockRegistry> {
    let reader = provider.open(BLOCKS_RESOURCE)?;
    let document: serde_json::Map<String, serde_json::Value> =
        serde_json::from_reader(reader).map_err(|e| malformed(BLOCKS_RESOURCE, e))?;

    let mut attributes = Vec::with_capacity(document.len());
    let mut id_index: HashMap<Arc<str>, u32> = HashMap::with_capacity(document.len());
    let mut group_names: Vec<Arc<str>> = Vec::new();
    let mut shared_names: HashSet<Arc<str>> = HashSet::new();
    let mut waterlogged = BlockIdSet::default();

    let mut cobweb_group = None;
    let mut furnace = None;
    let mut furnace_lit = None;
    let mut spawner = None;
    let mut water = None;
    let mut honey_block = None;
    let mut slime_block = None;

    for (runtime_id, (java_identifier, value)) in document.into_iter().enumerate() {
        let runtime_id = runtime_id as u32;
        let raw: RawBlockEntry = serde_json::from_value(value).map_err(|e| {
            malformed(BLOCKS_RESOURCE, format!("{}: {}", java_identifier, e))
        })?;

        // All states of one block are assumed contiguous in the document;
        // comparing against the previous entry's clean identifier alone is
        // enough to assign group ids. A non-contiguous document would mint
        // duplicate groups for one logical block.
        let clean = clean_identifier(&java_identifier);
        let new_group = match group_names.last() {
            Some(last) => last.as_ref() != clean,
            None => true,
        };
        if new_group {
            group_names.push(Arc::from(clean));
        }
        let group_id = (group_names.len() - 1) as u32;
        let clean = Arc::clone(&group_names[group_id as usize]);

        if is_waterlogged(&java_identifier) {
            waterlogged.insert(runtime_id);
        }

        match classify_java_special(&java_identifier) {
            Some(JavaSpecial::Cobweb) => cobweb_group = Some(group_id),
            Some(JavaSpecial::Furnace) => furnace = Some(runtime_id),
            Some(JavaSpecial::FurnaceLit) => furnace_lit = Some(runtime_id),
            Some(JavaSpecial::Spawner) => spawner = Some(runtime_id),
            Some(JavaSpecial::Water) => water = Some(runtime_id),
            Some(JavaSpecial::HoneyBlock) => honey_block = Some(runtime_id),
            Some(JavaSpecial::SlimeBlock) => slime_block = Some(runtime_id),
            None => {}
        }

        let java_identifier: Arc<str> = Arc::from(java_identifier.as_str());
        id_index.insert(Arc::clone(&java_identifier), runtime_id);

        attributes.push(JavaBlockAttributes {
            piston_behavior: piston_behavior_for(&java_identifier, &raw),
            bedrock_states: bedrock_state_overrides(&java_identifier, raw.bedrock_states)?,
            java_identifier,
            clean_identifier: clean,
            group_id,
            hardness: raw.block_hardness,
            can_break_with_hand: raw.can_break_with_hand.unwrap_or(false),
            collision_index: raw.collision_index,
            pick_item: raw
                .pick_item
                .map(|item| intern_str(&mut shared_names, &item)),
            has_block_entity: raw.has_block_entity.unwrap_or(false),
            pottable: raw.pottable.is_some(),
            bedrock_identifier: intern_str(&mut shared_names, &raw.bedrock_identifier),
        });
    }

    let special = DistinguishedJavaBlocks {
        cobweb_group: cobweb_group.ok_or_else(|| ConduitError::MissingBlock("cobweb".to_owned()))?,
        furnace: furnace.ok_or_else(|| ConduitError::MissingBlock("furnace".to_owned()))?,
        furnace_lit: furnace_lit
            .ok_or_else(|| ConduitError::MissingBlock("lit furnace".to_owned()))?,
        spawner: spawner.ok_or_else(|| ConduitError::MissingBlock("spawner".to_owned()))?,
        water: water.ok_or_else(|| ConduitError::MissingBlock("water".to_owned()))?,
        honey_block: honey_block
            .ok_or_else(|| ConduitError::MissingBlock("honey block".to_owned()))?,
        slime_block: slime_block
            .ok_or_else(|| ConduitError::MissingBlock("slime block".to_owned()))?,
    };

    let reader = provider.open(INTERACTIONS_RESOURCE)?;
    let interactions: RawInteractions =
        serde_json::from_reader(reader).map_err(|e| malformed(INTERACTIONS_RESOURCE, e))?;

    let resolve_listed = |listed: Vec<String>| -> Result<BlockIdSet> {
        let mut set = BlockIdSet::default();
        for java_identifier in listed {
            let id = id_index.get(java_identifier.as_str()).ok_or_else(|| {
                malformed(
                    INTERACTIONS_RESOURCE,
                    format!("unknown block state: {}", java_identifier),
                )
            })?;
            set.insert(*id);
        }
        Ok(set)
    };
    let interactive = resolve_listed(interactions.always_consumes)?;
    let interactive_may_build = resolve_listed(interactions.requires_may_build)?;

    Ok(JavaBlockRegistry {
        attributes,
        id_index,
        group_names,
        waterlogged,
        interactive,
        interactive_may_build,
        special,
    })
}
