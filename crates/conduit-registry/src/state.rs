use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// One value of a Bedrock block-state property. Bedrock encodes booleans as
/// NBT bytes and the Java-side override documents as JSON booleans; both are
/// normalized to `Bool` here so keys built from either side compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateValue {
    Bool(bool),
    Int(i32),
    String(String),
}

impl StateValue {
    /// Converts a JSON override value from the Java block document.
    pub fn from_json(value: &serde_json::Value) -> Option<StateValue> {
        match value {
            serde_json::Value::Bool(b) => Some(StateValue::Bool(*b)),
            serde_json::Value::String(s) => Some(StateValue::String(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(|n| StateValue::Int(n as i32)),
            _ => None,
        }
    }

    /// Converts an NBT state value from a Bedrock palette compound.
    pub fn from_nbt(tag: &conduit_nbt::Tag) -> Option<StateValue> {
        match tag {
            conduit_nbt::Tag::Byte(b) => Some(StateValue::Bool(*b != 0)),
            conduit_nbt::Tag::Int(n) => Some(StateValue::Int(*n)),
            conduit_nbt::Tag::String(s) => Some(StateValue::String(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Bool(b) => write!(f, "{}", b),
            StateValue::Int(n) => write!(f, "{}", n),
            StateValue::String(s) => write!(f, "{}", s),
        }
    }
}

/// A block's state-property set, ordered so that structurally equal sets
/// hash and compare identically regardless of construction order.
pub type StateMap = BTreeMap<String, StateValue>;

/// The canonical lookup key for one block state under one Bedrock version:
/// identifier, the palette's state-schema version and the interned property
/// set. Used only for equality and hashing during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockStateKey {
    pub name: String,
    pub version: i32,
    pub states: Arc<StateMap>,
}

impl fmt::Display for BlockStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.states.is_empty() {
            write!(f, "[")?;
            for (i, (property, value)) in self.states.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", property, value)?;
            }
            write!(f, "]")?;
        }
        write!(f, " (version {})", self.version)
    }
}

/// Shares one instance of each distinct state-property set. The same property
/// set recurs across many base blocks, so this bounds memory to the number of
/// distinct sets rather than the number of block-state permutations.
#[derive(Default)]
pub struct StateInterner {
    known: HashSet<Arc<StateMap>>,
}

impl StateInterner {
    pub fn intern(&mut self, states: StateMap) -> Arc<StateMap> {
        if let Some(existing) = self.known.get(&states) {
            return Arc::clone(existing);
        }
        let shared = Arc::new(states);
        self.known.insert(Arc::clone(&shared));
        shared
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
