use crate::state::{StateMap, StateValue};

/// One identifier rewrite rule. Given a Bedrock base identifier and the
/// working state set, it either returns a replacement identifier (removing
/// the states it folded into the new name) or declines with `None`, leaving
/// the state set untouched.
pub type StateRewrite = fn(&str, &mut StateMap) -> Option<String>;

/// One supported Bedrock protocol version: the palette resource tag, the
/// protocol number sessions negotiate, and the identifier rewrites this
/// version needs. Rewrites are tried in order, first match wins, so a newer
/// version lists every older rule before its own additions.
pub struct BedrockVersion {
    pub palette_tag: &'static str,
    pub protocol: i32,
    pub rewrites: &'static [StateRewrite],
}

pub const SUPPORTED_VERSIONS: &[BedrockVersion] = &[
    BedrockVersion {
        palette_tag: "1_19_20",
        protocol: 544,
        rewrites: &[],
    },
    BedrockVersion {
        palette_tag: "1_19_50",
        protocol: 560,
        rewrites: &[],
    },
    BedrockVersion {
        palette_tag: "1_19_60",
        protocol: 567,
        rewrites: &[],
    },
    BedrockVersion {
        palette_tag: "1_19_70",
        protocol: 575,
        rewrites: &[rewrite_wool],
    },
    BedrockVersion {
        palette_tag: "1_19_80",
        protocol: 582,
        rewrites: &[rewrite_wool, rewrite_logs, rewrite_fences],
    },
];

/// Applies the first matching rewrite, if any.
pub fn apply_rewrites(
    rewrites: &[StateRewrite],
    name: &str,
    states: &mut StateMap,
) -> Option<String> {
    for rewrite in rewrites {
        if let Some(renamed) = rewrite(name, states) {
            return Some(renamed);
        }
    }
    None
}

/// 1.19.70 split the single wool block into one block per color. Bedrock's
/// legacy `silver` color is called `light_gray` in the new names.
fn rewrite_wool(name: &str, states: &mut StateMap) -> Option<String> {
    if name != "minecraft:wool" {
        return None;
    }
    let color = match states.get("color") {
        Some(StateValue::String(color)) => color.clone(),
        _ => return None,
    };
    states.remove("color");
    let color = if color == "silver" {
        "light_gray".to_owned()
    } else {
        color
    };
    Some(format!("minecraft:{}_wool", color))
}

/// 1.19.80 split the two log families into one block per wood type. `log`
/// keys its type on `old_log_type`, `log2` on `new_log_type`.
fn rewrite_logs(name: &str, states: &mut StateMap) -> Option<String> {
    let type_property = match name {
        "minecraft:log" => "old_log_type",
        "minecraft:log2" => "new_log_type",
        _ => return None,
    };
    let wood = match states.get(type_property) {
        Some(StateValue::String(wood)) => wood.clone(),
        _ => return None,
    };
    states.remove(type_property);
    Some(format!("minecraft:{}_log", wood))
}

/// 1.19.80 split the wooden fence block into one block per wood type.
fn rewrite_fences(name: &str, states: &mut StateMap) -> Option<String> {
    if name != "minecraft:fence" {
        return None;
    }
    let wood = match states.get("wood_type") {
        Some(StateValue::String(wood)) => wood.clone(),
        _ => return None,
    };
    states.remove("wood_type");
    Some(format!("minecraft:{}_fence", wood))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states_with(property: &str, value: &str) -> StateMap {
        let mut states = StateMap::new();
        states.insert(property.to_owned(), StateValue::String(value.to_owned()));
        states
    }

    #[test]
    fn test_wool_rewrite_consumes_color() {
        let mut states = states_with("color", "red");
        let renamed = rewrite_wool("minecraft:wool", &mut states);
        assert_eq!(renamed.as_deref(), Some("minecraft:red_wool"));
        assert!(states.is_empty());
    }

    #[test]
    fn test_wool_rewrite_renames_legacy_silver() {
        let mut states = states_with("color", "silver");
        let renamed = rewrite_wool("minecraft:wool", &mut states);
        assert_eq!(renamed.as_deref(), Some("minecraft:light_gray_wool"));
    }

    #[test]
    fn test_declined_rewrite_leaves_states_untouched() {
        let mut states = states_with("color", "red");
        assert_eq!(rewrite_wool("minecraft:stone", &mut states), None);
        assert_eq!(states, states_with("color", "red"));
    }

    #[test]
    fn test_log_rewrite_keys_on_family() {
        let mut states = states_with("old_log_type", "oak");
        assert_eq!(
            rewrite_logs("minecraft:log", &mut states).as_deref(),
            Some("minecraft:oak_log")
        );
        assert!(states.is_empty());

        let mut states = states_with("new_log_type", "acacia");
        assert_eq!(
            rewrite_logs("minecraft:log2", &mut states).as_deref(),
            Some("minecraft:acacia_log")
        );
    }

    #[test]
    fn test_fence_rewrite_consumes_wood_type() {
        let mut states = states_with("wood_type", "birch");
        assert_eq!(
            rewrite_fences("minecraft:fence", &mut states).as_deref(),
            Some("minecraft:birch_fence")
        );
        assert!(states.is_empty());
    }

    #[test]
    fn test_apply_rewrites_first_match_wins() {
        let newest = SUPPORTED_VERSIONS.last().unwrap();
        let mut states = states_with("color", "silver");
        let renamed = apply_rewrites(newest.rewrites, "minecraft:wool", &mut states);
        assert_eq!(renamed.as_deref(), Some("minecraft:light_gray_wool"));
    }

    #[test]
    fn test_versions_without_rules_never_rewrite() {
        let oldest = &SUPPORTED_VERSIONS[0];
        let mut states = states_with("color", "red");
        assert_eq!(
            apply_rewrites(oldest.rewrites, "minecraft:wool", &mut states),
            None
        );
        assert_eq!(states, states_with("color", "red"));
    }

    #[test]
    fn test_supported_versions_are_ordered_by_protocol() {
        let protocols: Vec<i32> = SUPPORTED_VERSIONS.iter().map(|v| v.protocol).collect();
        let mut sorted = protocols.clone();
        sorted.sort_unstable();
        assert_eq!(protocols, sorted);
    }
}
