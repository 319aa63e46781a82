/// Strips the state qualifiers from a fully qualified Java block state
/// identifier, e.g. `minecraft:furnace[facing=north,lit=true]` becomes
/// `minecraft:furnace`. All state permutations of one logical block share the
/// same clean identifier.
pub fn clean_identifier(java_identifier: &str) -> &str {
    match java_identifier.find('[') {
        Some(bracket) => &java_identifier[..bracket],
        None => java_identifier,
    }
}
