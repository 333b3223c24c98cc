//! Stable numeric identity for content records.

/// Case-insensitive ELF-style string hash used as the legacy ability identity.
///
/// Distinct names may collide; `SpecDb` rejects colliding content at load time.
pub fn hash_name(name: &str) -> u32 {
    const HIGH: u32 = 0xF000_0000;
    let mut hash: u32 = 0;
    for c in name.chars().flat_map(char::to_lowercase) {
        hash = (hash << 4).wrapping_add(c as u32);
        let high = hash & HIGH;
        if high != 0 {
            hash ^= (high >> 24) ^ high;
        }
    }
    hash
}
