//! Team hostility rules.

use crate::unit::Team;

/// Distinct teams are hostile; neutral units are hostile to everyone but
/// other neutrals.
#[inline]
pub fn are_hostile(a: Team, b: Team) -> bool {
    a != b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_team_is_friendly() {
        assert!(!are_hostile(Team::Blue, Team::Blue));
        assert!(are_hostile(Team::Blue, Team::Purple));
        assert!(are_hostile(Team::Neutral, Team::Purple));
    }
}
