use crate::errors::ActionError;
use crate::pokemon::Combatant;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of members in a roster.
pub const ROSTER_CAPACITY: usize = 5;

/// An ordered squad of combatants with a pointer to the one currently fighting.
///
/// `active_index` either points at a standing member or equals `members.len()`, the
/// exhausted sentinel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Roster {
    members: Vec<Combatant>,
    active_index: usize,
}

impl Roster {
    pub fn new(members: Vec<Combatant>) -> Self {
        let mut roster = Roster {
            members,
            active_index: 0,
        };
        roster.active_index = roster.first_available_index();
        roster
    }

    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= ROSTER_CAPACITY
    }

    pub fn get(&self, index: usize) -> Option<&Combatant> {
        self.members.get(index)
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// The exhausted sentinel value for this roster.
    pub fn exhausted_index(&self) -> usize {
        self.members.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.active_index >= self.members.len()
    }

    /// Get the currently active combatant
    pub fn active(&self) -> Option<&Combatant> {
        self.members.get(self.active_index)
    }

    /// Get the currently active combatant mutably
    pub fn active_mut(&mut self) -> Option<&mut Combatant> {
        self.members.get_mut(self.active_index)
    }

    /// First standing member scanning from the front, or the exhausted sentinel.
    pub fn first_available_index(&self) -> usize {
        self.members
            .iter()
            .position(|member| !member.is_fainted())
            .unwrap_or(self.members.len())
    }

    /// First standing member strictly after `index`, or the exhausted sentinel.
    pub fn next_available_after(&self, index: usize) -> usize {
        self.members
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, member)| !member.is_fainted())
            .map(|(i, _)| i)
            .unwrap_or(self.members.len())
    }

    /// Point the roster at `index`. Accepts any value up to and including the sentinel.
    pub fn set_active_index(&mut self, index: usize) -> Result<(), ActionError> {
        if index > self.members.len() {
            return Err(ActionError::InvalidIndex(index));
        }
        self.active_index = index;
        Ok(())
    }

    /// Add a member at the end of the roster.
    pub fn push(&mut self, combatant: Combatant) -> Result<(), ActionError> {
        if self.is_full() {
            return Err(ActionError::RosterFull(ROSTER_CAPACITY));
        }
        self.members.push(combatant);
        self.active_index = self.first_available_index();
        Ok(())
    }

    /// Remove the member at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Combatant, ActionError> {
        if index >= self.members.len() {
            return Err(ActionError::InvalidIndex(index));
        }
        let removed = self.members.remove(index);
        self.active_index = self.first_available_index();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.active_index = 0;
    }

    /// Restore every member to full health and point at the first of them.
    pub fn heal_all(&mut self) {
        for member in &mut self.members {
            member.heal_to_max();
        }
        self.active_index = self.first_available_index();
    }

    pub(crate) fn member_mut(&mut self, index: usize) -> Option<&mut Combatant> {
        self.members.get_mut(index)
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.members.is_empty() {
            return write!(f, "  (empty)");
        }
        for (i, member) in self.members.iter().enumerate() {
            let active_marker = if i == self.active_index { " (Active)" } else { "" };
            let fainted_marker = if member.is_fainted() { " (Fainted)" } else { "" };
            writeln!(f, " {}. {}{}{}", i + 1, member, active_marker, fainted_marker)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schema::{BaseStats, PokemonType, SpriteRefs};

    fn member(id: u16, hp: u16) -> Combatant {
        let mut combatant = Combatant::new(
            id,
            format!("mon{}", id),
            vec![PokemonType::Normal],
            BaseStats {
                hp: 50,
                attack: 50,
                defense: 50,
                speed: 50,
            },
            SpriteRefs::default(),
        );
        combatant.set_hp(hp);
        combatant
    }

    #[test]
    fn test_first_available_scans_from_front() {
        let roster = Roster::new(vec![member(1, 0), member(2, 0), member(3, 10), member(4, 10)]);
        assert_eq!(roster.first_available_index(), 2);
        assert_eq!(roster.active_index(), 2);
    }

    #[test]
    fn test_next_available_skips_earlier_members() {
        let roster = Roster::new(vec![member(1, 10), member(2, 0), member(3, 0), member(4, 10)]);
        assert_eq!(roster.next_available_after(0), 3);
        // A standing member before the index is never picked.
        assert_eq!(roster.next_available_after(3), 4);
        assert_eq!(roster.next_available_after(3), roster.exhausted_index());
    }

    #[test]
    fn test_all_fainted_is_exhausted() {
        let roster = Roster::new(vec![member(1, 0), member(2, 0)]);
        assert_eq!(roster.first_available_index(), 2);
        assert!(roster.is_exhausted());
        assert!(roster.active().is_none());
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut roster = Roster::default();
        for id in 1..=5 {
            roster.push(member(id, 50)).unwrap();
        }
        assert!(roster.is_full());
        assert_eq!(roster.push(member(6, 50)), Err(ActionError::RosterFull(5)));
        assert_eq!(roster.len(), 5);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut roster = Roster::new(vec![member(1, 50)]);
        assert_eq!(roster.remove(1), Err(ActionError::InvalidIndex(1)));
        assert_eq!(roster.remove(0).map(|c| c.id), Ok(1));
        assert!(roster.is_empty());
    }

    #[test]
    fn test_heal_all_resets_active_to_front() {
        let mut roster = Roster::new(vec![member(1, 0), member(2, 5)]);
        assert_eq!(roster.active_index(), 1);
        roster.heal_all();
        assert_eq!(roster.active_index(), 0);
        assert!(roster.members().iter().all(|m| m.current_hp() == m.max_hp()));
    }

    #[test]
    fn test_set_active_index_accepts_sentinel_only() {
        let mut roster = Roster::new(vec![member(1, 50), member(2, 50)]);
        assert!(roster.set_active_index(2).is_ok());
        assert!(roster.is_exhausted());
        assert_eq!(roster.set_active_index(3), Err(ActionError::InvalidIndex(3)));
    }
}
