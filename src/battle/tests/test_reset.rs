#[cfg(test)]
mod tests {
    use crate::battle::engine::{new_opponent, reset, resolve_turn};
    use crate::battle::state::{BattleEvent, BattleSession};
    use crate::battle::tests::common::{
        assert_ok, full_opponent, session_in_progress, test_rules, TestCombatantBuilder,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::BattleStatus;

    fn battered_session(status: BattleStatus) -> BattleSession {
        let mut session = session_in_progress(
            vec![
                TestCombatantBuilder::new(1, "bulbasaur").with_hp(0).build(),
                TestCombatantBuilder::new(4, "charmander").with_hp(12).build(),
                TestCombatantBuilder::new(7, "squirtle").with_hp(0).build(),
            ],
            full_opponent(vec![TestCombatantBuilder::new(25, "pikachu").with_hp(3).build()]),
        );
        session.status = status;
        session.turn_number = 9;
        session.last_log = Some("Enemy pikachu deals 10 damage.".to_string());
        session
    }

    #[rstest]
    #[case(BattleStatus::NotStarted)]
    #[case(BattleStatus::InProgress)]
    #[case(BattleStatus::PlayerVictory)]
    #[case(BattleStatus::PlayerDefeat)]
    fn test_reset_from_any_state(#[case] status: BattleStatus) {
        // Arrange
        let mut session = battered_session(status);

        // Act
        let outcome = assert_ok(reset(&mut session));

        // Assert
        assert_eq!(outcome.status, BattleStatus::NotStarted);
        assert_eq!(session.status, BattleStatus::NotStarted);
        assert_eq!(session.player_roster.len(), 3);
        assert!(session
            .player_roster
            .members()
            .iter()
            .all(|member| member.current_hp() == member.max_hp()));
        assert_eq!(session.player_roster.active_index(), 0);
        assert!(session.opponent_roster.is_empty());
        assert_eq!(session.last_log, None);
        assert_eq!(session.turn_number, 0);
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_new_opponent_matches_reset() {
        let mut via_reset = battered_session(BattleStatus::PlayerDefeat);
        let mut via_new_opponent = via_reset.clone();

        let reset_outcome = assert_ok(reset(&mut via_reset));
        let new_outcome = assert_ok(new_opponent(&mut via_new_opponent));

        assert_eq!(via_reset, via_new_opponent);
        assert_eq!(reset_outcome.events, vec![BattleEvent::Reset { new_opponent: false }]);
        assert_eq!(new_outcome.events, vec![BattleEvent::Reset { new_opponent: true }]);
    }

    #[test]
    fn test_reset_uses_front_scan_not_forward_scan() {
        // Mid-battle the roster had moved on to index 1
        let mut session = battered_session(BattleStatus::InProgress);
        session.player_roster.set_active_index(1).unwrap();

        assert_ok(reset(&mut session));

        assert_eq!(session.player_roster.active_index(), 0);
    }

    #[test]
    fn test_turns_are_rejected_after_reset() {
        let mut session = battered_session(BattleStatus::InProgress);
        assert_ok(reset(&mut session));
        assert!(resolve_turn(&mut session, &test_rules()).is_err());
    }
}
