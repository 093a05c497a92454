#[cfg(test)]
mod tests {
    use crate::battle::calculators::calculate_damage;
    use crate::battle::engine::{reset, resolve_turn};
    use crate::battle::tests::common::{full_opponent, session_in_progress, test_rules, TestCombatantBuilder};
    use crate::pokemon::Combatant;
    use proptest::prelude::*;
    use schema::BattleStatus;

    fn arb_combatant(id: u16) -> impl Strategy<Value = Combatant> {
        (1u16..=400, 0u16..=300, 0u16..=300, 0u16..=300, 1u16..=400).prop_map(
            move |(hp_max, attack, defense, speed, hp)| {
                TestCombatantBuilder::new(id, &format!("mon{}", id))
                    .with_max_hp(hp_max)
                    .with_attack(attack)
                    .with_defense(defense)
                    .with_speed(speed)
                    .with_hp(hp.min(hp_max))
                    .build()
            },
        )
    }

    fn hp_in_bounds(combatant: &Combatant) -> bool {
        combatant.current_hp() <= combatant.max_hp() && combatant.max_hp() >= 1
    }

    proptest! {
        #[test]
        fn damage_never_below_floor(attacker in arb_combatant(1), defender in arb_combatant(2)) {
            let outcome = calculate_damage(&attacker, &defender, &test_rules());
            prop_assert!(outcome.damage >= 10);
        }

        #[test]
        fn turn_keeps_hp_in_bounds(
            player in prop::collection::vec(arb_combatant(1), 1..=5),
            opponent in arb_combatant(2),
        ) {
            let mut session = session_in_progress(player, full_opponent(vec![opponent]));
            prop_assume!(session.player_roster.active().is_some());

            resolve_turn(&mut session, &test_rules()).unwrap();

            for combatant in session
                .player_roster
                .members()
                .iter()
                .chain(session.opponent_roster.members())
            {
                prop_assert!(hp_in_bounds(combatant));
            }
            // The active pointer is either standing or the exhausted sentinel
            for roster in [&session.player_roster, &session.opponent_roster] {
                prop_assert!(roster.active().map_or(roster.is_exhausted(), |c| !c.is_fainted()));
            }
        }

        #[test]
        fn knockout_means_no_retaliation(player in arb_combatant(1), opponent in arb_combatant(2)) {
            let player_hp = player.current_hp();
            let mut session = session_in_progress(vec![player], full_opponent(vec![opponent]));

            resolve_turn(&mut session, &test_rules()).unwrap();

            if session.opponent_roster.members()[0].is_fainted() {
                prop_assert_eq!(session.player_roster.members()[0].current_hp(), player_hp);
                prop_assert_eq!(session.opponent_roster.active_index(), 1);
            }
        }

        #[test]
        fn turn_is_deterministic(player in arb_combatant(1), opponent in arb_combatant(2)) {
            let mut first = session_in_progress(vec![player], full_opponent(vec![opponent]));
            let mut second = first.clone();

            let a = resolve_turn(&mut first, &test_rules()).unwrap();
            let b = resolve_turn(&mut second, &test_rules()).unwrap();

            prop_assert_eq!(a, b);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn reset_restores_every_member(
            player in prop::collection::vec(arb_combatant(1), 1..=5),
            turns in 0usize..6,
        ) {
            let mut session = session_in_progress(player, full_opponent(vec![]));
            for _ in 0..turns {
                if session.status != BattleStatus::InProgress {
                    break;
                }
                resolve_turn(&mut session, &test_rules()).unwrap();
            }

            reset(&mut session).unwrap();

            prop_assert_eq!(session.status, BattleStatus::NotStarted);
            prop_assert!(session
                .player_roster
                .members()
                .iter()
                .all(|c| c.current_hp() == c.max_hp()));
        }
    }
}
