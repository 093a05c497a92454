use crate::battle::commands::BattleCommand;
use crate::battle::rules::BattleRules;
use crate::battle::state::{BattleEvent, BattleSession};
use crate::errors::{BattleResult, BattleStateError};
use crate::pokemon::Combatant;
use schema::{BattleStatus, Side};

/// Result of the damage formula for a single strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u16,
    /// Composed elemental multiplier, present only when a type chart is enabled.
    pub multiplier: Option<f32>,
}

/// `max(min_damage, attack - defense / 2)`, with the optional elemental multiplier applied to
/// the base value before the floor.
pub fn calculate_damage(
    attacker: &Combatant,
    defender: &Combatant,
    rules: &BattleRules,
) -> DamageOutcome {
    let base = attacker.attack() as i32 - (defender.defense() / 2) as i32;

    let multiplier = rules
        .effectiveness()
        .map(|table| table.composed(attacker.affinities(), defender.affinities()));

    let scaled = match multiplier {
        Some(multiplier) => (base as f32 * multiplier) as i32,
        None => base,
    };

    let damage = scaled
        .max(rules.min_damage as i32)
        .min(u16::MAX as i32) as u16;

    DamageOutcome { damage, multiplier }
}

/// Commands for the active combatant of `side` striking the opposing active combatant.
pub fn calculate_strike(
    session: &BattleSession,
    side: Side,
    rules: &BattleRules,
) -> BattleResult<Vec<BattleCommand>> {
    let attacker = session
        .roster(side)
        .active()
        .ok_or(BattleStateError::NoActiveCombatant(side))?;
    let defender = session
        .roster(side.opponent())
        .active()
        .ok_or(BattleStateError::NoActiveCombatant(side.opponent()))?;

    let outcome = calculate_damage(attacker, defender, rules);
    tracing::debug!(
        attacker = %attacker.name,
        defender = %defender.name,
        attack = attacker.attack(),
        defense = defender.defense(),
        damage = outcome.damage,
        multiplier = ?outcome.multiplier,
        "strike"
    );

    let mut commands = vec![BattleCommand::EmitEvent(BattleEvent::Strike {
        side,
        attacker: attacker.name.clone(),
        defender: defender.name.clone(),
        damage: outcome.damage,
        remaining_hp: defender.current_hp().saturating_sub(outcome.damage),
    })];
    if let Some(multiplier) = outcome.multiplier {
        commands.push(BattleCommand::EmitEvent(BattleEvent::Effectiveness {
            multiplier,
        }));
    }
    commands.push(BattleCommand::DealDamage {
        target: side.opponent(),
        amount: outcome.damage,
    });
    Ok(commands)
}

/// The opponent fields its roster strictly in order: the next slot, knocked out or not.
/// Running off the end of the roster is a player victory.
pub fn calculate_opponent_succession(session: &BattleSession) -> Vec<BattleCommand> {
    let roster = &session.opponent_roster;
    let next = roster.active_index() + 1;

    let mut commands = vec![BattleCommand::SetActiveIndex {
        target: Side::Opponent,
        index: next.min(roster.exhausted_index()),
    }];
    match roster.get(next) {
        Some(successor) => commands.push(BattleCommand::EmitEvent(BattleEvent::SentOut {
            side: Side::Opponent,
            name: successor.name.clone(),
        })),
        None => commands.extend(conclude(BattleStatus::PlayerVictory)),
    }
    commands
}

/// After a player knockout, the next standing member strictly after the fallen one takes
/// over. Members before it are never reconsidered mid-battle.
pub fn calculate_player_succession(session: &BattleSession) -> Vec<BattleCommand> {
    let roster = &session.player_roster;
    let next = roster.next_available_after(roster.active_index());

    let mut commands = vec![BattleCommand::SetActiveIndex {
        target: Side::Player,
        index: next,
    }];
    match roster.get(next) {
        Some(successor) => commands.push(BattleCommand::EmitEvent(BattleEvent::SentOut {
            side: Side::Player,
            name: successor.name.clone(),
        })),
        None => commands.extend(conclude(BattleStatus::PlayerDefeat)),
    }
    commands
}

fn conclude(status: BattleStatus) -> [BattleCommand; 2] {
    [
        BattleCommand::SetStatus(status),
        BattleCommand::EmitEvent(BattleEvent::BattleEnded { status }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::effectiveness::TypeChart;
    use crate::battle::tests::common::TestCombatantBuilder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::PokemonType;

    #[rstest]
    #[case(50, 20, 40)] // plain subtraction
    #[case(20, 10, 15)] // floor division of defense
    #[case(20, 11, 15)]
    #[case(10, 200, 10)] // defense far above attack
    #[case(0, 0, 10)] // missing stats still hit for the floor
    #[case(60, 100, 10)] // exactly zero base damage
    fn test_stat_damage(#[case] attack: u16, #[case] defense: u16, #[case] expected: u16) {
        let attacker = TestCombatantBuilder::new(1, "attacker").with_attack(attack).build();
        let defender = TestCombatantBuilder::new(2, "defender").with_defense(defense).build();

        let outcome = calculate_damage(&attacker, &defender, &BattleRules::default());
        assert_eq!(outcome.damage, expected);
        assert_eq!(outcome.multiplier, None);
    }

    #[test]
    fn test_multiplier_applies_before_floor() {
        let rules = BattleRules {
            type_chart: Some(TypeChart::Starter),
            ..BattleRules::default()
        };
        let charmander = TestCombatantBuilder::new(4, "charmander")
            .with_attack(52)
            .with_types(vec![PokemonType::Fire])
            .build();
        let bulbasaur = TestCombatantBuilder::new(1, "bulbasaur")
            .with_defense(49)
            .with_types(vec![PokemonType::Grass, PokemonType::Poison])
            .build();
        let squirtle = TestCombatantBuilder::new(7, "squirtle")
            .with_defense(65)
            .with_types(vec![PokemonType::Water])
            .build();

        // (52 - 24) * 2
        let outcome = calculate_damage(&charmander, &bulbasaur, &rules);
        assert_eq!(outcome.damage, 56);
        assert_eq!(outcome.multiplier, Some(2.0));

        // (52 - 32) * 0.5 = 10, which is also the floor
        let outcome = calculate_damage(&charmander, &squirtle, &rules);
        assert_eq!(outcome.damage, 10);
        assert_eq!(outcome.multiplier, Some(0.5));
    }

    #[test]
    fn test_repeated_affinity_counts_once() {
        let rules = BattleRules {
            type_chart: Some(TypeChart::Starter),
            ..BattleRules::default()
        };
        let attacker = TestCombatantBuilder::new(4, "charmander")
            .with_attack(60)
            .with_types(vec![PokemonType::Fire, PokemonType::Grass, PokemonType::Fire])
            .build();
        let defender = TestCombatantBuilder::new(1, "bulbasaur")
            .with_defense(40)
            .with_types(vec![PokemonType::Grass])
            .build();

        // (60 - 20) * 2
        let outcome = calculate_damage(&attacker, &defender, &rules);
        assert_eq!(attacker.affinities().len(), 2);
        assert_eq!(outcome.multiplier, Some(2.0));
        assert_eq!(outcome.damage, 80);
    }

    #[test]
    fn test_immunity_still_deals_floor_damage() {
        let rules = BattleRules {
            type_chart: Some(TypeChart::Standard),
            ..BattleRules::default()
        };
        let gastly = TestCombatantBuilder::new(92, "gastly")
            .with_types(vec![PokemonType::Ghost])
            .build();
        let rattata = TestCombatantBuilder::new(19, "rattata")
            .with_attack(120)
            .with_types(vec![PokemonType::Normal])
            .build();

        let outcome = calculate_damage(&rattata, &gastly, &rules);
        assert_eq!(outcome.multiplier, Some(0.0));
        assert_eq!(outcome.damage, 10);
    }

    #[test]
    fn test_strike_commands_target_the_other_side() {
        let session = crate::battle::tests::common::session_in_progress(
            vec![TestCombatantBuilder::new(1, "bulbasaur").with_attack(50).build()],
            vec![TestCombatantBuilder::new(4, "charmander")
                .with_defense(20)
                .with_hp(100)
                .build()],
        );

        let commands = calculate_strike(&session, Side::Player, &BattleRules::default()).unwrap();
        assert_eq!(
            commands,
            vec![
                BattleCommand::EmitEvent(BattleEvent::Strike {
                    side: Side::Player,
                    attacker: "bulbasaur".to_string(),
                    defender: "charmander".to_string(),
                    damage: 40,
                    remaining_hp: 60,
                }),
                BattleCommand::DealDamage {
                    target: Side::Opponent,
                    amount: 40,
                },
            ]
        );
    }
}
