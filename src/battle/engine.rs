use crate::battle::calculators::{
    calculate_opponent_succession, calculate_player_succession, calculate_strike,
};
use crate::battle::commands::{execute_command_batch, BattleCommand};
use crate::battle::rules::BattleRules;
use crate::battle::state::{BattleEvent, BattleSession, EncounterRng, EventBus};
use crate::errors::{ActionError, BattleEngineError, BattleResult, BattleStateError};
use crate::player::{Roster, ROSTER_CAPACITY};
use crate::pokemon::Combatant;
use crate::provider::CreatureProvider;
use crate::species::SpeciesQuery;
use futures_util::future::join_all;
use schema::{BattleStatus, Side};

/// What one engine operation did to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The human-readable summary, also stored in `last_log`.
    pub log: String,
    pub events: Vec<BattleEvent>,
    pub status: BattleStatus,
}

/// Run an operation against a copy of the session. The copy is written back only if every
/// command succeeded.
fn apply(
    session: &mut BattleSession,
    build: impl FnOnce(&mut BattleSession, &mut EventBus) -> BattleResult<()>,
) -> BattleResult<TurnOutcome> {
    let mut working = session.clone();
    let mut bus = EventBus::new();

    build(&mut working, &mut bus)?;

    bus.trace();
    let log = bus.log_line();
    working.last_log = (!log.is_empty()).then(|| log.clone());
    *session = working;

    Ok(TurnOutcome {
        log,
        events: bus.events().to_vec(),
        status: session.status,
    })
}

fn require_status(session: &BattleSession, expected: BattleStatus) -> BattleResult<()> {
    if session.status != expected {
        tracing::warn!(status = %session.status, expected = %expected, "operation rejected");
        return Err(BattleStateError::InvalidState(session.status).into());
    }
    Ok(())
}

/// Check that the player may open a battle with the member at `player_index`.
pub fn validate_start(
    session: &BattleSession,
    player_index: usize,
    rules: &BattleRules,
) -> BattleResult<()> {
    require_status(session, BattleStatus::NotStarted)?;

    let roster = &session.player_roster;
    let required = if rules.require_full_roster {
        ROSTER_CAPACITY
    } else {
        1
    };
    if roster.len() < required {
        return Err(ActionError::RosterTooSmall {
            required,
            found: roster.len(),
        }
        .into());
    }

    let member = roster
        .get(player_index)
        .ok_or(ActionError::InvalidIndex(player_index))?;
    if member.is_fainted() {
        return Err(ActionError::FaintedCombatant(player_index).into());
    }
    Ok(())
}

/// Draw the ids of a full opposing roster. Nothing is fetched yet.
pub fn draw_opponent_ids(
    provider: &dyn CreatureProvider,
    encounters: &mut EncounterRng,
    rules: &BattleRules,
) -> BattleResult<Vec<u16>> {
    let pool = provider.encounter_pool(rules.dex_limit);
    (0..ROSTER_CAPACITY)
        .map(|_| {
            encounters
                .next_id(&pool)
                .ok_or(BattleEngineError::from(BattleStateError::EncounterExhausted))
        })
        .collect()
}

/// Fetch every id concurrently. The roster keeps the order of `ids`; any failed lookup fails
/// the whole roster.
pub async fn fetch_opponent_roster(
    provider: &dyn CreatureProvider,
    ids: &[u16],
) -> BattleResult<Roster> {
    tracing::debug!(?ids, "fetching opponent roster");
    let lookups = ids.iter().map(|&id| async move {
        let query = SpeciesQuery::Id(id);
        provider.fetch(&query).await
    });

    let mut members = Vec::with_capacity(ids.len());
    for (id, result) in ids.iter().zip(join_all(lookups).await) {
        match result {
            Ok(combatant) => members.push(combatant),
            Err(err) => {
                tracing::warn!(id, error = %err, "opponent lookup failed");
                return Err(err.into());
            }
        }
    }
    Ok(Roster::new(members))
}

/// Generate an opponent roster through the provider and open the battle.
///
/// Preconditions are checked before any lookup is made. On any failure the session is left
/// exactly as it was.
pub async fn start_battle(
    session: &mut BattleSession,
    player_index: usize,
    provider: &dyn CreatureProvider,
    encounters: &mut EncounterRng,
    rules: &BattleRules,
) -> BattleResult<TurnOutcome> {
    validate_start(session, player_index, rules)?;
    let ids = draw_opponent_ids(provider, encounters, rules)?;
    let opponent = fetch_opponent_roster(provider, &ids).await?;
    begin_battle(session, player_index, opponent, rules)
}

/// Open the battle against an already resolved opponent roster.
pub fn begin_battle(
    session: &mut BattleSession,
    player_index: usize,
    opponent: Roster,
    rules: &BattleRules,
) -> BattleResult<TurnOutcome> {
    validate_start(session, player_index, rules)?;
    if opponent.len() != ROSTER_CAPACITY {
        return Err(BattleStateError::IncompleteOpponentRoster {
            expected: ROSTER_CAPACITY,
            found: opponent.len(),
        }
        .into());
    }
    if let Some(index) = opponent.members().iter().position(Combatant::is_fainted) {
        return Err(BattleStateError::FaintedOpponent(index).into());
    }

    let outcome = apply(session, |working, bus| {
        working.opponent_roster = opponent;
        let name = working
            .player_roster
            .get(player_index)
            .map(|member| member.name.clone())
            .ok_or(ActionError::InvalidIndex(player_index))?;

        execute_command_batch(
            vec![
                BattleCommand::SetActiveIndex {
                    target: Side::Player,
                    index: player_index,
                },
                BattleCommand::SetActiveIndex {
                    target: Side::Opponent,
                    index: 0,
                },
                BattleCommand::SetStatus(BattleStatus::InProgress),
                BattleCommand::SetTurnNumber(1),
                BattleCommand::EmitEvent(BattleEvent::SentOut {
                    side: Side::Player,
                    name,
                }),
            ],
            working,
            bus,
        )
    })?;

    tracing::info!(
        player_index,
        opponents = ?session
            .opponent_roster
            .members()
            .iter()
            .map(|member| member.name.as_str())
            .collect::<Vec<_>>(),
        "battle started"
    );
    Ok(outcome)
}

/// Resolve one exchange: the player strikes first, and a surviving opponent strikes back.
pub fn resolve_turn(session: &mut BattleSession, rules: &BattleRules) -> BattleResult<TurnOutcome> {
    require_status(session, BattleStatus::InProgress)?;
    for side in [Side::Player, Side::Opponent] {
        if session.roster(side).active().is_none() {
            return Err(BattleStateError::NoActiveCombatant(side).into());
        }
    }

    let outcome = apply(session, |working, bus| {
        let strike = calculate_strike(working, Side::Player, rules)?;
        execute_command_batch(strike, working, bus)?;

        let opponent_down = working
            .opponent_roster
            .active()
            .is_some_and(|combatant| combatant.is_fainted());

        if opponent_down {
            // A knocked out defender never retaliates.
            let succession = calculate_opponent_succession(working);
            execute_command_batch(succession, working, bus)?;
        } else {
            let retaliation = calculate_strike(working, Side::Opponent, rules)?;
            execute_command_batch(retaliation, working, bus)?;

            let player_down = working
                .player_roster
                .active()
                .is_some_and(|combatant| combatant.is_fainted());
            if player_down {
                let succession = calculate_player_succession(working);
                execute_command_batch(succession, working, bus)?;
            }
        }

        execute_command_batch(vec![BattleCommand::IncrementTurnNumber], working, bus)
    })?;

    if outcome.status.is_concluded() {
        tracing::info!(status = %outcome.status, turn = session.turn_number, "battle concluded");
    } else {
        tracing::debug!(turn = session.turn_number, log = %outcome.log, "turn resolved");
    }
    Ok(outcome)
}

/// Put a different standing member of the player's roster on the field. Does not use up a
/// turn.
pub fn switch_active(session: &mut BattleSession, new_index: usize) -> BattleResult<TurnOutcome> {
    require_status(session, BattleStatus::InProgress)?;

    let target = session
        .player_roster
        .get(new_index)
        .ok_or(ActionError::InvalidIndex(new_index))?;
    if target.is_fainted() {
        return Err(ActionError::FaintedCombatant(new_index).into());
    }
    let name = target.name.clone();

    let outcome = apply(session, |working, bus| {
        execute_command_batch(
            vec![
                BattleCommand::SetActiveIndex {
                    target: Side::Player,
                    index: new_index,
                },
                BattleCommand::EmitEvent(BattleEvent::SentOut {
                    side: Side::Player,
                    name,
                }),
            ],
            working,
            bus,
        )
    })?;

    tracing::info!(new_index, "player switched");
    Ok(outcome)
}

fn return_to_lobby(session: &mut BattleSession, new_opponent: bool) -> BattleResult<TurnOutcome> {
    let outcome = apply(session, |working, bus| {
        execute_command_batch(
            vec![
                BattleCommand::ClearRoster {
                    target: Side::Opponent,
                },
                BattleCommand::HealRoster {
                    target: Side::Player,
                },
                BattleCommand::SetStatus(BattleStatus::NotStarted),
                BattleCommand::SetTurnNumber(0),
                BattleCommand::EmitEvent(BattleEvent::Reset { new_opponent }),
            ],
            working,
            bus,
        )
    })?;

    tracing::info!(new_opponent, "session returned to the lobby");
    Ok(outcome)
}

/// Discard the opponent, heal the player's roster and go back to `NotStarted`.
pub fn reset(session: &mut BattleSession) -> BattleResult<TurnOutcome> {
    return_to_lobby(session, false)
}

/// Same effect as [`reset`]; the next `start_battle` draws a fresh opponent roster.
pub fn new_opponent(session: &mut BattleSession) -> BattleResult<TurnOutcome> {
    return_to_lobby(session, true)
}
