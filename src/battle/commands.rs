use crate::battle::state::{BattleEvent, BattleSession, EventBus};
use crate::errors::{BattleResult, BattleStateError};
use schema::{BattleStatus, Side};

/// Atomic commands representing final state changes
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    // Direct state changes
    SetStatus(BattleStatus),
    SetTurnNumber(u32),
    IncrementTurnNumber,

    // Roster modifications
    DealDamage { target: Side, amount: u16 },
    SetActiveIndex { target: Side, index: usize },
    HealRoster { target: Side },
    ClearRoster { target: Side },

    // Battle flow
    EmitEvent(BattleEvent),
}

pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    session: &mut BattleSession,
    bus: &mut EventBus,
) -> BattleResult<()> {
    for command in commands {
        execute_command(command, session, bus)?;
    }
    Ok(())
}

/// Damage the target's active combatant and report the knockout if this hit caused one.
fn execute_deal_damage_command(
    target: Side,
    amount: u16,
    session: &mut BattleSession,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let combatant = session
        .roster_mut(target)
        .active_mut()
        .ok_or(BattleStateError::NoActiveCombatant(target))?;

    let did_faint = combatant.take_damage(amount);
    if did_faint {
        bus.push(BattleEvent::Fainted {
            side: target,
            name: combatant.name.clone(),
        });
    }
    Ok(())
}

pub fn execute_command(
    command: BattleCommand,
    session: &mut BattleSession,
    bus: &mut EventBus,
) -> BattleResult<()> {
    match command {
        BattleCommand::EmitEvent(event) => {
            bus.push(event);
            Ok(())
        }
        BattleCommand::SetStatus(status) => {
            session.status = status;
            Ok(())
        }
        BattleCommand::SetTurnNumber(turn) => {
            session.turn_number = turn;
            Ok(())
        }
        BattleCommand::IncrementTurnNumber => {
            session.turn_number += 1;
            Ok(())
        }
        BattleCommand::DealDamage { target, amount } => {
            execute_deal_damage_command(target, amount, session, bus)
        }
        BattleCommand::SetActiveIndex { target, index } => {
            session.roster_mut(target).set_active_index(index)?;
            Ok(())
        }
        BattleCommand::HealRoster { target } => {
            session.roster_mut(target).heal_all();
            Ok(())
        }
        BattleCommand::ClearRoster { target } => {
            session.roster_mut(target).clear();
            Ok(())
        }
    }
}
