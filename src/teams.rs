//! Building the player's roster between battles.

use crate::battle::rules::BattleRules;
use crate::battle::state::BattleSession;
use crate::errors::{ActionError, BattleResult, BattleStateError, ProviderError};
use crate::player::ROSTER_CAPACITY;
use crate::pokemon::Combatant;
use crate::provider::CreatureProvider;
use crate::species::SpeciesQuery;
use schema::BattleStatus;

fn require_lobby(session: &BattleSession) -> BattleResult<()> {
    if session.status != BattleStatus::NotStarted {
        tracing::warn!(status = %session.status, "team edit rejected during a battle");
        return Err(BattleStateError::InvalidState(session.status).into());
    }
    Ok(())
}

/// Fetch a creature and append it to the player's roster.
pub async fn add_member(
    session: &mut BattleSession,
    provider: &dyn CreatureProvider,
    query: &SpeciesQuery,
    rules: &BattleRules,
) -> BattleResult<Combatant> {
    require_lobby(session)?;
    if session.player_roster.is_full() {
        return Err(ActionError::RosterFull(ROSTER_CAPACITY).into());
    }

    let combatant = provider.fetch(query).await?;
    if combatant.id == 0 || combatant.id > rules.dex_limit {
        return Err(ProviderError::OutOfRange {
            id: combatant.id,
            limit: rules.dex_limit,
        }
        .into());
    }

    session.player_roster.push(combatant.clone())?;
    tracing::info!(name = %combatant.name, size = session.player_roster.len(), "team member added");
    Ok(combatant)
}

pub fn remove_member(session: &mut BattleSession, index: usize) -> BattleResult<Combatant> {
    require_lobby(session)?;
    let removed = session.player_roster.remove(index)?;
    tracing::info!(name = %removed.name, "team member removed");
    Ok(removed)
}

pub fn clear_team(session: &mut BattleSession) -> BattleResult<()> {
    require_lobby(session)?;
    session.player_roster.clear();
    tracing::info!("team cleared");
    Ok(())
}
