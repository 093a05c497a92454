use crate::errors::SessionError;
use crate::player::{Roster, ROSTER_CAPACITY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{BattleStatus, Side};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    /// A combatant took the field, at battle start, after a switch or after a knockout.
    SentOut {
        side: Side,
        name: String,
    },
    Strike {
        side: Side,
        attacker: String,
        defender: String,
        damage: u16,
        remaining_hp: u16,
    },
    Effectiveness {
        multiplier: f32,
    },
    Fainted {
        side: Side,
        name: String,
    },
    BattleEnded {
        status: BattleStatus,
    },
    /// The session went back to the lobby. `new_opponent` records whether the player asked
    /// for a fresh encounter rather than a rematch.
    Reset {
        new_opponent: bool,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::SentOut { side, name } => match side {
                Side::Player => Some(format!("Go, {}!", name)),
                Side::Opponent => Some(format!("The opponent sends out {}!", name)),
            },
            BattleEvent::Strike {
                side,
                attacker,
                damage,
                ..
            } => match side {
                Side::Player => Some(format!("{} deals {} damage.", attacker, damage)),
                Side::Opponent => Some(format!("Enemy {} deals {} damage.", attacker, damage)),
            },
            BattleEvent::Effectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m < 1.0 && m > 0.0 => Some("It's not very effective...".to_string()),
                m if m == 0.0 => Some("It had no effect!".to_string()),
                _ => None, // Normal effectiveness, no message
            },
            BattleEvent::Fainted { name, .. } => Some(format!("{} is KO!", name)),
            BattleEvent::BattleEnded { status } => match status {
                BattleStatus::PlayerVictory => Some("You won the battle!".to_string()),
                BattleStatus::PlayerDefeat => Some("You are out of usable Pokémon!".to_string()),
                _ => None,
            },
            BattleEvent::Reset { .. } => None,
        }
    }
}

/// Event bus for collecting the events of one engine operation.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// All visible events joined into the single log line shown to the player.
    pub fn log_line(&self) -> String {
        self.events
            .iter()
            .filter_map(BattleEvent::format)
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Emit every event at debug level.
    pub fn trace(&self) {
        for event in &self.events {
            tracing::debug!(?event, "battle event");
        }
    }
}

impl std::fmt::Display for EventBus {
    /// Format the EventBus for printing. Shows debug format of all events.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Which ids an encounter may draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncounterPool {
    /// Every id in `1..=limit`.
    Range(u16),
    /// Only these ids, e.g. the creatures an offline dex knows about.
    Ids(Vec<u16>),
}

/// Source of opponent ids. Draws are uniform with replacement, so duplicates are allowed.
#[derive(Debug, Clone)]
pub struct EncounterRng {
    source: EncounterSource,
}

#[derive(Debug, Clone)]
enum EncounterSource {
    Random(StdRng),
    Scripted { ids: Vec<u16>, index: usize },
}

impl EncounterRng {
    pub fn new_random() -> Self {
        Self {
            source: EncounterSource::Random(StdRng::from_rng(&mut rand::rng())),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: EncounterSource::Random(StdRng::seed_from_u64(seed)),
        }
    }

    /// Hands out exactly these ids in order, ignoring the pool.
    pub fn new_for_test(ids: Vec<u16>) -> Self {
        Self {
            source: EncounterSource::Scripted { ids, index: 0 },
        }
    }

    pub fn from_seed_or_random(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::new_random(),
        }
    }

    /// Draw the next id. `None` when the pool is empty or a scripted source ran out.
    pub fn next_id(&mut self, pool: &EncounterPool) -> Option<u16> {
        match &mut self.source {
            EncounterSource::Random(rng) => match pool {
                EncounterPool::Range(0) => None,
                EncounterPool::Range(limit) => Some(rng.random_range(1..=*limit)),
                EncounterPool::Ids(ids) if ids.is_empty() => None,
                EncounterPool::Ids(ids) => Some(ids[rng.random_range(0..ids.len())]),
            },
            EncounterSource::Scripted { ids, index } => {
                let id = ids.get(*index).copied();
                *index += 1;
                id
            }
        }
    }
}

/// The persisted snapshot of one visitor's play: both rosters, the status and the last log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BattleSession {
    pub player_roster: Roster,
    pub opponent_roster: Roster,
    pub status: BattleStatus,
    pub last_log: Option<String>,
    /// Number of the next turn to resolve; 0 while no battle is running.
    pub turn_number: u32,
}

impl BattleSession {
    pub fn new(player_roster: Roster) -> Self {
        Self {
            player_roster,
            ..Self::default()
        }
    }

    pub fn roster(&self, side: Side) -> &Roster {
        match side {
            Side::Player => &self.player_roster,
            Side::Opponent => &self.opponent_roster,
        }
    }

    pub fn roster_mut(&mut self, side: Side) -> &mut Roster {
        match side {
            Side::Player => &mut self.player_roster,
            Side::Opponent => &mut self.opponent_roster,
        }
    }

    /// Compact binary form for the session store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SessionError> {
        postcard::to_allocvec(self).map_err(|e| SessionError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SessionError> {
        let session: BattleSession =
            postcard::from_bytes(bytes).map_err(|e| SessionError::Decode(e.to_string()))?;
        session.validate()?;
        Ok(session)
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string_pretty(self).map_err(|e| SessionError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let session: BattleSession =
            serde_json::from_str(json).map_err(|e| SessionError::Decode(e.to_string()))?;
        session.validate()?;
        Ok(session)
    }

    /// Check the data model invariants on a session that came from outside the engine.
    pub fn validate(&self) -> Result<(), SessionError> {
        for side in [Side::Player, Side::Opponent] {
            let roster = self.roster(side);
            if roster.len() > ROSTER_CAPACITY {
                return Err(SessionError::Corrupt(format!(
                    "{} roster has {} members, more than {}",
                    side,
                    roster.len(),
                    ROSTER_CAPACITY
                )));
            }
            for member in roster.members() {
                member.validate()?;
            }
            if roster.active_index() > roster.exhausted_index() {
                return Err(SessionError::Corrupt(format!(
                    "{} active index {} is beyond {} members",
                    side,
                    roster.active_index(),
                    roster.len()
                )));
            }
            if roster.active().is_some_and(|c| c.is_fainted()) && self.status == BattleStatus::InProgress {
                return Err(SessionError::Corrupt(format!(
                    "{} active combatant has fainted",
                    side
                )));
            }
        }

        match self.status {
            BattleStatus::NotStarted if !self.opponent_roster.is_empty() => Err(
                SessionError::Corrupt("opponent roster present before the battle".to_string()),
            ),
            BattleStatus::InProgress | BattleStatus::PlayerVictory
                if self.opponent_roster.len() != ROSTER_CAPACITY =>
            {
                Err(SessionError::Corrupt(format!(
                    "opponent roster has {} members",
                    self.opponent_roster.len()
                )))
            }
            BattleStatus::PlayerVictory if !self.opponent_roster.is_exhausted() => Err(
                SessionError::Corrupt("victory with opponents still standing".to_string()),
            ),
            BattleStatus::PlayerDefeat if !self.player_roster.is_exhausted() => Err(
                SessionError::Corrupt("defeat with an active player combatant".to_string()),
            ),
            _ => Ok(()),
        }
    }
}
