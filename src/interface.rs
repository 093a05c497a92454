//! Host-facing commands shared by the terminal loop and the MCP server.
//!
//! Every command checks a session out of the store, runs one operation and commits the result.
//! Rejected operations never reach the store; they come back as explanatory text.

use crate::battle::engine::{self, TurnOutcome};
use crate::battle::rules::BattleRules;
use crate::battle::state::{BattleSession, EncounterRng};
use crate::config::ArenaConfig;
use crate::errors::{
    ActionError, BattleEngineError, BattleResult, BattleStateError, ConfigError, ProviderError,
};
use crate::player::{Roster, ROSTER_CAPACITY};
use crate::pokemon::Combatant;
use crate::provider::CreatureProvider;
use crate::session_store::SessionStore;
use crate::species::{self, DexPage, SpeciesQuery};
use crate::teams;
use schema::BattleStatus;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Session id used by single-player hosts.
pub const DEFAULT_SESSION: &str = "default";

/// A parsed line of user input. Roster positions are 0-based here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(SpeciesQuery),
    Add(SpeciesQuery),
    Remove(usize),
    Clear,
    Team,
    Start(usize),
    Attack,
    Switch(usize),
    Reset,
    NewOpponent,
    Status,
    Help,
    Quit,
}

/// Turn a 1-based position typed by a user into a roster index.
pub fn parse_slot(input: &str) -> Result<usize, String> {
    match input.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!(
            "'{}' is not a team slot. Use a number from 1 to {}.",
            input.trim(),
            ROSTER_CAPACITY
        )),
        Ok(position) => Ok(position - 1),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (verb, args) = match line.split_once(char::is_whitespace) {
            Some((verb, args)) => (verb, args.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "search" | "dex" | "lookup" => Ok(Command::Search(SpeciesQuery::parse(args))),
            "add" => {
                if args.is_empty() {
                    return Err("Which Pokémon do you want to add? (e.g., 'add pikachu')".to_string());
                }
                Ok(Command::Add(SpeciesQuery::parse(args)))
            }
            "remove" => parse_slot(args).map(Command::Remove),
            "clear" => Ok(Command::Clear),
            "team" => Ok(Command::Team),
            "start" | "fight" => {
                if args.is_empty() {
                    Ok(Command::Start(0))
                } else {
                    parse_slot(args).map(Command::Start)
                }
            }
            "attack" | "a" => Ok(Command::Attack),
            "switch" | "go" => parse_slot(args).map(Command::Switch),
            "reset" | "rematch" => Ok(Command::Reset),
            "new" | "new_opponent" => Ok(Command::NewOpponent),
            "status" | "s" => Ok(Command::Status),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("Type a command, or 'help' to list them.".to_string()),
            other => Err(format!("Unknown command '{}'. Type 'help' to list commands.", other)),
        }
    }
}

pub fn help_text() -> String {
    [
        "Commands:",
        "  search <name|number>  Look a Pokémon up in the Pokédex",
        "  add <name|number>     Add a Pokémon to your team",
        "  remove <slot>         Remove a team member",
        "  clear                 Empty your team",
        "  team                  Show your team",
        "  start [slot]          Start a battle, leading with that slot",
        "  attack                Strike the opponent's active Pokémon",
        "  switch <slot>         Send out a different team member",
        "  reset                 Heal your team and rematch",
        "  new                   Heal your team and face a new opponent",
        "  status                Show the battle",
        "  quit                  Leave the arena",
    ]
    .join("\n")
}

/// User-facing text for a failed command.
pub fn describe_error(err: &BattleEngineError) -> String {
    match err {
        BattleEngineError::Action(ActionError::InvalidIndex(index)) => {
            format!("There is no Pokémon in slot {}.", index + 1)
        }
        BattleEngineError::Action(ActionError::FaintedCombatant(index)) => {
            format!("The Pokémon in slot {} has fainted and cannot battle.", index + 1)
        }
        BattleEngineError::Action(ActionError::RosterFull(capacity)) => {
            format!("Your team is full ({} Pokémon). Remove one first.", capacity)
        }
        BattleEngineError::Action(ActionError::RosterTooSmall { required, found }) => format!(
            "You need {} Pokémon to battle (you have {}).",
            required, found
        ),
        BattleEngineError::BattleState(BattleStateError::InvalidState(status)) => match status {
            BattleStatus::NotStarted => "No battle is in progress. Start one first.".to_string(),
            BattleStatus::InProgress => {
                "A battle is in progress. Reset it before changing your team.".to_string()
            }
            BattleStatus::PlayerVictory | BattleStatus::PlayerDefeat => {
                "The battle is over. Reset for a rematch or find a new opponent.".to_string()
            }
        },
        BattleEngineError::Provider(ProviderError::NotFound(_)) => "Pokémon not found!".to_string(),
        BattleEngineError::Provider(ProviderError::OutOfRange { limit, .. }) => {
            format!("Only Pokémon #1 to #{} can be used here.", limit)
        }
        BattleEngineError::Provider(ProviderError::Unavailable(_)) => {
            "The Pokédex cannot be reached right now. Try again later.".to_string()
        }
        other => other.to_string(),
    }
}

fn render_combatant_line(label: &str, combatant: Option<&Combatant>) -> String {
    match combatant {
        Some(combatant) => format!("{}: {}", label, combatant),
        None => format!("{}: none", label),
    }
}

pub fn render_dex_page(page: &DexPage) -> String {
    let mut output = format!("--- Pokédex ---\n{:#}\n", page.current);
    if let Some(front) = &page.current.sprites.front {
        output.push_str(&format!("Artwork: {}\n", front));
    }
    if let Some(prev) = &page.prev {
        output.push_str(&format!("Previous: #{:03} {}\n", prev.id, prev.name));
    }
    if let Some(next) = &page.next {
        output.push_str(&format!("Next: #{:03} {}\n", next.id, next.name));
    }
    if !page.evolutions.is_empty() {
        let chain = page
            .evolutions
            .iter()
            .map(|stage| format!("{} (#{})", stage.name, stage.id))
            .collect::<Vec<_>>()
            .join(" -> ");
        output.push_str(&format!("Evolutions: {}\n", chain));
    }
    output
}

pub fn render_team(roster: &Roster) -> String {
    format!(
        "--- Your Team ({}/{}) ---\n{}",
        roster.len(),
        ROSTER_CAPACITY,
        roster
    )
}

pub fn render_battle(session: &BattleSession) -> String {
    let header = match session.status {
        BattleStatus::NotStarted => return render_team(&session.player_roster),
        BattleStatus::InProgress => format!("--- Battle in Progress (turn {}) ---", session.turn_number),
        BattleStatus::PlayerVictory => "--- Battle Over: You Won! ---".to_string(),
        BattleStatus::PlayerDefeat => "--- Battle Over: You Lost! ---".to_string(),
    };

    let opponents = &session.opponent_roster;
    let remaining = opponents.len().saturating_sub(opponents.active_index());
    let mut lines = vec![
        header,
        render_combatant_line("You", session.player_roster.active()),
        render_combatant_line("Opponent", opponents.active()),
        format!("Opponents remaining: {}/{}", remaining, opponents.len()),
    ];
    if let Some(log) = &session.last_log {
        lines.push(format!("Last turn: {}", log));
    }
    lines.join("\n")
}

fn render_outcome(outcome: &TurnOutcome, session: &BattleSession) -> String {
    let mut output = String::new();
    if !outcome.log.is_empty() {
        output.push_str(&outcome.log);
        output.push('\n');
    }
    output.push_str(&render_battle(session));
    if outcome.status.is_concluded() {
        output.push_str("\nType 'reset' for a rematch or 'new' for a new opponent.");
    }
    output
}

/// The arena: one session store, one creature provider and one rule set.
pub struct Arena {
    store: SessionStore,
    provider: Arc<dyn CreatureProvider>,
    rules: BattleRules,
    encounters: Mutex<EncounterRng>,
}

impl Arena {
    pub fn new(provider: Arc<dyn CreatureProvider>, rules: BattleRules) -> Self {
        let encounters = EncounterRng::from_seed_or_random(rules.encounter_seed);
        Self {
            store: SessionStore::new(),
            provider,
            rules,
            encounters: Mutex::new(encounters),
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.build_provider()?, config.rules.clone()))
    }

    pub fn with_encounters(mut self, encounters: EncounterRng) -> Self {
        self.encounters = Mutex::new(encounters);
        self
    }

    pub fn rules(&self) -> &BattleRules {
        &self.rules
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run a parsed command and render the result, rejections included.
    pub async fn execute(&self, session_id: &str, command: Command) -> String {
        let result = match command {
            Command::Search(query) => self.search(&query).await,
            Command::Add(query) => self.add(session_id, &query).await,
            Command::Remove(index) => self.remove(session_id, index).await,
            Command::Clear => self.clear(session_id).await,
            Command::Team => self.team(session_id).await,
            Command::Start(index) => self.start(session_id, index).await,
            Command::Attack => self.attack(session_id).await,
            Command::Switch(index) => self.switch(session_id, index).await,
            Command::Reset => self.reset(session_id).await,
            Command::NewOpponent => self.new_opponent(session_id).await,
            Command::Status => self.status(session_id).await,
            Command::Help => Ok(help_text()),
            Command::Quit => Ok("Goodbye!".to_string()),
        };

        match result {
            Ok(text) => text,
            Err(err) => {
                if err.is_rejection() {
                    tracing::debug!(error = %err, "command rejected");
                } else {
                    tracing::warn!(error = %err, "command failed");
                }
                describe_error(&err)
            }
        }
    }

    pub async fn search(&self, query: &SpeciesQuery) -> BattleResult<String> {
        let page = species::browse(self.provider.as_ref(), query, &self.rules).await?;
        Ok(render_dex_page(&page))
    }

    pub async fn add(&self, session_id: &str, query: &SpeciesQuery) -> BattleResult<String> {
        let mut lease = self.store.checkout(session_id).await?;
        let added =
            teams::add_member(&mut lease.session, self.provider.as_ref(), query, &self.rules).await?;
        let size = lease.session.player_roster.len();
        lease.commit()?;
        Ok(format!(
            "{} joined your team! ({}/{})",
            added.name, size, ROSTER_CAPACITY
        ))
    }

    pub async fn remove(&self, session_id: &str, index: usize) -> BattleResult<String> {
        let mut lease = self.store.checkout(session_id).await?;
        let removed = teams::remove_member(&mut lease.session, index)?;
        lease.commit()?;
        Ok(format!("{} left your team.", removed.name))
    }

    pub async fn clear(&self, session_id: &str) -> BattleResult<String> {
        let mut lease = self.store.checkout(session_id).await?;
        teams::clear_team(&mut lease.session)?;
        lease.commit()?;
        Ok("Your team is empty.".to_string())
    }

    pub async fn team(&self, session_id: &str) -> BattleResult<String> {
        let session = self.store.snapshot(session_id).await?;
        Ok(render_team(&session.player_roster))
    }

    pub async fn start(&self, session_id: &str, index: usize) -> BattleResult<String> {
        let mut lease = self.store.checkout(session_id).await?;
        let outcome = {
            let mut encounters = self.encounters.lock().await;
            engine::start_battle(
                &mut lease.session,
                index,
                self.provider.as_ref(),
                &mut encounters,
                &self.rules,
            )
            .await?
        };
        let text = render_outcome(&outcome, &lease.session);
        lease.commit()?;
        Ok(text)
    }

    pub async fn attack(&self, session_id: &str) -> BattleResult<String> {
        let mut lease = self.store.checkout(session_id).await?;
        let outcome = engine::resolve_turn(&mut lease.session, &self.rules)?;
        let text = render_outcome(&outcome, &lease.session);
        lease.commit()?;
        Ok(text)
    }

    pub async fn switch(&self, session_id: &str, index: usize) -> BattleResult<String> {
        let mut lease = self.store.checkout(session_id).await?;
        let outcome = engine::switch_active(&mut lease.session, index)?;
        let text = render_outcome(&outcome, &lease.session);
        lease.commit()?;
        Ok(text)
    }

    pub async fn reset(&self, session_id: &str) -> BattleResult<String> {
        let mut lease = self.store.checkout(session_id).await?;
        engine::reset(&mut lease.session)?;
        let text = format!(
            "Your team has been healed. Ready for a rematch!\n{}",
            render_team(&lease.session.player_roster)
        );
        lease.commit()?;
        Ok(text)
    }

    pub async fn new_opponent(&self, session_id: &str) -> BattleResult<String> {
        let mut lease = self.store.checkout(session_id).await?;
        engine::new_opponent(&mut lease.session)?;
        let text = format!(
            "Your team has been healed. A new challenger awaits!\n{}",
            render_team(&lease.session.player_roster)
        );
        lease.commit()?;
        Ok(text)
    }

    pub async fn status(&self, session_id: &str) -> BattleResult<String> {
        let session = self.store.snapshot(session_id).await?;
        Ok(render_battle(&session))
    }
}
