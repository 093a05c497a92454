//! Pokedex Arena MCP Server
//!
//! A Model Context Protocol server using the Rust SDK (rmcp) that exposes the arena to an LLM.
//! Every tool works on one shared session, and replies are the same text the terminal shows.

use std::sync::Arc;

use pokedex_arena::interface::{parse_slot, Arena, Command};
use pokedex_arena::{ArenaConfig, SpeciesQuery};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tokio::io::{stdin, stdout};

const MCP_SESSION: &str = "mcp";

#[derive(Clone)]
pub struct ArenaService {
    tool_router: ToolRouter<ArenaService>,
    arena: Arc<Arena>,
}

// Tool request structures
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SpeciesRequest {
    #[schemars(description = "Pokémon name or national dex number")]
    pub species: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SlotRequest {
    #[schemars(description = "Team slot, from 1 to 5")]
    pub slot: u8,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StartBattleRequest {
    #[schemars(description = "Team slot to lead with, from 1 to 5 (defaults to 1)")]
    pub slot: Option<u8>,
}

fn text_result(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

impl ArenaService {
    async fn run(&self, command: Command) -> Result<CallToolResult, McpError> {
        text_result(self.arena.execute(MCP_SESSION, command).await)
    }

    async fn run_slot(
        &self,
        slot: u8,
        command: fn(usize) -> Command,
    ) -> Result<CallToolResult, McpError> {
        match parse_slot(&slot.to_string()) {
            Ok(index) => self.run(command(index)).await,
            Err(message) => text_result(message),
        }
    }
}

#[tool_router]
impl ArenaService {
    pub fn new(arena: Arena) -> Self {
        Self {
            tool_router: Self::tool_router(),
            arena: Arc::new(arena),
        }
    }

    #[tool(description = "Look a Pokémon up in the Pokédex, with its neighbours and evolutions")]
    async fn lookup_pokemon(
        &self,
        Parameters(request): Parameters<SpeciesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Command::Search(SpeciesQuery::parse(&request.species)))
            .await
    }

    #[tool(description = "Add a Pokémon to your team (up to 5)")]
    async fn add_to_team(
        &self,
        Parameters(request): Parameters<SpeciesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Command::Add(SpeciesQuery::parse(&request.species)))
            .await
    }

    #[tool(description = "Remove the Pokémon in a team slot")]
    async fn remove_from_team(
        &self,
        Parameters(request): Parameters<SlotRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_slot(request.slot, Command::Remove).await
    }

    #[tool(description = "Remove every Pokémon from your team")]
    async fn clear_team(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Clear).await
    }

    #[tool(description = "Show your team")]
    async fn get_team(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Team).await
    }

    #[tool(description = "Start a battle against five random opponents")]
    async fn start_battle(
        &self,
        Parameters(request): Parameters<StartBattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_slot(request.slot.unwrap_or(1), Command::Start)
            .await
    }

    #[tool(description = "Strike the opponent's active Pokémon and take its counterattack")]
    async fn attack(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Attack).await
    }

    #[tool(description = "Send out a different team member without using a turn")]
    async fn switch_pokemon(
        &self,
        Parameters(request): Parameters<SlotRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run_slot(request.slot, Command::Switch).await
    }

    #[tool(description = "Heal your team and return to the lobby for a rematch")]
    async fn reset_battle(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Reset).await
    }

    #[tool(description = "Heal your team and return to the lobby to face new opponents")]
    async fn new_opponent(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::NewOpponent).await
    }

    #[tool(description = "Get the current battle state and status")]
    async fn get_battle_state(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Status).await
    }
}

#[tool_handler]
impl ServerHandler for ArenaService {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = ArenaConfig::from_env()?;
    let service = ArenaService::new(Arena::from_config(&config)?);
    let transport = (stdin(), stdout());

    tracing::info!("starting MCP server");
    let server = service.serve(transport).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!(?quit_reason, "MCP server exiting");
    Ok(())
}
