//! Operation surface for transports.
//!
//! Each manager operation is exposed as a named tool taking one JSON
//! argument object and returning one JSON value. Framing, wire encoding,
//! and delivery belong to whichever transport calls [`dispatch`].

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::manager::GraphManager;
use crate::model::{NewEntity, ObservationAddition, ObservationDeletion, Relation};
use crate::storage::GraphStore;
use crate::{Error, Result};

/// A named operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    CreateEntities,
    CreateRelations,
    AddObservations,
    CleanupOutdatedObservations,
    GetObservationsByDurability,
    DeleteEntities,
    DeleteObservations,
    DeleteRelations,
    ReadGraph,
    SearchNodes,
    OpenNodes,
}

impl Tool {
    pub const ALL: [Tool; 11] = [
        Tool::CreateEntities,
        Tool::CreateRelations,
        Tool::AddObservations,
        Tool::CleanupOutdatedObservations,
        Tool::GetObservationsByDurability,
        Tool::DeleteEntities,
        Tool::DeleteObservations,
        Tool::DeleteRelations,
        Tool::ReadGraph,
        Tool::SearchNodes,
        Tool::OpenNodes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::CreateEntities => "create_entities",
            Tool::CreateRelations => "create_relations",
            Tool::AddObservations => "add_observations",
            Tool::CleanupOutdatedObservations => "cleanup_outdated_observations",
            Tool::GetObservationsByDurability => "get_observations_by_durability",
            Tool::DeleteEntities => "delete_entities",
            Tool::DeleteObservations => "delete_observations",
            Tool::DeleteRelations => "delete_relations",
            Tool::ReadGraph => "read_graph",
            Tool::SearchNodes => "search_nodes",
            Tool::OpenNodes => "open_nodes",
        }
    }

    /// Verb phrase used in textual failure reports.
    fn action(self) -> &'static str {
        match self {
            Tool::CreateEntities => "create entities",
            Tool::CreateRelations => "create relations",
            Tool::AddObservations => "add observations",
            Tool::CleanupOutdatedObservations => "cleanup observations",
            Tool::GetObservationsByDurability => "get observations",
            Tool::DeleteEntities => "delete entities",
            Tool::DeleteObservations => "delete observations",
            Tool::DeleteRelations => "delete relations",
            Tool::ReadGraph => "read graph",
            Tool::SearchNodes => "search nodes",
            Tool::OpenNodes => "open nodes",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tool::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| Error::InvalidRequest(format!("unknown tool '{s}'")))
    }
}

// ============================================================================
// Argument payloads
// ============================================================================

#[derive(Deserialize)]
struct EntitiesArgs {
    entities: Vec<NewEntity>,
}

#[derive(Deserialize)]
struct RelationsArgs {
    relations: Vec<Relation>,
}

#[derive(Deserialize)]
struct ObservationsArgs {
    observations: Vec<ObservationAddition>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityNameArgs {
    entity_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityNamesArgs {
    entity_names: Vec<String>,
}

#[derive(Deserialize)]
struct DeletionsArgs {
    deletions: Vec<ObservationDeletion>,
}

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Deserialize)]
struct NamesArgs {
    names: Vec<String>,
}

fn decode<T: DeserializeOwned>(tool: Tool, arguments: JsonValue) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| Error::InvalidRequest(format!("invalid arguments for {tool}: {e}")))
}

fn require(ok: bool, message: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidRequest(message.to_string()))
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run `tool` with its JSON argument object against `manager`.
pub async fn dispatch<S: GraphStore>(
    manager: &GraphManager<S>,
    tool: Tool,
    arguments: JsonValue,
) -> Result<JsonValue> {
    debug!(tool = %tool, "dispatching tool");

    let out = match tool {
        Tool::CreateEntities => {
            let args: EntitiesArgs = decode(tool, arguments)?;
            serde_json::to_value(manager.create_entities(args.entities).await?)?
        }
        Tool::CreateRelations => {
            let args: RelationsArgs = decode(tool, arguments)?;
            serde_json::to_value(manager.create_relations(args.relations).await?)?
        }
        Tool::AddObservations => {
            let args: ObservationsArgs = decode(tool, arguments)?;
            serde_json::to_value(manager.add_observations(args.observations).await?)?
        }
        Tool::CleanupOutdatedObservations => {
            serde_json::to_value(manager.cleanup_outdated_observations().await?)?
        }
        Tool::GetObservationsByDurability => {
            let args: EntityNameArgs = decode(tool, arguments)?;
            require(!args.entity_name.is_empty(), "entityName must be a non-empty string")?;
            serde_json::to_value(manager.get_observations_by_durability(&args.entity_name).await?)?
        }
        Tool::DeleteEntities => {
            let args: EntityNamesArgs = decode(tool, arguments)?;
            require(!args.entity_names.is_empty(), "entityNames must be a non-empty list")?;
            manager.delete_entities(args.entity_names).await?;
            JsonValue::from("Entities deleted successfully")
        }
        Tool::DeleteObservations => {
            let args: DeletionsArgs = decode(tool, arguments)?;
            manager.delete_observations(args.deletions).await?;
            JsonValue::from("Observations deleted successfully")
        }
        Tool::DeleteRelations => {
            let args: RelationsArgs = decode(tool, arguments)?;
            manager.delete_relations(args.relations).await?;
            JsonValue::from("Relations deleted successfully")
        }
        Tool::ReadGraph => serde_json::to_value(manager.read_graph().await?)?,
        Tool::SearchNodes => {
            let args: QueryArgs = decode(tool, arguments)?;
            require(!args.query.is_empty(), "query must be a non-empty string")?;
            serde_json::to_value(manager.search_nodes(&args.query).await?)?
        }
        Tool::OpenNodes => {
            let args: NamesArgs = decode(tool, arguments)?;
            require(!args.names.is_empty(), "names must be a non-empty list")?;
            serde_json::to_value(manager.open_nodes(&args.names).await?)?
        }
    };
    Ok(out)
}

/// Textual failure payload, e.g. `Failed to add observations: Entity not found: X`.
pub fn describe_failure(tool: Tool, err: &Error) -> String {
    format!("Failed to {}: {}", tool.action(), err)
}
