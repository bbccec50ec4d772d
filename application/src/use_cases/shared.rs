//! Shared helpers used across multiple use cases.

use crate::config::TableNames;
use crate::ports::record_store::{Filter, RecordStore, Row, StoreError};
use leadflow_domain::{Agent, AgentId, Allocation, DomainError, Lead, LeadId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Decode store rows into domain entities.
pub(crate) fn decode_rows<T: DeserializeOwned>(
    table: &str,
    rows: Vec<Row>,
) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode {
                table: table.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Encode a domain entity as a store row.
pub(crate) fn to_row<T: Serialize>(table: &str, value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::Decode {
            table: table.to_string(),
            message: format!("expected an object, got {}", other),
        }),
        Err(e) => Err(StoreError::Decode {
            table: table.to_string(),
            message: e.to_string(),
        }),
    }
}

pub(crate) fn lead_id_values<'a>(ids: impl IntoIterator<Item = &'a LeadId>) -> Vec<Value> {
    ids.into_iter()
        .map(|id| Value::String(id.as_str().to_string()))
        .collect()
}

/// Drop repeated ids, keeping first occurrences in order.
pub(crate) fn dedup_ids(ids: &[LeadId]) -> Vec<LeadId> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().filter(|id| seen.insert(*id)).cloned().collect()
}

pub(crate) async fn load_agents<S: RecordStore + ?Sized>(
    store: &S,
    tables: &TableNames,
) -> Result<Vec<Agent>, StoreError> {
    let rows = store.select(&tables.agents, &Filter::new()).await?;
    decode_rows(&tables.agents, rows)
}

pub(crate) async fn load_assignments<S: RecordStore + ?Sized>(
    store: &S,
    tables: &TableNames,
    filter: &Filter,
) -> Result<Vec<Allocation>, StoreError> {
    let rows = store.select(&tables.assignments, filter).await?;
    let mut assignments: Vec<Allocation> = decode_rows(&tables.assignments, rows)?;
    assignments.retain(Allocation::is_active);
    Ok(assignments)
}

/// Load leads matching `filter` with their current assignee attached.
pub(crate) async fn load_leads<S: RecordStore + ?Sized>(
    store: &S,
    tables: &TableNames,
    filter: &Filter,
) -> Result<Vec<Lead>, StoreError> {
    let rows = store.select(&tables.leads, filter).await?;
    let leads: Vec<Lead> = decode_rows(&tables.leads, rows)?;
    if leads.is_empty() {
        return Ok(leads);
    }

    let assignments = load_assignments(
        store,
        tables,
        &Filter::new().in_list("lead_id", lead_id_values(leads.iter().map(|l| &l.id))),
    )
    .await?;
    let holders: HashMap<&LeadId, AgentId> = assignments
        .iter()
        .map(|a| (&a.lead_id, a.agent_id))
        .collect();

    Ok(leads
        .into_iter()
        .map(|lead| {
            let holder = holders.get(&lead.id).copied();
            lead.with_assignee(holder)
        })
        .collect())
}

/// Look up an agent that may receive new leads.
pub(crate) fn require_active(agents: &[Agent], agent_id: AgentId) -> Result<&Agent, DomainError> {
    let agent = agents
        .iter()
        .find(|a| a.id == agent_id)
        .ok_or(DomainError::UnknownAgent(agent_id))?;
    if !agent.is_active {
        return Err(DomainError::InactiveAgent(agent_id));
    }
    Ok(agent)
}
