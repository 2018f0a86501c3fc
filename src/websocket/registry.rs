use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::{AppError, AppResult};

use super::{Connection, ConnectionId};

/// Connection registry: the single source of truth for live connections.
///
/// Lives inside the hub lock; only the subscription and lifecycle paths
/// mutate it, the broadcaster just reads recipient sets off it.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh connection. A duplicate id means a transport bug;
    /// it is reported rather than silently overwriting the live session.
    pub fn register(&mut self, conn: Connection) -> AppResult<()> {
        match self.connections.entry(conn.id) {
            Entry::Occupied(_) => Err(AppError::DuplicateConnection(conn.id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(conn);
                Ok(())
            }
        }
    }

    /// Removes a connection. Safe to call for ids that are already gone.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(&id)
    }

    /// Snapshot-at-call-time iteration; callers hold the hub lock, so the
    /// view stays stable while they walk it.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
