use std::collections::{HashMap, HashSet};

use super::ConnectionId;

/// Known teams plus the reverse member index.
///
/// The index is updated in the same critical section as the connection's
/// `team` field, which keeps team-scoped delivery O(team size) instead of a
/// scan over every connection.
#[derive(Default)]
pub struct TeamDirectory {
    known: HashSet<String>,
    members: HashMap<String, HashSet<ConnectionId>>,
}

impl TeamDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure(&mut self, name: &str) {
        self.known.insert(name.to_string());
    }

    /// Drops the team and returns whoever was in it. Does not touch the
    /// connections themselves; that is the lifecycle handler's job.
    pub fn forget(&mut self, name: &str) -> Option<HashSet<ConnectionId>> {
        self.known.remove(name);
        self.members.remove(name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    pub fn list_known(&self) -> Vec<String> {
        self.known.iter().cloned().collect()
    }

    pub fn add_member(&mut self, name: &str, id: ConnectionId) {
        self.members.entry(name.to_string()).or_default().insert(id);
    }

    /// Removing the last member keeps the team known; teams only disappear
    /// through `forget`.
    pub fn remove_member(&mut self, name: &str, id: ConnectionId) {
        if let Some(members) = self.members.get_mut(name) {
            members.remove(&id);
            if members.is_empty() {
                self.members.remove(name);
            }
        }
    }

    pub fn members(&self, name: &str) -> Option<&HashSet<ConnectionId>> {
        self.members.get(name)
    }

    pub fn member_count(&self, name: &str) -> usize {
        self.members.get(name).map(|m| m.len()).unwrap_or(0)
    }
}
