//! Cluster membership
//!
//! Readers take a snapshot of the peer list once per round; changes swap in a new list
//! without blocking them.

use super::types::ClusterMember;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct ClusterMembership {
    local_id: String,
    peers: ArcSwap<Vec<ClusterMember>>,
}

impl ClusterMembership {
    /// Membership for node `local_id`; an entry for the local node itself is ignored
    pub fn new(local_id: impl Into<String>, members: Vec<ClusterMember>) -> Self {
        let local_id = local_id.into();
        let peers = Self::without_local(&local_id, members);
        Self {
            local_id,
            peers: ArcSwap::from_pointee(peers),
        }
    }

    fn without_local(local_id: &str, members: Vec<ClusterMember>) -> Vec<ClusterMember> {
        members
            .into_iter()
            .filter(|member| member.id != local_id)
            .collect()
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Current remote peers
    pub fn snapshot(&self) -> Arc<Vec<ClusterMember>> {
        self.peers.load_full()
    }

    pub fn len(&self) -> usize {
        self.peers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole peer list
    pub fn replace(&self, members: Vec<ClusterMember>) {
        let peers = Self::without_local(&self.local_id, members);
        info!(peers = peers.len(), "Cluster membership replaced");
        self.peers.store(Arc::new(peers));
    }

    /// Add a peer, or update its address if the id is already known
    pub fn join(&self, member: ClusterMember) {
        if member.id == self.local_id {
            return;
        }
        self.peers.rcu(|current| {
            let mut next = (**current).clone();
            match next.iter_mut().find(|existing| existing.id == member.id) {
                Some(existing) => existing.address = member.address.clone(),
                None => next.push(member.clone()),
            }
            next
        });
        info!(member = %member.id, "Cluster member joined");
    }

    /// Remove a peer; returns whether it was known
    pub fn leave(&self, id: &str) -> bool {
        let previous = self.peers.rcu(|current| {
            current
                .iter()
                .filter(|member| member.id != id)
                .cloned()
                .collect::<Vec<_>>()
        });
        let removed = previous.iter().any(|member| member.id == id);
        if removed {
            info!(member = %id, "Cluster member left");
        }
        removed
    }
}
