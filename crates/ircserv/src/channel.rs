use dashmap::DashSet;
use tokio::sync::RwLock;

use crate::client::ClientId;

/// Mode flags and parameters: `i`, `t`, `k <key>`, `l <limit>`. Operator
/// grants (`o`) live in [`Channel::operators`].
#[derive(Debug, Clone, Default)]
pub struct ChannelModes {
    pub invite_only: bool,       // +i
    pub topic_lock: bool,        // +t
    pub key: Option<String>,     // +k <key>
    pub user_limit: Option<u32>, // +l <count>
}

impl ChannelModes {
    /// Canonical `+letters [params]` form used by RPL_CHANNELMODEIS. The key
    /// and limit values follow in letter order.
    pub fn to_modestring(&self) -> String {
        let mut letters = String::from("+");
        let mut params: Vec<String> = Vec::new();
        if self.invite_only {
            letters.push('i');
        }
        if self.topic_lock {
            letters.push('t');
        }
        if let Some(key) = &self.key {
            letters.push('k');
            params.push(key.clone());
        }
        if let Some(limit) = self.user_limit {
            letters.push('l');
            params.push(limit.to_string());
        }
        for param in params {
            letters.push(' ');
            letters.push_str(&param);
        }
        letters
    }
}

#[derive(Debug, Clone)]
pub struct TopicInfo {
    pub text: String,
    pub set_by: String,
    pub set_at: i64,
}

/// One named channel. Membership and operator sets hold client descriptors,
/// never handles; the owning maps in `ServerState` resolve them.
#[derive(Debug)]
pub struct Channel {
    /// Case preserved as first created; map keys are lower-cased.
    pub name: String,
    pub created_at: i64,
    pub topic: RwLock<Option<TopicInfo>>,
    pub members: DashSet<ClientId>,
    pub operators: DashSet<ClientId>,
    /// Pending invites, consumed on JOIN.
    pub invited: DashSet<ClientId>,
    pub modes: RwLock<ChannelModes>,
}

impl Channel {
    pub fn new(name: String) -> Self {
        Channel {
            name,
            created_at: chrono::Utc::now().timestamp(),
            topic: RwLock::new(None),
            members: DashSet::new(),
            operators: DashSet::new(),
            invited: DashSet::new(),
            modes: RwLock::new(ChannelModes::default()),
        }
    }

    pub fn add_member(&self, id: ClientId) -> bool {
        self.members.insert(id)
    }

    /// Drops every trace of the client: membership, operator grant, invite.
    pub fn remove_member(&self, id: ClientId) {
        self.members.remove(&id);
        self.operators.remove(&id);
        self.invited.remove(&id);
    }

    pub fn promote(&self, id: ClientId) -> bool {
        self.members.contains(&id) && self.operators.insert(id)
    }

    pub fn demote(&self, id: ClientId) {
        self.operators.remove(&id);
    }

    pub fn is_member(&self, id: ClientId) -> bool {
        self.members.contains(&id)
    }

    pub fn is_operator(&self, id: ClientId) -> bool {
        self.operators.contains(&id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member_ids(&self) -> Vec<ClientId> {
        self.members.iter().map(|id| *id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modestring_shapes() {
        let mut modes = ChannelModes::default();
        assert_eq!(modes.to_modestring(), "+");
        modes.invite_only = true;
        modes.topic_lock = true;
        assert_eq!(modes.to_modestring(), "+it");
        modes.key = Some("hunter2".to_string());
        modes.user_limit = Some(10);
        assert_eq!(modes.to_modestring(), "+itkl hunter2 10");
    }

    #[test]
    fn operators_stay_subset_of_members() {
        let channel = Channel::new("#t".to_string());
        assert!(!channel.promote(1), "cannot promote a non-member");
        channel.add_member(1);
        assert!(channel.promote(1));
        assert!(channel.is_operator(1));
        channel.remove_member(1);
        assert!(!channel.is_operator(1));
        assert!(channel.is_empty());
    }

    #[test]
    fn invite_is_tracked_per_client() {
        let channel = Channel::new("#t".to_string());
        channel.invited.insert(7);
        assert!(channel.invited.contains(&7));
        channel.remove_member(7);
        assert!(!channel.invited.contains(&7), "cleanup clears stale invites");
    }
}
