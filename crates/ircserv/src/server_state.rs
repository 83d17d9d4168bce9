use dashmap::DashMap;
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::channel::Channel;
use crate::client::{ClientHandle, ClientId};
use crate::config::ServerConfig;
use crate::replies::IrcReply;

/// Advisory record of a CTCP DCC offer, keyed by receiver nickname. The
/// frame itself is relayed unchanged; nothing is ever transferred here.
#[derive(Debug, Clone)]
pub struct FileData {
    pub path: String,
    pub sender: String,
    pub receiver: String,
}

/// Process-singleton server state. Owned by the accept loop, shared with
/// every connection task. Channels and clients reference each other through
/// descriptors and lower-cased names into these maps, never through owning
/// handles, so destruction is a map-removal cascade.
#[derive(Debug)]
pub struct ServerState {
    pub password: String,
    pub config: ServerConfig,
    /// Human-readable start date, for RPL_CREATED.
    pub created_at: String,
    pub users: DashMap<ClientId, ClientHandle>,
    /// Lower-cased nickname -> descriptor. Bijective with live nicknames.
    pub nicks: DashMap<String, ClientId>,
    /// Lower-cased channel name -> channel.
    pub channels: DashMap<String, Arc<Channel>>,
    pub pending_files: DashMap<String, FileData>,
    next_id: AtomicUsize,
}

impl ServerState {
    pub fn new(password: String, config: ServerConfig) -> Self {
        ServerState {
            password,
            config,
            created_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            users: DashMap::new(),
            nicks: DashMap::new(),
            channels: DashMap::new(),
            pending_files: DashMap::new(),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn next_client_id(&self) -> ClientId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn add_client(&self, id: ClientId, handle: ClientHandle) {
        self.users.insert(id, handle);
    }

    pub fn get_client(&self, id: ClientId) -> Option<ClientHandle> {
        self.users.get(&id).map(|entry| entry.clone())
    }

    pub fn find_by_nick(&self, nick: &str) -> Option<ClientHandle> {
        let id = self.nicks.get(&nick.to_ascii_lowercase()).map(|entry| *entry)?;
        self.get_client(id)
    }

    /// Claims `nick` for `id`. Case-folded; re-claiming your own nick is a
    /// no-op success.
    pub fn claim_nick(&self, nick: &str, id: ClientId) -> bool {
        let key = nick.to_ascii_lowercase();
        match self.nicks.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(occupied) => *occupied.get() == id,
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(id);
                true
            }
        }
    }

    pub fn release_nick(&self, nick: &str) {
        self.nicks.remove(&nick.to_ascii_lowercase());
    }

    pub fn get_channel(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels
            .get(&name.to_ascii_lowercase())
            .map(|entry| entry.clone())
    }

    /// Fetches or lazily creates a channel. Returns the channel and whether
    /// this call created it (the creator becomes its first operator).
    pub fn get_or_create_channel(&self, name: &str) -> (Arc<Channel>, bool) {
        let key = name.to_ascii_lowercase();
        if let Some(existing) = self.channels.get(&key) {
            return (existing.clone(), false);
        }
        let channel = Arc::new(Channel::new(name.to_string()));
        self.channels.insert(key, channel.clone());
        info!("channel {} created", name);
        (channel, true)
    }

    /// No channel stays in the map once its last member departs.
    pub fn drop_channel_if_empty(&self, name: &str) {
        let key = name.to_ascii_lowercase();
        let emptied = self
            .channels
            .get(&key)
            .map(|channel| channel.is_empty())
            .unwrap_or(false);
        if emptied {
            self.channels.remove(&key);
            info!("channel {} destroyed", name);
        }
    }

    /// Queues `line` on every member of `channel` except `exclude`.
    pub fn broadcast_to_channel(
        &self,
        channel: &Channel,
        line: &str,
        exclude: Option<ClientId>,
    ) {
        for id in channel.member_ids() {
            if Some(id) == exclude {
                continue;
            }
            if let Some(member) = self.get_client(id) {
                member.send_line(line);
            }
        }
    }

    /// Every client sharing at least one channel with `id`, deduplicated,
    /// excluding `id` itself. NICK and QUIT broadcasts reach each peer once.
    pub fn channel_peers(&self, id: ClientId) -> Vec<ClientId> {
        let mut peers = HashSet::new();
        for entry in self.channels.iter() {
            if entry.is_member(id) {
                for member in entry.member_ids() {
                    if member != id {
                        peers.insert(member);
                    }
                }
            }
        }
        peers.into_iter().collect()
    }

    // LUSERS figures. No server operators exist here, and a connection is
    // "unknown" until it claims a nickname.
    pub fn client_count(&self) -> usize {
        self.users.len()
    }

    pub fn unknown_count(&self) -> usize {
        self.users.len().saturating_sub(self.nicks.len())
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Three-step destruction cascade: broadcast the QUIT, clear channel
    /// membership (destroying channels emptied by the departure), then drop
    /// the nickname claim and the client entry itself.
    pub async fn remove_client(&self, id: ClientId, reason: &str) {
        let Some(handle) = self.get_client(id) else {
            return;
        };
        let info = handle.snapshot().await;

        if info.registered && !info.joined.is_empty() {
            let quit = IrcReply::Quit { mask: &info.mask, reason }.format();
            for peer in self.channel_peers(id) {
                if let Some(peer_handle) = self.get_client(peer) {
                    peer_handle.send_line(&quit);
                }
            }
        }

        for channel_name in &info.joined {
            if let Some(channel) = self.get_channel(channel_name) {
                channel.remove_member(id);
                self.drop_channel_if_empty(channel_name);
            }
        }
        // Stale invites elsewhere must not survive the descriptor.
        for entry in self.channels.iter() {
            entry.invited.remove(&id);
        }

        if let Some(nick) = &info.nick {
            self.release_nick(nick);
            self.pending_files
                .remove(&nick.to_ascii_lowercase());
        }
        self.users.remove(&id);
        debug!("client {} removed ({})", id, reason);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::ServerConfig;
    use tokio::sync::mpsc;

    /// Socket-free client wired into the state, with the receiving end of
    /// its outbound queue for asserting on replies.
    pub async fn attach_client(
        state: &ServerState,
        nick: &str,
    ) -> (ClientHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(64);
        let id = state.next_client_id();
        let handle = ClientHandle::new(id, "127.0.0.1".to_string(), tx);
        {
            let mut client = handle.client.write().await;
            client.password_ok = true;
            client.nick = Some(nick.to_string());
            client.username = Some(nick.to_string());
            client.realname = Some(nick.to_string());
            client.hostname = nick.to_string();
            client.welcomed = true;
        }
        state.add_client(id, handle.clone());
        assert!(state.claim_nick(nick, id));
        (handle, rx)
    }

    pub fn new_state() -> ServerState {
        ServerState::new("pw".to_string(), ServerConfig::default())
    }

    /// The §"data model" invariants that must hold after every command.
    pub async fn assert_invariants(state: &ServerState) {
        // every member descriptor resolves to a live client
        for entry in state.channels.iter() {
            for id in entry.member_ids() {
                assert!(
                    state.users.contains_key(&id),
                    "member {} of {} not in client map",
                    id,
                    entry.name
                );
            }
            // operators are members
            for op in entry.operators.iter() {
                assert!(
                    entry.members.contains(&*op),
                    "operator {} of {} is not a member",
                    *op,
                    entry.name
                );
            }
            // no empty channel survives
            assert!(!entry.is_empty(), "empty channel {} kept", entry.name);
        }
        // nick map is a bijection with live nicknames
        for entry in state.nicks.iter() {
            let handle = state.get_client(*entry.value()).expect("nick maps to live client");
            let client = handle.client.read().await;
            assert_eq!(
                client.nick.as_deref().map(str::to_ascii_lowercase).as_deref(),
                Some(entry.key().as_str()),
                "nick map entry does not match client nick"
            );
        }
        // joined-set mirror
        for user in state.users.iter() {
            let client = user.client.read().await;
            for name in &client.joined {
                let channel = state.get_channel(name).expect("joined channel exists");
                assert!(
                    channel.is_member(client.id),
                    "{} joined {} but is not a member",
                    client.id,
                    name
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn nick_claims_are_case_folded() {
        let state = new_state();
        let (_a, _rx) = attach_client(&state, "Alice").await;
        assert!(state.find_by_nick("alice").is_some());
        assert!(state.find_by_nick("ALICE").is_some());
        assert!(!state.claim_nick("aLiCe", 99));
    }

    #[tokio::test]
    async fn removal_cascade_destroys_empty_channels() {
        let state = new_state();
        let (a, _rx) = attach_client(&state, "alice").await;
        let id = a.id().await;

        let (channel, created) = state.get_or_create_channel("#T");
        assert!(created);
        channel.add_member(id);
        channel.promote(id);
        a.client.write().await.joined.insert("#t".to_string());

        state.remove_client(id, "bye").await;
        assert!(state.get_channel("#t").is_none(), "empty channel destroyed");
        assert!(state.find_by_nick("alice").is_none());
        assert_eq!(state.client_count(), 0);
        assert_invariants(&state).await;
    }

    #[tokio::test]
    async fn quit_broadcast_reaches_each_peer_once() {
        let state = new_state();
        let (a, _arx) = attach_client(&state, "alice").await;
        let (b, mut brx) = attach_client(&state, "bob").await;
        let a_id = a.id().await;
        let b_id = b.id().await;

        for name in ["#one", "#two"] {
            let (channel, _) = state.get_or_create_channel(name);
            channel.add_member(a_id);
            channel.add_member(b_id);
            a.client.write().await.joined.insert(name.to_string());
            b.client.write().await.joined.insert(name.to_string());
        }

        state.remove_client(a_id, "gone").await;
        let first = brx.try_recv().expect("one QUIT line");
        assert!(first.contains("QUIT :gone"), "{first}");
        assert!(brx.try_recv().is_err(), "no duplicate QUIT");
        assert_invariants(&state).await;
    }
}
