use log::debug;
use serde::Serialize;

use crate::world::ActorId;

pub const DEFAULT_TICKLE_INTERVAL_MS: u32 = 10;

#[derive(Debug, Clone, Serialize)]
struct TickleClient {
    id: ActorId,
    interval: u32,
    last_tickle: Option<u64>,
    pending_removal: bool,
}

/// Cooperative per-frame callback registry.
///
/// The scheduler only decides who is due; the world performs the calls. A
/// client unregistered while a pass is running is flagged and swept in
/// [`TickleScheduler::end_pass`], so the due list handed out by
/// [`TickleScheduler::begin_pass`] never has to be mutated mid-iteration.
#[derive(Debug, Default, Clone, Serialize)]
pub struct TickleScheduler {
    clients: Vec<TickleClient>,
    in_pass: bool,
}

impl TickleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_client(&mut self, id: ActorId, interval: u32) {
        if let Some(client) = self.clients.iter_mut().find(|client| client.id == id) {
            client.pending_removal = false;
            client.interval = interval;
            return;
        }
        debug!("[tickle] register {id} every {interval}ms");
        self.clients.push(TickleClient {
            id,
            interval,
            last_tickle: None,
            pending_removal: false,
        });
    }

    /// Remove `id` from the tickle set. Unknown or already removed clients
    /// are ignored. Returns whether anything changed.
    pub fn unregister_client(&mut self, id: ActorId) -> bool {
        let Some(index) = self
            .clients
            .iter()
            .position(|client| client.id == id && !client.pending_removal)
        else {
            return false;
        };

        if self.in_pass {
            self.clients[index].pending_removal = true;
        } else {
            self.clients.remove(index);
        }
        debug!("[tickle] unregister {id}");
        true
    }

    pub fn is_registered(&self, id: ActorId) -> bool {
        self.clients
            .iter()
            .any(|client| client.id == id && !client.pending_removal)
    }

    pub fn client_interval(&self, id: ActorId) -> Option<u32> {
        self.clients
            .iter()
            .find(|client| client.id == id && !client.pending_removal)
            .map(|client| client.interval)
    }

    pub fn set_client_interval(&mut self, id: ActorId, interval: u32) -> bool {
        match self
            .clients
            .iter_mut()
            .find(|client| client.id == id && !client.pending_removal)
        {
            Some(client) => {
                client.interval = interval;
                true
            }
            None => false,
        }
    }

    /// Start a pass at time `now` and return the clients that are due, in
    /// registration order.
    pub fn begin_pass(&mut self, now: u64) -> Vec<ActorId> {
        self.in_pass = true;
        let mut due = Vec::new();
        for client in self.clients.iter_mut().filter(|client| !client.pending_removal) {
            let ready = match client.last_tickle {
                Some(last) => now.saturating_sub(last) >= u64::from(client.interval),
                None => true,
            };
            if ready {
                client.last_tickle = Some(now);
                due.push(client.id);
            }
        }
        due
    }

    pub fn end_pass(&mut self) {
        self.in_pass = false;
        self.clients.retain(|client| !client.pending_removal);
    }

    pub fn len(&self) -> usize {
        self.clients
            .iter()
            .filter(|client| !client.pending_removal)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clients(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.clients
            .iter()
            .filter(|client| !client.pending_removal)
            .map(|client| client.id)
    }
}
