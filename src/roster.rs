//! Roster of currently connected peers.

use std::sync::Mutex;

/// Default maximum number of tracked connections.
pub const DEFAULT_MAX_CLIENTS: usize = 50;

/// Bounded, insertion-ordered list of peer addresses.
///
/// Guarded by its own lock, independent of the log store's; the two are
/// never held at the same time.
pub struct ClientRoster {
    clients: Mutex<Vec<String>>,
    capacity: usize,
}

impl ClientRoster {
    pub fn new(capacity: usize) -> Self {
        Self {
            clients: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Adds `address`. Returns false, without touching the roster, when full.
    pub fn add(&self, address: &str) -> bool {
        match self.clients.lock() {
            Ok(mut clients) if clients.len() < self.capacity => {
                clients.push(address.to_string());
                true
            }
            _ => false,
        }
    }

    /// Removes the first exact match of `address`, keeping the others in order.
    pub fn remove(&self, address: &str) -> bool {
        let Ok(mut clients) = self.clients.lock() else {
            return false;
        };
        match clients.iter().position(|c| c == address) {
            Some(index) => {
                clients.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.clients
            .lock()
            .map(|clients| clients.iter().any(|c| c == address))
            .unwrap_or(false)
    }

    /// Copies of the connected addresses in connection order.
    pub fn list(&self) -> Vec<String> {
        self.clients
            .lock()
            .map(|clients| clients.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.clients.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
