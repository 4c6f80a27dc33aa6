use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use log::{info, warn};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::errors::EventChainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected { account: Address, chain_id: u64 },
}

impl ConnectionState {
    pub fn account(&self) -> Option<Address> {
        match self {
            ConnectionState::Connected { account, .. } => Some(*account),
            ConnectionState::Disconnected => None,
        }
    }
}

type SubscriberMap = HashMap<String, JoinHandle<()>>;

/// The connected wallet, shared by everything that needs an account.
///
/// Listeners are registered by name; registering the same name again replaces
/// the previous listener.
#[derive(Clone)]
pub struct WalletSession {
    state: Arc<watch::Sender<ConnectionState>>,
    subscribers: Arc<Mutex<SubscriberMap>>,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletSession {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            state: Arc::new(tx),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn connect(&self, account: Address, chain_id: u64) {
        self.state
            .send_replace(ConnectionState::Connected { account, chain_id });
        info!("Wallet connected: {} on chain {}", account, chain_id);
    }

    /// Account change reported by the wallet. Ignored while disconnected.
    pub fn switch_account(&self, account: Address) {
        let changed = self.state.send_if_modified(|state| match state {
            ConnectionState::Connected {
                account: current, ..
            } if *current != account => {
                *current = account;
                true
            }
            _ => false,
        });
        if changed {
            info!("Wallet account switched to {}", account);
        }
    }

    pub fn disconnect(&self) {
        let previous = self.state.send_replace(ConnectionState::Disconnected);
        if previous != ConnectionState::Disconnected {
            info!("Wallet disconnected");
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn account(&self) -> Option<Address> {
        self.state().account()
    }

    pub fn require_account(&self) -> Result<Address, EventChainError> {
        self.account().ok_or_else(|| {
            EventChainError::Validation("Please connect your wallet first".into())
        })
    }

    pub fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Runs `handler` with the current state and again after every change.
    pub async fn subscribe<F>(&self, name: &str, handler: F)
    where
        F: Fn(ConnectionState) + Send + Sync + 'static,
    {
        let mut guard = self.subscribers.lock().await;
        if let Some(handle) = guard.remove(name) {
            handle.abort();
            warn!("Replaced existing wallet listener {}", name);
        }

        let mut rx = self.state.subscribe();
        let task = tokio::spawn(async move {
            let current = *rx.borrow_and_update();
            handler(current);
            while rx.changed().await.is_ok() {
                let next = *rx.borrow_and_update();
                handler(next);
            }
        });

        guard.insert(name.to_string(), task);
    }

    pub async fn unsubscribe(&self, name: &str) {
        let mut guard = self.subscribers.lock().await;
        if let Some(handle) = guard.remove(name) {
            handle.abort();
            info!("Removed wallet listener {}", name);
        }
    }
}
