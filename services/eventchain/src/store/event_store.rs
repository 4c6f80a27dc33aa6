use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, U256};
use tokio::sync::{mpsc, oneshot};

use crate::types::event_types::{EventDetails, EventRecord};

#[derive(Debug)]
enum Command {
    ReplaceEvents(Vec<EventRecord>, oneshot::Sender<()>),
    MergeEvents(Vec<EventRecord>, oneshot::Sender<()>),
    UpsertDetails(EventDetails, oneshot::Sender<()>),
    RemoveEvent(u64, oneshot::Sender<()>),
    SetPendingWithdrawal(Address, U256, oneshot::Sender<()>),
    GetEvents(oneshot::Sender<Vec<EventRecord>>),
    GetEvent(u64, oneshot::Sender<Option<EventRecord>>),
    GetDetails(u64, oneshot::Sender<Option<EventDetails>>),
    GetEventsByOwner(Address, oneshot::Sender<Vec<EventRecord>>),
    GetPendingWithdrawal(Address, oneshot::Sender<Option<U256>>),
}

/// Handle to the local cache of normalized events.
///
/// Writes are crate-private and only ever carry normalizer output; everything
/// outside the crate reads.
#[derive(Clone)]
pub struct EventStore {
    tx: mpsc::Sender<Command>,
}

impl EventStore {
    pub(crate) async fn replace_events(&self, events: Vec<EventRecord>) {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Command::ReplaceEvents(events, tx)).await;
        let _ = rx.await;
    }

    pub(crate) async fn merge_events(&self, events: Vec<EventRecord>) {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Command::MergeEvents(events, tx)).await;
        let _ = rx.await;
    }

    pub(crate) async fn upsert_details(&self, details: EventDetails) {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Command::UpsertDetails(details, tx)).await;
        let _ = rx.await;
    }

    pub(crate) async fn remove_event(&self, id: u64) {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Command::RemoveEvent(id, tx)).await;
        let _ = rx.await;
    }

    pub(crate) async fn set_pending_withdrawal(&self, account: Address, amount: U256) {
        let (tx, rx) = oneshot::channel();
        let _ = self
            .tx
            .send(Command::SetPendingWithdrawal(account, amount, tx))
            .await;
        let _ = rx.await;
    }

    /// All cached events, ordered by id.
    pub async fn events(&self) -> Vec<EventRecord> {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Command::GetEvents(tx)).await;
        rx.await.unwrap_or_default()
    }

    pub async fn event(&self, id: u64) -> Option<EventRecord> {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Command::GetEvent(id, tx)).await;
        rx.await.ok().flatten()
    }

    /// The event with its attendee set, if the set has been loaded.
    pub async fn details(&self, id: u64) -> Option<EventDetails> {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Command::GetDetails(id, tx)).await;
        rx.await.ok().flatten()
    }

    pub async fn events_by_owner(&self, owner: Address) -> Vec<EventRecord> {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Command::GetEventsByOwner(owner, tx)).await;
        rx.await.unwrap_or_default()
    }

    pub async fn pending_withdrawal(&self, account: Address) -> Option<U256> {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Command::GetPendingWithdrawal(account, tx)).await;
        rx.await.ok().flatten()
    }
}

pub fn spawn_event_store() -> EventStore {
    let (tx, mut rx) = mpsc::channel::<Command>(256);

    tokio::spawn(async move {
        let mut events: BTreeMap<u64, EventRecord> = BTreeMap::new();
        let mut attendees: HashMap<u64, Vec<Address>> = HashMap::new();
        let mut withdrawals: HashMap<Address, U256> = HashMap::new();

        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::ReplaceEvents(list, reply) => {
                    events = list
                        .into_iter()
                        .filter(|event| event.exists)
                        .map(|event| (event.id, event))
                        .collect();
                    attendees.retain(|id, _| events.contains_key(id));
                    let _ = reply.send(());
                }
                Command::MergeEvents(list, reply) => {
                    for event in list {
                        if event.exists {
                            events.insert(event.id, event);
                        } else {
                            events.remove(&event.id);
                            attendees.remove(&event.id);
                        }
                    }
                    let _ = reply.send(());
                }
                Command::UpsertDetails(details, reply) => {
                    let id = details.event.id;
                    events.insert(id, details.event);
                    attendees.insert(id, details.attendees);
                    let _ = reply.send(());
                }
                Command::RemoveEvent(id, reply) => {
                    events.remove(&id);
                    attendees.remove(&id);
                    let _ = reply.send(());
                }
                Command::SetPendingWithdrawal(account, amount, reply) => {
                    withdrawals.insert(account, amount);
                    let _ = reply.send(());
                }
                Command::GetEvents(reply) => {
                    let _ = reply.send(events.values().cloned().collect());
                }
                Command::GetEvent(id, reply) => {
                    let _ = reply.send(events.get(&id).cloned());
                }
                Command::GetDetails(id, reply) => {
                    let details = events.get(&id).and_then(|event| {
                        attendees.get(&id).map(|list| EventDetails {
                            event: event.clone(),
                            attendees: list.clone(),
                        })
                    });
                    let _ = reply.send(details);
                }
                Command::GetEventsByOwner(owner, reply) => {
                    let owned = events
                        .values()
                        .filter(|event| event.owner == owner)
                        .cloned()
                        .collect();
                    let _ = reply.send(owned);
                }
                Command::GetPendingWithdrawal(account, reply) => {
                    let _ = reply.send(withdrawals.get(&account).copied());
                }
            }
        }
    });

    EventStore { tx }
}
