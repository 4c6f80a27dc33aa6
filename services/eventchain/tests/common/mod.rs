#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, TxHash, U256};
use chrono::Utc;
use contract_client::{
    ContractCall, ContractGateway, GatewayError, RawEventDetails, RawEventList, RawEventRecord,
    TxReceipt,
};
use eventchain::errors::EventChainError;
use eventchain::services::{
    EventLoader, ImageStorage, TransactionOrchestrator, TxObserver, WalletSession,
};
use eventchain::store::{spawn_event_store, EventStore};
use eventchain::types::event_types::RefundPolicy;
use eventchain::types::form_types::{CreateEventInput, ImageUpload};
use eventchain::types::tx_types::TxOperation;
use tokio::sync::watch;

pub const ALICE: Address = Address::repeat_byte(0xa1);
pub const BOB: Address = Address::repeat_byte(0xb0);
pub const ORGANIZER: Address = Address::repeat_byte(0x0c);
pub const CHAIN_ID: u64 = 5003;
pub const HOUR: u64 = 3_600;

pub fn wei(amount: u64) -> U256 {
    U256::from(amount)
}

pub fn record(owner: Address, start_date: u64, end_date: u64) -> RawEventRecord {
    RawEventRecord {
        owner,
        event_name: "Jazz Night".into(),
        event_card_img_url: "QmPoster".into(),
        event_details: "Live quartet".into(),
        start_date: U256::from(start_date),
        end_date: U256::from(end_date),
        start_time: U256::from(19 * HOUR),
        end_time: U256::from(22 * HOUR),
        event_location: "Thamel, Kathmandu".into(),
        is_active: true,
        ticket_price: wei(1_000),
        funds_held: U256::ZERO,
        minimum_age: U256::from(18u64),
        max_capacity: U256::from(100u64),
        is_canceled: false,
        funds_released: false,
        exists: true,
        refund_policy: U256::from(1u64),
        refund_buffer_hours: U256::ZERO,
    }
}

fn blank_record() -> RawEventRecord {
    RawEventRecord {
        owner: Address::ZERO,
        event_name: String::new(),
        event_card_img_url: String::new(),
        event_details: String::new(),
        start_date: U256::ZERO,
        end_date: U256::ZERO,
        start_time: U256::ZERO,
        end_time: U256::ZERO,
        event_location: String::new(),
        is_active: false,
        ticket_price: U256::ZERO,
        funds_held: U256::ZERO,
        minimum_age: U256::ZERO,
        max_capacity: U256::ZERO,
        is_canceled: false,
        funds_released: false,
        exists: false,
        refund_policy: U256::ZERO,
        refund_buffer_hours: U256::ZERO,
    }
}

#[derive(Default)]
struct ChainState {
    events: BTreeMap<u64, RawEventRecord>,
    attendees: HashMap<u64, Vec<Address>>,
    withdrawals: HashMap<Address, U256>,
    block: u64,
    next_id: u64,
    next_tx: u64,
    submitted: Vec<ContractCall>,
    pending: HashMap<TxHash, (Address, ContractCall)>,
    submit_error: Option<GatewayError>,
    receipt_error: Option<GatewayError>,
    revert_reason: Option<String>,
    list_override: Option<RawEventList>,
    read_error: Option<GatewayError>,
}

impl ChainState {
    fn list(&self, filter: impl Fn(u64, &RawEventRecord) -> bool) -> RawEventList {
        let mut list = RawEventList::default();
        for (id, record) in &self.events {
            if filter(*id, record) {
                list.ids.push(U256::from(*id));
                list.records.push(record.clone());
            }
        }
        list
    }

    fn apply(&mut self, from: Address, call: ContractCall) {
        match call {
            ContractCall::CreateEvent(c) => {
                self.next_id += 1;
                let mut created = record(from, c.start_date, c.end_date);
                created.event_name = c.name;
                created.event_card_img_url = c.image_ref;
                created.event_details = c.details;
                created.event_location = c.location;
                created.start_time = U256::from(c.start_time);
                created.end_time = U256::from(c.end_time);
                created.ticket_price = c.price_wei;
                created.minimum_age = U256::from(c.minimum_age);
                created.max_capacity = U256::from(c.max_capacity);
                created.refund_policy = U256::from(c.refund_policy);
                created.refund_buffer_hours = U256::from(c.refund_buffer_hours);
                self.events.insert(self.next_id, created);
            }
            ContractCall::BuyTicket { event_id, value } => {
                if let Some(event) = self.events.get_mut(&event_id) {
                    event.funds_held += value;
                }
                self.attendees.entry(event_id).or_default().push(from);
            }
            ContractCall::CancelEvent { event_id } => {
                if let Some(event) = self.events.get_mut(&event_id) {
                    event.is_canceled = true;
                    event.is_active = false;
                }
            }
            ContractCall::RequestRefund { event_id } => {
                let price = self
                    .events
                    .get(&event_id)
                    .map(|e| e.ticket_price)
                    .unwrap_or_default();
                if let Some(list) = self.attendees.get_mut(&event_id) {
                    list.retain(|a| *a != from);
                }
                if let Some(event) = self.events.get_mut(&event_id) {
                    event.funds_held = event.funds_held.saturating_sub(price);
                }
                *self.withdrawals.entry(from).or_default() += price;
            }
            ContractCall::ReleaseFunds { event_id } => {
                if let Some(event) = self.events.get_mut(&event_id) {
                    let held = event.funds_held;
                    event.funds_held = U256::ZERO;
                    event.funds_released = true;
                    *self.withdrawals.entry(event.owner).or_default() += held;
                }
            }
            ContractCall::Withdraw => {
                self.withdrawals.insert(from, U256::ZERO);
            }
            ContractCall::DeleteEventById { event_id } => {
                self.events.remove(&event_id);
                self.attendees.remove(&event_id);
            }
        }
    }
}

/// In-memory contract that confirms transactions when the test lets it.
pub struct ScriptedGateway {
    state: Mutex<ChainState>,
    gate: watch::Sender<bool>,
    block_reads: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        let (gate, _rx) = watch::channel(true);
        Self {
            state: Mutex::new(ChainState {
                block: 100,
                ..ChainState::default()
            }),
            gate,
            block_reads: AtomicUsize::new(0),
        }
    }

    pub fn insert_event(&self, id: u64, record: RawEventRecord) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(id);
        state.events.insert(id, record);
    }

    pub fn set_attendees(&self, id: u64, attendees: Vec<Address>) {
        self.state.lock().unwrap().attendees.insert(id, attendees);
    }

    pub fn raw_event(&self, id: u64) -> Option<RawEventRecord> {
        self.state.lock().unwrap().events.get(&id).cloned()
    }

    pub fn hold_confirmations(&self) {
        self.gate.send_replace(false);
    }

    pub fn release_confirmations(&self) {
        self.gate.send_replace(true);
    }

    pub fn fail_submit(&self, error: Option<GatewayError>) {
        self.state.lock().unwrap().submit_error = error;
    }

    pub fn fail_receipt(&self, error: Option<GatewayError>) {
        self.state.lock().unwrap().receipt_error = error;
    }

    pub fn revert_with(&self, reason: Option<&str>) {
        self.state.lock().unwrap().revert_reason = reason.map(str::to_string);
    }

    pub fn fail_reads(&self, error: Option<GatewayError>) {
        self.state.lock().unwrap().read_error = error;
    }

    pub fn override_list(&self, list: Option<RawEventList>) {
        self.state.lock().unwrap().list_override = list;
    }

    pub fn set_block(&self, block: u64) {
        self.state.lock().unwrap().block = block;
    }

    pub fn block_reads(&self) -> usize {
        self.block_reads.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<ContractCall> {
        self.state.lock().unwrap().submitted.clone()
    }

    fn read_error(&self) -> Option<GatewayError> {
        self.state.lock().unwrap().read_error.clone()
    }
}

impl ContractGateway for ScriptedGateway {
    async fn get_all_events(&self) -> Result<RawEventList, GatewayError> {
        if let Some(e) = self.read_error() {
            return Err(e);
        }
        let state = self.state.lock().unwrap();
        if let Some(list) = &state.list_override {
            return Ok(list.clone());
        }
        Ok(state.list(|_, _| true))
    }

    async fn get_event_by_id(&self, event_id: u64) -> Result<RawEventDetails, GatewayError> {
        if let Some(e) = self.read_error() {
            return Err(e);
        }
        let state = self.state.lock().unwrap();
        Ok(RawEventDetails {
            record: state
                .events
                .get(&event_id)
                .cloned()
                .unwrap_or_else(blank_record),
            attendees: state.attendees.get(&event_id).cloned().unwrap_or_default(),
        })
    }

    async fn get_active_events_by_creator(
        &self,
        owner: Address,
    ) -> Result<RawEventList, GatewayError> {
        let state = self.state.lock().unwrap();
        Ok(state.list(|_, r| r.owner == owner && r.is_active))
    }

    async fn get_user_events(&self, user: Address) -> Result<RawEventList, GatewayError> {
        let state = self.state.lock().unwrap();
        let attendees = state.attendees.clone();
        Ok(state.list(move |id, _| {
            attendees
                .get(&id)
                .is_some_and(|list| list.contains(&user))
        }))
    }

    async fn get_pending_withdrawal(&self, account: Address) -> Result<U256, GatewayError> {
        let state = self.state.lock().unwrap();
        Ok(state.withdrawals.get(&account).copied().unwrap_or_default())
    }

    async fn block_number(&self) -> Result<u64, GatewayError> {
        self.block_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().block)
    }

    async fn submit(&self, from: Address, call: ContractCall) -> Result<TxHash, GatewayError> {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.submit_error.clone() {
            return Err(e);
        }
        state.next_tx += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&state.next_tx.to_be_bytes());
        let tx_hash = TxHash::from(bytes);
        state.submitted.push(call.clone());
        state.pending.insert(tx_hash, (from, call));
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, GatewayError> {
        let mut gate = self.gate.subscribe();
        let released = gate.wait_for(|open| *open).await.map(|_| ()).is_ok();
        if !released {
            return Err(GatewayError::Transport("gateway dropped".into()));
        }

        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.receipt_error.clone() {
            return Err(e);
        }
        let (from, call) = state
            .pending
            .remove(&tx_hash)
            .ok_or_else(|| GatewayError::Rpc(format!("unknown transaction {}", tx_hash)))?;
        state.block += 1;
        let block_number = state.block;

        if let Some(reason) = state.revert_reason.clone() {
            return Ok(TxReceipt {
                tx_hash,
                block_number,
                success: false,
                revert_reason: Some(reason),
            });
        }

        state.apply(from, call);
        Ok(TxReceipt {
            tx_hash,
            block_number,
            success: true,
            revert_reason: None,
        })
    }
}

/// Image storage that hands out sequential fake content ids.
#[derive(Default)]
pub struct FakeStorage {
    uploads: AtomicUsize,
    failing: AtomicBool,
}

impl FakeStorage {
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl ImageStorage for FakeStorage {
    async fn upload(&self, _image: &ImageUpload) -> Result<String, EventChainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EventChainError::Storage("pinning service unavailable".into()));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("QmFake{}", n))
    }
}

/// Remembers every transition as `"<key>:<state>"`.
#[derive(Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    fn push(&self, op: &TxOperation, what: &str) {
        self.seen.lock().unwrap().push(format!("{}:{}", op.key, what));
    }
}

impl TxObserver for RecordingObserver {
    fn on_submitting(&self, op: &TxOperation) {
        self.push(op, "submitting");
    }

    fn on_pending_confirmation(&self, op: &TxOperation, _tx_hash: TxHash) {
        self.push(op, "pending");
    }

    fn on_confirmed(&self, op: &TxOperation, _receipt: &TxReceipt) {
        self.push(op, "confirmed");
    }

    fn on_failed(&self, op: &TxOperation, error: &EventChainError) {
        self.push(op, &format!("failed({})", error));
    }
}

pub struct Harness {
    pub gateway: Arc<ScriptedGateway>,
    pub storage: Arc<FakeStorage>,
    pub session: WalletSession,
    pub store: EventStore,
    pub loader: EventLoader<ScriptedGateway>,
    pub observer: Arc<RecordingObserver>,
    pub orchestrator: TransactionOrchestrator<ScriptedGateway, FakeStorage>,
}

pub fn harness_with_timeout(confirmation_timeout: Duration) -> Harness {
    let gateway = Arc::new(ScriptedGateway::new());
    let storage = Arc::new(FakeStorage::default());
    let session = WalletSession::new();
    let store = spawn_event_store();
    let loader = EventLoader::new(gateway.clone(), store.clone());
    let observer = Arc::new(RecordingObserver::default());
    let orchestrator = TransactionOrchestrator::new(
        gateway.clone(),
        storage.clone(),
        loader.clone(),
        session.clone(),
        confirmation_timeout,
    )
    .with_observer(observer.clone());

    Harness {
        gateway,
        storage,
        session,
        store,
        loader,
        observer,
        orchestrator,
    }
}

pub fn harness() -> Harness {
    harness_with_timeout(Duration::from_secs(5))
}

pub fn now_secs() -> u64 {
    Utc::now().timestamp() as u64
}

pub fn create_input() -> CreateEventInput {
    let starts_at = Utc::now() + chrono::Duration::days(3);
    CreateEventInput {
        name: "Rust Nepal Meetup".into(),
        details: "Lightning talks".into(),
        location: "Pulchowk, Lalitpur".into(),
        starts_at: starts_at.fixed_offset(),
        ends_at: (starts_at + chrono::Duration::hours(2)).fixed_offset(),
        ticket_price: "0.01".into(),
        minimum_age: 0,
        max_capacity: 50,
        refund_policy: RefundPolicy::RefundBeforeStart,
        refund_buffer_hours: None,
    }
}

pub fn poster() -> ImageUpload {
    ImageUpload {
        file_name: "poster.png".into(),
        content_type: "image/png".into(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

/// Polls `check` until it holds or a second passes.
pub async fn eventually<F>(check: F) -> bool
where
    F: Fn() -> bool,
{
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
