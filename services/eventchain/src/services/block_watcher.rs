use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use contract_client::ContractGateway;
use log::{error, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

type SubscriberMap = HashMap<String, JoinHandle<()>>;

/// Polls the chain height and notifies named subscribers when a new block
/// appears. One polling task per name.
pub struct BlockWatcher<G> {
    gateway: Arc<G>,
    interval: Duration,
    subscribers: Arc<Mutex<SubscriberMap>>,
}

impl<G> Clone for BlockWatcher<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            interval: self.interval,
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<G: ContractGateway> BlockWatcher<G> {
    pub fn new(gateway: Arc<G>, interval: Duration) -> Self {
        Self {
            gateway,
            interval,
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts polling under `name`, replacing any poller already registered
    /// under it. `handler` runs for the first height seen and for every
    /// higher one after that.
    pub async fn subscribe<F, Fut>(&self, name: &str, handler: F)
    where
        F: Fn(u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut guard = self.subscribers.lock().await;
        if let Some(handle) = guard.remove(name) {
            handle.abort();
            warn!("Replaced existing block subscriber {}", name);
        }

        let gateway = self.gateway.clone();
        let period = self.interval;
        let subscriber = name.to_string();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last_seen: Option<u64> = None;

            loop {
                ticker.tick().await;
                match gateway.block_number().await {
                    Ok(height) => {
                        if last_seen.map_or(true, |last| height > last) {
                            last_seen = Some(height);
                            handler(height).await;
                        }
                    }
                    Err(e) => {
                        error!("Block poll failed for {}: {}", subscriber, e);
                    }
                }
            }
        });

        guard.insert(name.to_string(), task);
    }

    pub async fn unsubscribe(&self, name: &str) {
        let mut guard = self.subscribers.lock().await;
        if let Some(handle) = guard.remove(name) {
            handle.abort();
            info!("Stopped block subscriber {}", name);
        }
    }

    pub async fn stop_all(&self) {
        let mut guard = self.subscribers.lock().await;
        for (name, handle) in guard.drain() {
            handle.abort();
            info!("Stopped block subscriber {}", name);
        }
    }

    pub async fn active_subscriptions(&self) -> usize {
        let guard = self.subscribers.lock().await;
        guard.values().filter(|handle| !handle.is_finished()).count()
    }
}
