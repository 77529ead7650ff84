// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Hub
//!
//! Accepts published change events and fans them out to subscribed push
//! clients.
//!
//! ## Contracts
//!
//! - `publish` never blocks the request path: the hub buffer is bounded and
//!   overflow drops the event with a counter increment
//! - delivery is FIFO per subscriber (one fan-out task drains the publish
//!   queue in order); no ordering across subscribers
//! - a subscriber whose outbound queue is full loses the event; after
//!   `max_consecutive_drops` consecutive losses it is disconnected and its
//!   pending events are discarded
//! - every permission tag on the event must pass the permission port for
//!   the subscriber's username; a port failure counts as a denial for that
//!   delivery
//!
//! The registry lock is never held across an await: fan-out snapshots the
//! subscriber list, then delivers.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use worktrack_domain::services::PermissionService;
use worktrack_domain::ChangeEvent;

use super::subscription::SubscriptionFilter;
use crate::infrastructure::config::EventSettings;

/// Monotonically increasing hub counters, readable by tests and logs.
#[derive(Debug, Default)]
pub struct HubCounters {
    pub published: AtomicU64,
    pub delivered: AtomicU64,
    /// Events lost at the publish queue.
    pub dropped_publish: AtomicU64,
    /// Events lost at a subscriber queue.
    pub dropped_subscriber: AtomicU64,
    pub disconnected: AtomicU64,
}

struct Subscriber {
    username: String,
    filter: SubscriptionFilter,
    sender: mpsc::Sender<ChangeEvent>,
    consecutive_drops: AtomicU32,
}

struct HubInner {
    subscribers: Mutex<HashMap<u64, Arc<Subscriber>>>,
    permissions: Arc<dyn PermissionService>,
    counters: HubCounters,
    subscriber_buffer: usize,
    max_consecutive_drops: u32,
    next_id: AtomicU64,
}

/// A registered push subscription.
pub struct Subscription {
    pub id: u64,
    /// Delivered events; closed when the hub disconnects the subscriber.
    pub receiver: mpsc::Receiver<ChangeEvent>,
}

/// The shared fan-out hub.
#[derive(Clone)]
pub struct EventHub {
    publish_tx: mpsc::Sender<ChangeEvent>,
    inner: Arc<HubInner>,
}

impl EventHub {
    /// Creates the hub and spawns its fan-out task.
    ///
    /// The task ends once every hub handle is dropped.
    pub fn start(permissions: Arc<dyn PermissionService>, settings: &EventSettings) -> Self {
        let (publish_tx, mut publish_rx) = mpsc::channel::<ChangeEvent>(settings.publish_buffer);

        let inner = Arc::new(HubInner {
            subscribers: Mutex::new(HashMap::new()),
            permissions,
            counters: HubCounters::default(),
            subscriber_buffer: settings.subscriber_buffer,
            max_consecutive_drops: settings.max_consecutive_drops,
            next_id: AtomicU64::new(1),
        });

        let fan_out_inner = Arc::clone(&inner);
        tokio::spawn(async move {
            while let Some(event) = publish_rx.recv().await {
                fan_out(&fan_out_inner, event).await;
            }
            debug!("event hub fan-out task stopped");
        });

        Self { publish_tx, inner }
    }

    /// Publishes an event; never blocks.
    ///
    /// A full or closed publish queue drops the event with a counter
    /// increment. Emission failures must not surface to the request path.
    pub fn publish(&self, event: ChangeEvent) {
        self.inner.counters.published.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = self.publish_tx.try_send(event) {
            self.inner.counters.dropped_publish.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "event dropped at publish queue");
        }
    }

    /// Registers a subscriber and returns its delivery channel.
    pub fn subscribe(&self, username: impl Into<String>, filter: SubscriptionFilter) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.inner.subscriber_buffer);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        let subscriber = Arc::new(Subscriber {
            username: username.into(),
            filter,
            sender,
            consecutive_drops: AtomicU32::new(0),
        });

        self.inner.subscribers.lock().insert(id, subscriber);
        debug!(subscriber = id, "push subscriber registered");
        Subscription { id, receiver }
    }

    /// Removes a subscriber; pending events are discarded with the channel.
    pub fn unsubscribe(&self, id: u64) {
        if self.inner.subscribers.lock().remove(&id).is_some() {
            debug!(subscriber = id, "push subscriber removed");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    pub fn counters(&self) -> &HubCounters {
        &self.inner.counters
    }
}

/// Delivers one event to every matching, permitted subscriber.
async fn fan_out(inner: &Arc<HubInner>, event: ChangeEvent) {
    // Snapshot under the lock; deliveries run lock-free.
    let snapshot: Vec<(u64, Arc<Subscriber>)> = inner
        .subscribers
        .lock()
        .iter()
        .map(|(id, s)| (*id, Arc::clone(s)))
        .collect();

    let mut to_disconnect: Vec<u64> = Vec::new();

    for (id, subscriber) in snapshot {
        if !subscriber.filter.matches(&event) {
            continue;
        }
        if !permitted(inner, &subscriber.username, &event).await {
            continue;
        }

        match subscriber.sender.try_send(event.clone()) {
            Ok(()) => {
                subscriber.consecutive_drops.store(0, Ordering::Relaxed);
                inner.counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                inner.counters.dropped_subscriber.fetch_add(1, Ordering::Relaxed);
                let drops = subscriber.consecutive_drops.fetch_add(1, Ordering::Relaxed) + 1;
                if drops >= inner.max_consecutive_drops {
                    warn!(subscriber = id, drops, "slow subscriber disconnected");
                    to_disconnect.push(id);
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                to_disconnect.push(id);
            }
        }
    }

    if !to_disconnect.is_empty() {
        let mut subscribers = inner.subscribers.lock();
        for id in to_disconnect {
            if subscribers.remove(&id).is_some() {
                inner.counters.disconnected.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Every permission tag on the event must pass for the subscriber.
async fn permitted(inner: &Arc<HubInner>, username: &str, event: &ChangeEvent) -> bool {
    for tag in &event.context.permissions {
        match inner.permissions.check(username, &event.object_type, tag).await {
            Ok(decision) if decision.is_allowed() => {}
            Ok(_) => return false,
            Err(e) => {
                warn!(error = %e, "permission check failed during fan-out, withholding delivery");
                return false;
            }
        }
    }
    true
}
