//! Subscription handles and a polling driver for adapters without push
//! notifications.

use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::adapter::{AdapterResult, IncomingCallback, IncomingTransfer};

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Id of the subscription whose callback is running on this thread.
    static DELIVERING: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Handle to a live subscription.
///
/// Clones share the same subscription. `unsubscribe` is idempotent, and once
/// it returns the callback will not run again; a delivery already running on
/// another thread is waited for. Dropping every handle does not stop the
/// subscription.
#[derive(Clone)]
pub struct SubscriptionHandle {
    inner: Arc<Inner>,
}

struct Inner {
    id: u64,
    address: String,
    active: AtomicBool,
    callback: IncomingCallback,
    /// Held for the whole of a callback invocation.
    delivery: Mutex<()>,
    closed: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SubscriptionHandle {
    pub fn new(address: impl Into<String>, callback: IncomingCallback) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                id: NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed),
                address: address.into(),
                active: AtomicBool::new(true),
                callback,
                delivery: Mutex::new(()),
                closed,
                task: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn address(&self) -> &str {
        &self.inner.address
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Runs the callback unless the subscription is closed. Returns whether
    /// it ran.
    ///
    /// A panicking callback closes the subscription before the panic
    /// propagates.
    pub fn deliver(&self, transfer: IncomingTransfer) -> bool {
        let _lock = self
            .inner
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !self.is_active() {
            return false;
        }

        let _delivering = DeliveringGuard::enter(self);
        (self.inner.callback)(transfer);
        true
    }

    /// Ties a background task to this handle. The task is aborted on
    /// unsubscribe, or right away if that already happened.
    pub fn attach_task(&self, task: JoinHandle<()>) {
        let mut slot = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.is_active() {
            *slot = Some(task);
        } else {
            task.abort();
        }
    }

    /// Resolves once the subscription is closed.
    pub async fn closed(&self) {
        let mut rx = self.inner.closed.subscribe();
        // The sender lives as long as `self`, so this cannot fail early.
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Stops delivery. Safe to call any number of times, from any thread,
    /// including from inside the callback.
    pub fn unsubscribe(&self) {
        if !self.close() {
            return;
        }

        // Inside our own callback the delivery lock is already held by us.
        let in_own_callback = DELIVERING.with(|d| d.get() == Some(self.inner.id));
        if !in_own_callback {
            drop(
                self.inner
                    .delivery
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
        }

        tracing::debug!(
            id = self.inner.id,
            address = %self.inner.address,
            "subscription closed"
        );
    }

    /// Marks the subscription closed and aborts its task without waiting for
    /// an in-flight delivery. Returns false if it was already closed.
    fn close(&self) -> bool {
        if !self.inner.active.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.inner.closed.send_replace(true);

        let task = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
        true
    }
}

/// Marks this thread as delivering for one subscription. Restores the
/// previous marker on drop, and closes the subscription if the callback
/// unwound.
struct DeliveringGuard<'a> {
    handle: &'a SubscriptionHandle,
    previous: Option<u64>,
}

impl<'a> DeliveringGuard<'a> {
    fn enter(handle: &'a SubscriptionHandle) -> Self {
        let previous = DELIVERING.with(|d| d.replace(Some(handle.inner.id)));
        Self { handle, previous }
    }
}

impl Drop for DeliveringGuard<'_> {
    fn drop(&mut self) {
        DELIVERING.with(|d| d.set(self.previous));
        if std::thread::panicking() && self.handle.close() {
            tracing::warn!(
                id = self.handle.inner.id,
                address = %self.handle.inner.address,
                "subscription callback panicked, subscription closed"
            );
        }
    }
}

/// Closes the subscription when the polling task ends for any reason.
struct CloseOnDrop(SubscriptionHandle);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        self.0.close();
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.inner.id)
            .field("address", &self.inner.address)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Watches `address` by calling `fetch` every `interval`.
///
/// `fetch` returns the transfers currently visible for the address. The first
/// call happens before this returns and only records what already exists;
/// after that every transfer hash not seen before is delivered exactly once.
/// Fetch errors are logged and the next tick tries again.
pub async fn spawn_polling<F, Fut>(
    address: impl Into<String>,
    interval: Duration,
    callback: IncomingCallback,
    fetch: F,
) -> SubscriptionHandle
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AdapterResult<Vec<IncomingTransfer>>> + Send + 'static,
{
    let address = address.into();
    let handle = SubscriptionHandle::new(address.clone(), callback);

    let mut seen: HashSet<String> = HashSet::new();
    match fetch(address.clone()).await {
        Ok(existing) => seen.extend(existing.into_iter().map(|t| t.tx_hash)),
        Err(e) => tracing::warn!(address = %address, error = %e, "initial poll failed"),
    }

    let task_handle = handle.clone();
    let task = tokio::spawn(async move {
        let _close = CloseOnDrop(task_handle.clone());
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = task_handle.closed() => break,
                _ = ticker.tick() => {}
            }

            let transfers = match fetch(address.clone()).await {
                Ok(transfers) => transfers,
                Err(e) => {
                    tracing::warn!(
                        id = task_handle.id(),
                        address = %address,
                        error = %e,
                        "poll failed, retrying next tick"
                    );
                    continue;
                }
            };

            for transfer in transfers {
                if !seen.insert(transfer.tx_hash.clone()) {
                    continue;
                }
                tracing::info!(
                    id = task_handle.id(),
                    tx_hash = %transfer.tx_hash,
                    amount = %transfer.amount,
                    "incoming transfer"
                );
                if !task_handle.deliver(transfer) {
                    return;
                }
            }
        }
    });
    handle.attach_task(task);

    handle
}
