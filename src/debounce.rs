use std::future::Future;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending,
}

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    pending: Option<Pending>,
}

// Only the latest scheduled callback fires; one already running is left alone.
#[derive(Clone)]
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    slot: Arc<Mutex<Slot>>,
}

impl Debouncer {
    /// Binds to the current runtime, so this must be called inside one.
    pub fn new(delay: Duration) -> Self {
        Self::with_handle(delay, Handle::current())
    }

    pub fn with_handle(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Arm the timer; `callback` runs once `delay` passes with no newer call.
    /// Safe to call from threads outside the runtime.
    pub fn schedule<F, Fut>(&self, callback: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = lock(&self.slot);
        if let Some(prev) = slot.pending.take() {
            debug!("debounce: replacing pending callback {}", prev.generation);
            prev.handle.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;

        let delay = self.delay;
        let shared: Weak<Mutex<Slot>> = Arc::downgrade(&self.slot);
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                // Every Debouncer handle is gone
                let Some(shared) = shared.upgrade() else {
                    return;
                };
                let mut slot = lock(&shared);
                // Lost a race with schedule/cancel
                if slot.generation != generation {
                    return;
                }
                slot.pending = None;
            }
            callback().await;
        });

        slot.pending = Some(Pending { generation, handle });
    }

    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        if let Some(prev) = slot.pending.take() {
            prev.handle.abort();
        }
    }

    pub fn state(&self) -> DebounceState {
        if lock(&self.slot).pending.is_some() {
            DebounceState::Pending
        } else {
            DebounceState::Idle
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

fn lock(slot: &Mutex<Slot>) -> std::sync::MutexGuard<'_, Slot> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
