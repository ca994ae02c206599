use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::debug;

/// Quiescence window for the free-text search and the price slider
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// A value whose changes only become visible after they have been stable
/// for a fixed window.
///
/// The clock is passed in by the caller, which keeps the cell free of timers
/// and lets the marketplace drive it from its own loop.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    committed: T,
    pending: Option<(T, Instant)>,
    window: Duration,
}

impl<T: Clone + PartialEq> Debounced<T> {
    pub fn new(initial: T) -> Self {
        Self::with_window(initial, SEARCH_DEBOUNCE)
    }

    pub fn with_window(initial: T, window: Duration) -> Self {
        Self {
            committed: initial,
            pending: None,
            window,
        }
    }

    /// Record a new input. Restarts the window.
    pub fn set(&mut self, value: T, now: Instant) {
        if value == self.committed {
            self.pending = None;
        } else {
            self.pending = Some((value, now));
        }
    }

    /// Commit the pending value if it has settled. Returns true when the
    /// committed value changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let settled = matches!(
            &self.pending,
            Some((_, changed_at)) if now.saturating_duration_since(*changed_at) >= self.window
        );
        if !settled {
            return false;
        }

        match self.pending.take() {
            Some((value, _)) => {
                let changed = value != self.committed;
                self.committed = value;
                changed
            }
            None => false,
        }
    }

    /// Replace the value immediately, discarding anything pending.
    pub fn reset(&mut self, value: T) {
        self.pending = None;
        self.committed = value;
    }

    /// The value downstream consumers see.
    pub fn value(&self) -> &T {
        &self.committed
    }

    /// The most recent input, settled or not.
    pub fn latest(&self) -> &T {
        self.pending
            .as_ref()
            .map(|(value, _)| value)
            .unwrap_or(&self.committed)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will settle, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|(_, changed_at)| *changed_at + self.window)
    }
}

/// Forward values from `input` to `output` once they have been stable for
/// `window`. Every new input restarts the timer. A value still pending when
/// the input closes is dropped.
pub async fn debounce_stream<T: Send>(
    mut input: mpsc::Receiver<T>,
    output: mpsc::Sender<T>,
    window: Duration,
) {
    let mut pending: Option<T> = None;
    let timer = time::sleep(window);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            received = input.recv() => match received {
                Some(value) => {
                    pending = Some(value);
                    timer.as_mut().reset(Instant::now() + window);
                }
                None => {
                    if pending.is_some() {
                        debug!("Input closed, dropping unsettled value");
                    }
                    break;
                }
            },
            () = &mut timer, if pending.is_some() => {
                if let Some(value) = pending.take() {
                    if output.send(value).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}
