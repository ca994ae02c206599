use std::future::Future;

use tokio::task::{AbortHandle, JoinHandle};

use crate::error::FetchError;

/// Request bookkeeping for one kind of fetch.
///
/// Every request gets a ticket; only the result carrying the latest ticket
/// is applied, whatever order responses arrive in. Starting a new request
/// aborts the task behind the previous one.
#[derive(Debug)]
pub struct FetchSlot<K, V> {
    key: Option<K>,
    ticket: u64,
    loading: bool,
    handle: Option<JoinHandle<()>>,
    data: Option<V>,
    error: Option<FetchError>,
    generation: u64,
}

impl<K, V> Default for FetchSlot<K, V> {
    fn default() -> Self {
        Self {
            key: None,
            ticket: 0,
            loading: false,
            handle: None,
            data: None,
            error: None,
            generation: 0,
        }
    }
}

/// What a view should render for a slot
#[derive(Debug, PartialEq)]
pub enum Panel<'a, V> {
    /// Nothing requested yet
    Idle,
    /// A request is in flight; earlier data stays visible meanwhile
    Loading { previous: Option<&'a V> },
    Error(&'a FetchError),
    Ready(&'a V),
}

impl<K: PartialEq, V> FetchSlot<K, V> {
    /// Whether `key` differs from what was last requested.
    pub fn needs(&self, key: &K) -> bool {
        self.key.as_ref() != Some(key)
    }

    /// Start a request for `key`, superseding any request in flight.
    pub fn begin(&mut self, key: K) -> u64 {
        self.abort_task();
        self.ticket += 1;
        self.key = Some(key);
        self.loading = true;
        self.ticket
    }

    pub fn attach(&mut self, handle: JoinHandle<()>) {
        self.handle = Some(handle);
    }

    /// Apply a result. Returns false, leaving the slot untouched, when the
    /// ticket has been superseded or cancelled.
    pub fn complete(&mut self, ticket: u64, result: Result<V, FetchError>) -> bool {
        if !self.loading || ticket != self.ticket {
            return false;
        }

        self.loading = false;
        self.handle = None;
        match result {
            Ok(value) => {
                self.data = Some(value);
                self.error = None;
                self.generation += 1;
            }
            Err(err) => self.error = Some(err),
        }
        true
    }

    /// Drop the request in flight, if any. Data already loaded is kept and
    /// the next sync requests again.
    pub fn cancel(&mut self) -> bool {
        if !self.loading {
            return false;
        }
        self.abort_task();
        self.ticket += 1;
        self.loading = false;
        self.key = None;
        true
    }

    /// Forget the last key so the next sync requests again.
    pub fn invalidate(&mut self) {
        self.cancel();
        self.key = None;
    }

    /// Forget everything, including loaded data.
    pub fn clear(&mut self) {
        self.invalidate();
        self.data = None;
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn data(&self) -> Option<&V> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Bumped every time new data is applied.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn panel(&self) -> Panel<'_, V> {
        if self.loading {
            return Panel::Loading {
                previous: self.data.as_ref(),
            };
        }
        match (&self.error, &self.data) {
            (Some(err), _) => Panel::Error(err),
            (None, Some(data)) => Panel::Ready(data),
            (None, None) => Panel::Idle,
        }
    }
}

impl<K, V> FetchSlot<K, V> {
    fn abort_task(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl<K, V> Drop for FetchSlot<K, V> {
    fn drop(&mut self) {
        self.abort_task();
    }
}

/// Run a fetch on a task of its own, so a panicking source comes back as an
/// error rather than as silence. Dropping the returned future aborts the
/// fetch.
pub(crate) async fn isolated<T, F>(fetch: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::spawn(fetch);
    let _abort = AbortOnDrop(task.abort_handle());
    match task.await {
        Ok(result) => result,
        Err(err) => Err(anyhow::Error::new(err).context("fetch task failed")),
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superseded_ticket_is_ignored() {
        let mut slot: FetchSlot<u32, &str> = FetchSlot::default();
        let first = slot.begin(1);
        let second = slot.begin(2);

        assert!(!slot.complete(first, Ok("page one")));
        assert!(slot.data().is_none());
        assert!(slot.is_loading());

        assert!(slot.complete(second, Ok("page two")));
        assert_eq!(slot.data(), Some(&"page two"));
        assert_eq!(slot.generation(), 1);
    }

    #[test]
    fn late_result_after_cancel_is_dropped() {
        let mut slot: FetchSlot<u32, &str> = FetchSlot::default();
        let ticket = slot.begin(1);

        assert!(slot.cancel());
        assert!(!slot.complete(ticket, Ok("late")));
        assert_eq!(slot.panel(), Panel::Idle);
        assert!(slot.needs(&1));
    }

    #[test]
    fn error_keeps_previous_data() {
        let mut slot: FetchSlot<u32, &str> = FetchSlot::default();
        let ticket = slot.begin(1);
        slot.complete(ticket, Ok("loaded"));

        let ticket = slot.begin(2);
        assert_eq!(slot.panel(), Panel::Loading { previous: Some(&"loaded") });
        slot.complete(ticket, Err(FetchError::Listings("timeout".to_string())));

        assert!(matches!(slot.panel(), Panel::Error(FetchError::Listings(_))));
        assert_eq!(slot.data(), Some(&"loaded"));
        assert!(!slot.needs(&2));
    }

    #[test]
    fn invalidate_forces_new_request() {
        let mut slot: FetchSlot<(), u8> = FetchSlot::default();
        let ticket = slot.begin(());
        slot.complete(ticket, Ok(1));
        assert!(!slot.needs(&()));

        slot.invalidate();
        assert!(slot.needs(&()));
        assert_eq!(slot.data(), Some(&1));
    }

    #[tokio::test]
    async fn panicking_fetch_becomes_an_error() {
        let payload: Option<u8> = None;
        let result = isolated(async move { Ok(payload.expect("empty payload")) }).await;

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("fetch task failed"));
    }

    #[tokio::test]
    async fn isolated_fetch_passes_results_through() {
        assert_eq!(isolated(async { Ok(7u8) }).await.unwrap(), 7);

        let failed = isolated(async { Err::<u8, _>(anyhow::anyhow!("timeout")) }).await;
        assert_eq!(failed.unwrap_err().to_string(), "timeout");
    }
}
