use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Lifecycle of one piece of remotely loaded data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Remote<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Remote::Idle
    }
}

impl<T> Remote<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(v) => Some(v),
            _ => None,
        }
    }
}

struct SlotInner<S> {
    token: CancellationToken,
    state: S,
}

/// State owned by one view plus the token of its most recent load.
/// Starting a load cancels the previous token; a finished load is applied
/// only while its token is still current, so a superseded response never
/// lands. Both checks happen under the same lock.
pub struct Slot<S> {
    inner: Arc<Mutex<SlotInner<S>>>,
}

impl<S> Clone for Slot<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Default> Default for Slot<S> {
    fn default() -> Self {
        Self::with_state(S::default())
    }
}

impl<S> Slot<S> {
    pub fn with_state(state: S) -> Self {
        let token = CancellationToken::new();
        token.cancel();
        Self {
            inner: Arc::new(Mutex::new(SlotInner { token, state })),
        }
    }

    /// Supersedes whatever is in flight, applies `f` and returns the token
    /// for the new load.
    pub fn begin(&self, f: impl FnOnce(&mut S)) -> CancellationToken {
        let mut inner = self.inner.lock();
        inner.token.cancel();
        inner.token = CancellationToken::new();
        f(&mut inner.state);
        inner.token.clone()
    }

    /// Applies `f` unless `token` has been superseded or cancelled.
    /// Returns whether it was applied.
    pub fn finish(&self, token: &CancellationToken, f: impl FnOnce(&mut S)) -> bool {
        let mut inner = self.inner.lock();
        if token.is_cancelled() {
            return false;
        }
        f(&mut inner.state);
        true
    }

    /// Drops any in-flight result; the state is left as is.
    pub fn cancel(&self) {
        self.inner.lock().token.cancel();
    }

    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.lock().state)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.lock().state)
    }
}

impl<S: Clone> Slot<S> {
    pub fn snapshot(&self) -> S {
        self.inner.lock().state.clone()
    }
}

impl<T> Slot<Remote<T>> {
    pub fn begin_loading(&self) -> CancellationToken {
        self.begin(|s| *s = Remote::Loading)
    }

    pub fn complete(&self, token: &CancellationToken, state: Remote<T>) -> bool {
        self.finish(token, |s| *s = state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_load_wins_over_older_result() {
        let slot: Slot<Remote<u32>> = Slot::default();
        let first = slot.begin_loading();
        let second = slot.begin_loading();

        assert!(slot.complete(&second, Remote::Ready(2)));
        assert!(!slot.complete(&first, Remote::Ready(1)));
        assert_eq!(slot.snapshot(), Remote::Ready(2));
    }

    #[test]
    fn stale_result_cannot_land_after_newer_begin() {
        let slot: Slot<Remote<u32>> = Slot::default();
        let first = slot.begin_loading();
        let _second = slot.begin_loading();
        assert!(!slot.complete(&first, Remote::Ready(1)));
        assert!(slot.snapshot().is_loading());
    }

    #[test]
    fn cancel_keeps_state_but_drops_result() {
        let slot: Slot<Remote<u32>> = Slot::default();
        let t = slot.begin_loading();
        slot.cancel();
        assert!(!slot.complete(&t, Remote::Failed("late".into())));
        assert_eq!(slot.snapshot(), Remote::Loading);
    }

    #[test]
    fn begin_can_keep_previous_state_visible() {
        let slot = Slot::with_state((false, Some("old")));
        let t = slot.begin(|s| s.0 = true);
        assert_eq!(slot.snapshot(), (true, Some("old")));
        assert!(slot.finish(&t, |s| *s = (false, Some("new"))));
        assert_eq!(slot.snapshot(), (false, Some("new")));
    }

    #[test]
    fn fresh_slot_is_idle() {
        let slot: Slot<Remote<()>> = Slot::default();
        assert_eq!(slot.snapshot(), Remote::Idle);
    }
}
