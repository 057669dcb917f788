//! Toast notification store
//!
//! A [`NotificationCenter`] owns the list of visible toasts and publishes
//! every new state to its subscribers through a `tokio::sync::watch`
//! channel. Each center is an independent value: create one per UI root,
//! drop it on teardown. A [`Subscription`] unsubscribes when dropped.
//!
//! # Usage
//!
//! ```rust,ignore
//! let center = NotificationCenter::new(1);
//! let mut subscription = center.subscribe();
//!
//! if let Err(e) = client.save_search(&search).await {
//!     center.report_error(&e);
//! }
//!
//! while let Some(state) = subscription.changed().await {
//!     render(&state.toasts);
//! }
//! ```

use crate::core::PreferenceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

/// Default number of toasts kept visible at once
pub const DEFAULT_TOAST_LIMIT: usize = 1;

/// Visual style of a toast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// A toast as rendered by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: ToastVariant,
    /// False once dismissed; the UI animates it out, then it is removed
    pub open: bool,
    pub created_at: DateTime<Utc>,
}

/// What to show in a new toast
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastSpec {
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: ToastVariant,
}

impl ToastSpec {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            title: Some("Success".to_string()),
            description: Some(description.into()),
            variant: ToastVariant::Default,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: Some("Error".to_string()),
            description: Some(description.into()),
            variant: ToastVariant::Destructive,
        }
    }
}

/// Partial change to an existing toast; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: Option<ToastVariant>,
}

/// State transitions of the store
#[derive(Debug, Clone, PartialEq)]
pub enum ToastAction {
    Add(Toast),
    Update { id: Uuid, update: ToastUpdate },
    /// Close one toast, or all of them
    Dismiss(Option<Uuid>),
    /// Drop one toast, or all of them
    Remove(Option<Uuid>),
}

/// Snapshot of the visible toasts, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToastState {
    pub toasts: Vec<Toast>,
}

impl ToastState {
    /// Apply an action, keeping at most `limit` toasts
    pub fn reduce(&mut self, action: ToastAction, limit: usize) {
        match action {
            ToastAction::Add(toast) => {
                self.toasts.insert(0, toast);
                self.toasts.truncate(limit);
            }
            ToastAction::Update { id, update } => {
                if let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id) {
                    if let Some(title) = update.title {
                        toast.title = Some(title);
                    }
                    if let Some(description) = update.description {
                        toast.description = Some(description);
                    }
                    if let Some(variant) = update.variant {
                        toast.variant = variant;
                    }
                }
            }
            ToastAction::Dismiss(target) => {
                for toast in &mut self.toasts {
                    if target.is_none_or(|id| toast.id == id) {
                        toast.open = false;
                    }
                }
            }
            ToastAction::Remove(None) => self.toasts.clear(),
            ToastAction::Remove(Some(id)) => self.toasts.retain(|t| t.id != id),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Toast> {
        self.toasts.iter().find(|t| t.id == id)
    }

    /// Toasts still open
    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().filter(|t| t.open)
    }
}

/// Publish/subscribe store of toast notifications
///
/// Cloning shares the same store.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    sender: Arc<watch::Sender<ToastState>>,
    limit: usize,
}

impl NotificationCenter {
    /// Create a store keeping at most `limit` toasts (at least one)
    pub fn new(limit: usize) -> Self {
        let (sender, _) = watch::channel(ToastState::default());
        Self {
            sender: Arc::new(sender),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Apply an action and notify subscribers
    pub fn dispatch(&self, action: ToastAction) {
        tracing::debug!(?action, "toast action");
        let limit = self.limit;
        self.sender.send_modify(|state| state.reduce(action, limit));
    }

    /// Show a new toast
    pub fn toast(&self, spec: ToastSpec) -> ToastHandle {
        let id = Uuid::new_v4();
        self.dispatch(ToastAction::Add(Toast {
            id,
            title: spec.title,
            description: spec.description,
            variant: spec.variant,
            open: true,
            created_at: Utc::now(),
        }));
        ToastHandle {
            id,
            center: self.clone(),
        }
    }

    /// Show a destructive toast carrying the error's message
    pub fn report_error(&self, error: &PreferenceError) -> ToastHandle {
        tracing::warn!(code = error.error_code(), "{}", error);
        self.toast(ToastSpec::error(error.message()))
    }

    /// Show a success toast
    pub fn report_success(&self, description: impl Into<String>) -> ToastHandle {
        self.toast(ToastSpec::success(description))
    }

    /// Close one toast, or all with `None`
    pub fn dismiss(&self, id: Option<Uuid>) {
        self.dispatch(ToastAction::Dismiss(id));
    }

    /// Drop one toast, or all with `None`
    pub fn remove(&self, id: Option<Uuid>) {
        self.dispatch(ToastAction::Remove(id));
    }

    /// Current state
    pub fn state(&self) -> ToastState {
        self.sender.borrow().clone()
    }

    /// Start observing state changes
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_LIMIT)
    }
}

/// Returned by [`NotificationCenter::toast`] to act on one toast
#[derive(Debug, Clone)]
pub struct ToastHandle {
    pub id: Uuid,
    center: NotificationCenter,
}

impl ToastHandle {
    pub fn dismiss(&self) {
        self.center.dismiss(Some(self.id));
    }

    pub fn update(&self, update: ToastUpdate) {
        self.center.dispatch(ToastAction::Update { id: self.id, update });
    }
}

/// A live view on a [`NotificationCenter`]; dropping it unsubscribes
#[derive(Debug)]
pub struct Subscription {
    receiver: watch::Receiver<ToastState>,
}

impl Subscription {
    /// Wait for the next change and return the new state
    ///
    /// Intermediate states are coalesced. Returns `None` once every handle
    /// to the center is gone.
    pub async fn changed(&mut self) -> Option<ToastState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Latest state, without waiting
    pub fn current(&self) -> ToastState {
        self.receiver.borrow().clone()
    }

    /// Stream of states, starting with the current one
    pub fn into_stream(self) -> WatchStream<ToastState> {
        WatchStream::new(self.receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[test]
    fn test_limit_keeps_newest() {
        let center = NotificationCenter::new(2);
        let first = center.toast(ToastSpec::success("one"));
        let second = center.toast(ToastSpec::success("two"));
        let third = center.toast(ToastSpec::success("three"));

        let ids: Vec<Uuid> = center.state().toasts.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third.id, second.id]);
        assert!(center.state().get(first.id).is_none());
    }

    #[test]
    fn test_default_limit_is_one() {
        let center = NotificationCenter::default();
        center.toast(ToastSpec::success("one"));
        center.toast(ToastSpec::success("two"));
        assert_eq!(center.state().toasts.len(), 1);
        assert_eq!(NotificationCenter::new(0).limit(), 1);
    }

    #[test]
    fn test_dismiss_then_remove() {
        let center = NotificationCenter::new(5);
        let a = center.toast(ToastSpec::success("a"));
        let b = center.toast(ToastSpec::success("b"));

        a.dismiss();
        let state = center.state();
        assert!(!state.get(a.id).unwrap().open);
        assert!(state.get(b.id).unwrap().open);
        assert_eq!(state.visible().count(), 1);

        center.dismiss(None);
        assert_eq!(center.state().visible().count(), 0);

        center.remove(Some(a.id));
        assert_eq!(center.state().toasts.len(), 1);
        center.remove(None);
        assert!(center.state().toasts.is_empty());
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let center = NotificationCenter::new(1);
        let handle = center.toast(ToastSpec::success("saving"));
        handle.update(ToastUpdate {
            description: Some("saved".to_string()),
            ..ToastUpdate::default()
        });

        let state = center.state();
        let toast = state.get(handle.id).unwrap();
        assert_eq!(toast.title.as_deref(), Some("Success"));
        assert_eq!(toast.description.as_deref(), Some("saved"));
    }

    #[test]
    fn test_report_error_uses_error_message() {
        let center = NotificationCenter::default();
        let err = PreferenceError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        let handle = center.report_error(&err);

        let state = center.state();
        let toast = state.get(handle.id).unwrap();
        assert_eq!(toast.variant, ToastVariant::Destructive);
        assert_eq!(toast.description.as_deref(), Some("boom"));
    }

    #[test]
    fn test_centers_are_isolated() {
        let a = NotificationCenter::default();
        let b = NotificationCenter::default();
        a.toast(ToastSpec::success("only in a"));
        assert_eq!(a.state().toasts.len(), 1);
        assert!(b.state().toasts.is_empty());
    }

    #[tokio::test]
    async fn test_subscription_sees_changes() {
        let center = NotificationCenter::default();
        let mut subscription = center.subscribe();
        assert_eq!(center.subscriber_count(), 1);

        let handle = center.toast(ToastSpec::error("failed"));
        let state = subscription.changed().await.unwrap();
        assert_eq!(state.toasts[0].id, handle.id);
        assert_eq!(subscription.current(), state);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let center = NotificationCenter::default();
        let first = center.subscribe();
        let second = center.subscribe();
        assert_eq!(center.subscriber_count(), 2);

        drop(first);
        assert_eq!(center.subscriber_count(), 1);
        drop(second);
        assert_eq!(center.subscriber_count(), 0);

        // Publishing without subscribers still updates the state
        center.toast(ToastSpec::success("nobody listening"));
        assert_eq!(center.state().toasts.len(), 1);
    }

    #[tokio::test]
    async fn test_changed_ends_when_center_dropped() {
        let center = NotificationCenter::default();
        let mut subscription = center.subscribe();
        drop(center);
        assert!(subscription.changed().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_starts_with_current_state() {
        let center = NotificationCenter::default();
        center.toast(ToastSpec::success("already there"));

        let mut stream = center.subscribe().into_stream();
        let state = stream.next().await.unwrap();
        assert_eq!(state.toasts.len(), 1);
    }
}
