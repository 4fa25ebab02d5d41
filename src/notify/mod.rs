//! User-facing notifications.
//!
//! [`NotificationBus`] is owned by the application root and fans typed
//! notifications out to subscribers. [`ToastFeed`] is the subscriber the
//! pages read from: it keeps the most recent notifications until they expire.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::config::NotificationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: Level,
    pub title: String,
    pub message: Option<String>,
    /// Overrides the feed's default display time
    pub duration: Option<Duration>,
}

impl Notification {
    pub fn new(level: Level, title: impl Into<String>, message: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            message,
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

pub type SubscriberId = u64;

/// Receiving half handed out by [`NotificationBus::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub rx: mpsc::UnboundedReceiver<Notification>,
}

#[derive(Default)]
struct BusInner {
    subscribers: Mutex<HashMap<SubscriberId, mpsc::UnboundedSender<Notification>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

/// Fan-out of notifications to any number of subscribers.
///
/// Cloning shares the same bus.
#[derive(Clone, Default)]
pub struct NotificationBus {
    inner: Arc<BusInner>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. After [`shutdown`](Self::shutdown) the returned
    /// receiver is already closed.
    pub fn subscribe(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        if !self.inner.closed.load(Ordering::Acquire) {
            lock(&self.inner.subscribers).insert(id, tx);
        }
        Subscription { id, rx }
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        lock(&self.inner.subscribers).remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    /// Deliver to every live subscriber; returns how many received it.
    /// Subscribers whose receiver was dropped are pruned.
    pub fn emit(&self, notification: Notification) -> usize {
        if self.inner.closed.load(Ordering::Acquire) {
            return 0;
        }
        debug!(level = notification.level.as_str(), title = %notification.title, "notification");
        let mut subscribers = lock(&self.inner.subscribers);
        subscribers.retain(|_, tx| tx.send(notification.clone()).is_ok());
        subscribers.len()
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.emit_level(Level::Success, title.into(), message.into())
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.emit_level(Level::Error, title.into(), message.into())
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.emit_level(Level::Warning, title.into(), message.into())
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.emit_level(Level::Info, title.into(), message.into())
    }

    fn emit_level(&self, level: Level, title: String, message: String) -> Uuid {
        let message = (!message.is_empty()).then_some(message);
        let notification = Notification::new(level, title, message);
        let id = notification.id;
        self.emit(notification);
        id
    }

    /// Drop every subscriber and refuse further emits. Subscriber tasks
    /// observe their channel closing and finish.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::Release);
        lock(&self.inner.subscribers).clear();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone)]
struct Toast {
    notification: Notification,
    expires_at: Instant,
}

struct FeedInner {
    toasts: Mutex<VecDeque<Toast>>,
    default_duration: Duration,
    max_visible: usize,
}

/// Recent notifications for display, newest last.
#[derive(Clone)]
pub struct ToastFeed {
    inner: Arc<FeedInner>,
}

impl ToastFeed {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                toasts: Mutex::new(VecDeque::new()),
                default_duration: config.toast_duration,
                max_visible: config.max_visible.max(1),
            }),
        }
    }

    /// Subscribe a new feed to `bus`. The task ends when the bus shuts down.
    pub fn spawn(bus: &NotificationBus, config: &NotificationConfig) -> (Self, JoinHandle<()>) {
        let feed = Self::new(config);
        let mut subscription = bus.subscribe();
        let sink = feed.clone();
        let handle = tokio::spawn(async move {
            while let Some(notification) = subscription.rx.recv().await {
                sink.push(notification);
            }
            debug!(subscriber = subscription.id, "toast feed closed");
        });
        (feed, handle)
    }

    pub fn push(&self, notification: Notification) {
        self.push_at(notification, Instant::now());
    }

    fn push_at(&self, notification: Notification, now: Instant) {
        let ttl = notification.duration.unwrap_or(self.inner.default_duration);
        let mut toasts = lock(&self.inner.toasts);
        toasts.push_back(Toast {
            notification,
            expires_at: now + ttl,
        });
        while toasts.len() > self.inner.max_visible {
            toasts.pop_front();
        }
    }

    /// Unexpired notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.active_at(Instant::now())
    }

    fn active_at(&self, now: Instant) -> Vec<Notification> {
        let mut toasts = lock(&self.inner.toasts);
        toasts.retain(|t| t.expires_at > now);
        toasts.iter().map(|t| t.notification.clone()).collect()
    }

    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut toasts = lock(&self.inner.toasts);
        let before = toasts.len();
        toasts.retain(|t| t.notification.id != id);
        toasts.len() != before
    }

    pub fn clear(&self) {
        lock(&self.inner.toasts).clear();
    }
}
