//! Fire-and-forget user notifications.

use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Destructive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NotificationKind::Success,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Display) -> Self {
        Self {
            title: title.into(),
            description: description.to_string(),
            kind: NotificationKind::Destructive,
        }
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                log::info!("{}: {}", notification.title, notification.description)
            }
            NotificationKind::Destructive => {
                log::error!("{}: {}", notification.title, notification.description)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::cell::RefCell;

    use super::{Notification, Notifier};

    /// Keeps every notification for later assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub seen: RefCell<Vec<Notification>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.borrow_mut().push(notification);
        }
    }
}
