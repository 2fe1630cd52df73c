//! Desktop-notification sinks

use std::fmt::{Display, Formatter};

use async_trait::async_trait;

use crate::task::TaskId;


/// Whether the user allows notifications
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    /// The user has not been asked yet (or has not answered)
    Default,
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Permission::Granted)
    }
}


/// A request to show a reminder to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon_url: String,
    /// The task this reminder is about
    pub task_id: TaskId,
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{} {}", self.title, self.body)
    }
}


/// Something that is able to show notifications to the user
#[async_trait]
pub trait Notifier {
    /// The current permission
    fn permission(&self) -> Permission;

    /// Ask the user for the permission to show notifications.
    ///
    /// This is usually done once, at startup
    async fn request_permission(&mut self) -> Permission;

    /// Show a notification. This is only called when the permission is granted
    fn notify(&mut self, notification: Notification);
}


/// A notifier that sends its notifications to the `log` facade
#[derive(Debug)]
pub struct LogNotifier {
    permission: Permission,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self { permission: Permission::Default }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    async fn request_permission(&mut self) -> Permission {
        // Nobody can refuse log lines
        self.permission = Permission::Granted;
        self.permission
    }

    fn notify(&mut self, notification: Notification) {
        log::info!("{}", notification);
    }
}


/// A notifier that keeps every notification it receives, in memory.
///
/// The permission it answers with is chosen at construction time.
#[derive(Clone, Debug)]
pub struct MemoryNotifier {
    permission: Permission,
    answer: Permission,
    received: Vec<Notification>,
    permission_requests: usize,
}

impl MemoryNotifier {
    /// A notifier whose permission is already `permission`
    pub fn new(permission: Permission) -> Self {
        Self { permission, answer: permission, received: Vec::new(), permission_requests: 0 }
    }

    /// A notifier that has not been asked yet, and will answer `answer` when asked
    pub fn answering(answer: Permission) -> Self {
        Self { permission: Permission::Default, answer, received: Vec::new(), permission_requests: 0 }
    }

    pub fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }

    pub fn received(&self) -> &[Notification] {
        &self.received
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    async fn request_permission(&mut self) -> Permission {
        self.permission_requests += 1;
        self.permission = self.answer;
        self.permission
    }

    fn notify(&mut self, notification: Notification) {
        self.received.push(notification);
    }
}
