use tokio::sync::mpsc;
use tracing::{debug, info};

use super::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// A transient notification shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Sending half of the toast channel
#[derive(Debug, Clone)]
pub struct Toasts {
    tx: mpsc::UnboundedSender<Toast>,
}

impl Toasts {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message.into());
    }

    fn push(&self, level: ToastLevel, message: String) {
        if self.tx.send(Toast { level, message }).is_err() {
            debug!("Toast dropped, nobody is listening");
        }
    }
}

/// Sending half of the navigation channel; the shell switches pages on receipt
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl Navigator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn navigate(&self, route: Route) {
        info!("Navigating to {}", route);
        if self.tx.send(route).is_err() {
            debug!("Navigation dropped, shell is gone");
        }
    }
}
