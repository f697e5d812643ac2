use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient user-facing message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), kind: ToastKind::Success }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self { title: "Error".into(), description: description.into(), kind: ToastKind::Error }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Collects toasts until a view drains them.
#[derive(Clone, Default)]
pub struct ToastQueue {
    inner: Arc<Mutex<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Toast> {
        match self.inner.lock() {
            Ok(mut v) => std::mem::take(&mut *v),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        info!(kind = ?toast.kind, title = %toast.title, "toast");
        match self.inner.lock() {
            Ok(mut v) => v.push(toast),
            Err(poisoned) => poisoned.into_inner().push(toast),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_queue() {
        let q = ToastQueue::new();
        q.notify(Toast::error("boom"));
        q.notify(Toast::success("Done", "ok"));
        assert_eq!(q.len(), 2);
        let got = q.drain();
        assert_eq!(got[0], Toast { title: "Error".into(), description: "boom".into(), kind: ToastKind::Error });
        assert!(q.is_empty());
    }
}
