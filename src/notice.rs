// SPDX-License-Identifier: MPL-2.0

//! Short-lived, non-blocking messages for the user.

use crate::clock::Clock;
use crate::config::{NOTICE_DEFAULT_MS, NOTICE_ERROR_MS};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    fn default_duration(self) -> i64 {
        match self {
            NoticeKind::Error => NOTICE_ERROR_MS,
            NoticeKind::Success | NoticeKind::Info => NOTICE_DEFAULT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: i64,
    pub duration_ms: i64,
}

impl Notice {
    fn expired(&self, now_millis: i64) -> bool {
        now_millis - self.created_at >= self.duration_ms
    }
}

/// Stack of visible notices, oldest first.
pub struct NoticeBoard {
    clock: Arc<dyn Clock>,
    next_id: AtomicU64,
    notices: Mutex<Vec<Notice>>,
}

impl NoticeBoard {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: AtomicU64::new(1),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, kind: NoticeKind, message: &str, duration_ms: Option<i64>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notice = Notice {
            id,
            kind,
            message: message.to_string(),
            created_at: self.clock.now_millis(),
            duration_ms: duration_ms.unwrap_or_else(|| kind.default_duration()),
        };
        self.notices
            .lock()
            .expect("notice lock poisoned")
            .push(notice);
        id
    }

    pub fn success(&self, message: &str) -> u64 {
        self.push(NoticeKind::Success, message, None)
    }

    pub fn error(&self, message: &str) -> u64 {
        self.push(NoticeKind::Error, message, None)
    }

    pub fn info(&self, message: &str) -> u64 {
        self.push(NoticeKind::Info, message, None)
    }

    /// Returns false if the notice was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut notices = self.notices.lock().expect("notice lock poisoned");
        let before = notices.len();
        notices.retain(|n| n.id != id);
        notices.len() != before
    }

    /// Notices still on screen; expired ones are dropped.
    pub fn active(&self) -> Vec<Notice> {
        let now = self.clock.now_millis();
        let mut notices = self.notices.lock().expect("notice lock poisoned");
        notices.retain(|n| !n.expired(now));
        notices.clone()
    }
}
