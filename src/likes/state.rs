// SPDX-License-Identifier: MPL-2.0

use crate::backend::{PostId, ViewerId};

/// The remote write currently in flight for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    Like,
    Unlike,
}

/// A viewer's like status and the post's like count, as the UI shows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeState {
    pub post_id: PostId,
    /// `None` when signed out; every mutation is then a no-op
    pub viewer_id: Option<ViewerId>,
    pub is_liked: bool,
    pub like_count: u32,
    pub pending: Option<PendingOp>,
}

impl LikeState {
    pub fn new(post_id: PostId, viewer_id: Option<ViewerId>, like_count: u32) -> Self {
        Self {
            post_id,
            viewer_id,
            is_liked: false,
            like_count,
            pending: None,
        }
    }

    /// Apply `op` locally and mark it in flight.
    pub(crate) fn begin(&mut self, op: PendingOp) {
        match op {
            PendingOp::Like => {
                self.is_liked = true;
                self.like_count = self.like_count.saturating_add(1);
            }
            PendingOp::Unlike => {
                self.is_liked = false;
                self.like_count = self.like_count.saturating_sub(1);
            }
        }
        self.pending = Some(op);
    }

    /// "1 like", "3 likes"; nothing to show at zero.
    pub fn label(&self) -> Option<String> {
        match self.like_count {
            0 => None,
            1 => Some("1 like".to_string()),
            n => Some(format!("{n} likes")),
        }
    }
}
