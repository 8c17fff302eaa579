// SPDX-License-Identifier: MPL-2.0

use crate::backend::{ClientError, PostId, RemoteStore, ViewerId};
use crate::clock::Clock;
use crate::likes::burst::{BurstOverlay, OverlayPhase, OverlaySet, PhaseChange, transition};
use crate::likes::state::{LikeState, PendingOp};
use crate::notice::NoticeBoard;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const LIKE_FAILED_NOTICE: &str = "Couldn't update your like. Please try again.";

#[derive(Error, Debug)]
pub enum LikeError {
    /// The remote write failed and the local state was rolled back.
    #[error("could not update like: {0}")]
    Remote(#[from] ClientError),
}

/// What a like command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The change was written remotely and stands.
    Applied,
    /// Another write for this post was still running; nothing was sent.
    InFlight,
    /// No one is signed in; nothing was sent.
    Unauthenticated,
    /// Burst on a post that is already liked; nothing was sent.
    AlreadyLiked,
}

#[derive(Debug, Clone, Copy)]
enum Intent {
    Toggle,
    LikeOnly,
}

/// Keeps one post's like state in step with the remote store.
pub struct LikeSync {
    remote: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
    notices: Option<Arc<NoticeBoard>>,
    state: Mutex<LikeState>,
    overlays: Mutex<OverlaySet>,
}

impl LikeSync {
    /// Build the state for `post_id`, asking the store whether `viewer_id`
    /// already likes it. Lookup failures read as "not liked".
    pub async fn initialize(
        remote: Arc<dyn RemoteStore>,
        clock: Arc<dyn Clock>,
        post_id: PostId,
        viewer_id: Option<ViewerId>,
        like_count: u32,
    ) -> Self {
        let mut state = LikeState::new(post_id, viewer_id, like_count);

        if let Some(viewer) = &state.viewer_id {
            match remote.query_membership(viewer, &state.post_id).await {
                Ok(liked) => state.is_liked = liked,
                Err(e) => {
                    warn!(post = %state.post_id, error = %e, "could not load like status");
                }
            }
        } else {
            debug!(post = %state.post_id, "no viewer, likes are read-only");
        }

        Self {
            remote,
            clock,
            notices: None,
            state: Mutex::new(state),
            overlays: Mutex::new(OverlaySet::new()),
        }
    }

    /// Like [`LikeSync::initialize`], resolving the viewer from the session.
    pub async fn for_current_viewer(
        remote: Arc<dyn RemoteStore>,
        clock: Arc<dyn Clock>,
        post_id: PostId,
        like_count: u32,
    ) -> Self {
        let viewer = match remote.current_identity().await {
            Ok(viewer) => viewer,
            Err(e) => {
                warn!(error = %e, "could not resolve current user");
                None
            }
        };
        Self::initialize(remote, clock, post_id, viewer, like_count).await
    }

    /// Start from nothing but the post: the count comes from the server and
    /// the viewer from the session. An unreadable count starts at zero.
    pub async fn open(
        remote: Arc<dyn RemoteStore>,
        clock: Arc<dyn Clock>,
        post_id: PostId,
    ) -> Self {
        let like_count = match remote.count_memberships(&post_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(post = %post_id, error = %e, "could not load like count");
                0
            }
        };
        Self::for_current_viewer(remote, clock, post_id, like_count).await
    }

    /// Failed writes also post an error notice here.
    pub fn with_notices(mut self, board: Arc<NoticeBoard>) -> Self {
        self.notices = Some(board);
        self
    }

    pub fn state(&self) -> LikeState {
        self.state.lock().expect("like state lock poisoned").clone()
    }

    /// Flip the like. The UI updates immediately; if the remote write fails
    /// the previous state is restored and the error returned.
    pub async fn toggle(&self) -> Result<SyncOutcome, LikeError> {
        self.mutate(Intent::Toggle).await
    }

    /// Double-tap: always spawns a heart, but only ever likes, never unlikes.
    pub async fn burst_like(&self) -> (BurstOverlay, Result<SyncOutcome, LikeError>) {
        let overlay = self
            .overlays
            .lock()
            .expect("overlay lock poisoned")
            .spawn(self.clock.now_millis());
        let outcome = self.mutate(Intent::LikeOnly).await;
        (overlay, outcome)
    }

    /// Overlays on screen at the clock's current time, phases included.
    /// Reading does not consume the changes [`LikeSync::tick`] reports.
    pub fn overlays(&self) -> Vec<BurstOverlay> {
        let now = self.clock.now_millis();
        self.overlays
            .lock()
            .expect("overlay lock poisoned")
            .iter()
            .map(|overlay| BurstOverlay {
                phase: transition(overlay.phase, now.saturating_sub(overlay.created_at)),
                ..overlay.clone()
            })
            .filter(|overlay| overlay.phase != OverlayPhase::Removed)
            .collect()
    }

    /// Advance overlay phases to the clock's current time.
    pub fn tick(&self) -> Vec<PhaseChange> {
        self.overlays
            .lock()
            .expect("overlay lock poisoned")
            .advance(self.clock.now_millis())
    }

    /// Drive overlays with tokio timers until none are left.
    pub async fn animate(&self, mut on_change: impl FnMut(PhaseChange)) {
        loop {
            for change in self.tick() {
                on_change(change);
            }
            let deadline = self
                .overlays
                .lock()
                .expect("overlay lock poisoned")
                .next_deadline();
            let Some(deadline) = deadline else {
                break;
            };
            let wait = (deadline - self.clock.now_millis()).max(1) as u64;
            tokio::time::sleep(Duration::from_millis(wait)).await;
        }
    }

    async fn mutate(&self, intent: Intent) -> Result<SyncOutcome, LikeError> {
        let (viewer, post, before, op) = {
            let mut state = self.state.lock().expect("like state lock poisoned");
            let Some(viewer) = state.viewer_id.clone() else {
                return Ok(SyncOutcome::Unauthenticated);
            };
            if state.pending.is_some() {
                debug!(post = %state.post_id, "like write already in flight, dropping");
                return Ok(SyncOutcome::InFlight);
            }
            let op = match intent {
                Intent::LikeOnly if state.is_liked => return Ok(SyncOutcome::AlreadyLiked),
                Intent::LikeOnly => PendingOp::Like,
                Intent::Toggle if state.is_liked => PendingOp::Unlike,
                Intent::Toggle => PendingOp::Like,
            };
            let before = state.clone();
            state.begin(op);
            (viewer, state.post_id.clone(), before, op)
        };

        let result = match op {
            PendingOp::Like => self.remote.insert_membership(&viewer, &post).await,
            PendingOp::Unlike => self.remote.delete_membership(&viewer, &post).await,
        };

        match result {
            Ok(()) => {
                let server_count = self.reconcile_count(&post).await;
                let mut state = self.state.lock().expect("like state lock poisoned");
                if let Some(count) = server_count {
                    state.like_count = count;
                }
                state.pending = None;
                Ok(SyncOutcome::Applied)
            }
            Err(e) => {
                warn!(post = %post, ?op, error = %e, "like write failed, rolling back");
                *self.state.lock().expect("like state lock poisoned") = before;
                if let Some(board) = &self.notices {
                    board.error(LIKE_FAILED_NOTICE);
                }
                Err(LikeError::Remote(e))
            }
        }
    }

    /// Adopt the server's like count and mirror it onto the post record.
    /// `None` keeps the optimistic count.
    async fn reconcile_count(&self, post: &PostId) -> Option<u32> {
        let count = match self.remote.count_memberships(post).await {
            Ok(count) => count,
            Err(e) => {
                debug!(post = %post, error = %e, "could not refresh like count");
                return None;
            }
        };
        if let Err(e) = self.remote.update_like_count(post, count).await {
            debug!(post = %post, error = %e, "could not store like count");
        }
        Some(count)
    }
}
