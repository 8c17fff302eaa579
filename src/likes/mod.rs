// SPDX-License-Identifier: MPL-2.0

pub mod burst;
mod state;
mod sync;

pub use burst::{BurstOverlay, OverlayPhase, OverlaySet, PhaseChange};
pub use state::{LikeState, PendingOp};
pub use sync::{LikeError, LikeSync, SyncOutcome};
