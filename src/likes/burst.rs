// SPDX-License-Identifier: MPL-2.0

//! Heart overlays spawned by the double-tap "burst like" gesture.
//!
//! Each overlay walks a fixed timer chain measured from its creation:
//!
//! | elapsed  | phase    |
//! |----------|----------|
//! | 0 ms     | Entering |
//! | 50 ms    | Visible  |
//! | 750 ms   | Exiting  |
//! | 1050 ms  | Removed  |
//!
//! Phase changes are computed by the pure [`transition`] function, so any
//! scheduler can drive them: tokio timers in the app, a virtual clock in tests.
//! Overlays are independent of each other and of the post's like state.

use crate::config::{
    OVERLAY_EXITING_AT_MS, OVERLAY_MAX_OFFSET_PX, OVERLAY_MAX_ROTATION_DEG,
    OVERLAY_REMOVED_AT_MS, OVERLAY_VISIBLE_AT_MS,
};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Overlay ids are unique for the whole process.
static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverlayPhase {
    Entering,
    Visible,
    Exiting,
    Removed,
}

impl OverlayPhase {
    /// Offset from creation at which this phase begins.
    pub const fn starts_at(self) -> i64 {
        match self {
            OverlayPhase::Entering => 0,
            OverlayPhase::Visible => OVERLAY_VISIBLE_AT_MS,
            OverlayPhase::Exiting => OVERLAY_EXITING_AT_MS,
            OverlayPhase::Removed => OVERLAY_REMOVED_AT_MS,
        }
    }

    /// The following phase; `Removed` is terminal.
    pub const fn next(self) -> Option<OverlayPhase> {
        match self {
            OverlayPhase::Entering => Some(OverlayPhase::Visible),
            OverlayPhase::Visible => Some(OverlayPhase::Exiting),
            OverlayPhase::Exiting => Some(OverlayPhase::Removed),
            OverlayPhase::Removed => None,
        }
    }
}

/// Advance `phase` by exactly one step if its successor is due at `elapsed_ms`.
pub fn step(phase: OverlayPhase, elapsed_ms: i64) -> Option<OverlayPhase> {
    phase.next().filter(|next| elapsed_ms >= next.starts_at())
}

/// Phase reached from `phase` once `elapsed_ms` have passed since creation.
/// Never moves backwards and never skips: it walks [`step`] until nothing
/// more is due.
pub fn transition(phase: OverlayPhase, elapsed_ms: i64) -> OverlayPhase {
    let mut current = phase;
    while let Some(next) = step(current, elapsed_ms) {
        current = next;
    }
    current
}

/// One heart on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstOverlay {
    pub id: u64,
    /// Clock time at creation, epoch millis
    pub created_at: i64,
    pub phase: OverlayPhase,
    pub offset_x: f32,
    pub offset_y: f32,
    pub rotation_deg: f32,
}

impl BurstOverlay {
    /// Randomized placement; the values stay fixed for the overlay's lifetime.
    pub fn new<R: Rng + ?Sized>(created_at: i64, rng: &mut R) -> Self {
        Self {
            id: NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed),
            created_at,
            phase: OverlayPhase::Entering,
            offset_x: rng.gen_range(-OVERLAY_MAX_OFFSET_PX..=OVERLAY_MAX_OFFSET_PX),
            offset_y: rng.gen_range(-OVERLAY_MAX_OFFSET_PX..=OVERLAY_MAX_OFFSET_PX),
            rotation_deg: rng.gen_range(-OVERLAY_MAX_ROTATION_DEG..=OVERLAY_MAX_ROTATION_DEG),
        }
    }

    /// When the next phase change is due, `None` once removed.
    pub fn next_deadline(&self) -> Option<i64> {
        self.phase.next().map(|next| self.created_at + next.starts_at())
    }
}

/// A phase change observed while advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub id: u64,
    pub from: OverlayPhase,
    pub to: OverlayPhase,
}

/// Live overlays of one post. Removed overlays are dropped immediately.
#[derive(Debug, Default)]
pub struct OverlaySet {
    overlays: Vec<BurstOverlay>,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, now_millis: i64) -> BurstOverlay {
        self.spawn_with(now_millis, &mut rand::thread_rng())
    }

    pub fn spawn_with<R: Rng + ?Sized>(&mut self, now_millis: i64, rng: &mut R) -> BurstOverlay {
        let overlay = BurstOverlay::new(now_millis, rng);
        self.overlays.push(overlay.clone());
        overlay
    }

    /// Bring every overlay up to `now_millis`, reporting each single-step
    /// change in order.
    pub fn advance(&mut self, now_millis: i64) -> Vec<PhaseChange> {
        let mut changes = Vec::new();
        for overlay in &mut self.overlays {
            let elapsed = now_millis.saturating_sub(overlay.created_at);
            while let Some(next) = step(overlay.phase, elapsed) {
                changes.push(PhaseChange {
                    id: overlay.id,
                    from: overlay.phase,
                    to: next,
                });
                overlay.phase = next;
            }
        }
        self.overlays
            .retain(|overlay| overlay.phase != OverlayPhase::Removed);
        changes
    }

    /// Earliest pending phase change across all overlays.
    pub fn next_deadline(&self) -> Option<i64> {
        self.overlays.iter().filter_map(BurstOverlay::next_deadline).min()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BurstOverlay> {
        self.overlays.iter()
    }

    pub fn get(&self, id: u64) -> Option<&BurstOverlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn phase_timeline() {
        use OverlayPhase::*;
        let at = |ms| transition(Entering, ms);
        assert_eq!(at(0), Entering);
        assert_eq!(at(49), Entering);
        assert_eq!(at(50), Visible);
        assert_eq!(at(749), Visible);
        assert_eq!(at(750), Exiting);
        assert_eq!(at(1049), Exiting);
        assert_eq!(at(1050), Removed);
        assert_eq!(at(60_000), Removed);
    }

    #[test]
    fn transition_never_moves_backwards() {
        assert_eq!(transition(OverlayPhase::Exiting, 0), OverlayPhase::Exiting);
        assert_eq!(transition(OverlayPhase::Removed, 0), OverlayPhase::Removed);
    }

    #[test]
    fn late_tick_reports_every_intermediate_phase() {
        let mut set = OverlaySet::new();
        let overlay = set.spawn(1_000);

        let changes = set.advance(1_000 + 2_000);
        let path: Vec<_> = changes.iter().map(|c| (c.from, c.to)).collect();
        assert_eq!(
            path,
            vec![
                (OverlayPhase::Entering, OverlayPhase::Visible),
                (OverlayPhase::Visible, OverlayPhase::Exiting),
                (OverlayPhase::Exiting, OverlayPhase::Removed),
            ]
        );
        assert!(changes.iter().all(|c| c.id == overlay.id));
        assert!(set.is_empty());
    }

    #[test]
    fn overlays_are_not_observable_after_removal() {
        let mut set = OverlaySet::new();
        let overlay = set.spawn(0);

        set.advance(50);
        assert_eq!(set.get(overlay.id).unwrap().phase, OverlayPhase::Visible);
        set.advance(750);
        assert_eq!(set.get(overlay.id).unwrap().phase, OverlayPhase::Exiting);
        set.advance(1050);
        assert!(set.get(overlay.id).is_none());
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn overlays_run_independent_chains() {
        let mut set = OverlaySet::new();
        let first = set.spawn(0);
        let second = set.spawn(500);
        assert_ne!(first.id, second.id);

        set.advance(800);
        assert_eq!(set.get(first.id).unwrap().phase, OverlayPhase::Exiting);
        assert_eq!(set.get(second.id).unwrap().phase, OverlayPhase::Visible);
        assert_eq!(set.next_deadline(), Some(1050));

        set.advance(1100);
        assert!(set.get(first.id).is_none());
        assert_eq!(set.next_deadline(), Some(1250));

        set.advance(1550);
        assert!(set.is_empty());
        assert_eq!(set.next_deadline(), None);
    }

    #[test]
    fn placement_is_bounded_and_fixed() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut set = OverlaySet::new();
        for i in 0..50 {
            let o = set.spawn_with(i, &mut rng);
            assert!(o.offset_x.abs() <= OVERLAY_MAX_OFFSET_PX);
            assert!(o.offset_y.abs() <= OVERLAY_MAX_OFFSET_PX);
            assert!(o.rotation_deg.abs() <= OVERLAY_MAX_ROTATION_DEG);
        }

        let before: Vec<_> = set.iter().map(|o| (o.offset_x, o.rotation_deg)).collect();
        set.advance(60);
        let after: Vec<_> = set.iter().map(|o| (o.offset_x, o.rotation_deg)).collect();
        assert_eq!(before, after);
    }
}
