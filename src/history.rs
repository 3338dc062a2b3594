//! Pull history and round-boundary log.

use crate::Arm;

/// What happened at a round boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundaryKind {
    /// The active set was halved by empirical mean.
    Halved,
    /// The anytime ladder collapsed and the active set was reset to every arm.
    Restarted,
}

/// One round boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundBoundary {
    /// Index (1-based) of the round that just ended.
    pub round: u32,
    /// Number of pulls issued before the boundary fired.
    pub at_pull: u64,
    /// Active-set size before the boundary.
    pub before: usize,
    /// Active-set size after the boundary.
    pub after: usize,
    pub kind: BoundaryKind,
}

/// Pull log and boundary log, both recorded only when tracking is enabled.
///
/// The anytime scheduler never terminates, so neither log is kept by default.
#[derive(Debug, Clone, Default)]
pub(crate) struct History {
    pulls: Option<Vec<Arm>>,
    boundaries: Option<Vec<RoundBoundary>>,
}

impl History {
    pub(crate) fn new(track: bool) -> Self {
        Self {
            pulls: track.then(Vec::new),
            boundaries: track.then(Vec::new),
        }
    }

    pub(crate) fn record_pull(&mut self, arm: Arm) {
        if let Some(p) = self.pulls.as_mut() {
            p.push(arm);
        }
    }

    pub(crate) fn record_boundary(&mut self, b: RoundBoundary) {
        if let Some(log) = self.boundaries.as_mut() {
            log.push(b);
        }
    }

    pub(crate) fn pulls(&self) -> Option<&[Arm]> {
        self.pulls.as_deref()
    }

    pub(crate) fn boundaries(&self) -> &[RoundBoundary] {
        self.boundaries.as_deref().unwrap_or(&[])
    }

    pub(crate) fn clear(&mut self) {
        if let Some(p) = self.pulls.as_mut() {
            p.clear();
        }
        if let Some(log) = self.boundaries.as_mut() {
            log.clear();
        }
    }
}
