//! Pipeline stages and the shared state observed across threads.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Stage of a meshing run.
///
/// Runs move strictly forward through the stages in declaration order and
/// end in [`PipelineStage::Done`] or [`PipelineStage::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PipelineStage {
    /// Not started.
    Idle = 0,
    /// Encoding the volume as dexels and growing it.
    Dilating = 1,
    /// Resampling and running marching cubes.
    ExtractingSurface = 2,
    /// Sampling the signed distance field.
    BuildingSdf = 3,
    /// Isosurface stuffing.
    Tetrahedralizing = 4,
    /// Recovering the boundary surface of the tetrahedra.
    ExtractingBoundary = 5,
    /// Finished; the output is available.
    Done = 6,
    /// Aborted by an error or cancellation.
    Failed = 7,
}

impl PipelineStage {
    /// Stages a successful run passes through, in order.
    pub const WORKING: [Self; 5] = [
        Self::Dilating,
        Self::ExtractingSurface,
        Self::BuildingSdf,
        Self::Tetrahedralizing,
        Self::ExtractingBoundary,
    ];

    /// Whether the run has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether work is in progress.
    #[must_use]
    pub const fn is_working(self) -> bool {
        !self.is_terminal() && !matches!(self, Self::Idle)
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Dilating,
            2 => Self::ExtractingSurface,
            3 => Self::BuildingSdf,
            4 => Self::Tetrahedralizing,
            5 => Self::ExtractingBoundary,
            6 => Self::Done,
            _ => Self::Failed,
        }
    }

    /// Short human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dilating => "dilating",
            Self::ExtractingSurface => "extracting surface",
            Self::BuildingSdf => "building SDF",
            Self::Tetrahedralizing => "tetrahedralizing",
            Self::ExtractingBoundary => "extracting boundary",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Atomically updated [`PipelineStage`], shared between a run and its observers.
///
/// Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct StageCell {
    stage: Arc<AtomicU8>,
}

impl StageCell {
    /// A cell in [`PipelineStage::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage.
    #[must_use]
    pub fn get(&self) -> PipelineStage {
        PipelineStage::from_u8(self.stage.load(Ordering::Acquire))
    }

    /// Move to `stage`.
    pub fn set(&self, stage: PipelineStage) {
        self.stage.store(stage as u8, Ordering::Release);
    }
}

/// Cancellation request shared between a run and its owner.
///
/// Runs poll the flag before each stage, so a stage in progress always
/// completes.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// A flag that is not set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_round_trips_through_cell() {
        let cell = StageCell::new();
        assert_eq!(cell.get(), PipelineStage::Idle);
        for stage in PipelineStage::WORKING {
            cell.set(stage);
            assert_eq!(cell.get(), stage);
            assert!(stage.is_working());
        }
        cell.set(PipelineStage::Done);
        assert!(cell.get().is_terminal());
    }

    #[test]
    fn clones_share_state() {
        let cell = StageCell::new();
        let observer = cell.clone();
        cell.set(PipelineStage::BuildingSdf);
        assert_eq!(observer.get(), PipelineStage::BuildingSdf);

        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn stages_are_ordered() {
        assert!(PipelineStage::WORKING.windows(2).all(|w| (w[0] as u8) < (w[1] as u8)));
        assert!(!PipelineStage::Idle.is_working());
        assert!(!PipelineStage::Failed.is_working());
        assert_eq!(PipelineStage::BuildingSdf.to_string(), "building SDF");
    }
}
