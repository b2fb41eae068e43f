//! Background meshing jobs.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use mesh_grid::VoxelVolume;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::run::{finish, run_stages, MeshingOutput};
use crate::stage::{CancelFlag, PipelineStage, StageCell};

/// Name given to worker threads.
pub const WORKER_THREAD_NAME: &str = "meshing";

type Slot = Arc<Mutex<Option<PipelineResult<MeshingOutput>>>>;

/// A pipeline run on its own thread.
///
/// The worker stores its result before publishing the terminal stage, so
/// once [`MeshingJob::stage`] reports [`PipelineStage::Done`] the output is
/// ready. A panic inside a stage is caught and published as
/// [`PipelineStage::Failed`] with a [`PipelineError::Worker`] failure. All queries are non-blocking except [`MeshingJob::wait`].
/// Dropping the job requests cancellation.
///
/// # Example
///
/// ```
/// use mesh_grid::VoxelVolume;
/// use mesh_pipeline::{MeshingJob, PipelineConfig, PipelineStage};
///
/// let volume = VoxelVolume::filled((3, 3, 3), 1);
/// let mut job = MeshingJob::spawn(volume, PipelineConfig::default().with_dilation_radius(1.0)).unwrap();
///
/// assert_eq!(job.wait(), PipelineStage::Done);
/// let output = job.take_output().unwrap();
/// assert!(output.boundary.is_closed_manifold());
/// ```
#[derive(Debug)]
pub struct MeshingJob {
    stages: StageCell,
    cancel: CancelFlag,
    slot: Slot,
    handle: Option<JoinHandle<()>>,
}

impl MeshingJob {
    /// Start meshing `volume` on a new thread.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Worker`] if the thread cannot be created.
    pub fn spawn(volume: VoxelVolume, config: PipelineConfig) -> PipelineResult<Self> {
        Self::start(move |stages, cancel| run_stages(&volume, &config, stages, cancel))
    }

    fn start<F>(work: F) -> PipelineResult<Self>
    where
        F: FnOnce(&StageCell, &CancelFlag) -> PipelineResult<MeshingOutput> + Send + 'static,
    {
        let stages = StageCell::new();
        let cancel = CancelFlag::new();
        let slot: Slot = Arc::new(Mutex::new(None));

        let handle = {
            let stages = stages.clone();
            let cancel = cancel.clone();
            let slot = Arc::clone(&slot);
            thread::Builder::new()
                .name(WORKER_THREAD_NAME.to_string())
                .spawn(move || {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| work(&stages, &cancel)))
                        .unwrap_or_else(|payload| {
                            let reason = panic_message(payload.as_ref());
                            warn!(stage = %stages.get(), %reason, "meshing worker panicked");
                            Err(PipelineError::Worker(format!("worker panicked: {reason}")))
                        });
                    let terminal = result.as_ref().map(|_| ()).map_err(PipelineError::clone);
                    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
                    finish(&terminal, &stages);
                })
                .map_err(|e| PipelineError::Worker(e.to_string()))?
        };
        debug!(thread = WORKER_THREAD_NAME, "spawned meshing job");

        Ok(Self {
            stages,
            cancel,
            slot,
            handle: Some(handle),
        })
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        self.stages.get()
    }

    /// Whether the run has ended, successfully or not.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stage().is_terminal()
    }

    /// Whether the run ended successfully.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.stage() == PipelineStage::Done
    }

    /// Reason for failure, once the run has failed.
    #[must_use]
    pub fn failure(&self) -> Option<PipelineError> {
        if self.stage() != PipelineStage::Failed {
            return None;
        }
        match &*self.slot.lock().unwrap_or_else(PoisonError::into_inner) {
            Some(Err(err)) => Some(err.clone()),
            _ => None,
        }
    }

    /// Request cancellation. The run stops before its next stage.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the worker exits and return the final stage.
    ///
    /// A worker that panicked is reported as [`PipelineStage::Failed`] with
    /// a [`PipelineError::Worker`] failure.
    pub fn wait(&mut self) -> PipelineStage {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("meshing worker panicked");
                let err = PipelineError::Worker("worker thread panicked".to_string());
                *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Err(err));
                self.stages.set(PipelineStage::Failed);
            }
        }
        self.stage()
    }

    /// Take the output of a finished run.
    ///
    /// Returns `None` until the job is [`Done`](PipelineStage::Done) and
    /// after the output has been taken once.
    pub fn take_output(&mut self) -> Option<MeshingOutput> {
        if !self.is_done() {
            return None;
        }
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.take() {
            Some(Ok(output)) => Some(output),
            other => {
                *slot = other;
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl Drop for MeshingJob {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
