//! Background jobs
//!
//! File decoding and HTTP calls run off the UI thread. Results land in a
//! shared queue that the app drains once per frame; each result carries the
//! load token it was started with so superseded work can be dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use studio_core::io::ImportError;
use studio_core::{GeneratedShape, LoadToken, MeshSource, RemediationResult, ServiceError};

/// Completed background work
#[derive(Debug)]
pub enum JobOutput {
    /// Mesh decoded for insertion as a new object
    MeshImported {
        token: LoadToken,
        name: String,
        result: Result<MeshSource, ImportError>,
    },
    /// Mesh decoded to replace the base model
    BaseModelLoaded {
        token: LoadToken,
        name: String,
        result: Result<MeshSource, ImportError>,
    },
    /// Shape backend reply
    ShapeGenerated {
        token: LoadToken,
        prompt: String,
        result: Result<GeneratedShape, ServiceError>,
    },
    /// Remediation backend reply
    Remediated {
        token: LoadToken,
        result: Result<RemediationResult, ServiceError>,
    },
}

impl JobOutput {
    /// Token the job was started with
    pub fn token(&self) -> &LoadToken {
        match self {
            JobOutput::MeshImported { token, .. }
            | JobOutput::BaseModelLoaded { token, .. }
            | JobOutput::ShapeGenerated { token, .. }
            | JobOutput::Remediated { token, .. } => token,
        }
    }
}

/// Queue of finished jobs
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    finished: Arc<Mutex<Vec<JobOutput>>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` in the background and queue its output
    ///
    /// On the web there are no threads; the job runs inline.
    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> JobOutput + Send + 'static,
    {
        let finished = self.finished.clone();
        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || {
            let output = job();
            finished.lock().push(output);
        });
        #[cfg(target_arch = "wasm32")]
        finished.lock().push(job());
    }

    /// Take every finished job
    pub fn drain(&self) -> Vec<JobOutput> {
        std::mem::take(&mut *self.finished.lock())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use studio_core::LoadTracker;

    use super::*;

    #[test]
    fn test_spawned_job_is_queued() {
        let queue = JobQueue::new();
        let mut tracker = LoadTracker::new();
        let token = tracker.begin("model");
        queue.spawn(move || JobOutput::MeshImported {
            token,
            name: "part".into(),
            result: Err(ImportError::EmptyMesh),
        });

        let mut outputs = Vec::new();
        for _ in 0..200 {
            outputs = queue.drain();
            if !outputs.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].token().target(), "model");
        assert!(tracker.finish(outputs[0].token()));
    }
}
