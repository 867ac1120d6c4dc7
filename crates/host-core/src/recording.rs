//! Renderer that records requests instead of producing images.
//!
//! Used for dry runs and tests. It can optionally touch an empty file at
//! each target path and fail on a chosen call.

use std::path::PathBuf;

use turntable_project_model::ObjectId;

use crate::{HostError, HostResult, RenderRequest, StillRenderer};

/// One recorded still render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    /// Target path.
    pub output: PathBuf,

    /// Timeline frame at render time.
    pub frame: i64,

    /// Active object at render time.
    pub object: Option<ObjectId>,

    /// Yaw of the active object in degrees.
    pub yaw_degrees: Option<f64>,

    /// Whether compositing was enabled.
    pub composited: bool,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    records: Vec<RenderRecord>,
    /// 1-based call number that fails.
    fail_on_call: Option<usize>,
    touch_files: bool,
    calls: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `call`-th render (1-based) and every call after it.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Create an empty file at every target path.
    pub fn touching_files(mut self) -> Self {
        self.touch_files = true;
        self
    }

    /// Successful renders, in call order.
    pub fn records(&self) -> &[RenderRecord] {
        &self.records
    }

    /// Number of render attempts, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl StillRenderer for RecordingRenderer {
    fn render_still(&mut self, request: &RenderRequest<'_>) -> HostResult<()> {
        self.calls += 1;
        if self.fail_on_call.is_some_and(|n| self.calls >= n) {
            return Err(HostError::render(format!(
                "simulated failure on call {}",
                self.calls
            )));
        }

        if self.touch_files {
            std::fs::write(request.output, [])?;
        }

        let scene = request.scene;
        let object = scene.active_object;
        let yaw_degrees = object
            .and_then(|id| scene.object(id))
            .map(|o| (o.transform.rotation_euler.z as f64).to_degrees());

        self.records.push(RenderRecord {
            output: request.output.to_path_buf(),
            frame: scene.frame_current,
            object,
            yaw_degrees,
            composited: scene.render.use_compositing,
        });
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "recording"
    }
}
