//! Render run orchestration.
//!
//! A run validates the active object, plans the jobs, creates the output
//! directories, configures the compositor once (post stage only), then
//! renders every job in order. The first failure stops the run; images
//! already written stay on disk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use turntable_common::clock::RunClock;
use turntable_common::error::{TurntableError, TurntableResult};
use turntable_host_core::{CompositorHost, HostError, SceneHost};
use turntable_project_model::{ObjectId, RenderConfig, RunCheckpoint};

use crate::compositor::configure_pixelate_graph;
use crate::keyframes::collect_keyframes;
use crate::naming::{OutputNamer, OutputStage};
use crate::planner::{JobPlan, RenderJob};

/// Progress callback for render runs.
pub type ProgressCallback = Box<dyn Fn(RunProgress) + Send>;

/// Run progress report.
#[derive(Debug, Clone)]
pub struct RunProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Jobs completed so far, including resumed ones.
    pub jobs_rendered: u32,

    /// Total jobs in the plan.
    pub total_jobs: u32,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: RunStage,
}

/// Stages of a render run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Preparing,
    Compositing,
    Rendering,
    Complete,
    Failed,
}

/// A validated plan bound to an object and output names.
#[derive(Debug, Clone)]
pub struct PlannedRun {
    pub object: ObjectId,
    pub object_name: String,
    pub plan: JobPlan,
    pub namer: OutputNamer,
    /// Whether each job also renders the post stage.
    pub compositing: bool,
}

impl PlannedRun {
    /// Output paths of one job, raw first.
    pub fn outputs(&self, job: &RenderJob) -> Vec<PathBuf> {
        let mut paths = vec![self.namer.path(job.sequence_index, OutputStage::Raw)];
        if self.compositing {
            paths.push(self.namer.path(job.sequence_index, OutputStage::Post));
        }
        paths
    }

    /// Checkpoint fingerprint. Covers the base name, the output
    /// directories, and whether a post render follows each raw one, so a
    /// checkpoint never vouches for files a different layout would write.
    pub fn fingerprint(&self) -> String {
        let post = if self.compositing {
            format!("post:{}", self.namer.dir(OutputStage::Post).display())
        } else {
            "raw".to_string()
        };
        let layout = format!(
            "{}|{}|{post}",
            self.namer.base_name(),
            self.namer.dir(OutputStage::Raw).display()
        );
        self.plan.fingerprint(&layout)
    }

    /// Directories that must exist before rendering.
    pub fn output_dirs(&self) -> Vec<&Path> {
        let mut dirs = vec![self.namer.dir(OutputStage::Raw)];
        if self.compositing {
            let post = self.namer.dir(OutputStage::Post);
            if !dirs.contains(&post) {
                dirs.push(post);
            }
        }
        dirs
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub object_name: String,
    pub total_jobs: u32,
    /// Jobs rendered by this invocation.
    pub rendered_jobs: u32,
    /// Jobs skipped because a checkpoint marked them done.
    pub skipped_jobs: u32,
    /// Still render calls issued.
    pub render_calls: u32,
    /// Paths written by this invocation, in order.
    pub outputs: Vec<PathBuf>,
    pub elapsed_secs: f64,
}

/// Where run progress is recorded and whether to resume from it.
#[derive(Debug, Clone)]
struct CheckpointOptions {
    path: PathBuf,
    resume: bool,
}

/// Yaw, frame, and render path captured before a run.
struct SceneStateSnapshot {
    object: ObjectId,
    yaw: f64,
    frame: i64,
    filepath: String,
}

/// Drives one render run against a host.
pub struct RenderDriver {
    config: RenderConfig,
    output_dir: PathBuf,
    post_output_dir: PathBuf,
    checkpoint: Option<CheckpointOptions>,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<ProgressCallback>,
}

impl RenderDriver {
    /// Create a driver from a configuration snapshot. `document_dir`
    /// anchors `//`-relative output directories.
    pub fn new(config: RenderConfig, document_dir: Option<&Path>) -> TurntableResult<Self> {
        config
            .validate()
            .map_err(|e| TurntableError::invalid_config(e.to_string()))?;

        let output_dir = config.output_dir(document_dir);
        let post_output_dir = config.post_output_dir(document_dir);

        Ok(Self {
            config,
            output_dir,
            post_output_dir,
            checkpoint: None,
            cancel: None,
            progress: None,
        })
    }

    /// Record progress to `path` after each job; with `resume`, skip jobs
    /// an earlier checkpoint marked as done.
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>, resume: bool) -> Self {
        self.checkpoint = Some(CheckpointOptions {
            path: path.into(),
            resume,
        });
        self
    }

    /// Stop between jobs once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Validate the active object and plan the run without side effects.
    pub fn plan<H: SceneHost + ?Sized>(&self, host: &H) -> TurntableResult<PlannedRun> {
        let keyframes = collect_keyframes(host)?;
        let plan = JobPlan::new(keyframes.frames, self.config.step_angle)?;

        let mut namer = OutputNamer::new(&self.config.base_name, &self.output_dir);
        if self.config.compositing {
            namer = namer.with_post_dir(&self.post_output_dir);
        }

        Ok(PlannedRun {
            object: keyframes.object,
            object_name: keyframes.object_name,
            plan,
            namer,
            compositing: self.config.compositing,
        })
    }

    /// Execute the run.
    pub fn run<H>(&self, host: &mut H) -> TurntableResult<RunSummary>
    where
        H: SceneHost + CompositorHost + ?Sized,
    {
        self.report(0, 0, 0.0, RunStage::Preparing);

        let planned = self.plan(&*host)?;
        let total = planned.plan.total_jobs();

        tracing::info!(
            object = %planned.object_name,
            keyframes = planned.plan.frames().len(),
            step_angle = planned.plan.step_angle(),
            total_jobs = total,
            compositing = planned.compositing,
            output = %self.output_dir.display(),
            "Starting render run"
        );

        for dir in planned.output_dirs() {
            std::fs::create_dir_all(dir).map_err(|e| TurntableError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let mut checkpoint = self.open_checkpoint(&planned)?;
        let resume_after = checkpoint
            .as_ref()
            .map(|c| c.last_completed_index)
            .unwrap_or(0);

        let snapshot = if self.config.restore_scene_state {
            Some(SceneStateSnapshot {
                object: planned.object,
                yaw: host.yaw(planned.object).map_err(host_error)?,
                frame: host.current_frame(),
                filepath: host.render_filepath(),
            })
        } else {
            None
        };

        let result = self.render_jobs(&mut *host, &planned, resume_after, checkpoint.as_mut());

        if let Some(snapshot) = snapshot {
            if let Err(e) = restore_scene_state(&mut *host, &snapshot) {
                if result.is_ok() {
                    return Err(e);
                }
                tracing::warn!(error = %e, "Failed to restore scene state after aborted run");
            }
        }

        match result {
            Ok(summary) => {
                self.report(total, total, 0.0, RunStage::Complete);
                tracing::info!(
                    object = %summary.object_name,
                    rendered = summary.rendered_jobs,
                    skipped = summary.skipped_jobs,
                    render_calls = summary.render_calls,
                    elapsed_secs = summary.elapsed_secs,
                    "Render run complete"
                );
                Ok(summary)
            }
            Err(e) => {
                let done = checkpoint
                    .as_ref()
                    .map(|c| c.last_completed_index)
                    .unwrap_or(0);
                self.report(done, total, 0.0, RunStage::Failed);
                tracing::error!(error = %e, "Render run aborted");
                Err(e)
            }
        }
    }

    fn render_jobs<H>(
        &self,
        host: &mut H,
        planned: &PlannedRun,
        resume_after: u32,
        mut checkpoint: Option<&mut RunCheckpoint>,
    ) -> TurntableResult<RunSummary>
    where
        H: SceneHost + CompositorHost + ?Sized,
    {
        let total = planned.plan.total_jobs();
        let mut summary = RunSummary {
            object_name: planned.object_name.clone(),
            total_jobs: total,
            skipped_jobs: resume_after.min(total),
            ..Default::default()
        };

        if summary.skipped_jobs == total {
            tracing::info!(total_jobs = total, "Checkpoint already complete; nothing to render");
            return Ok(summary);
        }

        if planned.compositing {
            self.report(resume_after, total, 0.0, RunStage::Compositing);
            configure_pixelate_graph(&mut *host, self.config.pixel_size)?;
        }

        let clock = RunClock::start();
        tracing::debug!(
            started_at = clock.epoch_wall(),
            first_index = resume_after + 1,
            "Job loop started"
        );
        let mut current_frame: Option<i64> = None;

        for job in planned.plan.jobs().skip(resume_after as usize) {
            if self.is_cancelled() {
                return Err(TurntableError::Cancelled {
                    completed: job.sequence_index - 1,
                    total,
                });
            }

            if current_frame != Some(job.frame) {
                host.set_frame(job.frame).map_err(host_error)?;
                current_frame = Some(job.frame);
            }
            host.set_yaw(planned.object, job.yaw_radians())
                .map_err(host_error)?;

            for path in planned.outputs(&job) {
                host.set_render_filepath(&path).map_err(host_error)?;
                host.render_still()
                    .map_err(|e| TurntableError::RenderInvocationFailed {
                        index: job.sequence_index,
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                summary.render_calls += 1;
                tracing::debug!(
                    index = job.sequence_index,
                    frame = job.frame,
                    angle = job.angle_degrees,
                    path = %path.display(),
                    "Rendered"
                );
                summary.outputs.push(path);
            }

            summary.rendered_jobs += 1;

            if let (Some(checkpoint), Some(options)) = (checkpoint.as_deref_mut(), &self.checkpoint)
            {
                checkpoint.record(job.sequence_index);
                checkpoint
                    .save(&options.path)
                    .map_err(|e| TurntableError::document(e.to_string()))?;
            }

            self.report(
                job.sequence_index,
                total,
                clock.eta_secs(summary.rendered_jobs, total - summary.skipped_jobs),
                RunStage::Rendering,
            );
        }

        summary.elapsed_secs = clock.elapsed_secs();
        Ok(summary)
    }

    /// Load or start the checkpoint for this run.
    fn open_checkpoint(&self, planned: &PlannedRun) -> TurntableResult<Option<RunCheckpoint>> {
        let Some(options) = &self.checkpoint else {
            return Ok(None);
        };

        let fingerprint = planned.fingerprint();
        let total = planned.plan.total_jobs();

        if options.resume {
            let existing = RunCheckpoint::load(&options.path)
                .map_err(|e| TurntableError::document(e.to_string()))?;
            if let Some(existing) = existing {
                if existing.plan_fingerprint != fingerprint || existing.total_jobs != total {
                    return Err(TurntableError::checkpoint_mismatch(format!(
                        "{} was written for a different plan ({} jobs, fingerprint {})",
                        options.path.display(),
                        existing.total_jobs,
                        existing.plan_fingerprint
                    )));
                }
                tracing::info!(
                    last_completed = existing.last_completed_index,
                    total_jobs = total,
                    "Resuming from checkpoint"
                );
                return Ok(Some(existing));
            }
        }

        let fresh = RunCheckpoint::new(fingerprint, total);
        fresh
            .save(&options.path)
            .map_err(|e| TurntableError::document(e.to_string()))?;
        Ok(Some(fresh))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn report(&self, done: u32, total: u32, eta_secs: f64, stage: RunStage) {
        if let Some(cb) = &self.progress {
            cb(RunProgress {
                progress: if total == 0 {
                    0.0
                } else {
                    (done as f64 / total as f64).clamp(0.0, 1.0)
                },
                jobs_rendered: done,
                total_jobs: total,
                eta_secs,
                stage,
            });
        }
    }
}

fn restore_scene_state<H: SceneHost + ?Sized>(
    host: &mut H,
    snapshot: &SceneStateSnapshot,
) -> TurntableResult<()> {
    host.set_yaw(snapshot.object, snapshot.yaw)
        .map_err(host_error)?;
    host.set_frame(snapshot.frame).map_err(host_error)?;
    host.set_render_filepath(Path::new(&snapshot.filepath))
        .map_err(host_error)?;
    tracing::debug!(frame = snapshot.frame, "Restored scene state");
    Ok(())
}

fn host_error(e: HostError) -> TurntableError {
    TurntableError::host(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use turntable_host_core::{MemoryHost, RecordingRenderer};
    use turntable_project_model::{
        Action, AnimationData, FCurve, KeyframePoint, ObjectKind, Scene,
    };

    fn animated_scene(frames: &[f64]) -> Scene {
        let mut scene = Scene::new();
        let cube = scene.add_object("Cube", ObjectKind::Mesh);
        scene.object_mut(cube).unwrap().animation = Some(AnimationData {
            action: Some(Action {
                name: "Spin".to_string(),
                fcurves: vec![FCurve {
                    data_path: "location".to_string(),
                    array_index: 2,
                    keyframe_points: frames
                        .iter()
                        .map(|f| KeyframePoint {
                            frame: *f,
                            value: 1.0,
                        })
                        .collect(),
                }],
            }),
        });
        scene.active_object = Some(cube);
        scene
    }

    fn config(step: u32) -> RenderConfig {
        RenderConfig {
            step_angle: step,
            output_path: "/tmp/turntable-driver-unit".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_has_no_side_effects() {
        let host = MemoryHost::new(animated_scene(&[0.0, 45.0]), RecordingRenderer::new());
        let driver = RenderDriver::new(config(90), None).unwrap();
        let planned = driver.plan(&host).unwrap();
        assert_eq!(planned.plan.total_jobs(), 8);
        assert_eq!(planned.output_dirs().len(), 1);
        assert_eq!(host.renderer().calls(), 0);
        assert_eq!(host.scene().frame_current, 0);
    }

    #[test]
    fn test_fingerprint_covers_output_layout() {
        let host = MemoryHost::new(animated_scene(&[0.0, 45.0]), RecordingRenderer::new());
        let fingerprint = |config: RenderConfig| {
            RenderDriver::new(config, None)
                .unwrap()
                .plan(&host)
                .unwrap()
                .fingerprint()
        };

        let raw = fingerprint(config(90));
        assert_eq!(raw, fingerprint(config(90)));
        assert_ne!(
            raw,
            fingerprint(RenderConfig {
                compositing: true,
                ..config(90)
            })
        );
        assert_ne!(
            raw,
            fingerprint(RenderConfig {
                output_path: "/tmp/turntable-driver-elsewhere".to_string(),
                ..config(90)
            })
        );
        assert_ne!(
            fingerprint(RenderConfig {
                compositing: true,
                ..config(90)
            }),
            fingerprint(RenderConfig {
                compositing: true,
                post_output_path: "/tmp/turntable-driver-pixel".to_string(),
                ..config(90)
            })
        );
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let err = RenderDriver::new(
            RenderConfig {
                step_angle: 0,
                ..Default::default()
            },
            None,
        )
        .err()
        .unwrap();
        assert!(matches!(err, TurntableError::InvalidConfig { .. }));
    }

    #[test]
    fn test_progress_reports_stages() {
        let dir = std::env::temp_dir().join("turntable_driver_progress");
        let _ = std::fs::remove_dir_all(&dir);
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);

        let mut host = MemoryHost::new(animated_scene(&[1.0]), RecordingRenderer::new());
        let driver = RenderDriver::new(
            RenderConfig {
                step_angle: 180,
                output_path: dir.to_string_lossy().into_owned(),
                ..Default::default()
            },
            None,
        )
        .unwrap()
        .with_progress(Box::new(move |p| sink.lock().unwrap().push(p.stage)));

        driver.run(&mut host).unwrap();

        let stages = stages.lock().unwrap().clone();
        assert_eq!(
            stages,
            vec![
                RunStage::Preparing,
                RunStage::Rendering,
                RunStage::Rendering,
                RunStage::Complete
            ]
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cancel_flag_stops_before_first_job() {
        let dir = std::env::temp_dir().join("turntable_driver_cancel");
        let _ = std::fs::remove_dir_all(&dir);
        let flag = Arc::new(AtomicBool::new(true));

        let mut host = MemoryHost::new(animated_scene(&[0.0]), RecordingRenderer::new());
        let driver = RenderDriver::new(
            RenderConfig {
                output_path: dir.to_string_lossy().into_owned(),
                ..Default::default()
            },
            None,
        )
        .unwrap()
        .with_cancel_flag(flag);

        let err = driver.run(&mut host).unwrap_err();
        assert!(matches!(
            err,
            TurntableError::Cancelled {
                completed: 0,
                total: 8
            }
        ));
        assert_eq!(host.renderer().calls(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }
}
