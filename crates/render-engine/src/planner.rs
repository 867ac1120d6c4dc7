//! Rotation job planning.
//!
//! Every keyframe is rendered at yaw angles `0, S, 2S, ...` for a step
//! angle `S`, with `floor(360 / S)` angles per keyframe. When `S` does not
//! divide 360 the last partial sector is not rendered (S = 100 renders 0,
//! 100 and 200, never 300).
//!
//! Jobs are ordered by ascending frame, then ascending angle, and numbered
//! from 1 without gaps. The sequence index alone makes output names unique.

use serde::Serialize;

use turntable_common::error::{TurntableError, TurntableResult};

/// A full turn in degrees.
pub const FULL_TURN_DEGREES: u32 = 360;

/// One render in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RenderJob {
    /// Timeline frame.
    pub frame: i64,
    /// Yaw in degrees, in `[0, 360)`.
    pub angle_degrees: u32,
    /// 1-based position in the run.
    pub sequence_index: u32,
}

impl RenderJob {
    pub fn yaw_radians(&self) -> f64 {
        (self.angle_degrees as f64).to_radians()
    }
}

/// The ordered job sequence for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPlan {
    frames: Vec<i64>,
    step_angle: u32,
    steps_per_keyframe: u32,
    total_jobs: u32,
}

impl JobPlan {
    /// Build a plan. Frames are sorted and de-duplicated.
    pub fn new(mut frames: Vec<i64>, step_angle: u32) -> TurntableResult<Self> {
        if !(1..=FULL_TURN_DEGREES).contains(&step_angle) {
            return Err(TurntableError::invalid_config(format!(
                "step angle must be in 1..=360, got {step_angle}"
            )));
        }
        frames.sort_unstable();
        frames.dedup();

        let steps_per_keyframe = steps_per_keyframe(step_angle);
        let total_jobs = total_job_count(frames.len(), steps_per_keyframe)?;

        Ok(Self {
            frames,
            step_angle,
            steps_per_keyframe,
            total_jobs,
        })
    }

    pub fn frames(&self) -> &[i64] {
        &self.frames
    }

    pub fn step_angle(&self) -> u32 {
        self.step_angle
    }

    pub fn steps_per_keyframe(&self) -> u32 {
        self.steps_per_keyframe
    }

    /// Total number of jobs, known before any render.
    pub fn total_jobs(&self) -> u32 {
        self.total_jobs
    }

    /// Angles rendered at every keyframe.
    pub fn angles(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.steps_per_keyframe).map(move |i| i * self.step_angle)
    }

    /// Jobs in run order.
    pub fn jobs(&self) -> impl Iterator<Item = RenderJob> + '_ {
        let steps = self.steps_per_keyframe;
        // `new` guarantees frames.len() * steps fits in u32.
        (0u32..)
            .zip(&self.frames)
            .flat_map(move |(k, &frame)| {
                (0..steps).map(move |i| RenderJob {
                    frame,
                    angle_degrees: i * self.step_angle,
                    sequence_index: k * steps + i + 1,
                })
            })
    }

    /// Stable fingerprint of the plan and its output layout, used to match
    /// resume checkpoints to the run that wrote them. `layout` must describe
    /// everything that decides which files a job writes.
    pub fn fingerprint(&self, layout: &str) -> String {
        let mut signature = format!("{layout}|{}|", self.step_angle);
        for frame in &self.frames {
            signature.push_str(&frame.to_string());
            signature.push(',');
        }
        format!("{:016x}", fnv1a_64(&signature))
    }
}

/// Whole steps of `step_angle` that fit in a full turn.
pub fn steps_per_keyframe(step_angle: u32) -> u32 {
    FULL_TURN_DEGREES / step_angle.max(1)
}

/// Jobs for `frame_count` keyframes, or `InvalidConfig` when the count
/// does not fit a sequence index.
pub fn total_job_count(frame_count: usize, steps_per_keyframe: u32) -> TurntableResult<u32> {
    u32::try_from(frame_count)
        .ok()
        .and_then(|frames| frames.checked_mul(steps_per_keyframe))
        .ok_or_else(|| {
            TurntableError::invalid_config(format!(
                "{frame_count} keyframes x {steps_per_keyframe} angles exceeds {} jobs",
                u32::MAX
            ))
        })
}

fn fnv1a_64(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in input.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_two_keyframes_quarter_turns() {
        let plan = JobPlan::new(vec![0, 45], 90).unwrap();
        let jobs: Vec<_> = plan
            .jobs()
            .map(|j| (j.frame, j.angle_degrees, j.sequence_index))
            .collect();
        assert_eq!(
            jobs,
            vec![
                (0, 0, 1),
                (0, 90, 2),
                (0, 180, 3),
                (0, 270, 4),
                (45, 0, 5),
                (45, 90, 6),
                (45, 180, 7),
                (45, 270, 8),
            ]
        );
        assert_eq!(plan.total_jobs(), 8);
    }

    #[test]
    fn test_remainder_sector_is_dropped() {
        let plan = JobPlan::new(vec![1, 10], 100).unwrap();
        assert_eq!(plan.steps_per_keyframe(), 3);
        assert_eq!(plan.total_jobs(), 6);
        assert_eq!(plan.angles().collect::<Vec<_>>(), vec![0, 100, 200]);
        assert!(plan.jobs().all(|j| j.angle_degrees < 300));
    }

    #[test]
    fn test_full_turn_step_renders_once_per_keyframe() {
        let plan = JobPlan::new(vec![5, 1], 360).unwrap();
        let jobs: Vec<_> = plan.jobs().collect();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].frame, 1);
        assert_eq!(jobs[1].frame, 5);
        assert!(jobs.iter().all(|j| j.angle_degrees == 0));
    }

    #[test]
    fn test_rejects_step_out_of_range() {
        assert!(JobPlan::new(vec![0], 0).is_err());
        assert!(JobPlan::new(vec![0], 361).is_err());
    }

    #[test]
    fn test_frames_are_normalized() {
        let plan = JobPlan::new(vec![10, 0, 10, 5], 180).unwrap();
        assert_eq!(plan.frames(), &[0, 5, 10]);
    }

    #[test]
    fn test_fingerprint_tracks_inputs() {
        let plan = JobPlan::new(vec![0, 45], 90).unwrap();
        assert_eq!(plan.fingerprint("a"), plan.fingerprint("a"));
        assert_ne!(plan.fingerprint("a"), plan.fingerprint("b"));
        let other = JobPlan::new(vec![0, 45], 45).unwrap();
        assert_ne!(plan.fingerprint("a"), other.fingerprint("a"));
    }

    #[test]
    fn test_job_count_overflow_is_rejected() {
        assert_eq!(total_job_count(3, 8).unwrap(), 24);
        assert_eq!(total_job_count(0, 360).unwrap(), 0);

        let max_frames = (u32::MAX / 360) as usize;
        assert_eq!(total_job_count(max_frames, 360).unwrap(), max_frames as u32 * 360);
        assert!(matches!(
            total_job_count(max_frames + 1, 360),
            Err(TurntableError::InvalidConfig { .. })
        ));
        assert!(total_job_count(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_fingerprint_tracks_layout() {
        let plan = JobPlan::new(vec![0, 45], 90).unwrap();
        let raw = plan.fingerprint("my_render|/out|raw");
        let post = plan.fingerprint("my_render|/out|post:/out/pixel");
        assert_ne!(raw, post);
        assert_eq!(raw, plan.fingerprint("my_render|/out|raw"));
    }

    proptest! {
        #[test]
        fn prop_job_count_and_indices(
            frames in proptest::collection::btree_set(-500i64..5000, 1..20),
            step in 1u32..=360,
        ) {
            let frames: Vec<i64> = frames.into_iter().collect();
            let plan = JobPlan::new(frames.clone(), step).unwrap();
            let jobs: Vec<_> = plan.jobs().collect();

            prop_assert_eq!(jobs.len() as u32, frames.len() as u32 * (360 / step));
            prop_assert_eq!(plan.total_jobs() as usize, jobs.len());

            for (i, job) in jobs.iter().enumerate() {
                prop_assert_eq!(job.sequence_index as usize, i + 1);
                prop_assert!(job.angle_degrees < 360);
                prop_assert_eq!(job.angle_degrees % step, 0);
            }

            for pair in jobs.windows(2) {
                let ordered = pair[0].frame < pair[1].frame
                    || (pair[0].frame == pair[1].frame
                        && pair[0].angle_degrees < pair[1].angle_degrees);
                prop_assert!(ordered);
            }
        }
    }
}
