//! Print the renders a run would produce.

use std::path::PathBuf;

use serde::Serialize;
use turntable_render_engine::planner::RenderJob;
use turntable_render_engine::{PlannedRun, RenderDriver};

use super::{load_document, recording_host};

/// One `plan --json` entry.
#[derive(Debug, Serialize)]
struct PlannedJob {
    #[serde(flatten)]
    job: RenderJob,
    outputs: Vec<PathBuf>,
}

fn planned_jobs(planned: &PlannedRun) -> Vec<PlannedJob> {
    planned
        .plan
        .jobs()
        .map(|job| PlannedJob {
            job,
            outputs: planned.outputs(&job),
        })
        .collect()
}

pub fn run(path: PathBuf, step_angle: Option<u32>, json: bool) -> anyhow::Result<()> {
    let loaded = load_document(&path)?;

    let mut config = loaded.document.render_config.clone();
    if let Some(step) = step_angle {
        config.step_angle = step;
    }

    let base_dir = loaded.base_dir();
    let driver = RenderDriver::new(config, Some(base_dir.as_path()))?;
    let host = recording_host(&loaded);
    let planned = driver.plan(&host)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&planned_jobs(&planned))?);
        return Ok(());
    }

    println!("Plan for '{}':", planned.object_name);
    println!("  Keyframes: {:?}", planned.plan.frames());
    println!(
        "  Angles: {:?}",
        planned.plan.angles().collect::<Vec<_>>()
    );
    println!("  Total jobs: {}", planned.plan.total_jobs());
    println!();
    for job in planned.plan.jobs() {
        let outputs: Vec<String> = planned
            .outputs(&job)
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        println!(
            "  #{:<4} frame {:>5}  yaw {:>3}°  {}",
            job.sequence_index,
            job.frame,
            job.angle_degrees,
            outputs.join(", ")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use turntable_host_core::{MemoryHost, RecordingRenderer};
    use turntable_project_model::{
        Action, AnimationData, FCurve, KeyframePoint, ObjectKind, RenderConfig, Scene,
    };

    #[test]
    fn test_json_entries_carry_job_fields_and_outputs() {
        let mut scene = Scene::new();
        let cube = scene.add_object("Cube", ObjectKind::Mesh);
        scene.object_mut(cube).unwrap().animation = Some(AnimationData {
            action: Some(Action {
                name: "CubeAction".to_string(),
                fcurves: vec![FCurve {
                    data_path: "location".to_string(),
                    array_index: 0,
                    keyframe_points: vec![KeyframePoint {
                        frame: 12.0,
                        value: 0.0,
                    }],
                }],
            }),
        });
        scene.active_object = Some(cube);
        let host = MemoryHost::new(scene, RecordingRenderer::new());

        let config = RenderConfig {
            step_angle: 180,
            output_path: "/renders".to_string(),
            ..Default::default()
        };
        let planned = RenderDriver::new(config, None).unwrap().plan(&host).unwrap();
        let value = serde_json::to_value(planned_jobs(&planned)).unwrap();

        assert_eq!(
            value[1],
            serde_json::json!({
                "frame": 12,
                "angle_degrees": 180,
                "sequence_index": 2,
                "outputs": ["/renders/my_render_2.png"],
            })
        );
    }
}
