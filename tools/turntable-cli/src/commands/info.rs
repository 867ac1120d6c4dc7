//! Show document information.

use std::path::PathBuf;

use turntable_project_model::ObjectKind;
use turntable_render_engine::keyframes::collect_keyframes;
use turntable_render_engine::planner::steps_per_keyframe;

use super::{load_document, recording_host};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let loaded = load_document(&path)?;
    let d = &loaded.document;

    println!("Document: {}", d.name);
    println!("  Version: {}", d.version);
    println!("  Created: {}", d.created_at);
    println!("  Modified: {}", d.modified_at);
    println!();

    let scene = &d.scene;
    let count = |kind: ObjectKind| scene.objects.iter().filter(|o| o.kind == kind).count();
    println!("Scene:");
    println!("  Objects: {}", scene.len());
    println!(
        "  Meshes: {}, empties: {}, cameras: {}, lights: {}",
        count(ObjectKind::Mesh),
        count(ObjectKind::Empty),
        count(ObjectKind::Camera),
        count(ObjectKind::Light)
    );
    println!("  Selected: {}", scene.selected_ids().len());
    println!("  Current frame: {}", scene.frame_current);

    let host = recording_host(&loaded);
    match collect_keyframes(&host) {
        Ok(keyframes) => {
            println!("  Active: {}", keyframes.object_name);
            println!("  Keyframes: {:?}", keyframes.frames);
        }
        Err(e) => println!("  Active: {e}"),
    }
    println!();

    let c = &d.render_config;
    println!("Render config:");
    println!("  Base name: {}", c.base_name);
    println!(
        "  Step angle: {}° ({} views per keyframe)",
        c.step_angle,
        steps_per_keyframe(c.step_angle)
    );
    println!("  Output: {}", c.output_path);
    if c.compositing {
        println!(
            "  Pixelation: {}px -> {}",
            c.pixel_size, c.post_output_path
        );
    } else {
        println!("  Pixelation: off");
    }
    println!("  Restore scene state: {}", c.restore_scene_state);
    println!("  Compensate reparent: {}", c.compensate_reparent);

    Ok(())
}
