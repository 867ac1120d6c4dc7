//! Initialize a new Turntable document.

use std::path::PathBuf;

use glam::Vec3;
use turntable_common::config::AppConfig;
use turntable_project_model::{
    Action, AnimationData, Document, FCurve, KeyframePoint, LoadedDocument, MeshStats,
    ObjectKind, RenderConfig, Scene, Transform, DOCUMENT_SUFFIX,
};

pub fn run(name: String, output: PathBuf, demo: bool, app_config: &AppConfig) -> anyhow::Result<()> {
    let path = output.join(format!("{name}{DOCUMENT_SUFFIX}"));
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    println!("Creating document '{}' at {}", name, path.display());

    let defaults = &app_config.render;
    let mut document = Document::new(&name);
    document.render_config = RenderConfig {
        base_name: defaults.base_name.clone(),
        step_angle: defaults.step_angle,
        output_path: defaults.output_path.clone(),
        post_output_path: defaults.post_output_path.clone(),
        pixel_size: defaults.pixel_size,
        ..RenderConfig::default()
    };
    if demo {
        document.scene = demo_scene();
    }

    let loaded = LoadedDocument::create(&path, document)
        .map_err(|e| anyhow::anyhow!("Failed to create document: {e}"))?;

    let config = &loaded.document.render_config;
    println!("Document created successfully:");
    println!("  File: {}", loaded.path.display());
    println!("  Objects: {}", loaded.document.scene.len());
    println!("  Base name: {}", config.base_name);
    println!("  Step angle: {}°", config.step_angle);
    println!("  Output: {}", config.output_path);

    Ok(())
}

/// Cube keyed at frames 0 and 45, plus a camera and a light.
fn demo_scene() -> Scene {
    let mut scene = Scene::new();

    let cube = scene.add_object("Cube", ObjectKind::Mesh);
    if let Some(object) = scene.object_mut(cube) {
        object.mesh = Some(MeshStats {
            vertices: 8,
            polygons: 6,
        });
        object.selected = true;
        object.animation = Some(AnimationData {
            action: Some(Action {
                name: "CubeAction".to_string(),
                fcurves: vec![FCurve {
                    data_path: "location".to_string(),
                    array_index: 2,
                    keyframe_points: vec![
                        KeyframePoint {
                            frame: 0.0,
                            value: 0.0,
                        },
                        KeyframePoint {
                            frame: 45.0,
                            value: 1.0,
                        },
                    ],
                }],
            }),
        });
    }
    scene.active_object = Some(cube);

    let camera = scene.add_object("Camera", ObjectKind::Camera);
    if let Some(object) = scene.object_mut(camera) {
        object.transform = Transform::at(Vec3::new(0.0, -8.0, 2.0));
    }
    let light = scene.add_object("Light", ObjectKind::Light);
    if let Some(object) = scene.object_mut(light) {
        object.transform = Transform::at(Vec3::new(4.0, -4.0, 6.0));
    }

    scene
}
