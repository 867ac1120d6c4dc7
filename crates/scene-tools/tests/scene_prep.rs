use glam::Vec3;
use turntable_host_core::{MemoryHost, RecordingRenderer, SceneHost};
use turntable_project_model::{MeshStats, ObjectId, ObjectKind, Scene, Transform};
use turntable_scene_tools::{create_root_and_reparent, remove_empties_and_merge};

fn add_mesh(scene: &mut Scene, name: &str, selected: bool) -> ObjectId {
    let id = scene.add_object(name, ObjectKind::Mesh);
    let object = scene.object_mut(id).unwrap();
    object.mesh = Some(MeshStats {
        vertices: 8,
        polygons: 6,
    });
    object.selected = selected;
    id
}

#[test]
fn three_empties_and_two_selected_meshes_drop_four_objects() {
    let mut scene = Scene::new();
    for name in ["Empty", "Empty.001", "Empty.002"] {
        scene.add_object(name, ObjectKind::Empty);
    }
    let body = add_mesh(&mut scene, "Body", true);
    let arm = add_mesh(&mut scene, "Arm", true);
    scene.add_object("Camera", ObjectKind::Camera);
    let before = scene.len();

    let mut host = MemoryHost::new(scene, RecordingRenderer::new());
    let report = remove_empties_and_merge(&mut host).unwrap();

    assert_eq!(report.deleted_empties, 3);
    assert_eq!(report.merged_meshes, 1);
    assert_eq!(report.removed_objects(), 4);
    assert_eq!(host.scene().len(), before - 4);
    assert_eq!(report.survivor, Some(body));
    assert!(host.scene().object(arm).is_none());
    assert_eq!(host.active_object(), Some(body));
    assert_eq!(
        host.scene().object(body).unwrap().mesh,
        Some(MeshStats {
            vertices: 16,
            polygons: 12
        })
    );
    assert!(host
        .scene()
        .objects
        .iter()
        .all(|o| o.kind != ObjectKind::Empty));
}

#[test]
fn cleanup_without_empties_or_selection_changes_nothing() {
    let mut scene = Scene::new();
    add_mesh(&mut scene, "Body", false);
    add_mesh(&mut scene, "Arm", false);
    let mut host = MemoryHost::new(scene, RecordingRenderer::new());

    let report = remove_empties_and_merge(&mut host).unwrap();

    assert_eq!(report.removed_objects(), 0);
    assert_eq!(host.scene().len(), 2);
}

/// Scene with `Child` at local (1, 0, 0) under `Rig` at (0, 0, 5).
fn rigged_scene() -> (Scene, ObjectId) {
    let mut scene = Scene::new();
    let rig = scene.add_object("Rig", ObjectKind::Empty);
    scene.object_mut(rig).unwrap().transform = Transform::at(Vec3::new(0.0, 0.0, 5.0));
    let child = add_mesh(&mut scene, "Child", true);
    let object = scene.object_mut(child).unwrap();
    object.transform = Transform::at(Vec3::new(1.0, 0.0, 0.0));
    object.parent = Some(rig);
    (scene, child)
}

#[test]
fn reparenting_keeps_local_transform_by_default() {
    let (scene, child) = rigged_scene();
    let mut host = MemoryHost::new(scene, RecordingRenderer::new());
    assert!(host.world_location(child).unwrap().abs_diff_eq(Vec3::new(1.0, 0.0, 5.0), 1e-5));

    let report = create_root_and_reparent(&mut host, false).unwrap();

    assert_eq!(report.reparented, vec![child]);
    assert_eq!(host.scene().object(child).unwrap().parent, Some(report.root));
    assert!(host.world_location(child).unwrap().abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
    assert_eq!(host.active_object(), Some(report.root));
    assert!(host.world_location(report.root).unwrap().abs_diff_eq(Vec3::ZERO, 1e-6));
}

#[test]
fn reparenting_can_keep_world_transform() {
    let (scene, child) = rigged_scene();
    let mut host = MemoryHost::new(scene, RecordingRenderer::new());

    let report = create_root_and_reparent(&mut host, true).unwrap();

    assert_eq!(host.scene().object(child).unwrap().parent, Some(report.root));
    assert!(host.world_location(child).unwrap().abs_diff_eq(Vec3::new(1.0, 0.0, 5.0), 1e-5));
}

#[test]
fn every_selected_object_is_parented_to_root() {
    let mut scene = Scene::new();
    let a = add_mesh(&mut scene, "A", true);
    let b = add_mesh(&mut scene, "B", true);
    let lamp = scene.add_object("Lamp", ObjectKind::Light);
    scene.object_mut(lamp).unwrap().selected = true;
    let unselected = add_mesh(&mut scene, "C", false);
    let mut host = MemoryHost::new(scene, RecordingRenderer::new());

    let report = create_root_and_reparent(&mut host, false).unwrap();

    assert_eq!(report.reparented, vec![a, b, lamp]);
    assert_eq!(host.scene().object(unselected).unwrap().parent, None);
    assert_eq!(host.scene().len(), 5);
}
