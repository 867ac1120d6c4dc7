//! Empty removal and mesh merge.

use serde::Serialize;
use turntable_common::error::TurntableResult;
use turntable_host_core::SceneHost;
use turntable_project_model::{ObjectId, ObjectKind};

use crate::host_error;

/// Outcome of [`remove_empties_and_merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Empties deleted from the scene.
    pub deleted_empties: usize,

    /// Meshes joined into the survivor, not counting the survivor itself.
    pub merged_meshes: usize,

    /// Mesh that received the join, when one happened.
    pub survivor: Option<ObjectId>,
}

impl CleanupReport {
    /// Net change in scene object count.
    pub fn removed_objects(&self) -> usize {
        self.deleted_empties + self.merged_meshes
    }
}

/// Delete every empty in the scene, then join the meshes that were selected
/// beforehand into the first of them.
///
/// The selection is captured before anything is deselected, so the merge
/// acts on what the user had selected even though deleting empties replaces
/// the selection. With fewer than two selected meshes nothing is joined.
pub fn remove_empties_and_merge<H: SceneHost + ?Sized>(
    host: &mut H,
) -> TurntableResult<CleanupReport> {
    let snapshot = host.selected_objects();
    let mut report = CleanupReport::default();

    host.deselect_all();
    let mut empties = 0;
    for id in host.objects() {
        if host.object_kind(id).map_err(host_error)? == ObjectKind::Empty {
            host.set_selected(id, true).map_err(host_error)?;
            empties += 1;
        }
    }
    if empties > 0 {
        report.deleted_empties = host.delete_selected().map_err(host_error)?;
    }

    let meshes: Vec<ObjectId> = snapshot
        .into_iter()
        .filter(|id| matches!(host.object_kind(*id), Ok(ObjectKind::Mesh)))
        .collect();

    if let Some((&target, others)) = meshes.split_first() {
        if !others.is_empty() {
            host.set_active_object(Some(target)).map_err(host_error)?;
            host.join_meshes(target, others).map_err(host_error)?;
            report.merged_meshes = others.len();
            report.survivor = Some(target);
        }
    }

    tracing::info!(
        deleted_empties = report.deleted_empties,
        merged_meshes = report.merged_meshes,
        survivor = ?report.survivor,
        "Removed empties and merged meshes"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use turntable_host_core::{MemoryHost, RecordingRenderer};
    use turntable_project_model::{MeshStats, Scene};

    fn mesh(scene: &mut Scene, name: &str, vertices: u64, selected: bool) -> ObjectId {
        let id = scene.add_object(name, ObjectKind::Mesh);
        let object = scene.object_mut(id).unwrap();
        object.mesh = Some(MeshStats {
            vertices,
            polygons: vertices / 2,
        });
        object.selected = selected;
        id
    }

    #[test]
    fn test_no_empties_single_mesh_is_noop() {
        let mut scene = Scene::new();
        let cube = mesh(&mut scene, "Cube", 8, true);
        let mut host = MemoryHost::new(scene, RecordingRenderer::new());

        let report = remove_empties_and_merge(&mut host).unwrap();

        assert_eq!(report, CleanupReport::default());
        assert_eq!(host.scene().len(), 1);
        assert!(host.scene().object(cube).is_some());
    }

    #[test]
    fn test_unselected_meshes_are_not_merged() {
        let mut scene = Scene::new();
        mesh(&mut scene, "A", 8, true);
        mesh(&mut scene, "B", 8, false);
        scene.add_object("Empty", ObjectKind::Empty);
        let mut host = MemoryHost::new(scene, RecordingRenderer::new());

        let report = remove_empties_and_merge(&mut host).unwrap();

        assert_eq!(report.deleted_empties, 1);
        assert_eq!(report.merged_meshes, 0);
        assert_eq!(host.scene().len(), 2);
    }

    #[test]
    fn test_selected_empty_is_deleted_not_merged() {
        let mut scene = Scene::new();
        let a = mesh(&mut scene, "A", 4, true);
        let b = mesh(&mut scene, "B", 6, true);
        let empty = scene.add_object("Empty", ObjectKind::Empty);
        scene.object_mut(empty).unwrap().selected = true;
        let mut host = MemoryHost::new(scene, RecordingRenderer::new());

        let report = remove_empties_and_merge(&mut host).unwrap();

        assert_eq!(report.deleted_empties, 1);
        assert_eq!(report.merged_meshes, 1);
        assert_eq!(report.survivor, Some(a));
        assert!(host.scene().object(b).is_none());
        assert_eq!(host.scene().active_object, Some(a));
        assert_eq!(
            host.scene().object(a).unwrap().mesh,
            Some(MeshStats {
                vertices: 10,
                polygons: 5
            })
        );
    }
}
