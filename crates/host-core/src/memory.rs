//! Document-backed in-memory host.
//!
//! Holds a [`Scene`] snapshot and applies every capability call to it
//! directly. Still renders are delegated to a [`StillRenderer`].

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use turntable_project_model::{
    MeshStats, NodeId, NodeKind, ObjectId, ObjectKind, Scene, SceneObject, Transform,
};

use crate::{CompositorHost, HostError, HostResult, RenderRequest, SceneHost, StillRenderer};

/// In-memory host over a scene snapshot.
#[derive(Debug)]
pub struct MemoryHost<R> {
    scene: Scene,
    renderer: R,
    document: Option<PathBuf>,
}

impl<R: StillRenderer> MemoryHost<R> {
    pub fn new(scene: Scene, renderer: R) -> Self {
        Self {
            scene,
            renderer,
            document: None,
        }
    }

    /// Attach the document path passed along with each render request.
    pub fn with_document(mut self, path: impl Into<PathBuf>) -> Self {
        self.document = Some(path.into());
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Consume the host, returning the mutated scene.
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    fn object(&self, id: ObjectId) -> HostResult<&SceneObject> {
        self.scene.object(id).ok_or(HostError::UnknownObject(id))
    }

    fn object_mut(&mut self, id: ObjectId) -> HostResult<&mut SceneObject> {
        self.scene
            .object_mut(id)
            .ok_or(HostError::UnknownObject(id))
    }

    fn is_ancestor(&self, candidate: ObjectId, of: ObjectId) -> bool {
        let mut current = self.scene.object(of).and_then(|o| o.parent);
        for _ in 0..self.scene.len() {
            match current {
                Some(id) if id == candidate => return true,
                Some(id) => current = self.scene.object(id).and_then(|o| o.parent),
                None => return false,
            }
        }
        false
    }

    /// Host-style unique name: `ROOT`, then `ROOT.001`, `ROOT.002`, ...
    fn unique_name(&self, name: &str) -> String {
        if self.scene.find(name).is_none() {
            return name.to_string();
        }
        (1..)
            .map(|n| format!("{name}.{n:03}"))
            .find(|candidate| self.scene.find(candidate).is_none())
            .unwrap_or_else(|| name.to_string())
    }
}

impl<R: StillRenderer> SceneHost for MemoryHost<R> {
    fn active_object(&self) -> Option<ObjectId> {
        self.scene.active_object
    }

    fn set_active_object(&mut self, id: Option<ObjectId>) -> HostResult<()> {
        if let Some(id) = id {
            self.object(id)?;
        }
        self.scene.active_object = id;
        Ok(())
    }

    fn objects(&self) -> Vec<ObjectId> {
        self.scene.objects.iter().map(|o| o.id).collect()
    }

    fn object_name(&self, id: ObjectId) -> HostResult<String> {
        Ok(self.object(id)?.name.clone())
    }

    fn object_kind(&self, id: ObjectId) -> HostResult<ObjectKind> {
        Ok(self.object(id)?.kind)
    }

    fn keyframe_positions(&self, id: ObjectId) -> HostResult<Vec<f64>> {
        Ok(self
            .object(id)?
            .fcurves()
            .iter()
            .flat_map(|curve| curve.keyframe_points.iter().map(|kp| kp.frame))
            .collect())
    }

    fn yaw(&self, id: ObjectId) -> HostResult<f64> {
        Ok(self.object(id)?.transform.rotation_euler.z as f64)
    }

    fn set_yaw(&mut self, id: ObjectId, radians: f64) -> HostResult<()> {
        self.object_mut(id)?.transform.rotation_euler.z = radians as f32;
        Ok(())
    }

    fn world_location(&self, id: ObjectId) -> HostResult<Vec3> {
        let world = self
            .scene
            .world_matrix(id)
            .ok_or(HostError::UnknownObject(id))?;
        Ok(world.transform_point3(Vec3::ZERO))
    }

    fn current_frame(&self) -> i64 {
        self.scene.frame_current
    }

    fn set_frame(&mut self, frame: i64) -> HostResult<()> {
        self.scene.frame_current = frame;
        Ok(())
    }

    fn render_filepath(&self) -> String {
        self.scene.render.filepath.clone()
    }

    fn set_render_filepath(&mut self, path: &Path) -> HostResult<()> {
        self.scene.render.filepath = path.to_string_lossy().into_owned();
        Ok(())
    }

    fn render_still(&mut self) -> HostResult<()> {
        if self.scene.render.filepath.is_empty() {
            return Err(HostError::render("render filepath is not set"));
        }
        let output = PathBuf::from(&self.scene.render.filepath);
        let request = RenderRequest {
            scene: &self.scene,
            output: &output,
            document: self.document.as_deref(),
        };
        tracing::trace!(
            renderer = self.renderer.name(),
            output = %output.display(),
            frame = self.scene.frame_current,
            "Rendering still"
        );
        self.renderer.render_still(&request)
    }

    fn selected_objects(&self) -> Vec<ObjectId> {
        self.scene.selected_ids()
    }

    fn deselect_all(&mut self) {
        for object in &mut self.scene.objects {
            object.selected = false;
        }
    }

    fn set_selected(&mut self, id: ObjectId, selected: bool) -> HostResult<()> {
        self.object_mut(id)?.selected = selected;
        Ok(())
    }

    fn delete_selected(&mut self) -> HostResult<usize> {
        let selected = self.scene.selected_ids();
        for id in &selected {
            self.scene.remove_object(*id);
        }
        Ok(selected.len())
    }

    fn join_meshes(&mut self, target: ObjectId, others: &[ObjectId]) -> HostResult<()> {
        for id in std::iter::once(&target).chain(others) {
            let object = self.object(*id)?;
            if object.kind != ObjectKind::Mesh {
                return Err(HostError::NotAMesh {
                    name: object.name.clone(),
                });
            }
        }

        let mut merged = self.object(target)?.mesh.unwrap_or_default();
        for id in others.iter().filter(|id| **id != target) {
            if let Some(removed) = self.scene.remove_object(*id) {
                let stats = removed.mesh.unwrap_or_default();
                merged = MeshStats {
                    vertices: merged.vertices + stats.vertices,
                    polygons: merged.polygons + stats.polygons,
                };
            }
        }

        let survivor = self.object_mut(target)?;
        survivor.mesh = Some(merged);
        survivor.selected = true;
        self.scene.active_object = Some(target);
        Ok(())
    }

    fn create_empty(&mut self, name: &str, location: Vec3) -> HostResult<ObjectId> {
        let name = self.unique_name(name);
        self.deselect_all();
        let id = self.scene.add_object(name, ObjectKind::Empty);
        let object = self.object_mut(id)?;
        object.transform = Transform::at(location);
        object.selected = true;
        self.scene.active_object = Some(id);
        Ok(id)
    }

    fn set_parent(
        &mut self,
        child: ObjectId,
        parent: ObjectId,
        keep_world_transform: bool,
    ) -> HostResult<()> {
        self.object(parent)?;
        self.object(child)?;
        if child == parent {
            return Err(HostError::InvalidParent {
                child,
                parent,
                reason: "an object cannot be its own parent".to_string(),
            });
        }
        if self.is_ancestor(child, parent) {
            return Err(HostError::InvalidParent {
                child,
                parent,
                reason: "would create a parenting loop".to_string(),
            });
        }

        let compensation = if keep_world_transform {
            let world = self.scene.world_matrix(child).unwrap_or(Mat4::IDENTITY);
            let parent_world = self.scene.world_matrix(parent).unwrap_or(Mat4::IDENTITY);
            Some((Transform::from_matrix(world), parent_world.inverse()))
        } else {
            None
        };

        let object = self.object_mut(child)?;
        object.parent = Some(parent);
        if let Some((transform, parent_inverse)) = compensation {
            object.transform = transform;
            object.parent_inverse = parent_inverse;
        }
        Ok(())
    }
}

impl<R: StillRenderer> CompositorHost for MemoryHost<R> {
    fn enable_compositing(&mut self) -> HostResult<()> {
        self.scene.use_nodes = true;
        self.scene.render.use_compositing = true;
        Ok(())
    }

    fn clear_compositor(&mut self) -> HostResult<()> {
        self.scene.compositor.clear();
        Ok(())
    }

    fn add_compositor_node(&mut self, kind: NodeKind) -> HostResult<NodeId> {
        Ok(self.scene.compositor.add_node(kind))
    }

    fn link_compositor_nodes(&mut self, from: NodeId, to: NodeId) -> HostResult<()> {
        Ok(self.scene.compositor.link(from, to)?)
    }
}
