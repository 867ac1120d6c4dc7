//! Turntable host core contracts.
//!
//! The render pipeline and scene utilities never talk to a concrete 3D
//! application. They go through the narrow capability traits defined here:
//! - [`SceneHost`]: objects, animation, transforms, timeline, selection, render
//! - [`CompositorHost`]: the node compositor used by the post stage
//! - [`StillRenderer`]: the engine that turns a scene into an image file
//!
//! [`MemoryHost`] implements the scene and compositor traits over a
//! [`Scene`](turntable_project_model::Scene) snapshot and delegates pixel
//! generation to a pluggable [`StillRenderer`].

use std::path::Path;

use glam::Vec3;
use turntable_project_model::{NodeId, NodeKind, NodeTreeError, ObjectId, ObjectKind, Scene};

pub mod memory;
pub mod recording;

pub use memory::MemoryHost;
pub use recording::{RenderRecord, RecordingRenderer};

/// Errors raised by a host binding.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Unknown object {0}")]
    UnknownObject(ObjectId),

    #[error("Object '{name}' is not a mesh")]
    NotAMesh { name: String },

    #[error("Cannot parent {child} under {parent}: {reason}")]
    InvalidParent {
        child: ObjectId,
        parent: ObjectId,
        reason: String,
    },

    #[error("Render failed: {message}")]
    Render { message: String },

    #[error(transparent)]
    Compositor(#[from] NodeTreeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type HostResult<T> = Result<T, HostError>;

impl HostError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }
}

/// Scene, animation, timeline, selection, and render capabilities of a host.
pub trait SceneHost {
    /// The active object, if any.
    fn active_object(&self) -> Option<ObjectId>;

    /// Make an object active (or clear the active object).
    fn set_active_object(&mut self, id: Option<ObjectId>) -> HostResult<()>;

    /// All objects in scene order.
    fn objects(&self) -> Vec<ObjectId>;

    fn object_name(&self, id: ObjectId) -> HostResult<String>;

    fn object_kind(&self, id: ObjectId) -> HostResult<ObjectKind>;

    /// Frame positions of every keyframe on every curve of the object's
    /// active action, in curve order. Empty when the object is not animated.
    fn keyframe_positions(&self, id: ObjectId) -> HostResult<Vec<f64>>;

    /// Rotation about the vertical axis, in radians.
    fn yaw(&self, id: ObjectId) -> HostResult<f64>;

    fn set_yaw(&mut self, id: ObjectId, radians: f64) -> HostResult<()>;

    /// World-space location of an object.
    fn world_location(&self, id: ObjectId) -> HostResult<Vec3>;

    fn current_frame(&self) -> i64;

    fn set_frame(&mut self, frame: i64) -> HostResult<()>;

    fn render_filepath(&self) -> String;

    fn set_render_filepath(&mut self, path: &Path) -> HostResult<()>;

    /// Render the current scene to the render filepath. Blocks until the
    /// image is written.
    fn render_still(&mut self) -> HostResult<()>;

    /// Selected objects in scene order.
    fn selected_objects(&self) -> Vec<ObjectId>;

    fn deselect_all(&mut self);

    fn set_selected(&mut self, id: ObjectId, selected: bool) -> HostResult<()>;

    /// Delete every selected object; returns how many were removed.
    fn delete_selected(&mut self) -> HostResult<usize>;

    /// Merge `others` into the mesh `target`, removing them from the scene.
    fn join_meshes(&mut self, target: ObjectId, others: &[ObjectId]) -> HostResult<()>;

    /// Add an empty at `location`. The new object becomes the only selected
    /// object and the active object.
    fn create_empty(&mut self, name: &str, location: Vec3) -> HostResult<ObjectId>;

    /// Parent `child` under `parent`. With `keep_world_transform` the child's
    /// world transform is preserved; otherwise only the link changes.
    fn set_parent(
        &mut self,
        child: ObjectId,
        parent: ObjectId,
        keep_world_transform: bool,
    ) -> HostResult<()>;
}

/// Node compositor capabilities of a host.
pub trait CompositorHost {
    /// Switch renders to go through the compositor node tree.
    fn enable_compositing(&mut self) -> HostResult<()>;

    /// Remove every node and link.
    fn clear_compositor(&mut self) -> HostResult<()>;

    fn add_compositor_node(&mut self, kind: NodeKind) -> HostResult<NodeId>;

    fn link_compositor_nodes(&mut self, from: NodeId, to: NodeId) -> HostResult<()>;
}

/// A single still render handed to a render engine.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Scene state at render time.
    pub scene: &'a Scene,

    /// Target image path.
    pub output: &'a Path,

    /// Document file the scene came from, if any.
    pub document: Option<&'a Path>,
}

/// Engine that produces an image for a scene.
pub trait StillRenderer {
    /// Render synchronously; the file must exist when this returns `Ok`.
    fn render_still(&mut self, request: &RenderRequest<'_>) -> HostResult<()>;

    /// Check if this renderer can run on this system.
    fn is_available(&self) -> bool;

    /// Renderer name.
    fn name(&self) -> &str;
}

impl<R: StillRenderer + ?Sized> StillRenderer for Box<R> {
    fn render_still(&mut self, request: &RenderRequest<'_>) -> HostResult<()> {
        (**self).render_still(request)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
