//! Scene snapshot types.
//!
//! A scene is the slice of host state the renderer and scene utilities work
//! on: objects with transforms and parenting, per-object animation curves,
//! the selection, the timeline position, and render output settings.
//!
//! Rotations are Euler angles in radians applied X, then Y, then Z
//! (extrinsic), with Z as the vertical axis.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::compositor::NodeTree;

/// Stable identifier of an object within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Object type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Mesh,
    /// Non-rendering placeholder used for grouping and parenting.
    Empty,
    Camera,
    Light,
    Other,
}

/// Local transform of an object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Vec3,
    /// Euler rotation in radians (X, Y, Z).
    pub rotation_euler: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Transform at a location with no rotation and unit scale.
    pub fn at(location: Vec3) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }

    /// Compose into a 4x4 matrix.
    pub fn matrix(&self) -> Mat4 {
        let r = self.rotation_euler;
        let rotation = Quat::from_euler(EulerRot::ZYX, r.z, r.y, r.x);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.location)
    }

    /// Decompose a matrix without shear back into a transform.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, location) = matrix.to_scale_rotation_translation();
        let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
        Self {
            location,
            rotation_euler: Vec3::new(x, y, z),
            scale,
        }
    }
}

/// A single keyframe sample on an animation curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyframePoint {
    /// Frame position; may be fractional.
    pub frame: f64,
    /// Sampled value.
    pub value: f64,
}

/// Animation curve for one property channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    /// Animated property (e.g., "location", "rotation_euler").
    pub data_path: String,

    /// Component index within the property.
    #[serde(default)]
    pub array_index: u32,

    /// Keyframe samples, not necessarily sorted.
    #[serde(default)]
    pub keyframe_points: Vec<KeyframePoint>,
}

/// A named set of curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub fcurves: Vec<FCurve>,
}

/// Animation attached to an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationData {
    /// The active action, if any.
    pub action: Option<Action>,
}

/// Geometry statistics carried by mesh objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshStats {
    pub vertices: u64,
    pub polygons: u64,
}

/// An object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,

    #[serde(default)]
    pub transform: Transform,

    #[serde(default)]
    pub parent: Option<ObjectId>,

    /// Inverse of the parent's world matrix captured when parenting with
    /// transform compensation. Identity otherwise.
    #[serde(default)]
    pub parent_inverse: Mat4,

    #[serde(default)]
    pub selected: bool,

    #[serde(default)]
    pub animation: Option<AnimationData>,

    #[serde(default)]
    pub mesh: Option<MeshStats>,
}

impl SceneObject {
    pub fn new(id: ObjectId, name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            transform: Transform::default(),
            parent: None,
            parent_inverse: Mat4::IDENTITY,
            selected: false,
            animation: None,
            mesh: match kind {
                ObjectKind::Mesh => Some(MeshStats::default()),
                _ => None,
            },
        }
    }

    /// Active action curves, empty when the object is not animated.
    pub fn fcurves(&self) -> &[FCurve] {
        self.animation
            .as_ref()
            .and_then(|a| a.action.as_ref())
            .map(|a| a.fcurves.as_slice())
            .unwrap_or(&[])
    }
}

/// Render output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Target path of the next still render.
    pub filepath: String,

    /// Whether the compositor graph is applied to renders.
    #[serde(default)]
    pub use_compositing: bool,
}

/// Scene snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,

    #[serde(default)]
    pub active_object: Option<ObjectId>,

    /// Current timeline frame.
    #[serde(default)]
    pub frame_current: i64,

    #[serde(default)]
    pub render: RenderSettings,

    /// Whether the compositor node tree is in use.
    #[serde(default)]
    pub use_nodes: bool,

    #[serde(default)]
    pub compositor: NodeTree,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its id.
    pub fn add_object(&mut self, name: impl Into<String>, kind: ObjectKind) -> ObjectId {
        let id = self.next_id();
        self.objects.push(SceneObject::new(id, name, kind));
        id
    }

    /// Next free object id.
    pub fn next_id(&self) -> ObjectId {
        ObjectId(self.objects.iter().map(|o| o.id.0 + 1).max().unwrap_or(0))
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Find an object by name.
    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Remove an object. Children are unparented and the active object is
    /// cleared if it was removed.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        let removed = self.objects.remove(index);
        for child in self.objects.iter_mut().filter(|o| o.parent == Some(id)) {
            child.parent = None;
            child.parent_inverse = Mat4::IDENTITY;
        }
        if self.active_object == Some(id) {
            self.active_object = None;
        }
        Some(removed)
    }

    /// Selected objects in scene order.
    pub fn selected_ids(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// World matrix of an object, following the parent chain.
    ///
    /// Dangling parent references end the chain; cycles are cut after
    /// visiting every object once.
    pub fn world_matrix(&self, id: ObjectId) -> Option<Mat4> {
        let mut object = self.object(id)?;
        let mut world = object.transform.matrix();
        for _ in 0..self.objects.len() {
            let Some(parent) = object.parent.and_then(|p| self.object(p)) else {
                break;
            };
            world = parent.transform.matrix() * object.parent_inverse * world;
            object = parent;
        }
        Some(world)
    }
}
