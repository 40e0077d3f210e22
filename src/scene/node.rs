use crate::scene::transform::Transform;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle};
use glam::Affine3A;

/// A scene node: hierarchy, transform, and optional component keys.
///
/// # Design Principles
///
/// - Keeps the data that must be traversed every frame (hierarchy and
///   transform) directly on the node
/// - Component payloads (Mesh, Camera, Light) live in the Scene's pools;
///   the node only carries their keys
///
/// # Hierarchy
///
/// Nodes form a tree structure through parent-child relationships:
/// - `parent`: Optional handle to parent node (None for root nodes)
/// - `children`: List of child node handles
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node handle (None for root nodes)
    pub(crate) parent: Option<NodeHandle>,
    /// Child node handles
    pub(crate) children: Vec<NodeHandle>,

    /// Transform component (hot data accessed every frame)
    pub transform: Transform,

    /// Visibility flag for culling
    pub visible: bool,

    // === Attached components ===
    pub mesh: Option<MeshKey>,
    pub camera: Option<CameraKey>,
    pub light: Option<LightKey>,
}

impl Node {
    /// Creates a new node with default transform and visibility.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            mesh: None,
            camera: None,
            light: None,
        }
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Returns a reference to the world transformation matrix.
    ///
    /// This matrix transforms local coordinates to world coordinates.
    /// It is updated by the transform system each frame.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
