use glam::{Affine3A, Vec4};
use slotmap::SlotMap;

use crate::resources::mesh::Mesh;
use crate::scene::camera::Camera;
use crate::scene::environment::Environment;
use crate::scene::light::Light;
use crate::scene::node::Node;
use crate::scene::transform::Transform;
use crate::scene::transform_system;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle};

/// Scene graph container.
///
/// Scene is a pure data layer: the node hierarchy plus pools for the
/// component payloads (meshes, cameras, lights). GPU-side state lives in the
/// renderer and is derived from this data every frame.
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Component pools ====
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub lights: SlotMap<LightKey, Light>,

    // Environment and global settings
    pub environment: Environment,

    /// Clear color. None leaves whatever the renderer's default is.
    pub background: Option<Vec4>,

    pub active_camera: Option<NodeHandle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),

            environment: Environment::new(),
            background: Some(Vec4::new(0.0, 0.0, 0.0, 1.0)),

            active_camera: None,
        }
    }

    /// Iterates all lights in the scene with their world matrices.
    pub fn iter_active_lights(&self) -> impl Iterator<Item = (&Light, &Affine3A)> {
        self.nodes.iter().filter_map(|(_, node)| {
            let light_key = node.light?;
            let light = self.lights.get(light_key)?;
            Some((light, &node.transform.world_matrix))
        })
    }

    /// Iterates all visible nodes that carry a mesh.
    pub fn iter_visible_meshes(&self) -> impl Iterator<Item = (NodeHandle, &Node, &Mesh)> {
        self.nodes.iter().filter_map(|(handle, node)| {
            if !node.visible {
                return None;
            }
            let mesh_key = node.mesh?;
            let mesh = self.meshes.get(mesh_key)?;
            Some((handle, node, mesh))
        })
    }

    /// Starts building a node.
    pub fn build_node(&'_ mut self) -> NodeBuilder<'_> {
        NodeBuilder::new(self)
    }

    /// Adds a node to the scene (as a root node).
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, child: Node, parent_handle: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(child);

        if let Some(p) = self.nodes.get_mut(parent_handle) {
            p.children.push(handle);
        }
        if let Some(c) = self.nodes.get_mut(handle) {
            c.parent = Some(parent_handle);
        }

        handle
    }

    /// Removes a node and, recursively, all of its children.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        // Take the children list first to avoid borrow conflicts.
        let children = if let Some(node) = self.nodes.get(handle) {
            node.children.clone()
        } else {
            return;
        };

        for child in children {
            self.remove_node(child);
        }

        // Unlink from the parent, or from the root set.
        let parent_opt = self.nodes.get(handle).and_then(|n| n.parent);

        if let Some(parent_handle) = parent_opt {
            if let Some(parent) = self.nodes.get_mut(parent_handle)
                && let Some(pos) = parent.children.iter().position(|&x| x == handle)
            {
                parent.children.remove(pos);
            }
        } else if let Some(pos) = self.root_nodes.iter().position(|&x| x == handle) {
            self.root_nodes.remove(pos);
        }

        // Drop attached components with the node.
        if let Some(node) = self.nodes.get(handle) {
            if let Some(mesh_key) = node.mesh {
                self.meshes.remove(mesh_key);
            }
            if let Some(camera_key) = node.camera {
                self.cameras.remove(camera_key);
            }
            if let Some(light_key) = node.light {
                self.lights.remove(light_key);
            }
        }

        self.nodes.remove(handle);
    }

    /// Re-parents `child_handle` under `parent_handle`.
    pub fn attach(&mut self, child_handle: NodeHandle, parent_handle: NodeHandle) {
        if child_handle == parent_handle {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        // 1. Detach from old
        let old_parent = self.nodes.get(child_handle).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child_handle)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child_handle) {
            self.root_nodes.remove(i);
        }

        // 2. Attach to new
        if let Some(p) = self.nodes.get_mut(parent_handle) {
            p.children.push(child_handle);
        } else {
            log::error!("Parent node not found during attach!");
            // Put the child back on the root set so it is not orphaned.
            self.root_nodes.push(child_handle);
            return;
        }

        // 3. Update child
        if let Some(c) = self.nodes.get_mut(child_handle) {
            c.parent = Some(parent_handle);
            c.transform.mark_dirty();
        }
    }

    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Mutable access, for editing TRS.
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    // ========================================================================
    // Component queries
    // ========================================================================

    /// (Transform, Camera) pair of the active camera.
    pub fn query_main_camera_bundle(&mut self) -> Option<(&mut Transform, &mut Camera)> {
        let node_handle = self.active_camera?;
        self.query_camera_bundle(node_handle)
    }

    pub fn query_camera_bundle(
        &mut self,
        node_handle: NodeHandle,
    ) -> Option<(&mut Transform, &mut Camera)> {
        let camera_key = self.nodes.get(node_handle)?.camera?;
        let camera = self.cameras.get_mut(camera_key)?;
        let transform = &mut self.nodes.get_mut(node_handle)?.transform;

        Some((transform, camera))
    }

    pub fn query_light_bundle(
        &mut self,
        node_handle: NodeHandle,
    ) -> Option<(&mut Transform, &mut Light)> {
        let light_key = self.nodes.get(node_handle)?.light?;
        let light = self.lights.get_mut(light_key)?;
        let transform = &mut self.nodes.get_mut(node_handle)?.transform;
        Some((transform, light))
    }

    pub fn query_mesh_bundle(
        &mut self,
        node_handle: NodeHandle,
    ) -> Option<(&mut Transform, &Mesh)> {
        let mesh_key = self.nodes.get(node_handle)?.mesh?;
        let mesh = self.meshes.get(mesh_key)?;
        let transform = &mut self.nodes.get_mut(node_handle)?.transform;
        Some((transform, mesh))
    }

    // ========================================================================
    // Matrix update pipeline
    // ========================================================================

    /// Updates world matrices for the whole scene.
    ///
    /// Must run once per frame before rendering.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &mut self.cameras, &self.root_nodes);
    }

    /// Updates world matrices for one subtree.
    pub fn update_subtree(&mut self, root_handle: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, &mut self.cameras, root_handle);
    }

    // === Component insertion API ===

    /// Wraps `mesh` in a new root node.
    pub fn add_mesh(&mut self, mesh: Mesh) -> NodeHandle {
        let mut node = Node::new();
        node.mesh = Some(self.meshes.insert(mesh));
        self.add_node(node)
    }

    pub fn add_mesh_to_parent(&mut self, mesh: Mesh, parent: NodeHandle) -> NodeHandle {
        let mut node = Node::new();
        node.mesh = Some(self.meshes.insert(mesh));
        self.add_to_parent(node, parent)
    }

    pub fn add_camera(&mut self, camera: Camera) -> NodeHandle {
        let mut node = Node::new();
        node.camera = Some(self.cameras.insert(camera));
        self.add_node(node)
    }

    pub fn add_camera_to_parent(&mut self, camera: Camera, parent: NodeHandle) -> NodeHandle {
        let mut node = Node::new();
        node.camera = Some(self.cameras.insert(camera));
        self.add_to_parent(node, parent)
    }

    pub fn add_light(&mut self, light: Light) -> NodeHandle {
        let mut node = Node::new();
        node.light = Some(self.lights.insert(light));
        self.add_node(node)
    }

    pub fn add_light_to_parent(&mut self, light: Light, parent: NodeHandle) -> NodeHandle {
        let mut node = Node::new();
        node.light = Some(self.lights.insert(light));
        self.add_to_parent(node, parent)
    }

    pub fn main_camera_node_mut(&mut self) -> Option<&mut Node> {
        let handle = self.active_camera?;
        self.get_node_mut(handle)
    }

    pub fn main_camera_node(&self) -> Option<&Node> {
        let handle = self.active_camera?;
        self.get_node(handle)
    }
}

/// Chainable node construction.
pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    node: Node,
    parent: Option<NodeHandle>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene) -> Self {
        Self {
            scene,
            node: Node::new(),
            parent: None,
        }
    }

    // === Chainable configuration ===

    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.node.transform.position = glam::Vec3::new(x, y, z);
        self
    }

    #[must_use]
    pub fn with_rotation_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.node.transform.set_rotation_euler(x, y, z);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, s: f32) -> Self {
        self.node.transform.scale = glam::Vec3::splat(s);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attaches a mesh by key.
    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshKey) -> Self {
        self.node.mesh = Some(mesh);
        self
    }

    // === Terminal ===

    /// Inserts the node into the scene and returns its handle.
    pub fn build(self) -> NodeHandle {
        let node_handle = self.scene.nodes.insert(self.node);

        if let Some(parent_handle) = self.parent {
            self.scene.attach(node_handle, parent_handle);
        } else {
            self.scene.root_nodes.push(node_handle);
        }

        node_handle
    }
}
