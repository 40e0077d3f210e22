//! Transform system.
//!
//! Hierarchy matrix updates for the scene graph, decoupled from `Scene` to
//! avoid borrow conflicts: the functions here only borrow the node arena and
//! the camera pool.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::camera::Camera;
use crate::scene::node::Node;
use crate::scene::{CameraKey, NodeHandle};

/// Updates world matrices for the whole hierarchy.
///
/// Uses an explicit work stack instead of recursion, so deep hierarchies
/// cannot overflow the call stack. A node's world matrix is recomputed only
/// when its own TRS changed or an ancestor's world matrix changed; cameras
/// attached to updated nodes get their view matrices refreshed in the same
/// walk.
pub fn update_hierarchy(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    roots: &[NodeHandle],
) {
    // Work stack: (node handle, parent world matrix, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root_handle in roots.iter().rev() {
        stack.push((root_handle, Affine3A::IDENTITY, false));
    }

    process_stack(nodes, cameras, &mut stack);
}

/// Updates world matrices for a single subtree.
///
/// The subtree root inherits its parent's current world matrix and is treated
/// as changed, so every descendant gets a fresh world matrix. Used after
/// re-parenting, where the cached matrices are stale regardless of the
/// dirty flags.
pub fn update_subtree(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    root_handle: NodeHandle,
) {
    let parent_world = match nodes.get(root_handle) {
        Some(node) => match node.parent {
            Some(parent_handle) => nodes
                .get(parent_handle)
                .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix),
            None => Affine3A::IDENTITY,
        },
        None => return,
    };

    let mut stack = vec![(root_handle, parent_world, true)];
    process_stack(nodes, cameras, &mut stack);
}

fn process_stack(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    stack: &mut Vec<(NodeHandle, Affine3A, bool)>,
) {
    while let Some((node_handle, parent_world_matrix, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(node_handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        if world_needs_update {
            let new_world = parent_world_matrix * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);

            // Keep the attached camera's view matrices in sync.
            if let Some(camera_key) = node.camera {
                if let Some(camera) = cameras.get_mut(camera_key) {
                    camera.update_view_projection(&new_world);
                }
            }
        }

        let current_world = node.transform.world_matrix;
        let children_count = node.children.len();

        // Push children in reverse to preserve declaration order.
        for i in (0..children_count).rev() {
            if let Some(node) = nodes.get(node_handle) {
                if let Some(&child_handle) = node.children.get(i) {
                    stack.push((child_handle, current_world, world_needs_update));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_hierarchy_update() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let mut cameras: SlotMap<CameraKey, Camera> = SlotMap::with_key();

        let mut parent = Node::new();
        parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
        let parent_handle = nodes.insert(parent);

        let mut child = Node::new();
        child.transform.position = Vec3::new(0.0, 1.0, 0.0);
        child.parent = Some(parent_handle);
        let child_handle = nodes.insert(child);

        nodes
            .get_mut(parent_handle)
            .unwrap()
            .children
            .push(child_handle);

        let roots = vec![parent_handle];

        update_hierarchy(&mut nodes, &mut cameras, &roots);

        let child_world_pos = nodes
            .get(child_handle)
            .unwrap()
            .transform
            .world_matrix
            .translation;
        assert!((child_world_pos.x - 1.0).abs() < 1e-5);
        assert!((child_world_pos.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unchanged_nodes_keep_world_matrix() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let mut cameras: SlotMap<CameraKey, Camera> = SlotMap::with_key();

        let mut node = Node::new();
        node.transform.position = Vec3::new(2.0, 3.0, 4.0);
        let handle = nodes.insert(node);
        let roots = vec![handle];

        update_hierarchy(&mut nodes, &mut cameras, &roots);
        let first = nodes.get(handle).unwrap().transform.world_matrix;

        // Second pass with no edits must not disturb the cached matrix.
        update_hierarchy(&mut nodes, &mut cameras, &roots);
        let second = nodes.get(handle).unwrap().transform.world_matrix;

        assert_eq!(first, second);
    }
}
