//! The first tutorial step: a single spinning cube.

use glam::{Vec3, Vec4};
use winit::window::Window;

use gloam::app::{App, AppHandler, Input};
use gloam::engine::{Engine, FrameState};
use gloam::resources::{Material, Mesh, create_box};
use gloam::scene::{Camera, Light, NodeHandle};
use gloam::utils::FpsCounter;

struct RotatingCube {
    cube: NodeHandle,
    fps_counter: FpsCounter,
}

impl AppHandler for RotatingCube {
    fn init(engine: &mut Engine, _window: &Window) -> Self {
        let scene = &mut engine.scene;
        scene.background = Some(Vec4::new(0.06, 0.06, 0.09, 1.0));
        scene.environment.set_ambient_color(Vec3::splat(0.25));

        // Cube
        let geometry = engine.assets.geometries.add(create_box(1.0, 1.0, 1.0));
        let mut material = Material::new_standard(Vec4::new(0.85, 0.3, 0.25, 1.0));
        if let Some(standard) = material.as_standard_mut() {
            standard.roughness = 0.55;
        }
        let material = engine.assets.materials.add(material);
        let cube = scene.add_mesh(Mesh::new(geometry, material));

        // Key light
        let light_node = scene.add_light(Light::new_directional(Vec3::ONE, 2.5));
        if let Some((transform, _)) = scene.query_light_bundle(light_node) {
            transform.position = Vec3::new(2.0, 4.0, 3.0);
            transform.look_at(Vec3::ZERO, Vec3::Y);
        }

        // Camera
        let camera_node = scene.add_camera(Camera::new_perspective(
            45.0,
            1280.0 / 720.0,
            0.1,
            100.0,
        ));
        if let Some((transform, _)) = scene.query_camera_bundle(camera_node) {
            transform.position = Vec3::new(0.0, 1.2, 3.5);
            transform.look_at(Vec3::ZERO, Vec3::Y);
        }
        scene.active_camera = Some(camera_node);

        Self {
            cube,
            fps_counter: FpsCounter::new(),
        }
    }

    fn update(
        &mut self,
        engine: &mut Engine,
        window: &Window,
        _input: &Input,
        frame: &FrameState,
    ) {
        // Absolute angles from elapsed time keep the spin frame rate
        // independent.
        if let Some(node) = engine.scene.get_node_mut(self.cube) {
            node.transform
                .set_rotation_euler(frame.time * 0.45, frame.time, 0.0);
        }

        if let Some(fps) = self.fps_counter.update(frame.dt) {
            window.set_title(&format!("Rotating Cube | FPS: {fps:.1}"));
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new().with_title("Rotating Cube").run::<RotatingCube>()?;
    Ok(())
}
