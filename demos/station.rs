//! Train-station platform at night: a scripted camera approach, a
//! blinking platform lamp, and shadow-casting moonlight.

use glam::{Quat, Vec3, Vec4};
use std::f32::consts::FRAC_PI_2;
use winit::window::Window;

use gloam::animation::{Flythrough, LightCycle};
use gloam::app::{App, AppHandler, Input};
use gloam::assets::{GeometryHandle, MaterialHandle};
use gloam::engine::{Engine, FrameState};
use gloam::resources::{Material, Mesh, PlaneOptions, create_box, create_plane};
use gloam::scene::{Camera, Light, NodeHandle, Scene};
use gloam::utils::{FpsCounter, OrbitControls};

struct Station {
    flythrough: Flythrough,
    lamp_cycle: LightCycle,
    controls: OrbitControls,
    lamp: NodeHandle,
    fps_counter: FpsCounter,
}

impl AppHandler for Station {
    fn init(engine: &mut Engine, _window: &Window) -> Self {
        let assets = engine.assets.clone();
        let scene = &mut engine.scene;

        scene.background = Some(Vec4::new(0.02, 0.03, 0.06, 1.0));
        scene.environment.set_ambient_color(Vec3::new(0.08, 0.09, 0.13));

        // Ground
        let ground_geometry = assets.geometries.add(create_plane(PlaneOptions {
            width: 60.0,
            height: 60.0,
            ..Default::default()
        }));
        let ground_material = assets
            .materials
            .add(standard_material(Vec4::new(0.30, 0.32, 0.30, 1.0), 0.95, 0.0));
        let ground = scene.add_mesh(Mesh::new(ground_geometry, ground_material).with_shadows(false, true));
        if let Some(node) = scene.get_node_mut(ground) {
            node.transform.rotation = Quat::from_rotation_x(-FRAC_PI_2);
        }

        // One unit cube, scaled per node, builds the whole station.
        let unit_box = assets.geometries.add(create_box(1.0, 1.0, 1.0));
        let concrete = assets
            .materials
            .add(standard_material(Vec4::new(0.55, 0.55, 0.58, 1.0), 0.9, 0.0));
        let wood = assets
            .materials
            .add(standard_material(Vec4::new(0.45, 0.32, 0.22, 1.0), 0.8, 0.0));
        let metal = assets
            .materials
            .add(standard_material(Vec4::new(0.25, 0.27, 0.30, 1.0), 0.45, 0.8));

        // Platform slab
        spawn_box(
            scene,
            unit_box,
            concrete,
            Vec3::new(0.0, 0.2, -6.0),
            Vec3::new(14.0, 0.4, 5.0),
        );

        // Roof and its pillars
        spawn_box(
            scene,
            unit_box,
            wood,
            Vec3::new(0.0, 3.6, -7.0),
            Vec3::new(14.0, 0.2, 3.2),
        );
        for x in [-6.0, -2.0, 2.0, 6.0] {
            spawn_box(
                scene,
                unit_box,
                metal,
                Vec3::new(x, 1.95, -7.8),
                Vec3::new(0.22, 3.1, 0.22),
            );
        }

        // Benches along the back wall line
        for x in [-4.5, 0.0, 4.5] {
            spawn_box(
                scene,
                unit_box,
                wood,
                Vec3::new(x, 0.75, -7.4),
                Vec3::new(2.2, 0.12, 0.7),
            );
            spawn_box(
                scene,
                unit_box,
                wood,
                Vec3::new(x, 1.1, -7.72),
                Vec3::new(2.2, 0.55, 0.1),
            );
        }

        // Lamp post at the platform end
        spawn_box(
            scene,
            unit_box,
            metal,
            Vec3::new(6.5, 2.1, -4.4),
            Vec3::new(0.18, 4.2, 0.18),
        );
        spawn_box(
            scene,
            unit_box,
            metal,
            Vec3::new(6.2, 4.25, -4.4),
            Vec3::new(0.8, 0.15, 0.4),
        );

        // The blinking lamp itself
        let lamp = scene.add_light(
            Light::new_spot(Vec3::new(1.0, 0.85, 0.6), 10.0, 18.0, 0.35, 0.65).with_shadows(),
        );
        if let Some((transform, _)) = scene.query_light_bundle(lamp) {
            transform.position = Vec3::new(6.2, 4.1, -4.4);
            // Aimed down at the benches; not straight down, which would make
            // the up vector ambiguous.
            transform.look_at(Vec3::new(3.0, 0.0, -6.0), Vec3::Y);
        }

        // Moonlight
        let moon = scene.add_light(Light::new_directional(Vec3::new(0.35, 0.40, 0.55), 0.5).with_shadows());
        if let Some((transform, _)) = scene.query_light_bundle(moon) {
            transform.position = Vec3::new(10.0, 14.0, 8.0);
            transform.look_at(Vec3::ZERO, Vec3::Y);
        }

        // Camera starts where the flythrough path starts.
        let camera_node = scene.add_camera(Camera::new_perspective(
            60.0,
            1280.0 / 720.0,
            0.1,
            200.0,
        ));
        if let Some((transform, _)) = scene.query_camera_bundle(camera_node) {
            transform.position = Vec3::new(0.0, 0.0, 40.0);
            transform.look_at(Vec3::new(0.0, 1.5, -6.0), Vec3::Y);
        }
        scene.active_camera = Some(camera_node);

        Self {
            flythrough: Flythrough::new(0.7),
            lamp_cycle: LightCycle::new(),
            controls: OrbitControls::new(Vec3::new(0.0, 1.5, -6.0)),
            lamp,
            fps_counter: FpsCounter::new(),
        }
    }

    fn update(
        &mut self,
        engine: &mut Engine,
        window: &Window,
        input: &Input,
        frame: &FrameState,
    ) {
        // Scripted approach first, then the orbit controller. The controller
        // re-derives its orbit from wherever the camera currently is, so the
        // two compose instead of fighting.
        if let Some((transform, camera)) = engine.scene.query_main_camera_bundle() {
            let fov_degrees = camera.fov.to_degrees();
            self.flythrough.update(transform, frame.time);
            self.controls.update(transform, input, fov_degrees, frame.dt);
        }

        if let Some((_, light)) = engine.scene.query_light_bundle(self.lamp) {
            self.lamp_cycle.update(light, frame.time);
        }

        if let Some(fps) = self.fps_counter.update(frame.dt) {
            window.set_title(&format!("Station | FPS: {fps:.1}"));
        }
    }
}

fn standard_material(color: Vec4, roughness: f32, metalness: f32) -> Material {
    let mut material = Material::new_standard(color);
    if let Some(standard) = material.as_standard_mut() {
        standard.roughness = roughness;
        standard.metalness = metalness;
    }
    material
}

fn spawn_box(
    scene: &mut Scene,
    geometry: GeometryHandle,
    material: MaterialHandle,
    position: Vec3,
    scale: Vec3,
) -> NodeHandle {
    let handle = scene.add_mesh(Mesh::new(geometry, material));
    if let Some(node) = scene.get_node_mut(handle) {
        node.transform.position = position;
        node.transform.scale = scale;
    }
    handle
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new().with_title("Station").run::<Station>()?;
    Ok(())
}
