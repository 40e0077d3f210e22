//! The haunted house: fog, moonlight, a scattered graveyard, circling
//! ghost lights, and shader-animated rain.

use glam::{Quat, Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use winit::window::Window;

use gloam::animation::{Flythrough, ScatterField};
use gloam::app::{App, AppHandler, Input};
use gloam::assets::{GeometryHandle, MaterialHandle};
use gloam::engine::{Engine, FrameState};
use gloam::resources::{
    ConeOptions, Material, Mesh, PlaneOptions, SphereOptions, Texture, create_box, create_cone,
    create_plane, create_points, create_sphere,
};
use gloam::scene::{Camera, Fog, Light, NodeHandle, Scene};
use gloam::utils::{FpsCounter, OrbitControls};

const FOG_COLOR: Vec3 = Vec3::new(0.15, 0.16, 0.22);

struct HauntedHouse {
    flythrough: Flythrough,
    controls: OrbitControls,
    ghost1: NodeHandle,
    ghost2: NodeHandle,
    fps_counter: FpsCounter,
}

impl AppHandler for HauntedHouse {
    fn init(engine: &mut Engine, _window: &Window) -> Self {
        let assets = engine.assets.clone();
        let scene = &mut engine.scene;

        scene.background = Some(FOG_COLOR.extend(1.0));
        scene.environment.set_ambient_color(Vec3::new(0.10, 0.11, 0.18));
        scene.environment.set_fog(Some(Fog::new(FOG_COLOR, 1.0, 18.0)));

        // Ground
        let ground_geometry = assets.geometries.add(create_plane(PlaneOptions {
            width: 40.0,
            height: 40.0,
            ..Default::default()
        }));
        let ground_material = assets
            .materials
            .add(standard_material(Vec4::new(0.18, 0.28, 0.16, 1.0), 1.0, 0.0));
        let ground = scene.add_mesh(Mesh::new(ground_geometry, ground_material).with_shadows(false, true));
        if let Some(node) = scene.get_node_mut(ground) {
            node.transform.rotation = Quat::from_rotation_x(-FRAC_PI_2);
        }

        // House: walls, pyramid roof, and a paneled door under one root node.
        let house = scene.build_node().build();

        let walls_geometry = assets.geometries.add(create_box(4.0, 2.5, 4.0));
        let walls_material = assets
            .materials
            .add(standard_material(Vec4::new(0.70, 0.55, 0.45, 1.0), 0.9, 0.0));
        let walls = scene.add_mesh_to_parent(Mesh::new(walls_geometry, walls_material), house);
        if let Some(node) = scene.get_node_mut(walls) {
            node.transform.position = Vec3::new(0.0, 1.25, 0.0);
        }

        let roof_geometry = assets.geometries.add(create_cone(ConeOptions {
            radius: 3.2,
            height: 1.5,
            radial_segments: 4,
        }));
        let roof_material = assets
            .materials
            .add(standard_material(Vec4::new(0.45, 0.22, 0.20, 1.0), 0.85, 0.0));
        let roof = scene.add_mesh_to_parent(Mesh::new(roof_geometry, roof_material), house);
        if let Some(node) = scene.get_node_mut(roof) {
            node.transform.position = Vec3::new(0.0, 3.25, 0.0);
            // Align the pyramid edges with the wall corners.
            node.transform.rotation = Quat::from_rotation_y(FRAC_PI_4);
        }

        let door_texture = assets.textures.add({
            let mut texture = Texture::create_checkerboard("door", 64, 64, 8);
            texture.transform.repeat = Vec2::new(2.0, 2.0);
            texture
        });
        let mut door_material = Material::new_basic(Vec4::new(0.55, 0.38, 0.22, 1.0));
        if let Some(basic) = door_material.as_basic_mut() {
            basic.map = Some(door_texture);
        }
        let door_material = assets.materials.add(door_material);
        let door_geometry = assets.geometries.add(create_plane(PlaneOptions {
            width: 2.2,
            height: 2.2,
            ..Default::default()
        }));
        let door = scene.add_mesh_to_parent(
            Mesh::new(door_geometry, door_material).with_shadows(false, false),
            house,
        );
        if let Some(node) = scene.get_node_mut(door) {
            // Slightly off the wall face to avoid z-fighting.
            node.transform.position = Vec3::new(0.0, 1.1, 2.01);
        }

        // Bushes, fixed placement
        let bush_geometry = assets.geometries.add(create_sphere(SphereOptions {
            radius: 1.0,
            ..Default::default()
        }));
        let bush_material = assets
            .materials
            .add(standard_material(Vec4::new(0.35, 0.50, 0.25, 1.0), 1.0, 0.0));
        for (position, scale) in [
            (Vec3::new(0.8, 0.2, 2.2), 0.5),
            (Vec3::new(1.4, 0.1, 2.1), 0.25),
            (Vec3::new(-0.8, 0.1, 2.2), 0.4),
            (Vec3::new(-1.0, 0.05, 2.6), 0.15),
        ] {
            spawn_mesh(scene, bush_geometry, bush_material, position, Vec3::splat(scale));
        }

        // Graveyard: one geometry, twenty scattered instances.
        let mut rng = StdRng::seed_from_u64(1849);
        let grave_geometry = assets.geometries.add(create_box(0.6, 0.8, 0.2));
        let grave_material = assets
            .materials
            .add(standard_material(Vec4::new(0.45, 0.45, 0.48, 1.0), 0.9, 0.0));
        for placement in ScatterField::new().sample(&mut rng) {
            let grave = scene.add_mesh(Mesh::new(grave_geometry, grave_material));
            if let Some(node) = scene.get_node_mut(grave) {
                // Sunk a little into the ground.
                node.transform.position = placement.position + Vec3::new(0.0, 0.35, 0.0);
                node.transform
                    .set_rotation_euler(0.0, placement.rotation_y, placement.rotation_z);
            }
        }

        // Rain: static point cloud, the fall is shader-side.
        let rain_positions: Vec<Vec3> = (0..600)
            .map(|_| {
                Vec3::new(
                    rng.random_range(-12.0..12.0f32),
                    rng.random_range(0.0..10.0f32),
                    rng.random_range(-12.0..12.0f32),
                )
            })
            .collect();
        let rain_geometry = assets.geometries.add(create_points(&rain_positions));
        let mut rain_material = Material::new_points(Vec4::new(0.70, 0.75, 0.85, 0.6), 0.05);
        if let Some(points) = rain_material.as_points_mut() {
            points.fall_speed = 5.0;
            points.area_height = 10.0;
        }
        let rain_material = assets.materials.add(rain_material);
        scene.add_mesh(Mesh::new(rain_geometry, rain_material).with_shadows(false, false));

        // Moonlight
        let moon = scene.add_light(
            Light::new_directional(Vec3::new(0.30, 0.35, 0.55), 0.6).with_shadows(),
        );
        if let Some((transform, _)) = scene.query_light_bundle(moon) {
            transform.position = Vec3::new(8.0, 12.0, 6.0);
            transform.look_at(Vec3::ZERO, Vec3::Y);
        }

        // Warm light over the door
        let door_light = scene.add_light(Light::new_point(Vec3::new(1.0, 0.65, 0.3), 3.0, 8.0));
        if let Some((transform, _)) = scene.query_light_bundle(door_light) {
            transform.position = Vec3::new(0.0, 2.4, 2.9);
        }

        // Ghosts, driven from update
        let ghost1 = scene.add_light(Light::new_point(Vec3::new(0.2, 1.0, 1.0), 6.0, 10.0));
        let ghost2 = scene.add_light(Light::new_point(Vec3::new(1.0, 0.3, 0.8), 6.0, 10.0));

        // Camera starts where the flythrough path starts.
        let camera_node = scene.add_camera(Camera::new_perspective(
            60.0,
            1280.0 / 720.0,
            0.1,
            200.0,
        ));
        if let Some((transform, _)) = scene.query_camera_bundle(camera_node) {
            transform.position = Vec3::new(0.0, 0.0, 40.0);
            transform.look_at(Vec3::new(0.0, 1.5, 0.0), Vec3::Y);
        }
        scene.active_camera = Some(camera_node);

        Self {
            flythrough: Flythrough::new(1.3),
            controls: OrbitControls::new(Vec3::new(0.0, 1.5, 0.0)),
            ghost1,
            ghost2,
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
        let t = frame.time;

        // Scripted approach first, then the orbit controller, which picks up
        // from wherever the camera currently is.
        if let Some((transform, camera)) = engine.scene.query_main_camera_bundle() {
            let fov_degrees = camera.fov.to_degrees();
            self.flythrough.update(transform, t);
            self.controls.update(transform, input, fov_degrees, frame.dt);
        }

        // Ghosts circle the graveyard at different speeds and heights.
        let angle1 = t * 0.5;
        if let Some((transform, _)) = engine.scene.query_light_bundle(self.ghost1) {
            transform.position = Vec3::new(
                angle1.cos() * 5.0,
                0.7 + (t * 2.2).sin() * 0.4,
                angle1.sin() * 4.0 - 5.5,
            );
        }
        let angle2 = -t * 0.32;
        if let Some((transform, _)) = engine.scene.query_light_bundle(self.ghost2) {
            transform.position = Vec3::new(
                angle2.cos() * 7.0,
                0.9 + (t * 1.7).cos() * 0.5,
                angle2.sin() * 5.0 - 4.5,
            );
        }

        if let Some(fps) = self.fps_counter.update(frame.dt) {
            window.set_title(&format!("Haunted House | FPS: {fps:.1}"));
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

fn spawn_mesh(
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
    App::new().with_title("Haunted House").run::<HauntedHouse>()?;
    Ok(())
}
