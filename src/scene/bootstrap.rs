use glam::{Quat, Vec3};

use super::{
    light::Lights,
    mesh::MeshData,
    node::{SceneNode, Transform},
    Scene,
};
use crate::{camera::Camera, options::Options};

/// Build the initial scene and camera: ground planes, lights, and a
/// perspective camera aimed at the origin. The model is added later by
/// the render loop once it has loaded.
#[must_use]
pub fn bootstrap(options: &Options, aspect: f32) -> (Scene, Camera) {
    let ground = &options.ground;
    let plane = MeshData::plane(
        ground.size[0],
        ground.size[1],
        ground.color.to_linear(),
    );

    let mut scene = Scene::new(Lights::from_options(&options.lighting));
    let plane = scene.add_mesh(plane);

    let mut wall = SceneNode::new("wall")
        .with_mesh(plane)
        .with_transform(Transform::from_translation(Vec3::from_array(
            ground.wall_position,
        )));
    wall.receive_shadow = true;

    let mut floor = SceneNode::new("floor").with_mesh(plane).with_transform(
        Transform {
            translation: Vec3::from_array(ground.floor_position),
            rotation: Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        },
    );
    floor.receive_shadow = true;

    scene.add(wall);
    scene.add(floor);

    let camera = Camera::from_options(&options.camera, aspect);
    log::debug!(
        "Scene bootstrapped ({} meshes, camera at {:?})",
        scene.meshes().len(),
        camera.eye
    );
    (scene, camera)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_planes_share_one_mesh_and_receive_shadows() {
        let (scene, camera) = bootstrap(&Options::default(), 16.0 / 9.0);
        assert_eq!(scene.meshes().len(), 1);
        assert_eq!(scene.roots().len(), 2);

        let draws = scene.draw_list();
        assert_eq!(draws.len(), 2);
        assert!(draws.iter().all(|d| d.receive_shadow && !d.cast_shadow));
        assert!(draws.iter().all(|d| d.mesh == draws[0].mesh));

        assert_eq!(camera.eye, Vec3::new(0.0, 0.5, 3.0));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn floor_lies_flat_below_the_origin() {
        let (scene, _) = bootstrap(&Options::default(), 1.0);
        // Draws follow root order: wall, then floor
        let floor = scene.draw_list()[1].world;
        // Plane normal (+Z) rotated to point up
        let up = floor.transform_vector3(Vec3::Z);
        assert!((up - Vec3::Y).length() < 1e-6);
        let centre = floor.transform_point3(Vec3::ZERO);
        assert!((centre - Vec3::new(0.0, -0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn lights_come_from_options() {
        let (scene, _) = bootstrap(&Options::default(), 1.0);
        assert_eq!(scene.lights().ambient.len(), 2);
        let key = scene.lights().directional.unwrap();
        assert!(key.cast_shadow);
        assert_eq!(key.shadow.map_size, 2048);
    }
}
