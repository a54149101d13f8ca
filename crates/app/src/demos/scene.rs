//! Objects, camera and light from a `key=value` scene file. Digits select an
//! object for editing; orbit animations pause while their object is selected.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use asset::scene_config::{AnimationKind, ObjectConfig, SceneConfig, load_scene_config};
use asset::{MissingNormals, Model, ObjOptions};
use corelib::animation::Orbit;
use corelib::camera::{FlyCamera, Lens};
use corelib::ecs::{Animation, Entity, OrbitCenter, Renderable, World};
use corelib::input::{Command, Controls, Key, KeyAction, Scheme};
use corelib::lighting::{Light, Lights};
use corelib::transform::Transform;
use corelib::{Vec3, vec3};
use platform::{Demo, Flow};
use renderer::{FrameView, GpuState};

use super::{load_model_or_cube, steer_fly_camera, upload_model, upload_texture};

/// Scene meshes are mostly planets exported without `vn`; radial normals
/// light them as spheres.
const SCENE_OBJ_OPTIONS: ObjOptions = ObjOptions {
    flip_v: false,
    missing_normals: MissingNormals::Radial,
};

/// Orbit centre for objects whose target is missing or unnamed.
const DEFAULT_ORBIT_CENTER: Vec3 = vec3(0.0, 0.0, -5.0);

/// Spawn every configured object and wire up orbit animations. `renderable`
/// builds the draw data for one object.
pub fn populate_world<F>(world: &mut World, config: &SceneConfig, mut renderable: F) -> Result<Vec<Entity>>
where
    F: FnMut(&ObjectConfig) -> Result<Option<Renderable>>,
{
    let mut entities = Vec::with_capacity(config.objects.len());
    for obj in &config.objects {
        let t = Transform::from_trs_degrees(
            Vec3::from_array(obj.position),
            Vec3::from_array(obj.rotation),
            Vec3::from_array(obj.scale),
        );
        let r = renderable(obj)?;
        entities.push(world.spawn_named(&obj.name, t, r));
    }

    // Targets may be declared after the objects that orbit them.
    for (obj, &e) in config.objects.iter().zip(&entities) {
        if obj.animation != AnimationKind::Orbit {
            continue;
        }
        let center = match obj.orbit.target.as_deref() {
            Some(name) => match world.find(name) {
                Some(target) => OrbitCenter::Entity(target),
                None => {
                    log::warn!("'{}' orbits unknown object '{}'", obj.name, name);
                    OrbitCenter::Point(DEFAULT_ORBIT_CENTER)
                }
            },
            None => OrbitCenter::Point(DEFAULT_ORBIT_CENTER),
        };
        let orbit = Orbit::new(obj.orbit.radius, obj.orbit.speed);
        world.set_animation(e, Animation::Orbit { orbit, center });
    }
    Ok(entities)
}

pub fn camera_from_config(config: &SceneConfig) -> FlyCamera {
    let c = &config.camera;
    let mut camera = FlyCamera::new(Vec3::from_array(c.position), c.yaw, c.pitch);
    camera.lens = Lens {
        fov_y_deg: c.fov,
        z_near: c.near,
        z_far: c.far,
    };
    camera
}

pub struct SceneDemo {
    path: PathBuf,
    background: Option<PathBuf>,
    world: World,
    objects: Vec<Entity>,
    selected: Option<usize>,
    controls: Controls,
    camera: FlyCamera,
    lights: Lights,
}

impl SceneDemo {
    pub fn new(path: PathBuf, background: Option<PathBuf>) -> Self {
        Self {
            path,
            background,
            world: World::new(),
            objects: Vec::new(),
            selected: None,
            controls: Controls::new(Scheme::ObjectEditing),
            camera: FlyCamera::default(),
            lights: Lights::new(),
        }
    }

    fn apply_config(&mut self, config: &SceneConfig) {
        self.camera = camera_from_config(config);
        self.lights = Lights::single(Light::new(
            Vec3::from_array(config.light.position),
            Vec3::from_array(config.light.color),
            1.0,
        ));
    }

    fn selected_entity(&self) -> Option<Entity> {
        self.selected.and_then(|i| self.objects.get(i).copied())
    }
}

fn load_object_model(obj: &ObjectConfig) -> Result<Model> {
    load_model_or_cube(obj.obj_file.as_deref(), obj.mtl_file.as_deref(), &SCENE_OBJ_OPTIONS)
        .with_context(|| format!("object '{}'", obj.name))
}

fn object_renderable(gpu: &mut GpuState, obj: &ObjectConfig) -> Result<Option<Renderable>> {
    let model = load_object_model(obj)?;

    let body: Option<&Path> = obj.texture_body.as_deref().or(obj.texture.as_deref());
    let gpu_model = upload_model(gpu, &model, body)?;
    let overlay = match obj.texture_eye.as_deref() {
        Some(path) => Some(upload_texture(gpu, path)?),
        None => None,
    };

    Ok(Some(gpu_model.renderable(overlay)))
}

impl Demo for SceneDemo {
    fn title(&self) -> &str {
        "Scene"
    }

    fn init(&mut self, gpu: &mut GpuState) -> Result<()> {
        let config = load_scene_config(&self.path)
            .with_context(|| format!("reading scene {}", self.path.display()))?;
        self.apply_config(&config);
        self.objects = populate_world(&mut self.world, &config, |obj| object_renderable(gpu, obj))?;

        gpu.set_clear_color([0.1, 0.1, 0.1]);
        if let Some(path) = &self.background {
            let bg = upload_texture(gpu, path)?;
            gpu.set_background(Some(bg));
        }

        for (i, obj) in config.objects.iter().enumerate() {
            log::info!("{}: {}", i + 1, obj.name);
        }
        log::info!("Digits select, WASD/I/K move, X/Y/Z spin, R stops, +/- scale, arrows + Q/E camera");
        Ok(())
    }

    fn on_key(&mut self, key: Key, action: KeyAction) -> Flow {
        let (controls, command) = self.controls.handle_key(key, action);
        self.controls = controls;
        match command {
            Some(Command::Quit) => return Flow::Exit,
            Some(Command::Select(i)) if i < self.objects.len() => {
                self.selected = Some(i);
                if let Some(name) = self.world.name(self.objects[i]) {
                    log::info!("Selected {}", name);
                }
            }
            Some(other) => {
                steer_fly_camera(&mut self.camera, other);
            }
            None => {}
        }
        Flow::Continue
    }

    fn update(&mut self, dt: f32) {
        let selected = self.selected_entity();
        if let Some(e) = selected {
            self.world.apply_controls(e, &self.controls, dt);
        }
        self.world.system_animate(dt, selected);
    }

    fn frame(&self) -> FrameView<'_> {
        FrameView {
            camera: self.camera.camera(1.0),
            lights: &self.lights,
            world: &self.world,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset::scene_config::parse_scene_config;

    const SCENE: &str = "\
object.flamingo.animation = orbit
object.flamingo.orbit.target = mars
object.flamingo.orbit.radius = 2
object.flamingo.position = 0 1 0
object.mars.position = 3 0 -5
object.mars.rotation = 0 90 0
object.moon.animation = orbit
object.moon.orbit.target = pluto
camera.position = 0 0 5
camera.fov = 60
light.position = 1 2 3
";

    fn demo_with_scene() -> SceneDemo {
        let config = parse_scene_config(SCENE, "").unwrap();
        let mut demo = SceneDemo::new(PathBuf::from("unused"), None);
        demo.apply_config(&config);
        demo.objects = populate_world(&mut demo.world, &config, |_| Ok(None)).unwrap();
        demo
    }

    #[test]
    fn objects_spawn_in_declaration_order() {
        let demo = demo_with_scene();
        assert_eq!(demo.objects.len(), 3);
        assert_eq!(demo.world.name(demo.objects[0]), Some("flamingo"));
        let mars = demo.world.transform(demo.objects[1]).unwrap();
        assert_eq!(mars.translation, vec3(3.0, 0.0, -5.0));
        assert!((mars.rotation_euler.y - 90f32.to_radians()).abs() < 1e-6);
        assert_eq!(demo.camera.lens.fov_y_deg, 60.0);
        assert_eq!(demo.lights.len(), 1);
    }

    #[test]
    fn orbit_targets_resolve_by_name() {
        let mut demo = demo_with_scene();
        demo.update(0.0);
        // Angle 0: radius along +X from the target, own height kept.
        let flamingo = demo.world.transform(demo.objects[0]).unwrap().translation;
        assert!((flamingo - vec3(5.0, 1.0, -5.0)).length() < 1e-5);
        // Unknown target falls back to the default centre.
        let moon = demo.world.transform(demo.objects[2]).unwrap().translation;
        let radius = asset::scene_config::DEFAULT_ORBIT_RADIUS;
        assert!((moon - (DEFAULT_ORBIT_CENTER + vec3(radius, 0.0, 0.0))).length() < 1e-5);
    }

    #[test]
    fn selected_object_stops_orbiting() {
        let mut demo = demo_with_scene();
        demo.on_key(Key::Digit(1), KeyAction::Press);
        assert_eq!(demo.selected, Some(0));
        demo.update(1.0);
        let flamingo = demo.world.transform(demo.objects[0]).unwrap().translation;
        assert_eq!(flamingo, vec3(0.0, 1.0, 0.0));

        // Out-of-range digits keep the selection.
        demo.on_key(Key::Digit(7), KeyAction::Press);
        assert_eq!(demo.selected, Some(0));
    }

    #[test]
    fn objects_without_normals_get_radial_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("planet.obj"),
            "v 2 0 0\nv 0 3 0\nv 0 0 4\nf 1 2 3\n",
        )
        .unwrap();
        let config = parse_scene_config("object.planet.file = planet.obj\n", dir.path()).unwrap();

        let model = load_object_model(&config.objects[0]).unwrap();
        let normals: Vec<[f32; 3]> = model.mesh.vertices.iter().map(|v| v.normal).collect();
        assert_eq!(normals, vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn renderable_errors_abort_population() {
        let config = parse_scene_config(SCENE, "").unwrap();
        let mut world = World::new();
        let result = populate_world(&mut world, &config, |_| anyhow::bail!("no gpu"));
        assert!(result.is_err());
    }
}
