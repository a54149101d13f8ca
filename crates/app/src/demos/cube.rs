//! Vertex-coloured cubes: Tab or digits select, N spawns, held keys edit.

use anyhow::Result;
use corelib::camera::FlyCamera;
use corelib::ecs::{Entity, MeshHandle, Renderable, Shading, World};
use corelib::input::{Command, Controls, Key, KeyAction, Scheme};
use corelib::lighting::Lights;
use corelib::transform::Transform;
use corelib::{Vec3, vec3};
use platform::{Demo, Flow};
use renderer::{FrameView, GpuState};

use super::{cube_mesh, steer_fly_camera, upload_colored};

/// Spawned cubes fill a row left to right, then move one row down.
const SPAWN_COLUMNS: usize = 5;
const SPAWN_SPACING: f32 = 1.5;

pub struct CubeDemo {
    world: World,
    cubes: Vec<Entity>,
    selected: usize,
    controls: Controls,
    camera: FlyCamera,
    lights: Lights,
    mesh: Option<MeshHandle>,
}

impl CubeDemo {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            cubes: Vec::new(),
            selected: 0,
            controls: Controls::new(Scheme::ObjectEditing),
            camera: FlyCamera::new(vec3(0.0, 0.0, 6.0), -90.0, 0.0),
            lights: Lights::new(),
            mesh: None,
        }
    }

    fn spawn_position(index: usize) -> Vec3 {
        let col = (index % SPAWN_COLUMNS) as f32 - (SPAWN_COLUMNS / 2) as f32;
        let row = (index / SPAWN_COLUMNS) as f32;
        vec3(col * SPAWN_SPACING, -row * SPAWN_SPACING, 0.0)
    }

    fn spawn_cube(&mut self) {
        let Some(mesh) = self.mesh else {
            return;
        };
        let index = self.cubes.len();
        let t = Transform::from_trs(Self::spawn_position(index), Vec3::ZERO, Vec3::ONE);
        let r = Renderable::new(mesh).with_shading(Shading::Unlit);
        self.cubes.push(self.world.spawn(t, Some(r)));
        self.selected = index;
        log::info!("Spawned cube {} (now {} cubes)", index + 1, self.cubes.len());
    }
}

impl Default for CubeDemo {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo for CubeDemo {
    fn title(&self) -> &str {
        "Cubes"
    }

    fn init(&mut self, gpu: &mut GpuState) -> Result<()> {
        self.mesh = Some(upload_colored(gpu, &cube_mesh()));
        self.spawn_cube();
        log::info!("Tab/1-9 select, N spawns, WASD/I/K move, X/Y/Z spin, R stops, +/- scale");
        Ok(())
    }

    fn on_key(&mut self, key: Key, action: KeyAction) -> Flow {
        let (controls, command) = self.controls.handle_key(key, action);
        self.controls = controls;
        match command {
            Some(Command::Quit) => return Flow::Exit,
            Some(Command::SelectNext) if !self.cubes.is_empty() => {
                self.selected = (self.selected + 1) % self.cubes.len();
            }
            Some(Command::Select(i)) if i < self.cubes.len() => self.selected = i,
            Some(Command::Spawn) => self.spawn_cube(),
            Some(other) => {
                steer_fly_camera(&mut self.camera, other);
            }
            None => {}
        }
        Flow::Continue
    }

    fn update(&mut self, dt: f32) {
        if let Some(&e) = self.cubes.get(self.selected) {
            self.world.apply_controls(e, &self.controls, dt);
        }
    }

    fn frame(&self) -> FrameView<'_> {
        FrameView {
            camera: self.camera.camera(1.0),
            lights: &self.lights,
            world: &self.world,
        }
    }
}
