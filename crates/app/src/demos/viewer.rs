//! Single textured model under one light; held keys move, spin and scale it.

use anyhow::Result;
use corelib::camera::FlyCamera;
use corelib::ecs::{Entity, World};
use corelib::input::{Command, Controls, Key, KeyAction, Scheme};
use corelib::lighting::{Light, Lights};
use corelib::transform::Transform;
use corelib::{Vec3, vec3};
use platform::{Demo, Flow};
use renderer::{FrameView, GpuState};

use super::{ModelSource, steer_fly_camera};

pub struct ViewerDemo {
    source: ModelSource,
    world: World,
    entity: Option<Entity>,
    controls: Controls,
    camera: FlyCamera,
    lights: Lights,
}

impl ViewerDemo {
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            world: World::new(),
            entity: None,
            controls: Controls::new(Scheme::ObjectEditing),
            camera: FlyCamera::default(),
            lights: Lights::single(Light::new(vec3(3.0, 3.0, 3.0), Vec3::ONE, 1.0)),
        }
    }
}

impl Demo for ViewerDemo {
    fn title(&self) -> &str {
        "Model viewer"
    }

    fn init(&mut self, gpu: &mut GpuState) -> Result<()> {
        let r = self.source.upload(gpu)?;
        self.entity = Some(self.world.spawn(Transform::identity(), Some(r)));
        Ok(())
    }

    fn on_key(&mut self, key: Key, action: KeyAction) -> Flow {
        let (controls, command) = self.controls.handle_key(key, action);
        self.controls = controls;
        match command {
            Some(Command::Quit) => return Flow::Exit,
            Some(other) => {
                steer_fly_camera(&mut self.camera, other);
            }
            None => {}
        }
        Flow::Continue
    }

    fn update(&mut self, dt: f32) {
        if let Some(e) = self.entity {
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
