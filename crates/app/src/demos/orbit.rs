//! Orbit camera around a model: arrows orbit, W/S zoom, Q/E roll.

use std::path::PathBuf;

use anyhow::Result;
use corelib::camera::OrbitCamera;
use corelib::ecs::World;
use corelib::input::{Command, Controls, Key, KeyAction, Scheme};
use corelib::lighting::{Light, Lights};
use corelib::transform::Transform;
use corelib::{Vec3, vec3};
use platform::{Demo, Flow};
use renderer::{FrameView, GpuState};

use super::{ModelSource, steer_orbit_camera, upload_texture};

pub struct OrbitDemo {
    source: ModelSource,
    background: Option<PathBuf>,
    world: World,
    controls: Controls,
    camera: OrbitCamera,
    lights: Lights,
}

impl OrbitDemo {
    pub fn new(source: ModelSource, background: Option<PathBuf>) -> Self {
        Self {
            source,
            background,
            world: World::new(),
            controls: Controls::new(Scheme::Orbit),
            camera: OrbitCamera::new(Vec3::ZERO, 3.0, 90.0, 0.0),
            lights: Lights::single(Light::new(vec3(3.0, 3.0, 3.0), Vec3::ONE, 1.0)),
        }
    }
}

impl Demo for OrbitDemo {
    fn title(&self) -> &str {
        "Orbit camera"
    }

    fn init(&mut self, gpu: &mut GpuState) -> Result<()> {
        let r = self.source.upload(gpu)?;
        self.world.spawn(Transform::identity(), Some(r));

        if let Some(path) = &self.background {
            let bg = upload_texture(gpu, path)?;
            gpu.set_background(Some(bg));
        }
        log::info!("Arrows orbit, W/S zoom, Q/E roll");
        Ok(())
    }

    fn on_key(&mut self, key: Key, action: KeyAction) -> Flow {
        let (controls, command) = self.controls.handle_key(key, action);
        self.controls = controls;
        match command {
            Some(Command::Quit) => return Flow::Exit,
            Some(other) => {
                steer_orbit_camera(&mut self.camera, other);
            }
            None => {}
        }
        Flow::Continue
    }

    fn update(&mut self, _dt: f32) {}

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

    #[test]
    fn keys_drive_the_orbit_camera() {
        let mut demo = OrbitDemo::new(ModelSource::default(), None);
        let start = demo.camera;

        demo.on_key(Key::W, KeyAction::Press);
        assert!((demo.camera.radius - (start.radius - 0.2)).abs() < 1e-6);
        demo.on_key(Key::E, KeyAction::Repeat);
        assert_eq!(demo.camera.roll, 2.0);
        demo.on_key(Key::Right, KeyAction::Press);
        assert_eq!(demo.camera.yaw, start.yaw + 2.0);

        for _ in 0..50 {
            demo.on_key(Key::W, KeyAction::Repeat);
        }
        assert_eq!(demo.camera.radius, OrbitCamera::MIN_RADIUS);
    }
}
