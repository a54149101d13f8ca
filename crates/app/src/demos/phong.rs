//! Three copies of a model lit by key, fill and back lights that follow the
//! selected copy. Tab selects, 1/2/3 toggle the lights.

use anyhow::Result;
use corelib::camera::FlyCamera;
use corelib::ecs::{Entity, World};
use corelib::input::{Command, Controls, Key, KeyAction, Scheme};
use corelib::lighting::{Light, Lights, PhongMaterial};
use corelib::transform::Transform;
use corelib::{Vec3, vec3};
use platform::{Demo, Flow};
use renderer::{FrameView, GpuState};

use super::{ModelSource, steer_fly_camera};

const COPIES: [f32; 3] = [-2.5, 0.0, 2.5];

const LIGHT_COLORS: [Vec3; 3] = [
    Vec3::new(1.0, 0.95, 0.8),
    Vec3::new(0.6, 0.7, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
];
const LIGHT_INTENSITIES: [f32; 3] = [1.0, 0.5, 0.3];

/// Key, fill and back light positions around an object at `center`.
pub fn light_positions(center: Vec3, scale: f32) -> [Vec3; 3] {
    [
        center + vec3(2.0, 2.0, 2.0) * scale,
        center + vec3(-2.0, 1.0, 2.0) * scale,
        center + vec3(0.0, 3.0, -2.0) * scale,
    ]
}

pub struct PhongDemo {
    source: ModelSource,
    world: World,
    objects: Vec<Entity>,
    selected: usize,
    controls: Controls,
    camera: FlyCamera,
    lights: Lights,
}

impl PhongDemo {
    pub fn new(source: ModelSource) -> Self {
        let mut lights = Lights::new();
        for (color, intensity) in LIGHT_COLORS.into_iter().zip(LIGHT_INTENSITIES) {
            // Three lights always fit.
            let _ = lights.push(Light::new(Vec3::ZERO, color, intensity));
        }
        Self {
            source,
            world: World::new(),
            objects: Vec::new(),
            selected: 0,
            controls: Controls::new(Scheme::Lighting),
            camera: FlyCamera::new(vec3(0.0, 0.0, 5.0), -90.0, 0.0),
            lights,
        }
    }

    fn place_lights(&mut self) {
        let Some(t) = self
            .objects
            .get(self.selected)
            .and_then(|&e| self.world.transform(e))
        else {
            return;
        };
        let positions = light_positions(t.translation, t.scale.x);
        for (i, p) in positions.into_iter().enumerate() {
            if let Some(light) = self.lights.get_mut(i) {
                light.position = p;
            }
        }
    }
}

impl Demo for PhongDemo {
    fn title(&self) -> &str {
        "Phong lighting"
    }

    fn init(&mut self, gpu: &mut GpuState) -> Result<()> {
        let r = self
            .source
            .upload(gpu)?
            .with_material(PhongMaterial::scalar(0.1, 0.7, 0.5, 32.0));

        for x in COPIES {
            let t = Transform::from_trs(vec3(x, 0.0, 0.0), Vec3::ZERO, Vec3::ONE);
            self.objects.push(self.world.spawn(t, Some(r)));
        }
        gpu.set_clear_color([0.0, 0.0, 0.0]);
        self.place_lights();
        log::info!("Tab selects, 1/2/3 toggle lights, WASD/I/J move, X/Y/Z spin, [ ] scale");
        Ok(())
    }

    fn on_key(&mut self, key: Key, action: KeyAction) -> Flow {
        let (controls, command) = self.controls.handle_key(key, action);
        self.controls = controls;
        match command {
            Some(Command::Quit) => return Flow::Exit,
            Some(Command::ToggleLight(i)) => {
                if let Some(on) = self.lights.toggle(i) {
                    log::info!("Light {} {}", i + 1, if on { "on" } else { "off" });
                }
            }
            Some(Command::SelectNext) if !self.objects.is_empty() => {
                self.selected = (self.selected + 1) % self.objects.len();
            }
            Some(other) => {
                steer_fly_camera(&mut self.camera, other);
            }
            None => {}
        }
        Flow::Continue
    }

    fn update(&mut self, dt: f32) {
        if let Some(&e) = self.objects.get(self.selected) {
            self.world.apply_controls(e, &self.controls, dt);
        }
        self.place_lights();
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

    #[test]
    fn lights_scale_with_object() {
        let p = light_positions(vec3(1.0, 0.0, -1.0), 0.5);
        assert_eq!(p[0], vec3(2.0, 1.0, 0.0));
        assert_eq!(p[1], vec3(0.0, 0.5, 0.0));
        assert_eq!(p[2], vec3(1.0, 1.5, -2.0));
    }

    #[test]
    fn digits_toggle_lights() {
        let mut demo = PhongDemo::new(ModelSource::default());
        assert_eq!(demo.lights.len(), 3);
        demo.on_key(Key::Digit(2), KeyAction::Press);
        let enabled: Vec<bool> = demo.lights.iter().map(|l| l.enabled).collect();
        assert_eq!(enabled, vec![true, false, true]);
        demo.on_key(Key::Digit(2), KeyAction::Press);
        assert!(demo.lights.iter().all(|l| l.enabled));
    }

    #[test]
    fn lights_follow_selection() {
        let mut demo = PhongDemo::new(ModelSource::default());
        for x in COPIES {
            let t = Transform::from_trs(vec3(x, 0.0, 0.0), Vec3::ZERO, Vec3::ONE);
            demo.objects.push(demo.world.spawn(t, None));
        }
        demo.on_key(Key::Tab, KeyAction::Press);
        demo.update(0.0);
        let first = demo.lights.iter().next().unwrap().position;
        assert_eq!(first, vec3(2.0, 2.0, 2.0));
    }
}
