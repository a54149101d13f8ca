//! Three flamingos fly closed waypoint paths. 1/2/3 pick a path, F saves it
//! and L reloads it from disk; WASD/Q/E and the arrows fly the camera.

use std::path::{Path, PathBuf};

use anyhow::Result;
use asset::trajectory::{load_points, save_points};
use corelib::animation::{Bounds, TrajectoryFollower};
use corelib::camera::FlyCamera;
use corelib::ecs::{Animation, Entity, Renderable, World};
use corelib::input::{Command, Controls, Key, KeyAction, Scheme};
use corelib::lighting::{Light, Lights};
use corelib::transform::Transform;
use corelib::{Vec3, vec3};
use platform::{Demo, Flow};
use renderer::{FrameView, GpuState};

use super::{ModelSource, steer_fly_camera};

const SPEED: f32 = 1.5;
const SCALE: f32 = 0.2;

const PATHS: [&[Vec3]; 3] = [
    &[
        vec3(0.0, 0.0, -5.0),
        vec3(4.0, 0.0, -5.0),
        vec3(4.0, 4.0, -5.0),
        vec3(0.0, 4.0, -5.0),
        vec3(-4.0, 4.0, -5.0),
        vec3(-4.0, 0.0, -5.0),
        vec3(0.0, 0.0, -5.0),
    ],
    &[
        vec3(4.0, 0.0, -5.0),
        vec3(4.0, 4.0, -5.0),
        vec3(0.0, 4.0, -5.0),
        vec3(-4.0, 4.0, -5.0),
        vec3(-4.0, 0.0, -5.0),
        vec3(0.0, 0.0, -5.0),
        vec3(4.0, 0.0, -5.0),
    ],
    &[
        vec3(-4.0, 0.0, -5.0),
        vec3(-4.0, -4.0, -5.0),
        vec3(0.0, -4.0, -5.0),
        vec3(4.0, -4.0, -5.0),
        vec3(4.0, 0.0, -5.0),
        vec3(-4.0, 0.0, -5.0),
    ],
];

/// File a path is saved to and loaded from; `index` is zero-based.
pub fn trajectory_file(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("trajetoriaFlamingo{}.txt", index + 1))
}

pub struct TrajectoryDemo {
    source: ModelSource,
    dir: PathBuf,
    world: World,
    flamingos: Vec<Entity>,
    selected: usize,
    controls: Controls,
    camera: FlyCamera,
    lights: Lights,
}

impl TrajectoryDemo {
    pub fn new(source: ModelSource, dir: PathBuf) -> Self {
        Self {
            source,
            dir,
            world: World::new(),
            flamingos: Vec::new(),
            selected: 0,
            controls: Controls::new(Scheme::FlyCamera),
            camera: FlyCamera::default(),
            lights: Lights::single(Light::new(vec3(0.0, 5.0, 0.0), Vec3::ONE, 1.0)),
        }
    }

    fn spawn_flamingos(&mut self, renderable: Option<Renderable>) {
        for path in PATHS {
            let start = path[0];
            let follower = TrajectoryFollower::new(start, path.to_vec(), SPEED)
                .with_bounds(Bounds::SCREEN);
            let t = Transform::from_trs(follower.position, Vec3::ZERO, Vec3::splat(SCALE));
            let e = self.world.spawn(t, renderable);
            self.world.set_animation(e, Animation::Trajectory(follower));
            self.flamingos.push(e);
        }
    }

    fn follower_mut(&mut self, index: usize) -> Option<&mut TrajectoryFollower> {
        let e = *self.flamingos.get(index)?;
        match self.world.animation_mut(e)? {
            Animation::Trajectory(f) => Some(f),
            Animation::Orbit { .. } => None,
        }
    }

    fn save_selected(&mut self) -> Result<()> {
        let path = trajectory_file(&self.dir, self.selected);
        let Some(follower) = self.follower_mut(self.selected) else {
            return Ok(());
        };
        let points: Vec<[f32; 3]> = follower.points().iter().map(|p| p.to_array()).collect();
        save_points(&path, &points)?;
        Ok(())
    }

    fn load_selected(&mut self) -> Result<()> {
        let path = trajectory_file(&self.dir, self.selected);
        let points = load_points(&path)?;
        if let Some(follower) = self.follower_mut(self.selected) {
            follower.set_points(points.into_iter().map(Vec3::from_array).collect());
        }
        Ok(())
    }
}

impl Demo for TrajectoryDemo {
    fn title(&self) -> &str {
        "Trajectories"
    }

    fn init(&mut self, gpu: &mut GpuState) -> Result<()> {
        let r = self.source.upload(gpu)?;
        self.spawn_flamingos(Some(r));
        log::info!(
            "1/2/3 select a path, F saves and L loads it in {}",
            self.dir.display()
        );
        Ok(())
    }

    fn on_key(&mut self, key: Key, action: KeyAction) -> Flow {
        let (controls, command) = self.controls.handle_key(key, action);
        self.controls = controls;
        match command {
            Some(Command::Quit) => return Flow::Exit,
            Some(Command::Select(i)) if i < self.flamingos.len() => {
                self.selected = i;
                log::info!("Path {} selected", i + 1);
            }
            Some(Command::SaveTrajectory) => {
                if let Err(e) = self.save_selected() {
                    log::error!("Saving path {} failed: {e:#}", self.selected + 1);
                }
            }
            Some(Command::LoadTrajectory) => {
                if let Err(e) = self.load_selected() {
                    log::error!("Loading path {} failed: {e:#}", self.selected + 1);
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
        self.world.system_animate(dt, None);
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

    fn demo_in(dir: &Path) -> TrajectoryDemo {
        let mut demo = TrajectoryDemo::new(ModelSource::default(), dir.to_path_buf());
        demo.spawn_flamingos(None);
        demo
    }

    #[test]
    fn flamingos_start_on_their_paths() {
        let demo = demo_in(Path::new("."));
        let starts: Vec<Vec3> = demo
            .flamingos
            .iter()
            .map(|&e| demo.world.transform(e).unwrap().translation)
            .collect();
        assert_eq!(
            starts,
            vec![vec3(0.0, 0.0, -5.0), vec3(4.0, 0.0, -5.0), vec3(-4.0, 0.0, -5.0)]
        );
        let scale = demo.world.transform(demo.flamingos[0]).unwrap().scale;
        assert_eq!(scale, Vec3::splat(SCALE));
    }

    #[test]
    fn flamingos_move_along_paths() {
        let mut demo = demo_in(Path::new("."));
        // First step only advances past the start waypoint.
        demo.update(0.0);
        demo.update(1.0);
        let p = demo.world.transform(demo.flamingos[0]).unwrap().translation;
        assert!((p - vec3(1.5, 0.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn save_then_load_restores_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut demo = demo_in(dir.path());

        demo.on_key(Key::Digit(2), KeyAction::Press);
        demo.on_key(Key::F, KeyAction::Press);
        let file = trajectory_file(dir.path(), 1);
        assert!(file.exists());

        std::fs::write(&file, "1 1 -5\n20 0 -5\n").unwrap();
        demo.on_key(Key::L, KeyAction::Press);
        let follower = demo.follower_mut(1).unwrap();
        // Loaded points are clamped into the screen bounds.
        assert_eq!(follower.points(), &[vec3(1.0, 1.0, -5.0), vec3(8.0, 0.0, -5.0)]);
        assert_eq!(follower.target_index(), 0);
    }

    #[test]
    fn missing_file_keeps_current_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut demo = demo_in(dir.path());
        demo.on_key(Key::L, KeyAction::Press);
        assert_eq!(demo.follower_mut(0).unwrap().points(), PATHS[0]);
    }

    #[test]
    fn file_names_count_from_one() {
        let p = trajectory_file(Path::new("out"), 2);
        assert_eq!(p, Path::new("out").join("trajetoriaFlamingo3.txt"));
    }
}
