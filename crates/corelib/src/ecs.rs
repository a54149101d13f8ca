//! Tiny ECS: World, Entity, components: Transform + Renderable + Animation.

use crate::animation::{Orbit, TrajectoryFollower};
use crate::input::{Axis, Controls};
use crate::lighting::PhongMaterial;
use crate::transform::Transform;
use crate::Vec3;

/// Entity id (dense, index into component arrays).
pub type Entity = u32;

/// Index into the renderer's mesh table.
pub type MeshHandle = usize;
/// Index into the renderer's texture table.
pub type TextureHandle = usize;

/// Held-key object motion, in units per second.
pub const MOVE_SPEED: f32 = 1.5;
/// Degrees per second around the active axis.
pub const ROTATE_SPEED_DEG: f32 = 25.0;
/// Scale changes by a factor of `1 ± SCALE_SPEED * dt` per frame.
pub const SCALE_SPEED: f32 = 1.0;
/// Fragments of an overlay pass below this alpha are discarded.
pub const OVERLAY_ALPHA_CUTOFF: f32 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shading {
    #[default]
    Phong,
    /// Per-vertex colour only; no lighting or texture.
    Unlit,
}

/// What to draw for an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Renderable {
    pub mesh: MeshHandle,
    /// `None` samples plain white.
    pub texture: Option<TextureHandle>,
    /// Second pass of the same mesh with this texture, alpha-cut at
    /// [`OVERLAY_ALPHA_CUTOFF`] (e.g. eyes painted over a body texture).
    pub overlay: Option<TextureHandle>,
    pub material: PhongMaterial,
    pub shading: Shading,
}

impl Renderable {
    pub fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh,
            texture: None,
            overlay: None,
            material: PhongMaterial::default(),
            shading: Shading::Phong,
        }
    }

    pub fn with_texture(mut self, texture: Option<TextureHandle>) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_overlay(mut self, overlay: Option<TextureHandle>) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_material(mut self, material: PhongMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }
}

/// Centre an orbiting entity circles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbitCenter {
    Point(Vec3),
    /// Follows another entity's translation.
    Entity(Entity),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Animation {
    Orbit { orbit: Orbit, center: OrbitCenter },
    Trajectory(TrajectoryFollower),
}

/// Very small ECS world with dense parallel arrays.
/// No allocations per-frame; spawn may allocate to grow capacity.
#[derive(Default)]
pub struct World {
    transforms: Vec<Transform>,
    renderables: Vec<Option<Renderable>>,
    names: Vec<Option<String>>,
    animations: Vec<Option<Animation>>,
    alive: Vec<bool>,
    len: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn entity with Transform and optional Renderable.
    pub fn spawn(&mut self, t: Transform, r: Option<Renderable>) -> Entity {
        let id = self.len;
        let idx = id as usize;
        self.len += 1;

        if idx >= self.transforms.len() {
            // grow all arrays equally
            let new_len = (idx + 1).next_power_of_two().max(8);
            self.transforms.resize(new_len, Transform::identity());
            self.renderables.resize(new_len, None);
            self.names.resize(new_len, None);
            self.animations.resize(new_len, None);
            self.alive.resize(new_len, false);
        }

        self.transforms[idx] = t;
        self.renderables[idx] = r;
        self.names[idx] = None;
        self.animations[idx] = None;
        self.alive[idx] = true;
        id
    }

    /// Spawn and tag with a name for [`World::find`].
    pub fn spawn_named(&mut self, name: &str, t: Transform, r: Option<Renderable>) -> Entity {
        let e = self.spawn(t, r);
        self.names[e as usize] = Some(name.to_owned());
        e
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_alive(&self, e: Entity) -> bool {
        let i = e as usize;
        i < self.alive.len() && self.alive[i]
    }

    pub fn find(&self, name: &str) -> Option<Entity> {
        (0..self.len as usize)
            .find(|&i| self.alive[i] && self.names[i].as_deref() == Some(name))
            .map(|i| i as Entity)
    }

    pub fn name(&self, e: Entity) -> Option<&str> {
        if self.is_alive(e) {
            self.names[e as usize].as_deref()
        } else {
            None
        }
    }

    #[inline]
    pub fn transform(&self, e: Entity) -> Option<&Transform> {
        if self.is_alive(e) {
            Some(&self.transforms[e as usize])
        } else {
            None
        }
    }

    /// Mutable access to a transform (for animation).
    #[inline]
    pub fn transform_mut(&mut self, e: Entity) -> Option<&mut Transform> {
        let i = e as usize;
        if self.is_alive(e) {
            Some(&mut self.transforms[i])
        } else {
            None
        }
    }

    /// Attach or replace an animation; returns false for dead entities.
    pub fn set_animation(&mut self, e: Entity, animation: Animation) -> bool {
        if !self.is_alive(e) {
            return false;
        }
        self.animations[e as usize] = Some(animation);
        true
    }

    pub fn animation_mut(&mut self, e: Entity) -> Option<&mut Animation> {
        if self.is_alive(e) {
            self.animations[e as usize].as_mut()
        } else {
            None
        }
    }

    /// Iterate over (Transform, Renderable) pairs.
    pub fn iter_renderables(&self) -> impl Iterator<Item = (&Transform, &Renderable)> {
        // No alloc: zip and filter by alive + has Some(Renderable)
        (0..self.len as usize).filter_map(move |i| {
            if self.alive.get(i).copied().unwrap_or(false) {
                if let Some(r) = self.renderables[i].as_ref() {
                    return Some((&self.transforms[i], r));
                }
            }
            None
        })
    }

    /// Move, spin and scale `e` according to the held keys in `controls`.
    pub fn apply_controls(&mut self, e: Entity, controls: &Controls, dt: f32) {
        let Some(t) = self.transform_mut(e) else {
            return;
        };
        let held = &controls.held;
        let step = MOVE_SPEED * dt;

        let mut delta = Vec3::ZERO;
        if held.forward {
            delta.z -= step;
        }
        if held.backward {
            delta.z += step;
        }
        if held.left {
            delta.x -= step;
        }
        if held.right {
            delta.x += step;
        }
        if held.up {
            delta.y += step;
        }
        if held.down {
            delta.y -= step;
        }
        t.translation += delta;

        if let Some(axis) = controls.rotation_axis {
            let angle = (ROTATE_SPEED_DEG * dt).to_radians();
            match axis {
                Axis::X => t.rotation_euler.x += angle,
                Axis::Y => t.rotation_euler.y += angle,
                Axis::Z => t.rotation_euler.z += angle,
            }
        }

        if held.scale_up {
            t.scale *= 1.0 + SCALE_SPEED * dt;
        }
        if held.scale_down {
            t.scale *= (1.0 - SCALE_SPEED * dt).max(0.0);
        }
    }

    /// Advance every animation by `dt` and write the result into transforms.
    /// `paused` (typically the entity being edited) keeps its pose.
    pub fn system_animate(&mut self, dt: f32, paused: Option<Entity>) {
        for i in 0..(self.len as usize) {
            if !self.alive[i] || paused == Some(i as Entity) {
                continue;
            }
            let Some(animation) = self.animations[i].as_mut() else {
                continue;
            };
            match animation {
                Animation::Orbit { orbit, center } => {
                    orbit.advance(dt);
                    let c = match *center {
                        OrbitCenter::Point(p) => p,
                        OrbitCenter::Entity(other) => self
                            .transforms
                            .get(other as usize)
                            .map(|t| t.translation)
                            .unwrap_or(Vec3::ZERO),
                    };
                    let t = &mut self.transforms[i];
                    t.translation = orbit.position_around(c, t.translation.y);
                    t.rotation_euler.y = orbit.heading_deg().to_radians();
                }
                Animation::Trajectory(follower) => {
                    follower.step(dt);
                    self.transforms[i].translation = follower.position;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, KeyAction, Scheme};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn spawn_and_find_by_name() {
        let mut w = World::new();
        let a = w.spawn(Transform::identity(), None);
        let b = w.spawn_named("moon", Transform::identity(), Some(Renderable::new(0)));
        assert_eq!(w.len(), 2);
        assert_eq!(w.find("moon"), Some(b));
        assert_eq!(w.find("mars"), None);
        assert_eq!(w.name(a), None);
        assert_eq!(w.iter_renderables().count(), 1);
        assert!(!w.is_alive(99));
        assert!(w.transform_mut(99).is_none());
    }

    #[test]
    fn held_keys_move_and_scale() {
        let mut w = World::new();
        let e = w.spawn(Transform::identity(), None);
        let controls = Controls::new(Scheme::ObjectEditing);
        let (controls, _) = controls.handle_key(Key::W, KeyAction::Press);
        let (controls, _) = controls.handle_key(Key::I, KeyAction::Press);
        let (controls, _) = controls.handle_key(Key::Equal, KeyAction::Press);

        w.apply_controls(e, &controls, 0.5);
        let t = w.transform(e).unwrap();
        assert!(approx(t.translation, Vec3::new(0.0, 0.75, -0.75)));
        assert!(approx(t.scale, Vec3::splat(1.5)));
        assert_eq!(t.rotation_euler, Vec3::ZERO);
    }

    #[test]
    fn active_axis_spins() {
        let mut w = World::new();
        let e = w.spawn(Transform::identity(), None);
        let (controls, _) = Controls::default().handle_key(Key::Y, KeyAction::Press);
        w.apply_controls(e, &controls, 2.0);
        let t = w.transform(e).unwrap();
        assert!((t.rotation_euler.y - 50f32.to_radians()).abs() < 1e-5);
        assert_eq!(t.rotation_euler.x, 0.0);
    }

    #[test]
    fn scale_down_never_goes_negative() {
        let mut w = World::new();
        let e = w.spawn(Transform::identity(), None);
        let (controls, _) = Controls::default().handle_key(Key::Minus, KeyAction::Press);
        w.apply_controls(e, &controls, 3.0);
        assert_eq!(w.transform(e).unwrap().scale, Vec3::ZERO);
    }

    #[test]
    fn orbit_follows_its_center_entity() {
        let mut w = World::new();
        let center = w.spawn(
            Transform::from_trs(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, Vec3::ONE),
            None,
        );
        let moon = w.spawn(
            Transform::from_trs(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, Vec3::ONE),
            None,
        );
        w.set_animation(
            moon,
            Animation::Orbit {
                orbit: Orbit::new(3.0, std::f32::consts::FRAC_PI_2),
                center: OrbitCenter::Entity(center),
            },
        );

        w.system_animate(1.0, None);
        let t = w.transform(moon).unwrap();
        assert!(approx(t.translation, Vec3::new(10.0, 2.0, 3.0)));
        assert!((t.rotation_euler.y - 180f32.to_radians()).abs() < 1e-5);

        // Paused entities neither move nor advance their angle.
        w.system_animate(1.0, Some(moon));
        assert!(approx(w.transform(moon).unwrap().translation, Vec3::new(10.0, 2.0, 3.0)));
    }

    #[test]
    fn trajectory_drives_translation() {
        let mut w = World::new();
        let e = w.spawn(Transform::identity(), None);
        let follower =
            TrajectoryFollower::new(Vec3::ZERO, vec![Vec3::new(1.0, 0.0, 0.0)], 0.5);
        assert!(w.set_animation(e, Animation::Trajectory(follower)));
        w.system_animate(1.0, None);
        assert!(approx(w.transform(e).unwrap().translation, Vec3::new(0.5, 0.0, 0.0)));
        assert!(!w.set_animation(
            42,
            Animation::Trajectory(TrajectoryFollower::new(Vec3::ZERO, vec![], 1.0))
        ));
    }
}
