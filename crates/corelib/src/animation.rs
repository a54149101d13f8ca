//! Per-frame motion: circular orbits and keyframe trajectories.

use crate::Vec3;

/// Axis-aligned box positions are clamped into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Roughly what an 800x600 view at z = -5 shows.
    pub const SCREEN: Bounds = Bounds {
        min: Vec3::new(-8.0, -6.0, -10.0),
        max: Vec3::new(8.0, 6.0, -1.0),
    };

    #[inline]
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }
}

/// Circular motion on the XZ plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    /// Radians per second.
    pub speed: f32,
    /// Current angle in radians.
    pub angle: f32,
}

impl Orbit {
    pub fn new(radius: f32, speed: f32) -> Self {
        Self {
            radius,
            speed,
            angle: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.angle += self.speed * dt;
    }

    /// Point on the circle around `center`, keeping the caller's `y`.
    pub fn position_around(&self, center: Vec3, y: f32) -> Vec3 {
        Vec3::new(
            center.x + self.radius * self.angle.cos(),
            y,
            center.z + self.radius * self.angle.sin(),
        )
    }

    /// Yaw in degrees that points a +Z-facing model along the direction of travel.
    pub fn heading_deg(&self) -> f32 {
        self.angle.to_degrees() + 90.0
    }
}

/// Moves a point through a closed list of waypoints at constant speed.
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryFollower {
    points: Vec<Vec3>,
    target: usize,
    pub position: Vec3,
    /// Units per second.
    pub speed: f32,
    pub bounds: Option<Bounds>,
}

impl TrajectoryFollower {
    /// Distance at which a waypoint counts as reached.
    pub const ARRIVAL_EPSILON: f32 = 0.05;

    pub fn new(start: Vec3, points: Vec<Vec3>, speed: f32) -> Self {
        Self {
            points,
            target: 0,
            position: start,
            speed,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self.points = self.points.iter().map(|&p| bounds.clamp(p)).collect();
        self.position = bounds.clamp(self.position);
        self
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn target_index(&self) -> usize {
        self.target
    }

    /// Replace the path (clamped into bounds) and restart from its first point.
    pub fn set_points(&mut self, points: Vec<Vec3>) {
        self.points = match self.bounds {
            Some(b) => points.into_iter().map(|p| b.clamp(p)).collect(),
            None => points,
        };
        self.target = 0;
    }

    pub fn step(&mut self, dt: f32) {
        let Some(&target) = self.points.get(self.target) else {
            return;
        };
        let to_target = target - self.position;
        let distance = to_target.length();

        if distance < Self::ARRIVAL_EPSILON {
            self.target = (self.target + 1) % self.points.len();
            return;
        }

        // Never step past the waypoint.
        let step = (self.speed * dt).min(distance);
        let mut next = self.position + to_target / distance * step;
        if let Some(b) = self.bounds {
            next = b.clamp(next);
        }
        self.position = next;
    }
}
