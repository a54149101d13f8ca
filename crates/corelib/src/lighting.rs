//! Point lights and Phong material parameters.

use crate::{CoreError, CoreResult, Vec3};

/// Most lights a scene may carry; matches the shader's fixed-size array.
pub const MAX_LIGHTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub enabled: bool,
}

impl Light {
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            enabled: true,
        }
    }

    /// Colour scaled by intensity, or black when disabled.
    #[inline]
    pub fn radiance(&self) -> Vec3 {
        if self.enabled {
            self.color * self.intensity
        } else {
            Vec3::ZERO
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lights {
    lights: Vec<Light>,
}

impl Lights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(light: Light) -> Self {
        Self {
            lights: vec![light],
        }
    }

    pub fn push(&mut self, light: Light) -> CoreResult<usize> {
        if self.lights.len() >= MAX_LIGHTS {
            return Err(CoreError::TooManyLights { max: MAX_LIGHTS });
        }
        self.lights.push(light);
        Ok(self.lights.len() - 1)
    }

    /// Flip `enabled` on light `index`; returns the new state, or `None` if
    /// there is no such light.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let light = self.lights.get_mut(index)?;
        light.enabled = !light.enabled;
        log::debug!("light {} {}", index, if light.enabled { "on" } else { "off" });
        Some(light.enabled)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

/// Phong coefficients as the shader consumes them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhongMaterial {
    pub ka: Vec3,
    pub kd: Vec3,
    pub ks: Vec3,
    pub shininess: f32,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            ka: Vec3::splat(0.2),
            kd: Vec3::splat(0.8),
            ks: Vec3::ONE,
            shininess: 32.0,
        }
    }
}

impl PhongMaterial {
    /// Uniform grey coefficients, as used by the untextured Phong demos.
    pub fn scalar(ka: f32, kd: f32, ks: f32, shininess: f32) -> Self {
        Self {
            ka: Vec3::splat(ka),
            kd: Vec3::splat(kd),
            ks: Vec3::splat(ks),
            shininess,
        }
    }
}
