//! CPU mirrors of the WGSL uniform structs in `shaders/common.wgsl`.

use bytemuck::{Pod, Zeroable};
use corelib::lighting::{Light, Lights, MAX_LIGHTS, PhongMaterial};
use corelib::{Mat4, Vec3};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub(crate) struct LightUniform {
    position: [f32; 3],
    _pad0: f32,
    radiance: [f32; 3],
    _pad1: f32,
}

impl From<&Light> for LightUniform {
    fn from(l: &Light) -> Self {
        Self {
            position: l.position.to_array(),
            _pad0: 0.0,
            radiance: l.radiance().to_array(),
            _pad1: 0.0,
        }
    }
}

/// Group 0: per-frame camera and lights.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 3],
    light_count: u32,
    lights: [LightUniform; MAX_LIGHTS],
}

impl FrameUniform {
    pub(crate) fn new(view_proj: Mat4, camera_pos: Vec3, lights: &Lights) -> Self {
        let mut out = [LightUniform::default(); MAX_LIGHTS];
        let mut count = 0;
        for (slot, light) in out.iter_mut().zip(lights.iter()) {
            *slot = light.into();
            count += 1;
        }
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera_pos.to_array(),
            light_count: count,
            lights: out,
        }
    }
}

/// Group 1: per-draw transform and material, bound with a dynamic offset.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct DrawUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    ka: [f32; 3],
    shininess: f32,
    kd: [f32; 3],
    alpha_cutoff: f32,
    ks: [f32; 3],
    _pad: f32,
}

impl DrawUniform {
    pub(crate) fn new(model: Mat4, normal_matrix: Mat4, material: &PhongMaterial, alpha_cutoff: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            ka: material.ka.to_array(),
            shininess: material.shininess,
            kd: material.kd.to_array(),
            alpha_cutoff,
            ks: material.ks.to_array(),
            _pad: 0.0,
        }
    }
}

/// Round `size` up to the device's dynamic-offset alignment.
#[inline]
pub(crate) fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 32);
        assert_eq!(std::mem::size_of::<FrameUniform>(), 64 + 16 + 32 * MAX_LIGHTS);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 176);
    }

    #[test]
    fn disabled_lights_have_no_radiance() {
        let mut lights = Lights::new();
        lights
            .push(Light::new(Vec3::ONE, Vec3::new(1.0, 0.5, 0.0), 2.0))
            .unwrap();
        lights.push(Light::new(Vec3::ZERO, Vec3::ONE, 1.0)).unwrap();
        lights.toggle(1);

        let u = FrameUniform::new(Mat4::IDENTITY, Vec3::ZERO, &lights);
        assert_eq!(u.light_count, 2);
        assert_eq!(u.lights[0].radiance, [2.0, 1.0, 0.0]);
        assert_eq!(u.lights[1].radiance, [0.0; 3]);
    }

    #[test]
    fn alignment_rounds_up() {
        assert_eq!(align_to(176, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }
}
