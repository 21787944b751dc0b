use std::f32::consts::PI;

use bevy::prelude::*;
use bevy_inspector_egui::{prelude::ReflectInspectorOptions, InspectorOptions};

use crate::scene::MaterialProps;

#[derive(Reflect, Resource, InspectorOptions)]
#[reflect(Resource, InspectorOptions)]
pub struct Config {
    #[inspector(min = 1, max = 64)]
    pub pendulum_count: u32,
    #[inspector(min = 0.0, max = 0.001)]
    pub phase_step: f32,
    #[inspector(min = 1.0, max = 20.0)]
    pub wire_length: f32,
    #[inspector(min = 1.0, max = 5.0)]
    pub depth_spacing: f32,
    pub base_position: Vec3,
    #[inspector(min = 0.0, max = 6.3)]
    pub release_angle: f32,
    pub show_trails: bool,
    pub sphere_material: MaterialProps,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pendulum_count: 15,
            phase_step: 0.00005,
            wire_length: 8.0,
            depth_spacing: 1.5,
            base_position: Vec3::new(0.0, 1.0, 0.0),
            release_angle: PI - 0.6,
            show_trails: false,
            sphere_material: MaterialProps {
                color: Color::rgb(0.85, 0.2, 0.1),
                emissive: Color::rgb(0.6, 0.1, 0.0),
                emissive_intensity: 0.4,
                metalness: 0.3,
                roughness: 0.25,
            },
        }
    }
}

impl Config {
    /// Z of the first pendulum so the row is centred on `base_position.z`.
    pub fn row_start(&self) -> f32 {
        let count = self.pendulum_count.max(1) as f32;
        self.base_position.z - (count - 1.0) * self.depth_spacing * 0.5
    }
}
