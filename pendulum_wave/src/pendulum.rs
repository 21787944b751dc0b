use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;

use crate::scene::{CylinderShape, MaterialProps, SceneBackend, Shadows, SphereShape, TorusShape};

const HOOK: TorusShape = TorusShape {
    radius: 0.1,
    tube_radius: 0.03,
};
const RING: TorusShape = TorusShape {
    radius: 0.6,
    tube_radius: 0.1,
};
const SPHERE: SphereShape = SphereShape { radius: 0.5 };
const WIRE_RADIUS: f32 = 0.03;

/// Angular state of one pendulum.
///
/// The step is a plain forward Euler update on a sine restoring term. It is
/// not a normalised pendulum equation, the wave depends on this exact form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swing {
    pub angle: f32,
    pub angular_velocity: f32,
    angular_acceleration: f32,
    phase_difference: f32,
    wire_length: f32,
    base_position: Vec3,
    pivot_offset: Vec2,
    current: Vec2,
}

impl Swing {
    pub const BASE_COEFFICIENT: f32 = 0.001;

    pub fn new(base_position: Vec3, wire_length: f32, phase_difference: f32) -> Self {
        Self {
            angle: PI,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            phase_difference,
            wire_length,
            base_position,
            pivot_offset: Vec2::new(0.0, wire_length),
            current: Vec2::ZERO,
        }
    }

    pub fn step(&mut self) {
        self.angular_acceleration =
            2.0 * (Self::BASE_COEFFICIENT + self.phase_difference) * self.angle.sin();
        self.angular_velocity += self.angular_acceleration;
        self.angle += self.angular_velocity;
    }

    pub fn update_current(&mut self) -> Vec2 {
        self.current = self.base_position.truncate()
            + self.pivot_offset
            + self.wire_length * Vec2::new(self.angle.sin(), self.angle.cos());
        self.current
    }

    pub fn angular_acceleration(&self) -> f32 {
        self.angular_acceleration
    }

    pub fn phase_difference(&self) -> f32 {
        self.phase_difference
    }

    pub fn wire_length(&self) -> f32 {
        self.wire_length
    }

    pub fn base_position(&self) -> Vec3 {
        self.base_position
    }

    #[cfg(test)]
    pub fn pivot_offset(&self) -> Vec2 {
        self.pivot_offset
    }

    pub fn current(&self) -> Vec2 {
        self.current
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendulumConfig {
    pub depth_offset: f32,
    pub phase_difference: f32,
    pub base_position: Vec3,
    pub start_angle: f32,
    pub wire_length: f32,
    pub sphere_material: MaterialProps,
}

/// One pendulum of the wave: its swing state plus the hook, wire, ring and
/// sphere drawn for it in a [`SceneBackend`].
pub struct Pendulum<S: SceneBackend> {
    swing: Swing,
    depth_offset: f32,
    start_angle: f32,
    sphere_props: MaterialProps,
    hook: S::Node,
    wire: S::Node,
    ring: S::Node,
    sphere: S::Node,
    metal_material: S::Material,
    sphere_material: S::Material,
}

impl<S: SceneBackend> Pendulum<S> {
    pub fn new(scene: &mut S, config: PendulumConfig) -> Self {
        let swing = Swing::new(
            config.base_position,
            config.wire_length,
            config.phase_difference,
        );

        let metal_material = scene.create_material(&MaterialProps::metal());
        let hook = scene.create_torus("Hook", HOOK, &metal_material, Shadows::ALL);
        let wire = scene.create_cylinder(
            "Wire",
            CylinderShape {
                radius: WIRE_RADIUS,
                height: config.wire_length,
            },
            &metal_material,
            Shadows::ALL,
        );
        let ring = scene.create_torus("Ring", RING, &metal_material, Shadows::ALL);

        let sphere_material = scene.create_material(&config.sphere_material);
        let sphere = scene.create_sphere("Sphere", SPHERE, &sphere_material, Shadows::ALL);

        Self {
            swing,
            depth_offset: config.depth_offset,
            start_angle: config.start_angle,
            sphere_props: config.sphere_material,
            hook,
            wire,
            ring,
            sphere,
            metal_material,
            sphere_material,
        }
    }

    pub fn add_to_scene(&self, scene: &mut S) {
        for node in [self.hook, self.wire, self.ring, self.sphere] {
            scene.add_node(node);
        }
    }

    /// Takes the wire, ring and sphere out of the scene. The hook stays.
    pub fn remove_from_scene(&self, scene: &mut S) {
        for node in [self.wire, self.ring, self.sphere] {
            scene.remove_node(node);
        }
    }

    pub fn update_angles(&mut self) {
        self.swing.step();
    }

    pub fn update_position(&mut self, scene: &mut S) {
        let current = self.swing.update_current();
        let base = self.swing.base_position();
        let z = base.z + self.depth_offset;

        let mass = current.extend(z);
        scene.set_position(self.sphere, mass);
        scene.set_position(self.ring, mass);

        let pivot = Vec3::new(base.x, base.y + self.swing.wire_length(), z);
        scene.set_position(self.wire, pivot);
        scene.set_position(self.hook, pivot);

        scene.orient_towards(self.wire, mass);
        scene.rotate_local_x(self.wire, -FRAC_PI_2);
    }

    pub fn update_sphere_material(&mut self, scene: &mut S, props: &MaterialProps) {
        self.sphere_props = props.clone();
        scene.update_material(&self.sphere_material, props);
    }

    /// Removes every node, hook included, and releases both materials.
    pub fn despawn(self, scene: &mut S) {
        for node in [self.hook, self.wire, self.ring, self.sphere] {
            scene.remove_node(node);
            scene.destroy_node(node);
        }
        scene.destroy_material(self.metal_material);
        scene.destroy_material(self.sphere_material);
    }

    pub fn swing(&self) -> &Swing {
        &self.swing
    }

    pub fn swing_mut(&mut self) -> &mut Swing {
        &mut self.swing
    }

    pub fn depth_offset(&self) -> f32 {
        self.depth_offset
    }

    /// Stored as given; the swing always starts hanging at π.
    pub fn start_angle(&self) -> f32 {
        self.start_angle
    }

    pub fn sphere_props(&self) -> &MaterialProps {
        &self.sphere_props
    }

    pub fn mass_position(&self) -> Vec3 {
        self.swing
            .current()
            .extend(self.swing.base_position().z + self.depth_offset)
    }

    #[cfg(test)]
    pub fn hook(&self) -> S::Node {
        self.hook
    }

    #[cfg(test)]
    pub fn wire(&self) -> S::Node {
        self.wire
    }

    #[cfg(test)]
    pub fn ring(&self) -> S::Node {
        self.ring
    }

    #[cfg(test)]
    pub fn sphere(&self) -> S::Node {
        self.sphere
    }
}
