use std::f32::consts::FRAC_PI_2;

use bevy::{
    pbr::{NotShadowCaster, NotShadowReceiver},
    prelude::*,
    render::mesh::VertexAttributeValues,
};

/// Surface description shared by the sphere and the metal parts.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct MaterialProps {
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for MaterialProps {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            metalness: 0.0,
            roughness: 1.0,
        }
    }
}

impl MaterialProps {
    pub fn metal() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 1.0,
            roughness: 0.0,
            ..default()
        }
    }

    /// Overwrites the five surface fields of `material`, leaving the rest alone.
    pub fn apply_to(&self, material: &mut StandardMaterial) {
        material.base_color = self.color;
        // StandardMaterial has no separate intensity, fold it into the color
        material.emissive = self.emissive * self.emissive_intensity;
        material.metallic = self.metalness;
        material.perceptual_roughness = self.roughness;
    }
}

impl From<&MaterialProps> for StandardMaterial {
    fn from(props: &MaterialProps) -> Self {
        let mut material = StandardMaterial::default();
        props.apply_to(&mut material);
        material
    }
}

/// Torus standing upright in the XY plane, hole facing +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusShape {
    pub radius: f32,
    pub tube_radius: f32,
}

impl From<TorusShape> for Mesh {
    fn from(torus: TorusShape) -> Self {
        let mut mesh = Mesh::from(shape::Torus {
            radius: torus.radius,
            ring_radius: torus.tube_radius,
            subdivisions_segments: 64,
            subdivisions_sides: 32,
        });
        // bevy builds the ring flat in XZ, stand it up
        let upright = Quat::from_rotation_x(FRAC_PI_2);
        for attribute in [Mesh::ATTRIBUTE_POSITION, Mesh::ATTRIBUTE_NORMAL] {
            if let Some(VertexAttributeValues::Float32x3(values)) = mesh.attribute_mut(attribute) {
                for value in values.iter_mut() {
                    *value = (upright * Vec3::from(*value)).to_array();
                }
            }
        }
        mesh
    }
}

/// Cylinder hanging from its top cap: the geometry spans `-height..=0` on local Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderShape {
    pub radius: f32,
    pub height: f32,
}

impl From<CylinderShape> for Mesh {
    fn from(cylinder: CylinderShape) -> Self {
        let mut mesh = Mesh::from(shape::Cylinder {
            radius: cylinder.radius,
            height: cylinder.height,
            resolution: 12,
            segments: 1,
        });
        if let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
        {
            for position in positions.iter_mut() {
                position[1] -= cylinder.height * 0.5;
            }
        }
        mesh
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereShape {
    pub radius: f32,
}

impl From<SphereShape> for Mesh {
    fn from(sphere: SphereShape) -> Self {
        Mesh::from(shape::UVSphere {
            radius: sphere.radius,
            sectors: 32,
            stacks: 32,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shadows {
    pub cast: bool,
    pub receive: bool,
}

impl Shadows {
    pub const ALL: Shadows = Shadows {
        cast: true,
        receive: true,
    };
}

/// What a pendulum needs from the scene it lives in.
///
/// Nodes are created detached; they only show up once `add_node` is called.
/// Lookups on nodes or materials the backend does not know about are no-ops.
pub trait SceneBackend {
    type Node: Copy + Eq + std::fmt::Debug;
    type Material: Clone;

    fn create_material(&mut self, props: &MaterialProps) -> Self::Material;
    fn update_material(&mut self, material: &Self::Material, props: &MaterialProps);
    fn destroy_material(&mut self, material: Self::Material);

    fn create_torus(
        &mut self,
        name: &'static str,
        torus: TorusShape,
        material: &Self::Material,
        shadows: Shadows,
    ) -> Self::Node;
    fn create_cylinder(
        &mut self,
        name: &'static str,
        cylinder: CylinderShape,
        material: &Self::Material,
        shadows: Shadows,
    ) -> Self::Node;
    fn create_sphere(
        &mut self,
        name: &'static str,
        sphere: SphereShape,
        material: &Self::Material,
        shadows: Shadows,
    ) -> Self::Node;
    fn destroy_node(&mut self, node: Self::Node);

    fn add_node(&mut self, node: Self::Node);
    fn remove_node(&mut self, node: Self::Node);
    fn contains_node(&self, node: Self::Node) -> bool;

    fn set_position(&mut self, node: Self::Node, position: Vec3);
    /// Turns the node so its local +Z axis points at `target`.
    fn orient_towards(&mut self, node: Self::Node, target: Vec3);
    fn rotate_local_x(&mut self, node: Self::Node, angle: f32);
}

pub fn face_towards(transform: &mut Transform, target: Vec3) {
    if let Some(dir) = (target - transform.translation).try_normalize() {
        transform.rotation = Quat::from_rotation_arc(Vec3::Z, dir);
    }
}

/// Marks entities that are currently part of the rendered scene.
#[derive(Component, Default)]
pub struct InScene;

fn spawn_primitive(
    world: &mut World,
    name: &'static str,
    mesh: Mesh,
    material: &Handle<StandardMaterial>,
    shadows: Shadows,
) -> Entity {
    let mesh = world.resource_mut::<Assets<Mesh>>().add(mesh);
    let mut entity = world.spawn((
        PbrBundle {
            mesh,
            material: material.clone(),
            visibility: Visibility::Hidden,
            ..default()
        },
        Name::new(name),
    ));
    if !shadows.cast {
        entity.insert(NotShadowCaster);
    }
    if !shadows.receive {
        entity.insert(NotShadowReceiver);
    }
    entity.id()
}

impl SceneBackend for World {
    type Node = Entity;
    type Material = Handle<StandardMaterial>;

    fn create_material(&mut self, props: &MaterialProps) -> Self::Material {
        self.resource_mut::<Assets<StandardMaterial>>()
            .add(props.into())
    }

    fn update_material(&mut self, material: &Self::Material, props: &MaterialProps) {
        let mut materials = self.resource_mut::<Assets<StandardMaterial>>();
        if let Some(material) = materials.get_mut(material) {
            props.apply_to(material);
        }
    }

    fn destroy_material(&mut self, material: Self::Material) {
        self.resource_mut::<Assets<StandardMaterial>>()
            .remove(&material);
    }

    fn create_torus(
        &mut self,
        name: &'static str,
        torus: TorusShape,
        material: &Self::Material,
        shadows: Shadows,
    ) -> Self::Node {
        spawn_primitive(self, name, torus.into(), material, shadows)
    }

    fn create_cylinder(
        &mut self,
        name: &'static str,
        cylinder: CylinderShape,
        material: &Self::Material,
        shadows: Shadows,
    ) -> Self::Node {
        spawn_primitive(self, name, cylinder.into(), material, shadows)
    }

    fn create_sphere(
        &mut self,
        name: &'static str,
        sphere: SphereShape,
        material: &Self::Material,
        shadows: Shadows,
    ) -> Self::Node {
        spawn_primitive(self, name, sphere.into(), material, shadows)
    }

    fn destroy_node(&mut self, node: Self::Node) {
        self.despawn(node);
    }

    fn add_node(&mut self, node: Self::Node) {
        if let Some(mut entity) = self.get_entity_mut(node) {
            entity.insert((InScene, Visibility::Inherited));
        }
    }

    fn remove_node(&mut self, node: Self::Node) {
        if let Some(mut entity) = self.get_entity_mut(node) {
            entity.remove::<InScene>();
            entity.insert(Visibility::Hidden);
        }
    }

    fn contains_node(&self, node: Self::Node) -> bool {
        self.get::<InScene>(node).is_some()
    }

    fn set_position(&mut self, node: Self::Node, position: Vec3) {
        if let Some(mut transform) = self.get_mut::<Transform>(node) {
            transform.translation = position;
        }
    }

    fn orient_towards(&mut self, node: Self::Node, target: Vec3) {
        if let Some(mut transform) = self.get_mut::<Transform>(node) {
            face_towards(&mut transform, target);
        }
    }

    fn rotate_local_x(&mut self, node: Self::Node, angle: f32) {
        if let Some(mut transform) = self.get_mut::<Transform>(node) {
            transform.rotate_local_x(angle);
        }
    }
}
