mod pendulum;
mod reset;
mod resources;
mod scene;
mod wave;

use reset::*;
use resources::*;
use scene::MaterialProps;
use wave::*;

use bevy::prelude::*;
use bevy_inspector_egui::quick::{ResourceInspectorPlugin, WorldInspectorPlugin};
use bevy_prototype_debug_lines::DebugLinesPlugin;
use std::f32::consts::FRAC_PI_2;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugin(WorldInspectorPlugin::new())
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 0.1,
        })
        .init_resource::<Config>()
        .init_resource::<PendulumWave>()
        .add_plugin(ResourceInspectorPlugin::<Config>::default())
        .add_plugin(DebugLinesPlugin::default())
        .add_plugin(ResetPlugin)
        .add_startup_system(setup)
        .add_startup_system(spawn_wave)
        .add_systems(
            (swing, draw_trails)
                .chain()
                .in_set(OnUpdate(ResetState::Playing)),
        )
        .add_system(sync_sphere_material)
        .add_system(toggle_swinging_parts)
        .register_type::<Config>()
        .register_type::<MaterialProps>()
        .run()
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<Config>,
) {
    let focus = config.base_position + Vec3::Y * config.wire_length * 0.6;

    commands.spawn(Camera3dBundle {
        transform: Transform::from_xyz(20., 12., 22.).looking_at(focus, Vec3::Y),
        ..Default::default()
    });

    // light
    commands.spawn(DirectionalLightBundle {
        transform: Transform::from_xyz(30.0, 50.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
        directional_light: DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        ..default()
    });

    // ground
    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Mesh::from(shape::Plane {
                size: 60.,
                ..default()
            })),
            material: materials.add(StandardMaterial {
                base_color: Color::DARK_GRAY,
                perceptual_roughness: 0.8,
                ..default()
            }),
            transform: Transform {
                rotation: Quat::from_rotation_y(FRAC_PI_2),
                ..default()
            },
            ..default()
        },
        Name::new("Ground"),
    ));

    info!("Press 'R' to reset");
    info!("Press 'Space' to pause");
    info!("Press 'H' to detach the pendulums from their hooks");
}
