use bevy::prelude::*;
use bevy_prototype_debug_lines::DebugLines;

use crate::{
    pendulum::{Pendulum, PendulumConfig},
    resources::Config,
    scene::MaterialProps,
};

const TRAIL_DURATION: f32 = 1.5;

/// Every pendulum in the row, backed by the ECS world.
#[derive(Resource, Default)]
pub struct PendulumWave {
    pub pendulums: Vec<Pendulum<World>>,
    pub attached: bool,
    /// Bumped on every spawn so per-frame history can tell rebuilt waves apart.
    pub generation: u32,
}

impl PendulumWave {
    pub fn spawn(&mut self, world: &mut World, config: &Config) {
        let row_start = config.row_start();
        for i in 0..config.pendulum_count {
            let mut pendulum = Pendulum::new(
                world,
                PendulumConfig {
                    depth_offset: i as f32 * config.depth_spacing,
                    phase_difference: i as f32 * config.phase_step,
                    base_position: Vec3::new(
                        config.base_position.x,
                        config.base_position.y,
                        row_start,
                    ),
                    start_angle: config.release_angle,
                    wire_length: config.wire_length,
                    sphere_material: config.sphere_material.clone(),
                },
            );
            pendulum.add_to_scene(world);
            pendulum.swing_mut().angle = config.release_angle;
            pendulum.update_position(world);
            debug!(
                "Pendulum {} phase difference {} depth offset {} start angle {}",
                i,
                pendulum.swing().phase_difference(),
                pendulum.depth_offset(),
                pendulum.start_angle()
            );
            self.pendulums.push(pendulum);
        }
        self.attached = true;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear(&mut self, world: &mut World) {
        for pendulum in self.pendulums.drain(..) {
            pendulum.despawn(world);
        }
        self.attached = false;
    }

    pub fn advance(&mut self, world: &mut World) {
        for pendulum in self.pendulums.iter_mut() {
            pendulum.update_angles();
            pendulum.update_position(world);
        }
    }

    pub fn toggle_attached(&mut self, world: &mut World) {
        for pendulum in self.pendulums.iter() {
            if self.attached {
                pendulum.remove_from_scene(world);
            } else {
                pendulum.add_to_scene(world);
            }
        }
        self.attached = !self.attached;
    }

    /// Pushes `props` to every sphere still showing something else.
    pub fn apply_sphere_material(&mut self, world: &mut World, props: &MaterialProps) -> bool {
        let mut changed = false;
        for pendulum in self.pendulums.iter_mut() {
            if pendulum.sphere_props() != props {
                pendulum.update_sphere_material(world, props);
                changed = true;
            }
        }
        changed
    }
}

pub fn spawn_wave(world: &mut World) {
    world.resource_scope(|world, config: Mut<Config>| {
        world.resource_scope(|world, mut wave: Mut<PendulumWave>| {
            wave.spawn(world, &config);
            info!("Spawned {} pendulums", wave.pendulums.len());
        });
    });
}

pub fn despawn_wave(world: &mut World) {
    world.resource_scope(|world, mut wave: Mut<PendulumWave>| {
        let count = wave.pendulums.len();
        wave.clear(world);
        debug!("Despawned {} pendulums", count);
    });
}

pub fn swing(world: &mut World) {
    world.resource_scope(|world, mut wave: Mut<PendulumWave>| {
        wave.advance(world);
    });
}

pub fn sync_sphere_material(world: &mut World) {
    let props = world.resource::<Config>().sphere_material.clone();
    world.resource_scope(|world, mut wave: Mut<PendulumWave>| {
        if wave.apply_sphere_material(world, &props) {
            debug!("Sphere material updated");
        }
    });
}

pub fn toggle_swinging_parts(world: &mut World) {
    let pressed = world
        .get_resource::<Input<KeyCode>>()
        .map_or(false, |keys| keys.just_pressed(KeyCode::H));
    if !pressed {
        return;
    }
    world.resource_scope(|world, mut wave: Mut<PendulumWave>| {
        wave.toggle_attached(world);
        if wave.attached {
            info!("Pendulums attached");
        } else {
            info!("Pendulums detached, hooks stay");
        }
    });
}

/// Sphere positions from the previous frame of one wave generation.
#[derive(Default)]
pub struct TrailHistory {
    generation: u32,
    last: Vec<Vec3>,
}

impl TrailHistory {
    /// Returns the segments travelled since the last call, none right after a rebuild.
    pub fn advance(&mut self, wave: &PendulumWave) -> Vec<(Vec3, Vec3)> {
        let positions = wave
            .pendulums
            .iter()
            .map(|p| p.mass_position())
            .collect::<Vec<_>>();
        let segments = if self.generation == wave.generation && self.last.len() == positions.len() {
            self.last.iter().copied().zip(positions.iter().copied()).collect()
        } else {
            Vec::new()
        };
        self.generation = wave.generation;
        self.last = positions;
        segments
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }
}

pub fn draw_trails(
    config: Res<Config>,
    wave: Res<PendulumWave>,
    mut lines: ResMut<DebugLines>,
    mut history: Local<TrailHistory>,
) {
    if !config.show_trails || !wave.attached {
        history.clear();
        return;
    }

    for (from, to) in history.advance(&wave) {
        lines.line_colored(from, to, TRAIL_DURATION, Color::GRAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{InScene, SceneBackend};
    use bevy::asset::AssetPlugin;

    fn headless_app(pendulum_count: u32) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugin(AssetPlugin::default())
            .add_asset::<Mesh>()
            .add_asset::<StandardMaterial>()
            .insert_resource(Config {
                pendulum_count,
                ..default()
            })
            .init_resource::<PendulumWave>();
        app
    }

    #[test]
    fn spawns_a_centred_row() {
        let mut app = headless_app(3);
        spawn_wave(&mut app.world);

        let config = Config::default();
        let wave = app.world.resource::<PendulumWave>();
        assert_eq!(wave.pendulums.len(), 3);
        assert!(wave.attached);

        let depths = wave
            .pendulums
            .iter()
            .map(|p| p.mass_position().z)
            .collect::<Vec<_>>();
        let spacing = config.depth_spacing;
        assert!((depths[0] + spacing).abs() < 1e-5);
        assert!(depths[1].abs() < 1e-5);
        assert!((depths[2] - spacing).abs() < 1e-5);

        for (i, p) in wave.pendulums.iter().enumerate() {
            assert_eq!(p.swing().phase_difference(), i as f32 * config.phase_step);
            assert_eq!(p.swing().angle, config.release_angle);
            assert_eq!(p.start_angle(), config.release_angle);
            assert_eq!(p.swing().wire_length(), config.wire_length);
        }

        let in_scene = app
            .world
            .query_filtered::<Entity, With<InScene>>()
            .iter(&app.world)
            .count();
        assert_eq!(in_scene, 12);
    }

    #[test]
    fn swing_advances_every_pendulum() {
        let mut app = headless_app(4);
        spawn_wave(&mut app.world);
        let before = app
            .world
            .resource::<PendulumWave>()
            .pendulums
            .iter()
            .map(|p| p.swing().angle)
            .collect::<Vec<_>>();

        swing(&mut app.world);

        let wave = app.world.resource::<PendulumWave>();
        for (p, angle) in wave.pendulums.iter().zip(before) {
            assert_ne!(p.swing().angle, angle);
            let Some(transform) = app.world.get::<Transform>(p.sphere()) else {
                panic!("sphere entity missing");
            };
            assert_eq!(transform.translation, p.mass_position());
        }
    }

    #[test]
    fn toggling_detaches_everything_but_hooks() {
        let mut app = headless_app(2);
        spawn_wave(&mut app.world);

        app.world
            .resource_scope(|world, mut wave: Mut<PendulumWave>| wave.toggle_attached(world));
        {
            let wave = app.world.resource::<PendulumWave>();
            assert!(!wave.attached);
            for p in wave.pendulums.iter() {
                assert!(app.world.contains_node(p.hook()));
                assert!(!app.world.contains_node(p.wire()));
                assert!(!app.world.contains_node(p.ring()));
                assert!(!app.world.contains_node(p.sphere()));
            }
        }

        app.world
            .resource_scope(|world, mut wave: Mut<PendulumWave>| wave.toggle_attached(world));
        let wave = app.world.resource::<PendulumWave>();
        assert!(wave.attached);
        for p in wave.pendulums.iter() {
            assert!(app.world.contains_node(p.wire()));
            assert!(app.world.contains_node(p.sphere()));
        }
    }

    #[test]
    fn despawn_wave_removes_all_entities() {
        let mut app = headless_app(2);
        spawn_wave(&mut app.world);
        let entities = app
            .world
            .resource::<PendulumWave>()
            .pendulums
            .iter()
            .flat_map(|p| [p.hook(), p.wire(), p.ring(), p.sphere()])
            .collect::<Vec<_>>();

        despawn_wave(&mut app.world);

        assert!(app.world.resource::<PendulumWave>().pendulums.is_empty());
        for e in entities {
            assert!(app.world.get_entity(e).is_none());
        }
    }

    #[test]
    fn sphere_material_follows_config() {
        let mut app = headless_app(2);
        spawn_wave(&mut app.world);

        app.world.resource_mut::<Config>().sphere_material.color = Color::GREEN;
        sync_sphere_material(&mut app.world);

        let wave = app.world.resource::<PendulumWave>();
        let materials = app.world.resource::<Assets<StandardMaterial>>();
        for p in wave.pendulums.iter() {
            assert_eq!(p.sphere_props().color, Color::GREEN);
            let Some(handle) = app.world.get::<Handle<StandardMaterial>>(p.sphere()) else {
                panic!("sphere has no material");
            };
            let Some(material) = materials.get(handle) else {
                panic!("sphere material missing");
            };
            assert_eq!(material.base_color, Color::GREEN);
        }
    }

    #[test]
    fn second_sync_is_a_no_op() {
        let mut app = headless_app(2);
        spawn_wave(&mut app.world);
        let props = app.world.resource::<Config>().sphere_material.clone();

        let changed = app.world.resource_scope(|world, mut wave: Mut<PendulumWave>| {
            wave.apply_sphere_material(world, &props)
        });
        assert!(!changed);
    }

    #[test]
    fn trails_follow_the_spheres() {
        let mut app = headless_app(2);
        spawn_wave(&mut app.world);
        let mut history = TrailHistory::default();

        assert!(history.advance(app.world.resource::<PendulumWave>()).is_empty());
        swing(&mut app.world);

        let wave = app.world.resource::<PendulumWave>();
        let segments = history.advance(wave);
        assert_eq!(segments.len(), 2);
        for ((_, to), p) in segments.iter().zip(wave.pendulums.iter()) {
            assert_eq!(*to, p.mass_position());
        }
    }

    #[test]
    fn trails_restart_after_a_rebuild() {
        let mut app = headless_app(3);
        spawn_wave(&mut app.world);
        let mut history = TrailHistory::default();
        history.advance(app.world.resource::<PendulumWave>());
        swing(&mut app.world);
        swing(&mut app.world);

        despawn_wave(&mut app.world);
        spawn_wave(&mut app.world);

        let wave = app.world.resource::<PendulumWave>();
        assert_eq!(wave.pendulums.len(), 3);
        assert!(history.advance(wave).is_empty());
        swing(&mut app.world);
        assert_eq!(history.advance(app.world.resource::<PendulumWave>()).len(), 3);
    }
}
