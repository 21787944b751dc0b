use bevy::prelude::*;

use crate::wave::{despawn_wave, spawn_wave};

pub struct ResetPlugin;

impl Plugin for ResetPlugin {
    fn build(&self, app: &mut App) {
        app.add_state::<ResetState>()
            .add_system(state_keys)
            .add_system(reset.in_set(OnUpdate(ResetState::Reset)));
    }
}

/// Playing swings the wave, Pause freezes it, Reset rebuilds it for one frame.
#[derive(States, PartialEq, Eq, Debug, Clone, Hash, Default)]
pub enum ResetState {
    #[default]
    Playing,
    Pause,
    Reset,
}

fn reset(world: &mut World) {
    despawn_wave(world);
    spawn_wave(world);
    world
        .resource_mut::<NextState<ResetState>>()
        .set(ResetState::Playing);
    info!("Wave rebuilt from config");
}

/// Where a key press takes the app from `current`, if anywhere.
pub fn transition(current: &ResetState, key: KeyCode) -> Option<ResetState> {
    match (current, key) {
        (ResetState::Playing | ResetState::Pause, KeyCode::R) => Some(ResetState::Reset),
        (ResetState::Playing, KeyCode::Space) => Some(ResetState::Pause),
        (ResetState::Pause, KeyCode::Space) => Some(ResetState::Playing),
        _ => None,
    }
}

fn state_keys(
    keys: Res<Input<KeyCode>>,
    state: Res<State<ResetState>>,
    mut next: ResMut<NextState<ResetState>>,
) {
    for key in keys.get_just_pressed() {
        if let Some(target) = transition(&state.0, *key) {
            info!("{:?} -> {:?}", state.0, target);
            next.set(target);
        }
    }
}
