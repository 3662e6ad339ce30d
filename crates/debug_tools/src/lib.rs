// Debug tools crate, linked by the app's `debug` feature.
// Logs the player's movement and grab state once a second and toggles Rapier's collider
// outlines from the ToggleDebugRender action.

use bevy::prelude::*;
use bevy_rapier3d::render::DebugRenderContext;
use gt_core::PlayerCharacter;
use gt_gameplay::CharacterMovement;
use gt_input::InputMap;
use gt_physics::GrabController;

#[derive(Resource, Debug)]
pub struct StateLogTimer(pub Timer);

impl Default for StateLogTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(1.0, TimerMode::Repeating))
    }
}

pub struct DebugToolsPlugin;

impl Plugin for DebugToolsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StateLogTimer>()
            .init_resource::<InputMap>()
            .add_systems(Update, (log_player_state, toggle_debug_render));
    }
}

fn log_player_state(
    time: Res<Time>,
    mut timer: ResMut<StateLogTimer>,
    q: Query<(&Transform, &CharacterMovement, &GrabController), With<PlayerCharacter>>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    for (tf, movement, grab) in q.iter() {
        info!(
            pos = ?tf.translation,
            vel = ?movement.velocity,
            grounded = movement.grounded,
            jumps = movement.jump_count,
            held = ?grab.held(),
            "Player state"
        );
    }
}

fn toggle_debug_render(input: Res<InputMap>, ctx: Option<ResMut<DebugRenderContext>>) {
    if !input.just_pressed("ToggleDebugRender") {
        return;
    }
    match ctx {
        Some(mut ctx) => {
            ctx.enabled = !ctx.enabled;
            info!(enabled = ctx.enabled, "Rapier debug render toggled");
        }
        None => debug!("Rapier debug render not installed"),
    }
}
