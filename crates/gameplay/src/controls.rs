// Grab / throw / interact routing: input actions -> grab controller operations.
// - Grab (just pressed) traces forward from the body and picks up the first dynamic prop.
// - Throw (just pressed) releases whatever is held; the prop keeps the handle's velocity.
// - Held props are retargeted every frame in GrabTickSet ahead of the handle drive.
// - Interact only announces itself through BeginInteract; nothing consumes it yet.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ReadRapierContext;
use gt_core::{ControlSet, GameConfigRes, GrabTickSet, PlayerCharacter};
use gt_input::InputMap;
use gt_physics::{
    drive_physics_handles, DebugTraceLog, GrabController, GrabOutcome, PhysicsHandle,
    RapierPhysicsQuery,
};

/// Fired when the player triggers the Interact action.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeginInteract {
    pub instigator: Entity,
}

pub(crate) fn add_control_systems(app: &mut App) {
    app.add_event::<BeginInteract>()
        .add_systems(Update, (handle_grab_actions, emit_begin_interact).in_set(ControlSet))
        .add_systems(
            Update,
            update_grab_targets.in_set(GrabTickSet).before(drive_physics_handles),
        );
}

fn handle_grab_actions(
    input: Res<InputMap>,
    cfg: Res<GameConfigRes>,
    rapier: ReadRapierContext,
    transforms: Query<&GlobalTransform>,
    mut traces: ResMut<DebugTraceLog>,
    mut chars: Query<
        (Entity, &Transform, &mut GrabController, &mut PhysicsHandle),
        With<PlayerCharacter>,
    >,
) {
    let grab = input.just_pressed("Grab");
    let throw = input.just_pressed("Throw");
    if !grab && !throw {
        return;
    }
    for (entity, tf, mut controller, mut handle) in chars.iter_mut() {
        if throw {
            if let Some(body) = controller.release_grab(&mut *handle) {
                info!(?body, "Released held object");
            }
        }
        if !grab {
            continue;
        }
        let context = match rapier.single() {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!("Grab ignored; physics context unavailable: {e}");
                continue;
            }
        };
        let locate = |e: Entity| transforms.get(e).ok().map(|t| t.translation());
        let query = RapierPhysicsQuery::new(&context, locate).excluding(entity);
        let outcome = controller.attempt_grab(
            tf,
            cfg.grab.range,
            cfg.grab.debug,
            &query,
            &mut *handle,
            &mut traces,
        );
        match outcome {
            GrabOutcome::Grabbed {
                body,
                target,
                released_previous,
            } => info!(?body, ?target, ?released_previous, "Grabbed object"),
            GrabOutcome::Missed => debug!(range = cfg.grab.range, "Grab trace missed"),
        }
    }
}

fn update_grab_targets(
    cfg: Res<GameConfigRes>,
    mut chars: Query<(&Transform, &mut GrabController, &mut PhysicsHandle)>,
) {
    for (tf, mut controller, mut handle) in chars.iter_mut() {
        controller.update_grab_target(tf, cfg.grab.range, &mut *handle);
    }
}

fn emit_begin_interact(
    input: Res<InputMap>,
    chars: Query<Entity, With<PlayerCharacter>>,
    mut events: EventWriter<BeginInteract>,
) {
    if !input.just_pressed("Interact") {
        return;
    }
    for instigator in chars.iter() {
        debug!(?instigator, "BeginInteract");
        events.write(BeginInteract { instigator });
    }
}
