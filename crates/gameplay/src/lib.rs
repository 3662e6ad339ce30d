// Gameplay crate: the third-person character, its follow camera, grab/throw/interact input
// routing, the game mode that spawns the level and the placeholder actors.

use bevy::prelude::*;
use gt_core::{CameraSet, ControlSet, GameConfigRes, MovementSet};
use gt_input::InputMap;

mod camera;
mod character;
mod controls;
mod game_mode;
mod interactable;
mod jetpack;

pub use camera::{CameraBoom, FollowCamera};
pub use character::{
    orient_to_movement, spawn_third_person_character, CharacterMovement, ControlRotation,
};
pub use controls::BeginInteract;
pub use game_mode::{prop_positions, GameMode, PawnClass};
pub use interactable::{Interactable, InteractableBase};
pub use jetpack::JetPackActor;

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        let mode = {
            let cfg = app.world().get_resource::<GameConfigRes>();
            match cfg.map(|c| GameMode::from_config(&c.game_mode)) {
                Some(Ok(mode)) => mode,
                Some(Err(e)) => {
                    warn!("CONFIG WARNING: {e}; using {}", PawnClass::default().name());
                    GameMode::default()
                }
                None => GameMode::default(),
            }
        };
        app.insert_resource(mode)
            .init_resource::<InputMap>()
            .init_resource::<gt_physics::DebugTraceLog>()
            .register_type::<InteractableBase>()
            .register_type::<JetPackActor>()
            .add_systems(
                Startup,
                (game_mode::spawn_level, game_mode::spawn_default_pawn),
            )
            .add_systems(
                Update,
                (character::apply_look_input, character::apply_move_input).in_set(ControlSet),
            )
            .add_systems(Update, character::step_character_movement.in_set(MovementSet))
            .add_systems(Update, camera::update_follow_camera.in_set(CameraSet));
        controls::add_control_systems(app);
    }
}
