// Core crate: foundational ECS markers, the config resource wrapper and system set labels
// shared by every gameplay crate. No gameplay logic lives here.

use bevy::prelude::*;

/// Marker for the player-controlled character entity.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PlayerCharacter;

/// Marker for loose, physically simulated props spawned by the game mode.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PhysicsProp;

/// Deterministic RNG seed resource (set once at startup / tests for reproducible prop placement).
#[derive(Resource, Debug, Copy, Clone, Default)]
pub struct RngSeed(pub u64);

// Wrapper Bevy resource for the pure-data GameConfig (keeps gt_config free of bevy dependency).
#[derive(Resource, Debug, Clone, Default, Deref)]
pub struct GameConfigRes(pub gt_config::GameConfig);

// System set labels; all run in Update ahead of Rapier's PostUpdate step.
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct ControlSet; // input actions -> controller intent (look, move, grab, throw)
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct MovementSet; // character kinematics
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct GrabTickSet; // held-object retargeting and handle drive
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct CameraSet; // camera rig follows the final pose

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfigRes>()
            .init_resource::<RngSeed>()
            .configure_sets(
                Update,
                (ControlSet, MovementSet, GrabTickSet, CameraSet).chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_adds_sets() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(CorePlugin);
        fn dummy() {}
        app.add_systems(Update, dummy.in_set(ControlSet));
        app.add_systems(Update, dummy.in_set(MovementSet));
        app.add_systems(Update, dummy.in_set(GrabTickSet));
        app.add_systems(Update, dummy.in_set(CameraSet));
        app.update();
    }

    #[test]
    fn plugin_keeps_inserted_config() {
        let mut cfg = gt_config::GameConfig::default();
        cfg.grab.range = 123.0;
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfigRes(cfg));
        app.add_plugins(CorePlugin);
        assert_eq!(app.world().resource::<GameConfigRes>().grab.range, 123.0);
    }
}
