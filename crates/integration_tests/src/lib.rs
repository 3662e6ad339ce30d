// Integration tests crate: black-box flows across the published plugin APIs, run headless
// with real Rapier physics.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

/// Headless app with the engine pieces the gameplay plugins rely on and a fixed 16 ms frame.
pub fn build_minimal_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    // AssetPlugin backs Rapier's collider asset hooks; InputPlugin provides ButtonInput/MouseMotion
    // for the action map; TransformPlugin propagates GlobalTransform for Rapier and the grab trace.
    app.add_plugins((
        bevy::asset::AssetPlugin::default(),
        bevy::input::InputPlugin,
        bevy::transform::TransformPlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    app
}

/// Full gameplay stack on top of [`build_minimal_app`] with the given config.
pub fn build_game_app(cfg: gt_config::GameConfig) -> App {
    let mut app = build_minimal_app();
    app.insert_resource(gt_core::GameConfigRes(cfg))
        .insert_resource(gt_core::RngSeed(12345))
        .add_plugins(gt_core::CorePlugin)
        .add_plugins(gt_input::InputActionsPlugin)
        .add_plugins(gt_physics::PhysicsPlugin)
        .add_plugins(gt_gameplay::GameplayPlugin);
    app
}
