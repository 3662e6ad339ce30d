use bevy::input::InputSystem;
use bevy::prelude::*;

use super::parse::parse_input_toml;
use super::systems::system_evaluate_bindings;
use super::types::InputMap;

/// Action map shipped with the binary; used when no file is found on disk.
pub const DEFAULT_INPUT_TOML: &str = include_str!("../../../assets/config/input.toml");

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct InputActionUpdateSet;

pub struct InputActionsPlugin;

impl Plugin for InputActionsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputMap>()
            .configure_sets(PreUpdate, InputActionUpdateSet.after(InputSystem))
            .add_systems(PreStartup, load_initial_input_map)
            .add_systems(
                PreUpdate,
                system_evaluate_bindings.in_set(InputActionUpdateSet),
            );
    }
}

fn load_initial_input_map(mut commands: Commands) {
    let path = std::env::var("INPUT_CONFIG_PATH")
        .unwrap_or_else(|_| "assets/config/input.toml".into());
    #[cfg(target_arch = "wasm32")]
    let raw: String = DEFAULT_INPUT_TOML.to_string();
    #[cfg(not(target_arch = "wasm32"))]
    let raw: String = match std::fs::read_to_string(&path) {
        Ok(txt) => txt,
        Err(e) => {
            warn!("Input map {path} unreadable ({e}); using built-in bindings");
            DEFAULT_INPUT_TOML.to_string()
        }
    };
    let parsed = parse_input_toml(&raw);
    for e in &parsed.errors {
        error!("INPUT MAP ERROR: {e}");
    }
    info!(
        actions = parsed.input_map.actions.len(),
        bindings = parsed.input_map.bindings.len(),
        "Input map loaded"
    );
    commands.insert_resource(parsed.input_map);
}
