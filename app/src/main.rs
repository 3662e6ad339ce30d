/*!
GamePlayTest binary: loads the layered game config, logs validation warnings and composes
the gameplay plugins in a window.

* `assets/config/game.ron` then `assets/config/game.local.ron`, then any `--config` layers.
* Rapier debug render: always with the `debug` feature, otherwise only when `rapier_debug` is set.
*/

use std::path::PathBuf;

use bevy::prelude::*;
use bevy_rapier3d::prelude::RapierDebugRenderPlugin;
use clap::Parser;
use gt_core::{CorePlugin, GameConfigRes, RngSeed};
use gt_gameplay::GameplayPlugin;
use gt_input::InputActionsPlugin;
use gt_physics::PhysicsPlugin;

#[cfg(feature = "debug")]
use gt_debug_tools::DebugToolsPlugin;

const BASE_LAYERS: [&str; 2] = ["assets/config/game.ron", "assets/config/game.local.ron"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Third-person grab and throw gameplay test", long_about = None)]
struct Args {
    /// Extra RON layers applied after the base config (repeatable).
    #[arg(long = "config")]
    configs: Vec<PathBuf>,
    /// Seed for prop placement.
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// Record grab traces as debug lines.
    #[arg(long)]
    grab_debug: bool,
    /// Draw Rapier collider outlines.
    #[arg(long)]
    rapier_debug: bool,
}

// ---------------- Config Loading ----------------

fn load_config(args: &Args) -> gt_config::GameConfig {
    let layers = BASE_LAYERS
        .iter()
        .map(PathBuf::from)
        .chain(args.configs.iter().cloned());
    let (cfg, used, errors) = gt_config::GameConfig::load_layered(layers);
    for e in errors {
        warn!("CONFIG LOAD ISSUE: {e}");
    }
    if used.is_empty() {
        info!("No config layers found; using defaults");
    } else {
        info!(?used, "Config layers loaded");
    }
    apply_overrides(cfg, args)
}

fn apply_overrides(mut cfg: gt_config::GameConfig, args: &Args) -> gt_config::GameConfig {
    if args.grab_debug {
        cfg.grab.debug = true;
    }
    if args.rapier_debug {
        cfg.rapier_debug = true;
    }
    cfg
}

// ---------------- Main ----------------

fn main() {
    let args = Args::parse();
    let cfg = load_config(&args);

    for w in cfg.validate() {
        warn!("CONFIG WARNING: {w}");
    }
    info!(?cfg.window, "Window config");
    info!(
        pawn = %cfg.game_mode.default_pawn,
        props = cfg.game_mode.prop_count,
        grab_range = cfg.grab.range,
        grab_debug = cfg.grab.debug,
        seed = args.seed,
        "Runtime summary"
    );

    let window_title = cfg.window.title.clone();

    let mut app = App::new();
    app.insert_resource(GameConfigRes(cfg.clone()))
        .insert_resource(RngSeed(args.seed))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: window_title,
                resolution: (cfg.window.width, cfg.window.height).into(),
                resizable: true,
                ..Default::default()
            }),
            ..Default::default()
        }))
        .add_plugins(CorePlugin)
        .add_plugins(InputActionsPlugin)
        .add_plugins(PhysicsPlugin)
        .add_plugins(GameplayPlugin);

    #[cfg(feature = "debug")]
    {
        app.add_plugins(DebugToolsPlugin);
        app.add_plugins(RapierDebugRenderPlugin::default());
    }
    #[cfg(not(feature = "debug"))]
    {
        if cfg.rapier_debug {
            app.add_plugins(RapierDebugRenderPlugin::default());
        }
    }

    app.run();
}
