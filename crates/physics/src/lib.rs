// Physics crate: Rapier integration, the grab-and-throw controller and its physics handle,
// and the timed debug lines drawn for grab traces.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use gt_core::{GameConfigRes, GrabTickSet};

pub mod debug_trace;
pub mod grab;
pub mod handle;
pub mod query;

pub use debug_trace::{DebugTraceLine, DebugTraceLog, GrabTraceGizmos};
pub use grab::{GrabConstraint, GrabController, GrabOutcome, InteractionRay, PhysicsQuery, TraceHit};
pub use handle::{drive_physics_handles, HandleDrive, PhysicsHandle};
pub use query::RapierPhysicsQuery;

/// World units are centimetres; Rapier tolerances are scaled to match.
pub const LENGTH_UNIT: f32 = 100.0;

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().with_length_unit(LENGTH_UNIT));

        let duration = app
            .world()
            .get_resource::<GameConfigRes>()
            .map(|cfg| cfg.grab.debug_duration)
            .unwrap_or(gt_config::GrabConfig::default().debug_duration);
        app.insert_resource(DebugTraceLog::with_duration(duration))
            .add_systems(Startup, configure_gravity)
            .add_systems(Update, debug_trace::age_debug_traces)
            .add_systems(Update, drive_physics_handles.in_set(GrabTickSet));

        // Headless apps (tests, servers) run without the gizmo pipeline.
        if app.is_plugin_added::<bevy::gizmos::GizmoPlugin>() {
            app.init_gizmo_group::<GrabTraceGizmos>()
                .add_systems(Startup, debug_trace::configure_trace_gizmos)
                .add_systems(
                    Update,
                    debug_trace::draw_debug_traces.after(debug_trace::age_debug_traces),
                );
        }
    }
}

fn configure_gravity(mut q_cfg: Query<&mut RapierConfiguration>, game_cfg: Res<GameConfigRes>) {
    // RapierConfiguration lives on the default context entity, spawned by Rapier's own startup.
    match q_cfg.single_mut() {
        Ok(mut cfg) => {
            cfg.gravity = Vec3::new(0.0, game_cfg.gravity.y, 0.0);
            info!(gravity = game_cfg.gravity.y, "Rapier gravity configured");
        }
        Err(e) => warn!("Rapier configuration unavailable; default gravity kept: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_initializes() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfigRes::default());
        app.add_plugins(PhysicsPlugin);
        assert!(app.world().get_resource::<DebugTraceLog>().is_some());
    }

    #[test]
    fn trace_duration_follows_config() {
        let mut cfg = gt_config::GameConfig::default();
        cfg.grab.debug_duration = 1.5;
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfigRes(cfg));
        app.add_plugins(PhysicsPlugin);
        assert_eq!(app.world().resource::<DebugTraceLog>().duration_secs, 1.5);
    }
}
