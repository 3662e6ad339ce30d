//! Timed debug lines for grab traces: blue on hit, red on miss, kept on screen for a fixed
//! duration.

use bevy::prelude::*;

pub const HIT_COLOR: Color = Color::srgb(0.0, 0.0, 1.0);
pub const MISS_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);

#[derive(Debug, Clone, PartialEq)]
pub struct DebugTraceLine {
    pub start: Vec3,
    pub end: Vec3,
    pub hit: bool,
    pub remaining_secs: f32,
}

impl DebugTraceLine {
    pub fn color(&self) -> Color {
        if self.hit {
            HIT_COLOR
        } else {
            MISS_COLOR
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct DebugTraceLog {
    lines: Vec<DebugTraceLine>,
    /// Lifetime given to newly recorded lines.
    pub duration_secs: f32,
}

impl Default for DebugTraceLog {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            duration_secs: 5.0,
        }
    }
}

impl DebugTraceLog {
    pub fn with_duration(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            ..Default::default()
        }
    }

    pub fn record(&mut self, start: Vec3, end: Vec3, hit: bool) {
        self.lines.push(DebugTraceLine {
            start,
            end,
            hit,
            remaining_secs: self.duration_secs,
        });
    }

    pub fn lines(&self) -> &[DebugTraceLine] {
        &self.lines
    }

    /// Age every line by `dt` and drop the expired ones.
    pub fn tick(&mut self, dt: f32) {
        for line in &mut self.lines {
            line.remaining_secs -= dt;
        }
        self.lines.retain(|l| l.remaining_secs > 0.0);
    }
}

/// Gizmo group for grab traces so their width is configurable independently of other gizmos.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct GrabTraceGizmos;

pub(crate) fn age_debug_traces(time: Res<Time>, mut log: ResMut<DebugTraceLog>) {
    log.tick(time.delta_secs());
}

pub(crate) fn draw_debug_traces(log: Res<DebugTraceLog>, mut gizmos: Gizmos<GrabTraceGizmos>) {
    for line in log.lines() {
        gizmos.line(line.start, line.end, line.color());
    }
}

pub(crate) fn configure_trace_gizmos(
    cfg: Res<gt_core::GameConfigRes>,
    mut store: ResMut<GizmoConfigStore>,
) {
    let (config, _) = store.config_mut::<GrabTraceGizmos>();
    config.line.width = cfg.grab.debug_thickness;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_expire_after_duration() {
        let mut log = DebugTraceLog::with_duration(5.0);
        log.record(Vec3::ZERO, Vec3::X, true);
        log.tick(2.0);
        log.record(Vec3::ZERO, Vec3::Y, false);
        log.tick(3.5);
        assert_eq!(log.lines().len(), 1, "first line expired at 5s");
        assert_eq!(log.lines()[0].end, Vec3::Y);
        assert_eq!(log.lines()[0].color(), MISS_COLOR);
        log.tick(2.0);
        assert!(log.lines().is_empty());
    }

    #[test]
    fn zero_duration_lines_vanish_on_next_tick() {
        let mut log = DebugTraceLog::with_duration(0.0);
        log.record(Vec3::ZERO, Vec3::X, true);
        assert_eq!(log.lines()[0].color(), HIT_COLOR);
        log.tick(0.0);
        assert!(log.lines().is_empty());
    }
}
