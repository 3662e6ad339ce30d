//! Player character: control rotation, walking/falling kinematics and jumping.
//!
//! Movement is integrated here and handed to Rapier's `KinematicCharacterController` as a
//! per-frame translation; Rapier resolves collisions and reports back whether the capsule
//! ended up grounded, which feeds the next frame's landing check.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;
use bevy_rapier3d::prelude::{
    CharacterLength, Collider, KinematicCharacterController, KinematicCharacterControllerOutput,
    RigidBody,
};
use gt_config::{CharacterConfig, GameConfig};
use gt_core::{GameConfigRes, PlayerCharacter};
use gt_input::InputMap;
use gt_physics::{GrabController, HandleDrive, PhysicsHandle};

use crate::camera::CameraBoom;

/// Controller orientation (radians). Yaw turns about +Y; positive pitch looks up.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlRotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl ControlRotation {
    /// Apply a look delta in degrees. Positive x turns right, positive y looks up.
    pub fn add_look(&mut self, delta_deg: Vec2, pitch_limit_deg: f32) {
        self.yaw = wrap_angle(self.yaw - delta_deg.x.to_radians());
        // NaN and negative limits lock pitch level.
        let limit = pitch_limit_deg.to_radians().max(0.0);
        self.pitch = (self.pitch + delta_deg.y.to_radians()).clamp(-limit, limit);
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Yaw-only rotation; the basis for movement input.
    pub fn yaw_quat(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct CharacterMovement {
    pub tuning: CharacterConfig,
    pub velocity: Vec3,
    pub grounded: bool,
    /// Jumps performed since last touching the ground.
    pub jump_count: u32,
    jump_held: bool,
    jump_hold_time: f32,
    pending_input: Vec3,
    last_input: Vec3,
}

impl CharacterMovement {
    pub fn new(tuning: CharacterConfig) -> Self {
        Self {
            tuning,
            velocity: Vec3::ZERO,
            grounded: false,
            jump_count: 0,
            jump_held: false,
            jump_hold_time: 0.0,
            pending_input: Vec3::ZERO,
            last_input: Vec3::ZERO,
        }
    }

    /// Accumulate world-space movement intent for this frame.
    pub fn add_movement_input(&mut self, world_dir: Vec3, scale: f32) {
        self.pending_input += world_dir * scale;
    }

    /// Acceleration direction used during the last step (zero when idle).
    pub fn last_input(&self) -> Vec3 {
        self.last_input
    }

    /// Start a jump if a jump slot is left. Walking off a ledge uses up the first slot.
    pub fn jump(&mut self) -> bool {
        if !self.grounded && self.jump_count == 0 {
            self.jump_count = 1;
        }
        if self.jump_count >= self.tuning.max_jump_count {
            return false;
        }
        self.jump_count += 1;
        self.velocity.y = self.tuning.jump_z_velocity;
        self.grounded = false;
        self.jump_held = true;
        self.jump_hold_time = 0.0;
        true
    }

    pub fn stop_jumping(&mut self) {
        self.jump_held = false;
    }

    /// Feed back the ground contact reported after the previous move.
    pub fn sync_ground(&mut self, grounded_now: bool) {
        if grounded_now && self.velocity.y <= 0.0 {
            if !self.grounded {
                debug!(jumps = self.jump_count, "Landed");
            }
            self.grounded = true;
            self.jump_count = 0;
            self.velocity.y = 0.0;
        } else if !grounded_now {
            self.grounded = false;
        }
    }

    /// Consume pending input, integrate one step, return the displacement to apply.
    pub fn step(&mut self, dt: f32, gravity_y: f32) -> Vec3 {
        let input = self.consume_input();
        self.last_input = input;

        let lateral = Vec3::new(self.velocity.x, 0.0, self.velocity.z);
        let desired = input * self.tuning.max_walk_speed;
        let has_input = input != Vec3::ZERO;
        let lateral = match (self.grounded, has_input) {
            (true, true) => move_towards(lateral, desired, self.tuning.max_acceleration * dt),
            (true, false) => move_towards(
                lateral,
                Vec3::ZERO,
                self.tuning.braking_deceleration_walking * dt,
            ),
            (false, true) => move_towards(
                lateral,
                desired,
                self.tuning.max_acceleration * self.tuning.air_control * dt,
            ),
            (false, false) => lateral,
        };

        let mut vy = self.velocity.y;
        if self.jump_held && self.jump_hold_time < self.tuning.jump_max_hold_time {
            self.jump_hold_time += dt;
            vy = self.tuning.jump_z_velocity;
        } else {
            vy += gravity_y * dt;
        }

        self.velocity = Vec3::new(lateral.x, vy, lateral.z);
        self.velocity * dt
    }

    fn consume_input(&mut self) -> Vec3 {
        let raw = Vec3::new(self.pending_input.x, 0.0, self.pending_input.z).clamp_length_max(1.0);
        self.pending_input = Vec3::ZERO;
        let len = raw.length();
        if len <= 1.0e-4 {
            return Vec3::ZERO;
        }
        let floor = if self.tuning.max_walk_speed > 0.0 {
            (self.tuning.min_analog_walk_speed / self.tuning.max_walk_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };
        if len < floor {
            raw * (floor / len)
        } else {
            raw
        }
    }
}

fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let len = delta.length();
    if len <= max_delta || len <= f32::EPSILON {
        target
    } else {
        current + delta / len * max_delta
    }
}

fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

/// Turn `rotation` toward `direction` (XZ plane) by at most `rate_deg * dt` degrees of yaw.
pub fn orient_to_movement(rotation: Quat, direction: Vec3, rate_deg: f32, dt: f32) -> Quat {
    if Vec2::new(direction.x, direction.z).length_squared() <= 1.0e-6 {
        return rotation;
    }
    let target = (-direction.x).atan2(-direction.z);
    let (current, _, _) = rotation.to_euler(EulerRot::YXZ);
    let delta = wrap_angle(target - current);
    let max_step = (rate_deg.to_radians() * dt).max(0.0);
    Quat::from_rotation_y(current + delta.clamp(-max_step, max_step))
}

/// Spawn the third-person character body. Visuals and the follow camera are attached by the caller.
pub fn spawn_third_person_character(commands: &mut Commands, cfg: &GameConfig, at: Vec3) -> Entity {
    let ch = &cfg.character;
    let radius = ch.capsule_radius.max(1.0);
    let cylinder_half = (ch.capsule_half_height - radius).max(0.0);
    commands
        .spawn((
            Name::new("ThirdPersonCharacter"),
            PlayerCharacter,
            Transform::from_translation(at),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(cylinder_half, radius),
            KinematicCharacterController {
                up: Vec3::Y,
                offset: CharacterLength::Absolute(1.0),
                snap_to_ground: Some(CharacterLength::Absolute(10.0)),
                ..default()
            },
            CharacterMovement::new(ch.clone()),
            ControlRotation::default(),
            CameraBoom::from_config(&cfg.camera),
            GrabController::default(),
            PhysicsHandle::new(HandleDrive::from(&cfg.grab)),
        ))
        .id()
}

pub(crate) fn apply_look_input(
    input: Res<InputMap>,
    cfg: Res<GameConfigRes>,
    mut q: Query<&mut ControlRotation, With<PlayerCharacter>>,
) {
    let look = input.axis2("Look");
    if look == Vec2::ZERO {
        return;
    }
    for mut control in q.iter_mut() {
        control.add_look(look, cfg.camera.pitch_limit_degrees);
    }
}

pub(crate) fn apply_move_input(
    input: Res<InputMap>,
    mut q: Query<(&ControlRotation, &mut CharacterMovement), With<PlayerCharacter>>,
) {
    let axis = input.axis2("Move");
    let jump = input.just_pressed("Jump");
    let stop = input.just_released("Jump");
    for (control, mut movement) in q.iter_mut() {
        if axis != Vec2::ZERO {
            let basis = control.yaw_quat();
            movement.add_movement_input(basis * Vec3::NEG_Z, axis.y);
            movement.add_movement_input(basis * Vec3::X, axis.x);
        }
        if jump && movement.jump() {
            debug!(count = movement.jump_count, "Jump");
        }
        if stop {
            movement.stop_jumping();
        }
    }
}

pub(crate) fn step_character_movement(
    time: Res<Time>,
    cfg: Res<GameConfigRes>,
    mut q: Query<(
        &mut CharacterMovement,
        &mut KinematicCharacterController,
        Option<&KinematicCharacterControllerOutput>,
        &mut Transform,
    )>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    for (mut movement, mut kcc, output, mut tf) in q.iter_mut() {
        if let Some(out) = output {
            movement.sync_ground(out.grounded);
        }
        let displacement = movement.step(dt, cfg.gravity.y);
        kcc.translation = Some(displacement);
        let facing = movement.last_input();
        let rate = movement.tuning.rotation_rate_yaw;
        tf.rotation = orient_to_movement(tf.rotation, facing, rate, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn grounded() -> CharacterMovement {
        let mut m = CharacterMovement::new(CharacterConfig::default());
        m.sync_ground(true);
        m
    }

    #[test]
    fn look_clamps_pitch() {
        let mut c = ControlRotation::default();
        c.add_look(Vec2::new(0.0, 200.0), 89.0);
        assert!((c.pitch - 89f32.to_radians()).abs() < 1e-5);
        c.add_look(Vec2::new(0.0, -400.0), 89.0);
        assert!((c.pitch + 89f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn look_right_turns_clockwise() {
        let mut c = ControlRotation::default();
        c.add_look(Vec2::new(90.0, 0.0), 89.0);
        let fwd = c.yaw_quat() * Vec3::NEG_Z;
        assert!(fwd.abs_diff_eq(Vec3::X, 1e-5), "{fwd:?}");
    }

    #[test]
    fn accelerates_then_caps_at_walk_speed() {
        let mut m = grounded();
        for _ in 0..120 {
            m.add_movement_input(Vec3::NEG_Z, 1.0);
            m.step(1.0 / 60.0, -980.0);
            m.sync_ground(true);
        }
        assert!((m.velocity.z + 500.0).abs() < 1e-2, "{:?}", m.velocity);
    }

    #[test]
    fn brakes_to_rest_without_input() {
        let mut m = grounded();
        m.velocity = Vec3::new(500.0, 0.0, 0.0);
        m.step(0.1, -980.0);
        assert!((m.velocity.x - 300.0).abs() < 1e-3);
        m.sync_ground(true);
        m.step(1.0, -980.0);
        assert_eq!(m.velocity.x, 0.0);
    }

    #[test]
    fn analog_floor_raises_tiny_input() {
        let mut m = grounded();
        m.add_movement_input(Vec3::X, 0.01);
        m.step(1.0 / 60.0, 0.0);
        // 20 / 500 = 0.04 of full deflection.
        assert!((m.last_input().length() - 0.04).abs() < 1e-5);
    }

    #[test]
    fn air_control_scales_acceleration() {
        let mut m = CharacterMovement::new(CharacterConfig::default());
        m.add_movement_input(Vec3::X, 1.0);
        m.step(0.1, 0.0);
        let expected = 2048.0 * 0.35 * 0.1;
        assert!((m.velocity.x - expected).abs() < 1e-2, "{:?}", m.velocity);
    }

    #[test]
    fn double_jump_then_exhausted_until_landing() {
        let mut m = grounded();
        assert!(m.jump());
        assert!(m.jump());
        assert!(!m.jump());
        assert_eq!(m.jump_count, 2);
        m.velocity.y = -10.0;
        m.sync_ground(true);
        assert_eq!(m.jump_count, 0);
        assert!(m.jump());
    }

    #[test]
    fn walking_off_ledge_consumes_first_jump() {
        let mut m = CharacterMovement::new(CharacterConfig::default());
        assert!(!m.grounded);
        assert!(m.jump());
        assert_eq!(m.jump_count, 2);
        assert!(!m.jump());
    }

    #[test]
    fn ground_report_while_rising_does_not_land() {
        let mut m = grounded();
        m.jump();
        m.sync_ground(true);
        assert!(!m.grounded);
        assert_eq!(m.jump_count, 1);
    }

    #[test]
    fn held_jump_sustains_launch_velocity() {
        let tuning = CharacterConfig {
            jump_max_hold_time: 0.2,
            ..Default::default()
        };
        let mut m = CharacterMovement::new(tuning);
        m.sync_ground(true);
        m.jump();
        m.step(0.1, -980.0);
        assert_eq!(m.velocity.y, 700.0);
        m.stop_jumping();
        m.step(0.1, -980.0);
        assert!((m.velocity.y - 602.0).abs() < 1e-3);
    }

    #[test]
    fn orientation_turns_at_limited_rate() {
        let r = orient_to_movement(Quat::IDENTITY, Vec3::X, 90.0, 0.5);
        let (yaw, _, _) = r.to_euler(EulerRot::YXZ);
        assert!((yaw + 45f32.to_radians()).abs() < 1e-4, "{yaw}");
        let r = orient_to_movement(Quat::IDENTITY, Vec3::X, 500.0, 1.0);
        let fwd = r * Vec3::NEG_Z;
        assert!(fwd.abs_diff_eq(Vec3::X, 1e-4));
        let (yaw, _, _) = r.to_euler(EulerRot::YXZ);
        assert!((yaw + FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn negative_pitch_limit_locks_pitch_level() {
        let mut c = ControlRotation::default();
        c.add_look(Vec2::new(30.0, 45.0), -10.0);
        assert_eq!(c.pitch, 0.0);
        c.add_look(Vec2::new(0.0, -45.0), f32::NAN);
        assert_eq!(c.pitch, 0.0);
        assert!((c.yaw + 30f32.to_radians()).abs() < 1e-5, "yaw still turns: {}", c.yaw);
    }

    #[test]
    fn negative_rotation_rate_does_not_turn() {
        let q = Quat::from_rotation_y(0.3);
        let r = orient_to_movement(q, Vec3::X, -500.0, 1.0 / 60.0);
        assert!(r.abs_diff_eq(q, 1e-5), "{r:?}");
        let r = orient_to_movement(q, Vec3::X, 500.0, -1.0);
        assert!(r.abs_diff_eq(q, 1e-5), "{r:?}");
    }

    #[test]
    fn idle_keeps_orientation() {
        let q = Quat::from_rotation_y(1.0);
        assert_eq!(orient_to_movement(q, Vec3::ZERO, 500.0, 1.0), q);
    }
}
