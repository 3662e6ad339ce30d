//! Physics handle: a soft position constraint that steers one dynamic body toward a target.
//!
//! Rapier has no built-in "grab" joint, so the handle drives the held body's velocity with a
//! damped spring every tick. Releasing just forgets the body; it keeps whatever velocity the
//! drive last gave it, which is what turns a release during a swing into a throw.

use bevy::ecs::entity::Entities;
use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

use crate::grab::{GrabConstraint, GrabController};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleDrive {
    pub linear_stiffness: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// 0 = uncapped.
    pub max_speed: f32,
}

impl From<&gt_config::GrabConfig> for HandleDrive {
    fn from(cfg: &gt_config::GrabConfig) -> Self {
        Self {
            linear_stiffness: cfg.linear_stiffness,
            linear_damping: cfg.linear_damping,
            angular_damping: cfg.angular_damping,
            max_speed: cfg.max_speed,
        }
    }
}

impl Default for HandleDrive {
    fn default() -> Self {
        Self::from(&gt_config::GrabConfig::default())
    }
}

impl HandleDrive {
    /// One drive step. Damping is integrated implicitly so large damping rates stay stable at
    /// any dt.
    pub fn step_linear(&self, position: Vec3, velocity: Vec3, target: Vec3, dt: f32) -> Vec3 {
        let spring = (target - position) * self.linear_stiffness;
        let mut v = (velocity + spring * dt) / (1.0 + self.linear_damping * dt);
        if self.max_speed > 0.0 {
            v = v.clamp_length_max(self.max_speed);
        }
        v
    }

    pub fn step_angular(&self, angvel: Vec3, dt: f32) -> Vec3 {
        angvel / (1.0 + self.angular_damping * dt)
    }
}

/// Constraint owned by the grabbing character.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct PhysicsHandle {
    grabbed: Option<Entity>,
    target: Vec3,
    pub drive: HandleDrive,
}

impl PhysicsHandle {
    pub fn new(drive: HandleDrive) -> Self {
        Self {
            drive,
            ..Default::default()
        }
    }

    pub fn grabbed(&self) -> Option<Entity> {
        self.grabbed
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }
}

impl GrabConstraint for PhysicsHandle {
    fn grab(&mut self, body: Entity, target: Vec3) {
        self.grabbed = Some(body);
        self.target = target;
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn release(&mut self) -> Option<Entity> {
        self.grabbed.take()
    }
}

/// Pull every held body toward its handle target. A body without `Velocity` gets one and is
/// driven from the next frame. A held body that was despawned releases the handle and clears
/// the owner's grab state.
pub fn drive_physics_handles(
    mut commands: Commands,
    time: Res<Time>,
    entities: &Entities,
    mut handles: Query<(&mut PhysicsHandle, &mut GrabController)>,
    mut bodies: Query<(&GlobalTransform, Option<&mut Velocity>), Without<PhysicsHandle>>,
) {
    let dt = time.delta_secs();
    for (mut handle, mut controller) in handles.iter_mut() {
        let Some(body) = handle.grabbed else { continue };
        match bodies.get_mut(body) {
            Ok((tf, Some(mut vel))) => {
                vel.linvel = handle
                    .drive
                    .step_linear(tf.translation(), vel.linvel, handle.target, dt);
                vel.angvel = handle.drive.step_angular(vel.angvel, dt);
            }
            Ok((_, None)) => {
                debug!(?body, "held body has no Velocity; inserting one");
                commands.entity(body).insert(Velocity::zero());
            }
            Err(_) if entities.contains(body) => {}
            Err(_) => {
                debug!(?body, "held body vanished; releasing handle");
                controller.release_grab(&mut *handle);
            }
        }
    }
}
