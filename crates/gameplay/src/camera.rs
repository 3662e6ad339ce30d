//! Spring-arm follow camera.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{QueryFilter, ReadRapierContext};
use gt_config::CameraConfig;

use crate::character::ControlRotation;

/// Camera arm carried by the character. The arm hangs behind the pivot along the control
/// rotation and shortens when static geometry sits between the pivot and the camera.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraBoom {
    pub target_arm_length: f32,
    pub probe_radius: f32,
    pub pivot_offset: Vec3,
    /// Follow the controller rotation instead of the body rotation.
    pub use_pawn_control_rotation: bool,
}

impl CameraBoom {
    pub fn from_config(cfg: &CameraConfig) -> Self {
        Self {
            target_arm_length: cfg.arm_length,
            probe_radius: cfg.probe_radius,
            pivot_offset: Vec3::new(0.0, cfg.pivot_height, 0.0),
            use_pawn_control_rotation: true,
        }
    }

    pub fn pivot(&self, owner: &Transform) -> Vec3 {
        owner.translation + self.pivot_offset
    }

    /// Unobstructed arm length. A negative configured length collapses to zero.
    pub fn max_length(&self) -> f32 {
        self.target_arm_length.max(0.0)
    }

    /// Arm length after pulling in for an obstruction `hit_distance` along the arm.
    pub fn resolve_length(&self, hit_distance: Option<f32>) -> f32 {
        let max = self.max_length();
        match hit_distance {
            Some(d) => (d - self.probe_radius.max(0.0)).clamp(0.0, max),
            None => max,
        }
    }

    pub fn camera_transform(&self, pivot: Vec3, orientation: Quat, arm_length: f32) -> Transform {
        Transform::from_translation(pivot + orientation * Vec3::Z * arm_length)
            .with_rotation(orientation)
    }
}

/// The camera entity following `target`'s boom.
#[derive(Component, Debug, Clone, Copy)]
pub struct FollowCamera {
    pub target: Entity,
}

pub(crate) fn update_follow_camera(
    rapier: ReadRapierContext,
    owners: Query<(&Transform, &CameraBoom, Option<&ControlRotation>), Without<FollowCamera>>,
    mut cameras: Query<(&FollowCamera, &mut Transform)>,
) {
    let context = rapier.single().ok();
    for (follow, mut cam_tf) in cameras.iter_mut() {
        let Ok((owner_tf, boom, control)) = owners.get(follow.target) else {
            continue;
        };
        let orientation = match control {
            Some(c) if boom.use_pawn_control_rotation => c.quat(),
            _ => owner_tf.rotation,
        };
        let pivot = boom.pivot(owner_tf);
        let back = orientation * Vec3::Z;
        // Only fixed geometry blocks the arm; props and the character itself never do.
        let hit = context.as_ref().and_then(|ctx| {
            ctx.cast_ray(pivot, back, boom.max_length(), true, QueryFilter::only_fixed())
                .map(|(_, toi)| toi)
        });
        *cam_tf = boom.camera_transform(pivot, orientation, boom.resolve_length(hit));
    }
}
