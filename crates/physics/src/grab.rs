//! Grab-and-throw controller.
//!
//! The controller is a single-slot state machine: it traces forward from the actor, attaches
//! the first dynamic body it hits to a position constraint, retargets that constraint every
//! tick while held, and detaches it on release. The physics world is reached only through the
//! [`PhysicsQuery`] and [`GrabConstraint`] seams, so the flow runs identically against Rapier
//! ([`crate::query::RapierPhysicsQuery`] + [`crate::handle::PhysicsHandle`]) and against test
//! doubles.
//!
//! Every operation is safe to call on any tick in any state; failures are no-op outcomes.

use bevy::prelude::*;

use crate::debug_trace::DebugTraceLog;

/// Forward trace segment: from the actor position along its forward vector for `range` units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRay {
    pub origin: Vec3,
    pub end: Vec3,
}

impl InteractionRay {
    pub fn from_pose(actor: &Transform, range: f32) -> Self {
        let origin = actor.translation;
        Self {
            origin,
            end: origin + actor.forward() * range,
        }
    }

    pub fn length(&self) -> f32 {
        self.origin.distance(self.end)
    }

    /// Unit direction, or `None` for a degenerate (zero-length) segment.
    pub fn direction(&self) -> Option<Dir3> {
        Dir3::new(self.end - self.origin).ok()
    }
}

/// What a physics-body trace found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    pub body: Entity,
    pub point: Vec3,
    pub distance: f32,
    /// World position of the hit body itself (not the impact point).
    pub body_location: Vec3,
}

/// Ray query restricted to physically simulated bodies. `ignore` is a body the ray passes
/// through, such as the one already held.
pub trait PhysicsQuery {
    fn cast_physics_ray(
        &self,
        origin: Vec3,
        dir: Dir3,
        max_distance: f32,
        ignore: Option<Entity>,
    ) -> Option<TraceHit>;
}

/// Position constraint that drags one body toward a target.
pub trait GrabConstraint {
    fn grab(&mut self, body: Entity, target: Vec3);
    fn set_target(&mut self, target: Vec3);
    /// Detach the held body, returning it if one was attached.
    fn release(&mut self) -> Option<Entity>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrabOutcome {
    Grabbed {
        body: Entity,
        target: Vec3,
        /// Body that was held before this grab and got released to make room.
        released_previous: Option<Entity>,
    },
    Missed,
}

/// Grab state owned by a character.
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct GrabController {
    grabbing: bool,
    held: Option<Entity>,
}

impl GrabController {
    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    pub fn held(&self) -> Option<Entity> {
        self.held
    }

    /// Trace forward for `range` units and pick up the first dynamic body hit.
    ///
    /// The constraint target starts at the body's own location so the object does not snap
    /// to the impact point. The body already held is transparent to the trace. A non-positive
    /// range never grabs. With `debug` set, the traced segment is recorded in `traces` whether
    /// or not it hit.
    pub fn attempt_grab<Q, C>(
        &mut self,
        actor: &Transform,
        range: f32,
        debug: bool,
        query: &Q,
        constraint: &mut C,
        traces: &mut DebugTraceLog,
    ) -> GrabOutcome
    where
        Q: PhysicsQuery + ?Sized,
        C: GrabConstraint + ?Sized,
    {
        let ray = InteractionRay::from_pose(actor, range);
        let hit = match ray.direction() {
            Some(dir) if range > 0.0 => query.cast_physics_ray(ray.origin, dir, range, self.held),
            _ => None,
        };
        if debug {
            traces.record(ray.origin, ray.end, hit.is_some());
        }
        let Some(hit) = hit else {
            return GrabOutcome::Missed;
        };

        let released_previous = if self.grabbing {
            self.release_grab(constraint)
        } else {
            None
        };
        constraint.grab(hit.body, hit.body_location);
        self.grabbing = true;
        self.held = Some(hit.body);
        GrabOutcome::Grabbed {
            body: hit.body,
            target: hit.body_location,
            released_previous,
        }
    }

    /// Drop the held body. No-op (and no constraint call) when nothing is held.
    pub fn release_grab<C: GrabConstraint + ?Sized>(
        &mut self,
        constraint: &mut C,
    ) -> Option<Entity> {
        if !self.grabbing {
            return None;
        }
        let released = constraint.release().or(self.held);
        self.grabbing = false;
        self.held = None;
        released
    }

    /// Move the constraint target to the forward endpoint of the actor's current pose.
    /// Returns the new target, or `None` (without touching the constraint) when not grabbing.
    pub fn update_grab_target<C: GrabConstraint + ?Sized>(
        &mut self,
        actor: &Transform,
        range: f32,
        constraint: &mut C,
    ) -> Option<Vec3> {
        if !self.grabbing {
            return None;
        }
        let end = InteractionRay::from_pose(actor, range).end;
        constraint.set_target(end);
        Some(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    struct Body {
        entity: Entity,
        center: Vec3,
        radius: f32,
        dynamic: bool,
    }

    /// Sphere world; only dynamic bodies are visible to the trace, like the Rapier filter.
    #[derive(Default)]
    struct SphereWorld {
        bodies: Vec<Body>,
    }

    impl SphereWorld {
        fn with(mut self, id: u32, center: Vec3, dynamic: bool) -> Self {
            self.bodies.push(Body {
                entity: Entity::from_raw(id),
                center,
                radius: 25.0,
                dynamic,
            });
            self
        }
    }

    impl PhysicsQuery for SphereWorld {
        fn cast_physics_ray(
            &self,
            origin: Vec3,
            dir: Dir3,
            max_distance: f32,
            ignore: Option<Entity>,
        ) -> Option<TraceHit> {
            self.bodies
                .iter()
                .filter(|b| b.dynamic && Some(b.entity) != ignore)
                .filter_map(|b| {
                    let to_center = b.center - origin;
                    let along = to_center.dot(*dir);
                    let closest_sq = to_center.length_squared() - along * along;
                    let r_sq = b.radius * b.radius;
                    if closest_sq > r_sq {
                        return None;
                    }
                    let t = along - (r_sq - closest_sq).sqrt();
                    (0.0..=max_distance).contains(&t).then(|| TraceHit {
                        body: b.entity,
                        point: origin + *dir * t,
                        distance: t,
                        body_location: b.center,
                    })
                })
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
        }
    }

    #[derive(Default, Debug)]
    struct RecordingConstraint {
        held: Option<Entity>,
        target: Option<Vec3>,
        grabs: u32,
        retargets: u32,
        releases: u32,
    }

    impl GrabConstraint for RecordingConstraint {
        fn grab(&mut self, body: Entity, target: Vec3) {
            self.held = Some(body);
            self.target = Some(target);
            self.grabs += 1;
        }
        fn set_target(&mut self, target: Vec3) {
            self.target = Some(target);
            self.retargets += 1;
        }
        fn release(&mut self) -> Option<Entity> {
            self.releases += 1;
            self.held.take()
        }
    }

    fn facing_pos_x() -> Transform {
        Transform::from_rotation(Quat::from_rotation_y(-FRAC_PI_2))
    }

    fn grab_at_300() -> (GrabController, RecordingConstraint, SphereWorld) {
        let world = SphereWorld::default().with(7, Vec3::new(300.0, 0.0, 0.0), true);
        (GrabController::default(), RecordingConstraint::default(), world)
    }

    #[test]
    fn ray_projects_along_forward() {
        let ray = InteractionRay::from_pose(&facing_pos_x(), 500.0);
        assert!(ray.end.abs_diff_eq(Vec3::new(500.0, 0.0, 0.0), 1e-3), "{ray:?}");
        assert!((ray.length() - 500.0).abs() < 1e-3);
        assert!(InteractionRay::from_pose(&facing_pos_x(), 0.0).direction().is_none());
    }

    #[test]
    fn grabs_dynamic_object_in_range_at_its_own_location() {
        let (mut ctl, mut constraint, world) = grab_at_300();
        let mut traces = DebugTraceLog::default();
        let outcome = ctl.attempt_grab(
            &facing_pos_x(),
            500.0,
            false,
            &world,
            &mut constraint,
            &mut traces,
        );

        let body = Entity::from_raw(7);
        assert_eq!(
            outcome,
            GrabOutcome::Grabbed {
                body,
                target: Vec3::new(300.0, 0.0, 0.0),
                released_previous: None,
            }
        );
        assert!(ctl.is_grabbing());
        assert_eq!(ctl.held(), Some(body));
        // Target is the body center, not the impact point at x = 275.
        assert_eq!(constraint.target, Some(Vec3::new(300.0, 0.0, 0.0)));
        assert_eq!(constraint.grabs, 1);
        assert!(traces.lines().is_empty(), "debug disabled -> nothing recorded");
    }

    #[test]
    fn static_object_is_not_grabbable() {
        let world = SphereWorld::default().with(3, Vec3::new(300.0, 0.0, 0.0), false);
        let mut ctl = GrabController::default();
        let mut constraint = RecordingConstraint::default();
        let mut traces = DebugTraceLog::default();
        let outcome = ctl.attempt_grab(
            &facing_pos_x(),
            500.0,
            true,
            &world,
            &mut constraint,
            &mut traces,
        );
        assert_eq!(outcome, GrabOutcome::Missed);
        assert!(!ctl.is_grabbing());
        assert_eq!(constraint.grabs, 0);
        let line = &traces.lines()[0];
        assert!(!line.hit, "miss must be recorded as a miss");
    }

    #[test]
    fn out_of_range_object_misses() {
        let (mut ctl, mut constraint, world) = grab_at_300();
        let mut traces = DebugTraceLog::default();
        let outcome = ctl.attempt_grab(
            &facing_pos_x(),
            200.0,
            false,
            &world,
            &mut constraint,
            &mut traces,
        );
        assert_eq!(outcome, GrabOutcome::Missed);
        assert!(!ctl.is_grabbing());
    }

    #[test]
    fn non_positive_range_never_grabs() {
        // Object straddling the origin and one behind the actor: neither a zero-length nor a
        // reversed trace may grab.
        let world = SphereWorld::default()
            .with(1, Vec3::ZERO, true)
            .with(2, Vec3::new(-300.0, 0.0, 0.0), true);
        for range in [0.0, -1.0, -300.0, -1000.0] {
            let mut ctl = GrabController::default();
            let mut constraint = RecordingConstraint::default();
            let mut traces = DebugTraceLog::default();
            let outcome = ctl.attempt_grab(
                &facing_pos_x(),
                range,
                true,
                &world,
                &mut constraint,
                &mut traces,
            );
            assert_eq!(outcome, GrabOutcome::Missed, "range {range}");
            assert!(!ctl.is_grabbing(), "range {range}");
            assert_eq!(constraint.grabs, 0);
            assert_eq!(traces.lines().len(), 1, "debug trace still recorded for range {range}");
        }
    }

    #[test]
    fn debug_trace_records_hit_segment() {
        let (mut ctl, mut constraint, world) = grab_at_300();
        let mut traces = DebugTraceLog::default();
        ctl.attempt_grab(&facing_pos_x(), 500.0, true, &world, &mut constraint, &mut traces);
        let line = &traces.lines()[0];
        assert!(line.hit);
        assert_eq!(line.start, Vec3::ZERO);
        assert!(line.end.abs_diff_eq(Vec3::new(500.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn release_when_idle_is_a_noop() {
        let mut ctl = GrabController::default();
        let mut constraint = RecordingConstraint::default();
        assert_eq!(ctl.release_grab(&mut constraint), None);
        assert_eq!(ctl.release_grab(&mut constraint), None);
        assert!(!ctl.is_grabbing());
        assert_eq!(constraint.releases, 0, "no constraint operation while idle");
    }

    #[test]
    fn release_after_grab_detaches_exactly_once() {
        let (mut ctl, mut constraint, world) = grab_at_300();
        let mut traces = DebugTraceLog::default();
        ctl.attempt_grab(&facing_pos_x(), 500.0, false, &world, &mut constraint, &mut traces);

        assert_eq!(ctl.release_grab(&mut constraint), Some(Entity::from_raw(7)));
        assert!(!ctl.is_grabbing());
        assert_eq!(ctl.held(), None);
        assert_eq!(constraint.releases, 1);

        ctl.release_grab(&mut constraint);
        assert_eq!(constraint.releases, 1, "second release is a no-op");
    }

    #[test]
    fn update_while_idle_never_touches_constraint() {
        let mut ctl = GrabController::default();
        let mut constraint = RecordingConstraint::default();
        for _ in 0..10 {
            assert_eq!(ctl.update_grab_target(&facing_pos_x(), 500.0, &mut constraint), None);
        }
        assert_eq!(constraint.retargets, 0);
        assert_eq!(constraint.target, None);
    }

    #[test]
    fn update_follows_rotated_pose() {
        let (mut ctl, mut constraint, world) = grab_at_300();
        let mut traces = DebugTraceLog::default();
        let mut actor = facing_pos_x();
        ctl.attempt_grab(&actor, 500.0, false, &world, &mut constraint, &mut traces);

        // Turn a further 90 degrees: forward goes from +X to +Z.
        actor.rotate_y(-FRAC_PI_2);
        let target = ctl
            .update_grab_target(&actor, 500.0, &mut constraint)
            .expect("grabbing");
        assert!(target.abs_diff_eq(Vec3::new(0.0, 0.0, 500.0), 1e-2), "{target:?}");
        assert_eq!(constraint.target, Some(target));

        // Moving the actor moves the target with it.
        actor.translation = Vec3::new(100.0, 50.0, 0.0);
        let moved = ctl.update_grab_target(&actor, 500.0, &mut constraint).expect("grabbing");
        assert!(moved.abs_diff_eq(Vec3::new(100.0, 50.0, 500.0), 1e-2), "{moved:?}");
        assert_eq!(constraint.retargets, 2);
    }

    #[test]
    fn regrab_releases_previous_body_first() {
        let world = SphereWorld::default()
            .with(1, Vec3::new(300.0, 0.0, 0.0), true)
            .with(2, Vec3::new(0.0, 0.0, 300.0), true);
        let mut ctl = GrabController::default();
        let mut constraint = RecordingConstraint::default();
        let mut traces = DebugTraceLog::default();
        let mut actor = facing_pos_x();
        ctl.attempt_grab(&actor, 500.0, false, &world, &mut constraint, &mut traces);

        actor.rotate_y(-FRAC_PI_2);
        let outcome = ctl.attempt_grab(&actor, 500.0, false, &world, &mut constraint, &mut traces);
        assert_eq!(
            outcome,
            GrabOutcome::Grabbed {
                body: Entity::from_raw(2),
                target: Vec3::new(0.0, 0.0, 300.0),
                released_previous: Some(Entity::from_raw(1)),
            }
        );
        assert_eq!(constraint.releases, 1);
        assert_eq!(constraint.held, Some(Entity::from_raw(2)));
    }

    #[test]
    fn failed_regrab_keeps_current_hold() {
        let (mut ctl, mut constraint, world) = grab_at_300();
        let mut traces = DebugTraceLog::default();
        let mut actor = facing_pos_x();
        ctl.attempt_grab(&actor, 500.0, false, &world, &mut constraint, &mut traces);
        actor.rotate_y(FRAC_PI_2);
        assert_eq!(
            ctl.attempt_grab(&actor, 500.0, false, &world, &mut constraint, &mut traces),
            GrabOutcome::Missed
        );
        assert!(ctl.is_grabbing());
        assert_eq!(constraint.releases, 0);
    }

    #[test]
    fn regrab_traces_past_the_held_body() {
        let world = SphereWorld::default()
            .with(1, Vec3::new(200.0, 0.0, 0.0), true)
            .with(2, Vec3::new(400.0, 0.0, 0.0), true);
        let mut ctl = GrabController::default();
        let mut constraint = RecordingConstraint::default();
        let mut traces = DebugTraceLog::default();
        let actor = facing_pos_x();
        ctl.attempt_grab(&actor, 500.0, false, &world, &mut constraint, &mut traces);
        assert_eq!(ctl.held(), Some(Entity::from_raw(1)));

        let outcome = ctl.attempt_grab(&actor, 500.0, false, &world, &mut constraint, &mut traces);
        assert_eq!(
            outcome,
            GrabOutcome::Grabbed {
                body: Entity::from_raw(2),
                target: Vec3::new(400.0, 0.0, 0.0),
                released_previous: Some(Entity::from_raw(1)),
            }
        );
    }

    #[test]
    fn regrab_with_only_the_held_body_ahead_keeps_it() {
        let (mut ctl, mut constraint, world) = grab_at_300();
        let mut traces = DebugTraceLog::default();
        let actor = facing_pos_x();
        ctl.attempt_grab(&actor, 500.0, false, &world, &mut constraint, &mut traces);
        assert_eq!(
            ctl.attempt_grab(&actor, 500.0, false, &world, &mut constraint, &mut traces),
            GrabOutcome::Missed
        );
        assert_eq!(ctl.held(), Some(Entity::from_raw(7)));
        assert_eq!((constraint.grabs, constraint.releases), (1, 0));
    }
}
