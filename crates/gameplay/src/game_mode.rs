//! Game mode: picks the default pawn and lays out the test level.
//!
//! The level is a static floor plus a handful of dynamic boxes scattered around the player
//! start so the grab flow has something to pick up. Placement is deterministic under a given
//! [`RngSeed`].

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, RigidBody, Velocity};
use gt_config::GameModeConfig;
use gt_core::{GameConfigRes, PhysicsProp, RngSeed};
use rand::{Rng, SeedableRng};

use crate::camera::FollowCamera;
use crate::character::spawn_third_person_character;

/// Props never spawn closer than this to the player start.
const PROP_CLEAR_RADIUS: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PawnClass {
    #[default]
    ThirdPersonCharacter,
}

impl PawnClass {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ThirdPersonCharacter" | "BP_ThirdPersonCharacter" => Some(Self::ThirdPersonCharacter),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ThirdPersonCharacter => "ThirdPersonCharacter",
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameMode {
    pub default_pawn: PawnClass,
}

impl GameMode {
    pub fn from_config(cfg: &GameModeConfig) -> Result<Self, String> {
        PawnClass::from_name(&cfg.default_pawn)
            .map(|default_pawn| Self { default_pawn })
            .ok_or_else(|| format!("unknown default_pawn '{}'", cfg.default_pawn))
    }
}

/// Scatter positions for `count` props on the XZ plane around `center`, inside `radius`.
pub fn prop_positions(center: Vec3, count: usize, radius: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let inner = PROP_CLEAR_RADIUS.min(radius);
    (0..count)
        .map(|_| {
            let angle = rng.gen::<f32>() * std::f32::consts::TAU;
            let dist = if radius > inner {
                rng.gen_range(inner..radius)
            } else {
                inner
            };
            center + Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist)
        })
        .collect()
}

pub(crate) fn spawn_level(
    mut commands: Commands,
    cfg: Res<GameConfigRes>,
    seed: Res<RngSeed>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let gm = &cfg.game_mode;
    let mut visuals = meshes.zip(materials);

    let floor = commands
        .spawn((
            Name::new("Floor"),
            RigidBody::Fixed,
            Collider::cuboid(gm.floor_half_extent, 5.0, gm.floor_half_extent),
            Transform::from_xyz(0.0, -5.0, 0.0),
        ))
        .id();
    if let Some((meshes, materials)) = visuals.as_mut() {
        commands.entity(floor).insert((
            Mesh3d(meshes.add(Cuboid::new(
                gm.floor_half_extent * 2.0,
                10.0,
                gm.floor_half_extent * 2.0,
            ))),
            MeshMaterial3d(materials.add(Color::srgb(0.35, 0.37, 0.4))),
        ));
    }

    let half = gm.prop_size * 0.5;
    let start = Vec3::from_array(gm.player_start);
    let ground = Vec3::new(start.x, half, start.z);
    let prop_visual = visuals.as_mut().map(|(meshes, materials)| {
        (
            meshes.add(Cuboid::new(gm.prop_size, gm.prop_size, gm.prop_size)),
            materials.add(Color::srgb(0.85, 0.45, 0.15)),
        )
    });
    for (i, pos) in prop_positions(ground, gm.prop_count, gm.prop_scatter_radius, seed.0)
        .into_iter()
        .enumerate()
    {
        let prop = commands
            .spawn((
                Name::new(format!("Prop{i}")),
                PhysicsProp,
                RigidBody::Dynamic,
                Collider::cuboid(half, half, half),
                Velocity::zero(),
                Transform::from_translation(pos),
            ))
            .id();
        if let Some((mesh, material)) = &prop_visual {
            commands
                .entity(prop)
                .insert((Mesh3d(mesh.clone()), MeshMaterial3d(material.clone())));
        }
    }

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(300.0, 800.0, 400.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    info!(props = gm.prop_count, seed = seed.0, "Level spawned");
}

pub(crate) fn spawn_default_pawn(
    mut commands: Commands,
    mode: Res<GameMode>,
    cfg: Res<GameConfigRes>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let start = Vec3::from_array(cfg.game_mode.player_start);
    let pawn = match mode.default_pawn {
        PawnClass::ThirdPersonCharacter => spawn_third_person_character(&mut commands, &cfg, start),
    };
    if let (Some(mut meshes), Some(mut materials)) = (meshes, materials) {
        let ch = &cfg.character;
        let radius = ch.capsule_radius.max(1.0);
        commands.entity(pawn).insert((
            Mesh3d(meshes.add(Capsule3d::new(
                radius,
                (ch.capsule_half_height - radius).max(0.0) * 2.0,
            ))),
            MeshMaterial3d(materials.add(Color::srgb(0.2, 0.5, 0.9))),
        ));
    }
    commands.spawn((
        Name::new("FollowCamera"),
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: cfg.camera.fov_degrees.to_radians(),
            ..default()
        }),
        FollowCamera { target: pawn },
        Transform::from_translation(
            start + Vec3::new(0.0, cfg.camera.pivot_height, cfg.camera.arm_length),
        ),
    ));
    info!(pawn = mode.default_pawn.name(), ?start, "Default pawn spawned");
}
