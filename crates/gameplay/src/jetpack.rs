use bevy::prelude::*;

/// Jetpack pickup. Carries no behavior.
#[derive(Component, Reflect, Debug, Default, Clone, Copy)]
#[reflect(Component, Default)]
pub struct JetPackActor;
