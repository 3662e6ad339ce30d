//! Interactable objects. Nothing implements a reaction yet; the trait marks the seam that
//! `BeginInteract` handlers will dispatch through.

use bevy::prelude::*;

pub trait Interactable: Send + Sync + 'static {}

/// Base actor for things the player may interact with.
#[derive(Component, Reflect, Debug, Default, Clone, Copy)]
#[reflect(Component, Default)]
pub struct InteractableBase;

impl Interactable for InteractableBase {}
