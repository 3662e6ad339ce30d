use bevy::prelude::*;
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Binary,
    Axis2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(pub u16); // index into InputMap::actions / dynamic_states

#[derive(Debug, Clone)]
pub struct ActionMeta {
    pub id: ActionId,
    pub name: String,
    pub description: String,
    pub kind: ActionKind,
}

/// Started / ongoing / completed view of a button-like action.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct ActionStateBinary {
    pub pressed: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}
impl ActionStateBinary {
    pub fn clear_transitions(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }

    pub(crate) fn apply(&mut self, active: bool) {
        if active && !self.pressed {
            self.just_pressed = true;
        } else if !active && self.pressed {
            self.just_released = true;
        }
        self.pressed = active;
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct ActionStateAxis2 {
    pub value: Vec2,
    pub active: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}
impl ActionStateAxis2 {
    pub fn clear_transitions(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }

    pub(crate) fn apply(&mut self, value: Vec2) {
        let active = value != Vec2::ZERO;
        if active && !self.active {
            self.just_pressed = true;
        } else if !active && self.active {
            self.just_released = true;
        }
        self.active = active;
        self.value = value;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionDynamicState {
    Binary(ActionStateBinary),
    Axis2(ActionStateAxis2),
}
impl ActionDynamicState {
    pub fn for_kind(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Binary => Self::Binary(ActionStateBinary::default()),
            ActionKind::Axis2 => Self::Axis2(ActionStateAxis2::default()),
        }
    }
    pub fn clear_transitions(&mut self) {
        match self {
            Self::Binary(b) => b.clear_transitions(),
            Self::Axis2(a) => a.clear_transitions(),
        }
    }
    pub fn as_binary_mut(&mut self) -> Option<&mut ActionStateBinary> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }
    pub fn as_axis2_mut(&mut self) -> Option<&mut ActionStateAxis2> {
        match self {
            Self::Axis2(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawBindingToken {
    Key(KeyCode),
    MouseBtn(MouseButton),
}

/// One chord (all tokens held) driving a binary action.
#[derive(Debug, Clone)]
pub struct Binding {
    pub id: u32,
    pub action: ActionId,
    pub tokens: SmallVec<[RawBindingToken; 2]>,
}

#[derive(Debug, Default, Clone)]
pub struct BindingRuntime {
    pub active: bool,
}

/// Four digital inputs composed into a 2D axis (e.g. WASD -> Move).
#[derive(Debug, Clone)]
pub struct KeyAxis2 {
    pub action: ActionId,
    pub up: RawBindingToken,
    pub down: RawBindingToken,
    pub left: RawBindingToken,
    pub right: RawBindingToken,
    pub scale: f32,
}

/// Raw mouse motion routed into a 2D axis (e.g. Look).
#[derive(Debug, Clone)]
pub struct MouseAxis2 {
    pub action: ActionId,
    pub scale: f32,
    pub invert_y: bool,
}

#[derive(Resource, Debug, Default)]
pub struct InputMap {
    pub actions: Vec<ActionMeta>,
    pub name_to_id: HashMap<String, ActionId>,
    pub bindings: Vec<Binding>,
    pub bindings_runtime: Vec<BindingRuntime>,
    pub key_axes: Vec<KeyAxis2>,
    pub mouse_axes: Vec<MouseAxis2>,
    pub dynamic_states: Vec<ActionDynamicState>,
    pub frame_counter: u64,
}

impl InputMap {
    pub fn get_state(&self, name: &str) -> Option<&ActionDynamicState> {
        let id = self.name_to_id.get(name)?;
        self.dynamic_states.get(id.0 as usize)
    }

    fn get_state_mut(&mut self, name: &str) -> Option<&mut ActionDynamicState> {
        let id = self.name_to_id.get(name)?;
        self.dynamic_states.get_mut(id.0 as usize)
    }

    pub fn pressed(&self, name: &str) -> bool {
        match self.get_state(name) {
            Some(ActionDynamicState::Binary(b)) => b.pressed,
            Some(ActionDynamicState::Axis2(a)) => a.active,
            None => false,
        }
    }

    pub fn just_pressed(&self, name: &str) -> bool {
        match self.get_state(name) {
            Some(ActionDynamicState::Binary(b)) => b.just_pressed,
            Some(ActionDynamicState::Axis2(a)) => a.just_pressed,
            None => false,
        }
    }

    pub fn just_released(&self, name: &str) -> bool {
        match self.get_state(name) {
            Some(ActionDynamicState::Binary(b)) => b.just_released,
            Some(ActionDynamicState::Axis2(a)) => a.just_released,
            None => false,
        }
    }

    pub fn axis2(&self, name: &str) -> Vec2 {
        match self.get_state(name) {
            Some(ActionDynamicState::Axis2(a)) => a.value,
            _ => Vec2::ZERO,
        }
    }

    /// Drive a binary action directly (scripted input, tests). Returns false for unknown or
    /// mismatched actions.
    pub fn set_binary(&mut self, name: &str, pressed: bool) -> bool {
        match self.get_state_mut(name).and_then(|s| s.as_binary_mut()) {
            Some(b) => {
                b.apply(pressed);
                true
            }
            None => false,
        }
    }

    /// Drive an axis action directly (scripted input, tests).
    pub fn set_axis2(&mut self, name: &str, value: Vec2) -> bool {
        match self.get_state_mut(name).and_then(|s| s.as_axis2_mut()) {
            Some(a) => {
                a.apply(value);
                true
            }
            None => false,
        }
    }

    pub fn clear_transitions(&mut self) {
        for st in &mut self.dynamic_states {
            st.clear_transitions();
        }
    }
}
