//! Systems for input action evaluation.
use super::types::*;
use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

/// Fold one frame of raw device state into the action states.
/// `is_down` answers whether a key / button token is currently held.
pub fn evaluate_actions(
    input_map: &mut InputMap,
    is_down: impl Fn(RawBindingToken) -> bool,
    mouse_delta: Vec2,
) {
    input_map.frame_counter += 1;
    input_map.clear_transitions();

    let action_count = input_map.actions.len();
    let mut binary_active = vec![false; action_count];
    for binding in &input_map.bindings {
        let all_down = binding.tokens.iter().all(|t| is_down(*t));
        if let Some(rt) = input_map.bindings_runtime.get_mut(binding.id as usize) {
            rt.active = all_down;
        }
        if all_down {
            binary_active[binding.action.0 as usize] = true;
        }
    }

    let mut axis_values = vec![Vec2::ZERO; action_count];
    for axis in &input_map.key_axes {
        let axis_of = |pos: RawBindingToken, neg: RawBindingToken| -> f32 {
            let mut v = 0.0;
            if is_down(pos) {
                v += 1.0;
            }
            if is_down(neg) {
                v -= 1.0;
            }
            v
        };
        let raw = Vec2::new(axis_of(axis.right, axis.left), axis_of(axis.up, axis.down));
        // Diagonals are normalized so W+D is not faster than W alone.
        axis_values[axis.action.0 as usize] += raw.clamp_length_max(1.0) * axis.scale;
    }
    for axis in &input_map.mouse_axes {
        let mut d = mouse_delta * axis.scale;
        if axis.invert_y {
            d.y = -d.y;
        }
        axis_values[axis.action.0 as usize] += d;
    }

    for (idx, state) in input_map.dynamic_states.iter_mut().enumerate() {
        match state {
            ActionDynamicState::Binary(b) => b.apply(binary_active[idx]),
            ActionDynamicState::Axis2(a) => a.apply(axis_values[idx]),
        }
    }
}

pub fn system_evaluate_bindings(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    mut input_map: ResMut<InputMap>,
) {
    let mouse_delta: Vec2 = motion_evr.read().map(|ev| ev.delta).sum();
    evaluate_actions(
        &mut input_map,
        |token| match token {
            RawBindingToken::Key(k) => keyboard.pressed(k),
            RawBindingToken::MouseBtn(b) => mouse_buttons.pressed(b),
        },
        mouse_delta,
    );
}
