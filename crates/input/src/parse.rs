use super::types::*;
use bevy::prelude::*;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Default)]
pub struct ParsedInputConfig {
    pub input_map: InputMap,
    pub errors: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ActionDecl {
    description: Option<String>,
    kind: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct KeyAxisToml {
    action: String,
    up: String,
    down: String,
    left: String,
    right: String,
    scale: Option<f32>,
}

#[derive(Debug, serde::Deserialize)]
struct MouseAxisToml {
    action: String,
    scale: Option<f32>,
    invert_y: Option<bool>,
}

#[derive(Debug, serde::Deserialize)]
struct RootToml {
    actions: Option<BTreeMap<String, ActionDecl>>,
    bindings: Option<BTreeMap<String, Vec<String>>>,
    axes2: Option<Vec<KeyAxisToml>>,
    mouse_axes: Option<Vec<MouseAxisToml>>,
}

/// Parse an action map. Errors are collected rather than fatal; whatever parsed cleanly is kept.
pub fn parse_input_toml(raw: &str) -> ParsedInputConfig {
    let mut result = ParsedInputConfig::default();
    let root: RootToml = match toml::from_str(raw) {
        Ok(r) => r,
        Err(e) => {
            result.errors.push(format!("Top-level parse: {e}"));
            return result;
        }
    };

    let mut input_map = InputMap::default();
    // BTreeMap iteration keeps action ids stable across runs.
    for (name, decl) in root.actions.unwrap_or_default() {
        if !validate_action_name(&name) {
            result
                .errors
                .push(format!("Invalid action name '{name}': must be PascalCase"));
            continue;
        }
        let kind = match decl.kind.as_deref().unwrap_or("Binary") {
            "Binary" => ActionKind::Binary,
            "Axis2" => ActionKind::Axis2,
            other => {
                result.errors.push(format!(
                    "Action {name} unknown kind '{other}': expected Binary|Axis2"
                ));
                ActionKind::Binary
            }
        };
        let id = ActionId(input_map.actions.len() as u16);
        input_map.actions.push(ActionMeta {
            id,
            name: name.clone(),
            description: decl.description.unwrap_or_default(),
            kind,
        });
        input_map.dynamic_states.push(ActionDynamicState::for_kind(kind));
        input_map.name_to_id.insert(name, id);
    }

    for (action_name, list) in root.bindings.unwrap_or_default() {
        let Some(aid) = lookup(&input_map, &action_name, ActionKind::Binary, &mut result.errors)
        else {
            continue;
        };
        for token_str in &list {
            match parse_binding(token_str) {
                Ok(mut tokens) => {
                    tokens.sort_by_key(token_sort_key);
                    let id = input_map.bindings.len() as u32;
                    input_map.bindings.push(Binding {
                        id,
                        action: aid,
                        tokens,
                    });
                    input_map.bindings_runtime.push(BindingRuntime::default());
                }
                Err(err) => result
                    .errors
                    .push(format!("[binding {action_name} '{token_str}'] {err}")),
            }
        }
    }

    for axis in root.axes2.unwrap_or_default() {
        let Some(aid) = lookup(&input_map, &axis.action, ActionKind::Axis2, &mut result.errors)
        else {
            continue;
        };
        let parsed = (|| -> Result<KeyAxis2, String> {
            Ok(KeyAxis2 {
                action: aid,
                up: parse_token(&axis.up)?,
                down: parse_token(&axis.down)?,
                left: parse_token(&axis.left)?,
                right: parse_token(&axis.right)?,
                scale: axis.scale.unwrap_or(1.0),
            })
        })();
        match parsed {
            Ok(a) => input_map.key_axes.push(a),
            Err(e) => result
                .errors
                .push(format!("Axis2 '{}' error: {e}", axis.action)),
        }
    }

    for axis in root.mouse_axes.unwrap_or_default() {
        let Some(aid) = lookup(&input_map, &axis.action, ActionKind::Axis2, &mut result.errors)
        else {
            continue;
        };
        input_map.mouse_axes.push(MouseAxis2 {
            action: aid,
            scale: axis.scale.unwrap_or(1.0),
            invert_y: axis.invert_y.unwrap_or(false),
        });
    }

    result.input_map = input_map;
    result
}

fn lookup(
    map: &InputMap,
    name: &str,
    expected: ActionKind,
    errors: &mut Vec<String>,
) -> Option<ActionId> {
    let Some(id) = map.name_to_id.get(name).copied() else {
        errors.push(format!("Binding references unknown action '{name}'"));
        return None;
    };
    let kind = map.actions[id.0 as usize].kind;
    if kind != expected {
        errors.push(format!(
            "Action '{name}' is {kind:?} but bound as {expected:?}"
        ));
        return None;
    }
    Some(id)
}

fn validate_action_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

fn token_sort_key(t: &RawBindingToken) -> (u8, String) {
    match t {
        RawBindingToken::Key(k) => (0, format!("{k:?}")),
        RawBindingToken::MouseBtn(b) => (1, format!("{b:?}")),
    }
}

fn parse_binding(text: &str) -> Result<SmallVec<[RawBindingToken; 2]>, String> {
    let mut tokens: SmallVec<[RawBindingToken; 2]> = SmallVec::new();
    let mut seen: HashSet<RawBindingToken> = HashSet::new();
    for part in text.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        let token = parse_token(part)?;
        if !seen.insert(token) {
            return Err(format!("Duplicate token in chord: {token:?}"));
        }
        tokens.push(token);
    }
    if tokens.is_empty() {
        return Err("Empty binding".into());
    }
    Ok(tokens)
}

fn parse_token(s: &str) -> Result<RawBindingToken, String> {
    if let Some(rest) = s.strip_prefix("Key:") {
        return parse_keycode(rest).map(RawBindingToken::Key);
    }
    if let Some(rest) = s.strip_prefix("Mouse:") {
        return match rest {
            "Left" => Ok(RawBindingToken::MouseBtn(MouseButton::Left)),
            "Right" => Ok(RawBindingToken::MouseBtn(MouseButton::Right)),
            "Middle" => Ok(RawBindingToken::MouseBtn(MouseButton::Middle)),
            other => Err(format!("Unknown mouse button '{other}'")),
        };
    }
    Err(format!("Unrecognized token '{s}'"))
}

fn parse_keycode(name: &str) -> Result<KeyCode, String> {
    let kc = match name.strip_prefix("Key").filter(|r| r.len() == 1).unwrap_or(name) {
        "W" => KeyCode::KeyW,
        "A" => KeyCode::KeyA,
        "S" => KeyCode::KeyS,
        "D" => KeyCode::KeyD,
        "E" => KeyCode::KeyE,
        "F" => KeyCode::KeyF,
        "Q" => KeyCode::KeyQ,
        "R" => KeyCode::KeyR,
        "Space" => KeyCode::Space,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ControlLeft" => KeyCode::ControlLeft,
        "Escape" => KeyCode::Escape,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "F1" => KeyCode::F1,
        other => return Err(format!("Unsupported KeyCode '{other}' (extend parser)")),
    };
    Ok(kc)
}
