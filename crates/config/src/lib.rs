// Pure data configuration crate (no Bevy dependency).
// Provides: every gameplay tunable with defaults, layered RON loading and validation that
// produces non-fatal warnings.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "GamePlayTest".into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GravityConfig {
    pub y: f32,
}
impl Default for GravityConfig {
    fn default() -> Self {
        Self { y: -980.0 }
    }
}

/// Movement and body tuning for the player character. World units are centimetres.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CharacterConfig {
    pub capsule_radius: f32,
    /// Half height of the whole capsule, hemispheres included.
    pub capsule_half_height: f32,
    pub max_walk_speed: f32,
    /// Lowest speed an analog stick deflection produces.
    pub min_analog_walk_speed: f32,
    pub max_acceleration: f32,
    pub braking_deceleration_walking: f32,
    pub jump_z_velocity: f32,
    /// Seconds a held Jump keeps sustaining the launch velocity (0 = fixed-height jumps).
    pub jump_max_hold_time: f32,
    /// Fraction of lateral control available while airborne (0..1).
    pub air_control: f32,
    /// Degrees per second the body yaws toward the movement direction.
    pub rotation_rate_yaw: f32,
    pub max_jump_count: u32,
}
impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            capsule_radius: 42.0,
            capsule_half_height: 96.0,
            max_walk_speed: 500.0,
            min_analog_walk_speed: 20.0,
            max_acceleration: 2048.0,
            braking_deceleration_walking: 2000.0,
            jump_z_velocity: 700.0,
            jump_max_hold_time: 0.0,
            air_control: 0.35,
            rotation_rate_yaw: 500.0,
            max_jump_count: 2,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance the follow camera sits behind the character when unobstructed.
    pub arm_length: f32,
    /// Radius kept between the camera and geometry when the arm is pulled in.
    pub probe_radius: f32,
    /// Height of the arm pivot above the character origin.
    pub pivot_height: f32,
    pub fov_degrees: f32,
    pub pitch_limit_degrees: f32,
}
impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            arm_length: 400.0,
            probe_radius: 12.0,
            pivot_height: 60.0,
            fov_degrees: 90.0,
            pitch_limit_degrees: 89.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GrabConfig {
    /// Length of the forward trace and of the carry distance in front of the character.
    pub range: f32,
    /// Record each grab trace as a timed debug line.
    pub debug: bool,
    pub debug_duration: f32,
    pub debug_thickness: f32,
    /// Spring acceleration per unit of offset between held body and target.
    pub linear_stiffness: f32,
    /// Velocity damping rate of the handle drive.
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Cap on the velocity the handle drive may impart (0 = uncapped).
    pub max_speed: f32,
}
impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            range: 500.0,
            debug: false,
            debug_duration: 5.0,
            debug_thickness: 10.0,
            linear_stiffness: 750.0,
            linear_damping: 200.0,
            angular_damping: 10.0,
            max_speed: 3000.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameModeConfig {
    /// Pawn class spawned for the player.
    pub default_pawn: String,
    pub player_start: [f32; 3],
    /// Loose physics props scattered around the player start.
    pub prop_count: usize,
    pub prop_size: f32,
    pub prop_scatter_radius: f32,
    pub floor_half_extent: f32,
}
impl Default for GameModeConfig {
    fn default() -> Self {
        Self {
            default_pawn: "ThirdPersonCharacter".into(),
            player_start: [0.0, 100.0, 0.0],
            prop_count: 6,
            prop_size: 50.0,
            prop_scatter_radius: 600.0,
            floor_half_extent: 5000.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub gravity: GravityConfig,
    pub character: CharacterConfig,
    pub camera: CameraConfig,
    pub grab: GrabConfig,
    pub game_mode: GameModeConfig,
    pub rapier_debug: bool,
}
impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: Default::default(),
            gravity: Default::default(),
            character: Default::default(),
            camera: Default::default(),
            grab: Default::default(),
            game_mode: Default::default(),
            rapier_debug: false,
        }
    }
}

impl GameConfig {
    /// Load from a single RON file (errors contain human-readable context).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        Self::from_ron_str(&data)
    }

    pub fn from_ron_str(data: &str) -> Result<Self, String> {
        ron::from_str(data).map_err(|e| format!("parse RON: {e}"))
    }

    /// Load file; on failure returns default config plus error string.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load multiple layers; later overrides earlier (deep merge).
    /// Skips missing files; returns (config, used_paths, errors).
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();

        for p in paths {
            let path_ref = p.as_ref();
            if !path_ref.exists() {
                continue;
            }
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        match &mut merged {
                            Some(cur) => merge_value(cur, val),
                            None => merged = Some(val),
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }

        let Some(val) = merged else {
            return (GameConfig::default(), used, errors);
        };
        match val.into_rust::<GameConfig>() {
            Ok(cfg) => (cfg, used, errors),
            Err(e) => {
                errors.push(format!(
                    "failed to deserialize merged config; using defaults: {e}"
                ));
                (GameConfig::default(), used, errors)
            }
        }
    }

    /// Produce validation warnings (non-fatal) for suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.gravity.y > 0.0 {
            w.push(format!(
                "gravity.y is positive ({}); characters will fall upward",
                self.gravity.y
            ));
        }
        if self.gravity.y.abs() < 1e-4 {
            w.push("gravity.y magnitude near zero; jumps never land".into());
        }

        let ch = &self.character;
        if ch.capsule_radius <= 0.0 {
            w.push("character.capsule_radius must be > 0".into());
        }
        if ch.capsule_half_height < ch.capsule_radius {
            w.push(format!(
                "character.capsule_half_height {} smaller than capsule_radius {}",
                ch.capsule_half_height, ch.capsule_radius
            ));
        }
        if ch.max_walk_speed <= 0.0 {
            w.push("character.max_walk_speed must be > 0".into());
        }
        if ch.min_analog_walk_speed < 0.0 || ch.min_analog_walk_speed > ch.max_walk_speed {
            w.push(format!(
                "character.min_analog_walk_speed {} outside 0..max_walk_speed",
                ch.min_analog_walk_speed
            ));
        }
        if ch.max_acceleration <= 0.0 {
            w.push("character.max_acceleration must be > 0".into());
        }
        if ch.braking_deceleration_walking < 0.0 {
            w.push("character.braking_deceleration_walking negative".into());
        }
        if !(0.0..=1.0).contains(&ch.air_control) {
            w.push(format!(
                "character.air_control {} outside 0..1",
                ch.air_control
            ));
        }
        if ch.max_jump_count == 0 {
            w.push("character.max_jump_count is 0; jumping disabled".into());
        }
        if ch.jump_max_hold_time < 0.0 {
            w.push("character.jump_max_hold_time negative".into());
        }
        if ch.jump_z_velocity <= 0.0 {
            w.push("character.jump_z_velocity must be > 0".into());
        }
        if ch.rotation_rate_yaw < 0.0 {
            w.push(format!(
                "character.rotation_rate_yaw {} negative; character will not turn",
                ch.rotation_rate_yaw
            ));
        }

        let cam = &self.camera;
        if cam.arm_length < 0.0 {
            w.push("camera.arm_length negative".into());
        }
        if cam.probe_radius < 0.0 {
            w.push("camera.probe_radius negative".into());
        }
        if !(1.0..=170.0).contains(&cam.fov_degrees) {
            w.push(format!("camera.fov_degrees {} outside 1..170", cam.fov_degrees));
        }
        if !(0.0..90.0).contains(&cam.pitch_limit_degrees) {
            w.push(format!(
                "camera.pitch_limit_degrees {} must be in 0..90",
                cam.pitch_limit_degrees
            ));
        }

        let grab = &self.grab;
        if grab.range <= 0.0 {
            w.push(format!(
                "grab.range {} not positive; grabbing can never succeed",
                grab.range
            ));
        }
        if grab.debug_duration < 0.0 {
            w.push("grab.debug_duration negative".into());
        }
        if grab.linear_stiffness <= 0.0 {
            w.push("grab.linear_stiffness must be > 0; held objects will not follow".into());
        }
        if grab.linear_damping < 0.0 || grab.angular_damping < 0.0 {
            w.push("grab damping negative".into());
        }
        if grab.max_speed < 0.0 {
            w.push("grab.max_speed negative -> treated as uncapped".into());
        }

        let gm = &self.game_mode;
        if gm.default_pawn.trim().is_empty() {
            w.push("game_mode.default_pawn empty; falling back to default pawn".into());
        }
        if gm.prop_size <= 0.0 && gm.prop_count > 0 {
            w.push("game_mode.prop_size must be > 0".into());
        }
        if gm.floor_half_extent <= 0.0 {
            w.push("game_mode.floor_half_extent must be > 0".into());
        }
        w
    }
}

/// Deep merge of RON values: maps merge key by key, anything else is replaced.
fn merge_value(base: &mut ron::value::Value, overlay: ron::value::Value) {
    use ron::value::Value;
    match (base, overlay) {
        (Value::Map(bm), Value::Map(om)) => {
            for (k, v) in om.into_iter() {
                let mut pending = Some(v);
                if let Some((_, ev)) = bm.iter_mut().find(|(ek, _)| **ek == k) {
                    if let Some(val) = pending.take() {
                        merge_value(ev, val);
                    }
                }
                if let Some(val) = pending {
                    bm.insert(k, val);
                }
            }
        }
        (b, o) => *b = o,
    }
}
