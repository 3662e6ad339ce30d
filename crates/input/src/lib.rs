//! Action-mapped input: named actions declared in TOML, bound to keys, mouse buttons and
//! mouse motion, evaluated once per frame into started / ongoing / completed states.

pub mod parse;
pub mod plugin;
pub mod systems;
pub mod types;

pub use parse::{parse_input_toml, ParsedInputConfig};
pub use plugin::{InputActionUpdateSet, InputActionsPlugin, DEFAULT_INPUT_TOML};
pub use types::{ActionDynamicState, ActionKind, InputMap, RawBindingToken};
