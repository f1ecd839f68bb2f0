// Page-level identifiers the web front-end binds to.

pub const CANVAS_ID: &str = "biome-canvas";
pub const ROTATION_TOGGLE_ID: &str = "toggle-rotation";
pub const BIOME_BUTTON_SELECTOR: &str = "[data-biome]"; // value is a theme key
pub const ACTIVE_CLASS: &str = "active";
pub const DEFAULT_BIOME: &str = "cosmic";
pub const ERROR_CLASS: &str = "biome-error"; // notice shown when the canvas cannot mount
