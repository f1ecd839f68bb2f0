// Host-side tests for the page identifiers and the shared engine constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use biome_core::*;
use constants::*;

#[test]
fn default_biome_is_a_known_theme() {
    assert!(get_theme(DEFAULT_BIOME).is_ok());
}

#[test]
fn every_theme_key_round_trips_through_its_name() {
    for key in ThemeKey::ALL {
        assert_eq!(get_theme(key.as_str()).unwrap().key, key);
    }
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn camera_range_contains_start() {
    assert!(CAMERA_MIN_DISTANCE < CAMERA_START_DISTANCE);
    assert!(CAMERA_START_DISTANCE < CAMERA_MAX_DISTANCE);
    assert!(CAMERA_NEAR > 0.0 && CAMERA_FAR > CAMERA_MAX_DISTANCE);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn glow_layers_grow_outward_and_fade() {
    assert!(1.0 < INNER_GLOW_SCALE && INNER_GLOW_SCALE < OUTER_GLOW_SCALE);
    assert!(OUTER_GLOW_SCALE < HALO_SCALE);
    assert!(CORE_OPACITY > INNER_GLOW_OPACITY);
    assert!(INNER_GLOW_OPACITY > OUTER_GLOW_OPACITY && OUTER_GLOW_OPACITY > HALO_OPACITY);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn ribbon_core_sits_inside_its_sheath() {
    assert!(RIBBON_INNER_RADIUS < RIBBON_OUTER_RADIUS);
    assert!(RIBBON_INNER_OPACITY > RIBBON_OUTER_OPACITY);
}

#[test]
fn selectors_are_well_formed() {
    assert!(BIOME_BUTTON_SELECTOR.starts_with('[') && BIOME_BUTTON_SELECTOR.ends_with(']'));
    assert!(!CANVAS_ID.starts_with('#'));
    assert!(!ROTATION_TOGGLE_ID.starts_with('#'));
    assert!(!ERROR_CLASS.starts_with('.') && !ERROR_CLASS.contains(' '));
}
