// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use input::*;

#[test]
fn wheel_pixels_pass_through() {
    assert_eq!(normalize_wheel_delta(120.0, 0, 900.0), 120.0);
    assert_eq!(normalize_wheel_delta(-3.5, 0, 900.0), -3.5);
}

#[test]
fn wheel_lines_and_pages_scale_to_pixels() {
    assert_eq!(normalize_wheel_delta(3.0, 1, 900.0), 3.0 * WHEEL_LINE_PX as f32);
    assert_eq!(normalize_wheel_delta(-1.0, 2, 900.0), -900.0);
}

#[test]
fn wheel_garbage_is_ignored() {
    assert_eq!(normalize_wheel_delta(f64::NAN, 0, 900.0), 0.0);
    assert_eq!(normalize_wheel_delta(10.0, 7, 900.0), 0.0);
}

#[test]
fn rotation_label_names_the_next_action() {
    assert_eq!(rotation_label(true), "⏸ Pause Rotation");
    assert_eq!(rotation_label(false), "▶ Play Rotation");
}

#[test]
fn pixel_ratio_is_capped() {
    assert_eq!(effective_pixel_ratio(3.0), biome_core::MAX_PIXEL_RATIO);
    assert_eq!(effective_pixel_ratio(1.5), 1.5);
    assert_eq!(effective_pixel_ratio(0.0), 1.0);
    assert_eq!(effective_pixel_ratio(f64::INFINITY), 1.0);
}

#[test]
fn backing_size_never_collapses() {
    assert_eq!(backing_size(400.0, 300.0, 3.0), (800, 600));
    assert_eq!(backing_size(0.0, -5.0, 1.0), (1, 1));
    assert_eq!(backing_size(f64::NAN, 10.0, 1.0), (1, 10));
}

#[test]
fn mount_failure_text_carries_the_reason() {
    let text = mount_failure_text("  resource acquisition failed: no adapter\n");
    assert_eq!(
        text,
        "Unable to start the biome view: resource acquisition failed: no adapter"
    );
    assert_eq!(mount_failure_text(""), "Unable to start the biome view.");
}
