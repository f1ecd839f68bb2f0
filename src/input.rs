// Pure helpers behind the DOM wiring. Kept free of web-sys so the host test
// suite can include this file directly.

/// Pixels per line for `WheelEvent.deltaMode == DOM_DELTA_LINE`.
pub const WHEEL_LINE_PX: f64 = 16.0;

pub const ROTATION_LABEL_PLAYING: &str = "⏸ Pause Rotation";
pub const ROTATION_LABEL_PAUSED: &str = "▶ Play Rotation";

/// Convert a wheel delta in any `deltaMode` to pixels.
///
/// Mode 0 is pixels, 1 lines, 2 pages of `page_px`. Unknown modes and
/// non-finite deltas yield zero.
#[inline]
pub fn normalize_wheel_delta(delta: f64, mode: u32, page_px: f64) -> f32 {
    if !delta.is_finite() {
        return 0.0;
    }
    let px = match mode {
        0 => delta,
        1 => delta * WHEEL_LINE_PX,
        2 => delta * page_px.max(1.0),
        _ => 0.0,
    };
    px as f32
}

/// Label for the rotation toggle: it names the action the button performs.
#[inline]
pub fn rotation_label(rotating: bool) -> &'static str {
    if rotating {
        ROTATION_LABEL_PLAYING
    } else {
        ROTATION_LABEL_PAUSED
    }
}

/// Text shown in place of a canvas that failed to mount.
pub fn mount_failure_text(reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        "Unable to start the biome view.".to_string()
    } else {
        format!("Unable to start the biome view: {reason}")
    }
}

#[inline]
pub fn effective_pixel_ratio(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr.min(biome_core::MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Backing-store size for a canvas laid out at `css_w` x `css_h`.
#[inline]
pub fn backing_size(css_w: f64, css_h: f64, dpr: f64) -> (u32, u32) {
    let ratio = effective_pixel_ratio(dpr);
    let px = |css: f64| {
        if css.is_finite() {
            ((css.max(0.0) * ratio) as u32).max(1)
        } else {
            1
        }
    };
    (px(css_w), px(css_h))
}
