use shared::domain::{clamp_slider_value, SLIDER_MAX};

const MIDPOINT: i64 = SLIDER_MAX / 2;
const MIDPOINT_HUE: f32 = 30.0;
const MAX_HUE: f32 = 120.0;

/// Slider value to hue in degrees: red at 0, orange at 5, green at 10.
/// Out-of-range values are clamped first.
pub fn hue(value: i64) -> f32 {
    let value = clamp_slider_value(value);
    let midpoint = MIDPOINT as f32;
    if value <= MIDPOINT {
        value as f32 * MIDPOINT_HUE / midpoint
    } else {
        MIDPOINT_HUE + (value - MIDPOINT) as f32 * (MAX_HUE - MIDPOINT_HUE) / midpoint
    }
}
