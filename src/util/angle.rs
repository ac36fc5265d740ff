//! Yaw angle helpers (degrees)
//!
//! Every comparison between headings goes through `delta_angle` so that
//! nothing oscillates across the 0/360 seam.

/// Wraps `value` into [0, length)
#[inline]
pub fn repeat(value: f32, length: f32) -> f32 {
    (value - (value / length).floor() * length).clamp(0.0, length)
}

/// Normalizes a heading to [0, 360)
#[inline]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = repeat(degrees, 360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed difference from `current` to `target`, in (-180, 180]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = repeat(target - current, 360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Moves `current` toward `target` by at most `max_delta` degrees along the
/// shortest arc
pub fn move_towards_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = delta_angle(current, target);
    if delta.abs() <= max_delta {
        return normalize_degrees(target);
    }
    normalize_degrees(current + delta.signum() * max_delta)
}
