/// Clamp a wide integer into the 8-bit output range
#[inline]
#[allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub const fn clamp8(value: i32) -> u8 {
    if value < 0 {
        0
    } else if value > u8::MAX as i32 {
        u8::MAX
    } else {
        value as u8
    }
}

/// One step of a geometric approach toward `target`
///
/// Closes `1 / remaining_steps` of the gap, rounded half away from zero.
/// With `remaining_steps == 1` the result is exactly `target`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn approach8(value: u8, target: u8, remaining_steps: u8) -> u8 {
    if remaining_steps == 0 {
        return target;
    }
    let gap = f32::from(target) - f32::from(value);
    let delta = libm::roundf(gap / f32::from(remaining_steps)) as i32;
    clamp8(i32::from(value) + delta)
}

/// Add a step, saturating at the 8-bit range
#[inline]
pub const fn step_up8(value: u8, step: u8) -> u8 {
    value.saturating_add(step)
}

/// Subtract a step, saturating at the 8-bit range
#[inline]
pub const fn step_down8(value: u8, step: u8) -> u8 {
    value.saturating_sub(step)
}
