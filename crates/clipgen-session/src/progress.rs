//! Synthetic progress.
//!
//! The strategy request reports nothing until it settles, so the progress
//! shown while waiting is fabricated from elapsed time.

/// Next synthetic progress value: `current + step`, never past `cap`.
///
/// Values already at or above the cap are left unchanged.
pub fn next_progress(current: u8, step: u8, cap: u8) -> u8 {
    if current < cap {
        current.saturating_add(step).min(cap)
    } else {
        current
    }
}
