//! Overlap-avoiding placement of new windows.
//!
//! A new window is never stacked exactly on top of a sibling showing the
//! same content. Only top-left corners are compared; partially overlapping
//! windows are fine. Each collision shifts the candidate diagonally and wraps
//! it back into the available area one axis at a time.

use std::collections::HashSet;

use super::geometry::{Bounds, ScreenArea};

/// Default distance, in pixels, a colliding window is shifted on each axis.
pub const SHIFT_DISTANCE: i32 = 40;

/// Compute a top-left corner for `candidate` not shared with any sibling.
///
/// `siblings` are the current bounds of windows with the same content URL.
/// The returned bounds keep the candidate's size.
///
/// # Example
///
/// ```
/// use horizon_shell::window::{Bounds, ScreenArea, avoid_overlap};
///
/// let area = ScreenArea::new(1000, 1000);
/// let sibling = Bounds::new(0, 0, 100, 100);
/// let placed = avoid_overlap(Bounds::new(0, 0, 100, 100), &[sibling], area, 40);
/// assert_eq!(placed.top_left(), (40, 40));
/// ```
pub fn avoid_overlap(candidate: Bounds, siblings: &[Bounds], area: ScreenArea, shift: i32) -> Bounds {
    place(candidate, siblings, area, shift).0
}

/// Placement plus the number of collisions resolved on the way.
///
/// Every collision removes one corner from the occupied set, so the loop
/// runs at most `siblings.len()` times.
fn place(candidate: Bounds, siblings: &[Bounds], area: ScreenArea, shift: i32) -> (Bounds, usize) {
    let mut occupied: HashSet<(i32, i32)> = siblings.iter().map(Bounds::top_left).collect();
    let (mut left, mut top) = candidate.top_left();
    let mut collisions = 0;

    while occupied.remove(&(left, top)) {
        collisions += 1;
        left = wrap(left, candidate.width, shift, area.width);
        top = wrap(top, candidate.height, shift, area.height);
    }

    (candidate.moved_to(left, top), collisions)
}

/// Shift one axis, wrapping when the far edge reaches the available extent.
fn wrap(start: i32, extent: i32, shift: i32, available: i32) -> i32 {
    let next_start = start.saturating_add(shift);
    let next_end = next_start.saturating_add(extent);
    if next_end >= available && available > 0 {
        next_end.rem_euclid(available)
    } else {
        next_start
    }
}
