use chatkit::ScrollDirection;
use gpui::{Bounds, Pixels, point, px};
use gpui_component::VirtualListScrollHandle;

/// Small delta used to ignore floating-point scroll jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// One user-driven viewport move measured between two frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMovement {
    pub direction: ScrollDirection,
    pub distance_from_bottom: f32,
    /// Distance from the top of the content to the top of the viewport.
    pub scroll_top: f32,
}

/// Measures and drives the virtual list's scroll handle. Follow-mode decisions live in
/// the surface's scroll state; this type only observes and applies.
pub struct ScrollManager {
    scroll_handle: VirtualListScrollHandle,
    pending_scroll_to_bottom: bool,
    pending_scroll_top: Option<Pixels>,
    last_scroll_offset: Pixels,
    last_max_offset: Pixels,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: VirtualListScrollHandle::new(),
            pending_scroll_to_bottom: false,
            pending_scroll_top: None,
            last_scroll_offset: Pixels::ZERO,
            last_max_offset: Pixels::ZERO,
        }
    }

    pub fn handle(&self) -> &VirtualListScrollHandle {
        &self.scroll_handle
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
        self.pending_scroll_top = None;
    }

    pub fn request_scroll_top(&mut self, scroll_top: Pixels) {
        self.pending_scroll_top = Some(scroll_top);
        self.pending_scroll_to_bottom = false;
    }

    pub fn reset(&mut self) {
        self.last_scroll_offset = Pixels::ZERO;
        self.last_max_offset = Pixels::ZERO;
        self.pending_scroll_top = None;
        self.pending_scroll_to_bottom = true;
    }

    /// Returns the movement since the previous frame when the user moved the viewport.
    ///
    /// Offset changes caused by content growing or by our own pending jumps are not
    /// reported.
    pub fn observe(&mut self) -> Option<ViewportMovement> {
        let offset = self.scroll_handle.offset().y;
        let max_offset = self.scroll_handle.max_offset().height;
        let offset_delta = f32::from(offset) - f32::from(self.last_scroll_offset);
        let max_delta = (f32::from(max_offset) - f32::from(self.last_max_offset)).abs();
        let content_size_changed = max_delta > SCROLL_DELTA_EPSILON;
        let programmatic = self.pending_scroll_to_bottom || self.pending_scroll_top.is_some();

        self.last_scroll_offset = offset;
        self.last_max_offset = max_offset;

        if content_size_changed || programmatic {
            return None;
        }

        // GPUI uses negative Y offsets for scrolling down, so a growing offset means the
        // user moved toward older rows.
        let direction = if offset_delta > SCROLL_DELTA_EPSILON {
            ScrollDirection::TowardOlder
        } else if offset_delta < -SCROLL_DELTA_EPSILON {
            ScrollDirection::TowardNewer
        } else {
            return None;
        };

        Some(ViewportMovement {
            direction,
            distance_from_bottom: distance_from_bottom(offset, max_offset),
            scroll_top: -f32::from(offset),
        })
    }

    pub fn apply_pending_scroll(&mut self) -> bool {
        let current_x = self.scroll_handle.offset().x;
        let max_offset = self.scroll_handle.max_offset().height;

        let max_offset = max_pixels(max_offset, Pixels::ZERO);
        let target_y = if self.pending_scroll_to_bottom {
            Some(-max_offset)
        } else {
            self.pending_scroll_top
                .map(|scroll_top| -max_pixels(min_pixels(scroll_top, max_offset), Pixels::ZERO))
        };

        self.pending_scroll_to_bottom = false;
        self.pending_scroll_top = None;

        match target_y {
            Some(target_y) => {
                self.scroll_handle.set_offset(point(current_x, target_y));
                self.last_scroll_offset = target_y;
                self.last_max_offset = max_offset;
                true
            }
            None => false,
        }
    }

    pub fn bounds(&self) -> Bounds<Pixels> {
        self.scroll_handle.bounds()
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

fn distance_from_bottom(offset: Pixels, max_offset: Pixels) -> f32 {
    if max_offset <= Pixels::ZERO {
        return 0.0;
    }

    // `offset + max` approaches 0 at the tail.
    f32::from(offset + max_offset).abs()
}

fn max_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) >= f32::from(b) { a } else { b }
}

fn min_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) <= f32::from(b) { a } else { b }
}

/// Index of the topmost row visible at `scroll_top`, with how far the viewport starts
/// into it.
pub fn first_visible_row(
    row_heights: &[Pixels],
    row_gap: Pixels,
    scroll_top: f32,
) -> Option<(usize, f32)> {
    let mut row_top = 0.0;
    for (index, height) in row_heights.iter().enumerate() {
        let row_bottom = row_top + f32::from(*height);
        if scroll_top < row_bottom {
            return Some((index, (scroll_top - row_top).max(0.0)));
        }
        row_top = row_bottom + f32::from(row_gap);
    }

    row_heights.len().checked_sub(1).map(|last| (last, 0.0))
}

/// Scroll offset that puts the top of row `index` at the top of the viewport.
pub fn row_top(row_heights: &[Pixels], row_gap: Pixels, index: usize) -> Pixels {
    row_heights
        .iter()
        .take(index)
        .fold(px(0.), |top, height| top + *height + row_gap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn first_visible_row_accounts_for_gaps() {
        let heights = [px(40.), px(60.), px(20.)];
        assert_eq!(first_visible_row(&heights, px(10.), 0.0), Some((0, 0.0)));
        assert_eq!(first_visible_row(&heights, px(10.), 45.0), Some((1, 0.0)));
        assert_eq!(first_visible_row(&heights, px(10.), 70.0), Some((1, 20.0)));
        assert_eq!(first_visible_row(&heights, px(10.), 500.0), Some((2, 0.0)));
        assert_eq!(first_visible_row(&[], px(10.), 0.0), None);
    }

    #[::core::prelude::v1::test]
    fn row_top_sums_heights_and_gaps() {
        let heights = [px(40.), px(60.), px(20.)];
        assert_eq!(row_top(&heights, px(10.), 0), px(0.));
        assert_eq!(row_top(&heights, px(10.), 2), px(120.));
    }

    #[::core::prelude::v1::test]
    fn short_content_is_always_at_bottom() {
        assert_eq!(distance_from_bottom(px(0.), px(0.)), 0.0);
        assert_eq!(distance_from_bottom(px(-380.), px(400.)), 20.0);
    }
}
