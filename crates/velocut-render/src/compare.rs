// crates/velocut-render/src/compare.rs
//
// Compare-mode geometry (§4.3): how many source images a mode combines and
// the boxes `draw_video` lays them out in. Pure math, no GPU handles, so
// the layout rules are testable without a device (§8's boundary behaviors).

use velocut_core::image::Size;
use velocut_core::options::CompareMode;

/// An axis-aligned box in the composited output, in the same units as the
/// input `Size`s (pixels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Box2D {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Box2D {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Number of source images a mode actually combines, used for the
/// `|boxes| <= M.arity` invariant in §8.
pub fn arity(mode: CompareMode) -> usize {
    match mode {
        CompareMode::A | CompareMode::B => 1,
        CompareMode::Wipe | CompareMode::Overlay | CompareMode::Difference => 2,
        CompareMode::Horizontal | CompareMode::Vertical => 2,
        CompareMode::Tile => usize::MAX,
    }
}

/// Box layout for `mode` given the sizes of the `sizes.len()` source images
/// (§4.3's table). Only `sizes[0]` is consulted for modes whose cell size is
/// fixed to the first source; `Tile`'s grid covers every entry in `sizes`.
pub fn get_boxes(mode: CompareMode, sizes: &[Size]) -> Vec<Box2D> {
    if sizes.is_empty() {
        return Vec::new();
    }
    let first = sizes[0];

    match mode {
        CompareMode::A | CompareMode::B | CompareMode::Wipe | CompareMode::Overlay | CompareMode::Difference => {
            vec![Box2D::new(0.0, 0.0, first.w as f32, first.h as f32)]
        }
        CompareMode::Horizontal => {
            let half_w = (first.w as f32) / 2.0;
            vec![
                Box2D::new(0.0, 0.0, half_w, first.h as f32),
                Box2D::new(half_w, 0.0, half_w, first.h as f32),
            ]
        }
        CompareMode::Vertical => {
            let half_h = (first.h as f32) / 2.0;
            vec![
                Box2D::new(0.0, 0.0, first.w as f32, half_h),
                Box2D::new(0.0, half_h, first.w as f32, half_h),
            ]
        }
        CompareMode::Tile => tile_boxes(sizes),
    }
}

/// Grid dimensions for `n` tiles: `IRender.cpp` special-cases 1 and 2 sources
/// before falling back to the general `cols=⌈√N⌉, rows=⌈N/cols⌉` formula —
/// 1 source is a single 1x1 cell, 2 sources stack as a 1x2 column rather
/// than the formula's own 2x1 row.
fn tile_dims(n: usize) -> (usize, usize) {
    match n {
        0 => (0, 0),
        1 => (1, 1),
        2 => (1, 2),
        _ => {
            let cols = (n as f64).sqrt().ceil() as usize;
            let cols = cols.max(1);
            let rows = n.div_ceil(cols);
            (cols, rows)
        }
    }
}

/// `tile_dims(N)` grid, each cell sized to `sizes[0]` (§4.3, and the worked
/// three-source example in §8 scenario 4).
fn tile_boxes(sizes: &[Size]) -> Vec<Box2D> {
    let n = sizes.len();
    let cell = sizes[0];
    let (cols, _rows) = tile_dims(n);

    (0..n)
        .map(|i| {
            let col = i % cols;
            let row = i / cols;
            Box2D::new(
                (col * cell.w as usize) as f32,
                (row * cell.h as usize) as f32,
                cell.w as f32,
                cell.h as f32,
            )
        })
        .collect()
}

/// Bounding box of `get_boxes(mode, sizes)` — the overall composited
/// framebuffer size (§8: `render_size(mode, sizes) = bounding_box(boxes)`).
pub fn render_size(mode: CompareMode, sizes: &[Size]) -> Size {
    if sizes.is_empty() {
        return Size::new(0, 0);
    }
    match mode {
        CompareMode::Tile => {
            let cell = sizes[0];
            let (cols, rows) = tile_dims(sizes.len());
            Size::new(cell.w * cols as u32, cell.h * rows as u32)
        }
        _ => {
            let boxes = get_boxes(mode, sizes);
            let max_x = boxes.iter().map(|b| b.x + b.w).fold(0.0f32, f32::max);
            let max_y = boxes.iter().map(|b| b.y + b.h).fold(0.0f32, f32::max);
            Size::new(max_x.round() as u32, max_y.round() as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hd() -> Size {
        Size::new(1920, 1080)
    }

    #[test]
    fn tile_three_sources_matches_scenario_4() {
        let sizes = vec![hd(), hd(), hd()];
        let boxes = get_boxes(CompareMode::Tile, &sizes);
        assert_eq!(boxes.len(), 3);
        assert_eq!(boxes[0], Box2D::new(0.0, 0.0, 1920.0, 1080.0));
        assert_eq!(boxes[1], Box2D::new(1920.0, 0.0, 1920.0, 1080.0));
        assert_eq!(boxes[2], Box2D::new(0.0, 1080.0, 1920.0, 1080.0));
        assert_eq!(render_size(CompareMode::Tile, &sizes), Size::new(3840, 2160));
    }

    #[test]
    fn tile_one_source_is_a_single_full_cell() {
        let sizes = vec![hd()];
        let boxes = get_boxes(CompareMode::Tile, &sizes);
        assert_eq!(boxes.len(), 1);
        assert_eq!(render_size(CompareMode::Tile, &sizes), hd());
    }

    #[test]
    fn tile_five_sources_is_a_3x2_grid_with_one_empty_cell() {
        let sizes = vec![hd(); 5];
        let boxes = get_boxes(CompareMode::Tile, &sizes);
        assert_eq!(boxes.len(), 5);
        assert_eq!(render_size(CompareMode::Tile, &sizes), Size::new(3 * 1920, 2 * 1080));
        // 6 grid cells total (3x2), only 5 populated: the 6th is empty
        // background, matching §8 scenario 4's "last cell empty" shape.
    }

    #[test]
    fn tile_two_sources_stack_as_a_single_column() {
        let sizes = vec![hd(), hd()];
        let boxes = get_boxes(CompareMode::Tile, &sizes);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0], Box2D::new(0.0, 0.0, 1920.0, 1080.0));
        assert_eq!(boxes[1], Box2D::new(0.0, 1080.0, 1920.0, 1080.0));
        assert_eq!(render_size(CompareMode::Tile, &sizes), Size::new(1920, 2160));
    }

    #[test]
    fn horizontal_splits_into_two_side_by_side_half_width_boxes() {
        let boxes = get_boxes(CompareMode::Horizontal, &[hd()]);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0], Box2D::new(0.0, 0.0, 960.0, 1080.0));
        assert_eq!(boxes[1], Box2D::new(960.0, 0.0, 960.0, 1080.0));
    }

    #[test]
    fn arity_bounds_box_count() {
        for mode in [
            CompareMode::A,
            CompareMode::B,
            CompareMode::Wipe,
            CompareMode::Overlay,
            CompareMode::Difference,
            CompareMode::Horizontal,
            CompareMode::Vertical,
        ] {
            let boxes = get_boxes(mode, &[hd(), hd()]);
            assert!(boxes.len() <= arity(mode));
        }
    }
}
