//! Pixel geometry of the two 100×100 block grids.
//!
//! Depends only on viewport size. Coordinates are local to the field center
//! (zero line, vertical middle of the field band), y pointing down. Slot `i`
//! of a side sits at row `i / 100`, column `i % 100`, columns counting away
//! from the zero line.

use crate::constants::*;
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Negative = 0,
    Positive = 1,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Negative, Side::Positive];

    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Negative => -1.0,
            Side::Positive => 1.0,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// First instance index of this side in a field buffer.
    #[inline]
    pub fn base_index(self) -> usize {
        self.index() * BLOCKS_PER_SIDE
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockInstance {
    pub local: Vec2,
    pub base_scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    pub a: Vec2,
    pub b: Vec2,
    pub width: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldLayout {
    pub width: u32,
    pub height: u32,
    /// Distance between neighbouring slot centers.
    pub pitch: f32,
    /// Screen position of the local origin.
    pub center: Vec2,
    /// Negative side first, then positive; `BLOCKS_PER_SIDE` each.
    pub blocks: Vec<BlockInstance>,
    pub chunk_lines: Vec<LineSegment>,
}

/// Screen-space center of the field for a viewport: horizontally centered,
/// vertically centered in the area above the number line band.
pub fn field_center(width: u32, height: u32) -> Vec2 {
    let band = NUMBER_LINE_BAND_PX.min(height as f32 * 0.25);
    Vec2::new(width as f32 / 2.0, (height as f32 - band).max(0.0) / 2.0)
}

impl FieldLayout {
    pub fn build(width: u32, height: u32) -> Self {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        let center = field_center(width, height);
        let avail_w = (w / 2.0 - FIELD_MARGIN_PX).max(1.0);
        let avail_h = (center.y * 2.0 - 2.0 * FIELD_MARGIN_PX).max(1.0);
        let pitch = (avail_w / (GRID_SIDE as f32 + ZERO_GAP_SLOTS))
            .min(avail_h / GRID_SIDE as f32)
            .max(0.05);
        let half_h = GRID_SIDE as f32 * pitch / 2.0;
        let base_scale = pitch * BLOCK_FILL;

        let mut blocks = Vec::with_capacity(FIELD_SIDES * BLOCKS_PER_SIDE);
        for side in Side::BOTH {
            for i in 0..BLOCKS_PER_SIDE {
                let (row, col) = (i / GRID_SIDE, i % GRID_SIDE);
                let x = side.sign() * (ZERO_GAP_SLOTS + col as f32 + 0.5) * pitch;
                let y = (row as f32 + 0.5) * pitch - half_h;
                blocks.push(BlockInstance {
                    local: Vec2::new(x, y),
                    base_scale,
                });
            }
        }

        let line_w = (pitch * 0.14).max(1.0);
        let mut chunk_lines = Vec::new();
        for side in Side::BOTH {
            let s = side.sign();
            let x0 = s * ZERO_GAP_SLOTS * pitch;
            let x1 = s * (ZERO_GAP_SLOTS + GRID_SIDE as f32) * pitch;
            for c in (0..=GRID_SIDE).step_by(CHUNK_SLOTS) {
                let x = s * (ZERO_GAP_SLOTS + c as f32) * pitch;
                chunk_lines.push(LineSegment {
                    a: Vec2::new(x, -half_h),
                    b: Vec2::new(x, half_h),
                    width: line_w,
                });
            }
            for r in (0..=GRID_SIDE).step_by(CHUNK_SLOTS) {
                let y = r as f32 * pitch - half_h;
                chunk_lines.push(LineSegment {
                    a: Vec2::new(x0, y),
                    b: Vec2::new(x1, y),
                    width: line_w,
                });
            }
        }

        Self {
            width,
            height,
            pitch,
            center,
            blocks,
            chunk_lines,
        }
    }

    #[inline]
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        GRID_SIDE as f32 * self.pitch / 2.0
    }

    /// Fractional (row, column) of a local point measured on `side`.
    #[inline]
    pub fn grid_coords(&self, side: Side, local: Vec2) -> (f32, f32) {
        let row = (local.y + self.half_height()) / self.pitch - 0.5;
        let col = side.sign() * local.x / self.pitch - ZERO_GAP_SLOTS - 0.5;
        (row, col)
    }
}
