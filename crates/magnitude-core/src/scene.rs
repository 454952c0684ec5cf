//! Per-frame draw plan shared by every render backend.

use crate::constants::BLOCKS_PER_SIDE;
use crate::field::{DualField, InstanceRaw, SlotId};
use crate::layout::{LineSegment, Side};
use glam::Vec2;
use smallvec::SmallVec;
use std::ops::Range;

/// Axis-aligned colored rectangle in screen pixels.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadInstance {
    pub center: [f32; 2],
    pub half: [f32; 2],
    pub color: [f32; 4],
}

impl QuadInstance {
    /// Thick axis-aligned segment from `a` to `b`.
    pub fn segment(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Self {
        let c = (a + b) * 0.5;
        let d = (b - a).abs();
        Self {
            center: c.to_array(),
            half: [(d.x + width) * 0.5, (d.y + width) * 0.5],
            color,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub background: [f32; 4],
    pub base: [f32; 4],
    pub active_negative: [f32; 4],
    pub active_positive: [f32; 4],
    pub chunk_line: [f32; 4],
    pub axis: [f32; 4],
    pub tick: [f32; 4],
    pub marker_a: [f32; 4],
    pub marker_b: [f32; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0.05, 0.06, 0.10, 1.0],
            base: [0.20, 0.24, 0.32, 0.55],
            active_negative: [0.95, 0.42, 0.36, 0.95],
            active_positive: [0.36, 0.78, 0.98, 0.95],
            chunk_line: [0.55, 0.62, 0.78, 0.35],
            axis: [0.80, 0.85, 0.95, 0.85],
            tick: [0.70, 0.76, 0.88, 0.60],
            marker_a: [1.00, 0.86, 0.40, 1.0],
            marker_b: [0.80, 0.60, 1.00, 1.0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockCategory {
    BaseNegative,
    BasePositive,
    ActiveNegative,
    ActivePositive,
}

impl BlockCategory {
    pub fn color(self, palette: &Palette) -> [f32; 4] {
        match self {
            BlockCategory::BaseNegative | BlockCategory::BasePositive => palette.base,
            BlockCategory::ActiveNegative => palette.active_negative,
            BlockCategory::ActivePositive => palette.active_positive,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(
            self,
            BlockCategory::ActiveNegative | BlockCategory::ActivePositive
        )
    }
}

/// One draw call's worth of instances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryBatch {
    pub category: BlockCategory,
    pub side: Side,
    pub range: Range<u32>,
}

/// How one field buffer is drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerPlan {
    pub slot: SlotId,
    pub scale: f32,
    pub alpha: f32,
    /// Shown (possibly fractional) active counts, negative then positive.
    pub shown: [f32; 2],
}

impl LayerPlan {
    /// Base blocks first, then active ones on top. Empty ranges are skipped.
    pub fn category_batches(&self) -> SmallVec<[CategoryBatch; 4]> {
        let mut out = SmallVec::new();
        let mut active = SmallVec::<[CategoryBatch; 2]>::new();
        for side in Side::BOTH {
            let start = side.base_index() as u32;
            let end = start + BLOCKS_PER_SIDE as u32;
            let lit = self.shown[side.index()]
                .ceil()
                .clamp(0.0, BLOCKS_PER_SIDE as f32) as u32;
            let (base_cat, active_cat) = match side {
                Side::Negative => (BlockCategory::BaseNegative, BlockCategory::ActiveNegative),
                Side::Positive => (BlockCategory::BasePositive, BlockCategory::ActivePositive),
            };
            if start + lit < end {
                out.push(CategoryBatch {
                    category: base_cat,
                    side,
                    range: start + lit..end,
                });
            }
            if lit > 0 {
                active.push(CategoryBatch {
                    category: active_cat,
                    side,
                    range: start..start + lit,
                });
            }
        }
        out.extend(active);
        out
    }

    /// Opacity multiplier of an active block: the last, partially counted
    /// block fades in with the fractional part of the shown count.
    #[inline]
    pub fn partial_alpha(&self, side: Side, index_in_side: u32) -> f32 {
        (self.shown[side.index()] - index_in_side as f32).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct FramePlan {
    pub viewport: [f32; 2],
    pub center: [f32; 2],
    pub background: [f32; 4],
    /// Outgoing layer first when two are present.
    pub layers: SmallVec<[LayerPlan; 2]>,
    /// Number line, ticks, chunk lines and markers.
    pub overlay: Vec<QuadInstance>,
}

impl FramePlan {
    pub fn clear(&mut self) {
        self.layers.clear();
        self.overlay.clear();
    }

    pub fn push_line(&mut self, line: &LineSegment, color: [f32; 4]) {
        self.overlay
            .push(QuadInstance::segment(line.a, line.b, line.width, color));
    }
}

/// Everything a backend needs to draw one frame.
pub struct FrameView<'a> {
    pub plan: &'a FramePlan,
    pub fields: &'a DualField,
    pub palette: &'a Palette,
}

impl<'a> FrameView<'a> {
    pub fn instances(&self, layer: &LayerPlan) -> &'a [InstanceRaw] {
        self.fields.buffer(layer.slot).instances()
    }

    pub fn revision(&self, layer: &LayerPlan) -> u64 {
        self.fields.buffer(layer.slot).revision()
    }
}
