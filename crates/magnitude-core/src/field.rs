//! Block populations and the two alternating field buffers.

use crate::constants::*;
use crate::layout::{FieldLayout, Side};
use crate::level::MagnitudeLevel;
use crate::ripple::RippleField;
use crate::tier::TierBudget;
use fnv::FnvHashSet;

/// Active block count for `value` at `level`:
/// `clamp(floor(|trunc(v)| / 10^max(0, k-4)), 0, 10000)`.
pub fn block_count(level: MagnitudeLevel, value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let whole = value.trunc().abs();
    let blocks = (whole / level.block_unit()).floor();
    blocks.clamp(0.0, BLOCKS_PER_SIDE as f64) as u32
}

/// Per-instance draw data shared by the GPU instance buffer and the CPU path.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub local: [f32; 2],
    pub scale: f32,
    pub side: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotId {
    A,
    B,
}

impl SlotId {
    #[inline]
    pub fn other(self) -> SlotId {
        match self {
            SlotId::A => SlotId::B,
            SlotId::B => SlotId::A,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            SlotId::A => 0,
            SlotId::B => 1,
        }
    }
}

pub struct FieldBuffer {
    level: MagnitudeLevel,
    layout: FieldLayout,
    instances: Vec<InstanceRaw>,
    target: [u32; 2],
    shown: [f32; 2],
    from_shown: [f32; 2],
    touched: FnvHashSet<u32>,
    prev_touched: FnvHashSet<u32>,
    revision: u64,
}

impl FieldBuffer {
    pub fn new(level: MagnitudeLevel, width: u32, height: u32) -> Self {
        let layout = FieldLayout::build(width, height);
        let instances = bake_instances(&layout);
        Self {
            level,
            layout,
            instances,
            target: [0; 2],
            shown: [0.0; 2],
            from_shown: [0.0; 2],
            touched: FnvHashSet::default(),
            prev_touched: FnvHashSet::default(),
            revision: 0,
        }
    }

    pub fn level(&self) -> MagnitudeLevel {
        self.level
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances
    }

    /// Bumped whenever instance data changes; backends re-upload on change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn target(&self) -> [u32; 2] {
        self.target
    }

    pub fn shown(&self) -> [f32; 2] {
        self.shown
    }

    pub fn is_deformed(&self) -> bool {
        !self.touched.is_empty()
    }

    /// Rebuild geometry if the viewport changed. Idempotent.
    pub fn ensure_layout(&mut self, width: u32, height: u32) -> bool {
        if self.layout.matches(width, height) {
            return false;
        }
        self.layout = FieldLayout::build(width, height);
        self.instances = bake_instances(&self.layout);
        self.touched.clear();
        self.prev_touched.clear();
        self.revision += 1;
        true
    }

    pub fn set_target(&mut self, counts: [u32; 2]) {
        self.target = counts;
    }

    pub fn snap(&mut self) {
        self.shown = self.target.map(|c| c as f32);
        self.from_shown = self.shown;
    }

    /// Start interpolating shown counts from `from` toward the target.
    pub fn start_from(&mut self, from: [f32; 2]) {
        self.from_shown = from;
        self.shown = from;
    }

    /// Shown counts part way (`t` in [0, 1]) from the start toward the target.
    pub fn interpolate(&mut self, t: f32) {
        let t = t.clamp(0.0, 1.0);
        for s in 0..2 {
            let a = self.from_shown[s];
            let b = self.target[s] as f32;
            self.shown[s] = a + (b - a) * t;
        }
    }

    fn retarget(&mut self, level: MagnitudeLevel, counts: [u32; 2]) {
        self.level = level;
        self.target = counts;
        self.reset_deformation();
    }

    /// Restore every ripple-touched block to its resting scale.
    pub fn reset_deformation(&mut self) {
        if self.touched.is_empty() && self.prev_touched.is_empty() {
            return;
        }
        for idx in self.touched.drain().chain(self.prev_touched.drain()) {
            let i = idx as usize;
            self.instances[i].scale = self.layout.blocks[i].base_scale;
        }
        self.revision += 1;
    }

    /// Deform blocks near live wavefronts; blocks touched on the previous
    /// pass but not this one go back to their resting scale.
    pub fn apply_ripples(
        &mut self,
        ripples: &RippleField,
        now_sec: f64,
        draw_scale: f32,
        budget: &TierBudget,
    ) {
        std::mem::swap(&mut self.touched, &mut self.prev_touched);
        self.touched.clear();

        let stride = budget.ripple_sample_stride.max(1);
        let scale = draw_scale.max(1e-6);
        let radius_limit = ripples.params().max_radius_px * budget.ripple_radius_scale;
        let pitch = self.layout.pitch;
        let half_h = self.layout.half_height();
        let last = GRID_SIDE as f32 - 1.0;

        for ripple in ripples.ripples() {
            let (inner, outer) = ripples.band(ripple, now_sec);
            if inner > radius_limit {
                continue;
            }
            let outer = outer.min(radius_limit);
            let origin = (ripple.origin - self.layout.center) / scale;
            let (inner_l, outer_l) = (inner / scale, outer / scale);

            for side in Side::BOTH {
                let (row_c, _) = self.layout.grid_coords(side, origin);
                let reach = outer_l / pitch;
                let row_lo = (row_c - reach).floor().max(0.0);
                let row_hi = (row_c + reach).ceil().min(last);
                if row_lo > row_hi {
                    continue;
                }
                for row in (row_lo as usize..=row_hi as usize).step_by(stride) {
                    let dy = (row as f32 + 0.5) * pitch - half_h - origin.y;
                    if dy.abs() > outer_l {
                        continue;
                    }
                    let chord_out = (outer_l * outer_l - dy * dy).sqrt();
                    let chord_in = if dy.abs() < inner_l {
                        (inner_l * inner_l - dy * dy).sqrt()
                    } else {
                        0.0
                    };
                    let spans = [
                        (origin.x - chord_out, origin.x - chord_in),
                        (origin.x + chord_in, origin.x + chord_out),
                    ];
                    for (x_lo, x_hi) in spans {
                        let to_col = |x: f32| side.sign() * x / pitch - ZERO_GAP_SLOTS - 0.5;
                        let (c_a, c_b) = (to_col(x_lo), to_col(x_hi));
                        let col_lo = c_a.min(c_b).ceil().max(0.0);
                        let col_hi = c_a.max(c_b).floor().min(last);
                        if col_lo > col_hi {
                            continue;
                        }
                        for col in (col_lo as usize..=col_hi as usize).step_by(stride) {
                            self.deform_patch(side, row, col, stride, ripples, now_sec, scale);
                        }
                    }
                }
            }
        }

        let mut changed = !self.touched.is_empty();
        for idx in self.prev_touched.drain() {
            if !self.touched.contains(&idx) {
                let i = idx as usize;
                self.instances[i].scale = self.layout.blocks[i].base_scale;
                changed = true;
            }
        }
        if changed {
            self.revision += 1;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn deform_patch(
        &mut self,
        side: Side,
        row: usize,
        col: usize,
        stride: usize,
        ripples: &RippleField,
        now_sec: f64,
        scale: f32,
    ) {
        let sample = side.base_index() + row * GRID_SIDE + col;
        let screen = self.layout.center + self.layout.blocks[sample].local * scale;
        let factor = ripples.scale_factor(ripples.wave_at(screen, now_sec));
        for r in row..(row + stride).min(GRID_SIDE) {
            for c in col..(col + stride).min(GRID_SIDE) {
                let i = side.base_index() + r * GRID_SIDE + c;
                self.instances[i].scale = self.layout.blocks[i].base_scale * factor;
                self.touched.insert(i as u32);
            }
        }
    }
}

fn bake_instances(layout: &FieldLayout) -> Vec<InstanceRaw> {
    layout
        .blocks
        .iter()
        .enumerate()
        .map(|(i, b)| InstanceRaw {
            local: b.local.to_array(),
            scale: b.base_scale,
            side: if i < BLOCKS_PER_SIDE { -1.0 } else { 1.0 },
        })
        .collect()
}

/// Two named field slots with an explicit active pointer. During a
/// transition `incoming` names the slot fading in; the pointer swaps when
/// the transition completes or is replaced.
pub struct DualField {
    slots: [FieldBuffer; 2],
    active: SlotId,
    incoming: Option<SlotId>,
}

impl DualField {
    pub fn new(level: MagnitudeLevel, width: u32, height: u32) -> Self {
        Self {
            slots: [
                FieldBuffer::new(level, width, height),
                FieldBuffer::new(level, width, height),
            ],
            active: SlotId::A,
            incoming: None,
        }
    }

    #[inline]
    pub fn active(&self) -> SlotId {
        self.active
    }

    #[inline]
    pub fn incoming(&self) -> Option<SlotId> {
        self.incoming
    }

    #[inline]
    pub fn buffer(&self, slot: SlotId) -> &FieldBuffer {
        &self.slots[slot.index()]
    }

    #[inline]
    pub fn buffer_mut(&mut self, slot: SlotId) -> &mut FieldBuffer {
        &mut self.slots[slot.index()]
    }

    /// Begin fading in `level`. A transition already in flight is replaced:
    /// its incoming slot becomes the outgoing one, so the new transition
    /// starts from what is currently on screen.
    pub fn begin_incoming(&mut self, level: MagnitudeLevel, counts: [u32; 2]) -> SlotId {
        if let Some(prev) = self.incoming.take() {
            self.active = prev;
        }
        let start = self.buffer(self.active).shown();
        let slot = self.active.other();
        let buf = self.buffer_mut(slot);
        buf.retarget(level, counts);
        buf.start_from(start);
        self.incoming = Some(slot);
        slot
    }

    /// Swap the active pointer to the incoming slot.
    pub fn complete(&mut self) {
        if let Some(slot) = self.incoming.take() {
            self.active = slot;
            self.buffer_mut(slot).snap();
            self.buffer_mut(slot.other()).reset_deformation();
        }
    }

    pub fn ensure_layout(&mut self, width: u32, height: u32) -> bool {
        let a = self.slots[0].ensure_layout(width, height);
        let b = self.slots[1].ensure_layout(width, height);
        a || b
    }

    pub fn is_deformed(&self) -> bool {
        self.slots.iter().any(FieldBuffer::is_deformed)
    }

    pub fn reset_deformation(&mut self) {
        for slot in &mut self.slots {
            slot.reset_deformation();
        }
    }
}
