//! The owned engine context: level stepping, markers, transitions, ripples
//! and the two field buffers, all mutated between frames through the
//! methods below and rendered by one pass per refresh callback.

use crate::backend::BackendKind;
use crate::config::EngineConfig;
use crate::constants::NUMBER_LINE_BAND_PX;
use crate::error::CoreError;
use crate::field::DualField;
use crate::layout::{field_center, LineSegment};
use crate::level::MagnitudeLevel;
use crate::mapping::CoordinateMapping;
use crate::markers::{Marker, MarkerSet};
use crate::ripple::RippleField;
use crate::scene::{FramePlan, FrameView, LayerPlan, Palette};
use crate::scheduler::RenderScheduler;
use crate::stepper::{LevelStep, MagnitudeStepper};
use crate::tier::{CapabilityTier, TierBudget};
use crate::transition::Transition;
use glam::Vec2;
use smallvec::SmallVec;

/// Snapshot handed to the text formatting collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct Readout {
    pub level: MagnitudeLevel,
    pub target: MagnitudeLevel,
    pub range: (f64, f64),
    pub block_unit: f64,
    pub value_a: f64,
    pub value_b: Option<f64>,
    pub counts: [u32; 2],
    pub symmetric: bool,
    pub step_mode: bool,
    pub backend: Option<BackendKind>,
}

pub struct FieldEngine {
    config: EngineConfig,
    palette: Palette,
    budget: TierBudget,
    width: u32,
    height: u32,
    mapping: CoordinateMapping,
    stepper: MagnitudeStepper,
    markers: MarkerSet,
    transition: Option<Transition>,
    fields: DualField,
    ripples: RippleField,
    scheduler: RenderScheduler,
    plan: FramePlan,
    layout_pending: bool,
    readout_dirty: bool,
    backend: Option<BackendKind>,
    frame_index: u64,
}

impl FieldEngine {
    pub fn new(
        config: EngineConfig,
        width: u32,
        height: u32,
        tier: CapabilityTier,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let level = config.initial();
        let mapping = CoordinateMapping::new(level, width as f64)?;
        let mut markers = MarkerSet::new(config.dual_markers, config.symmetric);
        markers.clamp_to(level);
        let mut fields = DualField::new(level, width, height);
        let active = fields.active();
        fields.buffer_mut(active).set_target(markers.side_counts(level));
        fields.buffer_mut(active).snap();
        let mut scheduler = RenderScheduler::default();
        scheduler.request_render();
        log::debug!("[engine] created at {} for {}x{} ({:?})", level, width, height, tier);
        Ok(Self {
            stepper: MagnitudeStepper::new(level, config.step_interval, config.step_mode),
            ripples: RippleField::new(config.ripple),
            config,
            palette: Palette::default(),
            budget: tier.budget(),
            width,
            height,
            mapping,
            markers,
            transition: None,
            fields,
            scheduler,
            plan: FramePlan::default(),
            layout_pending: false,
            readout_dirty: true,
            backend: None,
            frame_index: 0,
        })
    }

    // ---------------- Queries ----------------

    #[inline]
    pub fn level(&self) -> MagnitudeLevel {
        self.stepper.current()
    }

    #[inline]
    pub fn target_level(&self) -> MagnitudeLevel {
        self.stepper.target()
    }

    #[inline]
    pub fn mapping(&self) -> &CoordinateMapping {
        &self.mapping
    }

    #[inline]
    pub fn step_mode(&self) -> bool {
        self.stepper.step_mode()
    }

    #[inline]
    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    #[inline]
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    #[inline]
    pub fn fields(&self) -> &DualField {
        &self.fields
    }

    #[inline]
    pub fn ripples(&self) -> &RippleField {
        &self.ripples
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn budget(&self) -> &TierBudget {
        &self.budget
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    /// True while anything still needs further frames.
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
            || self.stepper.is_stepping()
            || self.ripples.is_live()
            || self.layout_pending
            || self.fields.is_deformed()
    }

    // ---------------- Inputs ----------------

    pub fn set_target_level(&mut self, k: i64) {
        let target = self.config.clamp_level(k);
        self.stepper.set_target(target);
        self.readout_dirty = true;
        self.scheduler.request_render();
    }

    pub fn bump_level(&mut self, delta: i64) {
        let k = self.stepper.target().saturating_step(delta.signum() as i32);
        self.set_target_level(k.get() as i64);
    }

    pub fn set_step_mode(&mut self, on: bool) {
        self.stepper.set_step_mode(on);
        self.readout_dirty = true;
        self.scheduler.request_render();
    }

    pub fn set_value(&mut self, which: Marker, raw: f64) {
        self.markers.set(which, raw, self.level());
        self.readout_dirty = true;
        self.scheduler.request_render();
    }

    pub fn set_symmetric_mode(&mut self, on: bool) {
        self.markers.set_symmetric(on);
        self.readout_dirty = true;
        self.scheduler.request_render();
    }

    pub fn set_second_marker(&mut self, on: bool) {
        self.markers.enable_second(on);
        self.readout_dirty = true;
        self.scheduler.request_render();
    }

    /// Clamped value under a pixel column.
    pub fn value_at(&self, x: f64) -> f64 {
        self.level().clamp_value(self.mapping.value_at(x))
    }

    /// The marker a drag starting at pixel `x` should move.
    pub fn marker_near(&self, x: f64) -> Marker {
        self.markers.nearest(self.mapping.value_at(x))
    }

    /// Set a marker from a pixel column (drag gesture).
    pub fn set_value_at(&mut self, which: Marker, x: f64) {
        let v = self.mapping.value_at(x);
        self.set_value(which, v);
    }

    /// Spawn a ripple at a screen point and its mirror about the zero line.
    pub fn notify_ripple(&mut self, x: f32, y: f32, now_sec: f64) {
        let center_x = self.width as f32 / 2.0;
        self.ripples.spawn_mirrored(Vec2::new(x, y), center_x, now_sec);
        self.scheduler.request_render();
    }

    /// New viewport size in device pixels. Geometry is rebuilt lazily, never
    /// while a transition is drawing both buffers.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        let w = width as f64;
        let remap = |m: &CoordinateMapping| CoordinateMapping::new(m.level, w);
        match remap(&self.mapping) {
            Ok(m) => self.mapping = m,
            Err(e) => {
                log::warn!("[engine] ignoring resize: {e}");
                return;
            }
        }
        if let Some(t) = &mut self.transition {
            if let (Ok(from), Ok(to)) = (remap(&t.from_mapping), remap(&t.to_mapping)) {
                t.from_mapping = from;
                t.to_mapping = to;
            }
        }
        self.width = width;
        self.height = height;
        self.layout_pending = true;
        self.scheduler.request_render();
    }

    pub fn set_tier(&mut self, tier: CapabilityTier) {
        self.budget = tier.budget();
        self.scheduler.request_render();
    }

    /// Tell the engine which backend is drawing (shown in the readout).
    pub fn set_backend(&mut self, kind: BackendKind) {
        if self.backend != Some(kind) {
            self.backend = Some(kind);
            self.readout_dirty = true;
        }
    }

    pub fn take_readout(&mut self) -> Option<Readout> {
        if !std::mem::take(&mut self.readout_dirty) {
            return None;
        }
        let level = self.level();
        Some(Readout {
            level,
            target: self.stepper.target(),
            range: self.mapping.range(),
            block_unit: level.block_unit(),
            value_a: self.markers.a(),
            value_b: self.markers.b(),
            counts: self.markers.side_counts(level),
            symmetric: self.markers.symmetric(),
            step_mode: self.stepper.step_mode(),
            backend: self.backend,
        })
    }

    // ---------------- Scheduling ----------------

    pub fn request_render(&mut self) {
        self.scheduler.request_render();
    }

    /// True once per dirty frame; the caller then schedules a refresh callback.
    pub fn claim_callback(&mut self) -> bool {
        self.scheduler.claim_callback()
    }

    /// One render pass. Returns false when nothing was requested.
    pub fn frame(&mut self, now_sec: f64) -> bool {
        if !self.scheduler.begin_frame() {
            return false;
        }
        self.frame_index = self.frame_index.wrapping_add(1);

        self.retire_transition(now_sec);
        self.advance_levels(now_sec);
        if self.layout_pending && self.transition.is_none() {
            self.fields.ensure_layout(self.width, self.height);
            self.layout_pending = false;
        }
        self.update_counts(now_sec);
        let layers = self.layers(now_sec);
        self.update_ripples(now_sec, &layers);
        self.build_plan(now_sec, layers);

        let keep_alive = self.is_animating();
        self.scheduler.end_frame(keep_alive);
        true
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            plan: &self.plan,
            fields: &self.fields,
            palette: &self.palette,
        }
    }

    // ---------------- Frame internals ----------------

    fn retire_transition(&mut self, now_sec: f64) {
        if let Some(t) = &self.transition {
            if t.is_complete(now_sec) {
                log::debug!("[engine] transition {} -> {} done", t.from_level, t.to_level);
                self.transition = None;
                self.fields.complete();
            }
        }
    }

    fn advance_levels(&mut self, now_sec: f64) {
        let mut steps: SmallVec<[LevelStep; 1]> = SmallVec::new();
        self.stepper.tick(now_sec, |s| steps.push(s));
        for step in steps {
            self.begin_transition(step, now_sec);
        }
    }

    fn begin_transition(&mut self, step: LevelStep, now_sec: f64) {
        let to_mapping = match CoordinateMapping::new(step.to, self.width as f64) {
            Ok(m) => m,
            Err(e) => {
                log::error!("[engine] cannot map {}: {e}", step.to);
                return;
            }
        };
        // A replaced transition hands over whatever is on screen right now:
        // its incoming buffer becomes the outgoing one at its drawn scale.
        let (from_scale, from_alpha, from_mapping) = match &self.transition {
            Some(t) => {
                let e = t.eased(now_sec);
                log::debug!("[engine] transition replaced by {} -> {}", step.from, step.to);
                (t.incoming_scale(e), t.incoming_alpha(e), t.mapping_at(e))
            }
            None => (1.0, 1.0, self.mapping),
        };
        self.mapping = to_mapping;
        self.markers.clamp_to(step.to);
        let counts = self.markers.side_counts(step.to);
        self.fields.begin_incoming(step.to, counts);
        self.transition = Some(Transition {
            from_level: step.from,
            to_level: step.to,
            start_sec: now_sec,
            duration: self.config.transition_duration,
            from_mapping,
            to_mapping,
            easing: self.config.easing,
            from_scale,
            from_alpha,
        });
        self.readout_dirty = true;
    }

    fn update_counts(&mut self, now_sec: f64) {
        let counts = self.markers.side_counts(self.level());
        match (&self.transition, self.fields.incoming()) {
            (Some(t), Some(slot)) => {
                let e = t.eased(now_sec) as f32;
                let buf = self.fields.buffer_mut(slot);
                buf.set_target(counts);
                buf.interpolate(e);
            }
            _ => {
                let slot = self.fields.active();
                let buf = self.fields.buffer_mut(slot);
                buf.set_target(counts);
                buf.snap();
            }
        }
    }

    fn layers(&self, now_sec: f64) -> SmallVec<[LayerPlan; 2]> {
        let active = self.fields.active();
        let mut out = SmallVec::new();
        match (&self.transition, self.fields.incoming()) {
            (Some(t), Some(incoming)) => {
                let e = t.eased(now_sec);
                out.push(LayerPlan {
                    slot: active,
                    scale: t.outgoing_scale(e) as f32,
                    alpha: t.outgoing_alpha(e) as f32,
                    shown: self.fields.buffer(active).shown(),
                });
                out.push(LayerPlan {
                    slot: incoming,
                    scale: t.incoming_scale(e) as f32,
                    alpha: t.incoming_alpha(e) as f32,
                    shown: self.fields.buffer(incoming).shown(),
                });
            }
            _ => out.push(LayerPlan {
                slot: active,
                scale: 1.0,
                alpha: 1.0,
                shown: self.fields.buffer(active).shown(),
            }),
        }
        out
    }

    fn update_ripples(&mut self, now_sec: f64, layers: &[LayerPlan]) {
        self.ripples.prune(now_sec);
        if !self.ripples.is_live() {
            self.fields.reset_deformation();
            return;
        }
        let every = self.budget.ripple_update_every.max(1) as u64;
        if self.frame_index % every != 0 {
            return;
        }
        for layer in layers {
            self.fields.buffer_mut(layer.slot).apply_ripples(
                &self.ripples,
                now_sec,
                layer.scale,
                &self.budget,
            );
        }
    }

    fn build_plan(&mut self, now_sec: f64, layers: SmallVec<[LayerPlan; 2]>) {
        let (w, h) = (self.width as f32, self.height as f32);
        let center = field_center(self.width, self.height);
        let palette = self.palette;
        let plan = &mut self.plan;
        plan.clear();
        plan.viewport = [w, h];
        plan.center = center.to_array();
        plan.background = palette.background;

        for layer in &layers {
            let layout = self.fields.buffer(layer.slot).layout();
            let color = with_alpha(palette.chunk_line, layer.alpha);
            for line in &layout.chunk_lines {
                let scaled = LineSegment {
                    a: center + line.a * layer.scale,
                    b: center + line.b * layer.scale,
                    width: (line.width * layer.scale).max(0.5),
                };
                plan.push_line(&scaled, color);
            }
        }
        plan.layers = layers;

        let band = NUMBER_LINE_BAND_PX.min(h * 0.25);
        let axis_y = h - band / 2.0;
        let field_top = (center.y - self.fields.buffer(self.fields.active()).layout().half_height())
            .max(0.0);
        plan.push_line(
            &LineSegment {
                a: Vec2::new(0.0, axis_y),
                b: Vec2::new(w, axis_y),
                width: 2.0,
            },
            palette.axis,
        );
        plan.push_line(
            &LineSegment {
                a: Vec2::new(center.x, field_top),
                b: Vec2::new(center.x, axis_y),
                width: 1.5,
            },
            palette.axis,
        );

        let tick_h = band * 0.22;
        let eased = self.transition.as_ref().map(|t| t.eased(now_sec));
        let place = |v: f64| match (&self.transition, eased) {
            (Some(t), Some(e)) => t.position_for(v, e),
            _ => self.mapping.position_for(v),
        };
        match (&self.transition, eased) {
            (Some(t), Some(e)) => {
                push_ticks(plan, &t.from_mapping, &place, t.outgoing_alpha(e), axis_y, tick_h, &palette);
                push_ticks(plan, &t.to_mapping, &place, t.incoming_alpha(e), axis_y, tick_h, &palette);
            }
            _ => push_ticks(plan, &self.mapping, &place, 1.0, axis_y, tick_h, &palette),
        }

        let markers = [
            (Some(self.markers.a()), palette.marker_a),
            (self.markers.b(), palette.marker_b),
        ];
        for (value, color) in markers {
            if let Some(v) = value {
                let x = place(v) as f32;
                plan.push_line(
                    &LineSegment {
                        a: Vec2::new(x, field_top),
                        b: Vec2::new(x, axis_y + tick_h),
                        width: 2.0,
                    },
                    color,
                );
            }
        }
    }
}

#[inline]
fn with_alpha(c: [f32; 4], alpha: f32) -> [f32; 4] {
    [c[0], c[1], c[2], c[3] * alpha.clamp(0.0, 1.0)]
}

/// Ticks at every unit of `values`, placed by `position`.
#[allow(clippy::too_many_arguments)]
fn push_ticks(
    plan: &mut FramePlan,
    values: &CoordinateMapping,
    position: impl Fn(f64) -> f64,
    alpha: f64,
    axis_y: f32,
    tick_h: f32,
    palette: &Palette,
) {
    if alpha <= 0.0 {
        return;
    }
    let n = crate::constants::UNITS_PER_HALF as i64;
    let color = with_alpha(palette.tick, alpha as f32);
    for i in -n..=n {
        let x = position(i as f64 * values.unit_value) as f32;
        let h = if i == 0 || i.abs() == n { tick_h * 2.0 } else { tick_h };
        plan.push_line(
            &LineSegment {
                a: Vec2::new(x, axis_y - h),
                b: Vec2::new(x, axis_y + h),
                width: 1.0,
            },
            color,
        );
    }
}
