//! Backend selection and the one-way GPU → CPU degradation.

use crate::constants::{PROBE_AFTER_FRAMES, PROBE_BLACK_THRESHOLD};
use crate::error::BackendError;
use crate::scene::FrameView;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Instanced GPU rendering.
    Gpu,
    /// CPU 2D rasterization.
    Canvas2d,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    Unavailable,
    ContextLost,
    BlackFrame,
    DrawFailed,
}

impl From<&BackendError> for FallbackReason {
    fn from(e: &BackendError) -> Self {
        match e {
            BackendError::Unavailable(_) => FallbackReason::Unavailable,
            BackendError::ContextLost => FallbackReason::ContextLost,
            BackendError::Surface(_) | BackendError::Draw(_) => FallbackReason::DrawFailed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeVerdict {
    Healthy,
    Black,
    Unreadable,
}

/// Classify a sampled RGBA pixel. Transparent or near-black counts as broken
/// because the field always clears to a visible background color.
pub fn classify_probe(pixel: Option<[u8; 4]>) -> ProbeVerdict {
    match pixel {
        None => ProbeVerdict::Unreadable,
        Some([r, g, b, a]) => {
            let sum = r as u16 + g as u16 + b as u16;
            if a == 0 || sum <= PROBE_BLACK_THRESHOLD {
                ProbeVerdict::Black
            } else {
                ProbeVerdict::Healthy
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ProbeState {
    Waiting { frames_left: u32 },
    Done,
}

#[derive(Clone, Debug)]
pub struct BackendSelector {
    kind: BackendKind,
    probe: ProbeState,
    degraded: Option<FallbackReason>,
}

impl BackendSelector {
    pub fn new(gpu_available: bool) -> Self {
        if gpu_available {
            Self {
                kind: BackendKind::Gpu,
                probe: ProbeState::Waiting {
                    frames_left: PROBE_AFTER_FRAMES,
                },
                degraded: None,
            }
        } else {
            Self {
                kind: BackendKind::Canvas2d,
                probe: ProbeState::Done,
                degraded: Some(FallbackReason::Unavailable),
            }
        }
    }

    #[inline]
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn degraded(&self) -> Option<FallbackReason> {
        self.degraded
    }

    /// Count a presented frame; true when the probe should be taken now.
    pub fn on_frame_presented(&mut self) -> bool {
        if self.kind != BackendKind::Gpu {
            return false;
        }
        match &mut self.probe {
            ProbeState::Waiting { frames_left } => {
                *frames_left = frames_left.saturating_sub(1);
                *frames_left == 0
            }
            ProbeState::Done => false,
        }
    }

    /// Record the probe result. A black frame degrades permanently.
    pub fn record_probe(&mut self, pixel: Option<[u8; 4]>) -> ProbeVerdict {
        self.probe = ProbeState::Done;
        let verdict = classify_probe(pixel);
        match verdict {
            ProbeVerdict::Black => {
                self.degrade(FallbackReason::BlackFrame);
            }
            ProbeVerdict::Unreadable => {
                log::info!("[backend] probe pixel unreadable; keeping GPU path");
            }
            ProbeVerdict::Healthy => {
                log::info!("[backend] GPU output verified");
            }
        }
        verdict
    }

    /// Switch to the CPU path. Returns true only on the first call.
    pub fn degrade(&mut self, reason: FallbackReason) -> bool {
        if self.kind == BackendKind::Canvas2d {
            return false;
        }
        log::warn!("[backend] GPU path disabled ({:?}); using Canvas2D", reason);
        self.kind = BackendKind::Canvas2d;
        self.probe = ProbeState::Done;
        self.degraded = Some(reason);
        true
    }
}

/// A surface that can draw a [`FrameView`].
pub trait RenderBackend {
    fn kind(&self) -> BackendKind;

    /// Reconfigure for a new backing size in device pixels.
    fn resize(&mut self, width: u32, height: u32);

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), BackendError>;

    fn is_context_lost(&self) -> bool {
        false
    }

    /// Read back one presented pixel, if the backend can.
    fn sample_pixel(&mut self) -> Option<[u8; 4]> {
        None
    }
}

pub type BackendFactory = Box<dyn FnMut() -> Result<Box<dyn RenderBackend>, BackendError>>;

/// Owns the active backend and swaps to the fallback on detected failure.
pub struct Presenter {
    backend: Box<dyn RenderBackend>,
    selector: BackendSelector,
    fallback: Option<BackendFactory>,
    size: (u32, u32),
}

impl Presenter {
    /// `primary` is the GPU backend when one could be created.
    pub fn new(
        primary: Option<Box<dyn RenderBackend>>,
        mut fallback: BackendFactory,
        size: (u32, u32),
    ) -> Result<Self, BackendError> {
        let (backend, selector, fallback) = match primary {
            Some(b) => (b, BackendSelector::new(true), Some(fallback)),
            None => (fallback()?, BackendSelector::new(false), None),
        };
        let mut p = Self {
            backend,
            selector,
            fallback,
            size,
        };
        p.backend.resize(size.0, size.1);
        Ok(p)
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn selector(&self) -> &BackendSelector {
        &self.selector
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.backend.resize(width, height);
    }

    /// Draw one frame, degrading to the fallback on any GPU failure.
    pub fn present(&mut self, frame: &FrameView<'_>) -> Result<(), BackendError> {
        if self.backend.is_context_lost() {
            self.switch(FallbackReason::ContextLost)?;
        }
        match self.backend.draw(frame) {
            Ok(()) => {}
            Err(e) => {
                log::error!("[backend] draw error: {e}");
                self.switch(FallbackReason::from(&e))?;
                return self.backend.draw(frame);
            }
        }
        if self.selector.on_frame_presented() {
            let pixel = self.backend.sample_pixel();
            if self.selector.record_probe(pixel) == ProbeVerdict::Black {
                self.install_fallback()?;
                return self.backend.draw(frame);
            }
        }
        Ok(())
    }

    fn switch(&mut self, reason: FallbackReason) -> Result<(), BackendError> {
        if !self.selector.degrade(reason) {
            return Err(BackendError::Unavailable(format!(
                "fallback already active ({reason:?})"
            )));
        }
        self.install_fallback()
    }

    fn install_fallback(&mut self) -> Result<(), BackendError> {
        let mut factory = self
            .fallback
            .take()
            .ok_or_else(|| BackendError::Unavailable("no fallback backend".into()))?;
        let mut backend = factory()?;
        backend.resize(self.size.0, self.size.1);
        self.backend = backend;
        Ok(())
    }
}
