//! Canvas surfaces and their one-time transfer to the worker

use painting::Raster;

use crate::error::TransferError;

/// Receives a raster every time the worker finishes drawing a canvas
pub trait FrameSink: Send {
    fn present(&mut self, raster: &Raster);
}

/// One on-screen canvas: pixels plus where they are shown
pub struct CanvasSurface {
    raster: Raster,
    sink: Option<Box<dyn FrameSink>>,
}

impl std::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("raster", &self.raster)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl CanvasSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::new(width, height),
            sink: None,
        }
    }

    pub fn with_sink(width: u32, height: u32, sink: impl FrameSink + 'static) -> Self {
        Self {
            raster: Raster::new(width, height),
            sink: Some(Box::new(sink)),
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn raster_mut(&mut self) -> &mut Raster {
        &mut self.raster
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.raster.resize(width, height);
    }

    /// Hand the current pixels to the sink, if any
    pub fn present(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.present(&self.raster);
        }
    }
}

/// The canvases a worker draws into. Move-only: sending it to the worker
/// gives the worker sole ownership.
#[derive(Debug)]
pub struct CanvasSet {
    pub background: CanvasSurface,
    pub overlay: CanvasSurface,
}

impl CanvasSet {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            background: CanvasSurface::new(width, height),
            overlay: CanvasSurface::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.background.raster().width
    }

    pub fn height(&self) -> u32 {
        self.background.raster().height
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.background.resize(width, height);
        self.overlay.resize(width, height);
    }
}

/// Holds canvases until their single transfer to a worker
#[derive(Debug)]
pub struct CanvasSlot {
    canvases: Option<CanvasSet>,
}

impl CanvasSlot {
    pub fn new(canvases: CanvasSet) -> Self {
        Self {
            canvases: Some(canvases),
        }
    }

    pub fn is_transferred(&self) -> bool {
        self.canvases.is_none()
    }

    /// Give up ownership. A second call is an error.
    pub fn take(&mut self) -> Result<CanvasSet, TransferError> {
        self.canvases.take().ok_or(TransferError::AlreadyTransferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(Arc<AtomicUsize>);

    impl FrameSink for Counter {
        fn present(&mut self, _raster: &Raster) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_slot_transfers_once() {
        let mut slot = CanvasSlot::new(CanvasSet::new(8, 8));
        assert!(!slot.is_transferred());
        let canvases = slot.take().unwrap();
        assert_eq!((canvases.width(), canvases.height()), (8, 8));
        assert!(slot.is_transferred());
        assert_eq!(slot.take().unwrap_err(), TransferError::AlreadyTransferred);
    }

    #[test]
    fn test_present_reaches_sink() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut surface = CanvasSurface::with_sink(4, 4, Counter(count.clone()));
        surface.present();
        surface.present();
        assert_eq!(count.load(Ordering::SeqCst), 2);

        // No sink, nothing to do
        CanvasSurface::new(4, 4).present();
    }
}
