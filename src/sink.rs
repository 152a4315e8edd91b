use crate::core::{FrameIndex, FrameRgb};
use crate::error::StillglowResult;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone, Copy)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: u32,
}

/// Sink contract for consuming synthesized frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order within the
/// requested render range, regardless of how the frames were produced. A failed push aborts the
/// render; there are no partial-success semantics.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StillglowResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> StillglowResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> StillglowResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRgb)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames, in timeline order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgb)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StillglowResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> StillglowResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> StillglowResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_resets_captured_frames() {
        let cfg = SinkConfig {
            width: 2,
            height: 2,
            fps: 30,
        };
        let mut sink = InMemorySink::new();
        sink.begin(cfg).unwrap();
        sink.push_frame(FrameIndex(0), &FrameRgb::black(2, 2)).unwrap();
        assert_eq!(sink.frames().len(), 1);

        sink.begin(cfg).unwrap();
        assert!(sink.frames().is_empty());
        assert_eq!(sink.config().map(|c| c.fps), Some(30));
    }
}
