use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{FrameConfig, OutputConfig};
use crate::error::{FrameError, FrameWarning, Result};
use crate::frame::{Background, Compositor, Frame, FrameArtifact, FrameSink, PngSequenceWriter};

/// What saving a frame with nothing composited onto it does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyFramePolicy {
    /// Save it and report a warning
    #[default]
    Warn,
    /// Save it silently
    Allow,
    /// Refuse to save it
    Error,
}

/// Lifecycle of the working canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No canvas allocated yet
    Empty,
    /// Canvas allocated and possibly composited onto
    Open,
    /// A frame was just saved; the canvas is a fresh copy of the background
    Saved,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    /// One artifact per written copy, in frame order
    pub artifacts: Vec<FrameArtifact>,
    pub warning: Option<FrameWarning>,
}

impl SaveReport {
    /// Index of the first frame written
    pub fn frame_index(&self) -> Option<u64> {
        self.artifacts.first().map(|a| a.frame_index)
    }
}

/// Owns the working canvas and the frame counter
///
/// Sprites are composited onto the canvas until [`save`](Self::save) hands it
/// to the sink, after which a fresh canvas is initialised from the background
/// and the counter moves on. The counter only advances for frames the sink
/// actually wrote.
pub struct FrameBuffer<S: FrameSink = PngSequenceWriter> {
    background: Background,
    canvas: Option<Frame>,
    state: FrameState,
    composites: usize,
    frame_counter: u64,
    empty_policy: EmptyFramePolicy,
    sink: S,
}

impl FrameBuffer<PngSequenceWriter> {
    /// Buffer writing a PNG sequence as configured
    pub fn from_config(frame: &FrameConfig, output: &OutputConfig) -> Self {
        FrameBuffer::new(Background::from_config(frame), PngSequenceWriter::new(output.clone()))
            .with_empty_frame_policy(frame.empty_frame_policy)
    }
}

impl<S: FrameSink> FrameBuffer<S> {
    pub fn new(background: Background, sink: S) -> Self {
        Self {
            background,
            canvas: None,
            state: FrameState::Empty,
            composites: 0,
            frame_counter: 0,
            empty_policy: EmptyFramePolicy::default(),
            sink,
        }
    }

    pub fn with_empty_frame_policy(mut self, policy: EmptyFramePolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    pub fn set_empty_frame_policy(&mut self, policy: EmptyFramePolicy) {
        self.empty_policy = policy;
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Index the next saved frame will get
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Number of composites onto the current canvas
    pub fn composited(&self) -> usize {
        self.composites
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Replace the background template
    ///
    /// An untouched canvas is re-initialised right away; a canvas with
    /// composites on it keeps them and the new template applies from the
    /// next frame.
    pub fn set_background(&mut self, background: Background) {
        self.background = background;
        if self.composites == 0 && self.canvas.is_some() {
            self.canvas = Some(self.background.canvas());
        }
        debug!("Background set to {}x{}", self.background.dimensions().0, self.background.dimensions().1);
    }

    /// Make sure a canvas exists and return it
    pub fn open(&mut self) -> &mut Frame {
        self.state = FrameState::Open;
        let background = &self.background;
        self.canvas.get_or_insert_with(|| background.canvas())
    }

    /// Current canvas, if one has been allocated
    pub fn canvas(&self) -> Option<&Frame> {
        self.canvas.as_ref()
    }

    /// Direct canvas access; counts as drawing onto the frame
    pub fn canvas_mut(&mut self) -> &mut Frame {
        self.composites += 1;
        self.open()
    }

    /// Blend `sprite` onto the canvas with its top-left corner at `position`
    ///
    /// Returns whether any of it landed on the canvas. A sprite clipped away
    /// entirely still counts as a composite.
    pub fn composite(&mut self, sprite: &RgbaImage, position: (i64, i64)) -> bool {
        self.composites += 1;
        let canvas = self.open();
        let visible = Compositor::paste(canvas, sprite, position);
        if !visible {
            debug!("Sprite at {:?} is entirely outside the canvas", position);
        }
        visible
    }

    /// Write the canvas as the next frame and start a fresh one
    pub fn save(&mut self) -> Result<SaveReport> {
        self.save_repeated(1)
    }

    /// Write the canvas as the next `count` frames
    ///
    /// Used to hold a pose for several frames. All or nothing: if the sink
    /// fails part way, the copies already written are discarded, the counter
    /// is left where it was and the canvas is kept for a retry.
    pub fn save_repeated(&mut self, count: u32) -> Result<SaveReport> {
        if count == 0 {
            return Err(FrameError::InvalidRepeat { count }.into());
        }

        let frame_index = self.frame_counter;
        let mut warning = None;
        if self.composites == 0 {
            match self.empty_policy {
                EmptyFramePolicy::Error => return Err(FrameError::EmptyFrame { frame_index }.into()),
                EmptyFramePolicy::Warn => {
                    warn!("Saving frame {} with nothing composited onto it", frame_index);
                    warning = Some(FrameWarning::EmptyFrame { frame_index });
                }
                EmptyFramePolicy::Allow => {}
            }
        }

        let background = &self.background;
        let canvas = self.canvas.get_or_insert_with(|| background.canvas());

        let mut artifacts = Vec::with_capacity(count as usize);
        for offset in 0..u64::from(count) {
            match self.sink.write_frame(frame_index + offset, canvas) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    for written in artifacts.iter().rev() {
                        if let Err(discard) = self.sink.discard_frame(written) {
                            warn!("Could not discard frame {}: {}", written.frame_index, discard);
                        }
                    }
                    return Err(e);
                }
            }
        }
        self.frame_counter = frame_index + u64::from(count);

        self.canvas = Some(self.background.canvas());
        self.composites = 0;
        self.state = FrameState::Saved;

        if count > 1 {
            info!(
                "Saved frames {}..={} via {}",
                frame_index,
                self.frame_counter - 1,
                self.sink.name()
            );
        } else {
            debug!("Saved frame {} via {}", frame_index, self.sink.name());
        }

        Ok(SaveReport { artifacts, warning })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
