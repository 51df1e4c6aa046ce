//! Frame-number search windows around a reference frame

use serde::{Deserialize, Serialize};

use crate::types::{FrameNumber, HYPERFRAME};

/// Frames in one control channel multiframe.
pub const MULTIFRAME: u32 = 51;

/// Frames between two SACCH messages of the same subchannel.
pub const SACCH_PERIOD: u32 = 102;

/// Multiframes after an Immediate Assignment searched for the Cipher Mode Command.
pub const CMC_SEARCH_MULTIFRAMES: u32 = 10_000;

/// Frames before the Cipher Mode Command kept for SACCH reference lookup.
pub const ANALYSIS_LOOKBEHIND: u32 = 2 * SACCH_PERIOD;

/// Frames after the Cipher Mode Command covering three SACCH messages.
pub const ANALYSIS_LOOKAHEAD: u32 = 3 * SACCH_PERIOD + 3;

/// Closed interval of frame numbers.
///
/// When `start > end` the window wraps across the end of the hyperframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameWindow {
    start: FrameNumber,
    end: FrameNumber,
}

impl FrameWindow {
    pub fn new(start: FrameNumber, end: FrameNumber) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> FrameNumber {
        self.start
    }

    pub fn end(&self) -> FrameNumber {
        self.end
    }

    /// Returns true if the window crosses frame 0.
    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    /// Number of frames in the window, both ends included.
    pub fn frame_count(&self) -> u32 {
        self.end.frames_since(self.start) + 1
    }

    pub fn contains(&self, frame: FrameNumber) -> bool {
        frame.frames_since(self.start) <= self.end.frames_since(self.start)
    }

    /// Position of `frame` counted from the window start, if inside.
    pub fn position_of(&self, frame: FrameNumber) -> Option<u32> {
        self.contains(frame).then(|| frame.frames_since(self.start))
    }
}

/// Computes the frame windows requested from the decoding pipeline.
pub struct FrameWindowPlanner;

impl FrameWindowPlanner {
    /// Window searched for the Cipher Mode Command following an Immediate
    /// Assignment: `[F, F + 51 * 10000]`.
    pub fn cmc_search(assignment: FrameNumber) -> FrameWindow {
        let span = MULTIFRAME * CMC_SEARCH_MULTIFRAMES;
        debug_assert!(span < HYPERFRAME);
        FrameWindow::new(assignment, assignment.offset(i64::from(span)))
    }

    /// Window analysed by both attack phases: `[F - 204, F + 309]`.
    pub fn analysis(cmc: FrameNumber) -> FrameWindow {
        FrameWindow::new(
            cmc.offset(-i64::from(ANALYSIS_LOOKBEHIND)),
            cmc.offset(i64::from(ANALYSIS_LOOKAHEAD)),
        )
    }
}
