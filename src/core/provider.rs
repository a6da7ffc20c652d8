//! Landmark providers: frame in, optional landmark set out
//!
//! The pose model itself lives outside this crate. Anything that can turn a
//! frame into 33 normalized landmarks implements [`LandmarkProvider`]; the crate
//! ships a trace replayer and a provider that never sees anyone.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use image::RgbImage;
use tracing::info;

use crate::types::LandmarkSet;
use crate::{Error, Result};

/// Capability interface over the pose-landmark model
pub trait LandmarkProvider {
    /// `Ok(None)` means the model ran and found no person
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<LandmarkSet>>;
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for Box<P> {
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<LandmarkSet>> {
        (**self).detect(frame)
    }
}

/// Provider that never detects anybody
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProvider;

impl LandmarkProvider for NullProvider {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Option<LandmarkSet>> {
        Ok(None)
    }
}

/// Replays a recorded landmark trace, one entry per frame.
///
/// Trace format is JSON lines: each line is an array of 33
/// `{"x", "y", "z"?, "visibility"?}` objects, or `null` for a frame without a
/// person. Blank lines are skipped.
#[derive(Debug, Clone)]
pub struct ReplayProvider {
    frames: Vec<Option<LandmarkSet>>,
    cursor: usize,
    looping: bool,
}

impl ReplayProvider {
    pub fn from_frames(frames: Vec<Option<LandmarkSet>>) -> Self {
        Self {
            frames,
            cursor: 0,
            looping: false,
        }
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry: Option<LandmarkSet> = serde_json::from_str(line)
                .map_err(|source| Error::Trace { line: idx + 1, source })?;
            frames.push(entry);
        }
        Ok(Self::from_frames(frames))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let provider = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), frames = provider.len(), "loaded landmark trace");
        Ok(provider)
    }

    /// Start over from the first entry once the trace is exhausted
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkProvider for ReplayProvider {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Option<LandmarkSet>> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(None);
            }
            self.cursor = 0;
        }
        let entry = self.frames[self.cursor].clone();
        self.cursor += 1;
        Ok(entry)
    }
}
