//! Frame sources and the primary/fallback opening rule

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};
use tracing::{error, info, warn};

use crate::{Error, Result};

/// Something that yields RGB frames, blocking until one is ready.
///
/// Returns `Err(Error::EndOfStream)` once no more frames will come.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<RgbImage>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read_frame(&mut self) -> Result<RgbImage> {
        (**self).read_frame()
    }
}

/// Where frames come from, as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// `camera:<index>`
    Camera(i32),
    /// `synthetic` or `synthetic:<W>x<H>`
    Synthetic { width: u32, height: u32 },
    /// `dir:<path>` - still images played in name order, looping
    Directory(PathBuf),
}

impl FromStr for SourceSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSourceSpec(s.to_string());
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s, None),
        };

        match (kind, arg) {
            ("camera", Some(index)) => index.parse().map(SourceSpec::Camera).map_err(|_| invalid()),
            ("synthetic", None) => Ok(SourceSpec::Synthetic {
                width: 640,
                height: 480,
            }),
            ("synthetic", Some(size)) => {
                let (w, h) = size.split_once('x').ok_or_else(invalid)?;
                let width: u32 = w.parse().map_err(|_| invalid())?;
                let height: u32 = h.parse().map_err(|_| invalid())?;
                if width == 0 || height == 0 {
                    return Err(invalid());
                }
                Ok(SourceSpec::Synthetic { width, height })
            }
            ("dir", Some(path)) if !path.is_empty() => Ok(SourceSpec::Directory(PathBuf::from(path))),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Camera(index) => write!(f, "camera:{}", index),
            SourceSpec::Synthetic { width, height } => write!(f, "synthetic:{}x{}", width, height),
            SourceSpec::Directory(path) => write!(f, "dir:{}", path.display()),
        }
    }
}

/// Try `primary`, then exactly once `fallback`.
///
/// Fails cleanly naming both specs when neither opens.
pub fn open_with_fallback<S, F>(primary: &SourceSpec, fallback: &SourceSpec, mut open: F) -> Result<S>
where
    F: FnMut(&SourceSpec) -> Result<S>,
{
    match open(primary) {
        Ok(source) => {
            info!(source = %primary, "opened frame source");
            return Ok(source);
        }
        Err(e) => warn!(source = %primary, error = %e, "primary frame source failed, trying fallback"),
    }

    match open(fallback) {
        Ok(source) => {
            info!(source = %fallback, "opened fallback frame source");
            Ok(source)
        }
        Err(e) => {
            error!(source = %fallback, error = %e, "fallback frame source failed");
            Err(Error::SourceUnavailable {
                primary: primary.to_string(),
                fallback: fallback.to_string(),
            })
        }
    }
}

/// Open a source from its spec. `fps` paces synthetic and directory sources.
pub fn open_source(spec: &SourceSpec, fps: u32) -> Result<Box<dyn FrameSource + Send>> {
    let pacer = Pacer::from_fps(fps);
    match spec {
        SourceSpec::Camera(index) => open_camera(*index),
        SourceSpec::Synthetic { width, height } => {
            Ok(Box::new(SyntheticSource::new(*width, *height).with_pacer(pacer)))
        }
        SourceSpec::Directory(path) => Ok(Box::new(ImageSequenceSource::open(path)?.with_pacer(pacer))),
    }
}

#[cfg(feature = "camera")]
fn open_camera(index: i32) -> Result<Box<dyn FrameSource + Send>> {
    Ok(Box::new(crate::core::camera::CameraSource::open(index)?))
}

#[cfg(not(feature = "camera"))]
fn open_camera(index: i32) -> Result<Box<dyn FrameSource + Send>> {
    Err(Error::CameraUnavailable {
        index,
        reason: "built without the `camera` feature".to_string(),
    })
}

/// Sleeps so that frames come out no faster than a target rate
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// `fps == 0` disables pacing
    pub fn from_fps(fps: u32) -> Self {
        let interval = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / fps as f64)
        };
        Self::new(interval)
    }

    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Endless test-pattern frames, for running without a camera
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame: u64,
    pacer: Pacer,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: 0,
            pacer: Pacer::new(Duration::ZERO),
        }
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }
}

impl FrameSource for SyntheticSource {
    fn read_frame(&mut self) -> Result<RgbImage> {
        self.pacer.wait();
        // dark vertical gradient with a slowly drifting tint
        let tint = (self.frame % 64) as u8;
        let height = self.height.max(1);
        let frame = RgbImage::from_fn(self.width, self.height, |_, y| {
            let shade = (40 * y / height) as u8 + 20;
            Rgb([shade, shade, shade.saturating_add(tint / 4)])
        });
        self.frame += 1;
        Ok(frame)
    }
}

/// Plays a directory of still images in file-name order, looping forever
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    pacer: Pacer,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

impl ImageSequenceSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(Error::FrameRead(format!("no images in {}", dir.display())));
        }
        info!(dir = %dir.display(), images = paths.len(), "opened image sequence");

        Ok(Self {
            paths,
            cursor: 0,
            pacer: Pacer::new(Duration::ZERO),
        })
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }
}

impl FrameSource for ImageSequenceSource {
    fn read_frame(&mut self) -> Result<RgbImage> {
        self.pacer.wait();
        let path = &self.paths[self.cursor];
        self.cursor = (self.cursor + 1) % self.paths.len();
        Ok(image::open(path)?.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_specs() {
        assert_eq!("camera:1".parse::<SourceSpec>().unwrap(), SourceSpec::Camera(1));
        assert_eq!(
            "synthetic".parse::<SourceSpec>().unwrap(),
            SourceSpec::Synthetic { width: 640, height: 480 }
        );
        assert_eq!(
            "synthetic:320x240".parse::<SourceSpec>().unwrap(),
            SourceSpec::Synthetic { width: 320, height: 240 }
        );
        assert_eq!(
            "dir:/tmp/frames".parse::<SourceSpec>().unwrap(),
            SourceSpec::Directory(PathBuf::from("/tmp/frames"))
        );
    }

    #[test]
    fn test_reject_bad_specs() {
        for bad in ["camera", "camera:x", "synthetic:0x10", "synthetic:640", "dir:", "usb:0"] {
            assert!(bad.parse::<SourceSpec>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_display_round_trip() {
        let spec = SourceSpec::Synthetic { width: 32, height: 24 };
        assert_eq!(spec.to_string().parse::<SourceSpec>().unwrap(), spec);
    }

    #[test]
    fn test_primary_wins() {
        let mut tried = Vec::new();
        let opened = open_with_fallback(&SourceSpec::Camera(0), &SourceSpec::Camera(1), |spec| {
            tried.push(spec.clone());
            Ok(spec.clone())
        })
        .unwrap();
        assert_eq!(opened, SourceSpec::Camera(0));
        assert_eq!(tried, vec![SourceSpec::Camera(0)]);
    }

    #[test]
    fn test_fallback_tried_once() {
        let mut tried = Vec::new();
        let opened = open_with_fallback(&SourceSpec::Camera(0), &SourceSpec::Camera(1), |spec| {
            tried.push(spec.clone());
            match spec {
                SourceSpec::Camera(0) => Err(Error::FrameRead("busy".into())),
                _ => Ok(spec.clone()),
            }
        })
        .unwrap();
        assert_eq!(opened, SourceSpec::Camera(1));
        assert_eq!(tried.len(), 2);
    }

    #[test]
    fn test_both_fail_cleanly() {
        let mut attempts = 0;
        let err = open_with_fallback::<(), _>(&SourceSpec::Camera(0), &SourceSpec::Camera(1), |_| {
            attempts += 1;
            Err(Error::FrameRead("nope".into()))
        })
        .unwrap_err();
        assert_eq!(attempts, 2);
        assert_eq!(
            err.to_string(),
            "no frame source could be opened (tried camera:0 and camera:1)"
        );
    }

    #[cfg(not(feature = "camera"))]
    #[test]
    fn test_camera_needs_feature() {
        let err = open_source(&SourceSpec::Camera(0), 30).err().unwrap();
        assert!(matches!(err, Error::CameraUnavailable { index: 0, .. }));
    }

    #[test]
    fn test_synthetic_frames() {
        let mut source = SyntheticSource::new(64, 48);
        let frame = source.read_frame().unwrap();
        assert_eq!(frame.dimensions(), (64, 48));
    }

    #[test]
    fn test_image_sequence_loops() {
        let dir = std::env::temp_dir().join(format!("postureguard-seq-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        RgbImage::new(8, 6).save(dir.join("a.png")).unwrap();
        RgbImage::new(10, 6).save(dir.join("b.png")).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut source = ImageSequenceSource::open(&dir).unwrap();
        assert_eq!(source.read_frame().unwrap().width(), 8);
        assert_eq!(source.read_frame().unwrap().width(), 10);
        assert_eq!(source.read_frame().unwrap().width(), 8);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_directory_fails() {
        let dir = std::env::temp_dir().join(format!("postureguard-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(ImageSequenceSource::open(&dir).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
