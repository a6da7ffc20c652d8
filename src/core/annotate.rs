//! Frame annotation: skeleton, header band with status text and health bar
//!
//! Shapes are drawn with `imageproc`, text with an `ab_glyph` font. All drawing
//! is clipped to the frame; without a font the text layer is skipped.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info};

use crate::types::{FrameOutcome, LandmarkSet, Profile, Stats, VerdictStyle};
use crate::{Error, Result, SCORE_MAX};

pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const METRICS_GRAY: Rgb<u8> = Rgb([200, 200, 200]);
const BAR_TRACK: Rgb<u8> = Rgb([50, 50, 50]);

/// Height of the darkened header band
const HEADER_HEIGHT: u32 = 90;
/// Share of black blended into the header band
const HEADER_DARKEN: f32 = 0.7;
const HEADER_STRIP: u32 = 6;
const BAR_MARGIN: u32 = 50;
const JOINT_RADIUS: i32 = 3;

/// Font files tried, in order, when no font is given
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// BlazePose skeleton edges
#[rustfmt::skip]
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    (0, 1), (1, 2), (2, 3), (3, 7), (0, 4), (4, 5), (5, 6), (6, 8),
    (9, 10),
    (11, 12), (11, 13), (13, 15), (15, 17), (15, 19), (15, 21), (17, 19),
    (12, 14), (14, 16), (16, 18), (16, 20), (16, 22), (18, 20),
    (11, 23), (12, 24), (23, 24),
    (23, 25), (24, 26), (25, 27), (26, 28), (27, 29), (28, 30), (29, 31), (30, 32), (27, 31), (28, 32),
];

/// One line of overlay text; `(x, y)` is the top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub size: f32,
    pub color: Rgb<u8>,
}

/// Color for the current verdict: green good, red bad, yellow otherwise
pub fn verdict_color(outcome: &FrameOutcome) -> Rgb<u8> {
    match outcome.assessment() {
        Some(a) if a.is_bad => RED,
        Some(_) => GREEN,
        None => YELLOW,
    }
}

/// Text overlay for an assessed frame: status, metrics and, when the score is
/// tracked, `SPINE HP: N%` above the health bar.
pub fn labels(outcome: &FrameOutcome, stats: &Stats, profile: &Profile, height: u32) -> Vec<Label> {
    let Some(assessment) = outcome.assessment() else {
        return Vec::new();
    };
    let color = verdict_color(outcome);
    let style = profile.style;

    let mut labels = match style {
        VerdictStyle::Detailed => vec![
            Label {
                text: assessment.status_text(style),
                x: 20,
                y: 16,
                size: 26.0,
                color,
            },
            Label {
                text: assessment.metrics_text(style),
                x: 20,
                y: 52,
                size: 20.0,
                color: METRICS_GRAY,
            },
        ],
        VerdictStyle::Binary => vec![
            Label {
                text: assessment.status_text(style),
                x: 50,
                y: 12,
                size: 32.0,
                color,
            },
            Label {
                text: assessment.metrics_text(style),
                x: 50,
                y: 52,
                size: 24.0,
                color: YELLOW,
            },
        ],
    };

    if profile.track_score {
        labels.push(Label {
            text: format!("SPINE HP: {}%", stats.score),
            x: BAR_MARGIN as i32,
            y: height as i32 - 68,
            size: 20.0,
            color: WHITE,
        });
    }
    labels
}

/// Draws the per-frame overlay. Holds the font, if one could be loaded.
#[derive(Default)]
pub struct Annotator {
    font: Option<FontVec>,
}

impl Annotator {
    /// Shapes only, no text
    pub fn without_text() -> Self {
        Self { font: None }
    }

    pub fn with_font(font: FontVec) -> Self {
        Self { font: Some(font) }
    }

    /// Load a TrueType/OpenType font file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| Error::Font {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "loaded overlay font");
        Ok(Self::with_font(font))
    }

    /// First usable font among the usual system locations
    pub fn discover() -> Self {
        for candidate in SYSTEM_FONTS {
            let path = PathBuf::from(candidate);
            if !path.is_file() {
                continue;
            }
            match Self::load(&path) {
                Ok(annotator) => return annotator,
                Err(e) => debug!(path = %path.display(), error = %e, "skipping font"),
            }
        }
        info!("no overlay font found; frames will carry no status text");
        Self::without_text()
    }

    pub fn has_text(&self) -> bool {
        self.font.is_some()
    }

    /// Draw the overlay for one processed frame in place
    pub fn annotate(
        &self,
        frame: &mut RgbImage,
        landmarks: Option<&LandmarkSet>,
        outcome: &FrameOutcome,
        stats: &Stats,
        profile: &Profile,
    ) {
        let color = verdict_color(outcome);

        if let Some(set) = landmarks {
            draw_skeleton(frame, set, color);
        }

        if outcome.assessment().is_none() {
            return;
        }
        draw_header(frame, color);
        if profile.track_score {
            draw_health_bar(frame, stats.score, color);
        }
        if let Some(font) = &self.font {
            for label in labels(outcome, stats, profile, frame.height()) {
                draw_text_mut(
                    frame,
                    label.color,
                    label.x,
                    label.y,
                    PxScale::from(label.size),
                    font,
                    &label.text,
                );
            }
        }
    }
}

pub fn draw_skeleton(frame: &mut RgbImage, set: &LandmarkSet, joint_color: Rgb<u8>) {
    let (w, h) = frame.dimensions();
    let (wf, hf) = (w as f64, h as f64);
    // points further than one frame away are dropped rather than walked
    let pixel = |index: usize| {
        set.get(index).and_then(|lm| {
            let p = lm.to_pixel(w, h);
            let reachable = p.x.is_finite() && p.y.is_finite() && p.x.abs() <= 2.0 * wf && p.y.abs() <= 2.0 * hf;
            reachable.then_some((p.x as f32, p.y as f32))
        })
    };

    for &(a, b) in POSE_CONNECTIONS.iter() {
        if let (Some(pa), Some(pb)) = (pixel(a), pixel(b)) {
            draw_line_segment_mut(frame, pa, pb, WHITE);
            draw_line_segment_mut(frame, (pa.0 + 1.0, pa.1), (pb.0 + 1.0, pb.1), WHITE);
        }
    }
    for index in 0..crate::LANDMARK_COUNT {
        if let Some((x, y)) = pixel(index) {
            draw_filled_circle_mut(frame, (x.round() as i32, y.round() as i32), JOINT_RADIUS, joint_color);
        }
    }
}

/// Darken the top band and underline it in the verdict color
pub fn draw_header(frame: &mut RgbImage, color: Rgb<u8>) {
    let (w, h) = frame.dimensions();
    let band = HEADER_HEIGHT.min(h);
    let keep = 1.0 - HEADER_DARKEN;
    for y in 0..band {
        for x in 0..w {
            let px = frame.get_pixel_mut(x, y);
            for c in px.0.iter_mut() {
                *c = (*c as f32 * keep).round() as u8;
            }
        }
    }
    let strip_top = band.saturating_sub(HEADER_STRIP);
    fill_rect(frame, 0, strip_top, w, band - strip_top, color);
}

/// Gray track along the bottom, filled in proportion to the score
pub fn draw_health_bar(frame: &mut RgbImage, score: u8, color: Rgb<u8>) {
    let (w, h) = frame.dimensions();
    if w <= 2 * BAR_MARGIN || h < 40 {
        return;
    }
    let track = w - 2 * BAR_MARGIN;
    fill_rect(frame, BAR_MARGIN, h - 40, track, 20, BAR_TRACK);
    fill_rect(frame, BAR_MARGIN, h - 40, bar_fill_width(score, track), 20, color);
}

/// Pixels of the bar to fill for a score
pub fn bar_fill_width(score: u8, track: u32) -> u32 {
    let score = score.min(SCORE_MAX) as u32;
    score * track / SCORE_MAX as u32
}

/// `Rect` rejects empty sizes
fn fill_rect(frame: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    if width == 0 || height == 0 {
        return;
    }
    draw_filled_rect_mut(frame, Rect::at(x as i32, y as i32).of_size(width, height), color);
}
