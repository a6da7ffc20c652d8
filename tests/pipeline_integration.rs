//! Integration tests for the monitor pipeline
//!
//! Tests the full path: frame source → replayed landmarks → session → annotated frame

use postureguard::core::mjpeg::encode_jpeg;
use postureguard::core::{
    open_source, open_with_fallback, FrameSource, Monitor, NullProvider, ReplayProvider,
    SilentBeeper, SourceSpec, SyntheticSource,
};
use postureguard::types::{Landmark, Profile, Quality};
use postureguard::{Error, LANDMARK_COUNT, LEFT_EAR, LEFT_SHOULDER, RIGHT_SHOULDER};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::io::Cursor;
use std::sync::atomic::AtomicBool;

fn trace_line(ear_x: f64) -> String {
    let mut raw = vec![Landmark::new(0.5, 0.6); LANDMARK_COUNT];
    raw[LEFT_EAR] = Landmark::new(ear_x, 0.3);
    raw[LEFT_SHOULDER] = Landmark::new(0.6, 0.6);
    raw[RIGHT_SHOULDER] = Landmark::new(0.4, 0.6);
    serde_json::to_string(&raw).unwrap()
}

/// good, good, nobody, slouch, slouch
fn trace() -> String {
    [trace_line(0.6), trace_line(0.6), "null".to_string(), trace_line(0.1), trace_line(0.1)].join("\n")
}

fn run_collect(profile: Profile) -> Vec<postureguard::types::FrameReport> {
    let provider = ReplayProvider::from_reader(Cursor::new(trace())).unwrap();
    let mut monitor = Monitor::new(SyntheticSource::new(320, 240), provider, SilentBeeper, profile);
    let stop = AtomicBool::new(false);
    let mut reports = Vec::new();
    let processed = monitor
        .run(&stop, Some(5), |frame| {
            assert_eq!(frame.image.as_ref().unwrap().dimensions(), (320, 240));
            reports.push(frame.report);
            Ok(())
        })
        .unwrap();
    assert_eq!(processed, 5);
    reports
}

/// Web profile: detailed statuses, score and one beep for the slouch run
#[test]
fn test_web_session_from_trace() {
    let reports = run_collect(Profile::web());
    let statuses: Vec<&str> = reports.iter().map(|r| r.stats.status.as_str()).collect();
    assert_eq!(
        statuses,
        vec![
            "PERFECT FORM",
            "PERFECT FORM",
            "NO PERSON DETECTED",
            "WARNING: SLOUCHING",
            "WARNING: SLOUCHING",
        ]
    );

    let scores: Vec<u8> = reports.iter().map(|r| r.stats.score).collect();
    assert_eq!(scores, vec![100, 100, 100, 98, 96]);
    assert_eq!(reports[4].stats.quality, Quality::Poor);

    // frames arrive far faster than the cooldown
    let beeps: Vec<bool> = reports.iter().map(|r| r.beeped).collect();
    assert_eq!(beeps, vec![false, false, false, true, false]);
}

/// Desktop profile: binary statuses, score stays put
#[test]
fn test_desktop_session_from_trace() {
    let reports = run_collect(Profile::desktop());
    assert_eq!(reports[0].stats.status, "GOOD POSTURE");
    assert_eq!(reports[3].stats.status, "SLOUCH DETECTED!");
    assert!(reports.iter().all(|r| r.stats.score == 100));
}

/// Frame reports serialize to one JSON object per line
#[test]
fn test_report_json_shape() {
    let reports = run_collect(Profile::web());
    let json: Value = serde_json::from_str(&serde_json::to_string(&reports[3]).unwrap()).unwrap();

    assert_eq!(json["frame"], 3);
    assert_eq!(json["beeped"], true);
    assert_eq!(json["outcome"]["kind"], "assessed");
    assert!(json["outcome"]["angle"].as_f64().unwrap() > 135.0);
    assert_eq!(json["stats"]["score"], 98);
    assert_eq!(json["stats"]["quality"], "Poor");
    assert!(json["timestamp"].is_string());

    let nobody: Value = serde_json::to_value(&reports[2]).unwrap();
    assert_eq!(nobody["outcome"]["kind"], "no_person");
}

/// Annotated frames still encode as JPEG
#[test]
fn test_annotated_frame_encodes() {
    let provider = ReplayProvider::from_reader(Cursor::new(trace_line(0.1))).unwrap();
    let mut monitor = Monitor::new(SyntheticSource::new(160, 120), provider, SilentBeeper, Profile::web());
    let frame = monitor.step().unwrap();
    let jpeg = encode_jpeg(frame.image.as_ref().unwrap()).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
}

/// Broken trace lines are reported with their line number
#[test]
fn test_bad_trace_line() {
    let trace = format!("{}\n[{{\"x\": 0.5}}]\n", trace_line(0.6));
    match ReplayProvider::from_reader(Cursor::new(trace)) {
        Err(Error::Trace { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected trace error, got {:?}", other.map(|p| p.len())),
    }
}

/// Falls back to the secondary source when the primary cannot open
#[test]
fn test_source_fallback() {
    let primary = SourceSpec::Directory("/nonexistent/postureguard-frames".into());
    let fallback: SourceSpec = "synthetic:64x48".parse().unwrap();

    let mut source = open_with_fallback(&primary, &fallback, |spec| open_source(spec, 0)).unwrap();
    assert_eq!(source.read_frame().unwrap().dimensions(), (64, 48));
}

/// Both sources failing is a distinct error
#[test]
fn test_no_source_available() {
    let primary = SourceSpec::Directory("/nonexistent/a".into());
    let fallback = SourceSpec::Directory("/nonexistent/b".into());

    let result = open_with_fallback(&primary, &fallback, |spec| open_source(spec, 0));
    assert!(matches!(result, Err(Error::SourceUnavailable { .. })));
}

/// Without a landmark provider every frame reports nobody
#[test]
fn test_null_provider_run() {
    let mut monitor = Monitor::new(SyntheticSource::new(32, 32), NullProvider, SilentBeeper, Profile::web());
    let stop = AtomicBool::new(false);
    let mut statuses = Vec::new();
    monitor
        .run(&stop, Some(3), |frame| {
            statuses.push(frame.report.stats.status);
            Ok(())
        })
        .unwrap();
    assert_eq!(statuses, vec!["NO PERSON DETECTED"; 3]);
    assert_eq!(monitor.session().stats().score, 100);
}
