// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for scan mode

mod common;

use common::{Probe, blank_frame, camera_showing, deps, frame_with_code};
use qrcam::app::frame_processor::TickOutcome;
use qrcam::app::{App, NoticeKind, Region, ScanStatus, ViewMode};
use qrcam::config::{Config, Profile};
use qrcam::errors::{CameraError, ClipboardError};
use std::time::{Duration, Instant};

fn app(profile: Profile, frame: image::RgbaImage, probe: &Probe) -> App {
    let config = Config::for_profile(profile);
    App::new(config, deps(camera_showing(Some(frame), probe), probe))
}

#[test]
fn test_hello_frame_is_scanned_through_tick() {
    let probe = Probe::default();
    let mut app = app(Profile::Standard, frame_with_code("HELLO"), &probe);

    app.open();
    assert_eq!(probe.opens(), 1);
    assert!(app.scanner().is_scanning());

    let outcome = app.on_frame(Instant::now());
    assert_eq!(outcome, Some(TickOutcome::Found("HELLO".to_string())));
    assert_eq!(app.scan_result().map(|r| r.payload.as_str()), Some("HELLO"));
    assert_eq!(app.scanner().status(), &ScanStatus::Found);
}

#[test]
fn test_found_code_releases_camera_and_stops_sampling() {
    let probe = Probe::default();
    let mut app = app(Profile::Standard, frame_with_code("HELLO"), &probe);
    app.open();

    let now = Instant::now();
    app.on_frame(now);
    assert_eq!(probe.stops(), 1);
    assert_eq!(probe.pulses(), 1);
    assert!(!app.scanner().is_scanning());
    assert!(!app.preview().is_attached());

    // No further sampling, no second result
    assert_eq!(app.on_frame(now + Duration::from_millis(16)), Some(TickOutcome::Idle));
    assert_eq!(probe.opens(), 1);
    assert_eq!(probe.pulses(), 1);
}

#[test]
fn test_start_then_stop_without_result() {
    let probe = Probe::default();
    let mut app = app(Profile::Classic, blank_frame(), &probe);

    app.open();
    assert_eq!(probe.opens(), 0, "classic profile waits for the start button");

    app.toggle_scan();
    assert_eq!(probe.opens(), 1);
    assert_eq!(app.on_frame(Instant::now()), Some(TickOutcome::Missed));

    app.toggle_scan();
    assert_eq!(probe.stops(), 1);
    assert!(!app.scanner().is_scanning());
    assert!(app.scan_result().is_none());
    assert!(app.scanner().session().frame_source().is_none());
}

#[test]
fn test_switching_modes_releases_camera_once() {
    let probe = Probe::default();
    let mut app = app(Profile::Standard, blank_frame(), &probe);
    app.open();
    app.on_frame(Instant::now());

    app.switch_to(ViewMode::Generating);
    app.switch_to(ViewMode::Generating);
    assert_eq!(probe.stops(), 1);
    assert_eq!(app.visible_region(), Region::Generator);

    // Generating never samples frames
    assert_eq!(app.on_frame(Instant::now()), None);

    app.switch_to(ViewMode::Scanning);
    assert_eq!(probe.opens(), 2);
    assert_eq!(app.visible_region(), Region::Scanner);
}

#[test]
fn test_camera_error_is_reported() {
    let probe = Probe::default();
    let mut camera = camera_showing(None, &probe);
    camera.error = Some(CameraError::PermissionDenied("/dev/video0".to_string()));
    let mut app = App::new(Config::default(), deps(camera, &probe));

    app.open();
    assert!(!app.scanner().is_scanning());
    assert!(matches!(
        app.scanner().status(),
        ScanStatus::CameraUnavailable(_)
    ));
    assert_eq!(app.notice().map(|n| n.kind), Some(NoticeKind::Error));
    assert_eq!(app.on_frame(Instant::now()), Some(TickOutcome::Idle));
}

#[test]
fn test_unplugged_camera_ends_scan() {
    let probe = Probe::default();
    let mut app = app(Profile::Standard, blank_frame(), &probe);
    app.open();
    assert_eq!(app.on_frame(Instant::now()), Some(TickOutcome::Missed));

    probe.unplug();
    assert_eq!(app.on_frame(Instant::now()), Some(TickOutcome::Cancelled));
    assert_eq!(
        app.scanner().status(),
        &ScanStatus::CameraUnavailable("Camera disconnected".to_string())
    );
    assert!(!app.scanner().is_scanning());
    assert!(!app.preview().is_attached());
    assert!(app.scanner().session().frame_source().is_none());
    assert_eq!(probe.stops(), 1);
    assert!(app.scan_result().is_none());

    // Nothing is sampled until the user starts again
    assert_eq!(app.on_frame(Instant::now()), Some(TickOutcome::Idle));
}

#[test]
fn test_waiting_for_first_frame() {
    let probe = Probe::default();
    let camera = camera_showing(None, &probe);
    let mut app = App::new(Config::default(), deps(camera, &probe));

    app.open();
    assert_eq!(app.on_frame(Instant::now()), Some(TickOutcome::Waiting));
    assert!(app.scanner().is_scanning());
}

#[test]
fn test_copy_scanned_result() {
    let probe = Probe::default();
    let mut app = app(Profile::Standard, frame_with_code("HELLO"), &probe);

    let now = Instant::now();
    assert_eq!(app.copy_result(now), Err(ClipboardError::NothingToCopy));

    app.open();
    app.on_frame(now);
    app.copy_result(now).unwrap();

    assert_eq!(probe.clipboard().as_deref(), Some("HELLO"));
    assert!(app.is_copy_confirming(now + Duration::from_millis(1000)));
    assert!(!app.is_copy_confirming(now + Duration::from_millis(1500)));
}

#[test]
fn test_new_scan_hides_previous_result() {
    let probe = Probe::default();
    let mut app = app(Profile::Standard, frame_with_code("HELLO"), &probe);
    app.open();
    app.on_frame(Instant::now());
    assert!(app.scan_result().is_some());

    app.toggle_scan();
    assert!(app.scanner().is_scanning());
    assert!(app.scan_result().is_none());
    assert_eq!(
        app.scanner().result().map(|r| r.payload.as_str()),
        Some("HELLO")
    );
}
