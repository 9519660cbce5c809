// Integration tests for ExportSettings workflows
//
// Encoder selection, derived caps and change notification against the
// built-in registry snapshot.

use expset::engine::{ExportSettings, Fraction, Signal};
use std::cell::RefCell;
use std::rc::Rc;

use crate::common::assertions::*;
use crate::common::helpers::*;

#[test]
fn test_new_snapshots_registry() {
    let registry = builtin();
    let settings = ExportSettings::new(&registry);

    assert_eq!(names(settings.muxers()).len(), 6);
    assert_eq!(
        names(settings.video_encoders()),
        vec!["theoraenc", "vp8enc", "x264enc", "jpegenc", "pngenc"]
    );
    assert_eq!(
        names(settings.audio_encoders()),
        vec!["vorbisenc", "flacenc", "lamemp3enc", "faac"]
    );
}

#[test]
fn test_refresh_available_replaces_snapshot() {
    let mut settings = ExportSettings::new(&builtin());
    let small = expset::engine::StaticRegistry::from_factories([
        muxer("rawmux", "audio/x-raw-int"),
        encoder("pcmenc", "Codec/Encoder/Audio", "audio/x-raw-int"),
    ])
    .unwrap();

    settings.refresh_available(&small);
    assert_eq!(names(settings.muxers()), vec!["rawmux"]);
    assert!(settings.video_encoders().is_empty());

    settings.set_encoders(Some("rawmux"), None, Some("pcmenc"));
    assert_eq!(names(settings.compatible_audio_encoders()), vec!["pcmenc"]);
}

#[test]
fn test_switching_to_mp4_workflow() {
    let registry = builtin();
    let mut settings = ExportSettings::new(&registry);
    let encoder_hits = counter(&mut settings, Signal::EncodersChanged);

    settings.set_encoders(Some("mp4mux"), None, None);
    assert_eq!(names(settings.compatible_video_encoders()), vec!["x264enc"]);
    assert_eq!(
        names(settings.compatible_audio_encoders()),
        vec!["lamemp3enc", "faac"]
    );

    settings.set_encoders(None, Some("x264enc"), Some("faac"));
    assert_eq!(encoder_hits.get(), 2);

    let video = settings.video_caps(&registry).unwrap();
    assert_caps_field(&video, "width", "(int)720");
    assert_caps_field(&video, "format", "(string){ I420, YV12 }");

    let audio = settings.audio_caps(&registry).unwrap();
    assert_caps_field(&audio, "rate", "(int)44100");
    assert_caps_field(&audio, "channels", "(int)2");
}

#[test]
fn test_caps_track_property_changes() {
    let registry = builtin();
    let mut settings = ExportSettings::new(&registry);

    settings.set_video_properties(Some(1920), Some(1080), Some(Fraction::new(30000, 1001)), None);
    let video = settings.video_caps(&registry).unwrap();
    assert_caps_field(&video, "width", "(int)1920");
    assert_caps_field(&video, "framerate", "(fraction)30000/1001");

    // vorbisenc tops out at 200 kHz
    settings.set_audio_properties(None, Some(384000), None);
    assert_eq!(settings.audio_caps(&registry), None);
}

#[test]
fn test_unconstrained_caps() {
    let settings = ExportSettings::default();
    assert_caps_eq(
        &settings.unconstrained_audio_caps(),
        "audio/x-raw-int, rate=44100, channels=2; audio/x-raw-float, rate=44100, channels=2",
    );
    assert_caps_eq(
        &settings.unconstrained_video_caps(),
        "video/x-raw-yuv, width=720, height=576, pixel-aspect-ratio=1/1, framerate=25/1; \
         video/x-raw-rgb, width=720, height=576, pixel-aspect-ratio=1/1, framerate=25/1",
    );
}

#[test]
fn test_subscribers_run_in_order_and_can_unsubscribe() {
    let mut settings = ExportSettings::default();
    let log = Rc::new(RefCell::new(Vec::new()));

    let l = Rc::clone(&log);
    let first = settings.subscribe(Signal::SettingsChanged, move |s| {
        l.borrow_mut().push(format!("first {}", s.audio_channels()))
    });
    let l = Rc::clone(&log);
    settings.subscribe(Signal::SettingsChanged, move |s| {
        l.borrow_mut().push(format!("second {}", s.audio_channels()))
    });

    settings.set_audio_properties(Some(6), None, None);
    assert!(settings.unsubscribe(first));
    settings.set_audio_properties(Some(1), None, None);

    assert_eq!(
        *log.borrow(),
        vec!["first 6", "second 6", "second 1"]
    );
}

#[test]
fn test_descriptions_follow_changes() {
    let mut settings = ExportSettings::default();
    settings.set_video_properties(Some(1280), Some(720), Some(Fraction::new(30000, 1001)), None);
    settings.set_audio_properties(Some(1), Some(48000), Some(24));
    settings.set_encoders(None, Some("vp8enc"), Some("flacenc"));

    insta::assert_snapshot!(settings.video_description(), @"1280 x 720 <i>pixels</i> at 29.97 <i>fps</i> <i>(vp8enc)</i>");
    insta::assert_snapshot!(settings.audio_description(), @"1 channels at 48000 <i>Hz</i> (24 <i>bits</i>) <i>(flacenc)</i>");
}
