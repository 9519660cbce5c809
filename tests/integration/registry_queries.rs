// Integration tests for registry queries
//
// Encoder/muxer discovery and matching against hand-built and file-backed
// registries.

use expset::engine::registry::RegistryError;
use expset::engine::{
    Caps, ElementFactory, FeatureKind, PadDirection, Registry, StaticRegistry,
    available_audio_encoders, available_muxers, can_sink_caps, encoders_muxer_compatible,
    get_compatible_sink_caps, muxer_can_sink_raw_audio, muxer_can_sink_raw_video,
};
use std::fs;
use tempfile::TempDir;

use crate::common::assertions::*;
use crate::common::helpers::*;

// ============================================================================
// Encoder / muxer matching
// ============================================================================

#[test]
fn test_raw_int_encoder_matches_raw_int_muxer() {
    let mux = muxer("rawmux", "audio/x-raw-int");
    let encoders = vec![
        encoder("pcmenc", "Codec/Encoder/Audio", "audio/x-raw-int"),
        encoder("yuvenc", "Codec/Encoder/Video", "video/x-raw-yuv"),
    ];

    let compatible = encoders_muxer_compatible(&encoders, &mux);
    assert_eq!(names(compatible), vec!["pcmenc"]);

    let video_only = vec![encoder("yuvenc", "Codec/Encoder/Video", "video/x-raw-yuv")];
    assert!(encoders_muxer_compatible(&video_only, &mux).is_empty());
}

#[test]
fn test_any_src_template_matches() {
    let mux = muxer("mux", "audio/x-vorbis");
    let multi = ElementFactory::new("multienc", "Codec/Encoder/Audio")
        .with_pad("src_0", PadDirection::Src, caps("audio/x-flac"))
        .with_pad("src_1", PadDirection::Src, caps("audio/x-vorbis"));

    assert_eq!(names(encoders_muxer_compatible(&[multi], &mux)), vec!["multienc"]);
}

#[test]
fn test_can_sink_caps_respects_field_constraints() {
    let mux = muxer("mux", "audio/x-raw-int, rate=(int)[ 8000, 48000 ]");
    assert!(can_sink_caps(&mux, &caps("audio/x-raw-int, rate=44100")));
    assert!(!can_sink_caps(&mux, &caps("audio/x-raw-int, rate=96000")));
    assert!(can_sink_caps(&mux, &Caps::Any));
    assert!(!can_sink_caps(&mux, &Caps::empty()));
}

#[test]
fn test_builtin_matroska_accepts_raw_streams() {
    let registry = builtin();
    let mkv = registry.lookup_feature("matroskamux").unwrap();
    assert!(muxer_can_sink_raw_video(&mkv));
    assert!(muxer_can_sink_raw_audio(&mkv));

    let mp4 = registry.lookup_feature("mp4mux").unwrap();
    assert!(!muxer_can_sink_raw_video(&mp4));
    assert!(!muxer_can_sink_raw_audio(&mp4));

    let audio = available_audio_encoders(&registry);
    assert_eq!(
        names(encoders_muxer_compatible(&audio, &mp4)),
        vec!["lamemp3enc", "faac"]
    );
}

// ============================================================================
// Compatible sink caps
// ============================================================================

#[test]
fn test_sink_caps_narrow_to_template() {
    let registry = builtin();
    let wanted = caps("audio/x-raw-int, rate=44100, channels=2");

    let result = get_compatible_sink_caps(&registry, "lamemp3enc", &wanted).unwrap();
    assert_caps_field(&result, "rate", "(int)44100");
    assert_caps_field(&result, "width", "(int)16");
    assert_caps_field(&result, "signed", "(boolean)true");
}

#[test]
fn test_sink_caps_rejects_unsupported_rate() {
    let registry = builtin();
    let wanted = caps("audio/x-raw-int, rate=44101, channels=2");
    assert_eq!(get_compatible_sink_caps(&registry, "lamemp3enc", &wanted), None);
}

#[test]
fn test_sink_caps_any_template_returns_input() {
    let registry = StaticRegistry::from_factories([
        ElementFactory::new("fakesink", "Sink").with_pad("sink", PadDirection::Sink, Caps::Any),
    ])
    .unwrap();
    let wanted = caps("video/x-raw-yuv, width=320");

    let result = get_compatible_sink_caps(&registry, "fakesink", &wanted).unwrap();
    assert_caps_eq(&result, "video/x-raw-yuv, width=320");
}

// ============================================================================
// File-backed registries
// ============================================================================

const SMALL_REGISTRY: &str = r#"
[[element]]
name = "rawmux"
klass = "Codec/Muxer"

[[element.pad]]
name = "sink_%d"
direction = "sink"
presence = "request"
caps = "audio/x-raw-int; video/x-raw-yuv"

[[element]]
name = "pcmenc"
klass = "Codec/Encoder/Audio"
rank = 64

[[element.pad]]
name = "src"
direction = "source"
caps = "audio/x-raw-int"
"#;

#[test]
fn test_load_registry_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.toml");
    fs::write(&path, SMALL_REGISTRY).unwrap();

    let registry = StaticRegistry::load(&path).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(names(&available_muxers(&registry)), vec!["rawmux"]);

    let mux = registry.lookup_feature("rawmux").unwrap();
    assert!(muxer_can_sink_raw_audio(&mux));
    assert!(muxer_can_sink_raw_video(&mux));

    let encoders = available_audio_encoders(&registry);
    assert_eq!(encoders[0].rank, 64);
    assert_eq!(names(encoders_muxer_compatible(&encoders, &mux)), vec!["pcmenc"]);
    assert!(registry.feature_list(FeatureKind::TypeFind).is_empty());
}

#[test]
fn test_load_registry_errors() {
    let dir = TempDir::new().unwrap();

    let missing = StaticRegistry::load(&dir.path().join("absent.toml"));
    assert!(matches!(missing, Err(RegistryError::Io { .. })));

    let bad_caps = "[[element]]\nname = \"x\"\n[[element.pad]]\nname = \"sink\"\ndirection = \"sink\"\ncaps = \"width=1\"\n";
    assert!(matches!(
        StaticRegistry::from_toml_str(bad_caps),
        Err(RegistryError::Parse(_))
    ));

    let duplicate = "[[element]]\nname = \"x\"\n[[element]]\nname = \"x\"\n";
    assert!(matches!(
        StaticRegistry::from_toml_str(duplicate),
        Err(RegistryError::DuplicateElement(name)) if name == "x"
    ));
}
