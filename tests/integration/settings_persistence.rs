// Integration tests for export settings persistence
//
// Settings are written to JSON files on disk and loaded back into fresh
// records.

use expset::engine::settings::{DataFormat, DataFormatError};
use expset::engine::{ExportSettings, Fraction, Serializable, Signal};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

use crate::common::helpers::*;

fn write_json(dir: &TempDir, name: &str, data: &DataFormat) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(data).unwrap()).unwrap();
    path
}

fn read_json(path: &std::path::Path) -> DataFormat {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let mut original = ExportSettings::default();
    original.set_video_properties(Some(1280), Some(720), Some(Fraction::new(24000, 1001)), Some(Fraction::new(4, 3)));
    original.set_audio_properties(Some(6), Some(48000), Some(24));
    original.set_encoders(Some("matroskamux"), Some("x264enc"), Some("flacenc"));
    original.video_codec_settings_mut().insert("bitrate".into(), json!(4096));
    original.container_settings_mut().insert("writing-app".into(), json!("expset"));

    let path = write_json(&dir, "export.json", &original.to_data_format());

    let mut loaded = ExportSettings::default();
    let hits = counter(&mut loaded, Signal::SettingsChanged);
    loaded.from_data_format(&read_json(&path)).unwrap();

    assert_eq!(loaded.video_width(), 1280);
    assert_eq!(loaded.video_height(), 720);
    assert_eq!(loaded.video_rate(), Fraction::new(24000, 1001));
    assert_eq!(loaded.video_par(), Fraction::new(4, 3));
    assert_eq!((loaded.audio_channels(), loaded.audio_rate(), loaded.audio_depth()), (6, 48000, 24));
    assert_eq!(loaded.muxer(), "matroskamux");
    assert_eq!(loaded.video_encoder(), "x264enc");
    assert_eq!(loaded.audio_encoder(), "flacenc");
    assert_eq!(loaded.video_codec_settings(), original.video_codec_settings());
    assert_eq!(loaded.container_settings(), original.container_settings());
    assert!(loaded.audio_codec_settings().is_empty());
    assert_eq!(hits.get(), 0);
}

#[test]
fn test_file_layout() {
    let data = ExportSettings::default().to_data_format();
    let mut keys: Vec<&str> = data.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "audio-channels",
            "audio-depth",
            "audio-encoder",
            "audio-rate",
            "datatype",
            "muxer",
            "video-encoder",
            "video-height",
            "video-par",
            "video-rate",
            "video-width",
        ]
    );
}

#[test]
fn test_wrong_datatype_is_rejected() {
    let mut data = ExportSettings::default().to_data_format();
    data.insert("datatype".into(), json!("project"));

    let mut settings = ExportSettings::default();
    assert_eq!(
        settings.from_data_format(&data),
        Err(DataFormatError::WrongDataType {
            expected: "export-settings".into(),
            found: "project".into(),
        })
    );
}

#[test]
fn test_invalid_field_type_leaves_record_untouched() {
    let mut data = ExportSettings::default().to_data_format();
    data.insert("video-width".into(), json!(1920));
    data.insert("video-rate".into(), json!("25/1"));

    let mut settings = ExportSettings::default();
    let err = settings.from_data_format(&data).unwrap_err();
    assert!(matches!(err, DataFormatError::InvalidType { ref key, .. } if key == "video-rate"));
    assert_eq!(settings.video_width(), 720);
}

#[test]
fn test_default_document() {
    let data = ExportSettings::default().to_data_format();
    insta::assert_snapshot!(serde_json::to_string_pretty(&data).unwrap(), @r#"
    {
      "audio-channels": 2,
      "audio-depth": 16,
      "audio-encoder": "vorbisenc",
      "audio-rate": 44100,
      "datatype": "export-settings",
      "muxer": "oggmux",
      "video-encoder": "theoraenc",
      "video-height": 576,
      "video-par": [
        1,
        1
      ],
      "video-rate": [
        25,
        1
      ],
      "video-width": 720
    }
    "#);
}
