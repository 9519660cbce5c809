//! Multimedia export settings.
//!
//! `ExportSettings` holds the stream parameters and the encoder/muxer
//! selection for one export session. Mutation goes through the setters,
//! which batch field changes into a single notification per call.

mod data_format;
mod notify;

pub use data_format::{
    CodecSettings, DATATYPE_KEY, DataFormat, DataFormatError, Serializable, base_data_format,
    check_data_type,
};
pub use notify::{Notifier, Signal, SubscriptionId};

use serde_json::Value;
use std::fmt;
use std::mem;
use tracing::{info, warn};

use super::caps::{Caps, Fraction, Structure};
use super::query::{
    available_audio_encoders, available_muxers, available_video_encoders,
    encoders_muxer_compatible, get_compatible_sink_caps,
};
use super::registry::{ElementFactory, Registry};
use data_format::{get_fraction, get_settings, get_string, get_u32, settings_value};

const DEFAULT_VIDEO_WIDTH: u32 = 720;
const DEFAULT_VIDEO_HEIGHT: u32 = 576;
const DEFAULT_VIDEO_RATE: Fraction = Fraction::new(25, 1);
const DEFAULT_VIDEO_PAR: Fraction = Fraction::new(1, 1);
const DEFAULT_AUDIO_CHANNELS: u32 = 2;
const DEFAULT_AUDIO_RATE: u32 = 44100;
const DEFAULT_AUDIO_DEPTH: u32 = 16;
const DEFAULT_VIDEO_ENCODER: &str = "theoraenc";
const DEFAULT_AUDIO_ENCODER: &str = "vorbisenc";
const DEFAULT_MUXER: &str = "oggmux";

/// Audio/video settings for processing and export
pub struct ExportSettings {
    video_width: u32,
    video_height: u32,
    video_rate: Fraction,
    video_par: Fraction,
    audio_channels: u32,
    audio_rate: u32,
    audio_depth: u32,
    video_encoder: String,
    audio_encoder: String,
    muxer: String,
    container_settings: CodecSettings,
    audio_codec_settings: CodecSettings,
    video_codec_settings: CodecSettings,
    muxers: Vec<ElementFactory>,
    video_encoders: Vec<ElementFactory>,
    audio_encoders: Vec<ElementFactory>,
    notifier: Notifier<ExportSettings>,
}

impl Default for ExportSettings {
    /// Defaults with empty muxer/encoder snapshots
    fn default() -> Self {
        Self {
            video_width: DEFAULT_VIDEO_WIDTH,
            video_height: DEFAULT_VIDEO_HEIGHT,
            video_rate: DEFAULT_VIDEO_RATE,
            video_par: DEFAULT_VIDEO_PAR,
            audio_channels: DEFAULT_AUDIO_CHANNELS,
            audio_rate: DEFAULT_AUDIO_RATE,
            audio_depth: DEFAULT_AUDIO_DEPTH,
            video_encoder: DEFAULT_VIDEO_ENCODER.to_string(),
            audio_encoder: DEFAULT_AUDIO_ENCODER.to_string(),
            muxer: DEFAULT_MUXER.to_string(),
            container_settings: CodecSettings::new(),
            audio_codec_settings: CodecSettings::new(),
            video_codec_settings: CodecSettings::new(),
            muxers: Vec::new(),
            video_encoders: Vec::new(),
            audio_encoders: Vec::new(),
            notifier: Notifier::new(),
        }
    }
}

/// Replace `slot` when `value` is set and differs; returns whether it changed
fn update<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) if *slot != v => {
            *slot = v;
            true
        }
        _ => false,
    }
}

fn update_name(slot: &mut String, value: Option<&str>) -> bool {
    match value {
        Some(v) if slot != v => {
            *slot = v.to_string();
            true
        }
        _ => false,
    }
}

fn fmt_settings(settings: &CodecSettings) -> String {
    let body = settings
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", body)
}

impl ExportSettings {
    /// Defaults plus a snapshot of the registry's muxers and encoders
    pub fn new(registry: &dyn Registry) -> Self {
        let mut settings = Self::default();
        settings.refresh_available(registry);
        settings
    }

    /// Re-read the muxer and encoder lists from `registry`
    pub fn refresh_available(&mut self, registry: &dyn Registry) {
        self.muxers = available_muxers(registry);
        self.video_encoders = available_video_encoders(registry);
        self.audio_encoders = available_audio_encoders(registry);
    }

    // -- accessors --------------------------------------------------------

    pub fn video_width(&self) -> u32 {
        self.video_width
    }

    pub fn video_height(&self) -> u32 {
        self.video_height
    }

    pub fn video_rate(&self) -> Fraction {
        self.video_rate
    }

    pub fn video_par(&self) -> Fraction {
        self.video_par
    }

    pub fn audio_channels(&self) -> u32 {
        self.audio_channels
    }

    pub fn audio_rate(&self) -> u32 {
        self.audio_rate
    }

    pub fn audio_depth(&self) -> u32 {
        self.audio_depth
    }

    pub fn video_encoder(&self) -> &str {
        &self.video_encoder
    }

    pub fn audio_encoder(&self) -> &str {
        &self.audio_encoder
    }

    pub fn muxer(&self) -> &str {
        &self.muxer
    }

    pub fn container_settings(&self) -> &CodecSettings {
        &self.container_settings
    }

    pub fn audio_codec_settings(&self) -> &CodecSettings {
        &self.audio_codec_settings
    }

    pub fn video_codec_settings(&self) -> &CodecSettings {
        &self.video_codec_settings
    }

    /// Editing codec/container settings does not notify subscribers
    pub fn container_settings_mut(&mut self) -> &mut CodecSettings {
        &mut self.container_settings
    }

    pub fn audio_codec_settings_mut(&mut self) -> &mut CodecSettings {
        &mut self.audio_codec_settings
    }

    pub fn video_codec_settings_mut(&mut self) -> &mut CodecSettings {
        &mut self.video_codec_settings
    }

    pub fn muxers(&self) -> &[ElementFactory] {
        &self.muxers
    }

    pub fn video_encoders(&self) -> &[ElementFactory] {
        &self.video_encoders
    }

    pub fn audio_encoders(&self) -> &[ElementFactory] {
        &self.audio_encoders
    }

    // -- notification -----------------------------------------------------

    pub fn subscribe(
        &mut self,
        signal: Signal,
        callback: impl FnMut(&ExportSettings) + 'static,
    ) -> SubscriptionId {
        self.notifier.subscribe(signal, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn emit(&mut self, signal: Signal) {
        // Detach the list so subscribers can borrow the whole record
        let mut notifier = mem::take(&mut self.notifier);
        notifier.emit(signal, self);
        self.notifier = notifier;
    }

    // -- setters ----------------------------------------------------------

    /// Set the video width, height, framerate and pixel aspect ratio.
    ///
    /// `None` leaves a field untouched. Fires one `SettingsChanged` if any
    /// field changed and returns whether it did.
    pub fn set_video_properties(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        framerate: Option<Fraction>,
        par: Option<Fraction>,
    ) -> bool {
        info!(
            ?width,
            ?height,
            framerate = ?framerate.map(|f| f.to_string()),
            par = ?par.map(|f| f.to_string()),
            "set_video_properties"
        );
        let mut changed = update(&mut self.video_width, width);
        changed |= update(&mut self.video_height, height);
        changed |= update(&mut self.video_rate, framerate);
        changed |= update(&mut self.video_par, par);

        if changed {
            self.emit(Signal::SettingsChanged);
        }
        changed
    }

    /// Set the number of audio channels, sample rate and depth
    pub fn set_audio_properties(
        &mut self,
        channels: Option<u32>,
        rate: Option<u32>,
        depth: Option<u32>,
    ) -> bool {
        info!(?channels, ?rate, ?depth, "set_audio_properties");
        let mut changed = update(&mut self.audio_channels, channels);
        changed |= update(&mut self.audio_rate, rate);
        changed |= update(&mut self.audio_depth, depth);

        if changed {
            self.emit(Signal::SettingsChanged);
        }
        changed
    }

    /// Select the muxer and video/audio encoders; fires `EncodersChanged`
    pub fn set_encoders(
        &mut self,
        muxer: Option<&str>,
        video_encoder: Option<&str>,
        audio_encoder: Option<&str>,
    ) -> bool {
        info!(?muxer, ?video_encoder, ?audio_encoder, "set_encoders");
        let mut changed = update_name(&mut self.muxer, muxer);
        changed |= update_name(&mut self.video_encoder, video_encoder);
        changed |= update_name(&mut self.audio_encoder, audio_encoder);

        if changed {
            self.emit(Signal::EncodersChanged);
        }
        changed
    }

    // -- derived caps -----------------------------------------------------

    /// Raw video caps for the current parameters, before encoder narrowing
    pub fn unconstrained_video_caps(&self) -> Caps {
        let props = |name: &str| {
            Structure::new(name)
                .with("width", self.video_width)
                .with("height", self.video_height)
                .with("pixel-aspect-ratio", self.video_par)
                .with("framerate", self.video_rate)
        };
        Caps::many([props("video/x-raw-yuv"), props("video/x-raw-rgb")])
    }

    /// Raw audio caps for the current parameters, before encoder narrowing
    pub fn unconstrained_audio_caps(&self) -> Caps {
        let props = |name: &str| {
            Structure::new(name)
                .with("rate", self.audio_rate)
                .with("channels", self.audio_channels)
        };
        Caps::many([props("audio/x-raw-int"), props("audio/x-raw-float")])
    }

    /// Video caps narrowed to what the selected encoder accepts.
    ///
    /// `None` when the encoder is unknown or accepts none of the raw formats.
    /// Without a selected encoder the unconstrained caps are returned.
    pub fn video_caps(&self, registry: &dyn Registry) -> Option<Caps> {
        let caps = self.unconstrained_video_caps();
        if self.video_encoder.is_empty() {
            return Some(caps);
        }
        get_compatible_sink_caps(registry, &self.video_encoder, &caps)
    }

    /// Audio caps narrowed to what the selected encoder accepts
    pub fn audio_caps(&self, registry: &dyn Registry) -> Option<Caps> {
        let caps = self.unconstrained_audio_caps();
        if self.audio_encoder.is_empty() {
            return Some(caps);
        }
        get_compatible_sink_caps(registry, &self.audio_encoder, &caps)
    }

    // -- compatibility ----------------------------------------------------

    fn selected_muxer(&self) -> Option<&ElementFactory> {
        let found = self.muxers.iter().find(|m| m.name == self.muxer);
        if found.is_none() {
            warn!(muxer = %self.muxer, "Selected muxer is not among the available muxers");
        }
        found
    }

    /// Available video encoders the selected muxer can take
    pub fn compatible_video_encoders(&self) -> Vec<&ElementFactory> {
        match self.selected_muxer() {
            Some(muxer) => encoders_muxer_compatible(&self.video_encoders, muxer),
            None => Vec::new(),
        }
    }

    /// Available audio encoders the selected muxer can take
    pub fn compatible_audio_encoders(&self) -> Vec<&ElementFactory> {
        match self.selected_muxer() {
            Some(muxer) => encoders_muxer_compatible(&self.audio_encoders, muxer),
            None => Vec::new(),
        }
    }

    // -- descriptions -----------------------------------------------------

    /// Markup summary of the video properties
    pub fn video_description(&self) -> String {
        format!(
            "{} x {} <i>pixels</i> at {:.2} <i>fps</i> <i>({})</i>",
            self.video_width,
            self.video_height,
            self.video_rate.as_f64(),
            self.video_encoder
        )
    }

    /// Markup summary of the audio properties
    pub fn audio_description(&self) -> String {
        format!(
            "{} channels at {} <i>Hz</i> ({} <i>bits</i>) <i>({})</i>",
            self.audio_channels, self.audio_rate, self.audio_depth, self.audio_encoder
        )
    }
}

impl Serializable for ExportSettings {
    const DATA_TYPE: &'static str = "export-settings";

    fn to_data_format(&self) -> DataFormat {
        let mut ret = base_data_format(Self::DATA_TYPE);
        let mut put = |key: &str, value: Value| {
            ret.insert(key.to_string(), value);
        };

        put("video-width", Value::from(self.video_width));
        put("video-height", Value::from(self.video_height));
        put(
            "video-rate",
            Value::from(vec![self.video_rate.num, self.video_rate.denom]),
        );
        put(
            "video-par",
            Value::from(vec![self.video_par.num, self.video_par.denom]),
        );
        put("audio-channels", Value::from(self.audio_channels));
        put("audio-rate", Value::from(self.audio_rate));
        put("audio-depth", Value::from(self.audio_depth));
        put("video-encoder", Value::from(self.video_encoder.as_str()));
        put("audio-encoder", Value::from(self.audio_encoder.as_str()));
        put("muxer", Value::from(self.muxer.as_str()));

        if !self.container_settings.is_empty() {
            put("container-settings", settings_value(&self.container_settings));
        }
        if !self.audio_codec_settings.is_empty() {
            put(
                "audio-encoder-settings",
                settings_value(&self.audio_codec_settings),
            );
        }
        if !self.video_codec_settings.is_empty() {
            put(
                "video-encoder-settings",
                settings_value(&self.video_codec_settings),
            );
        }
        ret
    }

    /// Load every field from `obj`.
    ///
    /// All required keys are read before anything is assigned, so a failed
    /// load leaves the record untouched. Subscribers are not notified.
    fn from_data_format(&mut self, obj: &DataFormat) -> Result<(), DataFormatError> {
        check_data_type(obj, Self::DATA_TYPE)?;

        let video_width = get_u32(obj, "video-width")?;
        let video_height = get_u32(obj, "video-height")?;
        let video_rate = get_fraction(obj, "video-rate")?;
        let video_par = get_fraction(obj, "video-par")?;
        let audio_channels = get_u32(obj, "audio-channels")?;
        let audio_rate = get_u32(obj, "audio-rate")?;
        let audio_depth = get_u32(obj, "audio-depth")?;
        let video_encoder = get_string(obj, "video-encoder")?;
        let audio_encoder = get_string(obj, "audio-encoder")?;
        let muxer = get_string(obj, "muxer")?;
        let container_settings = get_settings(obj, "container-settings")?;
        let audio_codec_settings = get_settings(obj, "audio-encoder-settings")?;
        let video_codec_settings = get_settings(obj, "video-encoder-settings")?;

        self.video_width = video_width;
        self.video_height = video_height;
        self.video_rate = video_rate;
        self.video_par = video_par;
        self.audio_channels = audio_channels;
        self.audio_rate = audio_rate;
        self.audio_depth = audio_depth;
        self.video_encoder = video_encoder;
        self.audio_encoder = audio_encoder;
        self.muxer = muxer;
        if let Some(s) = container_settings {
            self.container_settings = s;
        }
        if let Some(s) = audio_codec_settings {
            self.audio_codec_settings = s;
        }
        if let Some(s) = video_codec_settings {
            self.video_codec_settings = s;
        }
        Ok(())
    }
}

impl fmt::Display for ExportSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Export Settings")?;
        writeln!(
            f,
            "Video: {} {} {} {}",
            self.video_width, self.video_height, self.video_rate, self.video_par
        )?;
        writeln!(
            f,
            "    {} {}",
            self.video_encoder,
            fmt_settings(&self.video_codec_settings)
        )?;
        writeln!(
            f,
            "Audio: {} {} {}",
            self.audio_channels, self.audio_rate, self.audio_depth
        )?;
        writeln!(
            f,
            "    {} {}",
            self.audio_encoder,
            fmt_settings(&self.audio_codec_settings)
        )?;
        write!(
            f,
            "Muxer: {} {}",
            self.muxer,
            fmt_settings(&self.container_settings)
        )
    }
}

impl fmt::Debug for ExportSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportSettings")
            .field("video_width", &self.video_width)
            .field("video_height", &self.video_height)
            .field("video_rate", &self.video_rate)
            .field("video_par", &self.video_par)
            .field("audio_channels", &self.audio_channels)
            .field("audio_rate", &self.audio_rate)
            .field("audio_depth", &self.audio_depth)
            .field("video_encoder", &self.video_encoder)
            .field("audio_encoder", &self.audio_encoder)
            .field("muxer", &self.muxer)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}
