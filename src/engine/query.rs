//! Registry queries: compatible caps, encoder/muxer discovery and matching.

use tracing::{debug, warn};

use super::caps::{Caps, Structure};
use super::registry::{ElementFactory, FeatureKind, PadDirection, Registry};

const MUXER_KLASS: &[&str] = &["Codec", "Muxer"];
const VIDEO_ENCODER_KLASS: &[&str] = &["Codec", "Encoder", "Video"];
const IMAGE_ENCODER_KLASS: &[&str] = &["Codec", "Encoder", "Image"];
const AUDIO_ENCODER_KLASS: &[&str] = &["Codec", "Encoder", "Audio"];

/// Uncompressed audio formats checked by [`muxer_can_sink_raw_audio`]
pub fn raw_audio_caps() -> Caps {
    Caps::many([
        Structure::new("audio/x-raw-float"),
        Structure::new("audio/x-raw-int"),
    ])
}

/// Uncompressed video formats checked by [`muxer_can_sink_raw_video`]
pub fn raw_video_caps() -> Caps {
    Caps::many([
        Structure::new("video/x-raw-yuv"),
        Structure::new("video/x-raw-rgb"),
    ])
}

/// Intersect `caps` with the sink templates of the factory called `name`.
///
/// Returns the first non-empty intersection in template order, or `None` when
/// the factory is unknown or nothing intersects.
pub fn get_compatible_sink_caps(registry: &dyn Registry, name: &str, caps: &Caps) -> Option<Caps> {
    debug!(factory = name, caps = %caps, "Looking up compatible sink caps");
    let Some(factory) = registry.lookup_feature(name) else {
        warn!("{} is not a valid factory name", name);
        return None;
    };

    factory.template_caps(PadDirection::Sink).find_map(|sink| {
        let inter = caps.intersect(sink);
        debug!(sinkcaps = %sink, intersection = %inter, "Intersected with sink template");
        (!inter.is_empty()).then_some(inter)
    })
}

/// True if `caps` intersect with any of the factory's sink templates
pub fn can_sink_caps(factory: &ElementFactory, caps: &Caps) -> bool {
    factory
        .template_caps(PadDirection::Sink)
        .any(|sink| sink.can_intersect(caps))
}

/// True if every token in `required` appears in `actual`
pub fn list_compat<A, B>(required: &[A], actual: &[B]) -> bool
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    required
        .iter()
        .all(|r| actual.iter().any(|a| a.as_ref() == r.as_ref()))
}

fn scan(registry: &dyn Registry, patterns: &[&[&str]], what: &str) -> Vec<ElementFactory> {
    let res: Vec<ElementFactory> = registry
        .feature_list(FeatureKind::Element)
        .into_iter()
        .filter(|fact| {
            let tokens = fact.klass_tokens();
            patterns.iter().any(|p| list_compat(*p, tokens.as_slice()))
        })
        .collect();

    debug!(
        kind = what,
        found = ?res.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        "Scanned registry"
    );
    res
}

/// All registered muxers, in registry order
pub fn available_muxers(registry: &dyn Registry) -> Vec<ElementFactory> {
    scan(registry, &[MUXER_KLASS], "muxers")
}

/// All registered video (and still image) encoders, in registry order
pub fn available_video_encoders(registry: &dyn Registry) -> Vec<ElementFactory> {
    scan(
        registry,
        &[VIDEO_ENCODER_KLASS, IMAGE_ENCODER_KLASS],
        "video encoders",
    )
}

/// All registered audio encoders, in registry order
pub fn available_audio_encoders(registry: &dyn Registry) -> Vec<ElementFactory> {
    scan(registry, &[AUDIO_ENCODER_KLASS], "audio encoders")
}

/// Encoders whose output the muxer can accept, in input order
pub fn encoders_muxer_compatible<'a>(
    encoders: &'a [ElementFactory],
    muxer: &ElementFactory,
) -> Vec<&'a ElementFactory> {
    let res: Vec<&ElementFactory> = encoders
        .iter()
        .filter(|encoder| {
            encoder
                .template_caps(PadDirection::Src)
                .any(|caps| can_sink_caps(muxer, caps))
        })
        .collect();

    debug!(
        muxer = %muxer.name,
        compatible = res.len(),
        candidates = encoders.len(),
        "Matched encoders against muxer"
    );
    res
}

/// True when one of the muxer's sink templates accepts [`raw_audio_caps`]
pub fn muxer_can_sink_raw_audio(muxer: &ElementFactory) -> bool {
    can_sink_caps(muxer, &raw_audio_caps())
}

/// True when one of the muxer's sink templates accepts [`raw_video_caps`]
pub fn muxer_can_sink_raw_video(muxer: &ElementFactory) -> bool {
    can_sink_caps(muxer, &raw_video_caps())
}
