//! Live GStreamer registry adapter
//!
//! Factories are converted into [`ElementFactory`] values through the caps
//! text form, see [`PadTemplate::from_caps_text`].

use gstreamer as gst;
use gstreamer::glib::translate::IntoGlib;
use gstreamer::prelude::*;
use tracing::debug;

use super::{
    ElementFactory, FeatureKind, PadDirection, PadPresence, PadTemplate, Registry, clamp_rank,
};

pub struct GstRegistry {
    registry: gst::Registry,
}

impl GstRegistry {
    /// Initialise GStreamer and wrap the default registry
    pub fn new() -> Result<Self, gst::glib::Error> {
        gst::init()?;
        Ok(Self {
            registry: gst::Registry::get(),
        })
    }
}

fn convert_template(factory: &str, tmpl: &gst::StaticPadTemplate) -> Option<PadTemplate> {
    let direction = match tmpl.direction() {
        gst::PadDirection::Sink => PadDirection::Sink,
        gst::PadDirection::Src => PadDirection::Src,
        _ => return None,
    };
    let presence = match tmpl.presence() {
        gst::PadPresence::Sometimes => PadPresence::Sometimes,
        gst::PadPresence::Request => PadPresence::Request,
        _ => PadPresence::Always,
    };

    PadTemplate::from_caps_text(
        factory,
        tmpl.name_template(),
        direction,
        presence,
        &tmpl.caps().to_string(),
    )
}

fn convert_factory(factory: &gst::ElementFactory) -> ElementFactory {
    let name = factory.name().to_string();
    let pad_templates = factory
        .static_pad_templates()
        .iter()
        .filter_map(|tmpl| convert_template(&name, tmpl))
        .collect();

    ElementFactory {
        klass: factory.klass().to_string(),
        description: factory.description().to_string(),
        rank: clamp_rank(factory.rank().into_glib()),
        pad_templates,
        name,
    }
}

impl Registry for GstRegistry {
    fn lookup_feature(&self, name: &str) -> Option<ElementFactory> {
        let feature = self.registry.lookup_feature(name)?;
        match feature.downcast::<gst::ElementFactory>() {
            Ok(factory) => Some(convert_factory(&factory)),
            Err(_) => {
                debug!(name, "Feature is not an element factory");
                None
            }
        }
    }

    fn feature_list(&self, kind: FeatureKind) -> Vec<ElementFactory> {
        match kind {
            FeatureKind::Element => self
                .registry
                .features(gst::ElementFactory::static_type())
                .into_iter()
                .filter_map(|f| f.downcast::<gst::ElementFactory>().ok())
                .map(|f| convert_factory(&f))
                .collect(),
            FeatureKind::TypeFind => self
                .registry
                .features(gst::TypeFindFactory::static_type())
                .into_iter()
                .map(|f| ElementFactory::new(f.name().as_str(), ""))
                .collect(),
        }
    }
}
