//! Plugin registry access.
//!
//! The query functions never talk to a framework singleton; they receive a
//! [`Registry`] so callers can hand in the live GStreamer registry, a TOML
//! snapshot, or a hand-built test double.

#[cfg(feature = "gstreamer")]
mod gst;
mod static_registry;

#[cfg(feature = "gstreamer")]
pub use gst::GstRegistry;
pub use static_registry::{RegistryError, StaticRegistry};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::caps::Caps;

/// Direction of a pad template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadDirection {
    Sink,
    #[serde(alias = "source")]
    Src,
}

/// When pads are created from a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadPresence {
    #[default]
    Always,
    Sometimes,
    Request,
}

/// Static pad template declared by an element factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadTemplate {
    #[serde(rename = "name")]
    pub name_template: String,
    pub direction: PadDirection,
    #[serde(default)]
    pub presence: PadPresence,
    pub caps: Caps,
}

impl PadTemplate {
    pub fn new(name_template: &str, direction: PadDirection, caps: Caps) -> Self {
        Self {
            name_template: name_template.to_string(),
            direction,
            presence: PadPresence::Always,
            caps,
        }
    }

    /// Build a template from caps in text form, as a live registry reports them.
    ///
    /// Structures using value types the caps model lacks are dropped one by
    /// one with a warning. `None` when nothing of the caps survives.
    pub fn from_caps_text(
        factory: &str,
        name_template: &str,
        direction: PadDirection,
        presence: PadPresence,
        text: &str,
    ) -> Option<Self> {
        let (caps, skipped) = match Caps::parse_lenient(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(factory, template = name_template, error = %e, "Skipping pad template");
                return None;
            }
        };

        for e in &skipped {
            debug!(factory, template = name_template, error = %e, "Dropping caps structure");
        }
        if caps.is_empty() && !skipped.is_empty() {
            warn!(
                factory,
                template = name_template,
                dropped = skipped.len(),
                "Skipping pad template, no caps structure could be parsed"
            );
            return None;
        }

        Some(Self {
            name_template: name_template.to_string(),
            direction,
            presence,
            caps,
        })
    }
}

/// Registry ranks are signed; negative ranks count as unranked
pub fn clamp_rank(rank: i32) -> u32 {
    rank.max(0).unsigned_abs()
}

/// Registry entry describing an installable element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementFactory {
    pub name: String,
    /// Slash-delimited class taxonomy, e.g. `Codec/Encoder/Video`
    #[serde(default)]
    pub klass: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rank: u32,
    #[serde(default, rename = "pad")]
    pub pad_templates: Vec<PadTemplate>,
}

impl ElementFactory {
    pub fn new(name: &str, klass: &str) -> Self {
        Self {
            name: name.to_string(),
            klass: klass.to_string(),
            description: String::new(),
            rank: 0,
            pad_templates: Vec::new(),
        }
    }

    /// Builder-style pad template registration
    pub fn with_pad(mut self, name: &str, direction: PadDirection, caps: Caps) -> Self {
        self.pad_templates.push(PadTemplate::new(name, direction, caps));
        self
    }

    /// Klass split on `/`
    pub fn klass_tokens(&self) -> Vec<&str> {
        self.klass.split('/').collect()
    }

    /// Caps of the templates with the given direction, in declaration order
    pub fn template_caps(&self, direction: PadDirection) -> impl Iterator<Item = &Caps> {
        self.pad_templates
            .iter()
            .filter(move |t| t.direction == direction)
            .map(|t| &t.caps)
    }
}

/// Kind of registry feature to enumerate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Element,
    TypeFind,
}

/// Read-only view of a plugin registry
pub trait Registry {
    /// Find a feature by name
    fn lookup_feature(&self, name: &str) -> Option<ElementFactory>;

    /// All features of a kind, in registry order
    fn feature_list(&self, kind: FeatureKind) -> Vec<ElementFactory>;
}
