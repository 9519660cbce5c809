// Export engine - caps model, registry access and export settings

pub mod caps;
pub mod query;
pub mod registry;
pub mod settings;

pub use caps::{Caps, CapsValue, Fraction, Structure};
pub use query::*;
pub use registry::{ElementFactory, FeatureKind, PadDirection, Registry, StaticRegistry};
pub use settings::{ExportSettings, Serializable, Signal, SubscriptionId};
