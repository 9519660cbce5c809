//! Export settings for a video editor, plus the plugin registry queries
//! used to pick muxers and encoders that can work together.

pub mod config;
pub mod engine;
