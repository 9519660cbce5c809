#![allow(dead_code)]

use expset::engine::{Caps, ElementFactory, ExportSettings, PadDirection, Signal, StaticRegistry};
use std::cell::Cell;
use std::rc::Rc;

/// Parse caps text, panicking on malformed input
pub fn caps(text: &str) -> Caps {
    text.parse()
        .unwrap_or_else(|e| panic!("invalid caps '{}': {}", text, e))
}

pub fn builtin() -> StaticRegistry {
    StaticRegistry::builtin().expect("bundled registry parses")
}

/// Encoder with a single src template
pub fn encoder(name: &str, klass: &str, src: &str) -> ElementFactory {
    ElementFactory::new(name, klass).with_pad("src", PadDirection::Src, caps(src))
}

/// Muxer with a single sink template
pub fn muxer(name: &str, sink: &str) -> ElementFactory {
    ElementFactory::new(name, "Codec/Muxer").with_pad("sink_%d", PadDirection::Sink, caps(sink))
}

/// Names of the given factories, in order
pub fn names<'a>(factories: impl IntoIterator<Item = &'a ElementFactory>) -> Vec<String> {
    factories.into_iter().map(|f| f.name.clone()).collect()
}

/// Count notifications of `signal` delivered by `settings`
pub fn counter(settings: &mut ExportSettings, signal: Signal) -> Rc<Cell<u32>> {
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    settings.subscribe(signal, move |_| h.set(h.get() + 1));
    hits
}
