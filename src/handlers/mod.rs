//! Handler implementations

pub mod discard;
pub mod json;
pub mod level;
pub mod logfmt;
pub mod memory;
pub mod multi;

#[cfg(feature = "console")]
pub mod text;

pub use discard::DiscardHandler;
pub use json::JsonHandler;
pub use level::LevelHandler;
pub use logfmt::LogfmtHandler;
pub use memory::MemoryHandler;
pub use multi::MultiHandler;

#[cfg(feature = "console")]
pub use text::TextHandler;

pub use crate::core::{Handler, HandlerFn};
