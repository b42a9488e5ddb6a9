// src/stream/mod.rs
pub mod buffer;
pub mod error;
pub mod source;
pub mod ticker;
pub use buffer::SignalWindow;
pub use error::StreamError;
pub use source::{ManualSource, SimulatedLeadII, WaveformSource};
pub use ticker::{SignalStreamBuffer, TickerHandle};
