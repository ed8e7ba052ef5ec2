//! I/O utilities for the archive pipeline.

pub mod sink;

pub use sink::SinkWriter;
