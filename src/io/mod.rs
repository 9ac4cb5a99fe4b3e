// Purpose - external interfaces: performance files and offline rendering

pub mod performance;
pub mod render;

pub use performance::{load, save, Format, LoadError, Performance, PerformanceRow};
pub use render::{render_length, render_performance, render_to_wav, write_wav, RenderError};
