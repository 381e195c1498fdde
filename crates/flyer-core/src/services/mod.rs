//! Services: record-to-context mapping, rendering, per-SKU generation

pub mod context;
pub mod generator;
pub mod renderer;

pub use context::build_context;
pub use generator::{FlyerGenerator, JobStage};
pub use renderer::{FlyerRenderer, HtmlFlyerRenderer};
