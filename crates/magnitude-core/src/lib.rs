pub mod backend;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod field;
pub mod layout;
pub mod level;
pub mod mapping;
pub mod markers;
pub mod ripple;
pub mod scene;
pub mod scheduler;
pub mod stepper;
pub mod tier;
pub mod transition;

pub static BLOCKS_WGSL: &str = include_str!("../shaders/blocks.wgsl");

pub use backend::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use field::*;
pub use layout::*;
pub use level::*;
pub use mapping::*;
pub use markers::*;
pub use ripple::*;
pub use scene::*;
pub use scheduler::*;
pub use stepper::*;
pub use tier::*;
pub use transition::*;
