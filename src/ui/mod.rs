pub mod buffer;
pub mod effects;
pub mod input;
pub mod panel;
pub mod renderer;
pub mod terminal;
pub mod world_view;
