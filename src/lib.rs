pub mod application;
pub mod camera;
pub mod pipeline;
pub mod renderer;
pub mod scene;
pub mod texture;
pub mod util;
