mod app;
pub use app::*;

pub mod floating_label;
pub mod input;
pub mod welcome_screen;

mod window_resizing;
