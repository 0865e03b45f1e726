mod app;
mod cli;
mod display;
mod logging;

pub use app::run_app;
