pub mod controller;
pub mod studio_app;
pub mod views;

pub use controller::StudioController;
pub use studio_app::StudioApp;
