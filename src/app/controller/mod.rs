pub mod studio_controller;

pub use studio_controller::{StudioController, StudioUpdate};
