//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the scene engine and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod device_manager;
pub mod event_bus;
pub mod home_status;
pub mod scene_repo;

pub use device_manager::DeviceManager;
pub use event_bus::EventPublisher;
pub use home_status::HomeStatus;
pub use scene_repo::{SceneQuery, SceneRepository};
