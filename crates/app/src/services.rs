//! Application services — use-case implementations.
//!
//! Services take their ports as generic parameters (constructor injection),
//! keeping this layer decoupled from concrete adapters.

pub mod scene_service;
