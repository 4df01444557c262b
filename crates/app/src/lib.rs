//! # scenehub-app
//!
//! Application layer: use-cases, the scene engine and **port definitions**.
//!
//! ## Responsibilities
//! - Define the **driven ports** adapters must implement:
//!   - `SceneRepository` — scene document storage
//!   - `DeviceManager` — device lookup and feature writes
//!   - `HomeStatus` — clock, alarm, presence, calendars and grid signals
//!   - `EventPublisher` — the event bus
//! - Provide the **driving side**:
//!   - `SceneService` — scene CRUD and start requests
//!   - `TriggerListener` + `SceneDispatcher` — run scenes as concurrent lanes
//! - Provide in-process infrastructure (the event bus) that needs no IO
//!
//! ## Dependency rule
//! Depends on `scenehub-domain` only (plus tokio for tasks, channels and
//! timers). Never imports adapter crates.

pub mod event_bus;
pub mod ports;
pub mod scene_engine;
pub mod services;
