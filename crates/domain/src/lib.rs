//! # scenehub-domain
//!
//! Pure domain model for the scenehub scene automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Scenes** (a grid of action columns, each column a sequential lane)
//! - Define **Actions**: the raw stored document and the closed catalogue of
//!   typed actions it resolves to
//! - Define **Devices** and their **features** (the read-only snapshot the engine
//!   consumes from the device manager)
//! - Define **Events** (trigger requests, emitted side effects, run status)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod event;
pub mod home;
pub mod scene;
