//! # scenehub-adapter-virtual
//!
//! Virtual/demo integration standing in for real device protocols and home
//! services.
//!
//! ## Provided devices
//!
//! | Device | Feature | Behaviour |
//! |--------|---------|-----------|
//! | `virtual-light` | `virtual-light-binary` | On/off, writable |
//! | `virtual-light` | `virtual-light-brightness` | 0–100, writable |
//! | `virtual-switch` | `virtual-switch-binary` | On/off, writable |
//! | `virtual-temperature-sensor` | `virtual-temperature-sensor-temperature` | Read-only, starts at 21.5 |
//!
//! [`VirtualHome`] keeps alarm modes, presence, calendar events and grid
//! signals in memory. It follows the `alarm.set-mode`, `user.seen-at-home`
//! and `user.left-home` events that scenes emit, so a demo setup behaves as
//! if those subsystems existed.
//!
//! ## Dependency rule
//!
//! Depends on `scenehub-app` (port traits) and `scenehub-domain` only.

mod devices;
mod home;

pub use devices::VirtualDeviceManager;
pub use home::VirtualHome;
