//! Async bring-up and display orchestration for IT8951-driven e-paper
//! panels.
//!
//! The IT8951 family reports its waveform firmware revision at start-up,
//! and that revision decides two things a host must get right: which
//! waveform slot holds the fast monochrome update, and whether transfers
//! have to be trimmed to a 32-pixel boundary to avoid corrupted rows. This
//! crate owns that policy, plus the ordered bring-up/render/power-down
//! sequence around it, and guarantees the panel is left in a safe
//! low-power state on every exit path, including an operator interrupt
//! mid-transfer.
//!
//! ## Core traits
//!
//! The crate is organized around seams for the hardware it does not drive
//! itself:
//!
//! - [`hw::BusHw`] / [`hw::DelayHw`]: the host's bus layer and delay
//!   timer.
//! - [`it8951::It8951`]: the controller protocol driver (init, clear,
//!   frame transfer, sleep/standby).
//! - [`source::ImageSource`] / [`source::RasterConverter`]: image
//!   acquisition and conversion to the controller's packed raster format.
//!
//! Implement these for your platform, then hand everything to
//! [`pipeline::Pipeline`]:
//!
//! - `variant` maps the reported LUT revision to the per-generation update
//!   policy.
//! - `layout` derives the usable frame geometry and recombines the split
//!   frame buffer address.
//! - `guard` tracks transfer buffers and controller power so teardown is
//!   idempotent no matter which path reaches it.
//! - `pipeline` sequences the whole run and honours a one-shot
//!   [`pipeline::Interrupt`] token between stages.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod guard;
pub mod hw;
pub mod it8951;
pub mod layout;
pub mod pipeline;
pub mod source;
pub mod variant;

mod log;

pub use config::{Config, USAGE};
pub use pipeline::{Interrupt, Outcome, Pipeline, PipelineError};
