pub mod annotate;
pub mod config;
pub mod exercise;
pub mod feedback;
pub mod geometry;
pub mod landmarks;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod synthetic;
pub mod trace;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
#[cfg(feature = "uniffi")]
pub mod uniffi_interface;
