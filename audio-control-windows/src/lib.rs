//! # audio-control-windows
//!
//! Windows WASAPI backend for audio-control.
//!
//! Provides:
//! - `WasapiBackend`: connects to the MMDevice API and hands out a `WasapiConnection`
//! - `WasapiConnection`: render devices, per-device sessions, volume/mute, friendly names
//! - `top_level_windows`: window lookup used to name sessions after their process
//!
//! ## Platform Requirements
//! - Windows 7+ (`IAudioSessionManager2`)
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use audio_control_core::AudioSystem;
//! use audio_control_windows::WasapiBackend;
//!
//! let system = AudioSystem::connect(&WasapiBackend).unwrap();
//! let speakers = system.default_device().unwrap();
//! speakers.set_volume(0.2).unwrap();
//! ```

#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
pub mod top_level_windows;
#[cfg(target_os = "windows")]
pub mod wasapi;

#[cfg(target_os = "windows")]
pub use wasapi::{WasapiBackend, WasapiConnection};
