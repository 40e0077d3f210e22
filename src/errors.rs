//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`GloamError`] covers all failure modes including:
//! - GPU initialization failures
//! - Window and event loop errors
//! - Asset loading and decoding errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, GloamError>`.
//!
//! ```rust,ignore
//! use gloam::errors::{GloamError, Result};
//!
//! fn load_asset() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the engine.
///
/// This enum covers all possible error conditions that can occur
/// during engine operation. Each variant provides specific context
/// about what went wrong.
#[derive(Error, Debug)]
pub enum GloamError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create a surface for the window.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// Failed to acquire the next frame from the surface.
    #[error("Failed to acquire render target: {0:?}")]
    SurfaceAcquireFailed(wgpu::SurfaceStatus),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Image & Texture Errors
    // ========================================================================
    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for GloamError {
    fn from(err: image::ImageError) -> Self {
        GloamError::ImageDecodeError(err.to_string())
    }
}

/// Alias for `Result<T, GloamError>`.
pub type Result<T> = std::result::Result<T, GloamError>;
