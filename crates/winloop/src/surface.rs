//! Drawing surfaces
//!
//! A window is created with one [`SurfaceKind`]. The runtime never draws; it
//! hands the application a [`SurfaceHandle`] to attach a renderer to and
//! calls `present` once per frame after the draw callback returned.
//!
//! # Surface kinds
//!
//! - **`Native`**: no client API. Raw window/display handles for an external
//!   GPU backend (Vulkan via `ash-window`, `wgpu`, ...), which presents its
//!   own swapchain
//! - **`OpenGl`**: a GL or GLES context owned by the window; present swaps
//!   buffers
//! - **`Pixels`**: a CPU framebuffer of `0x00RRGGBB` pixels

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use serde::{Deserialize, Serialize};

/// What kind of drawing surface a window is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// Raw handles only
    #[default]
    Native,
    /// OpenGL or OpenGL ES context
    OpenGl {
        /// Context major version
        major: u32,
        /// Context minor version
        minor: u32,
        /// Request OpenGL ES instead of desktop GL
        gles: bool,
    },
    /// CPU pixel buffer sized to the framebuffer
    Pixels,
}

impl SurfaceKind {
    /// Desktop OpenGL context of the given version
    pub const fn opengl(major: u32, minor: u32) -> Self {
        Self::OpenGl { major, minor, gles: false }
    }

    /// OpenGL ES context of the given version
    pub const fn gles(major: u32, minor: u32) -> Self {
        Self::OpenGl { major, minor, gles: true }
    }

    /// Whether `present` swaps a context's buffers
    pub const fn has_context(&self) -> bool {
        matches!(self, Self::OpenGl { .. })
    }
}

/// Handle a renderer attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceHandle {
    /// Platform window and display handles
    Native {
        /// Window handle
        window: RawWindowHandle,
        /// Display handle
        display: RawDisplayHandle,
    },
    /// Current GL context; load functions through `gl_proc_address`
    OpenGl {
        /// Context major version
        major: u32,
        /// Context minor version
        minor: u32,
        /// Whether the context is GLES
        gles: bool,
    },
    /// Pixel buffer; write through `pixels_mut`
    Pixels {
        /// Buffer width
        width: u32,
        /// Buffer height
        height: u32,
    },
    /// Window exists but has nothing to draw into (headless native window)
    Detached,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        surface: SurfaceKind,
    }

    #[test]
    fn test_surface_kind_from_toml() {
        let native: Wrapper = toml::from_str("surface = \"native\"").unwrap();
        assert_eq!(native.surface, SurfaceKind::Native);

        let gl: Wrapper = toml::from_str("[surface.open_gl]\nmajor = 3\nminor = 3\ngles = false\n").unwrap();
        assert_eq!(gl.surface, SurfaceKind::opengl(3, 3));
        assert!(gl.surface.has_context());
    }
}
