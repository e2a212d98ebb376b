//! Traits for the collaborators the core talks to but does not implement: the native window
//! layer and the drawing/text backend.
//!
//! Backends are platform-specific UI frameworks (Win32, Cocoa, X11…) abstracted to a common
//! interface. The core only ever holds a native window through [`NativeWindow`], and only
//! touches drawing resources inside draw and measure calls.

use crate::color::Color;
use crate::rect::{CornerRadius, Point, Rect, Size, Thickness};
use core::fmt;

/// A failure reported by the native layer, carrying its native error code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    pub code: i32,
    pub message: String,
}

impl PlatformError {
    pub fn new(code: i32, message: impl Into<String>) -> PlatformError {
        PlatformError {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "platform error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for PlatformError {}

/// System cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cursor {
    Arrow,
    Hand,
    IBeam,
    ResizeHorizontal,
    ResizeVertical,
}

/// A painter for one frame.
///
/// State pushes and clip pushes must be balanced by the caller.
pub trait Painter {
    /// Saves the current transform.
    fn push_state(&mut self);

    /// Restores the last saved transform.
    fn pop_state(&mut self);

    /// Translates all subsequent drawing.
    fn translate(&mut self, offset: Size);

    /// Clips all subsequent drawing to the rectangle (in current coordinates).
    fn push_clip(&mut self, rect: Rect);

    fn pop_clip(&mut self);

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, radius: CornerRadius, brush: Color);

    /// Strokes the border band between `rect` and `rect` shrunk by `thickness`.
    fn stroke_border(&mut self, rect: Rect, radius: CornerRadius, thickness: Thickness, brush: Color);

    fn draw_text(&mut self, origin: Point, layout: &dyn TextLayout, brush: Color);

    /// Finishes the frame and presents it.
    fn end(&mut self) -> Result<(), PlatformError>;
}

/// A shaped piece of text owned by the text backend.
pub trait TextLayout: fmt::Debug {
    fn text(&self) -> &str;

    fn set_text(&mut self, text: String);

    /// Measures the text when wrapped at `max_width` (may be infinite).
    fn measure(&self, max_width: f64) -> Size;
}

/// A native window.
pub trait NativeWindow {
    /// The client area size; zero if the window has not been shown yet.
    fn client_size(&self) -> Size;

    fn set_client_size(&mut self, size: Size);

    /// Asks the native layer to send a paint request soon.
    fn request_repaint(&mut self);

    /// Starts painting a frame.
    fn begin_paint(&mut self) -> Result<Box<dyn Painter + '_>, PlatformError>;

    fn set_cursor(&mut self, cursor: Cursor);

    /// Starts routing all pointer input to this window. Returns false if the OS refused.
    fn capture_mouse(&mut self) -> bool;

    fn release_mouse(&mut self);

    /// The current pointer position in client coordinates.
    fn mouse_position(&self) -> Point;
}

/// Creates native windows.
pub trait WindowFactory {
    fn create_window(&self) -> Result<Box<dyn NativeWindow>, PlatformError>;
}

/// Creates text layouts.
pub trait TextFactory {
    fn create_text_layout(&self, text: &str) -> Box<dyn TextLayout>;
}
