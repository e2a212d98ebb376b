//! An in-memory native layer.
//!
//! Records what would have been shown instead of showing it. Used by the tests and for running
//! a host without a display.

use crate::backend::{
    Cursor, NativeWindow, Painter, PlatformError, TextFactory, TextLayout, WindowFactory,
};
use crate::color::Color;
use crate::rect::{CornerRadius, Point, Rect, Size, Thickness};
use cgmath::EuclideanSpace;
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded painter call.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    PushState,
    PopState,
    Translate(Size),
    PushClip(Rect),
    PopClip,
    Clear(Color),
    FillRect {
        rect: Rect,
        radius: CornerRadius,
        brush: Color,
    },
    StrokeBorder {
        rect: Rect,
        radius: CornerRadius,
        thickness: Thickness,
        brush: Color,
    },
    DrawText {
        origin: Point,
        text: String,
        brush: Color,
    },
}

/// A painter that records every call.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    ops: Vec<PaintOp>,
    sink: Option<Arc<Mutex<WindowState>>>,
}

impl RecordingPainter {
    pub fn new() -> RecordingPainter {
        RecordingPainter::default()
    }

    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }
}

impl Painter for RecordingPainter {
    fn push_state(&mut self) {
        self.ops.push(PaintOp::PushState);
    }

    fn pop_state(&mut self) {
        self.ops.push(PaintOp::PopState);
    }

    fn translate(&mut self, offset: Size) {
        self.ops.push(PaintOp::Translate(offset));
    }

    fn push_clip(&mut self, rect: Rect) {
        self.ops.push(PaintOp::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.ops.push(PaintOp::PopClip);
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(PaintOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, radius: CornerRadius, brush: Color) {
        self.ops.push(PaintOp::FillRect {
            rect,
            radius,
            brush,
        });
    }

    fn stroke_border(&mut self, rect: Rect, radius: CornerRadius, thickness: Thickness, brush: Color) {
        self.ops.push(PaintOp::StrokeBorder {
            rect,
            radius,
            thickness,
            brush,
        });
    }

    fn draw_text(&mut self, origin: Point, layout: &dyn TextLayout, brush: Color) {
        self.ops.push(PaintOp::DrawText {
            origin,
            text: layout.text().to_string(),
            brush,
        });
    }

    fn end(&mut self) -> Result<(), PlatformError> {
        if let Some(sink) = &self.sink {
            let mut state = sink.lock();
            if let Some(err) = state.fail_present.clone() {
                return Err(err);
            }
            state.frames.push(std::mem::take(&mut self.ops));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct WindowState {
    windows_created: usize,
    fail_create: Option<PlatformError>,
    fail_paint: Option<PlatformError>,
    fail_present: Option<PlatformError>,
    refuse_capture: bool,

    client_size: Size,
    mouse_position: Point,
    cursor: Option<Cursor>,
    captured: bool,
    repaint_requests: usize,
    frames: Vec<Vec<PaintOp>>,
}

/// Creates [`HeadlessWindow`]s that all share one observable state.
#[derive(Debug, Clone)]
pub struct HeadlessFactory {
    state: Arc<Mutex<WindowState>>,
}

impl HeadlessFactory {
    /// Windows created by this factory start with the given client size.
    pub fn new(client_size: Size) -> HeadlessFactory {
        HeadlessFactory {
            state: Arc::new(Mutex::new(WindowState {
                windows_created: 0,
                fail_create: None,
                fail_paint: None,
                fail_present: None,
                refuse_capture: false,
                client_size,
                mouse_position: Point::origin(),
                cursor: None,
                captured: false,
                repaint_requests: 0,
                frames: Vec::new(),
            })),
        }
    }

    pub fn windows_created(&self) -> usize {
        self.state.lock().windows_created
    }

    /// Makes window creation fail with the given error.
    pub fn fail_create(&self, error: Option<PlatformError>) {
        self.state.lock().fail_create = error;
    }

    /// Makes `begin_paint` fail with the given error.
    pub fn fail_paint(&self, error: Option<PlatformError>) {
        self.state.lock().fail_paint = error;
    }

    /// Makes presenting a frame fail with the given error.
    pub fn fail_present(&self, error: Option<PlatformError>) {
        self.state.lock().fail_present = error;
    }

    /// Makes `capture_mouse` return false.
    pub fn refuse_capture(&self, refuse: bool) {
        self.state.lock().refuse_capture = refuse;
    }

    pub fn client_size(&self) -> Size {
        self.state.lock().client_size
    }

    /// Changes the client size as if the user resized the window. Does not send an event.
    pub fn set_client_size(&self, size: Size) {
        self.state.lock().client_size = size;
    }

    pub fn set_mouse_position(&self, point: Point) {
        self.state.lock().mouse_position = point;
    }

    /// The last cursor set on the window.
    pub fn cursor(&self) -> Option<Cursor> {
        self.state.lock().cursor
    }

    pub fn is_captured(&self) -> bool {
        self.state.lock().captured
    }

    pub fn repaint_requests(&self) -> usize {
        self.state.lock().repaint_requests
    }

    /// Number of frames presented.
    pub fn frame_count(&self) -> usize {
        self.state.lock().frames.len()
    }

    /// The ops of the last presented frame.
    pub fn last_frame(&self) -> Option<Vec<PaintOp>> {
        self.state.lock().frames.last().cloned()
    }
}

impl WindowFactory for HeadlessFactory {
    fn create_window(&self) -> Result<Box<dyn NativeWindow>, PlatformError> {
        let mut state = self.state.lock();
        if let Some(err) = state.fail_create.clone() {
            return Err(err);
        }
        state.windows_created += 1;
        Ok(Box::new(HeadlessWindow {
            state: Arc::clone(&self.state),
        }))
    }
}

/// A window that exists only in memory.
#[derive(Debug)]
pub struct HeadlessWindow {
    state: Arc<Mutex<WindowState>>,
}

impl NativeWindow for HeadlessWindow {
    fn client_size(&self) -> Size {
        self.state.lock().client_size
    }

    fn set_client_size(&mut self, size: Size) {
        self.state.lock().client_size = size;
    }

    fn request_repaint(&mut self) {
        self.state.lock().repaint_requests += 1;
    }

    fn begin_paint(&mut self) -> Result<Box<dyn Painter + '_>, PlatformError> {
        if let Some(err) = self.state.lock().fail_paint.clone() {
            return Err(err);
        }
        Ok(Box::new(RecordingPainter {
            ops: Vec::new(),
            sink: Some(Arc::clone(&self.state)),
        }))
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.state.lock().cursor = Some(cursor);
    }

    fn capture_mouse(&mut self) -> bool {
        let mut state = self.state.lock();
        if state.refuse_capture {
            return false;
        }
        state.captured = true;
        true
    }

    fn release_mouse(&mut self) {
        self.state.lock().captured = false;
    }

    fn mouse_position(&self) -> Point {
        self.state.lock().mouse_position
    }
}

/// Monospaced text: every character is `char_width` wide and every line `line_height` tall.
///
/// Wraps at any character.
#[derive(Debug, Clone)]
pub struct FixedTextLayout {
    text: String,
    char_width: f64,
    line_height: f64,
}

impl FixedTextLayout {
    pub fn new(text: impl Into<String>, char_width: f64, line_height: f64) -> FixedTextLayout {
        FixedTextLayout {
            text: text.into(),
            char_width,
            line_height,
        }
    }
}

impl TextLayout for FixedTextLayout {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }

    fn measure(&self, max_width: f64) -> Size {
        let len = self.text.chars().count();
        let per_line = ((max_width / self.char_width).floor() as usize).max(1);
        let lines = if len == 0 { 1 } else { (len - 1) / per_line + 1 };
        Size::new(
            len.min(per_line) as f64 * self.char_width,
            lines as f64 * self.line_height,
        )
    }
}

/// Creates [`FixedTextLayout`]s.
#[derive(Debug, Clone, Copy)]
pub struct FixedTextFactory {
    char_width: f64,
    line_height: f64,
}

impl FixedTextFactory {
    pub fn new(char_width: f64, line_height: f64) -> FixedTextFactory {
        FixedTextFactory {
            char_width,
            line_height,
        }
    }
}

impl TextFactory for FixedTextFactory {
    fn create_text_layout(&self, text: &str) -> Box<dyn TextLayout> {
        Box::new(FixedTextLayout::new(text, self.char_width, self.line_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_text_wraps() {
        let layout = FixedTextLayout::new("hello world", 10., 12.);
        assert_eq!(layout.measure(f64::INFINITY), Size::new(110., 12.));
        assert_eq!(layout.measure(60.), Size::new(60., 24.));
        assert_eq!(layout.measure(1.), Size::new(10., 132.));
        assert_eq!(FixedTextLayout::new("", 10., 12.).measure(50.), Size::new(0., 12.));
    }

    #[test]
    fn window_state_is_shared_with_factory() {
        let factory = HeadlessFactory::new(Size::new(20., 10.));
        let mut window = factory.create_window().unwrap();
        assert_eq!(factory.windows_created(), 1);

        window.set_cursor(Cursor::Hand);
        assert_eq!(factory.cursor(), Some(Cursor::Hand));

        factory.refuse_capture(true);
        assert!(!window.capture_mouse());
        factory.refuse_capture(false);
        assert!(window.capture_mouse());
        assert!(factory.is_captured());

        {
            let mut painter = window.begin_paint().unwrap();
            painter.clear(Color::WHITE);
            painter.end().unwrap();
        }
        assert_eq!(factory.last_frame(), Some(vec![PaintOp::Clear(Color::WHITE)]));
    }

    #[test]
    fn create_failure_carries_code() {
        let factory = HeadlessFactory::new(Size::new(20., 10.));
        factory.fail_create(Some(PlatformError::new(5, "no display")));
        let err = factory.create_window().err().unwrap();
        assert_eq!(err.code, 5);
    }
}
