//! Input payloads and native window events.

use crate::rect::{Point, Size};

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    /// Whether any shift key is pressed.
    pub shift: bool,

    /// Whether any control key is pressed.
    pub control: bool,

    /// Whether any option key or alt key is pressed.
    pub option: bool,

    /// Whether any command key or meta key is pressed.
    pub command: bool,
}

/// Pointer movement, enter and leave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseArgs {
    /// Pointer location in window coordinates.
    pub point: Point,
}

/// A mouse button press or release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseButtonArgs {
    /// Pointer location in window coordinates.
    pub point: Point,
    pub button: MouseButton,
    pub modifiers: KeyModifiers,
}

/// A mouse wheel notch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelArgs {
    /// Pointer location in window coordinates.
    pub point: Point,

    /// Scroll delta in lines; positive values scroll towards the end of the content.
    pub delta: f64,
    pub modifiers: KeyModifiers,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyArgs {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Focus gained or lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusArgs {
    /// True if focus moved because the native window gained or lost focus, rather than
    /// between controls.
    pub is_window: bool,
}

/// Events delivered by the native window layer.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    MouseEnter,
    MouseLeave,
    MouseMove(Point),
    MouseDown(MouseButtonArgs),
    MouseUp(MouseButtonArgs),
    MouseWheel(WheelArgs),
    KeyDown(KeyArgs),
    KeyUp(KeyArgs),
    /// The window gained (`true`) or lost focus.
    Focus(bool),
    /// The client area was resized.
    Resize(Size),
    /// The OS asks for a repaint.
    Paint,
    /// The OS revoked the mouse capture.
    CaptureLost,
    /// The window is being destroyed.
    Destroy,
}

/// Physical keys, independent of the keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    N0,
    N1,
    N2,
    N3,
    N4,
    N5,
    N6,
    N7,
    N8,
    N9,
    Equal,
    Minus,
    LeftBracket,
    RightBracket,
    Quote,
    Semicolon,
    Backslash,
    Comma,
    Slash,
    Period,
    Grave,
    Enter,
    Tab,
    Space,
    Backspace,
    Escape,
    Meta,
    Shift,
    CapsLock,
    Alt,
    Control,
    RightMeta,
    RightShift,
    RightAlt,
    RightControl,
    LeftArrow,
    DownArrow,
    UpArrow,
    RightArrow,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadEqual,
    NumpadDecimal,
    NumpadPlus,
    NumpadMinus,
    NumpadMultiply,
    NumpadDivide,
    NumpadClear,
    NumpadEnter,
    NumpadComma,
}
