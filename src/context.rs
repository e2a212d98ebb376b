use crate::backend::{Cursor, TextFactory, WindowFactory};
use crate::render::DEFAULT_LINE_LENGTH;
use crate::timer::TimerService;
use core::fmt;
use std::sync::Arc;

/// Host behavior switches.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// If true, the root is laid out to fill the whole client area rather than just fit in it.
    pub prefer_fill_window: bool,

    /// Logs every routed event dispatch at debug level.
    pub trace_routed_events: bool,

    /// Cursor shown when neither the hovered nor the captured control sets one.
    pub default_cursor: Cursor,

    /// Distance scrolled per wheel notch.
    pub scroll_line_length: f64,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            prefer_fill_window: true,
            trace_routed_events: false,
            default_cursor: Cursor::Arrow,
            scroll_line_length: DEFAULT_LINE_LENGTH,
        }
    }
}

/// Collaborators shared by everything in one UI instance.
///
/// Constructed once and handed to the host; there is no global state.
#[derive(Clone)]
pub struct Context {
    window_factory: Arc<dyn WindowFactory>,
    text_factory: Arc<dyn TextFactory>,
    timers: Arc<dyn TimerService>,
    config: HostConfig,
}

impl Context {
    pub fn new(
        window_factory: Arc<dyn WindowFactory>,
        text_factory: Arc<dyn TextFactory>,
        timers: Arc<dyn TimerService>,
    ) -> Context {
        Context {
            window_factory,
            text_factory,
            timers,
            config: HostConfig::default(),
        }
    }

    pub fn with_config(mut self, config: HostConfig) -> Context {
        self.config = config;
        self
    }

    pub fn window_factory(&self) -> &dyn WindowFactory {
        &*self.window_factory
    }

    pub fn text_factory(&self) -> &dyn TextFactory {
        &*self.text_factory
    }

    pub fn timers(&self) -> &dyn TimerService {
        &*self.timers
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
