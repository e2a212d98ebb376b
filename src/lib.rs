//! Retained-mode UI core.
//!
//! # Conceptual overview
//! Perch keeps two trees: a tree of *controls*, the logical nodes that input, focus and styles
//! are routed through, and a tree of *render objects*, which measure, arrange, paint and
//! hit-test. Every control owns one primary render object (and possibly more); a container
//! control inserts its children’s render objects into one of its own.
//!
//! Both trees live in arenas ([`ControlTree`] and [`RenderTree`]) and refer to their nodes by
//! id. Anything that may have disappeared is looked up again right before it is used, so event
//! handlers may freely restructure the tree while events are being dispatched.
//!
//! ## Layout
//! Layout happens in two passes. In the measure pass, each node is asked for its size under a
//! [`MeasureRequirement`] (a min, max and suggested size, each dimension possibly unspecified)
//! and a preferred size; containers measure their children according to their policy. In the
//! layout pass, each node is given its offset within its parent and arranges its children.
//! Invalidating a node’s layout marks its ancestors too, and any number of invalidations before
//! the next [`Host::poll`] result in one relayout.
//!
//! ## Events
//! Input arrives at a [`Host`] as [`NativeEvent`]s. Pointer events target the captured control if
//! there is one and the control under the pointer otherwise; keyboard events target the focused
//! control. From there, events are routed along the ancestor chain: tunneling down from the
//! root, bubbling back up unless handled, then delivered directly to every control on the way.
//! See [`routed`] for details.
//!
//! ## Platform
//! The native window and drawing layers are collaborators behind the traits in [`backend`],
//! injected through a [`Context`]. [`headless`] provides an in-memory implementation.

pub mod backend;
pub mod click;
pub mod color;
mod context;
pub mod control;
pub mod controls;
pub mod events;
pub mod headless;
mod host;
pub mod measure;
pub mod rect;
pub mod render;
pub mod routed;
pub mod timer;
mod tree;

pub use context::{Context, HostConfig};
pub use control::{ControlEvents, ControlId};
pub use events::NativeEvent;
pub use host::{Host, HostError, HostStats};
pub use measure::{MeasureLength, MeasureRequirement, MeasureSize};
pub use render::{RenderId, RenderTree};
pub use tree::{ControlTree, Detached};
