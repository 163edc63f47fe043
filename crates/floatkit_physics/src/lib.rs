//! Floatkit Physics
//!
//! The 2D offset controller behind a draggable, physics-animated floating
//! overlay. It keeps the overlay's position under three drivers:
//!
//! - **Direct drag**: gesture offsets placed directly, clamped to bounds
//! - **Programmatic throw**: spring-damper flight toward a target
//! - **Corner snap**: on release, animate to the nearest snap position
//!
//! The overlay never escapes its boundary rectangle: every emitted position,
//! combined with the overlay's size, stays inside it (clamped, not bounced).
//!
//! The surrounding view layer supplies gesture offsets, the overlay's size,
//! and a frame [`Ticker`]; it subscribes to the controller's position stream
//! and calls [`OffsetController::tick`] each frame while an animation runs.
//!
//! # Example
//!
//! ```rust
//! use floatkit_core::{Point, Rect, Size};
//! use floatkit_physics::{OffsetConfig, OffsetController};
//!
//! let mut controller = OffsetController::new(OffsetConfig::default());
//! controller.init(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(800.0, 600.0));
//! controller.set_child_size(Size::new(100.0, 100.0));
//!
//! controller.drag_start_tracked(Point::new(50.0, 50.0));
//! controller.drag_update_tracked(Point::new(150.0, 250.0), Size::new(100.0, 100.0));
//! controller.drag_end_snap();
//!
//! // Host frame loop: advance the simulation until it settles
//! while controller.tick(1.0 / 60.0) {}
//! ```

pub mod controller;
pub mod spring;
pub mod ticker;

pub use controller::{
    scale_centering_offset, ChildMetrics, DragState, OffsetConfig, OffsetController,
};
pub use spring::SpringConfig;
pub use ticker::{NullTicker, Ticker};
