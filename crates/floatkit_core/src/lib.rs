//! Floatkit Core
//!
//! This crate provides the foundational primitives for the floatkit
//! floating-overlay toolkit:
//!
//! - **Geometry**: `Point`, `Size`, `Rect`, and `EdgeInsets` in screen space
//! - **Watchable Values**: latest-value observables used to stream positions
//!   from the physics layer to the view layer
//!
//! # Example
//!
//! ```rust
//! use floatkit_core::{Point, WatchableValue};
//!
//! let position = WatchableValue::new(Point::ZERO);
//!
//! // Observers immediately receive the current value, then every change
//! let _guard = position.watch(|p: &Point| {
//!     println!("overlay moved to {:?}", p);
//! });
//!
//! position.set(Point::new(40.0, 80.0));
//! assert_eq!(position.get(), Point::new(40.0, 80.0));
//! ```

pub mod geometry;
pub mod watch;

pub use geometry::{EdgeInsets, Point, Rect, Size};
pub use watch::{WatchGuard, WatchableValue, WatcherKey};
