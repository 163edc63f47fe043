//! Frame ticker abstraction
//!
//! The controller does not own a frame loop. Instead the host supplies a
//! [`Ticker`]: when a programmatic animation starts the controller calls
//! `start()`, and the host is expected to call
//! [`OffsetController::tick`](crate::OffsetController::tick) once per frame
//! until the controller calls `stop()`. `start`/`stop` may be called
//! repeatedly over the controller's lifetime.
//!
//! In a UI embedding this maps onto the toolkit's animation-frame callback
//! (request redraws while running); in headless or test contexts a fixed
//! timestep loop works just as well.

/// A startable/stoppable frame-callback source
///
/// Implementations take `&self`; use interior mutability (atomics or locks)
/// for the running flag.
pub trait Ticker: Send {
    /// Begin delivering frame ticks to the controller
    fn start(&self);

    /// Stop delivering frame ticks
    fn stop(&self);
}

/// A ticker that does nothing
///
/// Useful for headless hosts that unconditionally call
/// [`tick`](crate::OffsetController::tick) every frame and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTicker;

impl Ticker for NullTicker {
    fn start(&self) {}

    fn stop(&self) {}
}
