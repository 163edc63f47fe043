//! Draggable floating-overlay offset controller
//!
//! `OffsetController` owns the overlay's position and velocity and keeps
//! them consistent under three drivers: direct drag placement, programmatic
//! throws, and snap-to-nearest-corner on release. All emitted positions are
//! clamped so the overlay rectangle stays inside its boundary.
//!
//! The controller is single-threaded and cooperative: gesture callbacks and
//! the frame tick run on the same host loop and never concurrently. Starting
//! a new drag always cancels an in-flight animation (last writer wins).
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
//! // Throw the overlay toward the bottom-right corner
//! controller.throw_to(Point::new(700.0, 500.0), None);
//! while controller.tick(1.0 / 60.0) {}
//! assert_eq!(controller.position(), Point::new(700.0, 500.0));
//! ```

use std::time::Instant;

use floatkit_core::{EdgeInsets, Point, Rect, Size, WatchGuard, WatchableValue};
use smallvec::{smallvec, SmallVec};
use tracing::{debug, trace};

use crate::spring::SpringConfig;
use crate::ticker::{NullTicker, Ticker};

// ============================================================================
// Constants
// ============================================================================

/// Largest integration step per tick; longer frame hitches are capped
const MAX_FRAME_DT: f32 = 1.0 / 30.0;

/// Position error below which a targeted animation may settle
const SETTLE_DISTANCE: f32 = 1.0;

/// Default throw speed per unit of distance to the target
const THROW_SPEED_PER_UNIT: f32 = 2.5;

/// Weight of the newest sample in the gesture velocity estimate
const VELOCITY_BLEND: f32 = 0.3;

/// Gesture samples with a larger time delta are discarded (resume spikes)
const MAX_SAMPLE_DT: f32 = 0.1;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for an [`OffsetController`]
#[derive(Debug, Clone, Copy)]
pub struct OffsetConfig {
    /// Inset applied to the boundary on each edge
    pub padding: EdgeInsets,
    /// Constrain to the container limits passed to `init` instead of
    /// floating freely over the whole screen
    pub constrained: bool,
    /// Snap to the nearest snap position when a tracked drag ends
    pub snap_enabled: bool,
    /// Spring tuning for throw and snap animations
    pub spring: SpringConfig,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            padding: EdgeInsets::ZERO,
            constrained: false,
            snap_enabled: true,
            spring: SpringConfig::default(),
        }
    }
}

impl OffsetConfig {
    /// Free-floating over the screen with the given padding
    pub fn free_floating(padding: EdgeInsets) -> Self {
        Self {
            padding,
            constrained: false,
            ..Default::default()
        }
    }

    /// Constrained to the container limits with the given padding
    pub fn constrained(padding: EdgeInsets) -> Self {
        Self {
            padding,
            constrained: true,
            ..Default::default()
        }
    }
}

// ============================================================================
// Drag State
// ============================================================================

/// Which driver currently owns the overlay's position
///
/// Exactly one is active at a time; a drag start always wins over a running
/// animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// At rest; position only changes through explicit calls
    #[default]
    Idle,
    /// A gesture is placing the position directly
    Dragging,
    /// The spring integrator is advancing the position each tick
    Animating,
}

// ============================================================================
// Child Metrics
// ============================================================================

/// Size and scale of the floating child, as reported by the layout pass
#[derive(Debug, Clone, Copy)]
pub struct ChildMetrics {
    /// Current (scaled) size of the child
    pub size: Size,
    /// Scale factor the size was measured at
    pub scale: f32,
}

/// Offset introduced by growing/shrinking a child about its origin
///
/// Subtracting this from a drag delta makes the child appear to scale about
/// its own center instead of its top-left corner.
pub fn scale_centering_offset(old_size: Size, new_size: Size) -> Point {
    Point::new(
        (new_size.width - old_size.width) / 2.0,
        (new_size.height - old_size.height) / 2.0,
    )
}

// ============================================================================
// Offset Controller
// ============================================================================

/// Physics-backed position controller for a draggable floating overlay
pub struct OffsetController {
    config: OffsetConfig,
    /// None until `init`; pre-init calls pass offsets through unclamped
    boundary: Option<Rect>,
    position: WatchableValue<Point>,
    velocity: Point,
    /// Goal of the active throw/snap run
    target: Option<Point>,
    state: DragState,
    snap_positions: SmallVec<[Point; 4]>,
    /// A custom snap list suppresses corner recomputation
    custom_snap: bool,
    child_size: Size,
    /// Committed position at gesture start; drag deltas apply on top of it
    start_offset: Point,
    /// Pointer offset at gesture start
    drag_origin: Point,
    /// Previous pointer offset, for velocity estimation
    last_pointer: Point,
    last_move: Option<Instant>,
    last_tick: Option<Instant>,
    /// Released exactly once on `dispose`
    ticker: Option<Box<dyn Ticker>>,
}

impl OffsetController {
    /// Create a controller with a no-op ticker
    pub fn new(config: OffsetConfig) -> Self {
        Self::with_ticker(config, Box::new(NullTicker))
    }

    /// Create a controller driven by the host's frame ticker
    pub fn with_ticker(config: OffsetConfig, ticker: Box<dyn Ticker>) -> Self {
        Self {
            config,
            boundary: None,
            position: WatchableValue::new(Point::ZERO),
            velocity: Point::ZERO,
            target: None,
            state: DragState::Idle,
            snap_positions: SmallVec::new(),
            custom_snap: false,
            child_size: Size::ZERO,
            start_offset: Point::ZERO,
            drag_origin: Point::ZERO,
            last_pointer: Point::ZERO,
            last_move: None,
            last_tick: None,
            ticker: Some(ticker),
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Compute the boundary rectangle and default snap positions
    ///
    /// Constrained mode insets the container `limits` by the configured
    /// padding; free-floating mode insets the screen rectangle instead, so
    /// left/top padding shifts the usable origin and right/bottom padding
    /// pulls in the far edges.
    ///
    /// Idempotent, and safe to call before the real child size is known;
    /// snap positions are recomputed again on [`set_child_size`].
    ///
    /// [`set_child_size`]: OffsetController::set_child_size
    pub fn init(&mut self, limits: Rect, screen: Size) {
        let boundary = if self.config.constrained {
            limits.inset_by(self.config.padding)
        } else {
            screen.to_rect().inset_by(self.config.padding)
        };

        debug!(?boundary, constrained = self.config.constrained, "init");
        self.boundary = Some(boundary);
        self.recompute_snap_positions();
    }

    /// Update the overlay's size and recompute corner snap positions
    pub fn set_child_size(&mut self, size: Size) {
        if size != self.child_size {
            self.child_size = size;
            self.recompute_snap_positions();
        }
    }

    fn recompute_snap_positions(&mut self) {
        if self.custom_snap {
            return;
        }
        let Some(bounds) = self.boundary else {
            self.snap_positions.clear();
            return;
        };

        let w = self.child_size.width;
        let h = self.child_size.height;
        // Top-left first: it wins distance ties on snap
        self.snap_positions = smallvec![
            Point::new(bounds.min_x(), bounds.min_y()),
            Point::new(bounds.max_x() - w, bounds.min_y()),
            Point::new(bounds.min_x(), bounds.max_y() - h),
            Point::new(bounds.max_x() - w, bounds.max_y() - h),
        ];
    }

    // =========================================================================
    // Drag Gestures
    // =========================================================================

    /// Record the start of a drag gesture
    ///
    /// `offset` is the absolute pointer position; subsequent updates apply
    /// their delta from it on top of the current overlay position.
    pub fn drag_start(&mut self, offset: Point) {
        self.drag_origin = offset;
        self.start_offset = self.position.get();
        self.state = DragState::Dragging;
    }

    /// Record a drag start and arm velocity tracking
    ///
    /// Also cancels any running animation and zeroes the velocity, so the
    /// gesture starts from a clean estimate.
    pub fn drag_start_tracked(&mut self, offset: Point) {
        self.cancel_animation();
        self.drag_start(offset);
        self.last_pointer = offset;
        self.last_move = Some(Instant::now());
    }

    /// Place the overlay from a drag update, correcting for scale gestures
    ///
    /// If the child's scale changed since the previous update (an active
    /// pinch), the symmetric size offset between `previous_scale` and the
    /// metrics' scale is subtracted from the delta so the child scales about
    /// its center rather than its origin.
    pub fn drag_update(&mut self, offset: Point, metrics: ChildMetrics, previous_scale: f32) {
        let mut delta = offset - self.drag_origin;

        if metrics.scale > 0.0 && previous_scale != metrics.scale {
            let previous_size = metrics.size.scaled(previous_scale / metrics.scale);
            delta = delta - scale_centering_offset(previous_size, metrics.size);
        }

        self.apply_drag_delta(delta, metrics.size);
    }

    /// Place the overlay from a drag update and refine the velocity estimate
    pub fn drag_update_tracked(&mut self, offset: Point, size: Size) {
        let now = Instant::now();
        if let Some(last) = self.last_move {
            let dt = (now - last).as_secs_f32();
            self.track_velocity(offset - self.last_pointer, dt);
        }
        self.last_move = Some(now);
        self.last_pointer = offset;

        self.apply_drag_delta(offset - self.drag_origin, size);
    }

    /// Blend a gesture sample into the velocity estimate
    fn track_velocity(&mut self, step: Point, dt: f32) {
        // Non-positive or oversized deltas come from clock glitches or a
        // suspended frame loop; they would corrupt the estimate.
        if dt <= 0.0 || dt > MAX_SAMPLE_DT {
            trace!(dt, "ignoring implausible gesture sample");
            return;
        }

        let instantaneous = step * (1.0 / dt);
        self.velocity = (self.velocity * (1.0 - VELOCITY_BLEND) + instantaneous * VELOCITY_BLEND)
            .clamped_length(self.config.spring.max_velocity);
    }

    /// Direct placement: `position = clamp(start + delta)`
    ///
    /// This is the single source of truth for drag placement, shared by both
    /// update variants and by the scale-offset correction.
    pub fn apply_drag_delta(&mut self, delta: Point, size: Size) {
        self.set_child_size(size);
        let next = self.clamp_to_boundary(self.start_offset + delta, size);
        trace!(x = next.x, y = next.y, "drag placement");
        self.position.set(next);
    }

    /// Commit the current position as the next gesture's start reference
    pub fn drag_end(&mut self) {
        self.start_offset = self.position.get();
        self.state = DragState::Idle;
    }

    /// Commit the drag and, if snapping is enabled, animate to the nearest
    /// snap position
    ///
    /// Nearest is by Euclidean distance; ties keep the first-encountered
    /// candidate. An empty snap list leaves the overlay where it was
    /// released.
    pub fn drag_end_snap(&mut self) {
        self.drag_end();

        if !self.config.snap_enabled {
            return;
        }
        let current = self.position.get();
        if let Some(nearest) = self.nearest_snap(current) {
            self.throw_to(nearest, None);
        }
    }

    fn nearest_snap(&self, current: Point) -> Option<Point> {
        let mut best: Option<(f32, Point)> = None;
        for &candidate in &self.snap_positions {
            let distance = current.distance_to(candidate);
            // Strict comparison keeps the first-encountered candidate on ties
            match best {
                Some((best_distance, _)) if distance >= best_distance => {}
                _ => best = Some((distance, candidate)),
            }
        }
        best.map(|(_, position)| position)
    }

    // =========================================================================
    // Programmatic Animation
    // =========================================================================

    /// Launch a spring animation toward `target`
    ///
    /// The target is clamped to the boundary first. The initial velocity
    /// aims at the target with the supplied speed, or
    /// `min(distance * 2.5, max_velocity)` when none is given. A target at
    /// the current position yields a zero initial velocity.
    pub fn throw_to(&mut self, target: Point, velocity: Option<f32>) {
        let target = self.clamp_to_boundary(target, self.child_size);
        let current = self.position.get();
        let displacement = target - current;
        let distance = displacement.length();

        let speed = velocity
            .unwrap_or(distance * THROW_SPEED_PER_UNIT)
            .clamp(0.0, self.config.spring.max_velocity);

        debug!(?target, speed, "throw started");
        self.velocity = displacement.normalized() * speed;
        self.target = Some(target);
        self.state = DragState::Animating;
        self.last_tick = None;
        if let Some(ticker) = &self.ticker {
            ticker.start();
        }
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// Called by the host's frame loop while the ticker is running. Returns
    /// `true` while the animation is still active. The integration step is
    /// capped at 1/30 s so frame hitches cannot blow up the spring.
    ///
    /// Direct-drag mode never enters the integrator: a tick outside
    /// [`DragState::Animating`] only stops the ticker.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.state != DragState::Animating {
            self.stop_ticker();
            return false;
        }

        let dt = dt.min(MAX_FRAME_DT);
        if dt <= 0.0 {
            return true;
        }

        let current = self.position.get();
        let displacement = match self.target {
            Some(target) => target - current,
            None => Point::ZERO,
        };

        self.velocity = self.config.spring.integrate(displacement, self.velocity, dt);

        // Clamp, never bounce: a spring pushing past a wall pins the
        // position there and leaves the velocity to decay via damping.
        let next = self.clamp_to_boundary(current + self.velocity * dt, self.child_size);
        self.position.set(next);
        trace!(x = next.x, y = next.y, speed = self.velocity.length(), "tick");

        let settled = self.velocity.length() < self.config.spring.min_velocity
            && match self.target {
                Some(target) => next.distance_to(target) < SETTLE_DISTANCE,
                None => true,
            };

        if settled {
            if let Some(target) = self.target.take() {
                // Land exactly on the (in-bounds) target
                let landing = self.clamp_to_boundary(target, self.child_size);
                if landing != next {
                    self.position.set(landing);
                }
            }
            self.start_offset = self.position.get();
            self.velocity = Point::ZERO;
            self.state = DragState::Idle;
            self.stop_ticker();
            debug!(position = ?self.position.get(), "animation settled");
            return false;
        }

        true
    }

    /// Advance the simulation using a monotonic clock
    ///
    /// Convenience for hosts whose frame callback carries no timestamp; the
    /// first tick after a throw uses a nominal 60 fps step.
    pub fn tick_now(&mut self) -> bool {
        let now = Instant::now();
        let dt = match self.last_tick {
            Some(last) => (now - last).as_secs_f32(),
            None => 1.0 / 60.0,
        };
        self.last_tick = Some(now);
        self.tick(dt)
    }

    fn cancel_animation(&mut self) {
        if self.state == DragState::Animating {
            debug!("animation cancelled by drag");
        }
        self.target = None;
        self.velocity = Point::ZERO;
        self.state = DragState::Idle;
        self.stop_ticker();
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = &self.ticker {
            ticker.stop();
        }
        self.last_tick = None;
    }

    // =========================================================================
    // Boundary Clamping
    // =========================================================================

    /// Clamp a candidate offset so the overlay rectangle stays in bounds
    ///
    /// Right/bottom correction is applied before left/top, so a child larger
    /// than the boundary pins to the boundary's top-left corner. Before
    /// `init` the offset passes through unchanged.
    pub fn clamp_to_boundary(&self, offset: Point, size: Size) -> Point {
        let Some(bounds) = self.boundary else {
            return offset;
        };

        let mut x = offset.x;
        let mut y = offset.y;

        if x + size.width > bounds.max_x() {
            x = bounds.max_x() - size.width;
        }
        if x < bounds.min_x() {
            x = bounds.min_x();
        }
        if y + size.height > bounds.max_y() {
            y = bounds.max_y() - size.height;
        }
        if y < bounds.min_y() {
            y = bounds.min_y();
        }

        Point::new(x, y)
    }

    // =========================================================================
    // Configuration & Accessors
    // =========================================================================

    /// Enable or disable snap-on-release
    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.config.snap_enabled = enabled;
    }

    /// Replace the corner snap positions with a custom list
    ///
    /// A custom list survives size changes; it is never recomputed.
    pub fn set_custom_snap_positions(&mut self, positions: Vec<Point>) {
        self.custom_snap = true;
        self.snap_positions = SmallVec::from_vec(positions);
    }

    /// Current snap position candidates
    pub fn snap_positions(&self) -> &[Point] {
        &self.snap_positions
    }

    /// Current overlay position (top-left corner)
    pub fn position(&self) -> Point {
        self.position.get()
    }

    /// Shared handle to the position stream
    ///
    /// New watchers immediately receive the current position, then every
    /// emitted update in order.
    pub fn position_stream(&self) -> WatchableValue<Point> {
        self.position.clone()
    }

    /// Watch position updates directly
    pub fn watch_position<F>(&self, watcher: F) -> WatchGuard
    where
        F: FnMut(&Point) + Send + 'static,
    {
        self.position.watch(watcher)
    }

    /// Current velocity (units/second)
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Boundary rectangle, if `init` has run
    pub fn boundary(&self) -> Option<Rect> {
        self.boundary
    }

    /// Which driver currently owns the position
    pub fn drag_state(&self) -> DragState {
        self.state
    }

    /// Whether a programmatic animation is running
    pub fn is_animating(&self) -> bool {
        self.state == DragState::Animating
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Stop and release the ticker
    ///
    /// Safe to call multiple times; the ticker is released exactly once.
    /// After disposal the controller still answers queries but no longer
    /// animates.
    pub fn dispose(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
            debug!("ticker released");
        }
        self.target = None;
        self.velocity = Point::ZERO;
        self.state = DragState::Idle;
        self.last_tick = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FlagTicker(Arc<AtomicBool>);

    impl Ticker for FlagTicker {
        fn start(&self) {
            self.0.store(true, Ordering::SeqCst);
        }

        fn stop(&self) {
            self.0.store(false, Ordering::SeqCst);
        }
    }

    fn controller_800x600() -> OffsetController {
        let mut controller = OffsetController::new(OffsetConfig::default());
        controller.init(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(800.0, 600.0));
        controller.set_child_size(Size::new(100.0, 100.0));
        controller
    }

    fn settle(controller: &mut OffsetController) -> usize {
        let mut frames = 0;
        while controller.tick(1.0 / 60.0) {
            frames += 1;
            assert!(frames < 300, "animation failed to settle within 5 seconds");
        }
        frames
    }

    #[test]
    fn test_init_computes_boundary_and_corners() {
        let controller = controller_800x600();
        assert_eq!(
            controller.boundary(),
            Some(Rect::new(0.0, 0.0, 800.0, 600.0))
        );
        assert_eq!(
            controller.snap_positions(),
            &[
                Point::new(0.0, 0.0),
                Point::new(700.0, 0.0),
                Point::new(0.0, 500.0),
                Point::new(700.0, 500.0),
            ]
        );
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut controller = controller_800x600();
        let boundary = controller.boundary();
        let snaps: Vec<Point> = controller.snap_positions().to_vec();

        controller.init(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(800.0, 600.0));
        assert_eq!(controller.boundary(), boundary);
        assert_eq!(controller.snap_positions(), snaps.as_slice());
    }

    #[test]
    fn test_constrained_mode_insets_limits() {
        let config = OffsetConfig::constrained(EdgeInsets::all(10.0));
        let mut controller = OffsetController::new(config);
        controller.init(Rect::new(100.0, 100.0, 400.0, 300.0), Size::new(800.0, 600.0));

        assert_eq!(
            controller.boundary(),
            Some(Rect::new(110.0, 110.0, 380.0, 280.0))
        );
    }

    #[test]
    fn test_free_mode_insets_screen() {
        let config = OffsetConfig::free_floating(EdgeInsets::new(5.0, 10.0, 15.0, 20.0));
        let mut controller = OffsetController::new(config);
        // Limits are ignored in free-floating mode
        controller.init(Rect::new(100.0, 100.0, 10.0, 10.0), Size::new(800.0, 600.0));

        assert_eq!(
            controller.boundary(),
            Some(Rect::new(5.0, 10.0, 780.0, 570.0))
        );
    }

    #[test]
    fn test_drag_follows_pointer() {
        let mut controller = controller_800x600();

        controller.drag_start(Point::new(200.0, 200.0));
        // Delta (40, -10) from a zero start clamps y to the boundary top
        controller.drag_update_tracked(Point::new(240.0, 190.0), Size::new(100.0, 100.0));
        assert_eq!(controller.position(), Point::new(40.0, 0.0));

        controller.drag_update_tracked(Point::new(300.0, 260.0), Size::new(100.0, 100.0));
        assert_eq!(controller.position(), Point::new(100.0, 60.0));
        controller.drag_end();
        assert_eq!(controller.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_drag_determinism_without_clamping() {
        let mut controller = controller_800x600();

        // Park the overlay at (50, 50) first
        controller.drag_start(Point::ZERO);
        controller.apply_drag_delta(Point::new(50.0, 50.0), Size::new(100.0, 100.0));
        controller.drag_end();

        controller.drag_start(Point::new(50.0, 50.0));
        controller.drag_update_tracked(Point::new(150.0, 250.0), Size::new(100.0, 100.0));

        // start + delta, no clamp triggered
        assert_eq!(controller.position(), Point::new(150.0, 250.0));
    }

    #[test]
    fn test_drag_clamps_to_boundary() {
        let mut controller = controller_800x600();

        controller.drag_start(Point::ZERO);
        controller.apply_drag_delta(Point::new(5000.0, -5000.0), Size::new(100.0, 100.0));
        assert_eq!(controller.position(), Point::new(700.0, 0.0));
    }

    #[test]
    fn test_oversized_child_pins_to_top_left() {
        let config = OffsetConfig::constrained(EdgeInsets::ZERO);
        let mut controller = OffsetController::new(config);
        controller.init(Rect::new(10.0, 20.0, 100.0, 100.0), Size::new(800.0, 600.0));

        let clamped = controller.clamp_to_boundary(Point::new(50.0, 50.0), Size::new(200.0, 200.0));
        assert_eq!(clamped, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_pre_init_calls_pass_through() {
        let mut controller = OffsetController::new(OffsetConfig::default());

        controller.drag_start(Point::ZERO);
        controller.apply_drag_delta(Point::new(-500.0, 9999.0), Size::new(100.0, 100.0));
        // No boundary yet: the offset is not clamped
        assert_eq!(controller.position(), Point::new(-500.0, 9999.0));
        assert!(controller.snap_positions().is_empty());
    }

    #[test]
    fn test_scale_centering_offset() {
        let offset = scale_centering_offset(Size::new(100.0, 100.0), Size::new(120.0, 140.0));
        assert_eq!(offset, Point::new(10.0, 20.0));

        // Shrinking produces a negative offset
        let offset = scale_centering_offset(Size::new(100.0, 100.0), Size::new(60.0, 100.0));
        assert_eq!(offset, Point::new(-20.0, 0.0));
    }

    #[test]
    fn test_drag_update_corrects_for_scale_growth() {
        let mut controller = controller_800x600();

        controller.drag_start(Point::new(300.0, 300.0));
        // Child grew from scale 1.0 to 1.2 (100x100 -> 120x120) mid-drag
        let metrics = ChildMetrics {
            size: Size::new(120.0, 120.0),
            scale: 1.2,
        };
        controller.drag_update(Point::new(300.0, 300.0), metrics, 1.0);

        // Pointer did not move; the centering offset (10, 10) is subtracted
        // and the result clamps back to the boundary origin
        assert_eq!(controller.position(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_velocity_blend_and_cap() {
        let mut controller = controller_800x600();
        let max = controller.config.spring.max_velocity;

        // 50 units in 50 ms = 1000 u/s instantaneous; blended at 0.3
        controller.track_velocity(Point::new(50.0, 0.0), 0.05);
        assert!((controller.velocity().x - 300.0).abs() < 1e-3);

        // An absurd sample saturates at the cap
        controller.track_velocity(Point::new(10000.0, 0.0), 0.01);
        assert!(controller.velocity().length() <= max + 1e-3);
    }

    #[test]
    fn test_implausible_time_deltas_are_ignored() {
        let mut controller = controller_800x600();

        controller.track_velocity(Point::new(50.0, 0.0), 0.0);
        assert_eq!(controller.velocity(), Point::ZERO);

        controller.track_velocity(Point::new(50.0, 0.0), 0.5);
        assert_eq!(controller.velocity(), Point::ZERO);

        controller.track_velocity(Point::new(50.0, 0.0), -0.016);
        assert_eq!(controller.velocity(), Point::ZERO);
    }

    #[test]
    fn test_throw_converges_to_clamped_target() {
        let running = Arc::new(AtomicBool::new(false));
        let mut controller = OffsetController::with_ticker(
            OffsetConfig::default(),
            Box::new(FlagTicker(Arc::clone(&running))),
        );
        controller.init(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(800.0, 600.0));
        controller.set_child_size(Size::new(100.0, 100.0));

        controller.throw_to(Point::new(1000.0, 1000.0), None);
        assert!(running.load(Ordering::SeqCst));
        assert!(controller.is_animating());

        settle(&mut controller);

        // Target was clamped to (700, 500) before the throw began
        assert_eq!(controller.position(), Point::new(700.0, 500.0));
        assert_eq!(controller.velocity(), Point::ZERO);
        assert_eq!(controller.drag_state(), DragState::Idle);
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_throw_never_escapes_boundary() {
        let mut controller = controller_800x600();
        let boundary = controller.boundary().unwrap();
        let positions = Arc::new(std::sync::Mutex::new(Vec::new()));

        let sink = Arc::clone(&positions);
        let _guard = controller.watch_position(move |p| sink.lock().unwrap().push(*p));

        controller.throw_to(Point::new(1000.0, 1000.0), Some(2500.0));
        settle(&mut controller);

        for p in positions.lock().unwrap().iter() {
            let rect = Rect::from_origin_size(*p, Size::new(100.0, 100.0));
            assert!(boundary.contains_rect(rect), "escaped at {p:?}");
        }
    }

    #[test]
    fn test_throw_to_current_position_settles_without_nan() {
        let mut controller = controller_800x600();

        controller.throw_to(Point::ZERO, None);
        settle(&mut controller);

        let p = controller.position();
        assert!(p.x.is_finite() && p.y.is_finite());
        assert_eq!(p, Point::ZERO);
    }

    #[test]
    fn test_velocity_capped_during_animation() {
        let mut controller = controller_800x600();
        let max = controller.config.spring.max_velocity;

        controller.throw_to(Point::new(700.0, 500.0), Some(9999.0));
        assert!(controller.velocity().length() <= max + 1e-3);

        while controller.tick(1.0 / 60.0) {
            assert!(controller.velocity().length() <= max + 1e-3);
        }
    }

    #[test]
    fn test_snap_selects_nearest_corner() {
        let mut controller = controller_800x600();

        // Park the overlay at (50, 50), then drag to (150, 250)
        controller.drag_start(Point::ZERO);
        controller.apply_drag_delta(Point::new(50.0, 50.0), Size::new(100.0, 100.0));
        controller.drag_end();

        controller.drag_start_tracked(Point::new(50.0, 50.0));
        controller.drag_update_tracked(Point::new(150.0, 250.0), Size::new(100.0, 100.0));
        assert_eq!(controller.position(), Point::new(150.0, 250.0));

        controller.drag_end_snap();
        assert!(controller.is_animating());

        settle(&mut controller);

        // (0, 0) and (0, 500) are equidistant from (150, 250); the
        // first-encountered corner wins
        assert_eq!(controller.position(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_snap_tie_break_keeps_first_custom_position() {
        let mut controller = controller_800x600();
        controller.set_custom_snap_positions(vec![
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
        ]);

        // (50, 50) is equidistant from both candidates
        controller.drag_start(Point::ZERO);
        controller.apply_drag_delta(Point::new(50.0, 50.0), Size::new(100.0, 100.0));
        controller.drag_end_snap();
        settle(&mut controller);

        assert_eq!(controller.position(), Point::new(100.0, 0.0));
    }

    #[test]
    fn test_empty_snap_list_degrades_to_noop() {
        let running = Arc::new(AtomicBool::new(false));
        let mut controller = OffsetController::with_ticker(
            OffsetConfig::default(),
            Box::new(FlagTicker(Arc::clone(&running))),
        );
        controller.init(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(800.0, 600.0));
        controller.set_child_size(Size::new(100.0, 100.0));
        controller.set_custom_snap_positions(Vec::new());

        controller.drag_start(Point::ZERO);
        controller.apply_drag_delta(Point::new(50.0, 50.0), Size::new(100.0, 100.0));
        controller.drag_end_snap();

        assert_eq!(controller.drag_state(), DragState::Idle);
        assert!(!running.load(Ordering::SeqCst));
        assert_eq!(controller.position(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_snap_disabled_leaves_position() {
        let mut controller = controller_800x600();
        controller.set_snap_enabled(false);

        controller.drag_start(Point::ZERO);
        controller.apply_drag_delta(Point::new(150.0, 250.0), Size::new(100.0, 100.0));
        controller.drag_end_snap();

        assert_eq!(controller.drag_state(), DragState::Idle);
        assert_eq!(controller.position(), Point::new(150.0, 250.0));
    }

    #[test]
    fn test_drag_start_cancels_running_animation() {
        let running = Arc::new(AtomicBool::new(false));
        let mut controller = OffsetController::with_ticker(
            OffsetConfig::default(),
            Box::new(FlagTicker(Arc::clone(&running))),
        );
        controller.init(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(800.0, 600.0));
        controller.set_child_size(Size::new(100.0, 100.0));

        controller.throw_to(Point::new(700.0, 500.0), None);
        controller.tick(1.0 / 60.0);
        assert!(controller.is_animating());

        controller.drag_start_tracked(Point::new(10.0, 10.0));
        assert_eq!(controller.drag_state(), DragState::Dragging);
        assert_eq!(controller.velocity(), Point::ZERO);
        assert!(!running.load(Ordering::SeqCst));

        // A stray tick after cancellation does not integrate
        let position = controller.position();
        assert!(!controller.tick(1.0 / 60.0));
        assert_eq!(controller.position(), position);
    }

    #[test]
    fn test_snap_positions_recompute_on_size_change() {
        let mut controller = controller_800x600();

        controller.set_child_size(Size::new(200.0, 100.0));
        assert_eq!(
            controller.snap_positions(),
            &[
                Point::new(0.0, 0.0),
                Point::new(600.0, 0.0),
                Point::new(0.0, 500.0),
                Point::new(600.0, 500.0),
            ]
        );
    }

    #[test]
    fn test_custom_snap_positions_survive_size_change() {
        let mut controller = controller_800x600();
        controller.set_custom_snap_positions(vec![Point::new(400.0, 300.0)]);

        controller.set_child_size(Size::new(50.0, 50.0));
        assert_eq!(controller.snap_positions(), &[Point::new(400.0, 300.0)]);
    }

    #[test]
    fn test_dispose_is_idempotent_and_stops_animation() {
        let running = Arc::new(AtomicBool::new(false));
        let mut controller = OffsetController::with_ticker(
            OffsetConfig::default(),
            Box::new(FlagTicker(Arc::clone(&running))),
        );
        controller.init(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(800.0, 600.0));
        controller.set_child_size(Size::new(100.0, 100.0));

        controller.throw_to(Point::new(700.0, 500.0), None);
        assert!(running.load(Ordering::SeqCst));

        controller.dispose();
        assert!(!running.load(Ordering::SeqCst));
        assert!(!controller.is_animating());

        // Second disposal is a no-op
        controller.dispose();
        assert!(!controller.tick(1.0 / 60.0));
    }

    #[test]
    fn test_max_frame_dt_caps_integration_step() {
        let mut controller = controller_800x600();

        controller.throw_to(Point::new(700.0, 500.0), None);
        // A two-second hitch must not teleport the overlay past its target
        controller.tick(2.0);

        let p = controller.position();
        assert!(p.x <= 700.0 && p.y <= 500.0);
        assert!(controller.velocity().length() <= controller.config.spring.max_velocity);
    }
}
