//! Spring-damper model for throw and snap animations
//!
//! A near-critically damped harmonic oscillator with an extra exponential
//! air-resistance term:
//!
//! ```text
//! a = (target - x)·ω² - v·(2ζω)
//! v ← (v + a·dt)·(1 - friction)^dt, |v| ≤ max_velocity
//! ```
//!
//! Integration is semi-implicit Euler; position advance and boundary
//! clamping are the controller's job. The defaults are tuned so a throw or
//! corner snap settles within a few hundred milliseconds without visible
//! oscillation.

use floatkit_core::Point;

/// Spring-damper tuning parameters
#[derive(Debug, Clone, Copy)]
pub struct SpringConfig {
    /// Natural frequency ω (rad/s). Higher = stiffer pull toward the target.
    pub omega: f32,
    /// Damping ratio ζ. 1.0 = critically damped, below 1.0 overshoots.
    pub zeta: f32,
    /// Per-second air-resistance fraction applied as `(1 - friction)^dt`
    pub friction: f32,
    /// Speed below which the animation is considered settled (units/s)
    pub min_velocity: f32,
    /// Hard cap on speed at all times (units/s)
    pub max_velocity: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            omega: 12.0,
            zeta: 0.9,
            friction: 0.012,
            min_velocity: 0.8,
            max_velocity: 2500.0,
        }
    }
}

impl SpringConfig {
    /// Stiffer spring that settles faster, for small overlays
    pub fn snappy() -> Self {
        Self {
            omega: 18.0,
            zeta: 1.0,
            ..Default::default()
        }
    }

    /// Softer spring with a slower, floatier settle
    pub fn gentle() -> Self {
        Self {
            omega: 8.0,
            zeta: 0.85,
            ..Default::default()
        }
    }

    /// Advance the velocity by one integration step
    ///
    /// `displacement` is `target - position`. Returns the new velocity with
    /// damping, air resistance, and the speed cap applied.
    pub fn integrate(&self, displacement: Point, velocity: Point, dt: f32) -> Point {
        let spring_force = displacement * (self.omega * self.omega);
        let damping_force = velocity * (2.0 * self.zeta * self.omega);
        let acceleration = spring_force - damping_force;

        let decay = (1.0 - self.friction).powf(dt);
        ((velocity + acceleration * dt) * decay).clamped_length(self.max_velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_pulls_toward_target() {
        let config = SpringConfig::default();
        // Displacement to the right, at rest: velocity must point right
        let v = config.integrate(Point::new(100.0, 0.0), Point::ZERO, 1.0 / 60.0);
        assert!(v.x > 0.0);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_velocity_never_exceeds_cap() {
        let config = SpringConfig::default();
        let mut velocity = Point::ZERO;
        // Giant displacement hammered for many frames
        for _ in 0..600 {
            velocity = config.integrate(Point::new(1.0e6, 1.0e6), velocity, 1.0 / 60.0);
            assert!(velocity.length() <= config.max_velocity + 1e-3);
        }
    }

    #[test]
    fn test_spring_settles_without_sustained_oscillation() {
        let config = SpringConfig::default();
        let target = Point::new(300.0, 0.0);
        let mut position = Point::ZERO;
        let mut velocity = Point::ZERO;

        let mut settled_at = None;
        for frame in 0..300 {
            velocity = config.integrate(target - position, velocity, 1.0 / 60.0);
            position += velocity * (1.0 / 60.0);

            if velocity.length() < config.min_velocity
                && position.distance_to(target) < 1.0
            {
                settled_at = Some(frame);
                break;
            }
        }

        // Well under two seconds of simulated time at 60 fps
        let settled_at = settled_at.expect("spring never settled");
        assert!(settled_at < 120, "settled too slowly: {settled_at} frames");
    }

    #[test]
    fn test_zero_displacement_decays_velocity() {
        let config = SpringConfig::default();
        let mut velocity = Point::new(500.0, 0.0);
        for _ in 0..120 {
            velocity = config.integrate(Point::ZERO, velocity, 1.0 / 60.0);
        }
        assert!(velocity.length() < config.min_velocity);
    }
}
