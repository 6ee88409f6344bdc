//! Mobile agents: integration, wall reflection and sensor-driven steering.

use crate::arena::{ArenaView, ARENA_SIZE};
use crate::render::{heading_vector, radians_vector, Color, Surface};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Sensing strategy of a mobile agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sensor {
    /// No pre-steering; relies on collision reversal
    Bump,

    /// Short-range whiskers, sharp turn
    Whisker,

    /// Longer-range beam, partial turn
    Beam,

    /// Externally driven, never moves on its own
    Manual,
}

/// Steering parameters for sensors that react before integrating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    /// Heading increment per triggering obstacle (degrees)
    pub turn_degrees: f64,

    /// Clearance added to the sum of radii
    pub trigger_margin: f64,
}

impl Sensor {
    /// Returns the steering parameters, if this sensor steers at all.
    pub fn steering(&self) -> Option<Steering> {
        match self {
            Sensor::Whisker => Some(Steering {
                turn_degrees: 90.0,
                trigger_margin: 10.0,
            }),
            Sensor::Beam => Some(Steering {
                turn_degrees: 67.0,
                trigger_margin: 20.0,
            }),
            Sensor::Bump | Sensor::Manual => None,
        }
    }

    /// Returns true if the agent integrates its own motion each tick.
    pub fn is_autonomous(&self) -> bool {
        !matches!(self, Sensor::Manual)
    }

    fn body_color(&self) -> Color {
        match self {
            Sensor::Bump => Color::Blue,
            Sensor::Whisker => Color::Green,
            Sensor::Beam => Color::Orange,
            Sensor::Manual => Color::Purple,
        }
    }
}

/// Directional command for a manually driven agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all four directions.
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Screen-space unit step (y grows downwards).
    fn unit(&self) -> Vector2<f64> {
        match self {
            Direction::Up => Vector2::new(0.0, -1.0),
            Direction::Down => Vector2::new(0.0, 1.0),
            Direction::Left => Vector2::new(-1.0, 0.0),
            Direction::Right => Vector2::new(1.0, 0.0),
        }
    }
}

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Self-propelled state shared by every robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileAgent {
    /// Heading in degrees, `[0, 360)` between ticks
    pub heading: f64,

    /// Distance covered per tick
    pub speed: f64,

    /// Sensing strategy
    pub sensor: Sensor,
}

impl MobileAgent {
    /// Creates a new agent.
    pub fn new(sensor: Sensor, speed: f64, heading: f64) -> Self {
        Self {
            heading,
            speed,
            sensor,
        }
    }

    /// Runs one tick: steer (if the sensor steers), then integrate.
    ///
    /// Manual agents do nothing here.
    pub(crate) fn step(&mut self, position: &mut Vector2<f64>, radius: f64, view: ArenaView<'_>) {
        if !self.sensor.is_autonomous() {
            return;
        }
        self.sense_and_steer(*position, radius, view);
        self.integrate(position, radius);
    }

    /// Turns away from every plain obstacle within trigger range.
    ///
    /// Turns accumulate when several obstacles trigger in the same tick.
    /// Returns how many obstacles triggered.
    pub fn sense_and_steer(
        &mut self,
        position: Vector2<f64>,
        radius: f64,
        view: ArenaView<'_>,
    ) -> usize {
        let Some(steering) = self.sensor.steering() else {
            return 0;
        };

        let mut triggered = 0;
        for obstacle in view.iter().filter(|e| e.is_obstacle()) {
            let distance = (obstacle.position - position).norm();
            if distance < radius + obstacle.radius() + steering.trigger_margin {
                self.heading = normalize_degrees(self.heading + steering.turn_degrees);
                triggered += 1;
            }
        }
        triggered
    }

    /// Moves `speed` along the heading, reflects off the walls and
    /// normalizes the heading.
    pub fn integrate(&mut self, position: &mut Vector2<f64>, radius: f64) {
        let radians = self.heading.to_radians();
        position.x += self.speed * radians.cos();
        position.y += self.speed * radians.sin();

        if position.x - radius < 0.0 {
            position.x = radius;
            self.heading = 180.0 - self.heading;
        } else if position.x + radius > ARENA_SIZE {
            position.x = ARENA_SIZE - radius;
            self.heading = 180.0 - self.heading;
        }

        if position.y - radius < 0.0 {
            position.y = radius;
            self.heading = -self.heading;
        } else if position.y + radius > ARENA_SIZE {
            position.y = ARENA_SIZE - radius;
            self.heading = -self.heading;
        }

        self.heading = normalize_degrees(self.heading);
    }

    /// Full reversal, regardless of impact angle.
    pub fn reverse(&mut self) {
        self.heading = normalize_degrees(self.heading + 180.0);
    }

    /// Shifts `position` one `speed` step in `direction`. No clamping.
    pub fn apply_move(&self, position: &mut Vector2<f64>, direction: Direction) {
        *position += direction.unit() * self.speed;
    }

    /// Draws body, wheels and sensor gear.
    pub(crate) fn render(&self, position: Vector2<f64>, radius: f64, surface: &mut dyn Surface) {
        surface.fill_circle(position, radius, self.sensor.body_color());

        match self.sensor {
            Sensor::Manual => {
                // Four wheels at the corners of the bounding square
                let inset = radius * 0.75;
                for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
                    let center = position + Vector2::new(sx * inset, sy * inset);
                    surface.fill_circle(center, radius / 4.0, Color::Black);
                }
            }
            _ => {
                let wheel_radius = radius / 4.0;
                let wheel_offset = radius * 1.1;
                let heading = self.heading.to_radians();
                for (sign, angle) in [
                    (-1.0, heading + PI / 4.0),
                    (-1.0, heading - PI / 4.0),
                    (1.0, heading + PI / 4.0),
                    (1.0, heading - PI / 4.0),
                ] {
                    let center = position + radians_vector(angle) * (sign * wheel_offset);
                    surface.fill_circle(center, wheel_radius, Color::Black);
                }
            }
        }

        match self.sensor {
            Sensor::Whisker => {
                let length = radius * 2.0;
                let heading = self.heading.to_radians();
                for angle in [heading - PI / 8.0, heading + PI / 8.0] {
                    surface.line(position, position + radians_vector(angle) * length, Color::Red, 2.0);
                }
            }
            Sensor::Beam => {
                let tip = position + heading_vector(self.heading) * (radius + 20.0);
                surface.line(position, tip, Color::Red, 2.0);
            }
            Sensor::Bump | Sensor::Manual => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use approx::assert_relative_eq;

    fn empty_view() -> ArenaView<'static> {
        ArenaView::new(&[], &[])
    }

    #[test]
    fn test_straight_line_projection() {
        let mut agent = MobileAgent::new(Sensor::Bump, 3.0, 30.0);
        let mut position = Vector2::new(200.0, 200.0);

        agent.integrate(&mut position, 15.0);

        assert_relative_eq!(position.x, 200.0 + 3.0 * 30f64.to_radians().cos());
        assert_relative_eq!(position.y, 200.0 + 3.0 * 30f64.to_radians().sin());
        assert_eq!(agent.heading, 30.0);
    }

    #[test]
    fn test_left_wall_reflection() {
        let mut agent = MobileAgent::new(Sensor::Bump, 5.0, 170.0);
        let mut position = Vector2::new(16.0, 250.0);

        agent.integrate(&mut position, 15.0);

        assert_eq!(position.x, 15.0);
        assert_relative_eq!(agent.heading, 10.0);
    }

    #[test]
    fn test_right_wall_reflection() {
        let mut agent = MobileAgent::new(Sensor::Bump, 4.0, 10.0);
        let mut position = Vector2::new(483.0, 250.0);

        agent.integrate(&mut position, 15.0);

        assert_eq!(position.x, 485.0);
        assert_relative_eq!(position.y, 250.0 + 4.0 * 10f64.to_radians().sin());
        assert_relative_eq!(agent.heading, 170.0);
    }

    #[test]
    fn test_top_wall_reflection() {
        let mut agent = MobileAgent::new(Sensor::Bump, 4.0, 270.0);
        let mut position = Vector2::new(250.0, 17.0);

        agent.integrate(&mut position, 15.0);

        assert_eq!(position.y, 15.0);
        assert_relative_eq!(position.x, 250.0, epsilon = 1e-9);
        assert_relative_eq!(agent.heading, 90.0);
    }

    #[test]
    fn test_corner_reflects_both_axes() {
        let mut agent = MobileAgent::new(Sensor::Bump, 10.0, 225.0);
        let mut position = Vector2::new(12.0, 12.0);

        agent.integrate(&mut position, 10.0);

        assert_eq!(position, Vector2::new(10.0, 10.0));
        // 180 - 225 = -45, then negated = 45
        assert_relative_eq!(agent.heading, 45.0);
    }

    #[test]
    fn test_bottom_wall_reflection() {
        let mut agent = MobileAgent::new(Sensor::Bump, 4.0, 90.0);
        let mut position = Vector2::new(250.0, 483.0);

        agent.integrate(&mut position, 15.0);

        assert_eq!(position.y, 485.0);
        assert_relative_eq!(agent.heading, 270.0);
    }

    #[test]
    fn test_reverse_wraps() {
        let mut agent = MobileAgent::new(Sensor::Bump, 3.0, 270.0);
        agent.reverse();
        assert_eq!(agent.heading, 90.0);
    }

    #[test]
    fn test_whisker_steers_before_integrating() {
        let obstacle = Entity::obstacle(Vector2::new(115.0, 100.0), 20.0);
        let others = [obstacle];
        let view = ArenaView::new(&others, &[]);

        let mut agent = MobileAgent::new(Sensor::Whisker, 4.0, 0.0);
        let triggered = agent.sense_and_steer(Vector2::new(100.0, 100.0), 15.0, view);

        assert_eq!(triggered, 1);
        assert_eq!(agent.heading, 90.0);
    }

    #[test]
    fn test_beam_turns_cumulatively() {
        let others = [
            Entity::obstacle(Vector2::new(140.0, 100.0), 20.0),
            Entity::obstacle(Vector2::new(100.0, 140.0), 20.0),
        ];
        let view = ArenaView::new(&others, &[]);

        let mut agent = MobileAgent::new(Sensor::Beam, 5.0, 300.0);
        let triggered = agent.sense_and_steer(Vector2::new(100.0, 100.0), 10.0, view);

        assert_eq!(triggered, 2);
        assert_eq!(agent.heading, 74.0);
    }

    #[test]
    fn test_beam_ignores_specials() {
        let others = [
            Entity::black_hole(Vector2::new(110.0, 100.0), 20.0),
            Entity::teleport_pad(Vector2::new(90.0, 100.0), 15.0),
        ];
        let view = ArenaView::new(&others, &[]);

        let mut agent = MobileAgent::new(Sensor::Beam, 5.0, 0.0);
        assert_eq!(agent.sense_and_steer(Vector2::new(100.0, 100.0), 10.0, view), 0);
        assert_eq!(agent.heading, 0.0);
    }

    #[test]
    fn test_manual_step_is_noop() {
        let mut agent = MobileAgent::new(Sensor::Manual, 2.0, 0.0);
        let mut position = Vector2::new(250.0, 250.0);

        agent.step(&mut position, 15.0, empty_view());

        assert_eq!(position, Vector2::new(250.0, 250.0));
    }

    #[test]
    fn test_manual_moves_are_unclamped() {
        let agent = MobileAgent::new(Sensor::Manual, 2.0, 0.0);
        let mut position = Vector2::new(1.0, 499.0);

        agent.apply_move(&mut position, Direction::Left);
        agent.apply_move(&mut position, Direction::Down);

        assert_eq!(position, Vector2::new(-1.0, 501.0));
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }
}
