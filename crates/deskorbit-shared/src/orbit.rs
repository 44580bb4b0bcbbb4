//! Ring animation: icons orbit an ellipse around a planet on the wallpaper
//!
//! Every frame the icon count is re-queried, the global phase advances, and
//! icon `i` of `n` is placed at angle `2π·i/n + phase` on the ellipse. Icons
//! on the back half of the orbit (`sin(angle) < 0`) that fall inside the
//! planet's disk are parked off-screen, so they seem to pass behind it.
//!
//! With mouse speed control the angular speed depends on how far the cursor
//! is from the planet: slowest over the planet, easing up to full speed
//! across a band around it. The phase integrates speed over real elapsed
//! time, so the rotation rate doesn't depend on the achieved frame rate.

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use crate::error::{OrbitError, Result};
use crate::icons::IconRegistry;
use crate::messages::Point;
use crate::shell::Shell;

/// Target frames per second
pub const FRAME_RATE: f64 = 60.0;

/// Where hidden icons are parked (client coordinates)
pub const HIDE_POSITION: Point = Point::new(-5000, -5000);

/// Shape and placement of the ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitGeometry {
    /// Ring and planet center
    pub center: Point,
    /// Horizontal semiaxis (px)
    pub horizontal: i32,
    /// Vertical semiaxis (px)
    pub vertical: i32,
    /// Radius of the planet disk (px)
    pub planet_radius: i32,
    /// Where occluded icons go
    pub hide_at: Point,
}

impl Default for OrbitGeometry {
    fn default() -> Self {
        Self {
            center: Point::new(920, 500),
            horizontal: 420,
            vertical: 100,
            planet_radius: 300,
            hide_at: HIDE_POSITION,
        }
    }
}

impl OrbitGeometry {
    /// Check that every coordinate this orbit can produce survives 16-bit packing
    /// and that the planet radius isn't negative
    pub fn check_range(&self) -> Result<()> {
        if self.planet_radius < 0 {
            return Err(OrbitError::OutOfRange {
                what: "Planet radius",
                value: i64::from(self.planet_radius),
            });
        }

        let cx = i64::from(self.center.x);
        let cy = i64::from(self.center.y);
        let a = i64::from(self.horizontal).abs();
        let b = i64::from(self.vertical).abs();

        let extents = [
            ("Orbit left edge", cx - a),
            ("Orbit right edge", cx + a),
            ("Orbit top edge", cy - b),
            ("Orbit bottom edge", cy + b),
            ("Hide x", i64::from(self.hide_at.x)),
            ("Hide y", i64::from(self.hide_at.y)),
        ];
        let range = i64::from(i16::MIN)..=i64::from(i16::MAX);
        match extents.into_iter().find(|(_, value)| !range.contains(value)) {
            Some((what, value)) => Err(OrbitError::OutOfRange { what, value }),
            None => Ok(()),
        }
    }

    /// Point on the ellipse at `angle`
    pub fn point_at(&self, angle: f64) -> (f64, f64) {
        (
            f64::from(self.center.x) + f64::from(self.horizontal) * angle.cos(),
            f64::from(self.center.y) + f64::from(self.vertical) * angle.sin(),
        )
    }

    /// Whether a point lies within the planet disk (boundary included)
    pub fn is_occluded(&self, x: f64, y: f64) -> bool {
        let dx = x - f64::from(self.center.x);
        let dy = y - f64::from(self.center.y);
        let r = f64::from(self.planet_radius);
        dx * dx + dy * dy <= r * r
    }

    /// Distance from the planet center
    pub fn distance_to(&self, point: Point) -> f64 {
        f64::from(point.x - self.center.x).hypot(f64::from(point.y - self.center.y))
    }

    /// Where each of `count` icons goes at `phase`, in index order
    pub fn layout(&self, count: usize, phase: f64) -> impl Iterator<Item = Placement> + '_ {
        (0..count).map(move |index| {
            let angle = base_angle(index, count) + phase;
            let (x, y) = self.point_at(angle);
            let orbital = Point::new(x.round() as i32, y.round() as i32);
            let hidden = is_behind(angle) && self.is_occluded(x, y);
            Placement {
                index,
                angle,
                orbital,
                hidden,
                target: if hidden { self.hide_at } else { orbital },
            }
        })
    }
}

/// One icon's placement for a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Icon index
    pub index: usize,
    /// Total angle (base + phase)
    pub angle: f64,
    /// Rounded point on the ellipse
    pub orbital: Point,
    /// Behind the planet and inside its disk
    pub hidden: bool,
    /// Where the icon is actually moved
    pub target: Point,
}

/// Even spacing of `count` icons around the ring
pub fn base_angle(index: usize, count: usize) -> f64 {
    TAU * (index as f64 / count as f64)
}

/// Back half of the orbit
pub fn is_behind(angle: f64) -> bool {
    angle.sin() < 0.0
}

/// Hermite ease between 0 and 1
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Angular speeds in rad/s
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    /// Constant speed without mouse control
    pub base: f64,
    /// Speed once the cursor is a full band away from the planet
    pub far: f64,
    /// Speed with the cursor right at the planet's edge
    pub near: f64,
    /// Speed with the cursor over the planet
    pub inside: f64,
    /// Width of the easing band outside the planet (px)
    pub slow_band: f64,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            base: 0.3,
            far: 0.6,
            near: 0.12,
            inside: 0.1,
            slow_band: 220.0,
        }
    }
}

impl SpeedProfile {
    /// Speed for a cursor `distance` px from the center of a planet of `planet_radius`
    pub fn at_distance(&self, distance: f64, planet_radius: f64) -> f64 {
        if distance <= planet_radius {
            return self.inside;
        }
        let t = smoothstep((distance - planet_radius) / self.slow_band);
        self.near + (self.far - self.near) * t
    }
}

/// How the phase advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedMode {
    /// Speed follows the cursor's distance from the planet
    #[default]
    Mouse,
    /// Constant speed, phase derived from elapsed time
    Steady,
}

/// Per-run timing and phase
#[derive(Debug, Clone, Copy)]
pub struct AnimationState {
    start: Instant,
    last: Instant,
    phase: f64,
}

impl AnimationState {
    /// Fresh state with `start` as the time origin
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            last: start,
            phase: 0.0,
        }
    }

    /// Current phase (radians)
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Time origin of the run
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Integrate `speed` over the time since the previous frame
    pub fn advance(&mut self, now: Instant, speed: f64) -> f64 {
        let dt = now.saturating_duration_since(self.last).as_secs_f64();
        self.last = now;
        self.phase += speed * dt;
        self.phase
    }

    /// Phase as `speed` times the total elapsed time
    pub fn from_elapsed(&mut self, now: Instant, speed: f64) -> f64 {
        self.last = now;
        self.phase = speed * now.saturating_duration_since(self.start).as_secs_f64();
        self.phase
    }
}

/// Outcome of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// No icons left; the loop ends
    Stopped,
    /// This many icons were placed
    Placed(usize),
}

/// The animation loop
pub struct Orbit<'r, S: Shell> {
    icons: &'r IconRegistry<S>,
    geometry: OrbitGeometry,
    speeds: SpeedProfile,
    mode: SpeedMode,
    frame_interval: Duration,
    state: AnimationState,
}

impl<'r, S: Shell> Orbit<'r, S> {
    /// Set up an orbit; fails if the geometry can't be packed into 16 bits
    pub fn new(
        icons: &'r IconRegistry<S>,
        geometry: OrbitGeometry,
        speeds: SpeedProfile,
        mode: SpeedMode,
    ) -> Result<Self> {
        geometry.check_range()?;
        Ok(Self {
            icons,
            geometry,
            speeds,
            mode,
            frame_interval: Duration::from_secs_f64(1.0 / FRAME_RATE),
            state: AnimationState::new(Instant::now()),
        })
    }

    /// Current timing and phase
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Reset the phase and time origin
    pub fn restart(&mut self, now: Instant) {
        self.state = AnimationState::new(now);
    }

    /// Compute and apply one frame at `now`
    pub fn step(&mut self, now: Instant) -> Result<Frame> {
        let count = self.icons.count()?;
        if count == 0 {
            return Ok(Frame::Stopped);
        }

        let phase = match self.mode {
            SpeedMode::Mouse => {
                let cursor = self.icons.cursor()?;
                let distance = self.geometry.distance_to(cursor);
                let speed = self
                    .speeds
                    .at_distance(distance, f64::from(self.geometry.planet_radius));
                self.state.advance(now, speed)
            }
            SpeedMode::Steady => self.state.from_elapsed(now, self.speeds.base),
        };

        for placement in self.geometry.layout(count, phase) {
            self.icons
                .set_position(placement.index, placement.target.x, placement.target.y)?;
        }
        Ok(Frame::Placed(count))
    }

    /// Animate until the desktop has no icons left
    ///
    /// The phase starts from zero when the loop starts.
    ///
    /// Sleeps out the rest of each frame's budget, so the rate never exceeds
    /// [`FRAME_RATE`]; a slow frame is not made up for.
    pub fn run(&mut self) -> Result<()> {
        self.restart(Instant::now());
        log::info!(
            "Orbiting around ({}, {}) at {} fps",
            self.geometry.center.x,
            self.geometry.center.y,
            FRAME_RATE
        );
        loop {
            let frame_start = Instant::now();
            if self.step(frame_start)? == Frame::Stopped {
                log::info!("No icons");
                return Ok(());
            }
            std::thread::sleep(self.frame_interval.saturating_sub(frame_start.elapsed()));
        }
    }
}
