//! The frame scheduler: measures time, steps physics, runs hooks and presents.

use std::{cell::Cell, rc::Rc, time::Duration};

use crate::{
    input::InputState,
    physics::{BodyConfigError, Physics, PhysicsConfig},
    scene::Scene,
};

/// Where the game loop is in its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("the game has already been started")]
    AlreadyStarted,
    #[error("the game is not running (state: {0:?})")]
    NotRunning(LoopState),
    #[error("scene setup failed")]
    Setup(#[from] BodyConfigError),
}

//
// Time
//

/// A monotonic clock the game loop reads once per frame.
pub trait TimeSource {
    /// Time elapsed since some fixed point in the past.
    fn now(&mut self) -> Duration;
}

/// Wall clock time, also usable in the browser.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: instant::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: instant::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle
/// and give another to the game.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }

    /// Ignored if `secs` is negative or not finite.
    pub fn advance_secs(&self, secs: f64) {
        if let Ok(by) = Duration::try_from_secs_f64(secs) {
            self.advance(by);
        }
    }

    pub fn set(&self, time: Duration) {
        self.0.set(time);
    }
}

impl TimeSource for ManualClock {
    fn now(&mut self) -> Duration {
        self.0.get()
    }
}

//
// Config
//

/// What to do with the measured frame time before passing it on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum DtPolicy {
    /// Use the measured time as is. A long pause makes one very long frame.
    #[default]
    Unclamped,
    /// Never simulate more than `max` seconds in one frame.
    Clamped { max: f64 },
}

impl DtPolicy {
    /// Turn a measured frame time into the time to simulate.
    ///
    /// The result is always finite and non-negative: invalid measurements become 0,
    /// and a `Clamped` policy with a negative or non-finite `max` clamps nothing.
    pub fn apply(&self, raw_dt: f64) -> f64 {
        if !raw_dt.is_finite() || raw_dt < 0.0 {
            log::warn!("invalid frame time {raw_dt}s, simulating 0s instead");
            return 0.0;
        }
        match *self {
            DtPolicy::Clamped { max } if !max.is_finite() || max < 0.0 => {
                log::warn!("ignoring invalid dt clamp {max}s");
                raw_dt
            }
            DtPolicy::Clamped { max } if raw_dt > max => {
                log::warn!("frame took {raw_dt}s, clamping to {max}s");
                max
            }
            DtPolicy::Unclamped | DtPolicy::Clamped { .. } => raw_dt,
        }
    }
}

/// Frame timing settings.
///
/// Physics settings live in [`Physics::config`] of the game's [`Game::physics`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-types", serde(default))]
pub struct GameConfig {
    pub dt_policy: DtPolicy,
    /// Frame rate [`Game::run`] sleeps toward.
    pub target_fps: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            dt_policy: DtPolicy::default(),
            target_fps: 60,
        }
    }
}

impl GameConfig {
    pub fn with_dt_policy(mut self, policy: DtPolicy) -> Self {
        self.dt_policy = policy;
        self
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }
}

//
// Presenting
//

/// Stats about a finished frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInfo {
    /// Seconds simulated this frame, after the dt policy.
    pub dt: f64,
    /// Seconds measured since the previous frame.
    pub raw_dt: f64,
    /// Zero if no time passed.
    pub fps: f64,
    /// Number of this frame, starting from 1.
    pub frame: u64,
    /// Number of contacts resolved this frame.
    pub contacts: usize,
}

/// Draws the scene after every frame.
pub trait Presenter {
    fn present(&mut self, scene: &Scene, frame: &FrameInfo);
}

/// Presents nothing. For headless simulation.
impl Presenter for () {
    fn present(&mut self, _: &Scene, _: &FrameInfo) {}
}

//
// Game
//

/// A Game owns the scene and everything needed to advance it frame by frame.
///
/// # Example
/// ```
/// # use nanoframe::{game::{Game, GameConfig, ManualClock}, physics::BodyConfig};
/// let clock = ManualClock::new();
/// let mut game = Game::with_clock(GameConfig::default(), clock.clone());
/// game.start(|scene| {
///     scene.add_body(BodyConfig::default().with_size([10.0, 10.0]))?;
///     Ok(())
/// })
/// .unwrap();
///
/// clock.advance_secs(0.016);
/// let info = game.tick(&mut ()).unwrap();
/// assert_eq!(info.frame, 1);
/// ```
pub struct Game<C: TimeSource = SystemClock> {
    pub scene: Scene,
    pub physics: Physics,
    /// Events delivered by the host. Cleared at the end of each frame.
    pub input: InputState,
    pub config: GameConfig,
    clock: C,
    state: LoopState,
    last_time: Duration,
    frame: u64,
}

impl Game<SystemClock> {
    pub fn new(config: GameConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: TimeSource> Game<C> {
    pub fn with_clock(config: GameConfig, clock: C) -> Self {
        #[cfg(feature = "tracy")]
        let _ = tracy_client::Client::start();

        Game {
            scene: Scene::new(),
            physics: Physics::default(),
            input: InputState::new(),
            config,
            clock,
            state: LoopState::Idle,
            last_time: Duration::ZERO,
            frame: 0,
        }
    }

    /// Replace the physics settings.
    /// They can also be changed at any time through `physics.config`.
    pub fn with_physics(mut self, config: PhysicsConfig) -> Self {
        self.physics.config = config;
        self
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of frames run so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Populate the scene and start the clock.
    ///
    /// The first frame's dt is measured from here.
    /// If setup fails the game stays idle and can be started again.
    pub fn start<F>(&mut self, setup: F) -> Result<(), GameError>
    where
        F: FnOnce(&mut Scene) -> Result<(), BodyConfigError>,
    {
        if self.state != LoopState::Idle {
            return Err(GameError::AlreadyStarted);
        }
        setup(&mut self.scene)?;
        self.last_time = self.clock.now();
        self.state = LoopState::Running;
        log::debug!(
            "game started with {} bodies and {} entities",
            self.scene.bodies.len(),
            self.scene.entity_count()
        );
        Ok(())
    }

    /// Run one frame.
    ///
    /// In order: measure dt, step physics, run update hooks,
    /// present, then clear one-shot input.
    pub fn tick(&mut self, presenter: &mut impl Presenter) -> Result<FrameInfo, GameError> {
        if self.state != LoopState::Running {
            return Err(GameError::NotRunning(self.state));
        }

        let now = self.clock.now();
        let raw_dt = now.saturating_sub(self.last_time).as_secs_f64();
        self.last_time = now;
        let dt = self.config.dt_policy.apply(raw_dt);

        let contacts = self.physics.step(&mut self.scene.bodies, dt);
        let contact_count = contacts.len();
        let stop_requested = self.scene.update(dt, &self.input, contacts);

        self.frame += 1;
        let info = FrameInfo {
            dt,
            raw_dt,
            fps: if raw_dt > 0.0 { 1.0 / raw_dt } else { 0.0 },
            frame: self.frame,
            contacts: contact_count,
        };

        {
            let _span = tracy_span!("present");
            presenter.present(&self.scene, &info);
        }
        self.input.drain();

        #[cfg(feature = "tracy")]
        if let Some(client) = tracy_client::Client::running() {
            client.frame_mark();
        }
        log::trace!("frame {}: dt {dt}, {contact_count} contacts", self.frame);

        if stop_requested {
            self.stop();
        }
        Ok(info)
    }

    /// Stop the loop. No more frames will run.
    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            log::debug!("game stopped after {} frames", self.frame);
        }
        self.state = LoopState::Stopped;
    }

    /// Tick repeatedly until stopped, sleeping between frames
    /// to stay near [`GameConfig::target_fps`].
    ///
    /// Blocks the calling thread. Hosts with their own frame callback
    /// (like a browser's animation frame) should call [`tick`][Self::tick] instead.
    pub fn run(&mut self, presenter: &mut impl Presenter) -> Result<(), GameError> {
        let frame_time = Duration::from_secs_f64(1.0 / self.config.target_fps.max(1) as f64);
        while self.state == LoopState::Running {
            let frame_start = self.clock.now();
            self.tick(presenter)?;
            let elapsed = self.clock.now().saturating_sub(frame_start);
            if let Some(remaining) = frame_time.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }
}
