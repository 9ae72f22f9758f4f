//! A small 2D game framework built around axis-aligned box physics.
//!
//! Bodies live in a [`Scene`], are moved and collided by [`Physics`],
//! and a [`Game`] drives everything one frame at a time.

/// Profiling span that only exists when the `tracy` feature is enabled
/// and a profiler client is running.
macro_rules! tracy_span {
    ($name:literal) => {{
        #[cfg(feature = "tracy")]
        let span = tracy_client::Client::running()
            .map(|client| client.span(tracy_client::span_location!($name), 0));
        #[cfg(not(feature = "tracy"))]
        let span = ();
        span
    }};
}

pub mod game;
pub use game::{
    DtPolicy, FrameInfo, Game, GameConfig, GameError, LoopState, ManualClock, Presenter,
    SystemClock, TimeSource,
};

pub mod input;
pub use input::{AgedState, ButtonState, FrameInput, InputState, Key, PointerState};

pub mod math;
pub use math::{uv, Unit, Vec2, AABB};

pub mod physics;
pub use physics::{
    Body, BodyConfig, BodyConfigError, BodyKey, BodySet, ContactEvent, ContactModel, Mass,
    Material, Physics, PhysicsConfig, SolverStrategy,
};

pub mod scene;
pub use scene::{
    Behaviour, ClickHandler, EntityKey, FrameAnimation, Lifecycle, Particle, Scene, UpdateContext,
};
