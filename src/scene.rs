//! Bodies and the per-frame update hooks attached to them.

use std::any::Any;

use crate::{
    input::InputState,
    physics::{Body, BodyConfig, BodyConfigError, BodyKey, BodySet, ContactEvent},
};

use thunderdome as td;

pub mod animation;
pub use animation::FrameAnimation;

pub mod click;
pub use click::ClickHandler;

pub mod particle;
pub use particle::Particle;

/// Handle to an update hook in a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityKey(td::Index);

/// Whether a hook wants to keep running after this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Keep,
    Remove,
}

/// Everything an update hook can see and touch during a frame.
pub struct UpdateContext<'a> {
    /// Length of the frame in seconds.
    pub dt: f64,
    pub input: &'a InputState,
    pub bodies: &'a mut BodySet,
    /// Contacts resolved by this frame's physics step.
    pub contacts: &'a [ContactEvent],
    stop_requested: bool,
}

impl<'a> UpdateContext<'a> {
    pub fn new(
        dt: f64,
        input: &'a InputState,
        bodies: &'a mut BodySet,
        contacts: &'a [ContactEvent],
    ) -> Self {
        UpdateContext {
            dt,
            input,
            bodies,
            contacts,
            stop_requested: false,
        }
    }

    /// Ask the game loop to stop after the current frame finishes.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}

/// Per-frame game logic.
///
/// Any `FnMut(&mut UpdateContext) -> Lifecycle` closure is a behaviour,
/// see [`Scene::add_update_fn`].
pub trait Behaviour: AsAny {
    fn update(&mut self, ctx: &mut UpdateContext) -> Lifecycle;
}

impl<F> Behaviour for F
where
    F: FnMut(&mut UpdateContext) -> Lifecycle + 'static,
{
    fn update(&mut self, ctx: &mut UpdateContext) -> Lifecycle {
        self(ctx)
    }
}

/// Lets a presenter look at the concrete type of a behaviour.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The world: a set of bodies plus the hooks that run every frame.
#[derive(Default)]
pub struct Scene {
    pub bodies: BodySet,
    entities: td::Arena<Box<dyn Behaviour>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a body configuration and add the body to the scene.
    pub fn add_body(&mut self, config: BodyConfig) -> Result<BodyKey, BodyConfigError> {
        match config.build() {
            Ok(body) => Ok(self.bodies.insert(body)),
            Err(err) => {
                log::debug!("rejected body: {err}");
                Err(err)
            }
        }
    }

    #[inline]
    pub fn insert_body(&mut self, body: Body) -> BodyKey {
        self.bodies.insert(body)
    }

    #[inline]
    pub fn remove_body(&mut self, key: BodyKey) -> Option<Body> {
        self.bodies.remove(key)
    }

    pub fn add_entity(&mut self, behaviour: impl Behaviour + 'static) -> EntityKey {
        EntityKey(self.entities.insert(Box::new(behaviour)))
    }

    /// Add a closure as a behaviour.
    ///
    /// Prefer this over [`add_entity`][Self::add_entity] for closures,
    /// it lets the compiler infer the closure's argument type.
    pub fn add_update_fn<F>(&mut self, f: F) -> EntityKey
    where
        F: FnMut(&mut UpdateContext) -> Lifecycle + 'static,
    {
        self.add_entity(f)
    }

    pub fn remove_entity(&mut self, key: EntityKey) -> bool {
        self.entities.remove(key.0).is_some()
    }

    #[inline]
    pub fn contains_entity(&self, key: EntityKey) -> bool {
        self.entities.contains(key.0)
    }

    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get a behaviour as its concrete type.
    pub fn entity<T: Behaviour + 'static>(&self, key: EntityKey) -> Option<&T> {
        let behaviour: &dyn Behaviour = self.entities.get(key.0)?.as_ref();
        behaviour.as_any().downcast_ref()
    }

    pub fn entity_mut<T: Behaviour + 'static>(&mut self, key: EntityKey) -> Option<&mut T> {
        let behaviour: &mut dyn Behaviour = self.entities.get_mut(key.0)?.as_mut();
        behaviour.as_any_mut().downcast_mut()
    }

    /// Iterate over every behaviour of the given concrete type.
    pub fn entities_of<T: Behaviour + 'static>(&self) -> impl Iterator<Item = (EntityKey, &T)> {
        self.entities.iter().filter_map(|(idx, b)| {
            let behaviour: &dyn Behaviour = b.as_ref();
            behaviour
                .as_any()
                .downcast_ref()
                .map(|t| (EntityKey(idx), t))
        })
    }

    /// Run every hook once, in insertion slot order.
    ///
    /// Hooks that return [`Lifecycle::Remove`] are removed after all of them have run.
    /// Returns true if any hook requested the game to stop.
    pub fn update(&mut self, dt: f64, input: &InputState, contacts: &[ContactEvent]) -> bool {
        let _span = tracy_span!("update hooks");

        let mut ctx = UpdateContext::new(dt, input, &mut self.bodies, contacts);
        let mut finished = Vec::new();
        for (idx, behaviour) in self.entities.iter_mut() {
            if behaviour.update(&mut ctx) == Lifecycle::Remove {
                finished.push(idx);
            }
        }
        let stop = ctx.stop_requested();

        for idx in finished {
            self.entities.remove(idx);
        }
        stop
    }
}
