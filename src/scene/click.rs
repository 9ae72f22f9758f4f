use super::{Behaviour, Lifecycle, UpdateContext};
use crate::physics::BodyKey;

type ClickCallback = Box<dyn FnMut(BodyKey, &mut UpdateContext)>;

/// Calls a function when a click lands on a body.
///
/// A click counts when it's released inside the body's bounds, edges included.
/// The handler removes itself once its body is gone from the scene.
pub struct ClickHandler {
    body: BodyKey,
    on_click: ClickCallback,
}

impl ClickHandler {
    pub fn new(body: BodyKey, on_click: impl FnMut(BodyKey, &mut UpdateContext) + 'static) -> Self {
        ClickHandler {
            body,
            on_click: Box::new(on_click),
        }
    }

    #[inline]
    pub fn body(&self) -> BodyKey {
        self.body
    }
}

impl std::fmt::Debug for ClickHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHandler")
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl Behaviour for ClickHandler {
    fn update(&mut self, ctx: &mut UpdateContext) -> Lifecycle {
        let Some(body) = ctx.bodies.get(self.body) else {
            return Lifecycle::Remove;
        };
        if let Some(point) = ctx.input.clicked() {
            if body.contains_point(point) {
                (self.on_click)(self.body, ctx);
            }
        }
        Lifecycle::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{input::InputState, math::Vec2, physics::BodyConfig, scene::Scene};

    use std::{cell::Cell, rc::Rc};

    #[test]
    fn fires_on_click_inside_bounds() {
        let mut scene = Scene::new();
        let body = scene
            .add_body(
                BodyConfig::default()
                    .with_position([10.0, 10.0])
                    .with_size([5.0, 5.0])
                    .with_physics(false),
            )
            .unwrap();
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        scene.add_entity(ClickHandler::new(body, move |key, ctx| {
            assert_eq!(key, body);
            assert!(ctx.bodies.contains(key));
            counter.set(counter.get() + 1);
        }));

        let mut input = InputState::new();
        // no click yet
        scene.update(0.1, &input, &[]);
        assert_eq!(clicks.get(), 0);

        // outside
        input.pointer_up(Vec2::new(9.0, 12.0));
        scene.update(0.1, &input, &[]);
        input.drain();
        assert_eq!(clicks.get(), 0);

        // on the edge
        input.pointer_up(Vec2::new(15.0, 15.0));
        scene.update(0.1, &input, &[]);
        input.drain();
        assert_eq!(clicks.get(), 1);

        // drained, so the same click doesn't fire again
        scene.update(0.1, &input, &[]);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn removed_with_its_body() {
        let mut scene = Scene::new();
        let body = scene.add_body(BodyConfig::default()).unwrap();
        let handler = scene.add_entity(ClickHandler::new(body, |_, _| {}));
        let input = InputState::new();

        scene.update(0.1, &input, &[]);
        assert!(scene.contains_entity(handler));
        scene.remove_body(body);
        scene.update(0.1, &input, &[]);
        assert!(!scene.contains_entity(handler));
    }
}
