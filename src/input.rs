use std::{borrow::Borrow, collections::HashMap};

use crate::math::Vec2;

/// Identifies a keyboard key by its code, e.g. `"ArrowLeft"` or `"KeyW"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn new(code: impl Into<String>) -> Self {
        Key(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(code: &str) -> Self {
        Key::new(code)
    }
}

impl From<String> for Key {
    fn from(code: String) -> Self {
        Key(code)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Input events delivered by the host, held until the end of the frame.
///
/// Discrete events (clicks, pointer presses, touch starts and ends, scrolling)
/// are visible to update hooks during exactly one frame:
/// the one that runs after they were delivered.
/// [`drain`][Self::drain] is the single point where they are cleared.
#[derive(Clone, Debug)]
pub struct InputState {
    keyboard: HashMap<Key, AgedState>,
    pointer: PointerState,
    touch: TouchState,
    scroll_delta: f64,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            // immediately allocate enough space to fit every key the user presses
            keyboard: HashMap::with_capacity(128),
            pointer: PointerState::default(),
            touch: TouchState::default(),
            scroll_delta: 0.0,
        }
    }

    /// Clear one-shot events and age held keys.
    /// Call this at the end of every frame, after all hooks have run.
    ///
    /// Returns the events that were cleared.
    pub fn drain(&mut self) -> FrameInput {
        for state in self.keyboard.values_mut() {
            state.age = state.age.saturating_add(1);
        }

        let consumed = FrameInput {
            pointer_pressed: self.pointer.pressed,
            pointer_released: self.pointer.released,
            clicked: self.pointer.clicked.then_some(self.pointer.position),
            touch_started: self.touch.start.filter(|_| self.touch.started),
            touch_ended: self.touch.ended,
            scroll_delta: self.scroll_delta,
        };

        self.pointer.pressed = false;
        self.pointer.released = false;
        self.pointer.clicked = false;
        self.touch.started = false;
        self.touch.ended = false;
        self.scroll_delta = 0.0;

        consumed
    }

    //
    // Getters
    //

    /// Get the state of a keyboard key along with the number of frames since it last changed.
    /// Returns None if the key has never been touched.
    pub fn get_key_state(&self, key: &str) -> Option<&AgedState> {
        self.keyboard.get(key)
    }

    /// True if the requested key is currently pressed
    /// (for fewer frames than age_limit if provided), false otherwise.
    pub fn is_key_pressed(&self, key: &str, age_limit: Option<u32>) -> bool {
        match self.get_key_state(key) {
            Some(AgedState {
                age,
                state: ButtonState::Pressed,
            }) => age_limit.map_or(true, |al| *age <= al),
            _ => false,
        }
    }

    /// Get the state of an axis defined by a positive and negative key.
    /// Prefers the positive key if both are pressed.
    pub fn get_key_axis_state(&self, pos_key: &str, neg_key: &str) -> KeyAxisState {
        if self.is_key_pressed(pos_key, None) {
            KeyAxisState::Pos
        } else if self.is_key_pressed(neg_key, None) {
            KeyAxisState::Neg
        } else {
            KeyAxisState::Zero
        }
    }

    #[inline]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Where the pointer was released this frame, if a click happened.
    #[inline]
    pub fn clicked(&self) -> Option<Vec2> {
        self.pointer.clicked.then_some(self.pointer.position)
    }

    #[inline]
    pub fn touch(&self) -> &TouchState {
        &self.touch
    }

    /// Vertical scroll distance accumulated since the last frame.
    #[inline]
    pub fn scroll_delta(&self) -> f64 {
        self.scroll_delta
    }

    //
    // Trackers
    //

    pub fn press_key(&mut self, key: impl Into<Key>) {
        self.track_key(key.into(), ButtonState::Pressed);
    }

    pub fn release_key(&mut self, key: impl Into<Key>) {
        self.track_key(key.into(), ButtonState::Released);
    }

    fn track_key(&mut self, key: Key, new_state: ButtonState) {
        // key repeat must not reset the age of a held key
        self.keyboard
            .entry(key)
            .and_modify(|e| {
                if e.state != new_state {
                    *e = AgedState::new(new_state);
                }
            })
            .or_insert_with(|| AgedState::new(new_state));
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.pointer.position = position;
    }

    pub fn pointer_down(&mut self, position: Vec2) {
        self.pointer.position = position;
        self.pointer.down = true;
        self.pointer.pressed = true;
    }

    /// Releasing the pointer both ends a press and registers a click at the release point.
    pub fn pointer_up(&mut self, position: Vec2) {
        self.pointer.position = position;
        self.pointer.down = false;
        self.pointer.released = true;
        self.pointer.clicked = true;
    }

    pub fn touch_start(&mut self, position: Vec2) {
        self.touch.active = true;
        self.touch.started = true;
        self.touch.start = Some(position);
    }

    pub fn touch_end(&mut self) {
        self.touch.active = false;
        self.touch.ended = true;
    }

    /// Accumulate vertical scrolling, in pixels.
    pub fn scroll(&mut self, delta: f64) {
        if delta.is_finite() {
            self.scroll_delta += delta;
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// The state of a keyboard key
/// and time in number of frames since last state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgedState {
    pub state: ButtonState,
    pub age: u32,
}

impl AgedState {
    pub fn new(state: ButtonState) -> Self {
        AgedState { state, age: 0 }
    }
}

impl Default for AgedState {
    fn default() -> Self {
        Self::new(ButtonState::Released)
    }
}

/// The state of an input axis defined by a positive and negative key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAxisState {
    Pos,
    Zero,
    Neg,
}

/// Mouse or pen pointer, in pixels down and right from the top left of the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    /// Held down right now.
    pub down: bool,
    /// Went down this frame.
    pub pressed: bool,
    /// Went up this frame.
    pub released: bool,
    /// A click completed this frame.
    pub clicked: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchState {
    pub active: bool,
    /// Position of the latest touch start. Kept after the touch ends.
    pub start: Option<Vec2>,
    pub started: bool,
    pub ended: bool,
}

/// One-shot events that were visible during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub pointer_pressed: bool,
    pub pointer_released: bool,
    pub clicked: Option<Vec2>,
    pub touch_started: Option<Vec2>,
    pub touch_ended: bool,
    pub scroll_delta: f64,
}

impl FrameInput {
    /// True if no one-shot event happened during the frame.
    pub fn is_empty(&self) -> bool {
        *self == FrameInput::default()
    }
}
