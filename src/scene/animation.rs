use super::{Behaviour, Lifecycle, UpdateContext};

/// Cycles through a fixed number of frames, advancing one frame
/// each time `frame_duration` seconds have accumulated.
///
/// Leftover time is dropped when the frame changes,
/// so long frames never skip more than one animation frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameAnimation {
    pub frame_count: usize,
    /// Seconds per frame.
    pub frame_duration: f64,
    current_frame: usize,
    timer: f64,
}

impl FrameAnimation {
    pub fn new(frame_count: usize, frame_duration: f64) -> Self {
        FrameAnimation {
            frame_count,
            frame_duration,
            current_frame: 0,
            timer: 0.0,
        }
    }

    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn advance(&mut self, dt: f64) {
        if self.frame_count == 0 || !dt.is_finite() {
            return;
        }
        self.timer += dt;
        if self.timer >= self.frame_duration {
            self.current_frame = (self.current_frame + 1) % self.frame_count;
            self.timer = 0.0;
        }
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.timer = 0.0;
    }
}

impl Behaviour for FrameAnimation {
    fn update(&mut self, ctx: &mut UpdateContext) -> Lifecycle {
        self.advance(ctx.dt);
        Lifecycle::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_and_wraps() {
        let mut anim = FrameAnimation::new(3, 0.1);
        let mut frames = Vec::new();
        for _ in 0..8 {
            anim.advance(0.05);
            frames.push(anim.current_frame());
        }
        itertools::assert_equal(frames, [0, 1, 1, 2, 2, 0, 0, 1]);
    }

    #[test]
    fn long_frame_advances_once() {
        let mut anim = FrameAnimation::new(4, 0.1);
        anim.advance(1.0);
        assert_eq!(anim.current_frame(), 1);
        anim.reset();
        assert_eq!(anim, FrameAnimation::new(4, 0.1));
    }

    #[test]
    fn empty_animation_stays_put() {
        let mut anim = FrameAnimation::new(0, 0.1);
        anim.advance(1.0);
        assert_eq!(anim.current_frame(), 0);
    }
}
