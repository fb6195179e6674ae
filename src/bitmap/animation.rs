use crate::bitmap::{BitmapId, Storage};
use crate::context::GraphicsContext;
use crate::foundation::error::{TesseraError, TesseraResult};

/// Playback state of an animated bitmap.
///
/// `last_frame` is the frame shown while stopped and the origin of timed playback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct AnimationTimer {
    pub(crate) playing: bool,
    pub(crate) needs_reset: bool,
    pub(crate) looping: bool,
    pub(crate) fps: f32,
    pub(crate) last_frame: i32,
    pub(crate) start_time: f64,
    pub(crate) play_time: f64,
}

impl Default for AnimationTimer {
    fn default() -> Self {
        Self {
            playing: false,
            needs_reset: false,
            looping: true,
            fps: 0.0,
            last_frame: 0,
            start_time: 0.0,
            play_time: 0.0,
        }
    }
}

impl AnimationTimer {
    /// `floor(last_frame + play_time * fps)`, or `last_frame` when fps is not positive.
    pub(crate) fn raw_index(&self) -> i64 {
        if self.fps <= 0.0 {
            return i64::from(self.last_frame);
        }
        (f64::from(self.last_frame) + self.play_time / (1.0 / f64::from(self.fps))).floor() as i64
    }

    pub(crate) fn current_index(&self, frame_count: usize) -> usize {
        if frame_count == 0 {
            return 0;
        }
        let raw = if !self.playing || self.needs_reset {
            i64::from(self.last_frame)
        } else {
            self.raw_index()
        };
        let count = frame_count as i64;
        if self.looping {
            raw.rem_euclid(count) as usize
        } else {
            raw.clamp(0, count - 1) as usize
        }
    }

    pub(crate) fn play(&mut self) {
        self.playing = true;
        self.needs_reset = true;
    }

    pub(crate) fn stop(&mut self, frame_count: usize) {
        self.last_frame = self.current_index(frame_count) as i32;
        self.playing = false;
    }

    pub(crate) fn seek(&mut self, frame: i32, frame_count: usize) {
        self.last_frame = frame.clamp(0, frame_count as i32);
    }

    /// Advances playback to `now`; restarts the time base after `play`.
    pub(crate) fn update(&mut self, now: f64) {
        if !self.playing {
            return;
        }
        if self.needs_reset {
            self.start_time = now;
            self.needs_reset = false;
        }
        self.play_time = now - self.start_time;
    }

    pub(crate) fn is_playing(&self, frame_count: usize) -> bool {
        if !self.playing {
            return false;
        }
        if self.looping {
            return true;
        }
        self.raw_index() < frame_count as i64
    }
}

impl GraphicsContext {
    pub fn frame_count(&self, id: BitmapId) -> TesseraResult<usize> {
        Ok(self.state(id, "frame_count")?.frame_count())
    }

    pub fn current_frame(&self, id: BitmapId) -> TesseraResult<usize> {
        Ok(self.state(id, "current_frame")?.current_index())
    }

    pub fn is_playing(&self, id: BitmapId) -> TesseraResult<bool> {
        let st = self.state(id, "is_playing")?;
        st.ensure_animated("is_playing")?;
        Ok(st.timer.is_playing(st.frame_count()))
    }

    pub fn play(&mut self, id: BitmapId) -> TesseraResult<()> {
        let st = self.state_mut(id, "play")?;
        st.ensure_animated("play")?;
        if !st.timer.playing {
            st.timer.play();
        }
        Ok(())
    }

    pub fn stop(&mut self, id: BitmapId) -> TesseraResult<()> {
        let st = self.state_mut(id, "stop")?;
        st.ensure_animated("stop")?;
        if st.timer.playing {
            let count = st.frame_count();
            st.timer.stop(count);
        }
        Ok(())
    }

    pub fn goto_and_stop(&mut self, id: BitmapId, frame: i32) -> TesseraResult<()> {
        let st = self.state_mut(id, "goto_and_stop")?;
        st.ensure_animated("goto_and_stop")?;
        let count = st.frame_count();
        st.timer.stop(count);
        st.timer.seek(frame, count);
        Ok(())
    }

    pub fn goto_and_play(&mut self, id: BitmapId, frame: i32) -> TesseraResult<()> {
        let st = self.state_mut(id, "goto_and_play")?;
        st.ensure_animated("goto_and_play")?;
        let count = st.frame_count();
        st.timer.stop(count);
        st.timer.seek(frame, count);
        st.timer.play();
        Ok(())
    }

    pub fn next_frame(&mut self, id: BitmapId) -> TesseraResult<()> {
        let st = self.state_mut(id, "next_frame")?;
        st.ensure_animated("next_frame")?;
        let count = st.frame_count();
        if st.timer.playing {
            st.timer.stop(count);
        }
        if st.timer.last_frame >= count as i32 - 1 {
            if !st.timer.looping {
                return Ok(());
            }
            st.timer.last_frame = 0;
            return Ok(());
        }
        st.timer.last_frame += 1;
        Ok(())
    }

    pub fn previous_frame(&mut self, id: BitmapId) -> TesseraResult<()> {
        let st = self.state_mut(id, "previous_frame")?;
        st.ensure_animated("previous_frame")?;
        let count = st.frame_count();
        if st.timer.playing {
            st.timer.stop(count);
        }
        if st.timer.last_frame <= 0 {
            st.timer.last_frame = if st.timer.looping { count as i32 - 1 } else { 0 };
            return Ok(());
        }
        st.timer.last_frame -= 1;
        Ok(())
    }

    /// Sets the playback rate; negative values become zero. Playback restarts if running.
    ///
    /// A still bitmap keeps the rate (and the looping flag) for when it gains frames.
    pub fn set_animation_fps(&mut self, id: BitmapId, fps: f32) -> TesseraResult<()> {
        let st = self.state_mut(id, "set_animation_fps")?;
        st.ensure_not_mega("set_animation_fps")?;
        if !fps.is_finite() {
            return Err(TesseraError::precondition("animation fps must be finite"));
        }
        let count = st.frame_count();
        let restart = st.timer.playing;
        st.timer.stop(count);
        st.timer.fps = fps.max(0.0);
        if restart {
            st.timer.play();
        }
        Ok(())
    }

    pub fn animation_fps(&self, id: BitmapId) -> TesseraResult<f32> {
        let st = self.state(id, "animation_fps")?;
        st.ensure_not_mega("animation_fps")?;
        Ok(st.timer.fps)
    }

    pub fn set_looping(&mut self, id: BitmapId, looping: bool) -> TesseraResult<()> {
        let st = self.state_mut(id, "set_looping")?;
        st.ensure_not_mega("set_looping")?;
        st.timer.looping = looping;
        Ok(())
    }

    pub fn looping(&self, id: BitmapId) -> TesseraResult<bool> {
        let st = self.state(id, "looping")?;
        st.ensure_not_mega("looping")?;
        Ok(st.timer.looping)
    }

    /// Adds a copy of `source`'s displayed pixels as a frame, turning a still bitmap into an
    /// animation. `position` inserts (clamped to the frame list) and returns the index used;
    /// `None` appends and returns the new frame count.
    pub fn add_frame(
        &mut self,
        id: BitmapId,
        source: BitmapId,
        position: Option<i32>,
    ) -> TesseraResult<usize> {
        const OP: &str = "add_frame";
        let (w, h) = {
            let st = self.state(id, OP)?;
            st.ensure_not_mega(OP)?;
            if st.hires.is_some() {
                tracing::warn!(
                    ?id,
                    "adding a frame to a bitmap with a hires mirror; the mirror stays a still image"
                );
            }
            (st.width, st.height)
        };
        let pixels = {
            let src = self.state(source, OP)?;
            if (src.width, src.height) != (w, h) {
                return Err(TesseraError::precondition(format!(
                    "animation frames must share one size ({}x{} vs {w}x{h})",
                    src.width, src.height
                )));
            }
            src.current_view().to_buffer().pixels
        };

        let mut frame = self.pool.request(w, h)?;
        frame.upload(&pixels);

        let fallback_fps = self.config.frame_rate;
        let st = self.state_mut(id, OP)?;
        let mode = st.mode();
        st.make_animated(fallback_fps);
        let inserted = match &mut st.storage {
            Storage::Animated(frames) => Ok(match position {
                Some(p) => {
                    let i = p.clamp(0, frames.len() as i32) as usize;
                    frames.insert(i, frame);
                    i
                }
                None => {
                    frames.push(frame);
                    frames.len()
                }
            }),
            _ => Err(frame),
        };
        let index = match inserted {
            Ok(index) => index,
            Err(frame) => {
                self.pool.release(frame);
                return Err(TesseraError::unsupported(OP, mode));
            }
        };
        self.notify_modified(id);
        Ok(index)
    }

    /// Removes a frame (`None` is the last one, indices are clamped). An animation left with a
    /// single frame becomes a still bitmap again.
    pub fn remove_frame(&mut self, id: BitmapId, position: Option<i32>) -> TesseraResult<()> {
        const OP: &str = "remove_frame";
        let st = self.state_mut(id, OP)?;
        st.ensure_animated(OP)?;
        let Storage::Animated(frames) = &mut st.storage else {
            return Ok(());
        };
        let last = frames.len().saturating_sub(1);
        let pos = position.map_or(last, |p| p.clamp(0, last as i32) as usize);
        let removed = frames.remove(pos);

        if frames.len() == 1 {
            if let Some(only) = frames.pop() {
                st.storage = Storage::Single(only);
            }
            st.timer.playing = false;
            st.timer.last_frame = 0;
            let rect = st.rect();
            st.tainted.add(rect);
        }
        st.cache.invalidate();
        self.pool.release(removed);
        self.notify_modified(id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/animation.rs"]
mod tests;
