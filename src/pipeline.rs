// One frame's trip from camera to window buffer, minus the window itself.
// main.rs owns the loop and the devices; everything decided per frame lives here.

use crate::delay::RowDelay;
use crate::error::Error;
use crate::types::{Bgr32Frame, FrameBuffer};

pub struct Pipeline {
    delay: RowDelay,
    screen: FrameBuffer, // what goes to the window; keeps the last good frame
    bypass: bool,
}

impl Pipeline {
    pub fn new(width: usize, height: usize, bypass: bool) -> Result<Self, Error> {
        Ok(Self {
            delay: RowDelay::new(width, height)?,
            screen: FrameBuffer::new(width, height),
            bypass,
        })
    }

    pub fn screen(&self) -> &FrameBuffer {
        &self.screen
    }

    /// For drawing the HUD over the frame.
    pub fn screen_mut(&mut self) -> &mut FrameBuffer {
        &mut self.screen
    }

    pub fn ticks(&self) -> u64 {
        self.delay.ticks()
    }

    pub fn bypass(&self) -> bool {
        self.bypass
    }

    /// Flip the effect. History is dropped either way: rows kept while
    /// bypassed would be stale by the time the effect comes back.
    pub fn toggle_bypass(&mut self) -> bool {
        self.bypass = !self.bypass;
        self.delay.reset();
        self.bypass
    }

    pub fn clear(&mut self) {
        self.delay.reset();
    }

    /// Shear `frame` in place (sensor frames only, effect on) and copy it to the screen.
    /// A frame of a new size rebuilds the row history and the screen first.
    pub fn step(&mut self, frame: &mut Bgr32Frame, from_sensor: bool) -> Result<(), Error> {
        if frame.width != self.delay.width() || frame.height != self.delay.height() {
            log::warn!(
                "stream changed to {}x{}, rebuilding buffers",
                frame.width,
                frame.height
            );
            self.delay = RowDelay::new(frame.width, frame.height)?;
            self.screen = FrameBuffer::new(frame.width, frame.height);
        }

        if from_sensor && !self.bypass {
            self.delay.process(&mut frame.bytes)?;
            log::trace!("tick {}", self.delay.ticks());
        }

        frame.write_to(&mut self.screen)
    }
}

/// Lets a few bad frames through before treating the camera as gone.
pub struct FrameGuard {
    misses: u32,
    limit: u32,
}

impl FrameGuard {
    /// `limit` consecutive failed frames end the stream.
    pub fn new(limit: u32) -> Self {
        Self { misses: 0, limit }
    }

    /// `Ok(None)` means skip this tick and keep the previous screen.
    pub fn check(
        &mut self,
        fetched: Result<Bgr32Frame, Error>,
    ) -> Result<Option<Bgr32Frame>, Error> {
        match fetched {
            Ok(frame) => {
                self.misses = 0;
                Ok(Some(frame))
            }
            Err(Error::CameraFrame(msg)) => {
                self.misses += 1;
                if self.misses >= self.limit {
                    return Err(Error::CameraFrame(format!(
                        "{msg} ({} failed frames in a row)",
                        self.misses
                    )));
                }
                log::warn!("{msg}; skipping frame ({}/{})", self.misses, self.limit);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every row of frame `n` filled with `n * 16 + row`.
    fn frame(width: usize, height: usize, n: u8) -> Bgr32Frame {
        let row_len = width * 4;
        let bytes = (0..height)
            .flat_map(|r| std::iter::repeat(n * 16 + r as u8).take(row_len))
            .collect();
        Bgr32Frame { width, height, bytes }
    }

    #[test]
    fn sensor_frames_get_sheared() {
        let mut p = Pipeline::new(2, 2, false).unwrap();
        p.step(&mut frame(2, 2, 1), true).unwrap();

        let mut f2 = frame(2, 2, 2);
        p.step(&mut f2, true).unwrap();
        assert_eq!(p.ticks(), 2);
        assert_eq!(&f2.bytes[..8], &[2 * 16; 8]); // row 0 live
        assert_eq!(&f2.bytes[8..], &[16 + 1; 8]); // row 1 from frame 1
        assert_eq!(p.screen().pixels[2], 0x0011_1111);
    }

    #[test]
    fn new_size_rebuilds_and_passes_through() {
        let mut p = Pipeline::new(2, 2, false).unwrap();
        p.step(&mut frame(2, 2, 1), true).unwrap();
        p.step(&mut frame(2, 2, 2), true).unwrap();

        let input = frame(3, 2, 3);
        let mut f = input.clone();
        p.step(&mut f, true).unwrap();
        assert_eq!(f, input);
        assert_eq!(p.ticks(), 1);
        assert_eq!((p.screen().width, p.screen().height), (3, 2));
        assert_eq!(p.screen().pixels.len(), 6);
    }

    #[test]
    fn bypass_leaves_frames_and_ticks_alone() {
        let mut p = Pipeline::new(2, 2, true).unwrap();
        for n in 1..=3 {
            let input = frame(2, 2, n);
            let mut f = input.clone();
            p.step(&mut f, true).unwrap();
            assert_eq!(f, input);
        }
        assert_eq!(p.ticks(), 0);
    }

    #[test]
    fn blank_frames_without_sensor_are_not_processed() {
        let mut p = Pipeline::new(4, 3, false).unwrap();
        let mut f = Bgr32Frame::blank(4, 3);
        p.step(&mut f, false).unwrap();
        p.step(&mut f, false).unwrap();
        assert_eq!(p.ticks(), 0);
        assert!(p.screen().pixels.iter().all(|&px| px == 0));
    }

    #[test]
    fn toggling_bypass_drops_history() {
        let mut p = Pipeline::new(1, 3, false).unwrap();
        p.step(&mut frame(1, 3, 1), true).unwrap();
        p.step(&mut frame(1, 3, 2), true).unwrap();

        assert!(p.toggle_bypass());
        assert_eq!(p.ticks(), 0);
        assert!(!p.toggle_bypass());
        assert!(!p.bypass());

        let input = frame(1, 3, 5);
        let mut f = input.clone();
        p.step(&mut f, true).unwrap();
        assert_eq!(f, input);
    }

    #[test]
    fn clear_restarts_the_shear() {
        let mut p = Pipeline::new(1, 2, false).unwrap();
        p.step(&mut frame(1, 2, 1), true).unwrap();
        p.clear();
        let input = frame(1, 2, 2);
        let mut f = input.clone();
        p.step(&mut f, true).unwrap();
        assert_eq!(f, input);
    }

    #[test]
    fn guard_skips_bad_frames_and_recovers() {
        let mut g = FrameGuard::new(3);
        for _ in 0..2 {
            let skipped = g.check(Err(Error::CameraFrame("Decode RGB: bad".into()))).unwrap();
            assert!(skipped.is_none());
        }
        assert!(g.check(Ok(Bgr32Frame::blank(1, 1))).unwrap().is_some());

        // the count starts over after a good frame
        for _ in 0..2 {
            assert!(g.check(Err(Error::CameraFrame("timeout".into()))).unwrap().is_none());
        }
    }

    #[test]
    fn guard_gives_up_after_limit_in_a_row() {
        let mut g = FrameGuard::new(3);
        assert!(g.check(Err(Error::CameraFrame("timeout".into()))).is_ok());
        assert!(g.check(Err(Error::CameraFrame("timeout".into()))).is_ok());
        let err = g.check(Err(Error::CameraFrame("timeout".into()))).unwrap_err();
        assert!(matches!(err, Error::CameraFrame(msg) if msg.contains("3 failed frames")));
    }

    #[test]
    fn guard_passes_other_errors_straight_through() {
        let mut g = FrameGuard::new(10);
        let err = g
            .check(Err(Error::FrameSize { expected: 12, actual: 9 }))
            .unwrap_err();
        assert!(matches!(err, Error::FrameSize { .. }));
    }
}
