// Row delay: every row shows itself as it was some frames ago.
// Row i keeps up to i+1 past copies and shows the oldest one, so the top of
// the image is live and the bottom lags by `height` frames. Anything moving
// sideways gets sheared into a diagonal.

use crate::error::Error;
use crate::types::BYTES_PER_PIXEL;
use std::collections::VecDeque;

pub struct RowDelay {
    width: usize,
    height: usize,
    history: Vec<VecDeque<Box<[u8]>>>, // one queue per row, oldest at the front
    ticks: u64,
}

impl RowDelay {
    /// One empty queue per row.
    pub fn new(width: usize, height: usize) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyFrame { width, height });
        }
        Ok(Self {
            width,
            height,
            history: (0..height).map(|_| VecDeque::new()).collect(),
            ticks: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_len(&self) -> usize {
        self.width * BYTES_PER_PIXEL
    }

    pub fn frame_len(&self) -> usize {
        self.row_len() * self.height
    }

    /// Frames processed since creation or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// How many past copies `row` holds right now.
    pub fn history_len(&self, row: usize) -> Option<usize> {
        self.history.get(row).map(VecDeque::len)
    }

    /// Drop all history; the next frame passes through untouched.
    pub fn reset(&mut self) {
        for q in &mut self.history {
            q.clear();
        }
        self.ticks = 0;
    }

    /// Record every row of `frame`, then overwrite it with the oldest copy.
    /// The buffer, history and tick count are untouched on a size mismatch.
    pub fn process<'a>(&mut self, frame: &'a mut [u8]) -> Result<&'a mut [u8], Error> {
        let expected = self.frame_len();
        if frame.len() != expected {
            return Err(Error::FrameSize { expected, actual: frame.len() });
        }

        let substitute = self.ticks != 0;
        let row_len = self.row_len();

        for (i, (row, queue)) in frame
            .chunks_exact_mut(row_len)
            .zip(self.history.iter_mut())
            .enumerate()
        {
            let cap = i + 1;

            // At the cap: recycle the evicted buffer for the incoming row.
            let slot = if queue.len() == cap {
                queue.pop_front()
            } else {
                None
            };
            let slot = match slot {
                Some(mut buf) => {
                    buf.copy_from_slice(row);
                    buf
                }
                None => Box::from(&*row),
            };
            queue.push_back(slot);

            if substitute {
                if let Some(oldest) = queue.front() {
                    row.copy_from_slice(oldest);
                }
            }
        }

        self.ticks += 1;
        Ok(frame)
    }
}
