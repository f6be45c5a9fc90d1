// One error type for the whole app.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String),   // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Camera init error: {0}")]
    CameraInit(String),   // Opening/starting the camera failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String),  // Grabbing/decoding a frame failed

    /// A buffer did not match the size the receiver was built for.
    #[error("Frame size error: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    /// Width or height of zero.
    #[error("Empty frame: {width}x{height}")]
    EmptyFrame { width: usize, height: usize },
}
