use anyhow::Result;
use tracing::info;

/// Consumer of the combined local and remote media that produces the
/// downloadable recording.
pub trait Recorder: Send {
    fn is_recording(&self) -> bool;

    fn start(&mut self) -> Result<()>;

    /// Stops and finalizes the artifact.
    fn stop(&mut self) -> Result<()>;
}

/// Tracks the recording flag without capturing anything.
#[derive(Debug, Default)]
pub struct NoopRecorder {
    recording: bool,
}

impl Recorder for NoopRecorder {
    fn is_recording(&self) -> bool {
        self.recording
    }

    fn start(&mut self) -> Result<()> {
        self.recording = true;
        info!("Recording started (no recorder attached)");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.recording = false;
        info!("Recording stopped");
        Ok(())
    }
}
