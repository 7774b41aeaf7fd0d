//! Audio capture adapter.
//!
//! [`Recorder`] wraps a platform capture backend behind the
//! [`CaptureBackend`] trait and enforces the session state machine:
//!
//! ```text
//! Idle ──start()──▶ Recording ──stop()──▶ Idle
//! ```
//!
//! There are no intermediate states and no concurrent sessions per
//! recorder. `stop()` finalizes buffering, releases the underlying device
//! stream, and returns the captured clip; dropping a recorder that is
//! still recording releases the stream and logs the leak.
//!
//! Backends follow the provider pattern used for the remote advice source:
//! hosts with their own device loop feed a [`BufferBackend`], and
//! [`UnavailableBackend`] stands in where no audio device exists.

use crate::error::AdvisoryError;

/// Finalized audio capture: raw bytes plus their container MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Base64 payload form expected by the `/query` endpoint.
    pub fn to_base64(&self) -> String {
        use base64::engine::general_purpose::STANDARD as BASE64;
        use base64::Engine as _;
        BASE64.encode(&self.bytes)
    }
}

/// A platform audio source.
///
/// `open` acquires the device stream and starts buffering; `finish`
/// finalizes buffering, releases the stream, and returns the clip;
/// `release` drops the stream without producing a clip (abort path).
pub trait CaptureBackend {
    fn open(&mut self) -> Result<(), AdvisoryError>;
    fn finish(&mut self) -> Result<AudioClip, AdvisoryError>;
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecorderState {
    Idle,
    Recording,
}

/// Single-session audio recorder over a [`CaptureBackend`].
pub struct Recorder<B: CaptureBackend> {
    backend: B,
    state: RecorderState,
}

impl<B: CaptureBackend> Recorder<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: RecorderState::Idle,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Acquire the device stream and begin buffering.
    ///
    /// # Errors
    ///
    /// [`AdvisoryError::DeviceUnavailable`] if permission is denied or no
    /// device exists. Calling `start` while already recording is also
    /// reported as `DeviceUnavailable`: the hardware stream is held by the
    /// running session.
    pub fn start(&mut self) -> Result<(), AdvisoryError> {
        if self.state == RecorderState::Recording {
            return Err(AdvisoryError::DeviceUnavailable(
                "capture session already active".to_string(),
            ));
        }
        self.backend.open()?;
        self.state = RecorderState::Recording;
        Ok(())
    }

    /// Finalize buffering, release the device stream, and return the clip.
    ///
    /// # Errors
    ///
    /// [`AdvisoryError::NoActiveCapture`] without a prior successful
    /// [`start`](Self::start).
    pub fn stop(&mut self) -> Result<AudioClip, AdvisoryError> {
        if self.state != RecorderState::Recording {
            return Err(AdvisoryError::NoActiveCapture);
        }
        // Return to Idle before finish(): the backend releases the stream
        // either way, and a retried stop() must not succeed.
        self.state = RecorderState::Idle;
        self.backend.finish()
    }

    /// Access the backend between sessions (e.g. to feed a
    /// [`BufferBackend`] from a host device loop).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: CaptureBackend> Drop for Recorder<B> {
    fn drop(&mut self) {
        if self.state == RecorderState::Recording {
            tracing::warn!("recorder dropped mid-session; releasing capture stream");
            self.backend.release();
        }
    }
}

/// In-memory backend for hosts that run their own device I/O and for tests.
///
/// The host pushes raw frames between `start` and `stop`; `finish`
/// concatenates them into a single clip.
#[derive(Debug, Default)]
pub struct BufferBackend {
    mime: String,
    frames: Vec<Vec<u8>>,
    open: bool,
}

impl BufferBackend {
    pub fn new(mime: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            frames: Vec::new(),
            open: false,
        }
    }

    /// Buffer one frame of captured audio. Frames pushed while the backend
    /// is closed are dropped.
    pub fn push_frame(&mut self, frame: &[u8]) {
        if self.open {
            self.frames.push(frame.to_vec());
        }
    }
}

impl CaptureBackend for BufferBackend {
    fn open(&mut self) -> Result<(), AdvisoryError> {
        self.frames.clear();
        self.open = true;
        Ok(())
    }

    fn finish(&mut self) -> Result<AudioClip, AdvisoryError> {
        self.open = false;
        let bytes = self.frames.drain(..).flatten().collect();
        Ok(AudioClip::new(bytes, self.mime.clone()))
    }

    fn release(&mut self) {
        self.open = false;
        self.frames.clear();
    }
}

/// Backend for hosts without an audio device; `open` always fails.
#[derive(Debug, Default)]
pub struct UnavailableBackend;

impl CaptureBackend for UnavailableBackend {
    fn open(&mut self) -> Result<(), AdvisoryError> {
        Err(AdvisoryError::DeviceUnavailable(
            "no audio input device".to_string(),
        ))
    }

    fn finish(&mut self) -> Result<AudioClip, AdvisoryError> {
        Err(AdvisoryError::NoActiveCapture)
    }

    fn release(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_session_concatenates_frames() {
        let mut recorder = Recorder::new(BufferBackend::new("audio/webm"));
        recorder.start().unwrap();
        assert!(recorder.is_recording());
        recorder.backend_mut().push_frame(b"abc");
        recorder.backend_mut().push_frame(b"def");
        let clip = recorder.stop().unwrap();
        assert_eq!(clip.bytes, b"abcdef");
        assert_eq!(clip.mime, "audio/webm");
        assert!(!recorder.is_recording());
    }

    #[test]
    fn stop_without_start_fails() {
        let mut recorder = Recorder::new(BufferBackend::new("audio/webm"));
        assert!(matches!(
            recorder.stop(),
            Err(AdvisoryError::NoActiveCapture)
        ));
    }

    #[test]
    fn double_stop_fails() {
        let mut recorder = Recorder::new(BufferBackend::new("audio/webm"));
        recorder.start().unwrap();
        recorder.stop().unwrap();
        assert!(matches!(
            recorder.stop(),
            Err(AdvisoryError::NoActiveCapture)
        ));
    }

    #[test]
    fn double_start_fails() {
        let mut recorder = Recorder::new(BufferBackend::new("audio/webm"));
        recorder.start().unwrap();
        assert!(matches!(
            recorder.start(),
            Err(AdvisoryError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn unavailable_device_fails_start() {
        let mut recorder = Recorder::new(UnavailableBackend);
        assert!(matches!(
            recorder.start(),
            Err(AdvisoryError::DeviceUnavailable(_))
        ));
        assert!(!recorder.is_recording());
    }

    #[test]
    fn frames_outside_session_are_dropped() {
        let mut backend = BufferBackend::new("audio/webm");
        backend.push_frame(b"early");
        let mut recorder = Recorder::new(backend);
        recorder.start().unwrap();
        recorder.backend_mut().push_frame(b"kept");
        let clip = recorder.stop().unwrap();
        assert_eq!(clip.bytes, b"kept");
    }

    #[test]
    fn restart_after_stop_yields_fresh_clip() {
        let mut recorder = Recorder::new(BufferBackend::new("audio/webm"));
        recorder.start().unwrap();
        recorder.backend_mut().push_frame(b"one");
        recorder.stop().unwrap();

        recorder.start().unwrap();
        recorder.backend_mut().push_frame(b"two");
        let clip = recorder.stop().unwrap();
        assert_eq!(clip.bytes, b"two");
    }
}
