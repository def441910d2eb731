//! Background music playback on top of rodio.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use thiserror::Error;

use crate::config::AudioConfig;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("no audio output available")]
    Unavailable,

    #[error("failed to open audio output")]
    Stream(#[from] rodio::StreamError),

    #[error("failed to start playback")]
    Play(#[from] rodio::PlayError),
}

/// Output stream plus the handle used to attach sinks. The stream must
/// outlive every sink created from the handle.
struct Output {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

pub struct Audio {
    enabled: bool,
    volume: f32,
    output: Option<Output>,
    bgm: Option<Sink>,
}

impl Audio {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            enabled: config.enabled,
            volume: clamp_volume(config.volume),
            output: None,
            bgm: None,
        }
    }

    /// Opens the default output device. A disabled config leaves audio silent.
    pub fn init(&mut self) -> Result<(), AudioError> {
        if !self.enabled || self.output.is_some() {
            return Ok(());
        }
        let (stream, handle) = OutputStream::try_default()?;
        self.output = Some(Output {
            _stream: stream,
            handle,
        });
        log::info!("audio initialized");
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.stop_bgm();
        if self.output.take().is_some() {
            log::info!("audio shutdown");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.output.is_some()
    }

    /// Loops `path` as background music, replacing any current track.
    pub fn play_bgm(&mut self, path: &Path) -> Result<(), AudioError> {
        let file = File::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let output = self.output.as_ref().ok_or(AudioError::Unavailable)?;
        let sink = Sink::try_new(&output.handle)?;
        sink.set_volume(self.volume);
        sink.append(source.repeat_infinite());

        if let Some(previous) = self.bgm.replace(sink) {
            previous.stop();
        }
        log::debug!("playing bgm {}", path.display());
        Ok(())
    }

    pub fn stop_bgm(&mut self) {
        if let Some(sink) = self.bgm.take() {
            sink.stop();
        }
    }

    pub fn is_playing_bgm(&self) -> bool {
        self.bgm.as_ref().is_some_and(|s| !s.empty())
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        if let Some(sink) = &self.bgm {
            sink.set_volume(self.volume);
        }
    }
}

/// Keeps a gain within `0.0..=1.0`; NaN counts as silence.
fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
