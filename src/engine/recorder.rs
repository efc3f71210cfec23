//! WAV file recorder
//!
//! Writes the rendered buffer as mono 16-bit PCM, clamping to [-1, 1].

use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Clamp a sample to [-1, 1] and scale it to `i16`. The flag is set when
/// clamping changed the value.
pub fn to_pcm(sample: f64) -> (i16, bool) {
    let clamped = sample.clamp(-1.0, 1.0);
    ((clamped * 32767.0) as i16, clamped != sample)
}

/// WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    sample_rate: u32,
    samples_written: u64,
    clipped: u64,
}

impl Recorder {
    /// Create a new recorder
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let writer = WavWriter::create(path, spec).map_err(|source| Error::Wav {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            sample_rate,
            samples_written: 0,
            clipped: 0,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of samples written
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Samples that had to be clamped so far
    pub fn clipped_samples(&self) -> u64 {
        self.clipped
    }

    /// Get the duration recorded in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    fn wav_error(&self, source: hound::Error) -> Error {
        Error::Wav {
            path: self.path.clone(),
            source,
        }
    }

    /// Write a single sample
    pub fn write_sample(&mut self, sample: f64) -> Result<()> {
        let (pcm, clipped) = to_pcm(sample);
        if let Err(e) = self.writer.write_sample(pcm) {
            return Err(self.wav_error(e));
        }
        self.clipped += u64::from(clipped);
        self.samples_written += 1;
        Ok(())
    }

    /// Write a buffer of samples
    pub fn write_buffer(&mut self, buffer: &[f64]) -> Result<()> {
        for &sample in buffer {
            self.write_sample(sample)?;
        }
        Ok(())
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the header.
    /// Warns once if anything was clamped.
    pub fn finalize(self) -> Result<()> {
        if self.clipped > 0 {
            log::warn!(
                "output is saturated: {} of {} samples clamped, consider lowering the gain",
                self.clipped,
                self.samples_written
            );
        }
        let path = self.path;
        self.writer
            .finalize()
            .map_err(|source| Error::Wav { path, source })
    }
}

/// Write a whole buffer to `path`, returning how many samples were clamped
pub fn write_wav(path: &Path, samples: &[f64], sample_rate: u32) -> Result<u64> {
    let mut recorder = Recorder::new(path, sample_rate)?;
    recorder.write_buffer(samples)?;
    let clipped = recorder.clipped_samples();
    recorder.finalize()?;
    Ok(clipped)
}
