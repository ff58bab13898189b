//! Microphone capture with mono mixdown and software gain.
//!
//! Audio is captured from the system's default input device (or one named in
//! the config), mixed down to mono, scaled by the gain control, and
//! accumulated as 16-bit PCM until the stream is stopped.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Audio-processing preferences requested from the host.
///
/// Whether they take effect depends on the platform's input pipeline; they
/// are logged at stream start either way.
#[derive(Debug, Clone, Copy)]
pub struct CaptureOptions {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain: true,
        }
    }
}

/// Records mono PCM audio from an input device.
///
/// Only one stream may be live per recorder: a second `start_recording`
/// without an intervening stop is rejected rather than silently stacking
/// streams.
pub struct AudioRecorder {
    /// Actual recording sample rate from the device.
    sample_rate: u32,
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active input stream, kept alive while recording.
    stream: Option<cpal::Stream>,
    is_paused: Arc<Mutex<bool>>,
    /// Software gain multiplier applied per sample.
    gain: Arc<Mutex<f32>>,
    /// Device name or "default" for the system default device.
    device_name: String,
    options: CaptureOptions,
}

impl AudioRecorder {
    /// Creates a recorder with the requested sample rate and device. The
    /// actual rate may differ based on device capabilities; call
    /// [`AudioRecorder::sample_rate`] after starting.
    pub fn new(requested_sample_rate: u32, device_name: String, options: CaptureOptions) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            is_paused: Arc::new(Mutex::new(false)),
            gain: Arc::new(Mutex::new(1.0)),
            device_name,
            options,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.stream.is_some()
    }

    /// Starts capturing from the configured input device.
    ///
    /// # Errors
    /// - If a recording session is already active
    /// - If the device is unavailable or stream creation fails
    pub fn start_recording(&mut self) -> Result<()> {
        if self.is_recording() {
            return Err(anyhow!("A recording session is already active"));
        }

        // Device lookup with ALSA library noise suppressed.
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }
        self.sample_rate = device_sample_rate;

        tracing::info!(
            "Capture started: device={}, {}Hz, {} channels, echo_cancellation={}, noise_suppression={}, auto_gain={}",
            device_name,
            device_sample_rate,
            num_channels,
            self.options.echo_cancellation,
            self.options.noise_suppression,
            self.options.auto_gain
        );

        let samples_arc = Arc::clone(&self.samples);
        let pause_arc = Arc::clone(&self.is_paused);
        let gain_arc = Arc::clone(&self.gain);

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if *pause_arc.lock().unwrap() {
                    return;
                }
                let gain = *gain_arc.lock().unwrap();
                let mut samples = samples_arc.lock().unwrap();
                mix_to_mono(data, num_channels, gain, &mut samples);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Stops the input stream and returns everything recorded.
    pub fn stop_stream(&mut self) -> Vec<i16> {
        self.stream = None;
        let samples = self.samples.lock().unwrap().clone();
        let duration_secs = samples.len() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Capture stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            samples.len(),
            self.sample_rate
        );
        samples
    }

    /// Returns a snapshot of all recorded samples.
    pub fn samples(&self) -> Vec<i16> {
        self.samples.lock().unwrap().clone()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.lock().unwrap().len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sets the software gain multiplier, clamped to 0.0..=4.0.
    pub fn set_gain(&self, gain: f32) {
        *self.gain.lock().unwrap() = gain.clamp(0.0, 4.0);
    }

    pub fn gain(&self) -> f32 {
        *self.gain.lock().unwrap()
    }

    pub fn is_paused(&self) -> bool {
        *self.is_paused.lock().unwrap()
    }

    /// Toggles between paused and recording without dropping the stream.
    pub fn toggle_pause(&self) {
        let mut paused = self.is_paused.lock().unwrap();
        *paused = !*paused;
        if *paused {
            tracing::debug!("Recording paused");
        } else {
            tracing::debug!("Recording resumed");
        }
    }
}

/// Mixes interleaved multi-channel PCM down to mono, applies gain, and
/// appends to `out`. Channels are averaged; gained samples saturate at the
/// i16 range instead of wrapping.
fn mix_to_mono(data: &[i16], num_channels: usize, gain: f32, out: &mut Vec<i16>) {
    match num_channels {
        0 => {}
        1 => {
            out.extend(data.iter().map(|&s| apply_gain(s as f32, gain)));
        }
        _ => {
            for chunk in data.chunks_exact(num_channels) {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                let mono = sum as f32 / num_channels as f32;
                out.push(apply_gain(mono, gain));
            }
        }
    }
}

fn apply_gain(sample: f32, gain: f32) -> i16 {
    (sample * gain).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Finds an audio input device by name or numeric index.
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();
        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        }
        return Err(anyhow!(
            "Device index {} is out of range (0-{})",
            index,
            devices.len().saturating_sub(1)
        ));
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;
    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'percept list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library
/// warnings on Linux. A no-op elsewhere.
#[cfg(target_os = "linux")]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;
    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

#[cfg(not(target_os = "linux"))]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough_at_unity_gain() {
        let mut out = Vec::new();
        mix_to_mono(&[1, -2, 3], 1, 1.0, &mut out);
        assert_eq!(out, vec![1, -2, 3]);
    }

    #[test]
    fn stereo_averages_channel_pairs() {
        let mut out = Vec::new();
        mix_to_mono(&[100, 200, -100, -300], 2, 1.0, &mut out);
        assert_eq!(out, vec![150, -200]);
    }

    #[test]
    fn gain_scales_and_saturates() {
        let mut out = Vec::new();
        mix_to_mono(&[1000, 30000], 1, 2.0, &mut out);
        assert_eq!(out[0], 2000);
        // 60000 clamps to the i16 ceiling rather than wrapping.
        assert_eq!(out[1], i16::MAX);
    }

    #[test]
    fn zero_gain_mutes() {
        let mut out = Vec::new();
        mix_to_mono(&[1000, -1000], 1, 0.0, &mut out);
        assert_eq!(out, vec![0, 0]);
    }

    #[test]
    fn gain_is_clamped_to_supported_range() {
        let recorder = AudioRecorder::new(16000, "default".to_string(), CaptureOptions::default());
        recorder.set_gain(10.0);
        assert_eq!(recorder.gain(), 4.0);
        recorder.set_gain(-1.0);
        assert_eq!(recorder.gain(), 0.0);
    }
}
