//! Configuration file management.
//!
//! Loads and saves the TOML configuration from the user's config directory.
//! Missing files fall back to defaults so every subcommand works out of the
//! box.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::capture::camera::FacingMode;

/// Camera and face-sensor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Initial camera facing.
    #[serde(default)]
    pub facing: FacingMode,
    /// Requested frame width in pixels.
    #[serde(default = "default_frame_width")]
    pub width: u32,
    /// Requested frame height in pixels.
    #[serde(default = "default_frame_height")]
    pub height: u32,
    /// Maximum faces reported per frame.
    #[serde(default = "default_max_faces")]
    pub max_faces: usize,
    /// Minimum detection confidence, 0.0..=1.0.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

fn default_frame_width() -> u32 {
    640
}

fn default_frame_height() -> u32 {
    480
}

fn default_max_faces() -> usize {
    10
}

fn default_min_confidence() -> f32 {
    0.5
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::default(),
            width: default_frame_width(),
            height: default_frame_height(),
            max_faces: default_max_faces(),
            min_confidence: default_min_confidence(),
        }
    }
}

/// Audio capture, gain, and export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device: "default", a numeric index, or a device name from
    /// `percept list-devices`.
    #[serde(default = "default_device")]
    pub device: String,
    /// Recording sample rate in Hz (actual rate may follow the device).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Software gain multiplier applied during capture.
    #[serde(default = "default_gain")]
    pub gain: f32,
    #[serde(default = "default_true")]
    pub echo_cancellation: bool,
    #[serde(default = "default_true")]
    pub noise_suppression: bool,
    #[serde(default = "default_true")]
    pub auto_gain: bool,
    /// Bitrate for MP3 export in kbps.
    #[serde(default = "default_mp3_bitrate")]
    pub mp3_bitrate_kbps: u32,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_gain() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_mp3_bitrate() -> u32 {
    128
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            gain: default_gain(),
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain: true,
            mp3_bitrate_kbps: default_mp3_bitrate(),
        }
    }
}

/// Speech recognition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Fixed recognition language (ISO 639-1).
    #[serde(default = "default_language")]
    pub language: String,
    /// Model name sent to the transcription endpoint.
    #[serde(default = "default_model")]
    pub model: String,
    /// Transcription endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_language() -> String {
    "ja".to_string()
}

fn default_model() -> String {
    "whisper-1".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/audio/transcriptions".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerceptConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl PerceptConfig {
    /// Loads configuration, falling back to defaults when the file does not
    /// exist yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If an existing file cannot be read or is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&config_path)?;
        let config: PerceptConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the user's config directory.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Path to the config file, creating the directory if needed.
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    let config_dir = home.join(".config").join("percept");
    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("percept.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: PerceptConfig = toml::from_str("").unwrap();
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.camera.max_faces, 10);
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.gain, 1.0);
        assert!(config.audio.echo_cancellation);
        assert_eq!(config.speech.language, "ja");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: PerceptConfig = toml::from_str(
            r#"
            [camera]
            facing = "environment"

            [audio]
            gain = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.camera.facing, FacingMode::Environment);
        assert_eq!(config.camera.height, 480);
        assert_eq!(config.audio.gain, 2.0);
        assert_eq!(config.audio.mp3_bitrate_kbps, 128);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = PerceptConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let back: PerceptConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(back.camera.min_confidence, config.camera.min_confidence);
        assert_eq!(back.speech.endpoint, config.speech.endpoint);
    }
}
