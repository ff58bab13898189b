//! Export and MP3 encoding through the external codec.
//!
//! Recorded samples are written as a WAV file under a fixed name in the
//! working directory; MP3 export hands the WAV to ffmpeg with the configured
//! bitrate. Codec internals are deliberately out of scope.

use anyhow::{anyhow, Result};
use hound::WavWriter;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Fixed basename for exported recordings.
pub const EXPORT_BASENAME: &str = "recording";

/// Writes mono PCM samples as a WAV file.
pub fn write_wav(samples: &[i16], sample_rate: u32, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    tracing::debug!("WAV written: {}", path.display());
    Ok(())
}

/// Re-encodes a WAV file to MP3 via ffmpeg at the given bitrate.
pub fn encode_mp3(input_wav: &Path, output_path: &Path, bitrate_kbps: u32) -> Result<()> {
    let ffmpeg_path = find_ffmpeg()?;

    let output = Command::new(&ffmpeg_path)
        .args(mp3_args(input_wav, output_path, bitrate_kbps))
        .output()?;

    if !output.status.success() {
        let error_msg = String::from_utf8_lossy(&output.stderr);
        tracing::error!("ffmpeg encoding failed: {}", error_msg);
        return Err(anyhow!("MP3 encoding failed: {error_msg}"));
    }

    tracing::debug!(
        "MP3 encoded at {}kbps: {}",
        bitrate_kbps,
        output_path.display()
    );
    Ok(())
}

/// Argument list for the ffmpeg MP3 encode, mono enforced.
fn mp3_args(input_wav: &Path, output_path: &Path, bitrate_kbps: u32) -> Vec<std::ffi::OsString> {
    vec![
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input_wav.as_os_str().to_owned(),
        "-acodec".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        format!("{bitrate_kbps}k").into(),
        "-ac".into(),
        "1".into(),
        "-y".into(),
        output_path.as_os_str().to_owned(),
    ]
}

/// Exports recorded samples under the fixed export name in `dir`.
///
/// Always writes the WAV first; with `mp3` set, the WAV is re-encoded and
/// removed, leaving only the MP3. Returns the path of the exported file.
pub fn export(
    samples: &[i16],
    sample_rate: u32,
    dir: &Path,
    mp3: bool,
    bitrate_kbps: u32,
) -> Result<PathBuf> {
    if samples.is_empty() {
        return Err(anyhow!("Nothing recorded, not exporting"));
    }

    let wav_path = dir.join(format!("{EXPORT_BASENAME}.wav"));
    write_wav(samples, sample_rate, &wav_path)?;

    if !mp3 {
        return Ok(wav_path);
    }

    let mp3_path = dir.join(format!("{EXPORT_BASENAME}.mp3"));
    encode_mp3(&wav_path, &mp3_path, bitrate_kbps)?;

    if let Err(e) = std::fs::remove_file(&wav_path) {
        tracing::debug!("Failed to remove intermediate WAV: {}", e);
    }

    Ok(mp3_path)
}

/// Locates the ffmpeg binary on the system.
///
/// Checks standard installation locations per platform before falling back
/// to a PATH search, so ffmpeg is found even under a limited PATH.
pub fn find_ffmpeg() -> Result<PathBuf> {
    let candidates = if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            PathBuf::from("/usr/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/snap/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "windows") {
        vec![
            PathBuf::from("C:\\ffmpeg\\bin\\ffmpeg.exe"),
            PathBuf::from("C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe"),
        ]
    } else {
        vec![]
    };

    for path in candidates {
        if path.exists() {
            tracing::debug!("Found ffmpeg at: {}", path.display());
            return Ok(path);
        }
    }

    let search_cmd = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };
    let output = Command::new(search_cmd)
        .arg("ffmpeg")
        .output()
        .map_err(|e| anyhow!("Failed to search PATH for ffmpeg: {e}"))?;

    if output.status.success() {
        let path_str = String::from_utf8_lossy(&output.stdout);
        let path = PathBuf::from(path_str.trim());
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }

    Err(anyhow!(
        "ffmpeg not found. Please install ffmpeg:\n\
         macOS: brew install ffmpeg\n\
         Linux: apt install ffmpeg (Debian/Ubuntu) or dnf install ffmpeg (Fedora)\n\
         Windows: Download from https://ffmpeg.org/download.html"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp3_args_carry_bitrate_and_force_mono() {
        let args = mp3_args(Path::new("in.wav"), Path::new("out.mp3"), 128);
        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert!(rendered.contains(&"libmp3lame".to_string()));
        assert!(rendered.contains(&"128k".to_string()));
        let ac = rendered.iter().position(|a| a == "-ac").unwrap();
        assert_eq!(rendered[ac + 1], "1");
    }

    #[test]
    fn wav_export_uses_fixed_filename() {
        let dir = std::env::temp_dir().join(format!("percept_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = export(&[0, 1, -1], 16000, &dir, false, 128).unwrap();
        assert_eq!(path.file_name().unwrap(), "recording.wav");
        assert!(path.exists());

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.len(), 3);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn exporting_nothing_is_an_error() {
        let dir = std::env::temp_dir();
        assert!(export(&[], 16000, &dir, false, 128).is_err());
    }
}
