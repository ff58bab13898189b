//! Frequency-bar visualizer.
//!
//! Every frame maps the most recent audio window onto a fixed set of
//! `fft_size / 2` bars, one FFT bin per bar. Bars are recomputed from
//! scratch each frame with no smoothing or retained history; the previous
//! frame's values never influence the next.

use rustfft::{num_complex::Complex, FftPlanner};

/// Default FFT size; yields 32 bars.
pub const DEFAULT_FFT_SIZE: usize = 64;

/// One visualizer bar for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Bar height, 0.0..=100.0, linear in bin magnitude.
    pub height: f64,
    /// Hue in degrees, linear in bin magnitude.
    pub hue: f64,
}

/// Computes visualizer bars from PCM samples.
pub struct BarVisualizer {
    fft_size: usize,
    planner: FftPlanner<f32>,
}

impl BarVisualizer {
    pub fn new(fft_size: usize) -> Self {
        debug_assert!(fft_size.is_power_of_two());
        Self {
            fft_size,
            planner: FftPlanner::new(),
        }
    }

    /// Number of bars rendered each frame: half the FFT size.
    pub fn bar_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Computes this frame's bars from the most recent samples.
    ///
    /// Always returns exactly [`BarVisualizer::bar_count`] bars, zero-height
    /// when there is no (or not enough loud) audio.
    pub fn frame(&mut self, samples: &[i16]) -> Vec<Bar> {
        let magnitudes = self.bin_magnitudes(samples);
        magnitudes
            .iter()
            .map(|&m| Bar {
                height: (m as f64 * 100.0).clamp(0.0, 100.0),
                hue: 180.0 + (m as f64 * 120.0).clamp(0.0, 120.0),
            })
            .collect()
    }

    /// Normalized (0.0..=1.0) magnitude per FFT bin for the lower half of
    /// the spectrum.
    fn bin_magnitudes(&mut self, samples: &[i16]) -> Vec<f32> {
        let bins = self.bar_count();
        if samples.is_empty() {
            return vec![0.0; bins];
        }

        let window_len = samples.len().min(self.fft_size);
        let recent = &samples[samples.len() - window_len..];

        // Hanning window to reduce spectral leakage.
        let mut buffer: Vec<Complex<f32>> = recent
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let window = 0.5
                    * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / window_len as f32).cos());
                Complex::new(s as f32 * window / 32768.0, 0.0)
            })
            .collect();
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        let fft = self.planner.plan_fft_forward(self.fft_size);
        fft.process(&mut buffer);

        // A full-scale tone under a Hanning window peaks near fft_size / 4.
        let full_scale = self.fft_size as f32 / 4.0;
        buffer[..bins]
            .iter()
            .map(|c| (c.norm() / full_scale).clamp(0.0, 1.0))
            .collect()
    }
}

/// Converts a hue (degrees, full saturation and value) to RGB for bar
/// coloring.
pub fn hue_to_rgb(hue: f64) -> (u8, u8, u8) {
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq_bin: usize, fft_size: usize, amplitude: f32) -> Vec<i16> {
        (0..fft_size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * freq_bin as f32 * i as f32
                    / fft_size as f32;
                (phase.sin() * amplitude * 32767.0) as i16
            })
            .collect()
    }

    #[test]
    fn always_exactly_half_fft_size_bars() {
        let mut vis = BarVisualizer::new(64);
        assert_eq!(vis.frame(&[]).len(), 32);
        assert_eq!(vis.frame(&[0; 10]).len(), 32);
        assert_eq!(vis.frame(&tone(4, 64, 0.8)).len(), 32);
    }

    #[test]
    fn silence_renders_flat_bars() {
        let mut vis = BarVisualizer::new(64);
        for bar in vis.frame(&vec![0_i16; 64]) {
            assert_eq!(bar.height, 0.0);
            assert_eq!(bar.hue, 180.0);
        }
    }

    #[test]
    fn frames_have_no_memory() {
        let mut vis = BarVisualizer::new(64);
        let loud = tone(4, 64, 0.9);
        let first = vis.frame(&loud);
        // An intervening silent frame must not bleed into the next.
        let silent = vis.frame(&vec![0_i16; 64]);
        assert!(silent.iter().all(|b| b.height == 0.0));
        let again = vis.frame(&loud);
        assert_eq!(first, again);
    }

    #[test]
    fn tone_peaks_at_its_bin() {
        let mut vis = BarVisualizer::new(64);
        let bars = vis.frame(&tone(4, 64, 0.8));
        let peak = bars
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.height.total_cmp(&b.1.height))
            .unwrap()
            .0;
        assert_eq!(peak, 4);
        assert!(bars[4].height > 10.0);
        assert!(bars[4].hue > 180.0);
    }

    #[test]
    fn louder_audio_raises_the_bar() {
        let mut vis = BarVisualizer::new(64);
        let quiet = vis.frame(&tone(4, 64, 0.2))[4];
        let loud = vis.frame(&tone(4, 64, 0.8))[4];
        assert!(loud.height > quiet.height);
        assert!(loud.hue > quiet.hue);
    }

    #[test]
    fn hue_conversion_hits_primary_colors() {
        assert_eq!(hue_to_rgb(0.0), (255, 0, 0));
        assert_eq!(hue_to_rgb(120.0), (0, 255, 0));
        assert_eq!(hue_to_rgb(240.0), (0, 0, 255));
    }
}
