use std::f64::consts::PI;

use nalgebra::DVector;

use crate::{check_output_len, validate, InputStream, Result};

/// Periodic signal shapes, all with range [-1, 1] except `DoubleSine`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// sin(2πt/T)
    Sine,
    /// Starts at 1, reaches -1 at half the period
    Triangle,
    /// -1 for the first half of the period, 1 for the second
    Square,
    /// Rises linearly from -1 to 1 over one period
    SawTooth,
    /// sin(2πt/T) + sin(πt/T)
    DoubleSine,
}

impl Waveform {
    /// Value of the waveform at `cycles = t / T`
    pub fn value(&self, cycles: f64) -> f64 {
        let frac = cycles.rem_euclid(1.0);
        match self {
            Waveform::Sine => (2.0 * PI * cycles).sin(),
            Waveform::Triangle => (4.0 * frac - 2.0).abs() - 1.0,
            Waveform::Square => 2.0 * (2.0 * frac).floor() - 1.0,
            Waveform::SawTooth => 2.0 * frac - 1.0,
            Waveform::DoubleSine => (2.0 * PI * cycles).sin() + (PI * cycles).sin(),
        }
    }
}

/// Stateless, single channel input stream following a `Waveform`
#[derive(Debug, Clone)]
pub struct WaveformStream {
    waveform: Waveform,
    period: f64,
}

impl WaveformStream {
    /// # Arguments
    /// waveform: The shape of the signal
    /// period: Duration of one cycle, in simulation time units
    pub fn new(waveform: Waveform, period: f64) -> Result<Self> {
        validate::positive_finite("period", period)?;

        Ok(Self { waveform, period })
    }

    /// The value at time `t`
    #[inline(always)]
    pub fn value(&self, t: f64) -> f64 {
        self.waveform.value(t / self.period)
    }

    /// Duration of one cycle
    #[inline(always)]
    pub fn period(&self) -> f64 {
        self.period
    }
}

impl InputStream for WaveformStream {
    #[inline(always)]
    fn size(&self) -> usize {
        1
    }

    fn get_input(&self, t: f64, out: &mut DVector<f64>) -> Result<()> {
        check_output_len("waveform input", 1, out)?;
        out.fill(self.value(t));
        Ok(())
    }
}
