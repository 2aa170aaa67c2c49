// src/cardio/mod.rs
//! Sliding-window heart-rate / SpO2 estimation
//!
//! [`CardioWindow`] keeps two parallel circular buffers of raw red and
//! infrared PPG intensities and exposes the shift-by-25 refresh discipline
//! of the reference: a cold start fills all 100 slots, and each refresh
//! cycle discards the oldest 25 and appends 25 fresh samples before the
//! kernel is re-invoked on the full window.
//!
//! The numerical kernel itself is a vendor primitive and binds at the
//! [`CardioKernel`] seam; this crate only specifies how the window is fed
//! and how the estimate is consumed.

use crate::config::constants::cardio::{REFRESH_SIZE, WINDOW_SIZE};
use crate::hal::PpgSample;

/// Output of one kernel invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardioEstimate {
    /// Heart rate in BPM
    pub heart_rate: i32,
    pub heart_rate_valid: bool,
    /// Oxygen saturation in percent
    pub spo2: i32,
    pub spo2_valid: bool,
}

/// Seam for the external HR/SpO2 numerical kernel.
///
/// The slices are the full window, infrared first to match the vendor
/// export's argument order.
pub trait CardioKernel: Send {
    fn estimate(&mut self, ir: &[u32], red: &[u32]) -> CardioEstimate;
}

/// Kernel double returning a fixed estimate; used by tests and demos
/// where the vendor kernel is not linked in.
#[derive(Debug, Clone)]
pub struct StaticKernel {
    pub estimate: CardioEstimate,
}

impl StaticKernel {
    pub fn new(heart_rate: i32, spo2: i32) -> Self {
        Self {
            estimate: CardioEstimate {
                heart_rate,
                heart_rate_valid: true,
                spo2,
                spo2_valid: true,
            },
        }
    }
}

impl CardioKernel for StaticKernel {
    fn estimate(&mut self, _ir: &[u32], _red: &[u32]) -> CardioEstimate {
        self.estimate
    }
}

/// Two parallel fixed-size sample windows with shift-by-`REFRESH_SIZE`
/// refresh. Owned exclusively by the cardio acquisition task; unshared,
/// so no locking.
pub struct CardioWindow {
    red: [u32; WINDOW_SIZE],
    ir: [u32; WINDOW_SIZE],
    filled: usize,
}

impl CardioWindow {
    pub fn new() -> Self {
        Self {
            red: [0; WINDOW_SIZE],
            ir: [0; WINDOW_SIZE],
            filled: 0,
        }
    }

    /// Append one sample pair; returns false when the window is already full
    pub fn push(&mut self, sample: PpgSample) -> bool {
        if self.filled >= WINDOW_SIZE {
            return false;
        }
        self.red[self.filled] = sample.red;
        self.ir[self.filled] = sample.ir;
        self.filled += 1;
        true
    }

    /// True once all `WINDOW_SIZE` slots hold samples
    pub fn is_full(&self) -> bool {
        self.filled == WINDOW_SIZE
    }

    /// Samples still needed before the window is full
    pub fn remaining(&self) -> usize {
        WINDOW_SIZE - self.filled
    }

    /// Discard the oldest `REFRESH_SIZE` samples, shifting the rest to the
    /// front and opening `REFRESH_SIZE` tail slots for fresh samples.
    pub fn shift(&mut self) {
        debug_assert!(self.is_full(), "shift on a partially filled window");
        self.red.copy_within(REFRESH_SIZE..WINDOW_SIZE, 0);
        self.ir.copy_within(REFRESH_SIZE..WINDOW_SIZE, 0);
        self.filled = WINDOW_SIZE - REFRESH_SIZE;
    }

    /// Invoke the kernel on the full window
    pub fn estimate(&self, kernel: &mut dyn CardioKernel) -> CardioEstimate {
        kernel.estimate(&self.ir, &self.red)
    }

    pub fn red(&self) -> &[u32; WINDOW_SIZE] {
        &self.red
    }

    pub fn ir(&self) -> &[u32; WINDOW_SIZE] {
        &self.ir
    }
}

impl Default for CardioWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(v: u32) -> PpgSample {
        PpgSample { red: v, ir: v + 1000 }
    }

    fn fill_incrementing(window: &mut CardioWindow, start: u32) -> u32 {
        let mut v = start;
        while !window.is_full() {
            assert!(window.push(sample(v)));
            v += 1;
        }
        v
    }

    #[test]
    fn test_fill_to_capacity() {
        let mut w = CardioWindow::new();
        assert_eq!(w.remaining(), WINDOW_SIZE);

        fill_incrementing(&mut w, 0);
        assert!(w.is_full());
        assert!(!w.push(sample(999)));
        assert_eq!(w.red()[0], 0);
        assert_eq!(w.red()[WINDOW_SIZE - 1], (WINDOW_SIZE - 1) as u32);
    }

    #[test]
    fn test_shift_retains_tail_as_head() {
        let mut w = CardioWindow::new();
        let next = fill_incrementing(&mut w, 0);

        w.shift();
        assert_eq!(w.remaining(), REFRESH_SIZE);

        // Previous samples [25..99] are now [0..74]
        for i in 0..WINDOW_SIZE - REFRESH_SIZE {
            assert_eq!(w.red()[i], (i + REFRESH_SIZE) as u32);
            assert_eq!(w.ir()[i], (i + REFRESH_SIZE) as u32 + 1000);
        }

        // Refill the tail with 25 fresh samples
        for v in next..next + REFRESH_SIZE as u32 {
            assert!(w.push(sample(v)));
        }
        assert!(w.is_full());
        assert_eq!(w.red()[WINDOW_SIZE - 1], next + REFRESH_SIZE as u32 - 1);
    }

    #[test]
    fn test_kernel_receives_full_window() {
        struct CountingKernel {
            len_seen: usize,
        }
        impl CardioKernel for CountingKernel {
            fn estimate(&mut self, ir: &[u32], red: &[u32]) -> CardioEstimate {
                assert_eq!(ir.len(), red.len());
                self.len_seen = ir.len();
                CardioEstimate {
                    heart_rate: 0,
                    heart_rate_valid: false,
                    spo2: 0,
                    spo2_valid: false,
                }
            }
        }

        let mut w = CardioWindow::new();
        fill_incrementing(&mut w, 0);

        let mut kernel = CountingKernel { len_seen: 0 };
        w.estimate(&mut kernel);
        assert_eq!(kernel.len_seen, WINDOW_SIZE);
    }

    #[test]
    fn test_static_kernel() {
        let mut kernel = StaticKernel::new(72, 98);
        let est = kernel.estimate(&[0; 4], &[0; 4]);
        assert_eq!(est.heart_rate, 72);
        assert!(est.heart_rate_valid);
        assert_eq!(est.spo2, 98);
        assert!(est.spo2_valid);
    }
}
