//! Backing stores a signal view can read from.

use crate::error::{HarnessError, SignalError};

/// An immutable, randomly addressable block of samples.
///
/// Implementors copy a bounded window into caller storage on request and
/// never hand out the whole buffer. Within one classification pass the
/// same `(offset, length)` must always yield the same values; a source may
/// only change what it exposes in `next_window`, which the driver calls
/// between passes.
pub trait SampleSource {
    /// Number of values the source exposes.
    fn total_length(&self) -> usize;

    /// Copy `out.len()` values starting at `offset` into `out`.
    ///
    /// Windows that do not lie inside `[0, total_length)` are rejected with
    /// `SignalError::OutOfRange` and leave `out` untouched.
    fn read_into(&self, offset: usize, out: &mut [f32]) -> Result<(), SignalError>;

    /// Move to the next block of samples.
    fn next_window(&mut self) {}
}

impl SampleSource for [f32] {
    fn total_length(&self) -> usize {
        self.len()
    }

    fn read_into(&self, offset: usize, out: &mut [f32]) -> Result<(), SignalError> {
        SignalError::check_range(offset, out.len(), self.len())?;
        out.copy_from_slice(&self[offset..offset + out.len()]);
        Ok(())
    }
}

impl<const N: usize> SampleSource for [f32; N] {
    fn total_length(&self) -> usize {
        N
    }

    fn read_into(&self, offset: usize, out: &mut [f32]) -> Result<(), SignalError> {
        self.as_slice().read_into(offset, out)
    }
}

impl SampleSource for Vec<f32> {
    fn total_length(&self) -> usize {
        self.len()
    }

    fn read_into(&self, offset: usize, out: &mut [f32]) -> Result<(), SignalError> {
        self.as_slice().read_into(offset, out)
    }
}

impl<T: SampleSource + ?Sized> SampleSource for &T {
    fn total_length(&self) -> usize {
        (**self).total_length()
    }

    fn read_into(&self, offset: usize, out: &mut [f32]) -> Result<(), SignalError> {
        (**self).read_into(offset, out)
    }
}

impl<T: SampleSource + ?Sized> SampleSource for Box<T> {
    fn total_length(&self) -> usize {
        (**self).total_length()
    }

    fn read_into(&self, offset: usize, out: &mut [f32]) -> Result<(), SignalError> {
        (**self).read_into(offset, out)
    }

    fn next_window(&mut self) {
        (**self).next_window()
    }
}

/// A frame-sized window sliding over a longer recording.
///
/// Each call to `next_window` advances the window by `stride` values. When
/// the next window would run past the end of the recording it wraps back to
/// the start, so the driver can loop over a capture indefinitely.
#[derive(Debug, Clone)]
pub struct SlidingWindow<R> {
    recording: R,
    window: usize,
    stride: usize,
    start: usize,
}

impl<R: AsRef<[f32]>> SlidingWindow<R> {
    pub fn new(recording: R, window: usize, stride: usize) -> Result<Self, HarnessError> {
        let len = recording.as_ref().len();
        if window == 0 {
            return Err(HarnessError::InvalidConfig(
                "window length must be greater than zero".to_string(),
            ));
        }
        if stride == 0 {
            return Err(HarnessError::InvalidConfig(
                "window stride must be greater than zero".to_string(),
            ));
        }
        if window > len {
            return Err(HarnessError::InvalidConfig(format!(
                "window of {window} values does not fit in a recording of {len} values"
            )));
        }

        Ok(Self {
            recording,
            window,
            stride,
            start: 0,
        })
    }

    /// Offset of the current window within the recording.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn recording_len(&self) -> usize {
        self.recording.as_ref().len()
    }
}

impl<R: AsRef<[f32]>> SampleSource for SlidingWindow<R> {
    fn total_length(&self) -> usize {
        self.window
    }

    fn read_into(&self, offset: usize, out: &mut [f32]) -> Result<(), SignalError> {
        SignalError::check_range(offset, out.len(), self.window)?;
        let begin = self.start + offset;
        out.copy_from_slice(&self.recording.as_ref()[begin..begin + out.len()]);
        Ok(())
    }

    fn next_window(&mut self) {
        let len = self.recording_len();
        self.start = match self.start.checked_add(self.stride) {
            Some(next) if next.checked_add(self.window).is_some_and(|end| end <= len) => next,
            _ => 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_read_matches_backing_values() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let mut out = [0.0; 4];
        data.read_into(3, &mut out).unwrap();
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_out_of_range_leaves_output_untouched() {
        let data = [1.0f32, 2.0, 3.0];
        let mut out = [9.0; 2];
        let err = data.read_into(2, &mut out).unwrap_err();
        assert_eq!(
            err,
            SignalError::OutOfRange {
                offset: 2,
                length: 2,
                total_length: 3
            }
        );
        assert_eq!(out, [9.0, 9.0]);
    }

    #[test]
    fn test_zero_length_read_at_end() {
        let data = [1.0f32, 2.0, 3.0];
        assert!(data.read_into(3, &mut [0.0f32; 0]).is_ok());
    }

    #[test]
    fn test_boxed_source_delegates() {
        let boxed: Box<dyn SampleSource> = Box::new(vec![1.0f32, 2.0, 3.0, 4.0]);
        assert_eq!(boxed.total_length(), 4);
        let mut out = [0.0; 2];
        boxed.read_into(2, &mut out).unwrap();
        assert_eq!(out, [3.0, 4.0]);
    }

    #[test]
    fn test_sliding_window_advances_and_wraps() {
        let recording: Vec<f32> = (0..10).map(|v| v as f32).collect();
        let mut window = SlidingWindow::new(recording, 4, 3).unwrap();
        assert_eq!(window.total_length(), 4);

        let mut out = [0.0; 4];
        window.read_into(0, &mut out).unwrap();
        assert_eq!(out, [0.0, 1.0, 2.0, 3.0]);

        window.next_window();
        assert_eq!(window.start(), 3);
        window.read_into(0, &mut out).unwrap();
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);

        window.next_window();
        assert_eq!(window.start(), 6);

        // 9 + 4 > 10, back to the start
        window.next_window();
        assert_eq!(window.start(), 0);
    }

    #[test]
    fn test_sliding_window_huge_stride_wraps_to_start() {
        let recording: Vec<f32> = (0..10).map(|v| v as f32).collect();
        let mut window = SlidingWindow::new(recording, 4, usize::MAX).unwrap();
        window.next_window();
        assert_eq!(window.start(), 0);

        let mut out = [0.0; 4];
        window.read_into(0, &mut out).unwrap();
        assert_eq!(out, [0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sliding_window_rejects_reads_past_the_window() {
        let recording = vec![0.0f32; 10];
        let mut window = SlidingWindow::new(recording, 4, 3).unwrap();
        window.next_window();
        let mut out = [0.0; 2];
        assert!(window.read_into(3, &mut out).is_err());
    }

    #[test]
    fn test_sliding_window_invalid_shapes() {
        assert!(matches!(
            SlidingWindow::new(vec![0.0f32; 3], 4, 1),
            Err(HarnessError::InvalidConfig(_))
        ));
        assert!(matches!(
            SlidingWindow::new(vec![0.0f32; 3], 3, 0),
            Err(HarnessError::InvalidConfig(_))
        ));
        assert!(matches!(
            SlidingWindow::new(vec![0.0f32; 3], 0, 1),
            Err(HarnessError::InvalidConfig(_))
        ));
    }
}
