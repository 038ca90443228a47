//! Codebook delay pattern.
//!
//! MusicGen predicts its codebooks in parallel but offset in time: codebook
//! `i` lags codebook 0 by `i` steps. Decoder inputs therefore carry padding
//! for codebooks that have not started yet, and finished frames are read
//! back along the diagonal.
//!
//! ```text
//! step        0 1 2 3 4 5
//! codebook 0  x x x x x x
//! codebook 1  P x x x x x
//! codebook 2  P P x x x x
//! codebook 3  P P P x x x
//! ```

/// Sampled codes for every step, one array of `N` codebooks per step.
#[derive(Debug, Default)]
pub struct DelayedCodes<const N: usize> {
    steps: Vec<[i64; N]>,
}

impl<const N: usize> DelayedCodes<N> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Records the codes sampled at the current step.
    pub fn push(&mut self, codes: [i64; N]) {
        self.steps.push(codes);
    }

    /// Returns the decoder input for the next step.
    ///
    /// Codebook `i` is replaced by `pad_token_id` until more than `i` steps
    /// have been recorded.
    pub fn next_input(&self, pad_token_id: i64) -> [i64; N] {
        let mut input = [pad_token_id; N];
        if let Some(last) = self.steps.last() {
            for (i, slot) in input.iter_mut().enumerate() {
                if self.steps.len() > i {
                    *slot = last[i];
                }
            }
        }
        input
    }

    /// Returns the most recent complete frame, read along the diagonal.
    ///
    /// `None` until `N` steps have been recorded.
    pub fn last_aligned(&self) -> Option<[i64; N]> {
        let len = self.steps.len();
        if len < N {
            return None;
        }
        let mut frame = [0; N];
        for (i, slot) in frame.iter_mut().enumerate() {
            *slot = self.steps[len - N + i][i];
        }
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAD: i64 = 2048;

    #[test]
    fn padding_lifts_one_codebook_per_step() {
        let mut codes = DelayedCodes::<4>::new();
        assert_eq!(codes.next_input(PAD), [PAD; 4]);

        codes.push([1, 2, 3, 4]);
        assert_eq!(codes.next_input(PAD), [1, PAD, PAD, PAD]);
        codes.push([5, 6, 7, 8]);
        assert_eq!(codes.next_input(PAD), [5, 6, PAD, PAD]);
        codes.push([9, 10, 11, 12]);
        assert_eq!(codes.next_input(PAD), [9, 10, 11, PAD]);
        codes.push([13, 14, 15, 16]);
        assert_eq!(codes.next_input(PAD), [13, 14, 15, 16]);
    }

    #[test]
    fn aligned_frames_follow_the_diagonal() {
        let mut codes = DelayedCodes::<4>::new();
        for step in 0..3 {
            codes.push([step * 4 + 1, step * 4 + 2, step * 4 + 3, step * 4 + 4]);
            assert_eq!(codes.last_aligned(), None);
        }
        codes.push([13, 14, 15, 16]);
        assert_eq!(codes.last_aligned(), Some([1, 6, 11, 16]));
        codes.push([17, 18, 19, 20]);
        assert_eq!(codes.last_aligned(), Some([5, 10, 15, 20]));
    }
}
