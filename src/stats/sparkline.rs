// src/stats/sparkline.rs
use std::collections::vec_deque;

/// Hash-rate history normalized against its own maximum
///
/// Lazy and finite: each sample is scaled only when pulled. Cloning the
/// iterator restarts it from the same position, so renderers can walk the
/// series more than once without copying the history.
#[derive(Debug, Clone)]
pub struct Sparkline<'a> {
    samples: vec_deque::Iter<'a, u32>,
    max: u32,
}

impl<'a> Sparkline<'a> {
    pub(crate) fn new(samples: vec_deque::Iter<'a, u32>) -> Self {
        let max = samples.clone().copied().max().unwrap_or(0);
        Sparkline { samples, max }
    }
}

impl Iterator for Sparkline<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let sample = *self.samples.next()?;
        if self.max == 0 {
            return Some(0);
        }
        let scaled = (f64::from(sample) / f64::from(self.max) * 100.0).round();
        Some(scaled as u8)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.samples.size_hint()
    }
}

impl ExactSizeIterator for Sparkline<'_> {}
