use super::index::{Timestamped, index_at_or_before};

/// Samples that can be blended between two bracketing readings.
///
/// Implementations blend continuous fields with [`lerp`] and copy discrete
/// fields (gear, flags, identity) from `self`, the earlier sample.
pub trait Interpolate: Timestamped + Clone {
    fn blend(&self, next: &Self, ratio: f64, at_ms: u64) -> Self;
}

#[must_use]
pub fn lerp(from: f64, to: f64, ratio: f64) -> f64 {
    from + (to - from) * ratio
}

/// Blends `prev` toward `next` at instant `t`.
///
/// Without a `next` sample, or when both share a timestamp, `prev` is
/// returned unchanged: the last known state holds and nothing is
/// extrapolated.
pub fn interpolate_between<T: Interpolate>(prev: &T, next: Option<&T>, t: u64) -> T {
    let Some(next) = next else {
        return prev.clone();
    };
    let prev_ms = prev.timestamp_ms();
    let span_ms = next.timestamp_ms().saturating_sub(prev_ms);
    if span_ms == 0 {
        return prev.clone();
    }
    let offset_ms = t.saturating_sub(prev_ms).min(span_ms);
    let ratio = offset_ms as f64 / span_ms as f64;
    prev.blend(next, ratio, t)
}

/// Bracket-and-blend lookup over a sorted stream.
///
/// Returns `None` when no sample exists at or before `t`.
pub fn interpolate_at<T: Interpolate>(samples: &[T], t: u64) -> Option<T> {
    let idx = index_at_or_before(samples, t, Timestamped::timestamp_ms)?;
    let prev = samples.get(idx)?;
    let next = idx.checked_add(1).and_then(|next_idx| samples.get(next_idx));
    Some(interpolate_between(prev, next, t))
}
