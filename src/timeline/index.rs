/// A value ordered on the replay timeline by a millisecond timestamp.
pub trait Timestamped {
    fn timestamp_ms(&self) -> u64;
}

/// Returns the index of the last sample whose timestamp is `<= t`.
///
/// `samples` must be sorted ascending by `timestamp`. Duplicate timestamps
/// resolve to the last one in slice order. Returns `None` for an empty slice
/// or when every sample lies after `t`.
pub fn index_at_or_before<T, F>(samples: &[T], t: u64, timestamp: F) -> Option<usize>
where
    F: Fn(&T) -> u64,
{
    samples
        .partition_point(|sample| timestamp(sample) <= t)
        .checked_sub(1)
}

#[must_use]
pub fn latest_at_or_before<T: Timestamped>(samples: &[T], t: u64) -> Option<&T> {
    index_at_or_before(samples, t, Timestamped::timestamp_ms).and_then(|idx| samples.get(idx))
}
