use std::collections::{BTreeMap, BTreeSet};

use super::index::{Timestamped, index_at_or_before};

/// Time range a buffer is known to hold completely.
///
/// `until_ms` is exclusive and only moves when a fetch for the range
/// completes, whether or not that range contained samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferWindow {
    pub start_ms: u64,
    pub until_ms: u64,
}

impl BufferWindow {
    #[must_use]
    pub const fn anchored(anchor_ms: u64) -> Self {
        Self {
            start_ms: anchor_ms,
            until_ms: anchor_ms,
        }
    }

    #[must_use]
    pub const fn contains(&self, t: u64) -> bool {
        self.start_ms <= t && t < self.until_ms
    }

    #[must_use]
    pub const fn lookahead_ms(&self, t: u64) -> u64 {
        self.until_ms.saturating_sub(t)
    }

    /// Narrows to the range both windows cover.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            start_ms: self.start_ms.max(other.start_ms),
            until_ms: self.until_ms.min(other.until_ms),
        }
    }
}

/// Growable, time-ordered cache for one stream.
#[derive(Debug, Clone)]
pub struct StreamBuffer<T> {
    samples: Vec<T>,
    window: BufferWindow,
}

impl<T: Timestamped> StreamBuffer<T> {
    #[must_use]
    pub const fn new(anchor_ms: u64) -> Self {
        Self {
            samples: Vec::new(),
            window: BufferWindow::anchored(anchor_ms),
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    #[must_use]
    pub const fn window(&self) -> BufferWindow {
        self.window
    }

    #[must_use]
    pub const fn buffered_until(&self) -> u64 {
        self.window.until_ms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Appends a fetched batch and raises the watermark to `end_ms`.
    pub fn merge(&mut self, batch: Vec<T>, end_ms: u64) {
        append_sorted(&mut self.samples, batch);
        self.window.until_ms = self.window.until_ms.max(end_ms);
    }

    /// Marks history from `start_ms` on as complete, for batches that reach
    /// back before the buffer's anchor.
    pub fn extend_start(&mut self, start_ms: u64) {
        self.window.start_ms = self.window.start_ms.min(start_ms);
    }

    pub fn reset(&mut self, anchor_ms: u64) {
        self.samples.clear();
        self.window = BufferWindow::anchored(anchor_ms);
    }

    /// Drops samples older than `cut_ms`, keeping the newest one at or
    /// before the cut so the state at `cut_ms` stays reconstructible.
    pub fn trim_before(&mut self, cut_ms: u64) -> usize {
        let removed = trim_sorted(&mut self.samples, cut_ms);
        self.window.start_ms = self.window.start_ms.max(cut_ms).min(self.window.until_ms);
        removed
    }

    /// [`trim_before`](Self::trim_before) for a stream mixing several
    /// subjects: the newest sample at or before the cut is kept per subject.
    pub fn trim_before_per_subject<F>(&mut self, cut_ms: u64, subject: F) -> usize
    where
        F: Fn(&T) -> u32,
    {
        self.window.start_ms = self.window.start_ms.max(cut_ms).min(self.window.until_ms);
        let Some(last) = index_at_or_before(&self.samples, cut_ms, Timestamped::timestamp_ms)
        else {
            return 0;
        };
        let mut seen = BTreeSet::new();
        let mut keep: Vec<bool> = self
            .samples
            .iter()
            .take(last.saturating_add(1))
            .rev()
            .map(|sample| seen.insert(subject(sample)))
            .collect();
        keep.reverse();

        let before = self.samples.len();
        let mut flags = keep.into_iter();
        self.samples.retain(|_| flags.next().unwrap_or(true));
        before.saturating_sub(self.samples.len())
    }
}

/// One stream per subject, filled by shared fetches and therefore sharing a
/// single window.
#[derive(Debug, Clone)]
pub struct SubjectBuffers<T> {
    streams: BTreeMap<u32, Vec<T>>,
    window: BufferWindow,
}

impl<T: Timestamped> SubjectBuffers<T> {
    #[must_use]
    pub const fn new(anchor_ms: u64) -> Self {
        Self {
            streams: BTreeMap::new(),
            window: BufferWindow::anchored(anchor_ms),
        }
    }

    #[must_use]
    pub const fn window(&self) -> BufferWindow {
        self.window
    }

    #[must_use]
    pub const fn buffered_until(&self) -> u64 {
        self.window.until_ms
    }

    #[must_use]
    pub fn stream(&self, subject: u32) -> Option<&[T]> {
        self.streams.get(&subject).map(Vec::as_slice)
    }

    pub fn streams(&self) -> impl Iterator<Item = (u32, &[T])> {
        self.streams
            .iter()
            .map(|(subject, samples)| (*subject, samples.as_slice()))
    }

    pub fn subjects(&self) -> impl Iterator<Item = u32> + '_ {
        self.streams.keys().copied()
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.streams.values().map(Vec::len).sum()
    }

    /// Splits a mixed-subject batch into per-subject streams.
    pub fn merge<F>(&mut self, batch: Vec<T>, end_ms: u64, subject: F)
    where
        F: Fn(&T) -> u32,
    {
        let mut grouped: BTreeMap<u32, Vec<T>> = BTreeMap::new();
        for sample in batch {
            grouped.entry(subject(&sample)).or_default().push(sample);
        }
        for (key, samples) in grouped {
            append_sorted(self.streams.entry(key).or_default(), samples);
        }
        self.window.until_ms = self.window.until_ms.max(end_ms);
    }

    pub fn reset(&mut self, anchor_ms: u64) {
        self.streams.clear();
        self.window = BufferWindow::anchored(anchor_ms);
    }

    pub fn trim_before(&mut self, cut_ms: u64) -> usize {
        let removed = self
            .streams
            .values_mut()
            .map(|samples| trim_sorted(samples, cut_ms))
            .sum();
        self.window.start_ms = self.window.start_ms.max(cut_ms).min(self.window.until_ms);
        removed
    }
}

fn append_sorted<T: Timestamped>(samples: &mut Vec<T>, mut batch: Vec<T>) {
    if batch.is_empty() {
        return;
    }
    // Stable: ties keep arrival order, so the later sample wins lookups.
    batch.sort_by_key(Timestamped::timestamp_ms);
    let overlaps = match (samples.last(), batch.first()) {
        (Some(last), Some(first)) => first.timestamp_ms() < last.timestamp_ms(),
        _ => false,
    };
    samples.append(&mut batch);
    if overlaps {
        samples.sort_by_key(Timestamped::timestamp_ms);
    }
}

fn trim_sorted<T: Timestamped>(samples: &mut Vec<T>, cut_ms: u64) -> usize {
    match index_at_or_before(samples, cut_ms, Timestamped::timestamp_ms) {
        Some(keep_from) if keep_from > 0 => samples.drain(..keep_from).count(),
        Some(_) | None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferWindow, StreamBuffer, SubjectBuffers};
    use crate::timeline::Timestamped;

    #[derive(Debug, Clone, PartialEq)]
    struct Reading {
        at: u64,
        car: u32,
        value: u32,
    }

    impl Timestamped for Reading {
        fn timestamp_ms(&self) -> u64 {
            self.at
        }
    }

    fn reading(at: u64, car: u32, value: u32) -> Reading {
        Reading { at, car, value }
    }

    #[test]
    fn empty_batch_still_raises_watermark() {
        let mut buffer: StreamBuffer<Reading> = StreamBuffer::new(1000);
        buffer.merge(Vec::new(), 5000);
        assert!(buffer.is_empty());
        assert_eq!(buffer.buffered_until(), 5000);
        assert_eq!(buffer.window(), BufferWindow {
            start_ms: 1000,
            until_ms: 5000
        });
    }

    #[test]
    fn unsorted_batch_is_sorted_before_append() {
        let mut buffer = StreamBuffer::new(0);
        buffer.merge(vec![reading(30, 1, 3), reading(10, 1, 1), reading(20, 1, 2)], 100);
        let stamps: Vec<u64> = buffer.samples().iter().map(|r| r.at).collect();
        assert_eq!(stamps, vec![10, 20, 30]);
    }

    #[test]
    fn ties_keep_arrival_order() {
        let mut buffer = StreamBuffer::new(0);
        buffer.merge(vec![reading(10, 1, 1)], 20);
        buffer.merge(vec![reading(10, 1, 2)], 40);
        let values: Vec<u32> = buffer.samples().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn out_of_order_batch_keeps_ascending_invariant() {
        let mut buffer = StreamBuffer::new(0);
        buffer.merge(vec![reading(50, 1, 1)], 60);
        buffer.merge(vec![reading(40, 1, 2), reading(70, 1, 3)], 80);
        let stamps: Vec<u64> = buffer.samples().iter().map(|r| r.at).collect();
        assert_eq!(stamps, vec![40, 50, 70]);
    }

    #[test]
    fn trim_keeps_newest_sample_before_cut() {
        let mut buffer = StreamBuffer::new(0);
        buffer.merge(
            vec![reading(10, 1, 1), reading(20, 1, 2), reading(30, 1, 3)],
            100,
        );
        let removed = buffer.trim_before(25);
        assert_eq!(removed, 1);
        let stamps: Vec<u64> = buffer.samples().iter().map(|r| r.at).collect();
        assert_eq!(stamps, vec![20, 30]);
        assert_eq!(buffer.window().start_ms, 25);
    }

    #[test]
    fn per_subject_trim_keeps_each_subjects_latest() {
        let mut buffer = StreamBuffer::new(0);
        buffer.merge(
            vec![
                reading(10, 44, 1),
                reading(20, 1, 2),
                reading(30, 1, 3),
                reading(40, 44, 4),
                reading(60, 1, 5),
            ],
            100,
        );
        let removed = buffer.trim_before_per_subject(35, |r| r.car);
        assert_eq!(removed, 1);
        let values: Vec<u32> = buffer.samples().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1, 3, 4, 5]);
        assert_eq!(buffer.window().start_ms, 35);

        assert_eq!(buffer.trim_before_per_subject(5, |r| r.car), 0);
    }

    #[test]
    fn reset_clears_samples_and_reanchors() {
        let mut buffer = StreamBuffer::new(0);
        buffer.merge(vec![reading(10, 1, 1)], 100);
        buffer.reset(700);
        assert!(buffer.is_empty());
        assert_eq!(buffer.window(), BufferWindow::anchored(700));
    }

    #[test]
    fn subject_buffers_split_by_subject() {
        let mut buffers = SubjectBuffers::new(0);
        buffers.merge(
            vec![reading(10, 44, 1), reading(12, 1, 2), reading(20, 44, 3)],
            50,
            |r| r.car,
        );
        assert_eq!(buffers.stream(44).map(<[Reading]>::len), Some(2));
        assert_eq!(buffers.stream(1).map(<[Reading]>::len), Some(1));
        assert_eq!(buffers.stream(16), None);
        assert_eq!(buffers.subjects().collect::<Vec<_>>(), vec![1, 44]);
        assert_eq!(buffers.buffered_until(), 50);
        assert_eq!(buffers.sample_count(), 3);
    }

    #[test]
    fn window_contains_is_half_open() {
        let window = BufferWindow {
            start_ms: 100,
            until_ms: 200,
        };
        assert!(window.contains(100));
        assert!(window.contains(199));
        assert!(!window.contains(200));
        assert!(!window.contains(99));
        assert_eq!(window.lookahead_ms(150), 50);
        assert_eq!(window.lookahead_ms(250), 0);
    }
}
