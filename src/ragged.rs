//! Storage for variable-length per-event object collections
//!
//! Collision events own a variable number of jets, so per-event collections
//! are "ragged". Storing every event's objects in its own Vec would mean lots
//! of small heap allocations, so instead we use an arena layout: all objects
//! live in a single flat buffer, and a table of offsets tells where each event
//! starts and ends. Every event also remembers its index in the source stream,
//! which is what identifies an event across filtered collections.
//!
//! Collections are never modified in place by the selection. Filtering,
//! truncation and concatenation all produce a new, compacted collection.

use std::ops::Range;

/// Position of an event in the source event stream
pub type EventId = usize;

/// One boolean per event, telling whether the event should be kept
pub type EventMask = Vec<bool>;

/// Ragged collection of objects, grouped by event
#[derive(Clone, Debug, PartialEq)]
pub struct Ragged<T> {
    /// Objects of all events, laid out contiguously
    items: Vec<T>,

    /// Boundaries of the events in the item buffer (has len() + 1 entries)
    offsets: Vec<usize>,

    /// Source stream position of each event
    ids: Vec<EventId>,
}
//
impl<T> Ragged<T> {
    // ### CONSTRUCTION ###

    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            offsets: vec![0],
            ids: Vec::new(),
        }
    }

    /// Create an empty collection with room for some events and objects
    pub fn with_capacity(num_events: usize, num_objects: usize) -> Self {
        let mut offsets = Vec::with_capacity(num_events + 1);
        offsets.push(0);
        Self {
            items: Vec::with_capacity(num_objects),
            offsets,
            ids: Vec::with_capacity(num_events),
        }
    }

    /// Append an event to the collection
    pub fn push_event(&mut self, id: EventId, objects: impl IntoIterator<Item = T>) {
        self.items.extend(objects);
        self.offsets.push(self.items.len());
        self.ids.push(id);
    }

    // ### QUERIES ###

    /// Number of events
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Truth that there are no events
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Total number of objects, across all events
    pub fn num_objects(&self) -> usize {
        self.items.len()
    }

    /// Range of the item buffer associated with an event
    fn range(&self, event: usize) -> Range<usize> {
        self.offsets[event]..self.offsets[event + 1]
    }

    /// Objects of one event
    pub fn event(&self, event: usize) -> &[T] {
        &self.items[self.range(event)]
    }

    /// Source stream positions of all events
    pub fn ids(&self) -> &[EventId] {
        &self.ids[..]
    }

    /// Number of objects in each event
    pub fn counts(&self) -> Vec<usize> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Iterate over the objects of each event
    pub fn iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.len()).map(move |event| self.event(event))
    }

    /// Iterate over (source position, objects) pairs
    pub fn iter_with_ids(&self) -> impl Iterator<Item = (EventId, &[T])> + '_ {
        self.ids.iter().copied().zip(self.iter())
    }

    /// Evaluate a per-event predicate, producing an event mask
    pub fn event_mask(&self, pred: impl FnMut(&[T]) -> bool) -> EventMask {
        self.iter().map(pred).collect()
    }

    /// Event mask based on the number of objects in each event
    pub fn count_mask(&self, mut pred: impl FnMut(usize) -> bool) -> EventMask {
        self.offsets.windows(2).map(|w| pred(w[1] - w[0])).collect()
    }

    // ### DERIVED COLLECTIONS ###

    /// Build a new collection with the same events, where each event's objects
    /// are derived from this collection's objects for the same event
    pub fn map_events<U, I>(&self, mut f: impl FnMut(&[T]) -> I) -> Ragged<U>
    where
        I: IntoIterator<Item = U>,
    {
        let mut result = Ragged::with_capacity(self.len(), self.num_objects());
        for (id, objects) in self.iter_with_ids() {
            result.push_event(id, f(objects));
        }
        result
    }
}

impl<T: Clone> Ragged<T> {
    /// Keep the objects which pass a per-object predicate. Events are kept,
    /// even if they end up having no object left.
    pub fn filter_objects(&self, mut pred: impl FnMut(&T) -> bool) -> Self {
        self.map_events(|objects| {
            objects
                .iter()
                .filter(|&obj| pred(obj))
                .cloned()
                .collect::<Vec<_>>()
        })
    }

    /// Like filter_objects, but the predicate also gets to see the objects of
    /// another collection's matching event (e.g. the fat jets of the event
    /// when filtering resolved jets).
    ///
    /// Both collections must hold the same events in the same order.
    ///
    pub fn filter_objects_with<U>(
        &self,
        other: &Ragged<U>,
        mut pred: impl FnMut(&T, &[U]) -> bool,
    ) -> Self {
        assert_eq!(self.ids, other.ids, "Collections must hold the same events");
        let mut result = Self::with_capacity(self.len(), self.num_objects());
        for (event, (id, objects)) in self.iter_with_ids().enumerate() {
            let context = other.event(event);
            result.push_event(id, objects.iter().filter(|&obj| pred(obj, context)).cloned());
        }
        result
    }

    /// Keep the events for which the mask is true
    pub fn select(&self, mask: &[bool]) -> Self {
        assert_eq!(mask.len(), self.len(), "Event mask has wrong length");
        let mut result = Self::new();
        for (event, &keep) in mask.iter().enumerate() {
            if keep {
                result.push_event(self.ids[event], self.event(event).iter().cloned());
            }
        }
        result
    }

    /// Extract a contiguous range of events
    pub fn slice(&self, events: Range<usize>) -> Self {
        let items = self.offsets[events.start]..self.offsets[events.end];
        Self {
            items: self.items[items.clone()].to_vec(),
            offsets: self.offsets[events.start..=events.end]
                .iter()
                .map(|&offset| offset - items.start)
                .collect(),
            ids: self.ids[events].to_vec(),
        }
    }

    /// Keep at most the first `n` objects of each event
    pub fn leading(&self, n: usize) -> Self {
        self.map_events(|objects| objects[..n.min(objects.len())].to_vec())
    }

    /// Append the events of another collection after the events of this one
    pub fn concat(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.append(other);
        result
    }

    /// In-place version of concat()
    pub fn append(&mut self, other: &Self) {
        let base = self.items.len();
        self.items.extend_from_slice(&other.items[..]);
        self.offsets
            .extend(other.offsets.iter().skip(1).map(|&offset| base + offset));
        self.ids.extend_from_slice(&other.ids[..]);
    }
}

impl<T> Default for Ragged<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(EventId, Vec<T>)> for Ragged<T> {
    fn from_iter<I: IntoIterator<Item = (EventId, Vec<T>)>>(iter: I) -> Self {
        let mut result = Self::new();
        for (id, objects) in iter {
            result.push_event(id, objects);
        }
        result
    }
}

/// Combine two event masks with a logical AND
pub fn and(mask1: &[bool], mask2: &[bool]) -> EventMask {
    assert_eq!(mask1.len(), mask2.len());
    mask1.iter().zip(mask2).map(|(&a, &b)| a && b).collect()
}

/// Combine two event masks with a logical OR
pub fn or(mask1: &[bool], mask2: &[bool]) -> EventMask {
    assert_eq!(mask1.len(), mask2.len());
    mask1.iter().zip(mask2).map(|(&a, &b)| a || b).collect()
}

/// Keep the events of `mask` which are not in `veto`
pub fn and_not(mask: &[bool], veto: &[bool]) -> EventMask {
    assert_eq!(mask.len(), veto.len());
    mask.iter().zip(veto).map(|(&a, &b)| a && !b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ragged<u32> {
        [(0, vec![1, 2, 3]), (1, vec![]), (2, vec![4, 5]), (3, vec![6])]
            .into_iter()
            .collect()
    }

    #[test]
    fn layout() {
        let r = sample();
        assert_eq!(r.len(), 4);
        assert_eq!(r.num_objects(), 6);
        assert_eq!(r.counts(), vec![3, 0, 2, 1]);
        assert_eq!(r.event(2), &[4, 5]);
        assert!(r.event(1).is_empty());
    }

    #[test]
    fn object_filter_keeps_events() {
        let r = sample().filter_objects(|&x| x % 2 == 0);
        assert_eq!(r.ids(), &[0, 1, 2, 3]);
        assert_eq!(r.counts(), vec![1, 0, 1, 1]);
        assert_eq!(r.event(3), &[6]);
    }

    #[test]
    fn event_selection_tracks_ids() {
        let r = sample();
        let sel = r.select(&r.count_mask(|n| n >= 2));
        assert_eq!(sel.ids(), &[0, 2]);
        assert_eq!(sel.event(1), &[4, 5]);
    }

    #[test]
    fn leading_truncates() {
        let r = sample().leading(2);
        assert_eq!(r.counts(), vec![2, 0, 2, 1]);
        assert_eq!(r.event(0), &[1, 2]);
    }

    #[test]
    fn slicing() {
        let r = sample().slice(1..3);
        assert_eq!(r.ids(), &[1, 2]);
        assert_eq!(r.counts(), vec![0, 2]);
        assert_eq!(r.event(1), &[4, 5]);
        assert!(sample().slice(4..4).is_empty());
    }

    #[test]
    fn concatenation() {
        let r = sample();
        let a = r.select(&[true, false, false, true]);
        let b = r.select(&[false, false, true, false]);
        let c = a.concat(&b);
        assert_eq!(c.ids(), &[0, 3, 2]);
        assert_eq!(c.event(1), &[6]);
        assert_eq!(c.event(2), &[4, 5]);
        assert_eq!(c.num_objects(), 6);
    }

    #[test]
    fn contextual_filter() {
        let r = sample();
        let thresholds: Ragged<u32> = (0..4).map(|id| (id, vec![2 * id as u32 + 1])).collect();
        let filtered = r.filter_objects_with(&thresholds, |&x, t| x > t[0]);
        assert_eq!(filtered.event(0), &[2, 3]);
        assert!(filtered.event(2).is_empty());
        assert!(filtered.event(3).is_empty());
        assert_eq!(filtered.ids(), r.ids());
    }

    #[test]
    fn mask_algebra() {
        assert_eq!(and(&[true, true, false], &[true, false, true]), vec![true, false, false]);
        assert_eq!(or(&[true, false, false], &[true, false, true]), vec![true, false, true]);
        assert_eq!(and_not(&[true, true, false], &[true, false, true]), vec![false, true, false]);
    }
}
