//! Byte iterator over a point's wire serialization
//!
//! Yields the 36 serialized bytes of a point (32 hash bytes, then the
//! little-endian index) one at a time, without building a buffer. Storage
//! code feeds it straight into hashers and key builders.

use crate::core::constants::POINT_WIRE_SIZE;
use crate::core::point::Point;
use std::cmp::Ordering;
use std::ops::{Add, Sub};
use std::ptr;

const HASH_END: u32 = 32;
const END: u32 = POINT_WIRE_SIZE as u32;

/// Bidirectional cursor over the serialized bytes of a borrowed point
///
/// The cursor ranges over `0..=36`; 36 is the one-past-the-end position.
/// Iterators are only comparable, and only assignable to each other, when
/// they view the same point.
///
/// Equality and ordering compare cursor positions only. The back end moved
/// by `next_back` is not part of the comparison, so equal iterators may
/// still yield different remaining sequences.
#[derive(Debug, Clone, Copy)]
pub struct PointIterator<'a> {
    point: &'a Point,
    current: u32,
    // One past the last byte still to be yielded from the back.
    back: u32,
}

impl<'a> PointIterator<'a> {
    pub fn new(point: &'a Point) -> Self {
        Self::at(point, 0)
    }

    /// Start at `offset`, clamped to the end position
    pub fn at(point: &'a Point, offset: u32) -> Self {
        Self {
            point,
            current: offset.min(END),
            back: END,
        }
    }

    pub fn point(&self) -> &'a Point {
        self.point
    }

    pub fn offset(&self) -> u32 {
        self.current
    }

    /// False at the end position
    pub fn is_valid(&self) -> bool {
        self.current < END
    }

    /// The byte under the cursor
    pub fn get(&self) -> Option<u8> {
        byte_at(self.point, self.current)
    }

    pub fn increment(&mut self) {
        self.current = (self.current + 1).min(END);
    }

    pub fn decrement(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Assign the position of another iterator over the same point
    pub fn assign(&mut self, other: &PointIterator<'a>) {
        debug_assert!(self.same_point(other), "iterators view different points");
        self.current = other.current;
        self.back = other.back;
    }

    fn same_point(&self, other: &PointIterator<'_>) -> bool {
        ptr::eq(self.point, other.point)
    }
}

/// Serialized byte of `point` at `offset`
fn byte_at(point: &Point, offset: u32) -> Option<u8> {
    if offset < HASH_END {
        Some(point.hash()[offset as usize])
    } else if offset < END {
        let shift = (offset - HASH_END) * 8;
        Some((point.index() >> shift) as u8)
    } else {
        None
    }
}

impl Add<u32> for PointIterator<'_> {
    type Output = Self;

    fn add(mut self, value: u32) -> Self {
        self.current = self.current.saturating_add(value).min(END);
        self
    }
}

impl Sub<u32> for PointIterator<'_> {
    type Output = Self;

    fn sub(mut self, value: u32) -> Self {
        self.current = self.current.saturating_sub(value);
        self
    }
}

/// Compares cursor positions
impl PartialEq for PointIterator<'_> {
    fn eq(&self, other: &Self) -> bool {
        debug_assert!(self.same_point(other), "iterators view different points");
        self.current == other.current
    }
}

impl Eq for PointIterator<'_> {}

impl PartialOrd for PointIterator<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PointIterator<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert!(self.same_point(other), "iterators view different points");
        self.current.cmp(&other.current)
    }
}

impl Iterator for PointIterator<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.current >= self.back {
            return None;
        }
        let byte = byte_at(self.point, self.current);
        self.current += 1;
        byte
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back.saturating_sub(self.current) as usize;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for PointIterator<'_> {
    fn next_back(&mut self) -> Option<u8> {
        if self.back <= self.current {
            return None;
        }
        self.back -= 1;
        byte_at(self.point, self.back)
    }
}

impl ExactSizeIterator for PointIterator<'_> {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Mode;

    fn sample_point() -> Point {
        let mut hash = [0u8; 32];
        for (i, byte) in hash.iter_mut().enumerate() {
            *byte = 0xa0 ^ i as u8;
        }
        Point::new(hash, 0xdeadbeef)
    }

    #[test]
    fn test_cursor_walk_matches_wire_bytes() {
        let point = sample_point();
        let expected = point.to_bytes(Mode::Wire);

        let mut cursor = PointIterator::new(&point);
        let mut bytes = Vec::new();
        while cursor.is_valid() {
            bytes.push(cursor.get().unwrap());
            cursor.increment();
        }

        assert_eq!(bytes, expected);
        assert_eq!(cursor.offset(), 36);
        assert_eq!(cursor.get(), None);
    }

    #[test]
    fn test_decrement_retraces_in_reverse() {
        let point = sample_point();
        let expected = point.to_bytes(Mode::Wire);

        let mut cursor = PointIterator::at(&point, 36);
        let mut bytes = Vec::new();
        while cursor.offset() > 0 {
            cursor.decrement();
            bytes.push(cursor.get().unwrap());
        }
        bytes.reverse();

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_iterator_adapters() {
        let point = sample_point();
        let expected = point.to_bytes(Mode::Wire);

        assert_eq!(point.bytes().len(), 36);
        assert_eq!(point.bytes().collect::<Vec<_>>(), expected);

        let reversed: Vec<u8> = point.bytes().rev().collect();
        let mut forward = expected.clone();
        forward.reverse();
        assert_eq!(reversed, forward);

        // Index bytes are little-endian.
        let tail: Vec<u8> = PointIterator::at(&point, 32).collect();
        assert_eq!(tail, vec![0xef, 0xbe, 0xad, 0xde]);
    }

    #[test]
    fn test_arithmetic_and_comparison() {
        let point = sample_point();
        let begin = PointIterator::new(&point);
        let end = begin + 36;

        assert!(!end.is_valid());
        assert!(begin < end);
        assert_eq!(end - 36, begin);
        assert_eq!((begin + 40).offset(), 36);
        assert_eq!((begin - 1).offset(), 0);
        assert_eq!((begin + 33).get(), Some(0xbe));

        let mut other = PointIterator::new(&point);
        other.assign(&(begin + 5));
        assert_eq!(other.offset(), 5);
    }

    #[test]
    fn test_feeds_hasher_without_buffer() {
        use sha2::{Digest, Sha256};

        let point = sample_point();
        let mut streamed = Sha256::new();
        for byte in point.bytes() {
            streamed.update([byte]);
        }

        assert_eq!(
            <[u8; 32]>::from(streamed.finalize()),
            crate::crypto::sha256(&point.to_bytes(Mode::Wire))
        );
    }

    #[test]
    fn test_equality_ignores_back_end() {
        let point = sample_point();
        let full = PointIterator::new(&point);
        let mut shortened = PointIterator::new(&point);
        shortened.next_back();

        assert_eq!(full, shortened);
        assert_eq!(full.len(), 36);
        assert_eq!(shortened.len(), 35);
    }
}
