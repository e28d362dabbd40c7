//! Stitches marching-squares segments into ordered polylines.
//!
//! Contours are kept in an arena of point buffers indexed by creation order,
//! with two hash maps from endpoint coordinate to arena index: one for
//! contours starting at a point, one for contours ending there. When a merge
//! joins two contours the one created first survives, which makes the output
//! ordering deterministic (top-to-bottom, left-to-right) regardless of how
//! ambiguous segments were emitted.

use std::collections::{HashMap, VecDeque};

use crate::march::Segment;

// Endpoint coordinates come out of the interpolation bitwise identical
// between neighboring cells, so raw bit patterns are usable as keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PointKey([u64; 2]);

impl PointKey {
    fn of(point: [f64; 2]) -> Self {
        Self([point[0].to_bits(), point[1].to_bits()])
    }
}

/// Assembles an unordered stream of oriented segments into polylines.
///
/// Every non-degenerate input segment belongs to exactly one output polyline;
/// closed loops repeat their first point at the end. Contours are returned in
/// creation order.
pub fn assemble_contours(segments: &[Segment]) -> Vec<Vec<[f64; 2]>> {
    let mut arena: Vec<Option<VecDeque<[f64; 2]>>> = Vec::new();
    let mut starts: HashMap<PointKey, usize> = HashMap::new();
    let mut ends: HashMap<PointKey, usize> = HashMap::new();

    for segment in segments {
        // Degenerate segments appear when one vertex of a cell sits exactly
        // at the contour level; neighboring cells pick the point up instead.
        if segment.from == segment.to {
            continue;
        }
        let from_key = PointKey::of(segment.from);
        let to_key = PointKey::of(segment.to);

        let tail = starts.remove(&to_key);
        let head = ends.remove(&from_key);

        match (head, tail) {
            (Some(head_idx), Some(tail_idx)) if head_idx == tail_idx => {
                // Loop complete: close the contour with the shared point.
                arena[head_idx]
                    .as_mut()
                    .expect("closed contour buffer present")
                    .push_back(segment.to);
            }
            (Some(head_idx), Some(tail_idx)) => {
                if tail_idx > head_idx {
                    // Tail was created second; append it onto the head.
                    let tail_buf = arena[tail_idx].take().expect("tail buffer present");
                    let head_buf = arena[head_idx].as_mut().expect("head buffer present");
                    head_buf.extend(tail_buf);
                    starts.insert(PointKey::of(*head_buf.front().unwrap()), head_idx);
                    ends.insert(PointKey::of(*head_buf.back().unwrap()), head_idx);
                } else {
                    // Head was created second; prepend it to the tail.
                    let head_buf = arena[head_idx].take().expect("head buffer present");
                    let head_front = *head_buf.front().unwrap();
                    let tail_buf = arena[tail_idx].as_mut().expect("tail buffer present");
                    for point in head_buf.into_iter().rev() {
                        tail_buf.push_front(point);
                    }
                    // The head's old start entry may already be gone when its
                    // first point is the segment's `to` point.
                    starts.remove(&PointKey::of(head_front));
                    starts.insert(PointKey::of(*tail_buf.front().unwrap()), tail_idx);
                    ends.insert(PointKey::of(*tail_buf.back().unwrap()), tail_idx);
                }
            }
            (Some(head_idx), None) => {
                // A contour ends at `from`: append.
                arena[head_idx]
                    .as_mut()
                    .expect("head buffer present")
                    .push_back(segment.to);
                ends.insert(to_key, head_idx);
            }
            (None, Some(tail_idx)) => {
                // A contour starts at `to`: prepend.
                arena[tail_idx]
                    .as_mut()
                    .expect("tail buffer present")
                    .push_front(segment.from);
                starts.insert(from_key, tail_idx);
            }
            (None, None) => {
                let index = arena.len();
                let mut contour = VecDeque::with_capacity(2);
                contour.push_back(segment.from);
                contour.push_back(segment.to);
                arena.push(Some(contour));
                starts.insert(from_key, index);
                ends.insert(to_key, index);
            }
        }
    }

    arena
        .into_iter()
        .flatten()
        .map(|contour| contour.into_iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(from: [f64; 2], to: [f64; 2]) -> Segment {
        Segment { from, to }
    }

    #[test]
    fn chains_segments_in_any_order() {
        let segments = [
            seg([2.0, 0.0], [3.0, 0.0]),
            seg([0.0, 0.0], [1.0, 0.0]),
            seg([1.0, 0.0], [2.0, 0.0]),
        ];
        let contours = assemble_contours(&segments);
        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0],
            vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]
        );
    }

    #[test]
    fn closes_loops_with_repeated_first_point() {
        let segments = [
            seg([0.0, 0.0], [0.0, 1.0]),
            seg([0.0, 1.0], [1.0, 1.0]),
            seg([1.0, 1.0], [1.0, 0.0]),
            seg([1.0, 0.0], [0.0, 0.0]),
        ];
        let contours = assemble_contours(&segments);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 5);
        assert_eq!(contours[0].first(), contours[0].last());
    }

    #[test]
    fn drops_degenerate_segments() {
        let segments = [seg([0.5, 0.5], [0.5, 0.5])];
        assert!(assemble_contours(&segments).is_empty());
    }

    #[test]
    fn splice_keeps_first_created_contour() {
        // Two contours grown separately, then joined by a bridge segment.
        let segments = [
            seg([0.0, 0.0], [1.0, 0.0]),
            seg([5.0, 0.0], [6.0, 0.0]),
            seg([1.0, 0.0], [5.0, 0.0]),
        ];
        let contours = assemble_contours(&segments);
        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0],
            vec![[0.0, 0.0], [1.0, 0.0], [5.0, 0.0], [6.0, 0.0]]
        );
    }

    #[test]
    fn independent_contours_keep_creation_order() {
        let segments = [
            seg([0.0, 0.0], [0.0, 1.0]),
            seg([9.0, 9.0], [9.0, 8.0]),
            seg([0.0, 1.0], [0.0, 2.0]),
            seg([9.0, 8.0], [9.0, 7.0]),
        ];
        let contours = assemble_contours(&segments);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0][0], [0.0, 0.0]);
        assert_eq!(contours[1][0], [9.0, 9.0]);
    }
}
