use super::Segment;
use std::collections::HashSet;

/// Keep the first segment for each distinct text and drop exact repeats.
///
/// Comparison is plain string equality; survivors keep their order.
pub fn dedup_segments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut seen: HashSet<String> = HashSet::with_capacity(segments.len());
    segments
        .into_iter()
        .filter(|segment| seen.insert(segment.text.clone()))
        .collect()
}
