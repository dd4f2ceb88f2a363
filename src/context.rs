//! Flanking-sequence extraction around an indel position

/// Default number of flanking bases on each side.
pub const DEFAULT_CONTEXT_WIDTH: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flanks {
    pub upstream: String,
    pub downstream: String,
}

/// Bases `[position - width, position)` and `[position, position + width)`.
///
/// Both windows are clamped to the sequence bounds, so a position near
/// either end yields a shorter flank instead of wrapping around.
pub fn flanks(sequence: &[u8], position: usize, width: usize) -> Flanks {
    let position = position.min(sequence.len());
    let up_start = position.saturating_sub(width);
    let down_end = position.saturating_add(width).min(sequence.len());

    Flanks {
        upstream: String::from_utf8_lossy(&sequence[up_start..position]).into_owned(),
        downstream: String::from_utf8_lossy(&sequence[position..down_end]).into_owned(),
    }
}
