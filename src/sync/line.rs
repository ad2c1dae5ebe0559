use crate::lyrics::LyricLine;

/// Index of the line to show at `progress_ms`.
///
/// Scans from the top every time, so seeks in either direction land on the
/// right line. The first line whose interval contains the position wins;
/// otherwise the last line that has already started; a position before the
/// first line selects line 0. `None` only when there are no lines.
pub fn active_line_index(lines: &[LyricLine], progress_ms: u64) -> Option<usize> {
    if lines.is_empty() {
        return None;
    }

    let mut fallback = 0;
    for (i, line) in lines.iter().enumerate() {
        if line.contains(progress_ms) {
            return Some(i);
        }
        if line.start_ms > progress_ms {
            break;
        }
        fallback = i;
    }
    Some(fallback)
}
