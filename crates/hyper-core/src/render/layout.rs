use serde::{Deserialize, Serialize};

use crate::render::geometry::Rect;

/// Axis along which [`stack`] places its entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Top to bottom, full width
    #[default]
    Vertical,
    /// Left to right, full height
    Horizontal,
}

/// Place entries one after another along `direction`. Every entry gets its
/// minimum extent, leftover space is shared out evenly (earlier entries take
/// the remainder). Entries that no longer fit get an empty rect at the far
/// edge.
pub fn stack(area: Rect, direction: Direction, minimums: &[u16]) -> Vec<Rect> {
    let (start, extent) = match direction {
        Direction::Vertical => (area.y, area.height),
        Direction::Horizontal => (area.x, area.width),
    };
    distribute(start, extent, minimums)
        .into_iter()
        .map(|(offset, length)| match direction {
            Direction::Vertical => Rect::new(area.x, offset, area.width, length),
            Direction::Horizontal => Rect::new(offset, area.y, length, area.height),
        })
        .collect()
}

/// Rows top to bottom
pub fn stack_vertical(area: Rect, min_heights: &[u16]) -> Vec<Rect> {
    stack(area, Direction::Vertical, min_heights)
}

/// Columns left to right
pub fn stack_horizontal(area: Rect, min_widths: &[u16]) -> Vec<Rect> {
    stack(area, Direction::Horizontal, min_widths)
}

/// `(offset, length)` per entry along one axis starting at `start`.
fn distribute(start: u16, extent: u16, minimums: &[u16]) -> Vec<(u16, u16)> {
    if minimums.is_empty() {
        return Vec::new();
    }
    let end = start.saturating_add(extent);
    let required: u32 = minimums.iter().map(|m| u32::from(*m)).sum();
    let spare = u32::from(extent).saturating_sub(required);
    let count = minimums.len() as u32;
    let (share, mut remainder) = (spare / count, spare % count);

    let mut offset = start;
    minimums
        .iter()
        .map(|min| {
            let mut length = u32::from(*min) + share;
            if remainder > 0 {
                length += 1;
                remainder -= 1;
            }
            let available = end.saturating_sub(offset);
            let length = length.min(u32::from(available)) as u16;
            let slot = (offset, length);
            offset = offset.saturating_add(length);
            slot
        })
        .collect()
}

/// Split off the last `rows` rows as a footer.
pub fn split_footer(area: Rect, rows: u16) -> (Rect, Rect) {
    let rows = rows.min(area.height);
    let body = Rect::new(area.x, area.y, area.width, area.height - rows);
    let footer = Rect::new(area.x, area.bottom() - rows, area.width, rows);
    (body, footer)
}
