//! Menu background rotation.
//!
//! Avoids showing one of the last few backgrounds again. The recent window is
//! persisted as a JSON array of indices; unreadable content counts as empty.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::warn;

pub const DEFAULT_RECENT_WINDOW: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundPick {
    pub index: usize,
    /// Updated recent window, oldest first.
    pub recent: Vec<usize>,
}

/// Picks a background index in `0..count` that is not in `recent`.
///
/// When every index is recent, any index is picked and the window restarts
/// from it. Returns `None` when there are no backgrounds.
pub fn pick_background<R: Rng>(
    count: usize,
    recent: &[usize],
    window: usize,
    rng: &mut R,
) -> Option<BackgroundPick> {
    if count == 0 {
        return None;
    }
    let available: Vec<usize> = (0..count).filter(|i| !recent.contains(i)).collect();

    let Some(&index) = available.choose(rng) else {
        let index = rng.gen_range(0..count);
        return Some(BackgroundPick {
            index,
            recent: vec![index],
        });
    };

    let mut updated: Vec<usize> = recent.to_vec();
    updated.push(index);
    let overflow = updated.len().saturating_sub(window.max(1));
    updated.drain(..overflow);
    Some(BackgroundPick {
        index,
        recent: updated,
    })
}

/// Parses a persisted recent window.
pub fn parse_recent(raw: Option<&str>) -> Vec<usize> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<usize>>(raw) {
        Ok(indices) => indices,
        Err(e) => {
            warn!(error = %e, "[Background] Recent image cache is corrupt, starting fresh");
            Vec::new()
        }
    }
}
