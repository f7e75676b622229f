mod movie;
mod schedule;

pub use movie::MovieStore;
pub use schedule::ScheduleStore;

/// Largest offset or limit SQLite accepts as a bound integer.
const MAX_WINDOW: u64 = i64::MAX as u64;

/// `(offset, limit)` for a 1-based `page`. Pages below 1 read as the first
/// page. `None` means the window starts past any row the store can hold.
fn page_window(page: u64, page_size: u64) -> Option<(u64, u64)> {
    let offset = page.max(1).saturating_sub(1).checked_mul(page_size)?;
    if offset > MAX_WINDOW {
        return None;
    }
    Some((offset, page_size.min(MAX_WINDOW)))
}

#[cfg(test)]
mod tests {
    use super::{MAX_WINDOW, page_window};

    #[test]
    fn offsets_are_one_based() {
        assert_eq!(page_window(1, 10), Some((0, 10)));
        assert_eq!(page_window(3, 10), Some((20, 10)));
        assert_eq!(page_window(0, 10), Some((0, 10)));
    }

    #[test]
    fn oversized_windows_are_clamped_or_empty() {
        assert_eq!(page_window(1, u64::MAX), Some((0, MAX_WINDOW)));
        assert_eq!(page_window(u64::MAX, 10), None);
        assert_eq!(page_window(MAX_WINDOW, 10), None);
        assert_eq!(page_window(2, MAX_WINDOW), Some((MAX_WINDOW, MAX_WINDOW)));
    }
}
