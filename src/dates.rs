//! Which edition dates still need archiving.
//!
//! Walks every calendar day between two bounds and drops the ones the archive
//! already holds, except for a trailing recheck window: the most recent
//! day(s) of a range can be fetched again because an edition's manifest may
//! still be gaining pages when it is first archived.

use crate::models::EditionDate;
use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Bounds and flags for one range computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: EditionDate,
    pub end: EditionDate,
    /// Move `start` forward to the latest archived date, if that is later.
    pub auto_start: bool,
    /// Include the last `recheck_days` days of the range even if archived.
    pub recheck_recent: bool,
    pub recheck_days: u32,
}

/// Dates from `start` to `end` inclusive that still need archiving,
/// ascending and without duplicates.
#[instrument(level = "info", skip_all, fields(start = %request.start, end = %request.end))]
pub fn dates_to_fetch(request: &RangeRequest, archived: &BTreeSet<EditionDate>) -> Vec<EditionDate> {
    let mut start = request.start;
    if request.auto_start {
        if let Some(latest) = archived.iter().next_back() {
            if *latest > start {
                debug!(%latest, "Auto-start from latest archived date");
                start = *latest;
            }
        }
    }

    let end = request.end.as_naive();
    let recheck_from = if request.recheck_recent && request.recheck_days > 0 {
        end.checked_sub_days(Days::new(u64::from(request.recheck_days) - 1))
            .or(Some(NaiveDate::MIN))
    } else {
        None
    };

    let dates: BTreeSet<EditionDate> = start
        .as_naive()
        .iter_days()
        .take_while(|day| *day <= end)
        .map(EditionDate::new)
        .filter(|date| {
            let recheck = recheck_from.is_some_and(|from| date.as_naive() >= from);
            recheck || !archived.contains(date)
        })
        .collect();

    debug!(count = dates.len(), "Computed dates to fetch");
    dates.into_iter().collect()
}
