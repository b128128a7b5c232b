use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::tracked_link::ScanEvent;

pub const RECENT_SCANS: usize = 10;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub total_scans: u64,
    /// Newest first.
    pub recent_scans: Vec<ScanEvent>,
    /// UTC calendar day (`YYYY-MM-DD`) to scan count. Days without scans are absent.
    pub scans_by_day: BTreeMap<String, u64>,
    pub last_scan: Option<i64>,
}

fn day_of(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "invalid".to_string())
}

/// Summarize a chronologically ordered scan log.
pub fn summarize(scan_log: &[ScanEvent]) -> ScanStats {
    let mut scans_by_day = BTreeMap::new();
    for scan in scan_log {
        *scans_by_day.entry(day_of(scan.timestamp)).or_insert(0) += 1;
    }

    let recent_from = scan_log.len().saturating_sub(RECENT_SCANS);
    let recent_scans = scan_log[recent_from..].iter().rev().cloned().collect();

    ScanStats {
        total_scans: scan_log.len() as u64,
        recent_scans,
        scans_by_day,
        last_scan: scan_log.last().map(|s| s.timestamp),
    }
}
