use std::cmp::Ordering;
use std::str::FromStr;

use crate::records::group::GroupedCall;
use crate::records::timestamp::parse_api_timestamp;
use crate::records::CallRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Phone,
    Voice,
    ListId,
    Category,
    Timestamp,
    /// Per-stage category column in the grouped admin view.
    Stage(i64),
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortKey::Id),
            "phone" => Ok(SortKey::Phone),
            "voice" => Ok(SortKey::Voice),
            "list-id" | "list_id" => Ok(SortKey::ListId),
            "category" => Ok(SortKey::Category),
            "timestamp" => Ok(SortKey::Timestamp),
            other => match other.strip_prefix("stage").and_then(|n| n.parse().ok()) {
                Some(n) => Ok(SortKey::Stage(n)),
                None => Err(format!(
                    "unknown sort key: {other}. Use: id, phone, voice, list-id, category, timestamp, stageN"
                )),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Epoch milliseconds for timestamp comparison; unparseable sorts as 0.
fn ts_millis(raw: &str) -> i64 {
    parse_api_timestamp(raw)
        .map(|ts| ts.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Sort client-view records in place. Stable, so tied keys keep their
/// filtered order and pagination stays reproducible.
pub fn sort_records(records: &mut [CallRecord], key: SortKey, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Phone => a.phone.to_lowercase().cmp(&b.phone.to_lowercase()),
            SortKey::ListId => a.list_id.to_lowercase().cmp(&b.list_id.to_lowercase()),
            SortKey::Category => a
                .category
                .label()
                .to_lowercase()
                .cmp(&b.category.label().to_lowercase()),
            SortKey::Timestamp => ts_millis(&a.timestamp).cmp(&ts_millis(&b.timestamp)),
            // Id is also the fallback for keys this view doesn't have.
            SortKey::Id | SortKey::Voice | SortKey::Stage(_) => a.id.cmp(&b.id),
        };
        directed(ordering, direction)
    });
}

/// Sort grouped admin-view calls in place. A missing stage compares as the
/// empty string, so it sorts first ascending.
pub fn sort_grouped(calls: &mut [GroupedCall], key: SortKey, direction: SortDirection) {
    calls.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Phone => a.number.to_lowercase().cmp(&b.number.to_lowercase()),
            SortKey::Voice => a.voice.to_lowercase().cmp(&b.voice.to_lowercase()),
            SortKey::ListId => a.list_id.to_lowercase().cmp(&b.list_id.to_lowercase()),
            SortKey::Timestamp => {
                ts_millis(&a.first_timestamp).cmp(&ts_millis(&b.first_timestamp))
            }
            SortKey::Stage(n) => stage_category(a, n).cmp(&stage_category(b, n)),
            SortKey::Id | SortKey::Category => a.id.cmp(&b.id),
        };
        directed(ordering, direction)
    });
}

fn stage_category(call: &GroupedCall, stage: i64) -> String {
    call.stage(stage)
        .map(|s| s.category.to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RawCall;
    use crate::records::group::group_by_number;
    use crate::records::{normalize_call, test_raw_call, CategoryPalette};

    fn record(id: i64, phone: &str, category: &str, ts: &str) -> CallRecord {
        let palette = CategoryPalette::from_api(&[]);
        normalize_call(
            &test_raw_call(id, phone, Some(category), Some(ts)),
            &palette,
        )
    }

    #[test]
    fn sort_key_parses_dynamic_stage_columns() {
        assert_eq!("stage3".parse::<SortKey>(), Ok(SortKey::Stage(3)));
        assert_eq!("timestamp".parse::<SortKey>(), Ok(SortKey::Timestamp));
        assert!("stageX".parse::<SortKey>().is_err());
    }

    #[test]
    fn timestamp_sort_orders_chronologically() {
        let mut records = vec![
            record(1, "+1", "Qualified", "12/15/2025, 18:08:24"),
            record(2, "+1", "Qualified", "12/15/2025, 09:00:00"),
            record(3, "+1", "Qualified", "1/2/2026, 00:00:00"),
        ];
        sort_records(&mut records, SortKey::Timestamp, SortDirection::Ascending);
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        sort_records(&mut records, SortKey::Timestamp, SortDirection::Descending);
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn ties_keep_prior_order() {
        let mut records = vec![
            record(2, "+1", "Qualified", "12/15/2025, 09:00:00"),
            record(1, "+1", "Qualified", "12/15/2025, 09:00:00"),
            record(3, "+1", "Qualified", "12/15/2025, 09:00:00"),
        ];
        sort_records(&mut records, SortKey::Category, SortDirection::Ascending);
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    fn staged(id: i64, number: &str, stage: i64, category: &str) -> RawCall {
        RawCall {
            id,
            number: number.into(),
            list_id: "1".into(),
            category: Some(category.into()),
            category_color: None,
            voice: None,
            timestamp: None,
            transcription: None,
            stage: Some(stage),
        }
    }

    #[test]
    fn missing_stage_sorts_first_ascending() {
        let calls = vec![
            staged(1, "+15550000001", 2, "Zeta"),
            staged(2, "+15550000002", 1, "Alpha"),
            staged(3, "+15550000003", 2, "Alpha"),
        ];
        let mut grouped = group_by_number(&calls).calls;
        sort_grouped(&mut grouped, SortKey::Stage(2), SortDirection::Ascending);
        let ids: Vec<i64> = grouped.iter().map(|c| c.id).collect();
        // id 2 has no stage 2 (empty string), then Alpha, then Zeta.
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
