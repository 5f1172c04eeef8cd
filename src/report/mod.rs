pub mod outcomes;
pub mod page;
pub mod series;
pub mod sort;

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Duration, Local, NaiveDateTime};

use crate::records::category::Category;
use crate::records::group::GroupedCall;
use crate::records::timestamp::{end_of_day, parse_api_timestamp, parse_filter_date};
use crate::records::CallRecord;

/// Named quick time ranges from the dashboard dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    LastFiveMinutes,
    LastFifteenMinutes,
    LastHour,
    Today,
}

impl FromStr for QuickRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5m" => Ok(QuickRange::LastFiveMinutes),
            "15m" => Ok(QuickRange::LastFifteenMinutes),
            "1h" => Ok(QuickRange::LastHour),
            "today" => Ok(QuickRange::Today),
            _ => Err(format!("unknown time range: {s}. Use: 5m, 15m, 1h, today")),
        }
    }
}

/// What "now" means for a quick range. The dashboards disagreed on this, so
/// both behaviors survive as explicit modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    /// Wall-clock time at evaluation.
    #[default]
    WallClock,
    /// The most recent record timestamp in the set being filtered.
    LatestRecord,
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "now" => Ok(Anchor::WallClock),
            "latest" => Ok(Anchor::LatestRecord),
            _ => Err(format!("unknown anchor: {s}. Use: now, latest")),
        }
    }
}

/// Active filter state for the flat (client) record view. All predicates
/// are conjunctive: a record must pass every active one.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub search: Option<String>,
    pub list_id: Option<String>,
    pub outcomes: Vec<Category>,
    /// `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// `HH:MM`, applied to `start_date`.
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub quick_range: Option<QuickRange>,
    pub anchor: Anchor,
}

impl Filters {
    fn has_date_filter(&self) -> bool {
        self.start_date.is_some() || self.quick_range.is_some()
    }

    /// Resolve the quick-range anchor instant for a record set.
    pub fn resolve_anchor(&self, records: &[CallRecord]) -> NaiveDateTime {
        match self.anchor {
            Anchor::WallClock => Local::now().naive_local(),
            Anchor::LatestRecord => records
                .iter()
                .filter_map(|r| parse_api_timestamp(&r.timestamp))
                .max()
                .unwrap_or_else(|| Local::now().naive_local()),
        }
    }

    /// Apply every active predicate, preserving input order.
    pub fn apply(&self, records: &[CallRecord]) -> Vec<CallRecord> {
        let now = self.resolve_anchor(records);
        records
            .iter()
            .filter(|r| self.matches(r, now))
            .cloned()
            .collect()
    }

    pub fn matches(&self, record: &CallRecord, now: NaiveDateTime) -> bool {
        if !self.outcomes.is_empty() && !self.outcomes.contains(&record.category) {
            return false;
        }

        if let Some(ref search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let phone_match = record.phone.to_lowercase().contains(&needle);
            let category_match = record.category.label().to_lowercase().contains(&needle);
            if !phone_match && !category_match {
                return false;
            }
        }

        if let Some(ref list_id) = self.list_id.as_deref().filter(|s| !s.is_empty()) {
            if !record
                .list_id
                .to_lowercase()
                .contains(&list_id.to_lowercase())
            {
                return false;
            }
        }

        if !self.has_date_filter() {
            return true;
        }

        // Any active date/time predicate excludes unparseable timestamps.
        let Some(ts) = parse_api_timestamp(&record.timestamp) else {
            return false;
        };

        if let Some(range) = self.quick_range {
            let cutoff = match range {
                QuickRange::LastFiveMinutes => Some(now - Duration::minutes(5)),
                QuickRange::LastFifteenMinutes => Some(now - Duration::minutes(15)),
                QuickRange::LastHour => Some(now - Duration::minutes(60)),
                QuickRange::Today => Some(now.date().and_hms_opt(0, 0, 0).expect("midnight")),
            };
            if let Some(cutoff) = cutoff {
                if ts < cutoff {
                    return false;
                }
            }
        }

        if let Some(ref start_date) = self.start_date {
            let Some(start) = parse_filter_date(start_date, self.start_time.as_deref()) else {
                return false;
            };

            let explicit_end = self
                .end_date
                .as_deref()
                .filter(|e| !e.is_empty() && *e != start_date.as_str());

            match explicit_end {
                // Start only: the implicit window is the start date itself.
                None => {
                    let Some(end) = end_of_day(start_date) else {
                        return false;
                    };
                    if ts < start || ts > end {
                        return false;
                    }
                }
                Some(end_date) => {
                    if ts < start {
                        return false;
                    }
                    let end = match self.end_time.as_deref().filter(|t| !t.is_empty()) {
                        Some(time) => parse_filter_date(end_date, Some(time)),
                        None => end_of_day(end_date),
                    };
                    let Some(end) = end else { return false };
                    if ts > end {
                        return false;
                    }
                }
            }
        }

        true
    }
}

/// Per-stage category selections for the admin grouped view, keyed by
/// stage number.
#[derive(Debug, Clone, Default)]
pub struct StageFilters(pub BTreeMap<i64, Vec<String>>);

impl StageFilters {
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.is_empty())
    }

    /// A grouped call matches when, for every stage with a non-empty
    /// selection, it has that stage and the stage's category is selected.
    pub fn matches(&self, call: &GroupedCall) -> bool {
        self.0.iter().all(|(stage, selected)| {
            selected.is_empty()
                || call
                    .stage(*stage)
                    .is_some_and(|s| selected.contains(&s.category))
        })
    }

    /// Parse a CLI spec like `2:Qualified,DNC`.
    pub fn parse_spec(&mut self, spec: &str) -> Result<(), String> {
        let (stage, categories) = spec
            .split_once(':')
            .ok_or_else(|| format!("bad stage filter: {spec}. Expected STAGE:CAT[,CAT...]"))?;
        let stage: i64 = stage
            .trim()
            .parse()
            .map_err(|_| format!("bad stage number in filter: {spec}"))?;
        let selected = self.0.entry(stage).or_default();
        for cat in categories.split(',') {
            let cat = cat.trim();
            if !cat.is_empty() {
                selected.push(cat.to_string());
            }
        }
        Ok(())
    }
}

/// Free-text search over a grouped call: phone number, voice name, or any
/// stage's category.
pub fn grouped_matches_search(call: &GroupedCall, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    call.number.to_lowercase().contains(&needle)
        || call.voice.to_lowercase().contains(&needle)
        || call
            .stages
            .iter()
            .any(|s| s.category.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::CategoryPalette;
    use crate::records::{normalize_call, test_raw_call};

    fn record(id: i64, phone: &str, category: &str, ts: &str) -> CallRecord {
        let palette = CategoryPalette::from_api(&[]);
        normalize_call(
            &test_raw_call(id, phone, Some(category), Some(ts)),
            &palette,
        )
    }

    fn noon() -> NaiveDateTime {
        parse_api_timestamp("12/15/2025, 12:00:00").unwrap()
    }

    #[test]
    fn empty_filters_pass_everything() {
        let f = Filters::default();
        let r = record(1, "+15550000001", "Qualified", "12/15/2025, 10:00:00");
        assert!(f.matches(&r, noon()));
        // Even records with garbage timestamps.
        let bad = record(2, "+15550000002", "Qualified", "garbage");
        assert!(f.matches(&bad, noon()));
    }

    #[test]
    fn search_matches_phone_or_category_case_insensitive() {
        let r = record(1, "+15550000001", "Qualified", "12/15/2025, 10:00:00");
        let mut f = Filters {
            search: Some("qual".to_string()),
            ..Filters::default()
        };
        assert!(f.matches(&r, noon()));
        f.search = Some("0001".to_string());
        assert!(f.matches(&r, noon()));
        f.search = Some("nope".to_string());
        assert!(!f.matches(&r, noon()));
    }

    #[test]
    fn list_id_is_substring_match() {
        let r = record(1234, "+15550000001", "Qualified", "12/15/2025, 10:00:00");
        let f = Filters {
            list_id: Some("23".to_string()),
            ..Filters::default()
        };
        assert!(f.matches(&r, noon()));
        let f = Filters {
            list_id: Some("99".to_string()),
            ..Filters::default()
        };
        assert!(!f.matches(&r, noon()));
    }

    #[test]
    fn outcome_selection_is_membership() {
        let r = record(1, "+15550000001", "Busy", "12/15/2025, 10:00:00");
        let f = Filters {
            outcomes: vec![Category::NotInterested],
            ..Filters::default()
        };
        assert!(f.matches(&r, noon()));
        let f = Filters {
            outcomes: vec![Category::Qualified],
            ..Filters::default()
        };
        assert!(!f.matches(&r, noon()));
    }

    #[test]
    fn start_only_window_is_the_start_day() {
        let f = Filters {
            start_date: Some("2025-12-15".to_string()),
            ..Filters::default()
        };
        assert!(f.matches(
            &record(1, "+1", "Qualified", "12/15/2025, 00:00:00"),
            noon()
        ));
        assert!(f.matches(
            &record(2, "+1", "Qualified", "12/15/2025, 23:59:59"),
            noon()
        ));
        assert!(!f.matches(
            &record(3, "+1", "Qualified", "12/16/2025, 00:00:01"),
            noon()
        ));
        assert!(!f.matches(
            &record(4, "+1", "Qualified", "12/14/2025, 23:00:00"),
            noon()
        ));
    }

    #[test]
    fn explicit_end_extends_the_window() {
        let f = Filters {
            start_date: Some("2025-12-15".to_string()),
            end_date: Some("2025-12-17".to_string()),
            ..Filters::default()
        };
        assert!(f.matches(
            &record(1, "+1", "Qualified", "12/16/2025, 12:00:00"),
            noon()
        ));
        assert!(f.matches(
            &record(2, "+1", "Qualified", "12/17/2025, 23:59:59"),
            noon()
        ));
        assert!(!f.matches(
            &record(3, "+1", "Qualified", "12/18/2025, 00:00:01"),
            noon()
        ));
    }

    #[test]
    fn end_time_caps_the_window() {
        let f = Filters {
            start_date: Some("2025-12-15".to_string()),
            end_date: Some("2025-12-16".to_string()),
            end_time: Some("10:00".to_string()),
            ..Filters::default()
        };
        assert!(f.matches(
            &record(1, "+1", "Qualified", "12/16/2025, 09:59:00"),
            noon()
        ));
        assert!(!f.matches(
            &record(2, "+1", "Qualified", "12/16/2025, 10:01:00"),
            noon()
        ));
    }

    #[test]
    fn unparseable_timestamp_excluded_only_with_date_filter() {
        let bad = record(1, "+15550000001", "Qualified", "not-a-time");
        let inactive = Filters::default();
        assert!(inactive.matches(&bad, noon()));

        let with_date = Filters {
            start_date: Some("2025-12-15".to_string()),
            ..Filters::default()
        };
        assert!(!with_date.matches(&bad, noon()));

        let with_quick = Filters {
            quick_range: Some(QuickRange::Today),
            ..Filters::default()
        };
        assert!(!with_quick.matches(&bad, noon()));
    }

    #[test]
    fn quick_ranges_cut_at_the_anchor() {
        let recent = record(1, "+1", "Qualified", "12/15/2025, 11:58:00");
        let old = record(2, "+1", "Qualified", "12/15/2025, 11:40:00");
        let yesterday = record(3, "+1", "Qualified", "12/14/2025, 23:00:00");

        let f = Filters {
            quick_range: Some(QuickRange::LastFiveMinutes),
            ..Filters::default()
        };
        assert!(f.matches(&recent, noon()));
        assert!(!f.matches(&old, noon()));

        let f = Filters {
            quick_range: Some(QuickRange::LastHour),
            ..Filters::default()
        };
        assert!(f.matches(&old, noon()));
        assert!(!f.matches(&yesterday, noon()));

        let f = Filters {
            quick_range: Some(QuickRange::Today),
            ..Filters::default()
        };
        assert!(f.matches(&old, noon()));
        assert!(!f.matches(&yesterday, noon()));
    }

    #[test]
    fn latest_record_anchor_uses_newest_timestamp() {
        let records = vec![
            record(1, "+1", "Qualified", "12/15/2025, 09:00:00"),
            record(2, "+1", "Qualified", "12/15/2025, 09:04:00"),
        ];
        let f = Filters {
            quick_range: Some(QuickRange::LastFiveMinutes),
            anchor: Anchor::LatestRecord,
            ..Filters::default()
        };
        // Anchored at 09:04, both fall inside the 5-minute window even
        // though wall-clock now is far later.
        assert_eq!(f.apply(&records).len(), 2);
    }

    #[test]
    fn combined_filters_are_conjunctive() {
        let r = record(7, "+15550000007", "Qualified", "12/15/2025, 10:00:00");
        let passing = Filters {
            search: Some("0007".to_string()),
            list_id: Some("7".to_string()),
            outcomes: vec![Category::Qualified],
            start_date: Some("2025-12-15".to_string()),
            ..Filters::default()
        };
        assert!(passing.matches(&r, noon()));

        // Flipping any single predicate to a failing one fails the whole
        // conjunction.
        let mut f = passing.clone();
        f.search = Some("xyz".to_string());
        assert!(!f.matches(&r, noon()));

        let mut f = passing.clone();
        f.list_id = Some("99".to_string());
        assert!(!f.matches(&r, noon()));

        let mut f = passing.clone();
        f.outcomes = vec![Category::Dnc];
        assert!(!f.matches(&r, noon()));

        let mut f = passing.clone();
        f.start_date = Some("2025-12-16".to_string());
        assert!(!f.matches(&r, noon()));
    }

    #[test]
    fn apply_preserves_input_order() {
        let records = vec![
            record(3, "+1", "Qualified", "12/15/2025, 10:00:00"),
            record(1, "+1", "Qualified", "12/15/2025, 09:00:00"),
            record(2, "+1", "DNC", "12/15/2025, 11:00:00"),
        ];
        let f = Filters {
            outcomes: vec![Category::Qualified],
            ..Filters::default()
        };
        let ids: Vec<i64> = f.apply(&records).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    mod stage_filters {
        use super::*;
        use crate::records::group::group_by_number;

        fn grouped() -> Vec<GroupedCall> {
            let calls = vec![
                crate::api::types::RawCall {
                    id: 1,
                    number: "+15550000001".into(),
                    list_id: "1".into(),
                    category: Some("Qualified".into()),
                    category_color: None,
                    voice: Some("Emma".into()),
                    timestamp: None,
                    transcription: None,
                    stage: Some(1),
                },
                crate::api::types::RawCall {
                    id: 2,
                    number: "+15550000001".into(),
                    list_id: "1".into(),
                    category: Some("DNC".into()),
                    category_color: None,
                    voice: Some("Emma".into()),
                    timestamp: None,
                    transcription: None,
                    stage: Some(2),
                },
                crate::api::types::RawCall {
                    id: 3,
                    number: "+15550000002".into(),
                    list_id: "1".into(),
                    category: Some("Neutral".into()),
                    category_color: None,
                    voice: Some("Liam".into()),
                    timestamp: None,
                    transcription: None,
                    stage: Some(1),
                },
            ];
            group_by_number(&calls).calls
        }

        #[test]
        fn stage_selection_requires_matching_stage_category() {
            let calls = grouped();
            let mut f = StageFilters::default();
            f.parse_spec("1:Qualified").unwrap();
            assert!(f.matches(&calls[0]));
            assert!(!f.matches(&calls[1]));

            // A record missing the filtered stage fails.
            let mut f = StageFilters::default();
            f.parse_spec("2:DNC").unwrap();
            assert!(f.matches(&calls[0]));
            assert!(!f.matches(&calls[1]));
        }

        #[test]
        fn stage_filters_combine_conjunctively() {
            let calls = grouped();
            let mut f = StageFilters::default();
            f.parse_spec("1:Qualified").unwrap();
            f.parse_spec("2:Qualified").unwrap();
            assert!(!f.matches(&calls[0])); // stage 2 is DNC
        }

        #[test]
        fn grouped_search_covers_number_voice_and_stage_categories() {
            let calls = grouped();
            assert!(grouped_matches_search(&calls[0], "dnc"));
            assert!(grouped_matches_search(&calls[1], "liam"));
            assert!(grouped_matches_search(&calls[1], "0002"));
            assert!(!grouped_matches_search(&calls[1], "dnc"));
            assert!(grouped_matches_search(&calls[0], ""));
        }
    }
}
