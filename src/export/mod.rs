use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::api::types::ExportRequest;

/// Build the download request body. Selecting every option collapses to an
/// empty vector, which the server reads as "all" — this keeps the request
/// small and matches what the export endpoint expects.
pub fn build_export_request(
    selected_lists: &[String],
    all_lists: &[String],
    selected_categories: &[String],
    all_categories: &[String],
    start_date: &str,
    end_date: &str,
) -> ExportRequest {
    ExportRequest {
        list_ids: collapse_select_all(selected_lists, all_lists),
        categories: collapse_select_all(selected_categories, all_categories),
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
    }
}

fn collapse_select_all(selected: &[String], all: &[String]) -> Vec<String> {
    if !all.is_empty() && selected.len() == all.len() {
        Vec::new()
    } else {
        selected.to_vec()
    }
}

/// Output filename: export_{campaignId}_{timestamp}.csv in the current
/// directory.
pub fn export_filename(campaign_id: &str, now: NaiveDateTime) -> PathBuf {
    PathBuf::from(format!(
        "export_{campaign_id}_{}.csv",
        now.format("%Y%m%d_%H%M%S")
    ))
}

/// True when the CSV body carries a header row but no data rows, so the
/// caller can warn that the selection matched nothing.
pub fn csv_is_headers_only(body: &str) -> bool {
    body.lines().filter(|l| !l.trim().is_empty()).count() <= 1
}

pub fn write_csv(path: &Path, body: &str) -> Result<()> {
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write export: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::timestamp::parse_api_timestamp;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_selection_collapses_to_empty() {
        let all = strings(&["1", "2", "3"]);
        let req = build_export_request(&all, &all, &all, &all, "2025-12-01", "2025-12-15");
        assert!(req.list_ids.is_empty());
        assert!(req.categories.is_empty());
    }

    #[test]
    fn partial_selection_is_sent_verbatim() {
        let all = strings(&["1", "2", "3"]);
        let some = strings(&["2"]);
        let req = build_export_request(&some, &all, &some, &all, "", "");
        assert_eq!(req.list_ids, vec!["2"]);
        assert_eq!(req.categories, vec!["2"]);
    }

    #[test]
    fn empty_option_set_never_collapses() {
        let none: Vec<String> = Vec::new();
        let req = build_export_request(&none, &none, &none, &none, "", "");
        assert!(req.list_ids.is_empty());
    }

    #[test]
    fn filename_embeds_campaign_and_timestamp() {
        let now = parse_api_timestamp("12/15/2025, 18:08:24").unwrap();
        let path = export_filename("77", now);
        assert_eq!(path.to_str().unwrap(), "export_77_20251215_180824.csv");
    }

    #[test]
    fn headers_only_detection() {
        assert!(csv_is_headers_only("phone,category,timestamp\n"));
        assert!(csv_is_headers_only(""));
        assert!(!csv_is_headers_only(
            "phone,category,timestamp\n+15550000001,Qualified,12/15/2025\n"
        ));
    }

    #[test]
    fn write_csv_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export_1_x.csv");
        write_csv(&path, "a,b\n1,2\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2\n");
    }
}
