use unicode_width::UnicodeWidthStr;

use crate::api::types::{
    CampaignSummary, ExportOptionsResponse, RecordingsResponse, TransferSetting,
};
use crate::records::group::GroupedCalls;
use crate::records::CallRecord;
use crate::report::outcomes::{Outcome, StageCategoryStat};
use crate::report::series::{StatSeries, SummarySeries};

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

fn opt(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

/// One page of client-view call records.
pub fn print_records(
    records: &[CallRecord],
    page: usize,
    total_pages: usize,
    total_filtered: usize,
    show_transcripts: bool,
) {
    if records.is_empty() {
        println!("No calls match the current filters.");
        return;
    }

    println!(
        "{} call{} (page {page} of {total_pages}):\n",
        total_filtered,
        if total_filtered == 1 { "" } else { "s" },
    );

    println!(
        "  {:<10} {:<16} {:<8} {:<18} {:<22}",
        "ID", "PHONE", "LIST", "CATEGORY", "TIMESTAMP"
    );
    println!("  {}", "-".repeat(78));

    for r in records {
        println!(
            "  {:<10} {:<16} {:<8} {:<18} {:<22}",
            r.id,
            truncate(&r.phone, 16),
            truncate(&r.list_id, 8),
            truncate(r.category.label(), 18),
            truncate(&r.timestamp, 22),
        );
        if show_transcripts && !r.transcript.is_empty() {
            let flat = r.transcript.replace('\n', " ");
            println!("  {}", truncate(&format!("  {flat}"), 78));
        }
    }
    println!();
}

/// Grouped admin view: one row per phone number, a column per stage.
pub fn print_grouped(grouped: &GroupedCalls, page: usize, total_pages: usize) {
    if grouped.calls.is_empty() {
        println!("No calls match the current filters.");
        return;
    }

    println!(
        "{} number{} across {} stage{} (page {page} of {total_pages}):\n",
        grouped.calls.len(),
        if grouped.calls.len() == 1 { "" } else { "s" },
        grouped.stage_numbers.len(),
        if grouped.stage_numbers.len() == 1 { "" } else { "s" },
    );

    let mut header = format!("  {:<16} {:<10} {:<22}", "PHONE", "VOICE", "FIRST CALL");
    for stage in &grouped.stage_numbers {
        header.push_str(&format!(" {:<18}", format!("STAGE {stage}")));
    }
    println!("{header}");
    println!("  {}", "-".repeat(header.len().saturating_sub(2)));

    for call in &grouped.calls {
        let mut row = format!(
            "  {:<16} {:<10} {:<22}",
            truncate(&call.number, 16),
            truncate(&call.voice, 10),
            truncate(&call.first_timestamp, 22),
        );
        for stage in &grouped.stage_numbers {
            let category = call
                .stage(*stage)
                .map(|s| s.category.as_str())
                .unwrap_or("-");
            row.push_str(&format!(" {:<18}", truncate(category, 18)));
        }
        println!("{row}");
    }
    println!();
}

/// Outcome cards: one row per taxonomy category, percentages over the full
/// set, with the in-filter count alongside.
pub fn print_outcomes(outcomes: &[Outcome], total: usize) {
    println!("Outcomes ({total} call{}):\n", if total == 1 { "" } else { "s" });
    println!(
        "  {:<18} {:>7} {:>6} {:>10}",
        "CATEGORY", "COUNT", "PCT", "IN FILTER"
    );
    println!("  {}", "-".repeat(44));
    for o in outcomes {
        println!(
            "  {:<18} {:>7} {:>5}% {:>10}",
            o.label, o.count, o.percentage, o.count_in_filtered
        );
    }
    println!();
}

/// Per-stage category breakdown for the grouped view.
pub fn print_stage_stats(stage: i64, stats: &[StageCategoryStat]) {
    if stats.is_empty() {
        println!("Stage {stage}: no categorized calls.");
        return;
    }
    println!("Stage {stage}:");
    for s in stats {
        println!("  {:<22} {:>5} ({:>3}%)", truncate(&s.name, 22), s.count, s.percentage);
    }
}

/// Cumulative engaged-vs-dropoff series as a text chart. Labels are
/// minutes from midnight.
pub fn print_summary_series(series: &SummarySeries) {
    if series.labels.is_empty() {
        println!("No calls today.");
        return;
    }
    println!("Engaged vs drop-off (cumulative, 5-minute intervals):\n");
    println!("  {:>6} {:>8} {:>9}", "MINUTE", "ENGAGED", "DROP-OFF");
    for ((label, engaged), drop_off) in series
        .labels
        .iter()
        .zip(&series.engaged)
        .zip(&series.drop_off)
    {
        println!("  {label:>6} {engaged:>8} {drop_off:>9}");
    }
    println!();
}

/// Hourly or daily per-category series.
pub fn print_stat_series(series: &StatSeries) {
    if series.labels.is_empty() {
        println!("No calls in range.");
        return;
    }

    let mut header = format!("  {:<10}", series.axis);
    for ds in &series.datasets {
        header.push_str(&format!(" {:>14}", truncate(ds.label, 14)));
    }
    println!("{header}");
    println!("  {}", "-".repeat(header.len().saturating_sub(2)));

    for (i, label) in series.labels.iter().enumerate() {
        let mut row = format!("  {:<10}", label);
        for ds in &series.datasets {
            row.push_str(&format!(" {:>14}", ds.data.get(i).copied().unwrap_or(0)));
        }
        println!("{row}");
    }
    println!();
}

/// Campaign cards from the client campaigns endpoint.
pub fn print_campaigns(campaigns: &[CampaignSummary]) {
    if campaigns.is_empty() {
        println!("No campaigns found.");
        return;
    }

    println!(
        "{} campaign{}:\n",
        campaigns.len(),
        if campaigns.len() == 1 { "" } else { "s" }
    );

    for c in campaigns {
        let name = c
            .campaign
            .as_ref()
            .and_then(|info| info.name.as_deref())
            .unwrap_or("(unnamed)");
        println!("Campaign: {}", truncate(name, 60));
        if let Some(ref id) = c.id {
            println!("  ID:       {id}");
        }
        if let Some(status) = c.status.as_ref().and_then(|s| s.status_name.as_deref()) {
            println!("  Status:   {status}");
        }
        if let Some(model) = c.model.as_ref().and_then(|m| m.name.as_deref()) {
            println!("  Model:    {model}");
        }
        if let Some(bots) = c.bot_count {
            println!("  Bots:     {bots}");
        }
        if let Some(ref stats) = c.call_stats {
            println!(
                "  Calls:    {} total, {} transferred ({:.1}%)",
                stats.total_calls, stats.calls_transferred, stats.transfer_percentage
            );
        }
        if let (Some(start), Some(end)) = (c.start_date.as_deref(), c.end_date.as_deref()) {
            println!("  Window:   {start} to {end}");
        }
        println!();
    }
}

pub fn print_recordings(resp: &RecordingsResponse) {
    if resp.recordings.is_empty() {
        println!("No recordings found.");
        return;
    }

    println!(
        "{} recording{} (page {} of {}):\n",
        resp.pagination.total_records,
        if resp.pagination.total_records == 1 { "" } else { "s" },
        resp.pagination.page.max(1),
        resp.pagination.total_pages.max(1),
    );

    println!(
        "  {:<22} {:<16} {:<10} {:<10} {:<8}",
        "TIME", "PHONE", "DURATION", "SIZE", "EXT"
    );
    println!("  {}", "-".repeat(70));

    for r in &resp.recordings {
        println!(
            "  {:<22} {:<16} {:<10} {:<10} {:<8}",
            truncate(opt(r.time.as_deref()), 22),
            truncate(opt(r.phone_number.as_deref()), 16),
            opt(r.duration.as_deref()),
            opt(r.size.as_deref()),
            opt(r.extension.as_deref()),
        );
        if let Some(ref url) = r.file_url {
            println!("    {}", truncate(url, 76));
        }
    }
    println!();
}

pub fn print_export_options(options: &ExportOptionsResponse) {
    let lists = options.list_ids_as_strings();
    if lists.is_empty() {
        println!("Lists: (none)");
    } else {
        println!("Lists: {}", lists.join(", "));
    }

    if options.all_categories.is_empty() {
        println!("Categories: (none)");
    } else {
        println!("Categories:");
        for c in &options.all_categories {
            match c.original_name.as_deref().filter(|o| *o != c.name) {
                Some(original) => println!("  {} ({original})", c.name),
                None => println!("  {}", c.name),
            }
        }
    }
}

pub fn print_transfer_settings(settings: &[TransferSetting]) {
    if settings.is_empty() {
        println!("No transfer settings configured.");
        return;
    }
    println!("Transfer settings:");
    for s in settings {
        let flag = if s.recommended.unwrap_or(false) {
            " (recommended)"
        } else {
            ""
        };
        println!(
            "  {:<6} {}{flag}",
            s.id,
            truncate(opt(s.name.as_deref()), 40),
        );
    }
}
