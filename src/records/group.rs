use std::collections::HashMap;

use serde::Serialize;

use crate::api::types::RawCall;

/// One attempt within a multi-stage interaction. Categories stay raw here:
/// the admin view shows the API's own disposition names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageEntry {
    pub stage: Option<i64>,
    pub category: String,
    pub category_color: Option<String>,
    pub voice: String,
    pub timestamp: String,
    pub transcription: String,
}

/// All calls made to one phone number, ordered by stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedCall {
    pub id: i64,
    pub number: String,
    pub list_id: String,
    /// Timestamp of the first-seen record for this number.
    pub first_timestamp: String,
    pub voice: String,
    pub stages: Vec<StageEntry>,
}

impl GroupedCall {
    pub fn stage(&self, stage: i64) -> Option<&StageEntry> {
        self.stages.iter().find(|s| s.stage == Some(stage))
    }
}

/// Result of grouping a flat call list by phone number.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedCalls {
    /// One entry per unique phone number, in first-seen order.
    pub calls: Vec<GroupedCall>,
    /// Ascending-sorted distinct stage numbers seen across all records.
    /// Drives the dynamic per-stage columns.
    pub stage_numbers: Vec<i64>,
}

/// Partition records by phone number and order each partition's stages
/// ascending. Phone numbers are grouped verbatim — two formats of the same
/// number stay separate. Records without a stage number are kept in their
/// group (sorted first) but do not contribute a stage column.
pub fn group_by_number(calls: &[RawCall]) -> GroupedCalls {
    let mut grouped: Vec<GroupedCall> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stage_numbers: Vec<i64> = Vec::new();

    for call in calls {
        let entry = StageEntry {
            stage: call.stage,
            category: call.category.clone().unwrap_or_default(),
            category_color: call.category_color.clone(),
            voice: call.voice.clone().unwrap_or_else(|| "-".to_string()),
            timestamp: call.timestamp.clone().unwrap_or_default(),
            transcription: call.transcription.clone().unwrap_or_default(),
        };

        let slot = *index.entry(call.number.as_str()).or_insert_with(|| {
            grouped.push(GroupedCall {
                id: call.id,
                number: call.number.clone(),
                list_id: call.list_id.clone(),
                first_timestamp: call.timestamp.clone().unwrap_or_default(),
                voice: call.voice.clone().unwrap_or_else(|| "-".to_string()),
                stages: Vec::new(),
            });
            grouped.len() - 1
        });

        // Last write per stage number wins.
        let stages = &mut grouped[slot].stages;
        match stages.iter_mut().find(|s| s.stage == entry.stage && s.stage.is_some()) {
            Some(existing) => *existing = entry,
            None => stages.push(entry),
        }

        if let Some(stage) = call.stage {
            if !stage_numbers.contains(&stage) {
                stage_numbers.push(stage);
            }
        }
    }

    for call in &mut grouped {
        call.stages.sort_by_key(|s| s.stage);
    }
    stage_numbers.sort_unstable();

    GroupedCalls {
        calls: grouped,
        stage_numbers,
    }
}
