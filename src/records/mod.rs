pub mod category;
pub mod group;
pub mod timestamp;

use std::collections::HashMap;

use serde::Serialize;

use crate::api::types::{CategoryInfo, RawCall};
use category::Category;

/// A normalized call record as shown in the client dashboard. The category
/// is always a taxonomy member.
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    pub id: i64,
    pub phone: String,
    pub list_id: String,
    pub category: Category,
    pub category_color: String,
    pub timestamp: String,
    pub transcript: String,
}

/// Category → display color, built from the API's `all_categories` block.
/// The API sometimes reports placeholder grays for categories it has no
/// real color for; those are ignored in favor of the built-in palette.
pub struct CategoryPalette {
    colors: HashMap<String, String>,
}

const PLACEHOLDER_COLORS: [&str; 3] = ["#818589", "#bbb", "#eceff4"];

impl CategoryPalette {
    pub fn from_api(all_categories: &[CategoryInfo]) -> Self {
        let mut colors = HashMap::new();
        for info in all_categories {
            let Some(ref color) = info.color else { continue };
            if PLACEHOLDER_COLORS.contains(&color.as_str()) {
                continue;
            }
            colors.insert(info.name.clone(), color.clone());
            if let Some(ref original) = info.original_name {
                colors.entry(original.clone()).or_insert_with(|| color.clone());
            }
        }
        Self { colors }
    }

    pub fn color_for(&self, category: Category) -> String {
        self.colors
            .get(category.label())
            .cloned()
            .unwrap_or_else(|| category.default_color().to_string())
    }

    /// Color for a raw (admin-view) category name. Unknown names get a
    /// neutral gray, matching what the dashboards render for them.
    pub fn color_for_raw(&self, name: &str) -> String {
        self.colors
            .get(name)
            .cloned()
            .unwrap_or_else(|| "#6c757d".to_string())
    }
}

/// Normalize one raw call into the client-view shape.
pub fn normalize_call(raw: &RawCall, palette: &CategoryPalette) -> CallRecord {
    let category = Category::normalize(raw.category.as_deref());
    CallRecord {
        id: raw.id,
        phone: raw.number.clone(),
        list_id: raw.list_id.clone(),
        category,
        category_color: palette.color_for(category),
        timestamp: raw.timestamp.clone().unwrap_or_default(),
        transcript: raw.transcription.clone().unwrap_or_default(),
    }
}

pub fn normalize_calls(raw: &[RawCall], palette: &CategoryPalette) -> Vec<CallRecord> {
    raw.iter().map(|r| normalize_call(r, palette)).collect()
}

#[cfg(test)]
pub(crate) fn test_raw_call(id: i64, number: &str, category: Option<&str>, ts: Option<&str>) -> RawCall {
    RawCall {
        id,
        number: number.to_string(),
        list_id: id.to_string(),
        category: category.map(String::from),
        category_color: None,
        voice: None,
        timestamp: ts.map(String::from),
        transcription: None,
        stage: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_example_triple() {
        let palette = CategoryPalette::from_api(&[]);
        let raw = vec![
            test_raw_call(1, "+15550000001", Some("Busy"), None),
            test_raw_call(2, "+15550000002", Some("DNQ"), None),
            test_raw_call(3, "+15550000003", Some("Qualified"), None),
        ];
        let normalized = normalize_calls(&raw, &palette);
        let labels: Vec<&str> = normalized.iter().map(|r| r.category.label()).collect();
        assert_eq!(labels, vec!["Not Interested", "Do Not Qualify", "Qualified"]);
    }

    #[test]
    fn palette_ignores_placeholder_colors() {
        let palette = CategoryPalette::from_api(&[
            CategoryInfo {
                name: "Qualified".into(),
                original_name: None,
                color: Some("#123456".into()),
            },
            CategoryInfo {
                name: "DNC".into(),
                original_name: None,
                color: Some("#818589".into()),
            },
        ]);
        assert_eq!(palette.color_for(Category::Qualified), "#123456");
        // Placeholder gray falls back to the built-in palette.
        assert_eq!(palette.color_for(Category::Dnc), Category::Dnc.default_color());
    }

    #[test]
    fn missing_category_normalizes_to_user_hang_up() {
        let palette = CategoryPalette::from_api(&[]);
        let rec = normalize_call(&test_raw_call(1, "+15550000001", None, None), &palette);
        assert_eq!(rec.category, Category::UserHangUp);
    }
}
