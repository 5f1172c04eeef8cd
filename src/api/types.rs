use serde::{Deserialize, Deserializer, Serialize};

/// Accept a JSON string or number and store it as a string. The API is
/// inconsistent about list IDs and extension numbers.
fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn opt_string_or_number<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(string_or_number(de)?).filter(|s| !s.is_empty()))
}

/// One raw call record from `GET /campaigns/{id}/dashboard`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawCall {
    pub id: i64,
    pub number: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub list_id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_color: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
    /// Sequential attempt number for this phone number. Admin payloads only.
    #[serde(default)]
    pub stage: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Pagination {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub current_page: u32,
}

/// Category metadata as served by the API alongside dashboard data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryInfo {
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CampaignInfo {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardResponse {
    #[serde(default)]
    pub calls: Vec<RawCall>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub all_categories: Vec<CategoryInfo>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub campaign: Option<CampaignInfo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: String,
    pub username: String,
    pub role: String,
}

/// One campaign card from `GET /client/campaigns/{clientId}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CampaignSummary {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub campaign: Option<CampaignInfo>,
    #[serde(default)]
    pub status: Option<CampaignStatus>,
    #[serde(default)]
    pub model: Option<ModelInfo>,
    #[serde(default)]
    pub call_stats: Option<CallStats>,
    #[serde(default)]
    pub bot_count: Option<u32>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CampaignStatus {
    #[serde(default)]
    pub status_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CallStats {
    #[serde(default)]
    pub total_calls: u64,
    #[serde(default)]
    pub calls_transferred: u64,
    #[serde(default)]
    pub transfer_percentage: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientCampaignsResponse {
    #[serde(default)]
    pub campaigns: Vec<CampaignSummary>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Recording {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub extension: Option<String>,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingsResponse {
    #[serde(default)]
    pub recordings: Vec<Recording>,
    #[serde(default)]
    pub pagination: RecordingsPagination,
    #[serde(default)]
    pub total_servers_queried: Option<u32>,
    #[serde(default)]
    pub servers_with_data: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecordingsPagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_records: u64,
}

/// `GET /export/{id}/options` — available list IDs and dispositions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportOptionsResponse {
    #[serde(default)]
    pub list_ids: Vec<serde_json::Value>,
    #[serde(default)]
    pub all_categories: Vec<CategoryInfo>,
}

impl ExportOptionsResponse {
    pub fn list_ids_as_strings(&self) -> Vec<String> {
        self.list_ids
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

/// Body for `POST /export/{id}/download`. Empty `list_ids`/`categories`
/// means "all".
#[derive(Debug, Clone, Serialize)]
pub struct ExportRequest {
    pub list_ids: Vec<String>,
    pub categories: Vec<String>,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferSetting {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub recommended: Option<bool>,
}

/// `GET /integration/form` — campaign/model/transfer-setting configuration
/// tree. `campaign_config` is campaign → model → list of setting refs; its
/// exact depth varies, so it stays a raw value.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntegrationFormConfig {
    #[serde(default)]
    pub campaigns: Vec<String>,
    #[serde(default)]
    pub campaign_config: serde_json::Value,
    #[serde(default)]
    pub transfer_settings: Vec<TransferSetting>,
}
