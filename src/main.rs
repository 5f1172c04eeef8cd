use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use xdial::api::{ApiClient, ApiError, DEFAULT_BASE_URL};
use xdial::config;
use xdial::export;
use xdial::output::{json as json_out, table};
use xdial::records::category::Category;
use xdial::records::group::{group_by_number, GroupedCalls};
use xdial::records::{normalize_calls, CategoryPalette};
use xdial::report::outcomes::{
    outcome_summary, selected_filters_percentage, stage_category_stats,
};
use xdial::report::series::{statistics_series, summary_series};
use xdial::report::sort::{sort_grouped, sort_records, SortDirection, SortKey};
use xdial::report::{grouped_matches_search, page, Filters, StageFilters};
use xdial::session::{self, Session};

#[derive(Parser)]
#[command(name = "xdial", version, about = "xdial — call campaign reporting for the xLiteCore dialer API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// API base URL
    #[arg(long, global = true, env = "XDIAL_BASE_URL")]
    base_url: Option<String>,

    /// Bearer token (overrides the saved session)
    #[arg(long, global = true, env = "XDIAL_TOKEN")]
    token: Option<String>,
}

/// Filter flags shared by the reporting commands.
#[derive(Args)]
struct FilterArgs {
    /// Start date (YYYY-MM-DD, default: today)
    #[arg(long)]
    start_date: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Start time (HH:MM), applied to --start-date
    #[arg(long)]
    start_time: Option<String>,

    /// End time (HH:MM), applied to --end-date
    #[arg(long)]
    end_time: Option<String>,

    /// Match phone numbers and categories (case-insensitive)
    #[arg(long)]
    search: Option<String>,

    /// Filter by list ID (substring match)
    #[arg(long)]
    list: Option<String>,

    /// Filter by outcome category (repeatable)
    #[arg(long = "outcome")]
    outcomes: Vec<String>,

    /// Quick time range: 5m, 15m, 1h, today
    #[arg(long)]
    range: Option<String>,

    /// Quick-range anchor: now (wall clock) or latest (newest record)
    #[arg(long, default_value = "now")]
    anchor: String,
}

impl FilterArgs {
    fn fetch_start(&self) -> String {
        self.start_date
            .clone()
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string())
    }

    fn to_filters(&self) -> Result<Filters> {
        let outcomes = self
            .outcomes
            .iter()
            .map(|o| o.parse::<Category>().map_err(|e| anyhow!(e)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Filters {
            search: self.search.clone(),
            list_id: self.list.clone(),
            outcomes,
            start_date: self.start_date.clone(),
            start_time: self.start_time.clone(),
            end_date: self.end_date.clone(),
            end_time: self.end_time.clone(),
            quick_range: self
                .range
                .as_deref()
                .map(|r| r.parse().map_err(|e: String| anyhow!(e)))
                .transpose()?,
            anchor: self.anchor.parse().map_err(|e: String| anyhow!(e))?,
        })
    }
}

/// Flags for the grouped stages view. Stage rows filter by free-text search
/// and per-stage category selections only; the flat-view predicates (list,
/// outcome, quick ranges) do not apply there.
#[derive(Args)]
struct StageArgs {
    /// Start date (YYYY-MM-DD, default: today)
    #[arg(long)]
    start_date: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Match phone numbers, voice names, and stage categories
    #[arg(long)]
    search: Option<String>,
}

impl StageArgs {
    fn fetch_start(&self) -> String {
        self.start_date
            .clone()
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and save the session
    Login {
        /// Username (falls back to config)
        #[arg(long)]
        username: Option<String>,

        /// Password (falls back to XDIAL_PASSWORD, then config)
        #[arg(long)]
        password: Option<String>,

        /// Print the token without saving a session
        #[arg(long)]
        no_store: bool,
    },

    /// Clear the saved session
    Logout,

    /// List campaigns for a client
    Campaigns {
        /// Client ID (default: the logged-in user)
        client_id: Option<String>,
    },

    /// Show dashboard call records for a campaign
    Dashboard {
        /// Campaign ID
        campaign_id: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Sort by: id, phone, list-id, category, timestamp
        #[arg(long, default_value = "id")]
        sort: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Page number
        #[arg(long, default_value = "1")]
        page: usize,

        /// Records per page
        #[arg(long, default_value = "25")]
        page_size: usize,

        /// Include transcript snippets
        #[arg(long)]
        transcripts: bool,
    },

    /// Show calls grouped by phone number with per-stage columns
    Stages {
        /// Campaign ID
        campaign_id: String,

        #[command(flatten)]
        filters: StageArgs,

        /// Per-stage category filter, e.g. 2:Qualified,DNC (repeatable)
        #[arg(long = "stage-filter")]
        stage_filters: Vec<String>,

        /// Sort by: id, phone, voice, list-id, timestamp, stageN
        #[arg(long, default_value = "id")]
        sort: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Page number
        #[arg(long, default_value = "1")]
        page: usize,

        /// Numbers per page
        #[arg(long, default_value = "25")]
        page_size: usize,

        /// Print per-stage category breakdowns
        #[arg(long)]
        stats: bool,
    },

    /// Show outcome counts and percentages
    Outcomes {
        /// Campaign ID
        campaign_id: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show call volume over time
    Series {
        /// Campaign ID
        campaign_id: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// summary (cumulative engaged vs drop-off, today) or stats
        /// (per-category by hour or day)
        #[arg(long, default_value = "stats")]
        mode: String,

        /// Restrict stats mode to these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
    },

    /// List call recordings for a campaign
    Recordings {
        /// Campaign ID
        campaign_id: String,

        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Recordings per page
        #[arg(long, default_value = "25")]
        page_size: u32,

        /// Sort by field
        #[arg(long, default_value = "time")]
        sort: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Show available export lists and categories
    ExportOptions {
        /// Campaign ID
        campaign_id: String,
    },

    /// Download call data as CSV
    Export {
        /// Campaign ID
        campaign_id: String,

        /// List IDs to include (repeatable; default: all)
        #[arg(long = "list")]
        lists: Vec<String>,

        /// Categories to include (repeatable; default: all)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,

        /// Output path (default: export_{campaign}_{timestamp}.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the public integration form configuration
    IntegrationForm,

    /// Submit an integration request
    IntegrationRequest {
        /// JSON payload, or @path to read it from a file
        payload: String,
    },

    /// Show or initialize ~/.xdial/config.toml
    Config {
        /// Create a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;

    let file_config = config::XdialConfig::load()?;
    let base_url = cli
        .base_url
        .or_else(|| file_config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    match cli.command {
        Commands::Login {
            username,
            password,
            no_store,
        } => {
            let username = username
                .or_else(|| file_config.auth.as_ref().and_then(|a| a.username.clone()))
                .context("No username. Provide via --username or ~/.xdial/config.toml")?;
            let password = config::resolve_password(password.as_deref(), file_config.auth.as_ref())?;

            let client = ApiClient::new(&base_url, None);
            let resp = client.login(&username, &password)?;
            if no_store {
                println!("{}", resp.access_token);
            } else {
                let session = Session {
                    access_token: resp.access_token.clone(),
                    user_id: resp.user_id.clone(),
                    username: resp.username.clone(),
                    role: resp.role.clone(),
                };
                session.save()?;

                if json_output {
                    json_out::print_json(&serde_json::json!({
                        "user_id": resp.user_id,
                        "username": resp.username,
                        "role": resp.role,
                    }))?;
                } else {
                    println!("Logged in as {} ({})", resp.username, resp.role);
                }
            }
        }

        Commands::Logout => {
            if session::clear()? {
                println!("Logged out.");
            } else {
                println!("No saved session.");
            }
        }

        Commands::Campaigns { client_id } => {
            let (client, saved) = authed_client(&base_url, cli.token)?;
            let client_id = client_id
                .or(saved.map(|s| s.user_id))
                .context("No client ID. Pass one or login first.")?;
            let resp = check_auth(client.client_campaigns(&client_id))?;
            if json_output {
                json_out::print_json(&resp)?;
            } else {
                table::print_campaigns(&resp.campaigns);
            }
        }

        Commands::Dashboard {
            campaign_id,
            filters,
            sort,
            desc,
            page: page_no,
            page_size,
            transcripts,
        } => {
            let (client, _) = authed_client(&base_url, cli.token)?;
            let resp = check_auth(client.fetch_dashboard(
                &campaign_id,
                &filters.fetch_start(),
                filters.end_date.as_deref(),
            ))?;

            let palette = CategoryPalette::from_api(&resp.all_categories);
            let records = normalize_calls(&resp.calls, &palette);
            let active = filters.to_filters()?;
            let mut filtered = active.apply(&records);

            let key: SortKey = sort.parse().map_err(|e: String| anyhow!(e))?;
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            sort_records(&mut filtered, key, direction);

            let total_pages = page::total_pages(filtered.len(), page_size);
            let page_no = page::clamp_page(page_no, total_pages);
            let shown = page::paginate(&filtered, page_no, page_size);

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "campaign": resp.campaign,
                    "client_name": resp.client_name,
                    "total": filtered.len(),
                    "page": page_no,
                    "total_pages": total_pages,
                    "calls": shown,
                }))?;
            } else {
                table::print_records(shown, page_no, total_pages.max(1), filtered.len(), transcripts);
            }
        }

        Commands::Stages {
            campaign_id,
            filters,
            stage_filters,
            sort,
            desc,
            page: page_no,
            page_size,
            stats,
        } => {
            let (client, _) = authed_client(&base_url, cli.token)?;
            let resp = check_auth(client.fetch_dashboard(
                &campaign_id,
                &filters.fetch_start(),
                filters.end_date.as_deref(),
            ))?;

            let mut stage_selection = StageFilters::default();
            for spec in &stage_filters {
                stage_selection.parse_spec(spec).map_err(|e| anyhow!(e))?;
            }

            let palette = CategoryPalette::from_api(&resp.all_categories);
            let grouped = group_by_number(&resp.calls);
            let search = filters.search.clone().unwrap_or_default();
            let mut matching: Vec<_> = grouped
                .calls
                .iter()
                .filter(|c| stage_selection.matches(c))
                .filter(|c| grouped_matches_search(c, &search))
                .cloned()
                .collect();

            let key: SortKey = sort.parse().map_err(|e: String| anyhow!(e))?;
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            sort_grouped(&mut matching, key, direction);

            let total_pages = page::total_pages(matching.len(), page_size);
            let page_no = page::clamp_page(page_no, total_pages);
            let shown = page::paginate(&matching, page_no, page_size);

            if json_output {
                let stage_stats: Vec<_> = grouped
                    .stage_numbers
                    .iter()
                    .map(|&stage| {
                        serde_json::json!({
                            "stage": stage,
                            "categories": stage_category_stats(&grouped.calls, stage, &palette),
                        })
                    })
                    .collect();
                json_out::print_json(&serde_json::json!({
                    "stage_numbers": grouped.stage_numbers,
                    "total": matching.len(),
                    "page": page_no,
                    "total_pages": total_pages,
                    "selected_percentage":
                        selected_filters_percentage(&grouped.calls, &stage_selection),
                    "stage_stats": stage_stats,
                    "calls": shown,
                }))?;
            } else {
                let view = GroupedCalls {
                    calls: shown.to_vec(),
                    stage_numbers: grouped.stage_numbers.clone(),
                };
                table::print_grouped(&view, page_no, total_pages.max(1));
                if !stage_selection.is_empty() {
                    println!(
                        "Selected filters match {}% of all numbers.\n",
                        selected_filters_percentage(&grouped.calls, &stage_selection)
                    );
                }
                if stats {
                    for stage in &grouped.stage_numbers {
                        table::print_stage_stats(
                            *stage,
                            &stage_category_stats(&grouped.calls, *stage, &palette),
                        );
                    }
                }
            }
        }

        Commands::Outcomes {
            campaign_id,
            filters,
        } => {
            let (client, _) = authed_client(&base_url, cli.token)?;
            let resp = check_auth(client.fetch_dashboard(
                &campaign_id,
                &filters.fetch_start(),
                filters.end_date.as_deref(),
            ))?;

            let palette = CategoryPalette::from_api(&resp.all_categories);
            let records = normalize_calls(&resp.calls, &palette);
            let filtered = filters.to_filters()?.apply(&records);
            let outcomes = outcome_summary(&records, &filtered, &palette);

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "total": records.len(),
                    "filtered": filtered.len(),
                    "outcomes": outcomes,
                }))?;
            } else {
                table::print_outcomes(&outcomes, records.len());
            }
        }

        Commands::Series {
            campaign_id,
            filters,
            mode,
            categories,
        } => {
            let (client, _) = authed_client(&base_url, cli.token)?;
            let resp = check_auth(client.fetch_dashboard(
                &campaign_id,
                &filters.fetch_start(),
                filters.end_date.as_deref(),
            ))?;

            let palette = CategoryPalette::from_api(&resp.all_categories);
            let records = normalize_calls(&resp.calls, &palette);
            let active = filters.to_filters()?;
            let filtered = active.apply(&records);

            match mode.as_str() {
                "summary" => {
                    let now = active.resolve_anchor(&filtered);
                    let series = summary_series(&filtered, now);
                    if json_output {
                        json_out::print_json(&series)?;
                    } else {
                        table::print_summary_series(&series);
                    }
                }
                "stats" => {
                    let selected = categories
                        .iter()
                        .map(|c| c.parse::<Category>().map_err(|e| anyhow!(e)))
                        .collect::<Result<Vec<_>>>()?;
                    let series = statistics_series(&filtered, &selected, &palette);
                    if json_output {
                        json_out::print_json(&series)?;
                    } else {
                        table::print_stat_series(&series);
                    }
                }
                other => bail!("unknown series mode: {other}. Use: summary, stats"),
            }
        }

        Commands::Recordings {
            campaign_id,
            date,
            page,
            page_size,
            sort,
            desc,
        } => {
            let (client, _) = authed_client(&base_url, cli.token)?;
            let date = date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
            let dir = if desc { "desc" } else { "asc" };
            let resp =
                check_auth(client.recordings(&campaign_id, &date, page, page_size, &sort, dir))?;
            if json_output {
                json_out::print_json(&resp)?;
            } else {
                table::print_recordings(&resp);
            }
        }

        Commands::ExportOptions { campaign_id } => {
            let (client, _) = authed_client(&base_url, cli.token)?;
            let options = check_auth(client.export_options(&campaign_id))?;
            if json_output {
                json_out::print_json(&options)?;
            } else {
                table::print_export_options(&options);
            }
        }

        Commands::Export {
            campaign_id,
            lists,
            categories,
            start_date,
            end_date,
            output,
        } => {
            let (client, _) = authed_client(&base_url, cli.token)?;
            let options = check_auth(client.export_options(&campaign_id))?;
            let all_lists = options.list_ids_as_strings();
            let all_categories: Vec<String> = options
                .all_categories
                .iter()
                .map(|c| c.name.clone())
                .collect();

            let start = start_date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
            let end = end_date.unwrap_or_else(|| start.clone());
            let request = export::build_export_request(
                &lists,
                &all_lists,
                &categories,
                &all_categories,
                &start,
                &end,
            );

            let body = check_auth(client.export_download(&campaign_id, &request))?;
            let path = output.unwrap_or_else(|| {
                export::export_filename(&campaign_id, Local::now().naive_local())
            });
            export::write_csv(&path, &body)?;

            if export::csv_is_headers_only(&body) {
                eprintln!("Warning: export contains headers only — no rows matched.");
            }
            println!("Wrote {}", path.display());
        }

        Commands::IntegrationForm => {
            let client = ApiClient::new(&base_url, None);
            let form = client.integration_form()?;
            if json_output {
                json_out::print_json(&form)?;
            } else {
                if form.campaigns.is_empty() {
                    println!("No campaigns available.");
                } else {
                    println!("Campaigns: {}", form.campaigns.join(", "));
                }
                table::print_transfer_settings(&form.transfer_settings);
            }
        }

        Commands::IntegrationRequest { payload } => {
            let raw = match payload.strip_prefix('@') {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read payload: {path}"))?,
                None => payload,
            };
            let payload: serde_json::Value =
                serde_json::from_str(&raw).context("Payload is not valid JSON")?;

            let client = ApiClient::new(&base_url, None);
            let resp = client.integration_request(&payload)?;
            if json_output {
                json_out::print_json(&resp)?;
            } else {
                println!("Request submitted.");
            }
        }

        Commands::Config { init } => {
            if init {
                if config::init_config()? {
                    println!("Created {}", config::config_path()?.display());
                } else {
                    println!("Config already exists: {}", config::config_path()?.display());
                }
            } else {
                println!("{}", file_config.display_redacted());
            }
        }
    }

    Ok(())
}

/// Build an API client with a token from --token / XDIAL_TOKEN / the saved
/// session, in that order.
fn authed_client(base_url: &str, token: Option<String>) -> Result<(ApiClient, Option<Session>)> {
    let saved = Session::load()?;
    let token = token.or_else(|| saved.as_ref().map(|s| s.access_token.clone()));
    if token.is_none() {
        bail!("Not logged in. Run `xdial login` first.");
    }
    Ok((ApiClient::new(base_url, token), saved))
}

/// An auth failure invalidates the saved session: clear it so the next
/// command prompts for login instead of retrying a dead token.
fn check_auth<T>(result: Result<T, ApiError>) -> Result<T> {
    match result {
        Err(err) if err.is_auth() => {
            let _ = session::clear();
            bail!("{err}\nSession cleared — please login again.");
        }
        other => Ok(other?),
    }
}
