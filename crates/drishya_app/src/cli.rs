use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use drishya_core::{CrudRequest, FieldFilter, Msg, RecordQuery, TimeRange, DEFAULT_PAGE_SIZE};
use drishya_logging::LogDestination;

/// DrishyaScan command-line client.
#[derive(Debug, Parser)]
#[command(name = "drishya", version, about, long_about = None)]
pub struct Cli {
    /// REST API base url.
    #[arg(long, env = "DRISHYA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Live update websocket url.
    #[arg(long, env = "DRISHYA_WS_URL", global = true)]
    pub ws_url: Option<String>,

    /// Bearer token from `drishya login`.
    #[arg(long, env = "DRISHYA_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Write logs to this file instead of the terminal.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// With --log-file, keep logging to the terminal as well.
    #[arg(long, global = true, requires = "log_file")]
    pub log_to_terminal: bool,

    /// Log debug output.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match (&self.log_file, self.log_to_terminal) {
            (Some(path), true) => LogDestination::Both(path.clone()),
            (Some(path), false) => LogDestination::File(path.clone()),
            (None, _) => LogDestination::Terminal,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and print a token for DRISHYA_TOKEN.
    Login {
        email: String,
        #[arg(long, env = "DRISHYA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List the issues found by one scan.
    Issues {
        #[arg(long)]
        scan_id: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// List scans, optionally for one website.
    Scans {
        #[arg(long, conflicts_with = "time_range")]
        website_id: Option<String>,
        #[arg(long, value_enum)]
        time_range: Option<TimeRangeArg>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// List websites.
    Websites {
        #[command(flatten)]
        list: ListArgs,
    },
    /// List projects.
    Projects {
        #[command(flatten)]
        list: ListArgs,
    },
    CreateProject {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    UpdateProject {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    DeleteProject {
        id: String,
    },
    CreateWebsite {
        url: String,
        #[arg(long)]
        project_id: String,
    },
    UpdateWebsite {
        id: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        project_id: String,
    },
    DeleteWebsite {
        id: String,
    },
    /// Start a scan and show the website's scans.
    StartScan {
        website_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeRangeArg {
    Week,
    Month,
    Year,
}

impl From<TimeRangeArg> for TimeRange {
    fn from(value: TimeRangeArg) -> Self {
        match value {
            TimeRangeArg::Week => TimeRange::Week,
            TimeRangeArg::Month => TimeRange::Month,
            TimeRangeArg::Year => TimeRange::Year,
        }
    }
}

/// Controls shared by every list command.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Case-insensitive text search.
    #[arg(long)]
    pub search: Option<String>,

    /// FIELD=VALUE; repeat a field to match any of several values.
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Sort field; repeating a field flips its direction.
    #[arg(long = "sort", value_name = "FIELD")]
    pub sorts: Vec<String>,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Keep the view open and apply live updates for this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub watch: Option<u64>,
}

impl ListArgs {
    /// Translates the flags into the messages a user would produce by
    /// clicking through the list screen.
    pub fn messages(&self) -> Result<Vec<Msg>> {
        let mut msgs = vec![Msg::PageSizeChanged(self.page_size)];
        if let Some(term) = &self.search {
            msgs.push(Msg::SearchChanged(term.clone()));
        }
        for raw in &self.filters {
            let Some((field, value)) = raw.split_once('=') else {
                bail!("filter {raw:?} must look like FIELD=VALUE");
            };
            let (field, value) = (field.trim(), value.trim());
            if field.is_empty() || value.is_empty() {
                bail!("filter {raw:?} must look like FIELD=VALUE");
            }
            let filter = FieldFilter::parse(value);
            if filter.is_active() {
                msgs.push(Msg::FilterValueToggled {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            } else {
                msgs.push(Msg::FilterChanged {
                    field: field.to_string(),
                    filter,
                });
            }
        }
        msgs.extend(self.sorts.iter().cloned().map(Msg::SortClicked));
        msgs.push(Msg::PageRequested(self.page));
        Ok(msgs)
    }
}

/// What a command asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Login { email: String, password: String },
    List { query: RecordQuery, list: ListArgsPlan },
    Write { request: CrudRequest, then_show: RecordQuery },
}

/// List settings carried into a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ListArgsPlan {
    pub messages: Vec<Msg>,
    pub page_size: usize,
    pub watch: Option<u64>,
}

impl Command {
    pub fn plan(self) -> Result<Plan> {
        let list = |query: RecordQuery, args: ListArgs| -> Result<Plan> {
            Ok(Plan::List {
                query,
                list: ListArgsPlan {
                    messages: args.messages()?,
                    page_size: args.page_size,
                    watch: args.watch,
                },
            })
        };
        let write = |request: CrudRequest, then_show: RecordQuery| -> Result<Plan> {
            Ok(Plan::Write { request, then_show })
        };

        match self {
            Command::Login { email, password } => Ok(Plan::Login { email, password }),
            Command::Issues { scan_id, list: args } => list(RecordQuery::ScanIssues { scan_id }, args),
            Command::Scans {
                website_id: Some(website_id),
                list: args,
                ..
            } => list(RecordQuery::WebsiteScans { website_id }, args),
            Command::Scans {
                website_id: None,
                time_range,
                list: args,
            } => list(
                RecordQuery::Scans {
                    time_range: time_range.map(TimeRange::from),
                },
                args,
            ),
            Command::Websites { list: args } => list(RecordQuery::Websites, args),
            Command::Projects { list: args } => list(RecordQuery::Projects, args),
            Command::CreateProject { name, description } => write(
                CrudRequest::CreateProject { name, description },
                RecordQuery::Projects,
            ),
            Command::UpdateProject {
                id,
                name,
                description,
            } => write(
                CrudRequest::UpdateProject {
                    id,
                    name,
                    description,
                },
                RecordQuery::Projects,
            ),
            Command::DeleteProject { id } => {
                write(CrudRequest::DeleteProject { id }, RecordQuery::Projects)
            }
            Command::CreateWebsite { url, project_id } => write(
                CrudRequest::CreateWebsite { url, project_id },
                RecordQuery::Websites,
            ),
            Command::UpdateWebsite {
                id,
                url,
                project_id,
            } => write(
                CrudRequest::UpdateWebsite {
                    id,
                    url,
                    project_id,
                },
                RecordQuery::Websites,
            ),
            Command::DeleteWebsite { id } => {
                write(CrudRequest::DeleteWebsite { id }, RecordQuery::Websites)
            }
            Command::StartScan { website_id } => write(
                CrudRequest::StartScan {
                    website_id: website_id.clone(),
                },
                RecordQuery::WebsiteScans { website_id },
            ),
        }
    }
}
