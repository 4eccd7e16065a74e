// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use clap::{Parser, Subcommand};
use fitness_tracker::config::{Config, FitnessConfig};
use fitness_tracker::intelligence::{
    compute_progress, ActivityClassifier, GoalProgress, Period, ProgressMetric, WorkoutSummary,
};
use fitness_tracker::logging::LoggingConfig;
use fitness_tracker::models::{Goal, GoalInput, WorkoutRecord};
use fitness_tracker::providers::remote::RemoteClient;
use fitness_tracker::providers::{create_source, SampleQuery, WorkoutSource};
use fitness_tracker::storage::{FileStore, GoalStore, KeyValueStore, SyncState};
use fitness_tracker::sync::SyncService;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "fitness-tracker")]
#[command(version, about = "Classify workouts, sync them and track progress against fitness goals")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the fitness configuration file (activity codes, weight estimation)
    #[arg(long, global = true)]
    fitness_config: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show progress against the current year's goal
    Progress {
        /// Health-data export to read workouts from
        #[arg(long, conflicts_with = "remote")]
        export: Option<String>,

        /// Read workouts from the remote API instead of an export
        #[arg(long)]
        remote: bool,
    },

    /// Summarize recent workouts
    Summary {
        /// Health-data export to read workouts from
        #[arg(long)]
        export: String,

        /// Number of top activities to list
        #[arg(long, default_value = "3")]
        top: usize,
    },

    /// Classify a single workout sample
    Classify {
        /// App or device name that recorded the workout
        #[arg(long)]
        source: String,

        /// Activity-type name or numeric code
        #[arg(long)]
        activity: String,

        /// Active energy in kilocalories
        #[arg(long)]
        calories: Option<f64>,

        /// Sample metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Push workouts recorded since the last sync
    Sync {
        /// Health-data export to read workouts from
        #[arg(long)]
        export: String,
    },

    /// Manage fitness goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Create a goal for a year
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        year: Option<i32>,

        /// Total pounds to lift over the year
        #[arg(long)]
        weight: f64,

        #[arg(long, default_value = "45")]
        minutes_per_session: i64,

        #[arg(long, default_value = "5")]
        weekly_sessions: i64,

        /// Only store the goal locally
        #[arg(long)]
        offline: bool,
    },

    /// Show the goal for a year
    Show {
        #[arg(long)]
        year: Option<i32>,

        /// Refresh the local cache from the remote API first
        #[arg(long)]
        refresh: bool,
    },
}

struct App {
    config: Config,
    fitness_config: FitnessConfig,
    store: Arc<dyn KeyValueStore>,
    json: bool,
}

impl App {
    fn remote(&self) -> Result<RemoteClient> {
        RemoteClient::new(&self.config.api_base_url, self.config.request_timeout())
            .context("Failed to create remote API client")
    }

    fn classifier(&self) -> ActivityClassifier {
        ActivityClassifier::new(self.fitness_config.clone())
    }

    fn goals(&self) -> GoalStore {
        GoalStore::new(self.store.clone())
    }

    fn print<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    logging.init()?;

    let config = Config::load(cli.config)?;
    let fitness_config = FitnessConfig::load(cli.fitness_config)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage_path));

    let app = App {
        config,
        fitness_config,
        store,
        json: cli.json,
    };
    let now = Utc::now();

    match cli.command {
        Commands::Progress { export, remote } => show_progress(&app, export, remote, now).await,
        Commands::Summary { export, top } => show_summary(&app, &export, top, now).await,
        Commands::Classify {
            source,
            activity,
            calories,
            metadata,
        } => classify(&app, &source, &activity, calories, metadata),
        Commands::Sync { export } => sync(&app, &export, now).await,
        Commands::Goal { command } => match command {
            GoalCommands::Create {
                name,
                year,
                weight,
                minutes_per_session,
                weekly_sessions,
                offline,
            } => {
                let input = GoalInput {
                    name,
                    year: year.unwrap_or_else(|| now.year()),
                    annual_weight_target: weight,
                    minutes_per_session,
                    weekly_sessions_target: weekly_sessions,
                };
                create_goal(&app, input, offline, now).await
            }
            GoalCommands::Show { year, refresh } => {
                show_goal(&app, year.unwrap_or_else(|| now.year()), refresh).await
            }
        },
    }
}

fn year_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

async fn load_workouts(
    app: &App,
    source: &dyn WorkoutSource,
    query: SampleQuery,
) -> Result<Vec<WorkoutRecord>> {
    let classifier = app.classifier();
    let samples = source.fetch_samples(query).await?;

    let mut records = Vec::with_capacity(samples.len());
    for sample in &samples {
        match classifier.to_record(sample) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping workout sample: {}", e),
        }
    }
    Ok(records)
}

async fn show_progress(app: &App, export: Option<String>, remote: bool, now: DateTime<Utc>) -> Result<()> {
    let goal = app
        .goals()
        .current_goal(now)
        .await?
        .with_context(|| format!("No goal found for {}. Create one with `goal create`", now.year()))?;

    let workouts = if remote {
        app.remote()?.fetch_workouts().await?
    } else {
        let path = export.context("Either --export or --remote is required")?;
        let source = create_source("health_export", Some(&path))?;
        load_workouts(app, source.as_ref(), SampleQuery::between(year_start(now), now)).await?
    };

    let progress = compute_progress(&goal, &workouts, now);
    app.print(&progress, || render_progress(&goal, &progress))
}

fn render_progress(goal: &Goal, progress: &GoalProgress) -> String {
    let mut lines = vec![format!(
        "{} (Q{} {}, {} days left in quarter)",
        goal.name(),
        progress.current_quarter,
        progress.current_year,
        progress.days_remaining_in_quarter
    )];

    for period in [Period::Quarter, Period::Year] {
        lines.push(format!("\n{} progress", period));
        for metric in ProgressMetric::ALL {
            lines.push(format!(
                "  {:<20} {:>12.0} / {:>12.0} {:<8} target {:>10.0}  {}",
                metric.title(),
                progress.actual(metric, period),
                progress.expected(metric, period),
                metric.unit(),
                goal.target(metric, period),
                progress.status(metric, period)
            ));
        }
        lines.push(format!(
            "  Sessions needed: {}",
            progress.sessions_needed(period)
        ));
    }

    lines.join("\n")
}

async fn show_summary(app: &App, export: &str, top: usize, now: DateTime<Utc>) -> Result<()> {
    let source = create_source("health_export", Some(export))?;
    let query = SampleQuery::between(now - Duration::days(app.config.recent_days), now).newest_first();
    let workouts = load_workouts(app, source.as_ref(), query).await?;

    let summary = WorkoutSummary::from_workouts(&workouts);
    app.print(&summary, || {
        let mut lines = vec![
            format!("Workouts in the last {} days: {}", app.config.recent_days, summary.total_sessions),
            format!("Total minutes: {}", summary.total_minutes),
            format!("Total miles: {:.1}", summary.total_miles),
            format!("Total weight lifted: {:.0} lbs", summary.total_weight),
        ];
        if let Some(longest) = &summary.longest_distance {
            lines.push(format!(
                "Longest distance: {:.1} mi ({} on {})",
                longest.miles().unwrap_or_default(),
                longest.activity(),
                longest.date().format("%Y-%m-%d")
            ));
        }
        if let Some(heaviest) = &summary.most_weight {
            lines.push(format!(
                "Most weight: {:.0} lbs ({} on {})",
                heaviest.weight().unwrap_or_default(),
                heaviest.source(),
                heaviest.date().format("%Y-%m-%d")
            ));
        }
        for entry in summary.top_activities(top) {
            lines.push(format!(
                "  {:<16} {:>4} sessions {:>6} min",
                entry.activity, entry.sessions, entry.minutes
            ));
        }
        lines.join("\n")
    })
}

fn classify(
    app: &App,
    source: &str,
    activity: &str,
    calories: Option<f64>,
    metadata: Option<String>,
) -> Result<()> {
    let metadata: HashMap<String, serde_json::Value> = match metadata {
        Some(raw) => serde_json::from_str(&raw).context("Metadata must be a JSON object")?,
        None => HashMap::new(),
    };

    let classification = app.classifier().classify(source, activity, &metadata, calories);

    #[derive(Serialize)]
    struct Output {
        source: String,
        activity: String,
        weight: Option<f64>,
    }
    let output = Output {
        source: classification.source.to_string(),
        activity: classification.activity.to_string(),
        weight: classification.weight,
    };

    app.print(&output, || match output.weight {
        Some(weight) => format!("{} / {} ({:.0} lbs)", output.source, output.activity, weight),
        None => format!("{} / {}", output.source, output.activity),
    })
}

async fn sync(app: &App, export: &str, now: DateTime<Utc>) -> Result<()> {
    let source = create_source("health_export", Some(export))?;
    let service = SyncService::new(
        Arc::from(source),
        app.classifier(),
        app.remote()?,
        SyncState::new(app.store.clone()),
    )
    .with_windows(app.config.recent_days, app.config.unsynced_lookback_days);

    let report = service.sync_unsynced(now).await?;
    app.print(&report, || {
        format!(
            "Synced {} new workouts ({} already on server, {} rejected) since {}",
            report.created,
            report.duplicates,
            report.rejected,
            report.window_start.format("%Y-%m-%d %H:%M")
        )
    })
}

async fn create_goal(app: &App, input: GoalInput, offline: bool, now: DateTime<Utc>) -> Result<()> {
    input.validate()?;

    let goal = if offline {
        input.create_goal(now)?
    } else {
        app.remote()?.create_goal(&input).await?
    };
    app.goals().replace_one(goal.clone()).await?;

    info!(goal.id = %goal.id(), goal.year = goal.year(), offline, "Goal saved");
    app.print(&goal, || render_goal(&goal))
}

async fn show_goal(app: &App, year: i32, refresh: bool) -> Result<()> {
    let goals = app.goals();
    if refresh {
        let remote_goals = app.remote()?.fetch_goals().await?;
        goals.save_all(&remote_goals).await?;
    }

    let goal = goals
        .get_by_year(year)
        .await?
        .with_context(|| format!("No goal found for {}", year))?;
    app.print(&goal, || render_goal(&goal))
}

fn render_goal(goal: &Goal) -> String {
    [
        format!("{} ({})", goal.name(), goal.year()),
        format!("  Annual weight target:    {:.0} lbs", goal.annual_weight_target()),
        format!("  Quarterly weight target: {:.0} lbs", goal.quarterly_weight_target()),
        format!(
            "  Sessions:                {} per week x {} min",
            goal.weekly_sessions_target(),
            goal.minutes_per_session()
        ),
        format!("  Weekly minutes target:   {}", goal.weekly_minutes_target()),
        format!("  Quarterly minutes:       {}", goal.quarterly_minutes_target()),
        format!("  Quarterly sessions:      {}", goal.quarterly_sessions_target()),
        format!("  Annual minutes:          {}", goal.annual_minutes_target()),
    ]
    .join("\n")
}
