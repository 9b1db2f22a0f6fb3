use crate::application::{Config, GraphModel, HistoryRow, LineDietApp};
use crate::domain::TodaysDisplayInfo;
use crate::entities::WeightLossGoal;
use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Heaviest weight the CLI accepts
const MAX_WEIGHT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

#[derive(Parser)]
#[command(name = "linediet")]
#[command(about = "Track daily weight against a straight-line weight loss goal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a weight (fails if the day already has one)
    Add {
        #[arg(value_parser = parse_weight)]
        weight: Decimal,
        /// Specific date (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Replace the weight recorded for a day
    Edit {
        #[arg(value_parser = parse_weight)]
        weight: Decimal,
        /// Specific date (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete the weight recorded for a day
    Remove {
        /// Date to delete (YYYY-MM-DD format)
        date: String,
    },
    /// List the most recent weights
    History,
    /// Show whether today's weight is on track
    Today,
    /// Print the graph bounds, axis ticks and points
    Graph {
        /// Only show the last N days
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        span: Option<i64>,
    },
    /// Manage the weight loss goal
    Goal {
        #[command(subcommand)]
        action: GoalCommand,
    },
    /// Dump all entries and the goal as JSON
    Export,
}

#[derive(Subcommand)]
pub enum GoalCommand {
    /// Replace the goal
    Set {
        #[arg(value_parser = parse_weight)]
        start_weight: Decimal,
        #[arg(value_parser = parse_weight)]
        goal_weight: Decimal,
        /// Date the goal runs until (YYYY-MM-DD format)
        #[arg(long)]
        goal_date: String,
        /// Date the goal starts (YYYY-MM-DD format, defaults to today)
        #[arg(long)]
        start_date: Option<String>,
    },
    Show,
    Clear,
}

impl Cli {
    pub async fn run() -> anyhow::Result<()> {
        let cli = Self::parse();
        let app = LineDietApp::open(Config::from_env()).await?;
        let today = Local::now().naive_local().date();

        match cli.command {
            Some(Commands::Add { weight, date }) => {
                let date = parse_date_or_today(date)?;
                if app.log_weight(date, weight).await? {
                    println!("Logged {weight} for {date}");
                } else {
                    println!("{date} already has a weight; use `edit` to change it");
                }
            }
            Some(Commands::Edit { weight, date }) => {
                let date = parse_date_or_today(date)?;
                if app.edit_weight(date, weight).await? {
                    println!("Logged {weight} for {date}");
                } else {
                    println!("Could not update the weight for {date}");
                }
            }
            Some(Commands::Remove { date }) => {
                let date = parse_date(&date)?;
                app.delete_weight(date).await?;
                println!("Deleted the weight for {date}");
            }
            Some(Commands::History) => print_history(&app.history().await?),
            Some(Commands::Today) => print_today(&app.today(today).await?),
            Some(Commands::Graph { span }) => {
                let mut graph = app.graph(today).await?;
                if let Some(days) = span {
                    graph.zoom_to_last_days(days);
                }
                print_graph(&graph);
            }
            Some(Commands::Goal { action }) => match action {
                GoalCommand::Set {
                    start_weight,
                    goal_weight,
                    goal_date,
                    start_date,
                } => {
                    let goal = WeightLossGoal::new(
                        parse_date_or_today(start_date)?,
                        start_weight,
                        parse_date(&goal_date)?,
                        goal_weight,
                    );
                    if goal.goal_date <= goal.start_date {
                        anyhow::bail!("The goal date must be after the start date");
                    }
                    if app.set_goal(&goal).await? {
                        println!("Goal set: {goal}");
                    } else {
                        println!("Could not save the goal");
                    }
                }
                GoalCommand::Show => match app.goal().await? {
                    Some(goal) => println!("{goal}"),
                    None => println!("No goal set"),
                },
                GoalCommand::Clear => {
                    if app.clear_goal().await? {
                        println!("Goal cleared");
                    } else {
                        println!("Could not clear the goal");
                    }
                }
            },
            Some(Commands::Export) => println!("{}", app.export().await?),
            None => {
                // Default: today's status followed by recent history
                print_today(&app.today(today).await?);
                println!();
                print_history(&app.history().await?);
            }
        }

        Ok(())
    }
}

fn parse_weight(value: &str) -> Result<Decimal, String> {
    let weight = Decimal::from_str(value).map_err(|e| format!("Invalid weight '{value}': {e}"))?;
    if weight <= Decimal::ZERO || weight > MAX_WEIGHT {
        return Err(format!("Weight must be above 0 and at most {MAX_WEIGHT}"));
    }
    Ok(weight)
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{value}', expected YYYY-MM-DD"))
}

fn parse_date_or_today(value: Option<String>) -> anyhow::Result<NaiveDate> {
    match value {
        Some(value) => parse_date(&value),
        None => Ok(Local::now().naive_local().date()),
    }
}

fn print_today(info: &TodaysDisplayInfo) {
    println!("Status: {:?} ({})", info.status, info.status.color_hex());
    match (info.weight, info.target_weight) {
        (Some(weight), Some(target)) => println!("Today: {weight} (target {target})"),
        (Some(weight), None) => println!("Today: {weight} (no goal set)"),
        (None, _) => println!("No weight logged today"),
    }
}

fn print_history(rows: &[HistoryRow]) {
    if rows.is_empty() {
        println!("No weights logged yet");
        return;
    }
    for row in rows {
        let mark = if row.met_goal { "✓" } else { " " };
        println!("{mark} {}", row.entry);
    }
}

fn print_graph(graph: &GraphModel) {
    let granularity = &graph.granularity;
    println!(
        "Dates:   {} .. {} (showing {} .. {})",
        graph.dates.start, graph.dates.end, graph.visible.start, graph.visible.end
    );
    println!("Weights: {} .. {}", graph.weights.min, graph.weights.max);
    println!(
        "Ticks:   {:?} (minor every {} days, major every {} days)",
        granularity.scale, granularity.minor_step_days, granularity.major_step_days
    );
    for point in graph.visible_points() {
        println!("  {:>8}  {}", granularity.format_label(point.date), point.weight);
    }
    if let Some(line) = &graph.goal_line {
        let line: Vec<String> = line
            .iter()
            .map(|p| format!("{} {}", p.date, p.weight))
            .collect();
        println!("Goal line: {}", line.join(" -> "));
    }
}
