use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use obra_core::{
    Config, Database, NewProject, ProjectStore, ReportStore,
    weather::{HistoryRequest, OpenMeteoProvider, lookup_history},
};

use crate::{form, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "obra", version, about = "Construction diary and weather-history CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up historical weather for a city.
    History {
        /// City name, e.g. "São Paulo".
        city: String,

        /// First day of the range (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the range, inclusive (YYYY-MM-DD).
        #[arg(long)]
        end: NaiveDate,

        /// Language for geocoding results; defaults to the configured one.
        #[arg(long)]
        language: Option<String>,
    },

    /// Manage construction projects.
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Fill in or preview daily reports.
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Register a new project.
    Add {
        /// Project name.
        name: String,

        /// Street address of the site.
        #[arg(long)]
        address: Option<String>,
    },

    /// List registered projects.
    List,

    /// Remove a project. Refused while it still has daily reports.
    Remove {
        /// Project id, as shown by `obra project list`.
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Fill in (or update) the daily report for a project and date.
    Edit {
        /// Project id, as shown by `obra project list`.
        project_id: i64,

        /// Report date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print the daily report for a project and date.
    Show {
        /// Project id, as shown by `obra project list`.
        project_id: i64,

        /// Report date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::History {
                city,
                start,
                end,
                language,
            } => {
                let request = HistoryRequest {
                    city,
                    start,
                    end,
                    language: language.unwrap_or_else(|| config.language().to_owned()),
                };
                let provider = OpenMeteoProvider::new();
                let report = lookup_history(&provider, &request).await?;
                print!("{}", render::history(&report));
            }

            Command::Project(cmd) => {
                let db = open_database(&config)?;
                match cmd {
                    ProjectCommand::Add { name, address } => {
                        let project = ProjectStore::create(&db, &NewProject { name, address })?;
                        println!("Created project #{}: {}", project.id, project.name);
                    }
                    ProjectCommand::List => {
                        let projects = ProjectStore::list(&db)?;
                        if projects.is_empty() {
                            println!("No projects yet. Create one with `obra project add <name>`.");
                        } else {
                            print!("{}", render::project_list(&projects));
                        }
                    }
                    ProjectCommand::Remove { id } => {
                        ProjectStore::delete(&db, id)?;
                        println!("Removed project #{id}.");
                    }
                }
            }

            Command::Report(cmd) => match cmd {
                ReportCommand::Edit { project_id, date } => {
                    let mut db = open_database(&config)?;
                    let date = date.unwrap_or_else(|| Local::now().date_naive());
                    let project = ProjectStore::get(&db, project_id)?;
                    let existing = ReportStore::find_by_project_and_date(&db, project_id, date)?;

                    let draft = form::fill_report(project_id, date, existing.as_ref())?;
                    ReportStore::save(&mut db, &draft)?;
                    println!("Saved report for {} on {date}.", project.name);
                }
                ReportCommand::Show { project_id, date } => {
                    let db = open_database(&config)?;
                    let date = date.unwrap_or_else(|| Local::now().date_naive());
                    let project = ProjectStore::get(&db, project_id)?;

                    match ReportStore::find_by_project_and_date(&db, project_id, date)? {
                        Some(report) => print!("{}", render::report_preview(&project, &report)),
                        None => println!("No report for {} on {date}.", project.name),
                    }
                }
            },
        }

        Ok(())
    }
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let path = config.database_path()?;
    Database::open(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))
}
