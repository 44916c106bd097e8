//! Non-interactive command-line surface over project documents.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, ConfigManager};
use crate::core::aggregate::summarize;
use crate::core::timeline::compute_timeline;
use crate::domain::project::Project;
use crate::errors::ProjectError;
use crate::export::render_report;
use crate::utils::persistence::ProjectStore;

#[derive(Parser)]
#[command(name = "costplan", version, about = "Project cost estimation toolkit")]
pub struct Cli {
    /// Override the store base directory.
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh project document.
    New {
        name: String,
        /// Write to this path instead of the named store.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print summary totals for a project document.
    Show { file: PathBuf },
    /// Render the full plain-text report.
    Export {
        file: PathBuf,
        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load a document and list applied migrations and warnings.
    Check { file: PathBuf },
}

pub fn run_cli() -> Result<(), ProjectError> {
    let cli = Cli::parse();
    let config = ConfigManager::default_location().load_or_default();
    run_command(cli, &config)
}

fn run_command(cli: Cli, config: &Config) -> Result<(), ProjectError> {
    let base_dir = cli.store_dir.or_else(|| config.store_dir.clone());
    let store = ProjectStore::new(base_dir, Some(config.backup_retention))?;

    match cli.command {
        Command::New { name, output } => {
            let project = Project::new(&name);
            let path = match output {
                Some(path) => {
                    store.save_to_path(&project, &path)?;
                    path
                }
                None => store.save_named(&name, &project)?,
            };
            println!("New project created at {}", path.display());
        }
        Command::Show { file } => {
            let report = store.load_from_path(&file)?;
            let project = report.project;
            let timeline = compute_timeline(
                project.project_info.start_date,
                project.project_info.end_date,
            );
            let summary = summarize(&project, &timeline);
            let precision = config.display_precision as usize;
            let money = |value: f64| format!("{}{value:.precision$}", config.currency_symbol);
            println!("Project:            {}", project.project_info.name);
            println!("Timeline:           {} months", timeline.len());
            println!("Internal resources  {}", money(summary.categories.internal));
            println!("Vendor costs        {}", money(summary.categories.vendor));
            println!("Tool costs          {}", money(summary.categories.tool));
            println!("Misc costs          {}", money(summary.categories.misc));
            println!("Subtotal            {}", money(summary.totals.subtotal));
            println!(
                "Contingency ({}%)    {}",
                summary.contingency_percentage,
                money(summary.totals.contingency)
            );
            println!("Grand total         {}", money(summary.totals.total));
        }
        Command::Export { file, output } => {
            let report = store.load_from_path(&file)?;
            let timeline = compute_timeline(
                report.project.project_info.start_date,
                report.project.project_info.end_date,
            );
            let rendered = render_report(&report.project, &timeline);
            match output {
                Some(path) => fs::write(&path, rendered)?,
                None => print!("{rendered}"),
            }
        }
        Command::Check { file } => {
            let report = store.load_from_path(&file)?;
            if report.migrations.is_empty() && report.warnings.is_empty() {
                println!("Document is up to date.");
            }
            for migration in &report.migrations {
                println!("migrated: {migration}");
            }
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
        }
    }
    Ok(())
}
