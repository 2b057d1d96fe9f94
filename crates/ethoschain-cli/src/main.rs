mod settings;

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ethoschain_core::{
    handle_event, render_report, AuditQuery, AuditSettings, Category, FileRuleRepository,
    OutputFormat, PolicyRuleRepository, Supervisor,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::settings::{AppConfig, LogFormat, LogSettings};

#[derive(Parser, Debug)]
#[command(
    name = "ethoschain",
    author,
    version,
    about = "Supplier ethics auditing CLI"
)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON); ETHOS_* variables override it
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory containing a keywords.txt rule pack (defaults to the built-in table)
    #[arg(long = "rules-dir", value_name = "DIR", global = true)]
    rules_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Audit a supplier and print the risk report
    Audit {
        /// Supplier name to investigate
        supplier: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Human)]
        format: ReportFormat,
        /// Only consider findings in this category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        /// Ignore findings published before this date (YYYY-MM-DD)
        #[arg(long = "from", value_name = "DATE")]
        date_from: Option<String>,
        /// Ignore findings published after this date (YYYY-MM-DD)
        #[arg(long = "to", value_name = "DATE")]
        date_to: Option<String>,
    },
    /// Process a JSON audit event and print the status envelope
    Handle {
        /// Event file; read from stdin when omitted
        #[arg(long, value_name = "FILE")]
        event: Option<PathBuf>,
    },
    /// List the active policy rules
    ListRules {
        /// Emit rules as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Human,
    Json,
    Yaml,
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut app = settings::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.rules_dir {
        app.audit.rules_dir = Some(dir.clone());
    }
    init_tracing(&app.logging);
    debug!(
        config = ?cli.config,
        rules_dir = ?app.audit.rules_dir,
        news_endpoint = ?app.audit.news.endpoint,
        "configuration loaded"
    );

    match cli.command.unwrap_or(Commands::ListRules { json: false }) {
        Commands::Audit {
            supplier,
            format,
            category,
            date_from,
            date_to,
        } => {
            let query = AuditQuery {
                supplier_name: supplier,
                category,
                date_from,
                date_to,
            };
            audit(&app, &query, format).await?
        }
        Commands::Handle { event } => handle(&app, event.as_deref()).await?,
        Commands::ListRules { json } => list_rules(&app.audit, json).await?,
    }
    Ok(())
}

async fn audit(app: &AppConfig, query: &AuditQuery, format: ReportFormat) -> Result<()> {
    let supervisor = Supervisor::from_settings(&app.audit).await?;
    let report = supervisor.audit_query(query).await?;
    let output = match format {
        ReportFormat::Human => {
            render_report(&report, OutputFormat::Human, supervisor.thresholds())?
        }
        ReportFormat::Json => render_report(&report, OutputFormat::Json, supervisor.thresholds())?,
        ReportFormat::Yaml => serde_yaml::to_string(&report)?,
    };
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

async fn handle(app: &AppConfig, event_path: Option<&Path>) -> Result<()> {
    let raw = match event_path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read event file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read event from stdin")?;
            buffer
        }
    };
    let event: serde_json::Value =
        serde_json::from_str(&raw).context("event must be a JSON document")?;
    let supervisor = Supervisor::from_settings(&app.audit).await?;
    let envelope = handle_event(&supervisor, event).await;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

async fn list_rules(settings: &AuditSettings, json: bool) -> Result<()> {
    let (rules, origin) = match &settings.rules_dir {
        Some(dir) => {
            let repo = FileRuleRepository::new(dir);
            let rules = PolicyRuleRepository::load_rules(&repo)
                .await
                .with_context(|| format!("failed to load rules from {}", dir.display()))?;
            (rules, dir.display().to_string())
        }
        None => (ethoschain_core::builtin_rules(), "built-in table".to_string()),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    println!("{} rule(s) loaded from {}", rules.len(), origin);
    for rule in rules {
        let severity = rule
            .tier
            .severity()
            .map(|severity| format!(", severity {}", severity.as_str()))
            .unwrap_or_default();
        println!(
            "- {id:<20} [{tier:11}] {keyword:?}{severity}",
            id = rule.id,
            tier = rule.tier.as_str(),
            keyword = rule.keyword,
            severity = severity
        );
    }
    Ok(())
}

fn init_tracing(settings: &LogSettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tokio=warn", settings.level)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr);
    let _ = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Console => builder.try_init(),
    };
}
