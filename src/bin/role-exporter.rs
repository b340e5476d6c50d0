use clap::Parser;
use anyhow::Result;
use role_exporter::config::loader;
use role_exporter::observability::metrics::write_textfile;
use role_exporter::orchestrator::{build_client, run_export};
use role_exporter::utils::logging::{self, LogLevel};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config; without it defaults and MIMECAST_CLIENT_ID / MIMECAST_CLIENT_SECRET are used
    #[arg(short, long, env = "ROLE_EXPORTER_CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// CSV destination, overrides export.output_path
    #[arg(short, long)]
    output: Option<String>,
    /// stop listing after this many pages, overrides export.max_pages
    #[arg(long)]
    max_pages: Option<u32>,
    /// node_exporter textfile target, overrides settings.metrics.textfile_path
    #[arg(long)]
    metrics_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load config, apply CLI overrides
    // -------------------------------

    let args = Args::parse();
    let mut config = loader::run(args.config.as_deref())?;
    if let Some(output) = args.output {
        config.export.output_path = output;
    }
    if let Some(max_pages) = args.max_pages {
        config.export.max_pages = Some(max_pages);
    }
    if let Some(metrics_file) = args.metrics_file {
        config.settings.metrics.textfile_path = Some(metrics_file);
    }
    logging::run(&config, args.log_level);

    // -------------------------------
    // 2. Export
    // -------------------------------

    let client = build_client(&config)?;
    info!("export starting...");
    let result = run_export(&config, &client).await;

    // -------------------------------
    // 3. Metrics, written for failed runs too
    // -------------------------------

    if let Some(path) = &config.settings.metrics.textfile_path {
        if let Err(e) = write_textfile(path).await {
            error!("{}", e);
        }
    }

    let summary = result?;
    info!(
        "export finished: users {}, candidates {}, roles {}, failed lookups {}, excluded {}, exported {}",
        summary.users_listed,
        summary.candidates,
        summary.roles_resolved,
        summary.lookups_failed,
        summary.rows_excluded,
        summary.rows_exported,
    );
    Ok(())
}
