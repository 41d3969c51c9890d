use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use lauscraper::{
    config::{ChunkPlan, ChunkRange, OutputFormat, PipelineConfig},
    fetch::{fetch_missing, HttpAcquisition},
    output::write_dataset,
    pipeline::{Pipeline, RunSummary},
};
use std::{collections::HashSet, path::PathBuf, time::Instant};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Download BLS LAUS flat files and build a county-by-month employment table"
)]
struct Args {
    /// YAML file with pipeline settings; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where the downloaded `.txt` feeds are stored.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Defaults to the output file's extension, then csv.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Year blocks to process, e.g. `90-94,95-99`.
    #[arg(long, value_delimiter = ',')]
    chunks: Option<Vec<ChunkRange>>,
    /// Maximum simultaneous downloads.
    #[arg(long)]
    concurrency: Option<usize>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    user_agent: Option<String>,
    /// Use only files already in the data dir.
    #[arg(long)]
    offline: bool,
    /// Check the configured chunks against the remote directory listing.
    #[arg(long)]
    list_remote: bool,
    /// Also write a JSON run summary here.
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn resolve_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
        // an explicit output path decides the format unless --format says otherwise
        if let Some(format) = OutputFormat::from_path(output) {
            config.format = format;
        }
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(chunks) = &args.chunks {
        config.chunks = ChunkPlan::new(chunks.clone());
    }
    if let Some(n) = args.concurrency {
        config.concurrency = n;
    }
    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }
    if let Some(agent) = &args.user_agent {
        config.user_agent = agent.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lauscraper=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    let started_at = Utc::now();
    let start = Instant::now();
    info!(
        data_dir = %config.data_dir.display(),
        output = %config.output.display(),
        chunks = config.chunks.len(),
        "startup"
    );

    // ─── 2) acquire feeds ────────────────────────────────────────────
    if args.offline {
        info!("offline: using files already in the data dir");
    } else {
        let acq = HttpAcquisition::new(&config.base_url, &config.user_agent)?;

        if args.list_remote {
            let published: HashSet<String> =
                acq.list_remote_data_files().await?.into_iter().collect();
            info!(published = published.len(), "remote listing fetched");
            for file_id in config.chunks.file_ids() {
                if !published.contains(&file_id) {
                    warn!(%file_id, "configured chunk is not published");
                }
            }
        }

        fetch_missing(
            &acq,
            &config.data_dir,
            &config.file_ids(),
            config.concurrency,
        )
        .await?;
    }

    // ─── 3) decode + reshape off the runtime ─────────────────────────
    let pipeline = Pipeline::from_config(&config);
    let run = tokio::task::spawn_blocking(move || pipeline.run())
        .await
        .context("pipeline task panicked")??;

    // ─── 4) write output ─────────────────────────────────────────────
    let output = config.output.clone();
    let format = config.format;
    let dataset = run.dataset;
    let rows_written = tokio::task::spawn_blocking(move || write_dataset(&dataset, &output, format))
        .await
        .context("output task panicked")??;

    if let Some(path) = &args.summary {
        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            output: config.output.clone(),
            rows_written,
            chunks: run.reports,
        };
        summary.write_json(path)?;
        info!(path = %path.display(), "run summary written");
    }

    info!(
        rows = rows_written,
        output = %config.output.display(),
        elapsed = ?start.elapsed(),
        "done"
    );
    Ok(())
}
