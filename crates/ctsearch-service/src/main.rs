//! `ctsearch` binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ctsearch_engine::{LegacyLink, LinkDb, LinkRecord, LinkStats, TranslationContext};
use ctsearch_loader::RowPolicy;
use ctsearch_service::{
    load_translation_context, read_link_urls, JsonSavedSearchSource, LinkProcessor,
    ProcessorConfig, ServiceResult, DEFAULT_CONCURRENCY,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use crate::cli::{ClassifyArgs, Cli, Command, GenerateArgs, StatsArgs};

const DEFAULT_CODE_MAP_PATH: &str = "data";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let ctx = load_context(&cli)?;

    match cli.command {
        Command::GenerateLinkDb(args) => generate_link_db(args, ctx).await?,
        Command::LinkOutputStats(args) => link_output_stats(args, &ctx)?,
        Command::ClassifyUrl(args) => classify_url(args, &ctx).await?,
    }

    Ok(())
}

fn load_context(cli: &Cli) -> ServiceResult<TranslationContext> {
    // Get dataset path from the CLI, the environment or the default
    let data_path = cli.code_map.clone().unwrap_or_else(|| {
        PathBuf::from(
            std::env::var("CTSEARCH_CODE_MAP")
                .unwrap_or_else(|_| DEFAULT_CODE_MAP_PATH.to_string()),
        )
    });

    let policy = if cli.strict_code_map {
        RowPolicy::Strict
    } else {
        RowPolicy::SkipAndCount
    };
    load_translation_context(&data_path, policy)
}

async fn load_source(path: Option<&PathBuf>) -> ServiceResult<JsonSavedSearchSource> {
    match path {
        Some(path) => JsonSavedSearchSource::load_from_path(path).await,
        None => Ok(JsonSavedSearchSource::empty()),
    }
}

async fn generate_link_db(args: GenerateArgs, ctx: TranslationContext) -> ServiceResult<()> {
    let concurrency = args.concurrency.unwrap_or_else(|| {
        std::env::var("CTSEARCH_CONCURRENCY")
            .ok()
            .and_then(|c| c.parse().ok())
            .unwrap_or(DEFAULT_CONCURRENCY)
    });

    let source = load_source(args.saved_searches.as_ref()).await?;
    if source.is_empty() {
        tracing::warn!("No saved searches loaded; saved-search links will fail");
    }

    let urls = read_link_urls(&args.input)?;
    tracing::info!("Processing {} links with concurrency {}", urls.len(), concurrency);

    let processor = LinkProcessor::new(Arc::new(source), ctx, ProcessorConfig { concurrency });
    let report = processor.process(urls).await?;

    report.save(&args.output, args.failures.as_deref())
}

fn link_output_stats(args: StatsArgs, ctx: &TranslationContext) -> ServiceResult<()> {
    let db = LinkDb::load_from_path(&args.input)?;
    let stats = LinkStats::collect(&db, ctx);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

async fn classify_url(
    args: ClassifyArgs,
    ctx: &TranslationContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = load_source(args.saved_searches.as_ref()).await?;
    let link = LegacyLink::parse(&args.url)?;
    let search = link.resolve(&source).await?;

    let mut record = LinkRecord::new(args.url, search);
    record.classify(ctx);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
