mod logging;

use std::io::{self, IsTerminal, Read};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use stac_ingest_blob::S3Store;
use stac_ingest_catalog::{CatalogQuery, CmrClient};
use stac_ingest_config::{
  AwsConfig, BoundingBox, BuilderConfig, CatalogConfig, DEFAULT_CMR_SEARCH_URL, DEFAULT_PAGE_SIZE,
  DEFAULT_PROTECTED_BUCKET, GranuleQuery, QueryOverrides, QueueEvent, parse_timestamp,
};
use stac_ingest_ndjson::{NdjsonBuilder, RemoteItemSource, item_s3_client, s3_client};
use stac_ingest_queue::SqsQueue;

/// stac-ingest - CMR granule query and NDJSON batch building for STAC ingestion
#[derive(Parser)]
#[command(name = "stac-ingest")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Log level for stac-ingest (overrides RUST_LOG); "off" disables logging
  #[arg(long, global = true)]
  log_level: Option<String>,

  /// AWS region (default: the SDK's region chain)
  #[arg(long, global = true, env = "AWS_REGION")]
  region: Option<String>,

  /// Endpoint override for S3, SQS and STS, e.g. a LocalStack url
  #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
  endpoint_url: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Search the catalog and publish every STAC item url to the queue
  ///
  /// Reads a query as JSON from stdin; runs the default query when stdin is
  /// empty. Flags override individual fields.
  Query(QueryArgs),

  /// Build one NDJSON batch file from item urls and publish its uri
  ///
  /// Reads a queue batch event ({"Records": [{"body": url}, ...]}) from stdin
  /// unless urls are given with --url.
  Build(BuildArgs),
}

#[derive(Args)]
struct QueryArgs {
  /// Queue the item urls are published to
  #[arg(long, env = "QUEUE_URL")]
  queue_url: String,

  /// Granule search endpoint
  #[arg(long, env = "CMR_URL", default_value = DEFAULT_CMR_SEARCH_URL)]
  cmr_url: String,

  /// Granules requested per catalog page
  #[arg(long, env = "CMR_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
  page_size: u32,

  /// Collection short name, e.g. HLSS30
  #[arg(long)]
  short_name: Option<String>,

  /// Collection version, e.g. 2.0
  #[arg(long)]
  collection_version: Option<String>,

  /// Start of the temporal range (RFC 3339 or YYYY-MM-DD HH:MM:SS, UTC)
  #[arg(long, value_parser = parse_timestamp)]
  start_date: Option<DateTime<Utc>>,

  /// End of the temporal range
  #[arg(long, value_parser = parse_timestamp)]
  end_date: Option<DateTime<Utc>>,

  /// Bounding box as min_lon,min_lat,max_lon,max_lat
  #[arg(long, allow_hyphen_values = true)]
  bbox: Option<BoundingBox>,
}

#[derive(Args)]
struct BuildArgs {
  /// Destination bucket for batch files
  #[arg(long, env = "BUCKET")]
  bucket: String,

  /// Queue the batch file uri is published to
  #[arg(long, env = "QUEUE_URL")]
  queue_url: String,

  /// Role assumed before reading s3:// items
  #[arg(long, env = "ROLE_ARN")]
  role_arn: Option<String>,

  /// Bucket whose gateway hrefs are rewritten to s3:// links
  #[arg(long, env = "PROTECTED_BUCKET", default_value = DEFAULT_PROTECTED_BUCKET)]
  protected_bucket: String,

  /// Item url to include; repeat for a batch. Replaces the stdin event.
  #[arg(long = "url")]
  urls: Vec<String>,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  logging::init_logging(cli.log_level.as_deref());

  let aws = AwsConfig {
    region: cli.region,
    endpoint_url: cli.endpoint_url,
  };

  match cli.command {
    Commands::Query(args) => run_query(args, aws),
    Commands::Build(args) => run_build(args, aws),
  }
}

fn run_query(args: QueryArgs, aws: AwsConfig) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_query_async(args, aws).await })
}

async fn run_query_async(args: QueryArgs, aws: AwsConfig) -> Result<()> {
  let base = match read_stdin()? {
    Some(input) => GranuleQuery::from_json(&input).context("failed to parse query JSON from stdin")?,
    None => GranuleQuery::defaults(),
  };

  let overrides = QueryOverrides {
    short_name: args.short_name,
    version: args.collection_version,
    start_date: args.start_date,
    end_date: args.end_date,
    bbox: args.bbox,
  };
  let query = overrides.apply(base);

  let catalog = CmrClient::new(CatalogConfig {
    search_url: args.cmr_url,
    page_size: args.page_size,
  })
  .context("failed to create catalog client")?;

  let sdk_config = load_aws_config(&aws).await;
  let queue = SqsQueue::new(aws_sdk_sqs::Client::new(&sdk_config), args.queue_url);

  let stage = CatalogQuery::new(Arc::new(catalog), Arc::new(queue));
  let urls = stage.run(&query).await.context("catalog query failed")?;

  println!("{}", serde_json::to_string_pretty(&urls)?);

  Ok(())
}

fn run_build(args: BuildArgs, aws: AwsConfig) -> Result<()> {
  // One invocation is one batch; its fetch tasks share a single worker.
  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()?;
  rt.block_on(async { run_build_async(args, aws).await })
}

async fn run_build_async(args: BuildArgs, aws: AwsConfig) -> Result<()> {
  let config = BuilderConfig {
    role_arn: args.role_arn,
    protected_bucket: args.protected_bucket,
    ..BuilderConfig::new(args.bucket, args.queue_url)
  };
  config.validate().context("invalid builder configuration")?;

  let urls = if args.urls.is_empty() {
    let Some(input) = read_stdin()? else {
      bail!("no item urls: pass --url or pipe a queue event on stdin");
    };
    QueueEvent::from_json(&input)
      .context("failed to parse queue event from stdin")?
      .bodies()
  } else {
    args.urls
  };

  let sdk_config = load_aws_config(&aws).await;
  let force_path_style = aws.endpoint_url.is_some();

  // Credentials are settled once, before any fetch starts.
  let item_s3 = item_s3_client(&sdk_config, config.role_arn.as_deref(), force_path_style)
    .await
    .context("failed to set up item reads")?;
  let http = reqwest::Client::builder()
    .connect_timeout(Duration::from_secs(30))
    .build()
    .context("failed to create http client")?;

  let store = S3Store::new(
    s3_client(&sdk_config, None, force_path_style),
    &config.bucket,
  );
  let queue = SqsQueue::new(aws_sdk_sqs::Client::new(&sdk_config), &config.queue_url);

  let builder = NdjsonBuilder::new(
    Arc::new(RemoteItemSource::new(http, item_s3)),
    Arc::new(store),
    Arc::new(queue),
    &config.protected_bucket,
  );

  let cancel = CancellationToken::new();
  let on_signal = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupt received, cancelling batch");
      on_signal.cancel();
    }
  });

  let output = builder
    .build(&urls, cancel)
    .await
    .context("batch build failed")?;

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

async fn load_aws_config(aws: &AwsConfig) -> SdkConfig {
  let mut loader = aws_config::defaults(BehaviorVersion::latest());
  if let Some(region) = &aws.region {
    loader = loader.region(Region::new(region.clone()));
  }
  if let Some(endpoint) = &aws.endpoint_url {
    loader = loader.endpoint_url(endpoint);
  }
  loader.load().await
}

/// Stdin contents, or `None` when nothing was piped in.
fn read_stdin() -> Result<Option<String>> {
  if io::stdin().is_terminal() {
    return Ok(None);
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read stdin")?;

  if input.trim().is_empty() {
    Ok(None)
  } else {
    Ok(Some(input))
  }
}
