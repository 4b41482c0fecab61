use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::Url;

use cloudevents_http::config::{load_config, AppConfig};
use cloudevents_http::extensions::{DistributedTracing, ExtensionRegistry, Sampling};
use cloudevents_http::http::{EventClient, HttpBinding, Mode};
use cloudevents_http::Envelope;

#[derive(Parser)]
#[command(name = "ce-cli")]
#[command(about = "Send CloudEvents over HTTP", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080/events")]
    url: String,

    /// Binding settings (markers, header prefix) are read from this file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one event and print the reply as structured JSON
    Send(SendArgs),
}

#[derive(clap::Args)]
struct SendArgs {
    /// Event id (random UUID when omitted)
    #[arg(long)]
    id: Option<String>,

    #[arg(long, default_value = "/ce-cli")]
    source: String,

    #[arg(long = "type")]
    event_type: String,

    /// Payload; read as a JSON document when the content type is JSON
    #[arg(long)]
    data: Option<String>,

    #[arg(long)]
    content_type: Option<String>,

    #[arg(long)]
    schema_url: Option<String>,

    /// Stamp the event with the current time
    #[arg(long)]
    now: bool,

    #[arg(long, value_enum, default_value_t = WireMode::Binary)]
    mode: WireMode,

    #[arg(long)]
    traceparent: Option<String>,

    #[arg(long, requires = "traceparent")]
    tracestate: Option<String>,

    #[arg(long)]
    sampled_rate: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum WireMode {
    Binary,
    Structured,
}

impl From<WireMode> for Mode {
    fn from(mode: WireMode) -> Self {
        match mode {
            WireMode::Binary => Mode::Binary,
            WireMode::Structured => Mode::Structured,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Send(args) => {
            let binding = Arc::new(HttpBinding::new(&config.binding, ExtensionRegistry::standard()?));
            let client = EventClient::new(binding.clone(), Url::parse(&cli.url)?);

            let envelope = build_event(&args, &config)?;
            match client.send_and_receive(&envelope, args.mode.into()).await? {
                Some(reply) => {
                    let document = binding.structured_json(&reply)?;
                    println!("{}", serde_json::to_string_pretty(&document)?);
                }
                None => println!("Event {} accepted", envelope.id()),
            }
        }
    }

    Ok(())
}

fn build_event(args: &SendArgs, config: &AppConfig) -> Result<Envelope, Box<dyn std::error::Error>> {
    let mut builder = Envelope::builder()
        .source(&args.source)
        .event_type(&args.event_type)
        .spec_version(&config.binding.spec_version);

    builder = match &args.id {
        Some(id) => builder.id(id),
        None => builder.random_id(),
    };
    if args.now {
        builder = builder.time(chrono::Utc::now());
    }
    if let Some(schema_url) = &args.schema_url {
        builder = builder.schema_url(schema_url);
    }
    if let Some(content_type) = &args.content_type {
        builder = builder.content_type(content_type);
    }
    if let Some(data) = &args.data {
        builder = builder.data(data.as_str());
    }
    if let Some(traceparent) = &args.traceparent {
        let mut tracing = DistributedTracing::new(traceparent.as_str())?;
        if let Some(tracestate) = &args.tracestate {
            tracing = tracing.with_tracestate(tracestate);
        }
        builder = builder.extension(tracing);
    }
    if let Some(rate) = args.sampled_rate {
        builder = builder.extension(Sampling::new(rate)?);
    }

    Ok(builder.build()?)
}
