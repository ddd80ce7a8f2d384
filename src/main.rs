use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use spoken_finnish::config::{Config, DEFAULT_CONFIG_FILE};
use spoken_finnish::speech::{Capability, ChannelRecognizer, RecognitionFeed, RecognitionOutcome};
use spoken_finnish::tts::{AzureTts, TtsConfig};
use spoken_finnish::{ApiClient, FeedbackController};

#[derive(Parser, Debug)]
#[command(name = "spoken-finnish", about = "Finnish sentence feedback and pronunciation practice")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Overrides `api.base_url` from the configuration file
    #[arg(long)]
    base_url: Option<String>,
}

type Controller = FeedbackController<ApiClient, AzureTts, ChannelRecognizer>;

fn init_logging(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}

fn print_help() {
    println!("📋 Commands:");
    println!("   <sentence>   get feedback on a Finnish sentence");
    println!("   :listen      hear the corrected sentence");
    println!("   :speak       check pronunciation (type what the recognizer heard, empty line = nothing)");
    println!("   :reset       clear everything");
    println!("   :show        print the current page");
    println!("   :quit        exit");
}

fn print_page(controller: &Controller) {
    let page = controller.page();
    println!("── feedback ──────────────\n{}", page.feedback.html());
    println!("── pronunciation ─────────\n{}", page.pronunciation.html());
    if !page.speech_status.is_empty() {
        println!("🎤 {}", page.speech_status);
    }
}

fn show_notice(controller: &mut Controller) {
    if let Some(notice) = controller.page_mut().take_notice() {
        println!("⚠️  {}", notice);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::load_from(&args.config)?;
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    init_logging(&config.logging.filter);

    println!("🇫🇮 Spoken Finnish");
    tracing::info!(base_url = %config.api.base_url, "using correction service");

    let api_client = ApiClient::new(&config.api)?;
    let synthesizer: Capability<AzureTts> = TtsConfig::from_config(&config.speech).map(AzureTts::new).into();
    if !synthesizer.is_available() {
        tracing::warn!("no Azure speech credentials configured, listening is disabled");
    }
    let (recognizer, feed) = ChannelRecognizer::new();

    let mut controller = FeedbackController::new(api_client, synthesizer, Capability::Available(recognizer));
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":help" => print_help(),
            ":show" => print_page(&controller),
            ":listen" => {
                controller.refresh_voices();
                controller.listen();
                show_notice(&mut controller);
            }
            ":reset" => {
                controller.reset_interaction();
                print_page(&controller);
            }
            ":speak" => {
                speak(&mut controller, &feed, &mut lines).await?;
                print_page(&controller);
            }
            _ => {
                controller.set_sentence(line.as_str());
                println!("🔄 {}", spoken_finnish::page::ANALYZING_SENTENCE);
                controller.request_feedback().await;
                println!("{}", controller.page().feedback.html());
            }
        }
    }

    Ok(())
}

async fn speak<R>(
    controller: &mut Controller,
    feed: &RecognitionFeed,
    lines: &mut tokio::io::Lines<R>,
) -> Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let Some(pending) = controller.start_pronunciation_check() else {
        println!("🎤 {}", controller.page().speech_status);
        return Ok(());
    };
    println!("🎤 {}", controller.page().speech_status);

    let outcome = match lines.next_line().await? {
        Some(heard) if !heard.trim().is_empty() => RecognitionOutcome::Transcript(heard.trim().to_string()),
        _ => RecognitionOutcome::Ended,
    };
    feed.deliver(outcome);
    controller.finish_pronunciation_check(pending).await;
    Ok(())
}
