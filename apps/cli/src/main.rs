use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing_subscriber::{EnvFilter, fmt};

use kstudy_core::{
    AvailabilityInterval, AvailabilityRecord, CHANNEL_PRESETS, CachedTranscripts, CaptionMatch,
    CaptionMatcher, ContextWindow, GoogleTranslator, KeyRing, SearchConfig, TimedTextClient,
    Translator, YoutubeClient, embed_url, extract_video_id, find_overlaps, format_match,
    format_video_matches, get_root_cache_dir, preset_channel_id, search_channels, search_video,
    split_by_role, translate_or_unavailable,
};

#[derive(Parser)]
#[command(name = "kstudy")]
#[command(about = "Search Korean captions on YouTube and match study-group availability")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the captions of a single video
    Video {
        /// YouTube link or video id
        #[arg(long)]
        url: String,

        /// Korean grammar point or phrase
        #[arg(short, long)]
        query: String,

        /// Number of caption lines joined into each match
        #[arg(short, long)]
        window: Option<usize>,

        /// Skip English translation of matches
        #[arg(long)]
        no_translate: bool,
    },
    /// Search the most viewed videos of one or more channels
    Channel {
        /// Korean grammar point or phrase
        #[arg(short, long)]
        query: String,

        /// Preset name or channel id; defaults to every preset
        #[arg(short, long)]
        channel: Vec<String>,

        /// Number of most viewed videos to search
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Stop after this many videos with matches
        #[arg(short = 'n', long)]
        results: Option<usize>,

        /// Number of caption lines joined into each match
        #[arg(short, long)]
        window: Option<usize>,

        /// Skip English translation of matches
        #[arg(long)]
        no_translate: bool,
    },
    /// Find tutor/learner availability that overlaps on the same date
    Overlap {
        /// JSON array of {"role", "date", "start", "end"} records
        file: PathBuf,
    },
    /// List channel presets
    Channels,
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn load_config(
    window: Option<usize>,
    top_k: Option<usize>,
    results: Option<usize>,
) -> Result<SearchConfig> {
    let mut config = SearchConfig::from_env()?;
    if let Some(width) = window {
        config.context_window = ContextWindow::new(width)?;
    }
    if let Some(top_k) = top_k {
        config.top_k = top_k;
    }
    if let Some(results) = results {
        config.result_limit = results;
    }
    Ok(config)
}

fn transcripts(config: &SearchConfig) -> CachedTranscripts<TimedTextClient> {
    CachedTranscripts::new(
        TimedTextClient::new(&config.caption_language),
        &get_root_cache_dir(),
        &config.caption_language,
        config.transcript_ttl,
    )
}

fn translator(no_translate: bool) -> Option<GoogleTranslator> {
    (!no_translate).then(GoogleTranslator::korean_to_english)
}

async fn print_matches(video_id: &str, matches: &[CaptionMatch], translator: Option<&dyn Translator>) {
    for found in matches {
        println!("{}", style(format_match(found)).bold());
        if let Some(translator) = translator {
            let translation = translate_or_unavailable(translator, &found.text).await;
            let line = format!("  Translation: {}", translation);
            if translation.is_available() {
                println!("{}", line);
            } else {
                println!("{}", style(line).yellow());
            }
        }
        println!("  {}", style(embed_url(video_id, found.start)).cyan());
    }
}

async fn run_video(url: &str, query: &str, window: Option<usize>, no_translate: bool) -> Result<()> {
    let config = load_config(window, None, None)?;
    let video_id = extract_video_id(url)?;
    let transcripts = transcripts(&config);
    let matcher = CaptionMatcher::new(config.context_window);

    let step_start = Instant::now();
    let spinner = create_spinner("Analyzing video captions...");
    let matches = search_video(&transcripts, &video_id, query, &matcher).await?;
    spinner.finish_with_message(format!(
        "{} Searched captions of {} {}",
        style("✓").green().bold(),
        style(&video_id).dim(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));

    if matches.is_empty() {
        println!(
            "{} No matches found for '{}' in the video captions.",
            style("!").yellow().bold(),
            query
        );
        return Ok(());
    }

    println!("\n### Matches found for '{}' in the video:\n", query);
    let translator = translator(no_translate);
    print_matches(&video_id, &matches, translator.as_ref().map(|t| t as &dyn Translator)).await;
    Ok(())
}

async fn run_channel(
    query: &str,
    channels: &[String],
    top_k: Option<usize>,
    result_limit: Option<usize>,
    window: Option<usize>,
    no_translate: bool,
) -> Result<()> {
    let config = load_config(window, top_k, result_limit)?;
    let keys = KeyRing::from_env()?;
    let client = YoutubeClient::new(keys);
    let transcripts = transcripts(&config);

    let channel_ids: Vec<String> = if channels.is_empty() {
        CHANNEL_PRESETS.iter().map(|(_, id)| id.to_string()).collect()
    } else {
        channels
            .iter()
            .map(|c| preset_channel_id(c).map(str::to_string).unwrap_or_else(|| c.clone()))
            .collect()
    };

    let step_start = Instant::now();
    let spinner = create_spinner(&format!(
        "Searching {} channel(s) for '{}'...",
        channel_ids.len(),
        query
    ));
    let results = search_channels(&client, &transcripts, &channel_ids, query, &config).await?;
    spinner.finish_with_message(format!(
        "{} Found matches in {} of the top {} videos {}",
        style("✓").green().bold(),
        results.len(),
        config.top_k,
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));

    if results.is_empty() {
        println!(
            "{} No matches found for '{}' in any videos from these channels.",
            style("!").yellow().bold(),
            query
        );
        return Ok(());
    }

    let translator = translator(no_translate);
    for result in &results {
        println!("{}", style("─".repeat(60)).dim());
        if translator.is_none() {
            println!("{}", format_video_matches(result));
            continue;
        }
        println!("{}", style(format!("### {}", result.video.title)).bold());
        println!(
            "{}\n",
            style(format!(
                "Channel: {} | Views: {}",
                result.video.channel_title, result.view_count
            ))
            .dim()
        );
        print_matches(
            &result.video.video_id,
            &result.matches,
            translator.as_ref().map(|t| t as &dyn Translator),
        )
        .await;
    }
    Ok(())
}

async fn run_overlap(file: &Path) -> Result<()> {
    let json_content = fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let records: Vec<AvailabilityRecord> = serde_json::from_str(&json_content)?;
    let intervals = records
        .into_iter()
        .map(AvailabilityInterval::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let (tutors, learners) = split_by_role(intervals);

    let overlaps = find_overlaps(&tutors, &learners)?;
    if overlaps.is_empty() {
        println!("{} No overlapping availability.", style("!").yellow().bold());
        return Ok(());
    }

    for overlap in &overlaps {
        let tutor = &tutors[overlap.tutor_index];
        let learner = &learners[overlap.learner_index];
        println!(
            "{} {} {}–{}  tutor #{} ({}–{}) ↔ learner #{} ({}–{})",
            style("✓").green().bold(),
            overlap.date,
            overlap.start.format("%H:%M"),
            overlap.end.format("%H:%M"),
            overlap.tutor_index + 1,
            tutor.start().format("%H:%M"),
            tutor.end().format("%H:%M"),
            overlap.learner_index + 1,
            learner.start().format("%H:%M"),
            learner.end().format("%H:%M"),
        );
    }
    Ok(())
}

fn print_presets() {
    for (name, id) in CHANNEL_PRESETS {
        println!("{:<20} {}", style(name).cyan(), style(id).dim());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    println!(
        "\n{}  {}\n",
        style("kstudy").cyan().bold(),
        style("Korean Study Tools").dim()
    );

    let outcome = match &cli.command {
        Commands::Video {
            url,
            query,
            window,
            no_translate,
        } => run_video(url, query.trim(), *window, *no_translate).await,
        Commands::Channel {
            query,
            channel,
            top_k,
            results,
            window,
            no_translate,
        } => run_channel(
            query.trim(),
            channel,
            *top_k,
            *results,
            *window,
            *no_translate,
        )
        .await,
        Commands::Overlap { file } => run_overlap(file).await,
        Commands::Channels => {
            print_presets();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}
