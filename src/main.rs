use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use forum_connect_four::config::AppConfig;
use forum_connect_four::forum::{MemoryForum, ThreadId};
use forum_connect_four::runner::MatchRunner;

/// Play a forum Connect Four match locally.
///
/// Each stdin line is a post, written as `author: text`. The first line from
/// an author replies to the thread, later lines edit that reply, just like
/// players do on the forum. `wait <secs>` lets time pass. Every line advances
/// the simulated clock by one second.
#[derive(Parser)]
#[command(name = "forum-connect-four", about = "Play a forum Connect Four match locally")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Seed for obstacle placement
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final game as JSON when the match ends
    #[arg(long)]
    json: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut forum = MemoryForum::new();
    let mut runner = MatchRunner::open(&mut forum, &config, rng).context("opening thread")?;
    let thread = runner.thread();
    print_thread(runner.forum(), thread);
    let mut shown = runner.forum().opening_edits(thread);

    let mut now = 0;
    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        now += 1;

        if let Some(secs) = line.strip_prefix("wait ") {
            now += secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid wait duration '{secs}'"))?;
        } else if let Some((author, text)) = line.split_once(':') {
            let author = author.trim();
            let text = text.trim();
            let forum = runner.forum_mut();
            match forum.latest_post_by(thread, author) {
                Some(post) => forum.edit(thread, post, text, now)?,
                None => {
                    forum.reply(thread, author, author, text, now)?;
                }
            }
        } else {
            log::warn!("expected 'author: text' or 'wait <secs>', got '{line}'");
            continue;
        }

        runner.poll_once(now)?;
        let edits = runner.forum().opening_edits(thread);
        if edits != shown {
            shown = edits;
            print_thread(runner.forum(), thread);
        }
        if runner.is_ended() {
            break;
        }
    }

    if cli.json {
        if let Some(game) = runner.controller().game() {
            println!("{}", serde_json::to_string_pretty(&game.snapshot())?);
        }
    }
    Ok(())
}

fn print_thread(forum: &MemoryForum, thread: ThreadId) {
    println!("=== {}", forum.title(thread).unwrap_or_default());
    println!("{}", forum.opening_post(thread).unwrap_or_default());
    println!();
}
