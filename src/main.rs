use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghostwriter::config::Config;
use ghostwriter::lexicon::LexiconService;
use ghostwriter::morph::Token;
use ghostwriter::storage::DataDir;

mod cli;

fn main() -> anyhow::Result<()> {
    // logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = cli::Args::parse();

    let data = DataDir::default_location().context("Failed to open data directory")?;
    let config = Config::load_with(&data).context("Failed to load config.yaml")?;
    let default_top_n = config.morph.top_n;
    let service = LexiconService::new(config, data);

    match args.command {
        cli::Command::Morph {
            token,
            vibe,
            source_vibe,
            context,
            top_n,
        } => {
            let engine = service.engine()?;
            let context = context.map(|line| cli::split_words(&line));
            let result = engine.morph_token(
                &Token::parse(&token),
                &vibe,
                source_vibe.as_deref(),
                context.as_deref(),
                top_n.unwrap_or(default_top_n),
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        cli::Command::Batch {
            words,
            vibe,
            source_vibe,
            line,
            top_n,
        } => {
            let engine = service.engine()?;
            let contexts = line.map(|line| vec![cli::split_words(&line); words.len()]);
            let results = engine.morph_words(
                &words,
                &vibe,
                source_vibe.as_deref(),
                contexts.as_deref(),
                top_n.unwrap_or(default_top_n),
            );
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        cli::Command::Fetch {} => {
            let engine = service.engine()?;
            log::info!(
                "{} embeddings, {} emoji",
                engine.store().len(),
                engine.emoji_index().len()
            );
            println!("{}", serde_json::to_string_pretty(&service.status())?);
        }
    }

    Ok(())
}
