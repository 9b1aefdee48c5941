use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Shift words toward a mood", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Suggest replacements for a single word or emoji
    Morph {
        /// Word or emoji to replace
        token: String,

        /// Mood to shift toward
        #[clap(short, long)]
        vibe: String,

        /// Mood to shift away from
        #[clap(long = "from")]
        source_vibe: Option<String>,

        /// Surrounding text, used to tell apart e.g. noun and verb readings
        #[clap(short, long)]
        context: Option<String>,

        /// Number of candidates (defaults to morph.top_n from config)
        #[clap(short = 'n', long)]
        top_n: Option<usize>,
    },

    /// Suggest replacements for several words at once
    Batch {
        /// Words to replace
        #[clap(required = true)]
        words: Vec<String>,

        /// Mood to shift toward
        #[clap(short, long)]
        vibe: String,

        /// Mood to shift away from
        #[clap(long = "from")]
        source_vibe: Option<String>,

        /// Line the words come from; every word gets it as context
        #[clap(short, long)]
        line: Option<String>,

        /// Number of candidates per word
        #[clap(short = 'n', long)]
        top_n: Option<usize>,
    },

    /// Download and load all resources
    Fetch {},
}

/// Split free text into bare words, dropping surrounding punctuation.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}
