use std::fs;
use std::process;

use clap::{Parser, Subcommand};
use unicode_width::UnicodeWidthStr;

use yosoku_engine::article::{categorize_all, ArticleIndex, RawToken, Token};
use yosoku_engine::category::TokenCategory;
use yosoku_engine::fallback;
use yosoku_engine::predictor::prompt;
use yosoku_engine::scoring;
use yosoku_engine::settings;

#[derive(Parser)]
#[command(name = "yosokutool", about = "Prediction engine diagnostics")]
struct Cli {
    /// Settings TOML overriding the embedded defaults
    #[arg(long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the article index from tokenizer output and show its shape
    Analyze {
        /// Path to tokenizer output (JSONL, one raw token per line)
        input_file: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the local fallback prediction for a given history
    Predict {
        /// Path to tokenizer output (JSONL, one raw token per line)
        input_file: String,
        /// History surface forms, oldest first (repeatable)
        #[arg(long = "history")]
        history: Vec<String>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the document summary sent to the model
    Summary {
        /// Path to tokenizer output (JSONL, one raw token per line)
        input_file: String,
    },

    /// Rank one category's candidates against a history
    Rank {
        /// Path to tokenizer output (JSONL, one raw token per line)
        input_file: String,
        /// Category label (e.g. 固有名詞, 一般)
        category: String,
        /// History surface forms, oldest first (repeatable)
        #[arg(long = "history")]
        history: Vec<String>,
    },

    /// Print the embedded default settings TOML
    Settings,
}

fn load_index(path: &str) -> ArticleIndex {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("failed to read {path}: {e}");
        process::exit(1);
    });
    let mut raw = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RawToken>(line) {
            Ok(token) => raw.push(token),
            Err(e) => {
                eprintln!("{path}:{}: bad token record: {e}", lineno + 1);
                process::exit(1);
            }
        }
    }
    ArticleIndex::build(categorize_all(raw)).unwrap_or_else(|e| {
        eprintln!("analysis failed: {e}");
        process::exit(1);
    })
}

/// Map history surfaces to tokens, reusing the document's categorization
/// when the surface occurs in the article.
fn resolve_history(index: &ArticleIndex, surfaces: &[String]) -> Vec<Token> {
    surfaces
        .iter()
        .map(|surface| {
            index
                .all_tokens()
                .iter()
                .find(|t| &t.surface == surface)
                .cloned()
                .unwrap_or_else(|| Token::new(surface.clone(), TokenCategory::General))
        })
        .collect()
}

fn pad(s: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(s);
    let mut out = s.to_string();
    for _ in current..width {
        out.push(' ');
    }
    out
}

fn main() {
    let cli = Cli::parse();

    if let Some(path) = &cli.settings {
        let content = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("failed to read {path}: {e}");
            process::exit(1);
        });
        if let Err(e) = settings::init_custom(content) {
            eprintln!("bad settings file {path}: {e}");
            process::exit(1);
        }
    }

    match cli.command {
        Command::Analyze { input_file, json } => {
            let index = load_index(&input_file);
            if json {
                let value = serde_json::json!({
                    "categories": index.categories(),
                    "token_count": index.all_tokens().len(),
                    "buckets": index
                        .categories()
                        .iter()
                        .map(|c| (c.as_str(), index.tokens_in(*c).len()))
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&value).unwrap());
            } else {
                println!("tokens: {}", index.all_tokens().len());
                println!("categories ({}):", index.categories().len());
                for &category in index.categories() {
                    let bucket = index.tokens_in(category);
                    let sample: Vec<&str> = bucket
                        .iter()
                        .take(5)
                        .map(|t| t.surface.as_str())
                        .collect();
                    println!(
                        "  {} {:>4} distinct  {}",
                        pad(category.as_str(), 10),
                        bucket.len(),
                        sample.join(" ")
                    );
                }
            }
        }

        Command::Predict {
            input_file,
            history,
            json,
        } => {
            let index = load_index(&input_file);
            let history = resolve_history(&index, &history);
            let candidates = fallback::predict(&history, &index);
            if json {
                println!("{}", serde_json::to_string_pretty(&candidates).unwrap());
            } else {
                for (i, c) in candidates.iter().enumerate() {
                    println!(
                        "{}. {} ({}) {:.2}",
                        i + 1,
                        pad(&c.surface, 12),
                        c.category,
                        c.score
                    );
                }
            }
        }

        Command::Summary { input_file } => {
            let index = load_index(&input_file);
            print!("{}", prompt::article_summary(&index));
        }

        Command::Rank {
            input_file,
            category,
            history,
        } => {
            let Some(category) = TokenCategory::from_label(&category) else {
                eprintln!("unknown category: {category}");
                process::exit(1);
            };
            let index = load_index(&input_file);
            let history = resolve_history(&index, &history);
            for (i, scored) in scoring::rank_category(category, &history, &index)
                .iter()
                .enumerate()
            {
                println!(
                    "{}. {} {:.2}",
                    i + 1,
                    pad(&scored.token.surface, 12),
                    scored.score
                );
            }
        }

        Command::Settings => {
            print!("{}", settings::default_toml());
        }
    }
}
