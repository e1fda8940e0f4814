//! chapterutil CLI - Edit level chapters as spreadsheets
//!
//! ```bash
//! chapterutil convert chapter.json chapter.csv   # JSON -> CSV (by extension)
//! chapterutil convert chapter.csv chapter.json   # CSV -> JSON, replaces levels
//! chapterutil export chapter.json chapter.csv
//! chapterutil import chapter.csv chapter.json
//! chapterutil split out/ < all-chapters.csv      # one file per chapter
//! chapterutil fields                             # show the level columns
//! ```

use clap::{Args, Parser, Subcommand};
use chapterutil::config::parse_delimiter;
use chapterutil::{
    convert, csv_to_json, json_to_csv, logs, split_stream, ConvertOptions, ConvertSummary, Schema,
};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chapterutil")]
#[command(
    about = "Turn a chapter JSON file into CSV, or replace a chapter's levels with a CSV file's rows",
    long_about = None
)]
struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert by input extension: .json exports to CSV, .csv imports into JSON
    Convert {
        /// A chapter JSON to convert to CSV, or a CSV to convert to JSON
        input: PathBuf,

        /// A CSV file to overwrite, or a chapter JSON whose levels should be replaced
        output: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Export a chapter's levels to CSV
    Export {
        /// Chapter JSON file
        input: PathBuf,

        /// CSV file to overwrite
        output: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Replace a chapter's levels with the rows of a CSV file
    Import {
        /// CSV file
        input: PathBuf,

        /// Chapter JSON file to update in place
        output: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Split a concatenated CSV stream from stdin into one file per chapter
    Split {
        /// Directory for the chapter files
        output_dir: PathBuf,
    },

    /// Show the level columns, their kinds and defaults
    Fields {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct OptionArgs {
    /// CSV delimiter (default: ',' on export, auto-detect on import; 'tab' for tabs)
    #[arg(short, long, value_parser = delimiter_arg)]
    delimiter: Option<char>,

    /// Indent width for written JSON (0 for compact)
    #[arg(long)]
    indent: Option<usize>,

    /// Read CSV as UTF-8 instead of guessing its encoding
    #[arg(long)]
    no_detect_encoding: bool,
}

impl OptionArgs {
    fn resolve(&self) -> ConvertOptions {
        let mut options = ConvertOptions::from_env()
            .with_delimiter(self.delimiter)
            .with_indent(self.indent);
        if self.no_detect_encoding {
            options.detect_encoding = false;
        }
        options
    }
}

fn delimiter_arg(raw: &str) -> Result<char, String> {
    parse_delimiter(raw).ok_or_else(|| format!("'{}' is not a single ASCII character", raw))
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logs::init(cli.quiet);

    let schema = Schema::chapter();

    let result = match cli.command {
        Commands::Convert { input, output, options } => {
            cmd_convert(&input, &output, &schema, &options.resolve(), convert)
        }
        Commands::Export { input, output, options } => {
            cmd_convert(&input, &output, &schema, &options.resolve(), json_to_csv)
        }
        Commands::Import { input, output, options } => {
            cmd_convert(&input, &output, &schema, &options.resolve(), csv_to_json)
        }
        Commands::Split { output_dir } => cmd_split(&output_dir),
        Commands::Fields { json } => cmd_fields(&schema, json),
    };

    if let Err(e) = result {
        logs::log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

type Conversion =
    fn(&Path, &Path, &Schema, &ConvertOptions) -> chapterutil::ConvertResult<ConvertSummary>;

fn cmd_convert(
    input: &Path,
    output: &Path,
    schema: &Schema,
    options: &ConvertOptions,
    run: Conversion,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = run(input, output, schema, options)?;
    logs::log_success(format!("✨ Done: {} levels", summary.levels));
    Ok(())
}

fn cmd_split(output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    split_stream(stdin.lock(), output_dir)?;
    Ok(())
}

fn cmd_fields(schema: &Schema, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(schema)?);
    } else {
        print!("{}", schema.describe());
    }
    Ok(())
}
