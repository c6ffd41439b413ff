mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default configuration file, read when present in the working directory.
const DEFAULT_CONFIG: &str = "media-encoder.toml";

/// Profile driven audio transcoding and metadata tagging.
#[derive(Parser, Debug)]
#[command(name = "media-encoder")]
#[command(version)]
#[command(about = "Encode audio with named ffmpeg profiles and edit metadata tags")]
struct Cli {
    /// Configuration file (defaults to ./media-encoder.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-encode a file with a profile
    Encode {
        input: PathBuf,
        /// Target path; its extension is replaced by the profile's
        output: Option<PathBuf>,
        /// Profile name (case-insensitive)
        #[arg(short, long)]
        profile: String,
        /// Container metadata, e.g. "title=Song, artist='The Band'"
        #[arg(short, long)]
        metadata: Option<String>,
        /// Output arguments layered over the profile's, e.g. "b:a=256k"
        #[arg(long)]
        output_args: Option<String>,
        /// Global arguments layered over the defaults, e.g. "-threads=2"
        #[arg(long)]
        global_args: Option<String>,
        /// Delete the input after a successful encode
        #[arg(long)]
        delete_original: bool,
    },
    /// Remux without re-encoding, rewriting container metadata
    Copy {
        input: PathBuf,
        output: Option<PathBuf>,
        #[arg(short, long)]
        metadata: String,
        /// Profile to take the extension from; defaults to the first profile
        /// matching the input's extension
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// List the available profiles as a Markdown table
    Profiles {
        #[arg(long)]
        codec: Option<String>,
        #[arg(long)]
        extension: Option<String>,
    },
    /// Print probe information as JSON
    Probe { file: PathBuf },
    /// Edit metadata tags in place
    Tag {
        file: PathBuf,
        /// Tag assignment "key=value"; an empty value deletes the tag
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// JSON list of {"tag_key", "value"} records
        #[arg(long)]
        from_json: Option<PathBuf>,
        /// Cover image (.jpg, .jpeg or .png)
        #[arg(long)]
        cover: Option<PathBuf>,
        /// ID3v2 text encoding: 1 UTF-16, 2 UTF-16BE, 3 UTF-8
        #[arg(long, default_value_t = 3)]
        encoding: u8,
        /// Three-letter language code for lyrics and comment frames
        #[arg(long, default_value = "eng")]
        lang: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    if let Err(e) = commands::run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encode() {
        let cli = Cli::try_parse_from([
            "media-encoder",
            "encode",
            "song.wav",
            "--profile",
            "MP3 Standard 320kbps",
            "--metadata",
            "title=Song",
            "--delete-original",
        ])
        .unwrap();

        match cli.command {
            Command::Encode {
                input,
                output,
                profile,
                metadata,
                delete_original,
                ..
            } => {
                assert_eq!(input, PathBuf::from("song.wav"));
                assert_eq!(output, None);
                assert_eq!(profile, "MP3 Standard 320kbps");
                assert_eq!(metadata.as_deref(), Some("title=Song"));
                assert!(delete_original);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_tag_defaults() {
        let cli = Cli::try_parse_from([
            "media-encoder",
            "tag",
            "song.mp3",
            "--set",
            "title=Song",
            "--set",
            "artist=Band",
            "--config",
            "custom.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Command::Tag {
                set, encoding, lang, ..
            } => {
                assert_eq!(set, vec!["title=Song", "artist=Band"]);
                assert_eq!(encoding, 3);
                assert_eq!(lang, "eng");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_encode_requires_profile() {
        let err = Cli::try_parse_from(["media-encoder", "encode", "song.wav"]).unwrap_err();
        assert!(err.use_stderr());
    }
}
