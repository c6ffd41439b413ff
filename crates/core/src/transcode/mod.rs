//! Building and running external engine commands.
//!
//! [`TranscodeCommand`] turns an input, an output and the composed argument
//! layers into the engine's token list and runs it through a
//! [`ProcessRunner`]. [`Encoder`] ties a profile from the catalog to that
//! command and adds output naming, size statistics and optional cleanup.
//!
//! # Example
//!
//! ```ignore
//! use media_encoder_core::transcode::{EncodeRequest, Encoder, EncoderConfig, TokioProcessRunner};
//!
//! let catalog = Arc::new(ProfileCatalog::load_profiles("config/profiles.json")?
//!     .load_global_arguments("config/global_arguments.json")?);
//! let runner = Arc::new(TokioProcessRunner::new(None));
//! let encoder = Encoder::new(catalog, "MP3 Standard 320kbps", runner, EncoderConfig::default())?;
//!
//! let outcome = encoder.encode(EncodeRequest::new("song.wav")).await?;
//! println!("{} ({:.2}x)", outcome.output.display(), outcome.sizes.ratio);
//! ```

mod command;
mod config;
mod encoder;
mod error;
mod output_path;
mod probe;
mod process;
mod traits;

pub use command::{CommandState, TranscodeCommand};
pub use config::{EncoderConfig, EngineConfig, OutputConfig};
pub use encoder::{EncodeOutcome, EncodeRequest, Encoder};
pub use error::TranscodeError;
pub use output_path::unique_output_path;
pub use probe::{probe, MediaMetadata, ProbeFormat, ProbeStream};
pub use process::TokioProcessRunner;
pub use traits::{Capture, ProcessOutput, ProcessRunner};
