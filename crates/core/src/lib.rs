pub mod args;
pub mod config;
pub mod profile;
pub mod stats;
pub mod tagging;
pub mod testing;
pub mod transcode;

pub use args::{parse_key_value_list, ArgMap, ArgumentComposer, ComposedArguments};
pub use config::{
    load_config, load_config_from_str, validate_config, AppConfig, ConfigError, SourcesConfig,
};
pub use profile::{CatalogCache, CatalogError, GlobalArgument, Profile, ProfileCatalog};
pub use stats::{format_size, SizeChange, SizeComparison};
pub use tagging::{MetaUpdater, TagError, TagMappings, TagValue, TagWriteOptions};
pub use transcode::{
    EncodeOutcome, EncodeRequest, Encoder, EncoderConfig, TokioProcessRunner, TranscodeCommand,
    TranscodeError,
};
