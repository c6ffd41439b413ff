//! Subcommand handlers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use media_encoder_core::{
    load_config, parse_key_value_list, tagging::COVER_ART_KEY, transcode, validate_config,
    AppConfig, ArgMap, CatalogCache, EncodeOutcome, EncodeRequest, Encoder, MetaUpdater, Profile,
    ProfileCatalog, TagMappings, TagValue, TagWriteOptions, TokioProcessRunner,
};

use crate::{Cli, Command, DEFAULT_CONFIG};

pub async fn run(cli: Cli) -> Result<()> {
    let config = load(cli.config.as_deref())?;

    match cli.command {
        Command::Encode {
            input,
            output,
            profile,
            metadata,
            output_args,
            global_args,
            delete_original,
        } => {
            let encoder = encoder(&config, &profile)?;
            let mut request = EncodeRequest::new(input)
                .with_metadata(parse_list(metadata.as_deref(), "--metadata")?)
                .with_output_args(parse_list(output_args.as_deref(), "--output-args")?)
                .with_global_args(parse_list(global_args.as_deref(), "--global-args")?)
                .with_delete_original(delete_original);
            if let Some(output) = output {
                request = request.with_output(output);
            }
            let outcome = encoder.encode(request).await?;
            print_outcome("Encoded", &outcome);
        }
        Command::Copy {
            input,
            output,
            metadata,
            profile,
        } => {
            let profile = match profile {
                Some(name) => name,
                None => profile_for_input(&*catalog(&config)?, &input)?,
            };
            let encoder = encoder(&config, &profile)?;
            let mut request =
                EncodeRequest::new(input).with_metadata(parse_list(Some(&metadata), "--metadata")?);
            if let Some(output) = output {
                request = request.with_output(output);
            }
            let outcome = encoder.copy(request).await?;
            print_outcome("Copied", &outcome);
        }
        Command::Profiles { codec, extension } => {
            let catalog = catalog(&config)?;
            let profiles: Vec<&Profile> = catalog
                .profiles()
                .iter()
                .filter(|p| codec.as_ref().is_none_or(|c| p.codec.eq_ignore_ascii_case(c)))
                .filter(|p| {
                    extension
                        .as_ref()
                        .is_none_or(|e| p.extension.eq_ignore_ascii_case(e))
                })
                .collect();
            print!("{}", profile_table(&profiles));
        }
        Command::Probe { file } => {
            let runner = TokioProcessRunner::new(config.engine.timeout_secs);
            let metadata = transcode::probe(&runner, &config.engine.ffprobe_path, &file).await?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        Command::Tag {
            file,
            set,
            from_json,
            cover,
            encoding,
            lang,
        } => {
            if set.is_empty() && from_json.is_none() && cover.is_none() {
                bail!("Nothing to do: pass --set, --from-json or --cover");
            }
            let pairs = set
                .iter()
                .map(|assignment| parse_assignment(assignment))
                .collect::<Result<Vec<_>>>()?;

            let mappings = TagMappings::load(&config.sources.tag_mappings).with_context(|| {
                format!(
                    "Failed to load tag mappings from {}",
                    config.sources.tag_mappings.display()
                )
            })?;
            let mut options = TagWriteOptions::new(encoding, &lang)?;
            let mut updater = MetaUpdater::open(&file, Arc::new(mappings))?;
            let before = updater.current_tags();

            if !pairs.is_empty() {
                updater.update_metadata_list(&pairs, &options)?;
            }
            if let Some(records) = from_json {
                updater.update_metadata_from_json(&records, &options)?;
            }
            if let Some(cover) = cover {
                options = options.with_cover_path(cover);
                updater.update_or_add_metadata(COVER_ART_KEY, TagValue::from(""), &options)?;
            }

            print!("{}", tag_changes(&before, &updater.current_tags()));
        }
    }

    Ok(())
}

/// Loads the explicit config file, else `./media-encoder.toml` when present,
/// else built-in defaults. Environment overrides apply in every case.
fn load(explicit: Option<&Path>) -> Result<AppConfig> {
    let default_path = PathBuf::from(DEFAULT_CONFIG);
    let path = explicit.or_else(|| default_path.is_file().then_some(default_path.as_path()));
    debug!(config = ?path, "Loading configuration");

    let config = load_config(path).context("Failed to load configuration")?;
    validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}

fn catalog(config: &AppConfig) -> Result<Arc<ProfileCatalog>> {
    CatalogCache::new()
        .load(&config.sources.profiles, &config.sources.global_arguments)
        .with_context(|| {
            format!(
                "Failed to load profiles from {}",
                config.sources.profiles.display()
            )
        })
}

fn encoder(config: &AppConfig, profile: &str) -> Result<Encoder> {
    let runner = Arc::new(TokioProcessRunner::new(config.engine.timeout_secs));
    Ok(Encoder::new(
        catalog(config)?,
        profile,
        runner,
        config.encoder(),
    )?)
}

fn profile_for_input(catalog: &ProfileCatalog, input: &Path) -> Result<String> {
    let extension = input
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    match catalog.profiles_by_extension(&extension).first() {
        Some(profile) => {
            info!(profile = %profile.name, "Using profile matching the input extension");
            Ok(profile.name.clone())
        }
        None => bail!(
            "No profile matches extension '{}'; pass --profile",
            extension
        ),
    }
}

fn parse_list(input: Option<&str>, option: &str) -> Result<ArgMap> {
    match input {
        Some(list) => parse_key_value_list(list).with_context(|| format!("Invalid {}", option)),
        None => Ok(ArgMap::new()),
    }
}

fn parse_assignment(assignment: &str) -> Result<(String, TagValue)> {
    match assignment.split_once('=') {
        Some((key, value)) => Ok((key.trim().to_string(), TagValue::from(value))),
        None => bail!("Invalid --set '{}': expected KEY=VALUE", assignment),
    }
}

fn print_outcome(verb: &str, outcome: &EncodeOutcome) {
    println!("{}: {}", verb, outcome.output.display());
    println!("{}", outcome.sizes.summary());
    if outcome.original_deleted {
        println!("Original file deleted.");
    }
}

fn profile_table(profiles: &[&Profile]) -> String {
    let mut table = String::from(
        "| Name | Codec | Extension | FFmpeg Setup | Size Factor | CPU Factor | Description |\n\
         |------|-------|-----------|--------------|-------------|------------|-------------|\n",
    );
    for p in profiles {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            p.name, p.codec, p.extension, p.output_args, p.size_factor, p.cpu_factor, p.description
        ));
    }
    table
}

/// Lists every key whose rendered value changed.
fn tag_changes(before: &BTreeMap<String, String>, after: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for key in before.keys().chain(after.keys().filter(|k| !before.contains_key(*k))) {
        let old = before.get(key);
        let new = after.get(key);
        if old == new {
            continue;
        }
        out.push_str(&format!(
            "{}: {} -> {}\n",
            key,
            old.map(String::as_str).unwrap_or("<none>"),
            new.map(String::as_str).unwrap_or("<none>")
        ));
    }
    if out.is_empty() {
        out.push_str("No tag changes.\n");
    }
    out
}
