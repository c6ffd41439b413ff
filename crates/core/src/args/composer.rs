//! Layered merge of engine arguments.

use super::map::ArgMap;

/// Merges the argument layers of one engine invocation.
///
/// Output arguments are built from the profile defaults overridden by user
/// supplied output arguments. Global arguments are the catalog defaults
/// overridden by user supplied global arguments. Metadata is kept as its own
/// layer and is always emitted after the output-argument merge.
#[derive(Debug, Clone, Default)]
pub struct ArgumentComposer {
    profile_defaults: ArgMap,
    user_output: ArgMap,
    metadata: ArgMap,
    global_defaults: ArgMap,
    user_global: ArgMap,
}

/// Result of [`ArgumentComposer::compose`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedArguments {
    pub output_args: ArgMap,
    pub metadata: ArgMap,
    /// Global arguments already formatted as tokens.
    pub global_args: Vec<String>,
}

impl ComposedArguments {
    /// Output arguments followed by the metadata layer, later keys winning.
    pub fn all_output_args(&self) -> ArgMap {
        let mut merged = self.output_args.clone();
        merged.merge(&self.metadata);
        merged
    }
}

impl ArgumentComposer {
    /// Starts from the profile's default output arguments.
    pub fn new(profile_defaults: ArgMap) -> Self {
        Self {
            profile_defaults,
            ..Default::default()
        }
    }

    pub fn with_output_args(mut self, args: &ArgMap) -> Self {
        self.user_output.merge(args);
        self
    }

    pub fn with_metadata(mut self, metadata: &ArgMap) -> Self {
        self.metadata.merge(metadata);
        self
    }

    pub fn with_global_defaults(mut self, defaults: &ArgMap) -> Self {
        self.global_defaults.merge(defaults);
        self
    }

    pub fn with_global_args(mut self, args: &ArgMap) -> Self {
        self.user_global.merge(args);
        self
    }

    /// Merged global arguments before formatting.
    pub fn global_map(&self) -> ArgMap {
        let mut globals = self.global_defaults.clone();
        globals.merge(&self.user_global);
        globals
    }

    pub fn compose(&self) -> ComposedArguments {
        let mut output_args = self.profile_defaults.clone();
        output_args.merge(&self.user_output);

        ComposedArguments {
            output_args,
            metadata: self.metadata.clone(),
            global_args: format_global_args(&self.global_map()),
        }
    }
}

/// Formats global arguments into command tokens.
///
/// A key is emitted only when it is non-blank and starts with `-`; a value is
/// emitted only when it is non-blank after trimming. Flag-only arguments and
/// value-only continuations are both expressible this way.
pub fn format_global_args(args: &ArgMap) -> Vec<String> {
    let mut tokens = Vec::with_capacity(args.len() * 2);
    for (key, value) in args.iter() {
        if key.starts_with('-') && !key.trim().is_empty() {
            tokens.push(key.to_string());
        }
        if !value.trim().is_empty() {
            tokens.push(value.to_string());
        }
    }
    tokens
}
