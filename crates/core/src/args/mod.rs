//! Engine argument maps and their layered composition.

mod composer;
mod map;

pub use composer::{format_global_args, ArgumentComposer, ComposedArguments};
pub use map::{parse_key_value_list, ArgMap};
