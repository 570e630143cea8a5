//! Clap adapter for stratini.
//!
//! This module is the optional integration layer between the
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! [`ConfigArgs`] and [`ConfigSubcommand`] embed into your own
//! `#[derive(Parser)]` struct and give your app read-only
//! `config sections|list|get|components` subcommands.
//! [`ConfigArgs::into_action()`] converts the parsed arguments into a
//! [`ConfigAction`](crate::ConfigAction); everything after that goes through
//! [`StratiniBuilder::handle()`](crate::StratiniBuilder::handle), which has no
//! clap dependency.

use clap::{Args, Subcommand};

use crate::types::ConfigAction;

/// Clap-derived args for the `config` subcommand group.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
///
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Show values as written, without `%(name)s` interpolation.
    #[arg(long, global = true)]
    pub raw: bool,

    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// List the section names.
    Sections,
    /// Show options and values, for every section or just one.
    List {
        /// Only this section.
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Show the value of one option.
    Get {
        /// Section name (case-sensitive).
        section: String,
        /// Option name.
        option: String,
    },
    /// Show the components listed in an option.
    Components {
        /// Section holding the list.
        section: String,
        /// Option holding the component names.
        option: String,
        /// Option prefix of the components (e.g. "watch").
        #[arg(short, long)]
        prefix: String,
    },
}

impl ConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// Bare `config` (no subcommand) lists every section's values.
    pub fn into_action(self) -> ConfigAction {
        let raw = self.raw;
        match self.action {
            None => ConfigAction::List { section: None, raw },
            Some(ConfigSubcommand::Sections) => ConfigAction::Sections,
            Some(ConfigSubcommand::List { section }) => ConfigAction::List { section, raw },
            Some(ConfigSubcommand::Get { section, option }) => ConfigAction::Get {
                section,
                option,
                raw,
            },
            Some(ConfigSubcommand::Components {
                section,
                option,
                prefix,
            }) => ConfigAction::Components {
                section,
                option,
                prefix,
            },
        }
    }
}
