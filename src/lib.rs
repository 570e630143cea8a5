//! Layered INI configuration with nested interpolation, typed accessors and
//! synthesized components.
//!
//! Stratini reads classic INI files (`[section]`, `key = value`, a shared
//! `DEFAULT` section) and adds the pieces long-running services keep
//! re-implementing on top: values that refer to other values, typed getters
//! with explicit fallbacks, schedules, and repeated blocks of options that
//! describe a list of similar objects.
//!
//! ```ignore
//! let store = Stratini::builder()
//!     .app_name("collector")
//!     .load()?;
//!
//! let archive = store.section("archive")?;
//! let rate = archive.get_rate("rate", Fallback::raw("60"))?;
//! let spool = archive.get_path("spool", Fallback::Required)?;
//! ```
//!
//! That call reads `collector.ini` from the platform config directory, and
//! the accessors interpolate, convert and apply fallbacks.
//!
//! # Interpolation
//!
//! `%(name)s` is replaced by the raw value of `name` as seen from the same
//! section (its own options first, then `DEFAULT`). Placeholders nest and
//! are resolved inside-out, so with `opt = name` and `base.name = a`, the value
//! `%(base.%(opt)s)s` resolves to `a`. `%%` is a literal percent sign. Chains
//! deeper than [`MAX_INTERPOLATION_DEPTH`] passes, which includes every
//! reference cycle, fail with
//! [`InterpolationDepthExceeded`](ConfigError::InterpolationDepthExceeded).
//!
//! Option names are case-insensitive (lower-cased on every read and write,
//! placeholders included). Section names are case-sensitive.
//!
//! # Fallbacks
//!
//! Every accessor takes a [`Fallback`] that decides what happens when the
//! option is absent:
//!
//! | Fallback | Option absent |
//! |----------|---------------|
//! | `Fallback::Required` | `MissingSection` or `MissingOption` error |
//! | `Fallback::None` | `Ok(None)`; lists and sets come back empty |
//! | `Fallback::Raw("…")` | the string, converted like a stored value |
//! | `Fallback::Value(v)` | `v` unchanged |
//!
//! A value that is present but malformed is always an error.
//!
//! # Accessors
//!
//! Strings, integers (with `0x`/`0o`/`0b` prefixes), floats, booleans
//! (`yes/no`, `on/off`, `true/false`, `1/0`), lists and sets with per-element
//! conversion, byte sizes (`100 MiB`), date/times, durations (`90`, `10s`,
//! `1h 30m`), paths, [`Timespan`]s (`days=1, seconds=10`) and [`Rate`]s.
//! They exist on [`Store`] (taking a section name) and on anything
//! implementing [`SectionView`], which is how [`Section`] and [`Component`]
//! get them.
//!
//! # Rates
//!
//! A rate is read from a family of options:
//!
//! ```ini
//! [archive]
//! rate = 5m
//! rate.sync = true
//! rate.offset = 30s
//! ```
//!
//! [`Rate::next_deadline`] returns the wait until the next firing. Synced
//! rates fire on wall-clock multiples of the period, shifted by the offset.
//!
//! # Components
//!
//! A list option names components; `prefix.name.key` options describe them:
//!
//! ```ini
//! [monitor]
//! watches = data spool
//!
//! watch.*.threshold = 90
//! watch.data.path = /mnt/data
//! watch.spool.path = /mnt/spool
//! watch.spool.mixin = strict.mixin
//!
//! strict.mixin.threshold = 75
//! ```
//!
//! [`get_components`](SectionView::get_components) builds one [`Component`]
//! per name, each a private store layered from the wildcard defaults
//! (`prefix.*.`), named defaults (`prefix.default.`), mixins and finally the
//! component's own options, and hands it to your factory:
//!
//! ```ignore
//! let watches = monitor.get_components("watches", "watch", &app, |c, app| {
//!     Watch::new(c.name(), c.get_path("path", Fallback::Required)?, app)
//! })?;
//! ```
//!
//! See the [`component`] module for the exact layering.
//!
//! # Callbacks
//!
//! `option.module` and `option.function` name a function registered in a
//! [`CallbackRegistry`]; `option.init` optionally names an initializer run
//! when the callback is resolved.
//!
//! # Loading files
//!
//! [`StratiniBuilder`] finds config files through a list of [`SearchPath`]s
//! (platform directory, home, CWD, explicit paths, or every ancestor up to a
//! marker like `.git`), listed lowest priority first. In
//! [`Merge`](SearchMode::Merge) mode every file found is read and later
//! files override earlier ones option by option; in
//! [`FirstMatch`](SearchMode::FirstMatch) mode only the highest-priority file
//! is read. Programmatic overrides sit on top:
//!
//! ```text
//! Config files          search paths in order, later paths win
//!        ↑ overridden by
//! Explicit files        .add_file()
//!        ↑ overridden by
//! Overrides             .set_override()
//! ```
//!
//! Missing files are skipped.
//!
//! # CLI integration
//!
//! With the `clap` feature (on by default), [`ConfigArgs`] gives an app
//! `config sections|list|get|components` subcommands. They map to
//! [`ConfigAction`]s, which [`StratiniBuilder::handle`] turns into a
//! displayable [`ConfigResult`]. Without clap, build the `ConfigAction`
//! yourself:
//!
//! ```toml
//! stratini = { version = "...", default-features = false }
//! ```
//!
//! # Logging
//!
//! Discovery, merging, component synthesis and callback initialisation emit
//! `tracing` events at `debug`/`trace` level. Install any subscriber to see
//! them.

pub mod accessors;
pub mod builder;
pub mod callback;
pub mod component;
pub mod convert;
pub mod error;
pub mod file;
pub mod ini;
pub mod interpolate;
pub mod merge;
pub mod ops;
pub mod rate;
pub mod resolve;
pub mod store;
pub mod timespan;
pub mod types;

#[cfg(feature = "clap")]
pub mod cli;

#[cfg(test)]
mod fixtures;

pub use accessors::{Fallback, Section, SectionView};
pub use builder::{Stratini, StratiniBuilder};
pub use callback::CallbackRegistry;
pub use component::Component;
pub use convert::ConvertError;
pub use error::ConfigError;
pub use interpolate::MAX_INTERPOLATION_DEPTH;
pub use ops::ConfigResult;
pub use rate::Rate;
pub use resolve::Override;
pub use store::{DEFAULT_SECTION, Store};
pub use timespan::Timespan;
pub use types::{Boundary, ConfigAction, SearchMode, SearchPath};

#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
