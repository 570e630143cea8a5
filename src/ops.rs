//! Config operations behind the `config` subcommands, and the
//! [`ConfigResult`] callers display.

use std::fmt;

use crate::accessors::SectionView;
use crate::error::ConfigError;
use crate::store::Store;

/// Options and values of one section (or component), in display order.
pub type SectionEntries = (String, Vec<(String, String)>);

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// Section names.
    Sections(Vec<String>),
    /// Options and values, grouped by section.
    Listing { sections: Vec<SectionEntries> },
    /// A single option's value.
    Value {
        section: String,
        option: String,
        value: String,
    },
    /// Synthesized components with their own options.
    Components { components: Vec<SectionEntries> },
}

fn write_sections(f: &mut fmt::Formatter<'_>, sections: &[SectionEntries]) -> fmt::Result {
    for (i, (name, entries)) in sections.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        writeln!(f, "[{name}]")?;
        for (option, value) in entries {
            writeln!(f, "{option} = {value}")?;
        }
    }
    Ok(())
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Sections(names) => {
                for name in names {
                    writeln!(f, "{name}")?;
                }
                Ok(())
            }
            ConfigResult::Listing { sections } => write_sections(f, sections),
            ConfigResult::Value {
                section,
                option,
                value,
            } => writeln!(f, "[{section}] {option} = {value}"),
            ConfigResult::Components { components } => write_sections(f, components),
        }
    }
}

pub fn list_sections(store: &Store) -> ConfigResult {
    ConfigResult::Sections(store.sections().map(str::to_string).collect())
}

/// Every option visible from `section` (or from each section), raw or
/// interpolated. An option that fails to interpolate fails the listing.
pub fn list_values(
    store: &Store,
    section: Option<&str>,
    raw: bool,
) -> Result<ConfigResult, ConfigError> {
    let names: Vec<&str> = match section {
        Some(name) => vec![name],
        None => store.sections().collect(),
    };

    let mut sections = Vec::with_capacity(names.len());
    for name in names {
        let mut entries = Vec::new();
        for (option, raw_value) in store.raw_items(name)? {
            let value = if raw {
                raw_value.to_string()
            } else {
                store.resolve(name, option)?
            };
            entries.push((option.to_string(), value));
        }
        sections.push((name.to_string(), entries));
    }
    Ok(ConfigResult::Listing { sections })
}

pub fn get_value(
    store: &Store,
    section: &str,
    option: &str,
    raw: bool,
) -> Result<ConfigResult, ConfigError> {
    let value = if raw {
        store
            .get_raw(section, option)?
            .map(str::to_string)
            .ok_or_else(|| ConfigError::missing_option(section, option))?
    } else {
        store.resolve(section, option)?
    };
    Ok(ConfigResult::Value {
        section: section.to_string(),
        option: option.to_string(),
        value,
    })
}

/// Synthesize the components listed in `section.option` and show the
/// options each one defines itself, interpolated. Values inherited through
/// the component's `DEFAULT` are left out.
pub fn describe_components(
    store: &Store,
    section: &str,
    option: &str,
    prefix: &str,
) -> Result<ConfigResult, ConfigError> {
    let built = store.get_components(section, option, prefix, &(), |component, _| {
        let own: Vec<String> = component
            .store()
            .own_items(component.section_name())
            .map(|(key, _)| key.to_string())
            .collect();
        let mut entries = Vec::with_capacity(own.len());
        for key in own {
            let value = component.store().resolve(component.section_name(), &key)?;
            entries.push((key, value));
        }
        Ok::<_, ConfigError>((component.to_string(), entries))
    })?;
    Ok(ConfigResult::Components {
        components: built.into_values().collect(),
    })
}
