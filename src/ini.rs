//! INI text reading and writing.
//!
//! The dialect is the conventional one:
//!
//! - `[section]` headers; `[DEFAULT]` fills the store's default table.
//! - `key = value` or `key: value`; whichever delimiter comes first splits
//!   the line. Keys and values are trimmed, keys are normalized.
//! - Lines starting with `#` or `;` are comments, anywhere.
//! - A line indented deeper than the option it follows continues that
//!   option's value (joined with `\n`). Blank lines inside such a value are
//!   kept when another continuation line follows.
//!
//! Within one source a repeated section or option is an error. Reading a
//! second source into an existing store goes through
//! [`merge::overlay`](crate::merge::overlay) instead.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::store::{DEFAULT_SECTION, Store, normalize_option};

struct OpenValue {
    section: String,
    key: String,
    indent: usize,
    blank_lines: usize,
}

pub fn parse(source_name: &str, text: &str) -> Result<Store, ConfigError> {
    let mut store = Store::new();
    let mut current: Option<String> = None;
    let mut seen_options: HashSet<(String, String)> = HashSet::new();
    let mut open: Option<OpenValue> = None;

    let syntax = |line: usize, reason: &str| ConfigError::Syntax {
        source_name: source_name.to_string(),
        line,
        reason: reason.to_string(),
    };

    for (index, line) in text.lines().enumerate() {
        let lineno = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if let Some(value) = open.as_mut() {
                value.blank_lines += 1;
            }
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indent = line.len() - line.trim_start().len();

        if let Some(value) = open.as_mut()
            && indent > value.indent
        {
            let separator = "\n".repeat(value.blank_lines + 1);
            value.blank_lines = 0;
            if let Some(existing) = store.value_mut(&value.section, &value.key) {
                existing.push_str(&separator);
                existing.push_str(trimmed);
            }
            continue;
        }
        open = None;

        if let Some(header) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let name = header.trim();
            if name.is_empty() {
                return Err(syntax(lineno, "empty section name"));
            }
            if name != DEFAULT_SECTION && store.has_section(name) {
                return Err(ConfigError::DuplicateSection {
                    section: name.to_string(),
                });
            }
            store.ensure_section(name);
            current = Some(name.to_string());
            continue;
        }

        let Some(section) = current.as_deref() else {
            return Err(syntax(lineno, "option outside of any [section]"));
        };

        let Some(split) = trimmed.find(['=', ':']) else {
            return Err(syntax(lineno, "expected 'key = value' or 'key: value'"));
        };
        let key = normalize_option(trimmed[..split].trim());
        if key.is_empty() {
            return Err(syntax(lineno, "empty option name"));
        }
        let value = trimmed[split + 1..].trim();

        if !seen_options.insert((section.to_string(), key.clone())) {
            return Err(ConfigError::DuplicateOption {
                section: section.to_string(),
                option: key,
                source_name: source_name.to_string(),
                line: lineno,
            });
        }

        store.insert(section, &key, value);
        open = Some(OpenValue {
            section: section.to_string(),
            key,
            indent,
            blank_lines: 0,
        });
    }

    Ok(store)
}

/// Render `store` as INI text. Multi-line values are written as indented
/// continuation lines.
pub fn write(store: &Store) -> String {
    let mut out = String::new();

    let mut write_section = |name: &str, items: Vec<(&str, &str)>| {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("[{name}]\n"));
        for (key, value) in items {
            let value = value.replace('\n', "\n\t");
            if value.is_empty() {
                out.push_str(&format!("{key} =\n"));
            } else {
                out.push_str(&format!("{key} = {value}\n"));
            }
        }
    };

    if !store.defaults().is_empty() {
        write_section(DEFAULT_SECTION, store.own_items(DEFAULT_SECTION).collect());
    }
    for section in store.sections() {
        write_section(section, store.own_items(section).collect());
    }
    out
}
