//! Nested `%(name)s` interpolation.
//!
//! Placeholders are resolved inside-out: the pattern only matches a
//! placeholder whose body contains no parentheses, so in
//! `%(part.%(number)s)s` the inner `%(number)s` is replaced first, which
//! turns the outer one into an ordinary placeholder for the next pass.
//!
//! Substituted values are raw and may contain placeholders of their own;
//! they are picked up by later passes. After [`MAX_INTERPOLATION_DEPTH`]
//! passes anything still looking like a placeholder is reported as a depth
//! error, which is also how reference cycles surface. `%%` becomes `%` once,
//! at the very end.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::store::normalize_option;

pub const MAX_INTERPOLATION_DEPTH: usize = 10;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\((?:[^()]+)\)s").expect("placeholder pattern is valid"));

/// Resolve every placeholder in `raw`.
///
/// `lookup` receives normalized option names and returns the raw value
/// visible from the owning section (section first, then `DEFAULT`).
/// `section` and `option` only feed error messages.
pub fn interpolate<'a, L>(
    raw: &str,
    section: &str,
    option: &str,
    lookup: L,
) -> Result<String, ConfigError>
where
    L: Fn(&str) -> Option<&'a str>,
{
    let mut value = raw.to_string();

    for _ in 0..MAX_INTERPOLATION_DEPTH {
        let placeholders: Vec<String> = PLACEHOLDER
            .find_iter(&value)
            .map(|m| m.as_str().to_string())
            .collect();
        if placeholders.is_empty() {
            break;
        }

        for placeholder in placeholders {
            let name = normalize_option(&placeholder[2..placeholder.len() - 2]);
            let replacement =
                lookup(&name).ok_or_else(|| ConfigError::InterpolationMissingTarget {
                    section: section.to_string(),
                    option: option.to_string(),
                    raw: raw.to_string(),
                    reference: placeholder.clone(),
                })?;
            value = value.replace(&placeholder, replacement);
        }
    }

    if value.contains("%(") {
        return Err(ConfigError::InterpolationDepthExceeded {
            section: section.to_string(),
            option: option.to_string(),
            raw: raw.to_string(),
            depth: MAX_INTERPOLATION_DEPTH,
        });
    }

    Ok(value.replace("%%", "%"))
}
