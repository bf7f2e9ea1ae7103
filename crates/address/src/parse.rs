//! Recursive-descent parser for the textual address grammar.
//!
//! Five surface forms exist, in global (registry-qualified) and local
//! (scope-relative) flavors:
//!
//! ```text
//! geo                      registry
//! geo:has_field/is_on      variant
//! geo:field_strength       parameter
//! geo:detector_type@basic  parameter value group
//! geo:detector_type=hpge   parameter enumerated string value
//! :has_field/is_on         local variant (leading ':' optional on input)
//! ```
//!
//! Path segments alternate parameter and variant names starting at a
//! parameter position, so a parameter path always has an odd number of
//! segments and a variant path an even number. That parity is the whole
//! variant-vs-parameter disambiguation. Parameter-position segments may
//! carry an instance index suffix (`ring[3]`).

use crate::address::VariantAddress;

/// Which address families a parse attempt may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Try global forms first, then local forms.
    #[default]
    Any,
    /// Only registry-qualified (global) forms.
    GlobalOnly,
    /// Only scope-relative (local) forms.
    LocalOnly,
}

/// Parse `text` into an address, or `None` when no enabled form matches.
///
/// Parsing never fails loudly: an unmatched input is simply not an address.
pub(crate) fn parse(text: &str, mode: ParseMode) -> Option<VariantAddress> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if mode != ParseMode::LocalOnly {
        if let Some(address) = parse_global(text) {
            return Some(address);
        }
    }
    if mode != ParseMode::GlobalOnly {
        if let Some(address) = parse_local(text) {
            return Some(address);
        }
    }
    log::trace!("no address form matched '{text}'");
    None
}

fn parse_global(text: &str) -> Option<VariantAddress> {
    let (registry, rest) = scan_name(text)?;
    // A bare name, with or without a trailing ':', addresses the registry
    // itself.
    match rest.strip_prefix(':') {
        None if rest.is_empty() => Some(VariantAddress::registry(registry)),
        None => None,
        Some("") => Some(VariantAddress::registry(registry)),
        Some(local) => parse_scoped(Some(registry.to_string()), local),
    }
}

fn parse_local(text: &str) -> Option<VariantAddress> {
    parse_scoped(None, text.strip_prefix(':').unwrap_or(text))
}

fn parse_scoped(registry: Option<String>, text: &str) -> Option<VariantAddress> {
    // Enumerated string value: everything after the first '=' is the value,
    // taken verbatim.
    if let Some((path, value)) = text.split_once('=') {
        if !is_parameter_path(path) || value.is_empty() {
            return None;
        }
        return Some(VariantAddress::EnumValue {
            registry,
            path: path.to_string(),
            value: value.to_string(),
        });
    }
    if let Some((path, group)) = text.split_once('@') {
        if !is_parameter_path(path) || !is_group(group) {
            return None;
        }
        return Some(VariantAddress::ValueGroup {
            registry,
            path: path.to_string(),
            group: group.to_string(),
        });
    }
    if is_variant_path(text) {
        return Some(VariantAddress::Variant {
            registry,
            path: text.to_string(),
        });
    }
    if is_parameter_path(text) {
        return Some(VariantAddress::Parameter {
            registry,
            path: text.to_string(),
        });
    }
    None
}

/// Split a leading `[A-Za-z_][A-Za-z0-9_]*` name off `text`.
fn scan_name(text: &str) -> Option<(&str, &str)> {
    let mut end = 0;
    for (offset, c) in text.char_indices() {
        let ok = if offset == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !ok {
            break;
        }
        end = offset + c.len_utf8();
    }
    if end == 0 {
        return None;
    }
    Some((&text[..end], &text[end..]))
}

pub(crate) fn is_name(text: &str) -> bool {
    matches!(scan_name(text), Some((_, rest)) if rest.is_empty())
}

/// A parameter occurrence: a name with an optional `[digits]` instance
/// index suffix.
fn is_param_segment(text: &str) -> bool {
    match text.split_once('[') {
        None => is_name(text),
        Some((name, index)) => {
            is_name(name)
                && index.len() > 1
                && index.ends_with(']')
                && index[..index.len() - 1].bytes().all(|b| b.is_ascii_digit())
        }
    }
}

fn is_path(text: &str, even_segments: bool) -> bool {
    let segments: Vec<&str> = text.split('/').collect();
    if (segments.len() % 2 == 0) != even_segments {
        return false;
    }
    segments.iter().enumerate().all(|(position, segment)| {
        if position % 2 == 0 {
            is_param_segment(segment)
        } else {
            is_name(segment)
        }
    })
}

pub(crate) fn is_variant_path(text: &str) -> bool {
    is_path(text, true)
}

pub(crate) fn is_parameter_path(text: &str) -> bool {
    is_path(text, false)
}

pub(crate) fn is_group(text: &str) -> bool {
    text.split('/').all(is_name)
}
