//! Event code grammar.
//!
//! An event code is a dot-separated prefix path followed directly by a
//! numeric increment, e.g. `AUTH.LOGIN0003`. The prefix path identifies a
//! node in the prefix tree; the increment identifies one code under it.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::CoreError;

/// Minimum number of digits an increment is rendered with.
pub const INCREMENT_WIDTH: usize = 4;

/// Separator between prefix segments in a composed path.
pub const PATH_SEPARATOR: char = '.';

/// Message returned for codes flagged `use_generic_message` or lacking a
/// custom message.
pub const GENERIC_MESSAGE: &str = "Something went wrong.";

static EVENT_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefixes>[a-zA-Z.]+)(?P<increment>\d+)$").expect("valid regex")
});

/// A code split into its prefix segments and increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCode {
    pub prefixes: Vec<String>,
    pub increment: i32,
}

impl ParsedCode {
    /// The prefix segments joined back into a composed path.
    pub fn prefix_path(&self) -> String {
        join_path(&self.prefixes)
    }
}

/// Parse an event code such as `AUTH.LOGIN0003`.
///
/// Case is preserved; callers that want case-insensitive lookups should
/// upper-case the input first.
pub fn parse_event_code(code: &str) -> Result<ParsedCode, CoreError> {
    let caps = EVENT_CODE_RE
        .captures(code)
        .ok_or_else(|| CoreError::Validation(format!("Malformed event code '{code}'")))?;

    let prefixes: Vec<String> = caps["prefixes"]
        .split(PATH_SEPARATOR)
        .map(str::to_string)
        .collect();
    if prefixes.iter().any(String::is_empty) {
        return Err(CoreError::Validation(format!(
            "Event code '{code}' contains an empty prefix segment"
        )));
    }

    let increment: i32 = caps["increment"].parse().map_err(|_| {
        CoreError::Validation(format!("Increment of event code '{code}' is out of range"))
    })?;

    Ok(ParsedCode {
        prefixes,
        increment,
    })
}

/// Render a code from its composed prefix path and increment.
///
/// ```
/// use kyotsu_core::codes::format_event_code;
///
/// assert_eq!(format_event_code("AUTH.LOGIN", 3), "AUTH.LOGIN0003");
/// assert_eq!(format_event_code("DB", 12345), "DB12345");
/// ```
pub fn format_event_code(prefix_path: &str, increment: i32) -> String {
    format!("{prefix_path}{increment:0>width$}", width = INCREMENT_WIDTH)
}

pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}

/// Every dotted suffix of a prefix path, longest first.
///
/// `["A", "B", "C"]` yields `["A.B.C", "B.C", "C"]`.
pub fn cumulate_prefixes<S: AsRef<str>>(segments: &[S]) -> Vec<String> {
    (0..segments.len())
        .map(|start| join_path(&segments[start..]))
        .collect()
}

/// Validate and normalize a single prefix segment as stored in `prefixes.prefix`.
///
/// Segments are ASCII letters only (the code grammar cannot express
/// anything else) and are stored upper-case so lookups of upper-cased
/// codes find them.
pub fn normalize_prefix_segment(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Prefix must not be empty".into()));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::Validation(format!(
            "Prefix '{trimmed}' must contain ASCII letters only"
        )));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Compact form of a UUID for listings: first nine and last nine characters.
pub fn short_uuid(id: &Uuid) -> String {
    let full = id.hyphenated().to_string();
    format!("{}...{}", &full[..9], &full[full.len() - 9..])
}

/// The user-facing message of a code.
pub fn resolve_message(use_generic_message: bool, custom_message: Option<&str>) -> String {
    match custom_message {
        Some(msg) if !use_generic_message => msg.to_string(),
        _ => GENERIC_MESSAGE.to_string(),
    }
}
