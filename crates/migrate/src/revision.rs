//! Generating new migration script pairs.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDateTime, Timelike, Utc};

use crate::error::MigrateToolError;
use crate::hooks::run_post_write_hooks;
use crate::settings::{MigrateSettings, Timezone};

/// Tokens understood by `file_template`.
pub const TEMPLATE_TOKENS: [&str; 7] = ["year", "month", "day", "hour", "minute", "second", "slug"];

/// A freshly written `up`/`down` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRevision {
    pub version: i64,
    /// File name without the `.up.sql` / `.down.sql` suffix.
    pub stem: String,
    pub up_path: PathBuf,
    pub down_path: PathBuf,
}

impl GeneratedRevision {
    pub fn files(&self) -> [&Path; 2] {
        [&self.up_path, &self.down_path]
    }
}

/// Current wall-clock time in the configured zone.
pub fn now_in(timezone: Timezone) -> NaiveDateTime {
    match timezone {
        Timezone::Utc => Utc::now().naive_utc(),
        Timezone::Local => Local::now().naive_local(),
    }
}

/// Turn a free-form message into a file-name slug.
///
/// Runs of anything other than ASCII letters and digits collapse into a
/// single `_`. Slugs longer than `max_len` are cut back to the last whole
/// word that fits, or hard-cut when the first word alone is too long.
pub fn slugify(message: &str, max_len: usize) -> String {
    let words: Vec<String> = message
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();

    let mut slug = String::new();
    for word in &words {
        let extra = if slug.is_empty() { word.len() } else { word.len() + 1 };
        if slug.len() + extra > max_len {
            break;
        }
        if !slug.is_empty() {
            slug.push('_');
        }
        slug.push_str(word);
    }

    if slug.is_empty() {
        if let Some(first) = words.first() {
            slug = first.chars().take(max_len).collect();
        }
    }
    slug
}

/// Substitute the template tokens.
pub fn render_template(
    template: &str,
    at: NaiveDateTime,
    slug: &str,
) -> Result<String, MigrateToolError> {
    let mut out = String::with_capacity(template.len() + slug.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| MigrateToolError::InvalidTemplate(format!("unclosed '{{' in {template:?}")))?;
        let token = &after[..close];
        let value = match token {
            "year" => format!("{:04}", at.year()),
            "month" => format!("{:02}", at.month()),
            "day" => format!("{:02}", at.day()),
            "hour" => format!("{:02}", at.hour()),
            "minute" => format!("{:02}", at.minute()),
            "second" => format!("{:02}", at.second()),
            "slug" => slug.to_string(),
            other => {
                return Err(MigrateToolError::InvalidTemplate(format!(
                    "unknown token {{{other}}}; expected one of {}",
                    TEMPLATE_TOKENS.join(", ")
                )))
            }
        };
        out.push_str(&value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Split a rendered file stem into its numeric version.
///
/// The stem must start with ASCII digits followed by `_`, which is the
/// naming scheme the migrator reads versions from.
pub fn parse_version(stem: &str) -> Result<i64, MigrateToolError> {
    let (digits, _) = stem.split_once('_').ok_or_else(|| {
        MigrateToolError::InvalidTemplate(format!("{stem:?} has no `_` after the version"))
    })?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MigrateToolError::InvalidTemplate(format!(
            "{stem:?} must start with an all-digit version"
        )));
    }
    digits
        .parse()
        .map_err(|_| MigrateToolError::InvalidTemplate(format!("version of {stem:?} overflows")))
}

/// Versions already present in `dir`, read from `<version>_*.sql` names.
pub fn existing_versions(dir: &Path) -> Result<Vec<i64>, MigrateToolError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|e| MigrateToolError::io(dir, e))?;

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MigrateToolError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.ends_with(".sql") {
            continue;
        }
        if let Ok(version) = parse_version(name) {
            versions.push(version);
        }
    }
    versions.sort_unstable();
    versions.dedup();
    Ok(versions)
}

/// Write a new `up`/`down` pair into the script location.
pub fn create_revision(
    settings: &MigrateSettings,
    message: &str,
    at: NaiveDateTime,
) -> Result<GeneratedRevision, MigrateToolError> {
    let slug = slugify(message, settings.truncate_slug_length);
    if slug.is_empty() {
        return Err(MigrateToolError::InvalidSetting {
            key: "message",
            reason: "must contain at least one letter or digit".into(),
        });
    }

    let stem = render_template(&settings.file_template, at, &slug)?;
    if stem.contains(['/', '\\']) {
        return Err(MigrateToolError::InvalidTemplate(format!(
            "{stem:?} must not contain path separators"
        )));
    }
    let version = parse_version(&stem)?;

    let dir = &settings.script_location;
    if existing_versions(dir)?.contains(&version) {
        return Err(MigrateToolError::DuplicateVersion(version));
    }
    std::fs::create_dir_all(dir).map_err(|e| MigrateToolError::io(dir, e))?;

    let up_path = dir.join(format!("{stem}.up.sql"));
    let down_path = dir.join(format!("{stem}.down.sql"));
    let created = at.format("%Y-%m-%d %H:%M:%S");

    write_new(
        &up_path,
        &format!("-- {message}\n-- Version: {version}\n-- Created: {created}\n\n"),
    )?;
    write_new(
        &down_path,
        &format!("-- Revert: {message}\n-- Version: {version}\n\n"),
    )?;

    tracing::info!(version, path = %up_path.display(), "Generated revision");

    Ok(GeneratedRevision {
        version,
        stem,
        up_path,
        down_path,
    })
}

/// The `revision` command: write the pair, then run the post-write hooks
/// against both files unless `run_hooks` is off.
pub fn generate(
    settings: &MigrateSettings,
    message: &str,
    at: NaiveDateTime,
    run_hooks: bool,
) -> Result<GeneratedRevision, MigrateToolError> {
    let generated = create_revision(settings, message, at)?;
    if run_hooks {
        run_post_write_hooks(&settings.post_write_hooks, &generated.files())?;
    } else {
        tracing::info!("Skipping post-write hooks");
    }
    Ok(generated)
}

fn write_new(path: &Path, contents: &str) -> Result<(), MigrateToolError> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => MigrateToolError::RevisionExists(path.into()),
            _ => MigrateToolError::io(path, e),
        })?;
    file.write_all(contents.as_bytes())
        .map_err(|e| MigrateToolError::io(path, e))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;
    use crate::settings::PostWriteHook;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    fn settings_in(dir: &Path) -> MigrateSettings {
        MigrateSettings {
            script_location: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Add  event-codes: severity!", 40), "add_event_codes_severity");
    }

    #[test]
    fn slugify_truncates_on_word_boundary() {
        assert_eq!(slugify("create prefixes table with tree", 20), "create_prefixes");
        assert_eq!(slugify("supercalifragilistic", 5), "super");
        assert_eq!(slugify("  ...  ", 40), "");
    }

    #[test]
    fn render_pads_date_parts() {
        let name = render_template(
            "{year}{month}{day}{hour}{minute}{second}_{slug}",
            at(),
            "init",
        )
        .unwrap();
        assert_eq!(name, "20240601090507_init");
    }

    #[test]
    fn render_rejects_unknown_and_unclosed_tokens() {
        assert_matches!(
            render_template("{rev}_{slug}", at(), "x"),
            Err(MigrateToolError::InvalidTemplate(_))
        );
        assert_matches!(
            render_template("{year", at(), "x"),
            Err(MigrateToolError::InvalidTemplate(_))
        );
    }

    #[test]
    fn version_must_lead_the_name() {
        assert_eq!(parse_version("20240601090507_init").unwrap(), 20240601090507);
        assert!(parse_version("init_20240601").is_err());
        assert!(parse_version("20240601").is_err());
        assert!(parse_version("_init").is_err());
    }

    #[test]
    fn create_writes_up_and_down_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(&dir.path().join("migrations"));

        let rev = create_revision(&settings, "Add hint column", at()).unwrap();

        assert_eq!(rev.version, 20240601090507);
        assert_eq!(rev.stem, "20240601090507_add_hint_column");
        let up = std::fs::read_to_string(&rev.up_path).unwrap();
        assert!(up.starts_with("-- Add hint column\n"));
        assert!(rev.down_path.ends_with("20240601090507_add_hint_column.down.sql"));
        assert!(rev.down_path.exists());
    }

    #[test]
    fn create_refuses_duplicate_version() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());

        create_revision(&settings, "first", at()).unwrap();
        assert_matches!(
            create_revision(&settings, "second", at()),
            Err(MigrateToolError::DuplicateVersion(20240601090507))
        );
    }

    #[test]
    fn create_rejects_empty_message() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            create_revision(&settings_in(dir.path()), "!!!", at()),
            Err(MigrateToolError::InvalidSetting { key: "message", .. })
        );
    }

    fn failing_hook() -> PostWriteHook {
        PostWriteHook {
            name: "lint".to_string(),
            command: "kyotsu-no-such-linter".to_string(),
            args: vec!["{file}".to_string()],
        }
    }

    #[test]
    fn generate_skips_hooks_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings_in(dir.path());
        settings.post_write_hooks = vec![failing_hook()];

        let rev = generate(&settings, "add hint", at(), false).unwrap();
        assert!(rev.up_path.exists());
        assert!(rev.down_path.exists());
    }

    #[test]
    fn generate_runs_hooks_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings_in(dir.path());
        settings.post_write_hooks = vec![failing_hook()];

        assert_matches!(
            generate(&settings, "add hint", at(), true),
            Err(MigrateToolError::HookSpawn { name, .. }) if name == "lint"
        );
    }

    #[test]
    fn existing_versions_reads_sql_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2_b.up.sql"), "").unwrap();
        std::fs::write(dir.path().join("2_b.down.sql"), "").unwrap();
        std::fs::write(dir.path().join("1_a.sql"), "").unwrap();
        std::fs::write(dir.path().join("README.md"), "").unwrap();

        assert_eq!(existing_versions(dir.path()).unwrap(), vec![1, 2]);
    }
}
