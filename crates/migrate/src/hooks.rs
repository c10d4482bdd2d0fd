//! Post-write hooks.

use std::path::Path;
use std::process::Command;

use crate::error::MigrateToolError;
use crate::settings::PostWriteHook;

/// Placeholder replaced with the generated file's path.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Arguments for one hook invocation against `file`.
pub fn expand_args(hook: &PostWriteHook, file: &Path) -> Vec<String> {
    let file = file.to_string_lossy();
    hook.args
        .iter()
        .map(|arg| arg.replace(FILE_PLACEHOLDER, &file))
        .collect()
}

/// Run a single hook against `file`. A non-zero exit is an error.
pub fn run_hook(hook: &PostWriteHook, file: &Path) -> Result<(), MigrateToolError> {
    let args = expand_args(hook, file);
    tracing::info!(hook = %hook.name, command = %hook.command, file = %file.display(), "Running post-write hook");

    let status = Command::new(&hook.command)
        .args(&args)
        .status()
        .map_err(|source| MigrateToolError::HookSpawn {
            name: hook.name.clone(),
            source,
        })?;

    if !status.success() {
        return Err(MigrateToolError::HookFailed {
            name: hook.name.clone(),
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Run every hook, in order, against every file. Stops at the first failure.
pub fn run_post_write_hooks(
    hooks: &[PostWriteHook],
    files: &[&Path],
) -> Result<(), MigrateToolError> {
    for file in files {
        for hook in hooks {
            run_hook(hook, file)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn hook(command: &str, args: &[&str]) -> PostWriteHook {
        PostWriteHook {
            name: "test".to_string(),
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn expands_file_placeholder() {
        let h = hook("fmt", &["--inplace", "{file}", "--out={file}.bak"]);
        let args = expand_args(&h, Path::new("/tmp/1_init.up.sql"));
        assert_eq!(
            args,
            vec!["--inplace", "/tmp/1_init.up.sql", "--out=/tmp/1_init.up.sql.bak"]
        );
    }

    #[test]
    fn missing_command_is_spawn_error() {
        let h = hook("kyotsu-no-such-binary", &["{file}"]);
        assert_matches!(
            run_hook(&h, Path::new("x.sql")),
            Err(MigrateToolError::HookSpawn { .. })
        );
    }

    #[cfg(unix)]
    #[test]
    fn hook_edits_the_generated_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("1_init.up.sql");
        std::fs::write(&file, "select 1;\n").unwrap();

        let h = hook("sh", &["-c", "echo '-- formatted' >> \"$0\"", "{file}"]);
        run_post_write_hooks(std::slice::from_ref(&h), &[file.as_path()]).unwrap();

        let contents = std::fs::read_to_string(&file).unwrap();
        assert!(contents.ends_with("-- formatted\n"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_fails() {
        let h = hook("sh", &["-c", "exit 3"]);
        assert_matches!(
            run_hook(&h, Path::new("x.sql")),
            Err(MigrateToolError::HookFailed { .. })
        );
    }
}
