//! Shell command templates consumed by the external executor.
//!
//! The executor sources a helper library before running the generated
//! script: bash helpers (`add_tool`, `add_log`, ...) on linux and
//! darwin, PowerShell equivalents (`Add-Tool`, `Add-Log`, ...) on
//! win32. This module only fills the templates; it never runs anything.

use phpup_core::tools::Os;

/// Status marker for log lines, expanded by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMark {
    /// Informational success marker.
    Tick,
    /// Failure marker.
    Cross,
}

impl std::fmt::Display for LogMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tick => write!(f, "$tick"),
            Self::Cross => write!(f, "$cross"),
        }
    }
}

/// Leading part of an executor command, OS-keyed.
///
/// `install_command(Os::Linux, "composer_tool")` is `"add_composer_tool "`,
/// the win32 spelling is `"Add-ComposerTool "`.
#[must_use]
pub fn install_command(os: Os, action: &str) -> String {
    if os.is_windows() {
        format!("Add-{} ", pascal_case(action))
    } else {
        format!("add_{action} ")
    }
}

/// One step-header line.
#[must_use]
pub fn step_log(message: &str, os: Os) -> String {
    if os.is_windows() {
        format!("Step-Log \"{message}\"")
    } else {
        format!("step_log \"{message}\"")
    }
}

/// One status line naming a tool and a human-readable reason.
#[must_use]
pub fn add_log(mark: LogMark, tool: &str, message: &str, os: Os) -> String {
    if os.is_windows() {
        format!("Add-Log \"{mark}\" \"{tool}\" \"{message}\"")
    } else {
        format!("add_log \"{mark}\" \"{tool}\" \"{message}\"")
    }
}

/// Space-join the non-empty arguments.
#[must_use]
pub fn joins(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fragment sourcing a per-tool install script and invoking its entry
/// point, for tools whose install is not a single archive or package.
#[must_use]
pub fn custom_package(base: &str, kind: &str, version: &str, os: Os) -> String {
    let name: String = base.chars().filter(|c| !c.is_ascii_digit()).collect();
    if os.is_windows() {
        format!(
            ". scripts\\{kind}\\{name}.ps1\nAdd-{} {version}",
            pascal_case(&name)
        )
    } else {
        format!(". scripts/{kind}/{name}.sh\nadd_{name} {version}")
    }
}

/// Split a comma-separated tool list, honoring double quotes, trimming
/// whitespace and dropping empties.
#[must_use]
pub fn parse_tools_csv(csv: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in csv.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                entries.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    entries.push(current);
    entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn pascal_case(action: &str) -> String {
    action
        .split(['_', '-'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_command_per_os() {
        assert_eq!(install_command(Os::Linux, "tool"), "add_tool ");
        assert_eq!(install_command(Os::Darwin, "pecl"), "add_pecl ");
        assert_eq!(
            install_command(Os::Win32, "composer_tool"),
            "Add-ComposerTool "
        );
    }

    #[test]
    fn test_log_lines() {
        assert_eq!(step_log("Setup Tools", Os::Linux), "step_log \"Setup Tools\"");
        assert_eq!(
            add_log(LogMark::Cross, "phpunit", "boom", Os::Linux),
            "add_log \"$cross\" \"phpunit\" \"boom\""
        );
        assert_eq!(
            add_log(LogMark::Tick, "phpize", "skipped", Os::Win32),
            "Add-Log \"$tick\" \"phpize\" \"skipped\""
        );
    }

    #[test]
    fn test_joins_drops_empty_parts() {
        assert_eq!(joins(&["a", "", "b"]), "a b");
        assert_eq!(joins(&["", ""]), "");
    }

    #[test]
    fn test_custom_package_fragment() {
        assert_eq!(
            custom_package("protoc", "tools", "latest", Os::Linux),
            ". scripts/tools/protoc.sh\nadd_protoc latest"
        );
        assert_eq!(
            custom_package("grpc_php_plugin", "tools", "1.2.3", Os::Win32),
            ". scripts\\tools\\grpc_php_plugin.ps1\nAdd-GrpcPhpPlugin 1.2.3"
        );
    }

    #[test]
    fn test_parse_tools_csv() {
        assert_eq!(
            parse_tools_csv("phpunit, phpstan:1.10.0 ,\"behat\""),
            vec!["phpunit", "phpstan:1.10.0", "behat"]
        );
        assert_eq!(parse_tools_csv(""), Vec::<String>::new());
        assert_eq!(
            parse_tools_csv("\"a, b\",c"),
            vec!["a, b", "c"]
        );
    }
}
