//! Human-readable error descriptions and structured JSON error formatting.

use mprofile_core::error::{BuildError, ProfileError};

/// Which input the CLI was processing when an error surfaced. Attached as
/// eyre context so the reason survives wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Trajectory,
    Script,
}

impl Stage {
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Config => "ConfigError",
            Self::Trajectory => "TrajectoryError",
            Self::Script => "ScriptError",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Config => "invalid configuration",
            Self::Trajectory => "invalid trajectory",
            Self::Script => "invalid input script",
        })
    }
}

impl std::error::Error for Stage {}

fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    let detail = chain_text(err);

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingDevice | BuildError::MissingTrajectory => format!(
                "What happened: A drive side was assembled without all of its parts ({be}).\nLikely causes: Internal wiring bug in the CLI.\nHow to fix: Re-run with --log-level=debug and report the output."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid side configuration ({msg}).\nLikely causes: Out-of-range values in [left]/[right] or [profile].\nHow to fix: Edit the config file, then rerun `check`."
            ),
            BuildError::DeviceConfig { .. } => format!(
                "What happened: No drive side could be configured ({detail}).\nLikely causes: Both controllers rejected their settings or are not responding.\nHow to fix: Check device ids, follower ids and gains in [left]/[right]."
            ),
        };
    }

    if let Some(pe) = err.downcast_ref::<ProfileError>() {
        return format!(
            "What happened: {pe}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    if err.downcast_ref::<toml::de::Error>().is_some() {
        return format!(
            "What happened: A TOML file could not be parsed ({detail}).\nLikely causes: Syntax error, wrong value type, or a missing required key such as left.axis.\nHow to fix: Fix the file at the reported line and rerun."
        );
    }

    if let Some(stage) = err.downcast_ref::<Stage>() {
        return match stage {
            Stage::Config => format!(
                "What happened: Configuration is invalid ({detail}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file and run `check` again."
            ),
            Stage::Trajectory => {
                let lower = detail.to_ascii_lowercase();
                if lower.contains("must have headers") {
                    "Invalid headers in trajectory CSV. Expected 'position,velocity,duration_ms'."
                        .to_string()
                } else {
                    format!(
                        "What happened: The trajectory could not be used ({detail}).\nLikely causes: Missing file, malformed rows, or no [profile].trajectory configured.\nHow to fix: Regenerate the CSV or pass --trajectory."
                    )
                }
            }
            Stage::Script => format!(
                "What happened: The input script could not be used ({detail}).\nLikely causes: Missing file, no [[step]] tables, or out-of-range button/axis ids.\nHow to fix: Fix the script and rerun."
            ),
        };
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {err}"
    )
}

/// Stable exit codes: 3 config, 4 trajectory, 5 script, 6 drivetrain build, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 6;
    }
    match err.downcast_ref::<Stage>() {
        Some(Stage::Config) => 3,
        Some(Stage::Trajectory) => 4,
        Some(Stage::Script) => 5,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "BuildError";
    }
    err.downcast_ref::<Stage>()
        .map_or("Error", |s| s.reason())
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
        "detail": chain_text(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn stage_context_drives_exit_code() {
        let err: eyre::Result<()> = Err(eyre::eyre!("trajectory must contain at least one point"));
        let err = err.wrap_err(Stage::Trajectory).unwrap_err();
        assert_eq!(exit_code_for_error(&err), 4);
        assert!(humanize(&err).contains("at least one point"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "TrajectoryError");
    }

    #[test]
    fn build_errors_map_to_build_code() {
        let err = eyre::Report::new(BuildError::DeviceConfig {
            side: "left",
            reason: "device not responding".into(),
        });
        assert_eq!(exit_code_for_error(&err), 6);
        assert!(humanize(&err).contains("No drive side could be configured"));
    }

    #[test]
    fn unknown_errors_fall_back() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("Original: boom"));
    }
}
