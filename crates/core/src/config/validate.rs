use super::{types::Config, ConfigError};

fn contains(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration
/// Currently validates:
/// - Converter timeout is not 0
/// - Extension tables are non-empty and disjoint
/// - Primary container is accepted and subtitle format is a subtitle extension
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.converter.timeout_secs == 0 {
        return Err(invalid("converter.timeout_secs cannot be 0"));
    }

    let policy = &config.policy;
    for (name, list) in [
        ("policy.video_extensions", &policy.video_extensions),
        ("policy.subtitle_extensions", &policy.subtitle_extensions),
        ("policy.accepted_containers", &policy.accepted_containers),
    ] {
        if list.is_empty() {
            return Err(invalid(format!("{} cannot be empty", name)));
        }
    }

    if !contains(&policy.accepted_containers, &policy.primary_container) {
        return Err(invalid(format!(
            "policy.primary_container '{}' must be one of policy.accepted_containers",
            policy.primary_container
        )));
    }

    if !contains(&policy.subtitle_extensions, &policy.subtitle_format) {
        return Err(invalid(format!(
            "policy.subtitle_format '{}' must be one of policy.subtitle_extensions",
            policy.subtitle_format
        )));
    }

    if let Some(ext) = policy
        .video_extensions
        .iter()
        .find(|ext| contains(&policy.subtitle_extensions, ext))
    {
        return Err(invalid(format!(
            "extension '{}' is listed as both video and subtitle",
            ext
        )));
    }

    Ok(())
}
