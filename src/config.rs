//! Configuration loading.
//!
//! The config file is YAML with two conveniences: `${VAR}` / `$VAR`
//! environment interpolation in every string (a missing variable is an
//! error naming it), and `!include other.yaml` to split large configs,
//! resolved relative to the including file.
//!
//! Identity duplicates (two tags with one name, two delay profiles with
//! one tag set) are rejected here, before any diff runs - the engine
//! itself resolves duplicates last-write-wins, which is never what the
//! declarer meant.

use anyhow::{Context as _, Result, bail};
use arrkit::InstanceConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Root of the declarative config file.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub sonarr: Vec<InstanceConfig>,
}

/// Load, interpolate and validate a config file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let value = load_yaml(path)?;
    let value = interpolate(value)?;
    let config: AppConfig = serde_yaml::from_value(value)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    validate(&config)?;
    Ok(config)
}

fn load_yaml(path: &Path) -> Result<serde_yaml::Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("config file not found: {}", path.display()))?;
    let value: serde_yaml::Value =
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_includes(value, root)
}

/// Replace `!include file.yaml` nodes with the parsed file contents.
fn resolve_includes(value: serde_yaml::Value, root: &Path) -> Result<serde_yaml::Value> {
    match value {
        serde_yaml::Value::Tagged(tagged) if tagged.tag == "!include" => {
            let Some(relative) = tagged.value.as_str() else {
                bail!("!include expects a file path");
            };
            let include_path = root.join(relative);
            load_yaml(&include_path)
                .with_context(|| format!("included file: {}", include_path.display()))
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut resolved = serde_yaml::Mapping::new();
            for (key, entry) in mapping {
                resolved.insert(key, resolve_includes(entry, root)?);
            }
            Ok(serde_yaml::Value::Mapping(resolved))
        }
        serde_yaml::Value::Sequence(items) => Ok(serde_yaml::Value::Sequence(
            items
                .into_iter()
                .map(|item| resolve_includes(item, root))
                .collect::<Result<_>>()?,
        )),
        other => Ok(other),
    }
}

fn interpolate(value: serde_yaml::Value) -> Result<serde_yaml::Value> {
    match value {
        serde_yaml::Value::String(text) => {
            Ok(serde_yaml::Value::String(interpolate_env_vars(&text)?))
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut resolved = serde_yaml::Mapping::new();
            for (key, entry) in mapping {
                resolved.insert(key, interpolate(entry)?);
            }
            Ok(serde_yaml::Value::Mapping(resolved))
        }
        serde_yaml::Value::Sequence(items) => Ok(serde_yaml::Value::Sequence(
            items
                .into_iter()
                .map(interpolate)
                .collect::<Result<_>>()?,
        )),
        other => Ok(other),
    }
}

/// Replace `${VAR}` or `$VAR` references with environment values.
pub fn interpolate_env_vars(input: &str) -> Result<String> {
    static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("env var pattern")
    });

    let mut output = String::with_capacity(input.len());
    let mut last = 0;
    for captures in PATTERN.captures_iter(input) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let Some(name) = captures.get(1).or_else(|| captures.get(2)) else {
            continue;
        };
        output.push_str(&input[last..whole.start()]);
        match std::env::var(name.as_str()) {
            Ok(value) => output.push_str(&value),
            Err(_) => bail!(
                "environment variable '{}' referenced in config but not set",
                name.as_str()
            ),
        }
        last = whole.end();
    }
    output.push_str(&input[last..]);
    Ok(output)
}

/// Reject identity collisions the diff would otherwise merge silently.
fn validate(config: &AppConfig) -> Result<()> {
    check_duplicates(
        "instance",
        "config",
        config.sonarr.iter().map(|i| i.name.clone()),
    )?;

    for instance in &config.sonarr {
        let name = &instance.name;
        if let Some(section) = &instance.tags {
            check_duplicates("tag", name, section.definitions.iter().cloned())?;
        }
        if let Some(section) = &instance.custom_formats {
            check_duplicates(
                "custom format",
                name,
                section.definitions.iter().map(|d| d.name.clone()),
            )?;
        }
        if let Some(section) = &instance.quality_definitions {
            check_duplicates(
                "quality definition",
                name,
                section.definitions.iter().map(|d| d.title.clone()),
            )?;
        }
        if let Some(section) = &instance.quality_profiles {
            check_duplicates(
                "quality profile",
                name,
                section.definitions.iter().map(|d| d.name.clone()),
            )?;
        }
        if let Some(section) = &instance.delay_profiles {
            check_duplicates(
                "delay profile tag set",
                name,
                section.definitions.iter().map(|d| {
                    let mut tags = d.tags.clone();
                    tags.sort();
                    tags.join(",")
                }),
            )?;
        }
        if let Some(section) = &instance.indexers {
            check_duplicates(
                "indexer",
                name,
                section.definitions.iter().map(|d| d.name.clone()),
            )?;
        }
        if let Some(section) = &instance.download_clients {
            check_duplicates(
                "download client",
                name,
                section.definitions.iter().map(|d| d.name.clone()),
            )?;
        }
    }
    Ok(())
}

fn check_duplicates(
    kind: &str,
    instance: &str,
    keys: impl IntoIterator<Item = String>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key.clone()) {
            bail!("duplicate {kind} '{key}' declared for '{instance}'");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_interpolate_braced_and_bare() {
        // PATH is always present; avoids mutating the process environment.
        let path = std::env::var("PATH").unwrap();
        assert_eq!(
            interpolate_env_vars("pre-${PATH}-post").unwrap(),
            format!("pre-{path}-post")
        );
        assert_eq!(interpolate_env_vars("$PATH").unwrap(), path);
    }

    #[test]
    fn test_interpolate_missing_var_names_it() {
        let err = interpolate_env_vars("${DECLARR_TEST_DOES_NOT_EXIST}").unwrap_err();
        assert!(err.to_string().contains("DECLARR_TEST_DOES_NOT_EXIST"));
    }

    #[test]
    fn test_interpolate_plain_text_untouched() {
        assert_eq!(interpolate_env_vars("no vars here").unwrap(), "no vars here");
    }

    #[test]
    fn test_load_config_with_include() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "tags.yaml",
            "delete_unmanaged: false\ndefinitions:\n  - anime\n  - daily\n",
        );
        write_file(
            dir.path(),
            "main.yaml",
            "sonarr:\n  - name: main\n    base_url: http://localhost:8989\n    api_key: abc\n    tags: !include tags.yaml\n",
        );

        let config = load_config(&dir.path().join("main.yaml")).unwrap();
        let tags = config.sonarr[0].tags.as_ref().unwrap();
        assert_eq!(tags.definitions, vec!["anime", "daily"]);
    }

    #[test]
    fn test_load_config_missing_include_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "main.yaml",
            "sonarr:\n  - name: main\n    tags: !include nope.yaml\n",
        );
        assert!(load_config(&dir.path().join("main.yaml")).is_err());
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "main.yaml",
            "sonarr:\n  - name: main\n    tags:\n      definitions: [anime, anime]\n",
        );
        let err = load_config(&dir.path().join("main.yaml")).unwrap_err();
        assert!(err.to_string().contains("duplicate tag 'anime'"));
    }

    #[test]
    fn test_duplicate_delay_profile_tag_set_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "main.yaml",
            concat!(
                "sonarr:\n",
                "  - name: main\n",
                "    delay_profiles:\n",
                "      definitions:\n",
                "        - {order: 1, tags: [a, b]}\n",
                "        - {order: 2, tags: [b, a]}\n",
            ),
        );
        let err = load_config(&dir.path().join("main.yaml")).unwrap_err();
        assert!(err.to_string().contains("delay profile tag set"));
    }

    #[test]
    fn test_duplicate_instance_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "main.yaml",
            "sonarr:\n  - name: main\n  - name: main\n",
        );
        assert!(load_config(&dir.path().join("main.yaml")).is_err());
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "main.yaml", "sonar:\n  - name: main\n");
        assert!(load_config(&dir.path().join("main.yaml")).is_err());
    }
}
