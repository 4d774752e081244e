// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates names, image repositories, and the container list while parsing.

use std::collections::HashSet;

use nonempty::NonEmpty;
use serde::Deserialize;

use super::ContainerConfig;
use crate::types::{ApplicationName, EnvironmentName, ImageRepository};

pub fn deserialize_application_name<'de, D>(deserializer: D) -> Result<ApplicationName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ApplicationName::new(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_environment_name<'de, D>(deserializer: D) -> Result<EnvironmentName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    EnvironmentName::new(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_image_repository<'de, D>(deserializer: D) -> Result<ImageRepository, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRepository::parse(&s).map_err(serde::de::Error::custom)
}

/// Container names end up in local image tags, so they follow image name rules.
pub fn deserialize_container_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("container name cannot be empty"));
    }
    if let Some(c) = s
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')))
    {
        return Err(serde::de::Error::custom(format!(
            "invalid character in container name '{s}': '{c}'"
        )));
    }
    Ok(s)
}

pub fn deserialize_containers<'de, D>(
    deserializer: D,
) -> Result<NonEmpty<ContainerConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let containers: Vec<ContainerConfig> = Vec::deserialize(deserializer)?;

    let mut seen = HashSet::new();
    for container in &containers {
        if !seen.insert(container.name.as_str()) {
            return Err(serde::de::Error::custom(format!(
                "duplicate container name: {}",
                container.name
            )));
        }
    }

    NonEmpty::from_vec(containers)
        .ok_or_else(|| serde::de::Error::custom("at least one container is required"))
}
