//! Loading options from JSON.
//!
//! Accepts either `{"options": [...], "groupOptions": [...]}` (both keys
//! optional) or a bare array of items.

use crate::catalog::{Group, Item};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OptionSource {
    #[serde(default)]
    pub options: Vec<Item>,
    #[serde(default, rename = "groupOptions", alias = "group_options")]
    pub group_options: Vec<Group>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSource {
    Flat(Vec<Item>),
    Full(OptionSource),
}

impl OptionSource {
    pub fn from_json(text: &str) -> Result<Self> {
        let source = match serde_json::from_str::<RawSource>(text) {
            Ok(RawSource::Flat(options)) => OptionSource {
                options,
                group_options: Vec::new(),
            },
            Ok(RawSource::Full(source)) => source,
            // Re-parse as the object form so the error names the bad field.
            Err(_) => serde_json::from_str::<OptionSource>(text)?,
        };
        source.validate()?;
        Ok(source)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let source = Self::from_json(&text)?;
        tracing::debug!(
            path = %path.display(),
            options = source.options.len(),
            groups = source.group_options.len(),
            "loaded options"
        );
        Ok(source)
    }

    /// Reject items whose `value` is empty; they cannot be told apart.
    fn validate(&self) -> Result<()> {
        let grouped = self.group_options.iter().flat_map(|g| g.items.iter());
        match self.options.iter().chain(grouped).find(|i| i.value.is_empty()) {
            Some(item) => Err(Error::InvalidItem(format!(
                "option \"{}\" has an empty value",
                item.name
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array() {
        let source =
            OptionSource::from_json(r#"[{"name":"Alpha","value":"a"},{"name":"Beta","value":"b"}]"#)
                .unwrap();
        assert_eq!(source.options.len(), 2);
        assert!(source.group_options.is_empty());
    }

    #[test]
    fn object_with_groups() {
        let source = OptionSource::from_json(
            r#"{
                "options": [{"name":"Alpha","value":"a"}],
                "groupOptions": [
                    {"groupName":"Metros","items":[{"name":"Gamma","value":"g","path":"/g.json"}]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(source.options, [Item::new("Alpha", "a")]);
        assert_eq!(source.group_options[0].group_name, "Metros");
        assert_eq!(source.group_options[0].items, [Item::new("Gamma", "g")]);
    }

    #[test]
    fn missing_value_fails_fast() {
        let err = OptionSource::from_json(r#"{"options":[{"name":"Alpha"}]}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn empty_value_is_rejected() {
        let err = OptionSource::from_json(r#"[{"name":"Alpha","value":""}]"#).unwrap_err();
        assert!(matches!(err, Error::InvalidItem(_)));
    }
}
