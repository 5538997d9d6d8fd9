//! Input unit configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use flowfetch_core::FlowUnit;
use serde::{Deserialize, Serialize};

/// Attributes and initial content of the unit handed to the fetcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct UnitConfig {
    /// Unit attribute as `name=value`; may be repeated.
    #[arg(short = 'a', long = "attribute", value_name = "NAME=VALUE", value_parser = parse_attribute)]
    #[serde(default)]
    pub attributes: Vec<(String, String)>,

    /// File whose bytes become the unit's initial content.
    #[arg(short, long, env = "FLOWFETCH_INPUT")]
    #[serde(default)]
    pub input: Option<PathBuf>,
}

impl UnitConfig {
    /// Builds the unit, reading the input file if one is configured.
    pub async fn build(&self) -> anyhow::Result<FlowUnit> {
        let mut unit = self
            .attributes
            .iter()
            .fold(FlowUnit::new(), |unit, (name, value)| {
                unit.with_attribute(name, value)
            });

        if let Some(path) = &self.input {
            let content = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read input file {}", path.display()))?;
            unit = unit.with_content(content);
        }

        Ok(unit)
    }
}

fn parse_attribute(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    if name.is_empty() {
        return Err(format!("attribute name is empty in `{s}`"));
    }
    Ok((name.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_attributes() {
        assert_eq!(
            parse_attribute("filename=a=b.txt").unwrap(),
            ("filename".into(), "a=b.txt".into())
        );
        assert_eq!(parse_attribute("empty=").unwrap(), ("empty".into(), "".into()));
        assert!(parse_attribute("novalue").is_err());
        assert!(parse_attribute("=value").is_err());
    }

    #[tokio::test]
    async fn builds_unit_from_attributes_and_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"seed").unwrap();

        let config = UnitConfig {
            attributes: vec![("filename".into(), "cat.jpg".into())],
            input: Some(file.path().to_path_buf()),
        };
        let unit = config.build().await.unwrap();

        assert_eq!(unit.attribute("filename"), Some("cat.jpg"));
        assert_eq!(unit.content().as_ref(), b"seed");
    }

    #[tokio::test]
    async fn missing_input_file_is_an_error() {
        let config = UnitConfig {
            attributes: Vec::new(),
            input: Some(PathBuf::from("/nonexistent/flowfetch/input")),
        };
        assert!(config.build().await.is_err());
    }
}
