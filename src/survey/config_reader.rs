use crate::survey::*;

use serde::{Deserialize, Serialize};

/// The only version of the configuration format understood so far.
pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatorSource {
    pub name: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub annotator: String,
    pub item: String,
    pub label: Label,
    // Free text, only kept for the record
    pub note: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    pub version: u32,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    pub annotators: Vec<AnnotatorSource>,
    pub categories: Option<Vec<Label>>,
    #[serde(default)]
    pub overrides: Vec<OverrideEntry>,
}

impl AnnotationConfig {
    pub fn manual_overrides(&self) -> Vec<ManualOverride> {
        self.overrides
            .iter()
            .map(|o| ManualOverride {
                annotator: o.annotator.clone(),
                item: o.item.clone(),
                label: o.label,
            })
            .collect()
    }
}

pub fn read_annotation_config(path: &str) -> BSurveyResult<AnnotationConfig> {
    if !Path::new(path).exists() {
        return Err(Box::new(SurveyError::MissingInput {
            path: path.to_string(),
        }));
    }
    let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: AnnotationConfig =
        serde_json::from_str(&config_str).context(ParsingJsonSnafu { path })?;
    if config.version != SUPPORTED_CONFIG_VERSION {
        return Err(Box::new(SurveyError::UnsupportedConfigVersion {
            version: config.version,
            expected: SUPPORTED_CONFIG_VERSION,
        }));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_minimal_config() {
        let js = r#"{"version": 1, "annotators": [{"name": "A", "filePath": "a.csv"}]}"#;
        let config: AnnotationConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.output_settings.output_directory, None);
        assert_eq!(config.categories, None);
        assert!(config.overrides.is_empty());
        assert_eq!(config.annotators[0].file_path, "a.csv");
    }

    #[test]
    fn parse_overrides() {
        let js = r#"{
            "version": 1,
            "outputSettings": {"outputDirectory": "out"},
            "annotators": [],
            "categories": [0, 1, 2],
            "overrides": [{"annotator": "A", "item": "x", "label": 2}]
        }"#;
        let config: AnnotationConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.output_settings.output_directory.as_deref(), Some("out"));
        assert_eq!(
            config.manual_overrides(),
            vec![ManualOverride {
                annotator: "A".to_string(),
                item: "x".to_string(),
                label: 2
            }]
        );
    }

    #[test]
    fn reject_other_versions() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("annotations.json");
        fs::write(&p, r#"{"version": 2, "annotators": []}"#).unwrap();
        let e = read_annotation_config(p.to_str().unwrap()).unwrap_err();
        assert!(matches!(
            *e,
            SurveyError::UnsupportedConfigVersion {
                version: 2,
                expected: 1
            }
        ));
    }
}
