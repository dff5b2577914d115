use super::*;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ConfigureOptions {
    #[serde(rename = "version-rolling.mask", skip_serializing_if = "Option::is_none")]
    version_rolling_mask: Option<String>,
    #[serde(
        rename = "version-rolling.min-bit-count",
        skip_serializing_if = "Option::is_none"
    )]
    version_rolling_min_bit_count: Option<u32>,
    #[serde(rename = "minimum-difficulty.value", skip_serializing_if = "Option::is_none")]
    minimum_difficulty_value: Option<f64>,
    #[serde(flatten)]
    extra: std::collections::BTreeMap<String, Value>,
}

/// `mining.configure`'s params array: `[extensions, options]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configure {
    pub extensions: Vec<String>,
    pub version_rolling_mask: Option<Version>,
    pub version_rolling_min_bit_count: Option<u32>,
    pub minimum_difficulty_value: Option<f64>,
}

impl Serialize for Configure {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let options = ConfigureOptions {
            version_rolling_mask: self.version_rolling_mask.map(|m| m.to_string()),
            version_rolling_min_bit_count: self.version_rolling_min_bit_count,
            minimum_difficulty_value: self.minimum_difficulty_value,
            extra: Default::default(),
        };
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.extensions)?;
        seq.serialize_element(&options)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Configure {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Two((Vec<String>, ConfigureOptions)),
            One((Vec<String>,)),
        }

        let (extensions, options) = match Raw::deserialize(deserializer)? {
            Raw::Two((extensions, options)) => (extensions, options),
            Raw::One((extensions,)) => (extensions, ConfigureOptions::default()),
        };

        let version_rolling_mask = options
            .version_rolling_mask
            .map(|s| s.parse())
            .transpose()
            .map_err(de::Error::custom)?;

        Ok(Configure {
            extensions,
            version_rolling_mask,
            version_rolling_min_bit_count: options.version_rolling_min_bit_count,
            minimum_difficulty_value: options.minimum_difficulty_value,
        })
    }
}

/// The result object of a successful `mining.configure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigureResponse {
    #[serde(rename = "version-rolling")]
    pub version_rolling: bool,
    #[serde(rename = "version-rolling.mask", skip_serializing_if = "Option::is_none")]
    pub version_rolling_mask: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_one_element_normalizes() {
        let json = r#"[["version-rolling"]]"#;
        let configure: Configure = serde_json::from_str(json).unwrap();
        assert_eq!(configure.extensions, vec!["version-rolling"]);
        assert_eq!(configure.version_rolling_mask, None);
    }

    #[test]
    fn deserialize_mask_roundtrip() {
        let json = r#"[["version-rolling"], {"version-rolling.mask": "1fffe000"}]"#;
        let configure: Configure = serde_json::from_str(json).unwrap();
        assert_eq!(
            configure.version_rolling_mask,
            Some("1fffe000".parse().unwrap())
        );
    }

    #[test]
    fn deserialize_min_bit_count_and_min_diff() {
        let json = r#"[["version-rolling", "minimum-difficulty"], {"version-rolling.min-bit-count": 2, "minimum-difficulty.value": 512.0}]"#;
        let configure: Configure = serde_json::from_str(json).unwrap();
        assert_eq!(configure.version_rolling_min_bit_count, Some(2));
        assert_eq!(configure.minimum_difficulty_value, Some(512.0));
    }

    #[test]
    fn tolerates_unknown_keys() {
        let json = r#"[["version-rolling"], {"unknown-extension.value": true}]"#;
        assert!(serde_json::from_str::<Configure>(json).is_ok());
    }

    #[test]
    fn response_serializes_mask_when_present() {
        let response = ConfigureResponse {
            version_rolling: true,
            version_rolling_mask: Some("1fffe000".into()),
        };
        let v = serde_json::to_value(&response).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"version-rolling": true, "version-rolling.mask": "1fffe000"})
        );
    }

    #[test]
    fn response_omits_mask_when_absent() {
        let response = ConfigureResponse {
            version_rolling: false,
            version_rolling_mask: None,
        };
        let v = serde_json::to_value(&response).unwrap();
        assert_eq!(v, serde_json::json!({"version-rolling": false}));
    }
}
