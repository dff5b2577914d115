use super::*;

/// The params array of `mining.subscribe`: `[user_agent?, enonce1?]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscribe {
    pub user_agent: String,
    pub enonce1: Option<Extranonce>,
}

impl Serialize for Subscribe {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.enonce1.is_some() { 2 } else { 1 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.user_agent)?;
        if let Some(enonce1) = &self.enonce1 {
            seq.serialize_element(enonce1)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Subscribe {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Two((String, Extranonce)),
            One((String,)),
            Other(Vec<Value>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Two((user_agent, enonce1)) => Ok(Subscribe {
                user_agent,
                enonce1: Some(enonce1),
            }),
            Raw::One((user_agent,)) => Ok(Subscribe {
                user_agent,
                enonce1: None,
            }),
            Raw::Other(values) => {
                let user_agent = values
                    .first()
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(Subscribe {
                    user_agent,
                    enonce1: None,
                })
            }
        }
    }
}

/// The result array of a successful `mining.subscribe`:
/// `[subscriptions, enonce1, enonce2_size]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeResult(pub Vec<(String, String)>, pub Extranonce, pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_both_fields() {
        let json = r#"["cgminer/4.10.0", "deadbeef"]"#;
        let subscribe: Subscribe = serde_json::from_str(json).unwrap();
        assert_eq!(subscribe.user_agent, "cgminer/4.10.0");
        assert_eq!(subscribe.enonce1, Some(Extranonce::from_bytes(&[0xde, 0xad, 0xbe, 0xef])));
    }

    #[test]
    fn deserialize_with_only_user_agent() {
        let json = r#"["cgminer/4.10.0"]"#;
        let subscribe: Subscribe = serde_json::from_str(json).unwrap();
        assert_eq!(subscribe.enonce1, None);
    }

    #[test]
    fn deserialize_empty_array_tolerated() {
        let json = r#"[]"#;
        let subscribe: Subscribe = serde_json::from_str(json).unwrap();
        assert_eq!(subscribe.user_agent, "");
        assert_eq!(subscribe.enonce1, None);
    }

    #[test]
    fn subscribe_result_roundtrip() {
        let result = SubscribeResult(
            vec![
                ("mining.set_difficulty".into(), "1".into()),
                ("mining.notify".into(), "1".into()),
            ],
            Extranonce::from_bytes(&[1, 2, 3, 4]),
            8,
        );
        let json = serde_json::to_string(&result).unwrap();
        let back: SubscribeResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
