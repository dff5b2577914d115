use super::*;

/// The params array of `mining.authorize`: `[username, password?]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Authorize {
    pub username: String,
    pub password: Option<String>,
}

impl Serialize for Authorize {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.password.is_some() { 2 } else { 1 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.username)?;
        if let Some(password) = &self.password {
            seq.serialize_element(password)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Authorize {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Two((String, Option<String>)),
            One((String,)),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Two((username, password)) => Ok(Authorize { username, password }),
            Raw::One((username,)) => Ok(Authorize {
                username,
                password: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_password() {
        let json = r#"["alice.worker1", "x"]"#;
        let auth: Authorize = serde_json::from_str(json).unwrap();
        assert_eq!(auth.password, Some("x".into()));
    }

    #[test]
    fn deserialize_without_password() {
        let json = r#"["alice.worker1"]"#;
        let auth: Authorize = serde_json::from_str(json).unwrap();
        assert_eq!(auth.password, None);
    }

    #[test]
    fn deserialize_null_password_normalizes_to_none() {
        let json = r#"["alice.worker1", null]"#;
        let auth: Authorize = serde_json::from_str(json).unwrap();
        assert_eq!(auth.password, None);
    }

    #[test]
    fn rejects_empty_array() {
        let json = r#"[]"#;
        assert!(serde_json::from_str::<Authorize>(json).is_err());
    }

    #[test]
    fn serialize_omits_password_when_none() {
        let auth = Authorize {
            username: "alice.worker1".into(),
            password: None,
        };
        let v = serde_json::to_value(&auth).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 1);
    }
}
