use super::*;

/// `mining.set_difficulty`'s single-element params array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetDifficulty(pub Difficulty);

impl Serialize for SetDifficulty {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&self.0)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SetDifficulty {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (difficulty,) = <(Difficulty,)>::deserialize(deserializer)?;
        Ok(SetDifficulty(difficulty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let set = SetDifficulty(Difficulty::from(1024u64));
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[1024]");
        let back: SetDifficulty = serde_json::from_str(&json).unwrap();
        assert_eq!(back.0, set.0);
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(serde_json::from_str::<SetDifficulty>("[]").is_err());
        assert!(serde_json::from_str::<SetDifficulty>("[1, 2]").is_err());
    }
}
