use super::*;

/// `mining.suggest_difficulty`'s single-element params array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestDifficulty(pub Difficulty);

impl Serialize for SuggestDifficulty {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&self.0)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SuggestDifficulty {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (difficulty,) = <(Difficulty,)>::deserialize(deserializer)?;
        Ok(SuggestDifficulty(difficulty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let suggest = SuggestDifficulty(Difficulty::from(64u64));
        let json = serde_json::to_string(&suggest).unwrap();
        let back: SuggestDifficulty = serde_json::from_str(&json).unwrap();
        assert_eq!(back.0, suggest.0);
    }
}
