use super::*;
use primitive_types::U256;

static DIFFICULTY_1_TARGET: LazyLock<U256> =
    LazyLock::new(|| U256::from_big_endian(&Target::MAX.to_be_bytes()));

const MAX_SCALE_NUM: u64 = 0xFFFF_FFFF;

/// Mining difficulty, stored internally as the `nbits`-style compact target
/// it corresponds to. Difficulty and target are inversely related: a lower
/// target means a harder share, so [`Ord`] is reversed relative to the
/// wrapped target.
#[derive(Debug, Clone, Copy)]
pub struct Difficulty(CompactTarget);

impl Difficulty {
    pub fn to_target(self) -> Target {
        Target::from_compact(self.0)
    }

    pub fn as_f64(self) -> f64 {
        self.to_target().difficulty_float()
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::from(1u64)
    }
}

impl PartialEq for Difficulty {
    fn eq(&self, other: &Self) -> bool {
        self.to_target() == other.to_target()
    }
}

impl Eq for Difficulty {}

impl PartialOrd for Difficulty {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Difficulty {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Lower target == higher difficulty.
        other.to_target().cmp(&self.to_target())
    }
}

impl From<CompactTarget> for Difficulty {
    fn from(compact: CompactTarget) -> Self {
        Self(compact)
    }
}

impl From<Difficulty> for CompactTarget {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl From<Nbits> for Difficulty {
    fn from(nbits: Nbits) -> Self {
        Self(nbits.to_compact())
    }
}

impl From<Difficulty> for Nbits {
    fn from(difficulty: Difficulty) -> Self {
        Nbits::from(difficulty.0)
    }
}

impl From<Target> for Difficulty {
    fn from(target: Target) -> Self {
        Self(target.to_compact_lossy())
    }
}

impl From<BlockHash> for Difficulty {
    /// Treats the share hash's bytes as a little-endian 256-bit integer
    /// target, the way a submitted share's achieved difficulty is scored.
    fn from(hash: BlockHash) -> Self {
        let le = U256::from_little_endian(hash.as_byte_array());
        let target = if le.is_zero() {
            Target::from_compact(CompactTarget::from_consensus(0))
        } else {
            let mut bytes = [0u8; 32];
            le.to_big_endian(&mut bytes);
            Target::from_be_bytes(bytes)
        };
        Difficulty::from(target)
    }
}

impl From<u64> for Difficulty {
    fn from(value: u64) -> Self {
        if value == 0 {
            return Difficulty::from(Target::MAX);
        }
        let target_num = *DIFFICULTY_1_TARGET / U256::from(value);
        let mut bytes = [0u8; 32];
        target_num.to_big_endian(&mut bytes);
        Difficulty::from(Target::from_be_bytes(bytes))
    }
}

impl From<f64> for Difficulty {
    fn from(value: f64) -> Self {
        if value <= 0.0 || !value.is_finite() {
            return Difficulty::from(Target::MAX);
        }
        // Scale to avoid precision loss from floating-point division.
        let scaled = (value * MAX_SCALE_NUM as f64).round() as u64;
        let scaled = scaled.max(1);
        let target_num =
            (*DIFFICULTY_1_TARGET * U256::from(MAX_SCALE_NUM)) / U256::from(scaled);
        let mut bytes = [0u8; 32];
        target_num.to_big_endian(&mut bytes);
        Difficulty::from(Target::from_be_bytes(bytes))
    }
}

impl From<u32> for Difficulty {
    fn from(value: u32) -> Self {
        Difficulty::from(u64::from(value))
    }
}

impl From<i32> for Difficulty {
    fn from(value: i32) -> Self {
        Difficulty::from(value.max(0) as u64)
    }
}

impl FromStr for Difficulty {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(n) = s.parse::<u64>() {
            return Ok(Difficulty::from(n));
        }
        let f: f64 = s.parse().map_err(|_| InternalError::Parse {
            message: format!("invalid difficulty `{s}`"),
        })?;
        Ok(Difficulty::from(f))
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let value = self.as_f64();
        if value >= 1.0 {
            format_si(value, "", f)
        } else {
            let precision = f.precision().unwrap_or(8);
            let mut text = format!("{value:.precision$}");
            while text.ends_with('0') {
                text.pop();
            }
            if text.ends_with('.') {
                text.push('0');
            }
            write!(f, "{text}")
        }
    }
}

impl Serialize for Difficulty {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = self.as_f64();
        if value >= 1.0 {
            serializer.serialize_u64(value.floor() as u64)
        } else {
            serializer.serialize_f64(value)
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(u64),
            Float(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Int(n) => {
                if n == 0 {
                    return Err(de::Error::custom("difficulty must be positive"));
                }
                Ok(Difficulty::from(n))
            }
            Repr::Float(value) => {
                if value <= 0.0 || !value.is_finite() {
                    return Err(de::Error::custom("difficulty must be a positive, finite number"));
                }
                Ok(Difficulty::from(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_1_is_max_target() {
        let diff = Difficulty::from(1u64);
        assert_eq!(diff.to_target(), Target::MAX);
    }

    #[test]
    fn higher_difficulty_is_lower_target() {
        let low = Difficulty::from(1u64);
        let high = Difficulty::from(1000u64);
        assert!(high > low);
        assert!(high.to_target() < low.to_target());
    }

    #[test]
    fn serializes_integers_as_int_and_fractions_as_float() {
        let v = serde_json::to_value(Difficulty::from(100u64)).unwrap();
        assert!(v.is_u64());

        let v = serde_json::to_value(Difficulty::from(0.001)).unwrap();
        assert!(v.is_f64());
    }

    #[test]
    fn display_uses_si_prefix_above_one() {
        let diff = Difficulty::from(1_500u64);
        assert_eq!(diff.to_string(), "1.5 k");
    }

    #[test]
    fn from_blockhash_scales_with_value() {
        let easy = BlockHash::from_byte_array([0xff; 32]);
        let hard = BlockHash::from_byte_array({
            let mut b = [0u8; 32];
            b[31] = 0x01;
            b
        });

        let easy_diff = Difficulty::from(easy);
        let hard_diff = Difficulty::from(hard);
        assert!(hard_diff > easy_diff);
    }

    #[test]
    fn deserialize_rejects_non_positive() {
        assert!(serde_json::from_str::<Difficulty>("0").is_err());
        assert!(serde_json::from_str::<Difficulty>("-1.0").is_err());
    }

    #[test]
    fn from_str_parses_int_and_float() {
        assert_eq!(Difficulty::from_str("100").unwrap(), Difficulty::from(100u64));
        assert_eq!(
            Difficulty::from_str("0.5").unwrap(),
            Difficulty::from(0.5)
        );
    }
}
