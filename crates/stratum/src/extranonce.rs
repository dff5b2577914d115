use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Extranonce(Vec<u8>);

impl Extranonce {
    pub fn generate(size: usize) -> Self {
        let mut bytes = vec![0u8; size];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Alias for [`Extranonce::generate`], used throughout tests and call sites.
    pub fn random(size: usize) -> Self {
        Self::generate(size)
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = Vec::from_hex(s).map_err(|err| InternalError::Parse {
            message: format!("invalid extranonce hex `{s}`: {err}"),
        })?;
        Ok(Self(bytes))
    }

    /// Increments the extranonce as a big-endian counter, wrapping at capacity.
    pub fn increment_wrapping(&mut self) {
        for byte in self.0.iter_mut().rev() {
            let (next, carry) = byte.overflowing_add(1);
            *byte = next;
            if !carry {
                return;
            }
        }
    }
}

impl FromStr for Extranonce {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Display for Extranonce {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let e = Extranonce::from_bytes(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(e.to_string(), "deadbeef");
        assert_eq!(e.to_string().parse::<Extranonce>().unwrap(), e);
    }

    #[test]
    fn rejects_odd_length_hex() {
        assert!(Extranonce::from_hex("abc").is_err());
    }

    #[test]
    fn rejects_non_hex() {
        assert!(Extranonce::from_hex("zzzz").is_err());
    }

    #[test]
    fn generate_has_requested_length() {
        assert_eq!(Extranonce::generate(4).len(), 4);
        assert_eq!(Extranonce::generate(8).len(), 8);
    }

    #[test]
    fn increment_without_carry() {
        let mut e = Extranonce::from_bytes(&[0x00, 0x00]);
        e.increment_wrapping();
        assert_eq!(e.as_bytes(), &[0x00, 0x01]);
    }

    #[test]
    fn increment_with_carry() {
        let mut e = Extranonce::from_bytes(&[0x00, 0xff]);
        e.increment_wrapping();
        assert_eq!(e.as_bytes(), &[0x01, 0x00]);
    }

    #[test]
    fn increment_wraps_to_zero() {
        let mut e = Extranonce::from_bytes(&[0xff, 0xff]);
        e.increment_wrapping();
        assert_eq!(e.as_bytes(), &[0x00, 0x00]);
    }

    #[test]
    fn increment_sequence() {
        let mut e = Extranonce::from_bytes(&[0x00, 0xfe]);
        e.increment_wrapping();
        assert_eq!(e.as_bytes(), &[0x00, 0xff]);
        e.increment_wrapping();
        assert_eq!(e.as_bytes(), &[0x01, 0x00]);
    }
}
