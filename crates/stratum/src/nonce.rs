use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Nonce(pub u32);

impl From<u32> for Nonce {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

impl From<Nonce> for u32 {
    fn from(nonce: Nonce) -> Self {
        nonce.0
    }
}

impl FromStr for Nonce {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(u32::from_str_radix(s, 16).map_err(|_| {
            InternalError::Parse {
                message: format!("invalid nonce hex: {s}"),
            }
        })?))
    }
}

impl Display for Nonce {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn some_nonces() {
        for (hex, value) in [("00000000", 0u32), ("deadbeef", 0xdeadbeef), ("ffffffff", u32::MAX)] {
            let nonce: Nonce = hex.parse().unwrap();
            assert_eq!(nonce.0, value);
            assert_eq!(nonce.to_string(), hex);
        }
    }

    #[test]
    fn rejects_bad_hex() {
        assert!("nothex!!".parse::<Nonce>().is_err());
    }
}
