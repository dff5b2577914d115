use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, DeserializeFromStr, SerializeDisplay)]
pub struct Ntime(pub u32);

impl From<u32> for Ntime {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

impl From<Ntime> for u32 {
    fn from(ntime: Ntime) -> Self {
        ntime.0
    }
}

impl TryFrom<u64> for Ntime {
    type Error = InternalError;

    fn try_from(n: u64) -> Result<Self> {
        Ok(Self(u32::try_from(n).map_err(|_| InternalError::InvalidValue {
            message: format!("ntime {n} does not fit in u32"),
        })?))
    }
}

impl FromStr for Ntime {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(u32::from_str_radix(s, 16).context(ParseHexIntSnafu)?))
    }
}

impl Display for Ntime {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}
