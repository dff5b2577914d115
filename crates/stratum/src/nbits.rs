use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Nbits(CompactTarget);

impl Nbits {
    pub fn to_compact(self) -> CompactTarget {
        self.0
    }
}

impl From<CompactTarget> for Nbits {
    fn from(compact: CompactTarget) -> Self {
        Self(compact)
    }
}

impl From<Nbits> for CompactTarget {
    fn from(nbits: Nbits) -> Self {
        nbits.0
    }
}

impl FromStr for Nbits {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(CompactTarget::from_unprefixed_hex(s).map_err(
            |err| InternalError::Parse {
                message: err.to_string(),
            },
        )?))
    }
}

impl Display for Nbits {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:08x}", self.0.to_consensus())
    }
}


impl Nbits {
    pub fn to_consensus(self) -> u32 {
        self.0.to_consensus()
    }
}
