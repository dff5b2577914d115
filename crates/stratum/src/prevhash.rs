use super::*;

/// `prevhash` in the Stratum protocol swaps the bytes of every 32-bit word
/// into big-endian, rather than reversing the whole 32-byte hash the way
/// Bitcoin normally displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct PrevHash(BlockHash);

impl From<BlockHash> for PrevHash {
    fn from(hash: BlockHash) -> Self {
        Self(hash)
    }
}

impl From<PrevHash> for BlockHash {
    fn from(prevhash: PrevHash) -> Self {
        prevhash.0
    }
}

fn word_swap(input: &[u8; 32]) -> [u8; 32] {
    let mut output = [0u8; 32];
    for (chunk_in, chunk_out) in input.chunks_exact(4).zip(output.chunks_exact_mut(4)) {
        let word = BigEndian::read_u32(chunk_in);
        LittleEndian::write_u32(chunk_out, word);
    }
    output
}

impl FromStr for PrevHash {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|err| InternalError::Parse {
            message: format!("invalid prevhash hex `{s}`: {err}"),
        })?;
        let swapped = word_swap(&bytes);
        Ok(Self(BlockHash::from_byte_array(swapped)))
    }
}

impl Display for PrevHash {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let swapped = word_swap(self.0.as_byte_array());
        write!(f, "{}", hex::encode(swapped))
    }
}
