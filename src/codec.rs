use super::*;

/// `ser_number` as ckpool-solo encodes it in coinbase scriptSigs: NOT Bitcoin's
/// minimal-CScriptNum encoding. Always length-prefixed, unsigned, little-endian.
pub(crate) fn ser_number(n: u64) -> Vec<u8> {
    match n {
        0 => vec![0x00],
        1..=0xff => vec![0x01, n as u8],
        0x100..=0xffff => {
            let mut out = vec![0x02];
            out.extend_from_slice(&(n as u16).to_le_bytes());
            out
        }
        0x10000..=0xffff_ffff => {
            let mut out = vec![0x03];
            out.extend_from_slice(&(n as u32).to_le_bytes());
            out
        }
        _ => {
            let mut out = vec![0x04];
            out.extend_from_slice(&n.to_le_bytes());
            out
        }
    }
}

/// Bitcoin's variable-length integer encoding, used for scriptSig/scriptPubKey lengths.
pub(crate) fn varint_encode(n: u64) -> Vec<u8> {
    if n < 0xfd {
        vec![n as u8]
    } else if n <= 0xffff {
        let mut out = vec![0xfd];
        out.extend_from_slice(&(n as u16).to_le_bytes());
        out
    } else if n <= 0xffff_ffff {
        let mut out = vec![0xfe];
        out.extend_from_slice(&(n as u32).to_le_bytes());
        out
    } else {
        let mut out = vec![0xff];
        out.extend_from_slice(&n.to_le_bytes());
        out
    }
}

pub(crate) fn double_sha256(data: &[u8]) -> [u8; 32] {
    *sha256d::Hash::hash(data).as_byte_array()
}

/// Flips the byte order of every 4-byte word, ckpool-solo's header-hash convention.
/// `data.len()` must be a multiple of 4.
pub(crate) fn word32_flip(data: &[u8]) -> Vec<u8> {
    debug_assert!(data.len() % 4 == 0, "word32_flip needs a multiple of 4 bytes");
    let mut out = Vec::with_capacity(data.len());
    for chunk in data.chunks_exact(4) {
        out.extend(chunk.iter().rev());
    }
    out
}

/// Lays out an 80-byte "flipped" block header: every field big-endian, merkle root
/// word-swapped, then the whole buffer word32-flipped. Used only for share/block
/// classification; the unflipped consensus header is used for `submitblock`.
fn flipped_header(
    version: Version,
    prevhash: PrevHash,
    merkle_root: MerkleNode,
    ntime: Ntime,
    nbits: Nbits,
    nonce: Nonce,
) -> [u8; 80] {
    let mut buf = [0u8; 80];

    buf[0..4].copy_from_slice(&u32::from(version).to_be_bytes());
    buf[4..36].copy_from_slice(BlockHash::from(prevhash).as_byte_array());
    buf[36..68].copy_from_slice(&word32_flip(merkle_root.as_byte_array()));
    buf[68..72].copy_from_slice(&u32::from(ntime).to_be_bytes());
    buf[72..76].copy_from_slice(&nbits.to_consensus().to_be_bytes());
    buf[76..80].copy_from_slice(&u32::from(nonce).to_be_bytes());

    let flipped = word32_flip(&buf);
    let mut out = [0u8; 80];
    out.copy_from_slice(&flipped);
    out
}

/// Double-sha256 of the flipped header. Feed the result through `stratum::Difficulty::from`
/// (which already treats a hash as a little-endian 256-bit integer) to score a share.
pub(crate) fn share_hash(
    version: Version,
    prevhash: PrevHash,
    merkle_root: MerkleNode,
    ntime: Ntime,
    nbits: Nbits,
    nonce: Nonce,
) -> BlockHash {
    let header = flipped_header(version, prevhash, merkle_root, ntime, nbits, nonce);
    BlockHash::from_byte_array(double_sha256(&header))
}
