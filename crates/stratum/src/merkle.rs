use super::*;

/// A node in a merkle branch list, as it appears on the wire.
///
/// Unlike `bitcoin`'s own hash types, this does NOT reverse bytes for
/// display: `mining.notify`'s branch list and `merkle_root`'s reconstruction
/// both operate on the raw internal byte order emitted by the node's own
/// double-SHA256, so parsing and displaying are both byte-for-byte, no
/// reversal in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct MerkleNode(sha256d::Hash);

impl MerkleNode {
    pub fn as_byte_array(&self) -> &[u8; 32] {
        self.0.as_byte_array()
    }

    pub fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self(sha256d::Hash::from_byte_array(bytes))
    }

    pub fn from_raw_hash(hash: sha256d::Hash) -> Self {
        Self(hash)
    }

    pub fn to_raw_hash(self) -> sha256d::Hash {
        self.0
    }

    pub fn all_zeros() -> Self {
        Self(sha256d::Hash::all_zeros())
    }
}

impl FromStr for MerkleNode {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|err| InternalError::Parse {
            message: format!("invalid merkle node hex `{s}`: {err}"),
        })?;
        Ok(Self(sha256d::Hash::from_byte_array(bytes)))
    }
}

impl Display for MerkleNode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0.as_byte_array()))
    }
}

/// Computes the coinbase's contribution to the merkle root and folds it up
/// through the supplied branch, combining with each sibling's raw bytes
/// (no per-level reversal, matching how `merkle_branches` built them).
pub fn merkle_root(
    coinb1: &str,
    coinb2: &str,
    extranonce1: &Extranonce,
    extranonce2: &Extranonce,
    branches: &[MerkleNode],
) -> Result<MerkleNode> {
    let coinbase_hex = format!("{coinb1}{extranonce1}{extranonce2}{coinb2}");
    let coinbase_bytes = Vec::from_hex(&coinbase_hex).map_err(|err| InternalError::Parse {
        message: format!("invalid coinbase hex: {err}"),
    })?;

    let mut root = sha256d::Hash::hash(&coinbase_bytes).to_byte_array();

    for branch in branches {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&root);
        buf.extend_from_slice(branch.as_byte_array());
        root = sha256d::Hash::hash(&buf).to_byte_array();
    }

    Ok(MerkleNode::from_byte_array(root))
}

/// Builds the sibling list a pool hands out in `mining.notify`: one entry per
/// level of the merkle tree above the coinbase, always taken from the
/// non-coinbase transactions (duplicating the last element at odd levels).
pub fn merkle_branches(non_coinbase_txids: Vec<Txid>) -> Vec<MerkleNode> {
    let mut level: Vec<[u8; 32]> = non_coinbase_txids
        .iter()
        .map(|txid| *txid.as_raw_hash().as_byte_array())
        .collect();

    let mut branches = Vec::new();

    if level.is_empty() {
        return branches;
    }

    // First sibling of the coinbase is the first non-coinbase txid itself.
    branches.push(MerkleNode::from_byte_array(level[0]));

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }

        let mut next_level = Vec::with_capacity(level.len() / 2);
        for pair in level.chunks(2) {
            let mut buf = Vec::with_capacity(64);
            buf.extend_from_slice(&pair[0]);
            buf.extend_from_slice(&pair[1]);
            next_level.push(sha256d::Hash::hash(&buf).to_byte_array());
        }

        if next_level.len() > 1 {
            branches.push(MerkleNode::from_byte_array(next_level[1]));
        }

        level = next_level;
    }

    branches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_zero() {
        let node = MerkleNode::from_byte_array([0u8; 32]);
        let hex = node.to_string();
        assert_eq!(hex, "00".repeat(32));
        assert_eq!(hex.parse::<MerkleNode>().unwrap(), node);
    }

    #[test]
    fn roundtrip_sequential_bytes() {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let node = MerkleNode::from_byte_array(bytes);
        let hex = node.to_string();
        assert_eq!(hex.parse::<MerkleNode>().unwrap(), node);
        // no reversal: displaying the node gives back exactly the wire string
        // it would be parsed from, unlike bitcoin's own reversed hash Display.
        assert_eq!(&hex[0..2], "00");
    }

    #[test]
    fn empty_branches_root_is_coinbase_hash() {
        let coinb1 = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff00";
        let coinb2 = "ffffffff0100000000000000000000000000000000ac00000000";
        let enonce1 = Extranonce::from_bytes(&[]);
        let enonce2 = Extranonce::from_bytes(&[]);

        let root = merkle_root(coinb1, coinb2, &enonce1, &enonce2, &[]).unwrap();

        let coinbase_bytes = Vec::from_hex(&format!("{coinb1}{coinb2}")).unwrap();
        let expected = sha256d::Hash::hash(&coinbase_bytes);
        assert_eq!(root.to_raw_hash(), expected);
    }

    #[test]
    fn single_branch_combines_once() {
        let coinb1 = "01";
        let coinb2 = "02";
        let enonce1 = Extranonce::from_bytes(&[]);
        let enonce2 = Extranonce::from_bytes(&[]);
        let branch = MerkleNode::from_byte_array([7u8; 32]);

        let root = merkle_root(coinb1, coinb2, &enonce1, &enonce2, &[branch]).unwrap();

        let coinbase_hash = sha256d::Hash::hash(&Vec::from_hex("0102").unwrap()).to_byte_array();
        let mut buf = Vec::new();
        buf.extend_from_slice(&coinbase_hash);
        buf.extend_from_slice(&[7u8; 32]);
        let expected = sha256d::Hash::hash(&buf);

        assert_eq!(root.to_raw_hash(), expected);
    }

    #[test]
    fn branches_empty_for_no_other_transactions() {
        assert!(merkle_branches(Vec::new()).is_empty());
    }

    #[test]
    fn branches_single_transaction() {
        let txid: Txid = "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e0000000"
            .parse()
            .unwrap();
        let branches = merkle_branches(vec![txid]);
        assert_eq!(branches.len(), 1);
        assert_eq!(
            branches[0].as_byte_array(),
            txid.as_raw_hash().as_byte_array()
        );
    }

    #[test]
    fn branches_two_transactions() {
        let a: Txid = "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e0000000"
            .parse()
            .unwrap();
        let b: Txid = "5e16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e0000000"
            .parse()
            .unwrap();
        let branches = merkle_branches(vec![a, b]);
        assert_eq!(branches.len(), 2);
    }
}
