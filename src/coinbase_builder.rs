use super::*;

/// Builds a solo-pool coinbase transaction the ckpool-solo way: a single payout output (no
/// SegWit witness-commitment output), with the scriptSig carrying the BIP34 height, a pool
/// signature on each side of the extranonce1||extranonce2 splice point, and the creation
/// timestamp. Returns the assembled transaction alongside the `coinb1`/`coinb2` hex halves a
/// job notifies to miners, who reassemble `coinb1 || enonce1 || enonce2 || coinb2` themselves.
#[derive(Clone)]
pub struct CoinbaseBuilder {
    address: Address,
    extranonce1: Extranonce,
    extranonce2_size: usize,
    height: u64,
    pool_sig: String,
    timestamp: Option<u64>,
    value: Amount,
}

impl CoinbaseBuilder {
    pub fn new(
        address: Address,
        extranonce1: Extranonce,
        extranonce2_size: usize,
        height: u64,
        value: Amount,
        pool_sig: String,
    ) -> Self {
        Self {
            address,
            extranonce1,
            extranonce2_size,
            height,
            pool_sig,
            value,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> Result<(Transaction, String, String)> {
        let now = self.timestamp.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs()
        });

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos() as u64;

        let pool_sig_bytes = self.pool_sig.as_bytes();
        ensure!(
            pool_sig_bytes.len() <= u8::MAX as usize,
            "pool signature too long: {} bytes",
            pool_sig_bytes.len()
        );

        let mut prefix = ser_number(self.height);
        prefix.push(pool_sig_bytes.len() as u8);
        prefix.extend_from_slice(pool_sig_bytes);
        prefix.extend_from_slice(&ser_number(now));
        prefix.extend_from_slice(&ser_number(nanos));

        let marker_size = (self.extranonce1.len() + self.extranonce2_size) as u8;
        prefix.push(marker_size);

        let mut suffix = vec![pool_sig_bytes.len() as u8];
        suffix.extend_from_slice(pool_sig_bytes);

        let script_sig_len = prefix.len()
            + self.extranonce1.len()
            + self.extranonce2_size
            + suffix.len();

        let script_pubkey = self.address.script_pubkey();

        let mut coinb1 = Vec::new();
        coinb1.extend_from_slice(&1u32.to_le_bytes()); // version
        coinb1.extend_from_slice(&varint_encode(1)); // input count
        coinb1.extend_from_slice(&[0u8; 32]); // null prevout txid
        coinb1.extend_from_slice(&0xffff_ffffu32.to_le_bytes()); // null prevout index
        coinb1.extend_from_slice(&varint_encode(script_sig_len as u64));
        coinb1.extend_from_slice(&prefix);

        let mut coinb2 = Vec::new();
        coinb2.extend_from_slice(&suffix);
        coinb2.extend_from_slice(&0xffff_ffffu32.to_le_bytes()); // sequence
        coinb2.extend_from_slice(&varint_encode(1)); // output count
        coinb2.extend_from_slice(&self.value.to_sat().to_le_bytes());
        coinb2.extend_from_slice(&varint_encode(script_pubkey.len() as u64));
        coinb2.extend_from_slice(script_pubkey.as_bytes());
        coinb2.extend_from_slice(&0u32.to_le_bytes()); // locktime

        let mut script_sig = prefix;
        script_sig.extend_from_slice(self.extranonce1.as_bytes());
        script_sig.extend(std::iter::repeat_n(0u8, self.extranonce2_size));
        script_sig.extend_from_slice(&suffix);

        let transaction = Transaction {
            version: transaction::Version(1),
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::from_bytes(script_sig),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: self.value,
                script_pubkey,
            }],
        };

        Ok((transaction, hex::encode(coinb1), hex::encode(coinb2)))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq as pretty_assert_eq};

    fn test_address() -> Address {
        "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"
            .parse::<Address<NetworkUnchecked>>()
            .unwrap()
            .assume_checked()
    }

    fn builder() -> CoinbaseBuilder {
        CoinbaseBuilder::new(
            test_address(),
            Extranonce::from_bytes(&[0xde, 0xad, 0xbe, 0xef]),
            4,
            800_000,
            Amount::from_sat(625_000_000),
            "Kazumyon Mining Pool".into(),
        )
        .with_timestamp(1_700_000_000)
    }

    #[test]
    fn single_output_only() {
        let (tx, _, _) = builder().build().unwrap();
        assert_eq!(tx.output.len(), 1);
    }

    #[test]
    fn coinb1_ends_before_extranonce() {
        let (_, coinb1, _) = builder().build().unwrap();
        let bytes = hex::decode(coinb1).unwrap();
        // version(4) + incount(1) + prevout(36) + scriptsig-len-varint(1) + ser_number(height)
        assert!(bytes.len() > 4 + 1 + 36 + 1);
        assert!(!bytes.ends_with(&[0xde, 0xad, 0xbe, 0xef]));
    }

    #[test]
    fn coinb2_contains_output_and_locktime() {
        let (_, _, coinb2) = builder().build().unwrap();
        let bytes = hex::decode(coinb2).unwrap();
        pretty_assert_eq!(&bytes[bytes.len() - 4..], &[0u8; 4]);
    }

    #[test]
    fn script_sig_length_under_max() {
        let (tx, _, _) = builder().build().unwrap();
        assert!(tx.input[0].script_sig.len() <= 100);
    }

    #[test]
    fn pool_sig_appears_on_both_sides() {
        let (_, coinb1, coinb2) = builder().build().unwrap();
        let coinb1_bytes = hex::decode(coinb1).unwrap();
        let coinb2_bytes = hex::decode(coinb2).unwrap();
        let needle = b"Kazumyon Mining Pool";
        assert!(coinb1_bytes.windows(needle.len()).any(|w| w == needle));
        assert!(coinb2_bytes.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn rejects_oversized_pool_signature() {
        let builder = CoinbaseBuilder::new(
            test_address(),
            Extranonce::from_bytes(&[0; 4]),
            4,
            1,
            Amount::from_sat(1),
            "x".repeat(300),
        );
        assert!(builder.build().is_err());
    }

    #[test]
    fn height_encoding_changes_coinb1() {
        let (_, low, _) = builder().build().unwrap();
        let mut high_builder = builder();
        high_builder.height = 900_000;
        let (_, high, _) = high_builder.build().unwrap();
        assert_ne!(low, high);
    }
}
