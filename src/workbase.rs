use super::*;

pub(crate) trait Workbase: Clone + Send + Sync + 'static {
    fn merkle_branches(&self) -> &[MerkleNode];
    fn prevhash(&self) -> PrevHash;
    fn version(&self) -> Version;
    fn nbits(&self) -> Nbits;
    fn ntime(&self) -> Ntime;
    fn height(&self) -> Option<u64>;

    fn create_job(
        self: &Arc<Self>,
        enonce1: &Extranonce,
        enonce2_size: usize,
        address: Option<&Address>,
        job_id: JobId,
        version_mask: Option<Version>,
    ) -> Result<Job<Self>>
    where
        Self: Sized;

    fn clean_jobs(&self, prev: Option<&Self>) -> bool;

    fn build_block(&self, job: &Job<Self>, submit: &Submit, header: Header) -> Result<Block>
    where
        Self: Sized;
}

impl Workbase for BlockTemplate {
    fn merkle_branches(&self) -> &[MerkleNode] {
        &self.merkle_branches
    }

    fn prevhash(&self) -> PrevHash {
        self.previous_block_hash.into()
    }

    fn version(&self) -> Version {
        self.version
    }

    fn nbits(&self) -> Nbits {
        self.bits
    }

    fn ntime(&self) -> Ntime {
        self.current_time
    }

    fn height(&self) -> Option<u64> {
        Some(self.height)
    }

    fn create_job(
        self: &Arc<Self>,
        enonce1: &Extranonce,
        enonce2_size: usize,
        address: Option<&Address>,
        job_id: JobId,
        version_mask: Option<Version>,
    ) -> Result<Job<Self>> {
        let address = address.ok_or_else(|| anyhow!("pool mode requires address"))?;

        let (_coinbase_tx, coinb1, coinb2) = CoinbaseBuilder::new(
            address.clone(),
            enonce1.clone(),
            enonce2_size,
            self.height,
            self.coinbase_value,
            self.pool_sig.clone(),
        )
        .build()
        .context("failed to build coinbase")?;

        Ok(Job {
            job_id,
            coinb1,
            coinb2,
            enonce1: enonce1.clone(),
            version_mask,
            workbase: self.clone(),
        })
    }

    fn clean_jobs(&self, prev: Option<&Self>) -> bool {
        prev.map(|prev| prev.height != self.height).unwrap_or(true)
    }

    fn build_block(&self, job: &Job<Self>, submit: &Submit, header: Header) -> Result<Block> {
        let coinbase_bin = hex::decode(format!(
            "{}{}{}{}",
            job.coinb1, job.enonce1, submit.extranonce2, job.coinb2,
        ))
        .context("failed to decode coinbase hex")?;

        let mut cursor = bitcoin::io::Cursor::new(&coinbase_bin);
        let coinbase_tx = Transaction::consensus_decode_from_finite_reader(&mut cursor)
            .context("failed to decode coinbase transaction")?;

        let txdata = std::iter::once(coinbase_tx)
            .chain(self.transactions.iter().map(|tx| tx.transaction.clone()))
            .collect();

        let block = Block { header, txdata };

        if self.height > 16 {
            ensure!(
                block.bip34_block_height().is_ok(),
                "block has invalid BIP34 height encoding"
            );
        }

        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address() -> Address {
        "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"
            .parse::<Address<NetworkUnchecked>>()
            .unwrap()
            .assume_checked()
    }

    fn template(height: u64) -> Arc<BlockTemplate> {
        Arc::new(
            BlockTemplate {
                bits: "1d00ffff".parse().unwrap(),
                previous_block_hash: BlockHash::from_byte_array([0u8; 32]),
                current_time: Ntime::from(1_700_000_000),
                height,
                version: Version::from(0x2000_0000),
                transactions: Vec::new(),
                coinbase_value: Amount::from_sat(625_000_000),
                pool_sig: String::new(),
                merkle_branches: Vec::new(),
            }
            .finalize("Kazumyon Mining Pool".into()),
        )
    }

    #[test]
    fn create_job_requires_address() {
        let template = template(800_000);
        let result = template.create_job(
            &Extranonce::from_bytes(&[0; 4]),
            4,
            None,
            "1".parse().unwrap(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn create_job_succeeds_with_address() {
        let template = template(800_000);
        let job = template
            .create_job(
                &Extranonce::from_bytes(&[0xde, 0xad, 0xbe, 0xef]),
                4,
                Some(&test_address()),
                "1".parse().unwrap(),
                None,
            )
            .unwrap();
        assert_eq!(job.prevhash(), template.prevhash());
    }

    #[test]
    fn clean_jobs_true_on_height_change() {
        let a = template(800_000);
        let b = template(800_001);
        assert!(b.clean_jobs(Some(&a)));
        assert!(!a.clean_jobs(Some(&a)));
        assert!(a.clean_jobs(None));
    }
}
