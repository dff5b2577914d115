use {super::*, dashmap::DashMap};

/// A block a worker found, kept for diagnostics only — payout accounting is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockFound {
    pub(crate) height: u64,
    pub(crate) hash: BlockHash,
    pub(crate) timestamp: u64,
}

/// Per-worker counters, keyed by the full `workername` a miner authorized with.
#[derive(Debug)]
pub(crate) struct WorkerStats {
    workername: String,
    payout_address: Address<NetworkUnchecked>,
    accepted: AtomicU64,
    rejected: AtomicU64,
    last_share_time: Mutex<Option<Instant>>,
    best_share: Mutex<Option<Difficulty>>,
    blocks_found: Mutex<Vec<BlockFound>>,
}

impl WorkerStats {
    fn new(workername: String, payout_address: Address<NetworkUnchecked>) -> Self {
        Self {
            workername,
            payout_address,
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            last_share_time: Mutex::new(None),
            best_share: Mutex::new(None),
            blocks_found: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn workername(&self) -> &str {
        &self.workername
    }

    pub(crate) fn payout_address(&self) -> &Address<NetworkUnchecked> {
        &self.payout_address
    }

    pub(crate) fn record_accepted(&self, share_diff: Difficulty) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        *self.last_share_time.lock() = Some(Instant::now());

        let mut best = self.best_share.lock();
        if best.is_none_or(|b| share_diff > b) {
            *best = Some(share_diff);
        }
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_block(&self, found: BlockFound) {
        self.blocks_found.lock().push(found);
    }

    pub(crate) fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub(crate) fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub(crate) fn last_share_time(&self) -> Option<Instant> {
        *self.last_share_time.lock()
    }

    pub(crate) fn best_share(&self) -> Option<Difficulty> {
        *self.best_share.lock()
    }

    pub(crate) fn blocks_found(&self) -> Vec<BlockFound> {
        self.blocks_found.lock().clone()
    }
}

/// Pool-wide registry of worker stats plus coarse operational counters, reported on the
/// status line and available for diagnostics. Not used for payout accounting.
pub struct Metatron {
    blocks: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    started: Instant,
    connections: AtomicU64,
    workers: DashMap<String, Arc<WorkerStats>>,
}

impl Metatron {
    pub fn new() -> Self {
        Self {
            blocks: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            started: Instant::now(),
            connections: AtomicU64::new(0),
            workers: DashMap::new(),
        }
    }

    pub(crate) fn get_or_create_worker(
        &self,
        workername: &str,
        payout_address: Address<NetworkUnchecked>,
    ) -> Arc<WorkerStats> {
        self.workers
            .entry(workername.to_string())
            .or_insert_with(|| Arc::new(WorkerStats::new(workername.to_string(), payout_address)))
            .clone()
    }

    pub(crate) fn record_accepted(&self, workername: &str, share_diff: Difficulty) {
        if let Some(worker) = self.workers.get(workername) {
            worker.record_accepted(share_diff);
        }
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self, workername: &str) {
        if let Some(worker) = self.workers.get(workername) {
            worker.record_rejected();
        }
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_block(&self, workername: &str, found: BlockFound) {
        if let Some(worker) = self.workers.get(workername) {
            worker.record_block(found);
        }
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn sub_connection(&self) {
        self.connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn total_blocks(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub(crate) fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub(crate) fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub(crate) fn total_connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    pub(crate) fn total_workers(&self) -> usize {
        self.workers.len()
    }

    pub(crate) fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn get_worker(&self, workername: &str) -> Option<Arc<WorkerStats>> {
        self.workers.get(workername).map(|r| r.value().clone())
    }

    pub(crate) fn workers(&self) -> Vec<Arc<WorkerStats>> {
        self.workers.iter().map(|r| r.value().clone()).collect()
    }
}

impl Default for Metatron {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLine for Metatron {
    fn status_line(&self) -> String {
        format!(
            "workers={}  conns={}  accepted={}  rejected={}  blocks={}  uptime={}s",
            self.total_workers(),
            self.total_connections(),
            self.accepted(),
            self.rejected(),
            self.total_blocks(),
            self.uptime().as_secs()
        )
    }
}
