use super::*;

/// How many jobs a registry keeps addressable at once. Older jobs are evicted in FIFO
/// order regardless of whether the chain tip has moved; `clean_jobs` reported on insert is
/// purely informational (it does not trigger mass eviction).
pub(crate) const JOB_RING_SIZE: usize = 20;

#[derive(Debug)]
pub(crate) struct Jobs<W: Workbase> {
    latest_workbase: Option<Arc<W>>,
    next_id: JobId,
    ring: VecDeque<Arc<Job<W>>>,
    by_id: HashMap<JobId, Arc<Job<W>>>,
    seen: LruCache<BlockHash, ()>,
}

impl<W: Workbase> Jobs<W> {
    pub(crate) fn new() -> Self {
        Self {
            latest_workbase: None,
            next_id: JobId::new(0),
            ring: VecDeque::with_capacity(JOB_RING_SIZE),
            by_id: HashMap::new(),
            seen: LruCache::new(NonZeroUsize::new(LRU_CACHE_SIZE).expect("should be non-zero")),
        }
    }

    pub(crate) fn next_id(&mut self) -> JobId {
        let id = self.next_id;
        self.next_id = self.next_id.next();
        id
    }

    pub(crate) fn get(&self, id: &JobId) -> Option<Arc<Job<W>>> {
        self.by_id.get(id).cloned()
    }

    /// Inserts a job into the ring, evicting the oldest entry once the ring is full.
    /// Returns whether the workbase this job came from differs from the previous insert's,
    /// i.e. whether the caller should set `clean_jobs` on the `mining.notify` it sends.
    pub(crate) fn insert(&mut self, job: Arc<Job<W>>) -> bool {
        let clean = job
            .workbase
            .clean_jobs(self.latest_workbase.as_deref());

        self.latest_workbase = Some(job.workbase.clone());

        if let Some(pos) = self.ring.iter().position(|j| j.job_id == job.job_id) {
            self.ring[pos] = job.clone();
        } else {
            self.ring.push_back(job.clone());

            if self.ring.len() > JOB_RING_SIZE
                && let Some(evicted) = self.ring.pop_front()
            {
                self.by_id.remove(&evicted.job_id);
            }
        }

        self.by_id.insert(job.job_id, job);

        clean
    }

    /// Tracks block hashes already handed to `submitblock`, so a retransmitted share for an
    /// already-submitted block doesn't trigger a second RPC call.
    pub(crate) fn is_duplicate_block(&mut self, block_hash: BlockHash) -> bool {
        self.seen.put(block_hash, ()).is_some()
    }
}
