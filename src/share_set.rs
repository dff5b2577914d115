use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ShareKey {
    workername: String,
    job_id: JobId,
    extranonce2: Extranonce,
    ntime: Ntime,
    nonce: Nonce,
}

/// Tracks submitted `(worker, job_id, extranonce2, ntime, nonce)` tuples to reject exact
/// resubmissions of a share already accepted or rejected. Swept opportunistically on every
/// insert: entries more than `MAX_NTIME_OFFSET` behind the newest ntime seen are dropped,
/// since a share that stale would already fail the time-window check in the validator.
#[derive(Debug, Default)]
pub(crate) struct SubmittedShareSet {
    seen: HashSet<ShareKey>,
    newest_ntime: u32,
}

impl SubmittedShareSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this exact share was already submitted, inserting it otherwise.
    pub(crate) fn is_duplicate(
        &mut self,
        workername: &str,
        job_id: JobId,
        extranonce2: &Extranonce,
        ntime: Ntime,
        nonce: Nonce,
    ) -> bool {
        self.sweep(ntime);

        !self.seen.insert(ShareKey {
            workername: workername.to_string(),
            job_id,
            extranonce2: extranonce2.clone(),
            ntime,
            nonce,
        })
    }

    fn sweep(&mut self, ntime: Ntime) {
        let ntime = u32::from(ntime);
        self.newest_ntime = self.newest_ntime.max(ntime);
        let cutoff = self.newest_ntime.saturating_sub(MAX_NTIME_OFFSET);
        self.seen.retain(|key| u32::from(key.ntime) >= cutoff);
    }
}
