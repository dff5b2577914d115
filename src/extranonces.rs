use super::*;

#[derive(Debug)]
pub struct PoolExtranonces {
    enonce1_size: usize,
    enonce2_size: usize,
    next: AtomicU64,
}

impl PoolExtranonces {
    pub fn new(enonce1_size: usize, enonce2_size: usize) -> Result<Self> {
        ensure!(
            enonce1_size >= MIN_ENONCE_SIZE,
            "enonce1_size {} below minimum {}",
            enonce1_size,
            MIN_ENONCE_SIZE
        );
        ensure!(
            enonce1_size <= MAX_ENONCE_SIZE,
            "enonce1_size {} exceeds maximum {}",
            enonce1_size,
            MAX_ENONCE_SIZE
        );
        ensure!(
            enonce2_size >= MIN_ENONCE_SIZE,
            "enonce2_size {} below minimum {}",
            enonce2_size,
            MIN_ENONCE_SIZE
        );
        ensure!(
            enonce2_size <= MAX_ENONCE_SIZE,
            "enonce2_size {} exceeds maximum {}",
            enonce2_size,
            MAX_ENONCE_SIZE
        );

        Ok(Self {
            enonce1_size,
            enonce2_size,
            next: AtomicU64::new(0),
        })
    }

    pub(crate) fn enonce1_size(&self) -> usize {
        self.enonce1_size
    }

    pub(crate) fn enonce2_size(&self) -> usize {
        self.enonce2_size
    }

    /// Hands out a fresh, session-unique extranonce1, one per connection for the life of
    /// the process. Wraps silently past 2^(8*enonce1_size); a pool handing out that many
    /// sessions has bigger problems than enonce1 collisions.
    pub(crate) fn next_enonce1(&self) -> Extranonce {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        let mut bytes = id.to_be_bytes().to_vec();
        bytes.drain(..bytes.len() - self.enonce1_size);
        Extranonce::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_rejects_enonce1_below_min() {
        let err = PoolExtranonces::new(1, 4).unwrap_err();
        assert!(err.to_string().contains("enonce1_size 1 below minimum"));
    }

    #[test]
    fn pool_rejects_enonce1_above_max() {
        let err = PoolExtranonces::new(9, 4).unwrap_err();
        assert!(err.to_string().contains("enonce1_size 9 exceeds maximum"));
    }

    #[test]
    fn pool_rejects_enonce2_below_min() {
        let err = PoolExtranonces::new(4, 1).unwrap_err();
        assert!(err.to_string().contains("enonce2_size 1 below minimum"));
    }

    #[test]
    fn pool_rejects_enonce2_above_max() {
        let err = PoolExtranonces::new(4, 9).unwrap_err();
        assert!(err.to_string().contains("enonce2_size 9 exceeds maximum"));
    }

    #[test]
    fn pool_accepts_valid_config() {
        let p = PoolExtranonces::new(4, 8).unwrap();
        assert_eq!(p.enonce1_size(), 4);
        assert_eq!(p.enonce2_size(), 8);
    }

    #[test]
    fn next_enonce1_is_unique_per_call() {
        let p = PoolExtranonces::new(4, 4).unwrap();
        let a = p.next_enonce1();
        let b = p.next_enonce1();
        assert_ne!(a, b);
        assert_eq!(a.len(), 4);
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn next_enonce1_starts_at_zero() {
        let p = PoolExtranonces::new(4, 4).unwrap();
        assert_eq!(p.next_enonce1(), Extranonce::from_bytes(&[0, 0, 0, 0]));
        assert_eq!(p.next_enonce1(), Extranonce::from_bytes(&[0, 0, 0, 1]));
    }

    #[test]
    fn pool_accepts_boundary_values() {
        let p = PoolExtranonces::new(MIN_ENONCE_SIZE, MIN_ENONCE_SIZE).unwrap();
        assert_eq!(p.enonce1_size(), 2);
        assert_eq!(p.enonce2_size(), 2);

        let p = PoolExtranonces::new(MAX_ENONCE_SIZE, MAX_ENONCE_SIZE).unwrap();
        assert_eq!(p.enonce1_size(), 8);
        assert_eq!(p.enonce2_size(), 8);
    }
}
