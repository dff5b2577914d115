use {super::*, snafu::Snafu};

/// Typed errors distinguishing how a failure should be handled, as opposed to the
/// catch-all [`anyhow::Error`] used at boundaries (settings loading, `main`) that never
/// need to match on a variant.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum PoolError {
    /// I/O failure on a session's socket. Logged, the connection is dropped, the pool
    /// keeps serving other sessions.
    #[snafu(display("transport error: {message}"))]
    Transport { message: String },

    /// A miner sent something the Stratum session state machine rejects. Answered with
    /// a JSON-RPC error reply, the connection stays open.
    #[snafu(display("protocol violation: {message}"))]
    Protocol { message: String },

    /// A share or request failed a validation check (bad nonce2 length, stale job,
    /// above target). Answered with a JSON-RPC error reply or `mining.submit` rejection.
    #[snafu(display("validation failed: {message}"))]
    Validation { message: String },

    /// The Bitcoin node RPC or ZMQ collaborator failed. Logged, retried on the next
    /// poll tick or notification; never propagates as a crash.
    #[snafu(display("bitcoin node rpc error: {message}"))]
    NodeRpc { message: String },

    /// Unrecoverable startup failure (bad settings, can't bind the listener). Aborts
    /// the process with a nonzero exit code.
    #[snafu(display("fatal error: {message}"))]
    Fatal { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_message() {
        let err = PoolError::Validation {
            message: "share above target".into(),
        };
        assert_eq!(err.to_string(), "validation failed: share above target");
    }
}
