use super::*;

#[derive(Clone, Debug, Parser)]
pub struct Options {
    #[arg(
        long,
        default_value = "0.0.0.0",
        help = "Listen for stratum messages at <ADDRESS>."
    )]
    pub(crate) address: String,

    #[arg(
        long,
        default_value_t = 42069,
        help = "Listen for stratum messages on port <PORT>."
    )]
    pub(crate) port: u16,

    #[arg(long, help = "Run on <CHAIN>.")]
    pub(crate) chain: Option<Chain>,

    #[arg(long, help = "Load Bitcoin Core data dir from <BITCOIN_DATA_DIR>.")]
    pub(crate) bitcoin_data_dir: Option<PathBuf>,

    #[arg(long, help = "Connect to Bitcoin Core RPC at <BITCOIN_RPC_PORT>.")]
    pub(crate) bitcoin_rpc_port: Option<u16>,

    #[arg(long, help = "Load Bitcoin Core RPC cookie file from <COOKIE_FILE>.")]
    pub(crate) bitcoin_rpc_cookie_file: Option<PathBuf>,

    #[arg(
        long,
        help = "Authenticate to Bitcoin Core RPC as <BITCOIN_RPC_USERNAME>."
    )]
    pub(crate) bitcoin_rpc_username: Option<String>,

    #[arg(
        long,
        help = "Authenticate to Bitcoin Core RPC with <BITCOIN_RPC_PASSWORD>."
    )]
    pub(crate) bitcoin_rpc_password: Option<String>,

    #[arg(long, default_value_t, help = "Give <START_DIFF> to new clients.")]
    pub(crate) start_diff: Difficulty,

    #[arg(long, help = "Reject `mining.suggest_difficulty` requests below <MIN_DIFF>.")]
    pub(crate) min_diff: Option<Difficulty>,

    #[arg(long, help = "Reject `mining.suggest_difficulty` requests above <MAX_DIFF>.")]
    pub(crate) max_diff: Option<Difficulty>,

    #[arg(long, alias = "datadir", help = "Store data in <DATA_DIR>.")]
    pub(crate) data_dir: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = 10,
        help = "Poll `getblocktemplate` every <RPC_POLL_INTERVAL> seconds."
    )]
    pub(crate) rpc_poll_interval: u64,

    #[arg(
        long,
        default_value = "1fffe000",
        help = "Advertise <VERSION_MASK> for `mining.configure` version rolling."
    )]
    pub(crate) version_mask: Version,

    #[arg(
        long,
        default_value = "tcp://127.0.0.1:28332",
        help = "Subscribe to `hashblock` notifications at <ZMQ_BLOCK_NOTIFICATIONS>."
    )]
    pub(crate) zmq_block_notifications: String,

    #[arg(long, default_value_t = ENONCE1_SIZE, help = "Use <ENONCE1_SIZE>-byte extranonce1 values.")]
    pub(crate) enonce1_size: usize,

    #[arg(long, default_value_t = MAX_ENONCE_SIZE, help = "Require <ENONCE2_SIZE>-byte extranonce2 values.")]
    pub(crate) enonce2_size: usize,

    #[arg(
        long,
        default_value = "Kazumyon Mining Pool",
        help = "Stamp <POOL_SIGNATURE> into the coinbase scriptSig."
    )]
    pub(crate) pool_signature: String,

    #[arg(
        long,
        default_value_t = 300,
        help = "Drop a session idle for <IDLE_TIMEOUT_SECS> seconds."
    )]
    pub(crate) idle_timeout_secs: u64,

    #[arg(
        long,
        default_value_t = 60,
        help = "Sweep idle sessions every <REAP_INTERVAL_SECS> seconds."
    )]
    pub(crate) reap_interval_secs: u64,

    #[arg(long, help = "Refuse new connections past <MAX_CONNECTIONS>.")]
    pub(crate) max_connections: Option<usize>,

    #[arg(
        long,
        help = "Honor a worker's one-shot `mining.suggest_difficulty` as its starting difficulty."
    )]
    pub(crate) accept_suggested_difficulty: bool,

    #[arg(
        long,
        help = "Accepted but unused; reserved for a future persistence layer."
    )]
    pub(crate) database_path: Option<PathBuf>,
}
