use super::*;

#[derive(Clone, Debug)]
pub struct Settings {
    address: String,
    port: u16,
    bitcoin_data_dir: Option<PathBuf>,
    bitcoin_rpc_port: u16,
    bitcoin_rpc_cookie_file: Option<PathBuf>,
    bitcoin_rpc_username: Option<String>,
    bitcoin_rpc_password: Option<String>,
    chain: Chain,
    data_dir: Option<PathBuf>,
    rpc_poll_interval: Duration,
    version_mask: Version,
    start_diff: Difficulty,
    min_diff: Option<Difficulty>,
    max_diff: Option<Difficulty>,
    zmq_block_notifications: String,
    enonce1_size: usize,
    enonce2_size: usize,
    enonce1_extension_size: usize,
    pool_signature: String,
    idle_timeout: Duration,
    reap_interval: Duration,
    max_connections: Option<usize>,
    accept_suggested_difficulty: bool,
}

impl Settings {
    pub fn load(options: Options) -> Result<Self> {
        let chain = options.chain.unwrap_or_default();

        let bitcoin_rpc_port = options
            .bitcoin_rpc_port
            .unwrap_or_else(|| chain.default_rpc_port());

        let settings = Self {
            address: options.address,
            port: options.port,
            bitcoin_data_dir: options.bitcoin_data_dir,
            bitcoin_rpc_port,
            bitcoin_rpc_cookie_file: options.bitcoin_rpc_cookie_file,
            bitcoin_rpc_username: options.bitcoin_rpc_username,
            bitcoin_rpc_password: options.bitcoin_rpc_password,
            chain,
            data_dir: options.data_dir,
            rpc_poll_interval: Duration::from_secs(options.rpc_poll_interval),
            version_mask: options.version_mask,
            start_diff: options.start_diff,
            min_diff: options.min_diff,
            max_diff: options.max_diff,
            zmq_block_notifications: options.zmq_block_notifications,
            enonce1_size: options.enonce1_size,
            enonce2_size: options.enonce2_size,
            enonce1_extension_size: ENONCE1_SIZE,
            pool_signature: options.pool_signature,
            idle_timeout: Duration::from_secs(options.idle_timeout_secs),
            reap_interval: Duration::from_secs(options.reap_interval_secs),
            max_connections: options.max_connections,
            accept_suggested_difficulty: options.accept_suggested_difficulty,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn bitcoin_rpc_url(&self) -> String {
        format!("127.0.0.1:{}/", self.bitcoin_rpc_port)
    }

    pub(crate) fn bitcoin_credentials(&self) -> Result<Auth> {
        if let (Some(user), Some(pass)) = (&self.bitcoin_rpc_username, &self.bitcoin_rpc_password) {
            Ok(Auth::UserPass(user.clone(), pass.clone()))
        } else {
            Ok(Auth::CookieFile(self.cookie_file()?))
        }
    }

    pub(crate) fn cookie_file(&self) -> Result<PathBuf> {
        if let Some(cookie_file) = &self.bitcoin_rpc_cookie_file {
            return Ok(cookie_file.clone());
        }

        let path = if let Some(bitcoin_data_dir) = &self.bitcoin_data_dir {
            bitcoin_data_dir.clone()
        } else if cfg!(target_os = "linux") {
            dirs::home_dir()
                .ok_or_else(|| anyhow!("failed to get cookie file path: could not get home dir"))?
                .join(".bitcoin")
        } else {
            os_data_dir()
                .ok_or_else(|| anyhow!("failed to get cookie file path: could not get data dir"))?
                .join("Bitcoin")
        };

        let path = self.chain.join_with_data_dir(path);

        Ok(path.join(".cookie"))
    }

    pub(crate) async fn bitcoin_rpc_client(&self) -> Result<Client> {
        let rpc_url = format!("http://{}", self.bitcoin_rpc_url());

        let bitcoin_credentials = self.bitcoin_credentials()?;

        info!("connecting to Bitcoin Core at {rpc_url}");

        let client = Client::new(
            rpc_url.clone(),
            bitcoin_credentials.clone(),
            None,
            None,
            None,
        )
        .map_err(|err| {
            anyhow!(
                "failed to connect to Bitcoin Core RPC at `{rpc_url}` with {} and error: {err}",
                match bitcoin_credentials {
                    Auth::UserPass(_, _) => "username and password".into(),
                    Auth::CookieFile(cookie_file) =>
                        format!("cookie file at {}", cookie_file.display()),
                }
            )
        })?;

        let mut checks = 0;
        let rpc_chain = loop {
            match client.get_blockchain_info().await {
                Ok(blockchain_info) => {
                    break match blockchain_info.chain.to_string().as_str() {
                        "bitcoin" => Chain::Mainnet,
                        "regtest" => Chain::Regtest,
                        "signet" => Chain::Signet,
                        "testnet" => Chain::Testnet,
                        "testnet4" => Chain::Testnet4,
                        other => bail!("bitcoin rpc server on unknown chain: {other}"),
                    };
                }
                Err(bitcoind_async_client::error::ClientError::Server(-28, _)) => {}
                Err(err) => {
                    bail!("failed to connect to Bitcoin Core RPC at `{rpc_url}`: {err}")
                }
            }

            ensure! {
                checks < 100,
                "failed to connect to Bitcoin Core RPC at `{rpc_url}`",
            }

            checks += 1;
            tokio::time::sleep(Duration::from_millis(100)).await;
        };

        ensure! {
            rpc_chain == self.chain,
            "bitcoin rpc server is on {rpc_chain} but kazumyon is configured for {}",
            self.chain,
        };

        Ok(client)
    }

    fn validate(&self) -> Result<()> {
        if let Some(min) = self.min_diff {
            ensure!(
                self.start_diff >= min,
                "start_diff ({}) must be >= min_diff ({})",
                self.start_diff,
                min
            );
        }

        if let Some(max) = self.max_diff {
            ensure!(
                self.start_diff <= max,
                "start_diff ({}) must be <= max_diff ({})",
                self.start_diff,
                max
            );
        }

        if let (Some(min), Some(max)) = (self.min_diff, self.max_diff) {
            ensure!(
                min <= max,
                "min_diff ({}) must be <= max_diff ({})",
                min,
                max
            );
        }

        ensure!(
            self.enonce1_size >= MIN_ENONCE_SIZE,
            "enonce1_size ({}) must be >= {}",
            self.enonce1_size,
            MIN_ENONCE_SIZE
        );

        ensure!(
            self.enonce1_size <= MAX_ENONCE_SIZE,
            "enonce1_size ({}) must be <= {}",
            self.enonce1_size,
            MAX_ENONCE_SIZE
        );

        ensure!(
            self.enonce2_size >= MIN_ENONCE_SIZE,
            "enonce2_size ({}) must be >= {}",
            self.enonce2_size,
            MIN_ENONCE_SIZE
        );

        ensure!(
            self.enonce2_size <= MAX_ENONCE_SIZE,
            "enonce2_size ({}) must be <= {}",
            self.enonce2_size,
            MAX_ENONCE_SIZE
        );

        Ok(())
    }

    pub(crate) fn address(&self) -> &str {
        &self.address
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn chain(&self) -> Chain {
        self.chain
    }

    pub(crate) fn data_dir(&self) -> Option<&PathBuf> {
        self.data_dir.as_ref()
    }

    pub(crate) fn rpc_poll_interval(&self) -> Duration {
        self.rpc_poll_interval
    }

    pub(crate) fn version_mask(&self) -> Version {
        self.version_mask
    }

    pub(crate) fn start_diff(&self) -> Difficulty {
        self.start_diff
    }

    pub(crate) fn min_diff(&self) -> Option<Difficulty> {
        self.min_diff
    }

    pub(crate) fn max_diff(&self) -> Option<Difficulty> {
        self.max_diff
    }

    pub(crate) fn zmq_block_notifications(&self) -> &str {
        &self.zmq_block_notifications
    }

    pub(crate) fn enonce1_size(&self) -> usize {
        self.enonce1_size
    }

    pub(crate) fn enonce2_size(&self) -> usize {
        self.enonce2_size
    }

    pub(crate) fn enonce1_extension_size(&self) -> usize {
        self.enonce1_extension_size
    }

    pub(crate) fn pool_signature(&self) -> &str {
        &self.pool_signature
    }

    pub(crate) fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub(crate) fn reap_interval(&self) -> Duration {
        self.reap_interval
    }

    pub(crate) fn max_connections(&self) -> Option<usize> {
        self.max_connections
    }

    pub(crate) fn accept_suggested_difficulty(&self) -> bool {
        self.accept_suggested_difficulty
    }
}
