use {super::*, state::State};

mod state;

/// Per-connection Stratum V1 session: reads/writes newline-delimited JSON-RPC, tracks the
/// miner's negotiated state, and scores submitted shares against its own job registry.
pub struct Stratifier<W: Workbase> {
    state: State,
    socket_addr: SocketAddr,
    settings: Arc<Settings>,
    metatron: Arc<Metatron>,
    extranonces: Arc<PoolExtranonces>,
    reader: FramedRead<OwnedReadHalf, LinesCodec>,
    writer: FramedWrite<OwnedWriteHalf, LinesCodec>,
    workbase_rx: watch::Receiver<Arc<W>>,
    cancel_token: CancellationToken,
    jobs: Jobs<W>,
    submitted_shares: SubmittedShareSet,
    current_diff: Difficulty,
    last_activity: Instant,
}

impl<W: Workbase> Stratifier<W> {
    pub fn new(
        socket_addr: SocketAddr,
        settings: Arc<Settings>,
        metatron: Arc<Metatron>,
        extranonces: Arc<PoolExtranonces>,
        tcp_stream: TcpStream,
        workbase_rx: watch::Receiver<Arc<W>>,
        cancel_token: CancellationToken,
    ) -> Self {
        let _ = tcp_stream.set_nodelay(true);

        let (reader, writer) = tcp_stream.into_split();

        metatron.add_connection();

        Self {
            state: State::new(),
            socket_addr,
            current_diff: settings.start_diff(),
            settings,
            metatron,
            extranonces,
            reader: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_MESSAGE_SIZE)),
            writer: FramedWrite::new(writer, LinesCodec::new()),
            workbase_rx,
            cancel_token,
            jobs: Jobs::new(),
            submitted_shares: SubmittedShareSet::new(),
            last_activity: Instant::now(),
        }
    }

    pub async fn serve(&mut self) -> Result {
        let mut workbase_rx = self.workbase_rx.clone();
        let cancel_token = self.cancel_token.clone();
        let mut idle_check = tokio::time::interval(self.settings.reap_interval());
        idle_check.tick().await;

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("disconnecting from {}", self.socket_addr);
                    break;
                }
                _ = idle_check.tick() => {
                    let idle_for = self.last_activity.elapsed();
                    if idle_for > self.settings.idle_timeout() {
                        warn!(
                            "dropping {} - idle for {}s",
                            self.socket_addr,
                            idle_for.as_secs()
                        );
                        break;
                    }
                }
                message = self.read_message() => {
                    let Some(message) = message? else {
                        break;
                    };

                    self.last_activity = Instant::now();

                    let Message::Request { id, method, params } = message else {
                        continue;
                    };

                    self.dispatch(id, method, params).await?;
                }
                changed = workbase_rx.changed() => {
                    if changed.is_err() {
                        warn!("template channel closed, disconnecting {}", self.socket_addr);
                        break;
                    }

                    if self.state.is_working() {
                        let workbase = workbase_rx.borrow_and_update().clone();
                        self.send_job_update(workbase).await?;
                    } else {
                        let _ = workbase_rx.borrow_and_update();
                    }
                }
            }
        }

        Ok(())
    }

    async fn dispatch(&mut self, id: Id, method: String, params: Value) -> Result {
        match method.as_str() {
            "mining.configure" => {
                let configure = serde_json::from_value::<Configure>(params)
                    .with_context(|| format!("failed to deserialize {method}"))?;
                self.configure(id, configure).await
            }
            "mining.subscribe" => {
                let subscribe = serde_json::from_value::<Subscribe>(params)
                    .with_context(|| format!("failed to deserialize {method}"))?;
                self.subscribe(id, subscribe).await
            }
            "mining.authorize" => {
                let authorize = serde_json::from_value::<Authorize>(params)
                    .with_context(|| format!("failed to deserialize {method}"))?;
                self.authorize(id, authorize).await
            }
            "mining.submit" => {
                let submit = serde_json::from_value::<Submit>(params)
                    .with_context(|| format!("failed to deserialize {method}"))?;
                self.submit(id, submit).await
            }
            "mining.suggest_difficulty" => {
                let suggest = serde_json::from_value::<SuggestDifficulty>(params)
                    .with_context(|| format!("failed to deserialize {method}"))?;
                self.suggest_difficulty(id, suggest).await
            }
            "mining.get_transactions" => self.get_transactions(id).await,
            "client.get_version" => {
                self.send(Message::Response {
                    id,
                    result: Some(json!(format!(
                        "{}/{}",
                        env!("CARGO_PKG_NAME"),
                        env!("CARGO_PKG_VERSION")
                    ))),
                    error: None,
                    reject_reason: None,
                })
                .await
            }
            other => {
                debug!("unknown method {other} from {}", self.socket_addr);
                self.send_error(id, StratumError::Other(format!("unknown method {other}")))
                    .await
            }
        }
    }

    async fn configure(&mut self, id: Id, configure: Configure) -> Result {
        let version_mask = configure
            .version_rolling_mask
            .map(|requested| requested & self.settings.version_mask())
            .unwrap_or(self.settings.version_mask());

        self.state.configure(version_mask);

        let response = ConfigureResponse {
            version_rolling: configure.version_rolling_mask.is_some(),
            version_rolling_mask: configure
                .version_rolling_mask
                .is_some()
                .then(|| version_mask.to_string()),
        };

        self.send(Message::Response {
            id,
            result: Some(json!(response)),
            error: None,
            reject_reason: None,
        })
        .await
    }

    async fn subscribe(&mut self, id: Id, subscribe: Subscribe) -> Result {
        if !self.state.is_fresh() {
            info!("{} resubscribing", self.socket_addr);
            self.jobs = Jobs::new();
            self.submitted_shares = SubmittedShareSet::new();
        }

        let enonce1 = self.extranonces.next_enonce1();
        let enonce2_size = self.extranonces.enonce2_size();

        let subscriptions = vec![
            (
                "mining.set_difficulty".to_string(),
                SUBSCRIPTION_ID.to_string(),
            ),
            ("mining.notify".to_string(), SUBSCRIPTION_ID.to_string()),
        ];

        let result = SubscribeResult(subscriptions, enonce1.clone(), enonce2_size);

        self.send(Message::Response {
            id,
            result: Some(json!(result)),
            error: None,
            reject_reason: None,
        })
        .await?;

        self.state.subscribe(enonce1, subscribe.user_agent);

        Ok(())
    }

    async fn authorize(&mut self, id: Id, authorize: Authorize) -> Result {
        if !self.state.is_subscribed() {
            self.send_error(id, StratumError::NotSubscribed).await?;
            return Ok(());
        }

        let username = Username::new(authorize.username.clone());

        let address = match username.parse_with_network(self.settings.chain().network()) {
            Ok(address) => address,
            Err(err) => {
                self.send_error(id, StratumError::Other(format!("invalid address: {err}")))
                    .await?;
                return Ok(());
            }
        };

        let enonce1 = self
            .state
            .enonce1()
            .cloned()
            .context("subscribed session missing enonce1")?;

        let workername = username.workername().to_string();

        self.state
            .authorize(address.clone(), workername.clone(), username)
            .map_err(|_| anyhow!("authorize called from unexpected state"))?;

        self.send(Message::Response {
            id,
            result: Some(json!(true)),
            error: None,
            reject_reason: None,
        })
        .await?;

        self.metatron
            .get_or_create_worker(&workername, address.as_unchecked().clone());

        debug!("sending SET_DIFFICULTY to {}", self.socket_addr);

        self.send(Message::Notification {
            method: "mining.set_difficulty".into(),
            params: json!(SetDifficulty(self.current_diff)),
        })
        .await?;

        let workbase = self.workbase_rx.borrow().clone();

        let job = Arc::new(
            workbase
                .create_job(
                    &enonce1,
                    self.extranonces.enonce2_size(),
                    Some(&address),
                    self.jobs.next_id(),
                    self.state.version_mask(),
                )
                .context("failed to create job for new session")?,
        );

        let clean_jobs = self.jobs.insert(job.clone());

        self.send(Message::Notification {
            method: "mining.notify".into(),
            params: json!(job.notify(clean_jobs)),
        })
        .await?;

        Ok(())
    }

    async fn suggest_difficulty(&mut self, id: Id, suggest: SuggestDifficulty) -> Result {
        if !self.settings.accept_suggested_difficulty() {
            return self
                .send(Message::Response {
                    id,
                    result: Some(json!(false)),
                    error: None,
                    reject_reason: None,
                })
                .await;
        }

        let mut difficulty = suggest.0;

        if let Some(min_diff) = self.settings.min_diff()
            && difficulty < min_diff
        {
            difficulty = min_diff;
        }

        if let Some(max_diff) = self.settings.max_diff()
            && difficulty > max_diff
        {
            difficulty = max_diff;
        }

        self.current_diff = difficulty;

        self.send(Message::Notification {
            method: "mining.set_difficulty".into(),
            params: json!(SetDifficulty(self.current_diff)),
        })
        .await
    }

    async fn get_transactions(&mut self, id: Id) -> Result {
        self.send(Message::Response {
            id,
            result: Some(json!(Vec::<String>::new())),
            error: None,
            reject_reason: None,
        })
        .await
    }

    async fn send_job_update(&mut self, workbase: Arc<W>) -> Result {
        let Some(address) = self.state.address().cloned() else {
            return Ok(());
        };
        let Some(enonce1) = self.state.enonce1().cloned() else {
            return Ok(());
        };

        let job = Arc::new(
            workbase
                .create_job(
                    &enonce1,
                    self.extranonces.enonce2_size(),
                    Some(&address),
                    self.jobs.next_id(),
                    self.state.version_mask(),
                )
                .context("failed to create job for template update")?,
        );

        let clean_jobs = self.jobs.insert(job.clone());

        debug!("template changed, notifying {}", self.socket_addr);

        self.send(Message::Notification {
            method: "mining.notify".into(),
            params: json!(job.notify(clean_jobs)),
        })
        .await
    }

    async fn submit(&mut self, id: Id, submit: Submit) -> Result {
        if !self.state.is_working() {
            self.send_error(id, StratumError::Unauthorized).await?;
            return Ok(());
        }

        let workername = self.state.workername().unwrap_or_default().to_string();

        let Some(job) = self.jobs.get(&submit.job_id) else {
            self.send_error(id, StratumError::Stale).await?;
            self.metatron.record_rejected(&workername);
            return Ok(());
        };

        if submit.extranonce2.len() != self.extranonces.enonce2_size() {
            self.send_error(
                id,
                StratumError::Other(format!(
                    "invalid extranonce2 length: got {}, expected {}",
                    submit.extranonce2.len(),
                    self.extranonces.enonce2_size()
                )),
            )
            .await?;
            self.metatron.record_rejected(&workername);
            return Ok(());
        }

        let job_ntime = u32::from(job.ntime());
        let submit_ntime = u32::from(submit.ntime);
        if submit_ntime < job_ntime || submit_ntime > job_ntime + MAX_NTIME_OFFSET {
            self.send_error(
                id,
                StratumError::Other("ntime out of range".to_string()),
            )
            .await?;
            self.metatron.record_rejected(&workername);
            return Ok(());
        }

        if self.submitted_shares.is_duplicate(
            &workername,
            submit.job_id,
            &submit.extranonce2,
            submit.ntime,
            submit.nonce,
        ) {
            self.send_error(id, StratumError::Other("duplicate share".to_string()))
                .await?;
            self.metatron.record_rejected(&workername);
            return Ok(());
        }

        let version = match submit.version_bits {
            Some(version_bits) => match job.version_mask {
                Some(version_mask) => (job.version() & !version_mask) | (version_bits & version_mask),
                None => {
                    self.send_error(
                        id,
                        StratumError::Other("version rolling not negotiated".to_string()),
                    )
                    .await?;
                    self.metatron.record_rejected(&workername);
                    return Ok(());
                }
            },
            None => job.version(),
        };

        let merkle_root = match merkle_root(
            &job.coinb1,
            &job.coinb2,
            &job.enonce1,
            &submit.extranonce2,
            job.merkle_branches(),
        ) {
            Ok(root) => root,
            Err(err) => {
                self.send_error(id, StratumError::Other(format!("invalid job: {err}")))
                    .await?;
                self.metatron.record_rejected(&workername);
                return Ok(());
            }
        };

        let nbits = job.nbits();

        let hash = codec::share_hash(
            version,
            job.prevhash(),
            merkle_root,
            submit.ntime,
            nbits,
            submit.nonce,
        );

        let share_diff = Difficulty::from(hash);

        if share_diff >= Difficulty::from(nbits) {
            self.try_submit_block(&job, &submit, version, merkle_root, nbits, hash)
                .await;
        }

        if share_diff < self.current_diff {
            self.send_error(id, StratumError::AboveTarget).await?;
            self.metatron.record_rejected(&workername);
            return Ok(());
        }

        self.send(Message::Response {
            id,
            result: Some(json!(true)),
            error: None,
            reject_reason: None,
        })
        .await?;

        self.metatron.record_accepted(&workername, share_diff);

        debug!(
            "share accepted from {} | diff={} share_diff={}",
            self.socket_addr, self.current_diff, share_diff
        );

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn try_submit_block(
        &mut self,
        job: &Arc<Job<W>>,
        submit: &Submit,
        version: Version,
        merkle_root: MerkleNode,
        nbits: Nbits,
        hash: BlockHash,
    ) {
        if self.jobs.is_duplicate_block(hash) {
            return;
        }

        let header = Header {
            version: version.0,
            prev_blockhash: job.prevhash().into(),
            merkle_root: TxMerkleNode::from_byte_array(*merkle_root.as_byte_array()),
            time: submit.ntime.into(),
            bits: nbits.to_compact(),
            nonce: submit.nonce.into(),
        };

        let block = match job.workbase.build_block(job, submit, header) {
            Ok(block) => block,
            Err(err) => {
                warn!("failed to build block for submitted share: {err}");
                return;
            }
        };

        info!(
            "share from {} meets network difficulty, submitting block {}",
            self.socket_addr,
            block.block_hash()
        );

        let client = match self.settings.bitcoin_rpc_client().await {
            Ok(client) => client,
            Err(err) => {
                error!("failed to connect to bitcoind to submit block: {err}");
                return;
            }
        };

        match client.submit_block(&block).await {
            Ok(_) => {
                let height = job.workbase.height().unwrap_or_default();
                info!("successfully submitted block {} at height {height}", block.block_hash());

                self.metatron.record_block(
                    self.state.workername().unwrap_or_default(),
                    BlockFound {
                        height,
                        hash: block.block_hash(),
                        timestamp: SystemTime::now()
                            .duration_since(UNIX_EPOCH)
                            .map(|d| d.as_secs())
                            .unwrap_or_default(),
                    },
                );
            }
            Err(err) => error!("submitblock rpc failed for {}: {err}", block.block_hash()),
        }
    }

    async fn read_message(&mut self) -> Result<Option<Message>> {
        match self.reader.next().await {
            Some(Ok(line)) => {
                let message = serde_json::from_str::<Message>(&line).map_err(|err| {
                    anyhow!(
                        "invalid stratum message from {}: {err}; line={line:?}",
                        self.socket_addr
                    )
                })?;
                Ok(Some(message))
            }
            Some(Err(err)) => Err(anyhow!("read error from {}: {err}", self.socket_addr)),
            None => {
                info!("{} disconnected", self.socket_addr);
                Ok(None)
            }
        }
    }

    async fn send(&mut self, message: Message) -> Result {
        let frame = serde_json::to_string(&message)?;
        self.writer.send(frame).await?;
        Ok(())
    }

    async fn send_error(&mut self, id: Id, error: StratumError) -> Result {
        self.send(Message::Response {
            id,
            result: Some(json!(false)),
            error: Some(error.into_response()),
            reject_reason: None,
        })
        .await
    }
}

impl<W: Workbase> Drop for Stratifier<W> {
    fn drop(&mut self) {
        self.metatron.sub_connection();

        info!(
            "shutting down stratifier for {} (remaining: {})",
            self.socket_addr,
            self.metatron.total_connections()
        );
    }
}
