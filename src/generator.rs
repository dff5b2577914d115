use {super::*, zmq::Zmq};

/// Polls `getblocktemplate` on a fixed interval and refetches immediately whenever
/// bitcoind announces a new tip over ZMQ, fanning the latest [`BlockTemplate`] out to
/// every connected session through a watch channel.
pub(crate) async fn spawn(
    settings: Arc<Settings>,
    cancel_token: CancellationToken,
    tasks: &mut JoinSet<()>,
) -> Result<watch::Receiver<Arc<BlockTemplate>>> {
    let client = settings.bitcoin_rpc_client().await?;

    let initial = fetch_template(&client, &settings).await?;

    let (sender, receiver) = watch::channel(Arc::new(initial));

    tasks.spawn(async move {
        let mut zmq = match Zmq::connect(&settings).await {
            Ok(zmq) => Some(zmq),
            Err(err) => {
                warn!("zmq hashblock subscription unavailable, polling only: {err}");
                None
            }
        };

        let mut poll = tokio::time::interval(settings.rpc_poll_interval());
        poll.tick().await;

        loop {
            tokio::select! {
                _ = poll.tick() => {}
                hash = recv_or_pending(&mut zmq) => {
                    match hash {
                        Ok(hash) => info!("new block {hash} announced over zmq, refetching template"),
                        Err(err) => {
                            warn!("zmq hashblock subscription failed, disabling it: {err}");
                            zmq = None;
                            continue;
                        }
                    }
                }
                _ = cancel_token.cancelled() => break,
            }

            match fetch_template(&client, &settings).await {
                Ok(template) => {
                    sender.send_replace(Arc::new(template));
                }
                Err(err) => warn!("failed to fetch block template: {err}"),
            }
        }

        info!("shutting down template generator");
    });

    Ok(receiver)
}

async fn recv_or_pending(zmq: &mut Option<Zmq>) -> Result<BlockHash> {
    match zmq {
        Some(zmq) => zmq.recv_blockhash().await,
        None => std::future::pending().await,
    }
}

async fn fetch_template(client: &Client, settings: &Settings) -> Result<BlockTemplate> {
    info!("fetching new block template");

    let mut rules = vec!["segwit"];
    if settings.chain().network() == Network::Signet {
        rules.push("signet");
    }

    let params = json!({
        "capabilities": ["coinbasetxn", "workid", "coinbase/append"],
        "rules": rules,
    });

    let template: BlockTemplate = client
        .call("getblocktemplate", &[params])
        .await
        .context("getblocktemplate rpc call failed")?;

    Ok(template.finalize(settings.pool_signature().to_string()))
}
