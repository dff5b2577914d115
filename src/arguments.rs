use {
    super::*,
    clap::builder::styling::{AnsiColor, Effects, Styles},
};

#[derive(Debug, Parser)]
#[command(
  version,
  styles = Styles::styled()
    .error(AnsiColor::Red.on_default() | Effects::BOLD)
    .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .invalid(AnsiColor::Red.on_default())
    .literal(AnsiColor::Blue.on_default())
    .placeholder(AnsiColor::Cyan.on_default())
    .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .valid(AnsiColor::Green.on_default()),
)]
pub(crate) struct Arguments {
    #[command(flatten)]
    pub(crate) options: Options,
}

impl Arguments {
    pub(crate) fn run(self) -> Result {
        Runtime::new()
            .context("failed to start async runtime")?
            .block_on(self.run_async())
    }

    async fn run_async(self) -> Result {
        let settings = Arc::new(Settings::load(self.options).context("failed to load settings")?);

        let cancel_token = CancellationToken::new();

        let shutdown = cancel_token.clone();
        tokio::spawn(async move {
            let _ = ctrl_c().await;
            info!("received shutdown signal");
            shutdown.cancel();
        });

        let mut tasks = JoinSet::new();

        let workbase_rx = generator::spawn(settings.clone(), cancel_token.clone(), &mut tasks)
            .await
            .context("failed to start template generator")?;

        let extranonces = PoolExtranonces::new(settings.enonce1_size(), settings.enonce2_size())
            .context("invalid extranonce configuration")?;

        let metatron = Arc::new(Metatron::new());

        let address = settings.address();
        let port = settings.port();

        let listener = TcpListener::bind((address, port))
            .await
            .with_context(|| format!("failed to bind to {address}:{port}"))?;

        info!("stratum server listening on {address}:{port}");

        let extranonces = Arc::new(extranonces);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, addr) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            warn!("failed to accept connection: {err}");
                            continue;
                        }
                    };

                    if let Some(max_connections) = settings.max_connections() {
                        if metatron.total_connections() as usize >= max_connections {
                            debug!("refusing {addr}: at max_connections ({max_connections})");
                            continue;
                        }
                    }

                    info!("spawning stratifier task for {addr}");

                    let workbase_rx = workbase_rx.clone();
                    let settings = settings.clone();
                    let metatron = metatron.clone();
                    let extranonces = extranonces.clone();
                    let conn_cancel_token = cancel_token.child_token();

                    tasks.spawn(async move {
                        let mut stratifier: Stratifier<BlockTemplate> = Stratifier::new(
                            addr,
                            settings,
                            metatron,
                            extranonces,
                            stream,
                            workbase_rx,
                            conn_cancel_token,
                        );

                        if let Err(err) = stratifier.serve().await {
                            error!("stratifier error for {addr}: {err}");
                        }
                    });
                }
                _ = cancel_token.cancelled() => {
                    info!("shutting down stratum server");
                    break;
                }
            }
        }

        info!("waiting for {} tasks to complete...", tasks.len());
        while tasks.join_next().await.is_some() {}
        info!("all pool tasks stopped");

        Ok(())
    }
}
