use {
    bitcoin::{BlockHash, block::Header},
    kazumyon::{BlockTemplate, Metatron, Options, PoolExtranonces, Settings, Stratifier},
    serde_json::{Value, json},
    stratum::{Difficulty, Extranonce, Id, JobId, Message, Nonce, Notify, Ntime, SubscribeResult},
    tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::{TcpListener, TcpStream},
        sync::watch,
    },
    tokio_util::sync::CancellationToken,
};

const WORKER: &str = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq.worker1";

fn template() -> BlockTemplate {
    BlockTemplate {
        bits: "1d00ffff".parse().unwrap(),
        previous_block_hash: BlockHash::from_byte_array([0u8; 32]),
        current_time: Ntime::from(1_700_000_000),
        height: 800_000,
        version: stratum::Version::from(0x2000_0000u32),
        transactions: Vec::new(),
        coinbase_value: bitcoin::Amount::from_sat(625_000_000),
        pool_sig: "kazumyon-test".to_string(),
        merkle_branches: stratum::merkle_branches(Vec::new()),
    }
}

fn options(start_diff: &str) -> Options {
    use clap::Parser;
    Options::parse_from([
        "kazumyon",
        "--start-diff",
        start_diff,
        "--enonce1-size",
        "4",
        "--enonce2-size",
        "4",
    ])
}

/// Binds a loopback listener, accepts a single connection, and runs one [`Stratifier`]
/// session against it until the returned cancellation token is dropped or cancelled.
///
/// `enonce1_size`/`enonce2_size` must match whatever was passed to [`options`] for
/// `settings`, since [`PoolExtranonces`] is built independently from the same values.
async fn spawn_pool(
    settings: Settings,
    template: BlockTemplate,
    enonce1_size: usize,
    enonce2_size: usize,
) -> (std::net::SocketAddr, watch::Sender<std::sync::Arc<BlockTemplate>>, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let settings = std::sync::Arc::new(settings);
    let metatron = std::sync::Arc::new(Metatron::new());
    let extranonces =
        std::sync::Arc::new(PoolExtranonces::new(enonce1_size, enonce2_size).unwrap());
    let (sender, receiver) = watch::channel(std::sync::Arc::new(template));
    let cancel_token = CancellationToken::new();

    let task_cancel = cancel_token.clone();
    tokio::spawn(async move {
        let (stream, peer) = listener.accept().await.unwrap();
        let mut stratifier: Stratifier<BlockTemplate> = Stratifier::new(
            peer,
            settings,
            metatron,
            extranonces,
            stream,
            receiver,
            task_cancel,
        );
        let _ = stratifier.serve().await;
    });

    (addr, sender, cancel_token)
}

struct Client {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
    next_id: u64,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
            next_id: 0,
        }
    }

    async fn request(&mut self, method: &str, params: Value) -> Message {
        self.next_id += 1;
        let id = self.next_id;
        let line = json!({"id": id, "method": method, "params": params}).to_string();
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();

        loop {
            let message = self.recv().await;
            if let Message::Response { id: ref rid, .. } = message
                && *rid == Id::Number(id)
            {
                return message;
            }
        }
    }

    async fn recv(&mut self) -> Message {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    async fn recv_notify(&mut self) -> Notify {
        loop {
            if let Message::Notification { method, params } = self.recv().await
                && method == "mining.notify"
            {
                return serde_json::from_value(params).unwrap();
            }
        }
    }

    async fn subscribe(&mut self) -> SubscribeResult {
        let response = self.request("mining.subscribe", json!(["kazumyon-test/0.1"])).await;
        let Message::Response { result, .. } = response else {
            unreachable!()
        };
        serde_json::from_value(result.unwrap()).unwrap()
    }

    async fn authorize(&mut self, username: &str) -> Message {
        self.request("mining.authorize", json!([username, "x"])).await
    }
}

/// Brute-forces a nonce that meets `difficulty` for the given job, mirroring what a real
/// miner's hashing loop does.
fn solve_share(
    notify: &Notify,
    enonce1: &Extranonce,
    enonce2: &Extranonce,
    difficulty: Difficulty,
) -> (Ntime, Nonce) {
    let merkle_root =
        stratum::merkle_root(&notify.coinb1, &notify.coinb2, enonce1, enonce2, &notify.merkle_branches)
            .unwrap();

    let mut header = Header {
        version: notify.version.0,
        prev_blockhash: notify.prevhash.into(),
        merkle_root: bitcoin::TxMerkleNode::from_byte_array(*merkle_root.as_byte_array()),
        time: notify.ntime.into(),
        bits: notify.nbits.to_compact(),
        nonce: 0,
    };

    let target = difficulty.to_target();

    loop {
        if target.is_met_by(header.block_hash()) {
            return (Ntime::from(header.time), Nonce::from(header.nonce));
        }
        header.nonce = header.nonce.wrapping_add(1);
        assert_ne!(header.nonce, 0, "nonce wrapped without meeting difficulty {difficulty}");
    }
}

#[tokio::test]
async fn subscribe_authorize_receives_job() {
    let settings = Settings::load(options("1")).unwrap();
    let (addr, _sender, _cancel) = spawn_pool(settings, template(), 4, 4).await;

    let mut client = Client::connect(addr).await;
    let subscribed = client.subscribe().await;
    assert_eq!(subscribed.2, 4);

    let authorized = client.authorize(WORKER).await;
    let Message::Response { result, error, .. } = authorized else {
        unreachable!()
    };
    assert_eq!(error, None);
    assert_eq!(result, Some(json!(true)));

    let notify = client.recv_notify().await;
    assert!(notify.clean_jobs);
}

#[tokio::test]
async fn authorize_before_subscribe_is_rejected() {
    let settings = Settings::load(options("1")).unwrap();
    let (addr, _sender, _cancel) = spawn_pool(settings, template(), 4, 4).await;

    let mut client = Client::connect(addr).await;
    let authorized = client
        .authorize(WORKER)
        .await;
    let Message::Response { error, .. } = authorized else {
        unreachable!()
    };
    assert_eq!(error.unwrap().error_code, stratum::StratumError::NotSubscribed.code());
}

#[tokio::test]
async fn accepted_share_and_duplicate_rejection() {
    let settings = Settings::load(options("0.0001")).unwrap();
    let (addr, _sender, _cancel) = spawn_pool(settings, template(), 4, 4).await;

    let mut client = Client::connect(addr).await;
    let subscribed = client.subscribe().await;
    let enonce1 = subscribed.1.clone();
    let enonce2 = Extranonce::random(subscribed.2);

    client
        .authorize(WORKER)
        .await;
    let notify = client.recv_notify().await;

    let (ntime, nonce) = solve_share(&notify, &enonce1, &enonce2, Difficulty::from(0.0001));

    let submit_params = |job_id: JobId, enonce2: &Extranonce, ntime: Ntime, nonce: Nonce| {
        json!([
            WORKER,
            job_id,
            enonce2,
            ntime,
            nonce,
        ])
    };

    let first = client
        .request(
            "mining.submit",
            submit_params(notify.job_id, &enonce2, ntime, nonce),
        )
        .await;
    let Message::Response { result, error, .. } = first else {
        unreachable!()
    };
    assert_eq!(error, None);
    assert_eq!(result, Some(json!(true)));

    let second = client
        .request(
            "mining.submit",
            submit_params(notify.job_id, &enonce2, ntime, nonce),
        )
        .await;
    let Message::Response { result, error, .. } = second else {
        unreachable!()
    };
    assert_eq!(result, Some(json!(false)));
    assert_eq!(
        error.unwrap().error_code,
        stratum::StratumError::Other(String::new()).code()
    );
}

#[tokio::test]
async fn unknown_job_id_is_stale() {
    let settings = Settings::load(options("1")).unwrap();
    let (addr, _sender, _cancel) = spawn_pool(settings, template(), 4, 4).await;

    let mut client = Client::connect(addr).await;
    let subscribed = client.subscribe().await;
    let enonce2 = Extranonce::random(subscribed.2);

    client
        .authorize(WORKER)
        .await;
    client.recv_notify().await;

    let response = client
        .request(
            "mining.submit",
            json!([
                WORKER,
                JobId::new(999_999),
                enonce2,
                Ntime::from(1_700_000_000u32),
                Nonce::from(0u32),
            ]),
        )
        .await;

    let Message::Response { error, .. } = response else {
        unreachable!()
    };
    assert_eq!(error.unwrap().error_code, stratum::StratumError::Stale.code());
}
