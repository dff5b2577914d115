#![allow(clippy::too_many_arguments)]
use {
    anyhow::{Context, Error, anyhow, bail, ensure},
    arguments::Arguments,
    bitcoin::{
        Address, Amount, Block, BlockHash, CompactTarget, Network, OutPoint, ScriptBuf, Sequence,
        Target, Transaction, TxIn, TxMerkleNode, TxOut, Txid, Witness,
        address::NetworkUnchecked,
        block::{self, Header},
        consensus::{self, Decodable, Encodable, encode},
        hashes::{Hash, sha256d},
        locktime::absolute::LockTime,
        transaction,
    },
    bitcoind_async_client::{
        Auth, Client,
        traits::{Broadcaster, Reader},
    },
    byteorder::{BigEndian, ByteOrder, LittleEndian},
    chain::Chain,
    clap::{Args, Parser, ValueEnum},
    coinbase_builder::CoinbaseBuilder,
    dirs::data_dir as os_data_dir,
    extranonces::PoolExtranonces,
    futures::{SinkExt, StreamExt},
    hex::FromHex,
    jobs::Jobs,
    lru::LruCache,
    metatron::{BlockFound, Metatron},
    options::Options,
    parking_lot::Mutex,
    serde::{
        Deserialize, Serialize, Serializer,
        de::{self, Deserializer},
        ser::SerializeSeq,
    },
    serde_json::{Value, json},
    settings::Settings,
    share_set::SubmittedShareSet,
    std::{
        collections::{HashMap, HashSet, VecDeque},
        env,
        fmt::{self, Display, Formatter},
        net::SocketAddr,
        num::NonZeroUsize,
        path::PathBuf,
        process,
        str::FromStr,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::{Duration, Instant, SystemTime, UNIX_EPOCH},
    },
    stratifier::Stratifier,
    stratum::{
        Authorize, Configure, ConfigureResponse, Difficulty, Extranonce, Id, JobId, JsonRpcError,
        MAX_MESSAGE_SIZE, Message, MerkleNode, Nbits, Nonce, Notify, Ntime, PrevHash,
        SetDifficulty, StratumError, Submit, Subscribe, SubscribeResult, SuggestDifficulty,
        Username, Version, merkle_root,
    },
    tokio::{
        net::{TcpListener, TcpStream, tcp::{OwnedReadHalf, OwnedWriteHalf}},
        runtime::Runtime,
        signal::ctrl_c,
        sync::watch,
        task::{JoinHandle, JoinSet},
    },
    tokio_util::{
        codec::{FramedRead, FramedWrite, LinesCodec},
        sync::CancellationToken,
    },
    tracing::{debug, error, info, warn},
    tracing_subscriber::EnvFilter,
    workbase::Workbase,
};

mod arguments;
mod block_template;
mod chain;
mod codec;
mod coinbase_builder;
mod error;
mod extranonces;
mod generator;
mod job;
mod jobs;
mod metatron;
mod options;
mod settings;
mod share_set;
mod stratifier;
mod workbase;
mod zmq;

pub use {
    block_template::BlockTemplate, extranonces::PoolExtranonces, metatron::Metatron,
    options::Options, settings::Settings, stratifier::Stratifier,
};

/// ckpool-solo extranonce1 length in bytes, fixed for the lifetime of a pool process.
pub(crate) const ENONCE1_SIZE: usize = 4;
pub(crate) const MIN_ENONCE_SIZE: usize = 2;
pub(crate) const MAX_ENONCE_SIZE: usize = 8;
/// How far a share's `ntime` may drift from the job's own `ntime`, in either direction.
pub(crate) const MAX_NTIME_OFFSET: u32 = 600;
/// Capacity of the duplicate-block-submission LRU in [`jobs::Jobs`].
pub(crate) const LRU_CACHE_SIZE: usize = 256;
/// `mining.subscribe`'s first subscription id; the pool only ever hands out one per session.
pub(crate) const SUBSCRIPTION_ID: &str = "01";

pub(crate) type Result<T = (), E = Error> = std::result::Result<T, E>;

/// A single line a running pool can report about itself, used for the periodic status log.
pub(crate) trait StatusLine {
    fn status_line(&self) -> String;
}

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Arguments::parse();

    match args.run() {
        Err(err) => {
            error!("error: {err}");

            if env::var_os("RUST_BACKTRACE")
                .map(|val| val == "1")
                .unwrap_or_default()
            {
                error!("{}", err.backtrace());
            }
            process::exit(1);
        }
        Ok(()) => {
            process::exit(0);
        }
    }
}
