use super::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Chain {
    #[default]
    #[value(name = "mainnet")]
    Mainnet,
    Testnet,
    Testnet4,
    Signet,
    Regtest,
}

impl Chain {
    pub(crate) fn network(self) -> Network {
        match self {
            Chain::Mainnet => Network::Bitcoin,
            Chain::Testnet => Network::Testnet,
            Chain::Testnet4 => Network::Testnet4,
            Chain::Signet => Network::Signet,
            Chain::Regtest => Network::Regtest,
        }
    }

    pub(crate) fn default_rpc_port(self) -> u16 {
        match self {
            Chain::Mainnet => 8332,
            Chain::Testnet => 18332,
            Chain::Testnet4 => 48332,
            Chain::Signet => 38332,
            Chain::Regtest => 18443,
        }
    }

    pub(crate) fn join_with_data_dir(self, data_dir: PathBuf) -> PathBuf {
        match self {
            Chain::Mainnet => data_dir,
            Chain::Testnet => data_dir.join("testnet3"),
            Chain::Testnet4 => data_dir.join("testnet4"),
            Chain::Signet => data_dir.join("signet"),
            Chain::Regtest => data_dir.join("regtest"),
        }
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Chain::Mainnet => "mainnet",
                Chain::Testnet => "testnet",
                Chain::Testnet4 => "testnet4",
                Chain::Signet => "signet",
                Chain::Regtest => "regtest",
            }
        )
    }
}
