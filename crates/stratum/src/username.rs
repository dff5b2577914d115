use super::*;

/// The `username` field of `mining.authorize`, conventionally
/// `<address>.<workername>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(pub String);

impl Username {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Some miners send the username pre-quoted; strip a single layer of
    /// surrounding quotes if present.
    pub fn as_str(&self) -> &str {
        self.0.trim_matches('"')
    }

    pub fn workername(&self) -> &str {
        self.as_str().split('.').nth(1).unwrap_or("")
    }

    pub fn address_str(&self) -> &str {
        self.as_str().split('.').next().unwrap_or("")
    }

    pub fn parse_address(&self) -> Result<Address<NetworkUnchecked>> {
        self.address_str()
            .parse::<Address<NetworkUnchecked>>()
            .map_err(|err| InternalError::Parse {
                message: format!("invalid address in username `{}`: {err}", self.0),
            })
    }

    pub fn parse_with_network(&self, network: Network) -> Result<Address> {
        let unchecked = self.parse_address()?;
        unchecked
            .require_network(network)
            .map_err(|err| InternalError::InvalidValue {
                message: format!("address network mismatch: {err}"),
            })
    }

    /// Tries each network in turn; `tb1...` addresses are valid on both
    /// Testnet and Testnet4, so Testnet4 is checked first.
    pub fn infer_network(&self) -> Result<Network> {
        let unchecked = self.parse_address()?;
        for network in [
            Network::Bitcoin,
            Network::Testnet4,
            Network::Testnet,
            Network::Signet,
            Network::Regtest,
        ] {
            if unchecked.clone().require_network(network).is_ok() {
                return Ok(network);
            }
        }
        Err(InternalError::InvalidValue {
            message: format!("address in username `{}` matches no known network", self.0),
        })
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
