use super::*;

pub type Result<T, E = InternalError> = std::result::Result<T, E>;

/// Errors raised while parsing wire values out of process. Never sent over the wire.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InternalError {
    #[snafu(display("failed to parse hex integer: {source}"))]
    ParseHexInt { source: std::num::ParseIntError },

    #[snafu(display("invalid value: {message}"))]
    InvalidValue { message: String },

    #[snafu(display("failed to parse: {message}"))]
    Parse { message: String },
}

/// The JSON-RPC error triple `[code, message, traceback]` sent in a Stratum response.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcError {
    pub error_code: i32,
    pub message: String,
    pub traceback: Option<Value>,
}

pub type StratumErrorResponse = JsonRpcError;

impl Serialize for JsonRpcError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.error_code)?;
        seq.serialize_element(&self.message)?;
        seq.serialize_element(&self.traceback)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for JsonRpcError {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (error_code, message, traceback) =
            <(i32, String, Option<Value>)>::deserialize(deserializer)?;
        Ok(Self {
            error_code,
            message,
            traceback,
        })
    }
}

impl Display for JsonRpcError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code, self.message)
    }
}

/// The five error conditions a Stratum server reports back over `mining.submit` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StratumError {
    /// Code 20. Catch-all, carries a human-readable reason.
    Other(String),
    /// Code 21. Job id unknown, or the session's job registry has moved on.
    Stale,
    /// Code 23. Share hash did not meet the session's target.
    AboveTarget,
    /// Code 24. `mining.submit` before `mining.authorize` succeeded.
    Unauthorized,
    /// Code 25. Any method before `mining.subscribe` succeeded.
    NotSubscribed,
}

impl StratumError {
    pub fn code(&self) -> i32 {
        match self {
            StratumError::Other(_) => 20,
            StratumError::Stale => 21,
            StratumError::AboveTarget => 23,
            StratumError::Unauthorized => 24,
            StratumError::NotSubscribed => 25,
        }
    }

    pub fn message(&self) -> String {
        match self {
            StratumError::Other(message) => message.clone(),
            StratumError::Stale => "Job not found".into(),
            StratumError::AboveTarget => "Share above target".into(),
            StratumError::Unauthorized => "Unauthorized worker".into(),
            StratumError::NotSubscribed => "Not subscribed".into(),
        }
    }

    pub fn into_response(self) -> JsonRpcError {
        JsonRpcError {
            error_code: self.code(),
            message: self.message(),
            traceback: None,
        }
    }
}

impl Display for StratumError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for StratumError {}
