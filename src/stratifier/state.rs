use super::*;

#[derive(Debug, Clone)]
pub(crate) enum State {
    Fresh {
        version_mask: Option<Version>,
    },

    Subscribed {
        enonce1: Extranonce,
        user_agent: String,
        version_mask: Option<Version>,
    },

    Working {
        enonce1: Extranonce,
        user_agent: String,
        version_mask: Option<Version>,
        address: Address,
        workername: String,
        authorized_username: Username,
    },
}

impl State {
    pub(crate) fn new() -> Self {
        State::Fresh { version_mask: None }
    }

    pub(crate) fn configure(&mut self, version_mask: Version) {
        match self {
            State::Fresh {
                version_mask: vm, ..
            } => *vm = Some(version_mask),
            State::Subscribed {
                version_mask: vm, ..
            } => *vm = Some(version_mask),
            State::Working {
                version_mask: vm, ..
            } => *vm = Some(version_mask),
        }
    }

    pub(crate) fn subscribe(&mut self, enonce1: Extranonce, user_agent: String) {
        let version_mask = self.version_mask();
        *self = State::Subscribed {
            enonce1,
            user_agent,
            version_mask,
        };
    }

    pub(crate) fn authorize(
        &mut self,
        address: Address,
        workername: String,
        authorized_username: Username,
    ) -> Result<(), StratumError> {
        match self {
            State::Subscribed {
                enonce1,
                user_agent,
                version_mask,
            } => {
                *self = State::Working {
                    enonce1: enonce1.clone(),
                    user_agent: user_agent.clone(),
                    version_mask: *version_mask,
                    address,
                    workername,
                    authorized_username,
                };
                Ok(())
            }
            _ => Err(StratumError::NotSubscribed),
        }
    }

    pub(crate) fn version_mask(&self) -> Option<Version> {
        match self {
            State::Fresh { version_mask } => *version_mask,
            State::Subscribed { version_mask, .. } => *version_mask,
            State::Working { version_mask, .. } => *version_mask,
        }
    }

    pub(crate) fn enonce1(&self) -> Option<&Extranonce> {
        match self {
            State::Fresh { .. } => None,
            State::Subscribed { enonce1, .. } => Some(enonce1),
            State::Working { enonce1, .. } => Some(enonce1),
        }
    }

    pub(crate) fn user_agent(&self) -> Option<&str> {
        match self {
            State::Fresh { .. } => None,
            State::Subscribed { user_agent, .. } => Some(user_agent),
            State::Working { user_agent, .. } => Some(user_agent),
        }
    }

    pub(crate) fn address(&self) -> Option<&Address> {
        match self {
            State::Working { address, .. } => Some(address),
            _ => None,
        }
    }

    pub(crate) fn workername(&self) -> Option<&str> {
        match self {
            State::Working { workername, .. } => Some(workername),
            _ => None,
        }
    }

    pub(crate) fn authorized_username(&self) -> Option<&Username> {
        match self {
            State::Working {
                authorized_username,
                ..
            } => Some(authorized_username),
            _ => None,
        }
    }

    pub(crate) fn is_fresh(&self) -> bool {
        matches!(self, State::Fresh { .. })
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        matches!(self, State::Subscribed { .. })
    }

    pub(crate) fn is_working(&self) -> bool {
        matches!(self, State::Working { .. })
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            State::Fresh { version_mask: None } => write!(f, "Init"),
            State::Fresh {
                version_mask: Some(_),
            } => write!(f, "Configured"),
            State::Subscribed { .. } => write!(f, "Subscribed"),
            State::Working { .. } => write!(f, "Working"),
        }
    }
}
