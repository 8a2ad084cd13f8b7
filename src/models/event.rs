use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakerEvent {
    Opened,
    Closed,
}

impl Display for BreakerEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            BreakerEvent::Opened => write!(f, "opened"),
            BreakerEvent::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);
