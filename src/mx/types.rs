/// One mail exchanger for a domain. Lower `priority` is more preferred.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MxRecord {
    pub host: String,
    pub priority: u16,
}

impl MxRecord {
    pub fn new(priority: u16, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            priority,
        }
    }
}
