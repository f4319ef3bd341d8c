use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeSource {
    Refresh,
    Import,
}

/// Published every time the displayed collection is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionChanged {
    pub revision: u64,
    pub len: usize,
    pub source: ChangeSource,
}
