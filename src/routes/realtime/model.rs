use serde::{Deserialize, Serialize};

// participants 表每次插入都会原样广播；订阅端收到后全量重拉聚会，
// 与自己无关的更新由客户端自行丢弃
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInserted {
    pub short_id: String,
    pub name: String,
    pub is_creator: bool,
}
