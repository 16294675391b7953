//! Hub configuration.

use std::time::Duration;

/// Timeouts and limits applied to every connection of the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// 受信待ちの上限。フレーム（制御フレームを含む）を受信するたびにリセットされる
    pub read_timeout: Duration,
    /// ソケットへの 1 回の書き込み、および送信キューへの投入待ちの上限
    pub write_timeout: Duration,
    /// ping の送信間隔
    pub ping_interval: Duration,
    /// ping 1 回あたりの送信待ちの上限
    pub ping_timeout: Duration,
    /// 参加者キャッシュの有効期限（`None` の場合は失効しない）
    pub membership_ttl: Option<Duration>,
    /// 接続ごとの送信キューの容量
    pub outbound_queue_capacity: usize,
    /// シャットダウン時に接続タスクの終了を待つ上限
    pub shutdown_grace: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(5),
            ping_interval: Duration::from_secs(30),
            ping_timeout: Duration::from_secs(5),
            membership_ttl: None,
            outbound_queue_capacity: 64,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}
