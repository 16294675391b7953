//! Heartbeat Monitor
//!
//! 接続ごとに 1 つ起動し、`ping_interval` ごとに ping を送信キューへ積む。
//! ping の失敗は致命的ではない。応答のない接続は読み込み側のタイムアウトで切断される。

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

use crate::domain::{ConnectionHandle, PushFrame};

/// Run the ping loop until the connection is closed.
///
/// A zero `ping_interval` disables pings for the connection.
pub async fn run_heartbeat(handle: ConnectionHandle, ping_interval: Duration, ping_timeout: Duration) {
    if ping_interval.is_zero() {
        tracing::warn!(connection_id = %handle.id(), "ping_interval is zero, heartbeat disabled");
        handle.closed().await;
        return;
    }

    let mut ticker = interval(ping_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // 最初の tick は即時に完了するので読み捨てる
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = ticker.tick() => {
                if let Err(e) = handle.push(PushFrame::Ping, ping_timeout).await {
                    tracing::debug!(connection_id = %handle.id(), error = %e, "ping not queued");
                }
            }
        }
    }

    tracing::trace!(connection_id = %handle.id(), "heartbeat stopped");
}
