//! DeliveryLoop - InboundSource から受け取って Dispatcher に渡すループ
//!
//! # 学習ポイント
//! - `watch` channel による shutdown 通知
//! - `tokio::select!` で受信と shutdown を競合させる
//! - 1 件の失敗でループを止めない（ログして次へ）
//! - callback の panic も `catch_unwind` で受け止めて失敗として数える

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::dispatcher::Dispatcher;
use crate::ports::InboundSource;

/// delivery loop の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// worker 数
    pub workers: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// 配送件数のカウンタ（全 worker で共有）
#[derive(Debug, Default)]
pub struct DeliveryStats {
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl DeliveryStats {
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Delivery worker group handle.
/// - `request_shutdown()` で新しい受信をやめる
/// - source が閉じると worker は自分で終了する
pub struct DeliveryGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
    stats: Arc<DeliveryStats>,
}

impl DeliveryGroup {
    /// Spawn `config.workers` workers.
    pub fn spawn(
        config: DeliveryConfig,
        source: Arc<dyn InboundSource>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(DeliveryStats::default());

        let mut joins = Vec::with_capacity(config.workers);
        for worker_id in 0..config.workers {
            let source = Arc::clone(&source);
            let dispatcher = Arc::clone(&dispatcher);
            let stats = Arc::clone(&stats);
            let mut rx = shutdown_rx.clone();

            let join = tokio::spawn(async move {
                delivery_loop(worker_id, source, dispatcher, stats, &mut rx).await;
            });
            joins.push(join);
        }

        Self {
            shutdown_tx,
            joins,
            stats,
        }
    }

    pub fn stats(&self) -> Arc<DeliveryStats> {
        Arc::clone(&self.stats)
    }

    /// Request shutdown for all workers.
    /// 実行中の callback は止めない。次の受信をしないだけ。
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// source が閉じて全 worker が終わるのを待つ
    pub async fn join(self) -> Arc<DeliveryStats> {
        for j in self.joins {
            if let Err(e) = j.await {
                tracing::error!(error = %e, "delivery worker aborted");
            }
        }
        self.stats
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(self) -> Arc<DeliveryStats> {
        self.request_shutdown();
        self.join().await
    }
}

async fn delivery_loop(
    worker_id: usize,
    source: Arc<dyn InboundSource>,
    dispatcher: Arc<Dispatcher>,
    stats: Arc<DeliveryStats>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    tracing::info!(worker_id, "delivery worker started");
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let inbound = tokio::select! {
            changed = shutdown_rx.changed() => {
                // sender が drop されたら止まる
                if changed.is_err() {
                    break;
                }
                continue;
            }
            inbound = source.recv() => inbound,
        };

        let Some(inbound) = inbound else {
            tracing::debug!(worker_id, "inbound source closed");
            break;
        };

        // callback の panic は worker を道連れにしない
        match panic::catch_unwind(AssertUnwindSafe(|| dispatcher.deliver(&inbound))) {
            Ok(Ok(_)) => {
                stats.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(err)) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    worker_id,
                    message_id = %inbound.id,
                    topic = %inbound.topic,
                    message_type = err.message_type(),
                    bytes = inbound.len(),
                    error = %err,
                    "delivery failed"
                );
            }
            Err(payload) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    worker_id,
                    message_id = %inbound.id,
                    topic = %inbound.topic,
                    panic = panic_message(payload.as_ref()),
                    "callback panicked"
                );
            }
        }
    }
    tracing::info!(worker_id, "delivery worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
