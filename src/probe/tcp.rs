//! TCP连接探测
//!
//! 建立连接即视为存活。连接与超时计时器竞争，先到者决定结果，
//! 落败的一方被直接丢弃：超时后未完成的连接随 future 一起销毁。

use crate::probe::outcome::{ProbeError, ProbeOutcome};
use crate::probe::target::Target;
use crate::probe::ProbeConfig;
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// 建立底层连接的能力
#[async_trait]
pub trait Connector: Send + Sync {
    /// 连接类型
    type Stream: AsyncWrite + Unpin + Send;

    /// 连接到指定主机和端口
    async fn connect(&self, host: &str, port: u16) -> io::Result<Self::Stream>;
}

/// 基于 tokio 的默认连接器
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioConnector;

#[async_trait]
impl Connector for TokioConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        TcpStream::connect((host, port)).await
    }
}

/// 使用默认连接器执行TCP探测
pub async fn check_tcp(target: &Target, config: &ProbeConfig) -> ProbeOutcome {
    check_tcp_with(&TokioConnector, target, config).await
}

/// 使用指定连接器执行TCP探测
///
/// # 参数
/// * `connector` - 连接器
/// * `target` - 探测目标
/// * `config` - 探测配置
///
/// # 返回
/// * `ProbeOutcome` - 探测结果
pub async fn check_tcp_with<C: Connector>(
    connector: &C,
    target: &Target,
    config: &ProbeConfig,
) -> ProbeOutcome {
    let deadline = tokio::time::sleep(config.timeout);
    tokio::pin!(deadline);

    debug!("TCP 探测开始: {}", target.address());

    tokio::select! {
        biased;

        connected = connector.connect(&target.host, target.port) => match connected {
            Ok(mut stream) => {
                // 计时器已随 select 结束而失效，只需关闭连接
                if let Err(e) = stream.shutdown().await {
                    debug!("关闭TCP连接失败 {}: {}", target.address(), e);
                }
                debug!("TCP 探测成功: {}", target.address());
                ProbeOutcome::Healthy
            }
            Err(e) => {
                debug!("TCP 探测失败 {}: {}", target.address(), e);
                ProbeOutcome::Unhealthy(ProbeError::from_io(&e))
            }
        },
        _ = &mut deadline => {
            debug!(
                "TCP 探测超时 {}: {:?}",
                target.address(),
                config.timeout
            );
            ProbeOutcome::Unhealthy(ProbeError::ConnectTimeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// 永远不会完成的连接器，用于确定性地触发超时
    struct StallingConnector {
        dropped: Arc<AtomicUsize>,
    }

    struct DropGuard(Arc<AtomicUsize>);

    impl Drop for DropGuard {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Connector for StallingConnector {
        type Stream = TcpStream;

        async fn connect(&self, _host: &str, _port: u16) -> io::Result<TcpStream> {
            let _guard = DropGuard(Arc::clone(&self.dropped));
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    fn config(timeout_ms: u64) -> ProbeConfig {
        ProbeConfig::default().with_timeout(Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn test_tcp_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((_stream, _addr)) = listener.accept().await {}
        });

        let target = Target::parse(&format!("tcp://127.0.0.1:{port}"), None).unwrap();
        let outcome = check_tcp(&target, &config(1000)).await;

        assert_eq!(outcome, ProbeOutcome::Healthy);
    }

    #[tokio::test]
    async fn test_tcp_probe_refused_is_transport_error() {
        // 先绑定再释放，拿到一个当前没有监听者的端口
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let target = Target::parse(&format!("tcp://127.0.0.1:{port}"), None).unwrap();
        let outcome = check_tcp(&target, &config(1000)).await;

        match outcome {
            ProbeOutcome::Unhealthy(err) => assert!(err.is_connection_refused(), "{err:?}"),
            other => panic!("expected refused, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tcp_probe_slow_handshake_is_connect_timeout() {
        let saturated = crate::probe::testing::saturated_port().await;
        let target =
            Target::parse(&format!("tcp://127.0.0.1:{}", saturated.port), None).unwrap();

        let start = std::time::Instant::now();
        let outcome = check_tcp(&target, &config(100)).await;

        assert_eq!(outcome, ProbeOutcome::Unhealthy(ProbeError::ConnectTimeout));
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_tcp_probe_timeout_drops_pending_connect() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let connector = StallingConnector {
            dropped: Arc::clone(&dropped),
        };
        let target = Target::parse("tcp://10.255.255.1:81", None).unwrap();

        let outcome = check_tcp_with(&connector, &target, &config(20)).await;

        assert_eq!(outcome, ProbeOutcome::Unhealthy(ProbeError::ConnectTimeout));
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }
}
