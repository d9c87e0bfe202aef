//! 探测测试辅助

use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket, TcpStream};

/// 接收队列已满的本地监听端口，新的连接握手会一直挂起
pub(crate) struct SaturatedPort {
    pub port: u16,
    _listener: TcpListener,
    _held: Vec<TcpStream>,
}

/// 以 backlog 0 监听且从不 accept，占满队列后返回
pub(crate) async fn saturated_port() -> SaturatedPort {
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let listener = socket.listen(0).unwrap();
    let addr = listener.local_addr().unwrap();

    let mut held = Vec::new();
    for _ in 0..64 {
        match tokio::time::timeout(Duration::from_millis(200), TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => held.push(stream),
            Ok(Err(e)) => panic!("填充连接队列失败: {e}"),
            Err(_) => break,
        }
    }

    SaturatedPort {
        port: addr.port(),
        _listener: listener,
        _held: held,
    }
}
