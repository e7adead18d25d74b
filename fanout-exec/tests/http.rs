use std::time::Duration;

use fanout_exec::executor::FetchExecutor;
use fanout_exec::{
    CancellationToken, FetchError, HttpExecutorConfig, HttpFetchExecutor, Key, TransportError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// Serves one canned response per connection, after an optional delay.
async fn serve(status_line: &'static str, body: &'static [u8], delay: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                tokio::time::sleep(delay).await;
                let head = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body).await;
            });
        }
    });
    format!("http://{addr}/")
}

fn executor(config: HttpExecutorConfig) -> HttpFetchExecutor {
    HttpFetchExecutor::new(config).unwrap()
}

#[tokio::test]
async fn http_executor_returns_body_on_success() {
    let url = serve("200 OK", b"hello", Duration::ZERO).await;

    let body = executor(HttpExecutorConfig::default())
        .fetch(&Key::from(url), &CancellationToken::new())
        .await;

    assert_eq!(body, Ok(b"hello".to_vec()));
}

#[tokio::test]
async fn http_executor_maps_bad_status() {
    let url = serve("404 Not Found", b"missing", Duration::ZERO).await;

    let result = executor(HttpExecutorConfig::default())
        .fetch(&Key::from(url), &CancellationToken::new())
        .await;

    assert_eq!(
        result,
        Err(FetchError::Transport(TransportError::Status { code: 404 }))
    );
}

#[tokio::test]
async fn http_executor_default_accepts_any_2xx() {
    let url = serve("204 No Content", b"", Duration::ZERO).await;

    let result = executor(HttpExecutorConfig::default())
        .fetch(&Key::from(url), &CancellationToken::new())
        .await;

    assert_eq!(result, Ok(Vec::new()));
}

#[tokio::test]
async fn http_executor_honours_narrowed_accept_status() {
    let url = serve("204 No Content", b"", Duration::ZERO).await;
    let config = HttpExecutorConfig {
        accept_status: 200..=200,
        ..Default::default()
    };

    let result = executor(config).fetch(&Key::from(url), &CancellationToken::new()).await;

    assert_eq!(
        result,
        Err(FetchError::Transport(TransportError::Status { code: 204 }))
    );
}

#[tokio::test]
async fn http_executor_enforces_response_size_limit() {
    let url = serve("200 OK", &[b'x'; 1000], Duration::ZERO).await;
    let config = HttpExecutorConfig {
        max_response_bytes: 100,
        ..Default::default()
    };

    let result = executor(config).fetch(&Key::from(url), &CancellationToken::new()).await;

    assert_eq!(
        result,
        Err(FetchError::Transport(TransportError::ResponseTooLarge { max_bytes: 100 }))
    );
}

#[tokio::test]
async fn http_executor_times_out_slow_requests() {
    let url = serve("200 OK", b"late", Duration::from_secs(2)).await;
    let config = HttpExecutorConfig {
        request_timeout: Duration::from_millis(100),
        ..Default::default()
    };

    let result = executor(config).fetch(&Key::from(url), &CancellationToken::new()).await;

    assert_eq!(result, Err(FetchError::Transport(TransportError::Timeout)));
}

#[tokio::test]
async fn http_executor_rejects_invalid_key() {
    let result = executor(HttpExecutorConfig::default())
        .fetch(&Key::from("not a url"), &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(FetchError::Transport(TransportError::InvalidKey(_)))
    ));
}

#[tokio::test]
async fn http_executor_stops_on_cancellation() {
    let url = serve("200 OK", b"late", Duration::from_secs(5)).await;
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let start = std::time::Instant::now();
    let result = executor(HttpExecutorConfig::default())
        .fetch(&Key::from(url), &cancel)
        .await;

    assert_eq!(result, Err(FetchError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn http_executor_skips_io_when_already_cancelled() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = executor(HttpExecutorConfig::default())
        .fetch(&Key::from("http://127.0.0.1:9/"), &cancel)
        .await;

    assert_eq!(result, Err(FetchError::Cancelled));
}
