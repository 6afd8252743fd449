#![allow(clippy::disallowed_methods)]

use std::error::Error;

use provider::{ProviderConfig, ProviderError, SearchApiProvider, SentimentProvider};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve exactly one canned HTTP response and return the base URL plus the
/// request line the client sent.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> Result<(String, tokio::task::JoinHandle<String>), Box<dyn Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let n = socket.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).to_string();

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        request.lines().next().unwrap_or_default().to_string()
    });

    Ok((format!("http://{}", addr), handle))
}

fn provider(base_url: &str) -> SearchApiProvider {
    SearchApiProvider::new(
        ProviderConfig::default()
            .with_api_key("secret")
            .with_base_url(base_url)
            .with_cost_per_search(0.02),
    )
    .unwrap()
}

#[tokio::test]
async fn test_not_configured_short_circuits() -> Result<(), Box<dyn Error>> {
    // Nothing listens here; a network call would fail differently.
    let config = ProviderConfig::default().with_base_url("http://127.0.0.1:9");
    let provider = SearchApiProvider::new(config)?;

    let result = provider.fetch_sentiment("Heat movie").await;
    assert!(matches!(result, Err(ProviderError::NotConfigured)));

    Ok(())
}

#[tokio::test]
async fn test_percentage_found() -> Result<(), Box<dyn Error>> {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"knowledge_graph":{"title":"Heat","snippet":"82% liked this movie"}}"#,
    )
    .await?;

    let fetch = provider(&base_url).fetch_sentiment("Heat 1995 movie").await?;
    assert_eq!(fetch.percentage, Some(82));
    assert!((fetch.cost - 0.02).abs() < f64::EPSILON);

    let request_line = server.await?;
    assert!(request_line.starts_with("GET /search?"));
    assert!(request_line.contains("engine=google"));
    assert!(request_line.contains("q=Heat+1995+movie"));
    assert!(request_line.contains("api_key=secret"));

    Ok(())
}

#[tokio::test]
async fn test_no_percentage() -> Result<(), Box<dyn Error>> {
    let (base_url, server) =
        serve_once("200 OK", r#"{"organic_results":[{"snippet":"crime drama"}]}"#).await?;

    let fetch = provider(&base_url).fetch_sentiment("Obscure movie").await?;
    assert_eq!(fetch.percentage, None);
    server.await?;

    Ok(())
}

#[tokio::test]
async fn test_error_statuses() -> Result<(), Box<dyn Error>> {
    let (base_url, server) = serve_once("401 Unauthorized", "{}").await?;
    let result = provider(&base_url).fetch_sentiment("Heat movie").await;
    assert!(matches!(result, Err(ProviderError::Unauthorized)));
    server.await?;

    let (base_url, server) = serve_once("429 Too Many Requests", "{}").await?;
    let result = provider(&base_url).fetch_sentiment("Heat movie").await;
    assert!(matches!(result, Err(ProviderError::RateLimited)));
    server.await?;

    let (base_url, server) = serve_once("503 Service Unavailable", "{}").await?;
    let result = provider(&base_url).fetch_sentiment("Heat movie").await;
    assert!(matches!(result, Err(ProviderError::Status(503))));
    server.await?;

    Ok(())
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() -> Result<(), Box<dyn Error>> {
    let (base_url, server) = serve_once("200 OK", "not json").await?;
    let result = provider(&base_url).fetch_sentiment("Heat movie").await;
    assert!(matches!(result, Err(ProviderError::Decode(_))));
    server.await?;

    Ok(())
}
