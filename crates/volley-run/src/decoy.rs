use std::net::SocketAddr;
use std::time::Duration;

use chrono::Utc;
use miette::IntoDiagnostic;
use rand::Rng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Milliseconds a caller waits before the 504 page arrives.
const DELAY_MS: (u64, u64) = (5000, 10000);

const PAGE: &str = concat!(
    r#"<!DOCTYPE html>
<html>

<head>
    <title>504 Gateway Timeout</title>
    <meta name="viewport" content="width=device-width, initial-scale=1, maximum-scale=1, shrink-to-fit=no" />
    <style>
        html {
            color-scheme: light dark;
        }

        body {
            padding: 2em;
            max-width: 32em;
            margin: 0 auto;
            text-align: center;
            font-family: Tahoma, Verdana, Arial, sans-serif;
        }
    </style>
</head>

<body>
    <h1>504 Gateway Timeout</h1>
    <hr>
    <p>volley/"#,
    env!("CARGO_PKG_VERSION"),
    r#"</p>
</body>

</html>
"#
);

/// Listens on all interfaces and answers every caller with a slow 504
/// page, logging whatever they sent. Runs until the process is killed.
pub async fn serve(port: u16) -> miette::Result<()> {
    let listener = TcpListener::bind(("::", port)).await.into_diagnostic()?;
    println!("listen [::]:{port}");

    listen(listener, DELAY_MS).await;
    Ok(())
}

async fn listen(listener: TcpListener, delay_ms: (u64, u64)) {
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                tokio::spawn(handle(socket, peer, delay_ms));
            }
            Err(error) => eprintln!("server: {error}"),
        }
    }
}

async fn handle(mut socket: TcpStream, peer: SocketAddr, delay_ms: (u64, u64)) {
    let mut buffer = vec![0u8; 8192];
    let read = match socket.read(&mut buffer).await {
        Ok(0) => return,
        Ok(read) => read,
        Err(error) => {
            eprintln!("socket: {error}");
            return;
        }
    };

    let message = String::from_utf8_lossy(&buffer[..read]);
    let ip = peer.ip().to_string();
    // Mapped IPv4 peers come in as ::ffff:a.b.c.d on a dual-stack socket.
    let ip = ip.strip_prefix("::ffff:").unwrap_or(&ip).to_string();
    let stamp = Utc::now().format("%H:%M:%S");
    println!("[{stamp}] <- {ip}:{}\n{message}", peer.port());

    let response = [
        "HTTP/1.1 504 Gateway Timeout".to_string(),
        "Content-Type: text/html; charset=utf-8".to_string(),
        format!("Content-Length: {}", PAGE.len()),
        format!("Date: {}", Utc::now().format("%a, %d %b %Y %H:%M:%S GMT")),
        "Server: volley".to_string(),
        "Connection: close".to_string(),
        String::new(),
        PAGE.to_string(),
    ]
    .join("\r\n");

    let wait = if delay_ms.1 > delay_ms.0 {
        rand::rng().random_range(delay_ms.0..delay_ms.1)
    } else {
        delay_ms.0
    };
    tokio::time::sleep(Duration::from_millis(wait)).await;

    if let Err(error) = socket.write_all(response.as_bytes()).await {
        eprintln!("socket: {error}");
    }
    let _ = socket.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn call(addr: SocketAddr, request: &[u8]) -> String {
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(request).await.unwrap();
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).to_string()
    }

    #[tokio::test]
    async fn test_answers_with_a_504_page() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(listen(listener, (0, 0)));

        let response = call(addr, b"GET / HTTP/1.1\r\nHost: bait\r\n\r\n").await;

        assert!(response.starts_with("HTTP/1.1 504 Gateway Timeout\r\n"));
        assert!(response.contains("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(response.contains(&format!("Content-Length: {}\r\n", PAGE.len())));
        assert!(response.contains("Server: volley\r\n"));
        assert!(response.contains("Connection: close\r\n"));
        assert!(response.contains(concat!("<p>volley/", env!("CARGO_PKG_VERSION"), "</p>")));
    }

    #[tokio::test]
    async fn test_date_header_is_rfc1123() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(listen(listener, (0, 0)));

        let response = call(addr, b"HEAD / HTTP/1.1\r\n\r\n").await;

        let date = response
            .lines()
            .find_map(|line| line.strip_prefix("Date: "))
            .unwrap();
        assert!(date.ends_with(" GMT"));
        assert!(chrono::NaiveDateTime::parse_from_str(date, "%a, %d %b %Y %H:%M:%S GMT").is_ok());
    }

    #[tokio::test]
    async fn test_serves_sequential_callers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(listen(listener, (0, 0)));

        for _ in 0..3 {
            let response = call(addr, b"GET /again HTTP/1.1\r\n\r\n").await;
            assert!(response.starts_with("HTTP/1.1 504 Gateway Timeout\r\n"));
        }
    }
}
