//! Test helpers: a canned-response HTTP server and an in-memory log sink.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::{self, Write},
    sync::{Arc, Mutex},
};

use forecast_core::logging::DashFormat;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;

/// Serves `forecast.json` answers keyed by the `q` query parameter and
/// records every request target it receives.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// `routes` maps a location to `(status, body)`. Unknown locations get
    /// a 400 like the real API.
    pub async fn start(routes: &[(&str, u16, String)]) -> Self {
        let routes: HashMap<String, (u16, String)> = routes
            .iter()
            .map(|(q, status, body)| (q.to_string(), (*status, body.clone())))
            .collect();

        Self::serve(move |target| {
            let q = query_param(target, "q").unwrap_or_default();
            let (status, body) = routes.get(&q).cloned().unwrap_or_else(|| {
                (400, r#"{"error":{"code":1006,"message":"No matching location found."}}"#.into())
            });
            format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
        })
        .await
    }

    /// Answers every request with `response` verbatim, then closes.
    pub async fn start_raw(response: &str) -> Self {
        let response = response.to_string();
        Self::serve(move |_| response.clone()).await
    }

    async fn serve<F>(respond: F) -> Self
    where
        F: Fn(&str) -> String + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };

                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&buf);
                let target = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or_default()
                    .to_string();
                seen.lock().unwrap().push(target.clone());

                let response = respond(&target);
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{addr}/v1"),
            requests,
        }
    }

    /// Request targets (path + query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// The `q` parameter of every request, in arrival order.
    pub fn queried_locations(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|target| query_param(target, "q"))
            .collect()
    }
}

pub fn query_param(target: &str, name: &str) -> Option<String> {
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Log lines captured in memory.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + use<> {
        tracing_subscriber::fmt()
            .event_format(DashFormat)
            .with_max_level(Level::INFO)
            .with_writer(self.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let marker = format!(" - {level} - ");
        self.contents()
            .lines()
            .filter(|line| line.contains(&marker))
            .map(str::to_owned)
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A forecast.json body in the shape WeatherAPI.com returns.
pub fn forecast_body(city: &str, country: &str, days: &[(&str, f64, f64, f64, f64, f64)]) -> String {
    let days: Vec<_> = days
        .iter()
        .map(|(date, avg, max, min, humidity, co)| {
            serde_json::json!({
                "date": date,
                "day": {
                    "avgtemp_c": avg,
                    "maxtemp_c": max,
                    "mintemp_c": min,
                    "avghumidity": humidity,
                    "air_quality": { "co": co }
                }
            })
        })
        .collect();

    serde_json::json!({
        "location": { "name": city, "country": country },
        "forecast": { "forecastday": days }
    })
    .to_string()
}
