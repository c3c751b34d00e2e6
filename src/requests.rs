use reqwest::{Client, ClientBuilder, Response};

use crate::error::CrawlError;

/// Anything that can hand back the raw HTML of a page.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, url: &str) -> Result<String, CrawlError>;
}

pub struct RequestClient {
    client: Client,
}

impl RequestClient {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = ClientBuilder::new().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// One GET, no retries. Any non-2xx status is an error.
    pub async fn fetch_url_response(&self, url: &str) -> Result<Response, CrawlError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    pub async fn fetch_url_body(&self, url: &str) -> Result<String, CrawlError> {
        let response = self.fetch_url_response(url).await?;
        let body = response.text().await?;
        Ok(body)
    }
}

impl PageSource for RequestClient {
    async fn fetch_page(&self, url: &str) -> Result<String, CrawlError> {
        self.fetch_url_body(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Serves a single canned HTTP response and returns the URL to hit.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/wiki/Page")
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let url = serve_once("200 OK", "<h1 id=\"firstHeading\">Hi</h1>").await;
        let client = RequestClient::new("test-agent").unwrap();
        let body = client.fetch_page(&url).await.unwrap();
        assert_eq!(body, "<h1 id=\"firstHeading\">Hi</h1>");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let url = serve_once("404 Not Found", "missing").await;
        let client = RequestClient::new("test-agent").unwrap();
        let err = client.fetch_page(&url).await.unwrap_err();
        assert!(matches!(
            err,
            CrawlError::Status { status, .. } if status == reqwest::StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        // Bind then drop so nothing is listening on the port.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RequestClient::new("test-agent").unwrap();
        let err = client.fetch_page(&format!("http://{addr}/")).await.unwrap_err();
        assert!(matches!(err, CrawlError::Fetch(_)));
    }
}
