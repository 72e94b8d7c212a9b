//! 远程计数服务（countapi 风格）客户端。

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::key::CounterKey;

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("counter request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("counter service answered HTTP {0}")]
    Status(u16),
    #[error("counter response has no value")]
    MissingValue,
    #[error("invalid counter base url '{0}'")]
    BaseUrl(String),
    #[error("counter disabled")]
    Disabled,
}

/// 计数服务的两种操作。
pub trait CounterService: Send + Sync {
    /// 只读查询当前值。
    fn info(&self, key: &CounterKey) -> Result<i64, CounterError>;
    /// 自增后返回新值。每次调用都会计数一次。
    fn hit(&self, key: &CounterKey) -> Result<i64, CounterError>;
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    value: Option<serde_json::Number>,
}

impl CountResponse {
    /// 计数可被设为负数；小数按四舍五入显示。
    fn count(&self) -> Option<i64> {
        let n = self.value.as_ref()?;
        n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))
    }
}

pub struct CountApiClient {
    client: Client,
    base: Url,
    namespace: String,
}

impl CountApiClient {
    pub fn new(base_url: &str, namespace: &str, timeout: Duration) -> Result<Self, CounterError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url, namespace)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        namespace: &str,
    ) -> Result<Self, CounterError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(&format!("{trimmed}/"))
            .map_err(|_| CounterError::BaseUrl(base_url.to_string()))?;
        Ok(Self {
            client,
            base,
            namespace: namespace.trim().to_string(),
        })
    }

    fn endpoint(&self, op: &str, key: &CounterKey) -> Result<Url, CounterError> {
        self.base
            .join(&format!("{op}/{}/{}", self.namespace, key.as_str()))
            .map_err(|_| CounterError::BaseUrl(self.base.to_string()))
    }

    fn request(&self, op: &str, key: &CounterKey) -> Result<i64, CounterError> {
        let url = self.endpoint(op, key)?;
        debug!(target: "counter", op, key = %key, "请求计数");
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CounterError::Status(status.as_u16()));
        }
        let body: CountResponse = resp.json()?;
        body.count().ok_or(CounterError::MissingValue)
    }
}

impl CounterService for CountApiClient {
    fn info(&self, key: &CounterKey) -> Result<i64, CounterError> {
        self.request("info", key)
    }

    fn hit(&self, key: &CounterKey) -> Result<i64, CounterError> {
        self.request("hit", key)
    }
}

/// 配置关闭计数时使用：所有请求都按失败处理，不产生网络访问。
pub struct DisabledCounter;

impl CounterService for DisabledCounter {
    fn info(&self, _key: &CounterKey) -> Result<i64, CounterError> {
        Err(CounterError::Disabled)
    }

    fn hit(&self, _key: &CounterKey) -> Result<i64, CounterError> {
        Err(CounterError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// 本地起一个只应答一次的 HTTP 服务，返回其地址。
    fn serve_once(status: &'static str, body: &'static str) -> anyhow::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        });
        Ok(format!("http://{addr}"))
    }

    fn local_client(base: &str) -> anyhow::Result<CountApiClient> {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(CountApiClient::with_client(client, base, "ns")?)
    }

    #[test]
    fn non_success_status_is_an_error() -> anyhow::Result<()> {
        let client = local_client(&serve_once("503 Service Unavailable", "{}")?)?;
        let err = client.info(&CounterKey::novel("n1")).unwrap_err();
        assert!(matches!(err, CounterError::Status(503)), "{err}");
        Ok(())
    }

    #[test]
    fn null_or_absent_value_is_missing() -> anyhow::Result<()> {
        let client = local_client(&serve_once("200 OK", r#"{"value":null}"#)?)?;
        assert!(matches!(
            client.info(&CounterKey::novel("n1")),
            Err(CounterError::MissingValue)
        ));

        let client = local_client(&serve_once("200 OK", r#"{"namespace":"ns"}"#)?)?;
        assert!(matches!(
            client.hit(&CounterKey::chapter("n1", 1)),
            Err(CounterError::MissingValue)
        ));
        Ok(())
    }

    #[test]
    fn hit_returns_served_value() -> anyhow::Result<()> {
        let client = local_client(&serve_once("200 OK", r#"{"value":1234}"#)?)?;
        assert_eq!(client.hit(&CounterKey::chapter("n1", 1))?, 1234);
        Ok(())
    }

    #[test]
    fn endpoints_follow_op_namespace_key() -> anyhow::Result<()> {
        let client = CountApiClient::new(
            "https://api.countapi.xyz/",
            "topaz-novels-test",
            Duration::from_secs(5),
        )?;
        let key = CounterKey::chapter("n1", 2);
        assert_eq!(
            client.endpoint("hit", &key)?.as_str(),
            "https://api.countapi.xyz/hit/topaz-novels-test/topaz_novel_n1_chap_2"
        );
        assert_eq!(
            client.endpoint("info", &CounterKey::novel("n1"))?.as_str(),
            "https://api.countapi.xyz/info/topaz-novels-test/topaz_novel_n1_main"
        );
        Ok(())
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            CountApiClient::new("not a url", "ns", Duration::from_secs(1)),
            Err(CounterError::BaseUrl(_))
        ));
    }

    #[test]
    fn negative_and_fractional_values_are_kept() -> anyhow::Result<()> {
        let body: CountResponse = serde_json::from_str(r#"{"value":-7}"#)?;
        assert_eq!(body.count(), Some(-7));
        let body: CountResponse = serde_json::from_str(r#"{"value":2.6}"#)?;
        assert_eq!(body.count(), Some(3));
        let body: CountResponse = serde_json::from_str(r#"{"value":null}"#)?;
        assert_eq!(body.count(), None);
        Ok(())
    }
}
