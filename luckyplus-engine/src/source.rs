use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use luckyplus_db::models::{DrawResult, PrizeTier};

use crate::error::EngineError;

pub const DEFAULT_DRAW_API: &str = "https://lotto.api.rayriffy.com/latest";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the latest official result comes from.
pub trait DrawSource {
    fn latest(&self) -> Result<DrawResult, EngineError>;
}

#[derive(Debug, Deserialize)]
struct LottoApiResponse {
    #[serde(default)]
    status: Option<String>,
    response: LottoApiDraw,
}

#[derive(Debug, Deserialize)]
struct LottoApiDraw {
    #[serde(default)]
    date: String,
    #[serde(default)]
    prizes: Vec<LottoApiTier>,
    #[serde(default, rename = "runningNumbers")]
    running_numbers: Vec<LottoApiTier>,
}

#[derive(Debug, Deserialize)]
struct LottoApiTier {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    number: Vec<String>,
}

/// Normalizes a results payload. Both the prize list and the running-number
/// list are searched for every tier; unknown tier ids are skipped.
pub fn parse_payload(body: &str) -> Result<DrawResult, EngineError> {
    let payload: LottoApiResponse = serde_json::from_str(body)?;

    if let Some(status) = payload.status.as_deref() {
        if status != "success" {
            return Err(EngineError::DrawFetchFailed(format!(
                "upstream reported status '{}'",
                status
            )));
        }
    }

    let api = payload.response;
    let mut draw = DrawResult::new(api.date);
    for entry in api.prizes.into_iter().chain(api.running_numbers) {
        let Some(tier) = PrizeTier::from_identifier(&entry.id) else {
            log::debug!("Ignoring unknown tier id '{}'", entry.id);
            continue;
        };
        let label = if entry.name.is_empty() {
            tier.label().to_string()
        } else {
            entry.name
        };
        let numbers = entry
            .number
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        draw.push_tier(tier, label, numbers);
    }
    Ok(draw)
}

pub struct HttpDrawSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpDrawSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DrawSource for HttpDrawSource {
    fn latest(&self) -> Result<DrawResult, EngineError> {
        log::debug!("Fetching latest draw from {}", self.url);
        let resp = self.client.get(&self.url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EngineError::DrawFetchFailed(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }
        let body = resp.text()?;
        parse_payload(&body)
    }
}

/// Reads a saved results payload from disk.
pub struct FileDrawSource {
    path: PathBuf,
}

impl FileDrawSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DrawSource for FileDrawSource {
    fn latest(&self) -> Result<DrawResult, EngineError> {
        let body = std::fs::read_to_string(&self.path).map_err(|e| {
            EngineError::DrawFetchFailed(format!("cannot read {:?}: {}", self.path, e))
        })?;
        parse_payload(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    const PAYLOAD: &str = r#"{
        "status": "success",
        "response": {
            "date": "16 ตุลาคม 2568",
            "endpoint": "https://example.invalid/lotto/16102568",
            "prizes": [
                {"id": "prizeFirst", "name": "รางวัลที่ 1", "reward": "6000000", "amount": 1, "number": ["059696"]},
                {"id": "prizeFirstNear", "name": "รางวัลข้างเคียงรางวัลที่ 1", "reward": "100000", "amount": 2, "number": ["059695", "059697"]},
                {"id": "prizeForth", "name": "รางวัลที่ 4", "reward": "40000", "amount": 2, "number": ["111111", "222222"]},
                {"id": "prizeBonus", "name": "?", "number": ["999999"]}
            ],
            "runningNumbers": [
                {"id": "runningNumberFrontThree", "name": "รางวัลเลขหน้า 3 ตัว", "number": ["531", "955"]},
                {"id": "runningNumberBackThree", "name": "รางวัลเลขท้าย 3 ตัว", "number": ["476", "889"]},
                {"id": "runningNumberBackTwo", "name": "รางวัลเลขท้าย 2 ตัว", "number": ["61"]}
            ]
        }
    }"#;

    #[test]
    fn test_parse_full_payload() {
        let draw = parse_payload(PAYLOAD).unwrap();
        assert_eq!(draw.date, "16 ตุลาคม 2568");
        assert_eq!(draw.first_prize(), "059696");
        assert_eq!(draw.numbers(PrizeTier::FirstAdjacent).len(), 2);
        assert_eq!(draw.numbers(PrizeTier::Fourth).len(), 2);
        assert_eq!(draw.numbers(PrizeTier::FrontThree), &["531".to_string(), "955".to_string()]);
        assert_eq!(draw.numbers(PrizeTier::BackTwo), &["61".to_string()]);
        assert_eq!(draw.tiers.len(), 6);
        assert_eq!(draw.tiers[0].label, "รางวัลที่ 1");
    }

    #[test]
    fn test_running_tier_in_prize_list() {
        let body = r#"{"response": {"date": "d", "prizes": [
            {"id": "runningNumberBackTwo", "number": ["07"]}
        ]}}"#;
        let draw = parse_payload(body).unwrap();
        assert_eq!(draw.numbers(PrizeTier::BackTwo), &["07".to_string()]);
        assert_eq!(draw.tiers[0].label, "back two");
    }

    #[test]
    fn test_missing_lists_degrade() {
        let draw = parse_payload(r#"{"status": "success", "response": {"date": "d"}}"#).unwrap();
        assert!(draw.tiers.is_empty());
        assert_eq!(draw.first_prize(), "");
    }

    #[test]
    fn test_malformed_is_parse_error() {
        assert!(matches!(parse_payload("not json"), Err(EngineError::DrawParseFailed(_))));
        assert!(matches!(
            parse_payload(r#"{"status": "success"}"#),
            Err(EngineError::DrawParseFailed(_))
        ));
    }

    #[test]
    fn test_upstream_failure_status() {
        let body = r#"{"status": "crash", "response": {}}"#;
        assert!(matches!(parse_payload(body), Err(EngineError::DrawFetchFailed(_))));
    }

    #[test]
    fn test_file_source_missing_file() {
        let source = FileDrawSource::new("/nonexistent/luckyplus/draw.json");
        assert!(matches!(source.latest(), Err(EngineError::DrawFetchFailed(_))));
    }

    #[test]
    fn test_file_source_reads_payload() {
        let path = std::env::temp_dir().join(format!("luckyplus-draw-{}.json", std::process::id()));
        std::fs::write(&path, PAYLOAD).unwrap();
        let draw = FileDrawSource::new(&path).latest().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(draw.first_prize(), "059696");
    }

    /// Answers a single request on a local port with `response`, or holds the
    /// connection open without answering when `response` is `None`.
    fn serve_once(response: Option<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf);
                match response {
                    Some(body) => {
                        let _ = stream.write_all(body.as_bytes());
                    }
                    None => thread::sleep(Duration::from_secs(3)),
                }
            }
        });
        format!("http://{}/latest", addr)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    #[test]
    fn test_http_source_reads_payload() {
        let url = serve_once(Some(http_response("200 OK", PAYLOAD)));
        let source = HttpDrawSource::new(url.clone(), DEFAULT_FETCH_TIMEOUT).unwrap();
        assert_eq!(source.url(), url);
        let draw = source.latest().unwrap();
        assert_eq!(draw.first_prize(), "059696");
    }

    #[test]
    fn test_http_error_status_is_fetch_failure() {
        let url = serve_once(Some(http_response("503 Service Unavailable", "")));
        let source = HttpDrawSource::new(url, DEFAULT_FETCH_TIMEOUT).unwrap();
        match source.latest() {
            Err(EngineError::DrawFetchFailed(msg)) => assert!(msg.contains("503")),
            other => panic!("expected fetch failure, got {:?}", other),
        }
    }

    #[test]
    fn test_http_timeout_is_fetch_failure() {
        let url = serve_once(None);
        let source = HttpDrawSource::new(url, Duration::from_millis(200)).unwrap();
        assert!(matches!(source.latest(), Err(EngineError::DrawFetchFailed(_))));
    }
}
