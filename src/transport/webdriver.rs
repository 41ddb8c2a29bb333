//! Minimal W3C WebDriver client for driving WhatsApp Web.
//!
//! Talks JSON over HTTP to a running chromedriver/geckodriver. Only the
//! handful of commands the session transport needs are implemented.
//!
//! CHANGELOG:
//! - 10/17/2026 - Optional driver process spawning
//! - 10/16/2026 - Initial implementation

use super::session::{BrowserSession, ElementRef};
use crate::error::SenderError;
use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::{json, Value};
use std::process::{Child, Command};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// WebDriver key code for Enter.
pub const ENTER: &str = "\u{E007}";

/// Default driver URL (chromedriver's default port).
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Errors from the WebDriver endpoint.
#[derive(Error, Debug)]
pub enum WebDriverError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver error '{error}': {message}")]
    Command { error: String, message: String },

    #[error("Malformed WebDriver response: {0}")]
    Malformed(String),

    #[error("Driver process failed: {0}")]
    Driver(String),
}

impl From<WebDriverError> for SenderError {
    fn from(err: WebDriverError) -> Self {
        SenderError::Session(err.to_string())
    }
}

/// Supported browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Firefox,
}

impl FromStr for Browser {
    type Err = SenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            other => Err(SenderError::UnsupportedTransport(format!(
                "browser '{}' (choose 'chrome' or 'firefox')",
                other
            ))),
        }
    }
}

impl Browser {
    /// New-session capabilities with a persistent profile so the QR login survives restarts.
    pub fn capabilities(self) -> Value {
        let always_match = match self {
            Browser::Chrome => json!({
                "browserName": "chrome",
                "goog:chromeOptions": { "args": ["--user-data-dir=chrome-data"] }
            }),
            Browser::Firefox => json!({
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": ["-profile", "firefox-data"] }
            }),
        };
        json!({ "capabilities": { "alwaysMatch": always_match } })
    }
}

/// Unwrap a WebDriver response body (`{"value": ...}`).
pub fn parse_response(success: bool, body: Value) -> Result<Value, WebDriverError> {
    let value = body
        .get("value")
        .cloned()
        .ok_or_else(|| WebDriverError::Malformed(format!("missing 'value' in {}", body)))?;

    if success {
        return Ok(value);
    }

    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Err(WebDriverError::Command { error, message })
}

/// Pull the element id out of a find-element result.
pub fn element_id(value: &Value) -> Result<ElementRef, WebDriverError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementRef(id.to_string()))
        .ok_or_else(|| WebDriverError::Malformed(format!("no element reference in {}", value)))
}

/// A driver executable we started ourselves; killed on drop.
struct DriverProcess {
    child: Child,
}

impl DriverProcess {
    fn spawn(path: &str, port: u16) -> Result<Self, WebDriverError> {
        info!("Starting WebDriver {} on port {}", path, port);
        let child = Command::new(path)
            .arg(format!("--port={}", port))
            .spawn()
            .map_err(|e| WebDriverError::Driver(format!("cannot start {}: {}", path, e)))?;
        Ok(Self { child })
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Connection settings for `WebDriverSession::start`.
#[derive(Debug, Clone)]
pub struct WebDriverOptions {
    pub url: String,
    pub browser: Browser,
    /// Spawn this driver executable before connecting.
    pub driver_path: Option<String>,
    pub request_timeout: Duration,
}

/// A live WebDriver session.
pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: Option<String>,
    _driver: Option<DriverProcess>,
}

impl WebDriverSession {
    /// Connect to (or spawn) a driver and open a browser session.
    pub fn start(options: &WebDriverOptions) -> Result<Self, WebDriverError> {
        info!("Initializing WebDriver for {:?}.", options.browser);
        let client = Client::builder().timeout(options.request_timeout).build()?;
        let base_url = options.url.trim_end_matches('/').to_string();

        let driver = match options.driver_path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => {
                let port = reqwest::Url::parse(&base_url)
                    .ok()
                    .and_then(|u| u.port_or_known_default())
                    .ok_or_else(|| WebDriverError::Driver(format!("no port in {}", base_url)))?;
                let driver = DriverProcess::spawn(path, port)?;
                wait_until_ready(&client, &base_url)?;
                Some(driver)
            }
            None => None,
        };

        let mut session = Self {
            client,
            base_url,
            session_id: None,
            _driver: driver,
        };

        let created = session.command(Method::POST, "/session", Some(options.browser.capabilities()))?;
        let id = created
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Malformed(format!("no sessionId in {}", created)))?;
        debug!("WebDriver session {}", id);
        session.session_id = Some(id.to_string());
        Ok(session)
    }

    fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, WebDriverError> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, &url);
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };

        let response = request.send()?;
        let success = response.status().is_success();
        let body: Value = response.json()?;
        parse_response(success, body)
    }

    fn session_path(&self, suffix: &str) -> Result<String, WebDriverError> {
        let id = self
            .session_id
            .as_deref()
            .ok_or_else(|| WebDriverError::Malformed("session already closed".to_string()))?;
        Ok(format!("/session/{}{}", id, suffix))
    }
}

fn wait_until_ready(client: &Client, base_url: &str) -> Result<(), WebDriverError> {
    const ATTEMPTS: u32 = 40;
    for _ in 0..ATTEMPTS {
        let ready = client
            .get(format!("{}/status", base_url))
            .send()
            .and_then(|r| r.json::<Value>())
            .ok()
            .and_then(|body| body.pointer("/value/ready").and_then(Value::as_bool))
            .unwrap_or(false);
        if ready {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(250));
    }
    Err(WebDriverError::Driver(format!("driver at {} never became ready", base_url)))
}

impl BrowserSession for WebDriverSession {
    fn navigate(&mut self, url: &str) -> Result<(), WebDriverError> {
        let path = self.session_path("/url")?;
        self.command(Method::POST, &path, Some(json!({ "url": url })))?;
        Ok(())
    }

    fn find(&mut self, xpath: &str) -> Result<ElementRef, WebDriverError> {
        let path = self.session_path("/element")?;
        let found = self.command(
            Method::POST,
            &path,
            Some(json!({ "using": "xpath", "value": xpath })),
        )?;
        element_id(&found)
    }

    fn click(&mut self, element: &ElementRef) -> Result<(), WebDriverError> {
        let path = self.session_path(&format!("/element/{}/click", element.0))?;
        self.command(Method::POST, &path, Some(json!({})))?;
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<(), WebDriverError> {
        let path = self.session_path(&format!("/element/{}/value", element.0))?;
        self.command(Method::POST, &path, Some(json!({ "text": text })))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), WebDriverError> {
        if self.session_id.is_none() {
            return Ok(());
        }
        let path = self.session_path("")?;
        self.session_id = None;
        self.command(Method::DELETE, &path, None)?;
        info!("WebDriver session closed.");
        Ok(())
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close WebDriver session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_parse() {
        assert_eq!("chrome".parse::<Browser>().unwrap(), Browser::Chrome);
        assert_eq!("FireFox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert!(matches!(
            "netscape".parse::<Browser>(),
            Err(SenderError::UnsupportedTransport(_))
        ));
    }

    #[test]
    fn test_chrome_capabilities() {
        let caps = Browser::Chrome.capabilities();
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["browserName"], "chrome");
        assert_eq!(always["goog:chromeOptions"]["args"][0], "--user-data-dir=chrome-data");
    }

    #[test]
    fn test_firefox_capabilities() {
        let caps = Browser::Firefox.capabilities();
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["browserName"], "firefox");
        assert_eq!(always["moz:firefoxOptions"]["args"], json!(["-profile", "firefox-data"]));
    }

    #[test]
    fn test_parse_response_success() {
        let value = parse_response(true, json!({ "value": null })).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_parse_response_error() {
        let body = json!({
            "value": { "error": "no such element", "message": "Unable to locate element" }
        });
        match parse_response(false, body) {
            Err(WebDriverError::Command { error, message }) => {
                assert_eq!(error, "no such element");
                assert_eq!(message, "Unable to locate element");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_malformed() {
        assert!(matches!(
            parse_response(true, json!({ "status": 0 })),
            Err(WebDriverError::Malformed(_))
        ));
    }

    #[test]
    fn test_element_id() {
        let mut map = serde_json::Map::new();
        map.insert(ELEMENT_KEY.to_string(), json!("abc-123"));
        let value = Value::Object(map);
        assert_eq!(element_id(&value).unwrap(), ElementRef("abc-123".to_string()));
        assert!(element_id(&json!({})).is_err());
    }
}
