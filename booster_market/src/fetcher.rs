//! Order-book requests, one per listing.
//!
//! A request that does not come back with status 200, or whose payload cannot be read,
//! yields `Quote::Unavailable`. A payload with only one side of the book keeps that side.
//! Only a failure to persist a rotated session cookie is reported as an error.
use std::time::Duration;

use booster_common::net::{ORDER_BOOK_URL, order_book_params};
use booster_common::{BoosterError, PriceLevel, Quote, Result};
use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use serde_json::Value;

use crate::credentials::{CookieJar, CredentialStore};

const USER_AGENT: &str = concat!("booster-scanner/", env!("CARGO_PKG_VERSION"));

/// Default timeout of one order-book request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Provides the current quote of a listing.
pub trait OrderBookSource {
    /// Fetches the order book of `listing_hash`, identified on the market by `market_identifier`.
    fn fetch(&mut self, listing_hash: &str, market_identifier: u64) -> Result<Quote>;
}

/// Best order of `graph` (`buy_order_graph` or `sell_order_graph`).
///
/// Each graph entry is `[price, volume, label]`; the first entry is the best order.
fn best_level(payload: &Value, graph: &str) -> Option<PriceLevel> {
    let entry = payload.get(graph)?.as_array()?.first()?.as_array()?;
    let price = entry.first()?.as_f64()?;
    let volume = entry.get(1)?;
    let volume = volume.as_i64().or_else(|| volume.as_f64().map(|v| v as i64))?;
    Some(PriceLevel::new(price, volume))
}

/// Reads the best bid and ask out of an order-book payload.
pub fn parse_order_book(payload: &Value) -> Quote {
    let bid = best_level(payload, "buy_order_graph");
    let ask = best_level(payload, "sell_order_graph");
    Quote::from_sides(bid, ask, true)
}

/// HTTP fetcher for the order-book endpoint.
pub struct OrderBookFetcher<C: CredentialStore> {
    http: Client,
    url: String,
    credentials: C,
    cookies: CookieJar,
}

impl<C: CredentialStore> OrderBookFetcher<C> {
    /// Creates a fetcher for the market endpoint with the given request timeout.
    pub fn new(credentials: C, timeout: Duration) -> Result<Self> {
        Self::with_url(ORDER_BOOK_URL, credentials, timeout)
    }

    /// Creates a fetcher for an arbitrary endpoint URL.
    pub fn with_url(url: &str, credentials: C, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| BoosterError::Transport(e.to_string()))?;
        let cookies = credentials.cookies();
        Ok(Self {
            http,
            url: String::from(url),
            credentials,
            cookies,
        })
    }

    /// Whether requests are sent with session cookies.
    pub fn is_authenticated(&self) -> bool {
        !self.cookies.is_empty()
    }

    /// Credential store receiving rotated cookies.
    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn send(&self, market_identifier: u64) -> reqwest::Result<Response> {
        let mut request = self
            .http
            .get(&self.url)
            .query(&order_book_params(market_identifier));
        if self.is_authenticated() {
            request = request.header(COOKIE, self.cookie_header());
        }
        request.send()
    }
}

impl<C: CredentialStore> OrderBookSource for OrderBookFetcher<C> {
    fn fetch(&mut self, listing_hash: &str, market_identifier: u64) -> Result<Quote> {
        let response = match self.send(market_identifier) {
            Ok(response) => response,
            Err(e) => {
                warn!("Order book request failed for {}: {}", listing_hash, e);
                return Ok(Quote::unavailable(true));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Order book request for {} returned {}", listing_hash, status);
            return Ok(Quote::unavailable(true));
        }

        if self.is_authenticated() {
            let rotated: CookieJar = response
                .cookies()
                .map(|c| (c.name().to_string(), c.value().to_string()))
                .collect();
            self.cookies = self.credentials.persist_if_changed(&self.cookies, &rotated)?;
        }

        let quote = match response.json::<Value>() {
            Ok(payload) => parse_order_book(&payload),
            Err(e) => {
                warn!("Malformed order book for {}: {}", listing_hash, e);
                Quote::unavailable(true)
            }
        };

        debug!(
            "Listing: {} ; item id: {} ; ask: {:?} ; bid: {:?}",
            listing_hash,
            market_identifier,
            quote.ask(),
            quote.bid()
        );
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::merge_cookies;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    #[derive(Default)]
    struct MemoryCookies {
        jar: CookieJar,
        writes: Vec<CookieJar>,
    }

    impl MemoryCookies {
        fn with(name: &str, value: &str) -> Self {
            let mut jar = CookieJar::new();
            jar.insert(String::from(name), String::from(value));
            Self {
                jar,
                writes: Vec::new(),
            }
        }
    }

    impl CredentialStore for MemoryCookies {
        fn cookies(&self) -> CookieJar {
            self.jar.clone()
        }

        fn persist_if_changed(&mut self, old: &CookieJar, new: &CookieJar) -> Result<CookieJar> {
            let (merged, changed) = merge_cookies(old, new);
            if changed {
                self.writes.push(merged.clone());
                self.jar = merged.clone();
            }
            Ok(merged)
        }
    }

    fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
            status,
            body.len(),
            extra_headers,
            body
        )
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let size = stream.read(&mut chunk).unwrap();
            if size == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..size]);
        }
        String::from_utf8_lossy(&request).to_lowercase()
    }

    /// Serves `responses` one connection at a time and returns the lowercased requests.
    fn serve(responses: Vec<String>) -> (String, thread::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!(
            "http://{}/market/itemordershistogram",
            listener.local_addr().unwrap()
        );
        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().unwrap();
                requests.push(read_request(&mut stream));
                stream.write_all(response.as_bytes()).unwrap();
            }
            requests
        });
        (url, handle)
    }

    #[test]
    fn rotated_cookie_is_saved_and_sent_next() {
        let (url, server) = serve(vec![
            http_response(
                "200 OK",
                "Set-Cookie: steamLoginSecure=rotated; Path=/\r\n",
                r#"{"success": 1, "buy_order_graph": [[0.4, 3, ""]], "sell_order_graph": []}"#,
            ),
            http_response("500 Internal Server Error", "", ""),
            http_response("200 OK", "", ""),
        ]);
        let credentials = MemoryCookies::with("steamLoginSecure", "initial");
        let mut fetcher =
            OrderBookFetcher::with_url(&url, credentials, Duration::from_secs(5)).unwrap();

        let first = fetcher.fetch("290970-1849 Booster Pack", 175880240).unwrap();
        let second = fetcher.fetch("290970-1849 Booster Pack", 175880240).unwrap();
        let third = fetcher.fetch("290970-1849 Booster Pack", 175880240).unwrap();

        assert_eq!(first.bid(), Some(PriceLevel::new(0.4, 3)));
        assert_eq!(first.ask(), None);
        assert_eq!(second, Quote::unavailable(true));
        assert_eq!(third, Quote::unavailable(true));

        let writes = &fetcher.credentials().writes;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0]["steamLoginSecure"], "rotated");

        let requests = server.join().unwrap();
        assert!(requests[0].contains("item_nameid=175880240"));
        assert!(requests[0].contains("currency=3"));
        assert!(requests[0].contains("cookie: steamloginsecure=initial"));
        assert!(requests[1].contains("cookie: steamloginsecure=rotated"));
        assert!(requests[2].contains("cookie: steamloginsecure=rotated"));
    }

    #[test]
    fn anonymous_session_sends_no_cookie() {
        let (url, server) = serve(vec![http_response(
            "200 OK",
            "Set-Cookie: sessionid=abc; Path=/\r\n",
            r#"{"buy_order_graph": [], "sell_order_graph": [[1.05, 1, ""]]}"#,
        )]);
        let mut fetcher =
            OrderBookFetcher::with_url(&url, MemoryCookies::default(), Duration::from_secs(5))
                .unwrap();
        assert!(!fetcher.is_authenticated());

        let quote = fetcher.fetch("730-CS Booster Pack", 12345).unwrap();

        assert_eq!(quote.ask(), Some(PriceLevel::new(1.05, 1)));
        assert!(fetcher.credentials().writes.is_empty());
        let requests = server.join().unwrap();
        assert!(!requests[0].contains("cookie:"));
    }

    #[test]
    fn refused_connection_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let mut fetcher =
            OrderBookFetcher::with_url(&url, MemoryCookies::default(), Duration::from_secs(5))
                .unwrap();
        let quote = fetcher.fetch("730-CS Booster Pack", 12345).unwrap();
        assert_eq!(quote, Quote::unavailable(true));
    }

    #[test]
    fn timeout_is_unavailable() {
        // Bound but never answered: the connection sits in the backlog.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());

        let mut fetcher =
            OrderBookFetcher::with_url(&url, MemoryCookies::default(), Duration::from_millis(200))
                .unwrap();
        let quote = fetcher.fetch("730-CS Booster Pack", 12345).unwrap();
        assert_eq!(quote, Quote::unavailable(true));
        drop(listener);
    }

    #[test]
    fn reads_best_bid_and_ask() {
        let payload = json!({
            "success": 1,
            "buy_order_graph": [[0.41, 12, "12 buy orders at 0,41€ or higher"], [0.40, 30, ""]],
            "sell_order_graph": [[0.47, 3, "3 sell orders at 0,47€ or lower"], [0.50, 9, ""]]
        });
        let quote = parse_order_book(&payload);
        assert_eq!(quote.bid(), Some(PriceLevel::new(0.41, 12)));
        assert_eq!(quote.ask(), Some(PriceLevel::new(0.47, 3)));
    }

    #[test]
    fn empty_buy_graph_keeps_ask() {
        let payload = json!({
            "buy_order_graph": [],
            "sell_order_graph": [[1.05, 1, ""]]
        });
        let quote = parse_order_book(&payload);
        assert_eq!(quote.bid(), None);
        assert_eq!(quote.ask(), Some(PriceLevel::new(1.05, 1)));
    }

    #[test]
    fn missing_graphs_are_unavailable() {
        let quote = parse_order_book(&json!({"success": 16}));
        assert_eq!(quote, Quote::unavailable(true));

        let record = serde_json::to_value(&quote).unwrap();
        assert_eq!(record["bid"], json!(-1.0));
        assert_eq!(record["ask"], json!(-1.0));
        assert_eq!(record["bid_volume"], json!(-1));
        assert_eq!(record["ask_volume"], json!(-1));
    }

    #[test]
    fn malformed_entries_are_ignored() {
        let payload = json!({
            "buy_order_graph": [["n/a", 3]],
            "sell_order_graph": "oops"
        });
        assert_eq!(parse_order_book(&payload), Quote::unavailable(true));
    }
}
