//! Market endpoint and fixed locale constants.
//!
//! The locale is not user-configurable: every order-book query is issued for the
//! same country, language and currency so that cached quotes stay comparable.

/// Order-book histogram endpoint.
pub const ORDER_BOOK_URL: &str = "https://steamcommunity.com/market/itemordershistogram";
/// Country code sent with each query.
pub const COUNTRY: &str = "FR";
/// Language sent with each query.
pub const LANGUAGE: &str = "english";
/// Currency code (3 = EUR).
pub const CURRENCY: &str = "3";
/// Anti-replay flag expected by the endpoint.
pub const TWO_FACTOR: &str = "0";

/// Query parameters for the order book of `item_nameid`.
pub fn order_book_params(item_nameid: u64) -> [(&'static str, String); 5] {
    [
        ("country", String::from(COUNTRY)),
        ("language", String::from(LANGUAGE)),
        ("currency", String::from(CURRENCY)),
        ("item_nameid", item_nameid.to_string()),
        ("two_factor", String::from(TWO_FACTOR)),
    ]
}
