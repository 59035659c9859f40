// src/news/coins.rs
//! Known ticker symbols and the alias table used to derive related coins.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap, HashSet};

static KNOWN_SYMBOLS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "BTC", "ETH", "SOL", "XRP", "ADA", "DOGE", "DOT", "BNB", "AVAX", "MATIC", "LINK",
        "LTC", "TRX", "ATOM", "UNI", "SHIB", "XLM", "TON", "USDT", "USDC", "NEAR", "APT",
        "ARB", "OP", "FIL", "ETC", "BCH", "XMR", "ALGO", "HBAR",
    ]
    .into_iter()
    .collect()
});

/// Full names → ticker. Keys are upper-case.
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("BITCOIN", "BTC"),
        ("ETHEREUM", "ETH"),
        ("ETHER", "ETH"),
        ("SOLANA", "SOL"),
        ("RIPPLE", "XRP"),
        ("CARDANO", "ADA"),
        ("DOGECOIN", "DOGE"),
        ("POLKADOT", "DOT"),
        ("BINANCE COIN", "BNB"),
        ("AVALANCHE", "AVAX"),
        ("POLYGON", "MATIC"),
        ("CHAINLINK", "LINK"),
        ("LITECOIN", "LTC"),
        ("TRON", "TRX"),
        ("COSMOS", "ATOM"),
        ("UNISWAP", "UNI"),
        ("SHIBA INU", "SHIB"),
        ("STELLAR", "XLM"),
        ("TONCOIN", "TON"),
        ("TETHER", "USDT"),
        ("USD COIN", "USDC"),
        ("ARBITRUM", "ARB"),
        ("OPTIMISM", "OP"),
        ("FILECOIN", "FIL"),
        ("ETHEREUM CLASSIC", "ETC"),
        ("BITCOIN CASH", "BCH"),
        ("MONERO", "XMR"),
        ("ALGORAND", "ALGO"),
        ("HEDERA", "HBAR"),
    ]
    .into_iter()
    .collect()
});

/// Upper-case the token, resolve aliases, and keep it only if it is a known symbol.
pub fn canonical_symbol(token: &str) -> Option<&'static str> {
    let up = token.trim().to_ascii_uppercase();
    ALIASES
        .get(up.as_str())
        .or_else(|| KNOWN_SYMBOLS.get(up.as_str()))
        .copied()
}

/// Alias-resolved, upper-cased symbol for a caller-supplied coin, known or not.
pub fn normalize_symbol(input: &str) -> String {
    canonical_symbol(input)
        .map(str::to_string)
        .unwrap_or_else(|| input.trim().to_ascii_uppercase())
}

pub fn related_coins<'a, I>(tokens: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .filter_map(canonical_symbol)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_tickers() {
        assert_eq!(canonical_symbol("Bitcoin"), Some("BTC"));
        assert_eq!(canonical_symbol("ethereum"), Some("ETH"));
        assert_eq!(canonical_symbol("btc"), Some("BTC"));
        assert_eq!(canonical_symbol("Market"), None);
        assert_eq!(canonical_symbol(""), None);
    }

    #[test]
    fn related_coins_dedup() {
        let got = related_coins(["BTC", "Bitcoin", "ETH", "Regulation", "ethereum"]);
        let want: BTreeSet<String> = ["BTC", "ETH"].iter().map(|s| s.to_string()).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn normalize_symbol_keeps_unknown_tickers() {
        assert_eq!(normalize_symbol(" solana "), "SOL");
        assert_eq!(normalize_symbol("pepe"), "PEPE");
    }
}
