//! Built-in instrument catalog and default date range.
//!
//! The catalog lists the instruments a front end offers for selection: a
//! handful of crypto pairs plus equity indices, volatility, and commodity
//! futures. Ids follow the Yahoo Finance ticker convention.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default history length: five years of calendar days.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 5 * 365;

/// Broad asset class, used for grouping in selection widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Crypto,
    Index,
    Commodity,
}

/// One selectable instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    /// Human-readable name shown to the user
    pub name: &'static str,

    /// Provider ticker
    pub ticker: &'static str,

    pub class: AssetClass,
}

const CATALOG: &[Asset] = &[
    Asset { name: "Bitcoin (BTC)", ticker: "BTC-USD", class: AssetClass::Crypto },
    Asset { name: "Ethereum (ETH)", ticker: "ETH-USD", class: AssetClass::Crypto },
    Asset { name: "Cardano (ADA)", ticker: "ADA-USD", class: AssetClass::Crypto },
    Asset { name: "Solana (SOL)", ticker: "SOL-USD", class: AssetClass::Crypto },
    Asset { name: "Ripple (XRP)", ticker: "XRP-USD", class: AssetClass::Crypto },
    Asset { name: "Dogecoin (DOGE)", ticker: "DOGE-USD", class: AssetClass::Crypto },
    Asset { name: "S&P 500", ticker: "^GSPC", class: AssetClass::Index },
    Asset { name: "Nasdaq Composite", ticker: "^IXIC", class: AssetClass::Index },
    Asset { name: "Volatility Index (VIX)", ticker: "^VIX", class: AssetClass::Index },
    Asset { name: "Gold", ticker: "GC=F", class: AssetClass::Commodity },
    Asset { name: "Crude Oil", ticker: "CL=F", class: AssetClass::Commodity },
];

/// All catalog entries, in display order.
pub fn default_catalog() -> &'static [Asset] {
    CATALOG
}

/// Look an asset up by ticker or display name (case-insensitive).
pub fn find_asset(key: &str) -> Option<&'static Asset> {
    CATALOG
        .iter()
        .find(|a| a.ticker.eq_ignore_ascii_case(key) || a.name.eq_ignore_ascii_case(key))
}

/// `[today − DEFAULT_LOOKBACK_DAYS, today]`.
pub fn default_date_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(DEFAULT_LOOKBACK_DAYS), today)
}
