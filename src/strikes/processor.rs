use super::models::{OptionQuote, OptionSide, RawQuote};
use crate::error::{AnalyzerError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Option chain file as written by the chain/Greeks fetcher
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOptionChain {
    #[serde(default)]
    pub symbol: Option<String>,

    #[serde(default, alias = "underlyingPrice")]
    pub underlying_price: Option<f64>,

    #[serde(default, alias = "expiryDate")]
    pub expiration: Option<String>,

    #[serde(default)]
    pub dte: Option<u32>,

    #[serde(default)]
    pub calls: Vec<RawQuote>,

    #[serde(default)]
    pub puts: Vec<RawQuote>,
}

/// Validated chain for one underlying and one expiration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionChain {
    pub symbol: String,
    pub underlying_price: f64,
    pub expiration: Option<String>,
    pub dte: u32,
    pub calls: Vec<OptionQuote>,
    pub puts: Vec<OptionQuote>,
}

impl OptionChain {
    /// Rows for one side of the chain
    pub fn side(&self, side: OptionSide) -> &[OptionQuote] {
        match side {
            OptionSide::Call => &self.calls,
            OptionSide::Put => &self.puts,
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

/// Days from `today` until an expiration date ("2025-12-19" or "19-Dec-2025")
pub fn calculate_days_to_expiry(expiry_date_str: &str, today: NaiveDate) -> Result<u32> {
    let trimmed = expiry_date_str.trim();
    let expiry_date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d-%b-%Y"))
        .map_err(|e| AnalyzerError::Parse(format!("Failed to parse expiry date '{}': {}", trimmed, e)))?;

    let days_diff = (expiry_date - today).num_days();

    if days_diff < 0 {
        return Err(AnalyzerError::invalid(
            "expiration",
            format!("{} is before {} ({} days)", expiry_date, today, days_diff),
        ));
    }

    Ok(days_diff as u32)
}

/// Parse a chain file.
///
/// Accepts either a chain object (`calls`/`puts` plus chain-level
/// underlying and expiration) or a bare array of rows.
pub fn parse_option_chain(json: &str, today: NaiveDate) -> Result<OptionChain> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let raw = if value.is_array() {
        RawOptionChain::default().with_untagged_rows(serde_json::from_value(value)?)
    } else {
        serde_json::from_value(value)?
    };

    process_option_chain(raw, today)
}

impl RawOptionChain {
    /// Sort untagged rows into calls and puts by their side tag or delta sign
    fn with_untagged_rows(mut self, rows: Vec<RawQuote>) -> Self {
        for row in rows {
            let side = row
                .side
                .as_deref()
                .and_then(|s| s.parse::<OptionSide>().ok())
                .or_else(|| row.delta.map(|d| if d < 0.0 { OptionSide::Put } else { OptionSide::Call }));
            match side {
                Some(OptionSide::Put) => self.puts.push(row),
                _ => self.calls.push(row),
            }
        }
        self
    }
}

/// Validate a raw chain, filling chain-level fields into rows that omit them
pub fn process_option_chain(raw: RawOptionChain, today: NaiveDate) -> Result<OptionChain> {
    let chain_dte = match (raw.dte, raw.expiration.as_deref()) {
        (Some(dte), _) => Some(dte),
        (None, Some(expiry)) => Some(calculate_days_to_expiry(expiry, today)?),
        (None, None) => None,
    };

    let calls = convert_rows(raw.calls, OptionSide::Call, raw.underlying_price, chain_dte)?;
    let puts = convert_rows(raw.puts, OptionSide::Put, raw.underlying_price, chain_dte)?;

    // An empty chain loads as-is; chain-level fields are only required to describe rows
    let (underlying_price, dte) = match calls.first().or_else(|| puts.first()) {
        Some(first) => (
            raw.underlying_price.unwrap_or(first.underlying_price),
            chain_dte.unwrap_or(first.dte),
        ),
        None => (raw.underlying_price.unwrap_or(0.0), chain_dte.unwrap_or(0)),
    };

    verify_uniform(&calls, underlying_price, dte)?;
    verify_uniform(&puts, underlying_price, dte)?;

    let symbol = raw.symbol.unwrap_or_else(|| "UNKNOWN".to_string());
    debug!(
        symbol = %symbol,
        calls = calls.len(),
        puts = puts.len(),
        dte,
        "option chain loaded"
    );

    Ok(OptionChain {
        symbol,
        underlying_price,
        expiration: raw.expiration,
        dte,
        calls,
        puts,
    })
}

/// Convert raw rows of one side, tagging them with that side
pub fn convert_rows(
    rows: Vec<RawQuote>,
    side: OptionSide,
    underlying_price: Option<f64>,
    dte: Option<u32>,
) -> Result<Vec<OptionQuote>> {
    rows.into_iter()
        .map(|mut row| {
            row.underlying_price = row.underlying_price.or(underlying_price);
            row.dte = row.dte.or(dte);
            let mut quote = OptionQuote::try_from(row)?;
            if let Some(tag) = quote.side {
                if tag != side {
                    warn!(strike = quote.strike, %tag, %side, "row filed under the wrong side");
                }
            }
            quote.side = Some(side);
            Ok(quote)
        })
        .collect()
}

/// All rows of one chain must share dte and underlying price
pub fn verify_uniform(quotes: &[OptionQuote], underlying_price: f64, dte: u32) -> Result<()> {
    for quote in quotes {
        if quote.dte != dte {
            return Err(AnalyzerError::ChainMismatch(format!(
                "strike {} has dte {} but the chain has {}",
                quote.strike, quote.dte, dte
            )));
        }
        if (quote.underlying_price - underlying_price).abs() > f64::EPSILON * underlying_price.max(1.0) {
            return Err(AnalyzerError::ChainMismatch(format!(
                "strike {} has underlying {} but the chain has {}",
                quote.strike, quote.underlying_price, underlying_price
            )));
        }
    }
    Ok(())
}

/// Annualized premium yield for a strike sold on `side`.
/// Puts yield on the strike (cash secured), calls on the underlying (shares held).
pub fn annualized_yield(quote: &OptionQuote, side: OptionSide, underlying_price: f64, dte: u32) -> f64 {
    if dte == 0 {
        return 0.0;
    }
    let capital = match side {
        OptionSide::Put => quote.strike,
        OptionSide::Call => underlying_price,
    };
    if capital <= 0.0 {
        return 0.0;
    }
    (quote.mid_price / capital) * (crate::config::DAYS_PER_YEAR / dte as f64)
}

/// Underlying price at which the short option stops being profitable
pub fn breakeven(quote: &OptionQuote, side: OptionSide, underlying_price: f64) -> f64 {
    match side {
        OptionSide::Put => quote.strike - quote.mid_price,
        OptionSide::Call => underlying_price + quote.mid_price,
    }
}

/// Out-of-the-money rows of the requested side
pub fn otm_rows(table: &[OptionQuote], side: OptionSide, underlying_price: f64) -> Vec<&OptionQuote> {
    table
        .iter()
        .filter(|q| q.matches_side(side) && side.is_otm(q.strike, underlying_price))
        .collect()
}
