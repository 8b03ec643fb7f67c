use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

impl OptionSide {
    /// Out-of-the-money test for a strike against the underlying
    pub fn is_otm(&self, strike: f64, underlying_price: f64) -> bool {
        match self {
            OptionSide::Call => strike > underlying_price,
            OptionSide::Put => strike < underlying_price,
        }
    }

    /// Income strategy sold on this side
    pub fn strategy(&self) -> &'static str {
        match self {
            OptionSide::Call => "covered call",
            OptionSide::Put => "cash-secured put",
        }
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptionSide::Call => write!(f, "call"),
            OptionSide::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionSide {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "calls" | "c" | "ce" => Ok(OptionSide::Call),
            "put" | "puts" | "p" | "pe" => Ok(OptionSide::Put),
            _ => Err(AnalyzerError::InvalidSide(s.to_string())),
        }
    }
}

/// Option row as it arrives from the chain/Greeks collaborator.
/// Every field is optional here; `OptionQuote::try_from` enforces the contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuote {
    #[serde(default, alias = "contractSymbol")]
    pub contract_symbol: Option<String>,

    #[serde(default, alias = "strikePrice")]
    pub strike: Option<f64>,

    #[serde(default)]
    pub bid: Option<f64>,

    #[serde(default)]
    pub ask: Option<f64>,

    #[serde(default)]
    pub delta: Option<f64>,

    #[serde(default, alias = "impliedVolatility")]
    pub implied_volatility: Option<f64>,

    #[serde(default)]
    pub theta: Option<f64>,

    #[serde(default)]
    pub dte: Option<u32>,

    #[serde(default, alias = "underlyingPrice")]
    pub underlying_price: Option<f64>,

    #[serde(default, alias = "spreadPct")]
    pub spread_pct: Option<f64>,

    #[serde(default)]
    pub volume: Option<f64>,

    #[serde(default, alias = "openInterest")]
    pub open_interest: Option<f64>,

    #[serde(default, alias = "optionType", alias = "type")]
    pub side: Option<String>,
}

/// Validated option row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionQuote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_symbol: Option<String>,
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    pub mid_price: f64,
    pub delta: f64,
    pub implied_volatility: Option<f64>,
    pub theta: Option<f64>,
    pub dte: u32,
    pub underlying_price: f64,
    pub spread_pct: Option<f64>,
    pub volume: Option<f64>,
    pub open_interest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<OptionSide>,
}

impl OptionQuote {
    /// Build a row from the required fields; mid and spread are derived
    pub fn new(strike: f64, bid: f64, ask: f64, delta: f64, dte: u32, underlying_price: f64) -> Self {
        let mid_price = mid_price(bid, ask);
        Self {
            contract_symbol: None,
            strike,
            bid,
            ask,
            mid_price,
            delta,
            implied_volatility: None,
            theta: None,
            dte,
            underlying_price,
            spread_pct: spread_pct(bid, ask),
            volume: None,
            open_interest: None,
            side: None,
        }
    }

    pub fn with_side(mut self, side: OptionSide) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_greeks(mut self, implied_volatility: Option<f64>, theta: Option<f64>) -> Self {
        self.implied_volatility = implied_volatility;
        self.theta = theta;
        self
    }

    pub fn abs_delta(&self) -> f64 {
        self.delta.abs()
    }

    /// Rows without a side tag belong to whichever side is being processed
    pub fn matches_side(&self, side: OptionSide) -> bool {
        self.side.is_none_or(|s| s == side)
    }
}

impl TryFrom<RawQuote> for OptionQuote {
    type Error = AnalyzerError;

    fn try_from(raw: RawQuote) -> Result<Self> {
        let strike = raw.strike.ok_or_else(|| AnalyzerError::missing("strike"))?;
        let bid = raw.bid.ok_or_else(|| AnalyzerError::missing("bid"))?;
        let ask = raw.ask.ok_or_else(|| AnalyzerError::missing("ask"))?;
        let delta = raw.delta.ok_or_else(|| AnalyzerError::missing("delta"))?;
        let dte = raw.dte.ok_or_else(|| AnalyzerError::missing("dte"))?;
        let underlying_price = raw
            .underlying_price
            .ok_or_else(|| AnalyzerError::missing("underlying_price"))?;

        if !(strike.is_finite() && strike > 0.0) {
            return Err(AnalyzerError::invalid("strike", format!("{} is not a positive price", strike)));
        }
        if !(underlying_price.is_finite() && underlying_price > 0.0) {
            return Err(AnalyzerError::invalid(
                "underlying_price",
                format!("{} is not a positive price", underlying_price),
            ));
        }
        if !(bid.is_finite() && ask.is_finite()) || bid < 0.0 || bid > ask {
            return Err(AnalyzerError::invalid("bid", format!("bid {} / ask {} is not a valid market", bid, ask)));
        }
        if !(-1.0..=1.0).contains(&delta) {
            return Err(AnalyzerError::invalid("delta", format!("{} is outside [-1, 1]", delta)));
        }
        if let Some(iv) = raw.implied_volatility {
            if iv < 0.0 {
                return Err(AnalyzerError::invalid("implied_volatility", format!("{} is negative", iv)));
            }
        }
        if let Some(spread) = raw.spread_pct {
            if spread < 0.0 {
                return Err(AnalyzerError::invalid("spread_pct", format!("{} is negative", spread)));
            }
        }

        let side = raw.side.as_deref().map(OptionSide::from_str).transpose()?;

        Ok(OptionQuote {
            contract_symbol: raw.contract_symbol,
            strike,
            bid,
            ask,
            mid_price: mid_price(bid, ask),
            delta,
            implied_volatility: raw.implied_volatility,
            theta: raw.theta,
            dte,
            underlying_price,
            spread_pct: raw.spread_pct.or_else(|| spread_pct(bid, ask)),
            volume: raw.volume,
            open_interest: raw.open_interest,
            side,
        })
    }
}

/// Filter thresholds for `filter_by_delta`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeltaCriteria {
    pub min_delta: f64,
    pub max_delta: f64,
    pub min_premium: f64,
    pub min_volume: f64,
    pub max_spread_pct: f64,
}

impl Default for DeltaCriteria {
    fn default() -> Self {
        use crate::config;
        Self {
            min_delta: config::DEFAULT_MIN_DELTA,
            max_delta: config::DEFAULT_MAX_DELTA,
            min_premium: config::DEFAULT_MIN_PREMIUM,
            min_volume: config::DEFAULT_MIN_VOLUME,
            max_spread_pct: config::DEFAULT_MAX_SPREAD_PCT,
        }
    }
}

impl DeltaCriteria {
    pub fn window(min_delta: f64, max_delta: f64) -> Self {
        Self {
            min_delta,
            max_delta,
            ..Self::default()
        }
    }

    /// Delta the filter steers towards
    pub fn target_delta(&self) -> f64 {
        (self.min_delta + self.max_delta) / 2.0
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_delta) || !(0.0..=1.0).contains(&self.max_delta) {
            return Err(AnalyzerError::InvalidCriteria(format!(
                "delta bounds [{}, {}] must lie within [0, 1]",
                self.min_delta, self.max_delta
            )));
        }
        if self.min_delta > self.max_delta {
            return Err(AnalyzerError::InvalidCriteria(format!(
                "min_delta {} exceeds max_delta {}",
                self.min_delta, self.max_delta
            )));
        }
        if !(self.min_premium >= 0.0 && self.min_volume >= 0.0) {
            return Err(AnalyzerError::InvalidCriteria(
                "min_premium and min_volume must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.max_spread_pct) {
            return Err(AnalyzerError::InvalidCriteria(format!(
                "max_spread_pct {} must lie within [0, 1]",
                self.max_spread_pct
            )));
        }
        Ok(())
    }
}

/// Recommended strike with its income metrics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimalStrike {
    pub side: OptionSide,
    pub quote: OptionQuote,
    pub underlying_price: f64,
    pub implied_volatility: f64,
    pub theta: f64,
    pub assignment_probability: f64,
    pub annual_return: f64,
    pub return_over_risk_free: f64,
    pub breakeven: f64,
    pub premium_per_contract: f64,
    pub reason: String,
}

/// One row of the income ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedStrike {
    #[serde(flatten)]
    pub quote: OptionQuote,
    pub annual_yield: f64,
    pub yield_score: f64,
    pub delta_score: f64,
    pub spread_score: f64,
    pub income_score: f64,
}

pub fn mid_price(bid: f64, ask: f64) -> f64 {
    (bid + ask) / 2.0
}

/// Relative bid/ask spread; undefined for a zero mid
pub fn spread_pct(bid: f64, ask: f64) -> Option<f64> {
    let mid = mid_price(bid, ask);
    if mid > 0.0 { Some((ask - bid) / mid) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parsing() {
        assert_eq!("PUT".parse::<OptionSide>().unwrap(), OptionSide::Put);
        assert_eq!(" calls ".parse::<OptionSide>().unwrap(), OptionSide::Call);
        assert_eq!("CE".parse::<OptionSide>().unwrap(), OptionSide::Call);
        assert_eq!(
            "straddle".parse::<OptionSide>(),
            Err(AnalyzerError::InvalidSide("straddle".to_string()))
        );
    }

    #[test]
    fn test_new_derives_mid_and_spread() {
        let quote = OptionQuote::new(95.0, 1.90, 2.10, -0.30, 30, 100.0);
        assert!((quote.mid_price - 2.0).abs() < 1e-12);
        assert!((quote.spread_pct.unwrap() - 0.1).abs() < 1e-12);

        let worthless = OptionQuote::new(50.0, 0.0, 0.0, -0.01, 30, 100.0);
        assert_eq!(worthless.spread_pct, None);
    }

    #[test]
    fn test_raw_quote_missing_required_field() {
        let raw = RawQuote {
            strike: Some(95.0),
            bid: Some(1.9),
            ask: Some(2.1),
            dte: Some(30),
            underlying_price: Some(100.0),
            ..RawQuote::default()
        };
        assert_eq!(OptionQuote::try_from(raw), Err(AnalyzerError::missing("delta")));
    }

    #[test]
    fn test_raw_quote_rejects_crossed_market() {
        let raw = RawQuote {
            strike: Some(95.0),
            bid: Some(2.5),
            ask: Some(2.1),
            delta: Some(-0.3),
            dte: Some(30),
            underlying_price: Some(100.0),
            ..RawQuote::default()
        };
        assert!(matches!(
            OptionQuote::try_from(raw),
            Err(AnalyzerError::InvalidField { ref field, .. }) if field == "bid"
        ));
    }

    #[test]
    fn test_raw_quote_camel_case_fields() {
        let raw: RawQuote = serde_json::from_str(
            r#"{"strike": 95, "bid": 1.9, "ask": 2.1, "delta": -0.3, "dte": 30,
                "underlyingPrice": 100, "impliedVolatility": 0.22, "optionType": "put"}"#,
        )
        .unwrap();
        let quote = OptionQuote::try_from(raw).unwrap();
        assert_eq!(quote.implied_volatility, Some(0.22));
        assert_eq!(quote.side, Some(OptionSide::Put));
        assert!(quote.matches_side(OptionSide::Put));
        assert!(!quote.matches_side(OptionSide::Call));
    }

    #[test]
    fn test_criteria_validation() {
        assert!(DeltaCriteria::default().validate().is_ok());
        assert!(DeltaCriteria::window(0.4, 0.2).validate().is_err());
        assert!(DeltaCriteria::window(0.1, 1.2).validate().is_err());

        let mut criteria = DeltaCriteria::window(0.1, 0.3);
        criteria.max_spread_pct = 1.5;
        assert!(matches!(criteria.validate(), Err(AnalyzerError::InvalidCriteria(_))));
    }

    #[test]
    fn test_criteria_rejects_nan_thresholds() {
        let mut criteria = DeltaCriteria::default();
        criteria.min_premium = f64::NAN;
        assert!(matches!(criteria.validate(), Err(AnalyzerError::InvalidCriteria(_))));

        let mut criteria = DeltaCriteria::default();
        criteria.min_volume = f64::NAN;
        assert!(criteria.validate().is_err());
    }
}
