pub mod income;
pub mod invoice;

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// Money in kopecks. Serialized as a decimal string with two fraction
/// digits (`"1500.00"`); deserialized from either a string or a number.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub fn from_kopecks(kopecks: i64) -> Self {
        Self(kopecks)
    }

    /// Saturates at the `i64` kopeck range; see [`Amount::checked_from_rubles`].
    pub fn from_rubles(rubles: i64) -> Self {
        Self(rubles.saturating_mul(100))
    }

    pub fn checked_from_rubles(rubles: i64) -> Option<Self> {
        rubles.checked_mul(100).map(Self)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(rhs)).map(Self)
    }

    pub fn kopecks(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Mul<u32> for Amount {
    type Output = Self;
    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0.saturating_mul(i64::from(rhs)))
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self(0), |acc, x| acc + x)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountParseError(String);

impl Display for AmountParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid amount '{}': expected rubles with up to two decimal places",
            self.0
        )
    }
}

impl std::error::Error for AmountParseError {}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AmountParseError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (rubles, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if rubles.is_empty()
            || fraction.len() > 2
            || !rubles.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err());
        }

        let rubles: i64 = rubles.parse().map_err(|_| err())?;
        let kopecks: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| err())? * 10,
            _ => fraction.parse().map_err(|_| err())?,
        };
        let total = rubles
            .checked_mul(100)
            .and_then(|r| r.checked_add(kopecks))
            .ok_or_else(err)?;

        Ok(Self(if negative { -total } else { total }))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        let out_of_range = || <D::Error as serde::de::Error>::custom("amount out of range");
        match Raw::deserialize(deserializer)? {
            Raw::Int(rubles) => Self::checked_from_rubles(rubles).ok_or_else(out_of_range),
            Raw::Float(rubles) => {
                let kopecks = (rubles * 100.0).round();
                // i64::MAX is not representable as f64; its nearest value is 2^63.
                if kopecks.is_finite() && kopecks >= i64::MIN as f64 && kopecks < i64::MAX as f64 {
                    Ok(Self(kopecks as i64))
                } else {
                    Err(out_of_range())
                }
            }
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// One line of a receipt or invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    /// Price of a single unit.
    pub amount: Amount,
    pub quantity: u32,
}

impl Service {
    pub fn new(name: impl Into<String>, amount: Amount) -> Self {
        Self {
            name: name.into(),
            amount,
            quantity: 1,
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn total(&self) -> Amount {
        self.amount * self.quantity
    }
}

pub fn total_amount(services: &[Service]) -> Amount {
    services.iter().map(Service::total).sum()
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientType {
    #[default]
    #[serde(rename = "FROM_INDIVIDUAL")]
    Individual,
    #[serde(rename = "FROM_LEGAL_ENTITY")]
    LegalEntity,
    #[serde(rename = "FROM_FOREIGN_AGENCY")]
    ForeignAgency,
}

/// Counterparty of an income or invoice.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub client_type: ClientType,
    pub inn: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ClientInfo {
    pub fn individual() -> Self {
        Self::default()
    }

    pub fn legal_entity(inn: impl Into<String>) -> Self {
        Self {
            client_type: ClientType::LegalEntity,
            inn: Some(inn.into()),
            ..Self::default()
        }
    }

    pub fn foreign_agency(name: impl Into<String>) -> Self {
        Self {
            client_type: ClientType::ForeignAgency,
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Timestamps sent to the server: RFC 3339, whole seconds, local offset.
pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

pub(crate) fn serialize_timestamp<S>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_display() {
        assert_eq!(Amount::from_kopecks(150_050).to_string(), "1500.50");
        assert_eq!(Amount::from_kopecks(7).to_string(), "0.07");
        assert_eq!(Amount::from_kopecks(-250).to_string(), "-2.50");
    }

    #[test]
    fn amount_parse() {
        assert_eq!("1500".parse::<Amount>(), Ok(Amount::from_rubles(1500)));
        assert_eq!("1500.5".parse::<Amount>(), Ok(Amount::from_kopecks(150_050)));
        assert_eq!("0.07".parse::<Amount>(), Ok(Amount::from_kopecks(7)));
        assert!("1.005".parse::<Amount>().is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert!(".5".parse::<Amount>().is_err());
    }

    #[test]
    fn amount_deserializes_numbers_and_strings() {
        let amounts: Vec<Amount> = serde_json::from_str(r#"[100, 99.99, "12.30"]"#).unwrap();
        assert_eq!(
            amounts,
            vec![
                Amount::from_rubles(100),
                Amount::from_kopecks(9999),
                Amount::from_kopecks(1230)
            ]
        );
        assert_eq!(
            serde_json::to_string(&Amount::from_kopecks(1230)).unwrap(),
            r#""12.30""#
        );
    }

    #[test]
    fn amount_rejects_out_of_range_numbers() {
        assert!(serde_json::from_str::<Amount>("92233720368547759").is_err());
        assert!(serde_json::from_str::<Amount>("1e30").is_err());
        assert!(serde_json::from_str::<Amount>(r#""92233720368547758.08""#).is_err());
        assert_eq!(
            serde_json::from_str::<Amount>("92233720368547758").ok(),
            Amount::checked_from_rubles(92_233_720_368_547_758)
        );
    }

    #[test]
    fn amount_arithmetic_does_not_overflow() {
        let max = Amount::from_kopecks(i64::MAX);
        assert_eq!(max + Amount::from_kopecks(1), max);
        assert_eq!(max * 2, max);
        assert_eq!(Amount::from_rubles(i64::MAX), max);
        assert_eq!(max.checked_add(Amount::from_kopecks(1)), None);
        assert_eq!(max.checked_mul(2), None);
        assert_eq!(
            Amount::from_rubles(2).checked_mul(3),
            Some(Amount::from_rubles(6))
        );
    }

    #[test]
    fn service_totals() {
        let services = vec![
            Service::new("Consulting", Amount::from_rubles(1000)).quantity(2),
            Service::new("Travel", Amount::from_kopecks(50_050)),
        ];
        assert_eq!(total_amount(&services), Amount::from_kopecks(250_050));
    }

    #[test]
    fn timestamp_has_seconds_precision_and_offset() {
        let ts = DateTime::parse_from_rfc3339("2024-05-04T19:31:46.123+03:00").unwrap();
        let json = serde_json::to_value(Wrapper(ts)).unwrap();
        assert_eq!(json, "2024-05-04T19:31:46+03:00");
    }

    #[derive(Serialize)]
    struct Wrapper(#[serde(serialize_with = "serialize_timestamp")] DateTime<FixedOffset>);
}
