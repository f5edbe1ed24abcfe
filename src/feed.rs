use itertools::{Either, Itertools};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::errors::{Error, Result};
use crate::locale::Lang;

/// Content classification of a sale item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rating {
    R18,
    #[default]
    General,
}

/// When a sale ends, as given by the feed: a timestamp string, or a number
/// of milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq)]
pub enum SaleEnd {
    Text(String),
    EpochMillis(f64),
}

impl fmt::Display for SaleEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::EpochMillis(ms) => write!(f, "{ms}"),
        }
    }
}

/// Field decoders that never reject an item. A value of an unexpected JSON
/// type is coerced where it has an obvious reading and dropped otherwise.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{Rating, SaleEnd};

    fn number_text(n: &serde_json::Number) -> String {
        match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(number_text(&n)),
            _ => None,
        })
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        })
    }

    pub fn sale_end<'de, D>(deserializer: D) -> Result<Option<SaleEnd>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if !s.is_empty() => Some(SaleEnd::Text(s)),
            Value::Number(n) => n.as_f64().map(SaleEnd::EpochMillis),
            _ => None,
        })
    }

    // Only the exact tag "r18" marks adult content, anything else is general.
    pub fn rating<'de, D>(deserializer: D) -> Result<Rating, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if s == "r18" => Rating::R18,
            _ => Rating::General,
        })
    }
}

/// One sale listing from the feed.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SaleItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub store: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price_jpy: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub discount_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub points_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::rating")]
    pub rating: Rating,
    #[serde(default, deserialize_with = "lenient::sale_end")]
    pub sale_ends_at: Option<SaleEnd>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title_ja: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title_en: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

impl SaleItem {
    pub fn from_json_value(value: Value) -> Result<SaleItem> {
        if !value.is_object() {
            return Err(Error::Feed(format!("expected an object, got {value}")));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_r18(&self) -> bool {
        self.rating == Rating::R18
    }

    /// Title in `lang`, falling back to the other language.
    pub fn title(&self, lang: Lang) -> &str {
        let (preferred, fallback) = match lang {
            Lang::En => (&self.title_en, &self.title_ja),
            Lang::Ja => (&self.title_ja, &self.title_en),
        };
        non_empty(preferred)
            .or_else(|| non_empty(fallback))
            .unwrap_or(lang.no_title())
    }

    pub fn store(&self) -> Option<&str> {
        non_empty(&self.store)
    }

    pub fn sale_ends_at(&self) -> Option<&SaleEnd> {
        self.sale_ends_at.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        non_empty(&self.url)
    }
}

/// The sales feed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub generated_at: Option<String>,
    pub items: Vec<SaleItem>,
}

impl Feed {
    pub fn from_reader(reader: impl Read) -> Result<Feed> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Feed> {
        let mut obj = match value {
            Value::Object(map) => map,
            x => {
                return Err(Error::Feed(format!(
                    "expected an object at the document root, got {x}"
                )))
            }
        };

        let generated_at = match obj.remove("generated_at") {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };

        let raw_items = match obj.remove("items") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                debug!("Field items is not an array ({other}), treating feed as empty");
                Vec::new()
            }
            None => Vec::new(),
        };

        let (items, failures): (Vec<SaleItem>, Vec<(usize, Error)>) = raw_items
            .into_iter()
            .enumerate()
            .partition_map(|(index, value)| match SaleItem::from_json_value(value) {
                Ok(item) => Either::Left(item),
                Err(error) => Either::Right((index, error)),
            });

        for (index, error) in &failures {
            warn!("Skipping item {index} of feed: {error}");
        }
        info!(
            "Decoded feed with {} items, skipped {}",
            items.len(),
            failures.len()
        );

        Ok(Feed {
            generated_at,
            items,
        })
    }
}

impl FromStr for Feed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }
}
