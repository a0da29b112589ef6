use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::TVError;

/// A single catalog item as delivered by the products endpoint.
///
/// Upstream products carry many more attributes, only the ones shown in the
/// table are kept. Some products (groceries) have no brand at all.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub id: u64,
    #[serde(default)]
    pub brand: String,
    pub title: String,
    pub category: String,
    pub rating: f64,
    pub price: f64,
}

impl Record {
    pub fn new(
        id: u64,
        brand: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        rating: f64,
        price: f64,
    ) -> Self {
        Record {
            id,
            brand: brand.into(),
            title: title.into(),
            category: category.into(),
            rating,
            price,
        }
    }

    pub fn value(&self, field: Field) -> Value<'_> {
        match field {
            Field::Id => Value::Integer(self.id),
            Field::Brand => Value::Text(&self.brand),
            Field::Title => Value::Text(&self.title),
            Field::Category => Value::Text(&self.category),
            Field::Rating => Value::Number(self.rating),
            Field::Price => Value::Number(self.price),
        }
    }

    /// String form of a field, as matched by filters and shown in the table.
    pub fn display(&self, field: Field) -> Cow<'_, str> {
        match self.value(field) {
            Value::Text(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Id,
    Brand,
    Title,
    Category,
    Rating,
    Price,
}

/// Column order of the table and of exported files.
pub const FIELD_ORDER: [Field; 6] = [
    Field::Id,
    Field::Brand,
    Field::Title,
    Field::Category,
    Field::Rating,
    Field::Price,
];

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Brand => "brand",
            Field::Title => "title",
            Field::Category => "category",
            Field::Rating => "rating",
            Field::Price => "price",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::Id | Field::Rating | Field::Price)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = TVError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        FIELD_ORDER
            .iter()
            .find(|f| f.key() == key)
            .copied()
            .ok_or_else(|| TVError::InvalidArgument(format!("Unknown column \"{s}\"")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Integer(u64),
    Number(f64),
    Text(&'a str),
}

impl Value<'_> {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Total order over values. Numbers compare numerically, text by code
    /// point, and numbers sort before text.
    pub fn compare(&self, other: &Value<'_>) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Text(_), _) => Ordering::Greater,
            (_, Value::Text(_)) => Ordering::Less,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_product_without_brand() {
        let json = r#"{"id": 17, "title": "Apple", "category": "groceries",
            "rating": 4.5, "price": 1.99, "stock": 9, "tags": ["fruits"]}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.brand, "");
        assert_eq!(record.id, 17);
        assert_eq!(record.display(Field::Price), "1.99");
    }

    #[test]
    fn numbers_are_displayed_without_trailing_zero() {
        let record = Record::new(3, "Velvet", "Powder", "beauty", 5.0, 14.5);
        assert_eq!(record.display(Field::Rating), "5");
        assert_eq!(record.display(Field::Price), "14.5");
        assert_eq!(record.display(Field::Id), "3");
    }

    #[test]
    fn numeric_values_compare_numerically() {
        assert_eq!(Value::Number(9.5).compare(&Value::Number(10.0)), Ordering::Less);
        assert_eq!(Value::Integer(9).compare(&Value::Integer(10)), Ordering::Less);
        assert_eq!(Value::Text("9").compare(&Value::Text("10")), Ordering::Greater);
    }

    #[test]
    fn parses_field_keys() {
        assert_eq!("Title".parse::<Field>().unwrap(), Field::Title);
        assert_eq!(" price ".parse::<Field>().unwrap(), Field::Price);
        assert!("stock".parse::<Field>().is_err());
    }
}
