//! Wire records exchanged with the Remote API.
//!
//! DESIGN
//! ======
//! The Remote API owns these records; the gateway only transports them.
//! Collections always arrive inside `Envelope<T>` (`{data, pagination?}`),
//! parsed strictly: a bare array or any other wrapper is a parse error.
//! Field names follow the backend's final contract (`blog_name`, lowercase
//! categories, `customer_*` lead columns).

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GatewayError;

// =============================================================================
// SESSION USER
// =============================================================================

/// Back-office roles. The admin surface only ever signs in admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

/// Identity of the signed-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: u64,
    pub name: String,
    pub role: Role,
}

/// `GET /user` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct WhoAmI {
    pub id: u64,
    pub name: String,
}

impl From<WhoAmI> for SessionUser {
    fn from(raw: WhoAmI) -> Self {
        Self { id: raw.id, name: raw.name, role: Role::Admin }
    }
}

/// `{token}` body returned by login and refresh.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenBody {
    pub token: String,
}

// =============================================================================
// PRODUCTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Burger,
    Pizza,
    Juice,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Burger, Category::Pizza, Category::Juice];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Burger => "burger",
            Self::Pizza => "pizza",
            Self::Juice => "juice",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-insensitive so `Burger` typed by an operator still maps to the
    /// lowercase wire value.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| format!("unknown category '{wanted}' (expected burger, pizza, or juice)"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    pub description: String,
    pub category: Category,
    /// Public URL or storage reference of the product photo.
    pub image: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Menu-page filter: optional category plus case-insensitive search over
/// name and description.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}

impl ProductFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.category.is_some_and(|category| category != product.category) {
            return false;
        }
        let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return true;
        };
        let needle = needle.to_lowercase();
        product.name.to_lowercase().contains(&needle) || product.description.to_lowercase().contains(&needle)
    }

    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

// =============================================================================
// BLOGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: u64,
    pub blog_name: String,
    pub image: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// =============================================================================
// LEADS
// =============================================================================

/// Contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLead {
    pub id: u64,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Franchise / collaboration interest submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FranchiseInterest {
    pub id: u64,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub message: String,
    #[serde(default)]
    pub franchise_interest: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// BANNER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroBanner {
    pub id: u64,
    pub image: String,
    pub title: String,
    pub subtitle: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Single-record response: `{data: T}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Single<T> {
    pub data: T,
}

/// Public form submission acknowledgement: `{status, message?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// ENVELOPE & PAGINATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default)]
    pub prev_page_url: Option<String>,
}

impl Pagination {
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// The one collection response shape: `{data: T[], pagination?: {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// A page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Strictly parse a JSON body into `T`.
///
/// # Errors
///
/// Returns [`GatewayError::Parse`] when the body does not match `T`.
pub fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::Parse(e.to_string()))
}

/// Parse a collection envelope and require pagination metadata.
///
/// # Errors
///
/// Returns [`GatewayError::Parse`] when the envelope is malformed or the
/// pagination block is missing.
pub fn parse_page<T: serde::de::DeserializeOwned>(body: &str) -> Result<Page<T>, GatewayError> {
    let envelope: Envelope<T> = parse_json(body)?;
    let pagination = envelope
        .pagination
        .ok_or_else(|| GatewayError::Parse("missing pagination in paginated response".to_owned()))?;
    Ok(Page { items: envelope.data, pagination })
}

// =============================================================================
// SERDE HELPERS
// =============================================================================

/// Prices arrive as JSON numbers or as decimal strings (`"12.50"`).
fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let price = match value {
        serde_json::Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| D::Error::custom("price out of range"))?,
        serde_json::Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid decimal price '{text}'")))?,
        _ => return Err(D::Error::custom("expected number or decimal string for price")),
    };
    if !price.is_finite() || price < 0.0 {
        return Err(D::Error::custom(format!("price {price} must be a non-negative number")));
    }
    Ok(price)
}

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;
