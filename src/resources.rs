//! Typed resource operations on top of the authenticated request path.
//!
//! Each operation validates its input first (nothing is sent on failure),
//! builds a JSON or multipart body, goes through
//! `SessionGateway::authenticated_request`, and decodes non-2xx responses
//! through the error envelope. Collections are re-fetched by the caller after
//! every successful mutation; nothing here patches local state.

use crate::error::{ErrorCode, GatewayError};
use crate::forms::{BannerDraft, BlogDraft, ContactForm, InterestForm, ProductDraft};
use crate::gateway::SessionGateway;
use crate::models::{
    BlogPost, ContactLead, Envelope, FranchiseInterest, HeroBanner, Page, Product, Single, Submission, parse_json,
    parse_page,
};
use crate::transport::ApiRequest;

pub const PRODUCTS_PATH: &str = "/admin/products";
pub const BLOGS_PATH: &str = "/admin/blogs";
pub const BANNER_PATH: &str = "/admin/banner";
pub const LEADS_PATH: &str = "/admin/getleads";
pub const DELETE_LEAD_PATH: &str = "/admin/deletelead";
pub const INTERESTS_PATH: &str = "/admin/interests";
pub const CONTACT_PATH: &str = "/contact";
pub const INTEREST_PATH: &str = "/interest";

fn item_path(base: &str, id: u64) -> String {
    format!("{base}/{id}")
}

fn log_failure<T>(operation: &str, result: Result<T, GatewayError>) -> Result<T, GatewayError> {
    if let Err(e) = &result {
        tracing::warn!(%operation, code = e.error_code(), error = %e, "operation failed");
    }
    result
}

// =============================================================================
// PRODUCTS
// =============================================================================

impl SessionGateway {
    /// # Errors
    ///
    /// Fails on auth, transport, non-2xx, or envelope mismatch.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, GatewayError> {
        let result = async {
            let response = self.send_expecting_success(ApiRequest::get(PRODUCTS_PATH)).await?;
            Ok(parse_json::<Envelope<Product>>(&response.body)?.data)
        }
        .await;
        log_failure("fetch_products", result)
    }

    /// # Errors
    ///
    /// Fails validation before sending, or on auth, transport, or rejection.
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<(), GatewayError> {
        draft.validate()?;
        let request = ApiRequest::post(PRODUCTS_PATH).body(draft.to_body());
        log_failure("create_product", self.send_expecting_success(request).await.map(drop))
    }

    /// # Errors
    ///
    /// Fails validation before sending, or on auth, transport, or rejection.
    pub async fn update_product(&self, id: u64, draft: &ProductDraft) -> Result<(), GatewayError> {
        draft.validate()?;
        let request = ApiRequest::put(item_path(PRODUCTS_PATH, id)).body(draft.to_body());
        log_failure("update_product", self.send_expecting_success(request).await.map(drop))
    }

    /// # Errors
    ///
    /// Fails on auth, transport, or rejection (including 404 for a missing id).
    pub async fn delete_product(&self, id: u64) -> Result<(), GatewayError> {
        let request = ApiRequest::delete(item_path(PRODUCTS_PATH, id));
        log_failure("delete_product", self.send_expecting_success(request).await.map(drop))
    }
}

// =============================================================================
// BLOGS
// =============================================================================

impl SessionGateway {
    /// # Errors
    ///
    /// Fails on auth, transport, non-2xx, or envelope mismatch.
    pub async fn fetch_blogs(&self) -> Result<Vec<BlogPost>, GatewayError> {
        let result = async {
            let response = self.send_expecting_success(ApiRequest::get(BLOGS_PATH)).await?;
            Ok(parse_json::<Envelope<BlogPost>>(&response.body)?.data)
        }
        .await;
        log_failure("fetch_blogs", result)
    }

    /// Publish a post. The image is mandatory and always sent as multipart.
    ///
    /// # Errors
    ///
    /// Fails validation before sending, or on auth, transport, or rejection.
    pub async fn create_blog(&self, draft: &BlogDraft) -> Result<(), GatewayError> {
        draft.validate_for_create()?;
        let request = ApiRequest::post(BLOGS_PATH).body(draft.to_body());
        log_failure("create_blog", self.send_expecting_success(request).await.map(drop))
    }

    /// # Errors
    ///
    /// Fails validation before sending, or on auth, transport, or rejection.
    pub async fn update_blog(&self, id: u64, draft: &BlogDraft) -> Result<(), GatewayError> {
        draft.validate_for_update()?;
        let request = ApiRequest::put(item_path(BLOGS_PATH, id)).body(draft.to_body());
        log_failure("update_blog", self.send_expecting_success(request).await.map(drop))
    }

    /// # Errors
    ///
    /// Fails on auth, transport, or rejection.
    pub async fn delete_blog(&self, id: u64) -> Result<(), GatewayError> {
        let request = ApiRequest::delete(item_path(BLOGS_PATH, id));
        log_failure("delete_blog", self.send_expecting_success(request).await.map(drop))
    }
}

// =============================================================================
// BANNER
// =============================================================================

impl SessionGateway {
    /// The single active homepage banner.
    ///
    /// # Errors
    ///
    /// Fails on auth, transport, non-2xx, or shape mismatch.
    pub async fn fetch_banner(&self) -> Result<HeroBanner, GatewayError> {
        let result = async {
            let response = self.send_expecting_success(ApiRequest::get(BANNER_PATH)).await?;
            Ok(parse_json::<Single<HeroBanner>>(&response.body)?.data)
        }
        .await;
        log_failure("fetch_banner", result)
    }

    /// Edit the active banner in place.
    ///
    /// # Errors
    ///
    /// Fails validation before sending, or on auth, transport, or rejection.
    pub async fn update_banner(&self, id: u64, draft: &BannerDraft) -> Result<(), GatewayError> {
        draft.validate()?;
        let request = ApiRequest::put(item_path(BANNER_PATH, id)).body(draft.to_body());
        log_failure("update_banner", self.send_expecting_success(request).await.map(drop))
    }
}

// =============================================================================
// LEADS & INTERESTS
// =============================================================================

impl SessionGateway {
    /// One page (1-based) of contact leads.
    ///
    /// # Errors
    ///
    /// Fails on auth, transport, non-2xx, or envelope mismatch.
    pub async fn fetch_leads(&self, page: u32) -> Result<Page<ContactLead>, GatewayError> {
        let result = async {
            let request = ApiRequest::get(LEADS_PATH).query("page", page.max(1));
            let response = self.send_expecting_success(request).await?;
            parse_page(&response.body)
        }
        .await;
        log_failure("fetch_leads", result)
    }

    /// # Errors
    ///
    /// Fails on auth, transport, or rejection (404 when the lead is gone).
    pub async fn delete_lead(&self, id: u64) -> Result<(), GatewayError> {
        let request = ApiRequest::delete(item_path(DELETE_LEAD_PATH, id));
        log_failure("delete_lead", self.send_expecting_success(request).await.map(drop))
    }

    /// One page (1-based) of franchise / collaboration interests.
    ///
    /// # Errors
    ///
    /// Fails on auth, transport, non-2xx, or envelope mismatch.
    pub async fn fetch_interests(&self, page: u32) -> Result<Page<FranchiseInterest>, GatewayError> {
        let result = async {
            let request = ApiRequest::get(INTERESTS_PATH).query("page", page.max(1));
            let response = self.send_expecting_success(request).await?;
            parse_page(&response.body)
        }
        .await;
        log_failure("fetch_interests", result)
    }

    /// # Errors
    ///
    /// Fails on auth, transport, or rejection.
    pub async fn delete_interest(&self, id: u64) -> Result<(), GatewayError> {
        let request = ApiRequest::delete(item_path(INTERESTS_PATH, id));
        log_failure("delete_interest", self.send_expecting_success(request).await.map(drop))
    }
}

// =============================================================================
// PUBLIC SUBMISSIONS
// =============================================================================

impl SessionGateway {
    /// Public contact form. No token is attached.
    ///
    /// # Errors
    ///
    /// Fails validation before sending, on transport, on rejection, or when
    /// the API acknowledges with `status: false`.
    pub async fn submit_contact(&self, form: &ContactForm) -> Result<Submission, GatewayError> {
        form.validate()?;
        let body = serde_json::to_value(form).map_err(|e| GatewayError::Parse(e.to_string()))?;
        let result = async {
            let response = self.send_public(ApiRequest::post(CONTACT_PATH).json(body)).await?;
            let submission: Submission = parse_json(&response.body)?;
            if !submission.status {
                return Err(GatewayError::Rejected {
                    status: response.status,
                    message: submission.message.or_else(|| Some("Failed to submit form".to_owned())),
                    fields: Vec::new(),
                });
            }
            Ok(submission)
        }
        .await;
        log_failure("submit_contact", result)
    }

    /// Public franchise-interest form. No token is attached.
    ///
    /// # Errors
    ///
    /// Fails validation before sending, on transport, or on rejection.
    pub async fn submit_interest(&self, form: &InterestForm) -> Result<Option<String>, GatewayError> {
        form.validate()?;
        let body = serde_json::to_value(form).map_err(|e| GatewayError::Parse(e.to_string()))?;
        let result = async {
            let response = self.send_public(ApiRequest::post(INTEREST_PATH).json(body)).await?;
            let ack: serde_json::Value = parse_json(&response.body)?;
            Ok(ack.get("message").and_then(serde_json::Value::as_str).map(ToOwned::to_owned))
        }
        .await;
        log_failure("submit_interest", result)
    }
}

#[cfg(test)]
#[path = "resources_test.rs"]
mod tests;
