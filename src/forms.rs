//! Back-office and public form drafts, validated before any request is sent.
//!
//! Each draft knows how to check itself and how to render its request body:
//! JSON when only plain fields are present, multipart as soon as an image
//! file is attached.

use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::error::{FieldError, GatewayError};
use crate::models::Category;
use crate::transport::{FormValue, RequestBody};

pub const MAX_BLOG_NAME_CHARS: usize = 20;
pub const MAX_PRODUCT_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_BLOG_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const BLOG_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/jpg", "image/webp"];

// =============================================================================
// IMAGE UPLOAD
// =============================================================================

/// An image file attached to a form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), content_type: content_type.into(), bytes }
    }

    /// Read a file from disk, deriving its content type from the extension.
    ///
    /// # Errors
    ///
    /// Returns a validation error on the `image` field when the file cannot be
    /// read.
    pub fn from_path(path: &Path) -> Result<Self, GatewayError> {
        let bytes = std::fs::read(path)
            .map_err(|e| GatewayError::invalid("image", &format!("cannot read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
        let content_type = path
            .extension()
            .and_then(|ext| content_type_for_extension(&ext.to_string_lossy()))
            .unwrap_or("application/octet-stream");
        Ok(Self::new(file_name, content_type, bytes))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

#[must_use]
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Where a record's image comes from: an existing URL or a fresh upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    Upload(ImageUpload),
}

// =============================================================================
// CHECKS
// =============================================================================

#[derive(Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.fail(field, message);
        }
    }

    fn fail(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    fn finish(self) -> Result<(), GatewayError> {
        if self.errors.is_empty() { Ok(()) } else { Err(GatewayError::Validation(self.errors)) }
    }
}

fn check_product_image(checks: &mut Checks, upload: &ImageUpload) {
    if !upload.is_image() {
        checks.fail("image", "Please upload an image file (JPEG, PNG, etc.)");
    } else if upload.len() > MAX_PRODUCT_IMAGE_BYTES {
        checks.fail("image", "Image size should be less than 5MB");
    }
}

fn check_blog_image(checks: &mut Checks, upload: &ImageUpload) {
    if !BLOG_IMAGE_TYPES.contains(&upload.content_type.as_str()) {
        checks.fail("image", "Image must be a jpeg, png, jpg, or webp file");
    } else if upload.len() > MAX_BLOG_IMAGE_BYTES {
        checks.fail("image", "Image size should be less than 2MB");
    }
}

fn multipart_or_json(
    fields: Vec<(&str, String)>,
    image: Option<&ImageSource>,
    json_extra: serde_json::Value,
) -> RequestBody {
    match image {
        Some(ImageSource::Upload(upload)) => {
            let mut parts: Vec<(String, FormValue)> = fields
                .into_iter()
                .map(|(name, value)| (name.to_owned(), FormValue::Text(value)))
                .collect();
            parts.push(("image".to_owned(), FormValue::File(upload.clone())));
            RequestBody::Multipart(parts)
        }
        Some(ImageSource::Url(url)) => {
            let mut body = json_extra;
            body["image"] = json!(url);
            RequestBody::Json(body)
        }
        None => RequestBody::Json(json_extra),
    }
}

// =============================================================================
// PRODUCT
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: Category,
    pub image: Option<ImageSource>,
}

impl ProductDraft {
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] listing every invalid field.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let mut checks = Checks::default();
        checks.require("name", &self.name, "Name is required");
        if !self.price.is_finite() || self.price < 0.0 {
            checks.fail("price", "Price must be positive");
        }
        checks.require("description", &self.description, "Description is required");
        if let Some(ImageSource::Upload(upload)) = &self.image {
            check_product_image(&mut checks, upload);
        }
        checks.finish()
    }

    #[must_use]
    pub fn to_body(&self) -> RequestBody {
        let json = json!({
            "name": self.name.trim(),
            "price": self.price,
            "description": self.description.trim(),
            "category": self.category,
        });
        let fields = vec![
            ("name", self.name.trim().to_owned()),
            ("price", self.price.to_string()),
            ("description", self.description.trim().to_owned()),
            ("category", self.category.as_str().to_owned()),
        ];
        multipart_or_json(fields, self.image.as_ref(), json)
    }
}

// =============================================================================
// BLOG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogDraft {
    pub blog_name: String,
    pub image: Option<ImageUpload>,
}

impl BlogDraft {
    /// Image is mandatory when publishing a new post.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] listing every invalid field.
    pub fn validate_for_create(&self) -> Result<(), GatewayError> {
        let mut checks = self.common_checks();
        if self.image.is_none() {
            checks.fail("image", "Image is required");
        }
        checks.finish()
    }

    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] listing every invalid field.
    pub fn validate_for_update(&self) -> Result<(), GatewayError> {
        self.common_checks().finish()
    }

    fn common_checks(&self) -> Checks {
        let mut checks = Checks::default();
        if self.blog_name.trim().is_empty() {
            checks.fail("blog_name", "Blog name is required");
        } else if self.blog_name.chars().count() > MAX_BLOG_NAME_CHARS {
            checks.fail("blog_name", "Blog name must be at most 20 characters");
        }
        if let Some(upload) = &self.image {
            check_blog_image(&mut checks, upload);
        }
        checks
    }

    #[must_use]
    pub fn to_body(&self) -> RequestBody {
        let name = self.blog_name.trim().to_owned();
        let image = self.image.clone().map(ImageSource::Upload);
        multipart_or_json(vec![("blog_name", name.clone())], image.as_ref(), json!({ "blog_name": name }))
    }
}

// =============================================================================
// BANNER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerDraft {
    pub title: String,
    pub subtitle: String,
    pub image: Option<ImageSource>,
}

impl BannerDraft {
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] listing every invalid field.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let mut checks = Checks::default();
        checks.require("title", &self.title, "Title is required");
        checks.require("subtitle", &self.subtitle, "Subtitle is required");
        match &self.image {
            Some(ImageSource::Url(url)) => checks.require("image", url, "Image URL is required"),
            Some(ImageSource::Upload(upload)) => check_product_image(&mut checks, upload),
            None => {}
        }
        checks.finish()
    }

    #[must_use]
    pub fn to_body(&self) -> RequestBody {
        let json = json!({ "title": self.title.trim(), "subtitle": self.subtitle.trim() });
        let fields = vec![("title", self.title.trim().to_owned()), ("subtitle", self.subtitle.trim().to_owned())];
        multipart_or_json(fields, self.image.as_ref(), json)
    }
}

// =============================================================================
// PUBLIC FORMS
// =============================================================================

/// Contact page submission (`POST /contact`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub message: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] listing every invalid field.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let mut checks = Checks::default();
        checks.require("customer_name", &self.customer_name, "Name is required");
        checks.require("customer_phone", &self.customer_phone, "Phone is required");
        if let Some(email) = self.customer_email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            if !email.contains('@') {
                checks.fail("customer_email", "Email must be a valid address");
            }
        }
        checks.require("message", &self.message, "Message is required");
        checks.finish()
    }
}

/// Franchise / collaboration interest submission (`POST /interest`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterestForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
    pub franchise_interest: bool,
}

impl InterestForm {
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] listing every invalid field.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let mut checks = Checks::default();
        checks.require("name", &self.name, "Name is required");
        checks.require("phone", &self.phone, "Phone is required");
        checks.require("email", &self.email, "Email is required");
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            checks.fail("email", "Email must be a valid address");
        }
        checks.require("message", &self.message, "Message is required");
        checks.finish()
    }
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
