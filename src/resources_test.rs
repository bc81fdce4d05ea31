use super::*;
use crate::error::FieldError;
use crate::forms::{ImageSource, ImageUpload};
use crate::models::Category;
use crate::session::{MemoryTokenStore, Session};
use crate::transport::test_helpers::{MockTransport, bearer, respond};
use crate::transport::{ApiResponse, Method, RequestBody};
use serde_json::json;
use std::sync::Arc;

fn gateway(mock: &Arc<MockTransport>, token: Option<&str>) -> SessionGateway {
    let store = token.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token);
    SessionGateway::new(mock.clone(), Session::new(store))
}

fn product_json(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "price": "8.50",
        "description": "Smashed patty, cheddar",
        "category": "burger",
        "image": "products/mafia.jpg",
        "created_at": "2025-01-05T10:00:00Z"
    })
}

fn draft(price: f64) -> ProductDraft {
    ProductDraft {
        name: "Mafia Burger".into(),
        price,
        description: "Smashed patty, cheddar".into(),
        category: Category::Burger,
        image: None,
    }
}

fn ok_backend(request: &ApiRequest) -> Result<ApiResponse, GatewayError> {
    match (request.method, request.path.as_str()) {
        (Method::Get, PRODUCTS_PATH) => respond(200, json!({ "data": [product_json(1, "Mafia Burger")] })),
        _ => respond(200, json!({ "status": true })),
    }
}

#[tokio::test]
async fn fetch_products_without_token_sends_nothing() {
    let mock = Arc::new(MockTransport::new(ok_backend));
    let result = gateway(&mock, None).fetch_products().await;

    assert!(matches!(result, Err(GatewayError::Unauthenticated)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn fetch_products_decodes_envelope_with_bearer() {
    let mock = Arc::new(MockTransport::new(ok_backend));
    let products = gateway(&mock, Some("fresh")).fetch_products().await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Mafia Burger");
    assert!((products[0].price - 8.5).abs() < f64::EPSILON);
    assert_eq!(bearer(&mock.requests()[0]), Some("fresh"));
}

#[tokio::test]
async fn bare_array_response_is_a_parse_error() {
    let mock = Arc::new(MockTransport::new(|_| respond(200, json!([product_json(1, "Mafia Burger")]))));
    let result = gateway(&mock, Some("fresh")).fetch_products().await;

    assert!(matches!(result, Err(GatewayError::Parse(_))));
}

#[tokio::test]
async fn negative_price_is_rejected_before_the_network() {
    let mock = Arc::new(MockTransport::new(ok_backend));
    let err = gateway(&mock, Some("fresh")).create_product(&draft(-5.0)).await.unwrap_err();

    let GatewayError::Validation(fields) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(fields, vec![FieldError::new("price", "Price must be positive")]);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn create_product_without_upload_posts_json() {
    let mock = Arc::new(MockTransport::new(ok_backend));
    gateway(&mock, Some("fresh")).create_product(&draft(8.5)).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    let RequestBody::Json(body) = &requests[0].body else {
        panic!("expected json body");
    };
    assert_eq!(body["category"], "burger");
    assert_eq!(body["price"], 8.5);
}

#[tokio::test]
async fn update_product_with_upload_sends_multipart() {
    let mock = Arc::new(MockTransport::new(ok_backend));
    let mut product = draft(9.0);
    product.image = Some(ImageSource::Upload(ImageUpload::new("burger.png", "image/png", vec![0x89, 0x50])));

    gateway(&mock, Some("fresh")).update_product(7, &product).await.unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/admin/products/7");
    let RequestBody::Multipart(parts) = &request.body else {
        panic!("expected multipart body");
    };
    assert!(parts.iter().any(|(name, _)| name == "image"));
    assert!(parts.iter().any(|(name, _)| name == "category"));
}

#[tokio::test]
async fn long_blog_name_is_rejected_without_a_request() {
    let mock = Arc::new(MockTransport::new(ok_backend));
    let post = BlogDraft {
        blog_name: "x".repeat(21),
        image: Some(ImageUpload::new("cover.jpg", "image/jpeg", vec![1, 2, 3])),
    };

    let err = gateway(&mock, Some("fresh")).create_blog(&post).await.unwrap_err();

    assert!(matches!(err, GatewayError::Validation(_)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn blog_without_image_cannot_be_created_but_can_be_renamed() {
    let mock = Arc::new(MockTransport::new(ok_backend));
    let gateway = gateway(&mock, Some("fresh"));
    let post = BlogDraft { blog_name: "Summer menu".into(), image: None };

    assert!(matches!(gateway.create_blog(&post).await, Err(GatewayError::Validation(_))));
    gateway.update_blog(3, &post).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/admin/blogs/3");
}

#[tokio::test]
async fn missing_lead_delete_reports_not_found() {
    let mock = Arc::new(MockTransport::new(|_| respond(404, json!({ "message": "Lead not found" }))));
    let err = gateway(&mock, Some("fresh")).delete_lead(99).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_messages(), vec!["Lead not found".to_owned()]);
    assert_eq!(mock.requests()[0].path, "/admin/deletelead/99");
}

#[tokio::test]
async fn server_field_errors_are_surfaced_individually() {
    let mock = Arc::new(MockTransport::new(|_| {
        respond(422, json!({ "error": { "name": ["The name has already been taken."], "image": ["Too large."] } }))
    }));
    let err = gateway(&mock, Some("fresh")).create_product(&draft(4.0)).await.unwrap_err();

    let messages = err.user_messages();
    assert_eq!(messages.len(), 2);
    assert!(messages.contains(&"name: The name has already been taken.".to_owned()));
    assert!(messages.contains(&"image: Too large.".to_owned()));
}

#[tokio::test]
async fn leads_page_is_requested_and_parsed() {
    let mock = Arc::new(MockTransport::new(|_| {
        respond(
            200,
            json!({
                "data": [{ "id": 4, "customer_name": "Ana", "customer_phone": "555", "message": "Hi" }],
                "pagination": { "current_page": 2, "per_page": 10, "total": 11, "last_page": 2 }
            }),
        )
    }));
    let page = gateway(&mock, Some("fresh")).fetch_leads(2).await.unwrap();

    assert_eq!(page.items[0].customer_name, "Ana");
    assert!(!page.pagination.has_next());
    assert!(page.pagination.has_prev());
    assert_eq!(mock.requests()[0].query, vec![("page".to_owned(), "2".to_owned())]);
}

#[tokio::test]
async fn interests_without_pagination_fail_to_parse() {
    let mock = Arc::new(MockTransport::new(|_| respond(200, json!({ "data": [] }))));
    let result = gateway(&mock, Some("fresh")).fetch_interests(1).await;

    assert!(matches!(result, Err(GatewayError::Parse(_))));
}

#[tokio::test]
async fn banner_is_read_from_single_record() {
    let mock = Arc::new(MockTransport::new(|_| {
        respond(200, json!({ "data": { "id": 1, "image": "hero.jpg", "title": "Join", "subtitle": "the family" } }))
    }));
    let banner = gateway(&mock, Some("fresh")).fetch_banner().await.unwrap();

    assert_eq!(banner.title, "Join");
    assert_eq!(mock.requests()[0].path, BANNER_PATH);
}

#[tokio::test]
async fn contact_form_is_public() {
    let mock = Arc::new(MockTransport::new(|_| respond(200, json!({ "status": true, "message": "Thanks" }))));
    let form = ContactForm {
        customer_name: "Ana".into(),
        customer_phone: "555-0101".into(),
        customer_email: None,
        message: "Do you cater?".into(),
    };

    let ack = gateway(&mock, None).submit_contact(&form).await.unwrap();

    assert_eq!(ack.message.as_deref(), Some("Thanks"));
    let request = &mock.requests()[0];
    assert_eq!(request.path, CONTACT_PATH);
    assert_eq!(bearer(request), None);
}

#[tokio::test]
async fn contact_form_negative_acknowledgement_is_an_error() {
    let mock = Arc::new(MockTransport::new(|_| respond(200, json!({ "status": false }))));
    let form = ContactForm {
        customer_name: "Ana".into(),
        customer_phone: "555-0101".into(),
        customer_email: Some("ana@example.com".into()),
        message: "Hello".into(),
    };

    let err = gateway(&mock, None).submit_contact(&form).await.unwrap_err();

    assert_eq!(err.user_messages(), vec!["Failed to submit form".to_owned()]);
}

#[tokio::test]
async fn interest_form_returns_server_message() {
    let mock = Arc::new(MockTransport::new(|_| respond(201, json!({ "message": "We will call you" }))));
    let form = InterestForm {
        name: "Luca".into(),
        phone: "555-0199".into(),
        email: "luca@example.com".into(),
        message: "Franchise in Turin".into(),
        franchise_interest: true,
    };

    let message = gateway(&mock, None).submit_interest(&form).await.unwrap();

    assert_eq!(message.as_deref(), Some("We will call you"));
    let RequestBody::Json(body) = &mock.requests()[0].body else {
        panic!("expected json body");
    };
    assert_eq!(body["franchise_interest"], true);
}
