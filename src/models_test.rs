use super::*;

fn make_product(id: u64, name: &str, category: Category, description: &str) -> Product {
    Product {
        id,
        name: name.to_owned(),
        price: 9.5,
        description: description.to_owned(),
        category,
        image: format!("https://cdn.example.com/{id}.jpg"),
        created_at: None,
    }
}

// =============================================================================
// Category
// =============================================================================

#[test]
fn category_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Category::Burger).unwrap(), "\"burger\"");
    assert_eq!(serde_json::to_string(&Category::Juice).unwrap(), "\"juice\"");
}

#[test]
fn category_rejects_capitalized_wire_value() {
    let result = serde_json::from_str::<Category>("\"Burger\"");
    assert!(result.is_err());
}

#[test]
fn category_from_str_is_case_insensitive() {
    assert_eq!("Pizza".parse::<Category>(), Ok(Category::Pizza));
    assert_eq!(" JUICE ".parse::<Category>(), Ok(Category::Juice));
    assert!("sushi".parse::<Category>().unwrap_err().contains("sushi"));
}

// =============================================================================
// Product
// =============================================================================

#[test]
fn product_accepts_decimal_string_price() {
    let json = r#"{"id": 7, "name": "Don Burger", "price": "12.50", "description": "Double patty",
                   "category": "burger", "image": "products/7.jpg", "created_at": "2025-01-02T10:00:00Z"}"#;
    let product: Product = serde_json::from_str(json).unwrap();
    assert_eq!(product.id, 7);
    assert!((product.price - 12.5).abs() < f64::EPSILON);
    assert_eq!(product.created_at.as_deref(), Some("2025-01-02T10:00:00Z"));
}

#[test]
fn product_rejects_negative_price() {
    let json = r#"{"id": 1, "name": "x", "price": -1, "description": "d", "category": "pizza", "image": "i"}"#;
    let err = serde_json::from_str::<Product>(json).unwrap_err();
    assert!(err.to_string().contains("non-negative"));
}

#[test]
fn product_rejects_garbage_price() {
    let json = r#"{"id": 1, "name": "x", "price": "cheap", "description": "d", "category": "pizza", "image": "i"}"#;
    assert!(serde_json::from_str::<Product>(json).is_err());
}

// =============================================================================
// ProductFilter
// =============================================================================

#[test]
fn filter_by_category_and_search() {
    let products = vec![
        make_product(1, "Godfather Burger", Category::Burger, "smoky beef"),
        make_product(2, "Margherita", Category::Pizza, "basil and mozzarella"),
        make_product(3, "Capo Burger", Category::Burger, "chicken"),
        make_product(4, "Mango Cooler", Category::Juice, "fresh mango"),
    ];

    let all = ProductFilter::default().apply(&products);
    assert_eq!(all.len(), 4);

    let burgers = ProductFilter { category: Some(Category::Burger), search: None }.apply(&products);
    assert_eq!(burgers.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);

    let smoky = ProductFilter { category: Some(Category::Burger), search: Some("SMOKY".into()) }.apply(&products);
    assert_eq!(smoky.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);

    let mango = ProductFilter { category: None, search: Some("mango".into()) }.apply(&products);
    assert_eq!(mango.len(), 1);
}

#[test]
fn filter_blank_search_matches_everything() {
    let products = vec![make_product(1, "A", Category::Pizza, "b")];
    let filter = ProductFilter { category: None, search: Some("   ".into()) };
    assert_eq!(filter.apply(&products).len(), 1);
}

// =============================================================================
// Envelope parsing
// =============================================================================

#[test]
fn envelope_parses_data_without_pagination() {
    let body = r#"{"data": [{"id": 1, "blog_name": "Grand opening", "image": "blogs/1.webp"}]}"#;
    let envelope: Envelope<BlogPost> = parse_json(body).unwrap();
    assert_eq!(envelope.data.len(), 1);
    assert!(envelope.pagination.is_none());
}

#[test]
fn envelope_rejects_bare_array() {
    let body = r#"[{"id": 1, "blog_name": "Grand opening", "image": "blogs/1.webp"}]"#;
    let err = parse_json::<Envelope<BlogPost>>(body).unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
}

#[test]
fn parse_page_maps_leads() {
    let body = r#"{
        "status": true,
        "data": [{"id": 11, "customer_name": "Vito", "customer_phone": "555-0101",
                  "customer_email": null, "message": "Catering?", "created_at": "2025-03-01T09:00:00Z"}],
        "pagination": {"current_page": 1, "per_page": 10, "total": 11, "last_page": 2,
                       "next_page_url": "/api/admin/getleads?page=2", "prev_page_url": null}
    }"#;
    let page: Page<ContactLead> = parse_page(body).unwrap();
    assert_eq!(page.items[0].customer_name, "Vito");
    assert!(page.items[0].customer_email.is_none());
    assert!(page.pagination.has_next());
    assert!(!page.pagination.has_prev());
}

#[test]
fn parse_page_requires_pagination() {
    let body = r#"{"data": []}"#;
    let err = parse_page::<FranchiseInterest>(body).unwrap_err();
    assert!(err.to_string().contains("pagination"));
}

#[test]
fn interest_defaults_flag_to_false() {
    let json = r#"{"id": 3, "name": "Sonny", "phone": "555", "message": "Open in Pune"}"#;
    let interest: FranchiseInterest = serde_json::from_str(json).unwrap();
    assert!(!interest.franchise_interest);
    assert!(interest.email.is_none());
}

#[test]
fn who_am_i_maps_to_admin_user() {
    let raw: WhoAmI = serde_json::from_str(r#"{"id": 1, "name": "Don"}"#).unwrap();
    let user = SessionUser::from(raw);
    assert_eq!(user, SessionUser { id: 1, name: "Don".into(), role: Role::Admin });
}
