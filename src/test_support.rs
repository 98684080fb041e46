//! Fixtures for handler tests: an in-memory account database, an in-memory
//! marketplace backend and a logged-in session.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::{backend::memory::MemoryBackend, db, models::Account, utils, AppState, SESSION_COOKIE};

pub const TEST_SESSION_KEY: &[u8] =
    b"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Adm1n!password";

/// Builds the full application (routes, session and identity middleware, 404
/// fallback) around `state` and initialises it as a test service.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_identity::IdentityMiddleware::default())
                .wrap($crate::session_middleware(
                    actix_web::cookie::Key::from($crate::test_support::TEST_SESSION_KEY),
                    false,
                ))
                .app_data(actix_web::web::Data::new($state))
                .configure($crate::routes::configure)
                .default_service(actix_web::web::to($crate::default_handler)),
        )
        .await
    };
}
pub(crate) use init_app;

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    pool
}

pub fn fixture_data() -> Value {
    let customers: Vec<Value> = (1..=23)
        .map(|n| {
            json!({
                "id": n,
                "name": format!("Customer {:02}", n),
                "email": format!("customer{:02}@example.com", n),
                "phone": "+2348000000000",
                "location": if n % 2 == 0 { "Lagos" } else { "Abuja" },
                "status": if n % 5 == 0 { "suspended" } else { "active" },
                "joinedAt": "2025-03-01T09:00:00Z",
                "totalOrders": n
            })
        })
        .collect();

    json!({
        "users": [
            {
                "id": 1,
                "name": "Site Admin",
                "email": ADMIN_EMAIL,
                "role": "admin",
                "lastLogin": null
            }
        ],
        "customers": customers,
        "vendors": [
            {
                "id": "v1",
                "businessName": "Gadget Fixers",
                "ownerName": "Tunde Bello",
                "email": "hello@gadgetfixers.ng",
                "status": "pending",
                "rating": 4.5,
                "documents": [
                    {
                        "name": "CAC certificate",
                        "url": "https://files.example.com/cac.pdf",
                        "status": "pending"
                    }
                ]
            },
            {
                "id": "v2",
                "businessName": "Spare Parts Depot",
                "ownerName": "Ngozi Eze",
                "email": "sales@spd.ng",
                "status": "verified"
            }
        ],
        "repairers": [
            {
                "id": 1,
                "name": "Emeka Obi",
                "email": "emeka@example.com",
                "specialty": "Phones",
                "status": "verified",
                "rating": 4.8
            }
        ],
        "companies": [
            {
                "id": 1,
                "name": "QuickFix Ltd",
                "email": "ops@quickfix.ng",
                "status": "verified",
                "repairersCount": 12
            }
        ],
        "products": [
            {
                "id": 1,
                "name": "iPhone screen",
                "category": "Screens",
                "price": 45000.0,
                "stock": 0,
                "vendorName": "Gadget Fixers",
                "status": "out_of_stock"
            }
        ],
        "orders": [
            {
                "id": 100,
                "customerName": "Customer 01",
                "vendorName": "Gadget Fixers",
                "product": "iPhone screen",
                "amount": 45000.0,
                "status": "completed",
                "createdAt": "2025-04-02T10:00:00Z"
            }
        ],
        "invoices": [
            {
                "id": 500,
                "orderId": 100,
                "customerName": "Customer 01",
                "amount": 45000.0,
                "status": "paid",
                "issuedAt": "2025-04-02",
                "dueAt": "2025-04-16"
            }
        ],
        "transactions": [
            {
                "id": 1,
                "reference": "TX-001",
                "user": 1,
                "userName": "Customer 01",
                "type": "debit",
                "amount": 1200.0,
                "status": "successful",
                "date": "2025-05-01T08:00:00Z",
                "paymentInfo": { "method": "card", "cardLast4": "4242" }
            },
            {
                "id": 2,
                "reference": "TX-002",
                "user": 2,
                "userName": "Customer 02",
                "type": "credit",
                "amount": 800.5,
                "status": "failed",
                "date": "2025-05-03T08:00:00Z"
            },
            {
                "id": 3,
                "reference": "TX-003",
                "user": 3,
                "userName": "Customer 03",
                "type": "debit",
                "amount": 3000.0,
                "status": "successful",
                "date": "2025-05-02T08:00:00Z"
            }
        ],
        "content": [
            {
                "id": 1,
                "title": "Great service",
                "author": "Customer 01",
                "kind": "review",
                "body": "Fixed my phone in an hour.",
                "status": "pending",
                "reports": 0
            },
            {
                "id": 2,
                "title": "Spam offer",
                "author": "unknown",
                "kind": "comment",
                "body": "Buy now!!!",
                "status": "flagged",
                "reports": 7
            }
        ],
        "notifications": [
            {
                "id": 1,
                "title": "New vendor application",
                "message": "Gadget Fixers applied",
                "category": "onboarding",
                "read": false,
                "createdAt": "2025-05-04T12:00:00Z"
            },
            {
                "id": 2,
                "title": "Payout completed",
                "message": "Weekly payout sent",
                "category": "payments",
                "read": true,
                "createdAt": "2025-05-01T12:00:00Z"
            }
        ],
        "onboarding": [
            {
                "id": 1,
                "applicantName": "Gadget Fixers",
                "email": "hello@gadgetfixers.ng",
                "kind": "vendor",
                "status": "pending",
                "submittedAt": "2025-05-04T11:00:00Z"
            }
        ],
        "notificationSettings": {
            "email": true, "push": false, "sms": false,
            "orderUpdates": true, "newRegistrations": true, "marketing": false
        }
    })
}

pub async fn test_state_with(backend: MemoryBackend) -> (AppState, Arc<MemoryBackend>) {
    let backend = Arc::new(backend);
    let state = AppState {
        db_pool: test_pool().await,
        backend: backend.clone(),
        page_size: 10,
    };
    (state, backend)
}

pub async fn test_state() -> (AppState, Arc<MemoryBackend>) {
    test_state_with(MemoryBackend::new(fixture_data())).await
}

pub async fn seed_admin(pool: &SqlitePool) -> Account {
    let hash = utils::hash_password(ADMIN_PASSWORD).unwrap();
    db::create_account(pool, "Site Admin", ADMIN_EMAIL, &hash)
        .await
        .unwrap()
}

pub fn session_cookie<B>(response: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie")
        .into_owned()
}

/// Logs the seeded admin in through `/login` and returns the session cookie.
macro_rules! login {
    ($app:expr) => {{
        let request = actix_web::test::TestRequest::post()
            .uri("/login")
            .set_form([
                ("email", $crate::test_support::ADMIN_EMAIL),
                ("password", $crate::test_support::ADMIN_PASSWORD),
            ])
            .to_request();
        let response = actix_web::test::call_service(&$app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::SEE_OTHER);
        $crate::test_support::session_cookie(&response)
    }};
}
pub(crate) use login;

pub async fn body_text<B: actix_web::body::MessageBody>(
    response: actix_web::dev::ServiceResponse<B>,
) -> String {
    let bytes = actix_web::test::read_body(response).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}
