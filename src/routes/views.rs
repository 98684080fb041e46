//! List and detail pages for every marketplace entity.

use actix_identity::Identity;
use actix_web::{
    http::StatusCode,
    post,
    web::{self, Data},
    HttpResponse,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{
    backend::{self, BackendError, Resource},
    errors::AppError,
    listing::{build_tabs, filter_items, humanize, paginate, ListQuery, Listable, PAGE_SIZES},
    models::{
        ContentItem, Customer, Invoice, Notification, OnboardingApplication, Order, Product,
        RepairCompany, Repairer, Transaction, Vendor, VerificationDocument,
    },
    routes::{page_context, render_page, require_login, see_other},
    AppState,
};

/// A listable record that also has a detail page.
pub trait Record: Listable + Serialize + DeserializeOwned + 'static {
    fn heading(&self) -> String;

    fn documents(&self) -> &[VerificationDocument] {
        &[]
    }
}

#[derive(Debug, Serialize)]
pub struct Action {
    pub status: &'static str,
    pub label: &'static str,
}

pub struct View {
    pub title: &'static str,
    pub singular: &'static str,
    pub base: &'static str,
    pub resource: Resource,
    pub statuses: &'static [&'static str],
    pub search_hint: &'static str,
    pub template: &'static str,
    /// Status changes offered on the detail page, posted to `{base}/{id}/status`.
    pub actions: &'static [Action],
}

const ACCOUNT_STATUSES: &[&str] = &["verified", "pending", "rejected", "suspended"];

pub static CUSTOMERS: View = View {
    title: "Customers",
    singular: "Customer",
    base: "/customers",
    resource: Resource::Customers,
    statuses: &["active", "inactive", "suspended"],
    search_hint: "Search by name or email",
    template: "list.html",
    actions: &[],
};

pub static VENDORS: View = View {
    title: "Vendors",
    singular: "Vendor",
    base: "/vendors",
    resource: Resource::Vendors,
    statuses: ACCOUNT_STATUSES,
    search_hint: "Search by business, owner or email",
    template: "list.html",
    actions: &[],
};

pub static REPAIRERS: View = View {
    title: "Repairers",
    singular: "Repairer",
    base: "/repairers",
    resource: Resource::Repairers,
    statuses: ACCOUNT_STATUSES,
    search_hint: "Search by name, email or specialty",
    template: "list.html",
    actions: &[],
};

pub static COMPANIES: View = View {
    title: "Repair companies",
    singular: "Repair company",
    base: "/companies",
    resource: Resource::Companies,
    statuses: ACCOUNT_STATUSES,
    search_hint: "Search by name or email",
    template: "list.html",
    actions: &[],
};

pub static PRODUCTS: View = View {
    title: "Products",
    singular: "Product",
    base: "/products",
    resource: Resource::Products,
    statuses: &["active", "out_of_stock", "archived"],
    search_hint: "Search by product, category or vendor",
    template: "list.html",
    actions: &[],
};

pub static ORDERS: View = View {
    title: "Orders",
    singular: "Order",
    base: "/orders",
    resource: Resource::Orders,
    statuses: &["pending", "processing", "completed", "cancelled"],
    search_hint: "Search by order, customer, vendor or product",
    template: "list.html",
    actions: &[],
};

pub static INVOICES: View = View {
    title: "Invoices",
    singular: "Invoice",
    base: "/invoices",
    resource: Resource::Invoices,
    statuses: &["paid", "unpaid", "overdue"],
    search_hint: "Search by invoice, order or customer",
    template: "list.html",
    actions: &[],
};

pub static TRANSACTIONS: View = View {
    title: "Transactions",
    singular: "Transaction",
    base: "/transactions",
    resource: Resource::Transactions,
    statuses: &["successful", "pending", "failed"],
    search_hint: "Search by reference or user",
    template: "list.html",
    actions: &[],
};

pub static CONTENT: View = View {
    title: "Content",
    singular: "Content item",
    base: "/content",
    resource: Resource::Content,
    statuses: &["published", "pending", "flagged", "removed"],
    search_hint: "Search by title or author",
    template: "list.html",
    actions: &[
        Action {
            status: "published",
            label: "Publish",
        },
        Action {
            status: "flagged",
            label: "Flag",
        },
        Action {
            status: "removed",
            label: "Remove",
        },
    ],
};

pub static NOTIFICATIONS: View = View {
    title: "Notifications",
    singular: "Notification",
    base: "/notifications",
    resource: Resource::Notifications,
    statuses: &["unread", "read"],
    search_hint: "Search notifications",
    template: "notifications.html",
    actions: &[],
};

pub static ONBOARDING: View = View {
    title: "Onboarding",
    singular: "Application",
    base: "/onboarding",
    resource: Resource::Onboarding,
    statuses: &["pending", "approved", "rejected"],
    search_hint: "Search by applicant or email",
    template: "list.html",
    actions: &[
        Action {
            status: "approved",
            label: "Approve",
        },
        Action {
            status: "rejected",
            label: "Reject",
        },
    ],
};

/// Navigation order.
pub static VIEWS: [&View; 11] = [
    &CUSTOMERS,
    &VENDORS,
    &REPAIRERS,
    &COMPANIES,
    &PRODUCTS,
    &ORDERS,
    &INVOICES,
    &TRANSACTIONS,
    &CONTENT,
    &ONBOARDING,
    &NOTIFICATIONS,
];

#[derive(Debug, Serialize)]
pub struct Row {
    pub id: String,
    pub status: String,
    pub cells: Vec<String>,
}

pub fn row<T: Listable>(item: &T) -> Row {
    Row {
        id: item.id().to_owned(),
        status: item.status().to_lowercase(),
        cells: item.cells(),
    }
}

#[derive(Serialize)]
struct QueryEcho<'a> {
    q: &'a str,
    status: &'a str,
    per_page: usize,
}

pub async fn render_list<T: Record>(
    state: &AppState,
    view: &View,
    query: &ListQuery,
) -> Result<HttpResponse, AppError> {
    let per_page = query.per_page(state.page_size);
    let mut context = page_context(view.title, view.base);
    context.insert("base", view.base);
    context.insert("search_hint", view.search_hint);
    context.insert("columns", T::COLUMNS);
    context.insert("page_sizes", &PAGE_SIZES);
    context.insert(
        "query",
        &QueryEcho {
            q: query.term(),
            status: query.status_filter(),
            per_page,
        },
    );

    match backend::fetch_all::<T>(state.backend.as_ref(), view.resource).await {
        Ok(items) => {
            let tabs = build_tabs(&items, view.statuses, query);
            let filtered = filter_items(items, query);
            let page = paginate(filtered, query.page(), per_page).map(|item| row(&item));
            context.insert("tabs", &tabs);
            context.insert("page", &page);
            render_page(StatusCode::OK, view.template, &context)
        }
        Err(e) => {
            log::error!("Failed to load {}: {}", view.title, e);
            context.insert(
                "error",
                &format!("Could not load {}. Please try again.", view.title.to_lowercase()),
            );
            render_page(StatusCode::BAD_GATEWAY, view.template, &context)
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

/// Label/value rows for every scalar field of a record. Nested objects are
/// flattened as `Parent · child`; lists are left to dedicated tables.
pub fn detail_rows(record: &Value) -> Vec<DetailRow> {
    let mut rows = Vec::new();
    if let Value::Object(fields) = record {
        push_rows(None, fields, &mut rows);
    }
    rows
}

fn push_rows(prefix: Option<&str>, fields: &Map<String, Value>, rows: &mut Vec<DetailRow>) {
    for (key, value) in fields {
        let label = match prefix {
            Some(parent) => format!("{} · {}", parent, humanize(key).to_lowercase()),
            None => humanize(key),
        };
        match value {
            Value::Object(inner) => push_rows(Some(&label), inner, rows),
            Value::Array(_) => {}
            scalar => rows.push(DetailRow {
                label,
                value: display_value(scalar),
            }),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_owned(),
        Value::Bool(true) => "Yes".to_owned(),
        Value::Bool(false) => "No".to_owned(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.is_empty() => "-".to_owned(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

pub async fn render_detail<T: Record>(
    state: &AppState,
    view: &'static View,
    id: &str,
) -> Result<HttpResponse, AppError> {
    let mut context = page_context(view.singular, view.base);
    context.insert("base", view.base);
    context.insert("list_title", view.title);
    context.insert("record_id", id);

    match backend::fetch_one::<T>(state.backend.as_ref(), view.resource, id).await {
        Ok(record) => {
            let value = serde_json::to_value(&record)
                .map_err(|e| AppError::BackendError(BackendError::Decode(e.to_string())))?;
            context.insert("heading", &record.heading());
            context.insert("status", &humanize(record.status()));
            context.insert("rows", &detail_rows(&value));
            context.insert("documents", record.documents());
            context.insert("actions", view.actions);
            render_page(StatusCode::OK, "detail.html", &context)
        }
        Err(BackendError::NotFound(_)) => Err(AppError::NotFound),
        Err(e) => {
            log::error!("Failed to load {} {}: {}", view.singular, id, e);
            context.insert("heading", view.singular);
            context.insert(
                "error",
                &format!(
                    "Could not load this {}. Please try again.",
                    view.singular.to_lowercase()
                ),
            );
            render_page(StatusCode::BAD_GATEWAY, "detail.html", &context)
        }
    }
}

async fn list_handler<T: Record>(
    view: &'static View,
    state: Data<AppState>,
    identity: Option<Identity>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    require_login(identity)?;
    render_list::<T>(&state, view, &query).await
}

async fn detail_handler<T: Record>(
    view: &'static View,
    state: Data<AppState>,
    identity: Option<Identity>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_login(identity)?;
    render_detail::<T>(&state, view, &path.into_inner()).await
}

#[derive(Deserialize)]
pub struct StatusForm {
    status: String,
}

async fn status_handler(
    view: &'static View,
    state: Data<AppState>,
    identity: Option<Identity>,
    path: web::Path<String>,
    form: web::Form<StatusForm>,
) -> Result<HttpResponse, AppError> {
    require_login(identity)?;
    let id = path.into_inner();
    let action = view
        .actions
        .iter()
        .find(|action| action.status == form.status)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported status: {}", form.status)))?;

    backend::patch_record(
        state.backend.as_ref(),
        view.resource,
        &id,
        json!({ "status": action.status }),
    )
    .await?;
    log::info!("{} {} marked {}", view.singular, id, action.status);

    Ok(see_other(&format!("{}/{}", view.base, id)))
}

#[post("/notifications/{id}/read")]
pub async fn mark_read_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_login(identity)?;
    let id = path.into_inner();
    backend::mark_notification_read(state.backend.as_ref(), &id).await?;
    Ok(see_other(NOTIFICATIONS.base))
}

fn register<T: Record>(cfg: &mut web::ServiceConfig, view: &'static View) {
    cfg.route(
        view.base,
        web::get().to(
            move |state: Data<AppState>,
                  identity: Option<Identity>,
                  query: web::Query<ListQuery>| {
                list_handler::<T>(view, state, identity, query)
            },
        ),
    );
    cfg.route(
        &format!("{}/{{id}}", view.base),
        web::get().to(
            move |state: Data<AppState>, identity: Option<Identity>, path: web::Path<String>| {
                detail_handler::<T>(view, state, identity, path)
            },
        ),
    );
    if !view.actions.is_empty() {
        cfg.route(
            &format!("{}/{{id}}/status", view.base),
            web::post().to(
                move |state: Data<AppState>,
                      identity: Option<Identity>,
                      path: web::Path<String>,
                      form: web::Form<StatusForm>| {
                    status_handler(view, state, identity, path, form)
                },
            ),
        );
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(mark_read_handler);
    register::<Customer>(cfg, &CUSTOMERS);
    register::<Vendor>(cfg, &VENDORS);
    register::<Repairer>(cfg, &REPAIRERS);
    register::<RepairCompany>(cfg, &COMPANIES);
    register::<Product>(cfg, &PRODUCTS);
    register::<Order>(cfg, &ORDERS);
    register::<Invoice>(cfg, &INVOICES);
    register::<Transaction>(cfg, &TRANSACTIONS);
    register::<ContentItem>(cfg, &CONTENT);
    register::<Notification>(cfg, &NOTIFICATIONS);
    register::<OnboardingApplication>(cfg, &ONBOARDING);
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::json;

    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::test_support::{
        body_text, fixture_data, init_app, login, seed_admin, test_state, test_state_with,
    };

    #[test]
    fn detail_rows_flatten_nested_objects_and_skip_lists() {
        let rows = detail_rows(&json!({
            "reference": "TX-001",
            "amount": 1200.5,
            "paymentInfo": { "method": "card", "bank": null },
            "documents": [{ "name": "ID" }],
            "verified": true
        }));
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.label.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Reference", "TX-001"),
                ("Amount", "1200.5"),
                ("Payment info · method", "card"),
                ("Payment info · bank", "-"),
                ("Verified", "Yes"),
            ]
        );
    }

    #[test]
    fn every_view_is_in_the_navigation_once() {
        let mut bases: Vec<&str> = VIEWS.iter().map(|v| v.base).collect();
        bases.sort_unstable();
        bases.dedup();
        assert_eq!(bases.len(), VIEWS.len());
    }

    #[actix_web::test]
    async fn list_pages_require_login() {
        let (state, _) = test_state().await;
        let app = init_app!(state);
        for view in VIEWS.iter() {
            let request = actix_test::TestRequest::get().uri(view.base).to_request();
            let response = actix_test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", view.base);
            assert_eq!(response.headers().get("location").unwrap(), "/login");
        }
    }

    #[actix_web::test]
    async fn every_list_and_detail_page_renders() {
        let (state, _) = test_state().await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        for view in VIEWS.iter() {
            let list = actix_test::TestRequest::get()
                .uri(view.base)
                .cookie(cookie.clone())
                .to_request();
            let response = actix_test::call_service(&app, list).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", view.base);

            let detail = actix_test::TestRequest::get()
                .uri(&format!("{}/1", view.base))
                .cookie(cookie.clone())
                .to_request();
            let status = actix_test::call_service(&app, detail).await.status();
            assert!(
                status == StatusCode::OK || status == StatusCode::NOT_FOUND,
                "{} detail answered {}",
                view.base,
                status
            );
        }
    }

    #[actix_web::test]
    async fn customers_second_page_shows_the_next_ten() {
        let (state, _) = test_state().await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        let request = actix_test::TestRequest::get()
            .uri("/customers?page=2")
            .cookie(cookie)
            .to_request();
        let body = body_text(actix_test::call_service(&app, request).await).await;
        assert!(body.contains("Customer 11"));
        assert!(body.contains("Customer 20"));
        assert!(!body.contains("Customer 10<"));
        assert!(!body.contains("Customer 21"));
        assert!(body.contains("Showing 11 to 20 of 23"));
    }

    #[actix_web::test]
    async fn search_and_tabs_narrow_the_list() {
        let (state, _) = test_state().await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        let request = actix_test::TestRequest::get()
            .uri("/customers?q=CUSTOMER0&status=suspended")
            .cookie(cookie)
            .to_request();
        let body = body_text(actix_test::call_service(&app, request).await).await;
        assert!(body.contains("customer05@example.com"));
        assert!(!body.contains("customer01@example.com"));
        assert!(!body.contains("customer10@example.com"));
        assert!(body.contains("Suspended (1)"));
        assert!(body.contains("All (9)"));
    }

    #[actix_web::test]
    async fn record_links_encode_the_id() {
        let mut data = fixture_data();
        data["vendors"] = json!([
            {
                "id": "../users?role=admin#top",
                "businessName": "Odd Id Traders",
                "status": "pending"
            }
        ]);
        let (state, _) = test_state_with(MemoryBackend::new(data)).await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        let request = actix_test::TestRequest::get()
            .uri("/vendors")
            .cookie(cookie)
            .to_request();
        let body = body_text(actix_test::call_service(&app, request).await).await;
        assert!(body.contains(r#"href="/vendors/%2E%2E%2Fusers%3Frole%3Dadmin%23top""#));
        assert!(!body.contains("/vendors/../users"));
    }

    #[actix_web::test]
    async fn vendor_detail_lists_verification_documents() {
        let (state, _) = test_state().await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        let request = actix_test::TestRequest::get()
            .uri("/vendors/v1")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Gadget Fixers"));
        assert!(body.contains("CAC certificate"));
        assert!(body.contains("Tunde Bello"));
    }

    #[actix_web::test]
    async fn missing_records_are_not_found() {
        let (state, _) = test_state().await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        let request = actix_test::TestRequest::get()
            .uri("/customers/999")
            .cookie(cookie)
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, request).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn backend_failures_render_a_placeholder() {
        let (state, _) = test_state_with(MemoryBackend::unavailable()).await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        let request = actix_test::TestRequest::get()
            .uri("/transactions")
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_text(response).await;
        assert!(body.contains("Could not load transactions."));

        let request = actix_test::TestRequest::get()
            .uri("/transactions/1")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn moderation_patches_the_content_status() {
        let (state, backend) = test_state().await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        let request = actix_test::TestRequest::post()
            .uri("/content/2/status")
            .cookie(cookie.clone())
            .set_form([("status", "removed")])
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/content/2");
        assert_eq!(backend.snapshot("content")[1]["status"], json!("removed"));

        let request = actix_test::TestRequest::post()
            .uri("/content/2/status")
            .cookie(cookie)
            .set_form([("status", "deleted")])
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, request).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn onboarding_applications_can_be_approved() {
        let (state, backend) = test_state().await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        let request = actix_test::TestRequest::post()
            .uri("/onboarding/1/status")
            .cookie(cookie)
            .set_form([("status", "approved")])
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, request).await.status(),
            StatusCode::SEE_OTHER
        );
        assert_eq!(backend.snapshot("onboarding")[0]["status"], json!("approved"));
    }

    #[actix_web::test]
    async fn notifications_can_be_marked_read() {
        let (state, backend) = test_state().await;
        seed_admin(&state.db_pool).await;
        let app = init_app!(state);
        let cookie = login!(app);

        let request = actix_test::TestRequest::get()
            .uri("/notifications?status=unread")
            .cookie(cookie.clone())
            .to_request();
        let body = body_text(actix_test::call_service(&app, request).await).await;
        assert!(body.contains("New vendor application"));
        assert!(!body.contains("Payout completed"));

        let request = actix_test::TestRequest::post()
            .uri("/notifications/1/read")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(backend.snapshot("notifications")[0]["read"], json!(true));
    }
}
