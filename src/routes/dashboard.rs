use std::cmp::Reverse;

use actix_identity::Identity;
use actix_web::{get, http::StatusCode, web::Data, HttpResponse};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::{
    backend::{fetch_all, BackendError, Resource},
    errors::AppError,
    listing::Listable,
    models::{
        Customer, Notification, OnboardingApplication, RepairCompany, Repairer, Transaction,
        Vendor,
    },
    routes::{page_context, records::money, render_page, require_login, views::{row, Row}},
    AppState,
};

const RECENT_TRANSACTIONS: usize = 5;

#[derive(Debug, Serialize)]
struct StatCard {
    label: &'static str,
    link: &'static str,
    /// `None` when the collection could not be loaded.
    value: Option<String>,
}

fn card<T>(
    label: &'static str,
    link: &'static str,
    result: &Result<Vec<T>, BackendError>,
    summarize: impl Fn(&[T]) -> String,
) -> StatCard {
    let value = match result {
        Ok(items) => Some(summarize(items)),
        Err(e) => {
            log::warn!("Dashboard could not load {}: {}", label, e);
            None
        }
    };
    StatCard { label, link, value }
}

fn count_status<T: Listable>(items: &[T], status: &str) -> usize {
    items
        .iter()
        .filter(|item| item.status().eq_ignore_ascii_case(status))
        .count()
}

pub fn successful_volume(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.status.eq_ignore_ascii_case("successful"))
        .map(|tx| tx.amount)
        .sum()
}

/// RFC 3339 timestamps or bare `YYYY-MM-DD` dates (taken as midnight UTC).
fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc().fixed_offset())
    })
}

/// Newest first. Unparseable dates go last, ordered by their raw text.
pub fn recent_transactions(transactions: &[Transaction], n: usize) -> Vec<&Transaction> {
    let mut recent: Vec<&Transaction> = transactions.iter().collect();
    recent.sort_by_cached_key(|tx| Reverse((parse_date(&tx.date), tx.date.clone())));
    recent.truncate(n);
    recent
}

#[get("/dashboard")]
pub async fn dashboard_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    require_login(identity)?;
    let backend = state.backend.as_ref();

    let (customers, vendors, repairers, companies, onboarding, notifications, transactions) =
        tokio::join!(
            fetch_all::<Customer>(backend, Resource::Customers),
            fetch_all::<Vendor>(backend, Resource::Vendors),
            fetch_all::<Repairer>(backend, Resource::Repairers),
            fetch_all::<RepairCompany>(backend, Resource::Companies),
            fetch_all::<OnboardingApplication>(backend, Resource::Onboarding),
            fetch_all::<Notification>(backend, Resource::Notifications),
            fetch_all::<Transaction>(backend, Resource::Transactions),
        );

    let cards = vec![
        card("Customers", "/customers", &customers, |items| {
            items.len().to_string()
        }),
        card("Vendors", "/vendors", &vendors, |items| items.len().to_string()),
        card("Repairers", "/repairers", &repairers, |items| {
            items.len().to_string()
        }),
        card("Repair companies", "/companies", &companies, |items| {
            items.len().to_string()
        }),
        card(
            "Pending onboarding",
            "/onboarding?status=pending",
            &onboarding,
            |items| count_status(items, "pending").to_string(),
        ),
        card(
            "Unread notifications",
            "/notifications?status=unread",
            &notifications,
            |items| count_status(items, "unread").to_string(),
        ),
        card(
            "Transaction volume",
            "/transactions?status=successful",
            &transactions,
            |items| money(successful_volume(items)),
        ),
    ];

    let recent: Vec<Row> = match &transactions {
        Ok(items) => recent_transactions(items, RECENT_TRANSACTIONS)
            .into_iter()
            .map(row)
            .collect(),
        Err(_) => Vec::new(),
    };

    let mut context = page_context("Dashboard", "/dashboard");
    context.insert("cards", &cards);
    context.insert("recent", &recent);
    context.insert("recent_unavailable", &transactions.is_err());
    context.insert("columns", Transaction::COLUMNS);
    render_page(StatusCode::OK, "dashboard.html", &context)
}
