//! How each marketplace record appears in list and detail views.

use crate::{
    listing::{humanize, Listable},
    models::{
        ContentItem, Customer, Invoice, Notification, OnboardingApplication, Order, Product,
        RepairCompany, Repairer, Transaction, Vendor, VerificationDocument,
    },
    routes::views::Record,
};

/// Two decimals with thousands separators: `1234567.5` becomes `1,234,567.50`.
pub fn money(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, frac) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac)
}

/// Date part of an ISO timestamp.
pub fn short_date(timestamp: &str) -> String {
    timestamp.get(..10).unwrap_or(timestamp).to_owned()
}

fn rating(value: f64) -> String {
    format!("{:.1}", value)
}

impl Listable for Customer {
    const COLUMNS: &'static [&'static str] =
        &["Name", "Email", "Phone", "Location", "Status", "Joined"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.location.clone(),
            humanize(&self.status),
            short_date(&self.joined_at),
        ]
    }
}

impl Record for Customer {
    fn heading(&self) -> String {
        self.name.clone()
    }
}

impl Listable for Vendor {
    const COLUMNS: &'static [&'static str] =
        &["Business", "Owner", "Email", "Location", "Products", "Status"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.business_name.as_str(),
            self.owner_name.as_str(),
            self.email.as_str(),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.business_name.clone(),
            self.owner_name.clone(),
            self.email.clone(),
            self.location.clone(),
            self.products_count.to_string(),
            humanize(&self.status),
        ]
    }
}

impl Record for Vendor {
    fn heading(&self) -> String {
        self.business_name.clone()
    }

    fn documents(&self) -> &[VerificationDocument] {
        &self.documents
    }
}

impl Listable for Repairer {
    const COLUMNS: &'static [&'static str] =
        &["Name", "Email", "Specialty", "Location", "Rating", "Status"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.specialty.as_str(),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.specialty.clone(),
            self.location.clone(),
            rating(self.rating),
            humanize(&self.status),
        ]
    }
}

impl Record for Repairer {
    fn heading(&self) -> String {
        self.name.clone()
    }

    fn documents(&self) -> &[VerificationDocument] {
        &self.documents
    }
}

impl Listable for RepairCompany {
    const COLUMNS: &'static [&'static str] =
        &["Company", "Email", "Phone", "Repairers", "Rating", "Status"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.repairers_count.to_string(),
            rating(self.rating),
            humanize(&self.status),
        ]
    }
}

impl Record for RepairCompany {
    fn heading(&self) -> String {
        self.name.clone()
    }
}

impl Listable for Product {
    const COLUMNS: &'static [&'static str] =
        &["Product", "Category", "Vendor", "Price", "Stock", "Status"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.category.as_str(),
            self.vendor_name.as_str(),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.category.clone(),
            self.vendor_name.clone(),
            money(self.price),
            self.stock.to_string(),
            humanize(&self.status),
        ]
    }
}

impl Record for Product {
    fn heading(&self) -> String {
        self.name.clone()
    }
}

impl Listable for Order {
    const COLUMNS: &'static [&'static str] =
        &["Order", "Customer", "Vendor", "Product", "Amount", "Status", "Date"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.customer_name.as_str(),
            self.vendor_name.as_str(),
            self.product.as_str(),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("#{}", self.id),
            self.customer_name.clone(),
            self.vendor_name.clone(),
            self.product.clone(),
            money(self.amount),
            humanize(&self.status),
            short_date(&self.created_at),
        ]
    }
}

impl Record for Order {
    fn heading(&self) -> String {
        format!("Order #{}", self.id)
    }
}

impl Listable for Invoice {
    const COLUMNS: &'static [&'static str] =
        &["Invoice", "Order", "Customer", "Amount", "Status", "Due"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.order_id.as_str(),
            self.customer_name.as_str(),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("INV-{}", self.id),
            format!("#{}", self.order_id),
            self.customer_name.clone(),
            money(self.amount),
            humanize(&self.status),
            short_date(&self.due_at),
        ]
    }
}

impl Record for Invoice {
    fn heading(&self) -> String {
        format!("Invoice INV-{}", self.id)
    }
}

impl Listable for Transaction {
    const COLUMNS: &'static [&'static str] =
        &["Reference", "User", "Type", "Amount", "Status", "Date"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.reference.as_str(), self.user_name.as_str()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.reference.clone(),
            self.user_name.clone(),
            humanize(&self.kind),
            money(self.amount),
            humanize(&self.status),
            short_date(&self.date),
        ]
    }
}

impl Record for Transaction {
    fn heading(&self) -> String {
        format!("Transaction {}", self.reference)
    }
}

impl Listable for ContentItem {
    const COLUMNS: &'static [&'static str] =
        &["Title", "Author", "Type", "Reports", "Status", "Created"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.author.as_str()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.author.clone(),
            humanize(&self.kind),
            self.reports.to_string(),
            humanize(&self.status),
            short_date(&self.created_at),
        ]
    }
}

impl Record for ContentItem {
    fn heading(&self) -> String {
        self.title.clone()
    }
}

impl Listable for Notification {
    const COLUMNS: &'static [&'static str] = &["Title", "Message", "Category", "Received"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        if self.read {
            "read"
        } else {
            "unread"
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.message.clone(),
            humanize(&self.category),
            short_date(&self.created_at),
        ]
    }
}

impl Record for Notification {
    fn heading(&self) -> String {
        self.title.clone()
    }
}

impl Listable for OnboardingApplication {
    const COLUMNS: &'static [&'static str] = &["Applicant", "Email", "Type", "Submitted", "Status"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.applicant_name.as_str(), self.email.as_str()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.applicant_name.clone(),
            self.email.clone(),
            humanize(&self.kind),
            short_date(&self.submitted_at),
            humanize(&self.status),
        ]
    }
}

impl Record for OnboardingApplication {
    fn heading(&self) -> String {
        format!("{} application", self.applicant_name)
    }

    fn documents(&self) -> &[VerificationDocument] {
        &self.documents
    }
}
