use actix_identity::Identity;
use actix_web::{
    get,
    http::StatusCode,
    post,
    web::{self, Data},
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::{
    backend,
    db,
    errors::AppError,
    models::{Account, NotificationSettings},
    routes::{page_context, render_page, require_login},
    utils::{hash_password, normalize_email, validate_email, validate_new_password, verify_password},
    AppState,
};

const SECTION: &str = "/settings/profile";

async fn current_account(
    state: &AppState,
    identity: Option<Identity>,
) -> Result<Account, AppError> {
    let id = require_login(identity)?;
    db::get_account_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(|| {
            log::warn!("Session refers to missing account {}", id);
            AppError::Unauthorized
        })
}

fn settings_page(
    status: StatusCode,
    template: &str,
    title: &str,
    fill: impl FnOnce(&mut Context),
) -> Result<HttpResponse, AppError> {
    let mut context = page_context(title, SECTION);
    fill(&mut context);
    render_page(status, template, &context)
}

#[derive(Serialize)]
struct ProfileValues<'a> {
    name: &'a str,
    email: &'a str,
}

fn profile_page(
    status: StatusCode,
    values: ProfileValues<'_>,
    error: Option<&str>,
    notice: Option<&str>,
) -> Result<HttpResponse, AppError> {
    settings_page(status, "settings/profile.html", "Profile", |context| {
        context.insert("values", &values);
        context.insert("error", &error);
        context.insert("notice", &notice);
    })
}

#[get("/settings/profile")]
pub async fn profile_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    let account = current_account(&state, identity).await?;
    let values = ProfileValues {
        name: &account.name,
        email: &account.email,
    };
    profile_page(StatusCode::OK, values, None, None)
}

#[derive(Deserialize)]
pub struct ProfileForm {
    name: String,
    email: String,
}

#[post("/settings/profile")]
pub async fn profile_form_handler(
    web::Form(form): web::Form<ProfileForm>,
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    let account = current_account(&state, identity).await?;
    let values = ProfileValues {
        name: form.name.trim(),
        email: form.email.trim(),
    };

    if values.name.is_empty() {
        return profile_page(StatusCode::BAD_REQUEST, values, Some("All fields are required"), None);
    }
    if let Err(message) = validate_email(&form.email) {
        return profile_page(StatusCode::BAD_REQUEST, values, Some(message), None);
    }

    let email = normalize_email(&form.email);
    match db::update_profile(&state.db_pool, account.id, values.name, &email).await {
        Ok(updated) => profile_page(
            StatusCode::OK,
            ProfileValues {
                name: &updated.name,
                email: &updated.email,
            },
            None,
            Some("Profile updated"),
        ),
        Err(AppError::Conflict(message)) => {
            profile_page(StatusCode::CONFLICT, values, Some(&message), None)
        }
        Err(e) => Err(e),
    }
}

fn password_page(
    status: StatusCode,
    error: Option<&str>,
    notice: Option<&str>,
) -> Result<HttpResponse, AppError> {
    settings_page(status, "settings/password.html", "Change password", |context| {
        context.insert("error", &error);
        context.insert("notice", &notice);
    })
}

#[get("/settings/password")]
pub async fn password_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    current_account(&state, identity).await?;
    password_page(StatusCode::OK, None, None)
}

#[derive(Deserialize)]
pub struct PasswordForm {
    old_password: String,
    password: String,
    password2: String,
}

#[post("/settings/password")]
pub async fn password_form_handler(
    web::Form(form): web::Form<PasswordForm>,
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    let account = current_account(&state, identity).await?;

    if form.old_password.is_empty() {
        return password_page(StatusCode::BAD_REQUEST, Some("All fields are required"), None);
    }
    match verify_password(&form.old_password, &account.pwd_hash) {
        Ok(true) => {}
        Ok(false) => {
            log::warn!("Wrong old password for account {}", account.id);
            return password_page(
                StatusCode::UNAUTHORIZED,
                Some("Old password is incorrect"),
                None,
            );
        }
        Err(e) => {
            log::error!("Unreadable password hash for account {}: {}", account.id, e);
            return Err(AppError::PasswordError(e.to_string()));
        }
    }
    if let Err(message) = validate_new_password(&form.password, &form.password2) {
        return password_page(StatusCode::BAD_REQUEST, Some(message), None);
    }

    let pwd_hash = hash_password(&form.password).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        AppError::PasswordError(e.to_string())
    })?;
    db::update_password(&state.db_pool, account.id, &pwd_hash).await?;

    password_page(StatusCode::OK, None, Some("Password changed"))
}

#[derive(Debug, Serialize)]
struct Toggle {
    key: &'static str,
    label: &'static str,
    enabled: bool,
}

fn toggles(settings: &NotificationSettings) -> Vec<Toggle> {
    let toggle = |key, label, enabled| Toggle {
        key,
        label,
        enabled,
    };
    vec![
        toggle("email", "Email notifications", settings.email),
        toggle("push", "Push notifications", settings.push),
        toggle("sms", "SMS notifications", settings.sms),
        toggle("order_updates", "Order updates", settings.order_updates),
        toggle(
            "new_registrations",
            "New registrations",
            settings.new_registrations,
        ),
        toggle("marketing", "Marketing", settings.marketing),
    ]
}

fn notifications_page(
    status: StatusCode,
    settings: Option<&NotificationSettings>,
    error: Option<&str>,
    notice: Option<&str>,
) -> Result<HttpResponse, AppError> {
    settings_page(
        status,
        "settings/notifications.html",
        "Notification preferences",
        |context| {
            context.insert("toggles", &settings.map(toggles));
            context.insert("error", &error);
            context.insert("notice", &notice);
        },
    )
}

#[get("/settings/notifications")]
pub async fn notifications_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    current_account(&state, identity).await?;
    match backend::fetch_notification_settings(state.backend.as_ref()).await {
        Ok(settings) => notifications_page(StatusCode::OK, Some(&settings), None, None),
        Err(e) => {
            log::error!("Failed to load notification settings: {}", e);
            notifications_page(
                StatusCode::BAD_GATEWAY,
                None,
                Some("Could not load notification preferences. Please try again."),
                None,
            )
        }
    }
}

/// Checkboxes: a field is present only when ticked.
#[derive(Deserialize)]
pub struct NotificationsForm {
    email: Option<String>,
    push: Option<String>,
    sms: Option<String>,
    order_updates: Option<String>,
    new_registrations: Option<String>,
    marketing: Option<String>,
}

impl From<&NotificationsForm> for NotificationSettings {
    fn from(form: &NotificationsForm) -> Self {
        NotificationSettings {
            email: form.email.is_some(),
            push: form.push.is_some(),
            sms: form.sms.is_some(),
            order_updates: form.order_updates.is_some(),
            new_registrations: form.new_registrations.is_some(),
            marketing: form.marketing.is_some(),
        }
    }
}

#[post("/settings/notifications")]
pub async fn notifications_form_handler(
    web::Form(form): web::Form<NotificationsForm>,
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    let account = current_account(&state, identity).await?;
    let requested = NotificationSettings::from(&form);

    match backend::update_notification_settings(state.backend.as_ref(), &requested).await {
        Ok(saved) => {
            log::info!("Account {} updated notification preferences", account.id);
            notifications_page(StatusCode::OK, Some(&saved), None, Some("Preferences saved"))
        }
        Err(e) => {
            log::error!("Failed to save notification settings: {}", e);
            notifications_page(
                StatusCode::BAD_GATEWAY,
                Some(&requested),
                Some("Could not save notification preferences. Please try again."),
                None,
            )
        }
    }
}
