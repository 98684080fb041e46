use actix_identity::Identity;
use actix_web::{
    get,
    http::StatusCode,
    post,
    web::{self, Data},
    HttpMessage, HttpRequest, HttpResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tera::Context;

use crate::{
    backend::{self, Resource},
    db,
    errors::AppError,
    models::Account,
    routes::{page_context, render_page, see_other},
    utils::{
        hash_password, normalize_email, validate_email, validate_new_password,
        validate_password_length, verify_password,
    },
    AppState,
};

const RESET_TOKEN_TTL_HOURS: i64 = 1;
const INVALID_RESET: &str = "This reset link is invalid or has expired";

/// Submitted values echoed back into a re-rendered form. Passwords never are.
#[derive(Serialize, Default)]
struct FormValues {
    name: String,
    email: String,
}

fn form_page(
    status: StatusCode,
    template: &str,
    title: &str,
    error: Option<&str>,
    values: &FormValues,
    extra: impl FnOnce(&mut Context),
) -> Result<HttpResponse, AppError> {
    let mut context = page_context(title, "");
    context.insert("error", &error);
    context.insert("values", values);
    extra(&mut context);
    render_page(status, template, &context)
}

fn login_identity(request: &HttpRequest, account: &Account) -> Result<(), AppError> {
    Identity::login(&request.extensions(), account.id.to_string())
        .map_err(|e| AppError::IdentityError(e.to_string()))?;
    Ok(())
}

/// Stamps the login locally and, when the backend knows this admin, on the
/// backend user record too. Failures only cost the timestamp.
async fn record_login(state: &AppState, account: &Account) {
    let at = Utc::now().to_rfc3339();
    if let Err(e) = db::touch_last_login(&state.db_pool, account.id, &at).await {
        log::warn!("Failed to record login for account {}: {}", account.id, e);
    }

    let backend = state.backend.as_ref();
    match backend::find_user_by_email(backend, &account.email).await {
        Ok(Some(user)) => {
            let patch = json!({ "lastLogin": at });
            if let Err(e) = backend::patch_record(backend, Resource::Users, &user.id, patch).await {
                log::warn!("Failed to push last login for user {}: {}", user.id, e);
            }
        }
        Ok(None) => log::debug!("No backend user for {}", account.email),
        Err(e) => log::warn!("Failed to look up backend user: {}", e),
    }
}

#[derive(Deserialize)]
pub struct LoginQuery {
    reset: Option<String>,
}

#[get("/login")]
pub async fn login_handler(
    identity: Option<Identity>,
    query: web::Query<LoginQuery>,
) -> Result<HttpResponse, AppError> {
    if identity.is_some() {
        return Ok(see_other("/dashboard"));
    }
    let notice = query
        .reset
        .as_ref()
        .map(|_| "Your password has been reset. Please log in.");
    form_page(
        StatusCode::OK,
        "login.html",
        "Log in",
        None,
        &FormValues::default(),
        |context| context.insert("notice", &notice),
    )
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[post("/login")]
pub async fn login_form_handler(
    web::Form(form): web::Form<LoginForm>,
    state: Data<AppState>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let values = FormValues {
        email: form.email.trim().to_owned(),
        ..FormValues::default()
    };
    let invalid = |status: StatusCode, message: &str| {
        form_page(status, "login.html", "Log in", Some(message), &values, |_| {})
    };

    if form.email.trim().is_empty() || form.password.is_empty() {
        return invalid(StatusCode::BAD_REQUEST, "All fields are required");
    }
    if let Err(message) =
        validate_email(&form.email).and_then(|_| validate_password_length(&form.password))
    {
        return invalid(StatusCode::BAD_REQUEST, message);
    }

    let email = normalize_email(&form.email);
    let account = db::get_account_by_email(&state.db_pool, &email)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch account: {}", e);
            AppError::DatabaseError(e)
        })?;

    let Some(account) = account else {
        log::warn!("Login attempt for unknown email");
        return invalid(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };

    match verify_password(&form.password, &account.pwd_hash) {
        Ok(true) => {}
        Ok(false) => {
            log::warn!("Wrong password for account {}", account.id);
            return invalid(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        Err(e) => {
            log::error!("Unreadable password hash for account {}: {}", account.id, e);
            return invalid(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
    }

    login_identity(&request, &account)?;
    record_login(&state, &account).await;
    log::info!("Account {} logged in", account.id);

    Ok(see_other("/dashboard"))
}

#[get("/register")]
pub async fn register_handler(identity: Option<Identity>) -> Result<HttpResponse, AppError> {
    if identity.is_some() {
        return Ok(see_other("/dashboard"));
    }
    form_page(
        StatusCode::OK,
        "register.html",
        "Create an account",
        None,
        &FormValues::default(),
        |_| {},
    )
}

#[derive(Deserialize)]
pub struct RegisterForm {
    name: String,
    email: String,
    password: String,
    password2: String,
}

#[post("/register")]
pub async fn register_form_handler(
    web::Form(form): web::Form<RegisterForm>,
    state: Data<AppState>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let values = FormValues {
        name: form.name.trim().to_owned(),
        email: form.email.trim().to_owned(),
    };
    let invalid = |status: StatusCode, message: &str| {
        form_page(
            status,
            "register.html",
            "Create an account",
            Some(message),
            &values,
            |_| {},
        )
    };

    if values.name.is_empty()
        || values.email.is_empty()
        || form.password.is_empty()
        || form.password2.is_empty()
    {
        return invalid(StatusCode::BAD_REQUEST, "All fields are required");
    }
    if let Err(message) = validate_email(&form.email)
        .and_then(|_| validate_new_password(&form.password, &form.password2))
    {
        return invalid(StatusCode::BAD_REQUEST, message);
    }

    let email = normalize_email(&form.email);
    if db::get_account_by_email(&state.db_pool, &email)
        .await?
        .is_some()
    {
        return invalid(StatusCode::CONFLICT, "Email already registered");
    }

    let pwd_hash = hash_password(&form.password).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        AppError::PasswordError(e.to_string())
    })?;

    let account = match db::create_account(&state.db_pool, &values.name, &email, &pwd_hash).await {
        Ok(account) => account,
        Err(AppError::Conflict(message)) => return invalid(StatusCode::CONFLICT, &message),
        Err(e) => return Err(e),
    };

    login_identity(&request, &account)?;
    record_login(&state, &account).await;

    Ok(see_other("/dashboard"))
}

#[post("/logout")]
pub async fn logout_handler(identity: Option<Identity>) -> HttpResponse {
    if let Some(identity) = identity {
        identity.logout();
    }
    see_other("/login")
}

#[get("/forgot-password")]
pub async fn forgot_password_handler() -> Result<HttpResponse, AppError> {
    form_page(
        StatusCode::OK,
        "forgot-password.html",
        "Forgot password",
        None,
        &FormValues::default(),
        |_| {},
    )
}

#[derive(Deserialize)]
pub struct ForgotPasswordForm {
    email: String,
}

#[post("/forgot-password")]
pub async fn forgot_password_form_handler(
    web::Form(form): web::Form<ForgotPasswordForm>,
    state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let values = FormValues {
        email: form.email.trim().to_owned(),
        ..FormValues::default()
    };
    if let Err(message) = validate_email(&form.email) {
        return form_page(
            StatusCode::BAD_REQUEST,
            "forgot-password.html",
            "Forgot password",
            Some(message),
            &values,
            |_| {},
        );
    }

    let email = normalize_email(&form.email);
    if let Some(account) = db::get_account_by_email(&state.db_pool, &email).await? {
        let reset = db::create_password_reset(
            &state.db_pool,
            account.id,
            chrono::Duration::hours(RESET_TOKEN_TTL_HOURS),
        )
        .await?;
        // No mail transport: the link goes to the server log.
        log::info!(
            "Password reset link for account {}: /reset-password?token={}",
            account.id,
            reset.token
        );
    } else {
        log::info!("Password reset requested for unknown email");
    }

    form_page(
        StatusCode::OK,
        "forgot-password.html",
        "Forgot password",
        None,
        &FormValues::default(),
        |context| {
            context.insert(
                "notice",
                "If an account exists for that address, a reset link has been sent.",
            )
        },
    )
}

fn reset_page(
    status: StatusCode,
    token: Option<&str>,
    error: Option<&str>,
) -> Result<HttpResponse, AppError> {
    form_page(
        status,
        "reset-password.html",
        "Reset password",
        error,
        &FormValues::default(),
        |context| context.insert("token", &token),
    )
}

#[derive(Deserialize)]
pub struct ResetQuery {
    token: Option<String>,
}

#[get("/reset-password")]
pub async fn reset_password_handler(
    query: web::Query<ResetQuery>,
    state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let Some(token) = query.token.as_deref().filter(|t| !t.is_empty()) else {
        return reset_page(StatusCode::BAD_REQUEST, None, Some(INVALID_RESET));
    };
    match db::find_valid_reset(&state.db_pool, token, Utc::now()).await? {
        Some(_) => reset_page(StatusCode::OK, Some(token), None),
        None => reset_page(StatusCode::BAD_REQUEST, None, Some(INVALID_RESET)),
    }
}

#[derive(Deserialize)]
pub struct ResetPasswordForm {
    token: String,
    password: String,
    password2: String,
}

#[post("/reset-password")]
pub async fn reset_password_form_handler(
    web::Form(form): web::Form<ResetPasswordForm>,
    state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let Some(reset) = db::find_valid_reset(&state.db_pool, &form.token, Utc::now()).await? else {
        return reset_page(StatusCode::BAD_REQUEST, None, Some(INVALID_RESET));
    };
    if let Err(message) = validate_new_password(&form.password, &form.password2) {
        return reset_page(StatusCode::BAD_REQUEST, Some(&form.token), Some(message));
    }

    let pwd_hash = hash_password(&form.password).map_err(|e| {
        log::error!("Failed to hash new password: {}", e);
        AppError::PasswordError(e.to_string())
    })?;
    match db::complete_password_reset(&state.db_pool, &reset, &pwd_hash).await {
        Ok(()) => Ok(see_other("/login?reset=1")),
        Err(AppError::BadRequest(_)) => {
            reset_page(StatusCode::BAD_REQUEST, None, Some(INVALID_RESET))
        }
        Err(e) => Err(e),
    }
}
