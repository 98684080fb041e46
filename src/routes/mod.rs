use actix_files::NamedFile;
use actix_identity::Identity;
use actix_web::{
    get,
    http::{header, StatusCode},
    web, HttpResponse, Responder,
};
use serde::Serialize;
use tera::Context;

use crate::{errors::AppError, TEMPLATES};

pub mod auth;
pub mod dashboard;
pub mod records;
pub mod settings;
pub mod views;

#[derive(Serialize)]
struct NavLink {
    path: &'static str,
    label: &'static str,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(favicon_handler)
        .service(index_handler)
        .service(auth::login_handler)
        .service(auth::login_form_handler)
        .service(auth::register_handler)
        .service(auth::register_form_handler)
        .service(auth::logout_handler)
        .service(auth::forgot_password_handler)
        .service(auth::forgot_password_form_handler)
        .service(auth::reset_password_handler)
        .service(auth::reset_password_form_handler)
        .service(dashboard::dashboard_handler)
        .service(settings::profile_handler)
        .service(settings::profile_form_handler)
        .service(settings::password_handler)
        .service(settings::password_form_handler)
        .service(settings::notifications_handler)
        .service(settings::notifications_form_handler);
    views::configure(cfg);
}

pub fn render(template: &str, context: &Context) -> Result<String, AppError> {
    TEMPLATES.render(template, context).map_err(|e| {
        log::error!("Failed to render template {}: {}", template, e);
        AppError::TemplateError(e)
    })
}

pub fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub fn render_page(
    status: StatusCode,
    template: &str,
    context: &Context,
) -> Result<HttpResponse, AppError> {
    Ok(html(status, render(template, context)?))
}

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Base template context. `section` is the path of the highlighted nav entry;
/// an empty section renders the page without navigation (auth forms).
pub fn page_context(title: &str, section: &str) -> Context {
    let mut nav = vec![NavLink {
        path: "/dashboard",
        label: "Dashboard",
    }];
    nav.extend(views::VIEWS.iter().map(|view| NavLink {
        path: view.base,
        label: view.title,
    }));
    nav.push(NavLink {
        path: "/settings/profile",
        label: "Settings",
    });

    let mut context = Context::new();
    context.insert("title", title);
    context.insert("section", section);
    context.insert("nav", &nav);
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context.insert("error", &Option::<String>::None);
    context.insert("notice", &Option::<String>::None);
    context
}

/// Account id of the logged-in admin, or `Unauthorized` (redirect to login).
pub fn require_login(identity: Option<Identity>) -> Result<i64, AppError> {
    let identity = identity.ok_or(AppError::Unauthorized)?;
    let id = identity
        .id()
        .map_err(|e| AppError::IdentityError(e.to_string()))?;
    id.parse().map_err(|_| {
        log::warn!("Session carries a malformed identity: {}", id);
        AppError::Unauthorized
    })
}

#[get("/")]
pub async fn index_handler(identity: Option<Identity>) -> impl Responder {
    if identity.is_some() {
        see_other("/dashboard")
    } else {
        see_other("/login")
    }
}

#[get("/favicon.ico")]
pub async fn favicon_handler() -> Result<impl Responder, AppError> {
    Ok(NamedFile::open("static/favicon.svg")?)
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test as actix_test};

    use crate::test_support::{init_app, test_state};

    #[actix_web::test]
    async fn index_sends_anonymous_visitors_to_login() {
        let (state, _) = test_state().await;
        let app = init_app!(state);
        let request = actix_test::TestRequest::get().uri("/").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }

    #[actix_web::test]
    async fn unknown_paths_answer_the_not_found_page() {
        let (state, _) = test_state().await;
        let app = init_app!(state);
        let get = actix_test::TestRequest::get().uri("/no/such/page").to_request();
        assert_eq!(actix_test::call_service(&app, get).await.status(), StatusCode::NOT_FOUND);

        let delete = actix_test::TestRequest::delete().uri("/no/such/page").to_request();
        assert_eq!(
            actix_test::call_service(&app, delete).await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[actix_web::test]
    async fn favicon_is_served() {
        let (state, _) = test_state().await;
        let app = init_app!(state);
        let request = actix_test::TestRequest::get().uri("/favicon.ico").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
