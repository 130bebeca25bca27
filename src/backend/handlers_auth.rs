//! Gestion des routes nécessitant une authentification utilisateur.
//! Tableau de bord, profil, dons, changement de mot de passe et déconnexion.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::Form,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use log::{error, info, warn};
use serde_json::{json, Map, Value};

use crate::backend::middlewares::{ClientState, SessionUser};
use crate::backend::models::{profile_completion, DonationView, ProfileView, PROFILE_FIELDS};
use crate::backend::pages::{render_form, settle};
use crate::consts::{DONATIONS_COLLECTION, USERS_COLLECTION};
use crate::database::{Database, Filter};
use crate::demo_state::DonationSchedule;
use crate::dom::Document;
use crate::utils::error_messages::{
    remote_failure, AppError, DONATION_FAILED, HISTORY_FAILED, PASSWORD_FAILED, PROFILE_FAILED,
    PROFILE_LOAD_FAILED, PROFILE_MISSING, SIGNOUT_FAILED,
};
use crate::utils::validation::presets::FormKind;
use crate::utils::validation::{SubmitOutcome, ValidatedPayload};

type FormValues = HashMap<String, String>;

fn values(form: &FormValues) -> impl Iterator<Item = (&str, &str)> + Clone {
    form.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

/// Document de l'utilisateur. Les échecs sont signalés au client.
fn load_user(client: &ClientState, user: &SessionUser) -> Option<Value> {
    match client.ctx.database.get(USERS_COLLECTION, user.uid()) {
        Ok(Some(data)) => Some(data),
        Ok(None) => {
            warn!("No user document for {}", user.uid());
            client.notifier.danger(PROFILE_MISSING);
            None
        }
        Err(e) => {
            error!("Loading profile of {}: {:#}", user.uid(), e);
            client.notifier.danger(PROFILE_LOAD_FAILED);
            None
        }
    }
}

/// Historique des dons, du plus récent au plus ancien
fn donation_history(database: &Database, uid: &str) -> anyhow::Result<Vec<DonationView>> {
    let mut donations: Vec<Value> = database
        .query(DONATIONS_COLLECTION, &Filter::eq("userId", uid))?
        .into_iter()
        .map(|(_, data)| data)
        .collect();
    donations.sort_by(|a, b| {
        let date = |d: &Value| d.get("date").and_then(Value::as_str).unwrap_or("").to_string();
        date(b).cmp(&date(a))
    });
    Ok(donations.iter().map(DonationView::from_document).collect())
}

/// Tableau de bord, avec le formulaire de don décrit par `doc`
async fn render_dashboard(
    client: &ClientState,
    user: &SessionUser,
    doc: &Document,
) -> Result<Html<String>, AppError> {
    let profile = load_user(client, user).map(|data| ProfileView::from_document(&data));

    let (donations, history_error) = match donation_history(&client.ctx.database, user.uid()) {
        Ok(donations) => (donations, None),
        Err(e) => {
            error!("Loading donation history of {}: {:#}", user.uid(), e);
            (Vec::new(), Some(HISTORY_FAILED))
        }
    };

    render_form(
        client,
        Some(user),
        FormKind::ScheduleDonation,
        doc,
        "/dashboard",
        "dashboard",
        "Dashboard",
        "Schedule donation",
        json!({
            "profile": profile,
            "donations": donations,
            "history_error": history_error,
            "schedule": client.demo.donation_schedule(),
        }),
    )
    .await
}

/// Affiche le tableau de bord de l'utilisateur
pub async fn dashboard(client: ClientState, user: SessionUser) -> Result<Html<String>, AppError> {
    render_dashboard(&client, &user, &FormKind::ScheduleDonation.document()).await
}

/// Ferme la session
pub async fn signout(client: ClientState, user: SessionUser) -> Result<Redirect, AppError> {
    if let Err(e) = client.ctx.identity.sign_out(user.uid()).await {
        error!("Sign-out of {}: {}", user.uid(), e);
        client.notifier.danger(&remote_failure(SIGNOUT_FAILED, &e));
    }

    SessionUser::sign_out(&client.session).await?;
    client.notifier.info("You have been signed out.");
    client.save().await?;
    Ok(Redirect::to("/"))
}

/// Document du formulaire de profil, rempli avec le profil enregistré
pub async fn profile_page(client: ClientState, user: SessionUser) -> Result<Html<String>, AppError> {
    let kind = FormKind::Profile;
    let mut doc = kind.document();

    if let Some(data) = load_user(&client, &user) {
        let stored: Vec<(&str, &str)> = PROFILE_FIELDS
            .iter()
            .filter_map(|field| data.get(*field).and_then(Value::as_str).map(|v| (*field, v)))
            .collect();
        doc.fill(stored.iter().copied());
    }

    render_profile(&client, &user, &doc).await
}

async fn render_profile(
    client: &ClientState,
    user: &SessionUser,
    doc: &Document,
) -> Result<Html<String>, AppError> {
    let completion = profile_completion(
        PROFILE_FIELDS
            .iter()
            .filter_map(|field| doc.element(field).map(|e| (*field, e.value()))),
    );

    render_form(
        client,
        Some(user),
        FormKind::Profile,
        doc,
        "/profile",
        "profile",
        "Profile",
        "Save profile",
        json!({ "completion": completion }),
    )
    .await
}

/// Enregistre les champs du profil et le taux de complétion
async fn save_profile(
    database: Arc<Database>,
    uid: String,
    payload: ValidatedPayload,
) -> anyhow::Result<()> {
    let mut fields: Map<String, Value> = payload
        .iter()
        .map(|(field, value)| (field.to_string(), Value::from(value)))
        .collect();
    fields.insert(
        "profileCompletion".to_string(),
        Value::from(profile_completion(payload.iter())),
    );
    fields.insert("updatedAt".to_string(), Value::from(Utc::now().to_rfc3339()));

    match database.get(USERS_COLLECTION, &uid)? {
        Some(_) => database.update(USERS_COLLECTION, &uid, fields),
        None => database.set(USERS_COLLECTION, &uid, Value::Object(fields)),
    }
}

pub async fn update_profile(
    client: ClientState,
    user: SessionUser,
    Form(form): Form<FormValues>,
) -> Result<Response, AppError> {
    let kind = FormKind::Profile;
    let mut doc = kind.document();
    doc.fill(values(&form));
    let mut guard = kind.guard(&doc)?;

    let database = client.ctx.database.clone();
    let uid = user.uid().to_string();
    let outcome = guard.handle_submit(&mut doc, &client.notifier, |payload| {
        tokio::spawn(save_profile(database, uid, payload))
    });

    if let SubmitOutcome::Submitted(task) = outcome {
        if settle(task, &client.notifier, PROFILE_FAILED).await.is_some() {
            client.save().await?;
            return Ok(Redirect::to("/dashboard").into_response());
        }
    }

    Ok(render_profile(&client, &user, &doc).await?.into_response())
}

/// Enregistre une demande de don, en attente de confirmation
async fn create_donation(
    database: Arc<Database>,
    uid: String,
    payload: ValidatedPayload,
) -> anyhow::Result<DonationSchedule> {
    let schedule = DonationSchedule {
        blood_type: payload.get("bloodType").unwrap_or_default().to_string(),
        location: payload.get("location").unwrap_or_default().to_string(),
        date: payload.get("date").unwrap_or_default().to_string(),
    };

    let id = database.create(
        DONATIONS_COLLECTION,
        json!({
            "userId": uid,
            "bloodType": &schedule.blood_type,
            "location": &schedule.location,
            "date": &schedule.date,
            "status": "pending",
            "createdAt": Utc::now().to_rfc3339(),
        }),
    )?;
    info!("Donation {} scheduled", id);
    Ok(schedule)
}

pub async fn schedule_donation(
    mut client: ClientState,
    user: SessionUser,
    Form(form): Form<FormValues>,
) -> Result<Response, AppError> {
    let kind = FormKind::ScheduleDonation;
    let mut doc = kind.document();
    doc.fill(values(&form));
    let mut guard = kind.guard(&doc)?;

    let database = client.ctx.database.clone();
    let uid = user.uid().to_string();
    let outcome = guard.handle_submit(&mut doc, &client.notifier, |payload| {
        tokio::spawn(create_donation(database, uid, payload))
    });

    if let SubmitOutcome::Submitted(task) = outcome {
        if let Some(schedule) = settle(task, &client.notifier, DONATION_FAILED).await {
            client
                .demo
                .set_donation_schedule(&schedule)
                .map_err(anyhow::Error::from)?;
            client.save().await?;
            return Ok(Redirect::to("/dashboard").into_response());
        }
    }

    Ok(render_dashboard(&client, &user, &doc).await?.into_response())
}

pub async fn password_page(client: ClientState, user: SessionUser) -> Result<Html<String>, AppError> {
    let kind = FormKind::ChangePassword;
    render_password(&client, &user, &kind.document()).await
}

async fn render_password(
    client: &ClientState,
    user: &SessionUser,
    doc: &Document,
) -> Result<Html<String>, AppError> {
    render_form(
        client,
        Some(user),
        FormKind::ChangePassword,
        doc,
        "/account/password",
        "password",
        "Password",
        "Update password",
        json!({}),
    )
    .await
}

pub async fn change_password(
    client: ClientState,
    user: SessionUser,
    Form(form): Form<FormValues>,
) -> Result<Response, AppError> {
    let kind = FormKind::ChangePassword;
    let mut doc = kind.document();
    doc.fill(values(&form));
    let mut guard = kind.guard(&doc)?;

    let identity = client.ctx.identity.clone();
    let uid = user.uid().to_string();
    let outcome = guard.handle_submit(&mut doc, &client.notifier, |payload| {
        tokio::spawn(async move {
            let current = payload.get("currentPassword").unwrap_or_default();
            let new = payload.get("newPassword").unwrap_or_default();
            Ok::<_, anyhow::Error>(identity.update_password(&uid, current, new).await?)
        })
    });

    if let SubmitOutcome::Submitted(task) = outcome {
        if settle(task, &client.notifier, PASSWORD_FAILED).await.is_some() {
            client.save().await?;
            return Ok(Redirect::to("/dashboard").into_response());
        }
    }

    Ok(render_password(&client, &user, &doc).await?.into_response())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    use super::*;
    use crate::backend::router::get_router;
    use crate::config::AppConfig;
    use crate::context::AppContext;

    fn context() -> Arc<AppContext> {
        Arc::new(AppContext::in_memory(AppConfig::default()).unwrap())
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    /// Crée un compte et retourne le cookie de la session ouverte
    async fn signed_in(ctx: &Arc<AppContext>, app: &Router) -> (String, String) {
        let credential = ctx
            .identity
            .create_account("ada@example.com", "Secret123")
            .await
            .unwrap();
        ctx.database
            .set(
                USERS_COLLECTION,
                &credential.uid,
                json!({"fullName": "Ada Lovelace", "email": "ada@example.com"}),
            )
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/signin",
                None,
                "email=ada%40example.com&password=Secret123",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");

        let cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        (cookie, credential.uid)
    }

    #[tokio::test]
    async fn test_dashboard_requires_session() {
        let response = get_router(context())
            .oneshot(request("GET", "/dashboard", None, ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/signin");
    }

    #[tokio::test]
    async fn test_dashboard_shows_profile_and_empty_history() {
        let ctx = context();
        let app = get_router(ctx.clone());
        let (cookie, _) = signed_in(&ctx, &app).await;

        let response = app
            .oneshot(request("GET", "/dashboard", Some(&cookie), ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Welcome, ada@example.com"));
        assert!(body.contains("Ada Lovelace"));
        assert!(body.contains("Not Provided"));
        assert!(body.contains("No donation history found."));
    }

    #[tokio::test]
    async fn test_schedule_donation_creates_pending_record() {
        let ctx = context();
        let app = get_router(ctx.clone());
        let (cookie, uid) = signed_in(&ctx, &app).await;

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/donations/schedule",
                Some(&cookie),
                "bloodType=O%2B&location=Accra&date=2025-05-12",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let donations = ctx
            .database
            .query(DONATIONS_COLLECTION, &Filter::eq("userId", uid.as_str()))
            .unwrap();
        assert_eq!(donations.len(), 1);
        assert_eq!(donations[0].1["status"], "pending");
        assert_eq!(donations[0].1["bloodType"], "O+");

        let response = app
            .oneshot(request("GET", "/dashboard", Some(&cookie), ""))
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.contains("O+ Donation"));
        assert!(body.contains("May 12, 2025"));
    }

    #[tokio::test]
    async fn test_invalid_donation_is_not_recorded() {
        let ctx = context();
        let app = get_router(ctx.clone());
        let (cookie, uid) = signed_in(&ctx, &app).await;

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/donations/schedule",
                Some(&cookie),
                "bloodType=O%2B&location=&date=12%2F05%2F2025",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Location is required."));
        assert!(body.contains("Please enter a valid date (YYYY-MM-DD)."));
        assert!(ctx
            .database
            .query(DONATIONS_COLLECTION, &Filter::eq("userId", uid.as_str()))
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_profile_update_stores_completion() {
        let ctx = context();
        let app = get_router(ctx.clone());
        let (cookie, uid) = signed_in(&ctx, &app).await;

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/profile",
                Some(&cookie),
                "fullName=Ada+Lovelace&phoneNumber=%2B233+20+123+4567&bloodGroup=AB-\
                 &dateOfBirth=1990-12-10",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let user = ctx.database.get(USERS_COLLECTION, &uid).unwrap().unwrap();
        assert_eq!(user["bloodGroup"], "AB-");
        assert_eq!(user["profileCompletion"], 57);
        assert_eq!(user["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_weak_new_password_is_rejected_natively() {
        let ctx = context();
        let app = get_router(ctx.clone());
        let (cookie, _) = signed_in(&ctx, &app).await;

        let response = app
            .oneshot(request(
                "POST",
                "/account/password",
                Some(&cookie),
                "currentPassword=Secret123&newPassword=weakpass",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("data-custom-validity=\"At least one uppercase letter."));
        assert!(!body.contains("newPassword-feedback"));
    }

    #[tokio::test]
    async fn test_signout_clears_session() {
        let ctx = context();
        let app = get_router(ctx.clone());
        let (cookie, _) = signed_in(&ctx, &app).await;

        let response = app
            .clone()
            .oneshot(request("POST", "/signout", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let response = app
            .oneshot(request("GET", "/dashboard", Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(location(&response), "/signin");
    }
}
