//! Gestion des routes accessibles sans authentification.
//! Contient les handlers pour la page d'accueil, l'inscription, la connexion,
//! la validation des champs, le don monétaire, le forum et les préférences
//! du client.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Form, Json, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::backend::middlewares::{ClientState, SessionUser};
use crate::backend::models::ValidationResult;
use crate::backend::pages::{render_form, render_page, safe_next, settle};
use crate::consts::USERS_COLLECTION;
use crate::dom::Document;
use crate::database::Database;
use crate::demo_state::PaymentIntent;
use crate::identity::{Credential, IdentityProvider};
use crate::utils::error_messages::{
    remote_failure, AppError, MESSAGE_FAILED, SIGNIN_FAILED, SIGNUP_FAILED,
};
use crate::utils::validation::presets::FormKind;
use crate::utils::validation::{SubmitOutcome, TextInput, ValidatedPayload};

type FormValues = HashMap<String, String>;

fn values(form: &FormValues) -> impl Iterator<Item = (&str, &str)> + Clone {
    form.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

/// Chemin de retour des formulaires de préférences
#[derive(Deserialize)]
pub struct NextForm {
    next: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatForm {
    message: String,
}

/// Affiche la page d'accueil
pub async fn index(
    client: ClientState,
    user: Option<SessionUser>,
) -> Result<Html<String>, AppError> {
    render_page(&client, user.as_ref(), "/", "index", "Home", json!({})).await
}

pub async fn signup_page(
    client: ClientState,
    user: Option<SessionUser>,
) -> Result<Html<String>, AppError> {
    let kind = FormKind::SignUp;
    render_form(
        &client,
        user.as_ref(),
        kind,
        &kind.document(),
        "/signup",
        "signup",
        "Sign up",
        "Create account",
        json!({}),
    )
    .await
}

/// Crée le compte, puis le document de l'utilisateur.
async fn create_account(
    identity: Arc<dyn IdentityProvider>,
    database: Arc<Database>,
    payload: ValidatedPayload,
) -> Result<Credential> {
    let email = payload.get("email").unwrap_or_default();
    let password = payload.get("password").unwrap_or_default();
    let credential = identity.create_account(email, password).await?;

    database.set(
        USERS_COLLECTION,
        &credential.uid,
        json!({
            "fullName": payload.get("fullName").unwrap_or_default(),
            "email": &credential.email,
            "createdAt": Utc::now().to_rfc3339(),
        }),
    )?;
    Ok(credential)
}

/// Valide le formulaire d'inscription et crée le compte
pub async fn signup(
    client: ClientState,
    user: Option<SessionUser>,
    Form(form): Form<FormValues>,
) -> Result<Response, AppError> {
    let kind = FormKind::SignUp;
    let mut doc = kind.document();
    doc.fill(values(&form));
    let mut guard = kind.guard(&doc)?;

    let identity = client.ctx.identity.clone();
    let database = client.ctx.database.clone();
    let outcome = guard.handle_submit(&mut doc, &client.notifier, |payload| {
        tokio::spawn(create_account(identity, database, payload))
    });

    if let SubmitOutcome::Submitted(task) = outcome {
        if let Some(credential) = settle(task, &client.notifier, SIGNUP_FAILED).await {
            info!("New donor registered: {}", credential.email);
            client.save().await?;
            return Ok(Redirect::to("/signin").into_response());
        }
    }

    let page = render_form(
        &client,
        user.as_ref(),
        kind,
        &doc,
        "/signup",
        "signup",
        "Sign up",
        "Create account",
        json!({}),
    )
    .await?;
    Ok(page.into_response())
}

pub async fn signin_page(
    client: ClientState,
    user: Option<SessionUser>,
) -> Result<Html<String>, AppError> {
    let kind = FormKind::SignIn;
    render_form(
        &client,
        user.as_ref(),
        kind,
        &kind.document(),
        "/signin",
        "signin",
        "Sign in",
        "Sign in",
        json!({}),
    )
    .await
}

/// Vérifie les identifiants et ouvre la session
pub async fn signin(
    client: ClientState,
    user: Option<SessionUser>,
    Form(form): Form<FormValues>,
) -> Result<Response, AppError> {
    let kind = FormKind::SignIn;
    let mut doc = kind.document();
    doc.fill(values(&form));
    let mut guard = kind.guard(&doc)?;

    let identity = client.ctx.identity.clone();
    let outcome = guard.handle_submit(&mut doc, &client.notifier, |payload| {
        tokio::spawn(async move {
            let email = payload.get("email").unwrap_or_default();
            let password = payload.get("password").unwrap_or_default();
            Ok::<_, anyhow::Error>(identity.sign_in(email, password).await?)
        })
    });

    if let SubmitOutcome::Submitted(task) = outcome {
        if let Some(credential) = settle(task, &client.notifier, SIGNIN_FAILED).await {
            SessionUser::sign_in(&client.session, &credential).await?;
            client.save().await?;
            return Ok(Redirect::to("/dashboard").into_response());
        }
    }

    let page = render_form(
        &client,
        user.as_ref(),
        kind,
        &doc,
        "/signin",
        "signin",
        "Sign in",
        "Sign in",
        json!({}),
    )
    .await?;
    Ok(page.into_response())
}

/// Valide un champ quand l'utilisateur le quitte.
/// Le corps contient les valeurs courantes de tout le formulaire.
pub async fn validate_field(
    Path((form_name, field)): Path<(String, String)>,
    Form(form): Form<FormValues>,
) -> Result<Response, AppError> {
    let Some(kind) = FormKind::from_name(&form_name) else {
        return Ok((StatusCode::NOT_FOUND, "Unknown form").into_response());
    };

    let mut doc = kind.document();
    doc.fill(values(&form));
    let mut guard = kind.guard(&doc)?;

    let valid = guard.blur(&mut doc, &field);
    let message = guard
        .form_state()
        .field(&field)
        .and_then(|state| state.message.clone());

    Ok(Json(ValidationResult {
        field,
        valid,
        message,
        display: kind.display(),
    })
    .into_response())
}

/// Montant saisi, arrondi à deux décimales
fn format_amount(amount: &str) -> String {
    amount
        .parse::<f64>()
        .map(|amount| format!("{amount:.2}"))
        .unwrap_or_else(|_| amount.to_string())
}

fn intent_view(intent: &PaymentIntent) -> serde_json::Value {
    json!({
        "summary": intent.summary(),
        "method": &intent.method,
        "amount": &intent.amount,
    })
}

/// Page de don : saisie, confirmation ou remerciement selon l'étape
async fn render_donate(
    client: &ClientState,
    user: Option<&SessionUser>,
    doc: &Document,
    confirm: Option<&PaymentIntent>,
    thanks: Option<&PaymentIntent>,
) -> Result<Html<String>, AppError> {
    render_form(
        client,
        user,
        FormKind::Payment,
        doc,
        "/donate",
        "donate",
        "Donate",
        "Continue",
        json!({
            "confirm": confirm.map(intent_view),
            "thanks": thanks.map(intent_view),
        }),
    )
    .await
}

pub async fn donate_page(
    client: ClientState,
    user: Option<SessionUser>,
) -> Result<Html<String>, AppError> {
    let doc = FormKind::Payment.document();
    render_donate(&client, user.as_ref(), &doc, None, None).await
}

/// Valide le montant et le moyen de paiement, puis passe à la confirmation
pub async fn donate(
    mut client: ClientState,
    user: Option<SessionUser>,
    Form(form): Form<FormValues>,
) -> Result<Html<String>, AppError> {
    let kind = FormKind::Payment;
    let mut doc = kind.document();
    doc.fill(values(&form));
    let mut guard = kind.guard(&doc)?;

    let outcome = guard.handle_submit(&mut doc, &client.notifier, |payload| PaymentIntent {
        method: payload.get("paymentMethod").unwrap_or_default().to_string(),
        amount: format_amount(payload.get("amount").unwrap_or_default()),
    });

    let SubmitOutcome::Submitted(intent) = outcome else {
        return render_donate(&client, user.as_ref(), &doc, None, None).await;
    };

    info!("{}", intent.summary());
    client
        .demo
        .set_pending_payment(&intent)
        .map_err(anyhow::Error::from)?;
    render_donate(&client, user.as_ref(), &doc, Some(&intent), None).await
}

/// Confirme le don en attente
pub async fn confirm_donation(
    mut client: ClientState,
    user: Option<SessionUser>,
) -> Result<Response, AppError> {
    let Some(intent) = client.demo.take_pending_payment() else {
        client.notifier.warning("No donation to confirm.");
        client.save().await?;
        return Ok(Redirect::to("/donate").into_response());
    };

    info!("Donation of GHS {} by {} confirmed", intent.amount, intent.method);
    let doc = FormKind::Payment.document();
    let page = render_donate(&client, user.as_ref(), &doc, None, Some(&intent)).await?;
    Ok(page.into_response())
}

/// Affiche le forum et les messages du client
pub async fn forum_page(
    client: ClientState,
    user: Option<SessionUser>,
) -> Result<Html<String>, AppError> {
    render_forum(&client, user.as_ref(), "", None).await
}

async fn render_forum(
    client: &ClientState,
    user: Option<&SessionUser>,
    draft: &str,
    error: Option<String>,
) -> Result<Html<String>, AppError> {
    let messages: Vec<_> = client
        .demo
        .chat_messages()
        .into_iter()
        .map(|m| {
            json!({
                "text": m.text,
                "sent_at": m.sent_at.format("%b %-d, %Y %H:%M").to_string(),
            })
        })
        .collect();

    render_page(
        client,
        user,
        "/forum",
        "forum",
        "Forum",
        json!({ "messages": messages, "draft": draft, "error": error }),
    )
    .await
}

/// Ajoute un message au forum du client
pub async fn post_message(
    mut client: ClientState,
    user: Option<SessionUser>,
    Form(chat): Form<ChatForm>,
) -> Result<Response, AppError> {
    match TextInput::new_short_form(&chat.message) {
        Ok(text) => {
            client
                .demo
                .push_chat_message(text)
                .map_err(anyhow::Error::from)?;
            client.save().await?;
            Ok(Redirect::to("/forum").into_response())
        }
        Err(e) => {
            client.notifier.danger(&remote_failure(MESSAGE_FAILED, &e));
            let page =
                render_forum(&client, user.as_ref(), &chat.message, Some(e.to_string())).await?;
            Ok(page.into_response())
        }
    }
}

/// Bascule entre le thème clair et le thème sombre
pub async fn toggle_theme(
    mut client: ClientState,
    Form(form): Form<NextForm>,
) -> Result<Redirect, AppError> {
    let theme = client.demo.theme().toggled();
    client.demo.set_theme(theme).map_err(anyhow::Error::from)?;
    client.save().await?;
    Ok(Redirect::to(safe_next(form.next.as_deref())))
}

/// Ferme une notification
pub async fn dismiss_notification(
    client: ClientState,
    Path(id): Path<Uuid>,
    Form(form): Form<NextForm>,
) -> Result<Redirect, AppError> {
    if !client.notifier.dismiss(id) {
        error!("Unknown notification {}", id);
    }
    client.save().await?;
    Ok(Redirect::to(safe_next(form.next.as_deref())))
}
