//! Rendu des pages et suivi des actions de formulaire.

use std::time::SystemTime;

use axum::response::Html;
use log::error;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::backend::middlewares::{ClientState, SessionUser};
use crate::backend::models::{nav_items, FormView, NotificationView};
use crate::demo_state::Theme;
use crate::dom::Document;
use crate::notify::Notifier;
use crate::utils::error_messages::{remote_failure, AppError};
use crate::utils::validation::presets::FormKind;

/// Page rendue avec le contexte commun : navigation, thème, notifications.
///
/// L'état du client est sauvegardé avant le rendu, les notifications
/// expirées sont donc retirées de la session.
pub async fn render_page(
    client: &ClientState,
    user: Option<&SessionUser>,
    path: &str,
    template: &str,
    title: &str,
    extra: Value,
) -> Result<Html<String>, AppError> {
    let now = SystemTime::now();
    let notifications: Vec<NotificationView> = client
        .notifier
        .active_at(now)
        .iter()
        .map(|n| NotificationView::new(n, now))
        .collect();
    let theme = client.demo.theme();

    let mut data = json!({
        "title": title,
        "theme": theme.as_str(),
        "dark": theme == Theme::Dark,
        "nav": nav_items(path, user.is_some()),
        "notifications": notifications,
        "current_path": path,
        "user": user.map(|u| json!({"uid": u.uid(), "email": u.email()})),
    });
    if let (Some(data), Value::Object(extra)) = (data.as_object_mut(), extra) {
        data.extend(extra);
    }

    client.save().await?;
    Ok(Html(client.ctx.hbs.render(template, &data)?))
}

/// Page d'un formulaire, avec les valeurs et les erreurs portées par `doc`.
#[allow(clippy::too_many_arguments)]
pub async fn render_form(
    client: &ClientState,
    user: Option<&SessionUser>,
    kind: FormKind,
    doc: &Document,
    path: &str,
    template: &str,
    title: &str,
    submit_label: &str,
    extra: Value,
) -> Result<Html<String>, AppError> {
    let mut data = json!({
        "form": FormView::new(kind, doc),
        "action": path,
        "submit_label": submit_label,
    });
    if let (Some(data), Value::Object(extra)) = (data.as_object_mut(), extra) {
        data.extend(extra);
    }

    render_page(client, user, path, template, title, data).await
}

/// Attend l'action lancée par une soumission valide.
///
/// Un échec est journalisé puis affiché tel quel, préfixé par `context`.
pub async fn settle<T>(
    task: JoinHandle<anyhow::Result<T>>,
    notifier: &Notifier,
    context: &str,
) -> Option<T> {
    match task.await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            error!("{}: {:#}", context, e);
            notifier.danger(&remote_failure(context, &e));
            None
        }
        Err(e) => {
            error!("{}: action task failed: {}", context, e);
            notifier.danger(&remote_failure(context, &e));
            None
        }
    }
}

/// Chemin de retour fourni par un formulaire, limité aux chemins locaux.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/forum")), "/forum");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[tokio::test]
    async fn test_settle_reports_failure_verbatim() {
        let notifier = Notifier::new(Duration::from_secs(5));
        let task = tokio::spawn(async { Err::<(), _>(anyhow::anyhow!("Invalid email or password.")) });

        assert!(settle(task, &notifier, "Sign-in failed").await.is_none());
        assert_eq!(
            notifier.active()[0].message,
            "Sign-in failed: Invalid email or password."
        );
    }

    #[tokio::test]
    async fn test_settle_returns_value() {
        let notifier = Notifier::new(Duration::from_secs(5));
        let task = tokio::spawn(async { Ok::<_, anyhow::Error>(42) });

        assert_eq!(settle(task, &notifier, "Unused").await, Some(42));
        assert!(notifier.active().is_empty());
    }
}
