use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::Form;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::WebError;

#[derive(Debug, Default, Deserialize)]
pub struct DismissForm {
    /// Page to return to
    pub back: Option<String>,
}

/// Local paths only. The path must resolve against this host the same way
/// a browser would resolve it.
fn return_path(back: Option<&str>) -> &str {
    let Some(path) = back else {
        return "/";
    };
    if !path.starts_with('/') || path.contains('\\') {
        return "/";
    }
    let stays_local = Url::parse("http://localhost")
        .and_then(|base| base.join(path))
        .is_ok_and(|url| url.host_str() == Some("localhost") && url.port().is_none());
    if stays_local {
        path
    } else {
        "/"
    }
}

/// Hide one toast before it expires.
pub async fn dismiss(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DismissForm>,
) -> Result<Redirect, WebError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| WebError::BadRequest(format!("invalid notification id: {}", id)))?;
    state.toasts.dismiss(id);
    Ok(Redirect::to(return_path(form.back.as_deref())))
}
