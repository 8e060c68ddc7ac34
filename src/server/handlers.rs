use axum::{
    extract::{Form, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::warn;
use uuid::Uuid;

use crate::directory::ProfileFilter;
use crate::domain::ProfileUpdate;
use crate::error::{AppError, Result};
use crate::observability::metrics;
use crate::server::models::{cards, interest_options, FieldErrors, MapPanel, Notice, ProfileCard, ProfileForm};
use crate::server::state::AppState;
use crate::server::templates::{
    notice_text, render, ErrorTemplate, IndexTemplate, MapModalTemplate, ProfileDetailTemplate,
    ProfileFormTemplate, ProfilesListTemplate,
};

/// HTML-side error: renders an error page instead of the JSON body.
pub struct PageError(AppError);

impl From<AppError> for PageError {
    fn from(e: AppError) -> Self {
        PageError(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "page failed");
        }
        let title = match &self.0 {
            AppError::NotFound(_) => "Profile not found",
            AppError::SessionNotFound(_) => "Map not open",
            _ => "Something went wrong",
        };
        let template = ErrorTemplate {
            fragment: false,
            title: title.to_string(),
            message: self.0.to_string(),
        };
        match render(&template) {
            Ok(html) => (status, html).into_response(),
            Err(_) => (status, self.0.to_string()).into_response(),
        }
    }
}

type PageResult = std::result::Result<Response, PageError>;

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}

/// Full directory page or just the list, with an optional toast.
async fn directory_view(
    state: &AppState,
    filter: &ProfileFilter,
    notice: Option<Notice>,
    fragment: bool,
) -> Result<Html<String>> {
    let profiles = cards(&state.directory.list(filter).await?);
    let (notice_title, notice_description) = notice_text(notice);

    if fragment {
        return render(&ProfilesListTemplate { profiles, notice_title, notice_description });
    }

    let interests = interest_options(state.directory.interests().await?, filter.interest());
    render(&IndexTemplate {
        profiles,
        interests,
        search: filter.search.clone().unwrap_or_default(),
        notice_title,
        notice_description,
    })
}

pub async fn index(State(state): State<AppState>, Query(filter): Query<ProfileFilter>) -> PageResult {
    Ok(directory_view(&state, &filter, None, false).await?.into_response())
}

pub async fn profiles(
    State(state): State<AppState>,
    Query(filter): Query<ProfileFilter>,
    headers: HeaderMap,
) -> PageResult {
    Ok(directory_view(&state, &filter, None, is_htmx(&headers)).await?.into_response())
}

pub async fn search_profiles(State(state): State<AppState>, Form(filter): Form<ProfileFilter>) -> PageResult {
    Ok(directory_view(&state, &filter, None, true).await?.into_response())
}

fn form_page(
    headers: &HeaderMap,
    editing: Option<&str>,
    form: ProfileForm,
    errors: FieldErrors,
) -> Result<Html<String>> {
    let (heading, submit_label, action) = match editing {
        Some(id) => ("Edit Profile", "Update Profile", format!("/profiles/{}", id)),
        None => ("Add New Profile", "Add Profile", "/profiles".to_string()),
    };
    render(&ProfileFormTemplate {
        fragment: is_htmx(headers),
        heading,
        submit_label,
        action,
        form,
        errors,
    })
}

pub async fn new_profile_form(headers: HeaderMap) -> PageResult {
    Ok(form_page(&headers, None, ProfileForm::default(), FieldErrors::default())?.into_response())
}

pub async fn edit_profile_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> PageResult {
    let profile = state.directory.get(&id).await?;
    let form = ProfileForm::from_profile(&profile);
    Ok(form_page(&headers, Some(&id), form, FieldErrors::default())?.into_response())
}

/// Re-renders the form with its messages when validation fails.
fn rejected_form(headers: &HeaderMap, editing: Option<&str>, form: ProfileForm, error: AppError) -> PageResult {
    match error {
        AppError::Validation(errors) => {
            let html = form_page(headers, editing, form, FieldErrors::from(&errors))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
        }
        other => Err(other.into()),
    }
}

pub async fn create_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> PageResult {
    match state.directory.create(form.to_draft()).await {
        Ok(_) => {
            let page = directory_view(&state, &ProfileFilter::default(), Some(Notice::Added), false).await?;
            Ok((StatusCode::CREATED, page).into_response())
        }
        Err(e) => rejected_form(&headers, None, form, e),
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> PageResult {
    let update = ProfileUpdate::from(form.to_draft());
    match state.directory.update(&id, update).await {
        Ok(_) => {
            let page = directory_view(&state, &ProfileFilter::default(), Some(Notice::Updated), false).await?;
            Ok(page.into_response())
        }
        Err(e) => rejected_form(&headers, Some(&id), form, e),
    }
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> PageResult {
    state.directory.delete(&id).await?;
    let page = directory_view(&state, &ProfileFilter::default(), Some(Notice::Deleted), is_htmx(&headers)).await?;
    Ok(page.into_response())
}

pub async fn profile_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> PageResult {
    let profile = state.directory.get(&id).await?;
    let html = render(&ProfileDetailTemplate {
        fragment: is_htmx(&headers),
        profile: ProfileCard::from(&profile),
    })?;
    Ok(html.into_response())
}

pub async fn profile_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> PageResult {
    let profile = state.directory.get(&id).await?;
    let panel = match state.open_map(&id).await? {
        Some(report) => {
            if let Some(error) = &report.error {
                warn!(profile = %id, error = %error, "map could not be shown");
            }
            MapPanel::from_report(&profile, &report)
        }
        None => MapPanel::without_location(&profile),
    };

    let html = render(&MapModalTemplate { fragment: is_htmx(&headers), panel })?;
    Ok(html.into_response())
}

/// Called when the modal closes; the modal is swapped out for nothing.
pub async fn close_map(State(state): State<AppState>, Path(session): Path<Uuid>) -> PageResult {
    if state.maps.close(session).await {
        Ok(Html(String::new()).into_response())
    } else {
        Err(AppError::SessionNotFound(session.to_string()).into())
    }
}

pub async fn metrics_export() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "maps": state.maps.capability().status().label(),
        "open_maps": state.maps.len().await,
    }))
}
