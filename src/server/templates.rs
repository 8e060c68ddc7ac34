use askama::Template;
use axum::response::Html;

use crate::error::Result;
use crate::server::models::{FieldErrors, InterestOption, MapPanel, Notice, ProfileCard, ProfileForm};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub profiles: Vec<ProfileCard>,
    pub interests: Vec<InterestOption>,
    pub search: String,
    pub notice_title: String,
    pub notice_description: String,
}

#[derive(Template)]
#[template(path = "profiles_list.html")]
pub struct ProfilesListTemplate {
    pub profiles: Vec<ProfileCard>,
    pub notice_title: String,
    pub notice_description: String,
}

#[derive(Template)]
#[template(path = "profile_form.html")]
pub struct ProfileFormTemplate {
    pub fragment: bool,
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub action: String,
    pub form: ProfileForm,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "profile_detail.html")]
pub struct ProfileDetailTemplate {
    pub fragment: bool,
    pub profile: ProfileCard,
}

#[derive(Template)]
#[template(path = "map_modal.html")]
pub struct MapModalTemplate {
    pub fragment: bool,
    pub panel: MapPanel,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub fragment: bool,
    pub title: String,
    pub message: String,
}

pub fn notice_text(notice: Option<Notice>) -> (String, String) {
    notice
        .map(|n| (n.title().to_string(), n.description().to_string()))
        .unwrap_or_default()
}

pub fn render<T: Template>(template: &T) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}
