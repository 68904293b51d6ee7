// Page handlers for HTML rendering with Askama

use crate::api_server::AppState;
use crate::provider::CROPS;
use crate::sample::{SampleField, SoilType};
use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};

fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template error: {}", e);
        format!("Template error: {}", e)
    }))
}

// ============================================================================
// Static pages
// ============================================================================

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub title: &'static str,
}

pub async fn home_page() -> impl IntoResponse {
    render(&HomeTemplate { title: "Home" })
}

#[derive(Template)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub title: &'static str,
    pub strategy: &'static str,
}

pub async fn about_page(State(state): State<AppState>) -> impl IntoResponse {
    render(&AboutTemplate {
        title: "About Us",
        strategy: state.workflow.provider().strategy(),
    })
}

#[derive(Template)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub title: &'static str,
}

pub async fn contact_page() -> impl IntoResponse {
    render(&ContactTemplate { title: "Contact" })
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub title: &'static str,
}

pub async fn login_page() -> impl IntoResponse {
    render(&LoginTemplate { title: "Login" })
}

// ============================================================================
// Recommend page
// ============================================================================

pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub hint: String,
}

impl FieldView {
    fn new(field: SampleField) -> Self {
        let hint = match field.bounds() {
            Some((min, Some(max))) => format!("Between {} and {}", min, max),
            Some((min, None)) => format!("At least {}", min),
            None if field == SampleField::SoilType => "Choose the closest match".to_string(),
            None => String::new(),
        };
        Self {
            name: field.as_str(),
            label: field.label(),
            hint,
        }
    }
}

#[derive(Template)]
#[template(path = "pages/recommend.html")]
pub struct RecommendTemplate {
    pub title: &'static str,
    pub fields: Vec<FieldView>,
    pub soil_types: Vec<&'static str>,
    pub crops: Vec<&'static str>,
    pub strategy: &'static str,
}

pub async fn recommend_page(State(state): State<AppState>) -> impl IntoResponse {
    let template = RecommendTemplate {
        title: "Crop Advisor",
        fields: state
            .workflow
            .variant()
            .fields()
            .iter()
            .copied()
            .map(FieldView::new)
            .collect(),
        soil_types: SoilType::ALL.iter().map(|t| t.as_str()).collect(),
        crops: CROPS.to_vec(),
        strategy: state.workflow.provider().strategy(),
    };
    render(&template)
}
