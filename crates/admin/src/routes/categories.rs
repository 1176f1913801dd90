//! Category routes: list and creation form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::types::CategoryDoc;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Query parameters for the category list page.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub created: Option<u8>,
}

/// Category list page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub user: CurrentUser,
    pub categories: Vec<CategoryDoc>,
    pub created: bool,
}

/// Category list page handler.
#[instrument(skip(user, state))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let categories = state.catalog().categories_index().await?;

    Ok(CategoriesIndexTemplate {
        user,
        categories,
        created: query.created == Some(1),
    }
    .into_response())
}

/// New category form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

/// New category page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/new.html")]
pub struct CategoryFormTemplate {
    pub user: CurrentUser,
    pub name: String,
    pub error: Option<String>,
}

/// New category form page handler.
pub async fn new_page(RequireAuth(user): RequireAuth) -> Response {
    CategoryFormTemplate {
        user,
        name: String::new(),
        error: None,
    }
    .into_response()
}

/// Handle category form submission.
///
/// Validation runs before the backend is invoked; on backend failure the
/// form re-renders with the entered name.
#[instrument(skip(user, state))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let name = form.name.trim();
    if name.is_empty() {
        return CategoryFormTemplate {
            user,
            name: form.name.clone(),
            error: Some("Category name is required".to_string()),
        }
        .into_response();
    }

    match state.backend().create_category(name).await {
        Ok(category) => {
            tracing::info!(category_id = %category.id, "category created");
            // The product table resolves names through the cached map
            state.catalog().invalidate_categories().await;
            Redirect::to("/categories?created=1").into_response()
        }
        Err(e) => {
            tracing::error!("create category failed: {e}");
            CategoryFormTemplate {
                user,
                name: form.name.clone(),
                error: Some("Failed to create category".to_string()),
            }
            .into_response()
        }
    }
}
