//! Product routes: the paginated table and the creation form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use souk_core::{CategoryId, Price};

use crate::backend::types::NewProduct;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::services::catalog::{Direction, ProductRow};
use crate::state::AppState;

/// Minimum number of product images.
const MIN_IMAGES: usize = 1;
/// Maximum number of product images.
const MAX_IMAGES: usize = 6;

// =============================================================================
// Product Table
// =============================================================================

/// Pagination and filter query parameters.
#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub cursor: Option<String>,
    pub dir: Option<String>,
    pub q: Option<String>,
    pub created: Option<u8>,
}

/// Parse the direction query parameter.
fn parse_direction(dir: Option<&str>) -> Direction {
    match dir {
        Some("next") => Direction::After,
        Some("prev") => Direction::Before,
        _ => Direction::Initial,
    }
}

/// Products table page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub user: CurrentUser,
    pub rows: Vec<ProductRow>,
    pub prev_cursor: Option<String>,
    pub next_cursor: Option<String>,
    pub filter: String,
    pub created: bool,
}

/// Products table page handler.
#[instrument(skip(user, state))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Response {
    let direction = parse_direction(query.dir.as_deref());
    let snapshot = state
        .catalog()
        .fetch_page(query.cursor.as_deref(), direction)
        .await;

    // Name filter applies to the fetched page only
    let filter = query.q.unwrap_or_default();
    let needle = filter.to_lowercase();
    let rows = if needle.is_empty() {
        snapshot.rows
    } else {
        snapshot
            .rows
            .into_iter()
            .filter(|row| row.name.to_lowercase().contains(&needle))
            .collect()
    };

    ProductsIndexTemplate {
        user,
        rows,
        prev_cursor: snapshot.prev_cursor.map(|c| c.into_inner()),
        next_cursor: snapshot.next_cursor.map(|c| c.into_inner()),
        filter,
        created: query.created == Some(1),
    }
    .into_response()
}

// =============================================================================
// Product Form
// =============================================================================

/// Raw form values, kept around so the form re-renders with what the
/// operator typed.
#[derive(Debug, Clone, Default)]
pub struct ProductFormValues {
    pub name: String,
    pub category_id: String,
    pub brand: String,
    pub storage: String,
    pub color: String,
    pub description: String,
    pub stock: String,
    pub price: String,
}

/// A category option for the form dropdown.
pub struct CategoryOption {
    pub id: String,
    pub name: String,
}

/// A fully validated product submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProduct {
    pub name: String,
    pub category_id: CategoryId,
    pub brand: String,
    pub storage: Option<u32>,
    pub color: String,
    pub description: String,
    pub stock: u32,
    pub price: Price,
}

/// Validate a product submission.
///
/// Runs before anything touches the backend; on failure the backend is
/// never invoked.
fn validate(values: &ProductFormValues, image_count: usize) -> Result<ValidatedProduct, Vec<String>> {
    let mut errors = Vec::new();

    if values.name.trim().is_empty() {
        errors.push("Product name is required".to_string());
    }
    if values.category_id.trim().is_empty() {
        errors.push("Category is required".to_string());
    }
    if values.brand.trim().is_empty() {
        errors.push("Brand is required".to_string());
    }
    if values.color.trim().is_empty() {
        errors.push("Color is required".to_string());
    }
    if values.description.trim().is_empty() {
        errors.push("Description is required".to_string());
    }

    if image_count < MIN_IMAGES {
        errors.push("At least one image is required".to_string());
    } else if image_count > MAX_IMAGES {
        errors.push(format!("maximum {MAX_IMAGES} images"));
    }

    let storage = if values.storage.trim().is_empty() {
        None
    } else {
        match values.storage.trim().parse::<u32>() {
            Ok(gb) => Some(gb),
            Err(_) => {
                errors.push("Storage must be a whole number".to_string());
                None
            }
        }
    };

    let stock = match values.stock.trim().parse::<u32>() {
        Ok(stock) if stock > 0 => Some(stock),
        _ => {
            errors.push("Stock must be a positive number".to_string());
            None
        }
    };

    let price = match Price::parse(&values.price) {
        Ok(price) => Some(price),
        Err(_) => {
            errors.push("Price must be a positive number".to_string());
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // The per-field options are all Some once errors is empty
    match (stock, price) {
        (Some(stock), Some(price)) => Ok(ValidatedProduct {
            name: values.name.trim().to_string(),
            category_id: CategoryId::new(values.category_id.trim()),
            brand: values.brand.trim().to_string(),
            storage,
            color: values.color.trim().to_string(),
            description: values.description.trim().to_string(),
            stock,
            price,
        }),
        _ => Err(vec!["Invalid submission".to_string()]),
    }
}

/// New product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/new.html")]
pub struct ProductFormTemplate {
    pub user: CurrentUser,
    pub categories: Vec<CategoryOption>,
    pub values: ProductFormValues,
    pub errors: Vec<String>,
}

async fn render_form(
    state: &AppState,
    user: CurrentUser,
    values: ProductFormValues,
    errors: Vec<String>,
) -> Response {
    let categories = state
        .catalog()
        .category_options()
        .await
        .into_iter()
        .map(|(id, name)| CategoryOption {
            id: id.into_inner(),
            name,
        })
        .collect();

    ProductFormTemplate {
        user,
        categories,
        values,
        errors,
    }
    .into_response()
}

/// New product form page handler.
pub async fn new_page(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Response {
    render_form(&state, user, ProductFormValues::default(), Vec::new()).await
}

/// Read the multipart submission into form values and image files.
async fn read_form(
    multipart: &mut Multipart,
) -> Result<(ProductFormValues, Vec<(String, Vec<u8>)>), axum::extract::multipart::MultipartError> {
    let mut values = ProductFormValues::default();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let bytes = field.bytes().await?;
                // Browsers submit an empty part for an untouched file input
                if !bytes.is_empty() {
                    images.push((filename, bytes.to_vec()));
                }
            }
            "name" => values.name = field.text().await?,
            "category_id" => values.category_id = field.text().await?,
            "brand" => values.brand = field.text().await?,
            "storage" => values.storage = field.text().await?,
            "color" => values.color = field.text().await?,
            "description" => values.description = field.text().await?,
            "stock" => values.stock = field.text().await?,
            "price" => values.price = field.text().await?,
            _ => {
                // Drain unknown fields so the stream stays consumable
                let _ = field.bytes().await?;
            }
        }
    }

    Ok((values, images))
}

/// Handle product form submission.
#[instrument(skip(user, state, multipart))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let (values, images) = match read_form(&mut multipart).await {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("unreadable product submission: {e}");
            return render_form(
                &state,
                user,
                ProductFormValues::default(),
                vec!["Could not read the submission, please try again".to_string()],
            )
            .await;
        }
    };

    let valid = match validate(&values, images.len()) {
        Ok(valid) => valid,
        Err(errors) => return render_form(&state, user, values, errors).await,
    };

    // Upload images in submission order; per-file failures are logged and
    // skipped, matching the degraded-but-visible failure policy
    let mut image_urls = Vec::new();
    for (filename, bytes) in images {
        match state.backend().upload_file(&filename, bytes).await {
            Ok(file) => image_urls.push(state.backend().file_preview_url(&file.id)),
            Err(e) => tracing::error!("upload image failed: {e}"),
        }
    }

    if image_urls.is_empty() {
        return render_form(
            &state,
            user,
            values,
            vec!["Image upload failed, please try again".to_string()],
        )
        .await;
    }

    let product = NewProduct {
        name: valid.name,
        category_id: valid.category_id,
        brand: valid.brand,
        storage: valid.storage,
        color: valid.color,
        images: image_urls,
        description: valid.description,
        stock: valid.stock,
        price: valid.price,
        seller_id: user.account_id.clone(),
    };

    match state.backend().create_product(&product).await {
        Ok(doc) => {
            tracing::info!(product_id = %doc.id, "product created");
            Redirect::to("/products?created=1").into_response()
        }
        Err(e) => {
            tracing::error!("create product failed: {e}");
            render_form(
                &state,
                user,
                values,
                vec!["Failed to create product".to_string()],
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_values() -> ProductFormValues {
        ProductFormValues {
            name: "Pixel 9".to_string(),
            category_id: "cat_phones".to_string(),
            brand: "Google".to_string(),
            storage: "256".to_string(),
            color: "obsidian".to_string(),
            description: "A phone.".to_string(),
            stock: "12".to_string(),
            price: "799.00".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_submission() {
        let valid = validate(&valid_values(), 3).expect("valid submission");
        assert_eq!(valid.name, "Pixel 9");
        assert_eq!(valid.storage, Some(256));
        assert_eq!(valid.stock, 12);
        assert_eq!(valid.price.display(), "$799.00");
    }

    #[test]
    fn test_validate_rejects_seven_images_before_backend() {
        let errors = validate(&valid_values(), 7).expect_err("must reject");
        assert!(errors.iter().any(|e| e == "maximum 6 images"));
    }

    #[test]
    fn test_validate_requires_at_least_one_image() {
        let errors = validate(&valid_values(), 0).expect_err("must reject");
        assert!(errors.iter().any(|e| e == "At least one image is required"));
    }

    #[test]
    fn test_validate_rejects_non_positive_numbers() {
        let mut values = valid_values();
        values.stock = "0".to_string();
        values.price = "-5".to_string();

        let errors = validate(&values, 1).expect_err("must reject");
        assert!(errors.iter().any(|e| e == "Stock must be a positive number"));
        assert!(errors.iter().any(|e| e == "Price must be a positive number"));
    }

    #[test]
    fn test_validate_requires_text_fields() {
        let errors = validate(&ProductFormValues::default(), 1).expect_err("must reject");
        assert!(errors.iter().any(|e| e == "Product name is required"));
        assert!(errors.iter().any(|e| e == "Category is required"));
        assert!(errors.iter().any(|e| e == "Brand is required"));
        assert!(errors.iter().any(|e| e == "Color is required"));
        assert!(errors.iter().any(|e| e == "Description is required"));
    }

    #[test]
    fn test_validate_storage_optional_but_numeric() {
        let mut values = valid_values();
        values.storage = String::new();
        assert_eq!(
            validate(&values, 1).expect("valid submission").storage,
            None
        );

        values.storage = "lots".to_string();
        let errors = validate(&values, 1).expect_err("must reject");
        assert!(errors.iter().any(|e| e == "Storage must be a whole number"));
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!(parse_direction(Some("next")), Direction::After);
        assert_eq!(parse_direction(Some("prev")), Direction::Before);
        assert_eq!(parse_direction(Some("sideways")), Direction::Initial);
        assert_eq!(parse_direction(None), Direction::Initial);
    }
}
