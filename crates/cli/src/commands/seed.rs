//! `seed` command: demo categories and products.

use souk_admin::backend::types::NewProduct;
use souk_core::{AccountId, Price};

use super::{CliError, bootstrap};

/// Demo categories and one product per category.
const DEMO_CATALOG: &[(&str, &str, &str, &str, Option<u32>, u32, &str)] = &[
    // (category, product, brand, color, storage, stock, price)
    ("Phones", "Pixel 9", "Google", "obsidian", Some(256), 12, "799.00"),
    ("Laptops", "ThinkPad X1", "Lenovo", "black", Some(512), 5, "1649.00"),
    ("Audio", "WH-1000XM5", "Sony", "silver", None, 30, "349.99"),
    ("Bags", "Canvas Tote", "Souk", "natural", None, 48, "25.00"),
];

/// Placeholder preview shown for seeded products.
const SEED_IMAGE: &str = "seed.png";

/// Seed the backend with demo categories and products for `seller`.
pub async fn run(seller: &str) -> Result<(), CliError> {
    let (backend, _auth) = bootstrap()?;
    let seller_id = AccountId::new(seller);

    for (category_name, product_name, brand, color, storage, stock, price) in DEMO_CATALOG {
        let category = backend.create_category(category_name).await?;
        tracing::info!(category_id = %category.id, "category created");

        let image = backend.upload_file(SEED_IMAGE, seed_image_bytes()).await?;
        let image_url = backend.file_preview_url(&image.id);

        let price = Price::parse(price)
            .map_err(|_| CliError::InvalidSeedData(format!("price for {product_name}")))?;

        let product = backend
            .create_product(&NewProduct {
                name: (*product_name).to_string(),
                category_id: category.id.clone(),
                brand: (*brand).to_string(),
                storage: *storage,
                color: (*color).to_string(),
                images: vec![image_url],
                description: format!("Demo listing for {product_name}."),
                stock: *stock,
                price,
                seller_id: seller_id.clone(),
            })
            .await?;

        tracing::info!(product_id = %product.id, "product created");
    }

    Ok(())
}

/// A 1x1 transparent PNG, enough to exercise the storage path.
fn seed_image_bytes() -> Vec<u8> {
    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78,
        0x9C, 0x62, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
        0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];
    PNG.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_prices_parse() {
        for (_, name, _, _, _, _, price) in DEMO_CATALOG {
            assert!(
                Price::parse(price).is_ok(),
                "seed price for {name} must be positive"
            );
        }
    }

    #[test]
    fn test_seed_image_is_png() {
        let bytes = seed_image_bytes();
        assert_eq!(bytes.get(..4), Some(&[0x89, 0x50, 0x4E, 0x47][..]));
    }
}
