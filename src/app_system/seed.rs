use rust_decimal::Decimal;
use tracing::info;

use crate::clients::ProductClient;
use crate::domain::ProductCreate;
use crate::product_actor::ProductError;

/// Demo catalog: name, price in cents, stock.
const CATALOG: [(&str, i64, i64); 10] = [
    ("Laptop", 99999, 50),
    ("Mouse", 2999, 100),
    ("Keyboard", 7999, 75),
    ("Monitor", 29999, 40),
    ("Headphones", 14999, 60),
    ("USB Cable", 1299, 200),
    ("Power Bank", 5999, 85),
    ("Webcam", 8999, 30),
    ("Tablet", 39999, 25),
    ("Smartphone", 69999, 45),
];

pub async fn seed_catalog(products: &ProductClient) -> Result<(), ProductError> {
    for (name, cents, stock) in CATALOG {
        products
            .create_product(ProductCreate {
                name: name.to_string(),
                price: Decimal::new(cents, 2),
                stock_quantity: stock,
            })
            .await?;
    }
    info!(products = CATALOG.len(), "Catalog seeded");
    Ok(())
}
