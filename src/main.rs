mod actor_framework;
mod app_system;
mod clients;
mod domain;
mod error;
mod order_actor;
mod product_actor;
mod reports;

#[cfg(test)]
mod mock_framework;

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

use crate::app_system::{setup_tracing, Config, OrderSystem, SystemClock};
use crate::domain::{OrderRequestLine, ProductCreate, ProductId, ProductUpdate};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::from_env();
    info!(?config, "Starting storefront order system");

    let system = OrderSystem::start(&config, Arc::new(SystemClock)).await?;

    let catalog = system.product_client.list_products().await.map_err(|e| e.to_string())?;
    info!(products = catalog.len(), "Catalog loaded");

    // Two laptops and three mice, the mouse requested over two lines
    let lines = vec![
        OrderRequestLine::new(1, 2),
        OrderRequestLine::new(2, 1),
        OrderRequestLine::new(2, 2),
    ];

    let span = tracing::info_span!("order_processing");
    let order_result = async {
        info!("Placing order");
        system.order_client.place_order(lines).await
    }
    .instrument(span)
    .await;

    match order_result {
        Ok(summary) => {
            let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
            info!(order_id = %summary.order_id, total = %summary.total_amount, "Order placed");
            println!("{}", json);

            let stored = system
                .order_client
                .require_order(summary.order_id)
                .await
                .map_err(|e| e.to_string())?;
            info!(order_id = %stored.id, lines = stored.lines.len(), "Order stored");
        }
        Err(e) => error!(error = %e, kind = %e.kind(), "Order placement failed"),
    }

    // More tablets than are in stock: rejected, nothing reserved
    if let Err(e) = system
        .order_client
        .place_order(vec![OrderRequestLine::new(1, 1), OrderRequestLine::new(9, 26)])
        .await
    {
        warn!(error = %e, kind = %e.kind(), "Order rejected");
    }
    let laptops = system.product_client.check_stock(ProductId(1)).await.map_err(|e| e.to_string())?;
    info!(stock = laptops, "Laptop stock after rejected order");

    // Restock the webcams at a new price
    let webcam = system
        .product_client
        .update_product(
            ProductId(8),
            ProductUpdate {
                name: "Webcam HD".to_string(),
                price: Decimal::new(7999, 2),
                stock_quantity: 60,
            },
        )
        .await
        .map_err(|e| e.to_string())?;
    info!(product_id = %webcam.id, price = %webcam.price, stock = webcam.stock_quantity, "Product updated");

    // Discontinued products drop out of the catalog and the low-stock report
    system.product_client.soft_delete_product(ProductId(9)).await.map_err(|e| e.to_string())?;
    if let Err(e) = system.product_client.soft_delete_product(ProductId(9)).await {
        warn!(error = %e, kind = %e.kind(), "Product already deleted");
    }

    // A mistaken entry is removed for good
    let typo = system
        .product_client
        .create_product(ProductCreate {
            name: "Moniter".to_string(),
            price: Decimal::new(29999, 2),
            stock_quantity: 0,
        })
        .await
        .map_err(|e| e.to_string())?;
    system.product_client.delete_product(typo).await.map_err(|e| e.to_string())?;

    let orders = system.order_client.list_orders().await.map_err(|e| e.to_string())?;
    info!(orders = orders.len(), "Orders on record");

    let summary = system.report_client.daily_summary(None).await.map_err(|e| e.to_string())?;
    println!("{}", serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?);

    let low_stock = system.report_client.low_stock(Some(40)).await.map_err(|e| e.to_string())?;
    println!("{}", serde_json::to_string_pretty(&low_stock).map_err(|e| e.to_string())?);

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
