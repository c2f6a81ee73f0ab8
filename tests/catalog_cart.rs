mod common;

use storefront_api::{
    domain::role::Role,
    dto::{
        cart::{AddToCartRequest, UpdateCartItemRequest},
        products::{ImageInput, UpdateProductRequest},
    },
    error::AppError,
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{cart_service, product_service},
};
use uuid::Uuid;

use common::{create_product, create_user, setup_state};

#[tokio::test]
async fn catalog_and_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let seller = create_user(&state, "seller@example.com", Role::Admin).await?;
    let buyer = create_user(&state, "buyer@example.com", Role::User).await?;

    let cheap = create_product(&state, &seller, 20_000, 10).await?;
    let pricey = create_product(&state, &seller, 90_000, 3).await?;

    // Only the owner may edit; images are replaced as a whole.
    let denied = product_service::update_product(
        &state,
        &buyer,
        cheap.id,
        UpdateProductRequest {
            price: Some(1),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let updated = product_service::update_product(
        &state,
        &seller,
        cheap.id,
        UpdateProductRequest {
            price: Some(25_000),
            images: Some(vec![
                ImageInput {
                    image_url: "https://cdn.example.com/a.jpg".into(),
                },
                ImageInput {
                    image_url: "https://cdn.example.com/b.jpg".into(),
                },
            ]),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("product");
    assert_eq!(updated.price, 25_000);
    assert_eq!(updated.images.len(), 2);
    assert_eq!(updated.images[0].image_url, "https://cdn.example.com/a.jpg");

    let listed = product_service::list_products(
        &state,
        ProductQuery {
            min_price: Some(50_000),
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(listed.meta.as_ref().and_then(|m| m.total), Some(1));
    let items = listed.data.expect("products").items;
    assert_eq!(items[0].id, pricey.id);

    let missing = product_service::get_product(&state, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    // Adding the same product twice accumulates quantity on one line.
    for _ in 0..2 {
        cart_service::add_item(
            &state,
            &buyer,
            AddToCartRequest {
                product_id: cheap.id,
                quantity: 2,
            },
        )
        .await?;
    }
    let line = cart_service::add_item(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: pricey.id,
            quantity: 1,
        },
    )
    .await?
    .data
    .expect("cart item");

    let count = cart_service::get_cart_count(&state, &buyer)
        .await?
        .data
        .expect("count");
    assert_eq!(count.count, 2);

    let cart = cart_service::get_cart(&state, &buyer)
        .await?
        .data
        .expect("cart");
    let cheap_line = cart
        .items
        .iter()
        .find(|i| i.product_id == cheap.id)
        .expect("cheap line");
    assert_eq!(cheap_line.quantity, 4);

    let unknown = cart_service::add_item(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: Uuid::new_v4(),
            quantity: 1,
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    cart_service::update_checked_item(&state, &buyer, line.id, true).await?;
    let checked = cart_service::get_checked_items(&state, &buyer)
        .await?
        .data
        .expect("checked");
    assert_eq!(checked.items.len(), 1);
    assert_eq!(checked.items[0].id, line.id);

    cart_service::update_checked_all(&state, &buyer, true).await?;
    let checked = cart_service::get_checked_items(&state, &buyer)
        .await?
        .data
        .expect("checked");
    assert_eq!(checked.items.len(), 2);

    let resized = cart_service::update_item(
        &state,
        &buyer,
        cheap_line.id,
        UpdateCartItemRequest { quantity: 1 },
    )
    .await?
    .data
    .expect("cart item");
    assert_eq!(resized.quantity, 1);

    // Another user cannot touch the buyer's lines.
    let foreign = cart_service::remove_item(&state, &seller, line.id).await;
    assert!(matches!(foreign, Err(AppError::NotFound)));

    let picked = cart_service::get_cart_items_by_ids(&state, &buyer, vec![line.id])
        .await?
        .data
        .expect("items");
    assert_eq!(picked.items.len(), 1);

    // The seller never added anything, so has no cart row yet.
    let no_cart = cart_service::get_cart_items_by_ids(&state, &seller, vec![line.id])
        .await?
        .data
        .expect("items");
    assert!(no_cart.items.is_empty());

    let removed = cart_service::remove_item(&state, &buyer, line.id).await?;
    assert_eq!(removed.message, "Removed from cart");
    assert!(removed.data.expect("success").success);
    cart_service::clear_cart(&state, &buyer).await?;
    let empty = cart_service::get_cart(&state, &buyer)
        .await?
        .data
        .expect("cart");
    assert!(empty.items.is_empty());
    assert!(empty.id.is_some());

    Ok(())
}
