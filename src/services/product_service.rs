use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ImageInput, ProductList, UpdateProductRequest},
    entity::{
        order_products::{Column as OrderProductCol, Entity as OrderProducts},
        product_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages,
            Model as ImageModel,
        },
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, product_from_entity},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

/// Images for a batch of products, grouped by product id.
pub(crate) async fn load_images<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<ImageModel>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let images = ProductImages::find()
        .filter(ImageCol::ProductId.is_in(product_ids.iter().copied()))
        .order_by_asc(ImageCol::Position)
        .all(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<ImageModel>> = HashMap::new();
    for image in images {
        grouped.entry(image.product_id).or_default().push(image);
    }
    Ok(grouped)
}

/// Attach images to product rows, keeping the input order.
pub(crate) async fn with_images<C: ConnectionTrait>(
    conn: &C,
    products: Vec<ProductModel>,
) -> AppResult<Vec<Product>> {
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let mut images = load_images(conn, &ids).await?;
    Ok(products
        .into_iter()
        .map(|p| {
            let imgs = images.remove(&p.id).unwrap_or_default();
            product_from_entity(p, imgs)
        })
        .collect())
}

async fn insert_images<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    images: Vec<ImageInput>,
) -> AppResult<()> {
    for (position, image) in images.into_iter().enumerate() {
        ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            image_url: Set(image.image_url),
            position: Set(position as i32),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    if let Some(published) = query.published {
        condition = condition.add(Column::Published.eq(published));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::UpdatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::UpdatedAt => Column::UpdatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Rate => Column::Rate,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_images(&state.orm, rows).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_all_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let rows = Products::find()
        .order_by_desc(Column::UpdatedAt)
        .all(&state.orm)
        .await?;
    let items = with_images(&state.orm, rows).await?;
    Ok(ApiResponse::success("Products", ProductList { items }, None))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let product = with_images(&state.orm, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        rate: Set(payload.rate),
        published: Set(payload.published),
        stock: Set(payload.stock),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    insert_images(&txn, product.id, payload.images).await?;
    let product = with_images(&txn, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ProductModel> {
    let product = Products::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    if product.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(product)
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let existing = find_owned(&txn, user, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(rate) = payload.rate {
        active.rate = Set(rate);
    }
    if let Some(published) = payload.published {
        active.published = Set(published);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&txn).await?;

    if let Some(images) = payload.images {
        ProductImages::delete_many()
            .filter(ImageCol::ProductId.eq(product.id))
            .exec(&txn)
            .await?;
        insert_images(&txn, product.id, images).await?;
    }

    let product = with_images(&txn, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_owned(&state.orm, user, id).await?;

    // Order lines keep a reference to the product they snapshot.
    let ordered = OrderProducts::find()
        .filter(OrderProductCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::Conflict(
            "Product has been ordered and cannot be deleted; unpublish it instead".to_string(),
        ));
    }

    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "success": true }),
        Some(Meta::empty()),
    ))
}
