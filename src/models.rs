use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{
        payment::{Bank, PaymentMethod, PaymentStatus},
        role::Role,
        shipping::ShippingMethod,
        status::OrderStatus,
    },
    entity::{
        addresses::Model as AddressModel, order_products::Model as OrderProductModel,
        orders::Model as OrderModel, payments::Model as PaymentModel,
        product_images::Model as ProductImageModel, products::Model as ProductModel,
        users::Model as UserModel,
    },
    error::AppResult,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub image_url: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub rate: f64,
    pub published: bool,
    pub stock: i32,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub checked: bool,
    pub product: Product,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    /// `None` until the first item is added.
    pub id: Option<Uuid>,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
    pub shipping_method: ShippingMethod,
    pub shipping_cost: i64,
    pub notes: Option<String>,
    pub receipt: String,
    pub status: OrderStatus,
    pub status_description: String,
    pub image: Option<String>,
    pub total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderProduct {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub product: Option<Product>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub payment_method: PaymentMethod,
    pub bank: Option<Bank>,
    pub account_number: Option<String>,
    pub amount: i64,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub fn user_from_entity(model: UserModel) -> AppResult<User> {
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        role: model.role.parse()?,
        image: model.image,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub fn product_from_entity(model: ProductModel, mut images: Vec<ProductImageModel>) -> Product {
    images.sort_by_key(|img| img.position);
    Product {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        description: model.description,
        price: model.price,
        rate: model.rate,
        published: model.published,
        stock: model.stock,
        images: images
            .into_iter()
            .map(|img| ProductImage {
                id: img.id,
                image_url: img.image_url,
                position: img.position,
            })
            .collect(),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn address_from_entity(model: AddressModel) -> Address {
    Address {
        id: model.id,
        name: model.name,
        phone: model.phone,
        email: model.email,
        address: model.address,
        city: model.city,
        postal_code: model.postal_code,
        province: model.province,
        is_primary: model.is_primary,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status: OrderStatus = model.status.parse()?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        phone: model.phone,
        email: model.email,
        address: model.address,
        city: model.city,
        postal_code: model.postal_code,
        province: model.province,
        shipping_method: model.shipping_method.parse()?,
        shipping_cost: model.shipping_cost,
        notes: model.notes,
        receipt: model.receipt,
        status,
        status_description: status.description().to_string(),
        image: model.image,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub fn order_product_from_entity(
    model: OrderProductModel,
    product: Option<Product>,
) -> OrderProduct {
    OrderProduct {
        id: model.id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        product,
    }
}

pub fn payment_from_entity(model: PaymentModel) -> AppResult<Payment> {
    Ok(Payment {
        id: model.id,
        order_id: model.order_id,
        payment_method: model.payment_method.parse()?,
        bank: model.bank.as_deref().map(str::parse::<Bank>).transpose()?,
        account_number: model.account_number,
        amount: model.amount,
        transaction_id: model.transaction_id,
        status: model.status.parse()?,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    })
}
