use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Product;

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ImageInput {
    #[validate(url)]
    pub image_url: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 1))]
    pub price: i64,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rate: f64,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i32,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ImageInput>,
}

/// Absent fields are left untouched; `images`, when present, replaces the
/// whole gallery.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub price: Option<i64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rate: Option<f64>,
    pub published: Option<bool>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    #[validate(nested)]
    pub images: Option<Vec<ImageInput>>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
