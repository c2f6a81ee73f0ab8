use serde::Serialize;
use utoipa::ToSchema;

/// Pagination block. Single-object responses carry an empty one.
#[derive(Debug, Serialize, ToSchema, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
    pub total_pages: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
            total_pages: Some(total_pages),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Envelope shared by every JSON response, errors included.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::success("OK", data, Some(Meta::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Meta::new(1, 20, 0).total_pages, Some(0));
        assert_eq!(Meta::new(1, 20, 20).total_pages, Some(1));
        assert_eq!(Meta::new(2, 20, 41).total_pages, Some(3));
    }

    #[test]
    fn ok_wraps_data_with_empty_meta() {
        let body = serde_json::to_value(ApiResponse::ok(5)).unwrap();
        assert_eq!(body["message"], "OK");
        assert_eq!(body["data"], 5);
        assert!(body["meta"]["page"].is_null());
    }
}
