use crate::error::{ApiError, ApiResult};
use shelf_dal::{ListingParams, MAX_LIMIT};

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct Paging {
    /// Number of records to skip
    #[serde(alias = "skip")]
    pub offset: Option<i64>,
    /// Maximum number of records returned
    pub limit: Option<i64>,
    /// Case insensitive substring of author name
    pub author: Option<String>,
}

impl Paging {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
            author: None,
        }
    }

    pub fn into_listing_params(
        self,
        default_page_size: u32,
        max_page_size: u32,
    ) -> ApiResult<ListingParams> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(default_page_size.into());
        if offset < 0 {
            return Err(ApiError::Validation(format!(
                "offset must not be negative, got {offset}"
            )));
        }
        let max_limit = i64::from(max_page_size).min(MAX_LIMIT);
        if !(0..=max_limit).contains(&limit) {
            return Err(ApiError::Validation(format!(
                "limit must be between 0 and {max_limit}, got {limit}"
            )));
        }
        let author = match self.author {
            Some(a) if a.len() > 255 => {
                return Err(ApiError::Validation("author filter too long".to_string()))
            }
            Some(a) if a.trim().is_empty() => None,
            other => other,
        };

        Ok(ListingParams {
            offset,
            limit,
            author,
        })
    }
}
