use super::encode_query;
use crate::executor::{Executor, RequestOptions};
use crate::normalize::RequestKind;
use crate::response::ApiResponse;
use crate::types::{Series, SeriesType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesQuery {
    pub company_vat_code: String,
    pub series_type: SeriesType,
}

/// Document series lookups.
#[derive(Debug, Clone, Copy)]
pub struct SeriesApi<'a> {
    executor: &'a Executor,
}

impl<'a> SeriesApi<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    pub fn get_series(&self, query: &SeriesQuery) -> ApiResponse<Vec<Series>> {
        let query = encode_query([
            ("cif", query.company_vat_code.as_str()),
            ("type", query.series_type.as_str()),
        ]);
        self.executor.call(
            &format!("/series?{query}"),
            RequestKind::SeriesList,
            RequestOptions::default(),
        )
    }
}
