use super::encode_query;
use crate::executor::{Executor, RequestOptions};
use crate::normalize::RequestKind;
use crate::response::ApiResponse;
use crate::types::Tax;

/// Tax (VAT rate) lookups.
#[derive(Debug, Clone, Copy)]
pub struct TaxApi<'a> {
    executor: &'a Executor,
}

impl<'a> TaxApi<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    /// VAT rates configured for the company.
    pub fn get_tax_types(&self, company_vat_code: &str) -> ApiResponse<Vec<Tax>> {
        self.executor.call(
            &format!("/tax?{}", encode_query([("cif", company_vat_code)])),
            RequestKind::TaxList,
            RequestOptions::default(),
        )
    }
}
