use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub restaurant_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub gstin: Option<String>,
    pub tax_rate_bps: Option<i32>,
    pub service_charge_bps: Option<i32>,
    pub currency: Option<String>,
    pub upi_vpa: Option<String>,
}
