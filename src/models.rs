use serde::{Deserialize, Serialize};

/// One extracted (or edited) group of numbers with its derived statistics.
///
/// `count`, `sum` and `average` are never authoritative: they are always
/// recomputable from `numbers` and are normalized by
/// [`crate::extraction::recompute`] before a row leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberRow {
    #[serde(default)]
    pub numbers: Vec<f64>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub sum: f64,
    #[serde(default)]
    pub average: f64,
}

impl NumberRow {
    pub fn new(numbers: Vec<f64>) -> Self {
        let mut row = Self {
            numbers,
            count: 0,
            sum: 0.0,
            average: 0.0,
        };
        crate::extraction::recompute_row(&mut row);
        row
    }
}

/// The full extraction output: ordered rows plus grand aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub rows: Vec<NumberRow>,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub grand_total: f64,
    #[serde(default)]
    pub overall_average: f64,
}

impl ResultSet {
    /// An empty result set with zeroed aggregates.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            total_count: 0,
            grand_total: 0.0,
            overall_average: 0.0,
        }
    }
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::new()
    }
}

/// One property-management-firm entry as returned by the discovery webhook.
///
/// No field is required beyond being present in the external payload;
/// absent fields stay `None` and render as empty cells on export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmOutput {
    pub firm_name: Option<String>,
    pub website_url: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub owner_email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub vacant_listings_count: Option<f64>,
    pub doors_managed: Option<String>,
    pub property_management_software: Option<String>,
    pub leasing_manager_name: Option<String>,
    pub leasing_manager_contact: Option<String>,
    pub services_offered: Option<Vec<String>>,
    pub portfolio_focus: Option<Vec<String>>,
    pub google_reviews_count: Option<f64>,
    pub google_rating: Option<f64>,
    pub last_blog_update: Option<String>,
    pub linkedin_url: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub advertises_24_7_maintenance: Option<bool>,
    pub advertises_tenant_portal: Option<bool>,
    pub is_hiring: Option<bool>,
}

/// Webhook records wrap the firm fields in an `output` envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirmRecord {
    pub output: FirmOutput,
}

/// Request body for `POST /api/v1/firms/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct CitySearchRequest {
    #[serde(default)]
    pub city: Option<String>,
}

/// Request body for `POST /api/v1/firms/export`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub records: Vec<FirmRecord>,
    pub format: crate::export::ExportFormat,
    #[serde(default)]
    pub filename_base: Option<String>,
}
