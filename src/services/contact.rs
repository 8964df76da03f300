use std::sync::Arc;

use tracing::info;

use crate::client::{ApiGateway, ApiRequest};
use crate::errors::Result;
use crate::models::ContactForm;
use crate::utils::validation::validate_contact;

pub const CONTACT_PATH: &str = "/url/contact";

/// Contact form submission
pub struct ContactService {
    gateway: Arc<ApiGateway>,
}

impl ContactService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn submit(&self, form: &ContactForm) -> Result<()> {
        validate_contact(form)?;
        let request = ApiRequest::post(CONTACT_PATH).anonymous().with_json(form)?;
        self.gateway.request::<serde_json::Value>(request).await?;
        info!("Contact message from {} sent", form.email);
        Ok(())
    }
}
