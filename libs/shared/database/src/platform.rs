use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::{Booking, CalendarOverride, Location, OverrideTarget, Service, Specialist};

/// Read-only client for the platform persistence API.
///
/// The availability engine never writes through this client; locations,
/// services, specialists, overrides and bookings are all owned by the CRUD
/// layer.
pub struct PlatformDbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PlatformDbClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.platform_api_url.clone(),
            api_key: config.platform_api_key.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Platform API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("Platform API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    pub async fn get_location(&self, location_id: i64) -> Result<Option<Location>> {
        let path = format!("/rest/v1/locations?id=eq.{}", location_id);
        let rows: Vec<Location> = self.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn get_service(&self, service_id: i64) -> Result<Option<Service>> {
        let path = format!(
            "/rest/v1/services?id=eq.{}&is_active=eq.true",
            service_id
        );
        let rows: Vec<Service> = self.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    /// Active specialists linked to a service through an active link row.
    pub async fn get_service_specialists(&self, service_id: i64) -> Result<Vec<Specialist>> {
        let path = format!(
            "/rest/v1/specialist_services?service_id=eq.{}&is_active=eq.true&select=specialist:specialists!inner(*)",
            service_id
        );
        let rows: Vec<SpecialistLinkRow> = self.request(Method::GET, &path, None).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.specialist)
            .filter(|specialist| specialist.is_active)
            .collect())
    }

    /// Calendar overrides whose date range covers `date` for the target.
    pub async fn get_overrides(
        &self,
        target: OverrideTarget,
        target_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<CalendarOverride>> {
        let path = format!(
            "/rest/v1/calendar_overrides?target_type=eq.{}&target_id=eq.{}&date_start=lte.{}&date_end=gte.{}",
            target.as_str(),
            target_id,
            date,
            date
        );
        self.request(Method::GET, &path, None).await
    }

    /// Pending/confirmed bookings for one specialist on one date.
    pub async fn get_specialist_bookings(
        &self,
        specialist_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Booking>> {
        let next_day = date + Duration::days(1);
        let path = format!(
            "/rest/v1/bookings?specialist_id=eq.{}&date_start=gte.{}T00:00:00&date_start=lt.{}T00:00:00&status=in.(pending,confirmed)&order=date_start.asc",
            specialist_id, date, next_day
        );
        self.request(Method::GET, &path, None).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(serde::Deserialize)]
struct SpecialistLinkRow {
    specialist: Specialist,
}
