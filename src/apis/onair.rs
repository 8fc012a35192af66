use reqwest::{Client, Url};
use serde::Deserialize;
use shuttle_runtime::async_trait;
use uuid::Uuid;

use super::FlightSource;
use crate::{error::ApiError, types::Flight};

pub struct OnAirApi {
    client: Client,
    url: Url,
    api_key: String,
}

/// Envelope every OnAir public endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WsResult<T> {
    #[serde(default)]
    content: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl OnAirApi {
    pub fn new(url: Url, api_key: String) -> Self {
        Self {
            client: Client::new(),
            url,
            api_key,
        }
    }

    fn company_flights_url(&self, company_id: Uuid, limit: u32) -> Url {
        let mut url = self.url.clone();
        url.set_path(&format!(
            "{}/api/v1/company/{}/flights",
            self.url.path().trim_end_matches('/'),
            company_id
        ));
        url.query_pairs_mut()
            .clear()
            .append_pair("limit", &limit.to_string());
        url
    }

    pub async fn get_company_flights(
        &self,
        company_id: Uuid,
        limit: u32,
    ) -> Result<Vec<Flight>, ApiError> {
        let response = self
            .client
            .get(self.company_flights_url(company_id, limit))
            .header("oa-apikey", &self.api_key)
            .send()
            .await?
            .error_for_status()?;

        let result = response.json::<WsResult<Vec<Flight>>>().await?;

        into_flights(result)
    }
}

fn into_flights(result: WsResult<Vec<Flight>>) -> Result<Vec<Flight>, ApiError> {
    if let Some(error) = result.error.filter(|e| !e.is_empty()) {
        return Err(ApiError::Upstream(error));
    }

    Ok(result.content.unwrap_or_default())
}

#[async_trait]
impl FlightSource for OnAirApi {
    async fn recent_flights(&self, company_id: Uuid, limit: u32) -> Result<Vec<Flight>, ApiError> {
        self.get_company_flights(company_id, limit).await
    }
}
