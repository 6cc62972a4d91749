//! Prediction service client over HTTP

use crate::config::ForecastConfig;
use crate::core::error::{ForecastError, MarketError, MarketResult};
use crate::core::forecast::{
    ForecastPeriods, ForecastSource, HorizonForecast, HorizonRequest, MarketDemandInsight,
    MarketDemandResponse, MonthlyForecast, SurplusPrediction, SurplusResponse,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// [`ForecastSource`] backed by the prediction service's JSON API
#[derive(Debug, Clone)]
pub struct HttpForecastClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpForecastClient {
    /// Build a client whose every request is bounded by `config.timeout()`
    pub fn new(config: &ForecastConfig) -> MarketResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                MarketError::Internal(format!("Failed to build forecast HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ForecastError> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;
        decode(endpoint, response).await
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ForecastError>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;
        decode(endpoint, response).await
    }
}

fn transport(endpoint: &str, err: reqwest::Error) -> ForecastError {
    tracing::warn!(endpoint, error = %err, "prediction service unreachable");
    ForecastError::Transport {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ForecastError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(endpoint, status = status.as_u16(), "prediction service error status");
        return Err(ForecastError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    response.json::<T>().await.map_err(|e| {
        tracing::warn!(endpoint, error = %e, "unexpected prediction payload");
        ForecastError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        }
    })
}

/// A 2xx body whose `error` field is set is still a failure
fn service_error(endpoint: &str, error: Option<String>) -> Result<(), ForecastError> {
    match error {
        Some(message) => {
            tracing::warn!(endpoint, %message, "prediction service reported an error");
            Err(ForecastError::Service {
                endpoint: endpoint.to_string(),
                message,
            })
        }
        None => Ok(()),
    }
}

#[async_trait]
impl ForecastSource for HttpForecastClient {
    async fn monthly_forecast(&self) -> MarketResult<MonthlyForecast> {
        Ok(self.get_json("/forecast_monthly").await?)
    }

    async fn market_demand(&self) -> MarketResult<Vec<MarketDemandInsight>> {
        let response: MarketDemandResponse = self.get_json("/market_demand").await?;
        Ok(response.insights)
    }

    async fn forecast_periods(&self) -> MarketResult<ForecastPeriods> {
        // Without forecasts the service answers {"error": "..."} only
        #[derive(serde::Deserialize)]
        struct Body {
            #[serde(flatten)]
            periods: ForecastPeriods,
            error: Option<String>,
        }

        let endpoint = "/forecast_periods";
        let body: Body = self.get_json(endpoint).await?;
        service_error(endpoint, body.error)?;
        Ok(body.periods)
    }

    async fn surplus_predictions(&self) -> MarketResult<Vec<SurplusPrediction>> {
        let endpoint = "/predict_surplus_auto";
        let response: SurplusResponse = self.get_json(endpoint).await?;
        service_error(endpoint, response.error)?;
        Ok(response.predictions)
    }

    async fn horizon_forecast(&self, horizon: u32) -> MarketResult<Vec<f64>> {
        let endpoint = "/forecast_all";
        let response: HorizonForecast = self
            .post_json(endpoint, &HorizonRequest { horizon })
            .await?;
        service_error(endpoint, response.error)?;
        Ok(response.forecast)
    }
}
