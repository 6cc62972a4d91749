//! Prediction service boundary
//!
//! Demand forecasts and surplus-risk predictions come from an external HTTP
//! service. The payloads are rendered as tables and charts; the catalog query
//! engine never filters or sorts them.

use crate::core::error::MarketResult;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key of the first forecast month in monthly payloads
pub const NEXT_MONTH_KEY: &str = "Month+1";

/// Aggregation windows, as (period key, months)
pub const PERIODS: [(&str, usize); 4] = [
    ("1_month", 1),
    ("3_months", 3),
    ("6_months", 6),
    ("12_months", 12),
];

/// `{forecasts: {drug: {"Month+1": value, ...}}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyForecast {
    #[serde(default)]
    pub forecasts: IndexMap<String, IndexMap<String, f64>>,
}

/// Demand trend label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandTrend {
    High,
    Stable,
    #[serde(other)]
    Other,
}

/// One row of the market-demand panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDemandInsight {
    pub drug: String,
    pub trend: DemandTrend,
    pub forecast: f64,
}

/// `{insights: [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDemandResponse {
    #[serde(default)]
    pub insights: Vec<MarketDemandInsight>,
}

/// A dated forecast value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: String,
    pub value: f64,
}

/// One drug's entry within a forecast period.
///
/// The prediction service reports a plain total; chart consumers may also
/// receive the dated points the total was summed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeriodSeries {
    Total(f64),
    Points(Vec<ForecastPoint>),
}

impl PeriodSeries {
    pub fn total(&self) -> f64 {
        match self {
            PeriodSeries::Total(total) => *total,
            PeriodSeries::Points(points) => points.iter().map(|p| p.value).sum(),
        }
    }
}

/// `{forecasts: {period: {drug: total | [{date, value}]}}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriods {
    #[serde(default)]
    pub forecasts: IndexMap<String, IndexMap<String, PeriodSeries>>,
}

impl ForecastPeriods {
    /// Dated windows over a monthly forecast: each period holds the first N
    /// monthly points of every drug
    pub fn from_monthly(monthly: &MonthlyForecast) -> Self {
        let forecasts = PERIODS
            .iter()
            .map(|(period, months)| {
                let drugs = monthly
                    .forecasts
                    .iter()
                    .map(|(drug, series)| {
                        let points = series
                            .iter()
                            .take(*months)
                            .map(|(date, value)| ForecastPoint {
                                date: date.clone(),
                                value: *value,
                            })
                            .collect();
                        (drug.clone(), PeriodSeries::Points(points))
                    })
                    .collect();
                (period.to_string(), drugs)
            })
            .collect();
        Self { forecasts }
    }

    /// Per-period, per-drug sums
    pub fn totals(&self) -> IndexMap<String, IndexMap<String, f64>> {
        self.forecasts
            .iter()
            .map(|(period, drugs)| {
                let sums = drugs
                    .iter()
                    .map(|(drug, series)| (drug.clone(), series.total()))
                    .collect();
                (period.clone(), sums)
            })
            .collect()
    }
}

/// Sums of the first 1, 3, 6 and 12 months of every drug, keyed by period
pub fn period_totals(monthly: &MonthlyForecast) -> IndexMap<String, IndexMap<String, f64>> {
    PERIODS
        .iter()
        .map(|(period, months)| {
            let drugs = monthly
                .forecasts
                .iter()
                .map(|(drug, series)| (drug.clone(), series.values().take(*months).sum()))
                .collect();
            (period.to_string(), drugs)
        })
        .collect()
}

/// Model inputs reported next to a surplus prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SurplusFeatures {
    pub forecast_demand: f64,
    pub current_stock: f64,
    pub surplus: f64,
    pub shelf_life_days: f64,
    pub lead_time_days: f64,
    pub unit_cost: f64,
    pub wastage_rate: f64,
}

/// Surplus-risk classification for one drug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurplusPrediction {
    pub drug: String,
    pub prediction: String,
    pub forecast_demand: f64,
    pub features: SurplusFeatures,
}

/// `{predictions: [...], error?}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurplusResponse {
    #[serde(default)]
    pub predictions: Vec<SurplusPrediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of the horizon forecast request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonRequest {
    pub horizon: u32,
}

/// `{forecast: number[], error?}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HorizonForecast {
    #[serde(default)]
    pub forecast: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Chart row for a horizon series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub day: String,
    pub sales: f64,
}

/// Starting maximum for [`market_demand`]
pub const DEMAND_FLOOR: f64 = -1.0;

/// Demand insights from a monthly forecast.
///
/// Every drug gets its next-month value (0 when absent). The drug with the
/// largest value is `High`, ties going to the first one seen; the rest are
/// `Stable`. The running maximum starts at [`DEMAND_FLOOR`], so no drug is
/// `High` when every value is at or below it.
pub fn market_demand(monthly: &MonthlyForecast) -> Vec<MarketDemandInsight> {
    let next_month = |series: &IndexMap<String, f64>| {
        series.get(NEXT_MONTH_KEY).copied().unwrap_or(0.0)
    };

    let mut top: Option<(&str, f64)> = None;
    for (drug, series) in &monthly.forecasts {
        let value = next_month(series);
        let best = top.map_or(DEMAND_FLOOR, |(_, best)| best);
        if value > best {
            top = Some((drug.as_str(), value));
        }
    }

    monthly
        .forecasts
        .iter()
        .map(|(drug, series)| MarketDemandInsight {
            drug: drug.clone(),
            trend: if top.is_some_and(|(name, _)| name == drug) {
                DemandTrend::High
            } else {
                DemandTrend::Stable
            },
            forecast: next_month(series),
        })
        .collect()
}

/// Label each value of a horizon series as "Day N"
pub fn chart_points(forecast: &[f64]) -> Vec<ChartPoint> {
    forecast
        .iter()
        .enumerate()
        .map(|(index, value)| ChartPoint {
            day: format!("Day {}", index + 1),
            sales: *value,
        })
        .collect()
}

/// The prediction service
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Raw per-drug monthly forecast
    async fn monthly_forecast(&self) -> MarketResult<MonthlyForecast>;

    async fn market_demand(&self) -> MarketResult<Vec<MarketDemandInsight>>;

    async fn forecast_periods(&self) -> MarketResult<ForecastPeriods>;

    async fn surplus_predictions(&self) -> MarketResult<Vec<SurplusPrediction>>;

    async fn horizon_forecast(&self, horizon: u32) -> MarketResult<Vec<f64>>;
}

/// Forecast source answering from fixed data
#[derive(Debug, Clone, Default)]
pub struct StaticForecastSource {
    pub monthly: MonthlyForecast,
    pub surplus: Vec<SurplusPrediction>,
    pub series: Vec<f64>,
}

impl StaticForecastSource {
    pub fn new(monthly: MonthlyForecast) -> Self {
        Self {
            monthly,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ForecastSource for StaticForecastSource {
    async fn monthly_forecast(&self) -> MarketResult<MonthlyForecast> {
        Ok(self.monthly.clone())
    }

    async fn market_demand(&self) -> MarketResult<Vec<MarketDemandInsight>> {
        Ok(market_demand(&self.monthly))
    }

    async fn forecast_periods(&self) -> MarketResult<ForecastPeriods> {
        Ok(ForecastPeriods::from_monthly(&self.monthly))
    }

    async fn surplus_predictions(&self) -> MarketResult<Vec<SurplusPrediction>> {
        Ok(self.surplus.clone())
    }

    async fn horizon_forecast(&self, horizon: u32) -> MarketResult<Vec<f64>> {
        Ok(self.series.iter().take(horizon as usize).copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn monthly() -> MonthlyForecast {
        serde_json::from_value(json!({
            "forecasts": {
                "M01AB": {"Month+1": 5.6, "Month+2": 5.4, "Month+3": 5.3},
                "M01AE": {"Month+1": 4.0, "Month+2": 3.9, "Month+3": 3.8},
                "N02BA": {"Month+2": 9.0}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_market_demand_marks_top_drug() {
        let insights = market_demand(&monthly());
        assert_eq!(insights.len(), 3);
        assert_eq!(insights[0].drug, "M01AB");
        assert_eq!(insights[0].trend, DemandTrend::High);
        assert_eq!(insights[1].trend, DemandTrend::Stable);
        assert_eq!(insights[2].forecast, 0.0);
        assert_eq!(insights[2].trend, DemandTrend::Stable);
    }

    #[test]
    fn test_market_demand_tie_goes_to_first() {
        let monthly: MonthlyForecast = serde_json::from_value(json!({
            "forecasts": {"A": {"Month+1": 2.0}, "B": {"Month+1": 2.0}}
        }))
        .unwrap();
        let insights = market_demand(&monthly);
        assert_eq!(insights[0].trend, DemandTrend::High);
        assert_eq!(insights[1].trend, DemandTrend::Stable);
    }

    #[test]
    fn test_market_demand_nothing_above_floor() {
        let monthly: MonthlyForecast = serde_json::from_value(json!({
            "forecasts": {"A": {"Month+1": -1.0}, "B": {"Month+1": -3.5}}
        }))
        .unwrap();
        let insights = market_demand(&monthly);
        assert_eq!(insights.len(), 2);
        assert!(insights.iter().all(|i| i.trend == DemandTrend::Stable));
    }

    #[test]
    fn test_market_demand_negative_above_floor_is_high() {
        let monthly: MonthlyForecast = serde_json::from_value(json!({
            "forecasts": {"A": {"Month+1": -2.0}, "B": {"Month+1": -0.5}}
        }))
        .unwrap();
        let insights = market_demand(&monthly);
        assert_eq!(insights[0].trend, DemandTrend::Stable);
        assert_eq!(insights[1].trend, DemandTrend::High);
    }

    #[test]
    fn test_market_demand_empty() {
        assert!(market_demand(&MonthlyForecast::default()).is_empty());
    }

    #[test]
    fn test_period_totals() {
        let totals = period_totals(&monthly());
        let keys: Vec<&str> = totals.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["1_month", "3_months", "6_months", "12_months"]);
        assert!((totals["1_month"]["M01AB"] - 5.6).abs() < 1e-9);
        assert!((totals["3_months"]["M01AE"] - 11.7).abs() < 1e-9);
        assert!((totals["12_months"]["M01AB"] - 16.3).abs() < 1e-9);
        assert_eq!(totals["1_month"]["N02BA"], 9.0);
    }

    #[test]
    fn test_dated_windows_agree_with_totals() {
        let periods = ForecastPeriods::from_monthly(&monthly());
        match &periods.forecasts["3_months"]["M01AB"] {
            PeriodSeries::Points(points) => {
                assert_eq!(points.len(), 3);
                assert_eq!(points[0].date, "Month+1");
            }
            other => panic!("expected points, got {other:?}"),
        }
        assert_eq!(periods.totals(), period_totals(&monthly()));
    }

    #[test]
    fn test_periods_accept_plain_totals() {
        let periods: ForecastPeriods = serde_json::from_value(json!({
            "forecasts": {
                "1_month": {"M01AB": 5.6},
                "3_months": {"M01AB": [{"date": "2025-01", "value": 5.6}, {"date": "2025-02", "value": 5.4}]}
            }
        }))
        .unwrap();
        let totals = periods.totals();
        assert_eq!(totals["1_month"]["M01AB"], 5.6);
        assert!((totals["3_months"]["M01AB"] - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_chart_points() {
        let points = chart_points(&[10.0, 12.5]);
        assert_eq!(points[0].day, "Day 1");
        assert_eq!(points[1].day, "Day 2");
        assert_eq!(points[1].sales, 12.5);
    }

    #[test]
    fn test_surplus_payload_shape() {
        let response: SurplusResponse = serde_json::from_value(json!({
            "predictions": [{
                "drug": "M01AB",
                "prediction": "High Risk",
                "forecast_demand": 5.6,
                "features": {
                    "ForecastDemand": 5.6, "CurrentStock": 6.72, "Surplus": 1.12,
                    "ShelfLifeDays": 180, "LeadTimeDays": 30,
                    "UnitCost": 0.56, "WastageRate": 0.05
                }
            }],
            "status": "success",
            "count": 1
        }))
        .unwrap();
        assert_eq!(response.predictions[0].features.shelf_life_days, 180.0);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_unknown_trend_label() {
        let insight: MarketDemandInsight =
            serde_json::from_value(json!({"drug": "X", "trend": "Falling", "forecast": 1.0}))
                .unwrap();
        assert_eq!(insight.trend, DemandTrend::Other);
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticForecastSource {
            series: vec![1.0, 2.0, 3.0],
            ..StaticForecastSource::new(monthly())
        };
        assert_eq!(source.horizon_forecast(2).await.unwrap(), vec![1.0, 2.0]);
        assert_eq!(source.market_demand().await.unwrap().len(), 3);
        assert!(source.surplus_predictions().await.unwrap().is_empty());
    }
}
