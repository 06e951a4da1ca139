//! Query dispatch for the demo endpoint
//!
//! Each known query name maps to a [`DemoQuery`] variant carrying its own
//! typed parameters. Anything else is echoed back as unrecognized.

use chrono::{Local, NaiveTime};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::types::McpRequest;

const UNKNOWN_LOCATION: &str = "unknown";

/// Parameters of `getWeather`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeatherParams {
    #[serde(default)]
    pub location: Option<String>,
}

impl WeatherParams {
    fn location(&self) -> &str {
        match self.location.as_deref() {
            Some(location) if !location.is_empty() => location,
            _ => UNKNOWN_LOCATION,
        }
    }
}

/// Parameters of `calculateSum`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SumParams {
    pub numbers: Vec<f64>,
}

/// A parsed demo query
#[derive(Debug, Clone, PartialEq)]
pub enum DemoQuery {
    CurrentTime,
    Weather(WeatherParams),
    /// `None` when `numbers` is absent or not an array of numbers
    Sum(Option<SumParams>),
    Unrecognized(String),
}

impl DemoQuery {
    pub fn from_request(request: &McpRequest) -> Self {
        let params = request.parameters.as_ref();
        match request.query.as_str() {
            "getCurrentTime" => DemoQuery::CurrentTime,
            "getWeather" => DemoQuery::Weather(typed(params).unwrap_or_default()),
            "calculateSum" => DemoQuery::Sum(typed(params)),
            other => DemoQuery::Unrecognized(other.to_string()),
        }
    }

    /// Render the response text using the local clock
    pub fn respond(&self) -> String {
        self.respond_at(Local::now().time())
    }

    /// Render the response text at a fixed time of day
    pub fn respond_at(&self, now: NaiveTime) -> String {
        match self {
            DemoQuery::CurrentTime => {
                format!("The current time is {}", now.format("%H:%M:%S"))
            }
            DemoQuery::Weather(params) => format!(
                "The weather in {} is currently sunny and 72°F",
                params.location()
            ),
            DemoQuery::Sum(Some(params)) => {
                let sum: f64 = params.numbers.iter().sum();
                format!("The sum of the numbers is {}", format_number(sum))
            }
            DemoQuery::Sum(None) => "Invalid parameters for sum calculation".to_string(),
            DemoQuery::Unrecognized(query) => format!("Unrecognized query: {query}"),
        }
    }
}

fn typed<T: DeserializeOwned>(params: Option<&Map<String, Value>>) -> Option<T> {
    params.and_then(|map| serde_json::from_value(Value::Object(map.clone())).ok())
}

/// Integral sums print without a fractional part
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
