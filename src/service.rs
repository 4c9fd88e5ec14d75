use chrono::Utc;
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};

use crate::chart::ChartService;
use crate::formatters::{format_chart, format_cities};
use crate::models::{CalculateRequest, SearchCitiesRequest};

/// Astrology service that handles MCP requests
#[derive(Clone)]
pub struct Astrology {
    charts: ChartService,
    tool_router: ToolRouter<Self>,
}

impl Astrology {
    /// Creates a new Astrology service on top of a chart service
    pub fn new(charts: ChartService) -> Self {
        Self {
            charts,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for Astrology {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "astro-forecast".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Natal chart calculator for Russian cities. Look up the birth city with \
                search_cities, then call calculate_chart to get planet signs, an approximate \
                ascendant with equal houses and a 30-day forecast in Russian."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Astrology {
    /// Searches the city directory
    #[tool(description = "Search supported birth cities by a case-insensitive fragment of the name (e.g., 'моск' for Москва). Returns at most 50 cities with coordinates.")]
    async fn search_cities(
        &self,
        Parameters(request): Parameters<SearchCitiesRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Searching cities for: {}", request.search);

        let cities = self.charts.cities().search(&request.search);
        let formatted = format_cities(&cities);

        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Calculates a natal chart with forecast
    #[tool(description = "Calculate a natal chart and a forecast for the next 30 days. Provide the city exactly as returned by search_cities, the birth date as YYYY-MM-DD, the local birth time as HH:MM, optionally the UTC offset in minutes east of UTC (e.g., 180 for Moscow) and a name to personalise the forecast.")]
    async fn calculate_chart(
        &self,
        Parameters(request): Parameters<CalculateRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Calculating chart for {} {} {}", request.city, request.date, request.time);

        let chart = self
            .charts
            .calculate(&request, Utc::now())
            .await
            .map_err(|e| {
                if e.is_validation() {
                    McpError::invalid_params(e.to_string(), None)
                } else {
                    tracing::error!("Chart calculation failed: {}", e);
                    McpError::internal_error("Failed to calculate chart", None)
                }
            })?;

        let formatted = format_chart(&chart);

        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn service() -> Astrology {
        Astrology::new(ChartService::from_config(&AppConfig::default()).unwrap())
    }

    #[test]
    fn test_server_info() {
        let info = service().get_info();
        assert_eq!(info.server_info.name, "astro-forecast");
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_calculate_chart_tool() {
        let request = CalculateRequest {
            name: None,
            city: "Москва".to_string(),
            date: "1990-01-01".to_string(),
            time: "12:00".to_string(),
            utc_offset: Some(180),
        };
        let result = service()
            .calculate_chart(Parameters(request))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(false));
    }

    #[tokio::test]
    async fn test_unknown_city_is_invalid_params() {
        let request = CalculateRequest {
            name: None,
            city: "Атлантида".to_string(),
            date: "1990-01-01".to_string(),
            time: "12:00".to_string(),
            utc_offset: None,
        };
        let err = service()
            .calculate_chart(Parameters(request))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Город не найден");
    }
}
