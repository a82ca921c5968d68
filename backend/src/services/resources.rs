//! Regional subsidy and market lookup

use shared::{validate_coordinates, GeoCoordinate, Language, SubsidiesAndMarkets};
use std::sync::Arc;

use crate::error::{AppResult, Operation};
use crate::external::{GenerativeModel, Schema};
use crate::services::structured::StructuredClient;

const RESOURCES_INSTRUCTION: &str = "You are an Indian agricultural information specialist. Based on the provided geo-coordinates, identify the Indian state. Then, find relevant information for farmers in that location.
1.  List 2-3 key, currently active Central Government agricultural subsidies.
2.  List 2-3 key, currently active State-specific Government agricultural subsidies for that state.
3.  List 3-5 major nearby agricultural markets (mandis).
Provide real, accurate, and up-to-date information. For subsidies, provide a real, official government link. Respond ONLY with a valid JSON object matching the schema.";

/// Subsidies and markets near the farmer
#[derive(Clone)]
pub struct RegionalResourceService {
    client: StructuredClient,
}

impl RegionalResourceService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            client: StructuredClient::new(model),
        }
    }

    /// List counts in the instruction are guidance only; any length is accepted
    pub async fn request_regional_resources(
        &self,
        coord: &GeoCoordinate,
        language: Language,
    ) -> AppResult<SubsidiesAndMarkets> {
        validate_coordinates(coord)?;

        let prompt = format!(
            "My location is: latitude={}, longitude={}. Provide a list of subsidies and nearby markets.",
            coord.latitude, coord.longitude
        );

        let resources: SubsidiesAndMarkets = self
            .client
            .generate(
                Operation::RegionalResources,
                prompt,
                RESOURCES_INSTRUCTION,
                resources_schema(),
                language,
            )
            .await?;

        tracing::debug!(
            central = resources.central_subsidies.len(),
            state = resources.state_subsidies.len(),
            markets = resources.local_markets.len(),
            "Regional resources received"
        );
        if resources.is_empty() {
            tracing::warn!(
                latitude = coord.latitude,
                longitude = coord.longitude,
                "No subsidies or markets found for location"
            );
        }
        Ok(resources)
    }
}

fn subsidy_schema() -> Schema {
    Schema::object()
        .property("name", Schema::string())
        .property("description", Schema::string())
        .property("eligibility", Schema::string())
        .property("link", Schema::string())
        .require_all()
}

pub fn resources_schema() -> Schema {
    Schema::object()
        .property("centralSubsidies", Schema::array(subsidy_schema()))
        .property("stateSubsidies", Schema::array(subsidy_schema()))
        .property(
            "localMarkets",
            Schema::array(
                Schema::object()
                    .property("name", Schema::string())
                    .property("location", Schema::string())
                    .property("commodities", Schema::string())
                    .require_all(),
            ),
        )
        .require_all()
}
