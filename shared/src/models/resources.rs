//! Regional subsidy and market information

use serde::{Deserialize, Serialize};

/// A government agricultural subsidy scheme
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subsidy {
    pub name: String,
    pub description: String,
    pub eligibility: String,
    pub link: String,
}

/// A nearby agricultural market (mandi)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalMarket {
    pub name: String,
    pub location: String,
    pub commodities: String,
}

/// Subsidies and markets for the region around a coordinate.
///
/// List lengths are whatever the model returned, including zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubsidiesAndMarkets {
    pub central_subsidies: Vec<Subsidy>,
    pub state_subsidies: Vec<Subsidy>,
    pub local_markets: Vec<LocalMarket>,
}

impl SubsidiesAndMarkets {
    pub fn is_empty(&self) -> bool {
        self.central_subsidies.is_empty()
            && self.state_subsidies.is_empty()
            && self.local_markets.is_empty()
    }
}
