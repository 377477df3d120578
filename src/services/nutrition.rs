use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{FoodMatch, Nutrient, NutrientProfile};

/// Maps a free-text food name to its nutrient profile at 100 g.
///
/// `Ok(None)` means the service had no match for the query. Errors are
/// reserved for transport failures and unexpected payloads.
#[async_trait::async_trait]
pub trait NutritionLookup: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<Option<NutrientProfile>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<FoodMatch>,
}

#[derive(Debug, Deserialize)]
struct IngredientInformation {
    name: String,
    nutrition: IngredientNutrition,
}

#[derive(Debug, Deserialize)]
struct IngredientNutrition {
    #[serde(default)]
    nutrients: Vec<Nutrient>,
}

/// Spoonacular ingredient API: search by name, then fetch details by id.
pub struct SpoonacularClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl SpoonacularClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Best single match for `query`, if any.
    pub async fn search(&self, query: &str) -> Result<Option<FoodMatch>> {
        log::info!("🔍 Searching ingredients for '{}'", query);

        let response = self
            .client
            .get(self.api_url("/food/ingredients/search"))
            .query(&[("query", query), ("number", "1"), ("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Spoonacular search error ({}): {}", status, error_text);
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.results.into_iter().next())
    }

    /// Nutrient profile of ingredient `id` at the 100 g reference amount.
    pub async fn information(&self, id: i64) -> Result<NutrientProfile> {
        let amount = NutrientProfile::REFERENCE_GRAMS.to_string();

        let response = self
            .client
            .get(self.api_url(&format!("/food/ingredients/{}/information", id)))
            .query(&[
                ("amount", amount.as_str()),
                ("unit", "grams"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Spoonacular information error ({}): {}", status, error_text);
        }

        let info: IngredientInformation = response.json().await?;
        log::debug!(
            "📄 Ingredient {} ('{}') has {} nutrient entries",
            id,
            info.name,
            info.nutrition.nutrients.len()
        );

        Ok(NutrientProfile {
            name: info.name,
            nutrients: info.nutrition.nutrients,
        })
    }
}

#[async_trait::async_trait]
impl NutritionLookup for SpoonacularClient {
    async fn resolve(&self, query: &str) -> Result<Option<NutrientProfile>> {
        match self.search(query).await? {
            Some(found) => {
                log::info!("✅ '{}' matched ingredient {} ('{}')", query, found.id, found.name);
                Ok(Some(self.information(found.id).await?))
            }
            None => {
                log::info!("∅ No ingredient match for '{}'", query);
                Ok(None)
            }
        }
    }
}
