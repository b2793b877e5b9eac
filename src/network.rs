//! Spoonacular client: search, random and by-id fetches, plus payload normalization.

use crate::consts::{endpoints, headers, placeholders};
use crate::utils::clean_instructions;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP: {0}")] Http(reqwest::Error),
    #[error("Timeout")] Timeout,
    #[error("Status: {0}")] Status(StatusCode),
    #[error("Empty")] Empty,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { FetchError::Timeout } else { FetchError::Http(e) }
    }
}

/// A recipe normalized from the raw API shape. Text fields are whatever
/// language the API answered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: Option<i64>,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nutrition {
    pub calories: String,
    pub fat: String,
    pub carbs: String,
    pub protein: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawNutrition {
    calories: Option<Value>,
    fat: Option<Value>,
    carbs: Option<Value>,
    protein: Option<Value>,
}

impl From<RawNutrition> for Nutrition {
    fn from(raw: RawNutrition) -> Self {
        let field = |v: Option<Value>| match v {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => placeholders::NO_NUTRITION.to_string(),
        };
        Self {
            calories: field(raw.calories),
            fat: field(raw.fat),
            carbs: field(raw.carbs),
            protein: field(raw.protein),
        }
    }
}

/// Builds a [`Recipe`] out of an information/search/random payload,
/// substituting placeholders for anything missing.
pub fn extract_recipe_data(raw: &Value) -> Recipe {
    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(placeholders::UNTITLED)
        .to_string();

    let mut ingredients: Vec<String> = raw
        .get("extendedIngredients")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .map(|ing| {
                    ing.get("original")
                        .and_then(Value::as_str)
                        .or_else(|| ing.get("name").and_then(Value::as_str))
                        .unwrap_or(placeholders::UNKNOWN_INGREDIENT)
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default();
    if ingredients.is_empty() {
        ingredients.push(placeholders::NO_INGREDIENTS.to_string());
    }

    Recipe {
        id: raw.get("id").and_then(Value::as_i64),
        title,
        ingredients,
        instructions: clean_instructions(raw.get("instructions").and_then(Value::as_str)),
        image: raw.get("image").and_then(Value::as_str).map(str::to_string),
    }
}

pub struct RecipeSource {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl RecipeSource {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            language: language.into(),
        }
    }

    /// Shared HTTP client for every outbound call.
    pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder()
            .user_agent(headers::USER_AGENT)
            .timeout(timeout)
            .build()
    }

    /// Searches for `number` recipes. `None` when the search call fails or when
    /// nothing survives normalization; detail fetches that fail are skipped.
    pub async fn search(&self, query: &str, number: u32, diet: Option<&str>) -> Option<Vec<Recipe>> {
        match self.try_search(query, number, diet).await {
            Ok(recipes) => Some(recipes),
            Err(FetchError::Empty) => None,
            Err(e) => {
                log::error!("Recipe search '{}' failed: {}", query, e);
                None
            }
        }
    }

    pub async fn get_random(&self) -> Option<Recipe> {
        match self.try_random().await {
            Ok(recipe) => Some(recipe),
            Err(e) => {
                log::error!("Random recipe failed: {}", e);
                None
            }
        }
    }

    pub async fn get_by_id(&self, id: i64) -> Option<Recipe> {
        match self.information(id).await {
            Ok(raw) => Some(extract_recipe_data(&raw)),
            Err(e) => {
                log::error!("Recipe {} failed: {}", id, e);
                None
            }
        }
    }

    pub async fn get_nutrition(&self, id: i64) -> Option<Nutrition> {
        let fetched = async {
            let res = self.get(&endpoints::nutrition(id), &[]).await?;
            Ok::<_, FetchError>(res.json::<RawNutrition>().await?)
        };
        match fetched.await {
            Ok(raw) => Some(raw.into()),
            Err(e) => {
                log::error!("Nutrition for {} failed: {}", id, e);
                None
            }
        }
    }

    async fn try_search(&self, query: &str, number: u32, diet: Option<&str>) -> Result<Vec<Recipe>, FetchError> {
        let number = number.max(1).to_string();
        let mut params = vec![
            ("query", query),
            ("number", number.as_str()),
            ("instructionsRequired", "true"),
            ("addRecipeInformation", "true"),
        ];
        if let Some(diet) = diet {
            params.push(("diet", diet));
        }

        let data: Value = self.get(endpoints::SEARCH, &params).await?.json().await?;
        let results = data
            .get("results")
            .and_then(Value::as_array)
            .filter(|r| !r.is_empty())
            .ok_or(FetchError::Empty)?;

        let mut recipes = Vec::with_capacity(results.len());
        for result in results {
            if result.get("extendedIngredients").is_some() {
                recipes.push(extract_recipe_data(result));
                continue;
            }
            let Some(id) = result.get("id").and_then(Value::as_i64) else {
                log::warn!("Search result without id skipped");
                continue;
            };
            match self.information(id).await {
                Ok(raw) => recipes.push(extract_recipe_data(&raw)),
                Err(e) => log::warn!("Detail fetch for {} skipped: {}", id, e),
            }
        }

        if recipes.is_empty() { return Err(FetchError::Empty); }
        Ok(recipes)
    }

    async fn try_random(&self) -> Result<Recipe, FetchError> {
        let data: Value = self.get(endpoints::RANDOM, &[("number", "1")]).await?.json().await?;
        data.get("recipes")
            .and_then(|r| r.get(0))
            .map(extract_recipe_data)
            .ok_or(FetchError::Empty)
    }

    async fn information(&self, id: i64) -> Result<Value, FetchError> {
        Ok(self.get(&endpoints::information(id), &[]).await?.json().await?)
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(params)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(FetchError::Status(res.status()));
        }
        Ok(res)
    }
}
