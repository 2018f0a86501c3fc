use serde::Deserialize;
use tokio::time::timeout;

use crate::config::ClassifierConfig;
use crate::error::{AppError, AppResult};
use crate::models::CreateLeadRequest;

/// Zero-shot classification result from the remote model.
#[derive(Debug, Deserialize)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

/// Decides which team a new lead belongs to.
///
/// The remote zero-shot classifier is tried first; on any error or timeout
/// the budget/location rules decide instead, so a slow or failing classifier
/// never blocks lead creation and never surfaces past this service.
pub struct LeadRouter {
    http: reqwest::Client,
    config: ClassifierConfig,
}

impl LeadRouter {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub async fn assign_team(&self, lead: &CreateLeadRequest) -> String {
        match self.classify(lead).await {
            Ok(prediction) => Self::decide_team(&prediction).to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "classifier unavailable, falling back to rule routing");
                Self::route_by_rules(lead.budget, &lead.location).to_string()
            }
        }
    }

    /// Calls the remote zero-shot model with a bounded timeout.
    async fn classify(&self, lead: &CreateLeadRequest) -> AppResult<Vec<Classification>> {
        let api_url = self
            .config
            .api_url
            .as_deref()
            .ok_or_else(|| AppError::Classifier("no classifier endpoint configured".into()))?;

        let input = format!(
            "{} with budget {} from {}",
            lead.name, lead.budget, lead.location
        );

        let mut request = self
            .http
            .post(format!("{api_url}/facebook/bart-large-mnli"))
            .json(&serde_json::json!({ "inputs": input }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| AppError::Classifier("classification timed out".into()))?
            .map_err(|e| AppError::Classifier(e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| AppError::Classifier(e.to_string()))?
            .json::<Vec<Classification>>()
            .await
            .map_err(|e| AppError::Classifier(e.to_string()))
    }

    /// Enterprise only when the top score is confident enough.
    fn decide_team(prediction: &[Classification]) -> &'static str {
        match prediction.first().and_then(|c| c.scores.first()) {
            Some(score) if *score > 0.8 => "Enterprise Team",
            _ => "General Team",
        }
    }

    fn route_by_rules(budget: f64, location: &str) -> &'static str {
        if budget > 10_000.0 {
            return "Enterprise";
        }
        if location.to_lowercase().contains("africa") {
            return "Africa Sales";
        }
        "General"
    }
}
