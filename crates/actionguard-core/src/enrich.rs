//! LLM-powered enrichment of findings.
//!
//! Takes the deterministic findings from the rule engine and asks Claude
//! for a beginner-friendly explanation plus a concrete YAML fix. Falls back
//! to canned template text when no API key is available, so `--enrich`
//! never changes which findings exist.

use crate::rules::Finding;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const SYSTEM_PROMPT: &str = "You are a GitHub Actions security expert. You will receive:\n\
1. A security finding (rule ID, severity, title, description, location)\n\
2. The original workflow YAML file\n\n\
For each finding, respond with EXACTLY this JSON format (no markdown, no extra text):\n\
{\n\
  \"explanation\": \"A clear, beginner-friendly explanation of why this is a security risk. Use 2-3 sentences.\",\n\
  \"suggested_fix\": \"A concrete YAML snippet showing how to fix this specific issue. Only show the relevant part that needs to change.\"\n\
}";

/// Which backend produces the enrichment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    Anthropic,
    Template,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnricherConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key: String,
}

/// A finding's explanation and fix suggestion. Identity fields of the
/// finding itself are never altered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrichment {
    pub rule_id: String,
    pub explanation: String,
    pub suggested_fix: String,
}

pub struct Enricher {
    config: EnricherConfig,
}

impl Enricher {
    pub fn new(config: EnricherConfig) -> Self {
        Self { config }
    }

    /// Use the ANTHROPIC_API_KEY environment variable if set, otherwise
    /// fall back to offline template text.
    pub fn from_env() -> Self {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            return Self::new(EnricherConfig {
                provider: Provider::Anthropic,
                model: DEFAULT_MODEL.to_string(),
                api_key: key,
            });
        }
        Self::template()
    }

    pub fn template() -> Self {
        Self::new(EnricherConfig {
            provider: Provider::Template,
            model: "template".to_string(),
            api_key: String::new(),
        })
    }

    /// Enrich every finding, preserving order.
    pub async fn enrich_all(
        &self,
        findings: &[Finding],
        workflow_yaml: &str,
    ) -> Vec<Enrichment> {
        let mut out = Vec::with_capacity(findings.len());
        for finding in findings {
            out.push(self.enrich(finding, workflow_yaml).await);
        }
        out
    }

    pub async fn enrich(&self, finding: &Finding, workflow_yaml: &str) -> Enrichment {
        match self.config.provider {
            Provider::Anthropic => self
                .enrich_anthropic(finding, workflow_yaml)
                .await
                .unwrap_or_else(|e| {
                    warn!(rule = %finding.rule_id, error = %e, "enrichment call failed, using template");
                    self.enrich_template(finding)
                }),
            Provider::Template => self.enrich_template(finding),
        }
    }

    async fn enrich_anthropic(
        &self,
        finding: &Finding,
        workflow_yaml: &str,
    ) -> Result<Enrichment> {
        debug!(rule = %finding.rule_id, "enriching finding");

        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": 1024,
            "system": SYSTEM_PROMPT,
            "messages": [{
                "role": "user",
                "content": build_user_prompt(finding, workflow_yaml),
            }]
        });

        let client = reqwest::Client::new();
        let resp = client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("failed to call Anthropic API")?;

        let json: serde_json::Value = resp.json().await.context("failed to parse response")?;
        let text = json["content"][0]["text"].as_str().unwrap_or("").trim();

        Ok(parse_response(text, finding))
    }

    /// Deterministic offline enrichment built from the finding itself.
    fn enrich_template(&self, finding: &Finding) -> Enrichment {
        Enrichment {
            rule_id: finding.rule_id.clone(),
            explanation: format!("{} {}", finding.title, finding.description),
            suggested_fix: "See the description above for the recommended change."
                .to_string(),
        }
    }
}

fn build_user_prompt(finding: &Finding, workflow_yaml: &str) -> String {
    let job = if finding.job_id.is_empty() {
        "(workflow-level)"
    } else {
        &finding.job_id
    };
    let step = if finding.step_name.is_empty() {
        "N/A"
    } else {
        &finding.step_name
    };

    format!(
        "Here is the security finding:\n\n\
         Rule ID: {}\n\
         Severity: {}\n\
         Title: {}\n\
         Description: {}\n\
         File: {}\n\
         Job: {}\n\
         Step: {}\n\n\
         Here is the full workflow YAML:\n\n\
         ```yaml\n{}\n```\n\n\
         Respond with the JSON object only.",
        finding.rule_id,
        finding.severity,
        finding.title,
        finding.description,
        finding.file_path,
        job,
        step,
        workflow_yaml
    )
}

/// Parse the model's JSON reply, keeping the raw text when it isn't valid
/// JSON.
fn parse_response(text: &str, finding: &Finding) -> Enrichment {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(data) => Enrichment {
            rule_id: finding.rule_id.clone(),
            explanation: data["explanation"]
                .as_str()
                .unwrap_or("No explanation provided.")
                .to_string(),
            suggested_fix: data["suggested_fix"]
                .as_str()
                .unwrap_or("No fix suggested.")
                .to_string(),
        },
        Err(_) => {
            warn!(rule = %finding.rule_id, "model reply was not valid JSON");
            Enrichment {
                rule_id: finding.rule_id.clone(),
                explanation: text.to_string(),
                suggested_fix: "Could not parse fix suggestion.".to_string(),
            }
        }
    }
}
