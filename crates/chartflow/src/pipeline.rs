// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Request orchestration.
//!
//! A chart request moves through a fixed, linear chain of stages:
//!
//! ```text
//! Classify -> TryAssisted -> TryDeterministic -> TerminalFallback -> Done
//! ```
//!
//! Each stage either finishes the request or hands over to the next, less
//! sophisticated one. No stage runs twice and nothing loops back, so a
//! chart request always ends in a renderable document.

use crate::analysis;
use crate::assisted;
use crate::classifier::{self, ChartKind, Classification};
use crate::config::ChartflowConfig;
use crate::context;
use crate::dataset::Dataset;
use crate::document::ChartDocument;
use crate::error::{ChartError, LLMError, LLMResult};
use crate::generators;
use crate::llm::{self, LanguageModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Which stage produced a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Assisted,
    Deterministic,
    ErrorAnnotation,
    TerminalFallback,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Assisted => "assisted",
            Strategy::Deterministic => "deterministic",
            Strategy::ErrorAnnotation => "error_annotation",
            Strategy::TerminalFallback => "terminal_fallback",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOutcome {
    pub chart_kind: ChartKind,
    pub strategy: Strategy,
    pub document: ChartDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineResponse {
    Chart(ChartOutcome),
    Answer { text: String },
}

#[derive(Debug)]
enum Stage {
    TryAssisted,
    TryDeterministic,
    TerminalFallback,
    Done(ChartOutcome),
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::TryAssisted => "try_assisted",
            Stage::TryDeterministic => "try_deterministic",
            Stage::TerminalFallback => "terminal_fallback",
            Stage::Done(_) => "done",
        }
    }
}

/// Entry point for chart and analysis requests. Holds no dataset; every
/// call receives the dataset it works on.
#[derive(Clone)]
pub struct ChartPipeline {
    model: Option<Arc<dyn LanguageModel>>,
    config: ChartflowConfig,
}

impl std::fmt::Debug for ChartPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartPipeline")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("config", &self.config)
            .finish()
    }
}

impl ChartPipeline {
    pub fn new(config: ChartflowConfig) -> Self {
        Self {
            model: None,
            config,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn config(&self) -> &ChartflowConfig {
        &self.config
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.config.llm.timeout_seconds)
    }

    pub fn classify(&self, request: &str) -> Classification {
        classifier::classify(request)
    }

    pub fn context(&self, dataset: &Dataset) -> String {
        context::context(dataset)
    }

    /// Chart for `kind`. Never fails; see [`Strategy`] for how it was made.
    pub async fn generate(&self, dataset: &Dataset, request: &str, kind: ChartKind) -> ChartOutcome {
        self.generate_with_token(dataset, request, kind, &CancellationToken::new())
            .await
    }

    /// As [`generate`](Self::generate); cancelling `cancel` abandons the
    /// model call and continues with the deterministic generator.
    pub async fn generate_with_token(
        &self,
        dataset: &Dataset,
        request: &str,
        kind: ChartKind,
        cancel: &CancellationToken,
    ) -> ChartOutcome {
        self.generate_for_columns(dataset, request, kind, &[], cancel)
            .await
    }

    /// Chart over explicitly named columns instead of those mentioned in
    /// `request`. A name the dataset lacks yields an error-annotation chart.
    pub async fn generate_for_columns(
        &self,
        dataset: &Dataset,
        request: &str,
        kind: ChartKind,
        columns: &[String],
        cancel: &CancellationToken,
    ) -> ChartOutcome {
        let span = info_span!("chart_pipeline", request_id = %Uuid::new_v4(), chart_kind = %kind);
        self.run_chain(dataset, request, kind, columns, cancel)
            .instrument(span)
            .await
    }

    /// Classifies `request` and routes it to the chart chain or to the
    /// analysis path.
    pub async fn respond(&self, dataset: &Dataset, request: &str) -> PipelineResponse {
        self.respond_with_token(dataset, request, &CancellationToken::new())
            .await
    }

    pub async fn respond_with_token(
        &self,
        dataset: &Dataset,
        request: &str,
        cancel: &CancellationToken,
    ) -> PipelineResponse {
        let request_id = Uuid::new_v4();
        let classification = self.classify(request);
        debug!(%request_id, ?classification, "Classified request");

        match classification.chart_kind {
            Some(kind) if classification.is_visualization() => {
                let span = info_span!("chart_pipeline", %request_id, chart_kind = %kind);
                let outcome = self
                    .run_chain(dataset, request, kind, &[], cancel)
                    .instrument(span)
                    .await;
                PipelineResponse::Chart(outcome)
            }
            _ => {
                let text = analysis::answer(
                    self.model.as_deref(),
                    dataset,
                    request,
                    self.model_timeout(),
                    cancel,
                )
                .instrument(info_span!("analysis", %request_id))
                .await;
                PipelineResponse::Answer { text }
            }
        }
    }

    async fn run_chain(
        &self,
        dataset: &Dataset,
        request: &str,
        kind: ChartKind,
        columns: &[String],
        cancel: &CancellationToken,
    ) -> ChartOutcome {
        let started = Instant::now();
        let done = |strategy: Strategy, document: ChartDocument| {
            Stage::Done(ChartOutcome {
                chart_kind: kind,
                strategy,
                document,
            })
        };

        let mut stage = Stage::TryAssisted;
        loop {
            debug!(stage = stage.name(), "Pipeline stage");
            stage = match stage {
                Stage::TryAssisted => match self.try_assisted(dataset, request, kind, cancel).await {
                    Ok(document) => done(Strategy::Assisted, document),
                    Err(e) => {
                        warn!(error = %e, "Assisted generation failed, using deterministic generator");
                        Stage::TryDeterministic
                    }
                },
                Stage::TryDeterministic => {
                    match generators::generate(dataset, request, kind, columns, &self.config.generation) {
                        Ok(document) => done(Strategy::Deterministic, document),
                        Err(e) if e.is_column_resolution() => {
                            warn!(error = %e, "Column resolution failed, returning error chart");
                            done(Strategy::ErrorAnnotation, ChartDocument::error(&e.to_string()))
                        }
                        Err(e) => {
                            warn!(error = %e, "Deterministic generation failed, using terminal fallback");
                            Stage::TerminalFallback
                        }
                    }
                }
                Stage::TerminalFallback => done(
                    Strategy::TerminalFallback,
                    generators::terminal_fallback(dataset, &self.config.generation),
                ),
                Stage::Done(outcome) => {
                    info!(
                        strategy = %outcome.strategy,
                        traces = outcome.document.trace_count(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Chart ready"
                    );
                    return outcome;
                }
            };
        }
    }

    async fn try_assisted(
        &self,
        dataset: &Dataset,
        request: &str,
        kind: ChartKind,
        cancel: &CancellationToken,
    ) -> LLMResult<ChartDocument> {
        let Some(model) = self.model.as_deref() else {
            return Err(LLMError::Configuration(
                "no language model configured".to_string(),
            ));
        };
        if dataset.is_empty() {
            return Err(LLMError::InvalidChart(ChartError::EmptyDataset.to_string()));
        }
        debug!(model = model.name(), "Requesting assisted chart");
        llm::guarded(
            assisted::generate(model, dataset, request, kind),
            self.model_timeout(),
            cancel,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use polars::prelude::*;

    struct Scripted(&'static str);

    #[async_trait]
    impl LanguageModel for Scripted {
        async fn ask(&self, _prompt: &str) -> LLMResult<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn categories() -> Dataset {
        let df = df! { "category" => ["A", "B", "A", "C", "B", "B"] }.unwrap();
        Dataset::from_frame(&df).unwrap()
    }

    #[tokio::test]
    async fn without_a_model_the_deterministic_generator_answers() {
        let pipeline = ChartPipeline::new(ChartflowConfig::default());
        let outcome = pipeline.generate(&categories(), "pie of category", ChartKind::Pie).await;
        assert_eq!(outcome.strategy, Strategy::Deterministic);
        assert_eq!(outcome.document.trace_types(), vec!["pie"]);
    }

    #[tokio::test]
    async fn valid_model_output_is_returned_verbatim() {
        let reply = r#"{"data": [{"type": "bar", "x": ["A"], "y": [2]}], "layout": {"title": "From model"}}"#;
        let pipeline = ChartPipeline::new(ChartflowConfig::default()).with_model(Arc::new(Scripted(reply)));
        let outcome = pipeline.generate(&categories(), "bar of category", ChartKind::Bar).await;
        assert_eq!(outcome.strategy, Strategy::Assisted);
        assert_eq!(outcome.document.title(), Some("From model"));
    }

    #[tokio::test]
    async fn cancelled_request_skips_the_model() {
        let reply = r#"{"data": [{"type": "bar", "x": ["A"], "y": [2]}], "layout": {}}"#;
        let pipeline = ChartPipeline::new(ChartflowConfig::default()).with_model(Arc::new(Scripted(reply)));
        let token = CancellationToken::new();
        token.cancel();
        let outcome = pipeline
            .generate_with_token(&categories(), "bar", ChartKind::Bar, &token)
            .await;
        assert_eq!(outcome.strategy, Strategy::Deterministic);
    }

    #[tokio::test]
    async fn analysis_requests_get_text() {
        let pipeline = ChartPipeline::new(ChartflowConfig::default());
        let response = pipeline.respond(&categories(), "how many rows?").await;
        assert_eq!(
            response,
            PipelineResponse::Answer {
                text: "The dataset has **6 rows**.".to_string()
            }
        );
    }
}
