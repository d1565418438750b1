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

mod cli;

use anyhow::{Context as _, Result};
use chartflow::{
    ChartKind, ChartPipeline, ChartflowConfig, Dataset, OpenAiChatModel, PipelineResponse,
};
use clap::Parser;
use cli::{Args, Command};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "debug,reqwest=info,hyper=info"
    } else {
        "info,reqwest=warn,hyper=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ChartflowConfig> {
    match path {
        Some(path) => ChartflowConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(ChartflowConfig::default()),
    }
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset =
        Dataset::from_path(path).with_context(|| format!("loading dataset {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "Dataset loaded"
    );
    Ok(dataset)
}

fn build_pipeline(config: ChartflowConfig, offline: bool) -> ChartPipeline {
    if offline {
        return ChartPipeline::new(config);
    }
    match OpenAiChatModel::from_env(&config.llm) {
        Ok(model) => {
            info!(model = %config.llm.model, "Language model enabled");
            ChartPipeline::new(config).with_model(Arc::new(model))
        }
        Err(e) => {
            warn!(error = %e, "Continuing without a language model");
            ChartPipeline::new(config)
        }
    }
}

fn print_json(value: &impl serde::Serialize, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.debug);

    let config = load_config(args.config.as_deref())?;
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    match args.command {
        Command::Context { data } => {
            let dataset = load_dataset(&data)?;
            print!("{}", chartflow::context(&dataset));
        }
        Command::Classify { request } => {
            print_json(&chartflow::classify(&request), true)?;
        }
        Command::Chart {
            data,
            kind,
            columns,
            pretty,
            request,
        } => {
            let dataset = load_dataset(&data)?;
            let pipeline = build_pipeline(config, args.offline);
            let kind = kind
                .or_else(|| pipeline.classify(&request).chart_kind)
                .unwrap_or(ChartKind::Bar);
            let outcome = pipeline
                .generate_for_columns(&dataset, &request, kind, &columns, &cancel)
                .await;
            info!(strategy = %outcome.strategy, chart_kind = %outcome.chart_kind, "Chart generated");
            print_json(&outcome.document, pretty)?;
        }
        Command::Ask { data, request } => {
            let dataset = load_dataset(&data)?;
            let pipeline = build_pipeline(config, args.offline);
            match pipeline.respond_with_token(&dataset, &request, &cancel).await {
                PipelineResponse::Answer { text } => println!("{text}"),
                response @ PipelineResponse::Chart(_) => print_json(&response, true)?,
            }
        }
    }
    Ok(())
}
