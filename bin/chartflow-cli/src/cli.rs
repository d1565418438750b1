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

use chartflow::ChartKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chartflow")]
#[command(about = "Turn natural-language requests into chart documents")]
pub struct Args {
    /// YAML configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip the language model even when an API key is available.
    #[arg(long, global = true)]
    pub offline: bool,

    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the dataset summary handed to the model.
    Context {
        #[arg(short = 'f', long)]
        data: PathBuf,
    },
    /// Show how a request would be routed.
    Classify { request: String },
    /// Generate a chart document for a request.
    Chart {
        #[arg(short = 'f', long)]
        data: PathBuf,
        /// Overrides the chart kind inferred from the request.
        #[arg(short, long)]
        kind: Option<ChartKind>,
        /// Columns to chart instead of the ones mentioned in the request.
        #[arg(long = "column", value_name = "NAME")]
        columns: Vec<String>,
        #[arg(long)]
        pretty: bool,
        request: String,
    },
    /// Route a request to a chart or a text answer.
    Ask {
        #[arg(short = 'f', long)]
        data: PathBuf,
        request: String,
    },
}
