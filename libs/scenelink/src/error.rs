// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneLinkError {
    /// The external producer could not allocate its image object. Fatal to the
    /// owning surface instance; the surface stays unbuilt.
    #[error("producer unavailable: {0}")]
    ProducerUnavailable(String),

    /// GPU texture allocation failed. Fatal to the owning surface instance;
    /// the draw-graph build fails visibly instead of drawing an undefined
    /// texture.
    #[error("texture allocation failed: {0}")]
    TextureAllocation(String),

    /// The producer failed to materialize a frame or report its transform
    /// during the pre-draw pull.
    #[error("producer error: {0}")]
    Producer(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SceneLinkError>;
