use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a map from loading. All of these are fatal to
/// starting a game session.
#[derive(Debug, Error)]
pub enum MapError {
    /// Reading the map, a tileset descriptor, or an image failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The map or a JSON tileset is not valid JSON for the expected shape.
    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A `.tsx` descriptor is not well-formed XML.
    #[error("failed to parse XML in {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    /// A tileset descriptor is missing a required node or attribute.
    #[error("malformed tileset {path}: {message}")]
    MalformedTileset { path: PathBuf, message: String },
    /// Structural problem with the map itself.
    #[error("invalid map: {0}")]
    InvalidMap(String),
    /// A tile layer's data does not cover the whole grid.
    #[error("layer '{layer}' has {actual} tiles, expected {expected}")]
    InvalidLayerSize {
        layer: String,
        expected: usize,
        actual: usize,
    },
    /// A tile layer references a gid no tileset owns.
    #[error("layer '{layer}' references gid {gid}, but the highest known gid is {max_gid}")]
    InvalidTileGid { layer: String, gid: u32, max_gid: u32 },
    /// A tile-object references a gid no tileset owns.
    #[error("object {object_id} in layer '{layer}' references gid {gid}, but the highest known gid is {max_gid}")]
    InvalidObjectGid {
        layer: String,
        object_id: u32,
        gid: u32,
        max_gid: u32,
    },
    /// A custom property declared a type this loader does not know.
    #[error("property '{name}' has unsupported type '{kind}'")]
    UnsupportedPropertyType { name: String, kind: String },
    /// An image could not be fetched or decoded into a texture.
    #[error("failed to load texture {path}: {message}")]
    Texture { path: PathBuf, message: String },
}

impl MapError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MapError::MalformedTileset {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors from reading an [`EngineConfig`](crate::EngineConfig) file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
