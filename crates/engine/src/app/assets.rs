use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::ImageReader;
use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{info, warn};

use super::audio::SoundManager;
use super::texture::{Texture, TextureStore};

pub const MANIFEST_FILE_NAME: &str = "manifest.xml";

#[derive(Debug, Error)]
pub enum AssetManifestError {
    #[error("failed to read asset manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed asset manifest {path} at {line}:{column}: {message}")]
    Malformed {
        path: PathBuf,
        line: u32,
        column: u32,
        message: String,
    },
    #[error("asset manifest {path}: root element must be <Assets>")]
    InvalidRoot { path: PathBuf },
    #[error("asset manifest {path} line {line}: unknown entry <{tag}>")]
    UnknownEntry {
        path: PathBuf,
        line: u32,
        tag: String,
    },
    #[error("asset manifest {path} line {line}: <{tag}> is missing attribute '{attribute}'")]
    MissingAttribute {
        path: PathBuf,
        line: u32,
        tag: String,
        attribute: &'static str,
    },
    #[error("asset manifest {path} line {line}: '{attribute}' must be a positive integer, got '{value}'")]
    InvalidNumber {
        path: PathBuf,
        line: u32,
        attribute: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEntry {
    Image {
        key: String,
        path: String,
    },
    Spritesheet {
        key: String,
        path: String,
        frame_width: u32,
        frame_height: u32,
    },
    Audio {
        key: String,
        path: String,
    },
}

impl AssetEntry {
    pub fn key(&self) -> &str {
        match self {
            AssetEntry::Image { key, .. }
            | AssetEntry::Spritesheet { key, .. }
            | AssetEntry::Audio { key, .. } => key,
        }
    }

    fn path(&self) -> &str {
        match self {
            AssetEntry::Image { path, .. }
            | AssetEntry::Spritesheet { path, .. }
            | AssetEntry::Audio { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetLoadSummary {
    pub textures_loaded: usize,
    pub sounds_registered: usize,
    pub skipped: usize,
}

pub fn parse_manifest(path: &Path, raw: &str) -> Result<Vec<AssetEntry>, AssetManifestError> {
    let doc = Document::parse(raw).map_err(|error| AssetManifestError::Malformed {
        path: path.to_path_buf(),
        line: error.pos().row,
        column: error.pos().col,
        message: error.to_string(),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Assets" {
        return Err(AssetManifestError::InvalidRoot {
            path: path.to_path_buf(),
        });
    }

    let mut entries = Vec::new();
    for node in root.children().filter(|node| node.is_element()) {
        let line = doc.text_pos_at(node.range().start).row;
        let tag = node.tag_name().name();
        let entry = match tag {
            "Image" => AssetEntry::Image {
                key: required_attr(path, line, node, "key")?,
                path: required_attr(path, line, node, "path")?,
            },
            "Spritesheet" => AssetEntry::Spritesheet {
                key: required_attr(path, line, node, "key")?,
                path: required_attr(path, line, node, "path")?,
                frame_width: positive_attr(path, line, node, "frameWidth")?,
                frame_height: positive_attr(path, line, node, "frameHeight")?,
            },
            "Audio" => AssetEntry::Audio {
                key: required_attr(path, line, node, "key")?,
                path: required_attr(path, line, node, "path")?,
            },
            _ => {
                return Err(AssetManifestError::UnknownEntry {
                    path: path.to_path_buf(),
                    line,
                    tag: tag.to_string(),
                })
            }
        };
        entries.push(entry);
    }
    Ok(entries)
}

fn required_attr(
    path: &Path,
    line: u32,
    node: Node<'_, '_>,
    attribute: &'static str,
) -> Result<String, AssetManifestError> {
    node.attribute(attribute)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AssetManifestError::MissingAttribute {
            path: path.to_path_buf(),
            line,
            tag: node.tag_name().name().to_string(),
            attribute,
        })
}

fn positive_attr(
    path: &Path,
    line: u32,
    node: Node<'_, '_>,
    attribute: &'static str,
) -> Result<u32, AssetManifestError> {
    let value = required_attr(path, line, node, attribute)?;
    match value.parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(AssetManifestError::InvalidNumber {
            path: path.to_path_buf(),
            line,
            attribute,
            value,
        }),
    }
}

/// Loads every entry of `assets_dir/manifest.xml`. A missing manifest yields
/// an empty load; unreadable files are skipped with a warning.
pub fn load_assets(
    assets_dir: &Path,
    textures: &mut TextureStore,
    sounds: &mut SoundManager,
) -> Result<AssetLoadSummary, AssetManifestError> {
    let manifest_path = assets_dir.join(MANIFEST_FILE_NAME);
    let raw = match fs::read_to_string(&manifest_path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            warn!(path = %manifest_path.display(), "asset_manifest_missing");
            return Ok(AssetLoadSummary::default());
        }
        Err(source) => {
            return Err(AssetManifestError::Read {
                path: manifest_path,
                source,
            })
        }
    };

    let entries = parse_manifest(&manifest_path, &raw)?;
    let mut summary = AssetLoadSummary::default();
    for entry in &entries {
        let file_path = assets_dir.join(entry.path());
        match entry {
            AssetEntry::Image { key, .. } => match load_rgba(&file_path, None) {
                Ok(texture) => {
                    textures.insert(key.clone(), texture);
                    summary.textures_loaded += 1;
                }
                Err(reason) => skip(&mut summary, key, &file_path, &reason),
            },
            AssetEntry::Spritesheet {
                key,
                frame_width,
                frame_height,
                ..
            } => match load_rgba(&file_path, Some((*frame_width, *frame_height))) {
                Ok(texture) => {
                    textures.insert(key.clone(), texture);
                    summary.textures_loaded += 1;
                }
                Err(reason) => skip(&mut summary, key, &file_path, &reason),
            },
            AssetEntry::Audio { key, .. } => {
                if file_path.is_file() {
                    sounds.register_key(key.clone());
                    summary.sounds_registered += 1;
                } else {
                    skip(&mut summary, key, &file_path, "file_not_found");
                }
            }
        }
    }

    info!(
        textures = summary.textures_loaded,
        sounds = summary.sounds_registered,
        skipped = summary.skipped,
        "assets_loaded"
    );
    Ok(summary)
}

fn load_rgba(path: &Path, frame_size: Option<(u32, u32)>) -> Result<Texture, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    let (width, height) = (image.width(), image.height());
    let (frame_width, frame_height) = frame_size.unwrap_or((width, height));
    if frame_width > width || frame_height > height {
        return Err(format!(
            "frame_larger_than_sheet:{frame_width}x{frame_height}>{width}x{height}"
        ));
    }
    Ok(Texture {
        width,
        height,
        frame_width,
        frame_height,
        rgba: image.into_raw(),
    })
}

fn skip(summary: &mut AssetLoadSummary, key: &str, path: &Path, reason: &str) {
    summary.skipped += 1;
    warn!(
        asset_key = key,
        path = %path.display(),
        reason = reason,
        "asset_skipped"
    );
}
