use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};
use image::GenericImageView;
use tracing::{info, warn};

use crate::models::{PhotoRef, PlayerId};

#[derive(Clone)]
pub struct DecodedImageData {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

pub enum PhotoDecodeEvent {
    Decoded {
        player_id: PlayerId,
        photo: PhotoRef,
        image: DecodedImageData,
    },
    Failed {
        player_id: PlayerId,
        photo: PhotoRef,
        message: String,
    },
}

/// Decodes player photos off the UI thread. Each photo is requested once;
/// results are picked up with [`PhotoDecoder::drain`].
pub struct PhotoDecoder {
    tx: Sender<PhotoDecodeEvent>,
    rx: Receiver<PhotoDecodeEvent>,
    requested: HashSet<(PlayerId, PhotoRef)>,
    max_dimension: u32,
}

impl PhotoDecoder {
    pub fn new(max_dimension: u32) -> Self {
        let (tx, rx) = mpsc::channel::<PhotoDecodeEvent>();
        Self {
            tx,
            rx,
            requested: HashSet::new(),
            max_dimension: max_dimension.max(1),
        }
    }

    /// Returns false when the same photo was already requested for this player.
    pub fn request(&mut self, player_id: PlayerId, photo: &PhotoRef) -> bool {
        if !self.requested.insert((player_id, photo.clone())) {
            return false;
        }

        let tx = self.tx.clone();
        let photo = photo.clone();
        let max_dimension = self.max_dimension;
        thread::spawn(move || {
            let event = match decode_image_data(photo.path(), max_dimension) {
                Ok(image) => {
                    info!(
                        "Decoded photo for player {} ({}x{})",
                        player_id, image.width, image.height
                    );
                    PhotoDecodeEvent::Decoded {
                        player_id,
                        photo,
                        image,
                    }
                }
                Err(err) => {
                    warn!("Photo for player {} unusable: {:#}", player_id, err);
                    PhotoDecodeEvent::Failed {
                        player_id,
                        photo,
                        message: format!("{err:#}"),
                    }
                }
            };
            let _ = tx.send(event);
        });
        true
    }

    /// Forget a player's photos so a new pick is decoded again.
    pub fn forget(&mut self, player_id: PlayerId) {
        self.requested.retain(|(id, _)| *id != player_id);
    }

    pub fn drain(&self) -> Vec<PhotoDecodeEvent> {
        self.rx.try_iter().collect()
    }
}

pub fn decode_image_data(path: &Path, max_dimension: u32) -> Result<DecodedImageData> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut decoded = image::load_from_memory(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let (width, height) = decoded.dimensions();
    let max_side = width.max(height);
    if max_side > max_dimension {
        decoded = decoded.resize(
            max_dimension,
            max_dimension,
            image::imageops::FilterType::Triangle,
        );
    }
    let rgba = decoded.to_rgba8();
    Ok(DecodedImageData {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
    })
}
