use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::editor::Mask;
use crate::geometry::Size;

const METADATA_FILE: &str = "cards_v1.json";
const IMAGES_SUBDIR: &str = "images";
const JPEG_QUALITY: u8 = 90;

pub type CardId = Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("card not found: {0}")]
    CardNotFound(CardId),
    #[error("card index {index} out of range for {len} cards")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("failed to import image {path}")]
    ImageImport {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode card metadata")]
    Encode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// One photographed or imported page with its masks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCard {
    pub id: CardId,
    #[serde(default)]
    pub title: String,
    pub image_path: PathBuf,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub masks: Vec<Mask>,
}

impl PhotoCard {
    pub fn new(title: impl Into<String>, image_path: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            image_path,
            created_at: Utc::now(),
            masks: Vec::new(),
        }
    }
}

/// Receives the full ordered mask list of a card after every committed edit.
///
/// Write-through and fire-and-forget: implementations report their own
/// failures and never hand them back to the editor.
pub trait MaskSink {
    fn store_masks(&mut self, card_id: CardId, masks: &[Mask]);
}

impl<T: MaskSink + ?Sized> MaskSink for &mut T {
    fn store_masks(&mut self, card_id: CardId, masks: &[Mask]) {
        (**self).store_masks(card_id, masks);
    }
}

/// Intrinsic pixel size of a card's image, `None` when it cannot be read.
pub trait ImageSizeProvider {
    fn image_size(&self, card: &PhotoCard) -> Option<Size>;
}

#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable metadata yields an empty library.
    pub fn load(&self) -> Vec<PhotoCard> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!(?err, path = %self.path.display(), "failed to read card metadata");
                return Vec::new();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, path = %self.path.display(), "failed to parse card metadata");
            Vec::new()
        })
    }

    pub fn save(&self, cards: &[PhotoCard]) -> StorageResult<()> {
        let data = serde_json::to_vec_pretty(cards)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        let written = fs::write(&staging, data).and_then(|()| fs::rename(&staging, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decodes `source` and stores it as a JPEG under a fresh name.
    ///
    /// The JPEG is written to a staging file and renamed into place, so a
    /// failed encode leaves nothing behind in the image directory.
    pub fn import(&self, source: &Path) -> StorageResult<PathBuf> {
        let decoded = image::open(source).map_err(|err| StorageError::ImageImport {
            path: source.to_path_buf(),
            source: err,
        })?;
        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(format!("{}.jpg", Uuid::new_v4()));
        let staging = target.with_extension("jpg.tmp");

        let written = write_jpeg(&decoded.to_rgb8(), &staging)
            .map_err(|err| StorageError::ImageImport {
                path: source.to_path_buf(),
                source: err,
            })
            .and_then(|()| fs::rename(&staging, &target).map_err(StorageError::from));
        if let Err(err) = written {
            self.delete(&staging);
            return Err(err);
        }
        Ok(target)
    }

    pub fn delete(&self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), ?err, "failed to remove card image");
            }
        }
    }
}

fn write_jpeg(image: &image::RgbImage, path: &Path) -> image::ImageResult<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    image.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY))?;
    writer.flush()?;
    Ok(())
}

/// Ordered card library backed by a JSON document and an image directory.
#[derive(Debug, Clone)]
pub struct CardRepository {
    cards: Vec<PhotoCard>,
    metadata: MetadataStore,
    images: ImageStore,
}

impl CardRepository {
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(data_dir)?;
        let metadata = MetadataStore::new(data_dir.join(METADATA_FILE));
        let images = ImageStore::new(data_dir.join(IMAGES_SUBDIR));
        let cards = metadata.load();
        tracing::debug!(count = cards.len(), dir = %data_dir.display(), "card library loaded");
        Ok(Self {
            cards,
            metadata,
            images,
        })
    }

    pub fn cards(&self) -> &[PhotoCard] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&PhotoCard> {
        self.cards.iter().find(|card| card.id == id)
    }

    fn index_of(&self, id: CardId) -> StorageResult<usize> {
        self.cards
            .iter()
            .position(|card| card.id == id)
            .ok_or(StorageError::CardNotFound(id))
    }

    /// Imports an image as a new card at the front of the library.
    pub fn add_image(&mut self, source: &Path, title: &str) -> StorageResult<CardId> {
        let image_path = self.images.import(source)?;
        let card = PhotoCard::new(title, image_path);
        let id = card.id;
        self.cards.insert(0, card);
        if let Err(err) = self.persist() {
            let card = self.cards.remove(0);
            self.images.delete(&card.image_path);
            return Err(err);
        }
        Ok(id)
    }

    pub fn delete_card(&mut self, id: CardId) -> StorageResult<PhotoCard> {
        let index = self.index_of(id)?;
        let card = self.cards.remove(index);
        self.images.delete(&card.image_path);
        self.persist()?;
        Ok(card)
    }

    pub fn update_masks(&mut self, id: CardId, masks: &[Mask]) -> StorageResult<()> {
        let index = self.index_of(id)?;
        self.cards[index].masks = masks.to_vec();
        self.persist()
    }

    pub fn rename(&mut self, id: CardId, title: &str) -> StorageResult<()> {
        let index = self.index_of(id)?;
        self.cards[index].title = title.to_string();
        self.persist()
    }

    /// Moves the card at `from` in front of the card currently at `to`.
    ///
    /// `to` is an offset into the list before removal, so `to == len` moves
    /// the card to the end and `to == from` or `to == from + 1` is a no-op.
    pub fn move_card(&mut self, from: usize, to: usize) -> StorageResult<()> {
        let len = self.cards.len();
        if from >= len {
            return Err(StorageError::IndexOutOfRange { index: from, len });
        }
        if to > len {
            return Err(StorageError::IndexOutOfRange { index: to, len });
        }
        let card = self.cards.remove(from);
        let destination = if to > from { to - 1 } else { to };
        self.cards.insert(destination, card);
        self.persist()
    }

    pub fn previous_card_id(&self, id: CardId) -> Option<CardId> {
        let index = self.index_of(id).ok()?;
        let previous = index.checked_sub(1)?;
        self.cards.get(previous).map(|card| card.id)
    }

    pub fn next_card_id(&self, id: CardId) -> Option<CardId> {
        let index = self.index_of(id).ok()?;
        self.cards.get(index + 1).map(|card| card.id)
    }

    pub fn image_path(&self, id: CardId) -> Option<&Path> {
        self.card(id).map(|card| card.image_path.as_path())
    }

    fn persist(&self) -> StorageResult<()> {
        self.metadata.save(&self.cards)
    }
}

impl MaskSink for CardRepository {
    fn store_masks(&mut self, card_id: CardId, masks: &[Mask]) {
        if let Err(err) = self.update_masks(card_id, masks) {
            tracing::warn!(card = %card_id, %err, "failed to persist masks");
        }
    }
}

impl ImageSizeProvider for CardRepository {
    fn image_size(&self, card: &PhotoCard) -> Option<Size> {
        match image::image_dimensions(&card.image_path) {
            Ok((width, height)) => Some(Size::new(f64::from(width), f64::from(height))),
            Err(err) => {
                tracing::warn!(
                    path = %card.image_path.display(),
                    %err,
                    "failed to read image dimensions"
                );
                None
            }
        }
    }
}
