//! Index lifecycle and the document write path.

use std::fs;
use std::path::Path;

use tantivy::schema::Field;
use tantivy::{doc, Index, IndexWriter, Term};
use tracing::{debug, info};

use catalogdb_core::error::{Error, Result};
use catalogdb_core::traits::ItemRepository;
use catalogdb_core::types::{Item, ItemId};

use crate::schema::{build_schema, register_title_analyzer};

pub const DEFAULT_WRITER_HEAP_BYTES: usize = 50_000_000;

/// Handle to one on-disk item index.
///
/// Writers and readers are created per call; the engine's directory lock
/// serializes concurrent writers, and a fresh reader always observes the
/// latest commit.
#[derive(Debug)]
pub struct ItemIndex {
    pub(crate) index: Index,
    writer_heap_bytes: usize,
    pub(crate) f_id: Field,
    pub(crate) f_title: Field,
    pub(crate) f_category: Field,
    pub(crate) f_brand: Field,
    pub(crate) f_price: Field,
    pub(crate) f_images: Field,
}

pub(crate) fn engine_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Engine(e.to_string())
}

fn index_present(dir: &Path) -> bool {
    dir.join("meta.json").exists()
}

impl ItemIndex {
    /// Provision a new index directory with the item mapping. Fails if an
    /// index already lives there.
    pub fn create(dir: &Path) -> Result<Self> {
        if index_present(dir) {
            return Err(Error::IndexAlreadyExists(dir.display().to_string()));
        }
        fs::create_dir_all(dir).map_err(engine_err)?;
        let index = Index::create_in_dir(dir, build_schema()).map_err(engine_err)?;
        info!(dir = %dir.display(), "created item index");
        Self::attach(index)
    }

    /// Attach to an existing index.
    pub fn open(dir: &Path) -> Result<Self> {
        if !index_present(dir) {
            return Err(Error::IndexNotFound(dir.display().to_string()));
        }
        let index = Index::open_in_dir(dir).map_err(engine_err)?;
        Self::attach(index)
    }

    /// Remove the whole index. Later opens fail with `IndexNotFound` rather
    /// than silently matching nothing.
    pub fn drop_index(dir: &Path) -> Result<()> {
        if !index_present(dir) {
            return Err(Error::IndexNotFound(dir.display().to_string()));
        }
        fs::remove_dir_all(dir).map_err(engine_err)?;
        info!(dir = %dir.display(), "dropped item index");
        Ok(())
    }

    /// Override the writer heap budget (from `index.writer_heap_bytes`).
    pub fn with_writer_heap(mut self, bytes: usize) -> Self {
        self.writer_heap_bytes = bytes;
        self
    }

    fn attach(index: Index) -> Result<Self> {
        register_title_analyzer(&index);
        let schema = index.schema();
        let f_id = schema.get_field("id").map_err(engine_err)?;
        let f_title = schema.get_field("title").map_err(engine_err)?;
        let f_category = schema.get_field("category").map_err(engine_err)?;
        let f_brand = schema.get_field("brand").map_err(engine_err)?;
        let f_price = schema.get_field("price").map_err(engine_err)?;
        let f_images = schema.get_field("images").map_err(engine_err)?;
        Ok(Self {
            index,
            writer_heap_bytes: DEFAULT_WRITER_HEAP_BYTES,
            f_id,
            f_title,
            f_category,
            f_brand,
            f_price,
            f_images,
        })
    }

    fn writer(&self) -> Result<IndexWriter> {
        self.index.writer(self.writer_heap_bytes).map_err(engine_err)
    }

    fn validate(item: &Item) -> Result<()> {
        if item.price < 0.0 {
            return Err(Error::InvalidDocument(format!(
                "item {} has negative price {}",
                item.id, item.price
            )));
        }
        Ok(())
    }

    /// Queue an upsert: any document carrying the id is deleted before the
    /// replacement is added, so a later write with the same id is a full
    /// overwrite and duplicates within a batch collapse to last-write-wins.
    fn queue_upsert(&self, writer: &IndexWriter, item: &Item) -> Result<()> {
        Self::validate(item)?;
        writer.delete_term(Term::from_field_u64(self.f_id, item.id));
        writer
            .add_document(doc!(
                self.f_id => item.id,
                self.f_title => item.title.clone(),
                self.f_category => item.category.clone(),
                self.f_brand => item.brand.clone(),
                self.f_price => item.price,
                self.f_images => item.images.clone(),
            ))
            .map_err(engine_err)?;
        Ok(())
    }
}

impl ItemRepository for ItemIndex {
    fn save(&self, item: &Item) -> Result<()> {
        let mut writer = self.writer()?;
        self.queue_upsert(&writer, item)?;
        writer.commit().map_err(engine_err)?;
        debug!(id = item.id, "saved item");
        Ok(())
    }

    /// Bulk upsert in a single commit. A rejected document aborts the whole
    /// batch before commit, leaving the index unchanged.
    fn save_all(&self, items: &[Item]) -> Result<()> {
        let mut writer = self.writer()?;
        for item in items {
            self.queue_upsert(&writer, item)?;
        }
        writer.commit().map_err(engine_err)?;
        info!(count = items.len(), "bulk saved items");
        Ok(())
    }

    fn find_by_id(&self, id: ItemId) -> Result<Option<Item>> {
        self.get_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Item>> {
        self.all_items()
    }

    fn find_by_price_between(&self, low: f64, high: f64) -> Result<Vec<Item>> {
        self.price_between_inclusive(low, high)
    }
}
