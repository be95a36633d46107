use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

use super::collection::{DistanceSpace, IndexEntry, QueryMatch, VectorCollection};
use crate::app::ports::Embedder;
use crate::constants::*;
use crate::error::Result;

/// The columns of a filtered place table that feed the index. Absent columns
/// and empty cells are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct IndexRow {
    name: Option<String>,
    address: Option<String>,
    comment: Option<String>,
    #[serde(rename = "type")]
    place_type: Option<String>,
    rating: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

/// One row ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    pub id: String,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl IndexDocument {
    fn from_row(id: usize, row: IndexRow) -> Self {
        let field = |v: &Option<String>| v.as_deref().unwrap_or("").to_string();
        let text = format!(
            "{} {} {} {}",
            field(&row.name),
            field(&row.address),
            field(&row.comment),
            field(&row.place_type)
        );

        let metadata = BTreeMap::from([
            (NAME_COLUMN.to_string(), field(&row.name)),
            (ADDRESS_COLUMN.to_string(), field(&row.address)),
            (TYPE_COLUMN.to_string(), field(&row.place_type)),
            (RATING_COLUMN.to_string(), field(&row.rating)),
            (LAT_COLUMN.to_string(), field(&row.lat)),
            (LON_COLUMN.to_string(), field(&row.lon)),
        ]);

        Self {
            id: id.to_string(),
            text,
            metadata,
        }
    }
}

/// Read a place CSV into documents with ids "1", "2", ... in file order
pub fn load_documents(path: impl AsRef<Path>) -> Result<Vec<IndexDocument>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let mut documents = Vec::new();
    for (i, row) in reader.deserialize::<IndexRow>().enumerate() {
        documents.push(IndexDocument::from_row(i + 1, row?));
    }
    info!("Loaded {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Embed every document and insert the batch into a new cosine collection
#[instrument(skip(documents, embedder), fields(documents = documents.len()))]
pub fn build_collection(
    name: &str,
    documents: Vec<IndexDocument>,
    embedder: &mut dyn Embedder,
) -> Result<VectorCollection> {
    let total = documents.len();
    let mut entries = Vec::with_capacity(total);
    for (i, document) in documents.into_iter().enumerate() {
        let embedding = embedder.embed(&document.text)?;
        debug!("[{}/{}] embedded document {}", i + 1, total, document.id);
        entries.push(IndexEntry {
            id: document.id,
            document: document.text,
            embedding,
            metadata: document.metadata,
        });
    }

    let mut collection = VectorCollection::new(name, DistanceSpace::Cosine);
    collection.add(entries)?;
    info!("Indexed {} documents into '{}'", collection.len(), name);
    Ok(collection)
}

/// Embed `text` and return the `top_k` closest documents
pub fn search(
    collection: &VectorCollection,
    embedder: &mut dyn Embedder,
    text: &str,
    top_k: usize,
) -> Result<Vec<QueryMatch>> {
    let embedding = embedder.embed(text)?;
    collection.query(&embedding, top_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Bag-of-letters embedding, enough to make similar strings close
    struct LetterEmbedder;

    impl Embedder for LetterEmbedder {
        fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0f32; 26];
            for c in text.to_ascii_lowercase().bytes() {
                if c.is_ascii_lowercase() {
                    v[(c - b'a') as usize] += 1.0;
                }
            }
            Ok(v)
        }
    }

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_documents_assigns_ids_and_text() {
        let file = write_csv(
            "name,address,type,comment,rating,count,lat,lon,geometry\n\
             Zoo,2 Nguyen Binh Khiem,Vườn thú,Great,4.5,1200,10.78,106.70,POINT (106.7 10.78)\n\
             Museum,,Bảo tàng,,4,10,10.77,106.69,POINT (106.69 10.77)\n",
        );

        let docs = load_documents(file.path()).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "1");
        assert_eq!(docs[1].id, "2");
        assert_eq!(docs[0].text, "Zoo 2 Nguyen Binh Khiem Great Vườn thú");
        assert_eq!(docs[1].text, "Museum   Bảo tàng");
        assert_eq!(docs[0].metadata["rating"], "4.5");
        assert_eq!(docs[0].metadata["lon"], "106.70");
        assert_eq!(docs[1].metadata["address"], "");
        assert_eq!(docs[1].metadata.len(), 6);
    }

    #[test]
    fn test_missing_columns_become_empty() {
        let file = write_csv("name\nOnly a name\n");
        let docs = load_documents(file.path()).unwrap();
        assert_eq!(docs[0].text, "Only a name   ");
        assert_eq!(docs[0].metadata["type"], "");
    }

    #[test]
    fn test_build_and_search() {
        let documents = vec![
            IndexDocument::from_row(1, IndexRow {
                name: Some("zoo zoo".into()),
                ..IndexRow::default()
            }),
            IndexDocument::from_row(2, IndexRow {
                name: Some("museum".into()),
                ..IndexRow::default()
            }),
        ];
        let mut embedder = LetterEmbedder;

        let collection = build_collection("sightseeing", documents, &mut embedder).unwrap();
        assert_eq!(collection.len(), 2);
        assert!(collection.get("1").is_some());
        assert!(collection.get("2").is_some());

        let matches = search(&collection, &mut embedder, "museum", 5).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "2");
        assert!(matches[0].distance <= matches[1].distance);
    }
}
