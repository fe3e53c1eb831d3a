
use super::DocumentRecord;
use crate::database::{RawCandidate, SourceError, VectorIndex, VectorQuery};
use crate::{RagError, config::Config};
use arrow::array::{Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::{
    Connection, DistanceType, Table,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// LanceDB-backed store with one table per content index
pub struct LanceVectorStore {
    connection: Connection,
    vector_dimension: usize,
}

impl LanceVectorStore {
    /// Open the store under the configured base directory
    #[inline]
    pub async fn new(config: &Config) -> Result<Self, RagError> {
        Self::open(
            config.vector_database_path(),
            config.openai.dimension as usize,
        )
        .await
    }

    /// Open (or create) a store at `db_path` holding vectors of `vector_dimension`
    #[inline]
    pub async fn open<P: AsRef<Path>>(db_path: P, vector_dimension: usize) -> Result<Self, RagError> {
        let db_path = db_path.as_ref();
        debug!("Initializing LanceDB at path: {:?}", db_path);

        std::fs::create_dir_all(db_path).map_err(|e| {
            RagError::Database(format!("Failed to create vector database directory: {}", e))
        })?;

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        info!("Vector store opened with {} dimensions", vector_dimension);
        Ok(Self {
            connection,
            vector_dimension,
        })
    }

    #[inline]
    pub fn vector_dimension(&self) -> usize {
        self.vector_dimension
    }

    #[inline]
    pub async fn table_names(&self) -> Result<Vec<String>, RagError> {
        self.connection
            .table_names()
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to list tables: {}", e)))
    }

    fn create_schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    self.vector_dimension as i32,
                ),
                false,
            ),
            Field::new("lookup_key", DataType::Utf8, true),
            Field::new("document", DataType::Utf8, false),
        ]))
    }

    async fn open_index(&self, index: &str) -> Result<Table, SourceError> {
        self.connection
            .open_table(index)
            .execute()
            .await
            .map_err(|e| SourceError::unavailable(index, e))
    }

    async fn open_or_create_table(&self, index: &str) -> Result<Table, RagError> {
        if self.table_names().await?.iter().any(|name| name == index) {
            return self
                .open_index(index)
                .await
                .map_err(|e| RagError::Database(e.to_string()));
        }

        info!("Creating index table '{}'", index);
        self.connection
            .create_empty_table(index, self.create_schema())
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to create table: {}", e)))
    }

    /// Insert documents into `index`, creating the table on first write
    #[inline]
    pub async fn store_documents(
        &self,
        index: &str,
        records: &[DocumentRecord],
    ) -> Result<usize, RagError> {
        if records.is_empty() {
            debug!("No documents to store");
            return Ok(0);
        }

        if let Some(bad) = records
            .iter()
            .find(|r| r.vector.len() != self.vector_dimension)
        {
            return Err(RagError::Database(format!(
                "Document {} has {} dimensions, store expects {}",
                bad.id,
                bad.vector.len(),
                self.vector_dimension
            )));
        }

        debug!("Storing batch of {} documents in '{}'", records.len(), index);

        let record_batch = self.create_record_batch(records)?;
        let table = self.open_or_create_table(index).await?;

        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to insert documents: {}", e)))?;

        info!("Stored {} documents in '{}'", records.len(), index);
        Ok(records.len())
    }

    fn create_record_batch(&self, records: &[DocumentRecord]) -> Result<RecordBatch, RagError> {
        let len = records.len();
        let mut ids = Vec::with_capacity(len);
        let mut lookup_keys = Vec::with_capacity(len);
        let mut documents = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * self.vector_dimension);

        for record in records {
            ids.push(record.id.as_str());
            lookup_keys.push(record.lookup_key.as_deref());
            documents.push(record.document.to_string());
            flat_values.extend_from_slice(&record.vector);
        }

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array = FixedSizeListArray::try_new(
            field,
            self.vector_dimension as i32,
            Arc::new(values_array),
            None,
        )
        .map_err(|e| RagError::Database(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(lookup_keys)),
            Arc::new(StringArray::from(documents)),
        ];

        RecordBatch::try_new(self.create_schema(), arrays)
            .map_err(|e| RagError::Database(format!("Failed to create record batch: {}", e)))
    }

    /// Number of rows in `index`
    #[inline]
    pub async fn count_documents(&self, index: &str) -> Result<usize, SourceError> {
        let table = self.open_index(index).await?;
        table
            .count_rows(None)
            .await
            .map_err(|e| SourceError::query(index, e))
    }

    async fn collect_batches(
        index: &str,
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<RecordBatch>, SourceError> {
        let mut batches = Vec::new();
        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| SourceError::query(index, format!("Failed to read result stream: {e}")))?
        {
            batches.push(batch);
        }
        Ok(batches)
    }
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    index: &str,
    name: &str,
) -> Result<&'a StringArray, SourceError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| SourceError::query(index, format!("Missing {name} column")))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| SourceError::query(index, format!("Invalid {name} column type")))
}

fn parse_document(index: &str, raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Undecodable document JSON in '{}': {}", index, e);
        serde_json::Value::Null
    })
}

/// Cosine distance in [0, 2] mapped to a similarity score in [0, 1]
fn distance_to_score(distance: f32) -> f32 {
    (1.0 - distance / 2.0).clamp(0.0, 1.0)
}

/// Extract candidates from a search batch, turning cosine distance into similarity
fn parse_search_batch(index: &str, batch: &RecordBatch) -> Result<Vec<RawCandidate>, SourceError> {
    let documents = string_column(batch, index, "document")?;
    let distances = batch
        .column_by_name("_distance")
        .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

    let candidates = (0..batch.num_rows())
        .map(|row| {
            let score = distances
                .filter(|d| !d.is_null(row))
                .map(|d| distance_to_score(d.value(row)));
            RawCandidate {
                document: parse_document(index, documents.value(row)),
                score,
            }
        })
        .collect();

    Ok(candidates)
}

fn parse_record_batch(index: &str, batch: &RecordBatch) -> Result<Vec<DocumentRecord>, SourceError> {
    let ids = string_column(batch, index, "id")?;
    let lookup_keys = string_column(batch, index, "lookup_key")?;
    let documents = string_column(batch, index, "document")?;
    let vectors = batch
        .column_by_name("vector")
        .ok_or_else(|| SourceError::query(index, "Missing vector column"))?
        .as_any()
        .downcast_ref::<FixedSizeListArray>()
        .ok_or_else(|| SourceError::query(index, "Invalid vector column type"))?;

    (0..batch.num_rows())
        .map(|row| {
            let values = vectors.value(row);
            let vector = values
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| SourceError::query(index, "Invalid vector item type"))?
                .values()
                .to_vec();

            Ok(DocumentRecord {
                id: ids.value(row).to_string(),
                vector,
                lookup_key: (!lookup_keys.is_null(row))
                    .then(|| lookup_keys.value(row).to_string()),
                document: parse_document(index, documents.value(row)),
            })
        })
        .collect()
}

#[async_trait]
impl VectorIndex for LanceVectorStore {
    #[inline]
    async fn vector_search(
        &self,
        query: &VectorQuery<'_>,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        debug!(
            "Vector search on '{}' (limit {}, candidates {})",
            query.index, query.limit, query.num_candidates
        );

        if query.vector.len() != self.vector_dimension {
            return Err(SourceError::query(
                query.index,
                format!(
                    "query vector has {} dimensions, index expects {}",
                    query.vector.len(),
                    self.vector_dimension
                ),
            ));
        }

        let table = self.open_index(query.index).await?;
        let limit = query.limit.max(1);
        let refine_factor = u32::try_from(query.num_candidates.div_ceil(limit).max(1))
            .unwrap_or(u32::MAX);

        let results = table
            .vector_search(query.vector)
            .map_err(|e| SourceError::query(query.index, e))?
            .column("vector")
            .distance_type(DistanceType::Cosine)
            .refine_factor(refine_factor)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| SourceError::query(query.index, e))?;

        let mut candidates = Vec::new();
        for batch in Self::collect_batches(query.index, results).await? {
            candidates.extend(parse_search_batch(query.index, &batch)?);
        }

        debug!("'{}' returned {} candidates", query.index, candidates.len());
        Ok(candidates)
    }

    #[inline]
    async fn find_by_key(
        &self,
        index: &str,
        key: &str,
    ) -> Result<Option<DocumentRecord>, SourceError> {
        let table = self.open_index(index).await?;
        let predicate = format!("lookup_key = '{}'", key.replace('\'', "''"));

        let results = table
            .query()
            .only_if(predicate)
            .limit(1)
            .execute()
            .await
            .map_err(|e| SourceError::query(index, e))?;

        let mut records = Vec::new();
        for batch in Self::collect_batches(index, results).await? {
            records.extend(parse_record_batch(index, &batch)?);
        }

        Ok(records.into_iter().next())
    }
}
