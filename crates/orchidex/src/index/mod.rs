//! Full-text indexing of orchid records.
//!
//! Built on Tantivy. An [`IndexDefinition`] describes the schema and how rows
//! become documents; [`FTSIndex`] owns the Tantivy index, rebuilding it
//! wholesale from a frame and answering raw query-syntax searches with the
//! set of matching record ids.

mod syntax;

use ahash::AHashSet;
pub use error::IndexError;
use error::Result;
use orchidex_data_processing::schema::{FULL_TEXT_COLUMNS, ID_COLUMN};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use tantivy::{
    DocAddress, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument,
    collector::DocSetCollector,
    query::{BooleanQuery, Occur, Query, QueryParser, RegexQuery},
    schema::{
        FAST, Field, INDEXED, IndexRecordOption, STORED, Schema, SchemaBuilder,
        TextFieldIndexing, TextOptions, Value,
    },
};
use tracing::{debug, info, instrument, warn};

const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// How a particular dataset is laid out in a full-text index.
pub trait IndexDefinition: std::fmt::Debug + Send + Sync + 'static {
    /// Unique name, used as the directory name for on-disk indexes.
    fn name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Name of the stored u64 field holding the record id.
    fn id_field_name(&self) -> &'static str;

    /// Populate the writer from the frame.
    fn index_data(&self, writer: &mut IndexWriter, data: &DataFrame, schema: &Schema) -> Result<()>;

    /// Fields searched when a query term names no field.
    fn default_query_fields(&self, schema: &Schema) -> Result<Vec<Field>>;
}

/// The thirteen descriptive text columns of an orchid record plus its id.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrchidIndexDef;

impl IndexDefinition for OrchidIndexDef {
    fn name(&self) -> &'static str {
        "orchid_search"
    }

    fn schema(&self) -> Schema {
        let mut schema_builder = SchemaBuilder::new();

        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer("default")
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let text_options = TextOptions::default().set_indexing_options(text_indexing);

        schema_builder.add_u64_field(ID_COLUMN, STORED | INDEXED | FAST);
        for column in FULL_TEXT_COLUMNS {
            schema_builder.add_text_field(column, text_options.clone());
        }
        schema_builder.build()
    }

    fn id_field_name(&self) -> &'static str {
        ID_COLUMN
    }

    fn index_data(&self, writer: &mut IndexWriter, df: &DataFrame, schema: &Schema) -> Result<()> {
        let ids = df.column(ID_COLUMN)?.u64()?;
        let f_id = schema.get_field(ID_COLUMN)?;

        let text_columns = FULL_TEXT_COLUMNS
            .iter()
            .map(|column| Ok((schema.get_field(column)?, df.column(column)?.str()?)))
            .collect::<Result<Vec<_>>>()?;

        for (row, id) in ids.into_iter().enumerate() {
            let Some(id) = id else { continue };
            let mut doc = TantivyDocument::default();
            doc.add_u64(f_id, id);
            for (field, values) in &text_columns {
                if let Some(value) = values.get(row) {
                    doc.add_text(*field, value);
                }
            }
            writer.add_document(doc)?;
        }
        Ok(())
    }

    fn default_query_fields(&self, schema: &Schema) -> Result<Vec<Field>> {
        FULL_TEXT_COLUMNS
            .iter()
            .map(|column| Ok(schema.get_field(column)?))
            .collect()
    }
}

/// Where the index lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IndexLocation {
    #[default]
    InMemory,
    /// Parent directory; the index is kept in a sub-directory named after its definition.
    Directory(PathBuf),
}

/// Options for parsing full-text queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FTSIndexSearchParams {
    /// Bare terms must all match (`a b` means `a AND b`) rather than any.
    pub conjunction_by_default: bool,
}

impl Default for FTSIndexSearchParams {
    fn default() -> Self {
        Self {
            conjunction_by_default: true,
        }
    }
}

/// A Tantivy index over one dataset.
#[derive(Clone)]
pub struct FTSIndex<D: IndexDefinition> {
    index: Index,
    reader: IndexReader,
    definition: D,
}

impl<D: IndexDefinition> std::fmt::Debug for FTSIndex<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FTSIndex")
            .field("definition", &self.definition)
            .field("num_docs", &self.num_docs())
            .finish_non_exhaustive()
    }
}

impl<D: IndexDefinition> FTSIndex<D> {
    /// Create or load the index for `data`.
    ///
    /// In memory the index is always built fresh. On disk an existing index is
    /// reused when its document count matches the frame and `overwrite` is
    /// false; otherwise the directory is recreated and re-indexed.
    #[instrument(name = "Create Index", skip(definition, data), fields(index_name = definition.name(), rows = data.height()))]
    pub fn new(
        definition: D,
        data: &DataFrame,
        location: &IndexLocation,
        overwrite: bool,
    ) -> Result<Self> {
        let index = match location {
            IndexLocation::InMemory => {
                debug!("Creating in-memory FTS index");
                let index = Index::create_in_ram(definition.schema());
                Self::populate(&definition, &index, data)?;
                index
            }
            IndexLocation::Directory(parent) => {
                let index_path = parent.join(definition.name());
                info!(path = ?index_path, "Using FTS index path.");
                Self::open_or_create_in_dir(&definition, &index_path, data, overwrite)?
            }
        };

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            index,
            reader,
            definition,
        })
    }

    fn open_or_create_in_dir(
        definition: &D,
        index_path: &Path,
        data: &DataFrame,
        overwrite: bool,
    ) -> Result<Index> {
        if overwrite && index_path.exists() {
            info!(path = ?index_path, "Overwriting existing index directory.");
            std::fs::remove_dir_all(index_path)?;
        }
        std::fs::create_dir_all(index_path)?;

        if index_path.join("meta.json").exists() {
            info!(path = ?index_path, "Index meta.json found. Attempting to load existing index.");
            match Index::open_in_dir(index_path) {
                Ok(existing_index) => {
                    let expected_doc_count = data.height() as u64;
                    let actual_doc_count = existing_index.reader()?.searcher().num_docs();

                    if actual_doc_count == expected_doc_count {
                        info!(path = ?index_path, actual_doc_count, expected_doc_count, "Index is up-to-date. Loaded existing index.");
                        return Ok(existing_index);
                    }
                    info!(path = ?index_path, actual_doc_count, expected_doc_count, "Index out of date (doc count mismatch). Re-indexing.");
                    Self::safely_recreate_dir(index_path)?;
                }
                Err(e) => {
                    warn!(path = ?index_path, error = ?e, "Failed to open existing index, will re-index.");
                    Self::safely_recreate_dir(index_path)?;
                }
            }
        } else {
            info!(path = ?index_path, "No existing index found (meta.json missing). Will create new index.");
        }

        let index = Index::create_in_dir(index_path, definition.schema())?;
        Self::populate(definition, &index, data)?;
        Ok(index)
    }

    fn populate(definition: &D, index: &Index, data: &DataFrame) -> Result<()> {
        if data.height() == 0 {
            warn!(
                index = definition.name(),
                "No data to index. Index will be empty."
            );
            return Ok(());
        }
        info!(
            index = definition.name(),
            num_rows = data.height(),
            "Populating index"
        );
        let t_index = std::time::Instant::now();
        let schema = index.schema();
        let mut index_writer: IndexWriter =
            index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
        definition.index_data(&mut index_writer, data, &schema)?;
        index_writer.commit()?;
        index_writer.wait_merging_threads()?;
        info!(
            index = definition.name(),
            elapsed = ?t_index.elapsed(),
            "Index creation complete"
        );
        Ok(())
    }

    fn safely_recreate_dir(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_dir_all(path)?;
        }
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    /// `stem.*` over the named field, or over every default field.
    fn prefix_query(
        prefix: &syntax::PrefixTerm,
        schema: &Schema,
        default_fields: &[Field],
    ) -> Result<Box<dyn Query>> {
        let fields = match &prefix.field {
            Some(name) => {
                let field = schema
                    .get_field(name)
                    .ok()
                    .filter(|field| default_fields.contains(field))
                    .ok_or_else(|| {
                        IndexError::QuerySyntax(format!("Field does not exist: '{name}'"))
                    })?;
                vec![field]
            }
            None => default_fields.to_vec(),
        };
        let pattern = format!("{}.*", regex::escape(&prefix.stem));
        let per_field = fields
            .into_iter()
            .map(|field| {
                let query: Box<dyn Query> = Box::new(RegexQuery::from_pattern(&pattern, field)?);
                Ok((Occur::Should, query))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(BooleanQuery::new(per_field)))
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Ids of every document matching the raw query.
    ///
    /// The query uses the engine syntax: `AND`/`OR`/`NOT`, `"quoted phrases"`,
    /// `field:term`, `+`/`-` modifiers and trailing-`*` prefix terms (`vand*`,
    /// `Genus:phal*`). A query that does not parse, names an unknown field or
    /// leaves an operator without an operand (`pink AND`) yields
    /// [`IndexError::QuerySyntax`].
    #[instrument(name = "Search Text Index", skip_all, level = "debug", fields(index_name = self.definition.name(), query = query_str))]
    pub fn matching_ids(
        &self,
        query_str: &str,
        params: &FTSIndexSearchParams,
    ) -> Result<AHashSet<u64>> {
        let schema = self.index.schema();
        let id_field = schema.get_field(self.definition.id_field_name())?;
        let default_fields = self.definition.default_query_fields(&schema)?;

        let mut query_parser = QueryParser::for_index(&self.index, default_fields.clone());
        if params.conjunction_by_default {
            query_parser.set_conjunction_by_default();
        }
        let parse = |text: &str| {
            query_parser
                .parse_query(text)
                .map_err(|e| IndexError::QuerySyntax(e.to_string()))
        };

        let rewritten = syntax::rewrite(query_str)?;
        let query: Box<dyn Query> = if rewritten.prefixes.is_empty() {
            parse(query_str)?
        } else {
            let default_occur = if rewritten.disjunctive || !params.conjunction_by_default {
                Occur::Should
            } else {
                Occur::Must
            };
            let mut clauses = Vec::with_capacity(rewritten.prefixes.len() + 1);
            if !rewritten.remainder.is_empty() {
                let occur = if rewritten.negated {
                    Occur::MustNot
                } else {
                    default_occur
                };
                clauses.push((occur, parse(&rewritten.remainder)?));
            }
            for prefix in &rewritten.prefixes {
                clauses.push((
                    prefix.occur.unwrap_or(default_occur),
                    Self::prefix_query(prefix, &schema, &default_fields)?,
                ));
            }
            debug!(prefixes = rewritten.prefixes.len(), remainder = %rewritten.remainder, "Expanded prefix terms");
            Box::new(BooleanQuery::new(clauses))
        };

        let searcher = self.reader.searcher();
        let t_search = std::time::Instant::now();
        let addresses = searcher.search(&*query, &DocSetCollector)?;
        debug!(
            num_results = addresses.len(),
            search_execution_seconds = t_search.elapsed().as_secs_f32(),
            "Tantivy search execution complete"
        );

        addresses
            .into_iter()
            .map(|address: DocAddress| {
                let doc = searcher.doc::<TantivyDocument>(address)?;
                doc.get_first(id_field)
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| IndexError::MissingId(format!("{address:?}")))
            })
            .collect()
    }
}

pub type OrchidIndex = FTSIndex<OrchidIndexDef>;

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum IndexError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[error("Tantivy error: {0}")]
        Tantivy(#[from] tantivy::TantivyError),
        #[error("DataFrame error: {0}")]
        DataFrame(#[from] polars::prelude::PolarsError),
        #[error("Invalid full-text query: {0}")]
        QuerySyntax(String),
        #[error("Indexed document has no id: {0}")]
        MissingId(String),
        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }
    pub type Result<T> = std::result::Result<T, IndexError>;
}
