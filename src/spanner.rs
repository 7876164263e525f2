use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use gcloud_gax::grpc::{Code, Status};
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::mutation::insert;
use gcloud_spanner::row::Row;
use gcloud_spanner::statement::Statement;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, DatabasePath};
use crate::models::{NewNote, Note};
use crate::store::{NoteStore, StoreError, StoreResult};

const TABLE: &str = "notes";
const COLUMNS: [&str; 4] = ["id", "title", "content", "created_at"];

const NOTES_TABLE_DDL: &str = r#"CREATE TABLE notes (
    id STRING(36) NOT NULL,
    title STRING(MAX) NOT NULL,
    content STRING(MAX) NOT NULL,
    created_at TIMESTAMP NOT NULL,
) PRIMARY KEY (id)"#;

/// Spanner-backed note store, shareable across async handlers
#[derive(Clone)]
pub struct SpannerNoteStore {
    inner: Arc<Client>,
}

impl SpannerNoteStore {
    /// Connect to the database named in the config.
    ///
    /// The gcloud-spanner library picks up `SPANNER_EMULATOR_HOST` on its own
    /// and talks to the emulator when it is set.
    ///
    /// The instance, database and `notes` table are created first if missing.
    pub async fn connect(config: &Config) -> Result<Self> {
        Provisioner::new(config).await?.run().await?;

        let database_path = config.database.to_string();

        match config.spanner_emulator_host.as_deref() {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        // ClientConfig::default() automatically uses SPANNER_EMULATOR_HOST if set
        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        Ok(Self {
            inner: Arc::new(client),
        })
    }

    async fn select_all(&self) -> Result<Vec<Note>> {
        let statement = Statement::new("SELECT id, title, content, created_at FROM notes");

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut rows = tx.query(statement).await.context("Failed to query notes")?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await.context("Failed to read note row")? {
            notes.push(note_from_row(&row)?);
        }

        tracing::debug!("Listed {} notes", notes.len());
        Ok(notes)
    }

    async fn select_one(&self, id: Uuid) -> Result<Option<Note>> {
        let mut statement =
            Statement::new("SELECT id, title, content, created_at FROM notes WHERE id = @id");
        statement.add_param("id", &id.to_string());

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut rows = tx.query(statement).await.context("Failed to query note")?;

        match rows.next().await.context("Failed to read note row")? {
            Some(row) => Ok(Some(note_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_row(&self, note: NewNote) -> Result<Note> {
        let note = note.with_id(Uuid::new_v4());
        let id_str = note.id.to_string();
        let created_at = encode_timestamp(&note.created_at);

        let mutation = insert(
            TABLE,
            &COLUMNS,
            &[&id_str, &note.title, &note.content, &created_at],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to insert note into Spanner")?;

        tracing::debug!("Inserted note with id: {}", note.id);
        Ok(note)
    }

    /// Deletes through DML inside one read-write transaction so the affected
    /// row count tells us whether the note existed.
    async fn delete_row(&self, id: Uuid) -> Result<bool> {
        let mut statement = Statement::new("DELETE FROM notes WHERE id = @id");
        statement.add_param("id", &id.to_string());

        let mut tx = self
            .inner
            .begin_read_write_transaction()
            .await
            .context("Failed to begin read-write transaction")?;

        let result = tx.update(statement).await;
        let (_, removed) = tx.end(result, None).await.context("Failed to delete note")?;

        tracing::debug!("Delete of note {} affected {} row(s)", id, removed);
        Ok(removed > 0)
    }

    async fn select_1(&self) -> Result<()> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create health check transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute health check query")?;

        if result_set.next().await?.is_some() {
            tracing::debug!("Health check query succeeded");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Health check query returned no results"))
        }
    }
}

#[async_trait]
impl NoteStore for SpannerNoteStore {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        self.select_all().await.map_err(classify)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Note>> {
        self.select_one(id).await.map_err(classify)
    }

    async fn insert(&self, note: NewNote) -> StoreResult<Note> {
        self.insert_row(note).await.map_err(classify)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.delete_row(id).await.map_err(classify)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.select_1().await.map_err(classify)
    }

    async fn close(&self) {
        // Client is a cheap handle over a shared session pool; closing any
        // clone shuts the pool down.
        self.inner.as_ref().clone().close().await;
        tracing::info!("Spanner sessions closed");
    }
}

/// TIMESTAMP columns keep nanoseconds, so encode all nine digits; anything
/// shorter would make the stored value differ from the one echoed on create.
fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .context("Failed to parse created_at timestamp")?
        .with_timezone(&Utc))
}

fn note_from_row(row: &Row) -> Result<Note> {
    let id: String = row.column_by_name("id")?;
    let title: String = row.column_by_name("title")?;
    let content: String = row.column_by_name("content")?;
    let created_at: String = row.column_by_name("created_at")?;

    Ok(Note {
        id: Uuid::parse_str(&id).context("Stored note id is not a UUID")?,
        title,
        content,
        created_at: decode_timestamp(&created_at)?,
    })
}

/// Map an error chain onto a [`StoreError`] variant by the first cause we recognise
fn classify(err: anyhow::Error) -> StoreError {
    type Variant = fn(anyhow::Error) -> StoreError;

    let variant: Variant = err
        .chain()
        .find_map(|cause| -> Option<Variant> {
            if let Some(status) = cause.downcast_ref::<Status>() {
                return Some(match status.code() {
                    Code::Unavailable | Code::Unauthenticated | Code::PermissionDenied => {
                        StoreError::Unavailable
                    }
                    Code::DeadlineExceeded | Code::Cancelled => StoreError::Timeout,
                    _ => StoreError::Query,
                });
            }
            if cause.is::<gcloud_spanner::row::Error>()
                || cause.is::<chrono::ParseError>()
                || cause.is::<uuid::Error>()
            {
                return Some(StoreError::Serialization);
            }
            None
        })
        .unwrap_or(StoreError::Query);

    variant(err)
}

/// Creates whichever part of the configured database is missing, so local
/// development against the emulator needs no setup.
struct Provisioner<'a> {
    admin: AdminClient,
    path: &'a DatabasePath,
    emulator: bool,
}

impl<'a> Provisioner<'a> {
    async fn new(config: &'a Config) -> Result<Self> {
        let admin = AdminClient::new(AdminClientConfig::default())
            .await
            .context("Failed to create Spanner admin client")?;

        Ok(Self {
            admin,
            path: &config.database,
            emulator: config.spanner_emulator_host.is_some(),
        })
    }

    async fn run(&self) -> Result<()> {
        tracing::info!("Starting auto-provisioning checks...");

        let instance_path = self.path.instance_path();
        ensure_exists(
            "Instance",
            &instance_path,
            self.admin.instance().get_instance(
                GetInstanceRequest {
                    name: instance_path.clone(),
                    field_mask: None,
                },
                None,
            ),
            || self.create_instance(),
        )
        .await?;

        let database_path = self.path.to_string();
        ensure_exists(
            "Database",
            &database_path,
            self.admin.database().get_database(
                GetDatabaseRequest {
                    name: database_path.clone(),
                },
                None,
            ),
            || self.create_database(),
        )
        .await?;

        self.ensure_table().await?;

        tracing::info!("Auto-provisioning complete");
        Ok(())
    }

    async fn create_instance(&self) -> Result<()> {
        let project_path = self.path.project_path();
        let instance_config = if self.emulator {
            "emulator-config"
        } else {
            "regional-us-central1"
        };

        let request = CreateInstanceRequest {
            parent: project_path.clone(),
            instance_id: self.path.instance.clone(),
            instance: Some(Instance {
                name: self.path.instance_path(),
                config: format!("{}/instanceConfigs/{}", project_path, instance_config),
                display_name: format!("{} instance", self.path.instance),
                node_count: 1,
                ..Default::default()
            }),
        };

        let mut operation = self
            .admin
            .instance()
            .create_instance(request, None)
            .await
            .context("Failed to start instance creation")?;
        operation.wait(None).await.context("Failed to create instance")?;
        Ok(())
    }

    async fn create_database(&self) -> Result<()> {
        let request = CreateDatabaseRequest {
            parent: self.path.instance_path(),
            create_statement: format!("CREATE DATABASE `{}`", self.path.database),
            extra_statements: vec![],
            encryption_config: None,
            database_dialect: 1, // Google Standard SQL
            proto_descriptors: vec![],
        };

        let mut operation = self
            .admin
            .database()
            .create_database(request, None)
            .await
            .context("Failed to start database creation")?;
        operation.wait(None).await.context("Failed to create database")?;
        Ok(())
    }

    async fn ensure_table(&self) -> Result<()> {
        let database = self.path.to_string();

        let ddl = self
            .admin
            .database()
            .get_database_ddl(
                GetDatabaseDdlRequest {
                    database: database.clone(),
                },
                None,
            )
            .await
            .context("Failed to get database DDL")?
            .into_inner();

        if declares_notes_table(&ddl.statements) {
            tracing::info!("Table '{}' already exists", TABLE);
            return Ok(());
        }

        tracing::info!("Table '{}' not found, creating...", TABLE);

        let request = UpdateDatabaseDdlRequest {
            database,
            statements: vec![NOTES_TABLE_DDL.to_string()],
            operation_id: String::new(),
            proto_descriptors: vec![],
            throughput_mode: false,
        };

        let mut operation = self
            .admin
            .database()
            .update_database_ddl(request, None)
            .await
            .context("Failed to start table creation")?;
        operation.wait(None).await.context("Failed to create table")?;

        tracing::info!("Table '{}' created successfully", TABLE);
        Ok(())
    }
}

/// Await `lookup`; on NotFound run `create`, on any other error give up.
async fn ensure_exists<T, F>(
    kind: &str,
    name: &str,
    lookup: impl Future<Output = Result<T, Status>>,
    create: impl FnOnce() -> F,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match lookup.await {
        Ok(_) => {
            tracing::info!("{} already exists: {}", kind, name);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("{} not found, creating: {}", kind, name);
            create().await?;
            tracing::info!("{} created successfully: {}", kind, name);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check {} existence: {}",
            kind.to_lowercase(),
            e.message()
        )),
    }
}

fn declares_notes_table(statements: &[String]) -> bool {
    statements
        .iter()
        .any(|stmt| stmt.contains("CREATE TABLE notes") || stmt.contains("CREATE TABLE `notes`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emulator_config(instance: &str, database: &str) -> Config {
        Config {
            spanner_emulator_host: Some("localhost:9010".to_string()),
            database: DatabasePath {
                project: "test-project".to_string(),
                instance: instance.to_string(),
                database: database.to_string(),
            },
            service_port: 5000,
            service_host: "0.0.0.0".to_string(),
        }
    }

    /// Connects to the local emulator, or returns `None` when it isn't running
    async fn connect_emulator(instance: &str, database: &str) -> Option<SpannerNoteStore> {
        unsafe {
            std::env::set_var("SPANNER_EMULATOR_HOST", "localhost:9010");
        }

        match SpannerNoteStore::connect(&emulator_config(instance, database)).await {
            Ok(store) => Some(store),
            Err(e) => {
                let error_msg = format!("{:#}", e);
                assert!(
                    error_msg.contains("Failed to create Spanner")
                        || error_msg.contains("Failed to start")
                        || error_msg.contains("Failed to check")
                        || error_msg.contains("Failed to get database DDL"),
                    "Error should have context: {}",
                    error_msg
                );
                println!("Skipping, emulator may not be running: {}", error_msg);
                None
            }
        }
    }

    #[test]
    fn test_store_is_clonable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<SpannerNoteStore>();
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpannerNoteStore>();
    }

    #[test]
    fn test_timestamp_keeps_nanoseconds() {
        let now = Utc::now();
        let encoded = encode_timestamp(&now);

        assert!(encoded.ends_with('Z'));
        assert_eq!(decode_timestamp(&encoded).unwrap(), now);

        let odd = DateTime::parse_from_rfc3339("2026-10-19T16:08:37.838266156Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(encode_timestamp(&odd), "2026-10-19T16:08:37.838266156Z");
        assert_eq!(decode_timestamp("2026-10-19T16:08:37.838266156Z").unwrap(), odd);
    }

    #[test]
    fn test_notes_table_detection() {
        assert!(declares_notes_table(&[NOTES_TABLE_DDL.to_string()]));
        assert!(declares_notes_table(&["CREATE TABLE `notes` (id STRING(36))".to_string()]));
        assert!(!declares_notes_table(&["CREATE TABLE kv_store (id STRING(36))".to_string()]));
        assert!(!declares_notes_table(&[]));

        for column in COLUMNS {
            assert!(NOTES_TABLE_DDL.contains(column), "DDL missing {}", column);
        }
    }

    #[test]
    fn test_classify_by_grpc_code() {
        let unavailable = anyhow::Error::new(Status::new(Code::Unavailable, "down"))
            .context("Failed to query notes");
        assert!(matches!(classify(unavailable), StoreError::Unavailable(_)));

        let timeout = anyhow::Error::new(Status::new(Code::DeadlineExceeded, "slow"));
        assert!(matches!(classify(timeout), StoreError::Timeout(_)));

        let query = anyhow::Error::new(Status::new(Code::InvalidArgument, "bad sql"));
        assert!(matches!(classify(query), StoreError::Query(_)));
    }

    #[test]
    fn test_classify_decode_failures() {
        let bad_id = Uuid::parse_str("not-a-uuid")
            .context("Stored note id is not a UUID")
            .unwrap_err();
        assert!(matches!(classify(bad_id), StoreError::Serialization(_)));

        let bad_time = DateTime::parse_from_rfc3339("yesterday")
            .context("Failed to parse created_at timestamp")
            .unwrap_err();
        assert!(matches!(classify(bad_time), StoreError::Serialization(_)));

        let unknown = anyhow::anyhow!("something else");
        assert!(matches!(classify(unknown), StoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_insert_find_delete_with_emulator() {
        let Some(store) = connect_emulator("notes-store-test", "notes-store-test-db").await else {
            return;
        };

        let created = store
            .insert(NewNote {
                title: "Groceries".to_string(),
                content: "milk".to_string(),
                created_at: Utc::now(),
            })
            .await
            .expect("insert should succeed");

        let found = store.find(created.id).await.expect("find should succeed");
        assert_eq!(found, Some(created.clone()));

        let listed = store.list().await.expect("list should succeed");
        assert!(listed.contains(&created));

        assert!(store.delete(created.id).await.expect("delete should succeed"));
        assert!(!store.delete(created.id).await.expect("second delete should succeed"));
        assert!(store.find(created.id).await.unwrap().is_none());

        store.health_check().await.expect("health check should pass");
    }

    #[tokio::test]
    async fn test_auto_provisioning_idempotent() {
        let Some(_first) = connect_emulator("idempotent-test-instance", "idempotent-test-db").await
        else {
            return;
        };

        let second = SpannerNoteStore::connect(&emulator_config(
            "idempotent-test-instance",
            "idempotent-test-db",
        ))
        .await;
        assert!(second.is_ok(), "Second auto-provisioning call should succeed");
    }
}
