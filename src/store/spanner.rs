use anyhow::{Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::Code;
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::mutation::insert_or_update;
use gcloud_spanner::statement::Statement;
use gcloud_spanner::value::CommitTimestamp;
use std::sync::Arc;

use super::KeyValueStore;
use crate::config::SpannerConfig;

const TABLE: &str = "translations";

/// Columns written by `put`, in mutation order
const COLUMNS: [&str; 3] = ["abbreviation", "translations", "updated_at"];

const CREATE_TABLE_DDL: &str = r#"
CREATE TABLE translations (
    abbreviation STRING(50) NOT NULL,
    translations STRING(MAX) NOT NULL,
    updated_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),
) PRIMARY KEY (abbreviation)
"#;

/// Cloud Spanner backed store, one row per abbreviation
///
/// `put` is a blind `insert_or_update` and `get` a single-use read, so the
/// store gives per-key last-write-wins and nothing stronger.
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
}

impl SpannerStore {
    /// Connect to the configured database, provisioning it first
    ///
    /// The gcloud-spanner library picks up SPANNER_EMULATOR_HOST from the
    /// environment and talks to the emulator when it is set.
    pub async fn from_config(config: &SpannerConfig) -> Result<Self> {
        auto_provision(config).await?;

        let database_path = config.database_path();

        match &config.emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!("Connected to Spanner database: {}", database_path);

        Ok(Self {
            inner: Arc::new(client),
        })
    }
}

#[async_trait]
impl KeyValueStore for SpannerStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut statement = Statement::new(
            "SELECT translations FROM translations WHERE abbreviation = @abbreviation",
        );
        statement.add_param("abbreviation", &key.to_string());

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query translations from Spanner")?;

        match result_set.next().await? {
            Some(row) => {
                let raw: String = row.column_by_name("translations")?;
                tracing::debug!("Read translations for: {}", key);
                Ok(Some(raw))
            }
            None => {
                tracing::debug!("No translations stored for: {}", key);
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let abbreviation = key.to_string();
        let translations = value.to_string();

        // Every column is rewritten, so only the last write time is kept.
        let mutation = insert_or_update(
            TABLE,
            &COLUMNS,
            &[&abbreviation, &translations, &CommitTimestamp::new()],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to write translations to Spanner")?;

        tracing::debug!("Wrote translations for: {}", key);
        Ok(())
    }
}

/// Create the instance, database and table when missing
///
/// Lets a fresh emulator come up with no manual setup. Every step is a
/// no-op when the resource is already there.
async fn auto_provision(config: &SpannerConfig) -> Result<()> {
    tracing::info!("Checking Spanner resources...");

    let admin_client = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    let project_path = format!("projects/{}", config.project);
    let instance_path = format!("{}/instances/{}", project_path, config.instance);
    let database_path = config.database_path();

    ensure_instance(&admin_client, config, &project_path, &instance_path).await?;
    ensure_database(&admin_client, config, &instance_path, &database_path).await?;
    ensure_table(&admin_client, &database_path).await?;

    tracing::info!("Spanner resources ready");
    Ok(())
}

async fn ensure_instance(
    admin_client: &AdminClient,
    config: &SpannerConfig,
    project_path: &str,
    instance_path: &str,
) -> Result<()> {
    let request = GetInstanceRequest {
        name: instance_path.to_string(),
        field_mask: None,
    };

    match admin_client.instance().get_instance(request, None).await {
        Ok(_) => {
            tracing::info!("Instance exists: {}", instance_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Creating instance: {}", instance_path);

            let instance_config = match config.emulator_host {
                Some(_) => format!("{}/instanceConfigs/emulator-config", project_path),
                None => format!("{}/instanceConfigs/regional-us-central1", project_path),
            };

            let create_request = CreateInstanceRequest {
                parent: project_path.to_string(),
                instance_id: config.instance.clone(),
                instance: Some(Instance {
                    name: instance_path.to_string(),
                    config: instance_config,
                    display_name: format!("{} instance", config.instance),
                    node_count: 1,
                    ..Default::default()
                }),
            };

            let mut operation = admin_client
                .instance()
                .create_instance(create_request, None)
                .await
                .context("Failed to start instance creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create instance")?;

            tracing::info!("Instance created: {}", instance_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check instance existence: {}",
            e.message()
        )),
    }
}

async fn ensure_database(
    admin_client: &AdminClient,
    config: &SpannerConfig,
    instance_path: &str,
    database_path: &str,
) -> Result<()> {
    let request = GetDatabaseRequest {
        name: database_path.to_string(),
    };

    match admin_client.database().get_database(request, None).await {
        Ok(_) => {
            tracing::info!("Database exists: {}", database_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Creating database: {}", database_path);

            let create_request = CreateDatabaseRequest {
                parent: instance_path.to_string(),
                create_statement: format!("CREATE DATABASE `{}`", config.database),
                extra_statements: vec![],
                encryption_config: None,
                database_dialect: 1, // Google Standard SQL
                proto_descriptors: vec![],
            };

            let mut operation = admin_client
                .database()
                .create_database(create_request, None)
                .await
                .context("Failed to start database creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create database")?;

            tracing::info!("Database created: {}", database_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check database existence: {}",
            e.message()
        )),
    }
}

async fn ensure_table(admin_client: &AdminClient, database_path: &str) -> Result<()> {
    let request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl = admin_client
        .database()
        .get_database_ddl(request, None)
        .await
        .context("Failed to get database DDL")?
        .into_inner();

    if ddl.statements.iter().any(|stmt| declares_table(stmt)) {
        tracing::info!("Table '{}' exists", TABLE);
        return Ok(());
    }

    tracing::info!("Creating table '{}'", TABLE);

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![CREATE_TABLE_DDL.trim().to_string()],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Table '{}' created", TABLE);
    Ok(())
}

fn declares_table(statement: &str) -> bool {
    statement.contains(&format!("CREATE TABLE {} ", TABLE))
        || statement.contains(&format!("CREATE TABLE `{}`", TABLE))
}
