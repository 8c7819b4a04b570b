use crate::core::query::StructuredQuery;
use crate::domain::model::{DataEnvelope, FieldMap, Filter, Record, Sorter};
use crate::domain::ports::DataProvider;
use crate::firebase::FirestoreClient;
use crate::utils::error::Result;
use async_trait::async_trait;
use futures_util::future::try_join_all;

/// Data provider over the document-database client. Bulk operations fan out
/// one independent call per id with no concurrency bound and no rollback;
/// the first rejection wins and the remaining outcomes are discarded.
pub struct FirestoreDataProvider {
    client: FirestoreClient,
}

impl FirestoreDataProvider {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &FirestoreClient {
        &self.client
    }
}

#[async_trait]
impl DataProvider for FirestoreDataProvider {
    async fn get_list(
        &self,
        resource: &str,
        sorters: &[Sorter],
        filters: &[Filter],
    ) -> Result<DataEnvelope<Vec<Record>>> {
        let query = StructuredQuery::new(resource)
            .with_filters(filters)
            .with_sorters(sorters);
        let records = self.client.run_query(&query).await?;
        Ok(DataEnvelope::new(records))
    }

    async fn get_one(&self, resource: &str, id: &str) -> Result<DataEnvelope<Record>> {
        let record = self.client.get_document(resource, id).await?;
        Ok(DataEnvelope::new(record))
    }

    /// No native "document in set" filter is used: the whole collection is
    /// fetched and reduced client-side, so absent ids drop out silently.
    async fn get_many(&self, resource: &str, ids: &[String]) -> Result<DataEnvelope<Vec<Record>>> {
        let records = self.client.list_documents(resource).await?;
        let matched = records
            .into_iter()
            .filter(|record| ids.contains(&record.id))
            .collect();
        Ok(DataEnvelope::new(matched))
    }

    async fn create(&self, resource: &str, variables: FieldMap) -> Result<DataEnvelope<Record>> {
        let record = self.client.create_document(resource, variables).await?;
        Ok(DataEnvelope::new(record))
    }

    async fn create_many(
        &self,
        resource: &str,
        items: Vec<FieldMap>,
    ) -> Result<DataEnvelope<Vec<Record>>> {
        let records = try_join_all(
            items
                .into_iter()
                .map(|fields| self.client.create_document(resource, fields)),
        )
        .await?;
        Ok(DataEnvelope::new(records))
    }

    /// Echoes only the submitted fields back, not the full merged document.
    async fn update(
        &self,
        resource: &str,
        id: &str,
        variables: FieldMap,
    ) -> Result<DataEnvelope<FieldMap>> {
        self.client.patch_document(resource, id, &variables).await?;
        Ok(DataEnvelope::new(variables))
    }

    async fn update_many(&self, resource: &str, ids: &[String], variables: FieldMap) -> Result<()> {
        try_join_all(
            ids.iter()
                .map(|id| self.client.patch_document(resource, id, &variables)),
        )
        .await?;
        Ok(())
    }

    async fn delete_one(&self, resource: &str, id: &str) -> Result<()> {
        self.client.delete_document(resource, id).await
    }

    async fn delete_many(&self, resource: &str, ids: &[String]) -> Result<()> {
        try_join_all(ids.iter().map(|id| self.client.delete_document(resource, id))).await?;
        Ok(())
    }
}
