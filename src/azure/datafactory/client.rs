use crate::azure::datafactory::models::{
    CreateRunResponse, DatasetResource, LinkedServiceResource, PipelineResource, PipelineRun,
};
use crate::azure::resources::ResourceId;
use crate::domain::ports::AccessTokenProvider;
use crate::utils::error::{Result, TransferError};
use serde::Serialize;
use std::sync::Arc;

const API_VERSION: &str = "2018-06-01";

/// Management-API client scoped to one factory.
pub struct DataFactoryClient {
    http: reqwest::Client,
    endpoint: String,
    credential: Arc<dyn AccessTokenProvider>,
    subscription_id: String,
    resource_group: String,
    factory_name: String,
}

impl DataFactoryClient {
    pub fn new(
        endpoint: impl Into<String>,
        credential: Arc<dyn AccessTokenProvider>,
        factory: &ResourceId,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credential,
            subscription_id: factory.subscription_id.clone(),
            resource_group: factory.resource_group.clone(),
            factory_name: factory.name.clone(),
        }
    }

    fn factory_url(&self, suffix: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.DataFactory/factories/{}/{}?api-version={}",
            self.endpoint,
            self.subscription_id,
            self.resource_group,
            self.factory_name,
            suffix,
            API_VERSION
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(TransferError::Api {
            service: "datafactory",
            status,
            body,
        })
    }

    async fn put<T: Serialize>(&self, suffix: &str, body: &T) -> Result<()> {
        let token = self.credential.access_token(&self.endpoint).await?;
        let response = self
            .http
            .put(self.factory_url(suffix))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn create_linked_service(
        &self,
        name: &str,
        linked_service: &LinkedServiceResource,
    ) -> Result<()> {
        tracing::debug!("Creating linked service {}", name);
        self.put(&format!("linkedservices/{}", name), linked_service)
            .await
    }

    pub async fn create_dataset(&self, name: &str, dataset: &DatasetResource) -> Result<()> {
        tracing::debug!("Creating dataset {}", name);
        self.put(&format!("datasets/{}", name), dataset).await
    }

    pub async fn create_pipeline(&self, name: &str, pipeline: &PipelineResource) -> Result<()> {
        tracing::debug!("Creating pipeline {}", name);
        self.put(&format!("pipelines/{}", name), pipeline).await
    }

    pub async fn create_run(&self, pipeline_name: &str) -> Result<String> {
        let token = self.credential.access_token(&self.endpoint).await?;
        let response = self
            .http
            .post(self.factory_url(&format!("pipelines/{}/createRun", pipeline_name)))
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let created: CreateRunResponse = response.json().await?;
        Ok(created.run_id)
    }

    pub async fn get_run(&self, run_id: &str) -> Result<PipelineRun> {
        let token = self.credential.access_token(&self.endpoint).await?;
        let response = self
            .http
            .get(self.factory_url(&format!("pipelineRuns/{}", run_id)))
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}
