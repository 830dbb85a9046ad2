use crate::domain::model::{DataFlowRequest, TransferReport};
use crate::domain::ports::TransferService;
use crate::utils::error::{Result, TransferError};
use std::sync::Arc;

/// Ordered collection of transfer services. Resolution picks the first
/// service that claims the request, so registration order is a priority.
#[derive(Default)]
pub struct TransferServiceRegistry {
    services: Vec<Arc<dyn TransferService>>,
}

impl TransferServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, service: Arc<dyn TransferService>) {
        self.services.push(service);
    }

    pub fn resolve(&self, request: &DataFlowRequest) -> Option<Arc<dyn TransferService>> {
        self.services
            .iter()
            .find(|s| s.can_handle(request))
            .cloned()
    }

    /// Validate and run the request on the first capable service.
    pub async fn transfer(&self, request: &DataFlowRequest) -> Result<TransferReport> {
        let service = self
            .resolve(request)
            .ok_or_else(|| TransferError::NoServiceFound {
                id: request.id.clone(),
            })?;

        service.validate(request)?;
        service.transfer(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DataAddress;
    use async_trait::async_trait;

    struct StubService {
        kind: &'static str,
        bytes: u64,
    }

    #[async_trait]
    impl TransferService for StubService {
        fn can_handle(&self, request: &DataFlowRequest) -> bool {
            request.source.kind == self.kind
        }

        fn validate(&self, _request: &DataFlowRequest) -> Result<()> {
            Ok(())
        }

        async fn transfer(&self, _request: &DataFlowRequest) -> Result<TransferReport> {
            Ok(TransferReport::bytes(self.bytes))
        }
    }

    fn request(kind: &str) -> DataFlowRequest {
        DataFlowRequest::new(DataAddress::new(kind), DataAddress::new(kind))
    }

    #[tokio::test]
    async fn test_resolves_first_capable_service() {
        let mut registry = TransferServiceRegistry::new();
        registry.register(Arc::new(StubService {
            kind: "AzureStorage",
            bytes: 1,
        }));
        registry.register(Arc::new(StubService {
            kind: "AzureStorage",
            bytes: 2,
        }));

        let report = registry.transfer(&request("AzureStorage")).await.unwrap();
        assert_eq!(report.bytes, Some(1));
    }

    #[tokio::test]
    async fn test_unmatched_request_is_an_error() {
        let mut registry = TransferServiceRegistry::new();
        registry.register(Arc::new(StubService {
            kind: "AzureStorage",
            bytes: 1,
        }));

        let result = registry.transfer(&request("AmazonS3")).await;
        assert!(matches!(
            result,
            Err(TransferError::NoServiceFound { .. })
        ));
    }

    #[test]
    fn test_resolve_on_empty_registry() {
        let registry = TransferServiceRegistry::new();
        assert!(registry.resolve(&request("AzureStorage")).is_none());
    }
}
