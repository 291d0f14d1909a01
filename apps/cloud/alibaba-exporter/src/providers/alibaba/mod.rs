//! Alibaba Cloud provider
//!
//! Talks to the BSS (billing) and ECS (compute) OpenAPI endpoints over signed
//! RPC-style GET requests.
//! https://www.alibabacloud.com/help/en/sdk/product-overview/rpc-mechanism

pub mod responses;
pub mod signer;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{CloudApi, ProviderError, ProviderResult};
use crate::config::AlibabaConfig;
use crate::models::{AvailableInstance, ComputeInstance, ResourcePackage};
use crate::pagination::{Page, PageRequest};
use responses::{
    BssStatus, DescribeInstancesResponse, DescribeRegionsResponse, ErrorBody,
    QueryAccountBalanceResponse, QueryAvailableInstancesResponse,
    QueryResourcePackageInstancesResponse,
};

/// BSS OpenAPI version
const BSS_VERSION: &str = "2017-12-14";

/// ECS OpenAPI version
const ECS_VERSION: &str = "2014-05-26";

/// Alibaba Cloud API client
pub struct AlibabaClient {
    client: Client,
    config: AlibabaConfig,
}

impl AlibabaClient {
    pub fn new(config: &AlibabaConfig) -> ProviderResult<Self> {
        if config.access_key_id.is_empty() {
            return Err(ProviderError::NotConfigured(
                "ACCESS_KEY_ID is not set".to_string(),
            ));
        }
        if config.access_key_secret.is_empty() {
            return Err(ProviderError::NotConfigured(
                "ACCESS_KEY_SECRET is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Issue one signed RPC call and decode the JSON body.
    async fn rpc_call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        version: &str,
        action: &str,
        params: &[(&str, String)],
    ) -> ProviderResult<T> {
        let mut query: BTreeMap<String, String> = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        query.insert("Action".to_string(), action.to_string());
        query.insert("Format".to_string(), "JSON".to_string());
        query.insert("Version".to_string(), version.to_string());
        query.insert("AccessKeyId".to_string(), self.config.access_key_id.clone());
        query.insert(
            "SignatureMethod".to_string(),
            signer::SIGNATURE_METHOD.to_string(),
        );
        query.insert(
            "SignatureVersion".to_string(),
            signer::SIGNATURE_VERSION.to_string(),
        );
        query.insert("SignatureNonce".to_string(), Uuid::new_v4().to_string());
        query.insert(
            "Timestamp".to_string(),
            signer::format_timestamp(Utc::now()),
        );

        let signed_query = signer::sign_get(self.config.access_key_secret.expose(), &query);
        let url = format!("{}/?{}", endpoint.trim_end_matches('/'), signed_query);

        debug!(action = action, endpoint = endpoint, "Calling Alibaba Cloud API");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
            warn!(
                action = action,
                status = %status,
                request_id = body.request_id.as_deref().unwrap_or_default(),
                "Alibaba Cloud API returned non-success status"
            );
            return Err(ProviderError::Api {
                code: body.code.unwrap_or_else(|| status.as_u16().to_string()),
                message: body.message.unwrap_or(text),
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| ProviderError::Parse(format!("{action}: {e}")))
    }

    async fn bss_call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &[(&str, String)],
    ) -> ProviderResult<T> {
        self.rpc_call(&self.config.bss_endpoint, BSS_VERSION, action, params)
            .await
    }

    async fn ecs_call<T: DeserializeOwned>(
        &self,
        region: &str,
        action: &str,
        params: &[(&str, String)],
    ) -> ProviderResult<T> {
        let endpoint = self.config.ecs_endpoint_for(region);
        self.rpc_call(&endpoint, ECS_VERSION, action, params).await
    }
}

/// BSS reports some failures with HTTP 200 and `Success=false`.
fn check_bss(status: &BssStatus) -> ProviderResult<()> {
    if status.success == Some(false) {
        return Err(ProviderError::Api {
            code: status.code.clone().unwrap_or_default(),
            message: status.message.clone().unwrap_or_default(),
        });
    }
    Ok(())
}

fn page_params(page: PageRequest, number_key: &'static str) -> Vec<(&'static str, String)> {
    vec![
        (number_key, page.number.to_string()),
        ("PageSize", page.size.to_string()),
    ]
}

#[async_trait]
impl CloudApi for AlibabaClient {
    async fn account_balance(&self) -> ProviderResult<String> {
        let response: QueryAccountBalanceResponse =
            self.bss_call("QueryAccountBalance", &[]).await?;
        check_bss(&response.status)?;

        response
            .data
            .and_then(|data| data.available_amount)
            .ok_or_else(|| {
                ProviderError::Parse("QueryAccountBalance: missing Data.AvailableAmount".to_string())
            })
    }

    async fn resource_packages(&self, page: PageRequest) -> ProviderResult<Page<ResourcePackage>> {
        let response: QueryResourcePackageInstancesResponse = self
            .bss_call(
                "QueryResourcePackageInstances",
                &page_params(page, "PageNum"),
            )
            .await?;
        check_bss(&response.status)?;

        let data = response.data.unwrap_or_default();
        let items = data.instances.map(|list| list.instance).unwrap_or_default();
        Ok(Page::new(items, data.total_count))
    }

    async fn available_instances(
        &self,
        page: PageRequest,
    ) -> ProviderResult<Page<AvailableInstance>> {
        let response: QueryAvailableInstancesResponse = self
            .bss_call("QueryAvailableInstances", &page_params(page, "PageNum"))
            .await?;
        check_bss(&response.status)?;

        let data = response.data.unwrap_or_default();
        Ok(Page::new(data.instance_list, data.total_count))
    }

    async fn regions(&self) -> ProviderResult<Vec<String>> {
        let response: DescribeRegionsResponse = self
            .ecs_call(
                &self.config.region_id,
                "DescribeRegions",
                &[("RegionId", self.config.region_id.clone())],
            )
            .await?;

        Ok(response
            .regions
            .map(|list| list.region)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|region| region.region_id)
            .collect())
    }

    async fn compute_instances(
        &self,
        region: &str,
        page: PageRequest,
    ) -> ProviderResult<Page<ComputeInstance>> {
        let mut params = page_params(page, "PageNumber");
        params.push(("RegionId", region.to_string()));

        let response: DescribeInstancesResponse = self
            .ecs_call(region, "DescribeInstances", &params)
            .await?;

        let items = response
            .instances
            .map(|list| list.instance)
            .unwrap_or_default();
        Ok(Page::new(items, response.total_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> AlibabaConfig {
        AlibabaConfig {
            access_key_id: "test-key".to_string(),
            access_key_secret: Secret::new("test-secret"),
            bss_endpoint: server.uri(),
            ecs_endpoint: Some(server.uri()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_requires_credentials() {
        let missing_id = AlibabaConfig {
            access_key_secret: Secret::new("secret"),
            ..Default::default()
        };
        assert!(matches!(
            AlibabaClient::new(&missing_id),
            Err(ProviderError::NotConfigured(_))
        ));

        let missing_secret = AlibabaConfig {
            access_key_id: "id".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            AlibabaClient::new(&missing_secret),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_account_balance_sends_signed_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("Action", "QueryAccountBalance"))
            .and(query_param("Version", BSS_VERSION))
            .and(query_param("Format", "JSON"))
            .and(query_param("AccessKeyId", "test-key"))
            .and(query_param("SignatureMethod", "HMAC-SHA1"))
            .and(query_param("SignatureVersion", "1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Code": "Success",
                "Success": true,
                "Data": { "AvailableAmount": "1,234.56", "Currency": "USD" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AlibabaClient::new(&config_for(&server)).unwrap();
        assert_eq!(client.account_balance().await.unwrap(), "1,234.56");

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(query.contains("Signature="));
        assert!(query.contains("SignatureNonce="));
        assert!(query.contains("Timestamp="));
    }

    #[tokio::test]
    async fn test_region_discovery_uses_configured_region() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("Action", "DescribeRegions"))
            .and(query_param("RegionId", "eu-central-1"))
            .and(query_param("AccessKeyId", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Regions": { "Region": [{ "RegionId": "eu-central-1" }] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AlibabaConfig {
            region_id: "eu-central-1".to_string(),
            ..config_for(&server)
        };
        let client = AlibabaClient::new(&config).unwrap();
        assert_eq!(client.regions().await.unwrap(), vec!["eu-central-1".to_string()]);
    }

    #[tokio::test]
    async fn test_bss_unsuccessful_body_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("Action", "QueryAccountBalance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Code": "NotAuthorized",
                "Message": "No permission",
                "Success": false
            })))
            .mount(&server)
            .await;

        let client = AlibabaClient::new(&config_for(&server)).unwrap();
        match client.account_balance().await {
            Err(ProviderError::Api { code, message }) => {
                assert_eq!(code, "NotAuthorized");
                assert_eq!(message, "No permission");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_maps_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "RequestId": "req-1",
                "Code": "InvalidAccessKeyId.NotFound",
                "Message": "Specified access key is not found."
            })))
            .mount(&server)
            .await;

        let client = AlibabaClient::new(&config_for(&server)).unwrap();
        match client.regions().await {
            Err(ProviderError::Api { code, .. }) => {
                assert_eq!(code, "InvalidAccessKeyId.NotFound")
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = AlibabaClient::new(&config_for(&server)).unwrap();
        assert!(matches!(
            client.resource_packages(PageRequest::first(10)).await,
            Err(ProviderError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_resource_packages_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("Action", "QueryResourcePackageInstances"))
            .and(query_param("PageNum", "2"))
            .and(query_param("PageSize", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Success": true,
                "Data": {
                    "TotalCount": 51,
                    "Instances": { "Instance": [{
                        "InstanceId": "pkg-1",
                        "Status": "Available",
                        "RemainingAmount": "10",
                        "RemainingAmountUnit": "GB",
                        "CommodityCode": "flowbag_intl"
                    }]}
                }
            })))
            .mount(&server)
            .await;

        let client = AlibabaClient::new(&config_for(&server)).unwrap();
        let page = client
            .resource_packages(PageRequest { number: 2, size: 50 })
            .await
            .unwrap();

        assert_eq!(page.total_count, Some(51));
        assert_eq!(page.items.len(), 1);
        assert!(page.items[0].is_available());
    }

    #[tokio::test]
    async fn test_available_instances_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("Action", "QueryAvailableInstances"))
            .and(query_param("PageNum", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Success": true,
                "Data": {
                    "TotalCount": 1,
                    "InstanceList": [{
                        "ProductCode": "ecs",
                        "SubscriptionType": "Subscription",
                        "Region": "ap-southeast-1",
                        "RenewStatus": "AutoRenewal",
                        "Status": "Normal",
                        "SubStatus": "Normal"
                    }]
                }
            })))
            .mount(&server)
            .await;

        let client = AlibabaClient::new(&config_for(&server)).unwrap();
        let page = client
            .available_instances(PageRequest::first(100))
            .await
            .unwrap();

        assert_eq!(page.items[0].dimensions()[0], "ecs");
        assert_eq!(page.total_count, Some(1));
    }

    #[tokio::test]
    async fn test_regions_and_compute_instances() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("Action", "DescribeRegions"))
            .and(query_param("Version", ECS_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Regions": { "Region": [
                    { "RegionId": "cn-hangzhou" },
                    { "RegionId": "ap-southeast-1" }
                ]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("Action", "DescribeInstances"))
            .and(query_param("RegionId", "ap-southeast-1"))
            .and(query_param("PageNumber", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "TotalCount": 1,
                "Instances": { "Instance": [{
                    "InstanceId": "i-1",
                    "RegionId": "ap-southeast-1",
                    "Cpu": 4,
                    "Memory": 16384
                }]}
            })))
            .mount(&server)
            .await;

        let client = AlibabaClient::new(&config_for(&server)).unwrap();
        assert_eq!(
            client.regions().await.unwrap(),
            vec!["cn-hangzhou".to_string(), "ap-southeast-1".to_string()]
        );

        let page = client
            .compute_instances("ap-southeast-1", PageRequest::first(100))
            .await
            .unwrap();
        assert_eq!(page.items[0].cpu, Some(4));
        assert_eq!(page.items[0].workload(), "unknown");
    }
}
