use std::path::Path;

use k8s_openapi::api::apps::v1::Deployment;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{api::ListParams, Api, Client};
use tracing::debug;

use crate::error::ClusterError;

const LIST_PAGE_SIZE: u32 = 500;

pub async fn client_from_kubeconfig(path: &Path) -> Result<Client, ClusterError> {
    let kubeconfig = Kubeconfig::read_from(path).map_err(|source| ClusterError::Kubeconfig {
        path: path.to_path_buf(),
        source,
    })?;
    let config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|source| ClusterError::Kubeconfig {
            path: path.to_path_buf(),
            source,
        })?;
    Client::try_from(config).map_err(ClusterError::Connect)
}

/// Lists deployment names in API order, following continue tokens until the
/// listing is complete.
pub async fn list_deployment_names(client: &Client, namespace: &str) -> Result<Vec<String>, ClusterError> {
    let api: Api<Deployment> = Api::namespaced(client.clone(), namespace);
    let mut names = Vec::new();
    let mut continue_token: Option<String> = None;

    loop {
        let mut params = ListParams::default().limit(LIST_PAGE_SIZE);
        if let Some(token) = continue_token.as_deref() {
            params = params.continue_token(token);
        }
        let page = api.list(&params).await.map_err(|source| ClusterError::List {
            namespace: namespace.to_string(),
            source,
        })?;

        names.extend(deployment_names(&page.items));

        continue_token = page.metadata.continue_.filter(|t| !t.is_empty());
        if continue_token.is_none() {
            break;
        }
        debug!("{} deployments so far in {}, fetching next page", names.len(), namespace);
    }

    Ok(names)
}

pub fn deployment_names(deployments: &[Deployment]) -> Vec<String> {
    deployments
        .iter()
        .filter_map(|d| d.metadata.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn deployment(name: Option<&str>) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: name.map(str::to_string),
                namespace: Some("ns".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_names_keep_api_order() {
        let items = vec![deployment(Some("zeta")), deployment(Some("alpha")), deployment(Some("mid"))];
        assert_eq!(deployment_names(&items), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_unnamed_deployments_are_skipped() {
        let items = vec![deployment(None), deployment(Some("api"))];
        assert_eq!(deployment_names(&items), vec!["api"]);
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_is_cluster_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");

        let err = client_from_kubeconfig(&path).await.err().unwrap();
        assert!(matches!(err, ClusterError::Kubeconfig { .. }));
        assert!(err.to_string().contains("loading kubeconfig"));
    }

    fn client_for(server: &mockito::ServerGuard) -> Client {
        let config = kube::Config::new(server.url().parse().unwrap());
        Client::try_from(config).unwrap()
    }

    fn page(names: &[&str], continue_token: Option<&str>) -> String {
        let items: Vec<serde_json::Value> = names
            .iter()
            .map(|n| {
                serde_json::json!({
                    "apiVersion": "apps/v1",
                    "kind": "Deployment",
                    "metadata": {"name": n, "namespace": "ns"}
                })
            })
            .collect();
        let mut metadata = serde_json::json!({"resourceVersion": "42"});
        if let Some(token) = continue_token {
            metadata["continue"] = serde_json::json!(token);
        }
        serde_json::json!({
            "apiVersion": "apps/v1",
            "kind": "DeploymentList",
            "metadata": metadata,
            "items": items
        })
        .to_string()
    }

    const DEPLOYMENTS_PATH: &str = "/apis/apps/v1/namespaces/ns/deployments";

    #[tokio::test]
    async fn test_listing_follows_continue_token() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", DEPLOYMENTS_PATH)
            .match_query(mockito::Matcher::Exact("limit=500".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(page(&["zeta", "alpha"], Some("tok-1")))
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", DEPLOYMENTS_PATH)
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("limit".to_string(), "500".to_string()),
                mockito::Matcher::UrlEncoded("continue".to_string(), "tok-1".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(page(&["mid"], None))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let names = list_deployment_names(&client, "ns").await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_single_page_listing() {
        let mut server = mockito::Server::new_async().await;
        let only = server
            .mock("GET", DEPLOYMENTS_PATH)
            .match_query(mockito::Matcher::Exact("limit=500".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(page(&["api"], Some("")))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let names = list_deployment_names(&client, "ns").await.unwrap();

        only.assert_async().await;
        assert_eq!(names, vec!["api"]);
    }

    #[tokio::test]
    async fn test_list_failure_is_cluster_error() {
        let mut server = mockito::Server::new_async().await;
        let _forbidden = server
            .mock("GET", DEPLOYMENTS_PATH)
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "kind": "Status",
                    "apiVersion": "v1",
                    "metadata": {},
                    "status": "Failure",
                    "message": "deployments.apps is forbidden",
                    "reason": "Forbidden",
                    "code": 403
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let err = list_deployment_names(&client, "ns").await.unwrap_err();

        assert!(matches!(err, ClusterError::List { ref namespace, .. } if namespace == "ns"));
        assert_eq!(err.to_string(), "listing deployments in namespace ns");
    }
}
