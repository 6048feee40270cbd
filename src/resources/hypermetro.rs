//! HyperMetro pairs, domains and vstore pairs

use crate::client::ArrayClient;
use crate::constants::ERROR_HYPERMETRO_NOT_EXIST;
use crate::domain::ports::HttpMethod;
use crate::envelope::field_str;
use crate::error::Result;
use serde_json::{json, Value};
use tracing::{info, warn};

impl ArrayClient {
    pub async fn create_hypermetro_pair(&self, params: Value) -> Result<Value> {
        let msg = format!("Create HyperMetro pair {} error.", params);
        let pair = self
            .call("/HyperMetroPair", Some(params), HttpMethod::Post)
            .await?
            .assert_success(&msg)?
            .assert_data(&msg)?;
        let pair_id = field_str(&pair, "ID").unwrap_or_default();
        info!("Created HyperMetro pair {}", pair_id);
        Ok(pair)
    }

    pub async fn get_hypermetro_pair_by_id(&self, pair_id: &str) -> Result<Value> {
        self.call_data(
            &format!("/HyperMetroPair/{}", pair_id),
            None,
            HttpMethod::Get,
            &format!("Get HyperMetro pair {} error.", pair_id),
        )
        .await
    }

    pub async fn suspend_hypermetro_pair(&self, pair_id: &str) -> Result<()> {
        self.call_checked(
            "/HyperMetroPair/disable_hcpair",
            Some(json!({ "ID": pair_id })),
            HttpMethod::Put,
            &format!("Suspend HyperMetro pair {} error.", pair_id),
        )
        .await?;
        Ok(())
    }

    pub async fn sync_hypermetro_pair(&self, pair_id: &str) -> Result<()> {
        self.call_checked(
            "/HyperMetroPair/synchronize_hcpair",
            Some(json!({ "ID": pair_id })),
            HttpMethod::Put,
            &format!("Sync HyperMetro pair {} error.", pair_id),
        )
        .await?;
        Ok(())
    }

    /// Delete a pair; a pair that no longer exists counts as deleted
    pub async fn delete_hypermetro_pair(&self, pair_id: &str) -> Result<()> {
        let envelope = self
            .call(&format!("/HyperMetroPair/{}", pair_id), None, HttpMethod::Delete)
            .await?;
        if envelope.code() == ERROR_HYPERMETRO_NOT_EXIST {
            warn!("Hypermetro pair {} to delete not exist.", pair_id);
            return Ok(());
        }
        envelope.assert_success(&format!("Delete HyperMetro pair {} error.", pair_id))?;
        Ok(())
    }

    pub async fn get_hypermetro_domain_id(&self, domain_name: &str) -> Result<Option<String>> {
        let domains: Vec<Value> = self
            .call_list(
                "/HyperMetroDomain?range=[0-100]",
                None,
                HttpMethod::Get,
                "Get HyperMetro domains info error.",
            )
            .await?;
        Ok(domains
            .iter()
            .find(|item| field_str(item, "NAME") == Some(domain_name))
            .and_then(|item| field_str(item, "ID"))
            .map(str::to_string))
    }

    /// vstore pair linking `local_vstore_name` to `remote_vstore_name` in a domain
    pub async fn get_hypermetro_vstore_id(
        &self,
        domain_name: &str,
        local_vstore_name: &str,
        remote_vstore_name: &str,
    ) -> Result<Option<String>> {
        let pairs: Vec<Value> = self
            .call_list(
                "/vstore_pair?range=[0-100]",
                None,
                HttpMethod::Get,
                "Get Metro vStore pair id error.",
            )
            .await?;
        Ok(pairs
            .iter()
            .find(|item| {
                field_str(item, "DOMAINNAME") == Some(domain_name)
                    && field_str(item, "LOCALVSTORENAME") == Some(local_vstore_name)
                    && field_str(item, "REMOTEVSTORENAME") == Some(remote_vstore_name)
            })
            .and_then(|item| field_str(item, "ID"))
            .map(str::to_string))
    }

    pub async fn get_hypermetro_vstore_by_pair_id(&self, vstore_pair_id: &str) -> Result<Value> {
        self.call_data(
            &format!("/vstore_pair/{}", vstore_pair_id),
            None,
            HttpMethod::Get,
            "Get HyperMetro vStore pair info by id error.",
        )
        .await
    }
}
