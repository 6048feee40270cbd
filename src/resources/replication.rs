//! Remote replication pairs

use crate::client::ArrayClient;
use crate::constants::ERROR_REPLICATION_PAIR_NOT_EXIST;
use crate::domain::ports::HttpMethod;
use crate::envelope::field_str;
use crate::error::Result;
use serde_json::{json, Value};
use tracing::{info, warn};

const TYPE_REPLICATION_PAIR: &str = "263";

impl ArrayClient {
    /// Create a pair from raw array parameters, returning the pair record
    pub async fn create_replication_pair(&self, params: Value) -> Result<Value> {
        let msg = format!("Failed to create replication pair of {}.", params);
        let pair = self
            .call("/REPLICATIONPAIR", Some(params), HttpMethod::Post)
            .await?
            .assert_success(&msg)?
            .assert_data(&msg)?;
        let pair_id = field_str(&pair, "ID").unwrap_or_default();
        info!("Created replication pair {}", pair_id);
        Ok(pair)
    }

    /// PUT one of the pair control actions
    async fn replication_pair_action(&self, action: &str, pair_id: &str, msg: String) -> Result<()> {
        self.call_checked(
            &format!("/REPLICATIONPAIR/{}", action),
            Some(json!({ "ID": pair_id, "TYPE": TYPE_REPLICATION_PAIR })),
            HttpMethod::Put,
            &msg,
        )
        .await?;
        Ok(())
    }

    pub async fn split_replication_pair(&self, pair_id: &str) -> Result<()> {
        self.replication_pair_action(
            "split",
            pair_id,
            format!("Failed to split replication pair {}.", pair_id),
        )
        .await
    }

    pub async fn switch_replication_pair(&self, pair_id: &str) -> Result<()> {
        self.replication_pair_action(
            "switch",
            pair_id,
            format!("Failed to switch replication pair {}.", pair_id),
        )
        .await
    }

    pub async fn sync_replication_pair(&self, pair_id: &str) -> Result<()> {
        self.replication_pair_action(
            "sync",
            pair_id,
            format!("Failed to sync replication pair {}.", pair_id),
        )
        .await
    }

    pub async fn cancel_pair_secondary_write_lock(&self, pair_id: &str) -> Result<()> {
        self.replication_pair_action(
            "CANCEL_SECODARY_WRITE_LOCK",
            pair_id,
            format!("Failed to cancel replication pair {} secondary write lock.", pair_id),
        )
        .await
    }

    pub async fn set_pair_secondary_write_lock(&self, pair_id: &str) -> Result<()> {
        self.replication_pair_action(
            "SET_SECODARY_WRITE_LOCK",
            pair_id,
            format!("Failed to set replication pair {} secondary write lock.", pair_id),
        )
        .await
    }

    /// Delete a pair; a pair that no longer exists counts as deleted
    pub async fn delete_replication_pair(&self, pair_id: &str) -> Result<()> {
        let envelope = self
            .call(&format!("/REPLICATIONPAIR/{}", pair_id), None, HttpMethod::Delete)
            .await?;
        if envelope.code() == ERROR_REPLICATION_PAIR_NOT_EXIST {
            warn!("Replication pair {} was not found.", pair_id);
            return Ok(());
        }
        envelope.assert_success(&format!("Failed to delete replication pair {}.", pair_id))?;
        Ok(())
    }

    pub async fn get_replication_pair_by_id(&self, pair_id: &str) -> Result<Value> {
        self.call_data(
            &format!("/REPLICATIONPAIR/{}", pair_id),
            None,
            HttpMethod::Get,
            &format!("Failed to get replication pair {}.", pair_id),
        )
        .await
    }

    pub async fn get_replication_pair_by_localres_name(&self, local_res: &str) -> Result<Vec<Value>> {
        self.call_list(
            &format!("/REPLICATIONPAIR?filter=LOCALRESNAME::{}", local_res),
            None,
            HttpMethod::Get,
            &format!("Failed to query replication pair by local resource name {}.", local_res),
        )
        .await
    }
}
