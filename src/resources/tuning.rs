//! SmartPartition, SmartCache and storage pools

use crate::client::ArrayClient;
use crate::constants::POOL_USAGE_TYPE_FILE;
use crate::domain::ports::HttpMethod;
use crate::domain::types::StoragePool;
use crate::envelope::field_str;
use crate::error::Result;
use serde_json::{json, Value};

/// Object type code of a filesystem in association requests
const ASSOCIATE_OBJ_FILESYSTEM: u32 = 40;
const TYPE_SMART_PARTITION: u32 = 268;
const TYPE_SMART_CACHE: u32 = 273;

fn association(id: &str, fs_id: &str, kind: u32) -> Value {
    json!({
        "ID": id,
        "ASSOCIATEOBJTYPE": ASSOCIATE_OBJ_FILESYSTEM,
        "ASSOCIATEOBJID": fs_id,
        "TYPE": kind,
    })
}

/// ID of the first record in `items` named `name`
fn id_by_name(items: &[Value], name: &str) -> Option<String> {
    items
        .iter()
        .find(|item| field_str(item, "NAME") == Some(name))
        .and_then(|item| field_str(item, "ID"))
        .map(str::to_string)
}

impl ArrayClient {
    // =========================================================================
    // SmartPartition
    // =========================================================================

    pub async fn get_partition_id_by_name(&self, name: &str) -> Result<Option<String>> {
        let items: Vec<Value> = self
            .call_list("/cachepartition", None, HttpMethod::Get, "Get partition by name error.")
            .await?;
        Ok(id_by_name(&items, name))
    }

    pub async fn get_partition_info_by_id(&self, partition_id: &str) -> Result<Value> {
        self.call_data(
            &format!("/cachepartition/{}", partition_id),
            None,
            HttpMethod::Get,
            "Get partition by partition id error.",
        )
        .await
    }

    pub async fn add_fs_to_partition(&self, fs_id: &str, partition_id: &str) -> Result<()> {
        self.call_checked(
            "/filesystem/associate/cachepartition",
            Some(association(partition_id, fs_id, TYPE_SMART_PARTITION)),
            HttpMethod::Post,
            "Add filesystem to partition error.",
        )
        .await?;
        Ok(())
    }

    pub async fn remove_fs_from_partition(&self, fs_id: &str, partition_id: &str) -> Result<()> {
        self.call_checked(
            "/smartPartition/removeFs",
            Some(association(partition_id, fs_id, TYPE_SMART_PARTITION)),
            HttpMethod::Put,
            "Remove filesystem from partition error.",
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // SmartCache
    // =========================================================================

    pub async fn get_cache_id_by_name(&self, name: &str) -> Result<Option<String>> {
        let items: Vec<Value> = self
            .call_list("/SMARTCACHEPARTITION", None, HttpMethod::Get, "Get cache by name error.")
            .await?;
        Ok(id_by_name(&items, name))
    }

    pub async fn get_cache_info_by_id(&self, cache_id: &str) -> Result<Value> {
        self.call_data(
            &format!("/SMARTCACHEPARTITION/{}", cache_id),
            Some(json!({ "TYPE": "273", "ID": cache_id })),
            HttpMethod::Get,
            "Get smartcache by cache id error.",
        )
        .await
    }

    pub async fn add_fs_to_cache(&self, fs_id: &str, cache_id: &str) -> Result<()> {
        self.call_checked(
            "/SMARTCACHEPARTITION/CREATE_ASSOCIATE",
            Some(association(cache_id, fs_id, TYPE_SMART_CACHE)),
            HttpMethod::Put,
            "Add filesystem to cache error.",
        )
        .await?;
        Ok(())
    }

    pub async fn remove_fs_from_cache(&self, fs_id: &str, cache_id: &str) -> Result<()> {
        self.call_checked(
            "/SMARTCACHEPARTITION/REMOVE_ASSOCIATE",
            Some(association(cache_id, fs_id, TYPE_SMART_CACHE)),
            HttpMethod::Put,
            "Remove filesystem from cache error.",
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Storage Pools
    // =========================================================================

    pub async fn find_all_pool_info(&self) -> Result<Vec<StoragePool>> {
        self.call_data("/storagepool", None, HttpMethod::Get, "Query resource pool error.")
            .await
    }

    /// File-usage pool named `pool_name`
    pub async fn find_pool_info(&self, pool_name: &str) -> Result<Option<StoragePool>> {
        let pool_name = pool_name.trim();
        Ok(self
            .find_all_pool_info()
            .await?
            .into_iter()
            .find(|pool| pool.name == pool_name && pool.usagetype == POOL_USAGE_TYPE_FILE))
    }
}
