//! Filesystem operations

use crate::client::{record_id, ArrayClient};
use crate::domain::ports::HttpMethod;
use crate::domain::types::array_name;
use crate::envelope::field_str;
use crate::error::Result;
use serde_json::{json, Map, Value};
use tracing::info;

/// Keys renamed by [`ArrayClient::get_fs_info_by_id`]
const FS_INFO_RENAMES: [(&str, &str); 5] = [
    ("PARENTNAME", "POOLNAME"),
    ("ENABLECOMPRESSION", "COMPRESSION"),
    ("ENABLEDEDUP", "DEDUP"),
    ("CACHEPARTITIONID", "SMARTPARTITIONID"),
    ("SMARTCACHEPARTITIONID", "SMARTCACHEID"),
];

impl ArrayClient {
    /// Create a filesystem from raw array parameters, returning its ID
    pub async fn create_filesystem(&self, params: Value) -> Result<String> {
        let msg = "Create filesystem error.";
        let data = self
            .call("/filesystem", Some(params), HttpMethod::Post)
            .await?
            .assert_success(msg)?
            .assert_data(msg)?;
        let id = record_id(&data, msg)?;
        info!("Created filesystem {}", id);
        Ok(id)
    }

    pub async fn delete_filesystem(&self, params: Value) -> Result<()> {
        self.call_checked(
            "/filesystem",
            Some(params),
            HttpMethod::Delete,
            "Delete file system error.",
        )
        .await?;
        Ok(())
    }

    /// First filesystem whose name matches exactly
    pub async fn get_fs_info_by_name(&self, name: &str) -> Result<Option<Value>> {
        let name = array_name(name);
        let items: Vec<Value> = self
            .call_list(
                &format!("/filesystem?filter=NAME::{}", name),
                None,
                HttpMethod::Get,
                &format!("Get filesystem by name {} error.", name),
            )
            .await?;
        Ok(items.into_iter().next())
    }

    /// Filesystem details with array keys mapped to driver names
    pub async fn get_fs_info_by_id(&self, fs_id: &str) -> Result<Map<String, Value>> {
        let mut info: Map<String, Value> = self
            .call_data(
                &format!("/filesystem/{}", fs_id),
                None,
                HttpMethod::Get,
                "Get filesystem info by id error!",
            )
            .await?;

        for (from, to) in FS_INFO_RENAMES {
            let value = info.remove(from).unwrap_or(Value::Null);
            info.insert(to.to_string(), value);
        }
        Ok(info)
    }

    /// Filesystem ID by name among the first 8192 filesystems
    pub async fn get_fsid_by_name(&self, name: &str) -> Result<Option<String>> {
        let items: Vec<Value> = self
            .call_list(
                "/FILESYSTEM?range=[0-8191]",
                None,
                HttpMethod::Get,
                "Get filesystem by name error!",
            )
            .await?;

        let name = array_name(name);
        Ok(items
            .iter()
            .find(|item| field_str(item, "NAME") == Some(name.as_str()))
            .and_then(|item| field_str(item, "ID"))
            .map(str::to_string))
    }

    /// Resize a filesystem; `new_size` is in array sectors
    pub async fn change_share_size(&self, fs_id: &str, new_size: u64) -> Result<()> {
        let msg = "Change a share size error!";
        self.call(
            &format!("/filesystem/{}", fs_id),
            Some(json!({ "CAPACITY": new_size })),
            HttpMethod::Put,
        )
        .await?
        .assert_success(msg)?
        .assert_data(msg)?;
        Ok(())
    }

    pub async fn change_fs_name(&self, fs_id: &str, name: &str) -> Result<()> {
        self.call_checked(
            &format!("/filesystem/{}", fs_id),
            Some(json!({ "NAME": array_name(name) })),
            HttpMethod::Put,
            "Change filesystem name error.",
        )
        .await?;
        Ok(())
    }

    pub async fn change_extra_specs(&self, fs_id: &str, dedupe: bool, compression: bool) -> Result<()> {
        self.call_checked(
            &format!("/filesystem/{}", fs_id),
            Some(json!({
                "ENABLEDEDUP": dedupe,
                "ENABLECOMPRESSION": compression,
            })),
            HttpMethod::Put,
            "Change extra_specs error.",
        )
        .await?;
        Ok(())
    }

    pub async fn change_fs_priority_high(&self, fs_id: &str) -> Result<()> {
        self.call_checked(
            &format!("/filesystem/{}", fs_id),
            Some(json!({ "IOPRIORITY": "3" })),
            HttpMethod::Put,
            "Change filesystem priority error.",
        )
        .await?;
        Ok(())
    }

    /// Start splitting a clone filesystem from its parent
    pub async fn split_clone_fs(&self, fs_id: &str) -> Result<()> {
        self.call_checked(
            "/filesystem_split_switch",
            Some(json!({
                "ID": fs_id,
                "SPLITENABLE": true,
                "SPLITSPEED": 4,
            })),
            HttpMethod::Put,
            &format!("Split clone fs {} error.", fs_id),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::testing::{fail, logged_in_client, ok, ok_empty, ScriptedTransport};
    use crate::domain::ports::HttpMethod;
    use crate::error::Error;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_filesystem_returns_id() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new().on(HttpMethod::Post, "/filesystem", ok(json!({"ID": "17"}))),
        )
        .await;

        let id = client
            .create_filesystem(json!({"NAME": "share_a", "PARENTID": "0"}))
            .await
            .unwrap();

        assert_eq!(id, "17");
        assert_eq!(
            transport.bodies(HttpMethod::Post, "/filesystem"),
            vec![json!({"NAME": "share_a", "PARENTID": "0"})]
        );
    }

    #[tokio::test]
    async fn test_create_filesystem_requires_data() {
        let (client, _) = logged_in_client(
            ScriptedTransport::new().on(HttpMethod::Post, "/filesystem", ok_empty()),
        )
        .await;

        let err = client.create_filesystem(json!({})).await.unwrap_err();
        assert_matches!(err, Error::MissingData { .. });
    }

    #[tokio::test]
    async fn test_get_fs_info_by_name_rewrites_hyphens() {
        let (client, transport) = logged_in_client(ScriptedTransport::new().on(
            HttpMethod::Get,
            "/filesystem?filter=NAME::",
            ok(json!([{"ID": "4", "NAME": "share_0a1b"}])),
        ))
        .await;

        let info = client.get_fs_info_by_name("share-0a1b").await.unwrap().unwrap();

        assert_eq!(info["ID"], "4");
        assert_eq!(
            transport.count(HttpMethod::Get, "/filesystem?filter=NAME::share_0a1b"),
            1
        );
    }

    #[tokio::test]
    async fn test_get_fs_info_by_id_renames_keys() {
        let (client, _) = logged_in_client(ScriptedTransport::new().on(
            HttpMethod::Get,
            "/filesystem/4",
            ok(json!({
                "ID": "4",
                "PARENTNAME": "pool0",
                "ENABLECOMPRESSION": "false",
                "ENABLEDEDUP": "true",
                "CACHEPARTITIONID": "",
                "SMARTCACHEPARTITIONID": "2",
            })),
        ))
        .await;

        let info = client.get_fs_info_by_id("4").await.unwrap();

        assert_eq!(info["POOLNAME"], "pool0");
        assert_eq!(info["DEDUP"], "true");
        assert_eq!(info["SMARTCACHEID"], "2");
        assert!(!info.contains_key("PARENTNAME"));
    }

    #[tokio::test]
    async fn test_change_share_size_surfaces_array_error() {
        let (client, _) = logged_in_client(
            ScriptedTransport::new().on(HttpMethod::Put, "/filesystem/4", fail(1077948993)),
        )
        .await;

        let err = client.change_share_size("4", 4194304).await.unwrap_err();
        assert_eq!(err.array_code(), Some(1077948993));
        assert!(err.to_string().contains("Change a share size error!"));
    }

    #[tokio::test]
    async fn test_get_fsid_by_name() {
        let (client, _) = logged_in_client(ScriptedTransport::new().on(
            HttpMethod::Get,
            "/FILESYSTEM?range=[0-8191]",
            ok(json!([{"ID": "1", "NAME": "other"}, {"ID": "9", "NAME": "share_x_y"}])),
        ))
        .await;

        assert_eq!(client.get_fsid_by_name("share-x-y").await.unwrap(), Some("9".into()));
        assert_eq!(client.get_fsid_by_name("missing").await.unwrap(), None);
    }
}
