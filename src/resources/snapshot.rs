//! Filesystem snapshots

use crate::client::{record_id, ArrayClient};
use crate::constants::MSG_SNAPSHOT_NOT_FOUND;
use crate::domain::ports::HttpMethod;
use crate::domain::types::array_name;
use crate::envelope::Envelope;
use crate::error::Result;
use serde_json::json;
use tracing::{info, warn};

/// Array ID of a snapshot: `<fs_id>@share_snapshot_<name>`
pub fn snapshot_id(fs_id: &str, snapshot_name: &str) -> String {
    format!("{}@share_snapshot_{}", fs_id, array_name(snapshot_name))
}

/// Interpret a snapshot lookup envelope
///
/// `Ok(false)` when the array reports the snapshot missing; any other
/// failure is raised.
pub fn check_snapshot_exists(envelope: Envelope) -> Result<bool> {
    match envelope.code() {
        0 => Ok(true),
        MSG_SNAPSHOT_NOT_FOUND => Ok(false),
        _ => Err(envelope.into_error("Check the snapshot id exists error!")),
    }
}

impl ArrayClient {
    pub async fn create_snapshot(&self, fs_id: &str, snapshot_name: &str) -> Result<String> {
        let msg = "Create a snapshot error.";
        let data = self
            .call(
                "/FSSNAPSHOT",
                Some(json!({
                    "PARENTTYPE": "40",
                    "TYPE": "48",
                    "PARENTID": fs_id,
                    "NAME": array_name(snapshot_name),
                    "DESCRIPTION": "",
                })),
                HttpMethod::Post,
            )
            .await?
            .assert_success(msg)?
            .assert_data(msg)?;
        let id = record_id(&data, msg)?;
        info!("Created snapshot {} of filesystem {}", id, fs_id);
        Ok(id)
    }

    /// Delete a snapshot; a snapshot that is already gone counts as deleted
    pub async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        let envelope = self
            .call(
                &format!("/FSSNAPSHOT/{}", snapshot_id),
                Some(json!({ "TYPE": "48", "ID": snapshot_id })),
                HttpMethod::Delete,
            )
            .await?;

        if envelope.code() == MSG_SNAPSHOT_NOT_FOUND {
            warn!("Snapshot {} not found on array, treating as deleted", snapshot_id);
            return Ok(());
        }
        envelope.assert_success("Delete snapshot error.")?;
        Ok(())
    }

    /// Raw lookup; feed the result to [`check_snapshot_exists`]
    pub async fn get_snapshot_by_id(&self, snapshot_id: &str) -> Result<Envelope> {
        self.call(&format!("/FSSNAPSHOT/{}", snapshot_id), None, HttpMethod::Get)
            .await
    }

    pub async fn snapshot_exists(&self, snapshot_id: &str) -> Result<bool> {
        check_snapshot_exists(self.get_snapshot_by_id(snapshot_id).await?)
    }

    pub async fn rename_snapshot(&self, snapshot_id: &str, new_name: &str) -> Result<()> {
        let msg = "Rename share snapshot on array error.";
        self.call(
            &format!("/FSSNAPSHOT/{}", snapshot_id),
            Some(json!({ "NAME": new_name })),
            HttpMethod::Put,
        )
        .await?
        .assert_success(msg)?
        .assert_data(msg)?;
        Ok(())
    }

    pub async fn rollback_snapshot(&self, snapshot_id: &str) -> Result<()> {
        self.call_checked(
            "/FSSNAPSHOT/ROLLBACK_FSSNAPSHOT",
            Some(json!({ "ID": snapshot_id })),
            HttpMethod::Put,
            &format!("Failed to rollback snapshot {}.", snapshot_id),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::client::testing::{fail, logged_in_client, ok, ok_empty, ScriptedTransport};
    use assert_matches::assert_matches;

    #[test]
    fn test_snapshot_id() {
        assert_eq!(snapshot_id("12", "snap-01"), "12@share_snapshot_snap_01");
    }

    #[test]
    fn test_check_snapshot_exists() {
        assert!(check_snapshot_exists(Envelope::success(None)).unwrap());
        assert!(!check_snapshot_exists(Envelope::failure(MSG_SNAPSHOT_NOT_FOUND, "missing")).unwrap());
        assert_matches!(
            check_snapshot_exists(Envelope::failure(1077937500, "busy")),
            Err(Error::Array { code: 1077937500, .. })
        );
    }

    #[tokio::test]
    async fn test_create_snapshot() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new().on(HttpMethod::Post, "/FSSNAPSHOT", ok(json!({"ID": "12@s1"}))),
        )
        .await;

        let id = client.create_snapshot("12", "snap-a").await.unwrap();

        assert_eq!(id, "12@s1");
        let body = &transport.bodies(HttpMethod::Post, "/FSSNAPSHOT")[0];
        assert_eq!(body["NAME"], "snap_a");
        assert_eq!(body["PARENTTYPE"], "40");
    }

    #[tokio::test]
    async fn test_delete_snapshot_is_idempotent() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new().on_sequence(
                HttpMethod::Delete,
                "/FSSNAPSHOT/12@s1",
                vec![ok_empty(), fail(MSG_SNAPSHOT_NOT_FOUND), fail(1077937500)],
            ),
        )
        .await;

        client.delete_snapshot("12@s1").await.unwrap();
        client.delete_snapshot("12@s1").await.unwrap();
        let err = client.delete_snapshot("12@s1").await.unwrap_err();

        assert_eq!(err.array_code(), Some(1077937500));
        assert_eq!(
            transport.bodies(HttpMethod::Delete, "/FSSNAPSHOT/12@s1")[0],
            json!({"TYPE": "48", "ID": "12@s1"})
        );
    }

    #[tokio::test]
    async fn test_snapshot_exists() {
        let (client, _) = logged_in_client(
            ScriptedTransport::new()
                .on(HttpMethod::Get, "/FSSNAPSHOT/1@a", ok(json!({"ID": "1@a"})))
                .on(HttpMethod::Get, "/FSSNAPSHOT/1@b", fail(MSG_SNAPSHOT_NOT_FOUND)),
        )
        .await;

        assert!(client.snapshot_exists("1@a").await.unwrap());
        assert!(!client.snapshot_exists("1@b").await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_requires_data() {
        let (client, _) = logged_in_client(
            ScriptedTransport::new().on(HttpMethod::Put, "/FSSNAPSHOT/1@a", ok_empty()),
        )
        .await;

        let err = client.rename_snapshot("1@a", "renamed").await.unwrap_err();
        assert_matches!(err, Error::MissingData { .. });
    }
}
