//! Share operations
//!
//! Shares are addressed by protocol-specific resource types (`NFSHARE`,
//! `CIFSHARE`) and located by their path `/<name>/`.

use crate::client::pagination::PageQuery;
use crate::client::{record_id, vstore_body, with_vstore, ArrayClient};
use crate::domain::ports::HttpMethod;
use crate::domain::types::{array_name, ShareProtocol, ShareRecord};
use crate::error::{Error, Result};
use serde_json::json;
use tracing::info;

/// Share path for a share name
pub fn share_path(share_name: &str) -> String {
    format!("/{}/", array_name(share_name))
}

/// Array-side share name for a share ID
pub fn share_name_by_id(share_id: &str) -> String {
    format!("share_{}", share_id)
}

impl ArrayClient {
    /// Create a share on a filesystem, returning the share ID
    pub async fn create_share(
        &self,
        share_name: &str,
        fs_id: &str,
        protocol: ShareProtocol,
        vstore_id: Option<&str>,
    ) -> Result<String> {
        let path = share_path(share_name);
        let body = match protocol {
            ShareProtocol::Nfs => json!({
                "DESCRIPTION": "",
                "FSID": fs_id,
                "SHAREPATH": path,
            }),
            ShareProtocol::Cifs => json!({
                "SHAREPATH": path,
                "DESCRIPTION": "",
                "ABEENABLE": "false",
                "ENABLENOTIFY": "true",
                "ENABLEOPLOCK": "true",
                "NAME": array_name(share_name),
                "FSID": fs_id,
                "TENANCYID": "0",
            }),
        };

        let msg = "Create share error.";
        let data = self
            .call(
                &format!("/{}", protocol.share_url_type()),
                Some(with_vstore(body, vstore_id)),
                HttpMethod::Post,
            )
            .await?
            .assert_success(msg)?
            .assert_data(msg)?;
        let id = record_id(&data, msg)?;
        info!("Created {} share {} at {}", protocol, id, path);
        Ok(id)
    }

    pub async fn delete_share_by_id(
        &self,
        share_id: &str,
        protocol: ShareProtocol,
        vstore_id: Option<&str>,
    ) -> Result<()> {
        self.call_checked(
            &format!("/{}/{}", protocol.share_url_type(), share_id),
            vstore_body(vstore_id),
            HttpMethod::Delete,
            "Delete share error.",
        )
        .await?;
        Ok(())
    }

    pub async fn get_share_count(&self, protocol: ShareProtocol) -> Result<i64> {
        self.count_items(
            &PageQuery::new(protocol.share_url_type()),
            "Get share count error!",
        )
        .await
    }

    /// Locate a share by name, scanning the share list page by page
    pub async fn get_share_by_name(
        &self,
        share_name: &str,
        protocol: ShareProtocol,
        vstore_id: Option<&str>,
    ) -> Result<Option<ShareRecord>> {
        let count = self.get_share_count(protocol).await?;
        let query = PageQuery::new(protocol.share_url_type())
            .with_body(vstore_body(vstore_id))
            .with_inclusive_budget();
        let path = share_path(share_name);

        self.find_paged(&query, count, "Get share by name error!", |share: &ShareRecord| {
            share.sharepath == path
        })
        .await
    }

    /// Share name from an export location on one of the configured logical IPs
    ///
    /// NFS locations look like `ip:/name`, CIFS locations like `\\ip\name`.
    pub fn share_name_by_export_location(
        &self,
        export_location: &str,
        protocol: ShareProtocol,
    ) -> Result<String> {
        let parsed = match protocol {
            ShareProtocol::Nfs => {
                let parts: Vec<&str> = export_location.split(":/").collect();
                match parts.as_slice() {
                    [ip, name] => Some((*ip, *name)),
                    _ => None,
                }
            }
            ShareProtocol::Cifs => {
                let parts: Vec<&str> = export_location.split('\\').collect();
                match parts.as_slice() {
                    ["", "", ip, name] => Some((*ip, *name)),
                    _ => None,
                }
            }
        };

        let Some((ip, name)) = parsed else {
            return Err(Error::InvalidInput(format!(
                "No share with export location {} could be found.",
                export_location
            )));
        };

        if !self.config().logical_ips.iter().any(|configured| configured == ip) {
            return Err(Error::InvalidInput(format!(
                "The share IP {} is not configured.",
                ip
            )));
        }

        Ok(name.to_string())
    }
}
