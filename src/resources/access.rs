//! Share access rules
//!
//! NFS rules grant a host or network; CIFS rules grant a user or group,
//! which the array resolves in a local or Active Directory domain. CIFS
//! grants walk a fallback chain of identity and domain combinations until
//! the array recognises one of them.

use crate::client::pagination::PageQuery;
use crate::client::{vstore_body, with_vstore, ArrayClient};
use crate::constants::ERROR_USER_OR_GROUP_NOT_EXIST;
use crate::domain::ports::HttpMethod;
use crate::domain::types::{AccessRecord, DomainType, NfsAccessOptions, ShareProtocol};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use serde_json::json;
use tracing::{debug, info};

const ALLOW_ACCESS_ERROR: &str = "Allow access error.";

impl ArrayClient {
    pub async fn get_access_count(
        &self,
        share_id: &str,
        protocol: ShareProtocol,
        vstore_id: Option<&str>,
    ) -> Result<i64> {
        let query = PageQuery::new(protocol.access_client_type())
            .with_parent(share_id)
            .with_body(vstore_body(vstore_id));
        self.count_items(&query, "Get access count by share error!").await
    }

    /// IDs of every access rule on the share
    pub async fn get_all_access_from_share(
        &self,
        share_id: &str,
        protocol: ShareProtocol,
        vstore_id: Option<&str>,
    ) -> Result<Vec<String>> {
        let count = self.get_access_count(share_id, protocol, vstore_id).await?;
        let query = PageQuery::new(protocol.access_client_type())
            .with_parent(share_id)
            .with_body(vstore_body(vstore_id));

        let rules: Vec<AccessRecord> = self
            .collect_paged(&query, count, "Get access id by share error!")
            .await?;
        Ok(rules.into_iter().map(|rule| rule.id).collect())
    }

    /// ID of the rule granting `access_to`, directly or as the `@` group
    pub async fn get_access_from_share(
        &self,
        share_id: &str,
        access_to: &str,
        protocol: ShareProtocol,
        vstore_id: Option<&str>,
    ) -> Result<Option<String>> {
        let count = self.get_access_count(share_id, protocol, vstore_id).await?;
        let query = PageQuery::new(protocol.access_client_type())
            .with_parent(share_id)
            .with_body(vstore_body(vstore_id));
        let group = format!("@{}", access_to);

        let found = self
            .find_paged(&query, count, "Get access id by share error!", |rule: &AccessRecord| {
                rule.name == access_to || rule.name == group
            })
            .await?;
        Ok(found.map(|rule| rule.id))
    }

    /// Access level of a rule: `ACCESSVAL` for NFS, `PERMISSION` for CIFS
    pub async fn get_access_level(
        &self,
        access_id: &str,
        protocol: ShareProtocol,
        vstore_id: Option<&str>,
    ) -> Result<Option<String>> {
        let rule: AccessRecord = self
            .call_data(
                &format!("/{}/{}", protocol.access_client_type(), access_id),
                vstore_body(vstore_id),
                HttpMethod::Get,
                "Get access information error!",
            )
            .await?;
        Ok(rule.level().map(str::to_string))
    }

    pub async fn change_access(
        &self,
        access_id: &str,
        protocol: ShareProtocol,
        access_level: &str,
        vstore_id: Option<&str>,
    ) -> Result<()> {
        let (body, msg) = match protocol {
            ShareProtocol::Nfs => (
                json!({
                    "ACCESSVAL": access_level,
                    "SYNC": "0",
                    "ALLSQUASH": "1",
                    "ROOTSQUASH": "0",
                }),
                "Change nfs access error.",
            ),
            ShareProtocol::Cifs => (
                json!({ "PERMISSION": access_level }),
                "Change cifs access error.",
            ),
        };

        self.call_checked(
            &format!("/{}/{}", protocol.access_client_type(), access_id),
            Some(with_vstore(body, vstore_id)),
            HttpMethod::Put,
            msg,
        )
        .await?;
        Ok(())
    }

    /// Grant `access_to` the given level on a share
    pub async fn allow_access(
        &self,
        share_id: &str,
        access_to: &str,
        protocol: ShareProtocol,
        access_level: &str,
        nfs_options: &NfsAccessOptions,
        vstore_id: Option<&str>,
    ) -> Result<()> {
        match protocol {
            ShareProtocol::Nfs => {
                self.allow_nfs_access(share_id, access_to, access_level, nfs_options, vstore_id)
                    .await
            }
            ShareProtocol::Cifs => {
                self.allow_cifs_access(share_id, access_to, access_level, vstore_id)
                    .await
            }
        }
    }

    async fn allow_nfs_access(
        &self,
        share_id: &str,
        access_to: &str,
        access_level: &str,
        options: &NfsAccessOptions,
        vstore_id: Option<&str>,
    ) -> Result<()> {
        let pick = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        let mut body = json!({
            "TYPE": "16409",
            "NAME": access_to,
            "PARENTID": share_id,
            "ACCESSVAL": access_level,
            "SYNC": pick(&options.sync, "0"),
            "ALLSQUASH": pick(&options.all_squash, "1"),
            "ROOTSQUASH": pick(&options.root_squash, "0"),
        });
        if let (Some(secure), Some(map)) = (
            options.secure.as_deref().filter(|s| !s.is_empty()),
            body.as_object_mut(),
        ) {
            map.insert("SECURE".to_string(), json!(secure));
        }

        self.call_checked(
            "/NFS_SHARE_AUTH_CLIENT",
            Some(with_vstore(body, vstore_id)),
            HttpMethod::Post,
            ALLOW_ACCESS_ERROR,
        )
        .await?;
        info!("Granted NFS {} access to {} on share {}", access_level, access_to, share_id);
        Ok(())
    }

    async fn allow_cifs_access(
        &self,
        share_id: &str,
        access_to: &str,
        access_level: &str,
        vstore_id: Option<&str>,
    ) -> Result<()> {
        let group = format!("@{}", access_to);
        let mut last_refusal = None;

        for domain in DomainType::resolution_order(access_to) {
            for name in [access_to, group.as_str()] {
                debug!(
                    "Trying CIFS access for {} in domain type {} (level {}, share {})",
                    name,
                    domain.code(),
                    access_level,
                    share_id
                );
                match self
                    .grant_cifs(share_id, name, access_level, domain, vstore_id)
                    .await?
                {
                    None => {
                        info!("Granted CIFS {} access to {} on share {}", access_level, name, share_id);
                        return Ok(());
                    }
                    Some(refusal) => last_refusal = Some(refusal),
                }
            }
        }

        let msg = format!(
            "{} No user or group named {} exists for share {}.",
            ALLOW_ACCESS_ERROR, access_to, share_id
        );
        Err(match last_refusal {
            Some(envelope) => envelope.into_error(&msg),
            None => Error::Internal(msg),
        })
    }

    /// One CIFS grant attempt; the refusal envelope when the identity is unknown
    async fn grant_cifs(
        &self,
        share_id: &str,
        name: &str,
        access_level: &str,
        domain: DomainType,
        vstore_id: Option<&str>,
    ) -> Result<Option<Envelope>> {
        let body = json!({
            "NAME": name,
            "PARENTID": share_id,
            "PERMISSION": access_level,
            "DOMAINTYPE": domain.code(),
        });
        let envelope = self
            .call(
                "/CIFS_SHARE_AUTH_CLIENT",
                Some(with_vstore(body, vstore_id)),
                HttpMethod::Post,
            )
            .await?;

        match envelope.code() {
            0 => Ok(None),
            ERROR_USER_OR_GROUP_NOT_EXIST => Ok(Some(envelope)),
            _ => Err(envelope.into_error(ALLOW_ACCESS_ERROR)),
        }
    }

    pub async fn remove_access(
        &self,
        access_id: &str,
        protocol: ShareProtocol,
        vstore_id: Option<&str>,
    ) -> Result<()> {
        self.call_checked(
            &format!("/{}/{}", protocol.access_client_type(), access_id),
            vstore_body(vstore_id),
            HttpMethod::Delete,
            "delete access from share error!",
        )
        .await?;
        Ok(())
    }
}
