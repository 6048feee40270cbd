//! Active Directory and LDAP domain configuration

use crate::client::ArrayClient;
use crate::domain::ports::HttpMethod;
use crate::envelope::field_str;
use crate::error::Result;
use serde_json::{json, Value};
use tracing::info;

/// `DOMAINSTATUS` of a joined AD domain
const AD_DOMAIN_JOINED: &str = "1";
const LDAP_PORT: u16 = 389;

impl ArrayClient {
    // =========================================================================
    // Active Directory
    // =========================================================================

    /// Join the array to an AD domain
    pub async fn add_ad_config(
        &self,
        user: &str,
        password: &str,
        domain: &str,
        system_name: &str,
    ) -> Result<()> {
        self.call_checked(
            "/AD_CONFIG",
            Some(json!({
                "ADMINNAME": user,
                "ADMINPWD": password,
                "DOMAINSTATUS": 1,
                "FULLDOMAINNAME": domain,
                "OU": "",
                "SYSTEMNAME": system_name,
                "TYPE": "16414",
            })),
            HttpMethod::Put,
            "Add AD config error.",
        )
        .await?;
        info!("Joined AD domain {} as {}", domain, system_name);
        Ok(())
    }

    pub async fn delete_ad_config(&self, user: &str, password: &str) -> Result<()> {
        self.call_checked(
            "/AD_CONFIG",
            Some(json!({
                "ADMINNAME": user,
                "ADMINPWD": password,
                "DOMAINSTATUS": 0,
                "TYPE": "16414",
            })),
            HttpMethod::Put,
            "Delete AD config error.",
        )
        .await?;
        Ok(())
    }

    pub async fn get_ad_config(&self) -> Result<Option<Value>> {
        let envelope = self
            .call_checked("/AD_CONFIG", None, HttpMethod::Get, "Get AD config error.")
            .await?;
        Ok(envelope.data.filter(|data| !data.is_null()))
    }

    /// Full domain name when the array has joined an AD domain
    pub async fn get_ad_domain_name(&self) -> Result<Option<String>> {
        Ok(self.get_ad_config().await?.and_then(|config| {
            if field_str(&config, "DOMAINSTATUS") == Some(AD_DOMAIN_JOINED) {
                field_str(&config, "FULLDOMAINNAME").map(str::to_string)
            } else {
                None
            }
        }))
    }

    // =========================================================================
    // LDAP
    // =========================================================================

    pub async fn add_ldap_config(&self, server: &str, domain: &str) -> Result<()> {
        self.call_checked(
            "/LDAP_CONFIG",
            Some(json!({
                "BASEDN": domain,
                "LDAPSERVER": server,
                "PORTNUM": LDAP_PORT,
                "TRANSFERTYPE": "1",
                "TYPE": "16413",
                "USERNAME": "",
            })),
            HttpMethod::Put,
            "Add LDAP config error.",
        )
        .await?;
        info!("Configured LDAP server {} for {}", server, domain);
        Ok(())
    }

    pub async fn delete_ldap_config(&self) -> Result<()> {
        self.call_checked("/LDAP_CONFIG", None, HttpMethod::Delete, "Delete LDAP config error.")
            .await?;
        Ok(())
    }

    pub async fn get_ldap_config(&self) -> Result<Option<Value>> {
        let envelope = self
            .call_checked("/LDAP_CONFIG", None, HttpMethod::Get, "Get LDAP config error.")
            .await?;
        Ok(envelope.data.filter(|data| !data.is_null()))
    }

    /// Configured LDAP server, if any
    pub async fn get_ldap_domain_server(&self) -> Result<Option<String>> {
        Ok(self.get_ldap_config().await?.and_then(|config| {
            field_str(&config, "LDAPSERVER")
                .filter(|server| !server.is_empty())
                .map(str::to_string)
        }))
    }
}
