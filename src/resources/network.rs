//! Ports, VLANs, logical interfaces and DNS

use crate::client::{record_id, ArrayClient};
use crate::constants::{ERROR_LOGICAL_PORT_EXIST, MAX_DNS_SERVERS, PORT_TYPE_BOND, PORT_TYPE_ETH};
use crate::domain::ports::HttpMethod;
use crate::domain::types::{BondPort, EthPort, LogicalPort, Vlan};
use crate::envelope::field_str;
use crate::error::{Error, Result};
use serde_json::{json, Value};
use tracing::{error, info, warn};

impl ArrayClient {
    // =========================================================================
    // Physical Ports
    // =========================================================================

    pub async fn get_all_eth_port(&self) -> Result<Vec<EthPort>> {
        self.call_list("/ETH_PORT", None, HttpMethod::Get, "Get all eth port error.")
            .await
    }

    pub async fn get_eth_port_by_id(&self, port_id: &str) -> Result<Option<EthPort>> {
        let envelope = self
            .call_checked(
                &format!("/ETH_PORT/{}", port_id),
                None,
                HttpMethod::Get,
                "Get eth port by id error.",
            )
            .await?;
        match envelope.data {
            Some(data) if !data.is_null() => Ok(Some(serde_json::from_value(data)?)),
            _ => Ok(None),
        }
    }

    pub async fn get_all_bond_port(&self) -> Result<Vec<BondPort>> {
        self.call_list("/BOND_PORT", None, HttpMethod::Get, "Get all bond port error.")
            .await
    }

    /// Port ID by name: eth ports match on location, bond ports on name
    pub async fn get_port_id(&self, port_name: &str, port_type: &str) -> Result<Option<String>> {
        let id = match port_type {
            PORT_TYPE_ETH => self
                .get_all_eth_port()
                .await?
                .into_iter()
                .find(|port| port.location == port_name)
                .map(|port| port.id),
            PORT_TYPE_BOND => self
                .get_all_bond_port()
                .await?
                .into_iter()
                .find(|port| port.name == port_name)
                .map(|port| port.id),
            _ => None,
        };
        Ok(id)
    }

    // =========================================================================
    // VLANs
    // =========================================================================

    pub async fn get_all_vlan(&self) -> Result<Vec<Vlan>> {
        self.call_list("/vlan", None, HttpMethod::Get, "Get all vlan error.")
            .await
    }

    /// VLAN ID for a tag on a port
    pub async fn get_vlan(&self, port_id: &str, vlan_tag: u32) -> Result<Option<String>> {
        let tag = vlan_tag.to_string();
        let vlans: Vec<Vlan> = self
            .call_list("/vlan", None, HttpMethod::Get, "Get vlan error.")
            .await?;
        Ok(vlans
            .into_iter()
            .find(|vlan| vlan.portid == port_id && vlan.tag == tag)
            .map(|vlan| vlan.id))
    }

    pub async fn create_vlan(&self, port_id: &str, port_type: &str, vlan_tag: u32) -> Result<String> {
        let msg = "Create vlan error.";
        let data = self
            .call(
                "/vlan",
                Some(json!({
                    "PORTID": port_id,
                    "PORTTYPE": port_type,
                    "TAG": vlan_tag.to_string(),
                    "TYPE": "280",
                })),
                HttpMethod::Post,
            )
            .await?
            .assert_success(msg)?
            .assert_data(msg)?;
        let id = record_id(&data, msg)?;
        info!("Created vlan {} (tag {}) on port {}", id, vlan_tag, port_id);
        Ok(id)
    }

    pub async fn check_vlan_exists_by_id(&self, vlan_id: &str) -> Result<bool> {
        Ok(self.get_all_vlan().await?.iter().any(|vlan| vlan.id == vlan_id))
    }

    /// Delete a VLAN; a VLAN still carrying a logical port is left in place
    pub async fn delete_vlan(&self, vlan_id: &str) -> Result<()> {
        let envelope = self
            .call(&format!("/vlan/{}", vlan_id), None, HttpMethod::Delete)
            .await?;
        if envelope.code() == ERROR_LOGICAL_PORT_EXIST {
            warn!("Cannot delete vlan {} because there is a logical port on it", vlan_id);
            return Ok(());
        }
        envelope.assert_success("Delete vlan error.")?;
        Ok(())
    }

    // =========================================================================
    // Logical Ports
    // =========================================================================

    /// Logical port with the given home port and address, activated if down
    pub async fn get_logical_port(
        &self,
        home_port_id: &str,
        ip: &str,
        subnet: &str,
    ) -> Result<Option<String>> {
        let ports: Vec<LogicalPort> = self
            .call_list("/LIF", None, HttpMethod::Get, "Get logical port error.")
            .await?;

        let Some(port) = ports.into_iter().find(|port| {
            port.homeportid == home_port_id && port.ipv4addr == ip && port.ipv4mask == subnet
        }) else {
            return Ok(None);
        };

        if !port.is_operational() {
            self.activate_logical_port(&port.id).await?;
        }
        Ok(Some(port.id))
    }

    async fn activate_logical_port(&self, logical_port_id: &str) -> Result<()> {
        self.call_checked(
            &format!("/LIF/{}", logical_port_id),
            Some(json!({ "OPERATIONALSTATUS": "true" })),
            HttpMethod::Put,
            "Activate logical port error.",
        )
        .await?;
        info!("Activated logical port {}", logical_port_id);
        Ok(())
    }

    pub async fn create_logical_port(
        &self,
        home_port_id: &str,
        home_port_type: &str,
        ip: &str,
        subnet: &str,
    ) -> Result<String> {
        let msg = "Create logical port error.";
        let data = self
            .call(
                "/LIF",
                Some(json!({
                    "ADDRESSFAMILY": 0,
                    "CANFAILOVER": "true",
                    "HOMEPORTID": home_port_id,
                    "HOMEPORTTYPE": home_port_type,
                    "IPV4ADDR": ip,
                    "IPV4GATEWAY": "",
                    "IPV4MASK": subnet,
                    "NAME": ip,
                    "OPERATIONALSTATUS": "true",
                    "ROLE": 2,
                    "SUPPORTPROTOCOL": 3,
                    "TYPE": "279",
                })),
                HttpMethod::Post,
            )
            .await?
            .assert_success(msg)?
            .assert_data(msg)?;
        let id = record_id(&data, msg)?;
        info!("Created logical port {} for {}", id, ip);
        Ok(id)
    }

    pub async fn check_logical_port_exists_by_id(&self, logical_port_id: &str) -> Result<bool> {
        Ok(self
            .get_all_logical_port()
            .await?
            .iter()
            .any(|port| port.id == logical_port_id))
    }

    pub async fn get_all_logical_port(&self) -> Result<Vec<LogicalPort>> {
        self.call_list("/LIF", None, HttpMethod::Get, "Get all logical port error.")
            .await
    }

    /// Raw logical port record
    pub async fn get_logical_port_by_id(&self, logical_port_id: &str) -> Result<Value> {
        let envelope = self
            .call_checked(
                &format!("/LIF/{}", logical_port_id),
                None,
                HttpMethod::Get,
                "Get logical port error.",
            )
            .await?;
        Ok(envelope.data.unwrap_or_else(|| json!({})))
    }

    /// Move a logical port into a vstore
    pub async fn modify_logical_port(&self, logical_port_id: &str, vstore_id: &str) -> Result<()> {
        let mut info = self.get_logical_port_by_id(logical_port_id).await?;
        let Some(map) = info.as_object_mut() else {
            return Err(Error::Internal(format!(
                "Logical port {} is not an object: {}",
                logical_port_id, info
            )));
        };
        map.insert("vstoreId".to_string(), json!(vstore_id));
        map.insert("dnsZoneName".to_string(), json!(""));

        self.call_checked(
            &format!("/LIF/{}", logical_port_id),
            Some(info),
            HttpMethod::Put,
            "Modify logical port error.",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_logical_port(&self, logical_port_id: &str) -> Result<()> {
        self.call_checked(
            &format!("/LIF/{}", logical_port_id),
            None,
            HttpMethod::Delete,
            "Delete logical port error.",
        )
        .await?;
        info!("Deleted logical port {}", logical_port_id);
        Ok(())
    }

    // =========================================================================
    // DNS
    // =========================================================================

    /// Replace the array's DNS servers; at most three addresses
    pub async fn set_dns_ip_address(&self, dns_ips: &[String]) -> Result<Option<Value>> {
        if dns_ips.len() > MAX_DNS_SERVERS {
            let message = format!("Most {} ips can be set to DNS.", MAX_DNS_SERVERS);
            error!("{}", message);
            return Err(Error::InvalidInput(message));
        }

        let envelope = self
            .call_checked(
                "/DNS_Server",
                Some(json!({
                    "ADDRESS": serde_json::to_string(dns_ips)?,
                    "TYPE": "260",
                })),
                HttpMethod::Put,
                "Set DNS ip address error.",
            )
            .await?;
        Ok(envelope.data)
    }

    pub async fn get_dns_ip_address(&self) -> Result<Vec<String>> {
        let envelope = self
            .call_checked("/DNS_Server", None, HttpMethod::Get, "Get DNS ip address error.")
            .await?;

        match envelope.data.as_ref().and_then(|data| field_str(data, "ADDRESS")) {
            Some(address) if !address.trim().is_empty() => Ok(serde_json::from_str(address)?),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{fail, logged_in_client, ok, ok_empty, ScriptedTransport};
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_get_port_id_by_type() {
        let (client, _) = logged_in_client(
            ScriptedTransport::new()
                .on(
                    HttpMethod::Get,
                    "/ETH_PORT",
                    ok(json!([{"ID": "1", "LOCATION": "CTE0.A.H0", "NAME": "eth0"}])),
                )
                .on(HttpMethod::Get, "/BOND_PORT", ok(json!([{"ID": "7", "NAME": "bond0"}]))),
        )
        .await;

        assert_eq!(
            client.get_port_id("CTE0.A.H0", PORT_TYPE_ETH).await.unwrap().as_deref(),
            Some("1")
        );
        assert_eq!(client.get_port_id("eth0", PORT_TYPE_ETH).await.unwrap(), None);
        assert_eq!(
            client.get_port_id("bond0", PORT_TYPE_BOND).await.unwrap().as_deref(),
            Some("7")
        );
    }

    #[tokio::test]
    async fn test_vlan_lookup_and_create() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new()
                .on(
                    HttpMethod::Get,
                    "/vlan",
                    ok(json!([{"ID": "20", "PORTID": "1", "TAG": "100"}])),
                )
                .on(HttpMethod::Post, "/vlan", ok(json!({"ID": "21"}))),
        )
        .await;

        assert_eq!(client.get_vlan("1", 100).await.unwrap().as_deref(), Some("20"));
        assert_eq!(client.get_vlan("1", 200).await.unwrap(), None);
        assert!(client.check_vlan_exists_by_id("20").await.unwrap());

        let id = client.create_vlan("1", PORT_TYPE_ETH, 200).await.unwrap();
        assert_eq!(id, "21");
        assert_eq!(
            transport.bodies(HttpMethod::Post, "/vlan"),
            vec![json!({"PORTID": "1", "PORTTYPE": "1", "TAG": "200", "TYPE": "280"})]
        );
    }

    #[tokio::test]
    async fn test_delete_vlan_tolerates_attached_logical_port() {
        let (client, _) = logged_in_client(
            ScriptedTransport::new()
                .on(HttpMethod::Delete, "/vlan/20", fail(ERROR_LOGICAL_PORT_EXIST))
                .on(HttpMethod::Delete, "/vlan/21", fail(1077949002)),
        )
        .await;

        client.delete_vlan("20").await.unwrap();
        let err = client.delete_vlan("21").await.unwrap_err();
        assert_eq!(err.array_code(), Some(1077949002));
    }

    #[tokio::test]
    async fn test_get_logical_port_activates_inactive_port() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new()
                .on(
                    HttpMethod::Get,
                    "/LIF",
                    ok(json!([
                        {"ID": "5", "HOMEPORTID": "1", "IPV4ADDR": "192.168.1.10",
                         "IPV4MASK": "255.255.255.0", "OPERATIONALSTATUS": "false"},
                    ])),
                )
                .on(HttpMethod::Put, "/LIF/5", ok_empty()),
        )
        .await;

        let id = client
            .get_logical_port("1", "192.168.1.10", "255.255.255.0")
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("5"));
        assert_eq!(
            transport.bodies(HttpMethod::Put, "/LIF/5"),
            vec![json!({"OPERATIONALSTATUS": "true"})]
        );
        assert!(client
            .get_logical_port("1", "192.168.1.11", "255.255.255.0")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_modify_logical_port_moves_to_vstore() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new()
                .on(HttpMethod::Get, "/LIF/5", ok(json!({"ID": "5", "NAME": "192.168.1.10"})))
                .on(HttpMethod::Put, "/LIF/5", ok_empty()),
        )
        .await;

        client.modify_logical_port("5", "3").await.unwrap();

        assert_eq!(
            transport.bodies(HttpMethod::Put, "/LIF/5"),
            vec![json!({"ID": "5", "NAME": "192.168.1.10", "vstoreId": "3", "dnsZoneName": ""})]
        );
    }

    #[tokio::test]
    async fn test_dns_addresses() {
        let (client, transport) = logged_in_client(
            ScriptedTransport::new()
                .on(HttpMethod::Put, "/DNS_Server", ok_empty())
                .on(
                    HttpMethod::Get,
                    "/DNS_Server",
                    ok(json!({"ADDRESS": "[\"10.1.1.1\",\"10.1.1.2\"]"})),
                ),
        )
        .await;

        let ips = vec!["10.1.1.1".to_string(), "10.1.1.2".to_string()];
        client.set_dns_ip_address(&ips).await.unwrap();
        assert_eq!(
            transport.bodies(HttpMethod::Put, "/DNS_Server")[0]["ADDRESS"],
            "[\"10.1.1.1\",\"10.1.1.2\"]"
        );
        assert_eq!(client.get_dns_ip_address().await.unwrap(), ips);

        let too_many: Vec<String> = (1..=4).map(|i| format!("10.1.1.{}", i)).collect();
        assert_matches!(
            client.set_dns_ip_address(&too_many).await,
            Err(Error::InvalidInput(_))
        );
        assert_eq!(transport.count(HttpMethod::Put, "/DNS_Server"), 1);
    }
}
