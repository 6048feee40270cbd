//! SmartQoS policies (`ioclass`)
//!
//! Filesystems sharing identical QoS specs are packed into one policy until
//! it reaches [`MAX_FS_NUM_IN_QOS`] members. Only policies this client
//! created (name carries the configured prefix) are reused.

use crate::client::{record_id, ArrayClient};
use crate::constants::{MAX_FS_NUM_IN_QOS, OPTS_QOS_VALUE, STATUS_QOS_ACTIVE};
use crate::domain::ports::HttpMethod;
use crate::domain::types::{FsList, QosPolicy, QosSpecs};
use crate::envelope::{field_str, Envelope};
use crate::error::Result;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

impl QosPolicy {
    /// Whether the policy's option values match `specs` on every QoS key
    pub fn matches_specs(&self, specs: &QosSpecs) -> bool {
        OPTS_QOS_VALUE.iter().all(|key| {
            let wanted = specs.get(*key).map(String::as_str);
            let actual = self.options.get(*key).and_then(Value::as_str);
            wanted == actual
        })
    }

    /// Whether a filesystem can still join the policy
    pub fn accepts_filesystems(&self, name_prefix: &str) -> bool {
        self.runningstatus == STATUS_QOS_ACTIVE
            && self.fslist.len() < MAX_FS_NUM_IN_QOS
            && self.name.starts_with(name_prefix)
            && self.lunlist.is_empty()
    }
}

impl ArrayClient {
    /// Raw policy listing
    pub async fn get_qos(&self) -> Result<Envelope> {
        self.call_checked("/ioclass", None, HttpMethod::Get, "Get QoS information error.")
            .await
    }

    /// A reusable policy for `specs`, with its current filesystem list
    pub async fn find_available_qos(&self, specs: &QosSpecs) -> Result<Option<(String, FsList)>> {
        let policies: Vec<QosPolicy> = self.get_qos().await?.into_list("Get QoS information error.")?;

        let mut wanted = specs.clone();
        wanted
            .entry("LATENCY".to_string())
            .or_insert_with(|| "0".to_string());
        let prefix = &self.config().qos_name_prefix;

        let found = policies
            .into_iter()
            .filter(|policy| policy.matches_specs(&wanted))
            .find(|policy| policy.accepts_filesystems(prefix))
            .map(|policy| (policy.id, policy.fslist));

        if let Some((id, fs_list)) = &found {
            debug!("Reusing QoS policy {} holding {} filesystems", id, fs_list.len());
        }
        Ok(found)
    }

    /// Add a filesystem to a policy whose current members are `fs_list`
    pub async fn add_share_to_qos(&self, qos_id: &str, fs_id: &str, fs_list: &FsList) -> Result<()> {
        let mut members = fs_list.clone();
        members.push(fs_id);

        self.call_checked(
            &format!("/ioclass/{}", qos_id),
            Some(json!({ "FSLIST": members, "TYPE": 230, "ID": qos_id })),
            HttpMethod::Put,
            "Associate filesystem to Qos error.",
        )
        .await?;
        Ok(())
    }

    /// Create a policy for one filesystem, returning the policy ID
    pub async fn create_qos_policy(&self, specs: &QosSpecs, fs_id: &str) -> Result<String> {
        let timestamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        let name = format!("{}{}_{}", self.config().qos_name_prefix, fs_id, timestamp);

        let mut body = Map::new();
        body.insert("TYPE".into(), json!("230"));
        body.insert("NAME".into(), json!(name));
        body.insert("FSLIST".into(), json!([fs_id]));
        body.insert("CLASSTYPE".into(), json!("1"));
        body.insert("SCHEDULEPOLICY".into(), json!("1"));
        body.insert("SCHEDULESTARTTIME".into(), json!("1410969600"));
        body.insert("STARTTIME".into(), json!("00:00"));
        body.insert("DURATION".into(), json!("86400"));
        for (key, value) in specs {
            body.insert(key.clone(), json!(value));
        }

        let msg = "Create QoS policy error.";
        let data = self
            .call("/ioclass", Some(Value::Object(body)), HttpMethod::Post)
            .await?
            .assert_success(msg)?
            .assert_data(msg)?;
        let id = record_id(&data, msg)?;
        info!("Created QoS policy {} ({}) for filesystem {}", id, name, fs_id);
        Ok(id)
    }

    /// `enable` activates the policy, otherwise it is deactivated
    pub async fn activate_deactivate_qos(&self, qos_id: &str, enable: bool) -> Result<()> {
        self.call_checked(
            &format!("/ioclass/active/{}", qos_id),
            Some(json!({ "TYPE": 230, "ID": qos_id, "ENABLESTATUS": enable })),
            HttpMethod::Put,
            "Activate or deactivate QoS error.",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_qos_policy(&self, qos_id: &str) -> Result<()> {
        self.call_checked(
            &format!("/ioclass/{}", qos_id),
            Some(json!({ "TYPE": "230", "ID": qos_id })),
            HttpMethod::Delete,
            "Delete QoS policy error.",
        )
        .await?;
        info!("Deleted QoS policy {}", qos_id);
        Ok(())
    }

    /// QoS policy a filesystem belongs to, if any
    pub async fn get_qosid_by_fsid(&self, fs_id: &str) -> Result<Option<String>> {
        let data: Value = self
            .call_data(
                &format!("/filesystem/{}", fs_id),
                None,
                HttpMethod::Get,
                "Get QoS id by filesystem id error.",
            )
            .await?;
        Ok(field_str(&data, "IOCLASSID")
            .filter(|id| !id.is_empty())
            .map(str::to_string))
    }

    pub async fn get_fs_list_in_qos(&self, qos_id: &str) -> Result<FsList> {
        Ok(self.get_qos_info(qos_id).await?.fslist)
    }

    pub async fn get_qos_info(&self, qos_id: &str) -> Result<QosPolicy> {
        self.call_data(
            &format!("/ioclass/{}", qos_id),
            None,
            HttpMethod::Get,
            "Get QoS information error.",
        )
        .await
    }

    pub async fn remove_fs_from_qos(&self, fs_id: &str, fs_list: &FsList, qos_id: &str) -> Result<()> {
        // Unlike association, removal sends a plain JSON array
        let members: Vec<&str> = fs_list.iter().filter(|id| *id != fs_id).collect();

        self.call_checked(
            &format!("/ioclass/{}", qos_id),
            Some(json!({ "FSLIST": members, "TYPE": 230, "ID": qos_id })),
            HttpMethod::Put,
            "Remove filesystem from QoS error.",
        )
        .await?;
        Ok(())
    }
}
