//! Array identity, remote devices and controllers

use crate::client::ArrayClient;
use crate::domain::ports::HttpMethod;
use crate::envelope::field_str;
use crate::error::Result;
use serde_json::Value;

impl ArrayClient {
    /// `/system/` record of the logged-in array
    pub async fn get_array_info(&self) -> Result<Value> {
        self.call_data("/system/", None, HttpMethod::Get, "Get array info error.")
            .await
    }

    pub async fn find_array_version(&self) -> Result<Option<String>> {
        let info = self.get_array_info().await?;
        Ok(field_str(&info, "PRODUCTVERSION").map(str::to_string))
    }

    pub async fn get_array_wwn(&self) -> Result<Option<String>> {
        let info = self.get_array_info().await?;
        Ok(field_str(&info, "wwn").map(str::to_string))
    }

    pub async fn get_all_remote_devices(&self) -> Result<Vec<Value>> {
        self.call_list("/remote_device", None, HttpMethod::Get, "Get all remote devices error.")
            .await
    }

    pub async fn get_remote_device_by_wwn(&self, wwn: &str) -> Result<Option<Value>> {
        Ok(self
            .get_all_remote_devices()
            .await?
            .into_iter()
            .find(|device| field_str(device, "WWN") == Some(wwn)))
    }

    pub async fn get_all_controllers(&self) -> Result<Vec<Value>> {
        self.call_list("/controller", None, HttpMethod::Get, "Get all controller error.")
            .await
    }

    /// Controller ID by location name (e.g. `CTE0.A`)
    pub async fn get_controller_by_name(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .get_all_controllers()
            .await?
            .iter()
            .find(|controller| field_str(controller, "LOCATION") == Some(name))
            .and_then(|controller| field_str(controller, "ID"))
            .map(str::to_string))
    }
}
