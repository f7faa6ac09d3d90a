use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenancePagesResponse {
    #[serde(default)]
    pub pages: HashMap<String, bool>,
}
