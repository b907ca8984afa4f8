/// 虚拟分布式交换机（VDS）与 VLAN

use common::Result;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::client::SmtxClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vds {
    pub uuid: String,
    pub name: String,
    /// 承载该交换机的 OVS 网桥名
    #[serde(default)]
    pub ovsbr_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vlan {
    #[serde(default)]
    pub vds_uuid: String,
    pub uuid: String,
    pub name: String,
    pub vlan_id: VlanId,
}

/// VLAN 标签
///
/// 后端不同版本会把 vlan_id 编码为字符串、整数或浮点数，统一规整为 i32
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VlanId(pub i32);

impl VlanId {
    pub fn value(self) -> i32 {
        self.0
    }

    fn from_json(value: &Value) -> std::result::Result<Self, String> {
        let id = match value {
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("invalid vlan_id '{}': {}", s, e))?,
            Value::Number(n) => match n.as_i64() {
                Some(i) => i,
                None => n
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
                    .ok_or_else(|| format!("invalid vlan_id {}", n))?,
            },
            _ => return Err("unsupported type of vlan_id".to_string()),
        };

        i32::try_from(id)
            .map(VlanId)
            .map_err(|_| format!("vlan_id {} out of range", id))
    }
}

impl<'de> Deserialize<'de> for VlanId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        VlanId::from_json(&value).map_err(de::Error::custom)
    }
}

impl Serialize for VlanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.0)
    }
}

#[derive(Deserialize)]
struct VlanList {
    #[serde(default, deserialize_with = "super::null_default")]
    entities: Vec<Vlan>,
}

impl SmtxClient {
    pub async fn list_vdses(&self) -> Result<Vec<Vds>> {
        let vdses: Option<Vec<Vds>> = self.get("/v2/network/vds", &[]).await?;
        Ok(vdses.unwrap_or_default())
    }

    pub async fn list_vlans(&self, vds_uuid: &str) -> Result<Vec<Vlan>> {
        let list: Option<VlanList> = self
            .get(&format!("/v2/network/vds/{}/vlans", vds_uuid), &[])
            .await?;
        Ok(list.map(|l| l.entities).unwrap_or_default())
    }
}
