/// 网络解析
///
/// 遍历所有 VDS 下的 VLAN，按名称匹配，第一个命中者生效

use common::{Error, Result};
use tracing::debug;

use crate::api::{SmtxApi, VmNic, VmNicVlan};

/// 将网络名解析为虚拟网卡配置
pub async fn resolve_network(api: &dyn SmtxApi, name: &str) -> Result<VmNic> {
    for vds in api.list_vdses().await? {
        let vlan = api
            .list_vlans(&vds.uuid)
            .await?
            .into_iter()
            .find(|v| v.name == name);

        if let Some(vlan) = vlan {
            debug!(
                "网络 {} -> vds={} vlan={} tag={}",
                name,
                vds.name,
                vlan.uuid,
                vlan.vlan_id.value()
            );
            return Ok(VmNic {
                ovs: vds.ovsbr_name,
                vlan_uuid: vlan.uuid,
                vlans: vec![VmNicVlan {
                    vlan_id: vlan.vlan_id,
                }],
            });
        }
    }

    Err(Error::not_found("network", name))
}
