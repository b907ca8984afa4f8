/// 单元测试用的内存版 SMTX OS 接口

use async_trait::async_trait;
use common::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::api::storage::root_parent_id;
use crate::api::{
    Job, JobResource, JobState, NfsExport, NfsInode, SmtxApi, StoragePolicy, Vds, Vlan, VlanId,
    Vm, VmSpec,
};

enum JobScript {
    State(JobState),
    Failed(String),
    Error(String),
}

#[derive(Default)]
pub struct FakeApi {
    vdses: Vec<Vds>,
    vlans: HashMap<String, Vec<Vlan>>,
    policies: Vec<StoragePolicy>,
    exports: Vec<NfsExport>,
    inodes: HashMap<(String, String), Vec<NfsInode>>,
    vm: Option<Vm>,
    created_vm_uuid: Option<String>,
    job_script: Mutex<VecDeque<JobScript>>,
    job_polls: Mutex<HashMap<String, usize>>,
    pub created: Mutex<Vec<VmSpec>>,
    pub ssh_keys: Mutex<Vec<(String, String)>>,
    /// 变更类调用记录，如 "start:vm-1"
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, uuid: &str, name: &str) -> Self {
        self.policies.push(StoragePolicy {
            uuid: uuid.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_vds(mut self, uuid: &str, name: &str, ovsbr_name: &str) -> Self {
        self.vdses.push(Vds {
            uuid: uuid.to_string(),
            name: name.to_string(),
            ovsbr_name: ovsbr_name.to_string(),
        });
        self
    }

    pub fn with_vlan(mut self, vds_uuid: &str, uuid: &str, name: &str, tag: i32) -> Self {
        self.vlans.entry(vds_uuid.to_string()).or_default().push(Vlan {
            vds_uuid: vds_uuid.to_string(),
            uuid: uuid.to_string(),
            name: name.to_string(),
            vlan_id: VlanId(tag),
        });
        self
    }

    pub fn with_export(mut self, id: &str, name: &str) -> Self {
        self.exports.push(NfsExport {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_inode(
        mut self,
        export_id: &str,
        parent_id: &str,
        id: &str,
        name: &str,
        shared_size: i64,
        unique_size: i64,
    ) -> Self {
        self.inodes
            .entry((export_id.to_string(), parent_id.to_string()))
            .or_default()
            .push(NfsInode {
                id: id.to_string(),
                name: name.to_string(),
                parent_id: parent_id.to_string(),
                shared_size,
                unique_size,
            });
        self
    }

    pub fn with_vm(mut self, vm: Vm) -> Self {
        self.vm = Some(vm);
        self
    }

    /// 创建任务完成后资源表中返回的虚拟机 UUID
    pub fn with_created_vm_uuid(mut self, uuid: &str) -> Self {
        self.created_vm_uuid = Some(uuid.to_string());
        self
    }

    /// 依次返回的任务状态，用完后一律返回 done
    pub fn with_job_states(self, states: &[JobState]) -> Self {
        self.job_script
            .lock()
            .unwrap()
            .extend(states.iter().copied().map(JobScript::State));
        self
    }

    pub fn with_failed_job(self, description: &str) -> Self {
        self.job_script
            .lock()
            .unwrap()
            .push_back(JobScript::Failed(description.to_string()));
        self
    }

    pub fn with_job_error(self, message: &str) -> Self {
        self.job_script
            .lock()
            .unwrap()
            .push_back(JobScript::Error(message.to_string()));
        self
    }

    pub fn job_polls(&self, id: &str) -> usize {
        self.job_polls.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String, job_id: &str) -> Result<Job> {
        self.calls.lock().unwrap().push(call);
        Ok(Job {
            job_id: job_id.to_string(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl SmtxApi for FakeApi {
    async fn get_vm(&self, uuid: &str) -> Result<Vm> {
        match &self.vm {
            Some(vm) if vm.uuid == uuid => Ok(vm.clone()),
            _ => Err(Error::Status("Not Found".to_string())),
        }
    }

    async fn create_vm(&self, spec: &VmSpec) -> Result<Job> {
        self.created.lock().unwrap().push(spec.clone());
        self.record(format!("create:{}", spec.vm_name), "job-create")
    }

    async fn start_vm(&self, uuid: &str) -> Result<Job> {
        self.record(format!("start:{}", uuid), "job-start")
    }

    async fn stop_vm(&self, uuid: &str) -> Result<Job> {
        self.record(format!("stop:{}", uuid), "job-stop")
    }

    async fn reboot_vm(&self, uuid: &str) -> Result<Job> {
        self.record(format!("reboot:{}", uuid), "job-reboot")
    }

    async fn delete_vm(&self, uuid: &str) -> Result<Job> {
        self.record(format!("delete:{}", uuid), "job-delete")
    }

    async fn set_vm_ssh_public_key(&self, vm_uuid: &str, ssh_public_key: &str) -> Result<()> {
        self.ssh_keys
            .lock()
            .unwrap()
            .push((vm_uuid.to_string(), ssh_public_key.to_string()));
        Ok(())
    }

    async fn list_vdses(&self) -> Result<Vec<Vds>> {
        Ok(self.vdses.clone())
    }

    async fn list_vlans(&self, vds_uuid: &str) -> Result<Vec<Vlan>> {
        Ok(self.vlans.get(vds_uuid).cloned().unwrap_or_default())
    }

    async fn list_storage_policies(&self) -> Result<Vec<StoragePolicy>> {
        Ok(self.policies.clone())
    }

    async fn list_nfs_exports(&self) -> Result<Vec<NfsExport>> {
        Ok(self.exports.clone())
    }

    async fn list_nfs_inodes(
        &self,
        export_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<NfsInode>> {
        let parent_id = parent_id.unwrap_or_else(|| root_parent_id(export_id));
        Ok(self
            .inodes
            .get(&(export_id.to_string(), parent_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_job(&self, id: &str) -> Result<Job> {
        *self.job_polls.lock().unwrap().entry(id.to_string()).or_default() += 1;

        let mut job = Job {
            job_id: id.to_string(),
            ..Default::default()
        };
        match self.job_script.lock().unwrap().pop_front() {
            Some(JobScript::State(state)) => job.state = state,
            Some(JobScript::Failed(description)) => {
                job.state = JobState::Failed;
                job.description = description;
            }
            Some(JobScript::Error(message)) => return Err(Error::Status(message)),
            None => job.state = JobState::Done,
        }

        if job.state == JobState::Done {
            if let Some(uuid) = &self.created_vm_uuid {
                job.resources = vec![
                    JobResource::Other,
                    JobResource::Vm { uuid: uuid.clone() },
                ];
            }
        }
        Ok(job)
    }
}
