/// SMTX OS Machine Driver - 命令行
///
/// 每次调用执行一个生命周期操作，机器信息在两次调用之间以 JSON 文件保存

mod store;

use clap::{Parser, Subcommand};
use smtxos::{Driver, DriverConfig};
use std::path::PathBuf;
use tracing::info;

use store::{read_ssh_public_key, MachineStore};

#[derive(Parser)]
#[command(name = "docker-machine-driver-smtxos")]
#[command(version)]
#[command(about = "Create and manage Docker hosts on SMTX OS")]
struct Cli {
    /// 机器名，同时作为虚拟机名
    #[arg(long, env = "MACHINE_NAME", global = true, default_value = "default")]
    machine_name: String,

    /// 机器信息保存目录
    #[arg(long, env = "MACHINE_STORAGE_PATH", global = true, default_value = ".")]
    store_path: PathBuf,

    /// 配置文件（TOML/JSON），环境变量 SMTXOS_* 会覆盖其中的值
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 创建并启动虚拟机
    Create {
        /// 注入到虚拟机的 SSH 公钥文件
        #[arg(long)]
        ssh_public_key: PathBuf,
    },
    /// 输出虚拟机 IP
    Ip,
    /// 输出 Docker 守护进程地址
    Url,
    /// 输出机器状态
    State,
    Start,
    /// 强制关机
    Stop,
    Kill,
    /// 强制重启
    Restart,
    /// 删除虚拟机及其卷
    Rm,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志，输出到 stderr 以免干扰命令结果
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .init();

    // 加载环境变量
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let cfg = DriverConfig::load(cli.config.as_deref())?;
    info!("✅ 配置加载成功: {}:{}", cfg.server, cfg.port);

    let store = MachineStore::new(&cli.store_path);
    let record = store.load(&cli.machine_name).await?;
    let mut driver = Driver::from_record(record);
    driver.set_config(cfg);

    match cli.command {
        Command::Create { ssh_public_key } => {
            let key = read_ssh_public_key(&ssh_public_key).await?;
            let result = driver.create(&key).await;
            // 即使创建中途失败，也保存已获得的虚拟机 UUID，便于后续 rm 清理
            store.save(driver.record()).await?;
            result?;
        }
        Command::Ip => println!("{}", driver.ip().await?),
        Command::Url => println!("{}", driver.url().await?),
        Command::State => println!("{}", driver.state().await?),
        Command::Start => driver.start().await?,
        Command::Stop => driver.stop().await?,
        Command::Kill => driver.kill().await?,
        Command::Restart => driver.restart().await?,
        Command::Rm => {
            driver.remove().await?;
            store.remove(&cli.machine_name).await?;
            info!("✅ 机器已删除: {}", cli.machine_name);
            return Ok(());
        }
    }

    store.save(driver.record()).await?;
    Ok(())
}
