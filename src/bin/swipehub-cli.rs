//! SwipeHub CLI 客户端（测试版）
//!
//! 非交互式 CLI，用于测试和展示发现页与安全功能
//! 启动时通过命令行参数指定用户（token 或邮箱密码登录），执行一个子命令后退出

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use swipehub_sdk_core_rust::social::client::{ClientConfig, SwipeHubClient};
use swipehub_sdk_core_rust::social::connection::{ConnectionEvent, UserRole};
use swipehub_sdk_core_rust::social::discovery::{
    DiscoveryListener, StackStatus, SwipeAction, SwipeDirection,
};
use swipehub_sdk_core_rust::social::safety::{
    NotificationKind, SafetyListener, SafetyNotification, SafetySettingsPatch, REASONS,
};
use swipehub_sdk_core_rust::social::storage::SqliteStore;
use swipehub_sdk_core_rust::login_async;
use tracing::{error, info, warn};

/// SwipeHub CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "swipehub-cli")]
#[command(about = "SwipeHub CLI 客户端 - 用于测试发现页和安全功能", long_about = None)]
struct Args {
    /// HTTP API 基础地址（也可通过 SWIPEHUB_API_BASE_URL 设置）
    #[arg(long)]
    api_base_url: Option<String>,

    /// 本地 SQLite 数据库 URL（也可通过 SWIPEHUB_DB_URL 设置）
    #[arg(long)]
    db_url: Option<String>,

    /// 已有的认证 token（与 --user-id 一起使用时跳过登录）
    #[arg(long, requires = "user_id")]
    token: Option<String>,

    #[arg(long)]
    user_id: Option<String>,

    /// 登录邮箱
    #[arg(short, long, conflicts_with = "token")]
    email: Option<String>,

    #[arg(short, long, requires = "email")]
    password: Option<String>,

    /// 用户角色（使用 token 时生效，登录时以服务端返回为准）
    #[arg(long, value_enum, default_value = "member")]
    role: RoleArg,

    /// 日志级别（默认: info,swipehub_sdk_core_rust=debug）
    #[arg(long, default_value = "info,swipehub_sdk_core_rust=debug")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RoleArg {
    Member,
    Creator,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Member => UserRole::Member,
            RoleArg::Creator => UserRole::Creator,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SwipeArg {
    Pass,
    Like,
    Superlike,
}

impl From<SwipeArg> for SwipeDirection {
    fn from(arg: SwipeArg) -> Self {
        let action = match arg {
            SwipeArg::Pass => SwipeAction::Pass,
            SwipeArg::Like => SwipeAction::Like,
            SwipeArg::Superlike => SwipeAction::SuperLike,
        };
        action.into()
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 加载发现页并显示当前卡片
    Browse,
    /// 连续滑卡
    Swipe {
        #[arg(value_enum)]
        action: SwipeArg,
        #[arg(long, default_value = "1")]
        count: usize,
    },
    /// 屏蔽用户
    Block {
        user_id: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        details: Option<String>,
    },
    /// 解除屏蔽
    Unblock { user_id: String },
    /// 举报内容
    ReportContent {
        content_id: String,
        reason: String,
        #[arg(long)]
        details: Option<String>,
    },
    /// 举报用户
    ReportUser {
        user_id: String,
        reason: String,
        #[arg(long)]
        details: Option<String>,
    },
    /// 隐藏内容（仅本地）
    Hide {
        content_id: String,
        #[arg(long, default_value = "manual")]
        reason: String,
    },
    /// 取消隐藏
    Unhide { content_id: String },
    /// 查看或修改安全设置
    Settings {
        #[arg(long)]
        hide_reported_content: Option<bool>,
        #[arg(long)]
        verified_only: Option<bool>,
        #[arg(long)]
        filter_explicit: Option<bool>,
        #[arg(long)]
        min_creator_age: Option<u32>,
        #[arg(long)]
        auto_hide_on_report: Option<bool>,
        #[arg(long)]
        allow_direct_messages: Option<bool>,
        #[arg(long)]
        require_connection_for_messages: Option<bool>,
        #[arg(long)]
        show_safety_notifications: Option<bool>,
    },
    /// 恢复默认安全设置
    ResetSettings,
    /// 导出本地安全数据（JSON）
    Export,
    /// 列出举报/屏蔽原因
    Reasons,
}

/// 初始化日志（输出到 stderr，stdout 留给命令结果）
fn init_logger(log_level: &str) {
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .init();
}

struct CliSafetyListener;

#[async_trait::async_trait]
impl SafetyListener for CliSafetyListener {
    async fn on_notification(&self, notification: SafetyNotification) {
        match notification.kind {
            NotificationKind::Error => error!(
                "[CLI/Safety] ❌ {}: {}",
                notification.title, notification.message
            ),
            _ => info!(
                "[CLI/Safety] 🔔 {}: {}",
                notification.title, notification.message
            ),
        }
    }

    async fn on_persistence_failed(&self, key: String, error: String) {
        warn!("[CLI/Safety] 💾 本地保存失败 {}: {}", key, error);
    }
}

struct CliDiscoveryListener;

#[async_trait::async_trait]
impl DiscoveryListener for CliDiscoveryListener {
    async fn on_stack_changed(&self, status: StackStatus) {
        info!("[CLI/Discovery] 🔄 堆栈状态: {:?}", status);
    }

    async fn on_connection(&self, event: ConnectionEvent) {
        info!(
            "[CLI/Discovery] 💞 新配对: {} ({})",
            event.partner_id(),
            event.connection_type.as_tag()
        );
    }

    async fn on_unauthorized(&self) {
        error!("[CLI/Discovery] 🔐 token 已失效，请重新登录");
    }

    async fn on_swipe_failed(&self, candidate_id: String, action: SwipeAction, error: String) {
        warn!(
            "[CLI/Discovery] 滑卡上报失败 {} ({}): {}",
            candidate_id,
            action.as_str(),
            error
        );
    }
}

/// 根据参数得到用户ID、token 和角色（必要时登录）
async fn resolve_identity(args: &Args, api_base_url: &str) -> Result<(String, String, UserRole)> {
    if let (Some(token), Some(user_id)) = (&args.token, &args.user_id) {
        return Ok((user_id.clone(), token.clone(), args.role.into()));
    }
    let (Some(email), Some(password)) = (&args.email, &args.password) else {
        return Err(anyhow::anyhow!(
            "需要 --token 和 --user-id，或 --email 和 --password"
        ));
    };
    let data = login_async(api_base_url, email, password)
        .await
        .map_err(|e| anyhow::anyhow!("登录失败: {}", e))?;
    info!("[CLI] ✅ 登录成功！用户ID: {}", data.user.id);
    Ok((data.user.id, data.token, data.user.role))
}

fn print_cards(client: &SwipeHubClient) {
    let discovery = client.discovery();
    println!("状态: {:?}", discovery.status());
    for (i, card) in discovery.visible_cards().iter().enumerate() {
        println!(
            "{} {} | {} | 年龄: {} | 地点: {} | {}{}",
            if i == 0 { "▶" } else { " " },
            card.id,
            card.display_name,
            card.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
            card.location.as_deref().unwrap_or("-"),
            if card.is_verified { "已认证 " } else { "" },
            if card.is_online { "在线" } else { "" },
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);

    // 先读取环境变量，再用命令行参数覆盖
    let defaults =
        ClientConfig::new(String::new(), String::new(), UserRole::Member).from_env();
    let api_base_url = args
        .api_base_url
        .clone()
        .unwrap_or(defaults.api_base_url.clone());
    let db_url = args.db_url.clone().unwrap_or(defaults.db_url.clone());

    let (user_id, token, role) = resolve_identity(&args, &api_base_url).await?;

    let mut config = ClientConfig::new(user_id, token, role);
    config.api_base_url = api_base_url;
    config.db_url = db_url;

    info!("[CLI] 🔗 打开本地数据库: {}", config.db_url);
    let store = SqliteStore::connect(&config.db_url)
        .await
        .context("打开本地数据库失败")?;
    let client = SwipeHubClient::with_listeners(
        config,
        Arc::new(store),
        Arc::new(CliSafetyListener),
        Arc::new(CliDiscoveryListener),
    )
    .await
    .map_err(|e| anyhow::anyhow!("创建客户端失败: {}", e))?;
    let safety = client.safety();

    match args.command {
        Command::Browse => {
            client.discovery().load().await?;
            print_cards(&client);
        }
        Command::Swipe { action, count } => {
            let discovery = client.discovery();
            discovery.load().await?;
            for _ in 0..count {
                let Some(receipt) = discovery.swipe(action.into()).await else {
                    info!("[CLI] 没有可滑的卡片了");
                    break;
                };
                let candidate_id = receipt.candidate_id.clone();
                match receipt.connection().await {
                    Some(_) => {
                        if let Some(p) = discovery.connection_modal().presentation() {
                            println!("{} {} | {} | {}", p.icon, p.title, p.subtitle, p.description);
                        }
                        discovery.dismiss_connection();
                    }
                    None => println!("{} -> {:?}", candidate_id, action),
                }
            }
            print_cards(&client);
        }
        Command::Block {
            user_id,
            reason,
            details,
        } => {
            safety
                .block_user(&user_id, reason.as_deref(), details.as_deref())
                .await?;
            println!("已屏蔽: {}", user_id);
        }
        Command::Unblock { user_id } => {
            safety.unblock_user(&user_id).await?;
            println!("已解除屏蔽: {}", user_id);
        }
        Command::ReportContent {
            content_id,
            reason,
            details,
        } => {
            let receipt = safety
                .report_content(&content_id, &reason, details.as_deref())
                .await?;
            println!(
                "已举报内容: {} (举报ID: {})",
                content_id,
                receipt.report_id.as_deref().unwrap_or("-")
            );
        }
        Command::ReportUser {
            user_id,
            reason,
            details,
        } => {
            safety
                .report_user(&user_id, &reason, details.as_deref())
                .await?;
            println!("已举报用户: {}", user_id);
        }
        Command::Hide { content_id, reason } => {
            safety.hide_content(&content_id, &reason).await?;
            println!("已隐藏: {}", content_id);
        }
        Command::Unhide { content_id } => {
            safety.unhide_content(&content_id).await?;
            println!("已取消隐藏: {}", content_id);
        }
        Command::Settings {
            hide_reported_content,
            verified_only,
            filter_explicit,
            min_creator_age,
            auto_hide_on_report,
            allow_direct_messages,
            require_connection_for_messages,
            show_safety_notifications,
        } => {
            let patch = SafetySettingsPatch {
                hide_reported_content,
                verified_only,
                filter_explicit,
                min_creator_age,
                auto_hide_on_report,
                allow_direct_messages,
                require_connection_for_messages,
                show_safety_notifications,
            };
            let settings = safety.update_safety_settings(patch).await;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::ResetSettings => {
            let settings = safety.reset_safety_settings().await;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Export => {
            let export = safety.export_safety_data();
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
        Command::Reasons => {
            for reason in REASONS.iter() {
                println!(
                    "{:<22} {:<10} {}{}{}",
                    reason.code,
                    format!("{:?}", reason.severity),
                    reason.label,
                    if reason.requires_details { " [需说明]" } else { "" },
                    if reason.reportable { "" } else { " [仅屏蔽]" },
                );
            }
        }
    }

    info!("[CLI] 👋 程序退出");
    Ok(())
}
