use anyhow::{bail, Result};
use std::path::PathBuf;
use wizdom_question_gen::utils::logging;
use wizdom_question_gen::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 解析命令行参数
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        bail!("用法: {} <文档路径> <战役ID> <用户ID>", args[0]);
    }
    let document_path = PathBuf::from(&args[1]);
    let campaign_id: i64 = args[2].parse()?;
    let user_id: i64 = args[3].parse()?;

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let app = App::initialize(config)?;
    let summary = app.run(&document_path, campaign_id, user_id).await?;

    if summary.partial {
        tracing::warn!(
            "会话提前中止，仅提交了 {} 条题目",
            summary.submitted
        );
    }

    Ok(())
}
