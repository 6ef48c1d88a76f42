use anyhow::Result;
use exam_answer_submit::config::Config;
use exam_answer_submit::orchestrator::App;
use exam_answer_submit::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::load()?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
