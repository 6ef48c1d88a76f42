use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::AppError;

/// 连接到浏览器并定位考试页面
///
/// 优先在已打开的标签页中按标题片段或 URL 前缀查找，找不到时新开页面导航过去
pub async fn connect_to_exam_page(
    port: u16,
    exam_url: &str,
    title_hint: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);
    debug!("考试页面 URL: {}, 标题片段: {:?}", exam_url, title_hint);

    let (browser, mut handler) = Browser::connect(&browser_url)
        .await
        .map_err(|e| AppError::browser_connection_failed(port, e))?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    // 先按标题片段查找
    if let Some(title) = title_hint {
        for p in pages.iter() {
            if let Ok(Some(page_title)) = p.get_title().await {
                debug!("检查页面标题: {}", page_title);
                if page_title.contains(title) {
                    info!("✓ 按标题找到考试页面: {}", page_title);
                    return Ok((browser, p.clone()));
                }
            }
        }
    }

    // 再按 URL 前缀查找
    let url_prefix = exam_url.split('#').next().unwrap_or(exam_url);
    for p in pages.iter() {
        if let Ok(Some(page_url)) = p.url().await {
            if page_url.starts_with(url_prefix) {
                info!("✓ 按 URL 找到考试页面: {}", page_url);
                return Ok((browser, p.clone()));
            }
        }
    }

    // 没有已打开的考试页面，新开一个并导航
    debug!("未找到已打开的考试页面，创建新页面并导航到: {}", exam_url);
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;
    page.goto(exam_url).await.map_err(|e| {
        error!("导航到 {} 失败: {}", exam_url, e);
        e
    })?;
    info!("已导航到: {}", exam_url);

    Ok((browser, page))
}
