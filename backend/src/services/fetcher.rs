use std::time::Duration;

use async_trait::async_trait;

use crate::utils::error::{AppError, Result};

/// 定时任务每次触发时执行的动作，返回处理的记录数
#[async_trait]
pub trait JobAction: Send + Sync {
    async fn run(&self) -> Result<usize>;
}

/// 从外部 API 拉取数据
pub struct HttpFetchAction {
    client: reqwest::Client,
    url: String,
}

impl HttpFetchAction {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl JobAction for HttpFetchAction {
    async fn run(&self) -> Result<usize> {
        tracing::info!("Fetching data from external API: {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!("Failed to fetch data, upstream returned {}", status);
            return Err(AppError::Upstream(format!(
                "upstream {} returned status {}",
                self.url, status
            )));
        }

        // 只统计记录数，不落库
        let records: Vec<serde_json::Value> = response.json().await?;
        tracing::info!("Fetched {} records.", records.len());

        Ok(records.len())
    }
}
