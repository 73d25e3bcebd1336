use clap::Parser;
use edge_reports::core::pacing::{PacedClient, RateLimiter, TokioClock};
use edge_reports::domain::ports::ApiClient;
use edge_reports::utils::error::EtlError;
use edge_reports::utils::logger::{self, LogFormat};
use edge_reports::{
    build_jobs, CliConfig, EdgeGridClient, EdgeGridCredentials, LocalStorage, ReportSequence,
    ReportSettings, TomlConfig,
};
use std::sync::Arc;
use url::Url;

type SharedClient = Arc<dyn ApiClient>;

#[tokio::main]
async fn main() {
    // .env 只補上尚未設定的環境變數
    dotenvy::dotenv().ok();

    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(LogFormat::from_flag(cli.json_logs), cli.verbose);

    tracing::info!("🚀 Starting edge-reports");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(cli).await {
        Ok(()) => {
            tracing::info!("✅ All jobs completed successfully!");
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            std::process::exit(e.severity().exit_code());
        }
    }
}

async fn run(cli: CliConfig) -> edge_reports::Result<()> {
    let file_config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::default(),
    };

    // 驗證配置
    let settings = ReportSettings::resolve(&cli, file_config);
    settings.validate()?;
    tracing::info!(
        "🏷️ Account: {} (section [{}]), output directory: {}",
        settings.account_tag(),
        settings.section,
        settings.output_dir.display()
    );

    let client = if cli.command.requires_api() {
        Some(connect(&settings)?)
    } else {
        None
    };

    let storage = LocalStorage::new(settings.output_dir.clone());
    let jobs = build_jobs(&cli.command, &settings, client, storage.clone(), chrono::Utc::now())?;

    let mut sequence = ReportSequence::new(storage);
    let reports = sequence.run(&jobs).await?;

    for report in &reports {
        match &report.output {
            Some(path) => println!(
                "✅ {}: {} rows -> {}",
                report.job,
                report.written,
                path.display()
            ),
            None => println!("⚠️ {}: nothing written", report.job),
        }
        if report.failed > 0 {
            println!("   {} detail requests failed", report.failed);
        }
    }
    Ok(())
}

/// Credentials are loaded before any request so a bad .edgerc fails fast.
fn connect(settings: &ReportSettings) -> edge_reports::Result<SharedClient> {
    let credentials = EdgeGridCredentials::from_edgerc(&settings.edgerc_path, &settings.section)?;
    let mut client = EdgeGridClient::new(credentials, settings.request_timeout)?;
    if let Some(base_url) = &settings.base_url {
        let url = Url::parse(base_url).map_err(|e| EtlError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.clone(),
            reason: e.to_string(),
        })?;
        tracing::info!("🔀 Sending requests to {}", url);
        client = client.with_base_url(url);
    }

    tracing::info!("⏱️ Pacing requests {:?} apart", settings.pace_interval);
    let limiter = RateLimiter::new(settings.pace_interval, TokioClock);
    Ok(Arc::new(PacedClient::new(client, limiter)))
}
