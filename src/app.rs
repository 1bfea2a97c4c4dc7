use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use chrono::Utc;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{debug, error, info, warn};

use triage_api::create_app;
use triage_core::config::DoctorConfig;
use triage_core::AppConfig;
use triage_dispatcher::{DispatchService, QueueService, SameDepartmentStrategy};
use triage_infrastructure::{
    ChannelBroadcaster, InMemoryAppointmentRepository, InMemoryDoctorRepository,
    InMemoryEmergencyRepository, InMemoryQueueRepository, InMemoryRoadConditions,
};

/// 主应用程序
pub struct Application {
    config: AppConfig,
    queue_service: Arc<QueueService>,
    dispatch_service: Arc<DispatchService>,
    broadcaster: ChannelBroadcaster,
}

impl Application {
    /// 按配置装配内存存储、服务与事件通道
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序");

        let broadcaster = ChannelBroadcaster::new(config.observability.event_channel_capacity);

        let roster: Vec<_> = config
            .queue
            .doctors
            .iter()
            .map(DoctorConfig::to_availability)
            .collect();
        if roster.is_empty() {
            warn!("医生名册为空，所有挂号请求都将失败");
        } else {
            info!("载入医生名册: {} 位医生", roster.len());
        }

        let road_conditions = InMemoryRoadConditions::from_config(&config.routing.waypoints)
            .context("初始化路况表失败")?;
        info!("载入路网途经点: {} 个", road_conditions.len());

        let queue_service = Arc::new(QueueService::new(
            Arc::new(InMemoryQueueRepository::new()),
            Arc::new(InMemoryAppointmentRepository::new()),
            Arc::new(InMemoryDoctorRepository::with_doctors(roster)),
            Arc::new(broadcaster.clone()),
            Arc::new(SameDepartmentStrategy::new()),
            config.queue.clone(),
        ));

        let dispatch_service = Arc::new(DispatchService::new(
            Arc::new(InMemoryEmergencyRepository::new()),
            Arc::new(road_conditions),
            Arc::new(broadcaster.clone()),
            &config.routing,
        ));

        Ok(Self {
            config,
            queue_service,
            dispatch_service,
            broadcaster,
        })
    }

    pub fn queue_service(&self) -> Arc<QueueService> {
        Arc::clone(&self.queue_service)
    }

    pub fn dispatch_service(&self) -> Arc<DispatchService> {
        Arc::clone(&self.dispatch_service)
    }

    pub fn broadcaster(&self) -> &ChannelBroadcaster {
        &self.broadcaster
    }

    /// 构建完整的HTTP路由
    pub fn router(&self) -> Router {
        create_app(
            self.queue_service(),
            self.dispatch_service(),
            self.broadcaster.clone(),
            &self.config.api,
        )
    }

    /// 运行应用程序，直到收到关闭信号
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        info!("启动应用程序");

        let sweep_handle = {
            let service = self.queue_service();
            let interval = self.config.queue.missed_sweep_interval_seconds;
            let shutdown_rx = shutdown_rx.resubscribe();

            tokio::spawn(async move {
                run_missed_sweep_loop(service, interval, shutdown_rx).await;
            })
        };

        let result = if self.config.api.enabled {
            self.run_api(shutdown_rx).await
        } else {
            info!("API服务器已禁用");
            let mut shutdown_rx = shutdown_rx;
            let _ = shutdown_rx.recv().await;
            Ok(())
        };

        if let Err(e) = sweep_handle.await {
            error!("过号扫描任务异常退出: {}", e);
        }

        info!("应用程序已停止");
        result
    }

    async fn run_api(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let bind_address = &self.config.api.bind_address;
        info!("启动API服务器: {}", bind_address);

        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;

        info!("API服务器启动在 http://{}", bind_address);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        info!("API服务器已停止");
        Ok(())
    }
}

/// 周期性地把超过宽限期仍未叫号的患者标记为过号
pub async fn run_missed_sweep_loop(
    service: Arc<QueueService>,
    interval_seconds: u64,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match service.mark_missed(Utc::now()).await {
                    Ok(missed) if missed.is_empty() => debug!("过号扫描完成，无过号患者"),
                    Ok(missed) => info!("过号扫描完成，标记 {} 位患者过号", missed.len()),
                    Err(e) => error!("过号扫描失败: {}", e),
                }
            }
            _ = shutdown_rx.recv() => {
                info!("过号扫描循环收到关闭信号");
                break;
            }
        }
    }
}
