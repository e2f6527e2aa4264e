//! 健康检查：并发探测三个后端服务。
//!
//! Health checks. Failures never propagate; an unreachable service is `false`.

use crate::client::core::{Service, VoiceClient};
use crate::transport::RequestDescriptor;
use serde::Serialize;
use tracing::debug;

const HEALTH_PATH: &str = "/health";

/// Reachability of each backing service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub translation: bool,
    pub stt: bool,
    pub tts: bool,
}

impl HealthStatus {
    pub fn get(&self, service: Service) -> bool {
        match service {
            Service::Translation => self.translation,
            Service::Stt => self.stt,
            Service::Tts => self.tts,
        }
    }

    pub fn all_healthy(&self) -> bool {
        self.translation && self.stt && self.tts
    }
}

impl VoiceClient {
    /// Probe all three services concurrently.
    pub async fn health_check(&self) -> HealthStatus {
        let (translation, stt, tts) = tokio::join!(
            self.check_service(Service::Translation),
            self.check_service(Service::Stt),
            self.check_service(Service::Tts),
        );
        HealthStatus {
            translation,
            stt,
            tts,
        }
    }

    /// Single probe with the health deadline and no retries.
    pub async fn check_service(&self, service: Service) -> bool {
        let descriptor = RequestDescriptor::get(self.endpoint(service, HEALTH_PATH))
            .with_timeout(self.config.health_timeout)
            .with_retries(0);
        match self.transport.invoke_raw(&descriptor).await {
            Ok(_) => true,
            Err(e) => {
                debug!(service = %service, error = %e, "health check failed");
                false
            }
        }
    }
}
