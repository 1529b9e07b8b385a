// Shared mocks for integration tests

use std::sync::{Arc, Mutex};

use medipoldao_api::api::AppState;
use medipoldao_api::config::Config;
use medipoldao_api::core::errors::VerifyError;
use medipoldao_api::core::models::PendingVerification;
use medipoldao_api::core::traits::{MemberStore, Notifier};
use medipoldao_api::engine::VerificationEngine;

/// In-memory stand-in for the two Mongo collections.
#[derive(Default)]
pub struct MemoryStore {
    pub pending: Mutex<Vec<PendingVerification>>,
    pub verified: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl MemberStore for MemoryStore {
    async fn insert_pending(&self, record: &PendingVerification) -> Result<(), VerifyError> {
        if self.fail {
            return Err(VerifyError::Store("simulated store outage".to_string()));
        }
        self.pending.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_pending_by_code(
        &self,
        email: &str,
        otp: i32,
    ) -> Result<Option<PendingVerification>, VerifyError> {
        if self.fail {
            return Err(VerifyError::Store("simulated store outage".to_string()));
        }
        Ok(self
            .pending
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email == email && p.otp == otp)
            .cloned())
    }

    async fn find_pending_by_link(
        &self,
        magic_link: &str,
    ) -> Result<Option<PendingVerification>, VerifyError> {
        if self.fail {
            return Err(VerifyError::Store("simulated store outage".to_string()));
        }
        Ok(self
            .pending
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.magic_link == magic_link)
            .cloned())
    }

    async fn delete_pending_by_code(&self, email: &str, otp: i32) -> Result<(), VerifyError> {
        let mut pending = self.pending.lock().unwrap();
        if let Some(pos) = pending.iter().position(|p| p.email == email && p.otp == otp) {
            pending.remove(pos);
        }
        Ok(())
    }

    async fn delete_pending_by_link(&self, magic_link: &str) -> Result<(), VerifyError> {
        let mut pending = self.pending.lock().unwrap();
        if let Some(pos) = pending.iter().position(|p| p.magic_link == magic_link) {
            pending.remove(pos);
        }
        Ok(())
    }

    async fn insert_verified(&self, email: &str) -> Result<(), VerifyError> {
        self.verified.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn ping(&self) -> Result<(), VerifyError> {
        if self.fail {
            return Err(VerifyError::Store("simulated store outage".to_string()));
        }
        Ok(())
    }
}

/// Records every dispatch; optionally fails like a rejecting provider.
#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), VerifyError> {
        if self.fail {
            return Err(VerifyError::Provider("simulated rejection".to_string()));
        }
        self.sent.lock().unwrap().push((
            to.to_string(),
            subject.to_string(),
            html_body.to_string(),
        ));
        Ok(())
    }
}

pub fn create_test_app_state(
    store: Arc<MemoryStore>,
    notifier: Arc<MockNotifier>,
    config: Config,
) -> AppState {
    let config = Arc::new(config);
    let engine = Arc::new(VerificationEngine::new(
        store.clone(),
        notifier.clone(),
        config.accepted_domains.clone(),
        config.website_domain.clone(),
        config.otp_ttl_secs,
    ));

    AppState {
        engine,
        store,
        notifier,
        config,
    }
}
