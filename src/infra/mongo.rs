// MongoDB-backed credential store for the pending and verified collections

use mongodb::bson::doc;
use mongodb::{Client, Collection};
use tracing::info;

use crate::core::errors::VerifyError;
use crate::core::models::{PendingVerification, VerifiedMember};
use crate::core::traits::MemberStore;

const DATABASE_NAME: &str = "users";
const PENDING_COLLECTION: &str = "users-unverified";
const VERIFIED_COLLECTION: &str = "users-verified";

/// Single store implementation over both credential collections.
///
/// Exact-match point lookups only. There is no transaction across the two
/// collections: the consume path's delete-then-insert is two independent
/// single-document operations.
pub struct MongoMemberStore {
    client: Client,
    pending: Collection<PendingVerification>,
    verified: Collection<VerifiedMember>,
}

impl MongoMemberStore {
    /// Connect and verify the connection with a ping before returning.
    pub async fn new(connection_string: &str) -> Result<Self, VerifyError> {
        let client = Client::with_uri_str(connection_string)
            .await
            .map_err(|e| VerifyError::Store(format!("MongoDB connection failed: {}", e)))?;

        let db = client.database(DATABASE_NAME);
        let store = Self {
            pending: db.collection(PENDING_COLLECTION),
            verified: db.collection(VERIFIED_COLLECTION),
            client,
        };

        store.ping().await?;
        info!("Connected to MongoDB");

        Ok(store)
    }
}

#[async_trait::async_trait]
impl MemberStore for MongoMemberStore {
    async fn insert_pending(&self, record: &PendingVerification) -> Result<(), VerifyError> {
        self.pending
            .insert_one(record, None)
            .await
            .map_err(|e| VerifyError::Store(format!("Failed to insert pending record: {}", e)))?;
        Ok(())
    }

    async fn find_pending_by_code(
        &self,
        email: &str,
        otp: i32,
    ) -> Result<Option<PendingVerification>, VerifyError> {
        self.pending
            .find_one(doc! { "email": email, "otp": otp }, None)
            .await
            .map_err(|e| VerifyError::Store(format!("Pending lookup by code failed: {}", e)))
    }

    async fn find_pending_by_link(
        &self,
        magic_link: &str,
    ) -> Result<Option<PendingVerification>, VerifyError> {
        self.pending
            .find_one(doc! { "magic_link": magic_link }, None)
            .await
            .map_err(|e| VerifyError::Store(format!("Pending lookup by link failed: {}", e)))
    }

    async fn delete_pending_by_code(&self, email: &str, otp: i32) -> Result<(), VerifyError> {
        self.pending
            .delete_one(doc! { "email": email, "otp": otp }, None)
            .await
            .map_err(|e| VerifyError::Store(format!("Failed to delete pending record: {}", e)))?;
        Ok(())
    }

    async fn delete_pending_by_link(&self, magic_link: &str) -> Result<(), VerifyError> {
        self.pending
            .delete_one(doc! { "magic_link": magic_link }, None)
            .await
            .map_err(|e| VerifyError::Store(format!("Failed to delete pending record: {}", e)))?;
        Ok(())
    }

    async fn insert_verified(&self, email: &str) -> Result<(), VerifyError> {
        let member = VerifiedMember {
            email: email.to_string(),
        };
        self.verified
            .insert_one(&member, None)
            .await
            .map_err(|e| VerifyError::Store(format!("Failed to insert verified member: {}", e)))?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), VerifyError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| VerifyError::Store(format!("MongoDB ping failed: {}", e)))?;
        Ok(())
    }
}
