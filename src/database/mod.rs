use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const USERS: &str = "users";
pub const CONTESTS: &str = "contests";
pub const PAYMENTS: &str = "payments";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool tuning
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the hot queries depend on.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        log::info!("Creating database indexes...");

        // users(email) - every role guard does this lookup
        let users = self.collection::<mongodb::bson::Document>(USERS);
        let users_email_index = IndexModel::builder().keys(doc! { "email": 1 }).build();
        match users.create_index(users_email_index).await {
            Ok(_) => log::info!("   Index ready: users(email)"),
            Err(e) => log::debug!("   Index already exists: {}", e),
        }

        // contests(status, participationCount) - public listing + popular
        let contests = self.collection::<mongodb::bson::Document>(CONTESTS);
        let contests_status_index = IndexModel::builder()
            .keys(doc! { "status": 1, "participationCount": -1 })
            .build();
        match contests.create_index(contests_status_index).await {
            Ok(_) => log::info!("   Index ready: contests(status, participationCount)"),
            Err(e) => log::debug!("   Index already exists: {}", e),
        }

        // contests(creatorEmail) - creator dashboard
        let contests_creator_index = IndexModel::builder()
            .keys(doc! { "creatorEmail": 1 })
            .build();
        match contests.create_index(contests_creator_index).await {
            Ok(_) => log::info!("   Index ready: contests(creatorEmail)"),
            Err(e) => log::debug!("   Index already exists: {}", e),
        }

        // payments(email, status) - self payments, winning stats, leaderboard match
        let payments = self.collection::<mongodb::bson::Document>(PAYMENTS);
        let payments_email_index = IndexModel::builder()
            .keys(doc! { "email": 1, "status": 1 })
            .build();
        match payments.create_index(payments_email_index).await {
            Ok(_) => log::info!("   Index ready: payments(email, status)"),
            Err(e) => log::debug!("   Index already exists: {}", e),
        }

        // payments(contestId, status) - submission listings
        let payments_contest_index = IndexModel::builder()
            .keys(doc! { "contestId": 1, "status": 1 })
            .build();
        match payments.create_index(payments_contest_index).await {
            Ok(_) => log::info!("   Index ready: payments(contestId, status)"),
            Err(e) => log::debug!("   Index already exists: {}", e),
        }

        log::info!("Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();

        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&uri, "contestHubTest").await;
        assert!(db.is_ok());
    }
}
