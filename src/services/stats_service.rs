use crate::{
    database::{MongoDB, CONTESTS, PAYMENTS, USERS},
    models::{AdminStats, LeaderboardEntry, WinningStats},
    utils::error::AppError,
};
use futures::TryStreamExt;
use mongodb::bson::{self, doc};

/// Cap on the public leaderboard.
const LEADERBOARD_LIMIT: i32 = 10;

/// Winners grouped by participant email with a win count, joined with
/// the user's display name/photo, sorted by wins descending.
pub fn build_leaderboard_pipeline() -> Vec<bson::Document> {
    vec![
        doc! { "$match": { "status": "winner" } },
        doc! { "$group": { "_id": "$email", "winCount": { "$sum": 1 } } },
        doc! { "$lookup": {
            "from": "users",
            "localField": "_id",
            "foreignField": "email",
            "as": "userInfo",
        } },
        doc! { "$unwind": "$userInfo" },
        doc! { "$project": {
            "_id": 1,
            "winCount": 1,
            "name": "$userInfo.name",
            "photo": "$userInfo.photo",
        } },
        doc! { "$sort": { "winCount": -1 } },
        doc! { "$limit": LEADERBOARD_LIMIT },
    ]
}

pub async fn leaderboard(db: &MongoDB) -> Result<Vec<LeaderboardEntry>, AppError> {
    let collection = db.collection::<bson::Document>(PAYMENTS);

    let docs: Vec<bson::Document> = collection
        .aggregate(build_leaderboard_pipeline())
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    docs.into_iter()
        .map(|d| bson::from_document(d).map_err(AppError::database))
        .collect()
}

/// Entry/win counts for one participant.
pub async fn winning_stats(db: &MongoDB, email: &str) -> Result<WinningStats, AppError> {
    let collection = db.collection::<bson::Document>(PAYMENTS);

    let total_participated = collection
        .count_documents(doc! { "email": email })
        .await
        .map_err(AppError::database)?;

    let total_wins = collection
        .count_documents(doc! { "email": email, "status": "winner" })
        .await
        .map_err(AppError::database)?;

    Ok(WinningStats {
        total_wins,
        total_participated,
    })
}

/// Platform-wide counters plus total collected entry fees.
pub async fn admin_stats(db: &MongoDB) -> Result<AdminStats, AppError> {
    let users = db
        .collection::<bson::Document>(USERS)
        .estimated_document_count()
        .await
        .map_err(AppError::database)?;
    let contests = db
        .collection::<bson::Document>(CONTESTS)
        .estimated_document_count()
        .await
        .map_err(AppError::database)?;

    let payments_collection = db.collection::<bson::Document>(PAYMENTS);
    let payments = payments_collection
        .estimated_document_count()
        .await
        .map_err(AppError::database)?;

    let revenue_docs: Vec<bson::Document> = payments_collection
        .aggregate(vec![doc! {
            "$group": { "_id": null, "totalRevenue": { "$sum": "$price" } }
        }])
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    let revenue = revenue_docs
        .first()
        .and_then(|d| d.get("totalRevenue"))
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    Ok(AdminStats {
        users,
        contests,
        payments,
        revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_pipeline_shape() {
        let pipeline = build_leaderboard_pipeline();
        assert_eq!(pipeline.len(), 7);

        // only winners feed the board
        assert_eq!(
            pipeline[0]
                .get_document("$match")
                .unwrap()
                .get_str("status")
                .unwrap(),
            "winner"
        );

        // grouped by participant email
        assert_eq!(
            pipeline[1].get_document("$group").unwrap().get_str("_id").unwrap(),
            "$email"
        );

        // descending by wins, capped
        assert_eq!(
            pipeline[5]
                .get_document("$sort")
                .unwrap()
                .get_i32("winCount")
                .unwrap(),
            -1
        );
        assert_eq!(pipeline[6].get_i32("$limit").unwrap(), 10);
    }
}
