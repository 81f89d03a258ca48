use crate::{
    database::{MongoDB, CONTESTS},
    models::{
        Contest, ContestPage, ContestResponse, ContestStatus, CreateContestRequest, DeleteOutcome,
        InsertOutcome, Role, UpdateContestRequest, UpdateOutcome,
    },
    utils::{error::AppError, ids::parse_object_id},
};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};

/// Cap on the public "popular contests" strip.
const POPULAR_LIMIT: i64 = 6;

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Filter for the public listing. Only accepted contests are ever
/// visible; `search` is a case-insensitive substring match on the
/// contest type, and an exact `type` (other than the `All` sentinel)
/// overrides the search regex.
pub fn build_public_filter(search: Option<&str>, contest_type: Option<&str>) -> Document {
    let mut filter = doc! { "status": "accepted" };

    if let Some(search) = search.filter(|s| !s.is_empty()) {
        filter.insert("contestType", doc! { "$regex": search, "$options": "i" });
    }
    if let Some(contest_type) = contest_type.filter(|t| !t.is_empty() && *t != "All") {
        filter.insert("contestType", contest_type);
    }

    filter
}

pub async fn create_contest(
    db: &MongoDB,
    creator_email: &str,
    request: &CreateContestRequest,
) -> Result<InsertOutcome, AppError> {
    let collection = db.collection::<Contest>(CONTESTS);

    let contest = Contest {
        id: None,
        creator_email: creator_email.to_string(),
        contest_name: request.contest_name.clone(),
        contest_type: request.contest_type.clone(),
        description: request.description.clone(),
        price: request.price,
        prize_money: request.prize_money,
        task_instruction: request.task_instruction.clone(),
        deadline: request.deadline.clone(),
        image: request.image.clone(),
        status: ContestStatus::Pending,
        participation_count: 0,
        winner_email: None,
        winner_name: None,
        winner_photo: None,
    };

    let result = collection
        .insert_one(&contest)
        .await
        .map_err(AppError::database)?;

    let inserted_id = result
        .inserted_id
        .as_object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_default();

    log::info!(
        "Contest '{}' created by {} (pending moderation)",
        request.contest_name,
        creator_email
    );

    Ok(InsertOutcome::inserted(inserted_id))
}

/// Public listing: accepted contests only, filtered and paginated,
/// returning the page slice together with the total match count.
pub async fn list_public(
    db: &MongoDB,
    page: i64,
    size: i64,
    search: Option<&str>,
    contest_type: Option<&str>,
) -> Result<ContestPage, AppError> {
    let collection = db.collection::<Contest>(CONTESTS);
    let filter = build_public_filter(search, contest_type);

    let total = collection
        .count_documents(filter.clone())
        .await
        .map_err(AppError::database)?;

    let contests: Vec<Contest> = collection
        .find(filter)
        .skip((page * size) as u64)
        .limit(size)
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    Ok(ContestPage {
        result: contests.into_iter().map(ContestResponse::from).collect(),
        total,
    })
}

/// Top accepted contests by participation count, descending.
pub async fn popular(db: &MongoDB) -> Result<Vec<ContestResponse>, AppError> {
    let collection = db.collection::<Contest>(CONTESTS);

    let contests: Vec<Contest> = collection
        .find(doc! { "status": "accepted" })
        .sort(doc! { "participationCount": -1 })
        .limit(POPULAR_LIMIT)
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    Ok(contests.into_iter().map(ContestResponse::from).collect())
}

pub async fn get_contest(db: &MongoDB, id: &str) -> Result<Option<ContestResponse>, AppError> {
    let collection = db.collection::<Contest>(CONTESTS);
    let oid = parse_object_id(id)?;

    let contest = collection
        .find_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?;

    Ok(contest.map(ContestResponse::from))
}

/// Load a contest or fail with 404. For routes that cannot proceed
/// without the row (status transitions, winner picks).
pub async fn load_contest(db: &MongoDB, id: &str) -> Result<Contest, AppError> {
    let collection = db.collection::<Contest>(CONTESTS);
    let oid = parse_object_id(id)?;

    collection
        .find_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("contest {}", id)))
}

/// Resource ownership: creators act on their own contests, admins on
/// any.
pub fn ensure_contest_owner(contest: &Contest, email: &str, role: Role) -> Result<(), AppError> {
    if role.is_admin() || contest.creator_email == email {
        Ok(())
    } else {
        Err(AppError::Forbidden("forbidden access".to_string()))
    }
}

pub async fn creator_contests(
    db: &MongoDB,
    email: &str,
) -> Result<Vec<ContestResponse>, AppError> {
    let collection = db.collection::<Contest>(CONTESTS);

    let contests: Vec<Contest> = collection
        .find(doc! { "creatorEmail": email })
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    Ok(contests.into_iter().map(ContestResponse::from).collect())
}

/// Whitelist replace of the editable fields.
pub async fn update_contest(
    db: &MongoDB,
    id: &str,
    caller_email: &str,
    role: Role,
    request: &UpdateContestRequest,
) -> Result<UpdateOutcome, AppError> {
    let contest = load_contest(db, id).await?;
    ensure_contest_owner(&contest, caller_email, role)?;

    let collection = db.collection::<Contest>(CONTESTS);
    let result = collection
        .update_one(
            doc! { "_id": contest.id },
            doc! { "$set": {
                "contestName": &request.contest_name,
                "image": request.image.as_deref(),
                "contestType": &request.contest_type,
                "description": &request.description,
                "price": request.price,
                "prizeMoney": request.prize_money,
                "taskInstruction": &request.task_instruction,
                "deadline": &request.deadline,
            } },
        )
        .await
        .map_err(AppError::database)?;

    Ok(UpdateOutcome::from_result(result))
}

pub async fn delete_contest(
    db: &MongoDB,
    id: &str,
    caller_email: &str,
    role: Role,
) -> Result<DeleteOutcome, AppError> {
    let contest = load_contest(db, id).await?;
    ensure_contest_owner(&contest, caller_email, role)?;

    let collection = db.collection::<Contest>(CONTESTS);
    let result = collection
        .delete_one(doc! { "_id": contest.id })
        .await
        .map_err(AppError::database)?;

    log::info!("Contest {} deleted by {}", id, caller_email);

    Ok(DeleteOutcome {
        deleted_count: result.deleted_count,
    })
}

/// Admin list, no status filter.
pub async fn list_all(db: &MongoDB) -> Result<Vec<ContestResponse>, AppError> {
    let collection = db.collection::<Contest>(CONTESTS);

    let contests: Vec<Contest> = collection
        .find(doc! {})
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    Ok(contests.into_iter().map(ContestResponse::from).collect())
}

/// Moderation transition. The target status must parse and the
/// transition must be in the allowed table.
pub async fn set_status(
    db: &MongoDB,
    id: &str,
    status: &str,
) -> Result<UpdateOutcome, AppError> {
    let next: ContestStatus = status
        .parse()
        .map_err(AppError::InvalidRequest)?;

    let contest = load_contest(db, id).await?;

    if !contest.status.can_transition_to(next) {
        return Err(AppError::InvalidRequest(format!(
            "Illegal status transition: {} -> {}",
            contest.status, next
        )));
    }

    let collection = db.collection::<Contest>(CONTESTS);
    let result = collection
        .update_one(
            doc! { "_id": contest.id },
            doc! { "$set": { "status": next.to_string() } },
        )
        .await
        .map_err(AppError::database)?;

    log::info!("Contest {} moderated: {} -> {}", id, contest.status, next);

    Ok(UpdateOutcome::from_result(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_filter_always_accepted() {
        let filter = build_public_filter(None, None);
        assert_eq!(filter.get_str("status").unwrap(), "accepted");
        assert!(filter.get("contestType").is_none());
    }

    #[test]
    fn test_public_filter_search_regex() {
        let filter = build_public_filter(Some("design"), None);
        let regex = filter.get_document("contestType").unwrap();
        assert_eq!(regex.get_str("$regex").unwrap(), "design");
        assert_eq!(regex.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_public_filter_all_means_no_type_filter() {
        let filter = build_public_filter(None, Some("All"));
        assert!(filter.get("contestType").is_none());
    }

    #[test]
    fn test_public_filter_exact_type_overrides_search() {
        let filter = build_public_filter(Some("des"), Some("Design"));
        assert_eq!(filter.get_str("contestType").unwrap(), "Design");
    }

    #[test]
    fn test_empty_strings_ignored() {
        let filter = build_public_filter(Some(""), Some(""));
        assert!(filter.get("contestType").is_none());
    }

    #[test]
    fn test_ownership_admin_bypass() {
        let contest = Contest {
            id: None,
            creator_email: "creator@x.com".into(),
            contest_name: "n".into(),
            contest_type: "t".into(),
            description: "d".into(),
            price: 1.0,
            prize_money: 2.0,
            task_instruction: "i".into(),
            deadline: "2026-12-31".into(),
            image: None,
            status: ContestStatus::Accepted,
            participation_count: 0,
            winner_email: None,
            winner_name: None,
            winner_photo: None,
        };

        assert!(ensure_contest_owner(&contest, "creator@x.com", Role::Creator).is_ok());
        assert!(ensure_contest_owner(&contest, "other@x.com", Role::Admin).is_ok());
        assert!(ensure_contest_owner(&contest, "other@x.com", Role::Creator).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires a running MongoDB
    async fn test_accept_transition_flips_public_visibility() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&uri, "contestHubTest").await.unwrap();

        // unique type keeps the assertions scoped to this test's row
        let contest_type = format!("itest-{}", mongodb::bson::oid::ObjectId::new().to_hex());
        let request = CreateContestRequest {
            contest_name: "Visibility check".into(),
            contest_type: contest_type.clone(),
            description: "itest".into(),
            price: 10.0,
            prize_money: 100.0,
            task_instruction: "t".into(),
            deadline: "2026-12-31".into(),
            image: None,
        };
        let outcome = create_contest(&db, "judge@itest.com", &request)
            .await
            .unwrap();
        let id = outcome.inserted_id.unwrap();

        // pending contests never reach the public listing
        let before = list_public(&db, 0, 10, None, Some(&contest_type))
            .await
            .unwrap();
        assert_eq!(before.total, 0);

        set_status(&db, &id, "accepted").await.unwrap();

        let after = list_public(&db, 0, 10, None, Some(&contest_type))
            .await
            .unwrap();
        assert_eq!(after.total, 1);
        assert_eq!(after.result[0].contest_type, contest_type);

        // accepted is terminal
        assert!(set_status(&db, &id, "rejected").await.is_err());

        let oid = crate::utils::ids::parse_object_id(&id).unwrap();
        let _ = db
            .collection::<Contest>(CONTESTS)
            .delete_one(doc! { "_id": oid })
            .await;
    }
}
