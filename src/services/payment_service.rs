use crate::{
    database::{MongoDB, CONTESTS, PAYMENTS, USERS},
    models::{
        Contest, EnrichedPayment, InsertOutcome, Payment, PaymentResponse, PaymentStatus,
        RecordPaymentRequest, Role, SubmitTaskRequest, UpdateOutcome, User,
    },
    services::contest_service::{ensure_contest_owner, load_contest},
    utils::{error::AppError, ids::parse_object_id},
};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::Serialize;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentOutcome {
    pub payment_result: InsertOutcome,
    pub contest_result: UpdateOutcome,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WinnerOutcome {
    pub payment_result: UpdateOutcome,
    pub contest_result: UpdateOutcome,
}

/// Insert the payment row and bump the contest's participation counter
/// in one multi-document transaction; a failure between the two writes
/// can never leave the counter out of step with the rows.
pub async fn record_payment(
    db: &MongoDB,
    caller_email: &str,
    request: &RecordPaymentRequest,
) -> Result<RecordPaymentOutcome, AppError> {
    let contest_oid = parse_object_id(&request.contest_id)?;

    let payment = Payment {
        id: None,
        email: caller_email.to_string(),
        contest_id: request.contest_id.clone(),
        price: request.price,
        transaction_id: request.transaction_id.clone(),
        date: BsonDateTime::now(),
        status: PaymentStatus::Paid,
        task_submission: None,
    };

    let payments = db.collection::<Payment>(PAYMENTS);
    let contests = db.collection::<Contest>(CONTESTS);

    let mut session = db
        .client()
        .start_session()
        .await
        .map_err(AppError::database)?;
    session
        .start_transaction()
        .await
        .map_err(AppError::database)?;

    let insert_result = match payments.insert_one(&payment).session(&mut session).await {
        Ok(r) => r,
        Err(e) => {
            let _ = session.abort_transaction().await;
            return Err(AppError::database(e));
        }
    };

    let update_result = match contests
        .update_one(
            doc! { "_id": contest_oid },
            doc! { "$inc": { "participationCount": 1 } },
        )
        .session(&mut session)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            let _ = session.abort_transaction().await;
            return Err(AppError::database(e));
        }
    };

    if update_result.matched_count == 0 {
        let _ = session.abort_transaction().await;
        return Err(AppError::NotFound(format!(
            "contest {}",
            request.contest_id
        )));
    }

    session
        .commit_transaction()
        .await
        .map_err(AppError::database)?;

    log::info!(
        "Payment recorded: {} entered contest {} (tx {})",
        caller_email,
        request.contest_id,
        request.transaction_id
    );

    Ok(RecordPaymentOutcome {
        payment_result: InsertOutcome::inserted(
            insert_result
                .inserted_id
                .as_object_id()
                .map(|oid| oid.to_hex())
                .unwrap_or_default(),
        ),
        contest_result: UpdateOutcome::from_result(update_result),
    })
}

/// Pipeline for the self-payments listing: each payment joined with its
/// contest's display fields, newest first. The stored string contestId
/// is cast back to an ObjectId for the lookup.
pub fn build_my_payments_pipeline(email: &str) -> Vec<bson::Document> {
    vec![
        doc! { "$match": { "email": email } },
        doc! { "$lookup": {
            "from": "contests",
            "let": { "contestIdObj": { "$toObjectId": "$contestId" } },
            "pipeline": [
                { "$match": { "$expr": { "$eq": ["$_id", "$$contestIdObj"] } } }
            ],
            "as": "contestDetails",
        } },
        doc! { "$unwind": "$contestDetails" },
        doc! { "$project": {
            "_id": 1,
            "price": 1,
            "transactionId": 1,
            "date": 1,
            "status": 1,
            "contestId": 1,
            "taskSubmission": 1,
            "contestName": "$contestDetails.contestName",
            "contestType": "$contestDetails.contestType",
            "image": "$contestDetails.image",
            "prizeMoney": "$contestDetails.prizeMoney",
            "deadline": "$contestDetails.deadline",
        } },
        doc! { "$sort": { "_id": -1 } },
    ]
}

pub async fn my_payments(db: &MongoDB, email: &str) -> Result<Vec<EnrichedPayment>, AppError> {
    let collection = db.collection::<bson::Document>(PAYMENTS);

    let docs: Vec<bson::Document> = collection
        .aggregate(build_my_payments_pipeline(email))
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    docs.into_iter()
        .map(|d| bson::from_document(d).map_err(AppError::database))
        .collect()
}

async fn load_payment(db: &MongoDB, id: &str) -> Result<Payment, AppError> {
    let collection = db.collection::<Payment>(PAYMENTS);
    let oid = parse_object_id(id)?;

    collection
        .find_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("payment {}", id)))
}

/// Participant attaches the task submission to their own entry. The
/// deadline is advisory and not checked here. An entry that already won
/// cannot be pushed back to `submitted`.
pub async fn submit_task(
    db: &MongoDB,
    payment_id: &str,
    caller_email: &str,
    request: &SubmitTaskRequest,
) -> Result<UpdateOutcome, AppError> {
    let payment = load_payment(db, payment_id).await?;

    if payment.email != caller_email {
        return Err(AppError::Forbidden("forbidden access".to_string()));
    }
    if payment.status == PaymentStatus::Winner {
        return Err(AppError::InvalidRequest(
            "Entry has already been judged".to_string(),
        ));
    }

    let collection = db.collection::<Payment>(PAYMENTS);
    let result = collection
        .update_one(
            doc! { "_id": payment.id },
            doc! { "$set": {
                "taskSubmission": &request.task_submission,
                "status": PaymentStatus::Submitted.to_string(),
            } },
        )
        .await
        .map_err(AppError::database)?;

    Ok(UpdateOutcome::from_result(result))
}

/// Submitted entries for one contest, creator-of-that-contest or admin.
pub async fn submissions_for_contest(
    db: &MongoDB,
    contest_id: &str,
    caller_email: &str,
    role: Role,
) -> Result<Vec<PaymentResponse>, AppError> {
    let contest = load_contest(db, contest_id).await?;
    ensure_contest_owner(&contest, caller_email, role)?;

    let collection = db.collection::<Payment>(PAYMENTS);
    let payments: Vec<Payment> = collection
        .find(doc! { "contestId": contest_id, "status": "submitted" })
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    Ok(payments.into_iter().map(PaymentResponse::from).collect())
}

/// Submitted entries across every contest the creator owns.
pub async fn submissions_for_creator(
    db: &MongoDB,
    creator_email: &str,
) -> Result<Vec<PaymentResponse>, AppError> {
    let contests = db.collection::<Contest>(CONTESTS);

    let own: Vec<Contest> = contests
        .find(doc! { "creatorEmail": creator_email })
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    let ids: Vec<String> = own
        .into_iter()
        .filter_map(|c| c.id.map(|oid| oid.to_hex()))
        .collect();

    if ids.is_empty() {
        return Ok(vec![]);
    }

    let collection = db.collection::<Payment>(PAYMENTS);
    let payments: Vec<Payment> = collection
        .find(doc! { "contestId": { "$in": ids }, "status": "submitted" })
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    Ok(payments.into_iter().map(PaymentResponse::from).collect())
}

/// Filter matching the contest only while it is still unjudged. The
/// winner write goes through this filter, so when two picks race the
/// one that commits second matches nothing and aborts.
fn unjudged_contest_filter(contest: &Contest) -> bson::Document {
    doc! { "_id": contest.id, "winnerEmail": { "$exists": false } }
}

/// The shared judging write: flip the payment row to `winner` and stamp
/// the winner fields onto the contest, atomically.
async fn apply_winner(
    db: &MongoDB,
    contest: &Contest,
    payment_oid: ObjectId,
    winner_email: &str,
) -> Result<WinnerOutcome, AppError> {
    // Display fields come from the winner's profile when one exists.
    let users = db.collection::<User>(USERS);
    let winner_user = users
        .find_one(doc! { "email": winner_email })
        .await
        .map_err(AppError::database)?;
    let winner_name = winner_user.as_ref().and_then(|u| u.name.clone());
    let winner_photo = winner_user.as_ref().and_then(|u| u.photo.clone());

    let payments = db.collection::<Payment>(PAYMENTS);
    let contests = db.collection::<Contest>(CONTESTS);

    let mut session = db
        .client()
        .start_session()
        .await
        .map_err(AppError::database)?;
    session
        .start_transaction()
        .await
        .map_err(AppError::database)?;

    let payment_result = match payments
        .update_one(
            doc! { "_id": payment_oid },
            doc! { "$set": { "status": PaymentStatus::Winner.to_string() } },
        )
        .session(&mut session)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            let _ = session.abort_transaction().await;
            return Err(AppError::database(e));
        }
    };

    let contest_result = match contests
        .update_one(
            unjudged_contest_filter(contest),
            doc! { "$set": {
                "winnerEmail": winner_email,
                "winnerName": winner_name.as_deref(),
                "winnerPhoto": winner_photo.as_deref(),
            } },
        )
        .session(&mut session)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            let _ = session.abort_transaction().await;
            return Err(AppError::database(e));
        }
    };

    // A concurrent pick got in between the pre-check and this write;
    // rolling back also undoes the payment status flip above.
    if contest_result.matched_count == 0 {
        let _ = session.abort_transaction().await;
        return Err(AppError::InvalidRequest(
            "Contest already has a winner".to_string(),
        ));
    }

    session
        .commit_transaction()
        .await
        .map_err(AppError::database)?;

    log::info!(
        "Winner picked for contest '{}': {}",
        contest.contest_name,
        winner_email
    );

    Ok(WinnerOutcome {
        payment_result: UpdateOutcome::from_result(payment_result),
        contest_result: UpdateOutcome::from_result(contest_result),
    })
}

fn ensure_no_winner_yet(contest: &Contest) -> Result<(), AppError> {
    if contest.winner_email.is_some() {
        Err(AppError::InvalidRequest(
            "Contest already has a winner".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Judge by payment id: the entry names its contest, which must belong
/// to the caller.
pub async fn mark_winner_by_payment(
    db: &MongoDB,
    payment_id: &str,
    caller_email: &str,
    role: Role,
) -> Result<WinnerOutcome, AppError> {
    let payment = load_payment(db, payment_id).await?;
    let contest = load_contest(db, &payment.contest_id).await?;
    ensure_contest_owner(&contest, caller_email, role)?;
    ensure_no_winner_yet(&contest)?;

    if payment.status != PaymentStatus::Submitted {
        return Err(AppError::InvalidRequest(
            "Only submitted entries can win".to_string(),
        ));
    }

    let payment_oid = payment
        .id
        .ok_or_else(|| AppError::Database("payment missing _id".to_string()))?;

    apply_winner(db, &contest, payment_oid, &payment.email).await
}

/// Judge by contest id plus the winner's email.
pub async fn pick_winner_for_contest(
    db: &MongoDB,
    contest_id: &str,
    winner_email: &str,
    caller_email: &str,
    role: Role,
) -> Result<WinnerOutcome, AppError> {
    let contest = load_contest(db, contest_id).await?;
    ensure_contest_owner(&contest, caller_email, role)?;
    ensure_no_winner_yet(&contest)?;

    let payments = db.collection::<Payment>(PAYMENTS);
    let payment = payments
        .find_one(doc! {
            "contestId": contest_id,
            "email": winner_email,
            "status": "submitted",
        })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "submitted entry of {} in contest {}",
                winner_email, contest_id
            ))
        })?;

    let payment_oid = payment
        .id
        .ok_or_else(|| AppError::Database("payment missing _id".to_string()))?;

    apply_winner(db, &contest, payment_oid, winner_email).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContestStatus, CreateContestRequest};
    use crate::services::{contest_service, stats_service};

    fn sample_contest(winner: Option<&str>) -> Contest {
        Contest {
            id: Some(ObjectId::new()),
            creator_email: "creator@x.com".into(),
            contest_name: "Logo sprint".into(),
            contest_type: "Design".into(),
            description: "d".into(),
            price: 10.0,
            prize_money: 100.0,
            task_instruction: "t".into(),
            deadline: "2026-12-31".into(),
            image: None,
            status: ContestStatus::Accepted,
            participation_count: 1,
            winner_email: winner.map(String::from),
            winner_name: None,
            winner_photo: None,
        }
    }

    #[test]
    fn test_single_winner_per_contest() {
        assert!(ensure_no_winner_yet(&sample_contest(None)).is_ok());
        assert!(ensure_no_winner_yet(&sample_contest(Some("p@x.com"))).is_err());
    }

    #[test]
    fn test_pipeline_shape() {
        let pipeline = build_my_payments_pipeline("p@x.com");
        assert_eq!(pipeline.len(), 5);
        assert_eq!(
            pipeline[0].get_document("$match").unwrap().get_str("email").unwrap(),
            "p@x.com"
        );

        // string contestId is cast for the join
        let lookup = pipeline[1].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), "contests");
        let let_doc = lookup.get_document("let").unwrap();
        assert_eq!(
            let_doc.get_document("contestIdObj").unwrap().get_str("$toObjectId").unwrap(),
            "$contestId"
        );

        // newest first
        let sort = pipeline[4].get_document("$sort").unwrap();
        assert_eq!(sort.get_i32("_id").unwrap(), -1);
    }

    #[test]
    fn test_winner_write_requires_unjudged_contest() {
        let contest = sample_contest(None);
        let filter = unjudged_contest_filter(&contest);

        assert_eq!(
            filter.get_object_id("_id").unwrap(),
            contest.id.unwrap()
        );
        // the predicate the transaction relies on under concurrent picks
        assert!(!filter
            .get_document("winnerEmail")
            .unwrap()
            .get_bool("$exists")
            .unwrap());
    }

    async fn live_db() -> MongoDB {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        MongoDB::new(&uri, "contestHubTest").await.unwrap()
    }

    fn itest_contest(contest_type: &str) -> CreateContestRequest {
        CreateContestRequest {
            contest_name: "Integration sprint".into(),
            contest_type: contest_type.to_string(),
            description: "itest".into(),
            price: 10.0,
            prize_money: 100.0,
            task_instruction: "t".into(),
            deadline: "2026-12-31".into(),
            image: None,
        }
    }

    async fn cleanup(db: &MongoDB, contest_id: &str, emails: &[&str]) {
        let oid = crate::utils::ids::parse_object_id(contest_id).unwrap();
        let _ = db
            .collection::<Contest>(CONTESTS)
            .delete_one(doc! { "_id": oid })
            .await;
        for email in emails {
            let _ = db
                .collection::<Payment>(PAYMENTS)
                .delete_many(doc! { "email": email })
                .await;
        }
    }

    #[tokio::test]
    #[ignore] // Requires a MongoDB replica set (transactions)
    async fn test_record_payment_bumps_participation() {
        let db = live_db().await;

        let outcome = contest_service::create_contest(
            &db,
            "judge@itest.com",
            &itest_contest("itest-payment"),
        )
        .await
        .unwrap();
        let contest_id = outcome.inserted_id.unwrap();

        let request = RecordPaymentRequest {
            contest_id: contest_id.clone(),
            price: 10.0,
            transaction_id: "pi_itest_record".into(),
        };
        record_payment(&db, "player@itest.com", &request)
            .await
            .unwrap();

        let contest = load_contest(&db, &contest_id).await.unwrap();
        assert_eq!(contest.participation_count, 1);

        cleanup(&db, &contest_id, &["player@itest.com"]).await;
    }

    #[tokio::test]
    #[ignore] // Requires a MongoDB replica set (transactions)
    async fn test_second_winner_pick_rejected() {
        let db = live_db().await;

        let outcome = contest_service::create_contest(
            &db,
            "judge@itest.com",
            &itest_contest("itest-winner"),
        )
        .await
        .unwrap();
        let contest_id = outcome.inserted_id.unwrap();

        for email in ["first@itest.com", "second@itest.com"] {
            let payment = Payment {
                id: None,
                email: email.into(),
                contest_id: contest_id.clone(),
                price: 10.0,
                transaction_id: format!("pi_itest_{}", email),
                date: BsonDateTime::now(),
                status: PaymentStatus::Submitted,
                task_submission: Some("work".into()),
            };
            db.collection::<Payment>(PAYMENTS)
                .insert_one(&payment)
                .await
                .unwrap();
        }

        pick_winner_for_contest(
            &db,
            &contest_id,
            "first@itest.com",
            "judge@itest.com",
            Role::Creator,
        )
        .await
        .unwrap();

        // a contest accepts exactly one winner
        let second = pick_winner_for_contest(
            &db,
            &contest_id,
            "second@itest.com",
            "judge@itest.com",
            Role::Creator,
        )
        .await;
        assert!(matches!(second, Err(AppError::InvalidRequest(_))));

        let stats = stats_service::winning_stats(&db, "first@itest.com")
            .await
            .unwrap();
        assert_eq!(stats.total_wins, 1);
        let losing = stats_service::winning_stats(&db, "second@itest.com")
            .await
            .unwrap();
        assert_eq!(losing.total_wins, 0);

        cleanup(
            &db,
            &contest_id,
            &["first@itest.com", "second@itest.com"],
        )
        .await;
    }
}
