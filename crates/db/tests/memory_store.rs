//! Behavioural tests for the in-memory repository backend.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use swing_core::competition::CompetitionStatus;
use swing_core::profile::Profile;
use swing_core::registration::RegistrationStatus;
use swing_db::models::competition::{Competition, CompetitionFilter, CreateCompetition};
use swing_db::models::notification::{CreateNotification, Notification};
use swing_db::models::prize::{CreatePrize, Prize};
use swing_db::models::registration::RegistrationFilter;
use swing_db::models::user::{CreateUser, UpdateUser, User};
use swing_db::models::vote::{CreateVote, Vote, VoteFilter};
use swing_db::{DbError, Store};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user(email: &str) -> User {
    User::new(CreateUser {
        google_id: Some(format!("g-{email}")),
        email: email.to_string(),
        name: "Test".to_string(),
        image: None,
        role: "model".to_string(),
    })
}

fn competition(status: CompetitionStatus, ends_in: Duration) -> Competition {
    let now = Utc::now();
    Competition::new(CreateCompetition {
        title: "Spring Showcase".to_string(),
        description: None,
        status: Some(status),
        start_date: now - Duration::days(1),
        end_date: now + ends_in,
        max_participants: None,
        cover_image: None,
    })
}

fn vote(model_id: &str, competition_id: Option<&str>, voter_id: &str, premium: bool) -> Vote {
    Vote::new(CreateVote {
        model_id: model_id.to_string(),
        competition_id: competition_id.map(str::to_string),
        voter_id: voter_id.to_string(),
        is_premium: premium,
        package_id: None,
    })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let store = Store::in_memory();
    store.users.insert(&user("a@test.com")).await.unwrap();

    let err = store.users.insert(&user("A@test.com")).await.unwrap_err();
    assert_matches!(err, DbError::Conflict(_));
}

#[tokio::test]
async fn update_and_profile_round_trip() {
    let store = Store::in_memory();
    let u = store.users.insert(&user("b@test.com")).await.unwrap();

    let updated = store
        .users
        .update(
            &u.id,
            &UpdateUser {
                onboarding_completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(updated.onboarding_completed);
    assert_eq!(updated.name, "Test");

    let profile = Profile {
        display_name: "Bee".to_string(),
        bio: "Bio".to_string(),
        ..Default::default()
    };
    let with_profile = store.users.set_profile(&u.id, &profile).await.unwrap().unwrap();
    assert_eq!(with_profile.profile().unwrap().display_name, "Bee");

    let found = store.users.find_by_google_id("g-b@test.com").await.unwrap();
    assert_eq!(found.map(|f| f.id), Some(u.id));
}

#[tokio::test]
async fn update_missing_user_returns_none() {
    let store = Store::in_memory();
    let result = store
        .users
        .update("missing", &UpdateUser::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn concurrent_profile_creates_keep_exactly_one() {
    let store = Store::in_memory();
    let u = store.users.insert(&user("c@test.com")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let users = store.users.clone();
        let id = u.id.clone();
        handles.push(tokio::spawn(async move {
            let profile = Profile {
                display_name: format!("Name {i}"),
                bio: "Bio".to_string(),
                ..Default::default()
            };
            users
                .create_profile(&id, &profile)
                .await
                .map(|created| created.map(|user| user.profile().cloned()))
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(Some(Some(profile))) => winners.push(profile),
            Ok(other) => panic!("unexpected result: {other:?}"),
            Err(err) => assert_matches!(err, DbError::Conflict(_)),
        }
    }
    assert_eq!(winners.len(), 1);

    let stored = store.users.find_by_id(&u.id).await.unwrap().unwrap();
    assert_eq!(stored.profile(), Some(&winners[0]));
}

#[tokio::test]
async fn create_profile_for_missing_user_returns_none() {
    let store = Store::in_memory();
    let created = store
        .users
        .create_profile("missing", &Profile::default())
        .await
        .unwrap();
    assert!(created.is_none());
}

// ---------------------------------------------------------------------------
// Competitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleting_a_competition_removes_its_children_but_not_votes() {
    let store = Store::in_memory();
    let doomed = store
        .competitions
        .insert(&competition(CompetitionStatus::Active, Duration::days(5)))
        .await
        .unwrap();
    let kept = store
        .competitions
        .insert(&competition(CompetitionStatus::Active, Duration::days(5)))
        .await
        .unwrap();
    for c in [&doomed, &kept] {
        store.registrations.register(&c.id, "m1").await.unwrap();
        store
            .prizes
            .insert(&Prize::new(CreatePrize {
                competition_id: c.id.clone(),
                title: "Crown".to_string(),
                description: None,
                placement: 1,
                value: None,
            }))
            .await
            .unwrap();
    }
    store
        .votes
        .insert(&vote("m1", Some(&doomed.id), "v1", false))
        .await
        .unwrap();

    assert!(store.delete_competition(&doomed.id).await.unwrap());
    assert!(!store.delete_competition(&doomed.id).await.unwrap());

    let registrations = store
        .registrations
        .list(&RegistrationFilter {
            model_id: Some("m1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].competition_id, kept.id);

    let prizes = store.prizes.list(None).await.unwrap();
    assert_eq!(prizes.len(), 1);
    assert_eq!(prizes[0].competition_id, kept.id);

    let votes = store
        .votes
        .count(&VoteFilter {
            competition_id: Some(doomed.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(votes, 1);
}

#[tokio::test]
async fn available_filter_excludes_inactive_and_expired() {
    let store = Store::in_memory();
    let open = competition(CompetitionStatus::Active, Duration::days(5));
    let expired = competition(CompetitionStatus::Active, Duration::seconds(-10));
    let upcoming = competition(CompetitionStatus::ComingSoon, Duration::days(5));
    for c in [&open, &expired, &upcoming] {
        store.competitions.insert(c).await.unwrap();
    }

    let available = store
        .competitions
        .list(&CompetitionFilter {
            available_at: Some(Utc::now()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, open.id);

    let all = store
        .competitions
        .list(&CompetitionFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_registration_is_rejected() {
    let store = Store::in_memory();

    let first = store.registrations.register("c1", "m1").await.unwrap();
    assert!(first.is_active());

    let second = store.registrations.register("c1", "m1").await;
    assert_matches!(second, Err(DbError::Conflict(_)));

    let active = store
        .registrations
        .list(&RegistrationFilter::active_in("c1"))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn withdraw_is_soft_and_allows_rejoining() {
    let store = Store::in_memory();
    let reg = store.registrations.register("c1", "m1").await.unwrap();

    let withdrawn = store.registrations.withdraw(&reg.id).await.unwrap().unwrap();
    assert_eq!(withdrawn.status, RegistrationStatus::Withdrawn.as_str());
    assert!(withdrawn.withdrawn_at.is_some());

    // Still stored.
    assert!(store.registrations.find_by_id(&reg.id).await.unwrap().is_some());

    store.registrations.register("c1", "m1").await.unwrap();
    let all = store
        .registrations
        .list(&RegistrationFilter {
            model_id: Some("m1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn concurrent_registrations_yield_one_active_row() {
    let store = Store::in_memory();
    let mut handles = Vec::new();
    for _ in 0..16 {
        let registrations = store.registrations.clone();
        handles.push(tokio::spawn(async move {
            registrations.register("c1", "m1").await.is_ok()
        }));
    }
    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn update_stats_overwrites_tally() {
    let store = Store::in_memory();
    let reg = store.registrations.register("c1", "m1").await.unwrap();
    let updated = store
        .registrations
        .update_stats(&reg.id, 42, 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.votes, 42);
    assert_eq!(updated.ranking, 3);
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tally_counts_per_model_within_competition() {
    let store = Store::in_memory();
    for v in [
        vote("m1", Some("c1"), "v1", false),
        vote("m1", Some("c1"), "v2", true),
        vote("m2", Some("c1"), "v1", false),
        vote("m2", Some("c2"), "v1", false),
        vote("m3", None, "v1", false),
    ] {
        store.votes.insert(&v).await.unwrap();
    }

    let tally = store.votes.tally("c1").await.unwrap();
    assert_eq!(tally.len(), 2);
    assert_eq!(tally[0].model_id, "m1");
    assert_eq!(tally[0].votes, 2);
    assert_eq!(tally[1].votes, 1);

    let premium = store
        .votes
        .count(&VoteFilter {
            is_premium: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(premium, 1);
}

#[tokio::test]
async fn last_vote_at_separates_free_and_premium() {
    let store = Store::in_memory();
    assert!(store.votes.last_vote_at("v1", "m1", false).await.unwrap().is_none());

    let free = store.votes.insert(&vote("m1", None, "v1", false)).await.unwrap();
    store.votes.insert(&vote("m1", None, "v1", true)).await.unwrap();

    assert_eq!(
        store.votes.last_vote_at("v1", "m1", false).await.unwrap(),
        Some(free.created_at)
    );
    assert!(store.votes.last_vote_at("v1", "m2", false).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notification_read_state() {
    let store = Store::in_memory();
    let mut ids = Vec::new();
    for i in 0..3 {
        let n = Notification::new(CreateNotification {
            user_id: "u1".to_string(),
            kind: "vote".to_string(),
            title: format!("Vote {i}"),
            message: "You received a vote".to_string(),
            link: None,
        });
        ids.push(store.notifications.insert(&n).await.unwrap().id);
    }

    assert_eq!(store.notifications.unread_count("u1").await.unwrap(), 3);
    assert!(store.notifications.mark_read(&ids[0], "u1").await.unwrap());
    // Already read, and wrong owner.
    assert!(!store.notifications.mark_read(&ids[0], "u1").await.unwrap());
    assert!(!store.notifications.mark_read(&ids[1], "u2").await.unwrap());

    let unread = store
        .notifications
        .list_for_user("u1", true, 50, 0)
        .await
        .unwrap();
    assert_eq!(unread.len(), 2);
    // Newest first.
    assert_eq!(unread[0].title, "Vote 2");

    assert_eq!(store.notifications.mark_all_read("u1").await.unwrap(), 2);
    assert_eq!(store.notifications.unread_count("u1").await.unwrap(), 0);

    assert!(store.notifications.delete(&ids[2], "u1").await.unwrap());
    let page = store
        .notifications
        .list_for_user("u1", false, 1, 0)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
}
