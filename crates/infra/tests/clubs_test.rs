mod common;

use common::*;
use infra::repos::{ClubRepo, ClubUpdate, CourseInput, OpeningHourInput, UserRepo};
use infra::{ClubSource, StoreError};

fn named(name: &str) -> ClubUpdate {
    ClubUpdate {
        name: name.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_same_name_gets_numbered_slug() {
    let Some(db) = setup_test_db().await else { return };
    let clubs = ClubRepo::new(db.clone());
    let name = unique("SV Adler");
    let base = infra::slug::base_slug(&name);

    let first_owner = create_test_user(&db).await;
    let second_owner = create_test_user(&db).await;

    let first = clubs
        .save_profile(first_owner, &named(&name), &[], &[])
        .await
        .unwrap();
    let second = clubs
        .save_profile(second_owner, &named(&name), &[], &[])
        .await
        .unwrap();

    assert_eq!(first.slug(), base);
    assert_eq!(second.slug(), format!("{base}-2"));

    // Re-saving never collides with the club's own row.
    let again = clubs
        .save_profile(second_owner, &named(&name), &[], &[])
        .await
        .unwrap();
    assert_eq!(again.id(), second.id());
    assert_eq!(again.slug(), second.slug());
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let Some(db) = setup_test_db().await else { return };
    let owner = create_test_user(&db).await;

    let err = ClubRepo::new(db)
        .save_profile(owner, &named("   "), &[], &[])
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NameRequired));
}

#[tokio::test]
async fn test_save_replaces_hours_and_courses() {
    let Some(db) = setup_test_db().await else { return };
    let clubs = ClubRepo::new(db.clone());
    let owner = create_test_user(&db).await;
    let update = named(&unique("Turnverein"));

    let hours = vec![
        OpeningHourInput {
            weekday: 1,
            opens_at: "09:00".into(),
            closes_at: "18:00".into(),
            note: String::new(),
        },
        OpeningHourInput {
            weekday: 2,
            ..Default::default()
        },
    ];
    let courses = vec![
        CourseInput {
            weekday: 2,
            title: "Yoga".into(),
            start_time: "18:00".into(),
            ..Default::default()
        },
        CourseInput {
            weekday: 3,
            title: " ".into(),
            ..Default::default()
        },
    ];

    let saved = clubs
        .save_profile(owner, &update, &hours, &courses)
        .await
        .unwrap();
    assert_eq!(saved.opening_hours.len(), 1);
    assert_eq!(saved.courses.len(), 1);

    let replacement = vec![CourseInput {
        weekday: 5,
        title: "Pilates".into(),
        ..Default::default()
    }];
    clubs
        .save_profile(owner, &update, &[], &replacement)
        .await
        .unwrap();

    let loaded = clubs.get_by_owner(owner).await.unwrap().expect("club exists");
    assert!(loaded.opening_hours.is_empty());
    assert_eq!(loaded.courses.len(), 1);
    assert_eq!(loaded.courses[0].title, "Pilates");
    assert_eq!(loaded.courses[0].position, 0);
}

#[tokio::test]
async fn test_all_clubs_ordered_by_name_then_slug() {
    let Some(db) = setup_test_db().await else { return };
    let clubs = ClubRepo::new(db.clone());
    let prefix = unique("zz");

    for name in ["Beta", "Alpha", "Beta"] {
        let owner = create_test_user(&db).await;
        clubs
            .save_profile(owner, &named(&format!("{prefix} {name}")), &[], &[])
            .await
            .unwrap();
    }

    let ours: Vec<(String, String)> = clubs
        .all_clubs()
        .await
        .unwrap()
        .into_iter()
        .filter(|club| club.profile.name.starts_with(&prefix))
        .map(|club| (club.profile.name.clone(), club.profile.slug.clone()))
        .collect();

    let base = infra::slug::base_slug(&prefix);
    assert_eq!(
        ours,
        vec![
            (format!("{prefix} Alpha"), format!("{base}-alpha")),
            (format!("{prefix} Beta"), format!("{base}-beta")),
            (format!("{prefix} Beta"), format!("{base}-beta-2")),
        ]
    );
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let Some(db) = setup_test_db().await else { return };
    let users = UserRepo::new(db);
    let email = format!("{}@test.local", unique("dup"));

    users.create(&email, "hash").await.unwrap();
    let err = users
        .create(&email.to_uppercase(), "hash")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::EmailExists));
}
