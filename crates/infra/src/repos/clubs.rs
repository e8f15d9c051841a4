use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{PgConnection, Result as SqlxResult};
use tracing::debug;
use uuid::Uuid;

use crate::categories;
use crate::db::Db;
use crate::error::StoreError;
use crate::models::{Club, ClubRow, CourseRow, OpeningHourRow};
use crate::repos::courses::{self, CourseInput};
use crate::repos::opening_hours::{self, OpeningHourInput};
use crate::slug::{base_slug, unique_slug};

/// Advisory lock key serializing slug allocation across processes.
const SLUG_LOCK_KEY: i64 = 0x636c_7562_736c_7567;

/// Everything read from the club list, in the order the site lists clubs.
#[async_trait]
pub trait ClubSource: Send + Sync {
    async fn all_clubs(&self) -> Result<Vec<Club>, StoreError>;
}

/// Editable profile fields of a club.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubUpdate {
    pub name: String,
    pub description: String,
    pub categories: String,
    pub contact_name: String,
    pub contact_role: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_website: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_postal: String,
    pub address_city: String,
    pub address_country: String,
}

impl ClubUpdate {
    /// Trim every field and normalize the category list.
    pub fn normalized(&self) -> Self {
        let t = |value: &str| value.trim().to_string();
        Self {
            name: t(&self.name),
            description: t(&self.description),
            categories: categories::normalize(&self.categories),
            contact_name: t(&self.contact_name),
            contact_role: t(&self.contact_role),
            contact_email: t(&self.contact_email),
            contact_phone: t(&self.contact_phone),
            contact_website: t(&self.contact_website),
            address_line1: t(&self.address_line1),
            address_line2: t(&self.address_line2),
            address_postal: t(&self.address_postal),
            address_city: t(&self.address_city),
            address_country: t(&self.address_country),
        }
    }
}

impl From<&ClubRow> for ClubUpdate {
    fn from(row: &ClubRow) -> Self {
        Self {
            name: row.name.clone(),
            description: row.description.clone(),
            categories: row.categories.clone(),
            contact_name: row.contact_name.clone(),
            contact_role: row.contact_role.clone(),
            contact_email: row.contact_email.clone(),
            contact_phone: row.contact_phone.clone(),
            contact_website: row.contact_website.clone(),
            address_line1: row.address_line1.clone(),
            address_line2: row.address_line2.clone(),
            address_postal: row.address_postal.clone(),
            address_city: row.address_city.clone(),
            address_country: row.address_country.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClubRepo {
    db: Db,
}

impl ClubRepo {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Profile rows ordered the way the public list shows them.
    pub async fn list(&self) -> SqlxResult<Vec<ClubRow>> {
        sqlx::query_as::<_, ClubRow>(
            r#"
            SELECT id, owner_id, name, description, categories, slug,
                   contact_name, contact_role, contact_email, contact_phone, contact_website,
                   address_line1, address_line2, address_postal, address_city, address_country,
                   created_at, updated_at
            FROM clubs
            ORDER BY name ASC, slug ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
    }

    pub async fn get_by_owner(&self, owner_id: Uuid) -> Result<Option<Club>, StoreError> {
        let profile = sqlx::query_as::<_, ClubRow>(
            r#"
            SELECT id, owner_id, name, description, categories, slug,
                   contact_name, contact_role, contact_email, contact_phone, contact_website,
                   address_line1, address_line2, address_postal, address_city, address_country,
                   created_at, updated_at
            FROM clubs
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(profile) = profile else {
            return Ok(None);
        };
        let mut clubs = self.attach_children(vec![profile]).await?;
        Ok(clubs.pop())
    }

    /// Save the owner's profile, opening hours and courses in one transaction.
    ///
    /// Creates the club on first save. Opening hours and courses are replaced
    /// wholesale by the surviving input rows.
    pub async fn save_profile(
        &self,
        owner_id: Uuid,
        update: &ClubUpdate,
        hours: &[OpeningHourInput],
        course_inputs: &[CourseInput],
    ) -> Result<Club, StoreError> {
        let update = update.normalized();
        if update.name.is_empty() {
            return Err(StoreError::NameRequired);
        }

        let mut tx = self.db.begin().await?;

        let profile = upsert(&mut tx, owner_id, &update).await?;
        let opening_hours = opening_hours::replace(&mut tx, profile.id, hours).await?;
        let courses = courses::replace(&mut tx, profile.id, course_inputs).await?;

        tx.commit().await?;

        debug!(
            club_id = %profile.id,
            slug = %profile.slug,
            opening_hours = opening_hours.len(),
            courses = courses.len(),
            "club profile saved"
        );

        Ok(Club {
            profile,
            opening_hours,
            courses,
        })
    }

    async fn attach_children(&self, profiles: Vec<ClubRow>) -> Result<Vec<Club>, StoreError> {
        let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();

        let mut hours_by_club: HashMap<Uuid, Vec<OpeningHourRow>> = HashMap::new();
        for row in opening_hours::list_for_clubs(&self.db, &ids).await? {
            hours_by_club.entry(row.club_id).or_default().push(row);
        }

        let mut courses_by_club: HashMap<Uuid, Vec<CourseRow>> = HashMap::new();
        for row in courses::list_for_clubs(&self.db, &ids).await? {
            courses_by_club.entry(row.club_id).or_default().push(row);
        }

        Ok(profiles
            .into_iter()
            .map(|profile| Club {
                opening_hours: hours_by_club.remove(&profile.id).unwrap_or_default(),
                courses: courses_by_club.remove(&profile.id).unwrap_or_default(),
                profile,
            })
            .collect())
    }
}

#[async_trait]
impl ClubSource for ClubRepo {
    async fn all_clubs(&self) -> Result<Vec<Club>, StoreError> {
        let profiles = self.list().await?;
        self.attach_children(profiles).await
    }
}

/// Insert or update the owner's club row, allocating its slug.
///
/// Must run inside a transaction: the advisory lock is released on commit.
async fn upsert(
    conn: &mut PgConnection,
    owner_id: Uuid,
    update: &ClubUpdate,
) -> Result<ClubRow, StoreError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SLUG_LOCK_KEY)
        .execute(&mut *conn)
        .await?;

    let existing_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM clubs WHERE owner_id = $1 FOR UPDATE")
            .bind(owner_id)
            .fetch_optional(&mut *conn)
            .await?;

    let base = base_slug(&update.name);
    let taken: HashSet<String> = sqlx::query_scalar(
        r#"
        SELECT slug FROM clubs
        WHERE (slug = $1 OR slug LIKE $1 || '-%')
          AND ($2::uuid IS NULL OR id <> $2)
        "#,
    )
    .bind(&base)
    .bind(existing_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .collect();
    let slug = unique_slug(&base, |candidate| taken.contains(candidate));

    let row = sqlx::query_as::<_, ClubRow>(
        r#"
        INSERT INTO clubs (
            owner_id, name, description, categories, slug,
            contact_name, contact_role, contact_email, contact_phone, contact_website,
            address_line1, address_line2, address_postal, address_city, address_country
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (owner_id) DO UPDATE
        SET name = EXCLUDED.name,
            description = EXCLUDED.description,
            categories = EXCLUDED.categories,
            slug = EXCLUDED.slug,
            contact_name = EXCLUDED.contact_name,
            contact_role = EXCLUDED.contact_role,
            contact_email = EXCLUDED.contact_email,
            contact_phone = EXCLUDED.contact_phone,
            contact_website = EXCLUDED.contact_website,
            address_line1 = EXCLUDED.address_line1,
            address_line2 = EXCLUDED.address_line2,
            address_postal = EXCLUDED.address_postal,
            address_city = EXCLUDED.address_city,
            address_country = EXCLUDED.address_country,
            updated_at = NOW()
        RETURNING id, owner_id, name, description, categories, slug,
                  contact_name, contact_role, contact_email, contact_phone, contact_website,
                  address_line1, address_line2, address_postal, address_city, address_country,
                  created_at, updated_at
        "#,
    )
    .bind(owner_id)
    .bind(&update.name)
    .bind(&update.description)
    .bind(&update.categories)
    .bind(&slug)
    .bind(&update.contact_name)
    .bind(&update.contact_role)
    .bind(&update.contact_email)
    .bind(&update.contact_phone)
    .bind(&update.contact_website)
    .bind(&update.address_line1)
    .bind(&update.address_line2)
    .bind(&update.address_postal)
    .bind(&update.address_city)
    .bind(&update.address_country)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}
